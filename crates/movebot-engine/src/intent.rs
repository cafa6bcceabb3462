use movebot_core::types::Language;

/// Global intents recognized before step-specific validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Reset,
    DonePhotos,
    Yes,
    No,
}

impl Intent {
    /// Canonical button payload for this intent.
    pub fn payload(&self) -> &'static str {
        match self {
            Intent::Reset => "reset",
            Intent::DonePhotos => "done_photos",
            Intent::Yes => "yes",
            Intent::No => "no",
        }
    }
}

/// Match a button payload against the intent payloads.
pub fn from_payload(payload: &str) -> Option<Intent> {
    match payload {
        "reset" => Some(Intent::Reset),
        "done_photos" => Some(Intent::DonePhotos),
        "yes" => Some(Intent::Yes),
        "no" => Some(Intent::No),
        _ => None,
    }
}

/// Normalize free text against the per-language intent table.
///
/// Matching is whole-message (trimmed, lowercased) so words inside a longer
/// sentence never hijack the step validator.
pub fn from_text(language: Language, text: &str) -> Option<Intent> {
    let normalized = text.trim().trim_end_matches(['.', '!']).to_lowercase();
    let table: &[(&str, Intent)] = match language {
        Language::Ru => &[
            ("сброс", Intent::Reset),
            ("заново", Intent::Reset),
            ("начать заново", Intent::Reset),
            ("готово", Intent::DonePhotos),
            ("хватит", Intent::DonePhotos),
            ("да", Intent::Yes),
            ("нет", Intent::No),
        ],
        Language::He => &[
            ("איפוס", Intent::Reset),
            ("מחדש", Intent::Reset),
            ("סיימתי", Intent::DonePhotos),
            ("סיום", Intent::DonePhotos),
            ("כן", Intent::Yes),
            ("לא", Intent::No),
        ],
        Language::En => &[
            ("reset", Intent::Reset),
            ("start over", Intent::Reset),
            ("done", Intent::DonePhotos),
            ("finished", Intent::DonePhotos),
            ("yes", Intent::Yes),
            ("no", Intent::No),
        ],
    };

    // "/reset" works in every language.
    if normalized == "/reset" || normalized == "reset" {
        return Some(Intent::Reset);
    }
    table
        .iter()
        .find(|(word, _)| *word == normalized)
        .map(|(_, intent)| *intent)
}
