use movebot_core::types::Language;

/// Script-based language detection over free text.
///
/// Hebrew block wins over Cyrillic when both appear (mixed He/Ru messages
/// from Israeli users usually mean a Hebrew speaker quoting something).
/// Returns `None` when the text has no detectable script (digits, latin-less
/// punctuation, emoji) so the caller keeps the stored language.
pub fn detect_language(text: &str) -> Option<Language> {
    let mut has_latin = false;
    for ch in text.chars() {
        if ('\u{0590}'..='\u{05FF}').contains(&ch) {
            return Some(Language::He);
        }
        if ('\u{0400}'..='\u{04FF}').contains(&ch) {
            return Some(Language::Ru);
        }
        if ch.is_ascii_alphabetic() {
            has_latin = true;
        }
    }
    if has_latin {
        Some(Language::En)
    } else {
        None
    }
}
