/// Landing-page prefill payloads arrive as the first inbound text:
/// `#lead from=Haifa;to=Tel Aviv;items=sofa,fridge;date=2026-09-01`.
///
/// The grammar mirrors the landing producer's contract: a `#lead ` marker
/// followed by `;`-separated `key=value` pairs. Unknown keys are ignored;
/// anything that fails to parse falls through to the normal welcome path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandingPrefill {
    pub from: Option<String>,
    pub to: Option<String>,
    pub items: Vec<String>,
    pub date: Option<String>,
}

const MARKER: &str = "#lead ";

impl LandingPrefill {
    /// Parse a landing payload. Returns `None` when the marker is absent or
    /// no recognized field carries a value.
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.trim().strip_prefix(MARKER)?;
        let mut prefill = LandingPrefill::default();

        for pair in rest.split(';') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.trim() {
                "from" => prefill.from = Some(value.to_string()),
                "to" => prefill.to = Some(value.to_string()),
                "items" => {
                    prefill.items = value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect();
                }
                "date" => prefill.date = Some(value.to_string()),
                _ => {}
            }
        }

        if prefill.from.is_none()
            && prefill.to.is_none()
            && prefill.items.is_empty()
            && prefill.date.is_none()
        {
            return None;
        }
        Some(prefill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_payload_parses() {
        let p = LandingPrefill::parse("#lead from=Haifa;to=Tel Aviv;items=sofa,fridge;date=2026-09-01")
            .expect("no prefill");
        assert_eq!(p.from.as_deref(), Some("Haifa"));
        assert_eq!(p.to.as_deref(), Some("Tel Aviv"));
        assert_eq!(p.items, vec!["sofa".to_string(), "fridge".to_string()]);
        assert_eq!(p.date.as_deref(), Some("2026-09-01"));
    }

    #[test]
    fn partial_payload_parses() {
        let p = LandingPrefill::parse("#lead from=Хайфа;to=Тель-Авив").expect("no prefill");
        assert_eq!(p.from.as_deref(), Some("Хайфа"));
        assert!(p.items.is_empty());
    }

    #[test]
    fn unknown_keys_ignored() {
        let p = LandingPrefill::parse("#lead from=Haifa;utm_source=google").expect("no prefill");
        assert_eq!(p.from.as_deref(), Some("Haifa"));
    }

    #[test]
    fn ordinary_text_is_not_prefill() {
        assert_eq!(LandingPrefill::parse("Здравствуйте"), None);
        assert_eq!(LandingPrefill::parse("#lead "), None);
        assert_eq!(LandingPrefill::parse("#lead nonsense"), None);
    }
}
