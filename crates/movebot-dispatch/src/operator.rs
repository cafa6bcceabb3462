use movebot_core::types::{Language, TimeWindow};
use movebot_leads::types::Lead;
use movebot_pricing::catalog::Catalog;

use crate::labels::{band_label, extra_label, label, time_window_label, volume_label, Label};

/// Formatting options resolved from process + tenant config.
#[derive(Debug, Clone)]
pub struct OperatorFormat {
    /// Use the stored per-field translations when available.
    pub translation_enabled: bool,
    pub target_lang: Language,
}

/// Render the full operator message for a finalized lead.
///
/// Unlike the crew view this is the trusted surface: it carries the full
/// addresses, the raw cargo description, the breakdown, and the media
/// references prepared by the caller (inline refs or signed links).
pub fn format_operator_message(
    lead: &Lead,
    catalog: &Catalog,
    media_links: &[String],
    format: &OperatorFormat,
) -> String {
    let lang = format.target_lang;
    let data = &lead.payload.data;
    let mut lines = Vec::new();

    lines.push(format!(
        "{}{} ({})",
        label(lang, Label::LeadNumber),
        lead.payload.lead_number,
        lead.payload.language.code(),
    ));

    for (idx, pickup) in data.pickups.iter().enumerate() {
        let address = translated_or(data, "pickup_address", lang, &pickup.address_text, format);
        lines.push(format!(
            "{} {}: {}, {} {} ({})",
            label(lang, Label::Pickup),
            idx + 1,
            address,
            label(lang, Label::Floor),
            pickup.floor_num,
            if pickup.has_elevator {
                label(lang, Label::Elevator)
            } else {
                label(lang, Label::NoElevator)
            },
        ));
    }
    if let Some(dest) = &data.destination {
        let address = translated_or(data, "destination_address", lang, &dest.address_text, format);
        lines.push(format!(
            "{}: {}, {} {} ({})",
            label(lang, Label::Delivery),
            address,
            label(lang, Label::Floor),
            dest.floor_num,
            if dest.has_elevator {
                label(lang, Label::Elevator)
            } else {
                label(lang, Label::NoElevator)
            },
        ));
    }

    if let Some(route) = &data.route_classification {
        lines.push(format!(
            "{}: {} ({:.0} km)",
            label(lang, Label::Route),
            band_label(lang, route.band),
            route.distance_km,
        ));
    }

    if let Some(date) = &data.date {
        let rendered = if date == "this_week" {
            label(lang, Label::ThisWeek).to_string()
        } else {
            date.clone()
        };
        lines.push(format!("{}: {}", label(lang, Label::Date), rendered));
    }
    if let Some(window) = data.time_window {
        let time = match (&data.exact_time, window) {
            (Some(exact), TimeWindow::Exact) => exact.clone(),
            _ => time_window_label(lang, window).to_string(),
        };
        lines.push(format!("{}: {}", label(lang, Label::Time), time));
    }

    if let Some(volume) = data.volume_category {
        lines.push(format!(
            "{}: {}",
            label(lang, Label::Volume),
            volume_label(lang, volume)
        ));
    }

    if !data.cargo_raw.is_empty() {
        let cargo = translated_or(data, "cargo_raw", lang, &data.cargo_raw, format);
        lines.push(format!("{}: {}", label(lang, Label::Items), cargo));
    }
    if !data.items.is_empty() {
        let joined = data
            .items
            .iter()
            .map(|item| {
                let name = catalog
                    .get(&item.key)
                    .map(|entry| entry.label(lang).to_string())
                    .unwrap_or_else(|| item.key.clone());
                if item.qty > 1 {
                    format!("{name} x{}", item.qty)
                } else {
                    name
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("• {joined}"));
    }

    if !data.extras.is_empty() {
        let joined = data
            .extras
            .iter()
            .map(|e| extra_label(lang, *e))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("{}: {}", label(lang, Label::Extras), joined));
    }

    if let Some(estimate) = &data.estimate {
        if estimate.suppressed {
            lines.push(label(lang, Label::EstimatePending).to_string());
        } else {
            lines.push(format!(
                "{}: {}–{} {}",
                label(lang, Label::Estimate),
                estimate.min,
                estimate.max,
                estimate.currency
            ));
        }
        for entry in &estimate.breakdown {
            lines.push(format!("  · {} {}", entry.label, entry.amount));
        }
    }

    if !media_links.is_empty() {
        lines.push(format!("{}:", label(lang, Label::Media)));
        for link in media_links {
            lines.push(format!("  {link}"));
        }
    }

    lines.join("\n")
}

/// Stored translation for `field` in the target language, or the original.
fn translated_or(
    data: &movebot_sessions::types::LeadData,
    field: &str,
    lang: Language,
    original: &str,
    format: &OperatorFormat,
) -> String {
    if !format.translation_enabled {
        return original.to_string();
    }
    data.translations
        .as_ref()
        .and_then(|map| map.get(field))
        .and_then(|by_lang| by_lang.get(lang.code()))
        .cloned()
        .unwrap_or_else(|| original.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use movebot_core::config::PricingConfig;
    use movebot_core::types::{BreakdownEntry, Estimate, LeadItem, Stop};
    use movebot_leads::types::{LeadPayload, LeadStatus};
    use movebot_sessions::types::LeadData;
    use std::collections::HashMap;

    fn lead() -> Lead {
        let mut data = LeadData::default();
        data.cargo_raw = "холодильник, диван".to_string();
        data.items = vec![LeadItem {
            key: "fridge".to_string(),
            qty: 1,
            price_min: 250,
            price_max: 450,
            heavy: false,
        }];
        data.pickups = vec![Stop {
            address_text: "Хайфа, ул. Герцль 12".to_string(),
            floor_num: 3,
            has_elevator: false,
            locality_key: Some("haifa".to_string()),
            geo: None,
        }];
        data.destination = Some(Stop {
            address_text: "Тель-Авив, Алленби 1".to_string(),
            floor_num: 2,
            has_elevator: true,
            locality_key: Some("tel_aviv".to_string()),
            geo: None,
        });
        data.date = Some("2026-08-15".to_string());
        data.estimate = Some(Estimate {
            min: 2260,
            max: 3100,
            currency: "ILS".to_string(),
            breakdown: vec![BreakdownEntry {
                label: "base:small".to_string(),
                amount: 900,
            }],
            suppressed: false,
        });
        data.translations = Some(HashMap::from([(
            "cargo_raw".to_string(),
            HashMap::from([("en".to_string(), "fridge, sofa".to_string())]),
        )]));

        Lead {
            tenant_id: "t1".to_string(),
            lead_id: "abc123abc123".to_string(),
            chat_id: "c1".to_string(),
            lead_seq: 7,
            status: LeadStatus::New,
            payload: LeadPayload {
                lead_number: 7,
                language: Language::Ru,
                estimate: data.estimate.clone(),
                data,
            },
            created_at: String::new(),
            updated_at: String::new(),
            deleted_at: None,
        }
    }

    fn catalog() -> Catalog {
        Catalog::from_config(&PricingConfig::default())
    }

    #[test]
    fn operator_message_carries_full_detail() {
        let text = format_operator_message(
            &lead(),
            &catalog(),
            &[],
            &OperatorFormat {
                translation_enabled: false,
                target_lang: Language::Ru,
            },
        );
        // The trusted surface includes street addresses and the breakdown.
        assert!(text.contains("Заявка №7"));
        assert!(text.contains("Герцль"));
        assert!(text.contains("2260–3100 ILS"));
        assert!(text.contains("base:small 900"));
        assert!(text.contains("холодильник, диван"));
    }

    #[test]
    fn translation_pass_substitutes_cargo() {
        let text = format_operator_message(
            &lead(),
            &catalog(),
            &[],
            &OperatorFormat {
                translation_enabled: true,
                target_lang: Language::En,
            },
        );
        assert!(text.contains("fridge, sofa"));
        assert!(!text.contains("холодильник, диван"));
    }

    #[test]
    fn media_links_are_appended() {
        let links = vec!["/media/a1?sig=x&exp=1".to_string()];
        let text = format_operator_message(
            &lead(),
            &catalog(),
            &links,
            &OperatorFormat {
                translation_enabled: false,
                target_lang: Language::Ru,
            },
        );
        assert!(text.contains("/media/a1?sig=x&exp=1"));
    }
}
