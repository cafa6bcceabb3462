use movebot_core::types::{Extra, Language, TimeWindow, VolumeCategory};
use movebot_leads::types::Lead;
use movebot_pricing::catalog::Catalog;

use crate::labels::{extra_label, label, time_window_label, volume_label, Label};

/// PII-free projection of a finalized lead, safe to forward to a crew group.
///
/// Built from an explicit allowlist. Phone numbers, street addresses, the
/// raw cargo text, user names, links and media never enter this struct —
/// anything not copied here cannot leak into the rendering.
#[derive(Debug, Clone)]
pub struct CrewLeadView {
    pub lead_number: i64,
    pub from_locality: Option<String>,
    pub to_locality: Option<String>,
    pub date: Option<String>,
    pub time_window: Option<TimeWindow>,
    pub exact_time: Option<String>,
    pub volume_category: Option<VolumeCategory>,
    /// `(floor, has_elevator)` per pickup, in order.
    pub pickup_floors: Vec<(i32, bool)>,
    pub destination_floor: Option<(i32, bool)>,
    pub extras: Vec<Extra>,
    /// Localized item labels with quantities.
    pub items: Vec<(String, u32)>,
    /// `(min, max, currency)` — absent when the estimate was suppressed.
    pub estimate: Option<(i64, i64, String)>,
}

impl CrewLeadView {
    /// Project a lead through the allowlist in the crew's target language.
    pub fn project(lead: &Lead, catalog: &Catalog, lang: Language) -> Self {
        let data = &lead.payload.data;
        let code = lang.code();

        let from_locality = data
            .route_classification
            .as_ref()
            .and_then(|r| r.from_names.get(code).cloned());
        let to_locality = data
            .route_classification
            .as_ref()
            .and_then(|r| r.to_names.get(code).cloned());

        let items = data
            .items
            .iter()
            .map(|item| {
                let name = catalog
                    .get(&item.key)
                    .map(|entry| entry.label(lang).to_string())
                    .unwrap_or_else(|| item.key.clone());
                (name, item.qty)
            })
            .collect();

        let estimate = data.estimate.as_ref().and_then(|e| {
            if e.suppressed {
                None
            } else {
                Some((e.min, e.max, e.currency.clone()))
            }
        });

        Self {
            lead_number: lead.payload.lead_number,
            from_locality,
            to_locality,
            date: data.date.clone(),
            time_window: data.time_window,
            exact_time: data.exact_time.clone(),
            volume_category: data.volume_category,
            pickup_floors: data
                .pickups
                .iter()
                .map(|p| (p.floor_num, p.has_elevator))
                .collect(),
            destination_floor: data.destination.as_ref().map(|d| (d.floor_num, d.has_elevator)),
            extras: data.extras.clone(),
            items,
            estimate,
        }
    }

    /// Render the localized crew message.
    pub fn render(&self, lang: Language) -> String {
        let mut lines = Vec::new();
        lines.push(format!("{}{}", label(lang, Label::LeadNumber), self.lead_number));

        if let Some(from) = &self.from_locality {
            lines.push(format!("{}: {}", label(lang, Label::From), from));
        }
        if let Some(to) = &self.to_locality {
            lines.push(format!("{}: {}", label(lang, Label::To), to));
        }

        if let Some(date) = &self.date {
            let rendered = if date == "this_week" {
                label(lang, Label::ThisWeek).to_string()
            } else {
                date.clone()
            };
            lines.push(format!("{}: {}", label(lang, Label::Date), rendered));
        }
        if let Some(window) = self.time_window {
            let time = match (&self.exact_time, window) {
                (Some(exact), TimeWindow::Exact) => exact.clone(),
                _ => time_window_label(lang, window).to_string(),
            };
            lines.push(format!("{}: {}", label(lang, Label::Time), time));
        }
        if let Some(volume) = self.volume_category {
            lines.push(format!("{}: {}", label(lang, Label::Volume), volume_label(lang, volume)));
        }

        for (idx, (floor, elevator)) in self.pickup_floors.iter().enumerate() {
            lines.push(format!(
                "{} {}: {} {} ({})",
                label(lang, Label::Pickup),
                idx + 1,
                label(lang, Label::Floor),
                floor,
                elevator_note(lang, *elevator),
            ));
        }
        if let Some((floor, elevator)) = self.destination_floor {
            lines.push(format!(
                "{}: {} {} ({})",
                label(lang, Label::Delivery),
                label(lang, Label::Floor),
                floor,
                elevator_note(lang, elevator),
            ));
        }

        if !self.extras.is_empty() {
            let joined = self
                .extras
                .iter()
                .map(|e| extra_label(lang, *e))
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!("{}: {}", label(lang, Label::Extras), joined));
        }

        if !self.items.is_empty() {
            let joined = self
                .items
                .iter()
                .map(|(name, qty)| {
                    if *qty > 1 {
                        format!("{name} x{qty}")
                    } else {
                        name.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!("{}: {}", label(lang, Label::Items), joined));
        }

        match &self.estimate {
            Some((min, max, currency)) => {
                lines.push(format!(
                    "{}: {min}–{max} {currency}",
                    label(lang, Label::Estimate)
                ));
            }
            None => lines.push(label(lang, Label::EstimatePending).to_string()),
        }

        lines.join("\n")
    }
}

fn elevator_note(lang: Language, has_elevator: bool) -> &'static str {
    if has_elevator {
        label(lang, Label::Elevator)
    } else {
        label(lang, Label::NoElevator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use movebot_core::config::PricingConfig;
    use movebot_core::types::{Estimate, LeadItem, RouteBand, RouteClassification, Stop};
    use movebot_leads::types::{LeadPayload, LeadStatus};
    use movebot_sessions::types::LeadData;
    use std::collections::HashMap;

    fn names(ru: &str, en: &str, he: &str) -> HashMap<String, String> {
        HashMap::from([
            ("ru".to_string(), ru.to_string()),
            ("en".to_string(), en.to_string()),
            ("he".to_string(), he.to_string()),
        ])
    }

    fn lead() -> Lead {
        let mut data = LeadData::default();
        data.cargo_raw = "Холодильник 200кг, диван, тел 050-1234567".to_string();
        data.items = vec![
            LeadItem {
                key: "fridge".to_string(),
                qty: 1,
                price_min: 250,
                price_max: 450,
                heavy: false,
            },
            LeadItem {
                key: "sofa".to_string(),
                qty: 2,
                price_min: 300,
                price_max: 550,
                heavy: false,
            },
        ];
        data.volume_category = Some(VolumeCategory::Xl);
        data.pickup_count = 2;
        data.pickups = vec![
            Stop {
                address_text: "Хайфа, ул. Герцль 12, кв 5".to_string(),
                floor_num: 6,
                has_elevator: false,
                locality_key: Some("haifa".to_string()),
                geo: None,
            },
            Stop {
                address_text: "Хайфа, ул. Бальфур 3".to_string(),
                floor_num: 1,
                has_elevator: true,
                locality_key: Some("haifa".to_string()),
                geo: None,
            },
        ];
        data.destination = Some(Stop {
            address_text: "Тель-Авив, ул. Алленби 40".to_string(),
            floor_num: 2,
            has_elevator: true,
            locality_key: Some("tel_aviv".to_string()),
            geo: None,
        });
        data.date = Some("2026-08-15".to_string());
        data.time_window = Some(TimeWindow::Morning);
        data.extras = vec![Extra::Assembly];
        data.estimate = Some(Estimate {
            min: 7800,
            max: 9200,
            currency: "ILS".to_string(),
            breakdown: Vec::new(),
            suppressed: false,
        });
        data.route_classification = Some(RouteClassification {
            band: RouteBand::InterRegionShort,
            distance_km: 81.0,
            from_names: names("Хайфа", "Haifa", "חיפה"),
            to_names: names("Тель-Авив", "Tel Aviv", "תל אביב"),
        });

        Lead {
            tenant_id: "t1".to_string(),
            lead_id: "abc123abc123".to_string(),
            chat_id: "+972501234567".to_string(),
            lead_seq: 42,
            status: LeadStatus::New,
            payload: LeadPayload {
                lead_number: 42,
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
    fn renders_multi_pickup_lines() {
        let view = CrewLeadView::project(&lead(), &catalog(), Language::Ru);
        let text = view.render(Language::Ru);
        assert!(text.contains("Заявка №42"));
        assert!(text.contains("Загрузка 1: этаж 6 (без лифта)"));
        assert!(text.contains("Загрузка 2: этаж 1 (лифт)"));
        assert!(text.contains("Доставка: этаж 2 (лифт)"));
        assert!(text.contains("Хайфа"));
        assert!(text.contains("Тель-Авив"));
        assert!(text.contains("7800–9200 ILS"));
    }

    #[test]
    fn never_leaks_pii() {
        let view = CrewLeadView::project(&lead(), &catalog(), Language::Ru);
        let text = view.render(Language::Ru);
        // Street addresses, phone numbers and raw cargo text must not appear.
        assert!(!text.contains("Герцль"));
        assert!(!text.contains("Алленби"));
        assert!(!text.contains("050-1234567"));
        assert!(!text.contains("+972501234567"));
        assert!(!text.contains("200кг"));
    }

    #[test]
    fn items_are_localized_labels() {
        let view = CrewLeadView::project(&lead(), &catalog(), Language::En);
        let text = view.render(Language::En);
        assert!(text.contains("Refrigerator"));
        assert!(text.contains("Sofa x2"));
        let view_he = CrewLeadView::project(&lead(), &catalog(), Language::He);
        assert!(view_he.render(Language::He).contains("מקרר"));
    }

    #[test]
    fn suppressed_estimate_omits_price_line() {
        let mut lead = lead();
        lead.payload.data.estimate.as_mut().expect("no estimate").suppressed = true;
        let view = CrewLeadView::project(&lead, &catalog(), Language::Ru);
        let text = view.render(Language::Ru);
        assert!(!text.contains("7800"));
        assert!(text.contains("Стоимость уточняется"));
    }

    #[test]
    fn this_week_token_is_localized() {
        let mut lead = lead();
        lead.payload.data.date = Some("this_week".to_string());
        let view = CrewLeadView::project(&lead, &catalog(), Language::En);
        assert!(view.render(Language::En).contains("this week"));
    }
}
