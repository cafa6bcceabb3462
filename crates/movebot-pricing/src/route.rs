use std::collections::HashMap;

use movebot_core::types::{RouteBand, RouteClassification};

/// One entry of the static locality table.
#[derive(Debug, Clone)]
pub struct Locality {
    pub key: &'static str,
    pub name_ru: &'static str,
    pub name_en: &'static str,
    pub name_he: &'static str,
    pub aliases: &'static [&'static str],
    pub lat: f64,
    pub lng: f64,
}

impl Locality {
    pub fn display_names(&self) -> HashMap<String, String> {
        HashMap::from([
            ("ru".to_string(), self.name_ru.to_string()),
            ("en".to_string(), self.name_en.to_string()),
            ("he".to_string(), self.name_he.to_string()),
        ])
    }

    pub fn name(&self, lang_code: &str) -> &'static str {
        match lang_code {
            "ru" => self.name_ru,
            "he" => self.name_he,
            _ => self.name_en,
        }
    }
}

/// Band thresholds in kilometers.
const SAME_CITY_KM: f64 = 12.0;
const SAME_METRO_KM: f64 = 35.0;
const INTER_REGION_SHORT_KM: f64 = 110.0;
const INTER_REGION_LONG_KM: f64 = 260.0;

#[rustfmt::skip]
static LOCALITIES: &[Locality] = &[
    Locality { key: "tel_aviv", name_ru: "Тель-Авив", name_en: "Tel Aviv", name_he: "תל אביב",
        aliases: &["тель-авив", "тель авив", "tel aviv", "tlv", "תל אביב", "תל-אביב"],
        lat: 32.0853, lng: 34.7818 },
    Locality { key: "haifa", name_ru: "Хайфа", name_en: "Haifa", name_he: "חיפה",
        aliases: &["хайфа", "haifa", "חיפה"],
        lat: 32.7940, lng: 34.9896 },
    Locality { key: "jerusalem", name_ru: "Иерусалим", name_en: "Jerusalem", name_he: "ירושלים",
        aliases: &["иерусалим", "jerusalem", "ירושלים"],
        lat: 31.7683, lng: 35.2137 },
    Locality { key: "beer_sheva", name_ru: "Беэр-Шева", name_en: "Beer Sheva", name_he: "באר שבע",
        aliases: &["беэр-шева", "беэр шева", "beer sheva", "beersheba", "באר שבע"],
        lat: 31.2530, lng: 34.7915 },
    Locality { key: "netanya", name_ru: "Нетания", name_en: "Netanya", name_he: "נתניה",
        aliases: &["нетания", "netanya", "נתניה"],
        lat: 32.3215, lng: 34.8532 },
    Locality { key: "ashdod", name_ru: "Ашдод", name_en: "Ashdod", name_he: "אשדוד",
        aliases: &["ашдод", "ashdod", "אשדוד"],
        lat: 31.8014, lng: 34.6435 },
    Locality { key: "ashkelon", name_ru: "Ашкелон", name_en: "Ashkelon", name_he: "אשקלון",
        aliases: &["ашкелон", "ashkelon", "אשקלון"],
        lat: 31.6688, lng: 34.5743 },
    Locality { key: "rishon_lezion", name_ru: "Ришон-ле-Цион", name_en: "Rishon LeZion", name_he: "ראשון לציון",
        aliases: &["ришон", "ришон-ле-цион", "rishon", "rishon lezion", "ראשון לציון"],
        lat: 31.9730, lng: 34.7925 },
    Locality { key: "petah_tikva", name_ru: "Петах-Тиква", name_en: "Petah Tikva", name_he: "פתח תקווה",
        aliases: &["петах-тиква", "петах тиква", "petah tikva", "פתח תקווה", "פתח תקוה"],
        lat: 32.0871, lng: 34.8878 },
    Locality { key: "herzliya", name_ru: "Герцлия", name_en: "Herzliya", name_he: "הרצליה",
        aliases: &["герцлия", "herzliya", "הרצליה"],
        lat: 32.1624, lng: 34.8447 },
    Locality { key: "ramat_gan", name_ru: "Рамат-Ган", name_en: "Ramat Gan", name_he: "רמת גן",
        aliases: &["рамат-ган", "рамат ган", "ramat gan", "רמת גן"],
        lat: 32.0684, lng: 34.8248 },
    Locality { key: "bat_yam", name_ru: "Бат-Ям", name_en: "Bat Yam", name_he: "בת ים",
        aliases: &["бат-ям", "бат ям", "bat yam", "בת ים"],
        lat: 32.0171, lng: 34.7454 },
    Locality { key: "holon", name_ru: "Холон", name_en: "Holon", name_he: "חולון",
        aliases: &["холон", "holon", "חולון"],
        lat: 32.0103, lng: 34.7792 },
    Locality { key: "eilat", name_ru: "Эйлат", name_en: "Eilat", name_he: "אילת",
        aliases: &["эйлат", "eilat", "אילת"],
        lat: 29.5577, lng: 34.9519 },
    Locality { key: "nahariya", name_ru: "Нагария", name_en: "Nahariya", name_he: "נהריה",
        aliases: &["нагария", "nahariya", "נהריה"],
        lat: 33.0085, lng: 35.0981 },
    Locality { key: "tiberias", name_ru: "Тверия", name_en: "Tiberias", name_he: "טבריה",
        aliases: &["тверия", "tiberias", "טבריה"],
        lat: 32.7922, lng: 35.5312 },
];

/// Match a locality by alias substring over free address text.
pub fn find_locality(text: &str) -> Option<&'static Locality> {
    let lower = text.to_lowercase();
    LOCALITIES
        .iter()
        .find(|loc| loc.aliases.iter().any(|a| lower.contains(a)))
}

pub fn locality_by_key(key: &str) -> Option<&'static Locality> {
    LOCALITIES.iter().find(|loc| loc.key == key)
}

/// Great-circle distance in kilometers.
fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

fn band_for(distance_km: f64) -> RouteBand {
    if distance_km < SAME_CITY_KM {
        RouteBand::SameCity
    } else if distance_km < SAME_METRO_KM {
        RouteBand::SameMetro
    } else if distance_km < INTER_REGION_SHORT_KM {
        RouteBand::InterRegionShort
    } else if distance_km < INTER_REGION_LONG_KM {
        RouteBand::InterRegionLong
    } else {
        RouteBand::CrossCountry
    }
}

/// Classify the route between two (possibly unrecognized) endpoints.
///
/// When either endpoint is unknown the band defaults to `SameMetro` with a
/// zero distance — a conservative middle ground recorded for the operator.
pub fn classify_route(
    from: Option<&Locality>,
    to: Option<&Locality>,
) -> RouteClassification {
    match (from, to) {
        (Some(a), Some(b)) => {
            let distance_km = if a.key == b.key {
                0.0
            } else {
                haversine_km(a.lat, a.lng, b.lat, b.lng)
            };
            let band = if a.key == b.key {
                RouteBand::SameCity
            } else {
                band_for(distance_km)
            };
            RouteClassification {
                band,
                distance_km,
                from_names: a.display_names(),
                to_names: b.display_names(),
            }
        }
        _ => RouteClassification {
            band: RouteBand::SameMetro,
            distance_km: 0.0,
            from_names: from.map(Locality::display_names).unwrap_or_default(),
            to_names: to.map(Locality::display_names).unwrap_or_default(),
        },
    }
}
