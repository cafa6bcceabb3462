use movebot_core::config::PricingConfig;
use movebot_core::types::{LeadItem, VolumeCategory};

/// Room/apartment descriptors that justify volume inference even when no
/// individual item was recognized.
const ROOM_MARKERS: [&str; 10] = [
    "комнат",
    "квартир",
    "студи",
    "однушк",
    "двушк",
    "room",
    "apartment",
    "studio",
    "דירה",
    "חדר",
];

pub fn has_room_descriptor(text: &str) -> bool {
    let lower = text.to_lowercase();
    ROOM_MARKERS.iter().any(|m| lower.contains(m))
}

/// Infer the volume category from extracted items.
///
/// Midpoint contributions are summed against the config thresholds; enough
/// heavy items override the result toward `xl`. Returns `None` when there is
/// nothing to infer from — the engine then asks the volume step.
pub fn infer_volume(cfg: &PricingConfig, items: &[LeadItem]) -> Option<VolumeCategory> {
    if items.is_empty() {
        return None;
    }

    let heavy_count: usize = items
        .iter()
        .filter(|i| i.heavy)
        .map(|i| i.qty as usize)
        .sum();
    if heavy_count >= cfg.heavy_xl_count {
        return Some(VolumeCategory::Xl);
    }

    let midpoint_sum: i64 = items
        .iter()
        .map(|i| (i.price_min + i.price_max) / 2 * i.qty as i64)
        .sum();

    Some(if midpoint_sum < cfg.volume_small_max {
        VolumeCategory::Small
    } else if midpoint_sum < cfg.volume_medium_max {
        VolumeCategory::Medium
    } else if midpoint_sum < cfg.volume_large_max {
        VolumeCategory::Large
    } else {
        VolumeCategory::Xl
    })
}

/// Rough volume from a room/apartment description, for cargo texts that
/// describe the home instead of listing items ("3-комнатная квартира").
pub fn infer_volume_from_rooms(text: &str) -> Option<VolumeCategory> {
    if !has_room_descriptor(text) {
        return None;
    }
    let lower = text.to_lowercase();
    if lower.contains("студи") || lower.contains("studio") {
        return Some(VolumeCategory::Small);
    }
    if lower.contains("однушк") {
        return Some(VolumeCategory::Medium);
    }
    if lower.contains("двушк") {
        return Some(VolumeCategory::Medium);
    }

    let rooms = lower
        .chars()
        .find(|c| c.is_ascii_digit())
        .and_then(|c| c.to_digit(10));
    Some(match rooms {
        Some(n) if n >= 4 => VolumeCategory::Xl,
        Some(3) => VolumeCategory::Large,
        _ => VolumeCategory::Medium,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(key: &str, qty: u32, min: i64, max: i64, heavy: bool) -> LeadItem {
        LeadItem {
            key: key.to_string(),
            qty,
            price_min: min,
            price_max: max,
            heavy,
        }
    }

    #[test]
    fn no_items_means_no_inference() {
        assert_eq!(infer_volume(&PricingConfig::default(), &[]), None);
    }

    #[test]
    fn small_move() {
        let items = vec![item("tv", 1, 80, 180, false)];
        assert_eq!(
            infer_volume(&PricingConfig::default(), &items),
            Some(VolumeCategory::Small)
        );
    }

    #[test]
    fn midpoint_sum_scales_category() {
        let items = vec![item("sofa", 4, 300, 550, false), item("wardrobe", 2, 350, 700, false)];
        // 4*425 + 2*525 = 2750 → medium under the default thresholds.
        assert_eq!(
            infer_volume(&PricingConfig::default(), &items),
            Some(VolumeCategory::Medium)
        );
    }

    #[test]
    fn heavy_items_force_xl() {
        let items = vec![item("piano", 1, 900, 1800, true), item("safe", 1, 500, 1200, true)];
        assert_eq!(
            infer_volume(&PricingConfig::default(), &items),
            Some(VolumeCategory::Xl)
        );
    }

    #[test]
    fn room_descriptors_detected() {
        assert!(has_room_descriptor("вся квартира, 3 комнаты"));
        assert!(has_room_descriptor("two-room apartment"));
        assert!(has_room_descriptor("דירת 3 חדרים"));
        assert!(!has_room_descriptor("только холодильник"));
    }

    #[test]
    fn room_counts_map_to_volume() {
        assert_eq!(
            infer_volume_from_rooms("3-комнатная квартира"),
            Some(VolumeCategory::Large)
        );
        assert_eq!(
            infer_volume_from_rooms("квартира 5 комнат"),
            Some(VolumeCategory::Xl)
        );
        assert_eq!(infer_volume_from_rooms("studio apartment"), Some(VolumeCategory::Small));
        assert_eq!(infer_volume_from_rooms("обычная квартира"), Some(VolumeCategory::Medium));
        assert_eq!(infer_volume_from_rooms("диван и стол"), None);
    }
}
