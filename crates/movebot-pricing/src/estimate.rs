use movebot_core::config::{PricingConfig, SUPPRESSION_MIN_CARGO_LEN};
use movebot_core::types::{
    BreakdownEntry, Estimate, Extra, LeadItem, RouteBand, RouteClassification, Stop,
    VolumeCategory,
};

/// Normalized pricing inputs, borrowed from the session's lead data.
#[derive(Debug, Clone, Copy)]
pub struct EstimateInput<'a> {
    pub items: &'a [LeadItem],
    pub volume_category: Option<VolumeCategory>,
    pub route: Option<&'a RouteClassification>,
    pub pickups: &'a [Stop],
    pub destination: Option<&'a Stop>,
    pub extras: &'a [Extra],
    pub cargo_raw: &'a str,
}

/// Count of pricing-risk triggers used by the complexity guards.
pub fn complexity_score(input: &EstimateInput<'_>) -> u32 {
    let mut score = 0u32;

    if matches!(
        input.volume_category,
        Some(VolumeCategory::Large) | Some(VolumeCategory::Xl)
    ) {
        score += 1;
    }
    if input.extras.contains(&Extra::Assembly) {
        score += 1;
    }
    if input.pickups.len() >= 2 {
        score += 1;
    }
    if input.route.is_some_and(|r| r.band.is_long_haul()) {
        score += 1;
    }
    let high_floor_no_elevator = input
        .pickups
        .iter()
        .chain(input.destination)
        .any(|s| s.floor_num >= 5 && !s.has_elevator);
    if high_floor_no_elevator {
        score += 1;
    }

    score
}

/// Compute the `(min, max)` estimate and its breakdown.
///
/// Deterministic over its inputs; every contribution lands in the breakdown
/// so the operator can audit the range. The breakdown is persisted even when
/// the user-facing range is suppressed.
pub fn compute_estimate(cfg: &PricingConfig, input: &EstimateInput<'_>) -> Estimate {
    let mut breakdown = Vec::new();
    let mut min: i64 = 0;
    let mut max: i64 = 0;

    if let Some(volume) = input.volume_category {
        let base = match volume {
            VolumeCategory::Small => cfg.base_small,
            VolumeCategory::Medium => cfg.base_medium,
            VolumeCategory::Large => cfg.base_large,
            VolumeCategory::Xl => cfg.base_xl,
        };
        min += base;
        max += base;
        breakdown.push(BreakdownEntry {
            label: format!("base:{}", volume.as_str()),
            amount: base,
        });
    }

    for item in input.items {
        let qty = item.qty as i64;
        min += item.price_min * qty;
        max += item.price_max * qty;
        breakdown.push(BreakdownEntry {
            label: format!("item:{} x{}", item.key, item.qty),
            amount: (item.price_min + item.price_max) / 2 * qty,
        });
    }

    for (idx, stop) in input.pickups.iter().enumerate() {
        let surcharge = floor_surcharge(cfg, stop);
        if surcharge > 0 {
            min += surcharge;
            max += surcharge;
            breakdown.push(BreakdownEntry {
                label: format!("floor:pickup {}", idx + 1),
                amount: surcharge,
            });
        }
    }
    if let Some(dest) = input.destination {
        let surcharge = floor_surcharge(cfg, dest);
        if surcharge > 0 {
            min += surcharge;
            max += surcharge;
            breakdown.push(BreakdownEntry {
                label: "floor:destination".to_string(),
                amount: surcharge,
            });
        }
    }

    if let Some(route) = input.route {
        let fee = band_fee(cfg, route.band);
        if fee > 0 {
            min += fee;
            max += fee;
            breakdown.push(BreakdownEntry {
                label: format!("route:{}", route.band.as_str()),
                amount: fee,
            });
        }
    }

    for extra in input.extras {
        let fee = match extra {
            Extra::Movers => cfg.extra_movers,
            Extra::Assembly => cfg.extra_assembly,
            Extra::Packing => cfg.extra_packing,
        };
        min += fee;
        max += fee;
        breakdown.push(BreakdownEntry {
            label: format!("extra:{}", extra.as_str()),
            amount: fee,
        });
    }

    // Complexity guards: only large/xl moves are ever boosted.
    let score = complexity_score(input);
    let boostable = matches!(
        input.volume_category,
        Some(VolumeCategory::Large) | Some(VolumeCategory::Xl)
    );
    if boostable && score >= 2 {
        let factor = cfg.complex_multiplier * cfg.risk_buffer;
        let boosted_min = (min as f64 * factor).round() as i64;
        let boosted_max = (max as f64 * factor).round() as i64;
        breakdown.push(BreakdownEntry {
            label: format!("complexity:x{factor:.2} (score {score})"),
            amount: (boosted_min + boosted_max) / 2 - (min + max) / 2,
        });
        min = boosted_min;
        max = boosted_max;
    }
    if boostable && score >= 3 && min < cfg.complex_min_floor {
        breakdown.push(BreakdownEntry {
            label: "minimum:complexity".to_string(),
            amount: cfg.complex_min_floor - min,
        });
        min = cfg.complex_min_floor;
        max = max.max(min);
    }

    // Per-band minimum.
    if let Some(route) = input.route {
        let band_min = band_minimum(cfg, route.band);
        if min < band_min {
            breakdown.push(BreakdownEntry {
                label: format!("minimum:{}", route.band.as_str()),
                amount: band_min - min,
            });
            min = band_min;
            max = max.max(min);
        }
    }

    let suppressed = input.items.is_empty()
        && input.volume_category.is_none()
        && input.cargo_raw.chars().count() > SUPPRESSION_MIN_CARGO_LEN;

    Estimate {
        min,
        max,
        currency: cfg.currency.clone(),
        breakdown,
        suppressed,
    }
}

fn floor_surcharge(cfg: &PricingConfig, stop: &Stop) -> i64 {
    if stop.has_elevator || stop.floor_num <= 1 {
        0
    } else {
        stop.floor_num as i64 * cfg.per_floor_rate
    }
}

fn band_fee(cfg: &PricingConfig, band: RouteBand) -> i64 {
    match band {
        RouteBand::SameCity => cfg.fee_same_city,
        RouteBand::SameMetro => cfg.fee_same_metro,
        RouteBand::InterRegionShort => cfg.fee_inter_region_short,
        RouteBand::InterRegionLong => cfg.fee_inter_region_long,
        RouteBand::CrossCountry => cfg.fee_cross_country,
    }
}

fn band_minimum(cfg: &PricingConfig, band: RouteBand) -> i64 {
    match band {
        RouteBand::SameCity => cfg.min_same_city,
        RouteBand::SameMetro => cfg.min_same_metro,
        RouteBand::InterRegionShort => cfg.min_inter_region_short,
        RouteBand::InterRegionLong => cfg.min_inter_region_long,
        RouteBand::CrossCountry => cfg.min_cross_country,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{classify_route, locality_by_key};

    fn item(key: &str, qty: u32, min: i64, max: i64, heavy: bool) -> LeadItem {
        LeadItem {
            key: key.to_string(),
            qty,
            price_min: min,
            price_max: max,
            heavy,
        }
    }

    fn stop(floor: i32, elevator: bool) -> Stop {
        Stop {
            address_text: "test address".to_string(),
            floor_num: floor,
            has_elevator: elevator,
            locality_key: None,
            geo: None,
        }
    }

    #[test]
    fn basic_estimate_sums_contributions() {
        let cfg = PricingConfig::default();
        let items = vec![item("fridge", 1, 250, 450, false), item("sofa", 1, 300, 550, false)];
        let pickups = vec![stop(3, false)];
        let destination = stop(2, true);
        let route = classify_route(locality_by_key("haifa"), locality_by_key("tel_aviv"));

        let estimate = compute_estimate(
            &cfg,
            &EstimateInput {
                items: &items,
                volume_category: Some(VolumeCategory::Small),
                route: Some(&route),
                pickups: &pickups,
                destination: Some(&destination),
                extras: &[],
                cargo_raw: "Холодильник, диван",
            },
        );

        // 900 base + 250 fridge + 300 sofa + 360 floors + 450 route = 2260.
        assert_eq!(estimate.min, 2260);
        assert!(estimate.max > estimate.min);
        assert!(!estimate.suppressed);
        assert!(estimate.min >= cfg.min_same_metro);
        assert!(estimate.breakdown.iter().any(|b| b.label.contains("fridge")));
        assert!(estimate.breakdown.iter().any(|b| b.label.contains("sofa")));
    }

    #[test]
    fn elevator_floors_are_free() {
        let cfg = PricingConfig::default();
        let pickups = vec![stop(9, true)];
        let estimate = compute_estimate(
            &cfg,
            &EstimateInput {
                items: &[],
                volume_category: Some(VolumeCategory::Small),
                route: None,
                pickups: &pickups,
                destination: None,
                extras: &[],
                cargo_raw: "",
            },
        );
        assert!(!estimate.breakdown.iter().any(|b| b.label.starts_with("floor:")));
    }

    #[test]
    fn complexity_multiplier_applies_to_large_at_score_two() {
        let cfg = PricingConfig::default();
        let pickups = vec![stop(1, true)];
        let base = EstimateInput {
            items: &[],
            volume_category: Some(VolumeCategory::Large),
            route: None,
            pickups: &pickups,
            destination: None,
            extras: &[Extra::Assembly],
            cargo_raw: "",
        };
        // Triggers: large volume + assembly = 2.
        assert_eq!(complexity_score(&base), 2);
        let estimate = compute_estimate(&cfg, &base);
        let factor = cfg.complex_multiplier * cfg.risk_buffer;
        assert_eq!(estimate.min, (cfg.base_large as f64 * factor).round() as i64);
    }

    #[test]
    fn small_volume_is_never_boosted() {
        let cfg = PricingConfig::default();
        let pickups = vec![stop(6, false), stop(2, false)];
        let input = EstimateInput {
            items: &[],
            volume_category: Some(VolumeCategory::Small),
            route: None,
            pickups: &pickups,
            destination: None,
            extras: &[Extra::Assembly],
            cargo_raw: "",
        };
        // Score 3 (assembly, two pickups, high floor) but volume small.
        assert!(complexity_score(&input) >= 2);
        let estimate = compute_estimate(&cfg, &input);
        assert!(!estimate.breakdown.iter().any(|b| b.label.starts_with("complexity:")));
        assert!(estimate.min < cfg.complex_min_floor);
    }

    #[test]
    fn crane_scenario_hits_hard_floor() {
        let cfg = PricingConfig::default();
        let pickups = vec![stop(6, false), stop(1, true)];
        let destination = stop(2, true);
        let input = EstimateInput {
            items: &[],
            volume_category: Some(VolumeCategory::Xl),
            route: None,
            pickups: &pickups,
            destination: Some(&destination),
            extras: &[Extra::Assembly],
            cargo_raw: "вся квартира",
        };
        assert!(complexity_score(&input) >= 3);
        let estimate = compute_estimate(&cfg, &input);
        assert!(estimate.min >= cfg.complex_min_floor);
    }

    #[test]
    fn band_minimum_enforced() {
        let cfg = PricingConfig::default();
        let route = classify_route(locality_by_key("tel_aviv"), locality_by_key("eilat"));
        let estimate = compute_estimate(
            &cfg,
            &EstimateInput {
                items: &[],
                volume_category: Some(VolumeCategory::Small),
                route: Some(&route),
                pickups: &[],
                destination: None,
                extras: &[],
                cargo_raw: "",
            },
        );
        assert!(estimate.min >= cfg.min_cross_country);
    }

    #[test]
    fn long_unrecognized_cargo_suppresses() {
        let cfg = PricingConfig::default();
        let estimate = compute_estimate(
            &cfg,
            &EstimateInput {
                items: &[],
                volume_category: None,
                route: None,
                pickups: &[],
                destination: None,
                extras: &[],
                cargo_raw: "очень много разных непонятных вещей в гараже и кладовке",
            },
        );
        assert!(estimate.suppressed);
        // Breakdown is still produced (possibly empty) and persisted upstream.
    }

    #[test]
    fn short_unrecognized_cargo_is_not_suppressed() {
        let cfg = PricingConfig::default();
        let estimate = compute_estimate(
            &cfg,
            &EstimateInput {
                items: &[],
                volume_category: None,
                route: None,
                pickups: &[],
                destination: None,
                extras: &[],
                cargo_raw: "мелочи",
            },
        );
        assert!(!estimate.suppressed);
    }
}
