use movebot_core::types::LeadItem;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::catalog::Catalog;

/// Dimension expressions like "120x60", "80×200 см", "40х40х90" are stripped
/// before quantity detection so their numbers are never read as quantities.
static DIMENSIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+\s*[x×хХ]\s*\d+(\s*[x×хХ]\s*\d+)?(\s*(см|cm|мм|mm))?").unwrap()
});

/// Explicit quantity markers — always honored.
static QTY_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:[xх]\s*(\d{1,3}))|(?:(\d{1,3})\s*[xх]\b)|(?:(\d{1,3})\s*(?:шт|pcs))|(?:qty:\s*(\d{1,3}))").unwrap()
});

/// A digit run followed by an attribute suffix is a property of the item
/// (weight, doors, seats, size), not a quantity.
static ATTR_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+[\s-]*(?:двер|местн|seater|кг|kg|см|cm|мм|mm|л|l|м)").unwrap()
});

static BARE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Extract recognized items from a raw cargo description.
///
/// Pipeline: strip dimensions → split on delimiters → per fragment match the
/// longest catalog alias and resolve the quantity with the three-tier policy
/// (explicit marker > attribute suppression > bare number ≤ 200).
/// Fragments resolving to the same catalog key are merged.
pub fn extract_items(catalog: &Catalog, raw: &str) -> Vec<LeadItem> {
    let cleaned = DIMENSIONS.replace_all(raw, " ");
    let mut items: Vec<LeadItem> = Vec::new();

    for fragment in split_fragments(&cleaned) {
        let fragment = fragment.to_lowercase();
        let Some(entry) = catalog.match_alias(&fragment) else {
            continue;
        };
        let qty = detect_quantity(&fragment);

        match items.iter_mut().find(|i| i.key == entry.key) {
            Some(existing) => existing.qty += qty,
            None => items.push(LeadItem {
                key: entry.key.clone(),
                qty,
                price_min: entry.price_min,
                price_max: entry.price_max,
                heavy: entry.heavy,
            }),
        }
    }

    items
}

/// Split on comma, semicolon, newline and the English " and " connector.
fn split_fragments(text: &str) -> Vec<&str> {
    text.split(|c| c == ',' || c == ';' || c == '\n')
        .flat_map(|part| part.split(" and "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Three-tier quantity policy over one fragment.
fn detect_quantity(fragment: &str) -> u32 {
    if let Some(caps) = QTY_MARKER.captures(fragment) {
        let explicit = caps
            .iter()
            .skip(1)
            .flatten()
            .next()
            .and_then(|m| m.as_str().parse::<u32>().ok());
        if let Some(n) = explicit {
            return n.max(1);
        }
    }

    // Remove attribute-suffixed numbers, then look for a bare quantity.
    let without_attrs = ATTR_NUMBER.replace_all(fragment, " ");
    for m in BARE_NUMBER.find_iter(&without_attrs) {
        if let Ok(n) = m.as_str().parse::<u64>() {
            if n >= 1 && n <= 200 {
                return n as u32;
            }
            // A bare number above 200 is noise (weight, model number).
            return 1;
        }
    }
    1
}
