use std::collections::HashMap;

use movebot_core::config::PricingConfig;
use movebot_core::types::Language;

/// One priced catalog entry with its localized labels.
#[derive(Debug, Clone)]
pub struct CatalogItem {
    pub key: String,
    pub price_min: i64,
    pub price_max: i64,
    pub heavy: bool,
    pub label_ru: String,
    pub label_en: String,
    pub label_he: String,
}

impl CatalogItem {
    pub fn label(&self, lang: Language) -> &str {
        match lang {
            Language::Ru => &self.label_ru,
            Language::En => &self.label_en,
            Language::He => &self.label_he,
        }
    }

    pub fn midpoint(&self) -> i64 {
        (self.price_min + self.price_max) / 2
    }
}

/// Item lookup tables: key → entry and alias → key.
///
/// Aliases are matched longest-first so that e.g. "детская кровать" wins
/// over "кровать" on the same fragment.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: HashMap<String, CatalogItem>,
    /// `(alias_lowercase, key)` sorted by alias length, longest first.
    aliases: Vec<(String, String)>,
}

impl Catalog {
    /// Built-in catalog merged with config-supplied overrides/additions.
    pub fn from_config(cfg: &PricingConfig) -> Self {
        let mut items = HashMap::new();
        let mut aliases: Vec<(String, String)> = Vec::new();

        for (key, min, max, heavy, alias_list, ru, en, he) in builtin_entries() {
            items.insert(
                key.to_string(),
                CatalogItem {
                    key: key.to_string(),
                    price_min: min,
                    price_max: max,
                    heavy,
                    label_ru: ru.to_string(),
                    label_en: en.to_string(),
                    label_he: he.to_string(),
                },
            );
            for alias in alias_list {
                aliases.push((alias.to_lowercase(), key.to_string()));
            }
        }

        for entry in &cfg.catalog {
            items.insert(
                entry.key.clone(),
                CatalogItem {
                    key: entry.key.clone(),
                    price_min: entry.price_min,
                    price_max: entry.price_max,
                    heavy: entry.heavy,
                    label_ru: entry.label_ru.clone(),
                    label_en: entry.label_en.clone(),
                    label_he: entry.label_he.clone(),
                },
            );
            for alias in &entry.aliases {
                aliases.push((alias.to_lowercase(), entry.key.clone()));
            }
        }

        // Longest alias first; ties resolved lexicographically for
        // deterministic extraction.
        aliases.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()).then(a.0.cmp(&b.0)));

        Self { items, aliases }
    }

    pub fn get(&self, key: &str) -> Option<&CatalogItem> {
        self.items.get(key)
    }

    /// Find the longest alias occurring in `fragment` (already lowercased).
    pub fn match_alias(&self, fragment: &str) -> Option<&CatalogItem> {
        for (alias, key) in &self.aliases {
            if fragment.contains(alias.as_str()) {
                return self.items.get(key);
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

type BuiltinEntry = (
    &'static str,
    i64,
    i64,
    bool,
    &'static [&'static str],
    &'static str,
    &'static str,
    &'static str,
);

/// The built-in item table: key, price range, heavy flag, aliases
/// (ru/en/he mixed), labels in ru/en/he.
#[rustfmt::skip]
fn builtin_entries() -> Vec<BuiltinEntry> {
    vec![
        ("fridge", 250, 450, false,
         &["холодильник", "fridge", "refrigerator", "מקרר"][..],
         "Холодильник", "Refrigerator", "מקרר"),
        ("sofa", 300, 550, false,
         &["диван", "sofa", "couch", "ספה"][..],
         "Диван", "Sofa", "ספה"),
        ("corner_sofa", 450, 800, false,
         &["угловой диван", "corner sofa", "sectional sofa", "ספה פינתית"][..],
         "Угловой диван", "Corner sofa", "ספה פינתית"),
        ("wardrobe", 350, 700, false,
         &["шкаф", "wardrobe", "closet", "ארון"][..],
         "Шкаф", "Wardrobe", "ארון"),
        ("bed", 250, 450, false,
         &["кровать", "bed", "מיטה"][..],
         "Кровать", "Bed", "מיטה"),
        ("kids_bed", 150, 300, false,
         &["детская кровать", "kids bed", "crib", "מיטת תינוק", "מיטת ילדים"][..],
         "Детская кровать", "Kids bed", "מיטת ילדים"),
        ("mattress", 80, 180, false,
         &["матрас", "mattress", "מזרן"][..],
         "Матрас", "Mattress", "מזרן"),
        ("washing_machine", 200, 380, false,
         &["стиральная машина", "стиралка", "washing machine", "washer", "מכונת כביסה"][..],
         "Стиральная машина", "Washing machine", "מכונת כביסה"),
        ("dryer", 180, 320, false,
         &["сушильная машина", "сушилка", "dryer", "מייבש כביסה"][..],
         "Сушильная машина", "Dryer", "מייבש כביסה"),
        ("dishwasher", 180, 320, false,
         &["посудомоечная машина", "посудомойка", "dishwasher", "מדיח כלים"][..],
         "Посудомоечная машина", "Dishwasher", "מדיח כלים"),
        ("oven", 150, 300, false,
         &["духовка", "плита", "oven", "stove", "תנור"][..],
         "Плита/духовка", "Oven", "תנור"),
        ("table", 120, 260, false,
         &["стол", "table", "שולחן"][..],
         "Стол", "Table", "שולחן"),
        ("chair", 30, 70, false,
         &["стул", "chair", "כיסא", "כסא"][..],
         "Стул", "Chair", "כיסא"),
        ("armchair", 120, 250, false,
         &["кресло", "armchair", "כורסה"][..],
         "Кресло", "Armchair", "כורסה"),
        ("desk", 140, 280, false,
         &["письменный стол", "desk", "שולחן כתיבה"][..],
         "Письменный стол", "Desk", "שולחן כתיבה"),
        ("dresser", 150, 320, false,
         &["комод", "dresser", "שידה"][..],
         "Комод", "Dresser", "שידה"),
        ("bookshelf", 120, 260, false,
         &["книжный шкаф", "стеллаж", "bookshelf", "shelving", "כוננית"][..],
         "Стеллаж", "Bookshelf", "כוננית"),
        ("tv", 80, 180, false,
         &["телевизор", "tv", "television", "טלוויזיה"][..],
         "Телевизор", "TV", "טלוויזיה"),
        ("piano", 900, 1800, true,
         &["пианино", "рояль", "piano", "פסנתר"][..],
         "Пианино", "Piano", "פסנתר"),
        ("safe", 500, 1200, true,
         &["сейф", "safe", "כספת"][..],
         "Сейф", "Safe", "כספת"),
        ("treadmill", 250, 500, true,
         &["беговая дорожка", "treadmill", "הליכון"][..],
         "Беговая дорожка", "Treadmill", "הליכון"),
        ("aquarium", 150, 400, false,
         &["аквариум", "aquarium", "אקווריום"][..],
         "Аквариум", "Aquarium", "אקווריום"),
        ("boxes", 15, 35, false,
         &["короб", "box", "boxes", "ארגז", "קופסאות"][..],
         "Коробки", "Boxes", "ארגזים"),
        ("bike", 60, 140, false,
         &["велосипед", "bike", "bicycle", "אופניים"][..],
         "Велосипед", "Bicycle", "אופניים"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use movebot_core::config::CatalogItemConfig;

    #[test]
    fn builtin_catalog_loads() {
        let cat = Catalog::from_config(&PricingConfig::default());
        assert!(cat.len() > 20);
        assert!(cat.get("fridge").is_some());
        assert!(cat.get("piano").expect("piano missing").heavy);
    }

    #[test]
    fn longest_alias_wins() {
        let cat = Catalog::from_config(&PricingConfig::default());
        let item = cat.match_alias("детская кровать").expect("no match");
        assert_eq!(item.key, "kids_bed");
        let item = cat.match_alias("кровать").expect("no match");
        assert_eq!(item.key, "bed");
    }

    #[test]
    fn config_overrides_builtin() {
        let mut cfg = PricingConfig::default();
        cfg.catalog.push(CatalogItemConfig {
            key: "fridge".to_string(),
            price_min: 999,
            price_max: 1999,
            heavy: true,
            aliases: vec!["ледник".to_string()],
            label_ru: "Холодильник".to_string(),
            label_en: "Refrigerator".to_string(),
            label_he: "מקרר".to_string(),
        });
        let cat = Catalog::from_config(&cfg);
        let fridge = cat.get("fridge").expect("fridge missing");
        assert_eq!(fridge.price_min, 999);
        assert_eq!(cat.match_alias("ледник").expect("no match").key, "fridge");
    }

    #[test]
    fn labels_cover_all_languages() {
        let cat = Catalog::from_config(&PricingConfig::default());
        let sofa = cat.get("sofa").expect("sofa missing");
        assert!(!sofa.label(Language::Ru).is_empty());
        assert!(!sofa.label(Language::En).is_empty());
        assert!(!sofa.label(Language::He).is_empty());
    }
}
