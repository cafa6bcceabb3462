use movebot_core::types::{Extra, Language, RouteBand, TimeWindow, VolumeCategory};

/// Field labels used by the crew and operator renderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    LeadNumber,
    From,
    To,
    Date,
    Time,
    Volume,
    Pickup,
    Delivery,
    Floor,
    Elevator,
    NoElevator,
    Extras,
    Items,
    Estimate,
    EstimatePending,
    Route,
    Media,
    ThisWeek,
}

pub fn label(lang: Language, l: Label) -> &'static str {
    match l {
        Label::LeadNumber => match lang {
            Language::Ru => "Заявка №",
            Language::En => "Lead #",
            Language::He => "הזמנה מס׳ ",
        },
        Label::From => match lang {
            Language::Ru => "Откуда",
            Language::En => "From",
            Language::He => "מוצא",
        },
        Label::To => match lang {
            Language::Ru => "Куда",
            Language::En => "To",
            Language::He => "יעד",
        },
        Label::Date => match lang {
            Language::Ru => "Дата",
            Language::En => "Date",
            Language::He => "תאריך",
        },
        Label::Time => match lang {
            Language::Ru => "Время",
            Language::En => "Time",
            Language::He => "שעה",
        },
        Label::Volume => match lang {
            Language::Ru => "Объём",
            Language::En => "Volume",
            Language::He => "היקף",
        },
        Label::Pickup => match lang {
            Language::Ru => "Загрузка",
            Language::En => "Pickup",
            Language::He => "איסוף",
        },
        Label::Delivery => match lang {
            Language::Ru => "Доставка",
            Language::En => "Delivery",
            Language::He => "מסירה",
        },
        Label::Floor => match lang {
            Language::Ru => "этаж",
            Language::En => "floor",
            Language::He => "קומה",
        },
        Label::Elevator => match lang {
            Language::Ru => "лифт",
            Language::En => "elevator",
            Language::He => "מעלית",
        },
        Label::NoElevator => match lang {
            Language::Ru => "без лифта",
            Language::En => "no elevator",
            Language::He => "בלי מעלית",
        },
        Label::Extras => match lang {
            Language::Ru => "Доп. услуги",
            Language::En => "Extras",
            Language::He => "שירותים נוספים",
        },
        Label::Items => match lang {
            Language::Ru => "Вещи",
            Language::En => "Items",
            Language::He => "פריטים",
        },
        Label::Estimate => match lang {
            Language::Ru => "Оценка",
            Language::En => "Estimate",
            Language::He => "הערכה",
        },
        Label::EstimatePending => match lang {
            Language::Ru => "Стоимость уточняется",
            Language::En => "Price to be confirmed",
            Language::He => "המחיר ייקבע בהמשך",
        },
        Label::Route => match lang {
            Language::Ru => "Маршрут",
            Language::En => "Route",
            Language::He => "מסלול",
        },
        Label::Media => match lang {
            Language::Ru => "Фото",
            Language::En => "Photos",
            Language::He => "תמונות",
        },
        Label::ThisWeek => match lang {
            Language::Ru => "на этой неделе",
            Language::En => "this week",
            Language::He => "השבוע",
        },
    }
}

pub fn volume_label(lang: Language, v: VolumeCategory) -> &'static str {
    match v {
        VolumeCategory::Small => match lang {
            Language::Ru => "несколько вещей",
            Language::En => "a few items",
            Language::He => "כמה פריטים",
        },
        VolumeCategory::Medium => match lang {
            Language::Ru => "1–2 комнаты",
            Language::En => "1–2 rooms",
            Language::He => "1–2 חדרים",
        },
        VolumeCategory::Large => match lang {
            Language::Ru => "3–4 комнаты",
            Language::En => "3–4 rooms",
            Language::He => "3–4 חדרים",
        },
        VolumeCategory::Xl => match lang {
            Language::Ru => "большая квартира/дом",
            Language::En => "large apartment/house",
            Language::He => "דירה גדולה/בית",
        },
    }
}

pub fn time_window_label(lang: Language, w: TimeWindow) -> &'static str {
    match w {
        TimeWindow::Morning => match lang {
            Language::Ru => "утро",
            Language::En => "morning",
            Language::He => "בוקר",
        },
        TimeWindow::Day => match lang {
            Language::Ru => "день",
            Language::En => "daytime",
            Language::He => "צהריים",
        },
        TimeWindow::Evening => match lang {
            Language::Ru => "вечер",
            Language::En => "evening",
            Language::He => "ערב",
        },
        TimeWindow::Exact => match lang {
            Language::Ru => "точное время",
            Language::En => "exact time",
            Language::He => "שעה מדויקת",
        },
    }
}

pub fn extra_label(lang: Language, e: Extra) -> &'static str {
    match e {
        Extra::Movers => match lang {
            Language::Ru => "грузчики",
            Language::En => "movers",
            Language::He => "סבלים",
        },
        Extra::Assembly => match lang {
            Language::Ru => "разборка/сборка",
            Language::En => "assembly",
            Language::He => "פירוק/הרכבה",
        },
        Extra::Packing => match lang {
            Language::Ru => "упаковка",
            Language::En => "packing",
            Language::He => "אריזה",
        },
    }
}

pub fn band_label(lang: Language, b: RouteBand) -> &'static str {
    match b {
        RouteBand::SameCity => match lang {
            Language::Ru => "по городу",
            Language::En => "same city",
            Language::He => "באותה עיר",
        },
        RouteBand::SameMetro => match lang {
            Language::Ru => "пригород",
            Language::En => "metro area",
            Language::He => "גוש ערים",
        },
        RouteBand::InterRegionShort => match lang {
            Language::Ru => "межгород (ближний)",
            Language::En => "inter-region (short)",
            Language::He => "בין-עירוני (קצר)",
        },
        RouteBand::InterRegionLong => match lang {
            Language::Ru => "межгород (дальний)",
            Language::En => "inter-region (long)",
            Language::He => "בין-עירוני (ארוך)",
        },
        RouteBand::CrossCountry => match lang {
            Language::Ru => "через всю страну",
            Language::En => "cross-country",
            Language::He => "מקצה לקצה",
        },
    }
}
