use movebot_core::types::{Button, Language};

/// Keys into the static translation table. Every user-visible string goes
/// through here; none of them carry internal identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    Welcome,
    ConfirmAddresses,
    AskCargo,
    AskVolume,
    AskPickupCount,
    AskAddrFrom,
    AskAddrFromN,
    AskAddrTo,
    AskFloor,
    HintFloor,
    AskDate,
    AskSpecificDate,
    HintDateTooSoon,
    HintDateTooFar,
    HintDateUnparsable,
    AskTimeSlot,
    AskExactTime,
    HintTimeUnparsable,
    AskPhotoMenu,
    PhotoWaitPrompt,
    PhotoReceived,
    AskExtras,
    EstimateRange,
    EstimateSuppressed,
    EstimateHidden,
    HintEstimateChoice,
    DoneThanks,
    HintPickupCount,
    HintVolume,
    HintUnknown,
}

/// Look up a message in the static translation table.
pub fn t(lang: Language, msg: Msg) -> &'static str {
    match msg {
        Msg::Welcome => match lang {
            Language::Ru => "Здравствуйте! Я помогу рассчитать переезд. Что нужно перевезти? Перечислите вещи или опишите квартиру.",
            Language::En => "Hi! I'll help you price your move. What needs moving? List the items or describe the apartment.",
            Language::He => "שלום! אעזור לכם לתמחר את ההובלה. מה צריך להעביר? פרטו את הפריטים או תארו את הדירה.",
        },
        Msg::ConfirmAddresses => match lang {
            Language::Ru => "Я получил данные с сайта. Всё верно?",
            Language::En => "I received your details from the site. Is everything correct?",
            Language::He => "קיבלתי את הפרטים מהאתר. הכל נכון?",
        },
        Msg::AskCargo => match lang {
            Language::Ru => "Что нужно перевезти? Перечислите вещи через запятую.",
            Language::En => "What needs moving? List the items, separated by commas.",
            Language::He => "מה צריך להעביר? פרטו את הפריטים, מופרדים בפסיקים.",
        },
        Msg::AskVolume => match lang {
            Language::Ru => "Какой примерно объём переезда?",
            Language::En => "Roughly how big is the move?",
            Language::He => "מה בערך היקף ההובלה?",
        },
        Msg::AskPickupCount => match lang {
            Language::Ru => "Сколько адресов загрузки?",
            Language::En => "How many pickup addresses?",
            Language::He => "מכמה כתובות אוספים?",
        },
        Msg::AskAddrFrom => match lang {
            Language::Ru => "Откуда забираем? Укажите город и адрес.",
            Language::En => "Where do we pick up? City and address, please.",
            Language::He => "מאיפה אוספים? ציינו עיר וכתובת.",
        },
        Msg::AskAddrFromN => match lang {
            Language::Ru => "Адрес загрузки №{n}: город и адрес.",
            Language::En => "Pickup address #{n}: city and address.",
            Language::He => "כתובת איסוף מס׳ {n}: עיר וכתובת.",
        },
        Msg::AskAddrTo => match lang {
            Language::Ru => "Куда везём? Укажите город и адрес.",
            Language::En => "Where are we moving to? City and address, please.",
            Language::He => "לאן עוברים? ציינו עיר וכתובת.",
        },
        Msg::AskFloor => match lang {
            Language::Ru => "Какой этаж и есть ли лифт? Например: «3, без лифта».",
            Language::En => "Which floor, and is there an elevator? For example: \"3 no\".",
            Language::He => "איזו קומה והאם יש מעלית? למשל: ״3 בלי מעלית״.",
        },
        Msg::HintFloor => match lang {
            Language::Ru => "Не понял. Напишите этаж и есть ли лифт, например «2, лифт есть».",
            Language::En => "Sorry, I didn't get that. Send the floor and whether there's an elevator, e.g. \"2 yes\".",
            Language::He => "לא הבנתי. כתבו קומה והאם יש מעלית, למשל ״2 יש מעלית״.",
        },
        Msg::AskDate => match lang {
            Language::Ru => "Когда планируете переезд?",
            Language::En => "When are you planning the move?",
            Language::He => "מתי מתוכננת ההובלה?",
        },
        Msg::AskSpecificDate => match lang {
            Language::Ru => "Напишите дату, например 15.09 или 2026-09-15.",
            Language::En => "Send the date, e.g. 15.09 or 2026-09-15.",
            Language::He => "כתבו תאריך, למשל 15.09 או 2026-09-15.",
        },
        Msg::HintDateTooSoon => match lang {
            Language::Ru => "Эта дата уже прошла. Укажите сегодняшнюю или будущую дату.",
            Language::En => "That date has already passed. Please pick today or a future date.",
            Language::He => "התאריך הזה כבר עבר. בחרו תאריך של היום או עתידי.",
        },
        Msg::HintDateTooFar => match lang {
            Language::Ru => "Это слишком далеко — мы бронируем не более чем за полгода. Укажите более близкую дату.",
            Language::En => "That's too far out — we book up to six months ahead. Please pick a closer date.",
            Language::He => "זה רחוק מדי — אנחנו מזמינים עד חצי שנה מראש. בחרו תאריך קרוב יותר.",
        },
        Msg::HintDateUnparsable => match lang {
            Language::Ru => "Не понял дату. Напишите, например, 15.09 или «завтра».",
            Language::En => "I couldn't read that date. Try e.g. 15.09 or \"tomorrow\".",
            Language::He => "לא הצלחתי להבין את התאריך. נסו למשל 15.09 או ״מחר״.",
        },
        Msg::AskTimeSlot => match lang {
            Language::Ru => "В какое время удобно?",
            Language::En => "What time works best?",
            Language::He => "באיזו שעה נוח?",
        },
        Msg::AskExactTime => match lang {
            Language::Ru => "Напишите точное время, например 09:30.",
            Language::En => "Send the exact time, e.g. 09:30.",
            Language::He => "כתבו שעה מדויקת, למשל 09:30.",
        },
        Msg::HintTimeUnparsable => match lang {
            Language::Ru => "Не понял время. Формат: 09:30.",
            Language::En => "I couldn't read that time. Format: 09:30.",
            Language::He => "לא הבנתי את השעה. פורמט: 09:30.",
        },
        Msg::AskPhotoMenu => match lang {
            Language::Ru => "Хотите прислать фото вещей? Это уточнит оценку.",
            Language::En => "Would you like to send photos of the items? It sharpens the estimate.",
            Language::He => "רוצים לשלוח תמונות של הפריטים? זה מדייק את ההצעה.",
        },
        Msg::PhotoWaitPrompt => match lang {
            Language::Ru => "Присылайте фото. Когда закончите — нажмите «Готово».",
            Language::En => "Send the photos. Tap \"Done\" when you finish.",
            Language::He => "שלחו את התמונות. בסיום לחצו ״סיום״.",
        },
        Msg::PhotoReceived => match lang {
            Language::Ru => "Фото получено. Ещё или «Готово»?",
            Language::En => "Got it. More photos, or \"Done\"?",
            Language::He => "התקבל. עוד תמונות, או ״סיום״?",
        },
        Msg::AskExtras => match lang {
            Language::Ru => "Нужны дополнительные услуги?",
            Language::En => "Any additional services?",
            Language::He => "צריכים שירותים נוספים?",
        },
        Msg::EstimateRange => match lang {
            Language::Ru => "Предварительная оценка: {min}–{max} {currency}. Оформляем заявку?",
            Language::En => "Preliminary estimate: {min}–{max} {currency}. Shall we book it?",
            Language::He => "הערכה ראשונית: {min}–{max} {currency}. נסגור הזמנה?",
        },
        Msg::EstimateSuppressed => match lang {
            Language::Ru => "Мы уточним стоимость и свяжемся с вами. Оформляем заявку?",
            Language::En => "We'll confirm the price and get back to you. Shall we book it?",
            Language::He => "נאשר את המחיר ונחזור אליכם. נסגור הזמנה?",
        },
        Msg::EstimateHidden => match lang {
            Language::Ru => "Стоимость уточнит оператор. Оформляем заявку?",
            Language::En => "The operator will confirm the price. Shall we book it?",
            Language::He => "המחיר יאושר על ידי המוקד. נסגור הזמנה?",
        },
        Msg::HintEstimateChoice => match lang {
            Language::Ru => "Нажмите «Да», чтобы оформить, или «Сначала», чтобы начать заново.",
            Language::En => "Tap \"Yes\" to book, or \"Start over\" to begin again.",
            Language::He => "לחצו ״כן״ כדי לסגור, או ״מחדש״ כדי להתחיל שוב.",
        },
        Msg::DoneThanks => match lang {
            Language::Ru => "Спасибо! Заявка принята, оператор свяжется с вами в ближайшее время.",
            Language::En => "Thank you! Your request is in — an operator will contact you shortly.",
            Language::He => "תודה! הבקשה התקבלה — נציג ייצור קשר בקרוב.",
        },
        Msg::HintPickupCount => match lang {
            Language::Ru => "Выберите 1, 2 или 3 адреса загрузки.",
            Language::En => "Please choose 1, 2 or 3 pickup addresses.",
            Language::He => "בחרו 1, 2 או 3 כתובות איסוף.",
        },
        Msg::HintVolume => match lang {
            Language::Ru => "Выберите один из вариантов объёма.",
            Language::En => "Please pick one of the volume options.",
            Language::He => "בחרו אחת מאפשרויות ההיקף.",
        },
        Msg::HintUnknown => match lang {
            Language::Ru => "Не понял. Попробуйте ещё раз или нажмите одну из кнопок.",
            Language::En => "Sorry, I didn't get that. Try again or use one of the buttons.",
            Language::He => "לא הבנתי. נסו שוב או השתמשו באחד הכפתורים.",
        },
    }
}

/// Localized label for a button payload.
pub fn button_label(lang: Language, payload: &str) -> &'static str {
    match payload {
        "yes" => match lang {
            Language::Ru => "Да",
            Language::En => "Yes",
            Language::He => "כן",
        },
        "no" => match lang {
            Language::Ru => "Нет",
            Language::En => "No",
            Language::He => "לא",
        },
        "reset" => match lang {
            Language::Ru => "Сначала",
            Language::En => "Start over",
            Language::He => "מחדש",
        },
        "done_photos" => match lang {
            Language::Ru => "Готово",
            Language::En => "Done",
            Language::He => "סיום",
        },
        "tomorrow" => match lang {
            Language::Ru => "Завтра",
            Language::En => "Tomorrow",
            Language::He => "מחר",
        },
        "this_week" => match lang {
            Language::Ru => "На этой неделе",
            Language::En => "This week",
            Language::He => "השבוע",
        },
        "specific" => match lang {
            Language::Ru => "Конкретная дата",
            Language::En => "Specific date",
            Language::He => "תאריך מסוים",
        },
        "morning" => match lang {
            Language::Ru => "Утро",
            Language::En => "Morning",
            Language::He => "בוקר",
        },
        "day" => match lang {
            Language::Ru => "День",
            Language::En => "Daytime",
            Language::He => "צהריים",
        },
        "evening" => match lang {
            Language::Ru => "Вечер",
            Language::En => "Evening",
            Language::He => "ערב",
        },
        "exact" => match lang {
            Language::Ru => "Точное время",
            Language::En => "Exact time",
            Language::He => "שעה מדויקת",
        },
        "upload" => match lang {
            Language::Ru => "Прислать фото",
            Language::En => "Send photos",
            Language::He => "לשלוח תמונות",
        },
        "skip" => match lang {
            Language::Ru => "Без фото",
            Language::En => "Skip",
            Language::He => "לדלג",
        },
        "movers" => match lang {
            Language::Ru => "Грузчики",
            Language::En => "Movers",
            Language::He => "סבלים",
        },
        "assembly" => match lang {
            Language::Ru => "Разборка/сборка",
            Language::En => "Disassembly/assembly",
            Language::He => "פירוק/הרכבה",
        },
        "packing" => match lang {
            Language::Ru => "Упаковка",
            Language::En => "Packing",
            Language::He => "אריזה",
        },
        "extras_done" => match lang {
            Language::Ru => "Продолжить",
            Language::En => "Continue",
            Language::He => "להמשיך",
        },
        "extras_none" => match lang {
            Language::Ru => "Ничего не нужно",
            Language::En => "Nothing needed",
            Language::He => "לא צריך",
        },
        "small" => match lang {
            Language::Ru => "Несколько вещей",
            Language::En => "A few items",
            Language::He => "כמה פריטים",
        },
        "medium" => match lang {
            Language::Ru => "1–2 комнаты",
            Language::En => "1–2 rooms",
            Language::He => "1–2 חדרים",
        },
        "large" => match lang {
            Language::Ru => "3–4 комнаты",
            Language::En => "3–4 rooms",
            Language::He => "3–4 חדרים",
        },
        "xl" => match lang {
            Language::Ru => "Большая квартира / дом",
            Language::En => "Large apartment / house",
            Language::He => "דירה גדולה / בית",
        },
        // Numeric payloads label themselves.
        "1" => "1",
        "2" => "2",
        "3" => "3",
        // Unknown payloads should never reach rendering; show something inert.
        _ => "•",
    }
}

/// Convenience constructor pairing a payload with its localized label.
pub fn button(lang: Language, payload: &str) -> Button {
    Button::new(payload, button_label(lang, payload))
}
