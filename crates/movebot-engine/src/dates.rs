use chrono::{Datelike, Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use movebot_core::config::MAX_BOOKING_HORIZON_DAYS;
use movebot_core::types::Language;

/// Why a date input was rejected. These map 1:1 to localized hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateReject {
    TooSoon,
    TooFar,
    Unparsable,
}

static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").unwrap());
static NUMERIC_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})[./](\d{1,2})(?:[./](\d{2,4}))?").unwrap());

static TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2})[:.](\d{2})$").unwrap());

/// Parse a user-supplied date and validate the booking window.
///
/// Accepts relative words (today/tomorrow in all three languages), ISO
/// dates, and `dd.mm[.yyyy]` / `dd/mm[/yyyy]`. A year-less date that already
/// passed this year rolls over to the next year.
///
/// Window: `today` is accepted; anything earlier is `TooSoon`; anything past
/// `today + 180 days` is `TooFar`.
pub fn parse_date(
    text: &str,
    language: Language,
    today: NaiveDate,
) -> Result<NaiveDate, DateReject> {
    let lower = text.trim().to_lowercase();

    if let Some(date) = relative_date(&lower, language, today) {
        return validate_window(date, today);
    }

    if let Some(caps) = ISO_DATE.captures(&lower) {
        let (y, m, d) = (
            caps[1].parse::<i32>().unwrap_or(0),
            caps[2].parse::<u32>().unwrap_or(0),
            caps[3].parse::<u32>().unwrap_or(0),
        );
        let date = NaiveDate::from_ymd_opt(y, m, d).ok_or(DateReject::Unparsable)?;
        return validate_window(date, today);
    }

    if let Some(caps) = NUMERIC_DATE.captures(&lower) {
        let d = caps[1].parse::<u32>().unwrap_or(0);
        let m = caps[2].parse::<u32>().unwrap_or(0);
        let date = match caps.get(3) {
            Some(year) => {
                let mut y = year.as_str().parse::<i32>().unwrap_or(0);
                if y < 100 {
                    y += 2000;
                }
                NaiveDate::from_ymd_opt(y, m, d).ok_or(DateReject::Unparsable)?
            }
            None => {
                let this_year = NaiveDate::from_ymd_opt(today.year(), m, d)
                    .ok_or(DateReject::Unparsable)?;
                if this_year < today {
                    NaiveDate::from_ymd_opt(today.year() + 1, m, d)
                        .ok_or(DateReject::Unparsable)?
                } else {
                    this_year
                }
            }
        };
        return validate_window(date, today);
    }

    Err(DateReject::Unparsable)
}

fn relative_date(lower: &str, language: Language, today: NaiveDate) -> Option<NaiveDate> {
    let words: &[(&str, i64)] = match language {
        Language::Ru => &[("сегодня", 0), ("завтра", 1), ("послезавтра", 2)],
        Language::He => &[("היום", 0), ("מחר", 1), ("מחרתיים", 2)],
        Language::En => &[("today", 0), ("tomorrow", 1)],
    };
    words
        .iter()
        .find(|(word, _)| lower.contains(word))
        .map(|(_, days)| today + Duration::days(*days))
}

fn validate_window(date: NaiveDate, today: NaiveDate) -> Result<NaiveDate, DateReject> {
    if date < today {
        return Err(DateReject::TooSoon);
    }
    if date > today + Duration::days(MAX_BOOKING_HORIZON_DAYS) {
        return Err(DateReject::TooFar);
    }
    Ok(date)
}

/// Parse an exact time of day, `HH:MM` or `HH.MM`. Returns `(hour, minute)`.
pub fn parse_time(text: &str) -> Option<(u8, u8)> {
    let caps = TIME.captures(text.trim())?;
    let hour: u8 = caps[1].parse().ok()?;
    let minute: u8 = caps[2].parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()
    }

    #[test]
    fn today_is_accepted() {
        assert_eq!(parse_date("2026-08-01", Language::En, today()), Ok(today()));
    }

    #[test]
    fn yesterday_is_too_soon() {
        assert_eq!(
            parse_date("2026-07-31", Language::En, today()),
            Err(DateReject::TooSoon)
        );
    }

    #[test]
    fn horizon_boundary() {
        // today + 180 accepted, +181 rejected.
        assert_eq!(
            parse_date("2027-01-28", Language::En, today()),
            Ok(NaiveDate::from_ymd_opt(2027, 1, 28).unwrap())
        );
        assert_eq!(
            parse_date("2027-01-29", Language::En, today()),
            Err(DateReject::TooFar)
        );
    }

    #[test]
    fn relative_words_in_three_languages() {
        let tomorrow = NaiveDate::from_ymd_opt(2026, 8, 2).unwrap();
        assert_eq!(parse_date("завтра", Language::Ru, today()), Ok(tomorrow));
        assert_eq!(parse_date("מחר", Language::He, today()), Ok(tomorrow));
        assert_eq!(parse_date("tomorrow", Language::En, today()), Ok(tomorrow));
        assert_eq!(parse_date("сегодня", Language::Ru, today()), Ok(today()));
    }

    #[test]
    fn numeric_date_with_year() {
        assert_eq!(
            parse_date("15.08.2026", Language::Ru, today()),
            Ok(NaiveDate::from_ymd_opt(2026, 8, 15).unwrap())
        );
        assert_eq!(
            parse_date("15/08/26", Language::En, today()),
            Ok(NaiveDate::from_ymd_opt(2026, 8, 15).unwrap())
        );
    }

    #[test]
    fn yearless_past_date_rolls_to_next_year() {
        // 15.01 already passed in 2026 — rolls to 2027, still in window.
        assert_eq!(
            parse_date("15.01", Language::Ru, today()),
            Ok(NaiveDate::from_ymd_opt(2027, 1, 15).unwrap())
        );
    }

    #[test]
    fn garbage_is_unparsable() {
        assert_eq!(
            parse_date("when the movers feel like it", Language::En, today()),
            Err(DateReject::Unparsable)
        );
    }

    #[test]
    fn invalid_calendar_date_is_unparsable() {
        assert_eq!(
            parse_date("32.13.2026", Language::Ru, today()),
            Err(DateReject::Unparsable)
        );
    }

    #[test]
    fn time_parsing() {
        assert_eq!(parse_time("09:30"), Some((9, 30)));
        assert_eq!(parse_time("9.05"), Some((9, 5)));
        assert_eq!(parse_time("24:00"), None);
        assert_eq!(parse_time("morning"), None);
    }
}
