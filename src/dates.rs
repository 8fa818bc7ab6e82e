use crate::cell::CellValue;
use chrono::{Duration, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // dd/mm/yyyy, dd-mm-yy, dd.mm.yyyy with an optional trailing time part
    static ref DAY_FIRST: Regex =
        Regex::new(r"^(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4}|\d{2})(?:[ T].*)?$").unwrap();
    // yyyy-mm-dd, also with an optional time part
    static ref YEAR_FIRST: Regex =
        Regex::new(r"^(\d{4})[/.\-](\d{1,2})[/.\-](\d{1,2})(?:[ T].*)?$").unwrap();
}

/// Parses a date written day-first (`dd/mm/yyyy`)
///
/// ISO dates are accepted as well. When the day-first reading is not a valid
/// calendar date but the month-first one is (`12/25/2024`), the month-first
/// reading wins. Anything else yields `None`; a bad date never raises.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use pap_tracker::dates::parse_day_first;
///
/// assert_eq!(parse_day_first("05/02/2024"), NaiveDate::from_ymd_opt(2024, 2, 5));
/// assert_eq!(parse_day_first("not a date"), None);
/// ```
pub fn parse_day_first(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(caps) = YEAR_FIRST.captures(s) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let caps = DAY_FIRST.captures(s)?;
    let first: u32 = caps[1].parse().ok()?;
    let second: u32 = caps[2].parse().ok()?;
    let year_text = &caps[3];
    let mut year: i32 = year_text.parse().ok()?;
    if year_text.len() == 2 {
        year += 2000;
    }

    NaiveDate::from_ymd_opt(year, second, first).or_else(|| NaiveDate::from_ymd_opt(year, first, second))
}

/// Converts a spreadsheet date serial (1900 date system) to a calendar date.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

/// Reads a date out of any cell; unparseable values become `None`.
///
/// Plain numbers are spreadsheet date serials whose cell lost its date format.
pub fn cell_to_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::Text(s) => parse_day_first(s),
        CellValue::Number(n) => excel_serial_to_date(*n),
        CellValue::Empty | CellValue::Bool(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_comes_first() {
        assert_eq!(parse_day_first("01/02/2024"), Some(ymd(2024, 2, 1)));
        assert_eq!(parse_day_first("1-2-2024"), Some(ymd(2024, 2, 1)));
        assert_eq!(parse_day_first("31.12.2023"), Some(ymd(2023, 12, 31)));
    }

    #[test]
    fn time_part_and_short_years() {
        assert_eq!(parse_day_first("15/03/2024 08:30"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_day_first("15/03/24"), Some(ymd(2024, 3, 15)));
    }

    #[test]
    fn iso_dates_are_accepted() {
        assert_eq!(parse_day_first("2024-01-25"), Some(ymd(2024, 1, 25)));
        assert_eq!(parse_day_first("2024-01-25 00:00:00"), Some(ymd(2024, 1, 25)));
    }

    #[test]
    fn month_first_fallback() {
        assert_eq!(parse_day_first("12/25/2024"), Some(ymd(2024, 12, 25)));
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_day_first(""), None);
        assert_eq!(parse_day_first("pendiente"), None);
        assert_eq!(parse_day_first("32/13/2024"), None);
        assert_eq!(parse_day_first("30/02/2024"), None);
    }

    #[test]
    fn serials_follow_the_1900_system() {
        assert_eq!(excel_serial_to_date(45292.0), Some(ymd(2024, 1, 1)));
        assert_eq!(excel_serial_to_date(45292.75), Some(ymd(2024, 1, 1)));
        assert_eq!(excel_serial_to_date(0.0), None);
    }

    #[test]
    fn cells_of_every_type() {
        assert_eq!(cell_to_date(&CellValue::Number(45292.0)), Some(ymd(2024, 1, 1)));
        assert_eq!(cell_to_date(&CellValue::Number(-3.0)), None);
        assert_eq!(cell_to_date(&CellValue::Bool(true)), None);
        assert_eq!(cell_to_date(&CellValue::Empty), None);
        assert_eq!(
            cell_to_date(&CellValue::Date(ymd(2024, 1, 1))),
            Some(ymd(2024, 1, 1))
        );
    }
}
