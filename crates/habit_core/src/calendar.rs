use time::Date;

/// Months are indexed 0..=11 throughout, matching the stored cell keys.
pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Standard Gregorian day count. A month index outside 0..=11 is a caller
/// contract violation.
pub fn days_in_month(year: i32, month: u8) -> u8 {
    debug_assert!(month < 12);
    match month {
        0 | 2 | 4 | 6 | 7 | 9 | 11 => 31,
        3 | 5 | 8 | 10 => 30,
        _ => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

pub fn is_valid_day(year: i32, month: u8, day: u8) -> bool {
    month < 12 && day >= 1 && day <= days_in_month(year, month)
}

pub fn is_today(year: i32, month: u8, day: u8, today: Date) -> bool {
    year == today.year() && month == u8::from(today.month()) - 1 && day == today.day()
}

/// Canonical cell key for one calendar day, e.g. `"2024-0-15"` for
/// January 15th 2024.
pub fn cell_key(year: i32, month: u8, day: u8) -> String {
    format!("{year}-{month}-{day}")
}

pub fn parse_cell_key(key: &str) -> Option<(i32, u8, u8)> {
    let mut parts = key.splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u8 = parts.next()?.parse().ok()?;
    let day: u8 = parts.next()?.parse().ok()?;
    if month > 11 {
        return None;
    }
    Some((year, month, day))
}
