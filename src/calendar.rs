#[cfg(target_arch = "wasm32")]
use js_sys::Date;
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

use bevy::prelude::*;

/// Compact Jalali (Persian) calendar date type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Reflect)]
pub struct JalaliDate {
    pub year: i32,
    /// Calendar month, 1 (Farvardin) through 12 (Esfand).
    pub month: u32,
    pub day: u32,
}

impl JalaliDate {
    /// Creates a Jalali date if the values form a valid calendar day.
    pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        if !(1..=12).contains(&month) {
            return None;
        }
        if day == 0 || day > days_in_month(year, month) {
            return None;
        }
        Some(Self { year, month, day })
    }

    /// Creates a Jalali date from a zero-based month index (0 = Farvardin).
    pub fn from_month_index(year: i32, month_index: u32, day: u32) -> Option<Self> {
        Self::new(year, month_index + 1, day)
    }

    /// Zero-based month index of this date.
    pub fn month_index(&self) -> u32 {
        self.month - 1
    }
}

/// Whether the given Jalali year is a leap year (astronomical 33-year cycle).
pub fn is_jalali_leap_year(year: i32) -> bool {
    (25 * year + 11).rem_euclid(33) < 8
}

/// Number of days in the given Jalali month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1..=6 => 31,
        7..=11 => 30,
        12 if is_jalali_leap_year(year) => 30,
        12 => 29,
        _ => 30,
    }
}

/// Number of days in the given Jalali year.
pub fn days_in_year(year: i32) -> u32 {
    if is_jalali_leap_year(year) { 366 } else { 365 }
}

/// Display name for a Jalali month, 1-based.
pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "Farvardin",
        2 => "Ordibehesht",
        3 => "Khordad",
        4 => "Tir",
        5 => "Mordad",
        6 => "Shahrivar",
        7 => "Mehr",
        8 => "Aban",
        9 => "Azar",
        10 => "Dey",
        11 => "Bahman",
        12 => "Esfand",
        _ => "Unknown",
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn today_jalali_date() -> JalaliDate {
    let Ok(duration) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return JalaliDate {
            year: 1348,
            month: 10,
            day: 11,
        };
    };

    let days_since_epoch = (duration.as_secs() / 86_400) as i64;
    jalali_from_days(days_since_epoch)
}

#[cfg(target_arch = "wasm32")]
pub fn today_jalali_date() -> JalaliDate {
    let ms = Date::now();
    if !ms.is_finite() {
        return JalaliDate {
            year: 1348,
            month: 10,
            day: 11,
        };
    }

    let secs = (ms / 1000.0).floor() as i64;
    let days_since_epoch = secs / 86_400;
    jalali_from_days(days_since_epoch)
}

// Farvardin 1, 1349 fell on 1970-03-21, Unix day 79.
const EPOCH_ANCHOR_YEAR: i32 = 1349;
const EPOCH_ANCHOR_DAYS: i64 = 79;

/// Converts days since the Unix epoch into a Jalali date.
pub fn jalali_from_days(days_since_epoch: i64) -> JalaliDate {
    let mut year = EPOCH_ANCHOR_YEAR;
    let mut remaining = days_since_epoch - EPOCH_ANCHOR_DAYS;

    while remaining < 0 {
        year -= 1;
        remaining += days_in_year(year) as i64;
    }
    loop {
        let len = days_in_year(year) as i64;
        if remaining < len {
            break;
        }
        remaining -= len;
        year += 1;
    }

    let mut month = 1u32;
    while remaining >= days_in_month(year, month) as i64 {
        remaining -= days_in_month(year, month) as i64;
        month += 1;
    }

    JalaliDate {
        year,
        month,
        day: remaining as u32 + 1,
    }
}

/// Converts a Jalali date into days since the Unix epoch.
pub fn days_from_jalali(date: JalaliDate) -> i64 {
    let mut days = EPOCH_ANCHOR_DAYS;
    if date.year >= EPOCH_ANCHOR_YEAR {
        for year in EPOCH_ANCHOR_YEAR..date.year {
            days += days_in_year(year) as i64;
        }
    } else {
        for year in date.year..EPOCH_ANCHOR_YEAR {
            days -= days_in_year(year) as i64;
        }
    }
    for month in 1..date.month {
        days += days_in_month(date.year, month) as i64;
    }
    days + date.day as i64 - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leap_years_follow_the_33_year_cycle() {
        for year in [1375, 1379, 1383, 1387, 1391, 1395, 1399, 1403, 1408] {
            assert!(is_jalali_leap_year(year), "{year} should be leap");
        }
        for year in [1398, 1400, 1401, 1402, 1404, 1405, 1406, 1407] {
            assert!(!is_jalali_leap_year(year), "{year} should not be leap");
        }
    }

    #[test]
    fn month_lengths() {
        for month in 1..=6 {
            assert_eq!(days_in_month(1402, month), 31);
        }
        for month in 7..=11 {
            assert_eq!(days_in_month(1402, month), 30);
        }
        assert_eq!(days_in_month(1403, 12), 30);
        assert_eq!(days_in_month(1402, 12), 29);
    }

    #[test]
    fn new_rejects_invalid_dates() {
        assert!(JalaliDate::new(1402, 0, 1).is_none());
        assert!(JalaliDate::new(1402, 13, 1).is_none());
        assert!(JalaliDate::new(1402, 7, 0).is_none());
        assert!(JalaliDate::new(1402, 7, 31).is_none());
        assert!(JalaliDate::new(1402, 12, 30).is_none());
        assert!(JalaliDate::new(1403, 12, 30).is_some());
    }

    #[test]
    fn month_index_round_trip() {
        let date = JalaliDate::from_month_index(1403, 11, 30).expect("valid date");
        assert_eq!(date.month, 12);
        assert_eq!(date.month_index(), 11);
        assert_eq!(month_name(date.month), "Esfand");
    }

    #[test]
    fn epoch_conversion_anchors() {
        assert_eq!(
            jalali_from_days(0),
            JalaliDate {
                year: 1348,
                month: 10,
                day: 11
            }
        );
        assert_eq!(
            jalali_from_days(EPOCH_ANCHOR_DAYS),
            JalaliDate {
                year: 1349,
                month: 1,
                day: 1
            }
        );
        assert_eq!(
            jalali_from_days(EPOCH_ANCHOR_DAYS - 1),
            JalaliDate {
                year: 1348,
                month: 12,
                day: 29
            }
        );
    }

    #[test]
    fn day_conversion_round_trips() {
        for days in [-400, -1, 0, 79, 10_000, 19_723, 20_600] {
            let date = jalali_from_days(days);
            assert_eq!(days_from_jalali(date), days, "round trip for {date:?}");
        }
    }

    #[test]
    fn month_names_are_exhaustive() {
        for month in 1..=12 {
            assert_ne!(month_name(month), "Unknown");
        }
        assert_eq!(month_name(1), "Farvardin");
        assert_eq!(month_name(13), "Unknown");
    }
}
