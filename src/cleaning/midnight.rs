//! Midnight convention normalizer.
//!
//! The archives record the end-of-day (24:00) reading as 00:00 of the
//! following day. Moving those instants back one calendar day restores
//! same-day grouping. Must run after timestamp parsing and before any
//! date-based grouping.
//!
//! A 00:00 reading on the first day of a dataset lands on the day before the
//! dataset starts, usually in the previous year. Callers filtering by
//! calendar year see that row; it is not suppressed here.

use chrono::{Days, NaiveDateTime, Timelike};

/// Shift an hour-0 timestamp to the previous calendar day, time unchanged
pub fn shift_midnight(timestamp: NaiveDateTime) -> NaiveDateTime {
    if timestamp.hour() != 0 {
        return timestamp;
    }
    timestamp
        .checked_sub_days(Days::new(1))
        .unwrap_or(timestamp)
}

/// Shift every hour-0 timestamp in place, returning how many moved
pub fn apply_midnight_shift(timestamps: &mut [NaiveDateTime]) -> usize {
    let mut shifted = 0;
    for timestamp in timestamps.iter_mut() {
        let moved = shift_midnight(*timestamp);
        if moved != *timestamp {
            *timestamp = moved;
            shifted += 1;
        }
    }
    shifted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_midnight_moves_to_previous_day() {
        assert_eq!(
            shift_midnight(at(2021, 1, 1, 0, 0)),
            at(2020, 12, 31, 0, 0)
        );
        assert_eq!(shift_midnight(at(2024, 3, 1, 0, 0)), at(2024, 2, 29, 0, 0));
    }

    #[test]
    fn test_other_hours_untouched() {
        assert_eq!(shift_midnight(at(2021, 1, 1, 1, 0)), at(2021, 1, 1, 1, 0));
        assert_eq!(shift_midnight(at(2021, 1, 1, 23, 0)), at(2021, 1, 1, 23, 0));
    }

    #[test]
    fn test_whole_hour_zero_is_shifted() {
        assert_eq!(shift_midnight(at(2021, 6, 2, 0, 30)), at(2021, 6, 1, 0, 30));
    }

    #[test]
    fn test_apply_counts_shifted_rows() {
        let mut timestamps = vec![at(2021, 1, 1, 0, 0), at(2021, 1, 1, 1, 0), at(2021, 1, 2, 0, 0)];
        assert_eq!(apply_midnight_shift(&mut timestamps), 2);
        assert_eq!(
            timestamps,
            vec![at(2020, 12, 31, 0, 0), at(2021, 1, 1, 1, 0), at(2021, 1, 1, 0, 0)]
        );
    }
}
