use super::*;
use crate::analysis::{daily_mean, monthly_mean, row_mean, year_month_pivot};
use crate::models::YearMonth;

/// Test that the 24:00 reading counts toward the day it closes
///
/// Purpose: Validate daily grouping on shifted midnight keys
/// Benefit: Daily means match the agency's hour-ending convention
#[test]
fn test_daily_mean_uses_shifted_keys() {
    // 2021-01-01 01:00 .. 23:00 plus the shifted 24:00 reading stored at 2021-01-01 00:00
    let table = hourly(
        &["S1"],
        vec![
            (at(2021, 1, 1, 0), vec![Some(40.0)]),
            (at(2021, 1, 1, 1), vec![Some(10.0)]),
            (at(2021, 1, 1, 23), vec![Some(10.0)]),
            (at(2021, 1, 2, 1), vec![Some(4.0)]),
        ],
    );

    let daily = daily_mean(&table);
    assert_eq!(daily.keys(), &[day(2021, 1, 1), day(2021, 1, 2)]);
    assert_eq!(daily.column("S1").unwrap(), &[Some(20.0), Some(4.0)]);
    assert_eq!(daily.index_name(), "Data");
}

#[test]
fn test_daily_mean_all_missing_day_is_missing() {
    let table = hourly(
        &["S1", "S2"],
        vec![
            (at(2021, 1, 1, 1), vec![None, Some(2.0)]),
            (at(2021, 1, 1, 2), vec![None, Some(4.0)]),
        ],
    );

    let daily = daily_mean(&table);
    assert_eq!(daily.column("S1").unwrap(), &[None]);
    assert_eq!(daily.column("S2").unwrap(), &[Some(3.0)]);
}

#[test]
fn test_monthly_mean_and_pivot() {
    let table = hourly(
        &["S1"],
        vec![
            (at(2020, 12, 5, 1), vec![Some(30.0)]),
            (at(2021, 1, 1, 1), vec![Some(10.0)]),
            (at(2021, 1, 20, 1), vec![Some(20.0)]),
            (at(2021, 3, 2, 1), vec![Some(6.0)]),
        ],
    );

    let monthly = monthly_mean(&table);
    assert_eq!(
        monthly.keys(),
        &[
            YearMonth { year: 2020, month: 12 },
            YearMonth { year: 2021, month: 1 },
            YearMonth { year: 2021, month: 3 },
        ]
    );
    assert_eq!(monthly.column("S1").unwrap(), &[Some(30.0), Some(15.0), Some(6.0)]);

    let pivot = year_month_pivot(&monthly, "S1").unwrap();
    assert_eq!(pivot.years, vec![2020, 2021]);
    assert_eq!(pivot.get(2020, 12), Some(30.0));
    assert_eq!(pivot.get(2021, 1), Some(15.0));
    assert_eq!(pivot.get(2021, 2), None);
    assert!(year_month_pivot(&monthly, "missing").is_none());
}

#[test]
fn test_row_mean_skips_missing() {
    let table = hourly(
        &["S1", "S2"],
        vec![
            (at(2021, 1, 1, 1), vec![Some(2.0), None]),
            (at(2021, 1, 1, 2), vec![Some(2.0), Some(6.0)]),
        ],
    );

    let mean = row_mean(&table, "mean");
    assert_eq!(mean.columns(), &["mean"]);
    assert_eq!(mean.column("mean").unwrap(), &[Some(2.0), Some(4.0)]);
}
