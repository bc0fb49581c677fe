//! Station aggregation and exceedance utilities.
//!
//! Everything here works on cleaned tables and is pure: inputs are
//! borrowed, new tables are returned. Daily grouping always uses the keys
//! as cleaning left them, after the midnight shift.

pub mod aggregate;
pub mod exceedance;
pub mod selection;

#[cfg(test)]
pub mod tests;

pub use crate::cleaning::merge_duplicate_columns;
pub use aggregate::{YearMonthPivot, daily_mean, monthly_mean, row_mean, year_month_pivot};
pub use exceedance::{
    ExceedanceSummary, Ranking, StationCount, YearlyExceedances, count_exceedances,
    rank_stations, yearly_exceedances,
};
pub use selection::{
    city_monthly_trend, drop_incomplete_rows, filter_years, rename_columns, select_cities,
    select_stations,
};
