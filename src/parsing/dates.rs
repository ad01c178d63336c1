//! Day-first timestamp parsing and conversions between chrono values and polars columns.

use crate::datasets::error::DataError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use polars::prelude::{Column, DataFrame, DataType, TimeUnit};

const DATETIME_FORMATS: [&str; 10] = [
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: [&str; 3] = ["%d.%m.%Y", "%d/%m/%Y", "%Y-%m-%d"];

/// Parses a timestamp the way the Zurich sources write them: day before month
/// (`31.12.2016 23:00`), or ISO 8601 (`2016-12-31T23:00:00`, with or without offset).
/// Offsets are dropped and the local wall-clock time is kept.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use zurich_bikes::parse_day_first;
///
/// let parsed = parse_day_first("03.04.2016 07:30").unwrap();
/// assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2016, 4, 3).unwrap());
/// assert!(parse_day_first("yesterday").is_none());
/// ```
pub fn parse_day_first(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

/// Parses every value of the string column `column` with [`parse_day_first`].
pub(crate) fn parse_index_column(
    frame: &DataFrame,
    column: &str,
    table: &str,
) -> Result<Vec<NaiveDateTime>, DataError> {
    let raw = frame
        .column(column)
        .map_err(|_| DataError::MissingColumn {
            table: table.to_string(),
            column: column.to_string(),
        })?
        .cast(&DataType::String)?;

    raw.str()?
        .into_iter()
        .map(|value| {
            let value = value.unwrap_or_default();
            parse_day_first(value).ok_or_else(|| DataError::DateParse {
                table: table.to_string(),
                value: value.to_string(),
            })
        })
        .collect()
}

pub(crate) fn datetime_column(name: &str, values: Vec<NaiveDateTime>) -> Column {
    Column::new(name.into(), values)
}

/// Reads a datetime column back into chrono values, whatever its time unit.
pub(crate) fn column_datetimes(
    frame: &DataFrame,
    column: &str,
) -> Result<Vec<Option<NaiveDateTime>>, DataError> {
    let millis = frame
        .column(column)?
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        .cast(&DataType::Int64)?;
    Ok(millis
        .i64()?
        .into_iter()
        .map(|ms| {
            ms.and_then(DateTime::from_timestamp_millis)
                .map(|dt| dt.naive_utc())
        })
        .collect())
}

/// Reads a date column back into chrono values.
pub(crate) fn column_dates(
    frame: &DataFrame,
    column: &str,
) -> Result<Vec<Option<NaiveDate>>, DataError> {
    let days = frame.column(column)?.cast(&DataType::Int32)?;
    Ok(days
        .i32()?
        .into_iter()
        .map(|day| {
            day.and_then(|day| {
                DateTime::UNIX_EPOCH
                    .date_naive()
                    .checked_add_signed(TimeDelta::days(i64::from(day)))
            })
        })
        .collect())
}
