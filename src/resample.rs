use crate::datasets::error::DataError;
use crate::parsing::dates::{column_dates, column_datetimes};
use crate::types::schema::INDEX_COLUMN;
use chrono::{Datelike, NaiveDate, TimeDelta};
use polars::prelude::*;

/// How the rows falling into one bucket are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Sum,
    Mean,
}

/// The Sunday closing the week of `date`; Sundays map to themselves.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use zurich_bikes::week_ending;
///
/// let monday = NaiveDate::from_ymd_opt(2017, 1, 2).unwrap();
/// let sunday = NaiveDate::from_ymd_opt(2017, 1, 8).unwrap();
/// assert_eq!(week_ending(monday), sunday);
/// assert_eq!(week_ending(sunday), sunday);
/// ```
pub fn week_ending(date: NaiveDate) -> NaiveDate {
    let days_left = (7 - date.weekday().num_days_from_sunday()) % 7;
    date + TimeDelta::days(i64::from(days_left))
}

pub trait WeeklyResampleExt {
    /// Aggregates `columns` into weekly buckets labelled by the Sunday that ends each
    /// week, sorted chronologically. The result has a `Date` column of dtype `Date`
    /// followed by `columns`, with one row per week from the first bucket to the last.
    /// Weeks without rows sum to 0 and have a null mean.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NullIndex`] if a row has no timestamp, or a polars error
    /// if a column is missing or cannot be aggregated.
    fn resample_weekly(
        &self,
        columns: &[&str],
        aggregation: Aggregation,
    ) -> Result<DataFrame, DataError>;

    /// Pairs of bucket date and value of `column`, skipping nulls.
    fn series_points(&self, column: &str) -> Result<Vec<(NaiveDate, f64)>, DataError>;
}

/// Bucket labels of a sorted weekly frame, if it has any rows.
fn first_and_last(weekly: &DataFrame) -> Result<Option<(NaiveDate, NaiveDate)>, DataError> {
    let dates = column_dates(weekly, INDEX_COLUMN)?;
    Ok(dates.first().copied().flatten().zip(dates.last().copied().flatten()))
}

/// Every week label from `first` to `last`, both inclusive.
fn week_range(first: NaiveDate, last: NaiveDate) -> Result<DataFrame, DataError> {
    let weeks: Vec<NaiveDate> = first
        .iter_weeks()
        .take_while(|week| *week <= last)
        .collect();
    Ok(DataFrame::new(vec![Column::new(INDEX_COLUMN.into(), weeks)])?)
}

impl WeeklyResampleExt for DataFrame {
    fn resample_weekly(
        &self,
        columns: &[&str],
        aggregation: Aggregation,
    ) -> Result<DataFrame, DataError> {
        let weeks = column_datetimes(self, INDEX_COLUMN)?
            .into_iter()
            .map(|timestamp| timestamp.map(|t| week_ending(t.date())))
            .collect::<Option<Vec<NaiveDate>>>()
            .ok_or_else(|| DataError::NullIndex(format!("{:?}", columns)))?;

        let mut values = self.select(columns.iter().copied())?;
        values.insert_column(0, Column::new(INDEX_COLUMN.into(), weeks))?;

        let aggregations: Vec<Expr> = columns
            .iter()
            .map(|name| match aggregation {
                Aggregation::Sum => col(*name).sum(),
                Aggregation::Mean => col(*name).cast(DataType::Float64).mean(),
            })
            .collect();

        let weekly = values
            .lazy()
            .group_by([col(INDEX_COLUMN)])
            .agg(aggregations)
            .sort([INDEX_COLUMN], SortMultipleOptions::default())
            .collect()?;

        let Some((first, last)) = first_and_last(&weekly)? else {
            return Ok(weekly);
        };
        let mut buckets = week_range(first, last)?.lazy().left_join(
            weekly.lazy(),
            col(INDEX_COLUMN),
            col(INDEX_COLUMN),
        );
        if aggregation == Aggregation::Sum {
            let filled: Vec<Expr> = columns
                .iter()
                .map(|name| col(*name).fill_null(lit(0)))
                .collect();
            buckets = buckets.with_columns(filled);
        }
        Ok(buckets
            .sort([INDEX_COLUMN], SortMultipleOptions::default())
            .collect()?)
    }

    fn series_points(&self, column: &str) -> Result<Vec<(NaiveDate, f64)>, DataError> {
        let dates = column_dates(self, INDEX_COLUMN)?;
        let values = self.column(column)?.cast(&DataType::Float64)?;
        Ok(dates
            .into_iter()
            .zip(values.f64()?.into_iter())
            .filter_map(|(date, value)| Some((date?, value?)))
            .collect())
    }
}
