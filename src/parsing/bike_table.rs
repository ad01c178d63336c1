use crate::datasets::error::DataError;
use crate::parsing::dates::{datetime_column, parse_index_column};
use crate::types::schema::{
    bike_index_column, BIKE_COLUMNS, COLUMNS_2015, INDEX_COLUMN, NORTHBOUND_COLUMN,
    SOUTHBOUND_COLUMN, STATION_COLUMN,
};
use log::warn;
use polars::prelude::*;
use std::path::Path;

/// Loads a raw counter CSV into a frame indexed by `Date`.
///
/// The index column is `datum` from 2016 on and `Datum` before, parsed day-first. The
/// 2015 file uses its own column names; they are replaced positionally with the names
/// of the later files. A 2015 file with a different column count is reported as a
/// [`DataError::SchemaMismatch`] rather than renamed blindly.
pub fn load_bike_table(path: &Path, year: i32) -> Result<DataFrame, DataError> {
    let table = path.display().to_string();
    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| DataError::CsvRead {
            path: path.to_path_buf(),
            source: e,
        })?;

    let index_column = bike_index_column(year);
    let dates = parse_index_column(&df, index_column, &table)?;
    df.drop_in_place(index_column)?;

    if year == 2015 {
        if df.width() != COLUMNS_2015.len() {
            warn!(
                "Column count ({}) of {} does not match the {} columns expected for 2015",
                df.width(),
                table,
                COLUMNS_2015.len()
            );
            return Err(DataError::SchemaMismatch {
                path: path.to_path_buf(),
                expected: COLUMNS_2015.len(),
                found: df.width(),
            });
        }
        df.set_column_names(COLUMNS_2015.iter().copied())?;
    }

    df.insert_column(0, datetime_column(INDEX_COLUMN, dates))?;
    Ok(df)
}

/// Reduces a raw counter table to the bicycle counts of one station.
///
/// Output columns are `Date`, `North` (`velo_in`), `South` (`velo_out`) and
/// `Total = North + South`. A station without rows yields an empty frame.
pub fn select_station(raw: &DataFrame, location: &str) -> Result<DataFrame, DataError> {
    for column in [STATION_COLUMN, NORTHBOUND_COLUMN, SOUTHBOUND_COLUMN] {
        if raw.column(column).is_err() {
            return Err(DataError::MissingColumn {
                table: format!("bike counts for station {}", location),
                column: column.to_string(),
            });
        }
    }

    let [north, south, total] = BIKE_COLUMNS;
    let frame = raw
        .clone()
        .lazy()
        .filter(col(STATION_COLUMN).cast(DataType::String).eq(lit(location)))
        .select([
            col(INDEX_COLUMN),
            col(NORTHBOUND_COLUMN).cast(DataType::Int64).alias(north),
            col(SOUTHBOUND_COLUMN).cast(DataType::Int64).alias(south),
        ])
        .with_column((col(north) + col(south)).alias(total))
        .collect()?;
    Ok(frame)
}
