//! Column names of the canonical tables and of the raw source files.

/// Name of the timestamp column every canonical table is indexed by.
pub const INDEX_COLUMN: &str = "Date";

/// Value columns of a bike count table, in order.
pub const BIKE_COLUMNS: [&str; 3] = ["North", "South", "Total"];

/// Value columns of a weather table, in order.
pub const WEATHER_COLUMNS: [&str; 5] = ["Temp", "Windchill", "Rain", "Radiation", "Humidity"];

pub(crate) const STATION_COLUMN: &str = "fk_zaehler";
pub(crate) const NORTHBOUND_COLUMN: &str = "velo_in";
pub(crate) const SOUTHBOUND_COLUMN: &str = "velo_out";

/// Names given positionally to the non-index columns of the 2015 file.
pub(crate) const COLUMNS_2015: [&str; 6] = [
    "Objectid",
    "fk_zaehler",
    "velo_in",
    "velo_out",
    "fuss_in",
    "fuss_out",
];

/// The raw files switched from `Datum` to `datum` in 2016.
pub(crate) fn bike_index_column(year: i32) -> &'static str {
    if year >= 2016 {
        "datum"
    } else {
        "Datum"
    }
}
