mod datasets;
mod error;
mod parsing;
mod plotting;
mod resample;
mod types;
mod utils;
mod zurich;

#[cfg(test)]
mod testing;

pub use error::BikesError;
pub use zurich::ZurichData;

pub use datasets::content_store::{ContentStore, Freshness};
pub use datasets::error::{DataError, ErrorKind};
pub use datasets::fetcher::{Fetch, HttpFetcher};
pub use datasets::memo::{Memo, DEFAULT_MEMO_CAPACITY};

pub use types::dataset::*;
pub use types::schema::{BIKE_COLUMNS, INDEX_COLUMN, WEATHER_COLUMNS};

pub use parsing::bike_table::{load_bike_table, select_station};
pub use parsing::dates::parse_day_first;
pub use parsing::weather_table::load_weather_table;

pub use resample::{week_ending, Aggregation, WeeklyResampleExt};

pub use plotting::chart::{Axis, Chart, LegendPosition, Series};
pub use plotting::error::PlotError;
pub use plotting::plot::{ParameterSpace, Plot, PlotKind, PlotParams, PLOT_YEARS, STATIONS};
pub use plotting::render::{FileRenderer, Render};

pub use utils::user_cache_dir;
