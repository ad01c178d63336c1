//! The data-access client: downloads raw files on demand, parses them into canonical
//! frames, memoizes the results and hands out the plot builders.

use crate::datasets::content_store::{ContentStore, Freshness};
use crate::datasets::error::DataError;
use crate::datasets::fetcher::{Fetch, HttpFetcher};
use crate::datasets::memo::{Memo, DEFAULT_MEMO_CAPACITY};
use crate::parsing::bike_table::{load_bike_table, select_station};
use crate::parsing::weather_table::load_weather_table;
use crate::plotting::plot::{Plot, PlotKind};
use crate::types::dataset::DatasetKey;
use crate::utils::user_cache_dir;
use bon::bon;
use log::info;
use polars::frame::DataFrame;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tokio::task;

/// Client for the Zurich bicycle counter and Mythenquai weather datasets.
///
/// Raw files are kept in the data directory and reused across runs. Parsed tables are
/// kept in memory, one bounded LRU memo per table kind, for as long as the client lives.
///
/// # Examples
///
/// ```no_run
/// # use zurich_bikes::{DataError, ZurichData};
/// # async fn run() -> Result<(), DataError> {
/// let data = ZurichData::with_user_cache()?;
/// let velo = data.get_velo_data("ECO09113499", 2017).await?;
/// println!("{}", velo.head(Some(5)));
/// # Ok(())
/// # }
/// ```
pub struct ZurichData<F = HttpFetcher> {
    store: ContentStore<F>,
    raw_bikes: Memo<(String, i32)>,
    velo: Memo<(String, i32)>,
    weather: Memo<i32>,
}

#[bon]
impl<F: Fetch> ZurichData<F> {
    /// Builds a client around `fetcher`.
    ///
    /// * `.data_dir(path)`: where raw files are stored, the working directory by default.
    /// * `.memo_capacity(n)`: entries per memo, 10 by default.
    /// * `.freshness(f)`: when stored files are downloaded again, never by default.
    #[builder]
    pub fn new(
        fetcher: F,
        #[builder(into)] data_dir: Option<PathBuf>,
        memo_capacity: Option<NonZeroUsize>,
        freshness: Option<Freshness>,
    ) -> Self {
        let data_dir = data_dir.unwrap_or_else(|| PathBuf::from("."));
        let capacity = memo_capacity.unwrap_or(DEFAULT_MEMO_CAPACITY);
        Self {
            store: ContentStore::new(data_dir, fetcher).with_freshness(freshness.unwrap_or_default()),
            raw_bikes: Memo::new("raw bike counts", capacity),
            velo: Memo::new("velo", capacity),
            weather: Memo::new("weather", capacity),
        }
    }

    pub fn store(&self) -> &ContentStore<F> {
        &self.store
    }

    /// Bicycle counts of one counting station for one year.
    ///
    /// Columns are `Date`, `North`, `South` and `Total`, where `Total = North + South`
    /// on every row. A station without counts yields an empty frame.
    ///
    /// # Errors
    ///
    /// [`DataError::UnsupportedYear`] for years outside 2014 to 2018, checked before
    /// anything is downloaded. Download and parse failures are passed through.
    pub async fn get_velo_data(&self, location: &str, year: i32) -> Result<DataFrame, DataError> {
        let key = DatasetKey::bikes(year)?;
        self.velo
            .get_or_try_insert_with((location.to_string(), year), || async move {
                let raw = self.raw_bike_table(location, key).await?;
                let velo = select_station(&raw, location)?;
                info!("Selected {} rows of {} for station {}", velo.height(), key, location);
                Ok::<_, DataError>(velo)
            })
            .await
    }

    /// Weather measurements of the Mythenquai station for one year.
    ///
    /// Columns are `Date`, `Temp`, `Windchill`, `Rain`, `Radiation` and `Humidity`,
    /// with `Date` strictly increasing.
    pub async fn get_weather_data(&self, year: i32) -> Result<DataFrame, DataError> {
        let key = DatasetKey::weather(year);
        self.weather
            .get_or_try_insert_with(year, || async move {
                let path = self.store.ensure_local_copy(&key).await?;
                task::spawn_blocking(move || load_weather_table(&path)).await?
            })
            .await
    }

    /// Weekly northbound, southbound and total riders at one station.
    pub fn plot_by_year(&self) -> Plot<'_, F> {
        Plot::new(self, PlotKind::ByYear)
    }

    /// Weekly mean temperature with weekly rain on a secondary axis.
    pub fn plot_weather(&self) -> Plot<'_, F> {
        Plot::new(self, PlotKind::Weather)
    }

    /// Weekly total riders at one station against weekly rain.
    pub fn plot_bike_weather(&self) -> Plot<'_, F> {
        Plot::new(self, PlotKind::BikeWeather)
    }

    async fn raw_bike_table(&self, location: &str, key: DatasetKey) -> Result<DataFrame, DataError> {
        self.raw_bikes
            .get_or_try_insert_with((location.to_string(), key.year()), || async move {
                let path = self.store.ensure_local_copy(&key).await?;
                let year = key.year();
                task::spawn_blocking(move || load_bike_table(&path, year)).await?
            })
            .await
    }
}

impl ZurichData<HttpFetcher> {
    /// HTTP client storing raw files in the working directory.
    pub fn new_http() -> Self {
        Self::builder().fetcher(HttpFetcher::new()).build()
    }

    /// HTTP client storing raw files in the platform cache directory, e.g.
    /// `~/.cache/zurich_bikes` on Linux.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::DataDirResolution`] if the platform has no cache directory.
    pub fn with_user_cache() -> Result<Self, DataError> {
        Ok(Self::builder()
            .fetcher(HttpFetcher::new())
            .data_dir(user_cache_dir()?)
            .build())
    }
}
