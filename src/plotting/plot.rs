//! The three chart builders: bike counts per week, weather per week, and bike counts
//! against rain.

use crate::datasets::error::DataError;
use crate::datasets::fetcher::Fetch;
use crate::error::BikesError;
use crate::plotting::chart::{Axis, Chart, LegendPosition, Series};
use crate::plotting::error::PlotError;
use crate::plotting::render::Render;
use crate::resample::{Aggregation, WeeklyResampleExt};
use crate::types::schema::BIKE_COLUMNS;
use crate::zurich::ZurichData;
use log::info;
use polars::frame::DataFrame;
use serde::Serialize;

/// Counting stations offered by the bike plots.
pub const STATIONS: [&str; 2] = ["ECO09113499", "Y2G12102806"];

/// Years offered by every plot.
pub const PLOT_YEARS: [i32; 4] = [2015, 2016, 2017, 2018];

const DEFAULT_PLOT_YEAR: i32 = 2017;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlotKind {
    /// Weekly northbound, southbound and total riders at one station.
    ByYear,
    /// Weekly mean temperature with weekly rain on a secondary axis.
    Weather,
    /// Weekly total riders at one station with weekly rain on a secondary axis.
    BikeWeather,
}

impl PlotKind {
    pub fn uses_station(&self) -> bool {
        matches!(self, PlotKind::ByYear | PlotKind::BikeWeather)
    }

    pub fn slug(&self) -> &'static str {
        match self {
            PlotKind::ByYear => "by-year",
            PlotKind::Weather => "weather",
            PlotKind::BikeWeather => "bike-weather",
        }
    }
}

/// One pick of the plot parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlotParams {
    pub station: Option<String>,
    pub year: i32,
}

impl PlotParams {
    pub fn for_year(year: i32) -> Self {
        Self {
            station: None,
            year,
        }
    }

    pub fn for_station(station: impl Into<String>, year: i32) -> Self {
        Self {
            station: Some(station.into()),
            year,
        }
    }
}

/// The choices a host should offer for a plot, and what to preselect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSpace {
    /// Empty for plots that do not depend on a station.
    pub stations: Vec<&'static str>,
    pub years: Vec<i32>,
    pub defaults: PlotParams,
}

/// A chart builder bound to a data client.
///
/// Obtained from [`ZurichData::plot_by_year`], [`ZurichData::plot_weather`] or
/// [`ZurichData::plot_bike_weather`]. The host presents [`Plot::parameters`], then calls
/// [`Plot::render`] (or [`Plot::chart`] for the bare chart) with the user's pick.
pub struct Plot<'a, F> {
    data: &'a ZurichData<F>,
    kind: PlotKind,
}

impl<'a, F: Fetch> Plot<'a, F> {
    pub(crate) fn new(data: &'a ZurichData<F>, kind: PlotKind) -> Self {
        Self { data, kind }
    }

    pub fn kind(&self) -> PlotKind {
        self.kind
    }

    pub fn parameters(&self) -> ParameterSpace {
        let uses_station = self.kind.uses_station();
        ParameterSpace {
            stations: if uses_station { STATIONS.to_vec() } else { Vec::new() },
            years: PLOT_YEARS.to_vec(),
            defaults: PlotParams {
                station: uses_station.then(|| STATIONS[0].to_string()),
                year: DEFAULT_PLOT_YEAR,
            },
        }
    }

    /// Builds the chart for `params`, fetching and resampling as needed.
    ///
    /// # Errors
    ///
    /// [`PlotError::InvalidParameter`] for a station or year outside
    /// [`Plot::parameters`], otherwise whatever the data layer reports.
    pub async fn chart(&self, params: &PlotParams) -> Result<Chart, BikesError> {
        let year = checked_year(params.year)?;

        let chart = match self.kind {
            PlotKind::ByYear => {
                let station = self.checked_station(params)?;
                let weekly = self
                    .data
                    .get_velo_data(station, year)
                    .await?
                    .resample_weekly(&BIKE_COLUMNS, Aggregation::Sum)?;
                let series = BIKE_COLUMNS
                    .iter()
                    .map(|column| Ok(Series::new(*column, weekly.series_points(column)?)))
                    .collect::<Result<Vec<_>, DataError>>()?;
                Chart {
                    title: format!("Bicycles at {} in {}", station, year),
                    x_label: String::new(),
                    primary: Axis::new("", series),
                    secondary: None,
                    grid: false,
                }
            }
            PlotKind::Weather => {
                let weather = self.data.get_weather_data(year).await?;
                let temperature = weather
                    .resample_weekly(&["Temp"], Aggregation::Mean)?
                    .series_points("Temp")?;
                Chart {
                    title: format!("Weather at Mythenquai in {}", year),
                    x_label: String::new(),
                    primary: Axis::new("Temperature", vec![Series::new("Temp", temperature)])
                        .with_legend(LegendPosition::UpperLeft),
                    secondary: Some(rain_axis(&weather)?.with_legend(LegendPosition::Best)),
                    grid: false,
                }
            }
            PlotKind::BikeWeather => {
                let station = self.checked_station(params)?;
                let riders = self
                    .data
                    .get_velo_data(station, year)
                    .await?
                    .resample_weekly(&["Total"], Aggregation::Sum)?
                    .series_points("Total")?;
                let weather = self.data.get_weather_data(year).await?;
                Chart {
                    title: format!("Bicycles at {} and rain in {}", station, year),
                    x_label: String::new(),
                    primary: Axis::new("Riders", vec![Series::new("Total", riders)])
                        .with_legend(LegendPosition::UpperLeft),
                    secondary: Some(rain_axis(&weather)?.with_legend(LegendPosition::UpperRight)),
                    grid: true,
                }
            }
        };
        Ok(chart)
    }

    /// Builds the chart for `params` and hands it to `renderer`.
    pub async fn render(&self, params: &PlotParams, renderer: &impl Render) -> Result<(), BikesError> {
        let chart = self.chart(params).await?;
        renderer.render(&chart)?;
        info!("Rendered {} chart for {:?}", self.kind.slug(), params);
        Ok(())
    }

    fn checked_station<'p>(&self, params: &'p PlotParams) -> Result<&'p str, PlotError> {
        let station = params.station.as_deref().unwrap_or_default();
        if STATIONS.contains(&station) {
            Ok(station)
        } else {
            Err(PlotError::InvalidParameter {
                parameter: "station",
                value: station.to_string(),
                choices: STATIONS.join(", "),
            })
        }
    }
}

fn checked_year(year: i32) -> Result<i32, PlotError> {
    if PLOT_YEARS.contains(&year) {
        Ok(year)
    } else {
        Err(PlotError::InvalidParameter {
            parameter: "year",
            value: year.to_string(),
            choices: PLOT_YEARS.map(|y| y.to_string()).join(", "),
        })
    }
}

/// Weekly rain on an axis scaled to twice its maximum, which keeps the rain line in the
/// lower half of the chart, clear of the primary series.
fn rain_axis(weather: &DataFrame) -> Result<Axis, DataError> {
    let rain = Series::new(
        "Rain",
        weather
            .resample_weekly(&["Rain"], Aggregation::Sum)?
            .series_points("Rain")?,
    );
    let max = rain.max_value().filter(|max| *max > 0.0).unwrap_or(0.5);
    Ok(Axis::new("Precipitation", vec![rain]).with_range(0.0, max * 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CountingFetcher, BIKES_2017_CSV, WEATHER_2017_HTML};
    use crate::ErrorKind;
    use chrono::NaiveDate;

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 1, day).unwrap()
    }

    fn client(dir: &std::path::Path) -> ZurichData<CountingFetcher> {
        ZurichData::builder()
            .fetcher(
                CountingFetcher::with_bikes(2017, BIKES_2017_CSV).and_weather(2017, WEATHER_2017_HTML),
            )
            .data_dir(dir)
            .build()
    }

    #[test]
    fn test_parameter_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let data = client(dir.path());

        let by_year = data.plot_by_year().parameters();
        assert_eq!(by_year.stations, STATIONS.to_vec());
        assert_eq!(by_year.years, vec![2015, 2016, 2017, 2018]);
        assert_eq!(by_year.defaults, PlotParams::for_station("ECO09113499", 2017));

        let weather = data.plot_weather().parameters();
        assert!(weather.stations.is_empty());
        assert_eq!(weather.defaults, PlotParams::for_year(2017));

        let combined = data.plot_bike_weather().parameters();
        assert_eq!(combined.defaults, PlotParams::for_station("ECO09113499", 2017));
    }

    #[tokio::test]
    async fn test_by_year_sums_weekly() -> Result<(), BikesError> {
        let dir = tempfile::tempdir().unwrap();
        let data = client(dir.path());

        let chart = data
            .plot_by_year()
            .chart(&PlotParams::for_station("ECO09113499", 2017))
            .await?;

        let names: Vec<_> = chart.primary.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["North", "South", "Total"]);
        assert_eq!(chart.primary.series[0].points, vec![(jan(8), 16.0), (jan(15), 4.0)]);
        assert_eq!(chart.primary.series[2].points, vec![(jan(8), 22.0), (jan(15), 7.0)]);
        assert!(chart.secondary.is_none());
        assert!(chart.x_label.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_weather_rain_axis_is_twice_the_maximum() -> Result<(), BikesError> {
        let dir = tempfile::tempdir().unwrap();
        let data = client(dir.path());

        let chart = data.plot_weather().chart(&PlotParams::for_year(2017)).await?;

        assert_eq!(chart.primary.label, "Temperature");
        assert_eq!(chart.primary.legend, LegendPosition::UpperLeft);
        assert_eq!(chart.primary.series[0].points, vec![(jan(8), 3.0), (jan(15), -0.5)]);

        let rain = chart.secondary.expect("weather chart has a rain axis");
        assert_eq!(rain.label, "Precipitation");
        assert_eq!(rain.series[0].points, vec![(jan(8), 4.0), (jan(15), 3.0)]);
        assert_eq!(rain.range, Some((0.0, 8.0)));
        Ok(())
    }

    #[tokio::test]
    async fn test_bike_weather_shares_cached_data() -> Result<(), BikesError> {
        let dir = tempfile::tempdir().unwrap();
        let data = client(dir.path());
        let params = PlotParams::for_station("ECO09113499", 2017);

        data.plot_by_year().chart(&params).await?;
        data.plot_weather().chart(&PlotParams::for_year(2017)).await?;
        let chart = data.plot_bike_weather().chart(&params).await?;

        assert!(chart.grid);
        assert_eq!(chart.primary.label, "Riders");
        assert_eq!(chart.primary.series[0].points, vec![(jan(8), 22.0), (jan(15), 7.0)]);
        assert_eq!(chart.secondary.map(|axis| axis.range), Some(Some((0.0, 8.0))));
        assert_eq!(data.store().fetcher().calls(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_choices_outside_the_widget_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let data = client(dir.path());

        let err = data
            .plot_by_year()
            .chart(&PlotParams::for_station("ECO09113499", 2014))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = data
            .plot_bike_weather()
            .chart(&PlotParams::for_year(2017))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BikesError::Plot(PlotError::InvalidParameter { parameter: "station", .. })
        ));
        assert_eq!(data.store().fetcher().calls(), 0);
    }

    #[derive(Default)]
    struct RecordingRenderer {
        charts: std::sync::Mutex<Vec<Chart>>,
    }

    impl Render for RecordingRenderer {
        fn render(&self, chart: &Chart) -> Result<(), PlotError> {
            self.charts.lock().unwrap().push(chart.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_render_hands_chart_to_renderer() -> Result<(), BikesError> {
        let dir = tempfile::tempdir().unwrap();
        let data = client(dir.path());
        let renderer = RecordingRenderer::default();

        data.plot_weather()
            .render(&PlotParams::for_year(2017), &renderer)
            .await?;

        let charts = renderer.charts.lock().unwrap();
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].title, "Weather at Mythenquai in 2017");
        Ok(())
    }
}
