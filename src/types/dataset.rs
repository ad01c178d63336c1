//! Defines the raw datasets this crate downloads, how they are requested from the
//! remote services and which file they are stored under locally.

use crate::datasets::error::DataError;
use std::fmt;

const BIKE_BASE_URL: &str =
    "https://data.stadt-zuerich.ch/dataset/verkehrszaehlungen_werte_fussgaenger_velo/resource/";

/// Endpoint of the tecson measurement archive for the Mythenquai station.
pub const WEATHER_URL: &str =
    "https://www.tecson-data.ch/zurich/mythenquai/uebersicht/messwerte.php";

/// User agent sent with weather requests.
pub const WEATHER_USER_AGENT: &str =
    "http://github.com/wildtreetech/talk-swiss-python-summit-2018";

/// Years for which bike counter data is published.
pub const BIKE_YEARS: [i32; 5] = [2014, 2015, 2016, 2017, 2018];

/// The two kinds of raw resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    /// Hourly-ish pedestrian and bicycle counts for all counting stations, as CSV.
    BikeCounts,
    /// Measurements of the Mythenquai weather station, as an HTML table.
    Weather,
}

impl DatasetKind {
    pub(crate) fn file_prefix(&self) -> &'static str {
        match self {
            DatasetKind::BikeCounts => "bikes",
            DatasetKind::Weather => "weather",
        }
    }

    pub(crate) fn file_extension(&self) -> &'static str {
        match self {
            DatasetKind::BikeCounts => "csv",
            DatasetKind::Weather => "html",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetKind::BikeCounts => write!(f, "bike counts"),
            DatasetKind::Weather => write!(f, "weather"),
        }
    }
}

/// How a dataset is requested from its remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteRequest {
    /// Plain GET whose body is streamed to disk unchanged.
    Get { url: String },
    /// Form-encoded POST whose body is Latin-1 text.
    PostForm { url: &'static str, body: String },
}

/// Identifies one downloadable resource: a kind plus the year it covers.
///
/// Bike keys can only be built for the years in [`BIKE_YEARS`]; weather keys accept any
/// year and leave validation to the remote service.
///
/// # Examples
///
/// ```
/// use zurich_bikes::DatasetKey;
///
/// let key = DatasetKey::bikes(2016).unwrap();
/// assert_eq!(key.file_name(), "bikes-2016.csv");
/// assert_eq!(DatasetKey::weather(2017).file_name(), "weather-2017.html");
/// assert!(DatasetKey::bikes(2013).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DatasetKey {
    kind: DatasetKind,
    year: i32,
}

impl DatasetKey {
    /// Key for the bike counter CSV of `year`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnsupportedYear`] when `year` is not one of [`BIKE_YEARS`].
    pub fn bikes(year: i32) -> Result<Self, DataError> {
        if !BIKE_YEARS.contains(&year) {
            return Err(DataError::UnsupportedYear(year));
        }
        Ok(Self {
            kind: DatasetKind::BikeCounts,
            year,
        })
    }

    /// Key for the weather table of `year`.
    pub fn weather(year: i32) -> Self {
        Self {
            kind: DatasetKind::Weather,
            year,
        }
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Deterministic local file name, e.g. `bikes-2016.csv`.
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}.{}",
            self.kind.file_prefix(),
            self.year,
            self.kind.file_extension()
        )
    }

    /// The request that retrieves this dataset.
    pub fn request(&self) -> RemoteRequest {
        match self.kind {
            DatasetKind::BikeCounts => RemoteRequest::Get {
                url: format!("{}{}", BIKE_BASE_URL, bike_resource_path(self.year)),
            },
            DatasetKind::Weather => RemoteRequest::PostForm {
                url: WEATHER_URL,
                body: weather_form_body(self.year),
            },
        }
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.year)
    }
}

// Only reachable for validated years.
fn bike_resource_path(year: i32) -> &'static str {
    match year {
        2018 => "13af0d7d-41e6-4212-aea3-cd04a4646665/download/2018verkehrszaehlungenwertefussgaengervelo.csv",
        2017 => "d17a0a74-1073-46f0-a26e-46a403c061ec/download/2017verkehrszaehlungenwertefussgaengervelo.csv",
        2016 => "ed354dde-c0f9-43b3-b05b-08c5f4c3f65a/download/2016verkehrszaehlungenwertefussgaengervelo.csv",
        2015 => "5c994056-eda6-48c5-8e61-28e96bcd04a3/download/2015verkehrszaehlungenwertefussgaengervelo.csv",
        _ => "bd2c9dd9-5b05-4303-a4c9-4a9f5b73e8f7/download/2014verkehrszaehlungenwertefussgaengervelo.csv",
    }
}

fn weather_form_body(year: i32) -> String {
    format!(
        "messw_beg=01.01.{year}&messw_end=31.12.{year}&\
         felder[]=Temp2m&felder[]=Windchill&\
         felder[]=Regen&\
         felder[]=Strahlung&felder[]=Feuchte&\
         auswahl=2&combilog=mythenquai&suchen=Werte anzeigen"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_bike_key_rejects_unpublished_years() {
        for year in [2013, 2019] {
            let err = DatasetKey::bikes(year).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
            assert!(err.to_string().contains(&year.to_string()));
        }
    }

    #[test]
    fn test_bike_request_urls() {
        for year in BIKE_YEARS {
            let RemoteRequest::Get { url } = DatasetKey::bikes(year).unwrap().request() else {
                panic!("bike data must be requested with GET");
            };
            assert!(url.starts_with(BIKE_BASE_URL));
            assert!(url.ends_with(&format!("{year}verkehrszaehlungenwertefussgaengervelo.csv")));
        }
    }

    #[test]
    fn test_weather_form_body() {
        let RemoteRequest::PostForm { url, body } = DatasetKey::weather(2016).request() else {
            panic!("weather data must be requested with a form POST");
        };
        assert_eq!(url, WEATHER_URL);
        assert_eq!(
            body,
            "messw_beg=01.01.2016&messw_end=31.12.2016&felder[]=Temp2m&felder[]=Windchill&\
             felder[]=Regen&felder[]=Strahlung&felder[]=Feuchte&auswahl=2&combilog=mythenquai&\
             suchen=Werte anzeigen"
        );
    }

    #[test]
    fn test_weather_accepts_any_year() {
        let key = DatasetKey::weather(1999);
        assert_eq!(key.file_name(), "weather-1999.html");
        assert_eq!(key.to_string(), "weather 1999");
    }
}
