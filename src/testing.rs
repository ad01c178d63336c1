//! Fixtures and a counting fetcher so tests never touch the network.

use crate::datasets::error::DataError;
use crate::datasets::fetcher::Fetch;
use crate::types::dataset::DatasetKey;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::Mutex;

pub(crate) const BIKES_2014_CSV: &str = "\
Datum,fk_zaehler,fk_standort,velo_in,velo_out,fuss_in,fuss_out,objectid
06.01.2014 07:00,ECO09113499,3,14,6,,,1
06.01.2014 08:00,ECO09113499,3,21,9,,,2
06.01.2014 07:00,Y2G12102806,2,3,2,,,3
";

pub(crate) const BIKES_2016_CSV: &str = "\
fk_zaehler,fk_standort,datum,velo_in,velo_out,fuss_in,fuss_out,objectid
ECO09113499,3,01.01.2016 00:00,5,3,,,1
Y2G12102806,2,01.01.2016 00:00,7,1,,,2
";

// 2017-01-01 was a Sunday, so the rows fall into the weeks ending on the 8th and 15th.
pub(crate) const BIKES_2017_CSV: &str = "\
fk_zaehler,fk_standort,datum,velo_in,velo_out,fuss_in,fuss_out,objectid
ECO09113499,3,2017-01-02T00:00:00,10,4,,,1
ECO09113499,3,2017-01-08T23:00:00,6,2,,,2
ECO09113499,3,2017-01-09T00:00:00,1,1,,,3
Y2G12102806,2,2017-01-02T00:00:00,100,100,,,4
ECO09113499,3,2017-01-15T12:00:00,3,2,,,5
";

pub(crate) const BIKES_2018_CSV: &str = "\
fk_zaehler,fk_standort,datum,velo_in,velo_out,fuss_in,fuss_out,objectid
ECO09113499,3,2018-03-05T07:00:00,30,12,,,1
Y2G12102806,2,2018-03-05T07:00:00,8,8,,,2
ECO09113499,3,2018-03-05T08:00:00,25,17,,,3
";

pub(crate) const BIKES_2015_CSV: &str = "\
Datum,ObjectID,Zaehler,VeloIn,VeloOut,FussIn,FussOut
05.01.2015 08:00,1,ECO09113499,12,9,0,0
05.01.2015 09:00,2,ECO09113499,20,11,0,0
05.01.2015 08:00,3,Y2G12102806,4,4,0,0
";

pub(crate) const BIKES_2015_SHORT_CSV: &str = "\
Datum,ObjectID,Zaehler,VeloIn,VeloOut,FussIn
05.01.2015 08:00,1,ECO09113499,12,9,0
";

pub(crate) const WEATHER_2017_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Messwerte Mythenquai</title></head>
<body>
<table border="0"><tr><td>Navigation</td></tr></table>
<table border="1">
<tr><td colspan="6">Messwerte vom 01.01.2017 bis 31.12.2017</td></tr>
<tr><th>Datum</th><th>Lufttemperatur</th><th>Windchill</th><th>Niederschlag</th><th>Globalstrahlung</th><th>Luftfeuchte</th></tr>
<tr><td>09.01.2017 00:00:00</td><td>-1.5</td><td>-4.0</td><td>0.0</td><td>12</td><td>88</td></tr>
<tr><td>08.01.2017 00:00:00</td><td>2.0</td><td>0.5</td><td>1.5</td><td>40</td><td>80</td></tr>
<tr><td>02.01.2017 00:00:00</td><td>4.0</td><td>2.0</td><td>2.5</td><td>60</td><td>75</td></tr>
<tr><td>02.01.2017 00:00:00</td><td>4.0</td><td>2.0</td><td>2.5</td><td>60</td><td>75</td></tr>
<tr><td>15.01.2017 00:00:00</td><td>0.5 °C</td><td>-</td><td>3.0</td><td>20</td><td>90</td></tr>
</table>
</body>
</html>
"#;

/// Serves fixtures for registered keys and records every download request. Unknown
/// keys fail like a dropped connection after writing a partial body.
#[derive(Default)]
pub(crate) struct CountingFetcher {
    fixtures: HashMap<DatasetKey, &'static str>,
    requested: Mutex<Vec<DatasetKey>>,
}

impl CountingFetcher {
    pub(crate) fn with_bikes(year: i32, body: &'static str) -> Self {
        Self::default().and_bikes(year, body)
    }

    pub(crate) fn and_bikes(mut self, year: i32, body: &'static str) -> Self {
        self.fixtures.insert(DatasetKey::bikes(year).unwrap(), body);
        self
    }

    pub(crate) fn and_weather(mut self, year: i32, body: &'static str) -> Self {
        self.fixtures.insert(DatasetKey::weather(year), body);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.requested.lock().unwrap().len()
    }

    pub(crate) fn requested(&self) -> Vec<DatasetKey> {
        self.requested.lock().unwrap().clone()
    }
}

impl Fetch for CountingFetcher {
    async fn download(&self, key: &DatasetKey, destination: &Path) -> Result<(), DataError> {
        self.requested.lock().unwrap().push(*key);
        match self.fixtures.get(key) {
            Some(body) => tokio::fs::write(destination, body)
                .await
                .map_err(|e| DataError::FileWrite(destination.to_path_buf(), e)),
            None => {
                let _ = tokio::fs::write(destination, "<html><body><tab").await;
                Err(DataError::DownloadIo(
                    key.to_string(),
                    io::Error::new(io::ErrorKind::ConnectionReset, "no fixture registered"),
                ))
            }
        }
    }
}
