//! Renderer-independent description of a line chart with an optional secondary axis.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendPosition {
    UpperLeft,
    UpperRight,
    /// Let the renderer choose.
    Best,
}

/// One named line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<(NaiveDate, f64)>,
}

impl Series {
    pub fn new(name: impl Into<String>, points: Vec<(NaiveDate, f64)>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    /// Largest value, if any.
    pub fn max_value(&self) -> Option<f64> {
        self.points
            .iter()
            .map(|(_, value)| *value)
            .fold(None, |max, value| Some(max.map_or(value, |m: f64| m.max(value))))
    }
}

/// A y axis and the series plotted against it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub label: String,
    /// Fixed value range; derived from the data when `None`.
    pub range: Option<(f64, f64)>,
    pub legend: LegendPosition,
    pub series: Vec<Series>,
}

impl Axis {
    pub fn new(label: impl Into<String>, series: Vec<Series>) -> Self {
        Self {
            label: label.into(),
            range: None,
            legend: LegendPosition::Best,
            series,
        }
    }

    pub fn with_range(mut self, low: f64, high: f64) -> Self {
        self.range = Some((low, high));
        self
    }

    pub fn with_legend(mut self, legend: LegendPosition) -> Self {
        self.legend = legend;
        self
    }

    /// Value range covering all points, padded slightly and always including zero.
    pub fn value_bounds(&self) -> (f64, f64) {
        if let Some(range) = self.range {
            return range;
        }
        let values = self.series.iter().flat_map(|s| s.points.iter().map(|(_, v)| *v));
        let (low, high) = values.fold((0.0f64, 0.0f64), |(low, high), v| (low.min(v), high.max(v)));
        if high > low {
            let pad = (high - low) * 0.05;
            (if low < 0.0 { low - pad } else { low }, high + pad)
        } else {
            (low, low + 1.0)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub primary: Axis,
    pub secondary: Option<Axis>,
    pub grid: bool,
}

impl Chart {
    /// First and last date over all series of both axes.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.primary
            .series
            .iter()
            .chain(self.secondary.iter().flat_map(|axis| axis.series.iter()))
            .flat_map(|series| series.points.iter().map(|(date, _)| *date))
            .fold(None, |bounds, date| match bounds {
                None => Some((date, date)),
                Some((first, last)) => Some((first.min(date), last.max(date))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 1, day).unwrap()
    }

    #[test]
    fn test_value_bounds_include_zero() {
        let axis = Axis::new("Riders", vec![Series::new("Total", vec![(jan(8), 10.0), (jan(15), 30.0)])]);
        assert_eq!(axis.value_bounds(), (0.0, 31.5));
    }

    #[test]
    fn test_value_bounds_of_empty_axis() {
        let axis = Axis::new("Riders", Vec::new());
        assert_eq!(axis.value_bounds(), (0.0, 1.0));
        assert_eq!(axis.clone().with_range(0.0, 8.0).value_bounds(), (0.0, 8.0));
    }

    #[test]
    fn test_date_bounds_span_both_axes() {
        let chart = Chart {
            title: String::new(),
            x_label: String::new(),
            primary: Axis::new("", vec![Series::new("Temp", vec![(jan(8), 1.0)])]),
            secondary: Some(Axis::new("", vec![Series::new("Rain", vec![(jan(15), 1.0), (jan(1), 0.0)])])),
            grid: false,
        };
        assert_eq!(chart.date_bounds(), Some((jan(1), jan(15))));
    }

    #[test]
    fn test_series_max_value() {
        assert_eq!(Series::new("Rain", vec![(jan(1), 1.5), (jan(8), 4.0)]).max_value(), Some(4.0));
        assert_eq!(Series::new("Rain", Vec::new()).max_value(), None);
    }
}
