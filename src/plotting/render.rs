use crate::plotting::chart::{Chart, LegendPosition, Series};
use crate::plotting::error::PlotError;
use chrono::{Datelike, NaiveDate};
use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fmt::Display;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Something that can present a [`Chart`].
pub trait Render {
    fn render(&self, chart: &Chart) -> Result<(), PlotError>;
}

/// Draws charts into an image file: PNG for a `.png` extension, SVG otherwise.
#[derive(Debug, Clone)]
pub struct FileRenderer {
    path: PathBuf,
    size: (u32, u32),
}

impl FileRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            size: (800, 800),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_png(&self) -> bool {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
    }
}

impl Render for FileRenderer {
    fn render(&self, chart: &Chart) -> Result<(), PlotError> {
        let drawn = if self.is_png() {
            draw_chart(BitMapBackend::new(&self.path, self.size).into_drawing_area(), chart)
        } else {
            draw_chart(SVGBackend::new(&self.path, self.size).into_drawing_area(), chart)
        };
        drawn.map_err(|e| PlotError::Render(self.path.clone(), Box::new(e)))?;
        info!("Wrote chart '{}' to {:?}", chart.title, self.path);
        Ok(())
    }
}

const DAYS_PER_WEEK: f64 = 7.0;

fn drawing(e: impl Display) -> PlotError {
    PlotError::Drawing(e.to_string())
}

/// Draws `chart` on `root`. A missing secondary axis shares the primary range and
/// simply is not drawn, which keeps a single chart context type for both layouts.
fn draw_chart<DB: DrawingBackend>(root: DrawingArea<DB, Shift>, chart: &Chart) -> Result<(), PlotError> {
    root.fill(&WHITE).map_err(drawing)?;

    let x_range = day_range(chart.date_bounds());
    let (low, high) = chart.primary.value_bounds();
    let (secondary_low, secondary_high) = chart
        .secondary
        .as_ref()
        .map_or((low, high), |axis| axis.value_bounds());

    let mut builder = ChartBuilder::on(&root);
    builder
        .caption(&chart.title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60);
    if chart.secondary.is_some() {
        builder.right_y_label_area_size(60);
    }
    let mut context = builder
        .build_cartesian_2d(x_range.clone(), low..high)
        .map_err(drawing)?
        .set_secondary_coord(x_range, secondary_low..secondary_high);

    let mut mesh = context.configure_mesh();
    mesh.x_label_formatter(&format_day)
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.primary.label.as_str());
    if !chart.grid {
        mesh.disable_mesh();
    }
    mesh.draw().map_err(drawing)?;

    for (index, series) in chart.primary.series.iter().enumerate() {
        let style = Palette99::pick(index).stroke_width(3);
        context
            .draw_series(
                day_runs(series)
                    .into_iter()
                    .flat_map(move |run| LineSeries::new(run, style)),
            )
            .map_err(drawing)?
            .label(series.name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    }

    if let Some(axis) = &chart.secondary {
        context
            .configure_secondary_axes()
            .y_desc(axis.label.as_str())
            .draw()
            .map_err(drawing)?;

        let offset = chart.primary.series.len();
        for (index, series) in axis.series.iter().enumerate() {
            let style = Palette99::pick(offset + index).stroke_width(3);
            context
                .draw_secondary_series(
                    day_runs(series)
                        .into_iter()
                        .flat_map(move |run| LineSeries::new(run, style)),
                )
                .map_err(drawing)?
                .label(series.name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        }
    }

    // plotters keeps one legend box per chart, so the primary axis decides its position.
    context
        .configure_series_labels()
        .position(label_position(chart.primary.legend))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(drawing)?;

    root.present().map_err(drawing)?;
    Ok(())
}

fn day_number(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

fn format_day(value: &f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(value.round() as i32)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn day_range(bounds: Option<(NaiveDate, NaiveDate)>) -> Range<f64> {
    match bounds {
        Some((first, last)) if first < last => day_number(first)..day_number(last),
        Some((first, _)) => day_number(first) - 1.0..day_number(first) + 1.0,
        None => 0.0..1.0,
    }
}

/// Splits a weekly series into runs of consecutive weeks, so a missing week leaves a
/// gap in the line.
fn day_runs(series: &Series) -> Vec<Vec<(f64, f64)>> {
    let mut runs: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut previous: Option<f64> = None;
    for (date, value) in &series.points {
        let day = day_number(*date);
        match runs.last_mut() {
            Some(run) if previous.is_some_and(|p| day - p <= DAYS_PER_WEEK) => run.push((day, *value)),
            _ => runs.push(vec![(day, *value)]),
        }
        previous = Some(day);
    }
    runs
}

fn label_position(legend: LegendPosition) -> SeriesLabelPosition {
    match legend {
        LegendPosition::UpperLeft => SeriesLabelPosition::UpperLeft,
        LegendPosition::UpperRight => SeriesLabelPosition::UpperRight,
        LegendPosition::Best => SeriesLabelPosition::UpperMiddle,
    }
}
