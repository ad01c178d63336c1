use crate::datasets::error::DataError;
use crate::parsing::dates::{datetime_column, parse_day_first};
use crate::types::schema::{INDEX_COLUMN, WEATHER_COLUMNS};
use chrono::NaiveDateTime;
use polars::prelude::{Column, DataFrame};
use scraper::{ElementRef, Html, Selector};
use std::path::Path;

const TABLE_SELECTOR: &str = r#"table[border="1"]"#;
const ROW_SELECTOR: &str = "tr";
const CELL_SELECTOR: &str = "td, th";

type WeatherRow = (NaiveDateTime, [Option<f64>; WEATHER_COLUMNS.len()]);

/// Loads the measurement table of a saved tecson page.
///
/// Reads the first `<table border="1">`, skips its leading sub-header row and any
/// further rows made only of `<th>` cells, and maps the remaining columns positionally
/// to `Date` plus [`WEATHER_COLUMNS`]. Cells that are not numbers become nulls. Rows are
/// sorted by time and repeated timestamps keep their first row.
pub fn load_weather_table(path: &Path) -> Result<DataFrame, DataError> {
    let html =
        std::fs::read_to_string(path).map_err(|e| DataError::FileRead(path.to_path_buf(), e))?;
    parse_weather_html(&html, path)
}

pub(crate) fn parse_weather_html(html: &str, path: &Path) -> Result<DataFrame, DataError> {
    let table_selector = selector(TABLE_SELECTOR)?;
    let row_selector = selector(ROW_SELECTOR)?;
    let cell_selector = selector(CELL_SELECTOR)?;

    let document = Html::parse_document(html);
    let table = document
        .select(&table_selector)
        .next()
        .ok_or_else(|| DataError::TableNotFound(path.to_path_buf()))?;

    let mut rows: Vec<WeatherRow> = Vec::new();
    for (index, row) in table.select(&row_selector).enumerate().skip(1) {
        let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
        if cells.iter().all(|cell| cell.value().name() == "th") {
            continue;
        }
        if cells.len() != WEATHER_COLUMNS.len() + 1 {
            return Err(DataError::RowShape {
                path: path.to_path_buf(),
                row: index,
                expected: WEATHER_COLUMNS.len() + 1,
                found: cells.len(),
            });
        }

        let raw_date = cell_text(&cells[0]);
        let date = parse_day_first(&raw_date).ok_or_else(|| DataError::DateParse {
            table: path.display().to_string(),
            value: raw_date.clone(),
        })?;
        let mut values = [None; WEATHER_COLUMNS.len()];
        for (value, cell) in values.iter_mut().zip(&cells[1..]) {
            *value = parse_measurement(&cell_text(cell));
        }
        rows.push((date, values));
    }

    rows.sort_by_key(|(date, _)| *date);
    rows.dedup_by_key(|(date, _)| *date);

    let mut columns = Vec::with_capacity(WEATHER_COLUMNS.len() + 1);
    columns.push(datetime_column(
        INDEX_COLUMN,
        rows.iter().map(|(date, _)| *date).collect(),
    ));
    for (position, name) in WEATHER_COLUMNS.iter().enumerate() {
        let values: Vec<Option<f64>> = rows.iter().map(|(_, values)| values[position]).collect();
        columns.push(Column::new((*name).into(), values));
    }
    Ok(DataFrame::new(columns)?)
}

fn selector(css: &'static str) -> Result<Selector, DataError> {
    Selector::parse(css).map_err(|_| DataError::Selector(css))
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Reads the leading number of a cell such as `3.5` or `3.5 °C`.
fn parse_measurement(text: &str) -> Option<f64> {
    text.split_whitespace().next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::dates::column_datetimes;
    use crate::testing::WEATHER_2017_HTML;
    use crate::ErrorKind;

    fn parse(html: &str) -> Result<DataFrame, DataError> {
        parse_weather_html(html, Path::new("weather-2017.html"))
    }

    #[test]
    fn test_weather_schema() -> Result<(), DataError> {
        let df = parse(WEATHER_2017_HTML)?;

        assert_eq!(
            df.get_column_names(),
            ["Date", "Temp", "Windchill", "Rain", "Radiation", "Humidity"]
        );
        assert_eq!(df.height(), 4);
        Ok(())
    }

    #[test]
    fn test_index_is_strictly_increasing() -> Result<(), DataError> {
        let df = parse(WEATHER_2017_HTML)?;

        let dates: Vec<_> = column_datetimes(&df, INDEX_COLUMN)?.into_iter().flatten().collect();
        assert_eq!(dates.len(), df.height());
        assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
        Ok(())
    }

    #[test]
    fn test_measurements_are_positional_and_lenient() -> Result<(), DataError> {
        let df = parse(WEATHER_2017_HTML)?;

        // Sorted: 02.01, 08.01, 09.01, 15.01
        assert_eq!(df.column("Temp")?.f64()?.get(0), Some(4.0));
        assert_eq!(df.column("Rain")?.f64()?.get(1), Some(1.5));
        assert_eq!(df.column("Humidity")?.f64()?.get(2), Some(88.0));
        assert_eq!(df.column("Temp")?.f64()?.get(3), Some(0.5));
        assert_eq!(df.column("Windchill")?.f64()?.get(3), None);
        Ok(())
    }

    #[test]
    fn test_missing_bordered_table() {
        let err = parse("<html><body><table><tr><td>1</td></tr></table></body></html>")
            .unwrap_err();
        assert!(matches!(err, DataError::TableNotFound(_)));
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_short_row_is_rejected() {
        let html = r#"<table border="1">
            <tr><td>sub-header</td></tr>
            <tr><td>01.01.2017 00:00:00</td><td>1.0</td></tr>
        </table>"#;

        let err = parse(html).unwrap_err();
        assert!(matches!(err, DataError::RowShape { row: 1, expected: 6, found: 2, .. }));
    }

    #[test]
    fn test_unparseable_date_is_rejected() {
        let html = r#"<table border="1">
            <tr><td>sub-header</td></tr>
            <tr><td>Mittelwert</td><td>1</td><td>1</td><td>1</td><td>1</td><td>1</td></tr>
        </table>"#;

        let err = parse(html).unwrap_err();
        assert!(matches!(err, DataError::DateParse { value, .. } if value == "Mittelwert"));
    }

    #[test]
    fn test_parse_measurement() {
        assert_eq!(parse_measurement("-1.5"), Some(-1.5));
        assert_eq!(parse_measurement("0.5 °C"), Some(0.5));
        assert_eq!(parse_measurement("-"), None);
        assert_eq!(parse_measurement(""), None);
    }
}
