use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("'{value}' is not a valid {parameter}, choose one of {choices}")]
    InvalidParameter {
        parameter: &'static str,
        value: String,
        choices: String,
    },

    #[error("Failed to draw chart: {0}")]
    Drawing(String),

    #[error("Failed to render chart to '{0}'")]
    Render(PathBuf, #[source] Box<PlotError>),
}
