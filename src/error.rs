use crate::datasets::error::{DataError, ErrorKind};
use crate::plotting::error::PlotError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BikesError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Plot(#[from] PlotError),
}

impl BikesError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BikesError::Data(e) => e.kind(),
            BikesError::Plot(PlotError::InvalidParameter { .. }) => ErrorKind::InvalidArgument,
            BikesError::Plot(PlotError::Drawing(_) | PlotError::Render(..)) => ErrorKind::Render,
        }
    }
}
