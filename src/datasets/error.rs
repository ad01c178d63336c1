use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of failures, independent of the concrete variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller asked for something that cannot exist, e.g. bike data for 2013.
    InvalidArgument,
    /// Transport failure or a non-success HTTP status.
    Network,
    /// A local file did not have the expected shape or content.
    Parse,
    /// Local filesystem failure.
    Io,
    /// Drawing a chart failed.
    Render,
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("Year has to be one of 2014, 2015, 2016, 2017, 2018 not {0}.")]
    UnsupportedYear(i32),

    #[error("Failed to determine the user cache directory")]
    DataDirResolution,

    #[error("Failed to create data directory '{0}'")]
    DataDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to read metadata for local file '{0}'")]
    FileMetadataRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to read local file '{0}'")]
    FileRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to write local file '{0}'")]
    FileWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to delete local file '{0}'")]
    FileDeletion(PathBuf, #[source] std::io::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Download stream failed for {0}")]
    DownloadIo(String, #[source] std::io::Error),

    #[error("Failed to parse CSV file '{path}'")]
    CsvRead {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("Required column '{column}' not found in {table}")]
    MissingColumn { table: String, column: String },

    #[error("Column count ({found}) does not match the expected {expected} columns in '{path}'")]
    SchemaMismatch {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("Could not parse '{value}' as a day-first date in {table}")]
    DateParse { table: String, value: String },

    #[error("Index column of {0} contains missing timestamps")]
    NullIndex(String),

    #[error("Invalid CSS selector '{0}'")]
    Selector(&'static str),

    #[error("No <table border=\"1\"> element found in '{0}'")]
    TableNotFound(PathBuf),

    #[error("Row {row} of '{path}' has {found} cells, expected {expected}")]
    RowShape {
        path: PathBuf,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}

impl DataError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DataError::UnsupportedYear(_) => ErrorKind::InvalidArgument,
            DataError::NetworkRequest(..)
            | DataError::HttpStatus { .. }
            | DataError::DownloadIo(..) => ErrorKind::Network,
            DataError::CsvRead { .. }
            | DataError::MissingColumn { .. }
            | DataError::SchemaMismatch { .. }
            | DataError::DateParse { .. }
            | DataError::NullIndex(_)
            | DataError::Selector(_)
            | DataError::TableNotFound(_)
            | DataError::RowShape { .. }
            | DataError::DataFrameProcessing(_) => ErrorKind::Parse,
            DataError::DataDirResolution
            | DataError::DataDirCreation(..)
            | DataError::FileMetadataRead(..)
            | DataError::FileRead(..)
            | DataError::FileWrite(..)
            | DataError::FileDeletion(..)
            | DataError::TaskJoin(_) => ErrorKind::Io,
        }
    }
}
