use crate::datasets::error::DataError;
use crate::types::dataset::{DatasetKey, RemoteRequest, WEATHER_USER_AGENT};
use futures_util::TryStreamExt;
use log::{info, warn};
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response};
use std::future::Future;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::StreamReader;

/// Retrieves a raw dataset from wherever it lives and writes it to a local path.
///
/// [`HttpFetcher`] talks to the real services. [`crate::ContentStore`] is generic over
/// this trait so the download mechanism can be swapped without touching the storage
/// policy or the callers.
pub trait Fetch {
    /// Downloads the resource identified by `key` into `destination`, creating or
    /// truncating the file.
    fn download(
        &self,
        key: &DatasetKey,
        destination: &Path,
    ) -> impl Future<Output = Result<(), DataError>> + Send;
}

/// Downloads datasets from the Stadt Zürich open data portal and the tecson archive.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    download_client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a preconfigured client, e.g. one with a proxy or timeout.
    pub fn with_client(download_client: Client) -> Self {
        Self { download_client }
    }

    /// Streams the response body chunk by chunk into `destination`, unchanged.
    async fn stream_to_file(&self, url: &str, destination: &Path) -> Result<(), DataError> {
        info!("Downloading data from {}", url);
        let response = self
            .download_client
            .get(url)
            .send()
            .await
            .map_err(|e| DataError::NetworkRequest(url.to_string(), e))?;
        let response = check_status(url, response)?;

        let stream = response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
        let mut reader = StreamReader::new(stream);
        let mut file = fs::File::create(destination)
            .await
            .map_err(|e| DataError::FileWrite(destination.to_path_buf(), e))?;
        let written = tokio::io::copy(&mut reader, &mut file)
            .await
            .map_err(|e| DataError::DownloadIo(url.to_string(), e))?;
        file.flush()
            .await
            .map_err(|e| DataError::FileWrite(destination.to_path_buf(), e))?;

        info!("Downloaded {} bytes from {}", written, url);
        Ok(())
    }

    fn form_request(&self, url: &str, body: String) -> RequestBuilder {
        self.download_client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(USER_AGENT, WEATHER_USER_AGENT)
            .body(body)
    }

    /// Posts the form and stores the Latin-1 response as UTF-8 text.
    async fn post_form_to_file(
        &self,
        url: &str,
        body: String,
        destination: &Path,
    ) -> Result<(), DataError> {
        info!("Requesting data from {}", url);
        let response = self
            .form_request(url, body)
            .send()
            .await
            .map_err(|e| DataError::NetworkRequest(url.to_string(), e))?;
        let response = check_status(url, response)?;

        let raw = response
            .bytes()
            .await
            .map_err(|e| DataError::NetworkRequest(url.to_string(), e))?;
        let text = decode_latin1(&raw);
        fs::write(destination, text.as_bytes())
            .await
            .map_err(|e| DataError::FileWrite(destination.to_path_buf(), e))?;

        info!("Received {} bytes from {}", raw.len(), url);
        Ok(())
    }
}

impl Fetch for HttpFetcher {
    async fn download(&self, key: &DatasetKey, destination: &Path) -> Result<(), DataError> {
        match key.request() {
            RemoteRequest::Get { url } => self.stream_to_file(&url, destination).await,
            RemoteRequest::PostForm { url, body } => {
                self.post_form_to_file(url, body, destination).await
            }
        }
    }
}

fn check_status(url: &str, response: Response) -> Result<Response, DataError> {
    response.error_for_status().map_err(|e| {
        warn!("HTTP error for {}: {:?}", url, e);
        match e.status() {
            Some(status) => DataError::HttpStatus {
                url: url.to_string(),
                status,
                source: e,
            },
            None => DataError::NetworkRequest(url.to_string(), e),
        }
    })
}

/// Every Latin-1 byte is the Unicode code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}
