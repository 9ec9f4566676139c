use std::fs::File;
use std::path::Path;

use reqwest::StatusCode;
use reqwest::blocking::Client;

use crate::catalog::http_client;
use crate::error::PlayerError;

pub trait AssetFetcher {
    /// Downloads `url` to `destination`. Anything but HTTP 200 is an error;
    /// a partially written destination is left for the caller to discard.
    fn fetch(&self, url: &str, destination: &Path) -> Result<u64, PlayerError>;
}

impl<T: AssetFetcher + ?Sized> AssetFetcher for &T {
    fn fetch(&self, url: &str, destination: &Path) -> Result<u64, PlayerError> {
        (**self).fetch(url, destination)
    }
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, PlayerError> {
        let client = http_client().map_err(|err| PlayerError::DownloadHttp(err.to_string()))?;
        Ok(Self { client })
    }
}

impl AssetFetcher for HttpFetcher {
    fn fetch(&self, url: &str, destination: &Path) -> Result<u64, PlayerError> {
        tracing::debug!(%url, destination = %destination.display(), "downloading");
        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|err| PlayerError::DownloadHttp(err.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let message = response
                .text()
                .unwrap_or_else(|_| "download failed".to_string());
            return Err(PlayerError::DownloadStatus {
                status: status.as_u16(),
                message,
            });
        }

        let mut file =
            File::create(destination).map_err(|err| PlayerError::Filesystem(err.to_string()))?;
        let written = std::io::copy(&mut response, &mut file)
            .map_err(|err| PlayerError::DownloadHttp(err.to_string()))?;
        tracing::debug!(bytes = written, "download complete");
        Ok(written)
    }
}
