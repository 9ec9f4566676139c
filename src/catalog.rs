use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;

use crate::config::Config;
use crate::domain::{BsrId, CatalogRecord};
use crate::error::PlayerError;

pub trait CatalogClient {
    fn resolve(&self, id: &BsrId) -> Result<CatalogRecord, PlayerError>;
}

impl<T: CatalogClient + ?Sized> CatalogClient for &T {
    fn resolve(&self, id: &BsrId) -> Result<CatalogRecord, PlayerError> {
        (**self).resolve(id)
    }
}

#[derive(Clone)]
pub struct BeatSaverClient {
    client: Client,
    config: Config,
}

impl BeatSaverClient {
    pub fn new(config: &Config) -> Result<Self, PlayerError> {
        let client = http_client().map_err(|err| PlayerError::CatalogHttp(err.to_string()))?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn lookup_url(&self, id: &BsrId) -> String {
        self.config.lookup_url(id)
    }
}

impl CatalogClient for BeatSaverClient {
    fn resolve(&self, id: &BsrId) -> Result<CatalogRecord, PlayerError> {
        let url = self.lookup_url(id);
        tracing::debug!(%url, "resolving map");
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| PlayerError::CatalogHttp(err.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let message = response
                .text()
                .unwrap_or_else(|_| "BeatSaver lookup failed".to_string());
            return Err(PlayerError::CatalogStatus {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .map_err(|err| PlayerError::CatalogHttp(err.to_string()))?;
        parse_record(&body)
    }
}

#[derive(Deserialize)]
struct MapDocument {
    name: String,
    versions: Vec<MapVersion>,
}

#[derive(Deserialize)]
struct MapVersion {
    #[serde(rename = "downloadURL")]
    download_url: String,
}

/// Pulls `name` and `versions[0].downloadURL` out of a `/maps/id` body.
pub fn parse_record(body: &str) -> Result<CatalogRecord, PlayerError> {
    let document: MapDocument =
        serde_json::from_str(body).map_err(|err| PlayerError::CatalogResponse(err.to_string()))?;
    let version = document
        .versions
        .into_iter()
        .next()
        .ok_or_else(|| PlayerError::CatalogResponse("map has no versions".to_string()))?;
    Ok(CatalogRecord {
        name: document.name,
        download_url: version.download_url,
    })
}

pub(crate) fn http_client() -> reqwest::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("bsr-player/", env!("CARGO_PKG_VERSION"))),
    );
    Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(30))
        .build()
}
