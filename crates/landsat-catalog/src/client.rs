//! EarthExplorer JSON API client.
//!
//! Thin request/response wrapper over the inventory API: login yields an
//! API key, search returns scene records, download resolves a product URL
//! and streams the archive to disk. Downloads write to a `.partial` temp
//! file renamed into place on completion so an interrupted transfer never
//! leaves a half-written archive under the final name.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::auth::Credentials;
use crate::error::{CatalogError, Result};
use crate::types::{DatasetCode, SceneRecord, SearchFilter};

const API_BASE: &str = "https://earthexplorer.usgs.gov/inventory/json/v/1.4.1";

/// Scene catalog capability: search and fetch-by-identifier.
#[async_trait]
pub trait SceneCatalog: Send + Sync {
    /// Search scenes matching the filter.
    async fn search(&self, filter: &SearchFilter) -> Result<Vec<SceneRecord>>;

    /// Download one scene archive into `output_dir`, returning the
    /// archive path.
    async fn download_scene(
        &self,
        entity_id: &str,
        dataset: DatasetCode,
        output_dir: &Path,
    ) -> Result<PathBuf>;
}

/// API response envelope shared by every method.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    #[serde(rename = "errorCode")]
    error_code: Option<String>,
    error: Option<String>,
    data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    fn into_result(self) -> Result<T> {
        if let Some(code) = self.error_code {
            return Err(CatalogError::Api {
                code,
                message: self.error.unwrap_or_default(),
            });
        }
        self.data
            .ok_or_else(|| CatalogError::Response("missing data field".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct SearchData {
    results: Vec<SceneRecord>,
}

#[derive(Debug, Deserialize)]
struct DownloadOption {
    #[serde(rename = "entityId")]
    #[allow(dead_code)]
    entity_id: String,
    url: String,
}

/// Authenticated EarthExplorer client.
pub struct EarthExplorerClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl EarthExplorerClient {
    /// Log in against the production API.
    pub async fn login(credentials: &Credentials) -> Result<Self> {
        Self::login_at(API_BASE, credentials).await
    }

    /// Log in against an explicit endpoint (test servers).
    pub async fn login_at(base_url: &str, credentials: &Credentials) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(600))
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        let payload = json!({
            "username": credentials.username,
            "password": credentials.password,
            "authType": "EROS",
            "catalogId": "EE",
        });

        let api_key: String = post_request(&http, base_url, "login", &payload).await?;
        info!("Logged in to scene catalog");

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            api_key,
        })
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: &serde_json::Value,
    ) -> Result<T> {
        post_request(&self.http, &self.base_url, method, payload).await
    }

    /// Invalidate the API key.
    pub async fn logout(self) -> Result<()> {
        let payload = json!({ "apiKey": self.api_key });
        let _: serde_json::Value = self.request("logout", &payload).await?;
        debug!("Logged out of scene catalog");
        Ok(())
    }

    async fn stream_to_file(&self, url: &str, dest: &Path, scene: &str) -> Result<()> {
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(CatalogError::Download {
                scene: scene.to_string(),
                message: format!("HTTP {}", response.status()),
            });
        }

        let expected = response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());

        let file_name = dest
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("download.tar.gz");
        let partial = dest.with_file_name(format!("{}.partial", file_name));
        let mut file = fs::File::create(&partial).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        file.sync_all().await?;

        if let Some(expected) = expected {
            if written != expected {
                fs::remove_file(&partial).await.ok();
                return Err(CatalogError::Download {
                    scene: scene.to_string(),
                    message: format!("size mismatch: expected {} bytes, got {}", expected, written),
                });
            }
        }

        fs::rename(&partial, dest).await?;
        info!(path = %dest.display(), bytes = written, "Download completed");
        Ok(())
    }
}

#[async_trait]
impl SceneCatalog for EarthExplorerClient {
    async fn search(&self, filter: &SearchFilter) -> Result<Vec<SceneRecord>> {
        let payload = search_payload(&self.api_key, filter);
        let data: SearchData = self.request("search", &payload).await?;
        info!(count = data.results.len(), dataset = %filter.dataset, "Scene search finished");
        Ok(data.results)
    }

    async fn download_scene(
        &self,
        entity_id: &str,
        dataset: DatasetCode,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        fs::create_dir_all(output_dir).await?;

        let payload = json!({
            "apiKey": self.api_key,
            "datasetName": dataset.as_str(),
            "products": ["STANDARD"],
            "entityIds": [entity_id],
        });
        let options: Vec<DownloadOption> = self.request("download", &payload).await?;
        let option = options
            .into_iter()
            .find(|o| !o.url.is_empty())
            .ok_or_else(|| CatalogError::Download {
                scene: entity_id.to_string(),
                message: "no download URL offered".to_string(),
            })?;

        let dest = output_dir.join(archive_file_name(entity_id, &option.url));
        debug!(scene = entity_id, url = %option.url, "Downloading scene archive");
        self.stream_to_file(&option.url, &dest, entity_id).await?;

        Ok(dest)
    }
}

async fn post_request<T: DeserializeOwned>(
    http: &Client,
    base_url: &str,
    method: &str,
    payload: &serde_json::Value,
) -> Result<T> {
    let url = format!("{}/{}", base_url, method);
    let response = http
        .post(&url)
        .form(&[("jsonRequest", payload.to_string())])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(CatalogError::Response(format!(
            "{} returned HTTP {}",
            method,
            response.status()
        )));
    }

    let envelope: ApiEnvelope<T> = response.json().await?;
    envelope.into_result()
}

/// Build the `search` request payload.
fn search_payload(api_key: &str, filter: &SearchFilter) -> serde_json::Value {
    let mut payload = json!({
        "apiKey": api_key,
        "datasetName": filter.dataset.as_str(),
        "sortOrder": "ASC",
    });

    if let Some(bbox) = &filter.bbox {
        payload["spatialFilter"] = json!({
            "filterType": "mbr",
            "lowerLeft": { "longitude": bbox.min_x, "latitude": bbox.min_y },
            "upperRight": { "longitude": bbox.max_x, "latitude": bbox.max_y },
        });
    }

    if filter.start_date.is_some() || filter.end_date.is_some() {
        let mut temporal = serde_json::Map::new();
        if let Some(start) = filter.start_date {
            temporal.insert("startDate".to_string(), json!(start.to_string()));
        }
        if let Some(end) = filter.end_date {
            temporal.insert("endDate".to_string(), json!(end.to_string()));
        }
        payload["temporalFilter"] = serde_json::Value::Object(temporal);
    }

    if let Some(clouds) = filter.max_cloud_cover {
        payload["maxCloudCover"] = json!(clouds);
    }

    payload
}

/// Archive file name for a scene: the URL's file name when it names a
/// tarball, otherwise `<entity_id>.tar.gz`.
fn archive_file_name(entity_id: &str, url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let candidate = path.rsplit('/').next().unwrap_or("");
    if candidate.ends_with(".tar.gz") {
        candidate.to_string()
    } else {
        format!("{}.tar.gz", entity_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use landsat_common::BoundingBox;

    #[test]
    fn test_search_payload_full() {
        let filter = SearchFilter {
            dataset: DatasetCode::Landsat8C1,
            bbox: Some(BoundingBox::new(-65.0, -28.0, -64.0, -27.0)),
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2020, 2, 1),
            max_cloud_cover: Some(30),
        };
        let payload = search_payload("KEY", &filter);

        assert_eq!(payload["datasetName"], "LANDSAT_8_C1");
        assert_eq!(payload["spatialFilter"]["filterType"], "mbr");
        assert_eq!(payload["spatialFilter"]["lowerLeft"]["latitude"], -28.0);
        assert_eq!(payload["temporalFilter"]["startDate"], "2020-01-01");
        assert_eq!(payload["maxCloudCover"], 30);
    }

    #[test]
    fn test_search_payload_minimal_omits_filters() {
        let payload = search_payload("KEY", &SearchFilter::default());
        assert!(payload.get("spatialFilter").is_none());
        assert!(payload.get("temporalFilter").is_none());
        assert!(payload.get("maxCloudCover").is_none());
    }

    #[test]
    fn test_envelope_error() {
        let envelope: ApiEnvelope<String> = serde_json::from_str(
            r#"{"errorCode": "AUTH_INVALID", "error": "bad password", "data": null}"#,
        )
        .unwrap();
        match envelope.into_result() {
            Err(CatalogError::Api { code, message }) => {
                assert_eq!(code, "AUTH_INVALID");
                assert_eq!(message, "bad password");
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[test]
    fn test_envelope_data() {
        let envelope: ApiEnvelope<String> =
            serde_json::from_str(r#"{"errorCode": null, "error": null, "data": "api-key"}"#)
                .unwrap();
        assert_eq!(envelope.into_result().unwrap(), "api-key");
    }

    #[test]
    fn test_archive_file_name() {
        assert_eq!(
            archive_file_name("LC812345", "https://host/dl/LC08_T1.tar.gz?token=abc"),
            "LC08_T1.tar.gz"
        );
        assert_eq!(
            archive_file_name("LC812345", "https://host/download/12345/STANDARD"),
            "LC812345.tar.gz"
        );
    }
}
