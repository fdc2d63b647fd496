//! Cloud API client for public weblinks.

use std::time::{SystemTime, UNIX_EPOCH};

use futures::StreamExt;
use reqwest::header::CONTENT_LENGTH;
use reqwest::redirect::Policy;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, warn};

use crate::error::{MirrorError, Result};
use crate::models::{DispatchResponse, FolderResponse};

/// Base URL for the public cloud API.
pub const ENDPOINT_URL: &str = "https://cloud.mail.ru/api/v2";

/// API version sent with every request.
pub const API_VERSION: u32 = 2;

/// Web client build string sent with every request.
pub const BUILD: &str = "cloudweb-11674-72-8-0.202012151755";

/// Listing sort order. Fixed: by name, ascending.
const SORT_BY_NAME: &str = r#"{"type":"name","order":"asc"}"#;

/// Maximum number of redirects followed per request.
const MAX_REDIRECTS: usize = 10;

/// Client for the `folder` and `dispatcher` endpoints and for direct file URLs.
///
/// One connection pool and one cookie jar are shared by every request made
/// through the same client.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    /// Create a client for the public cloud API.
    pub fn new() -> Result<Self> {
        Self::with_base_url(ENDPOINT_URL)
    }

    /// Create a client against a different API root.
    ///
    /// # Arguments
    /// * `base_url` - API root, without a trailing slash
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Issue a GET against `<base_url>/<endpoint>` and return the raw body.
    ///
    /// Transport failures are errors. A non-200 status is logged and yields an
    /// empty body, leaving it to the caller's decoding step to fail.
    pub async fn get(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Vec<u8>> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%url, ?query, "GET");

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status != reqwest::StatusCode::OK {
            error!(
                "code: {}, resp: {}",
                status.as_u16(),
                String::from_utf8_lossy(&body)
            );
            return Ok(Vec::new());
        }

        Ok(body.to_vec())
    }

    /// List a folder by weblink.
    ///
    /// # Arguments
    /// * `weblink` - The folder's weblink
    /// * `limit` - Page size; `0` returns only the folder's own counts
    pub async fn list_folder(&self, weblink: &str, limit: u64) -> Result<FolderResponse> {
        let query = [
            ("weblink", weblink.to_string()),
            ("sort", SORT_BY_NAME.to_string()),
            ("offset", "0".to_string()),
            ("limit", limit.to_string()),
            ("api", API_VERSION.to_string()),
            ("build", BUILD.to_string()),
        ];

        let body = self.get("folder", &query).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Ask the dispatcher for a direct download base URL.
    pub async fn dispatch(&self) -> Result<String> {
        let query = [
            ("api", API_VERSION.to_string()),
            ("build", BUILD.to_string()),
            ("_", timestamp_millis().to_string()),
        ];

        let body = self.get("dispatcher", &query).await?;
        let response: DispatchResponse = serde_json::from_slice(&body)?;

        response
            .download_url()
            .map(str::to_string)
            .ok_or(MirrorError::MissingDownloadUrl)
    }

    /// HEAD a direct file URL and return its `Content-Length`, if reported.
    pub async fn content_length(&self, url: &str) -> Result<Option<u64>> {
        let response = self.http.head(url).send().await?;

        Ok(response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok()))
    }

    /// Stream the body of a direct file URL into `file`.
    ///
    /// Returns the number of bytes written. A read error mid-stream is logged
    /// and ends the copy early; write errors are returned.
    pub async fn download_to(&self, url: &str, file: &mut File) -> Result<u64> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Unexpected status {} for {}", status.as_u16(), url);
        }

        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    error!("Transfer of {} interrupted: {}", url, e);
                    break;
                }
            };
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;

        Ok(written)
    }
}

/// Milliseconds since the Unix epoch, used to bust dispatcher caches.
fn timestamp_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}
