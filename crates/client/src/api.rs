//! REST API client for the OFS record endpoints.
//!
//! Wraps the four read endpoints of a resource (`/api/{resource}`,
//! `/count`, `/export`, `/ultima-data`) using [`reqwest`]. Callers go
//! through the [`RecordSource`] trait so the orchestrator can be driven by
//! a stub in tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use ofs_core::date::parse_calendar_date;
use ofs_core::filter::QueryParams;
use ofs_core::resource::Resource;

use crate::config::ClientConfig;
use crate::error::ApiError;

/// Body keys inspected, in order, for a server-provided error message.
const DETAIL_KEYS: [&str; 3] = ["message", "error", "detail"];

// ---------------------------------------------------------------------------
// RecordSource
// ---------------------------------------------------------------------------

/// The remote data API, as seen by the orchestrator.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// `GET /api/{resource}` — filtered records for display.
    async fn fetch_records(
        &self,
        resource: Resource,
        params: &QueryParams,
    ) -> Result<Vec<Value>, ApiError>;

    /// `GET /api/{resource}/count` — total matching records.
    async fn fetch_count(&self, resource: Resource, params: &QueryParams) -> Result<u64, ApiError>;

    /// `GET /api/{resource}/export` — raw records for the spreadsheet.
    async fn fetch_export(
        &self,
        resource: Resource,
        params: &QueryParams,
    ) -> Result<Vec<Value>, ApiError>;

    /// `GET /api/{resource}/ultima-data` — date of the most recent record,
    /// independent of any filter.
    async fn fetch_last_updated(&self, resource: Resource) -> Result<Option<NaiveDate>, ApiError>;
}

// ---------------------------------------------------------------------------
// Wire payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct LastUpdatedResponse {
    #[serde(rename = "ultimaData", default)]
    ultima_data: Option<String>,
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// HTTP client for one OFS API deployment.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    api_url: String,
}

impl ApiClient {
    /// Build a client whose requests all carry `config.request_timeout`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ApiError::Transport)?;
        Ok(Self::with_client(client, config.api_url.clone()))
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn endpoint(&self, resource: Resource, suffix: Option<&str>) -> String {
        match suffix {
            Some(suffix) => format!("{}/api/{}/{}", self.api_url, resource.path_segment(), suffix),
            None => format!("{}/api/{}", self.api_url, resource.path_segment()),
        }
    }

    /// Issue a GET with `params` and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        params: Option<&QueryParams>,
    ) -> Result<T, ApiError> {
        tracing::debug!(
            url = %url,
            params = %params.map(ToString::to_string).unwrap_or_default(),
            "GET"
        );

        let mut request = self.client.get(&url).header(ACCEPT, "application/json");
        if let Some(params) = params {
            request = request.query(params.pairs());
        }

        let response = request.send().await.map_err(ApiError::from_reqwest)?;
        let response = Self::ensure_success(response).await?;
        response.json::<T>().await.map_err(ApiError::from_reqwest)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. On failure, returns
    /// [`ApiError::Server`] with the message the body carried, if any.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Server {
            status: status.as_u16(),
            detail: extract_detail(&body),
        })
    }
}

/// Pull a human-readable message out of an error body such as
/// `{"message": "..."}`.
fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    DETAIL_KEYS.iter().find_map(|key| {
        value
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

#[async_trait]
impl RecordSource for ApiClient {
    async fn fetch_records(
        &self,
        resource: Resource,
        params: &QueryParams,
    ) -> Result<Vec<Value>, ApiError> {
        self.get_json(self.endpoint(resource, None), Some(params))
            .await
    }

    async fn fetch_count(&self, resource: Resource, params: &QueryParams) -> Result<u64, ApiError> {
        let body: CountResponse = self
            .get_json(self.endpoint(resource, Some("count")), Some(params))
            .await?;
        Ok(body.count)
    }

    async fn fetch_export(
        &self,
        resource: Resource,
        params: &QueryParams,
    ) -> Result<Vec<Value>, ApiError> {
        self.get_json(self.endpoint(resource, Some("export")), Some(params))
            .await
    }

    async fn fetch_last_updated(&self, resource: Resource) -> Result<Option<NaiveDate>, ApiError> {
        let body: LastUpdatedResponse = self
            .get_json(self.endpoint(resource, Some("ultima-data")), None)
            .await?;
        Ok(body.ultima_data.as_deref().and_then(parse_calendar_date))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
