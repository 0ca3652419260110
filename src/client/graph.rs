//! Graph API client implementation

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

use super::models::{GraphErrorEnvelope, HashtagSearch, MediaPage};
use super::{GraphApi, PageTarget};
use crate::config::{Config, Credentials};
use crate::error::{ApiError, Result};

/// Outbound request budget towards the Graph API
const RATE_LIMIT_PER_SECOND: u32 = 5;

/// Per-request network timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Graph API client
pub struct GraphClient {
    http: HttpClient,
    base_url: String,
    version: String,
    account_id: String,
    access_token: String,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl GraphClient {
    /// Create a client for validated credentials
    pub fn new(
        base_url: impl Into<String>,
        version: impl Into<String>,
        credentials: Credentials,
    ) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let quota = Quota::per_second(
            NonZeroU32::new(RATE_LIMIT_PER_SECOND).unwrap_or(NonZeroU32::MIN),
        );

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            version: version.into().trim_matches('/').to_string(),
            account_id: credentials.account_id,
            access_token: credentials.access_token,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Build a client from configuration, failing on missing credentials
    pub fn from_config(config: &Config) -> Result<Self> {
        let credentials = config.validate_credentials()?;
        Self::new(&config.api_host, &config.graph_api_version, credentials)
    }

    fn versioned_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            self.version,
            path.trim_start_matches('/')
        )
    }

    /// Issue a GET and decode the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<T> {
        self.rate_limiter.until_ready().await;

        log::debug!("GET {}", redact_query(url));
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if status.is_success() {
            let data = response.json::<T>().await.map_err(|e| {
                ApiError::InvalidResponse(format!("Failed to parse response: {}", e.without_url()))
            })?;
            return Ok(data);
        }

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, &body, retry_after).into())
    }
}

/// Drop the query string, which on `paging.next` URLs includes the access
/// token.
fn redact_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

/// Map a non-success response to an `ApiError`, preferring the Graph
/// `error.message` over the raw body.
fn status_error(status: StatusCode, body: &str, retry_after: Option<u64>) -> ApiError {
    let message = serde_json::from_str::<GraphErrorEnvelope>(body)
        .map(|env| env.error.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.to_string()
            } else {
                body.to_string()
            }
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        StatusCode::TOO_MANY_REQUESTS => {
            ApiError::RateLimit(Duration::from_secs(retry_after.unwrap_or(60)))
        }
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ApiError::BadRequest(message)
        }
        s if s.is_server_error() => ApiError::ServerError(message),
        s => ApiError::InvalidResponse(format!("Unexpected status code {}: {}", s, message)),
    }
}

#[async_trait]
impl GraphApi for GraphClient {
    async fn fetch_page(&self, target: &PageTarget) -> Result<MediaPage> {
        match target {
            PageTarget::Endpoint { path, params } => {
                let mut query = params.to_query_params();
                query.push(("access_token".to_string(), self.access_token.clone()));
                self.get_json(&self.versioned_url(path), &query).await
            }
            // `paging.next` already carries every parameter, token included
            PageTarget::Cursor(url) => self.get_json(url, &[]).await,
        }
    }

    async fn resolve_hashtag_id(&self, tag: &str) -> Result<String> {
        let query = vec![
            ("user_id".to_string(), self.account_id.clone()),
            ("q".to_string(), tag.to_string()),
            ("access_token".to_string(), self.access_token.clone()),
        ];
        let search: HashtagSearch = self
            .get_json(&self.versioned_url("ig_hashtag_search"), &query)
            .await?;

        search
            .data
            .into_iter()
            .find_map(|h| h.id)
            .ok_or_else(|| ApiError::HashtagNotFound(tag.to_string()).into())
    }

    fn account_id(&self) -> &str {
        &self.account_id
    }
}
