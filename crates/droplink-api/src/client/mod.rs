//! HTTP client for the build service with retry logic

use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use tracing::{debug, warn};

use droplink_core::{Artifact, LinkError};

use crate::api::ArtifactListResponse;
use crate::ApiResult;

/// API version the artifact listing endpoint is pinned to
const API_VERSION: &str = "5.0";

/// Configuration for exponential backoff retry logic
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

/// Credentials for the build service
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Personal access token, sent as basic auth with a blank username
    pub pat: Option<String>,
    /// OAuth access token, sent as a bearer token
    pub access_token: Option<String>,
}

/// Client for the build service's artifact listing endpoint
#[derive(Debug, Clone)]
pub struct BuildClient {
    /// Underlying HTTP client with connection pooling
    client: Client,
    /// Retry configuration
    retry_config: RetryConfig,
    /// Collection URL of the build service, without a trailing slash
    service_url: String,
}

impl BuildClient {
    /// Create an unauthenticated client for `service_url`.
    pub fn new(service_url: impl Into<String>) -> ApiResult<Self> {
        Self::with_config(service_url, AuthConfig::default(), RetryConfig::default())
    }

    /// Create a client with credentials.
    pub fn with_auth(service_url: impl Into<String>, auth: AuthConfig) -> ApiResult<Self> {
        Self::with_config(service_url, auth, RetryConfig::default())
    }

    /// Create a client with custom configuration.
    pub fn with_config(
        service_url: impl Into<String>,
        auth: AuthConfig,
        retry_config: RetryConfig,
    ) -> ApiResult<Self> {
        let mut builder = ClientBuilder::new()
            // Connection pooling configuration
            .pool_max_idle_per_host(8)
            .pool_idle_timeout(Duration::from_secs(90))
            // Request timeout
            .timeout(Duration::from_secs(30))
            // Enable gzip compression
            .gzip(true)
            // User agent
            .user_agent("droplink/0.1.0");

        if let Some(value) = auth_header(&auth)? {
            builder = builder.default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(reqwest::header::AUTHORIZATION, value);
                headers
            });
        }

        let client = builder.build().map_err(|e| {
            LinkError::service(
                format!("failed to create HTTP client: {e}"),
                Some(Box::new(e)),
            )
        })?;

        let service_url = service_url.into();
        Ok(Self {
            client,
            retry_config,
            service_url: service_url.trim_end_matches('/').to_string(),
        })
    }

    /// List the artifacts published by a build.
    ///
    /// Transport failures and server errors are retried with exponential
    /// backoff. A missing build or rejected credentials fail immediately.
    pub async fn get_artifacts(&self, project: &str, build_id: u32) -> ApiResult<Vec<Artifact>> {
        let url = format!(
            "{}/{}/_apis/build/builds/{}/artifacts?api-version={}",
            self.service_url,
            self.encode_project(project),
            build_id,
            API_VERSION
        );

        let listing = self
            .with_retry(|| async {
                debug!(%url, "fetching artifact list");
                let response = self.client.get(&url).send().await.map_err(|e| {
                    LinkError::service(
                        format!("failed to reach the build service: {e}"),
                        Some(Box::new(e)),
                    )
                })?;

                match response.status() {
                    reqwest::StatusCode::OK => response
                        .json::<ArtifactListResponse>()
                        .await
                        .map_err(|e| {
                            LinkError::service(
                                format!("failed to parse the artifact list: {e}"),
                                Some(Box::new(e)),
                            )
                        }),
                    reqwest::StatusCode::NOT_FOUND => Err(LinkError::BuildNotFound {
                        project: project.to_string(),
                        build_id,
                    }),
                    reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                        Err(LinkError::ServiceAuth {
                            status: response.status().as_u16(),
                        })
                    }
                    status => Err(LinkError::service(
                        format!("build service returned status {status}"),
                        None,
                    )),
                }
            })
            .await?;

        debug!(count = listing.value.len(), "artifact list fetched");
        Ok(listing
            .value
            .into_iter()
            .map(|artifact| artifact.into_artifact())
            .collect())
    }

    /// Execute a request with exponential backoff retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> ApiResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = ApiResult<T>>,
    {
        let mut delay = self.retry_config.initial_delay;
        let mut last_error = None;

        for attempt in 0..=self.retry_config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    last_error = Some(error);

                    // Don't retry on final attempt
                    if attempt == self.retry_config.max_retries {
                        break;
                    }

                    // A missing build or bad credentials will not get better
                    if let Some(ref err) = last_error {
                        match err {
                            LinkError::BuildNotFound { .. } => break,
                            LinkError::ServiceAuth { .. } => break,
                            _ => {}
                        }
                    }

                    warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "build service request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;

                    // Exponential backoff capped at max_delay
                    delay = std::cmp::min(
                        Duration::from_millis(
                            (delay.as_millis() as f64 * self.retry_config.multiplier) as u64,
                        ),
                        self.retry_config.max_delay,
                    );
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            LinkError::service("retry loop ended without an error", None)
        }))
    }

    /// Encode the project segment for the URL (project names may contain spaces)
    fn encode_project(&self, project: &str) -> String {
        project.replace(' ', "%20")
    }
}

/// Build the Authorization header value. A PAT wins over a bearer token when
/// both are configured; PATs go over the wire as basic auth with a blank
/// username.
fn auth_header(auth: &AuthConfig) -> ApiResult<Option<reqwest::header::HeaderValue>> {
    use base64::{engine::general_purpose, Engine as _};

    let raw = if let Some(pat) = &auth.pat {
        Some(format!(
            "Basic {}",
            general_purpose::STANDARD.encode(format!(":{pat}"))
        ))
    } else {
        auth.access_token
            .as_ref()
            .map(|token| format!("Bearer {token}"))
    };

    raw.map(|value| {
        value.parse().map_err(|e: reqwest::header::InvalidHeaderValue| {
            LinkError::service(format!("invalid credential value: {e}"), Some(Box::new(e)))
        })
    })
    .transpose()
}
