//! TMDB access: two independent HTTP transports raced against each other,
//! followed by a fixed retry chain without the bearer credential.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::{self, Either};
use reqwest::{header, Client, Response, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::TmdbConfig;

/// Failure of a single transport attempt.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("JSON parse failed: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum TmdbError {
    #[error("all TMDB attempts failed for '{path}': {last}")]
    Exhausted { path: String, last: FetchError },
}

/// Which credential a transport attaches to an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    Bearer,
    KeyOnly,
}

/// One logical TMDB call: a path relative to the API base plus query parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    pub fn get_param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    fn name(&self) -> &'static str;
    async fn get(&self, request: &ApiRequest, auth: Auth) -> Result<Value, FetchError>;
}

/// The query surface used by the catalog.
#[async_trait]
pub trait TmdbApi: Send + Sync {
    async fn fetch(&self, request: &ApiRequest) -> Result<Value, TmdbError>;
}

/// Pooled client; parameters go through the request builder and the
/// bearer header is the only credential it sends.
pub struct ClientTransport {
    client: Client,
    base_url: String,
    language: String,
    access_token: String,
}

impl ClientTransport {
    pub fn new(config: &TmdbConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        let client = Client::builder()
            .user_agent(format!("cineflow/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .context("Failed to build TMDB HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            language: config.language.clone(),
            access_token: config.access_token.clone(),
        })
    }
}

#[async_trait]
impl Transport for ClientTransport {
    fn name(&self) -> &'static str {
        "client"
    }

    async fn get(&self, request: &ApiRequest, auth: Auth) -> Result<Value, FetchError> {
        let url = format!("{}/{}", self.base_url, request.path);
        let mut builder = self
            .client
            .get(url)
            .query(&[("language", self.language.as_str())])
            .query(&request.params);
        if auth == Auth::Bearer {
            builder = builder.bearer_auth(&self.access_token);
        }
        read_json(builder.send().await?).await
    }
}

/// Hand-built URL carrying `api_key`, sent on its own unpooled client.
pub struct UrlTransport {
    client: Client,
    base_url: String,
    language: String,
    api_key: String,
    access_token: String,
}

impl UrlTransport {
    pub fn new(config: &TmdbConfig) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .context("Failed to build TMDB fallback HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            language: config.language.clone(),
            api_key: config.api_key.clone(),
            access_token: config.access_token.clone(),
        })
    }

    fn url_for(&self, request: &ApiRequest) -> String {
        let mut url = format!(
            "{}/{}?api_key={}&language={}",
            self.base_url,
            request.path,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.language)
        );
        for (key, value) in &request.params {
            url.push('&');
            url.push_str(&urlencoding::encode(key));
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }
}

#[async_trait]
impl Transport for UrlTransport {
    fn name(&self) -> &'static str {
        "url"
    }

    async fn get(&self, request: &ApiRequest, auth: Auth) -> Result<Value, FetchError> {
        let mut builder = self
            .client
            .get(self.url_for(request))
            .header(header::ACCEPT, "application/json");
        if auth == Auth::Bearer {
            builder = builder.bearer_auth(&self.access_token);
        }
        read_json(builder.send().await?).await
    }
}

async fn read_json(res: Response) -> Result<Value, FetchError> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        return Err(FetchError::Status { status, body: text });
    }
    Ok(serde_json::from_str(&text)?)
}

/// Races the bearer transport against the keyed transport, then falls back
/// to the keyed transport without the bearer header, twice.
#[derive(Clone)]
pub struct TmdbClient {
    bearer: Arc<dyn Transport>,
    keyed: Arc<dyn Transport>,
    request_timeout: Duration,
    retry_backoff: Duration,
}

impl TmdbClient {
    pub fn new(config: &TmdbConfig) -> Result<Self> {
        Ok(Self::with_transports(
            Arc::new(ClientTransport::new(config)?),
            Arc::new(UrlTransport::new(config)?),
            config.request_timeout,
            config.retry_backoff,
        ))
    }

    pub fn with_transports(
        bearer: Arc<dyn Transport>,
        keyed: Arc<dyn Transport>,
        request_timeout: Duration,
        retry_backoff: Duration,
    ) -> Self {
        Self {
            bearer,
            keyed,
            request_timeout,
            retry_backoff,
        }
    }

    async fn attempt(
        &self,
        transport: &dyn Transport,
        request: &ApiRequest,
        auth: Auth,
    ) -> Result<Value, FetchError> {
        match tokio::time::timeout(self.request_timeout, transport.get(request, auth)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.request_timeout)),
        }
    }
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn fetch(&self, request: &ApiRequest) -> Result<Value, TmdbError> {
        let path = request.path.as_str();
        let bearer = Box::pin(self.attempt(self.bearer.as_ref(), request, Auth::Bearer));
        let keyed = Box::pin(self.attempt(self.keyed.as_ref(), request, Auth::Bearer));

        let (first, rest, first_name, rest_name) = match future::select(bearer, keyed).await {
            Either::Left((result, rest)) => (result, rest, self.bearer.name(), self.keyed.name()),
            Either::Right((result, rest)) => (result, rest, self.keyed.name(), self.bearer.name()),
        };
        match first {
            Ok(body) => {
                debug!(path, transport = first_name, "TMDB race won");
                return Ok(body);
            }
            Err(e) => warn!(path, transport = first_name, error = %e, "TMDB attempt failed"),
        }
        match rest.await {
            Ok(body) => {
                debug!(path, transport = rest_name, "TMDB race won after first failure");
                return Ok(body);
            }
            Err(e) => warn!(path, transport = rest_name, error = %e, "TMDB attempt failed"),
        }

        match self.attempt(self.keyed.as_ref(), request, Auth::KeyOnly).await {
            Ok(body) => return Ok(body),
            Err(e) => warn!(path, error = %e, "TMDB retry without bearer failed"),
        }

        tokio::time::sleep(self.retry_backoff).await;
        match self.attempt(self.keyed.as_ref(), request, Auth::KeyOnly).await {
            Ok(body) => Ok(body),
            Err(last) => {
                warn!(path, error = %last, "TMDB delayed retry failed");
                Err(TmdbError::Exhausted {
                    path: path.to_string(),
                    last,
                })
            }
        }
    }
}
