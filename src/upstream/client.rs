//! Upstream HTTP Client
//!
//! Thin `reqwest` wrapper that forwards gateway requests to the MAS and
//! MINDEX backends with a per-request timeout.

use std::time::Duration;

use reqwest::Url;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

// == Upstream Service ==
/// Backends the gateway proxies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamService {
    /// MAS / NatureOS backend (Earth-2, spore dispersal, storms, telemetry)
    Mas,
    /// MINDEX species and compound index
    Mindex,
}

impl UpstreamService {
    pub fn name(&self) -> &'static str {
        match self {
            UpstreamService::Mas => "mas",
            UpstreamService::Mindex => "mindex",
        }
    }
}

// == Upstream Error ==
/// Any reason an upstream call did not produce usable data.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} returned malformed JSON")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The proxied path cannot be forwarded as-is
    #[error("invalid upstream path: {path}")]
    InvalidPath { path: String },

    #[error("invalid upstream base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

// == Upstream Response ==
/// Successful (2xx) upstream payload.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamBody {
    Json(Value),
    Binary(Vec<u8>),
}

#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: UpstreamBody,
}

// == Upstream Client ==
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    mas_base_url: String,
    mindex_base_url: String,
}

impl UpstreamClient {
    /// Builds a client from the gateway configuration.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(
            &config.mas_api_url,
            &config.mindex_api_url,
            Duration::from_secs(config.upstream_timeout_secs),
        )
    }

    pub fn new(
        mas_base_url: &str,
        mindex_base_url: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            mas_base_url: mas_base_url.trim_end_matches('/').to_string(),
            mindex_base_url: mindex_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn base_url(&self, service: UpstreamService) -> &str {
        match service {
            UpstreamService::Mas => &self.mas_base_url,
            UpstreamService::Mindex => &self.mindex_base_url,
        }
    }

    /// Joins base URL, path and raw query string.
    ///
    /// `path` arrives percent-decoded from the router, so each segment is
    /// re-encoded on the way out; `.` and `..` segments are rejected so a
    /// request can never climb out of the base URL's path.
    pub fn url(
        &self,
        service: UpstreamService,
        path: &str,
        query: Option<&str>,
    ) -> Result<Url, UpstreamError> {
        let base = self.base_url(service);
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.iter().any(|s| *s == "." || *s == "..") {
            return Err(UpstreamError::InvalidPath {
                path: path.to_string(),
            });
        }

        let invalid_base = |reason: String| UpstreamError::InvalidBaseUrl {
            url: base.to_string(),
            reason,
        };
        let mut url = Url::parse(base).map_err(|e| invalid_base(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid_base("cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.set_query(Some(query));
        }
        Ok(url)
    }

    // == GET ==
    pub async fn get(
        &self,
        service: UpstreamService,
        path: &str,
        query: Option<&str>,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let url = self.url(service, path, query)?;
        debug!(url = %url, "Forwarding GET upstream");
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| UpstreamError::Transport {
                url: url.to_string(),
                source,
            })?;
        read_response(url.to_string(), response).await
    }

    // == POST ==
    pub async fn post_json(
        &self,
        service: UpstreamService,
        path: &str,
        query: Option<&str>,
        body: &Value,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let url = self.url(service, path, query)?;
        debug!(url = %url, "Forwarding POST upstream");
        let response = self
            .http
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|source| UpstreamError::Transport {
                url: url.to_string(),
                source,
            })?;
        read_response(url.to_string(), response).await
    }
}

/// Rejects non-2xx statuses and decodes the body.
///
/// Bodies declared as JSON must parse. Bodies with no content type are parsed
/// as JSON when possible; everything else is kept as raw bytes.
async fn read_response(
    url: String,
    response: reqwest::Response,
) -> Result<UpstreamResponse, UpstreamError> {
    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status {
            url,
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let bytes = response
        .bytes()
        .await
        .map_err(|source| UpstreamError::Transport {
            url: url.clone(),
            source,
        })?;

    let declared_json = content_type.as_deref().map_or(false, |ct| ct.contains("json"));
    let body = if declared_json || content_type.is_none() {
        match serde_json::from_slice(&bytes) {
            Ok(value) => UpstreamBody::Json(value),
            Err(source) if declared_json => return Err(UpstreamError::Decode { url, source }),
            Err(_) => UpstreamBody::Binary(bytes.to_vec()),
        }
    } else {
        UpstreamBody::Binary(bytes.to_vec())
    };

    Ok(UpstreamResponse {
        status: status.as_u16(),
        content_type,
        body,
    })
}
