//! HTTP plumbing shared by the API client and the update downloader.
//!
//! Thin wrapper over curl easy handles: JSON headers on every request, an
//! optional bearer token, and capped timeouts. Calls are blocking; run them
//! under `spawn_blocking` from async code.

use std::time::Duration;
use url::Url;

/// Bearer credentials for one authenticated session, passed explicitly to
/// every request that needs them. There is no process-global token.
#[derive(Debug, Clone)]
pub struct AuthContext {
    token: String,
}

impl AuthContext {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Curl(#[from] curl::Error),
}

/// Raw response: status plus the full body. Status interpretation is the
/// caller's job.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    base: Url,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl HttpClient {
    /// Builds a client for the given base URL. A missing trailing slash is
    /// added so relative joins keep the full base path.
    pub fn new(
        base_url: &str,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, HttpError> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        Ok(Self {
            base: Url::parse(&normalized)?,
            connect_timeout,
            request_timeout,
        })
    }

    pub fn from_config(cfg: &crate::config::StationConfig) -> Result<Self, HttpError> {
        Self::new(&cfg.base_url, cfg.connect_timeout(), cfg.request_timeout())
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Resolves a request path against the base URL.
    pub fn join(&self, path: &str) -> Result<Url, HttpError> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    /// Performs one JSON request and returns status plus body. Blocking.
    pub fn request(
        &self,
        method: Method,
        path: &str,
        auth: Option<&AuthContext>,
        body: Option<&[u8]>,
    ) -> Result<HttpResponse, HttpError> {
        let url = self.join(path)?;
        let mut response_body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str())?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.request_timeout)?;

        let mut list = curl::easy::List::new();
        list.append("Accept: application/json")?;
        list.append("Content-Type: application/json")?;
        if let Some(auth) = auth {
            list.append(&format!("Authorization: Bearer {}", auth.token()))?;
        }
        easy.http_headers(list)?;

        if let Some(body) = body {
            easy.post(true)?;
            easy.post_fields_copy(body)?;
        }
        match method {
            Method::Get => {}
            Method::Post => easy.post(true)?,
            Method::Patch => easy.custom_request("PATCH")?,
            Method::Delete => easy.custom_request("DELETE")?,
        }

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                response_body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        tracing::debug!(method = method.as_str(), url = %url, status, "api request");
        Ok(HttpResponse {
            status,
            body: response_body,
        })
    }
}
