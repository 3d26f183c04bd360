//! Connection pool: a fixed set of endpoints visited round-robin.
//!
//! Every endpoint owns its own `reqwest::Client`. A request goes through the
//! endpoint picked by [`ConnectionPool::next`]; if the connection is broken
//! (refused, reset, could not send) that one endpoint is rebuilt and the same
//! request is sent once more. A second failure is returned as
//! [`ChatError::Transport`].

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Method;
use tracing::{debug, warn};

use crate::error::ChatError;

/// Retries allowed per request, scoped to the endpoint that failed.
pub const MAX_RETRIES: usize = 1;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

// ─────────────────────────────────────────────
// Endpoint
// ─────────────────────────────────────────────

/// One transport target: `scheme://host[:port]` plus an optional path prefix.
pub struct Endpoint {
    /// Base URL without trailing slash (e.g. `"https://api.openai.com"`).
    base_url: String,
    /// Host part, for logs and replies.
    host: String,
    client: Option<reqwest::Client>,
    /// How many times the client has been rebuilt.
    generation: u32,
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("base_url", &self.base_url)
            .field("open", &self.client.is_some())
            .field("generation", &self.generation)
            .finish()
    }
}

impl Endpoint {
    /// Bind an endpoint to a host spec such as `api.openai.com`,
    /// `http://127.0.0.1:5000`, or `https://proxy.example.com/openai`.
    /// A missing scheme means `https`.
    pub fn new(target: &str) -> Result<Self, ChatError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(ChatError::Configuration("empty api host".to_string()));
        }

        // Scheme first, so "https://" leaves nothing behind as a host.
        let (scheme, rest) = match target.split_once("://") {
            Some((scheme, rest)) => (scheme.to_lowercase(), rest),
            None => ("https".to_string(), target),
        };
        let rest = rest.trim_end_matches('/');
        let host = rest.split('/').next().unwrap_or_default().to_string();
        if host.is_empty() || host.starts_with(':') || host.ends_with(':') {
            return Err(ChatError::Configuration(format!("invalid api host: {target}")));
        }

        Ok(Endpoint {
            base_url: format!("{scheme}://{rest}"),
            host,
            client: Some(build_client()?),
            generation: 0,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn is_open(&self) -> bool {
        self.client.is_some()
    }

    /// Full URL for a request path (which may carry a query string).
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Drop the current client and build a fresh one.
    pub fn recreate(&mut self) -> Result<(), ChatError> {
        self.client = Some(build_client()?);
        self.generation += 1;
        debug!(host = %self.host, generation = self.generation, "endpoint recreated");
        Ok(())
    }

    /// Release the client. The next request reopens it.
    pub fn close(&mut self) {
        self.client = None;
    }

    /// The live client, reopening a closed endpoint without counting it as a
    /// recreation.
    fn open_client(&mut self) -> Result<reqwest::Client, ChatError> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }
        let client = build_client()?;
        self.client = Some(client.clone());
        Ok(client)
    }

    async fn dispatch(
        &self,
        client: &reqwest::Client,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        headers: &HeaderMap,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let mut request = client.request(method, self.url(path)).headers(headers.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await
    }
}

fn build_client() -> Result<reqwest::Client, ChatError> {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| ChatError::Configuration(format!("failed to build HTTP client: {e}")))
}

/// Broken-connection failures worth one retry. Timeouts are not.
fn is_transient(err: &reqwest::Error) -> bool {
    !err.is_timeout() && (err.is_connect() || err.is_request())
}

// ─────────────────────────────────────────────
// Raw response
// ─────────────────────────────────────────────

/// A fully read 2xx response.
#[derive(Debug)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
    /// Host of the endpoint that served the request.
    pub host: String,
}

impl RawResponse {
    async fn read(response: reqwest::Response, host: &str) -> Result<Self, ChatError> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(|source| ChatError::Transport {
            host: host.to_string(),
            source,
        })?;

        if !status.is_success() {
            warn!(host = %host, status = %status, body = %body, "API error");
            return Err(ChatError::Provider {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body,
            });
        }

        Ok(RawResponse {
            status: status.as_u16(),
            headers,
            body,
            host: host.to_string(),
        })
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> Result<serde_json::Value, ChatError> {
        serde_json::from_str(&self.body)
            .map_err(|e| ChatError::malformed(format!("invalid JSON body: {e}")))
    }

    /// A response header as text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

// ─────────────────────────────────────────────
// ConnectionPool
// ─────────────────────────────────────────────

/// Ordered endpoints plus a rotation cursor.
///
/// Owned by a single session; calls never overlap, so no locking.
#[derive(Debug)]
pub struct ConnectionPool {
    endpoints: Vec<Endpoint>,
    cursor: usize,
}

impl ConnectionPool {
    /// One endpoint per host. Fails if `hosts` is empty or any host is invalid.
    pub fn new<S: AsRef<str>>(hosts: &[S]) -> Result<Self, ChatError> {
        if hosts.is_empty() {
            return Err(ChatError::Configuration("no api host configured".to_string()));
        }
        let endpoints = hosts
            .iter()
            .map(|h| Endpoint::new(h.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(endpoints = endpoints.len(), "connection pool created");
        Ok(ConnectionPool {
            endpoints,
            cursor: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Index the next call to [`next`](Self::next) will return.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Return the current endpoint and advance the cursor.
    pub fn next(&mut self) -> &Endpoint {
        let index = self.advance();
        &self.endpoints[index]
    }

    /// POST `payload` to `path` through the next endpoint.
    pub async fn request(
        &mut self,
        path: &str,
        payload: &serde_json::Value,
        headers: &HeaderMap,
    ) -> Result<RawResponse, ChatError> {
        self.send(Method::POST, path, Some(payload), headers).await
    }

    /// Send a request through the next endpoint, retrying once on a broken connection.
    pub async fn send(
        &mut self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        headers: &HeaderMap,
    ) -> Result<RawResponse, ChatError> {
        let index = self.advance();
        self.send_at(index, method, path, body, headers).await
    }

    /// Claim the next endpoint index for a multi-call exchange that must stay
    /// on one host.
    pub(crate) fn claim(&mut self) -> usize {
        self.advance()
    }

    /// Send through a specific endpoint (no cursor movement).
    pub(crate) async fn send_at(
        &mut self,
        index: usize,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        headers: &HeaderMap,
    ) -> Result<RawResponse, ChatError> {
        let endpoint = &mut self.endpoints[index];
        let mut retries = 0;

        loop {
            let client = endpoint.open_client()?;
            debug!(host = %endpoint.host, %method, path = %redact(path), "sending request");
            match endpoint.dispatch(&client, method.clone(), path, body, headers).await {
                Ok(response) => return RawResponse::read(response, &endpoint.host).await,
                Err(e) if is_transient(&e) && retries < MAX_RETRIES => {
                    warn!(host = %endpoint.host, error = %e, "connection issue, retrying");
                    endpoint.recreate()?;
                    retries += 1;
                }
                Err(source) => {
                    warn!(host = %endpoint.host, error = %source, "request failed");
                    return Err(ChatError::Transport {
                        host: endpoint.host.clone(),
                        source,
                    });
                }
            }
        }
    }

    /// Rebuild every endpoint.
    pub fn recreate_all(&mut self) -> Result<(), ChatError> {
        self.endpoints.iter_mut().try_for_each(Endpoint::recreate)
    }

    /// Rebuild one endpoint.
    pub fn recreate(&mut self, index: usize) -> Result<(), ChatError> {
        let len = self.endpoints.len();
        self.endpoints
            .get_mut(index)
            .ok_or_else(|| {
                ChatError::Configuration(format!("endpoint {index} out of range (pool of {len})"))
            })?
            .recreate()
    }

    /// Release every endpoint's client.
    pub fn close(&mut self) {
        self.endpoints.iter_mut().for_each(Endpoint::close);
    }

    fn advance(&mut self) -> usize {
        let index = self.cursor;
        self.cursor = (self.cursor + 1) % self.endpoints.len();
        index
    }
}

/// Hide query strings (they may carry an API key) in logs.
fn redact(path: &str) -> &str {
    path.split('?').next().unwrap_or(path)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
