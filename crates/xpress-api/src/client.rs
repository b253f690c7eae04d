// Backend HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, bearer-token injection and
// envelope unwrapping. Endpoint families (products, vendors, users, auth)
// are implemented as inherent methods in separate files to keep this module
// focused on transport mechanics.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{Envelope, ErrorBody};
use crate::transport::TransportConfig;

const PREVIEW_CHARS: usize = 200;

/// Raw HTTP client for the marketplace backend.
///
/// Handles the `{ success, data, message }` envelope and attaches
/// `Authorization: Bearer <token>` to every request once a token is set.
/// All methods return unwrapped `data` payloads.
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    /// Bearer token issued by the identity provider or `/auth/login`.
    /// Swapped atomically on login/logout; readers never block.
    token: ArcSwapOption<SecretString>,
    timeout_secs: u64,
}

impl Client {
    /// Create a new backend client from a `TransportConfig`.
    ///
    /// `base_url` is the API root (e.g. `https://api.example.com` or
    /// `http://localhost:3001`); endpoint paths are joined onto it.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let mut client = Self::with_client(http, normalize_base_url(base_url)?);
        client.timeout_secs = transport.timeout_secs();
        Ok(client)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        let base_url = if base_url.path().ends_with('/') {
            base_url
        } else {
            let mut url = base_url;
            let path = format!("{}/", url.path());
            url.set_path(&path);
            url
        };
        Self {
            http,
            base_url,
            token: ArcSwapOption::empty(),
            timeout_secs: 30,
        }
    }

    /// The API base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Bearer token ─────────────────────────────────────────────────

    /// Attach a bearer token to all subsequent requests.
    pub fn set_token(&self, token: SecretString) {
        debug!("bearer token set");
        self.token.store(Some(Arc::new(token)));
    }

    /// Stop sending a bearer token.
    pub fn clear_token(&self) {
        debug!("bearer token cleared");
        self.token.store(None);
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn has_token(&self) -> bool {
        self.token.load().is_some()
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token.load_full() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"products/42"`) onto the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and unwrap the envelope.
    pub(crate) async fn get<T: DeserializeOwned + Default>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!(%url, ?params, "GET");

        let builder = self.authorize(self.http.get(url).query(params));
        let resp = self.send(builder).await?;
        self.parse_envelope(resp).await
    }

    /// Send a POST request with a JSON body and unwrap the envelope.
    pub(crate) async fn post<T: DeserializeOwned + Default>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!(%url, "POST");

        let builder = self.authorize(self.http.post(url).json(body));
        let resp = self.send(builder).await?;
        self.parse_envelope(resp).await
    }

    /// Send a PUT request with a JSON body and unwrap the envelope.
    pub(crate) async fn put<T: DeserializeOwned + Default>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!(%url, "PUT");

        let builder = self.authorize(self.http.put(url).json(body));
        let resp = self.send(builder).await?;
        self.parse_envelope(resp).await
    }

    /// Send a multipart POST/PUT and unwrap the envelope.
    pub(crate) async fn send_multipart<T: DeserializeOwned + Default>(
        &self,
        method: reqwest::Method,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!(%url, %method, "multipart");

        let builder = self.authorize(self.http.request(method, url).multipart(form));
        let resp = self.send(builder).await?;
        self.parse_envelope(resp).await
    }

    /// Send a DELETE request and unwrap the envelope.
    pub(crate) async fn delete<T: DeserializeOwned + Default>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!(%url, ?params, "DELETE");

        let builder = self.authorize(self.http.delete(url).query(params));
        let resp = self.send(builder).await?;
        self.parse_envelope(resp).await
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_secs: self.timeout_secs,
                }
            } else {
                Error::Transport(e)
            }
        })
    }

    /// Parse the `{ success, data, message }` envelope, returning `data`
    /// (or `T::default()` when absent) on success.
    ///
    /// Non-2xx responses carry the body's `message` when it is JSON, else
    /// `"HTTP {status}"`. A body that is not JSON at all is reported as
    /// [`Error::ServiceUnavailable`].
    async fn parse_envelope<T: DeserializeOwned + Default>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;
        trace!(status = status.as_u16(), bytes = body.len(), "response received");

        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }

        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|_| Error::ServiceUnavailable {
                status: status.as_u16(),
                preview: preview(&body),
            })?;

        let envelope: Envelope<T> = serde_json::from_value(value).map_err(|e| {
            Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body: body.clone(),
            }
        })?;

        if envelope.success == Some(false) {
            return Err(Error::Api {
                status: status.as_u16(),
                message: envelope
                    .message
                    .unwrap_or_else(|| "request was not successful".into()),
            });
        }

        Ok(envelope.data.unwrap_or_default())
    }
}

/// Map a non-2xx response body to an [`Error`].
pub(crate) fn error_from_body(status: StatusCode, body: &str) -> Error {
    let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) else {
        return if status == StatusCode::UNAUTHORIZED {
            Error::Authentication {
                message: "session expired or invalid token".into(),
            }
        } else {
            Error::ServiceUnavailable {
                status: status.as_u16(),
                preview: preview(body),
            }
        };
    };

    let message = parsed
        .message
        .or_else(|| parsed.error.and_then(|e| e.as_str().map(String::from)))
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    if status == StatusCode::UNAUTHORIZED {
        Error::Authentication { message }
    } else {
        Error::Api {
            status: status.as_u16(),
            message,
        }
    }
}

/// First few hundred characters of a body, cut on a char boundary.
pub(crate) fn preview(body: &str) -> String {
    body.chars().take(PREVIEW_CHARS).collect()
}

fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let mut url = Url::parse(raw)?;
    let path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&format!("{path}/"));
    Ok(url)
}
