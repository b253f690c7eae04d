// Backend credential login
//
// `POST /auth/login` answers with a bare `{ token, user }` object rather
// than the usual envelope, so it bypasses `parse_envelope`.

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::client::{Client, preview};
use crate::error::Error;
use crate::models::{ErrorBody, LoginResponse};

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

impl Client {
    /// Exchange email and password for a backend token.
    ///
    /// The token is *not* attached to this client; the caller decides
    /// whether the session is kept.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, Error> {
        let url = self.url("auth/login")?;
        debug!(%url, email, "backend login");

        let resp = self
            .http()
            .post(url)
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| "Login failed".into());
            return Err(if status == StatusCode::UNAUTHORIZED {
                Error::Authentication { message }
            } else {
                Error::Api {
                    status: status.as_u16(),
                    message,
                }
            });
        }

        let value: Value = serde_json::from_str(&body).map_err(|_| Error::ServiceUnavailable {
            status: status.as_u16(),
            preview: preview(&body),
        })?;

        // Some deployments wrap the payload in the standard envelope.
        let payload = match value.get("data") {
            Some(data) if data.get("token").is_some() => data.clone(),
            _ => value,
        };

        serde_json::from_value(payload).map_err(|e| Error::Deserialization {
            message: format!("login response: {e}"),
            body,
        })
    }
}
