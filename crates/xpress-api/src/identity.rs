// Identity provider client
//
// Talks to the identity toolkit REST surface (`accounts:*` methods). Every
// call carries the project's web API key as `?key=`. Failures come back as
// `{ "error": { "code": 400, "message": "INVALID_PASSWORD" } }`.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::client::preview;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Default identity toolkit endpoint.
pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1/";

/// Result of a successful sign-in.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySession {
    /// Signed ID token; its payload carries the custom `role` claim.
    pub id_token: String,
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Token lifetime in seconds, sent as a string.
    #[serde(default)]
    pub expires_in: Option<String>,
}

#[derive(Deserialize)]
struct IdentityErrorBody {
    error: IdentityErrorDetail,
}

#[derive(Deserialize)]
struct IdentityErrorDetail {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordSignIn<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpSignIn<'a> {
    post_body: String,
    request_uri: &'a str,
    return_secure_token: bool,
    return_idp_credential: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OobRequest<'a> {
    request_type: &'a str,
    email: &'a str,
}

/// Client for the hosted identity provider.
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
}

impl IdentityClient {
    /// Build a client. `base_url` defaults to [`DEFAULT_IDENTITY_URL`].
    pub fn new(
        api_key: SecretString,
        base_url: Option<&str>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, api_key, base_url)
    }

    pub fn with_client(
        http: reqwest::Client,
        api_key: SecretString,
        base_url: Option<&str>,
    ) -> Result<Self, Error> {
        let raw = base_url.unwrap_or(DEFAULT_IDENTITY_URL);
        let mut base_url = Url::parse(raw)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    /// `accounts:signInWithPassword`
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IdentitySession, Error> {
        debug!(email, "identity password sign-in");
        self.call(
            "accounts:signInWithPassword",
            &PasswordSignIn {
                email,
                password,
                return_secure_token: true,
            },
        )
        .await
    }

    /// `accounts:signInWithIdp` using a Google ID token obtained out of band.
    pub async fn sign_in_with_idp(&self, provider_id_token: &str) -> Result<IdentitySession, Error> {
        debug!("identity federated sign-in");
        let post_body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("id_token", provider_id_token)
            .append_pair("providerId", "google.com")
            .finish();
        self.call(
            "accounts:signInWithIdp",
            &IdpSignIn {
                post_body,
                request_uri: "http://localhost",
                return_secure_token: true,
                return_idp_credential: true,
            },
        )
        .await
    }

    /// `accounts:sendOobCode` with `PASSWORD_RESET`.
    pub async fn send_password_reset(&self, email: &str) -> Result<(), Error> {
        debug!(email, "requesting password reset email");
        let _: serde_json::Value = self
            .call(
                "accounts:sendOobCode",
                &OobRequest {
                    request_type: "PASSWORD_RESET",
                    email,
                },
            )
            .await?;
        Ok(())
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        // `accounts:foo` would otherwise parse as a URL with scheme `accounts`.
        let mut url = self.base_url.join(&format!("./{method}"))?;
        url.query_pairs_mut()
            .append_pair("key", self.api_key.expose_secret());

        let resp = self.http.post(url).json(body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<IdentityErrorBody>(&text) {
                Ok(parsed) => Error::Identity {
                    code: if parsed.error.code == 0 {
                        status.as_u16()
                    } else {
                        parsed.error.code
                    },
                    message: parsed.error.message,
                },
                Err(_) => Error::ServiceUnavailable {
                    status: status.as_u16(),
                    preview: preview(&text),
                },
            });
        }

        serde_json::from_str(&text).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: text,
        })
    }
}
