// ID token claims
//
// Only the payload segment is decoded. Signature verification belongs to
// the backend that consumes the token; the admin app reads the `role`
// claim to gate access and nothing else.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

use crate::error::Error;

/// Role assumed when a token carries no `role` claim.
pub const DEFAULT_ROLE: &str = "user";

/// The subset of ID token claims the admin app reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Expiry, seconds since the epoch.
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Decode the payload of a JWT without verifying it.
pub fn decode_claims(token: &str) -> Result<TokenClaims, Error> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| Error::InvalidToken("expected three dot-separated segments".into()))?;

    // Some issuers pad; the no-pad engine rejects trailing '='.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| Error::InvalidToken(format!("payload is not base64url: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| Error::InvalidToken(format!("payload is not a JSON object: {e}")))
}

/// The `role` claim of `token`, or [`DEFAULT_ROLE`].
pub fn role_from_token(token: &str) -> Result<String, Error> {
    Ok(decode_claims(token)?
        .role
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| DEFAULT_ROLE.to_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn token_with(payload: &str) -> String {
        format!("eyJhbGciOiJub25lIn0.{}.sig", URL_SAFE_NO_PAD.encode(payload))
    }

    #[test]
    fn role_claim_is_read() {
        let token = token_with(r#"{"role":"admin","email":"a@x.io"}"#);
        assert_eq!(role_from_token(&token).unwrap(), "admin");
    }

    #[test]
    fn missing_role_defaults_to_user() {
        let token = token_with(r#"{"email":"a@x.io"}"#);
        assert_eq!(role_from_token(&token).unwrap(), DEFAULT_ROLE);
    }

    #[test]
    fn malformed_token_is_rejected() {
        assert!(matches!(
            role_from_token("not-a-jwt"),
            Err(Error::InvalidToken(_))
        ));
        assert!(role_from_token("a.!!!.c").is_err());
    }
}
