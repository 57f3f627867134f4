use std::fmt;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Caller credential lifted from the `Authorization` header
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
}

impl Credential {
    /// Accepts `Bearer <token>` or a bare token. Missing, non-UTF-8 or blank headers yield `None`.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let raw = headers.get(AUTHORIZATION)?.to_str().ok()?;
        Self::parse(raw)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let token = match raw.get(..7) {
            Some(scheme) if scheme.eq_ignore_ascii_case("bearer ") => raw[7..].trim(),
            _ => raw,
        };

        if token.is_empty() {
            return None;
        }
        Some(Self {
            token: token.to_string(),
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Access-token claims issued by the auth server
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// HS256 verifier for access tokens signed with the project JWT secret
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens carry aud = "authenticated"; ownership is all we check.
        validation.validate_aud = false;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Validate signature and expiry, then require a subject
    pub fn verify(&self, token: &str) -> Result<Claims, String> {
        let token_data = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| format!("Invalid JWT token: {}", e))?;

        if token_data.claims.sub.trim().is_empty() {
            return Err("JWT token has no subject".to_string());
        }

        Ok(token_data.claims)
    }
}

impl fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtVerifier").field("algorithm", &Algorithm::HS256).finish()
    }
}
