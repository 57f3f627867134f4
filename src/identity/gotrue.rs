use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::{AuthUser, IdentityError, IdentityProvider, UserId};
use crate::auth::{Credential, JwtVerifier};
use crate::upstream;

/// Client for a GoTrue-compatible auth API (`/auth/v1`)
///
/// Caller lookups go out with the caller's own token; admin deletes are
/// authorised with the service-role key.
#[derive(Clone)]
pub struct GoTrueClient {
    http: reqwest::Client,
    base_url: Url,
    service_key: String,
    verifier: Option<JwtVerifier>,
}

impl GoTrueClient {
    pub fn new(http: reqwest::Client, project_url: &Url, service_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: upstream::base_url(project_url),
            service_key: service_key.into(),
            verifier: None,
        }
    }

    /// Pre-check caller tokens with the project JWT secret before calling `/user`
    pub fn with_jwt_verifier(mut self, verifier: JwtVerifier) -> Self {
        self.verifier = Some(verifier);
        self
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, IdentityError> {
        let mut url = self.base_url.join("auth/v1/").map_err(|e| IdentityError::Decode(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| IdentityError::Decode("auth URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn fetch_user(&self, credential: &Credential) -> Result<AuthUser, IdentityError> {
        let url = self.endpoint(&["user"])?;
        let response = self
            .http
            .get(url)
            .header("apikey", &self.service_key)
            .bearer_auth(credential.token())
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, message) = upstream::error_detail(response).await;
            return Err(IdentityError::Provider { status, message });
        }

        let user: AuthUser = response
            .json()
            .await
            .map_err(|e| IdentityError::Decode(e.to_string()))?;
        if user.id.as_str().trim().is_empty() {
            return Err(IdentityError::Decode("user has no id".to_string()));
        }
        Ok(user)
    }
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn resolve_caller(&self, credential: &Credential) -> Result<AuthUser, IdentityError> {
        // Local verification only filters out forged or expired tokens early;
        // the auth API still has to confirm the session is live.
        let expected_sub = match &self.verifier {
            Some(verifier) => Some(
                verifier
                    .verify(credential.token())
                    .map_err(IdentityError::InvalidCredential)?
                    .sub,
            ),
            None => None,
        };

        let user = self.fetch_user(credential).await?;

        if let Some(sub) = expected_sub {
            if sub != user.id.as_str() {
                debug!("Token subject {} does not match session user {}", sub, user.id);
                return Err(IdentityError::InvalidCredential(
                    "token subject does not match session user".to_string(),
                ));
            }
        }
        Ok(user)
    }

    async fn delete_identity(&self, user_id: &UserId) -> Result<(), IdentityError> {
        let url = self.endpoint(&["admin", "users", user_id.as_str()])?;
        let response = self
            .http
            .delete(url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, message) = upstream::error_detail(response).await;
            return Err(IdentityError::Provider { status, message });
        }
        Ok(())
    }
}
