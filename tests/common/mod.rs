#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{Duration as TokenLifetime, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::StatusCode;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use account_deletion_api::{app, build_state, config::AppConfig};

pub const SERVICE_KEY: &str = "service-role-key";
pub const JWT_SECRET: &str = "project-jwt-secret";

/// HS256 access token for `sub`, valid for an hour
pub fn mint_token(sub: &str, secret: &str) -> String {
    let now = Utc::now();
    let claims = serde_json::json!({
        "sub": sub,
        "aud": "authenticated",
        "role": "authenticated",
        "iat": now.timestamp(),
        "exp": (now + TokenLifetime::hours(1)).timestamp(),
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .expect("token encodes")
}

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
}

impl TestServer {
    /// Serve the app on a free port with every collaborator pointed at `upstream`
    pub async fn spawn(upstream: &MockServer) -> Result<Self> {
        Self::spawn_with(upstream, &[]).await
    }

    /// Same as `spawn`, with extra environment entries
    pub async fn spawn_with(upstream: &MockServer, extra: &[(&str, &str)]) -> Result<Self> {
        let upstream_url = upstream.uri();
        let extra: Vec<(String, String)> = extra
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let config = AppConfig::from_lookup(|key| match key {
            "SUPABASE_URL" => Some(upstream_url.clone()),
            "SUPABASE_SERVICE_ROLE_KEY" => Some(SERVICE_KEY.to_string()),
            _ => extra.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone()),
        })?;
        let state = build_state(&config).await?;

        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let server = Self {
            port,
            base_url: format!("http://127.0.0.1:{}", port),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    pub fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

/// Auth API resolves `token` to `user_id`
pub async fn mount_session(upstream: &MockServer, token: &str, user_id: &str) {
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": user_id,
            "aud": "authenticated",
            "role": "authenticated",
            "email": format!("{}@example.com", user_id),
        })))
        .mount(upstream)
        .await;
}

/// Every REST delete answers with `status`
pub async fn mount_rest_deletes(upstream: &MockServer, table: &str, status: u16) {
    let template = if status < 300 {
        ResponseTemplate::new(status)
    } else {
        ResponseTemplate::new(status).set_body_json(serde_json::json!({
            "code": "42501",
            "message": format!("permission denied for table {}", table),
        }))
    };

    Mock::given(method("DELETE"))
        .and(path(format!("/rest/v1/{}", table)))
        .respond_with(template)
        .mount(upstream)
        .await;
}

/// Request paths the upstream saw, in arrival order
pub async fn received_paths(upstream: &MockServer) -> Vec<String> {
    upstream
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| format!("{} {}", r.method, r.url.path()))
        .collect()
}
