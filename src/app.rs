use std::sync::Arc;

use axum::{
    routing::{any, get},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::JwtVerifier;
use crate::config::{AppConfig, StoreBackend};
use crate::handlers;
use crate::identity::{GoTrueClient, IdentityProvider};
use crate::middleware::cors_headers;
use crate::services::AccountDeletionService;
use crate::store::{DataStore, PgDataStore, PostgrestStore, StoreError};

/// Shared per-process state; requests share nothing else
#[derive(Clone)]
pub struct AppState {
    pub deletion: Arc<AccountDeletionService>,
}

impl AppState {
    pub fn new(deletion: AccountDeletionService) -> Self {
        Self {
            deletion: Arc::new(deletion),
        }
    }
}

/// Wire the configured collaborators together
pub async fn build_state(config: &AppConfig) -> Result<AppState, StoreError> {
    let http = reqwest::Client::new();
    let supabase = &config.supabase;

    let mut gotrue = GoTrueClient::new(http.clone(), &supabase.url, supabase.service_role_key.clone());
    if let Some(secret) = &supabase.jwt_secret {
        info!("Pre-checking caller tokens with the JWT secret");
        gotrue = gotrue.with_jwt_verifier(JwtVerifier::new(secret));
    }
    let identity: Arc<dyn IdentityProvider> = Arc::new(gotrue);

    let store: Arc<dyn DataStore> = match &config.store.backend {
        StoreBackend::Rest => Arc::new(PostgrestStore::new(
            http,
            &supabase.url,
            supabase.service_role_key.clone(),
        )),
        StoreBackend::Postgres { database_url } => {
            Arc::new(PgDataStore::connect(database_url, config.store.max_connections).await?)
        }
    };
    info!("Using {} data store", store.backend());

    Ok(AppState::new(AccountDeletionService::new(identity, store)))
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", any(handlers::delete_account))
        .route("/delete-user-account", any(handlers::delete_account))
        .route("/health", get(handlers::health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_headers()),
        )
        .with_state(state)
}
