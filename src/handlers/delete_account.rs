use std::any::Any;
use std::panic::AssertUnwindSafe;

use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Json, Response},
};
use futures::FutureExt;
use serde_json::json;
use tracing::error;

use crate::app::AppState;
use crate::auth::Credential;
use crate::error::ApiError;
use crate::middleware::preflight;

pub const SUCCESS_MESSAGE: &str = "User account deleted successfully";

/// POST /delete-user-account - permanently delete the caller's account
///
/// `OPTIONS` is answered as a CORS preflight. Every other method runs the
/// deletion for the account behind the `Authorization` header; there is no
/// way to name a different user.
///
/// Expected Output (Success, 200):
/// ```json
/// { "message": "User account deleted successfully" }
/// ```
///
/// Expected Output (Failure, 400):
/// ```json
/// { "error": "Unauthorized" }
/// { "error": "Failed to delete user: <provider detail>" }
/// ```
pub async fn delete_account(State(state): State<AppState>, method: Method, headers: HeaderMap) -> Response {
    if method == Method::OPTIONS {
        return preflight();
    }

    let credential = Credential::from_headers(&headers);
    let service = state.deletion.clone();

    // Single boundary: errors and panics alike leave as a JSON error body.
    let result = AssertUnwindSafe(async move { service.delete_account(credential.as_ref()).await })
        .catch_unwind()
        .await;

    match result {
        Ok(Ok(_)) => (StatusCode::OK, Json(json!({ "message": SUCCESS_MESSAGE }))).into_response(),
        Ok(Err(e)) => ApiError::from(e).into_response(),
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!("Account deletion aborted unexpectedly: {}", message);
            ApiError::unexpected(message).into_response()
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Internal error".to_string()
    }
}
