use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::report::CascadeReport;
use crate::auth::Credential;
use crate::identity::{AuthUser, IdentityError, IdentityProvider, UserId};
use crate::store::{Collection, DataStore, CASCADE_ORDER};

/// Where a deletion request is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionStage {
    Gating,
    Cascading,
    RemovingIdentity,
    Done,
}

impl fmt::Display for DeletionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeletionStage::Gating => "gating",
            DeletionStage::Cascading => "cascading",
            DeletionStage::RemovingIdentity => "removing_identity",
            DeletionStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Terminal failures. Cascade errors never show up here.
#[derive(Debug, Error)]
pub enum DeletionError {
    #[error("Unauthorized")]
    Unauthorized(#[source] IdentityError),

    #[error("Failed to delete user: {0}")]
    IdentityRemoval(IdentityError),
}

impl DeletionError {
    pub fn stage(&self) -> DeletionStage {
        match self {
            DeletionError::Unauthorized(_) => DeletionStage::Gating,
            DeletionError::IdentityRemoval(_) => DeletionStage::RemovingIdentity,
        }
    }
}

#[derive(Debug)]
pub struct DeletionOutcome {
    pub user_id: UserId,
    pub report: CascadeReport,
}

/// Removes the caller's account: resolve caller, cascade their rows out of the
/// store, then delete the auth identity. Steps run strictly one after another.
pub struct AccountDeletionService {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn DataStore>,
}

impl AccountDeletionService {
    pub fn new(identity: Arc<dyn IdentityProvider>, store: Arc<dyn DataStore>) -> Self {
        Self { identity, store }
    }

    pub async fn delete_account(&self, credential: Option<&Credential>) -> Result<DeletionOutcome, DeletionError> {
        let started = Instant::now();

        let user = self.resolve_caller(credential).await?;
        info!(user_id = %user.id, stage = %DeletionStage::Cascading, "Deleting account data");

        let report = self.cascade_delete(&user.id).await;
        if report.is_clean() {
            debug!(user_id = %user.id, report = %report.to_log_json(), "Cascade complete");
        } else {
            warn!(
                user_id = %user.id,
                failed_collections = report.failed_count(),
                report = %report.to_log_json(),
                "Cascade finished with failures"
            );
        }

        info!(user_id = %user.id, stage = %DeletionStage::RemovingIdentity, "Removing auth identity");
        self.remove_identity(&user.id).await?;

        info!(
            user_id = %user.id,
            stage = %DeletionStage::Done,
            backend = self.store.backend(),
            failed_collections = report.failed_count(),
            failed = %report.failed_labels(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Account deleted"
        );

        Ok(DeletionOutcome {
            user_id: user.id,
            report,
        })
    }

    /// The target account is always the one behind the credential.
    pub async fn resolve_caller(&self, credential: Option<&Credential>) -> Result<AuthUser, DeletionError> {
        let Some(credential) = credential else {
            warn!(stage = %DeletionStage::Gating, "Rejected request without credential");
            return Err(DeletionError::Unauthorized(IdentityError::MissingCredential));
        };

        self.identity.resolve_caller(credential).await.map_err(|e| {
            warn!(stage = %DeletionStage::Gating, error = %e, "Rejected credential");
            DeletionError::Unauthorized(e)
        })
    }

    /// Best effort: every collection is attempted, failures are logged and recorded.
    pub async fn cascade_delete(&self, user_id: &UserId) -> CascadeReport {
        let mut report = CascadeReport::new(user_id.clone());

        for collection in CASCADE_ORDER.iter() {
            let outcome = self.delete_collection(collection, user_id).await;
            report.record(collection, outcome);
        }

        report
    }

    async fn delete_collection(&self, collection: &Collection, user_id: &UserId) -> Option<String> {
        match self.store.delete_rows_by_owner(collection, user_id).await {
            Ok(()) => None,
            Err(e) => {
                error!(
                    user_id = %user_id,
                    collection = collection.label,
                    table = collection.table,
                    error = %e,
                    "Error deleting {}", collection.label
                );
                Some(e.to_string())
            }
        }
    }

    pub async fn remove_identity(&self, user_id: &UserId) -> Result<(), DeletionError> {
        self.identity.delete_identity(user_id).await.map_err(|e| {
            error!(user_id = %user_id, not_found = e.is_not_found(), error = %e, "Failed to delete auth identity");
            DeletionError::IdentityRemoval(e)
        })
    }
}
