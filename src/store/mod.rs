use async_trait::async_trait;
use thiserror::Error;

use crate::identity::UserId;

pub mod postgres;
pub mod postgrest;

pub use postgres::PgDataStore;
pub use postgrest::PostgrestStore;

/// A user-owned table and the column that points back at the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collection {
    pub label: &'static str,
    pub table: &'static str,
    pub owner_column: &'static str,
    /// SQL type of `owner_column`
    pub owner_type: &'static str,
}

pub const MILESTONES: Collection = Collection {
    label: "milestones",
    table: "user_milestones",
    owner_column: "user_id",
    owner_type: "uuid",
};

pub const STAT_PRIORITIES: Collection = Collection {
    label: "stat-priorities",
    table: "user_stat_priorities",
    owner_column: "user_id",
    owner_type: "uuid",
};

pub const SKILLS: Collection = Collection {
    label: "skills",
    table: "skills",
    owner_column: "user_id",
    owner_type: "uuid",
};

pub const QUESTS: Collection = Collection {
    label: "quests",
    table: "quests",
    owner_column: "user_id",
    owner_type: "uuid",
};

/// Profiles are keyed by the user id itself
pub const PROFILE: Collection = Collection {
    label: "profile",
    table: "profiles",
    owner_column: "id",
    owner_type: "uuid",
};

/// Deletion order for an account's data. Profile goes last.
pub const CASCADE_ORDER: [Collection; 5] = [MILESTONES, STAT_PRIORITIES, SKILLS, QUESTS, PROFILE];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{message} (status {status})")]
    Api { status: u16, message: String },

    #[error("Invalid store endpoint: {0}")]
    Endpoint(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// The backing store holding user-owned collections
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Short backend name for logs
    fn backend(&self) -> &'static str;

    /// Delete every row in `collection` owned by `owner`. Deleting nothing is success.
    async fn delete_rows_by_owner(&self, collection: &Collection, owner: &UserId) -> Result<(), StoreError>;
}
