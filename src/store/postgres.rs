use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use super::{Collection, DataStore, StoreError};
use crate::identity::UserId;

/// Deletes straight against Postgres. The connecting role must be allowed past RLS.
#[derive(Clone)]
pub struct PgDataStore {
    pool: PgPool,
}

impl PgDataStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        info!("Created database pool (max {} connections)", max_connections);
        Ok(Self { pool })
    }

    /// The owner id is bound as text and cast to the column's type, leaving
    /// the column bare so its index stays usable.
    fn delete_statement(collection: &Collection) -> String {
        format!(
            "DELETE FROM {} WHERE {} = CAST($1 AS {})",
            Self::quote_identifier(collection.table),
            Self::quote_identifier(collection.owner_column),
            collection.owner_type
        )
    }

    /// Quote SQL identifier to prevent injection
    fn quote_identifier(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

#[async_trait]
impl DataStore for PgDataStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn delete_rows_by_owner(&self, collection: &Collection, owner: &UserId) -> Result<(), StoreError> {
        let statement = Self::delete_statement(collection);
        let result = sqlx::query(&statement)
            .bind(owner.as_str())
            .execute(&self.pool)
            .await?;
        tracing::debug!("Deleted {} row(s) from {}", result.rows_affected(), collection.table);
        Ok(())
    }
}
