use async_trait::async_trait;
use url::Url;

use super::{Collection, DataStore, StoreError};
use crate::identity::UserId;
use crate::upstream;

/// Deletes through the project's PostgREST API with the service-role key,
/// which bypasses row-level security.
#[derive(Clone)]
pub struct PostgrestStore {
    http: reqwest::Client,
    base_url: Url,
    service_key: String,
}

impl PostgrestStore {
    pub fn new(http: reqwest::Client, project_url: &Url, service_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: upstream::base_url(project_url),
            service_key: service_key.into(),
        }
    }

    /// `{base}/rest/v1/{table}?{owner_column}=eq.{owner}`
    fn delete_url(&self, collection: &Collection, owner: &UserId) -> Result<Url, StoreError> {
        let mut url = self
            .base_url
            .join("rest/v1/")
            .map_err(|e| StoreError::Endpoint(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Endpoint("REST URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(collection.table);
        url.query_pairs_mut()
            .append_pair(collection.owner_column, &format!("eq.{}", owner));
        Ok(url)
    }
}

#[async_trait]
impl DataStore for PostgrestStore {
    fn backend(&self) -> &'static str {
        "postgrest"
    }

    async fn delete_rows_by_owner(&self, collection: &Collection, owner: &UserId) -> Result<(), StoreError> {
        let url = self.delete_url(collection, owner)?;
        let response = self
            .http
            .delete(url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("Prefer", "return=minimal")
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, message) = upstream::error_detail(response).await;
            return Err(StoreError::Api { status, message });
        }
        Ok(())
    }
}
