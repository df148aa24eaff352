//! Repository cron API implementation
//!
//! The remote addresses crons by numeric id only; lookups by name go
//! through [`CronsApi::find_by_name`].

use super::client::segment;
use super::{ApiError, Client};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cron {
    pub id: i64,
    pub name: String,
    pub repo_id: i64,
    pub creator_id: i64,
    pub next_exec: i64,
    pub schedule: String,
    pub created_at: i64,
    pub branch: String,
}

pub struct CronsApi<'a> {
    client: &'a Client,
}

impl<'a> CronsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn collection(owner: &str, name: &str) -> String {
        format!("/repos/{}/{}/cron", segment(owner), segment(name))
    }

    fn item(owner: &str, name: &str, id: i64) -> String {
        format!("{}/{}", Self::collection(owner, name), id)
    }

    pub async fn list(&self, owner: &str, name: &str) -> Result<Vec<Cron>, ApiError> {
        self.client.get(&Self::collection(owner, name)).await
    }

    /// Linear search over the listing; NotFound when no cron has that name.
    pub async fn find_by_name(
        &self,
        owner: &str,
        name: &str,
        cron_name: &str,
    ) -> Result<Cron, ApiError> {
        self.list(owner, name)
            .await?
            .into_iter()
            .find(|cron| cron.name == cron_name)
            .ok_or_else(|| ApiError::NotFound(format!("cron '{}' in {}/{}", cron_name, owner, name)))
    }

    pub async fn get(&self, owner: &str, name: &str, id: i64) -> Result<Cron, ApiError> {
        self.client.get(&Self::item(owner, name, id)).await
    }

    pub async fn create<B: Serialize + ?Sized>(
        &self,
        owner: &str,
        name: &str,
        body: &B,
    ) -> Result<Cron, ApiError> {
        self.client.post(&Self::collection(owner, name), body).await
    }

    pub async fn update<B: Serialize + ?Sized>(
        &self,
        owner: &str,
        name: &str,
        id: i64,
        body: &B,
    ) -> Result<Cron, ApiError> {
        self.client.patch(&Self::item(owner, name, id), body).await
    }

    pub async fn delete(&self, owner: &str, name: &str, id: i64) -> Result<(), ApiError> {
        self.client.delete(&Self::item(owner, name, id)).await
    }
}
