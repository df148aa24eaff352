//! Repository registry API implementation

use super::client::segment;
use super::{ApiError, Client};
use serde::{Deserialize, Serialize};

#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Registry {
    pub id: i64,
    pub address: String,
    pub username: String,
    pub password: String,
    pub email: String,
    pub token: String,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("id", &self.id)
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &"(sensitive)")
            .field("email", &self.email)
            .field("token", &"(sensitive)")
            .finish()
    }
}

pub struct RegistriesApi<'a> {
    client: &'a Client,
}

impl<'a> RegistriesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn collection(owner: &str, name: &str) -> String {
        format!("/repos/{}/{}/registry", segment(owner), segment(name))
    }

    fn item(owner: &str, name: &str, address: &str) -> String {
        format!("{}/{}", Self::collection(owner, name), segment(address))
    }

    pub async fn get(&self, owner: &str, name: &str, address: &str) -> Result<Registry, ApiError> {
        self.client.get(&Self::item(owner, name, address)).await
    }

    pub async fn create<B: Serialize + ?Sized>(
        &self,
        owner: &str,
        name: &str,
        body: &B,
    ) -> Result<Registry, ApiError> {
        self.client.post(&Self::collection(owner, name), body).await
    }

    pub async fn update<B: Serialize + ?Sized>(
        &self,
        owner: &str,
        name: &str,
        address: &str,
        body: &B,
    ) -> Result<Registry, ApiError> {
        self.client
            .patch(&Self::item(owner, name, address), body)
            .await
    }

    pub async fn delete(&self, owner: &str, name: &str, address: &str) -> Result<(), ApiError> {
        self.client.delete(&Self::item(owner, name, address)).await
    }
}
