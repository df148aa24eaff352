//! Repository registry resource
//!
//! Credentials for pulling pipeline images from a private registry.

use super::{key, RemoteResource};
use crate::api::{Client, Registry};
use crate::error::Result;
use async_trait::async_trait;
use tfplug::{DynamicValue, FieldSpec, FieldTable, Patch, ValueKind};

static FIELDS: [FieldSpec; 8] = [
    FieldSpec::key("repo_owner", ValueKind::String)
        .path_only()
        .describe("User or organization responsible for repository"),
    FieldSpec::key("repo_name", ValueKind::String)
        .path_only()
        .describe("Repository name"),
    FieldSpec::key("address", ValueKind::String).describe("Registry Address"),
    FieldSpec::required("username", ValueKind::String).describe("Registry Username"),
    FieldSpec::required("password", ValueKind::String)
        .sensitive()
        .describe("Registry Password"),
    FieldSpec::optional("token", ValueKind::String)
        .sensitive()
        .describe("Registry Token"),
    FieldSpec::optional("email", ValueKind::String).describe("Registry Email"),
    FieldSpec::computed("id", ValueKind::Int64),
];

pub const REPOSITORY_REGISTRY_FIELDS: FieldTable = FieldTable::new(&FIELDS);

#[derive(Debug, Default)]
pub struct RepositoryRegistryResource;

#[async_trait]
impl RemoteResource for RepositoryRegistryResource {
    const TYPE_NAME: &'static str = "woodpecker_repository_registry";
    const NOUN: &'static str = "repository registry";
    const DESCRIPTION: &'static str = "Provides a repository registry.";
    const FIELDS: FieldTable = REPOSITORY_REGISTRY_FIELDS;
    const IMPORT_ID: &'static [&'static str] = &["repo_owner", "repo_name", "address"];

    type Remote = Registry;

    async fn create(
        &self,
        client: &Client,
        planned: &DynamicValue,
        patch: Patch,
    ) -> Result<Registry> {
        let owner = key(planned, "repo_owner")?;
        let repo = key(planned, "repo_name")?;
        let body = patch.with_key(planned, "address");
        Ok(client.registries().create(&owner, &repo, &body).await?)
    }

    async fn read(&self, client: &Client, state: &DynamicValue) -> Result<Registry> {
        let owner = key(state, "repo_owner")?;
        let repo = key(state, "repo_name")?;
        let address = key(state, "address")?;
        Ok(client.registries().get(&owner, &repo, &address).await?)
    }

    async fn update(&self, client: &Client, state: &DynamicValue, patch: Patch) -> Result<Registry> {
        let owner = key(state, "repo_owner")?;
        let repo = key(state, "repo_name")?;
        let address = key(state, "address")?;
        let body = patch.with_key(state, "address");
        Ok(client
            .registries()
            .update(&owner, &repo, &address, &body)
            .await?)
    }

    async fn delete(&self, client: &Client, state: &DynamicValue) -> Result<()> {
        let owner = key(state, "repo_owner")?;
        let repo = key(state, "repo_name")?;
        let address = key(state, "address")?;
        Ok(client.registries().delete(&owner, &repo, &address).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::{instance, provider_data, s};
    use crate::resources::ManagedResource;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use tfplug::resource::{CreateResourceRequest, ReadResourceRequest};
    use tfplug::{Context, Dynamic, Resource};

    #[tokio::test]
    async fn create_resolves_unknown_token_from_empty_echo() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/repos/octocat/hello/registry")
            .match_body(Matcher::Json(json!({
                "address": "ghcr.io",
                "username": "bot",
                "password": "pw-123"
            })))
            .with_body(r#"{"id":2,"address":"ghcr.io","username":"bot","password":"","email":"","token":""}"#)
            .create_async()
            .await;

        let planned = instance(&[
            ("repo_owner", s("octocat")),
            ("repo_name", s("hello")),
            ("address", s("ghcr.io")),
            ("username", s("bot")),
            ("password", s("pw-123")),
            ("token", Dynamic::Unknown),
            ("email", Dynamic::Unknown),
            ("id", Dynamic::Unknown),
        ]);

        let resource =
            ManagedResource::<RepositoryRegistryResource>::new(provider_data(&server.url()));
        let response = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "woodpecker_repository_registry".to_string(),
                    planned_state: planned.clone(),
                    config: planned,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        let state = response.new_state;
        assert_eq!(state.get("password"), Some(&s("pw-123")));
        assert_eq!(state.get("token"), Some(&s("")));
        assert_eq!(state.get("email"), Some(&s("")));
        assert_eq!(state.get("id"), Some(&Dynamic::Number(2.0)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn read_uses_encoded_address() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/repos/octocat/hello/registry/ghcr.io%2Facme")
            .with_body(r#"{"id":2,"address":"ghcr.io/acme","username":"robot","password":"","email":"bot@acme.io","token":""}"#)
            .create_async()
            .await;

        let resource =
            ManagedResource::<RepositoryRegistryResource>::new(provider_data(&server.url()));
        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "woodpecker_repository_registry".to_string(),
                    current_state: instance(&[
                        ("repo_owner", s("octocat")),
                        ("repo_name", s("hello")),
                        ("address", s("ghcr.io/acme")),
                        ("username", s("bot")),
                        ("password", s("pw-123")),
                        ("token", s("")),
                    ]),
                },
            )
            .await;

        let state = response.new_state.unwrap();
        assert_eq!(state.get("username"), Some(&s("robot")));
        assert_eq!(state.get("password"), Some(&s("pw-123")));
        assert_eq!(state.get("email"), Some(&s("bot@acme.io")));
        mock.assert_async().await;
    }
}
