//! Organization secret resource

use super::secret::{EVENTS, ID, IMAGES, PLUGINS_ONLY, VALUE};
use super::{key, RemoteResource};
use crate::api::secrets::SecretScope;
use crate::api::{Client, Secret};
use crate::error::Result;
use async_trait::async_trait;
use tfplug::{DynamicValue, FieldSpec, FieldTable, Patch, ValueKind};

static FIELDS: [FieldSpec; 7] = [
    FieldSpec::key("owner", ValueKind::String)
        .path_only()
        .describe("Organization owning the secret"),
    FieldSpec::key("name", ValueKind::String).describe("Secret Name"),
    VALUE,
    PLUGINS_ONLY,
    IMAGES,
    EVENTS,
    ID,
];

pub const ORGANIZATION_SECRET_FIELDS: FieldTable = FieldTable::new(&FIELDS);

#[derive(Debug, Default)]
pub struct OrganizationSecretResource;

#[async_trait]
impl RemoteResource for OrganizationSecretResource {
    const TYPE_NAME: &'static str = "woodpecker_organization_secret";
    const NOUN: &'static str = "organization secret";
    const DESCRIPTION: &'static str = "Provides an organization secret.";
    const FIELDS: FieldTable = ORGANIZATION_SECRET_FIELDS;
    const IMPORT_ID: &'static [&'static str] = &["owner", "name"];
    const SLASH_FREE: Option<&'static str> = Some("name");

    type Remote = Secret;

    async fn create(&self, client: &Client, planned: &DynamicValue, patch: Patch) -> Result<Secret> {
        let owner = key(planned, "owner")?;
        let body = patch.with_key(planned, "name");
        Ok(client
            .secrets()
            .create(SecretScope::Organization { owner: &owner }, &body)
            .await?)
    }

    async fn read(&self, client: &Client, state: &DynamicValue) -> Result<Secret> {
        let owner = key(state, "owner")?;
        let name = key(state, "name")?;
        Ok(client
            .secrets()
            .get(SecretScope::Organization { owner: &owner }, &name)
            .await?)
    }

    async fn update(&self, client: &Client, state: &DynamicValue, patch: Patch) -> Result<Secret> {
        let owner = key(state, "owner")?;
        let name = key(state, "name")?;
        let body = patch.with_key(state, "name");
        Ok(client
            .secrets()
            .update(SecretScope::Organization { owner: &owner }, &name, &body)
            .await?)
    }

    async fn delete(&self, client: &Client, state: &DynamicValue) -> Result<()> {
        let owner = key(state, "owner")?;
        let name = key(state, "name")?;
        Ok(client
            .secrets()
            .delete(SecretScope::Organization { owner: &owner }, &name)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::{instance, provider_data, s, set};
    use crate::resources::ManagedResource;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use tfplug::resource::{DeleteResourceRequest, ImportResourceStateRequest, UpdateResourceRequest};
    use tfplug::{Context, Dynamic, Resource};

    fn state() -> DynamicValue {
        instance(&[
            ("owner", s("acme")),
            ("name", s("registry_token")),
            ("value", s("old-value")),
            ("plugins_only", Dynamic::Bool(false)),
            ("images", set(&[])),
            ("events", set(&["push"])),
            ("id", Dynamic::Number(3.0)),
        ])
    }

    #[tokio::test]
    async fn update_never_sends_owner_in_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PATCH", "/api/orgs/acme/secrets/registry_token")
            .match_body(Matcher::Json(json!({
                "name": "registry_token",
                "value": "new-value",
                "plugins_only": false,
                "image": [],
                "event": ["push", "tag"]
            })))
            .with_body(r#"{"id":3,"name":"registry_token","value":"","image":[],"plugins_only":false,"event":["push","tag"]}"#)
            .create_async()
            .await;

        let resource =
            ManagedResource::<OrganizationSecretResource>::new(provider_data(&server.url()));
        let mut planned = state();
        planned.set("value", s("new-value"));
        planned.set("events", set(&["push", "tag"]));

        let response = resource
            .update(
                Context::new(),
                UpdateResourceRequest {
                    type_name: "woodpecker_organization_secret".to_string(),
                    prior_state: state(),
                    planned_state: planned.clone(),
                    config: planned,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        assert_eq!(response.new_state.get("value"), Some(&s("new-value")));
        assert_eq!(response.new_state.get("events"), Some(&set(&["push", "tag"])));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn delete_of_missing_secret_succeeds() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/api/orgs/acme/secrets/registry_token")
            .with_status(404)
            .create_async()
            .await;

        let resource =
            ManagedResource::<OrganizationSecretResource>::new(provider_data(&server.url()));
        let response = resource
            .delete(
                Context::new(),
                DeleteResourceRequest {
                    type_name: "woodpecker_organization_secret".to_string(),
                    prior_state: state(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn import_requires_owner_and_name() {
        let server = Server::new_async().await;
        let resource =
            ManagedResource::<OrganizationSecretResource>::new(provider_data(&server.url()));

        let response = resource
            .import_state(
                Context::new(),
                ImportResourceStateRequest {
                    type_name: "woodpecker_organization_secret".to_string(),
                    id: "acme".to_string(),
                },
            )
            .await;

        assert_eq!(
            response.diagnostics[0].detail,
            "Expected format: owner/name. Got: acme"
        );
    }
}
