//! Global secret resource

use super::{key, RemoteResource};
use crate::api::secrets::SecretScope;
use crate::api::{Client, Secret};
use crate::error::Result;
use async_trait::async_trait;
use tfplug::{DynamicValue, FieldSpec, FieldTable, Patch, ValueKind};

/// Pipeline events a secret can be exposed to
pub const SECRET_EVENTS: &[&str] = &["push", "tag", "pull_request", "deployment", "cron", "manual"];

pub(crate) const VALUE: FieldSpec = FieldSpec::required("value", ValueKind::String)
    .sensitive()
    .describe("Secret Value");
pub(crate) const PLUGINS_ONLY: FieldSpec = FieldSpec::optional("plugins_only", ValueKind::Bool)
    .describe("Whether secret is only available for plugins");
pub(crate) const IMAGES: FieldSpec = FieldSpec::optional("images", ValueKind::StringSet)
    .wire("image")
    .describe("List of images where this secret is available, leave empty to allow all images");
pub(crate) const EVENTS: FieldSpec = FieldSpec::optional("events", ValueKind::StringSet)
    .wire("event")
    .one_of(SECRET_EVENTS)
    .describe("One or more event types where secret is available (one of push, tag, pull_request, deployment, cron, manual)");
pub(crate) const ID: FieldSpec = FieldSpec::computed("id", ValueKind::Int64);

static FIELDS: [FieldSpec; 6] = [
    FieldSpec::key("name", ValueKind::String).describe("Secret Name"),
    VALUE,
    PLUGINS_ONLY,
    IMAGES,
    EVENTS,
    ID,
];

pub const SECRET_FIELDS: FieldTable = FieldTable::new(&FIELDS);

#[derive(Debug, Default)]
pub struct SecretResource;

#[async_trait]
impl RemoteResource for SecretResource {
    const TYPE_NAME: &'static str = "woodpecker_secret";
    const NOUN: &'static str = "secret";
    const DESCRIPTION: &'static str = "Provides a global secret.";
    const FIELDS: FieldTable = SECRET_FIELDS;
    const IMPORT_ID: &'static [&'static str] = &["name"];
    const SLASH_FREE: Option<&'static str> = Some("name");

    type Remote = Secret;

    async fn create(&self, client: &Client, planned: &DynamicValue, patch: Patch) -> Result<Secret> {
        let body = patch.with_key(planned, "name");
        Ok(client.secrets().create(SecretScope::Global, &body).await?)
    }

    async fn read(&self, client: &Client, state: &DynamicValue) -> Result<Secret> {
        let name = key(state, "name")?;
        Ok(client.secrets().get(SecretScope::Global, &name).await?)
    }

    async fn update(&self, client: &Client, state: &DynamicValue, patch: Patch) -> Result<Secret> {
        let name = key(state, "name")?;
        let body = patch.with_key(state, "name");
        Ok(client
            .secrets()
            .update(SecretScope::Global, &name, &body)
            .await?)
    }

    async fn delete(&self, client: &Client, state: &DynamicValue) -> Result<()> {
        let name = key(state, "name")?;
        Ok(client.secrets().delete(SecretScope::Global, &name).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::{instance, provider_data, s, set};
    use crate::resources::ManagedResource;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use tfplug::resource::{
        CreateResourceRequest, ImportResourceStateRequest, ModifyPlanRequest, ReadResourceRequest,
    };
    use tfplug::{Context, Dynamic, Resource};

    fn planned() -> DynamicValue {
        instance(&[
            ("name", s("deploy_key")),
            ("value", s("hunter2")),
            ("plugins_only", Dynamic::Unknown),
            ("images", Dynamic::Unknown),
            ("events", set(&["tag", "push"])),
            ("id", Dynamic::Unknown),
        ])
    }

    #[tokio::test]
    async fn create_sends_name_and_set_fields_and_keeps_value() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/secrets")
            .match_body(Matcher::Json(json!({
                "name": "deploy_key",
                "value": "hunter2",
                "event": ["push", "tag"]
            })))
            .with_body(r#"{"id":11,"name":"deploy_key","value":"","image":null,"plugins_only":false,"event":["push","tag"]}"#)
            .create_async()
            .await;

        let resource = ManagedResource::<SecretResource>::new(provider_data(&server.url()));
        let response = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "woodpecker_secret".to_string(),
                    planned_state: planned(),
                    config: planned(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        let state = response.new_state;
        assert_eq!(state.get("value"), Some(&s("hunter2")));
        assert_eq!(state.get("id"), Some(&Dynamic::Number(11.0)));
        assert_eq!(state.get("images"), Some(&Dynamic::List(vec![])));
        assert_eq!(state.get("plugins_only"), Some(&Dynamic::Bool(false)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn slash_in_name_blocks_plan() {
        let server = Server::new_async().await;
        let resource = ManagedResource::<SecretResource>::new(provider_data(&server.url()));

        let mut proposed = planned();
        proposed.set("name", s("a/b"));
        let prior = instance(&[("name", s("a")), ("plugins_only", Dynamic::Bool(true))]);

        let response = resource
            .modify_plan(
                Context::new(),
                ModifyPlanRequest {
                    type_name: "woodpecker_secret".to_string(),
                    config: proposed.clone(),
                    prior_state: prior,
                    proposed_new_state: proposed.clone(),
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Unexpected character");
        assert_eq!(
            response.diagnostics[0].detail,
            "`/` is not supported in secret name"
        );
        // nothing was resolved from state
        assert_eq!(response.planned_state, proposed);
    }

    #[tokio::test]
    async fn slash_in_name_blocks_create_plan_too() {
        let server = Server::new_async().await;
        let resource = ManagedResource::<SecretResource>::new(provider_data(&server.url()));

        let mut proposed = planned();
        proposed.set("name", s("a/b"));

        let response = resource
            .modify_plan(
                Context::new(),
                ModifyPlanRequest {
                    type_name: "woodpecker_secret".to_string(),
                    config: proposed.clone(),
                    prior_state: DynamicValue::null(),
                    proposed_new_state: proposed,
                },
            )
            .await;

        assert!(tfplug::types::has_errors(&response.diagnostics));
    }

    #[tokio::test]
    async fn read_keeps_value_the_remote_does_not_echo() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/secrets/deploy_key")
            .with_body(r#"{"id":11,"name":"deploy_key","value":"","image":["alpine"],"plugins_only":true,"event":["push"]}"#)
            .create_async()
            .await;

        let resource = ManagedResource::<SecretResource>::new(provider_data(&server.url()));
        let state = instance(&[
            ("name", s("deploy_key")),
            ("value", s("hunter2")),
            ("plugins_only", Dynamic::Bool(false)),
            ("images", set(&[])),
            ("events", set(&["push", "tag"])),
            ("id", Dynamic::Number(11.0)),
        ]);

        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "woodpecker_secret".to_string(),
                    current_state: state,
                },
            )
            .await;

        let state = response.new_state.unwrap();
        assert_eq!(state.get("value"), Some(&s("hunter2")));
        assert_eq!(state.get("plugins_only"), Some(&Dynamic::Bool(true)));
        assert_eq!(state.get("images"), Some(&set(&["alpine"])));
        assert_eq!(state.get("events"), Some(&set(&["push"])));
    }

    #[tokio::test]
    async fn failures_never_leak_the_value() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/secrets")
            .with_status(500)
            .with_body("conflict")
            .create_async()
            .await;

        let resource = ManagedResource::<SecretResource>::new(provider_data(&server.url()));
        let response = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "woodpecker_secret".to_string(),
                    planned_state: planned(),
                    config: planned(),
                },
            )
            .await;

        assert_eq!(response.diagnostics[0].summary, "Could not create secret");
        for diag in &response.diagnostics {
            assert!(!diag.summary.contains("hunter2"));
            assert!(!diag.detail.contains("hunter2"));
        }
    }

    #[tokio::test]
    async fn import_takes_a_single_name() {
        let server = Server::new_async().await;
        let resource = ManagedResource::<SecretResource>::new(provider_data(&server.url()));

        let response = resource
            .import_state(
                Context::new(),
                ImportResourceStateRequest {
                    type_name: "woodpecker_secret".to_string(),
                    id: "deploy_key".to_string(),
                },
            )
            .await;
        assert_eq!(
            response.imported_resources[0].state.get("name"),
            Some(&s("deploy_key"))
        );

        let response = resource
            .import_state(
                Context::new(),
                ImportResourceStateRequest {
                    type_name: "woodpecker_secret".to_string(),
                    id: "a/b".to_string(),
                },
            )
            .await;
        assert_eq!(response.diagnostics[0].summary, "Unexpected Import Identifier");
        assert_eq!(response.diagnostics[0].detail, "Expected format: name. Got: a/b");
    }
}
