//! Repository secret resource

use super::secret::{EVENTS, ID, IMAGES, PLUGINS_ONLY, VALUE};
use super::{key, RemoteResource};
use crate::api::secrets::SecretScope;
use crate::api::{Client, Secret};
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
    FieldSpec::key("name", ValueKind::String).describe("Secret Name"),
    VALUE,
    PLUGINS_ONLY,
    IMAGES,
    EVENTS,
    ID,
];

pub const REPOSITORY_SECRET_FIELDS: FieldTable = FieldTable::new(&FIELDS);

#[derive(Debug, Default)]
pub struct RepositorySecretResource;

struct Keys {
    owner: String,
    repo: String,
}

impl Keys {
    fn from(instance: &DynamicValue) -> Result<Self> {
        Ok(Self {
            owner: key(instance, "repo_owner")?,
            repo: key(instance, "repo_name")?,
        })
    }

    fn scope(&self) -> SecretScope<'_> {
        SecretScope::Repository {
            owner: &self.owner,
            name: &self.repo,
        }
    }
}

#[async_trait]
impl RemoteResource for RepositorySecretResource {
    const TYPE_NAME: &'static str = "woodpecker_repository_secret";
    const NOUN: &'static str = "repository secret";
    const DESCRIPTION: &'static str = "Provides a repository secret.";
    const FIELDS: FieldTable = REPOSITORY_SECRET_FIELDS;
    const IMPORT_ID: &'static [&'static str] = &["repo_owner", "repo_name", "name"];
    const SLASH_FREE: Option<&'static str> = Some("name");

    type Remote = Secret;

    async fn create(&self, client: &Client, planned: &DynamicValue, patch: Patch) -> Result<Secret> {
        let keys = Keys::from(planned)?;
        let body = patch.with_key(planned, "name");
        Ok(client.secrets().create(keys.scope(), &body).await?)
    }

    async fn read(&self, client: &Client, state: &DynamicValue) -> Result<Secret> {
        let keys = Keys::from(state)?;
        let name = key(state, "name")?;
        Ok(client.secrets().get(keys.scope(), &name).await?)
    }

    async fn update(&self, client: &Client, state: &DynamicValue, patch: Patch) -> Result<Secret> {
        let keys = Keys::from(state)?;
        let name = key(state, "name")?;
        let body = patch.with_key(state, "name");
        Ok(client.secrets().update(keys.scope(), &name, &body).await?)
    }

    async fn delete(&self, client: &Client, state: &DynamicValue) -> Result<()> {
        let keys = Keys::from(state)?;
        let name = key(state, "name")?;
        Ok(client.secrets().delete(keys.scope(), &name).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::{instance, provider_data, s, set};
    use crate::resources::ManagedResource;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use tfplug::resource::{CreateResourceRequest, ImportResourceStateRequest, ModifyPlanRequest};
    use tfplug::{Context, Dynamic, Resource};

    #[tokio::test]
    async fn create_posts_to_repository_scope() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/repos/octocat/hello/secrets")
            .match_body(Matcher::Json(json!({
                "name": "docker_password",
                "value": "s3cr3t",
                "image": ["plugins/docker"]
            })))
            .with_body(r#"{"id":5,"name":"docker_password","value":"","image":["plugins/docker"],"plugins_only":false,"event":["push"]}"#)
            .create_async()
            .await;

        let planned = instance(&[
            ("repo_owner", s("octocat")),
            ("repo_name", s("hello")),
            ("name", s("docker_password")),
            ("value", s("s3cr3t")),
            ("plugins_only", Dynamic::Unknown),
            ("images", set(&["plugins/docker"])),
            ("events", Dynamic::Unknown),
            ("id", Dynamic::Unknown),
        ]);

        let resource = ManagedResource::<RepositorySecretResource>::new(provider_data(&server.url()));
        let response = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "woodpecker_repository_secret".to_string(),
                    planned_state: planned.clone(),
                    config: planned,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        let state = response.new_state;
        assert_eq!(state.get("repo_owner"), Some(&s("octocat")));
        assert_eq!(state.get("events"), Some(&set(&["push"])));
        assert_eq!(state.get("value"), Some(&s("s3cr3t")));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn moving_to_another_repository_replaces() {
        let server = Server::new_async().await;
        let resource = ManagedResource::<RepositorySecretResource>::new(provider_data(&server.url()));

        let prior = instance(&[
            ("repo_owner", s("octocat")),
            ("repo_name", s("hello")),
            ("name", s("token")),
            ("value", s("v")),
        ]);
        let mut proposed = prior.clone();
        proposed.set("repo_name", s("world"));

        let response = resource
            .modify_plan(
                Context::new(),
                ModifyPlanRequest {
                    type_name: "woodpecker_repository_secret".to_string(),
                    config: proposed.clone(),
                    prior_state: prior,
                    proposed_new_state: proposed,
                },
            )
            .await;

        assert_eq!(
            response.requires_replace,
            vec![tfplug::AttributePath::new("repo_name")]
        );
    }

    #[tokio::test]
    async fn import_splits_three_parts() {
        let server = Server::new_async().await;
        let resource = ManagedResource::<RepositorySecretResource>::new(provider_data(&server.url()));

        let response = resource
            .import_state(
                Context::new(),
                ImportResourceStateRequest {
                    type_name: "woodpecker_repository_secret".to_string(),
                    id: "octocat/hello/token".to_string(),
                },
            )
            .await;

        let state = &response.imported_resources[0].state;
        assert_eq!(state.get("repo_owner"), Some(&s("octocat")));
        assert_eq!(state.get("repo_name"), Some(&s("hello")));
        assert_eq!(state.get("name"), Some(&s("token")));

        let response = resource
            .import_state(
                Context::new(),
                ImportResourceStateRequest {
                    type_name: "woodpecker_repository_secret".to_string(),
                    id: "octocat/hello".to_string(),
                },
            )
            .await;
        assert!(response.imported_resources.is_empty());
        assert_eq!(
            response.diagnostics[0].detail,
            "Expected format: repo_owner/repo_name/name. Got: octocat/hello"
        );
    }
}
