//! User resource

use super::{key, RemoteResource};
use crate::api::{Client, User};
use crate::error::Result;
use async_trait::async_trait;
use tfplug::{DynamicValue, FieldSpec, FieldTable, Patch, ValueKind};

static FIELDS: [FieldSpec; 6] = [
    FieldSpec::key("login", ValueKind::String).describe("Username for user"),
    FieldSpec::optional("email", ValueKind::String).describe("Email address for user"),
    FieldSpec::optional("active", ValueKind::Bool).describe("Whether user is active in the system"),
    FieldSpec::computed("id", ValueKind::Int64).describe("User ID"),
    FieldSpec::computed("admin", ValueKind::Bool).describe("Whether user is a Woodpecker admin"),
    FieldSpec::computed("avatar", ValueKind::String)
        .wire("avatar_url")
        .describe("Avatar URL for user"),
];

pub const USER_FIELDS: FieldTable = FieldTable::new(&FIELDS);

#[derive(Debug, Default)]
pub struct UserResource;

#[async_trait]
impl RemoteResource for UserResource {
    const TYPE_NAME: &'static str = "woodpecker_user";
    const NOUN: &'static str = "user";
    const DESCRIPTION: &'static str = "Provides a user resource.";
    const FIELDS: FieldTable = USER_FIELDS;
    const IMPORT_ID: &'static [&'static str] = &["login"];

    type Remote = User;

    /// The server ignores some settings on creation, so they are applied
    /// again with a patch.
    async fn create(&self, client: &Client, planned: &DynamicValue, patch: Patch) -> Result<User> {
        let login = key(planned, "login")?;
        let body = patch.with_key(planned, "login");
        let users = client.users();

        users.create(&body).await?;
        Ok(users.update(&login, &body).await?)
    }

    async fn read(&self, client: &Client, state: &DynamicValue) -> Result<User> {
        let login = key(state, "login")?;
        Ok(client.users().get(&login).await?)
    }

    async fn update(&self, client: &Client, state: &DynamicValue, patch: Patch) -> Result<User> {
        let login = key(state, "login")?;
        let body = patch.with_key(state, "login");
        Ok(client.users().update(&login, &body).await?)
    }

    async fn delete(&self, client: &Client, state: &DynamicValue) -> Result<()> {
        let login = key(state, "login")?;
        Ok(client.users().delete(&login).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::{instance, provider_data, s};
    use crate::resources::ManagedResource;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use tfplug::resource::{CreateResourceRequest, ModifyPlanRequest, ReadResourceRequest};
    use tfplug::{Context, Dynamic, Resource};

    const ALICE: &str = r#"{"id":9,"login":"alice","email":"alice@example.com","avatar_url":"https://avatars/alice","active":false,"admin":false}"#;

    #[tokio::test]
    async fn create_posts_then_patches() {
        let mut server = Server::new_async().await;
        let body = json!({ "login": "alice", "email": "alice@example.com", "active": false });
        let post = server
            .mock("POST", "/api/users")
            .match_body(Matcher::Json(body.clone()))
            .with_body(ALICE.replace("\"active\":false", "\"active\":true"))
            .create_async()
            .await;
        let patch = server
            .mock("PATCH", "/api/users/alice")
            .match_body(Matcher::Json(body))
            .with_body(ALICE)
            .create_async()
            .await;

        let planned = instance(&[
            ("login", s("alice")),
            ("email", s("alice@example.com")),
            ("active", Dynamic::Bool(false)),
            ("id", Dynamic::Unknown),
            ("admin", Dynamic::Unknown),
            ("avatar", Dynamic::Unknown),
        ]);

        let resource = ManagedResource::<UserResource>::new(provider_data(&server.url()));
        let response = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "woodpecker_user".to_string(),
                    planned_state: planned.clone(),
                    config: planned,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        let state = response.new_state;
        assert_eq!(state.get("active"), Some(&Dynamic::Bool(false)));
        assert_eq!(state.get("avatar"), Some(&s("https://avatars/alice")));
        assert_eq!(state.get("admin"), Some(&Dynamic::Bool(false)));
        post.assert_async().await;
        patch.assert_async().await;
    }

    #[tokio::test]
    async fn computed_admin_flag_follows_state() {
        let server = Server::new_async().await;
        let resource = ManagedResource::<UserResource>::new(provider_data(&server.url()));

        let prior = instance(&[
            ("login", s("alice")),
            ("email", s("alice@example.com")),
            ("active", Dynamic::Bool(true)),
            ("id", Dynamic::Number(9.0)),
            ("admin", Dynamic::Bool(true)),
            ("avatar", s("https://avatars/alice")),
        ]);
        let proposed = instance(&[
            ("login", s("alice")),
            ("email", Dynamic::Unknown),
            ("active", Dynamic::Bool(false)),
            ("id", Dynamic::Unknown),
            ("admin", Dynamic::Unknown),
            ("avatar", Dynamic::Unknown),
        ]);

        let response = resource
            .modify_plan(
                Context::new(),
                ModifyPlanRequest {
                    type_name: "woodpecker_user".to_string(),
                    config: proposed.clone(),
                    prior_state: prior,
                    proposed_new_state: proposed,
                },
            )
            .await;

        let plan = response.planned_state;
        assert_eq!(plan.get("email"), Some(&s("alice@example.com")));
        assert_eq!(plan.get("active"), Some(&Dynamic::Bool(false)));
        assert_eq!(plan.get("admin"), Some(&Dynamic::Bool(true)));
        assert_eq!(plan.get("id"), Some(&Dynamic::Number(9.0)));
    }

    #[tokio::test]
    async fn read_failure_keeps_state_and_reports() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/users/alice")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let resource = ManagedResource::<UserResource>::new(provider_data(&server.url()));
        let current = instance(&[("login", s("alice")), ("id", Dynamic::Number(9.0))]);
        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "woodpecker_user".to_string(),
                    current_state: current.clone(),
                },
            )
            .await;

        assert_eq!(response.new_state, Some(current));
        assert_eq!(response.diagnostics[0].summary, "Could not read user");
        assert!(response.diagnostics[0].detail.contains("bad gateway"));
    }
}
