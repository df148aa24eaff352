//! Secret API implementation
//!
//! Secrets exist at three scopes: global, organization and repository.
//! All three share one payload shape.

use super::client::segment;
use super::{ApiError, Client};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Secret {
    pub id: i64,
    pub name: String,
    pub value: String,
    #[serde(rename = "image", deserialize_with = "null_as_empty")]
    pub images: Vec<String>,
    pub plugins_only: bool,
    #[serde(rename = "event", deserialize_with = "null_as_empty")]
    pub events: Vec<String>,
}

/// The server encodes empty lists as null.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secret")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("value", &"(sensitive)")
            .field("images", &self.images)
            .field("plugins_only", &self.plugins_only)
            .field("events", &self.events)
            .finish()
    }
}

/// Where a secret lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretScope<'s> {
    Global,
    Organization { owner: &'s str },
    Repository { owner: &'s str, name: &'s str },
}

impl SecretScope<'_> {
    fn collection(&self) -> String {
        match self {
            SecretScope::Global => "/secrets".to_string(),
            SecretScope::Organization { owner } => format!("/orgs/{}/secrets", segment(owner)),
            SecretScope::Repository { owner, name } => {
                format!("/repos/{}/{}/secrets", segment(owner), segment(name))
            }
        }
    }

    fn item(&self, secret: &str) -> String {
        format!("{}/{}", self.collection(), segment(secret))
    }
}

pub struct SecretsApi<'a> {
    client: &'a Client,
}

impl<'a> SecretsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get(&self, scope: SecretScope<'_>, name: &str) -> Result<Secret, ApiError> {
        self.client.get(&scope.item(name)).await
    }

    pub async fn create<B: Serialize + ?Sized>(
        &self,
        scope: SecretScope<'_>,
        body: &B,
    ) -> Result<Secret, ApiError> {
        self.client.post(&scope.collection(), body).await
    }

    pub async fn update<B: Serialize + ?Sized>(
        &self,
        scope: SecretScope<'_>,
        name: &str,
        body: &B,
    ) -> Result<Secret, ApiError> {
        self.client.patch(&scope.item(name), body).await
    }

    pub async fn delete(&self, scope: SecretScope<'_>, name: &str) -> Result<(), ApiError> {
        self.client.delete(&scope.item(name)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[test]
    fn scope_paths() {
        assert_eq!(SecretScope::Global.item("token"), "/secrets/token");
        assert_eq!(
            SecretScope::Organization { owner: "acme" }.collection(),
            "/orgs/acme/secrets"
        );
        assert_eq!(
            SecretScope::Repository {
                owner: "octocat",
                name: "hello"
            }
            .item("token"),
            "/repos/octocat/hello/secrets/token"
        );
    }

    #[test]
    fn debug_hides_value() {
        let secret = Secret {
            name: "token".to_string(),
            value: "hunter2".to_string(),
            ..Default::default()
        };
        assert!(!format!("{:?}", secret).contains("hunter2"));
    }

    #[tokio::test]
    async fn get_decodes_wire_names() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/orgs/acme/secrets/token")
            .with_body(
                r#"{"id":4,"name":"token","value":"","image":["alpine"],"plugins_only":true,"event":["push","tag"]}"#,
            )
            .create_async()
            .await;

        let client = Client::new(&server.url(), "token", false).unwrap();
        let secret = client
            .secrets()
            .get(SecretScope::Organization { owner: "acme" }, "token")
            .await
            .unwrap();

        assert_eq!(secret.images, vec!["alpine"]);
        assert_eq!(secret.events, vec!["push", "tag"]);
        assert!(secret.plugins_only);
        assert!(secret.value.is_empty());
    }

    #[test]
    fn null_lists_decode_as_empty() {
        let secret: Secret =
            serde_json::from_str(r#"{"id":1,"name":"a","image":null,"event":null}"#).unwrap();
        assert!(secret.images.is_empty());
        assert!(secret.events.is_empty());

        let secret: Secret = serde_json::from_str(r#"{"id":1,"name":"a"}"#).unwrap();
        assert!(secret.images.is_empty());
    }
}
