//! Repository API implementation

use super::client::segment;
use super::{ApiError, Client};
use serde::{Deserialize, Serialize};

/// Repository as returned by `/repos/{owner}/{name}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Repo {
    pub id: i64,
    pub owner: String,
    pub name: String,
    pub full_name: String,
    pub avatar_url: String,
    pub link_url: String,
    pub scm: String,
    pub clone_url: String,
    pub default_branch: String,
    pub timeout: i64,
    pub visibility: String,
    pub private: bool,
    pub trusted: bool,
    pub gated: bool,
    pub allow_pr: bool,
    pub config_file: String,
}

pub struct ReposApi<'a> {
    client: &'a Client,
}

impl<'a> ReposApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn path(owner: &str, name: &str) -> String {
        format!("/repos/{}/{}", segment(owner), segment(name))
    }

    /// GET /repos/{owner}/{name}
    pub async fn get(&self, owner: &str, name: &str) -> Result<Repo, ApiError> {
        self.client.get(&Self::path(owner, name)).await
    }

    /// POST /repos/{owner}/{name}: activates the repository
    pub async fn activate(&self, owner: &str, name: &str) -> Result<Repo, ApiError> {
        self.client.post_empty(&Self::path(owner, name)).await
    }

    /// PATCH /repos/{owner}/{name}
    pub async fn update<B: Serialize + ?Sized>(
        &self,
        owner: &str,
        name: &str,
        patch: &B,
    ) -> Result<Repo, ApiError> {
        self.client.patch(&Self::path(owner, name), patch).await
    }

    /// DELETE /repos/{owner}/{name}: deactivates the repository
    pub async fn delete(&self, owner: &str, name: &str) -> Result<(), ApiError> {
        self.client.delete(&Self::path(owner, name)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn activate_posts_without_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/repos/octocat/hello")
            .with_body(r#"{"id":3,"owner":"octocat","name":"hello","full_name":"octocat/hello"}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "token", false).unwrap();
        let repo = client.repos().activate("octocat", "hello").await.unwrap();

        assert_eq!(repo.id, 3);
        assert_eq!(repo.full_name, "octocat/hello");
        // fields missing from the payload take their defaults
        assert_eq!(repo.timeout, 0);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn update_sends_patch_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PATCH", "/api/repos/octocat/hello")
            .match_body(Matcher::Json(json!({ "visibility": "private" })))
            .with_body(r#"{"id":3,"visibility":"private","private":true}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "token", false).unwrap();
        let repo = client
            .repos()
            .update("octocat", "hello", &json!({ "visibility": "private" }))
            .await
            .unwrap();

        assert!(repo.private);
        mock.assert_async().await;
    }
}
