//! User API implementation

use super::client::segment;
use super::{ApiError, Client};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub email: String,
    pub avatar_url: String,
    pub active: bool,
    pub admin: bool,
}

pub struct UsersApi<'a> {
    client: &'a Client,
}

impl<'a> UsersApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn item(login: &str) -> String {
        format!("/users/{}", segment(login))
    }

    /// GET /user: the authenticated user
    pub async fn current(&self) -> Result<User, ApiError> {
        self.client.get("/user").await
    }

    pub async fn get(&self, login: &str) -> Result<User, ApiError> {
        self.client.get(&Self::item(login)).await
    }

    pub async fn create<B: Serialize + ?Sized>(&self, body: &B) -> Result<User, ApiError> {
        self.client.post("/users", body).await
    }

    pub async fn update<B: Serialize + ?Sized>(
        &self,
        login: &str,
        body: &B,
    ) -> Result<User, ApiError> {
        self.client.patch(&Self::item(login), body).await
    }

    pub async fn delete(&self, login: &str) -> Result<(), ApiError> {
        self.client.delete(&Self::item(login)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn create_posts_to_collection() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/users")
            .match_body(Matcher::Json(json!({ "login": "alice" })))
            .with_body(r#"{"id":9,"login":"alice","active":true}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "token", false).unwrap();
        let user = client.users().create(&json!({ "login": "alice" })).await.unwrap();

        assert_eq!(user.id, 9);
        assert!(user.active);
        assert!(!user.admin);
        mock.assert_async().await;
    }
}
