use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::error::ApiError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Woodpecker API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    auth_header: String,
}

impl Client {
    /// `server` is the Woodpecker root URL; requests go to `<server>/api`.
    /// `skip_tls_verify` accepts any server certificate.
    pub fn new(server: &str, token: &str, skip_tls_verify: bool) -> Result<Self, ApiError> {
        let parsed = url::Url::parse(server).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                parsed.scheme()
            )));
        }

        let http_client = reqwest::Client::builder()
            .danger_accept_invalid_certs(skip_tls_verify)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url: format!("{}/api", server.trim_end_matches('/')),
                auth_header: format!("Bearer {}", token),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(Method::GET, path, None::<&()>).await?;
        self.parse_success_response(response, path).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.send(Method::POST, path, Some(body)).await?;
        self.parse_success_response(response, path).await
    }

    /// POST without a body, e.g. repository activation
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(Method::POST, path, None::<&()>).await?;
        self.parse_success_response(response, path).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.send(Method::PATCH, path, Some(body)).await?;
        self.parse_success_response(response, path).await
    }

    /// DELETE; any response body is ignored
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::DELETE, path, None::<&()>).await?;
        Ok(())
    }

    /// Repository API operations
    pub fn repos(&self) -> super::repos::ReposApi<'_> {
        super::repos::ReposApi::new(self)
    }

    /// Global, organization and repository secrets
    pub fn secrets(&self) -> super::secrets::SecretsApi<'_> {
        super::secrets::SecretsApi::new(self)
    }

    pub fn registries(&self) -> super::registries::RegistriesApi<'_> {
        super::registries::RegistriesApi::new(self)
    }

    pub fn crons(&self) -> super::crons::CronsApi<'_> {
        super::crons::CronsApi::new(self)
    }

    pub fn users(&self) -> super::users::UsersApi<'_> {
        super::users::UsersApi::new(self)
    }

    /// Sends one request. Bodies may carry secrets, so only method, path
    /// and status are logged. Failures are not retried.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);
        tracing::debug!(%method, path, "woodpecker request");

        let mut request = self
            .inner
            .http_client
            .request(method.clone(), &url)
            .header(AUTHORIZATION, &self.inner.auth_header);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(%method, path, status = status.as_u16(), "woodpecker response");

        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::AuthError),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(path.to_string())),
            _ => self.handle_error_response(response).await,
        }
    }

    async fn parse_success_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        path: &str,
    ) -> Result<T, ApiError> {
        let text = response.text().await?;

        serde_json::from_str::<T>(&text).map_err(|e| {
            tracing::error!(path, "failed to deserialize response: {}", e);
            ApiError::ParseError(format!("Failed to parse response: {}", e))
        })
    }

    async fn handle_error_response<T>(&self, response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::warn!(status, "woodpecker API error: {}", text.trim());

        Err(ApiError::ApiError {
            status,
            message: text.trim().to_string(),
        })
    }
}

/// Percent-encodes one path segment
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
