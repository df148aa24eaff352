//! Terraform provider for Woodpecker CI

pub mod api;
pub mod data_sources;
pub mod error;
pub mod provider_data;
pub mod resources;

use async_trait::async_trait;
use provider_data::WoodpeckerProviderData;
use resources::RemoteResource;
use std::collections::HashMap;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, ProviderSchemaRequest,
    ProviderSchemaResponse, ResourceFactory,
};
use tfplug::{
    AttributeBuilder, AttributePath, AttributeType, Context, Diagnostic, Dynamic, DynamicValue,
    Provider, SchemaBuilder,
};

pub const ENV_SERVER: &str = "WOODPECKER_SERVER";
pub const ENV_TOKEN: &str = "WOODPECKER_TOKEN";
pub const ENV_VERIFY: &str = "WOODPECKER_VERIFY";

#[derive(Debug, Default)]
pub struct WoodpeckerProvider;

impl WoodpeckerProvider {
    pub fn new() -> Self {
        Self
    }
}

/// Provider attribute, falling back to an environment variable. Empty
/// values count as unset.
fn setting(config: &DynamicValue, attribute: &str, env: &str) -> Option<String> {
    config
        .get(attribute)
        .and_then(Dynamic::as_str)
        .map(str::to_string)
        .or_else(|| std::env::var(env).ok())
        .filter(|value| !value.is_empty())
}

fn verify_setting(config: &DynamicValue) -> bool {
    config
        .get("verify")
        .and_then(Dynamic::as_bool)
        .unwrap_or_else(|| std::env::var(ENV_VERIFY).is_ok_and(|v| v == "1"))
}

fn resource_entry<R: RemoteResource>() -> (String, ResourceFactory<WoodpeckerProviderData>) {
    (R::TYPE_NAME.to_string(), resources::factory::<R>)
}

fn lookup_entry<R: RemoteResource>() -> (String, DataSourceFactory<WoodpeckerProviderData>) {
    (R::TYPE_NAME.to_string(), data_sources::factory::<R>)
}

#[async_trait]
impl Provider for WoodpeckerProvider {
    type Data = WoodpeckerProviderData;

    fn type_name(&self) -> &str {
        "woodpecker"
    }

    async fn schema(&self, _ctx: Context, _request: ProviderSchemaRequest) -> ProviderSchemaResponse {
        let schema = SchemaBuilder::new()
            .description("Manages Woodpecker CI through its REST API.")
            .attribute(
                AttributeBuilder::new("server", AttributeType::String)
                    .optional()
                    .description("URL of the Woodpecker server. May also come from WOODPECKER_SERVER.")
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("token", AttributeType::String)
                    .optional()
                    .sensitive()
                    .description("Personal access token. May also come from WOODPECKER_TOKEN.")
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("verify", AttributeType::Bool)
                    .optional()
                    .description(
                        "When true, the server certificate is not verified. \
                         May also come from WOODPECKER_VERIFY (\"1\" means true).",
                    )
                    .build(),
            )
            .build();

        ProviderSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn configure(
        &self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse<Self::Data> {
        let config = request.config;
        let server = setting(&config, "server", ENV_SERVER);
        let token = setting(&config, "token", ENV_TOKEN);
        let skip_verify = verify_setting(&config);

        let mut diagnostics = Vec::new();
        if server.is_none() {
            diagnostics.push(
                Diagnostic::error(
                    "Missing Woodpecker server",
                    format!("Set server in the provider block or {}", ENV_SERVER),
                )
                .with_attribute(AttributePath::new("server")),
            );
        }
        if token.is_none() {
            diagnostics.push(
                Diagnostic::error(
                    "Missing Woodpecker token",
                    format!("Set token in the provider block or {}", ENV_TOKEN),
                )
                .with_attribute(AttributePath::new("token")),
            );
        }
        let (Some(server), Some(token)) = (server, token) else {
            return ConfigureProviderResponse {
                provider_data: None,
                diagnostics,
            };
        };

        let client = match api::Client::new(&server, &token, skip_verify) {
            Ok(client) => client,
            Err(e) => {
                diagnostics.push(Diagnostic::error("Unable to create client", e.to_string()));
                return ConfigureProviderResponse {
                    provider_data: None,
                    diagnostics,
                };
            }
        };

        match client.users().current().await {
            Ok(self_user) => {
                tracing::info!(server = %server, login = %self_user.login, "authenticated");
                ConfigureProviderResponse {
                    provider_data: Some(WoodpeckerProviderData::new(client, self_user)),
                    diagnostics,
                }
            }
            Err(e) => {
                tracing::error!(server = %server, "login failed: {}", e);
                diagnostics.push(Diagnostic::error("Unable to login", e.to_string()));
                ConfigureProviderResponse {
                    provider_data: None,
                    diagnostics,
                }
            }
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory<Self::Data>> {
        HashMap::from([
            resource_entry::<resources::RepositoryResource>(),
            resource_entry::<resources::SecretResource>(),
            resource_entry::<resources::OrganizationSecretResource>(),
            resource_entry::<resources::RepositorySecretResource>(),
            resource_entry::<resources::RepositoryRegistryResource>(),
            resource_entry::<resources::RepositoryCronResource>(),
            resource_entry::<resources::UserResource>(),
        ])
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory<Self::Data>> {
        HashMap::from([
            (
                data_sources::SelfDataSource::TYPE_NAME.to_string(),
                data_sources::self_user::factory as DataSourceFactory<Self::Data>,
            ),
            lookup_entry::<resources::RepositoryResource>(),
            lookup_entry::<resources::UserResource>(),
            lookup_entry::<resources::SecretResource>(),
            lookup_entry::<resources::OrganizationSecretResource>(),
            lookup_entry::<resources::RepositorySecretResource>(),
            lookup_entry::<resources::RepositoryRegistryResource>(),
            lookup_entry::<resources::RepositoryCronResource>(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serial_test::serial;

    const SELF_JSON: &str = r#"{"id":1,"login":"admin","email":"admin@example.com","avatar_url":"","active":true,"admin":true}"#;

    fn clear_env() {
        std::env::remove_var(ENV_SERVER);
        std::env::remove_var(ENV_TOKEN);
        std::env::remove_var(ENV_VERIFY);
    }

    fn config(pairs: &[(&str, Dynamic)]) -> DynamicValue {
        let mut dv = DynamicValue::object();
        for (name, value) in pairs {
            dv.set(name, value.clone());
        }
        dv
    }

    async fn configure(config: DynamicValue) -> ConfigureProviderResponse<WoodpeckerProviderData> {
        WoodpeckerProvider::new()
            .configure(Context::new(), ConfigureProviderRequest { config })
            .await
    }

    #[tokio::test]
    #[serial]
    async fn provider_configures_from_env_vars() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/user")
            .match_header("authorization", "Bearer env-token")
            .with_body(SELF_JSON)
            .create_async()
            .await;

        clear_env();
        std::env::set_var(ENV_SERVER, server.url());
        std::env::set_var(ENV_TOKEN, "env-token");
        std::env::set_var(ENV_VERIFY, "1");

        let response = configure(DynamicValue::object()).await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let data = response.provider_data.unwrap();
        assert_eq!(data.self_user.login, "admin");
        mock.assert_async().await;
        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn provider_block_wins_over_env() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/user")
            .match_header("authorization", "Bearer block-token")
            .with_body(SELF_JSON)
            .create_async()
            .await;

        clear_env();
        std::env::set_var(ENV_SERVER, "http://127.0.0.1:1");
        std::env::set_var(ENV_TOKEN, "env-token");

        let response = configure(config(&[
            ("server", Dynamic::String(server.url())),
            ("token", Dynamic::String("block-token".to_string())),
            ("verify", Dynamic::Bool(false)),
        ]))
        .await;

        assert!(response.provider_data.is_some());
        mock.assert_async().await;
        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn provider_configure_requires_server_and_token() {
        clear_env();

        let response = configure(DynamicValue::object()).await;

        assert!(response.provider_data.is_none());
        assert_eq!(response.diagnostics.len(), 2);
        assert_eq!(response.diagnostics[0].summary, "Missing Woodpecker server");
        assert_eq!(response.diagnostics[1].summary, "Missing Woodpecker token");
    }

    #[tokio::test]
    #[serial]
    async fn failed_self_lookup_is_unable_to_login() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/user")
            .with_status(401)
            .create_async()
            .await;
        clear_env();

        let response = configure(config(&[
            ("server", Dynamic::String(server.url())),
            ("token", Dynamic::String("wrong".to_string())),
        ]))
        .await;

        assert!(response.provider_data.is_none());
        assert_eq!(response.diagnostics[0].summary, "Unable to login");
        assert!(!response.diagnostics[0].detail.contains("wrong"));
    }

    #[test]
    #[serial]
    fn verify_env_accepts_only_one() {
        clear_env();
        std::env::set_var(ENV_VERIFY, "true");
        assert!(!verify_setting(&DynamicValue::object()));
        std::env::set_var(ENV_VERIFY, "1");
        assert!(verify_setting(&DynamicValue::object()));
        clear_env();
    }

    #[test]
    fn registers_every_resource_and_data_source() {
        let provider = WoodpeckerProvider::new();

        let mut resources: Vec<String> = provider.resources().into_keys().collect();
        resources.sort();
        assert_eq!(
            resources,
            vec![
                "woodpecker_organization_secret",
                "woodpecker_repository",
                "woodpecker_repository_cron",
                "woodpecker_repository_registry",
                "woodpecker_repository_secret",
                "woodpecker_secret",
                "woodpecker_user",
            ]
        );

        let data_sources = provider.data_sources();
        assert_eq!(data_sources.len(), 8);
        assert!(data_sources.contains_key("woodpecker_self"));
    }
}
