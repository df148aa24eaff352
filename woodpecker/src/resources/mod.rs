//! Resource implementations
//!
//! Each resource type is a field table plus the handful of remote calls it
//! needs. [`ManagedResource`] turns that into a full [`Resource`]: schema,
//! validation, plan reconciliation, CRUD with patch extraction and remote
//! sync, and import.

pub mod organization_secret;
pub mod repository;
pub mod repository_cron;
pub mod repository_registry;
pub mod repository_secret;
pub mod secret;
pub mod user;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use organization_secret::OrganizationSecretResource;
pub use repository::RepositoryResource;
pub use repository_cron::RepositoryCronResource;
pub use repository_registry::RepositoryRegistryResource;
pub use repository_secret::RepositorySecretResource;
pub use secret::SecretResource;
pub use user::UserResource;

use crate::api::Client;
use crate::error::Result;
use crate::provider_data::WoodpeckerProviderData;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tfplug::fields::{extract_patch, from_remote, reconcile, redact, replaced_keys, validate_config};
use tfplug::resource::{
    CreateResourceRequest, CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource, ModifyPlanRequest,
    ModifyPlanResponse, ReadResourceRequest, ReadResourceResponse, ResourceSchemaRequest,
    ResourceSchemaResponse, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::{
    parse_import_id, AttributePath, Context, Diagnostic, Dynamic, DynamicValue, FieldTable, Patch,
    Resource, TfplugError,
};

/// The remote half of a resource type.
#[async_trait]
pub trait RemoteResource: Default + Send + Sync + 'static {
    const TYPE_NAME: &'static str;
    /// Human name used in diagnostics, e.g. "repository secret"
    const NOUN: &'static str;
    const DESCRIPTION: &'static str;
    const FIELDS: FieldTable;
    /// Attributes forming the `/`-separated import id, in order
    const IMPORT_ID: &'static [&'static str];
    /// Attribute whose value may not contain `/`
    const SLASH_FREE: Option<&'static str> = None;

    type Remote: Serialize + Send;

    async fn create(
        &self,
        client: &Client,
        planned: &DynamicValue,
        patch: Patch,
    ) -> Result<Self::Remote>;

    async fn read(&self, client: &Client, state: &DynamicValue) -> Result<Self::Remote>;

    /// `state` is the prior state; keys are taken from it.
    async fn update(
        &self,
        client: &Client,
        state: &DynamicValue,
        patch: Patch,
    ) -> Result<Self::Remote>;

    async fn delete(&self, client: &Client, state: &DynamicValue) -> Result<()>;

    /// State Read starts from after import. The parts are already validated.
    async fn import(&self, _client: &Client, parts: Vec<String>) -> Result<DynamicValue> {
        let mut state = DynamicValue::object();
        for (name, value) in Self::IMPORT_ID.iter().zip(parts) {
            state.set(name, Dynamic::String(value));
        }
        Ok(state)
    }
}

/// Reads a string key attribute.
pub(crate) fn key(instance: &DynamicValue, name: &str) -> Result<String> {
    Ok(instance.field::<String>(name)?.into_value(name)?)
}

/// Reads the remote-assigned numeric id.
pub(crate) fn remote_id(instance: &DynamicValue) -> Result<i64> {
    Ok(instance.field::<i64>("id")?.into_value("id")?)
}

/// New state from a remote object, with `local` supplying what the remote
/// does not echo.
pub(crate) fn sync<T: Serialize>(
    table: FieldTable,
    remote: &T,
    local: &DynamicValue,
) -> Result<DynamicValue> {
    let json =
        serde_json::to_value(remote).map_err(|e| TfplugError::EncodingError(e.to_string()))?;
    Ok(from_remote(table, &json, local)?)
}

pub struct ManagedResource<R: RemoteResource> {
    remote: R,
    data: Arc<WoodpeckerProviderData>,
}

impl<R: RemoteResource> ManagedResource<R> {
    pub fn new(data: Arc<WoodpeckerProviderData>) -> Self {
        Self {
            remote: R::default(),
            data,
        }
    }

    fn client(&self) -> &Client {
        &self.data.client
    }

    fn failure(&self, operation: &str, err: &crate::error::Error) -> Diagnostic {
        tracing::error!(resource = R::TYPE_NAME, "{} failed: {}", operation, err);
        Diagnostic::error(format!("Could not {} {}", operation, R::NOUN), err.to_string())
    }

    /// `/` is reserved as the import id separator.
    fn check_slash(&self, plan: &DynamicValue) -> Option<Diagnostic> {
        let attribute = R::SLASH_FREE?;
        let value = plan.get(attribute).and_then(Dynamic::as_str)?;
        value.contains('/').then(|| {
            Diagnostic::error(
                "Unexpected character",
                format!("`/` is not supported in {} name", R::NOUN),
            )
            .with_attribute(AttributePath::new(attribute))
        })
    }
}

/// Factory registered with the provider for resource type `R`.
pub fn factory<R: RemoteResource>(data: Arc<WoodpeckerProviderData>) -> Box<dyn Resource> {
    Box::new(ManagedResource::<R>::new(data))
}

#[async_trait]
impl<R: RemoteResource> Resource for ManagedResource<R> {
    fn type_name(&self) -> &str {
        R::TYPE_NAME
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: R::FIELDS.schema(R::DESCRIPTION),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        ValidateResourceConfigResponse {
            diagnostics: validate_config(R::FIELDS, &request.config),
        }
    }

    async fn modify_plan(&self, _ctx: Context, request: ModifyPlanRequest) -> ModifyPlanResponse {
        let plan = request.proposed_new_state;
        let prior = request.prior_state;

        if plan.is_null() {
            return ModifyPlanResponse {
                planned_state: plan,
                requires_replace: vec![],
                diagnostics: vec![],
            };
        }

        if let Some(diag) = self.check_slash(&plan) {
            return ModifyPlanResponse {
                planned_state: plan,
                requires_replace: vec![],
                diagnostics: vec![diag],
            };
        }

        // A replacement starts from scratch: nothing carries over from state.
        let requires_replace = replaced_keys(R::FIELDS, &plan, &prior);
        let planned_state = if requires_replace.is_empty() {
            reconcile(R::FIELDS, &plan, &prior)
        } else {
            plan
        };

        ModifyPlanResponse {
            planned_state,
            requires_replace,
            diagnostics: vec![],
        }
    }

    async fn create(&self, _ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let planned = request.planned_state;
        let patch = extract_patch(R::FIELDS, &planned);
        tracing::debug!(resource = R::TYPE_NAME, ?patch, "creating");

        let result = match self.remote.create(self.client(), &planned, patch).await {
            Ok(remote) => sync(R::FIELDS, &remote, &planned),
            Err(e) => Err(e),
        };

        match result {
            Ok(new_state) => {
                tracing::info!(
                    resource = R::TYPE_NAME,
                    state = ?redact(R::FIELDS, &new_state).value,
                    "created"
                );
                CreateResourceResponse {
                    new_state,
                    diagnostics: vec![],
                }
            }
            Err(e) => CreateResourceResponse {
                new_state: planned,
                diagnostics: vec![self.failure("create", &e)],
            },
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let state = request.current_state;

        let result = match self.remote.read(self.client(), &state).await {
            Ok(remote) => sync(R::FIELDS, &remote, &state),
            Err(e) => Err(e),
        };

        match result {
            Ok(new_state) => ReadResourceResponse {
                new_state: Some(new_state),
                diagnostics: vec![],
            },
            Err(e) if e.is_not_found() => {
                tracing::warn!(resource = R::TYPE_NAME, "no longer exists, removing from state");
                ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![],
                }
            }
            Err(e) => ReadResourceResponse {
                new_state: Some(state),
                diagnostics: vec![self.failure("read", &e)],
            },
        }
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let planned = request.planned_state;
        let patch = extract_patch(R::FIELDS, &planned);
        tracing::debug!(resource = R::TYPE_NAME, ?patch, "updating");

        let result = match self
            .remote
            .update(self.client(), &request.prior_state, patch)
            .await
        {
            Ok(remote) => sync(R::FIELDS, &remote, &planned),
            Err(e) => Err(e),
        };

        match result {
            Ok(new_state) => {
                tracing::info!(
                    resource = R::TYPE_NAME,
                    state = ?redact(R::FIELDS, &new_state).value,
                    "updated"
                );
                UpdateResourceResponse {
                    new_state,
                    diagnostics: vec![],
                }
            }
            Err(e) => UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics: vec![self.failure("update", &e)],
            },
        }
    }

    async fn delete(&self, _ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let diagnostics = match self.remote.delete(self.client(), &request.prior_state).await {
            Ok(()) => {
                tracing::info!(resource = R::TYPE_NAME, "deleted");
                vec![]
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!(resource = R::TYPE_NAME, "already gone");
                vec![]
            }
            Err(e) => vec![self.failure("delete", &e)],
        };

        DeleteResourceResponse { diagnostics }
    }

    async fn import_state(
        &self,
        _ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };

        let parts = match parse_import_id(&request.id, R::IMPORT_ID) {
            Ok(parts) => parts,
            Err(diag) => {
                response.diagnostics.push(diag);
                return response;
            }
        };

        match self.remote.import(self.client(), parts).await {
            Ok(state) => response.imported_resources.push(ImportedResource {
                type_name: request.type_name,
                state,
            }),
            Err(e) => response.diagnostics.push(self.failure("import", &e)),
        }

        response
    }
}
