//! In-process provider host
//!
//! Drives a [`Provider`] through the lifecycle the way Terraform core does:
//! configure exactly once, then plan, apply, read and import per resource
//! type. Provider data produced by configure is shared read-only with every
//! resource and data source built afterwards.

use crate::context::Context;
use crate::data_source::{
    DataSource, ReadDataSourceRequest, ReadDataSourceResponse, ValidateDataSourceConfigRequest,
};
use crate::error::{Result, TfplugError};
use crate::logging::{try_init_logging, LogLevel};
use crate::provider::{
    ConfigureProviderRequest, DataSourceFactory, Provider, ProviderSchemaRequest, ResourceFactory,
};
use crate::resource::{
    CreateResourceRequest, DeleteResourceRequest, ImportResourceStateRequest,
    ImportResourceStateResponse, ModifyPlanRequest, ReadResourceRequest, ReadResourceResponse,
    Resource, ResourceSchemaRequest, UpdateResourceRequest, ValidateResourceConfigRequest,
};
use crate::schema::Schema;
use crate::types::{has_errors, AttributePath, Diagnostic, Dynamic, DynamicValue};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Host configuration
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Whether to install the stderr tracing subscriber
    pub enable_logging: bool,
    /// Default level when RUST_LOG is unset
    pub log_level: LogLevel,
    /// Deadline applied to every lifecycle call
    pub operation_timeout: Duration,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            enable_logging: true,
            log_level: LogLevel::Info,
            operation_timeout: Duration::from_secs(20 * 60),
        }
    }
}

impl HostConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_logging(mut self) -> Self {
        self.enable_logging = false;
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }
}

/// Result of planning one resource instance
#[derive(Debug, Clone)]
pub struct PlannedChange {
    /// Null for a destroy
    pub planned_state: DynamicValue,
    pub requires_replace: Vec<AttributePath>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
pub struct AppliedChange {
    /// Null after a destroy
    pub new_state: DynamicValue,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ProviderHost<P: Provider> {
    provider: P,
    config: HostConfig,
    data: Option<Arc<P::Data>>,
    resources: HashMap<String, ResourceFactory<P::Data>>,
    data_sources: HashMap<String, DataSourceFactory<P::Data>>,
}

impl<P: Provider> ProviderHost<P> {
    pub fn new(provider: P, config: HostConfig) -> Self {
        if config.enable_logging {
            try_init_logging(config.log_level);
        }

        let resources = provider.resources();
        let data_sources = provider.data_sources();

        Self {
            provider,
            config,
            data: None,
            resources,
            data_sources,
        }
    }

    pub fn provider_data(&self) -> Option<&Arc<P::Data>> {
        self.data.as_ref()
    }

    pub fn resource_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.resources.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn data_source_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.data_sources.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn context(&self, operation: &str, type_name: &str) -> Context {
        Context::new()
            .with_timeout(self.config.operation_timeout)
            .with_operation(operation, type_name)
    }

    /// Runs Configure. A second call is refused.
    pub async fn configure(&mut self, config: DynamicValue) -> Result<Vec<Diagnostic>> {
        if self.data.is_some() {
            return Err(TfplugError::ProviderAlreadyConfigured);
        }

        let ctx = self.context("configure", self.provider.type_name());
        let schema = self
            .provider
            .schema(ctx.clone(), ProviderSchemaRequest)
            .await
            .schema;
        let mut diagnostics = schema.validate(&config);
        if has_errors(&diagnostics) {
            return Ok(diagnostics);
        }

        let response = self
            .provider
            .configure(ctx.clone(), ConfigureProviderRequest { config })
            .instrument(ctx.span().clone())
            .await;
        diagnostics.extend(response.diagnostics);

        match response.provider_data {
            Some(data) if !has_errors(&diagnostics) => {
                tracing::info!(provider = self.provider.type_name(), "provider configured");
                self.data = Some(Arc::new(data));
            }
            Some(_) => {}
            None if !has_errors(&diagnostics) => diagnostics.push(Diagnostic::error(
                "Provider configuration failed",
                "Configure returned no provider data",
            )),
            None => {}
        }

        Ok(diagnostics)
    }

    fn resource(&self, type_name: &str) -> Result<Box<dyn Resource>> {
        let factory = self
            .resources
            .get(type_name)
            .ok_or_else(|| TfplugError::ResourceNotFound(type_name.to_string()))?;
        let data = self.data.clone().ok_or(TfplugError::ProviderNotConfigured)?;
        Ok(factory(data))
    }

    fn data_source(&self, type_name: &str) -> Result<Box<dyn DataSource>> {
        let factory = self
            .data_sources
            .get(type_name)
            .ok_or_else(|| TfplugError::DataSourceNotFound(type_name.to_string()))?;
        let data = self.data.clone().ok_or(TfplugError::ProviderNotConfigured)?;
        Ok(factory(data))
    }

    pub async fn resource_schema(&self, type_name: &str) -> Result<Schema> {
        let resource = self.resource(type_name)?;
        let ctx = self.context("schema", type_name);
        Ok(resource.schema(ctx, ResourceSchemaRequest).await.schema)
    }

    /// Validates the configuration and runs ModifyPlan. A null configuration
    /// is a destroy and passes through untouched.
    pub async fn plan(
        &self,
        type_name: &str,
        config: DynamicValue,
        prior_state: DynamicValue,
    ) -> Result<PlannedChange> {
        let resource = self.resource(type_name)?;
        let ctx = self.context("plan", type_name);

        if config.is_null() {
            return Ok(PlannedChange {
                planned_state: DynamicValue::null(),
                requires_replace: Vec::new(),
                diagnostics: Vec::new(),
            });
        }

        let validation = resource
            .validate(
                ctx.clone(),
                ValidateResourceConfigRequest {
                    type_name: type_name.to_string(),
                    config: config.clone(),
                },
            )
            .await;
        let mut diagnostics = validation.diagnostics;
        if has_errors(&diagnostics) {
            return Ok(PlannedChange {
                planned_state: DynamicValue::null(),
                requires_replace: Vec::new(),
                diagnostics,
            });
        }

        let schema = resource
            .schema(ctx.clone(), ResourceSchemaRequest)
            .await
            .schema;
        let proposed_new_state = propose(&schema, &config);

        let request = ModifyPlanRequest {
            type_name: type_name.to_string(),
            config,
            prior_state,
            proposed_new_state,
        };
        let response = guarded(&ctx, resource.modify_plan(ctx.clone(), request)).await;
        let Some(response) = response else {
            diagnostics.push(cancelled_diagnostic("plan", type_name));
            return Ok(PlannedChange {
                planned_state: DynamicValue::null(),
                requires_replace: Vec::new(),
                diagnostics,
            });
        };
        diagnostics.extend(response.diagnostics);

        Ok(PlannedChange {
            planned_state: response.planned_state,
            requires_replace: response.requires_replace,
            diagnostics,
        })
    }

    /// Applies a planned change: create, update, replace (delete then
    /// create) or delete, depending on the states involved.
    pub async fn apply(
        &self,
        type_name: &str,
        prior_state: DynamicValue,
        change: PlannedChange,
        config: DynamicValue,
    ) -> Result<AppliedChange> {
        let resource = self.resource(type_name)?;
        let ctx = self.context("apply", type_name);

        if change.planned_state.is_null() {
            let diagnostics = self.delete(&ctx, resource.as_ref(), prior_state).await;
            let new_state = DynamicValue::null();
            return Ok(AppliedChange {
                new_state,
                diagnostics,
            });
        }

        let mut diagnostics = Vec::new();
        let replace = !prior_state.is_null() && !change.requires_replace.is_empty();
        if replace {
            diagnostics.extend(self.delete(&ctx, resource.as_ref(), prior_state.clone()).await);
            if has_errors(&diagnostics) {
                return Ok(AppliedChange {
                    new_state: prior_state,
                    diagnostics,
                });
            }
        }

        let outcome = if prior_state.is_null() || replace {
            let request = CreateResourceRequest {
                type_name: type_name.to_string(),
                planned_state: change.planned_state,
                config,
            };
            guarded(&ctx, resource.create(ctx.clone(), request))
                .await
                .map(|r| (r.new_state, r.diagnostics))
        } else {
            let request = UpdateResourceRequest {
                type_name: type_name.to_string(),
                prior_state: prior_state.clone(),
                planned_state: change.planned_state,
                config,
            };
            guarded(&ctx, resource.update(ctx.clone(), request))
                .await
                .map(|r| (r.new_state, r.diagnostics))
        };

        let Some((new_state, op_diagnostics)) = outcome else {
            diagnostics.push(cancelled_diagnostic("apply", type_name));
            return Ok(AppliedChange {
                new_state: prior_state,
                diagnostics,
            });
        };
        diagnostics.extend(op_diagnostics);

        if has_errors(&diagnostics) {
            let new_state = if replace { DynamicValue::null() } else { prior_state };
            return Ok(AppliedChange {
                new_state,
                diagnostics,
            });
        }

        if let Some(name) = unknown_attribute(&new_state) {
            diagnostics.push(
                Diagnostic::error(
                    "Provider produced invalid object",
                    format!("{} left attribute {} unknown after apply", type_name, name),
                )
                .with_attribute(AttributePath::new(&name)),
            );
        }

        Ok(AppliedChange {
            new_state,
            diagnostics,
        })
    }

    async fn delete(
        &self,
        ctx: &Context,
        resource: &dyn Resource,
        prior_state: DynamicValue,
    ) -> Vec<Diagnostic> {
        let type_name = resource.type_name().to_string();
        let request = DeleteResourceRequest {
            type_name: type_name.clone(),
            prior_state,
        };
        match guarded(ctx, resource.delete(ctx.clone(), request)).await {
            Some(response) => response.diagnostics,
            None => vec![cancelled_diagnostic("delete", &type_name)],
        }
    }

    /// Refreshes a resource. A None state means it is gone remotely.
    pub async fn read(&self, type_name: &str, state: DynamicValue) -> Result<ReadResourceResponse> {
        let resource = self.resource(type_name)?;
        let ctx = self.context("read", type_name);
        let request = ReadResourceRequest {
            type_name: type_name.to_string(),
            current_state: state.clone(),
        };

        Ok(guarded(&ctx, resource.read(ctx.clone(), request))
            .await
            .unwrap_or_else(|| ReadResourceResponse {
                new_state: Some(state),
                diagnostics: vec![cancelled_diagnostic("read", type_name)],
            }))
    }

    /// Runs ImportState and then Read on every imported resource, like
    /// `terraform import` does.
    pub async fn import(&self, type_name: &str, id: &str) -> Result<ImportResourceStateResponse> {
        let resource = self.resource(type_name)?;
        let ctx = self.context("import", type_name);
        let request = ImportResourceStateRequest {
            type_name: type_name.to_string(),
            id: id.to_string(),
        };

        let Some(mut response) = guarded(&ctx, resource.import_state(ctx.clone(), request)).await
        else {
            return Ok(ImportResourceStateResponse {
                imported_resources: Vec::new(),
                diagnostics: vec![cancelled_diagnostic("import", type_name)],
            });
        };
        if has_errors(&response.diagnostics) {
            return Ok(response);
        }

        let mut imported = Vec::new();
        for mut item in std::mem::take(&mut response.imported_resources) {
            let read = self.read(&item.type_name, item.state.clone()).await?;
            response.diagnostics.extend(read.diagnostics);
            match read.new_state {
                Some(state) => {
                    item.state = state;
                    imported.push(item);
                }
                None => response.diagnostics.push(Diagnostic::error(
                    "Cannot import non-existent remote object",
                    format!("{} with id {} does not exist", type_name, id),
                )),
            }
        }
        response.imported_resources = imported;

        Ok(response)
    }

    pub async fn read_data_source(
        &self,
        type_name: &str,
        config: DynamicValue,
    ) -> Result<ReadDataSourceResponse> {
        let data_source = self.data_source(type_name)?;
        let ctx = self.context("read", type_name);

        let validation = data_source
            .validate(
                ctx.clone(),
                ValidateDataSourceConfigRequest {
                    type_name: type_name.to_string(),
                    config: config.clone(),
                },
            )
            .await;
        if has_errors(&validation.diagnostics) {
            return Ok(ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: validation.diagnostics,
            });
        }

        let request = ReadDataSourceRequest {
            type_name: type_name.to_string(),
            config,
        };
        Ok(guarded(&ctx, data_source.read(ctx.clone(), request))
            .await
            .unwrap_or_else(|| ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![cancelled_diagnostic("read", type_name)],
            }))
    }
}

/// The plan Terraform proposes from configuration alone: computed attributes
/// the configuration leaves out are unknown, other missing ones are null.
fn propose(schema: &Schema, config: &DynamicValue) -> DynamicValue {
    let mut proposed = config.clone();
    for attr in &schema.block.attributes {
        let configured = config.get(&attr.name).cloned().unwrap_or(Dynamic::Null);
        let value = match configured {
            Dynamic::Null if attr.computed => Dynamic::Unknown,
            other => other,
        };
        proposed.set(&attr.name, value);
    }
    proposed
}

fn unknown_attribute(state: &DynamicValue) -> Option<String> {
    match &state.value {
        Dynamic::Unknown => Some("(root)".to_string()),
        Dynamic::Map(m) => {
            let mut names: Vec<&String> = m
                .iter()
                .filter(|(_, v)| v.is_unknown())
                .map(|(k, _)| k)
                .collect();
            names.sort();
            names.first().map(|n| n.to_string())
        }
        _ => None,
    }
}

fn cancelled_diagnostic(operation: &str, type_name: &str) -> Diagnostic {
    tracing::warn!(operation, type_name, "operation cancelled");
    Diagnostic::error(
        "Operation cancelled",
        format!("{} of {} was cancelled or timed out", operation, type_name),
    )
}

/// Races the call against the context. None means cancelled.
async fn guarded<T>(ctx: &Context, call: impl Future<Output = T>) -> Option<T> {
    tokio::select! {
        out = call.instrument(ctx.span().clone()) => Some(out),
        _ = ctx.cancelled() => None,
    }
}
