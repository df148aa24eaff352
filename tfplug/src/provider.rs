//! Provider trait
//!
//! Configure produces the provider's typed data once. Resource and data
//! source factories receive it directly, so nothing downcasts at runtime.

use crate::context::Context;
use crate::data_source::DataSource;
use crate::resource::Resource;
use crate::schema::Schema;
use crate::types::{Diagnostic, DynamicValue};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

pub type ResourceFactory<D> = fn(Arc<D>) -> Box<dyn Resource>;
pub type DataSourceFactory<D> = fn(Arc<D>) -> Box<dyn DataSource>;

#[async_trait]
pub trait Provider: Send + Sync {
    /// Shared, read-only data every resource and data source is built with
    type Data: Send + Sync + 'static;

    /// Prefix of every resource type name (e.g. "woodpecker")
    fn type_name(&self) -> &str;

    async fn schema(&self, ctx: Context, request: ProviderSchemaRequest) -> ProviderSchemaResponse;

    /// Called once, before any resource or data source operation
    async fn configure(
        &self,
        ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse<Self::Data>;

    fn resources(&self) -> HashMap<String, ResourceFactory<Self::Data>>;

    fn data_sources(&self) -> HashMap<String, DataSourceFactory<Self::Data>>;
}

#[derive(Debug)]
pub struct ProviderSchemaRequest;

#[derive(Debug)]
pub struct ProviderSchemaResponse {
    pub schema: Schema,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug)]
pub struct ConfigureProviderRequest {
    pub config: DynamicValue,
}

#[derive(Debug)]
pub struct ConfigureProviderResponse<D> {
    /// Must be Some unless diagnostics carry an error
    pub provider_data: Option<D>,
    pub diagnostics: Vec<Diagnostic>,
}
