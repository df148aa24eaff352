//! Data source implementations
//!
//! Every lookup data source mirrors a resource type: it takes the resource's
//! key attributes and fills in the rest from the remote object. Sensitive
//! attributes are never exposed.

pub mod self_user;

pub use self_user::SelfDataSource;

use crate::provider_data::WoodpeckerProviderData;
use crate::resources::{sync, RemoteResource};
use async_trait::async_trait;
use std::sync::Arc;
use tfplug::data_source::{
    DataSourceSchemaRequest, DataSourceSchemaResponse, ReadDataSourceRequest,
    ReadDataSourceResponse, ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::fields::without_sensitive;
use tfplug::{Context, DataSource, Diagnostic, DynamicValue};

pub struct LookupDataSource<R: RemoteResource> {
    remote: R,
    data: Arc<WoodpeckerProviderData>,
}

impl<R: RemoteResource> LookupDataSource<R> {
    pub fn new(data: Arc<WoodpeckerProviderData>) -> Self {
        Self {
            remote: R::default(),
            data,
        }
    }

    async fn lookup(&self, config: &DynamicValue) -> crate::error::Result<DynamicValue> {
        let remote = self.remote.read(&self.data.client, config).await?;
        let state = sync(R::FIELDS, &remote, config)?;
        Ok(without_sensitive(R::FIELDS, &state))
    }
}

pub fn factory<R: RemoteResource>(data: Arc<WoodpeckerProviderData>) -> Box<dyn DataSource> {
    Box::new(LookupDataSource::<R>::new(data))
}

#[async_trait]
impl<R: RemoteResource> DataSource for LookupDataSource<R> {
    fn type_name(&self) -> &str {
        R::TYPE_NAME
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: R::FIELDS.lookup_schema(R::DESCRIPTION),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        let diagnostics = R::FIELDS
            .lookup_schema(R::DESCRIPTION)
            .validate(&request.config);
        ValidateDataSourceConfigResponse { diagnostics }
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        match self.lookup(&request.config).await {
            Ok(state) => ReadDataSourceResponse {
                state,
                diagnostics: vec![],
            },
            Err(e) => {
                tracing::error!(data_source = R::TYPE_NAME, "lookup failed: {}", e);
                ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics: vec![Diagnostic::error(
                        format!("Could not read {}", R::NOUN),
                        e.to_string(),
                    )],
                }
            }
        }
    }
}
