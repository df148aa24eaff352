//! The authenticated user
//!
//! Served from the user fetched at configure time; no remote call.

use crate::provider_data::WoodpeckerProviderData;
use crate::resources::sync;
use async_trait::async_trait;
use std::sync::Arc;
use tfplug::data_source::{
    DataSourceSchemaRequest, DataSourceSchemaResponse, ReadDataSourceRequest,
    ReadDataSourceResponse, ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::{Context, DataSource, Diagnostic, DynamicValue, FieldSpec, FieldTable, ValueKind};

static FIELDS: [FieldSpec; 6] = [
    FieldSpec::computed("id", ValueKind::Int64).describe("User ID"),
    FieldSpec::computed("login", ValueKind::String).describe("Username for user"),
    FieldSpec::computed("email", ValueKind::String).describe("Email address for user"),
    FieldSpec::computed("avatar", ValueKind::String)
        .wire("avatar_url")
        .describe("Avatar URL for user"),
    FieldSpec::computed("active", ValueKind::Bool).describe("Whether user is active in the system"),
    FieldSpec::computed("admin", ValueKind::Bool).describe("Whether user is a Woodpecker admin"),
];

const SELF_FIELDS: FieldTable = FieldTable::new(&FIELDS);

pub struct SelfDataSource {
    data: Arc<WoodpeckerProviderData>,
}

impl SelfDataSource {
    pub const TYPE_NAME: &'static str = "woodpecker_self";

    pub fn new(data: Arc<WoodpeckerProviderData>) -> Self {
        Self { data }
    }
}

pub fn factory(data: Arc<WoodpeckerProviderData>) -> Box<dyn DataSource> {
    Box::new(SelfDataSource::new(data))
}

#[async_trait]
impl DataSource for SelfDataSource {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: SELF_FIELDS.lookup_schema("Provides the authenticated user."),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse {
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, _request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        match sync(SELF_FIELDS, &self.data.self_user, &DynamicValue::object()) {
            Ok(state) => ReadDataSourceResponse {
                state,
                diagnostics: vec![],
            },
            Err(e) => ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![Diagnostic::error("Could not read self", e.to_string())],
            },
        }
    }
}
