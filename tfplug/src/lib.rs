//! tfplug - Terraform Plugin Framework for Rust
//!
//! A framework for building Terraform providers in Rust: the value model,
//! tri-state fields, schemas, lifecycle traits and the descriptor-table
//! routines (patch extraction, plan reconciliation, remote sync) that
//! resources share.

// Core modules
pub mod context;
pub mod error;
pub mod field;
pub mod schema;
pub mod types;

// Provider API modules
pub mod data_source;
pub mod provider;
pub mod resource;

// Helper modules
pub mod fields;
pub mod import;
pub mod plan_modifier;
pub mod validator;

// Runtime modules
pub mod host;
pub mod logging;

// Re-exports for convenience
pub use context::Context;
pub use data_source::DataSource;
pub use error::{Result, TfplugError};
pub use field::{Field, FieldState};
pub use fields::{FieldKind, FieldSpec, FieldTable, Patch, ValueKind};
pub use host::{HostConfig, ProviderHost};
pub use import::parse_import_id;
pub use logging::LogLevel;
pub use provider::Provider;
pub use resource::Resource;
pub use schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
pub use types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
