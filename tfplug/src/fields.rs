//! Field descriptor tables
//!
//! A resource describes its attributes once, as a static table of
//! [`FieldSpec`]s. Patch extraction, plan reconciliation and syncing from a
//! remote payload are then implemented here, generically, against that table.

use crate::error::{Result, TfplugError};
use crate::plan_modifier::{
    PlanModifier, PlanModifyRequest, RequiresReplaceIfChanged, UseStateForUnknown, UseStateValue,
};
use crate::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use crate::validator::{ExactInteger, OneOf};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

const REDACTED: &str = "(sensitive)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Part of the natural key that addresses the remote object.
    Key,
    Required,
    /// May be omitted; the remote then supplies a value.
    Optional,
    /// Only the remote sets it.
    Computed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Bool,
    Int64,
    StringSet,
}

impl ValueKind {
    fn attribute_type(self) -> AttributeType {
        match self {
            ValueKind::String => AttributeType::String,
            ValueKind::Bool => AttributeType::Bool,
            ValueKind::Int64 => AttributeType::Number,
            ValueKind::StringSet => AttributeType::Set(Box::new(AttributeType::String)),
        }
    }

    fn name(self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Bool => "bool",
            ValueKind::Int64 => "number",
            ValueKind::StringSet => "set of string",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    /// JSON name on the remote side; None when the value only travels in the URL.
    pub wire: Option<&'static str>,
    pub kind: FieldKind,
    pub value: ValueKind,
    pub sensitive: bool,
    pub description: &'static str,
    pub one_of: Option<&'static [&'static str]>,
}

impl FieldSpec {
    const fn new(name: &'static str, kind: FieldKind, value: ValueKind) -> Self {
        Self {
            name,
            wire: Some(name),
            kind,
            value,
            sensitive: false,
            description: "",
            one_of: None,
        }
    }

    pub const fn key(name: &'static str, value: ValueKind) -> Self {
        Self::new(name, FieldKind::Key, value)
    }

    pub const fn required(name: &'static str, value: ValueKind) -> Self {
        Self::new(name, FieldKind::Required, value)
    }

    pub const fn optional(name: &'static str, value: ValueKind) -> Self {
        Self::new(name, FieldKind::Optional, value)
    }

    pub const fn computed(name: &'static str, value: ValueKind) -> Self {
        Self::new(name, FieldKind::Computed, value)
    }

    pub const fn wire(self, wire: &'static str) -> Self {
        Self {
            wire: Some(wire),
            ..self
        }
    }

    pub const fn path_only(self) -> Self {
        Self { wire: None, ..self }
    }

    pub const fn sensitive(self) -> Self {
        Self {
            sensitive: true,
            ..self
        }
    }

    pub const fn describe(self, description: &'static str) -> Self {
        Self {
            description,
            ..self
        }
    }

    pub const fn one_of(self, allowed: &'static [&'static str]) -> Self {
        Self {
            one_of: Some(allowed),
            ..self
        }
    }

    fn dynamic_from_json(&self, json: &serde_json::Value) -> Result<Option<Dynamic>> {
        use serde_json::Value;

        let mismatch = |actual: &str| TfplugError::TypeMismatch {
            expected: self.value.name().to_string(),
            actual: format!("{} for '{}'", actual, self.name),
        };

        let value = match (self.value, json) {
            (ValueKind::StringSet, Value::Null) => Dynamic::List(Vec::new()),
            (_, Value::Null) => return Ok(None),
            (ValueKind::String, Value::String(s)) => Dynamic::String(s.clone()),
            (ValueKind::Bool, Value::Bool(b)) => Dynamic::Bool(*b),
            (ValueKind::Int64, Value::Number(n)) => match n.as_i64() {
                Some(i) if i.unsigned_abs() <= MAX_EXACT_INT as u64 => Dynamic::Number(i as f64),
                Some(_) => return Err(mismatch("integer beyond 2^53")),
                None => return Err(mismatch("non-integer number")),
            },
            (ValueKind::StringSet, Value::Array(items)) => {
                let set = items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect::<Option<BTreeSet<String>>>()
                    .ok_or_else(|| mismatch("array with non-string elements"))?;
                Dynamic::List(set.into_iter().map(Dynamic::String).collect())
            }
            (_, other) => return Err(mismatch(json_type_name(other))),
        };
        Ok(Some(value))
    }

    fn json_from_dynamic(&self, value: &Dynamic) -> serde_json::Value {
        use serde_json::Value;

        match (self.value, value) {
            (ValueKind::Int64, Dynamic::Number(n)) if is_exact_int(*n) => Value::from(*n as i64),
            (ValueKind::StringSet, Dynamic::List(items)) => {
                let set: BTreeSet<&str> = items.iter().filter_map(Dynamic::as_str).collect();
                Value::from(set.into_iter().collect::<Vec<_>>())
            }
            (_, other) => serde_json::to_value(other).unwrap_or(Value::Null),
        }
    }
}

/// Largest integer magnitude a `Dynamic::Number` holds without rounding
pub const MAX_EXACT_INT: i64 = 1 << 53;

pub(crate) fn is_exact_int(n: f64) -> bool {
    n.fract() == 0.0 && n.abs() <= MAX_EXACT_INT as f64
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// The complete attribute list of one resource type.
#[derive(Debug, Clone, Copy)]
pub struct FieldTable {
    pub fields: &'static [FieldSpec],
}

impl FieldTable {
    pub const fn new(fields: &'static [FieldSpec]) -> Self {
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter().filter(|f| f.kind == FieldKind::Key)
    }

    /// Resource schema: keys force replacement, optional attributes keep their
    /// prior value while unknown, computed attributes always keep theirs.
    pub fn schema(&self, description: &str) -> Schema {
        let mut builder = SchemaBuilder::new().description(description);

        for field in self.fields {
            let mut attr = AttributeBuilder::new(field.name, field.value.attribute_type())
                .description(field.description);
            attr = match field.kind {
                FieldKind::Key => attr
                    .required()
                    .plan_modifier(Arc::new(RequiresReplaceIfChanged)),
                FieldKind::Required => attr.required(),
                FieldKind::Optional => attr
                    .optional()
                    .computed()
                    .plan_modifier(Arc::new(UseStateForUnknown)),
                FieldKind::Computed => attr.computed().plan_modifier(Arc::new(UseStateValue)),
            };
            if field.sensitive {
                attr = attr.sensitive();
            }
            if let Some(allowed) = field.one_of {
                attr = attr.validator(Arc::new(OneOf::new(allowed)));
            }
            if field.value == ValueKind::Int64 {
                attr = attr.validator(Arc::new(ExactInteger));
            }
            builder = builder.attribute(attr.build());
        }

        builder.build()
    }

    /// Lookup schema for a data source over the same remote object: keys are
    /// required, everything else is computed and sensitive fields are left out.
    pub fn lookup_schema(&self, description: &str) -> Schema {
        let mut builder = SchemaBuilder::new().description(description);

        for field in self.fields.iter().filter(|f| !f.sensitive) {
            let attr = AttributeBuilder::new(field.name, field.value.attribute_type())
                .description(field.description);
            let attr = match field.kind {
                FieldKind::Key => attr.required(),
                _ => attr.computed(),
            };
            builder = builder.attribute(attr.build());
        }

        builder.build()
    }
}

/// A sparse set of attribute values destined for a remote create or update.
#[derive(Clone)]
pub struct Patch {
    table: FieldTable,
    values: BTreeMap<&'static str, Dynamic>,
}

impl Patch {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, name: &str) -> Option<&Dynamic> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.keys().copied()
    }

    /// Adds a key field the remote call expects in the body. Only set values are copied.
    pub fn with_key(mut self, instance: &DynamicValue, name: &str) -> Self {
        if let Some(spec) = self.table.get(name) {
            if let Some(value) = instance.get(name).filter(|v| is_known(v)) {
                self.values.insert(spec.name, value.clone());
            }
        }
        self
    }

    /// The patch as a full instance: every other field of the table is null.
    pub fn to_instance(&self) -> DynamicValue {
        let mut instance = DynamicValue::object();
        for field in self.table.fields {
            let value = self.values.get(field.name).cloned().unwrap_or(Dynamic::Null);
            instance.set(field.name, value);
        }
        instance
    }

    /// Wire-named JSON body.
    pub fn to_json(&self) -> serde_json::Value {
        let body = self
            .wire_values()
            .map(|(wire, spec, value)| (wire.to_string(), spec.json_from_dynamic(value)))
            .collect();
        serde_json::Value::Object(body)
    }

    /// Computed fields and path-only keys never travel in a body.
    fn wire_values(
        &self,
    ) -> impl Iterator<Item = (&'static str, &'static FieldSpec, &Dynamic)> + '_ {
        self.values.iter().filter_map(|(name, value)| {
            let spec = self.table.get(name)?;
            if spec.kind == FieldKind::Computed {
                return None;
            }
            Some((spec.wire?, spec, value))
        })
    }
}

impl PartialEq for Patch {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl std::fmt::Debug for Patch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.values {
            match self.table.get(name) {
                Some(spec) if spec.sensitive => map.entry(name, &REDACTED),
                _ => map.entry(name, value),
            };
        }
        map.finish()
    }
}

impl Serialize for Patch {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        for (wire, spec, value) in self.wire_values() {
            map.serialize_entry(wire, &spec.json_from_dynamic(value))?;
        }
        map.end()
    }
}

fn is_known(value: &Dynamic) -> bool {
    !matches!(value, Dynamic::Null | Dynamic::Unknown)
}

fn value_or_null<'a>(instance: &'a DynamicValue, name: &str) -> &'a Dynamic {
    instance.get(name).unwrap_or(&Dynamic::Null)
}

/// Copies every non-key field whose value is set. Null and unknown fields are
/// left out so the remote keeps (or defaults) them.
pub fn extract_patch(table: FieldTable, instance: &DynamicValue) -> Patch {
    let values = table
        .fields
        .iter()
        .filter(|f| f.kind != FieldKind::Key)
        .filter_map(|f| {
            instance
                .get(f.name)
                .filter(|v| is_known(v))
                .map(|v| (f.name, v.clone()))
        })
        .collect();

    Patch { table, values }
}

fn modifier_for(kind: FieldKind) -> Option<&'static dyn PlanModifier> {
    match kind {
        FieldKind::Key | FieldKind::Computed => Some(&UseStateValue),
        FieldKind::Optional => Some(&UseStateForUnknown),
        FieldKind::Required => None,
    }
}

/// Corrects a proposed plan against the prior state.
///
/// Keys and computed fields take the state value. Optional fields take it only
/// while the plan leaves them unknown. Required fields are untouched. With no
/// prior state (create) or no plan (destroy) the plan passes through.
pub fn reconcile(table: FieldTable, plan: &DynamicValue, state: &DynamicValue) -> DynamicValue {
    if plan.is_null() || state.is_null() {
        return plan.clone();
    }

    let mut corrected = plan.clone();
    for field in table.fields {
        let Some(modifier) = modifier_for(field.kind) else {
            continue;
        };
        let response = modifier.modify_plan(PlanModifyRequest {
            state: value_or_null(state, field.name).clone(),
            plan: value_or_null(plan, field.name).clone(),
            attribute_path: field.name.to_string(),
        });
        corrected.set(field.name, response.plan_value);
    }
    corrected
}

/// Key fields whose planned value differs from the prior state.
pub fn replaced_keys(
    table: FieldTable,
    plan: &DynamicValue,
    state: &DynamicValue,
) -> Vec<AttributePath> {
    if plan.is_null() || state.is_null() {
        return Vec::new();
    }

    table
        .keys()
        .filter(|field| {
            RequiresReplaceIfChanged
                .modify_plan(PlanModifyRequest {
                    state: value_or_null(state, field.name).clone(),
                    plan: value_or_null(plan, field.name).clone(),
                    attribute_path: field.name.to_string(),
                })
                .requires_replace
        })
        .map(|field| AttributePath::new(field.name))
        .collect()
}

/// Builds the new instance from a remote payload.
///
/// Every field the payload carries overwrites the local one. Sensitive fields
/// are the exception: a local value that is already set is kept whatever the
/// remote echoes. Whatever is still unknown afterwards is resolved (null, or
/// an empty string for sensitive fields) so no unknown value survives.
pub fn from_remote(
    table: FieldTable,
    remote: &serde_json::Value,
    local: &DynamicValue,
) -> Result<DynamicValue> {
    let mut instance = local.clone();
    if !matches!(instance.value, Dynamic::Map(_)) {
        instance = DynamicValue::object();
    }

    for field in table.fields {
        let local_value = value_or_null(&instance, field.name).clone();
        let remote_value = match field.wire.and_then(|w| remote.get(w)) {
            Some(json) => field.dynamic_from_json(json)?,
            None => None,
        };

        let next = if field.sensitive {
            match remote_value {
                _ if is_known(&local_value) => local_value,
                Some(remote) => remote,
                None if local_value.is_unknown() => Dynamic::String(String::new()),
                None => local_value,
            }
        } else {
            match remote_value {
                Some(remote) => remote,
                None if local_value.is_unknown() => Dynamic::Null,
                None => local_value,
            }
        };
        instance.set(field.name, next);
    }

    Ok(instance)
}

/// Runs the attribute validators declared by the table.
pub fn validate_config(table: FieldTable, config: &DynamicValue) -> Vec<Diagnostic> {
    table.schema("").validate(config)
}

/// Copy of the instance that is safe to log.
pub fn redact(table: FieldTable, instance: &DynamicValue) -> DynamicValue {
    let mut redacted = instance.clone();
    for field in table.fields.iter().filter(|f| f.sensitive) {
        if instance.get(field.name).is_some_and(is_known) {
            redacted.set(field.name, Dynamic::String(REDACTED.to_string()));
        }
    }
    redacted
}

/// Drops sensitive attributes, for data sources that never expose them.
pub fn without_sensitive(table: FieldTable, instance: &DynamicValue) -> DynamicValue {
    let mut public = instance.clone();
    if let Dynamic::Map(m) = &mut public.value {
        for field in table.fields.iter().filter(|f| f.sensitive) {
            m.remove(field.name);
        }
    }
    public
}
