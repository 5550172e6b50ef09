//! Collection schemas
//!
//! A [`CollectionSchema`] declares the fields a collection stores and the
//! rules each field obeys. Schemas never touch the store; they are applied to
//! a payload before it is written:
//!
//! 1. [`CollectionSchema::retain_known`] drops undeclared top-level fields
//! 2. [`CollectionSchema::apply_defaults`] fills absent fields
//! 3. [`CollectionSchema::validate`] checks types, bounds and enums
//!
//! Uniqueness needs the other records of the collection and is checked by the
//! store under its write lock (see [`CollectionSchema::unique_fields`]).

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Field declarations
// =============================================================================

/// Value kind of a field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// UTF-8 string
    String,
    /// JSON number
    Number,
    /// JSON boolean
    Boolean,
    /// RFC 3339 timestamp or `YYYY-MM-DD` date string
    Date,
    /// Identifier of a record (see [`FieldSpec::reference`])
    ObjectId,
    /// Array whose elements follow the inner spec
    Array(Box<FieldSpec>),
    /// Nested object with declared members
    Object(Vec<(String, FieldSpec)>),
    /// Anything
    Any,
}

impl FieldKind {
    fn name(&self) -> &'static str {
        match self {
            FieldKind::String => "String",
            FieldKind::Number => "Number",
            FieldKind::Boolean => "Boolean",
            FieldKind::Date => "Date",
            FieldKind::ObjectId => "ObjectId",
            FieldKind::Array(_) => "Array",
            FieldKind::Object(_) => "Object",
            FieldKind::Any => "Mixed",
        }
    }
}

/// Declaration of one field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Value kind
    pub kind: FieldKind,
    /// Missing, null and empty-string values are rejected
    pub required: bool,
    /// Value used when the field is absent
    pub default: Option<Value>,
    /// Inclusive lower bound for numbers
    pub min: Option<f64>,
    /// Inclusive upper bound for numbers
    pub max: Option<f64>,
    /// Strings are lowercased before write
    pub lowercase: bool,
    /// Allowed string values (empty means unrestricted)
    pub enum_values: Vec<String>,
    /// No two records may share a value
    pub unique: bool,
    /// Message reported on a uniqueness violation
    pub unique_message: Option<String>,
    /// Collection an `ObjectId` field points into
    pub reference: Option<String>,
    /// Never rendered to clients
    pub hidden: bool,
}

impl FieldSpec {
    /// Field of the given kind with no rules
    pub fn new(kind: FieldKind) -> Self {
        FieldSpec {
            kind,
            required: false,
            default: None,
            min: None,
            max: None,
            lowercase: false,
            enum_values: Vec::new(),
            unique: false,
            unique_message: None,
            reference: None,
            hidden: false,
        }
    }

    /// String field
    pub fn string() -> Self {
        FieldSpec::new(FieldKind::String)
    }

    /// Number field
    pub fn number() -> Self {
        FieldSpec::new(FieldKind::Number)
    }

    /// Boolean field
    pub fn boolean() -> Self {
        FieldSpec::new(FieldKind::Boolean)
    }

    /// Date field
    pub fn date() -> Self {
        FieldSpec::new(FieldKind::Date)
    }

    /// Free-form field
    pub fn any() -> Self {
        FieldSpec::new(FieldKind::Any)
    }

    /// Reference to a record of `collection`
    pub fn reference(collection: impl Into<String>) -> Self {
        FieldSpec {
            reference: Some(collection.into()),
            ..FieldSpec::new(FieldKind::ObjectId)
        }
    }

    /// Array of `inner`
    pub fn array(inner: FieldSpec) -> Self {
        FieldSpec::new(FieldKind::Array(Box::new(inner)))
    }

    /// Nested object with the given members
    pub fn object<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = (S, FieldSpec)>,
        S: Into<String>,
    {
        FieldSpec::new(FieldKind::Object(
            members.into_iter().map(|(n, s)| (n.into(), s)).collect(),
        ))
    }

    /// Mark as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the default value
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Set the inclusive lower bound
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Set the inclusive upper bound
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Lowercase strings before write
    pub fn lowercase(mut self) -> Self {
        self.lowercase = true;
        self
    }

    /// Restrict to the given values
    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Require distinct values across the collection
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Require distinct values, reporting `message` on collision
    pub fn unique_message(mut self, message: impl Into<String>) -> Self {
        self.unique = true;
        self.unique_message = Some(message.into());
        self
    }

    /// Hide from rendered documents
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Default for an absent field
    ///
    /// Arrays default to `[]` unless a default was declared.
    fn effective_default(&self) -> Option<Value> {
        match (&self.default, &self.kind) {
            (Some(v), _) => Some(v.clone()),
            (None, FieldKind::Array(_)) => Some(Value::Array(Vec::new())),
            _ => None,
        }
    }
}

// =============================================================================
// Validation report
// =============================================================================

/// Which rule a field broke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    /// Required field missing
    Required,
    /// Wrong value kind
    Type,
    /// Below the lower bound
    Min,
    /// Above the upper bound
    Max,
    /// Not one of the allowed values
    Enum,
    /// Value already used by another record
    Unique,
    /// Rejected by a custom rule
    Invalid,
}

/// One failing field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path of the field (`github.forks_count`, `tags.2`)
    pub path: String,
    /// Rule that failed
    pub kind: FieldErrorKind,
    /// Human readable message
    pub message: String,
}

/// Every field that failed validation for one payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Collection the payload was meant for
    pub collection: String,
    /// Failing fields in declaration order
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    /// Empty report
    pub fn new(collection: impl Into<String>) -> Self {
        ValidationReport {
            collection: collection.into(),
            errors: Vec::new(),
        }
    }

    /// Report with exactly one failing field
    pub fn single(
        collection: impl Into<String>,
        path: impl Into<String>,
        kind: FieldErrorKind,
        message: impl Into<String>,
    ) -> Self {
        let mut report = ValidationReport::new(collection);
        report.push(path, kind, message);
        report
    }

    /// Record a failing field
    pub fn push(&mut self, path: impl Into<String>, kind: FieldErrorKind, message: impl Into<String>) {
        self.errors.push(FieldError {
            path: path.into(),
            kind,
            message: message.into(),
        });
    }

    /// True if nothing failed
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// First error reported for `path`
    pub fn error_for(&self, path: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.path == path)
    }

    /// `Ok(())` if empty, otherwise `Err(self)`
    pub fn into_result(self) -> Result<(), ValidationReport> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation failed", self.collection)?;
        for (i, e) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { ", " };
            write!(f, "{}{}: {}", sep, e.path, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

// =============================================================================
// Collection schema
// =============================================================================

/// Declared shape of one collection
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSchema {
    name: String,
    fields: Vec<(String, FieldSpec)>,
    timestamps: bool,
    populate: Vec<String>,
    credentials: bool,
}

impl CollectionSchema {
    /// Schema with no fields
    pub fn new(name: impl Into<String>) -> Self {
        CollectionSchema {
            name: name.into(),
            fields: Vec::new(),
            timestamps: false,
            populate: Vec::new(),
            credentials: false,
        }
    }

    /// Declare a field (builder pattern)
    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.push((name.into(), spec));
        self
    }

    /// Render `createdAt` / `updatedAt`
    pub fn with_timestamps(mut self) -> Self {
        self.timestamps = true;
        self
    }

    /// Expand this reference field on read
    pub fn populate(mut self, field: impl Into<String>) -> Self {
        self.populate.push(field.into());
        self
    }

    /// Hash `password` on write
    pub fn with_credentials(mut self) -> Self {
        self.credentials = true;
        self
    }

    /// Collection name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields in order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(n, s)| (n.as_str(), s))
    }

    /// Declaration of a top-level field
    pub fn field_spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// True if timestamps are rendered
    pub fn has_timestamps(&self) -> bool {
        self.timestamps
    }

    /// Reference fields expanded on read
    pub fn populate_fields(&self) -> &[String] {
        &self.populate
    }

    /// True if the collection stores hashed passwords
    pub fn has_credentials(&self) -> bool {
        self.credentials
    }

    /// Top-level fields that must be distinct across records
    pub fn unique_fields(&self) -> Vec<(String, Option<String>)> {
        self.fields
            .iter()
            .filter(|(_, s)| s.unique)
            .map(|(n, s)| (n.clone(), s.unique_message.clone()))
            .collect()
    }

    /// Top-level fields never rendered to clients
    pub fn hidden_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(_, s)| s.hidden)
            .map(|(n, _)| n.as_str())
    }

    /// Drop undeclared top-level fields
    ///
    /// Returns the dropped names.
    pub fn retain_known(&self, fields: &mut Map<String, Value>) -> Vec<String> {
        let unknown: Vec<String> = fields
            .keys()
            .filter(|k| self.field_spec(k).is_none())
            .cloned()
            .collect();
        for name in &unknown {
            fields.remove(name);
        }
        unknown
    }

    /// Fill absent fields with their defaults
    pub fn apply_defaults(&self, fields: &mut Map<String, Value>) {
        fill_defaults(&self.fields, fields);
    }

    /// Check every declared field
    pub fn validate(&self, fields: &Map<String, Value>) -> Result<(), ValidationReport> {
        let mut report = ValidationReport::new(&self.name);
        for (name, spec) in &self.fields {
            check_field(name, spec, fields.get(name), &mut report);
        }
        report.into_result()
    }
}

fn fill_defaults(specs: &[(String, FieldSpec)], fields: &mut Map<String, Value>) {
    for (name, spec) in specs {
        if !fields.contains_key(name) {
            if let Some(default) = spec.effective_default() {
                fields.insert(name.clone(), default);
            }
        }
        if let (FieldKind::Object(members), Some(Value::Object(nested))) =
            (&spec.kind, fields.get_mut(name))
        {
            fill_defaults(members, nested);
        }
    }
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

fn is_date(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok() || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

fn cast_error(path: &str, kind: &FieldKind, value: &Value, report: &mut ValidationReport) {
    report.push(
        path,
        FieldErrorKind::Type,
        format!(
            "Cast to {} failed for value {} at path `{}`",
            kind.name(),
            value,
            path
        ),
    );
}

fn check_field(path: &str, spec: &FieldSpec, value: Option<&Value>, report: &mut ValidationReport) {
    if spec.required && is_missing(value) {
        report.push(
            path,
            FieldErrorKind::Required,
            format!("Path `{}` is required.", path),
        );
        return;
    }
    let value = match value {
        None | Some(Value::Null) => return,
        Some(v) => v,
    };

    match (&spec.kind, value) {
        (FieldKind::Any, _) => {}
        (FieldKind::String, Value::String(s)) => {
            if !spec.enum_values.is_empty() && !spec.enum_values.iter().any(|e| e == s) {
                report.push(
                    path,
                    FieldErrorKind::Enum,
                    format!("`{}` is not a valid enum value for path `{}`.", s, path),
                );
            }
        }
        (FieldKind::Number, Value::Number(n)) => {
            let n = n.as_f64().unwrap_or(f64::NAN);
            if let Some(min) = spec.min {
                if n < min {
                    report.push(
                        path,
                        FieldErrorKind::Min,
                        format!(
                            "Path `{}` ({}) is less than minimum allowed value ({}).",
                            path, n, min
                        ),
                    );
                }
            }
            if let Some(max) = spec.max {
                if n > max {
                    report.push(
                        path,
                        FieldErrorKind::Max,
                        format!(
                            "Path `{}` ({}) is more than maximum allowed value ({}).",
                            path, n, max
                        ),
                    );
                }
            }
        }
        (FieldKind::Boolean, Value::Bool(_)) => {}
        (FieldKind::Date, Value::String(s)) if is_date(s) => {}
        (FieldKind::ObjectId, Value::String(s)) if !s.is_empty() => {}
        (FieldKind::Array(inner), Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                check_field(&format!("{}.{}", path, i), inner, Some(item), report);
            }
        }
        (FieldKind::Object(members), Value::Object(map)) => {
            for (name, member) in members {
                check_field(&format!("{}.{}", path, name), member, map.get(name), report);
            }
        }
        (kind, other) => cast_error(path, kind, other, report),
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Schemas by collection name
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, CollectionSchema>,
}

impl SchemaRegistry {
    /// Empty registry
    pub fn new() -> Self {
        SchemaRegistry::default()
    }

    /// Add or replace a schema
    pub fn register(&mut self, schema: CollectionSchema) {
        self.schemas.insert(schema.name().to_string(), schema);
    }

    /// Add a schema (builder pattern)
    pub fn with(mut self, schema: CollectionSchema) -> Self {
        self.register(schema);
        self
    }

    /// Schema for a collection
    pub fn get(&self, collection: &str) -> Option<&CollectionSchema> {
        self.schemas.get(collection)
    }

    /// True if the collection is registered
    pub fn contains(&self, collection: &str) -> bool {
        self.schemas.contains_key(collection)
    }

    /// Registered names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Every schema, sorted by name
    pub fn iter(&self) -> impl Iterator<Item = &CollectionSchema> {
        self.schemas.values()
    }

    /// Number of schemas
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// True if no schema is registered
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
