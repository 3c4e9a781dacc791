//! # Schemas & Compilation
//!
//! A [`Schema`] is a mapping of field name to [`FieldRule`]. It supports the
//! operations sub-schema derivation is built from — look up a field, copy a
//! restricted subset, overwrite rules — and lowers to a JSON Schema object
//! document that the `jsonschema` crate compiles into a reusable validator.
//!
//! ## Validation
//!
//! [`CompiledSchema::validate`] runs the engine against a value mapping and
//! groups violations into a [`ValidationReport`] keyed by top-level field.
//! Missing required fields are reported first, using the rule's display
//! label; all other messages come from the engine unchanged. At most one
//! message is kept per field.
//!
//! ## Compilation cost
//!
//! [`Schema::validate`] builds a validator per call, which is fine for
//! one-off checks. Request middleware compiles once at route-definition
//! time via [`Schema::compile`] and shares the [`CompiledSchema`] across
//! requests; the compiled validator is `Send + Sync`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::report::ValidationReport;
use crate::rule::{Coercion, FieldRule};

/// An immutable-by-convention mapping of field name to rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    fields: BTreeMap<String, FieldRule>,
}

impl Schema {
    /// Start building a schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder {
            fields: BTreeMap::new(),
        }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether `name` is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names in sorted order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Look up the rule for `name`.
    ///
    /// # Errors
    ///
    /// `SchemaError::UnknownField` if the schema does not define `name`.
    pub fn field(&self, name: &str) -> Result<&FieldRule, SchemaError> {
        self.fields.get(name).ok_or_else(|| SchemaError::UnknownField {
            name: name.to_string(),
        })
    }

    /// Copy the named fields into a new, independently owned schema.
    ///
    /// # Errors
    ///
    /// `SchemaError::UnknownField` if any name is not defined here.
    pub fn restrict<S: AsRef<str>>(&self, names: &[S]) -> Result<Schema, SchemaError> {
        let mut fields = BTreeMap::new();
        for name in names {
            let name = name.as_ref();
            let rule = self.field(name)?;
            fields.insert(name.to_string(), rule.clone());
        }
        Ok(Schema { fields })
    }

    /// Overwrite (or insert) rules for the given fields.
    pub fn update(&mut self, overrides: impl IntoIterator<Item = (String, FieldRule)>) {
        for (name, rule) in overrides {
            self.fields.insert(name, rule);
        }
    }

    /// Lower to a JSON Schema object document.
    ///
    /// Field fragments become `properties` entries (display labels are
    /// carried as `title` when the fragment has none), and required fields
    /// populate the `required` list. Additional properties stay permitted:
    /// request mappings routinely carry fields outside the derived subset.
    pub fn to_document(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for (name, rule) in &self.fields {
            let mut fragment = rule.schema().clone();
            if let (Some(label), Value::Object(obj)) = (rule.display_label(), &mut fragment) {
                obj.entry("title").or_insert_with(|| Value::String(label.to_string()));
            }
            properties.insert(name.clone(), fragment);
            if rule.is_required() {
                required.push(Value::String(name.clone()));
            }
        }

        let mut document = Map::new();
        document.insert("type".to_string(), Value::String("object".to_string()));
        document.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            document.insert("required".to_string(), Value::Array(required));
        }
        Value::Object(document)
    }

    /// Compile into a reusable validator.
    ///
    /// # Errors
    ///
    /// `SchemaError::InvalidSchema` if the engine rejects the lowered
    /// document (e.g. a fragment that is not valid JSON Schema).
    pub fn compile(&self) -> Result<CompiledSchema, SchemaError> {
        let document = self.to_document();
        let validator = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft202012)
            .build(&document)
            .map_err(|e| SchemaError::InvalidSchema {
                reason: e.to_string(),
            })?;

        let required = self
            .fields
            .iter()
            .filter(|(_, rule)| rule.is_required())
            .map(|(name, _)| name.clone())
            .collect();
        let labels = self
            .fields
            .iter()
            .filter_map(|(name, rule)| {
                rule.display_label().map(|label| (name.clone(), label.to_string()))
            })
            .collect();
        let coercions = self
            .fields
            .iter()
            .filter_map(|(name, rule)| rule.coercion().map(|c| (name.clone(), c)))
            .collect();

        Ok(CompiledSchema {
            document,
            validator,
            required,
            labels,
            coercions,
        })
    }

    /// Compile and validate in one step.
    ///
    /// # Errors
    ///
    /// `SchemaError::InvalidSchema` if compilation fails; validation
    /// violations are reported in the returned [`ValidationReport`], not as
    /// errors.
    pub fn validate(&self, values: &Map<String, Value>) -> Result<ValidationReport, SchemaError> {
        Ok(self.compile()?.validate(values))
    }
}

/// Builder for [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: BTreeMap<String, FieldRule>,
}

impl SchemaBuilder {
    /// Add a field rule. A repeated name overwrites the earlier rule.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.fields.insert(name.into(), rule);
        self
    }

    /// Finish building.
    pub fn build(self) -> Schema {
        Schema {
            fields: self.fields,
        }
    }
}

/// A schema lowered to its JSON Schema document and compiled for repeated
/// validation.
pub struct CompiledSchema {
    document: Value,
    validator: jsonschema::Validator,
    required: Vec<String>,
    labels: BTreeMap<String, String>,
    coercions: BTreeMap<String, Coercion>,
}

impl std::fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("document", &self.document)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

impl CompiledSchema {
    /// The lowered JSON Schema object document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Validate a value mapping, producing a per-field report.
    pub fn validate(&self, values: &Map<String, Value>) -> ValidationReport {
        let mut report = ValidationReport::new();

        // Missing required fields get a label-aware message. The engine's
        // own `required` violations land on the instance root and are fully
        // covered by this pass.
        for name in &self.required {
            if !values.contains_key(name) {
                let display = self.labels.get(name).map(String::as_str).unwrap_or(name);
                report.record(name.clone(), format!("{display} is required"));
            }
        }

        let instance = Value::Object(values.clone());
        for error in self.validator.iter_errors(&instance) {
            let path = error.instance_path.to_string();
            let field = path.trim_start_matches('/').split('/').next().unwrap_or("");
            if field.is_empty() {
                // Root-level violation (a `required` entry): already recorded.
                continue;
            }
            report.record(field, error.to_string());
        }

        report
    }

    /// Coerce raw string pairs (query string, route parameters) into typed
    /// values per each field's declared type.
    ///
    /// Unparseable values are passed through as strings so validation
    /// reports the type violation. Fields without a coercible declared type
    /// stay strings. A repeated key keeps its last value.
    pub fn coerce_strings(
        &self,
        raw: impl IntoIterator<Item = (String, String)>,
    ) -> Map<String, Value> {
        let mut values = Map::new();
        for (key, text) in raw {
            let value = match self.coercions.get(&key) {
                Some(Coercion::Integer) => match text.parse::<i64>() {
                    Ok(n) => Value::from(n),
                    Err(_) => Value::String(text),
                },
                Some(Coercion::Number) => match text.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                    Some(n) => Value::Number(n),
                    None => Value::String(text),
                },
                Some(Coercion::Boolean) => match text.as_str() {
                    "true" => Value::Bool(true),
                    "false" => Value::Bool(false),
                    _ => Value::String(text),
                },
                None => Value::String(text),
            };
            values.insert(key, value);
        }
        values
    }
}
