//! # Field Rules
//!
//! A [`FieldRule`] is one field's validation rule: a JSON Schema fragment
//! describing the value, a requiredness flag, and an optional display label
//! used when reporting a missing required field.
//!
//! Rule evaluation itself (types, patterns, bounds, formats) is entirely the
//! engine's business — the fragment is handed to the `jsonschema` crate
//! untouched. This type only carries the bookkeeping the adapter needs:
//! which fields must be present, what to call them in messages, and which
//! primitive type a string-sourced value should be parsed into before
//! validation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Primitive type a string-sourced value is parsed into before validation.
///
/// Query strings and route parameters always arrive as text. A rule whose
/// fragment declares `integer`, `number`, or `boolean` opts its field into
/// pre-validation parsing; values that fail to parse are left as strings so
/// the engine reports the type violation verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Coercion {
    /// Parse as `i64`.
    Integer,
    /// Parse as `f64`.
    Number,
    /// Accept the literals `true` and `false`.
    Boolean,
}

/// Validation rule for a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    schema: Value,
    required: bool,
    label: Option<String>,
}

impl FieldRule {
    /// Create an optional rule from a JSON Schema fragment.
    ///
    /// ```
    /// use gatehouse_schema::FieldRule;
    /// use serde_json::json;
    ///
    /// let rule = FieldRule::new(json!({"type": "integer", "minimum": 1}))
    ///     .required()
    ///     .label("User ID");
    /// assert!(rule.is_required());
    /// ```
    pub fn new(schema: Value) -> Self {
        Self {
            schema,
            required: false,
            label: None,
        }
    }

    /// Mark the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the field as optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Attach a display label, used in missing-required-field messages.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Whether the field must be present.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The display label, if one was attached.
    pub fn display_label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The JSON Schema fragment for the value.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// The coercion implied by the fragment's declared `type`, if any.
    ///
    /// A fragment may declare a list of types; the first coercible entry
    /// wins.
    pub(crate) fn coercion(&self) -> Option<Coercion> {
        let declared = match self.schema.get("type") {
            Some(Value::String(ty)) => Some(ty.as_str()),
            Some(Value::Array(types)) => types
                .iter()
                .filter_map(Value::as_str)
                .find(|ty| matches!(*ty, "integer" | "number" | "boolean")),
            _ => None,
        }?;
        match declared {
            "integer" => Some(Coercion::Integer),
            "number" => Some(Coercion::Number),
            "boolean" => Some(Coercion::Boolean),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_rule_is_optional() {
        let rule = FieldRule::new(json!({"type": "string"}));
        assert!(!rule.is_required());
        assert!(rule.display_label().is_none());
    }

    #[test]
    fn required_then_optional_round_trip() {
        let rule = FieldRule::new(json!({"type": "string"})).required();
        assert!(rule.is_required());
        let rule = rule.optional();
        assert!(!rule.is_required());
    }

    #[test]
    fn label_is_stored() {
        let rule = FieldRule::new(json!({"type": "string"})).label("First Name");
        assert_eq!(rule.display_label(), Some("First Name"));
    }

    #[test]
    fn coercion_from_declared_type() {
        let int = FieldRule::new(json!({"type": "integer", "minimum": 1}));
        assert_eq!(int.coercion(), Some(Coercion::Integer));

        let num = FieldRule::new(json!({"type": "number"}));
        assert_eq!(num.coercion(), Some(Coercion::Number));

        let flag = FieldRule::new(json!({"type": "boolean"}));
        assert_eq!(flag.coercion(), Some(Coercion::Boolean));

        let text = FieldRule::new(json!({"type": "string"}));
        assert_eq!(text.coercion(), None);
    }

    #[test]
    fn coercion_from_type_list_picks_first_coercible() {
        let rule = FieldRule::new(json!({"type": ["string", "integer"]}));
        assert_eq!(rule.coercion(), Some(Coercion::Integer));
    }

    #[test]
    fn coercion_absent_without_declared_type() {
        let rule = FieldRule::new(json!({"pattern": "^[a-z]+$"}));
        assert_eq!(rule.coercion(), None);
    }
}
