//! # Schema Registry & Sub-Schema Derivation
//!
//! [`SchemaRegistry`] holds the master schema an application registers once
//! at startup and derives per-route sub-schemas from it. The registry is an
//! explicit value threaded through route setup — clone a handle wherever
//! routes are wired — so independent registries coexist and tests never
//! share state through a process-wide global.
//!
//! ## Lifecycle
//!
//! The master slot is write-once (`OnceLock`): one `register` at startup,
//! lock-free reads thereafter. A second `register` is an error, and every
//! derivation before the first one fails with `Unregistered`.
//!
//! ## Derivation
//!
//! A derivation restricts the master to the referenced fields and applies
//! requiredness overrides: forced-optional first, forced-required second,
//! so a field tagged both ways derives as required regardless of the order
//! it was listed in. The derived schema is independently owned — mutating
//! it never affects the master or sibling derivations.

use std::sync::{Arc, OnceLock};

use crate::error::SchemaError;
use crate::fieldref::{FieldRef, Requiredness, SchemaSource};
use crate::rule::FieldRule;
use crate::schema::Schema;

/// Holder of one application's master validation schema.
///
/// Cloning is cheap; every clone shares the same master slot.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    master: Arc<OnceLock<Schema>>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with its master already registered.
    pub fn with_master(schema: Schema) -> Self {
        let registry = Self::new();
        // A fresh slot cannot already be set.
        let _ = registry.master.set(schema);
        registry
    }

    /// Register the master schema. Must precede every derivation.
    ///
    /// # Errors
    ///
    /// `SchemaError::AlreadyRegistered` if a master is already present;
    /// the slot is write-once.
    pub fn register(&self, schema: Schema) -> Result<(), SchemaError> {
        self.master
            .set(schema)
            .map_err(|_| SchemaError::AlreadyRegistered)
    }

    /// Whether a master schema has been registered.
    pub fn is_registered(&self) -> bool {
        self.master.get().is_some()
    }

    /// The registered master schema.
    ///
    /// # Errors
    ///
    /// `SchemaError::Unregistered` if `register` has not been called.
    pub fn master(&self) -> Result<&Schema, SchemaError> {
        self.master.get().ok_or(SchemaError::Unregistered)
    }

    /// Derive a sub-schema restricted to the referenced fields, with
    /// requiredness overrides applied.
    ///
    /// Override precedence: forced-optional rules are applied before
    /// forced-required rules, so `required` wins when a field carries both
    /// tags.
    ///
    /// # Errors
    ///
    /// `SchemaError::Unregistered` without a master,
    /// `SchemaError::EmptyFieldRefs` for an empty list, and
    /// `SchemaError::UnknownField` when a reference names a field the
    /// master does not define.
    pub fn derive(&self, refs: &[FieldRef]) -> Result<Schema, SchemaError> {
        let master = self.master()?;
        if refs.is_empty() {
            return Err(SchemaError::EmptyFieldRefs);
        }

        let mut names: Vec<String> = Vec::with_capacity(refs.len());
        let mut forced_optional: Vec<(String, FieldRule)> = Vec::new();
        let mut forced_required: Vec<(String, FieldRule)> = Vec::new();

        for field_ref in refs {
            let name = field_ref.name();
            let rule = master.field(name)?;
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
            match field_ref.requiredness() {
                Some(Requiredness::Optional) => {
                    forced_optional.push((name.to_string(), rule.clone().optional()));
                }
                Some(Requiredness::Required) => {
                    forced_required.push((name.to_string(), rule.clone().required()));
                }
                None => {}
            }
        }

        let mut derived = master.restrict(&names)?;
        derived.update(forced_optional);
        derived.update(forced_required);

        tracing::debug!(fields = names.len(), "derived sub-schema from master");
        Ok(derived)
    }

    /// Resolve a [`SchemaSource`]: pre-built schemas pass through unchanged,
    /// field references go through [`derive`](Self::derive).
    pub fn resolve(&self, source: SchemaSource) -> Result<Schema, SchemaError> {
        match source {
            SchemaSource::Prebuilt(schema) => Ok(schema),
            SchemaSource::FieldRefs(refs) => self.derive(&refs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fieldref::IntoSchemaSource;
    use serde_json::json;

    fn master() -> Schema {
        Schema::builder()
            .field(
                "userId",
                FieldRule::new(json!({"type": "integer", "minimum": 1}))
                    .required()
                    .label("User ID"),
            )
            .field(
                "firstName",
                FieldRule::new(json!({"type": "string", "pattern": "^[A-Za-z][A-Za-z ]*$"}))
                    .label("First Name"),
            )
            .field(
                "email",
                FieldRule::new(json!({"type": "string", "format": "email"})).required(),
            )
            .build()
    }

    fn registry() -> SchemaRegistry {
        SchemaRegistry::with_master(master())
    }

    // ── Registration lifecycle ───────────────────────────────────────

    #[test]
    fn derive_before_register_is_unregistered() {
        let registry = SchemaRegistry::new();
        let err = registry.derive(&[FieldRef::bare("email")]).unwrap_err();
        assert!(matches!(err, SchemaError::Unregistered));
    }

    #[test]
    fn master_before_register_is_unregistered() {
        let registry = SchemaRegistry::new();
        assert!(matches!(
            registry.master().unwrap_err(),
            SchemaError::Unregistered
        ));
        assert!(!registry.is_registered());
    }

    #[test]
    fn second_register_is_rejected() {
        let registry = SchemaRegistry::new();
        registry.register(master()).unwrap();
        assert!(matches!(
            registry.register(master()).unwrap_err(),
            SchemaError::AlreadyRegistered
        ));
    }

    #[test]
    fn clones_share_the_master_slot() {
        let registry = SchemaRegistry::new();
        let handle = registry.clone();
        registry.register(master()).unwrap();
        assert!(handle.is_registered());
    }

    // ── Derivation ───────────────────────────────────────────────────

    #[test]
    fn bare_reference_keeps_master_requiredness() {
        let derived = registry().derive(&[FieldRef::bare("email")]).unwrap();
        assert!(derived.field("email").unwrap().is_required());

        let derived = registry().derive(&[FieldRef::bare("firstName")]).unwrap();
        assert!(!derived.field("firstName").unwrap().is_required());
    }

    #[test]
    fn required_override_forces_an_optional_field() {
        let derived = registry()
            .derive(&[FieldRef::required("firstName")])
            .unwrap();
        assert!(derived.field("firstName").unwrap().is_required());
    }

    #[test]
    fn optional_override_relaxes_a_required_field() {
        let derived = registry().derive(&[FieldRef::optional("userId")]).unwrap();
        assert!(!derived.field("userId").unwrap().is_required());
    }

    #[test]
    fn required_wins_over_optional_regardless_of_order() {
        let registry = registry();
        for refs in [
            vec![FieldRef::optional("firstName"), FieldRef::required("firstName")],
            vec![FieldRef::required("firstName"), FieldRef::optional("firstName")],
        ] {
            let derived = registry.derive(&refs).unwrap();
            assert!(
                derived.field("firstName").unwrap().is_required(),
                "refs: {refs:?}"
            );
        }
    }

    #[test]
    fn derivation_is_restricted_to_named_fields() {
        let derived = registry()
            .derive(&[FieldRef::bare("userId"), FieldRef::bare("email")])
            .unwrap();
        assert_eq!(derived.len(), 2);
        assert!(!derived.contains("firstName"));
    }

    #[test]
    fn unknown_field_fails_derivation() {
        let err = registry().derive(&[FieldRef::bare("ghost")]).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownField { name } if name == "ghost"));
    }

    #[test]
    fn empty_reference_list_is_rejected() {
        assert!(matches!(
            registry().derive(&[]).unwrap_err(),
            SchemaError::EmptyFieldRefs
        ));
    }

    #[test]
    fn override_preserves_rule_fragment_and_label() {
        let derived = registry()
            .derive(&[FieldRef::required("firstName")])
            .unwrap();
        let rule = derived.field("firstName").unwrap();
        assert_eq!(rule.display_label(), Some("First Name"));
        assert_eq!(rule.schema()["pattern"], "^[A-Za-z][A-Za-z ]*$");
    }

    #[test]
    fn repeated_derivations_are_independent() {
        let registry = registry();
        let refs = [FieldRef::bare("firstName")];
        let first = registry.derive(&refs).unwrap();
        let mut second = registry.derive(&refs).unwrap();
        assert_eq!(first, second);

        // Mutating one derivation affects neither its sibling nor the master.
        let forced = second.field("firstName").unwrap().clone().required();
        second.update([("firstName".to_string(), forced)]);
        assert!(!first.field("firstName").unwrap().is_required());
        assert!(!registry
            .master()
            .unwrap()
            .field("firstName")
            .unwrap()
            .is_required());
    }

    // ── Source resolution ────────────────────────────────────────────

    #[test]
    fn prebuilt_schema_passes_through_unchanged() {
        let prebuilt = Schema::builder()
            .field("custom", FieldRule::new(json!({"type": "string"})))
            .build();
        // Works even on an unregistered registry: no derivation happens.
        let resolved = SchemaRegistry::new()
            .resolve(SchemaSource::Prebuilt(prebuilt.clone()))
            .unwrap();
        assert_eq!(resolved, prebuilt);
    }

    #[test]
    fn string_tokens_resolve_through_derivation() {
        let source = ["r:firstName", "o:userId"].into_schema_source().unwrap();
        let derived = registry().resolve(source).unwrap();
        assert!(derived.field("firstName").unwrap().is_required());
        assert!(!derived.field("userId").unwrap().is_required());
    }
}
