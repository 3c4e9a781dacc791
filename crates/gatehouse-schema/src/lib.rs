//! # gatehouse-schema — Schema Primitives for Request Validation
//!
//! Core types for Gatehouse: field rules, the master-schema registry, and
//! per-route sub-schema derivation. The HTTP-facing middleware lives in
//! `gatehouse-axum`; this crate is framework-free.
//!
//! ## Model
//!
//! An application builds one master [`Schema`] — a mapping of field name to
//! [`FieldRule`] (a JSON Schema fragment plus requiredness and a display
//! label) — and registers it once in a [`SchemaRegistry`]. Each route then
//! names the subset of fields it cares about as [`FieldRef`]s, optionally
//! overriding requiredness per field, and the registry derives an
//! independently owned sub-schema for it:
//!
//! ```
//! use gatehouse_schema::{FieldRef, FieldRule, Schema, SchemaRegistry};
//! use serde_json::json;
//!
//! let master = Schema::builder()
//!     .field(
//!         "userId",
//!         FieldRule::new(json!({"type": "integer", "minimum": 1}))
//!             .required()
//!             .label("User ID"),
//!     )
//!     .field(
//!         "firstName",
//!         FieldRule::new(json!({"type": "string", "pattern": "^[A-Za-z ]+$"})),
//!     )
//!     .build();
//!
//! let registry = SchemaRegistry::with_master(master);
//! let derived = registry
//!     .derive(&[FieldRef::required("firstName")])
//!     .expect("firstName is a master field");
//!
//! let report = derived.validate(&serde_json::Map::new()).expect("compiles");
//! assert_eq!(report.get("firstName"), Some("firstName is required"));
//! ```
//!
//! Rule evaluation is delegated wholesale to the `jsonschema` crate
//! (Draft 2020-12); this crate only restricts, overrides, compiles, and
//! groups the engine's violations into a per-field [`ValidationReport`].
//!
//! ## Crate Policy
//!
//! - No web-framework dependencies (the leaf of the workspace DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Setup mistakes (unknown fields, malformed references, unregistered
//!   registry) are `Err` values surfaced at route-definition time, never at
//!   request time.

pub mod error;
pub mod fieldref;
pub mod registry;
pub mod report;
pub mod rule;
pub mod schema;

// Re-export primary types for ergonomic imports.
pub use error::SchemaError;
pub use fieldref::{FieldRef, IntoSchemaSource, Requiredness, SchemaSource};
pub use registry::SchemaRegistry;
pub use report::ValidationReport;
pub use rule::FieldRule;
pub use schema::{CompiledSchema, Schema, SchemaBuilder};
