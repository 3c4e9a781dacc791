//! # gatehouse-axum — Request-Validation Middleware
//!
//! Per-route axum middleware over the `gatehouse-schema` primitives:
//! register a master schema once, then guard each route with a derived
//! sub-schema bound to one request data source.
//!
//! ## Surface
//!
//! | Factory          | Validates                  |
//! |------------------|----------------------------|
//! | [`valid_query`]  | the URI query string       |
//! | [`valid_params`] | matched route parameters   |
//! | [`valid_body`]   | the JSON request body      |
//!
//! Each factory resolves its field references at route-definition time and
//! returns a [`ValidationLayer`]; wiring mistakes are `Err` values that
//! abort startup. At request time a failing validation answers `400` with
//! the field→message report as the JSON body; a body-bound layer that
//! receives no JSON body answers a 500-class configuration error instead
//! (see [`error::BodyRejection`]).
//!
//! ```
//! use axum::{routing::get, Router};
//! use gatehouse_axum::{valid_query, FieldRule, Schema, SchemaRegistry};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), gatehouse_axum::SchemaError> {
//! let master = Schema::builder()
//!     .field(
//!         "firstName",
//!         FieldRule::new(json!({"type": "string", "pattern": "^[A-Za-z ]+$"}))
//!             .label("First Name"),
//!     )
//!     .build();
//! let registry = SchemaRegistry::with_master(master);
//!
//! let app: Router = Router::new().route(
//!     "/greet",
//!     get(|| async { "Hello!" }).layer(valid_query(&registry, ["r:firstName"])?),
//! );
//! # let _ = app;
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Policy
//!
//! - No business logic: derivation and validation live in
//!   `gatehouse-schema`; this crate owns only the HTTP binding.
//! - The inner service is never invoked on a rejected request.
//! - A passed request reaches the inner service unchanged (buffered body
//!   bytes are re-installed).

pub mod error;
pub mod middleware;
pub mod source;

pub use error::{BodyRejection, ErrorBody, ErrorDetail};
pub use middleware::{valid_body, valid_params, valid_query, ValidationLayer, ValidationService};
pub use source::RequestSource;

// Re-export the schema surface so route modules need a single import.
pub use gatehouse_schema::{
    FieldRef, FieldRule, IntoSchemaSource, Requiredness, Schema, SchemaBuilder, SchemaError,
    SchemaRegistry, SchemaSource, ValidationReport,
};
