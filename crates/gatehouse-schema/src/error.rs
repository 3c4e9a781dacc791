//! # Schema Errors
//!
//! Setup-time error taxonomy for schema registration, field-reference
//! parsing, and sub-schema derivation. Every variant here indicates a route
//! wiring mistake: they are returned at route-definition time so that
//! application startup can abort, and none of them is produced while a
//! request is being served.

use thiserror::Error;

/// Errors raised while registering a master schema or deriving a sub-schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A derivation was attempted before any master schema was registered.
    #[error(
        "no master schema registered; call `SchemaRegistry::register` before deriving sub-schemas"
    )]
    Unregistered,

    /// `register` was called on a registry that already holds a master schema.
    #[error("a master schema is already registered; the registry is write-once")]
    AlreadyRegistered,

    /// A field reference names a field the master schema does not define.
    #[error("unknown field `{name}`: not defined in the master schema")]
    UnknownField {
        /// The referenced field name.
        name: String,
    },

    /// A field-reference token could not be parsed.
    #[error("malformed field reference `{token}`: {reason}")]
    MalformedFieldRef {
        /// The offending token.
        token: String,
        /// Why the token was rejected.
        reason: String,
    },

    /// A derivation received no field references at all.
    #[error("field reference list is empty; name at least one field or pass a pre-built schema")]
    EmptyFieldRefs,

    /// The lowered schema document was rejected by the validation engine.
    #[error("schema failed to compile: {reason}")]
    InvalidSchema {
        /// Compiler diagnostics from the validation engine.
        reason: String,
    },
}
