//! # Field References
//!
//! A [`FieldRef`] names one master-schema field for inclusion in a derived
//! sub-schema, optionally overriding its requiredness. The structured form
//! is the primary API; the colon-tagged string form (`"r:userId"`,
//! `"opt:firstName"`, a bare `"email"`) is kept at the boundary for
//! compact route wiring and parses via [`FromStr`].
//!
//! [`SchemaSource`] is the tagged input a middleware factory accepts: a
//! pre-built [`Schema`] used as-is, or a list of field references resolved
//! against the registry's master. The [`IntoSchemaSource`] conversions give
//! factory calls their ergonomic surface without any runtime type checks.
//!
//! Tokens that look tagged but are not — an unrecognized modifier, an empty
//! name, a second colon — are rejected as malformed instead of being
//! silently reinterpreted; a typo in route wiring should fail at startup.

use std::fmt;
use std::str::FromStr;

use crate::error::SchemaError;
use crate::schema::Schema;

/// Requiredness override carried by a tagged field reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Requiredness {
    /// The derived field must be present.
    Required,
    /// The derived field may be absent.
    Optional,
}

impl Requiredness {
    /// Parse one of the accepted modifier spellings.
    fn from_modifier(modifier: &str) -> Option<Self> {
        match modifier {
            "r" | "req" | "required" => Some(Self::Required),
            "o" | "opt" | "optional" => Some(Self::Optional),
            _ => None,
        }
    }
}

impl fmt::Display for Requiredness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Required => "required",
            Self::Optional => "optional",
        })
    }
}

/// Reference to one master-schema field, with an optional requiredness
/// override.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    name: String,
    requiredness: Option<Requiredness>,
}

impl FieldRef {
    /// Reference a field, keeping its master-schema requiredness.
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requiredness: None,
        }
    }

    /// Reference a field, forcing it required in the derived schema.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requiredness: Some(Requiredness::Required),
        }
    }

    /// Reference a field, forcing it optional in the derived schema.
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requiredness: Some(Requiredness::Optional),
        }
    }

    /// The referenced field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The requiredness override, if the reference was tagged.
    pub fn requiredness(&self) -> Option<Requiredness> {
        self.requiredness
    }
}

impl FromStr for FieldRef {
    type Err = SchemaError;

    /// Parse the string boundary form.
    ///
    /// `"name"` keeps the master requiredness; `"r:name"`, `"req:name"`,
    /// `"required:name"` force required; `"o:name"`, `"opt:name"`,
    /// `"optional:name"` force optional.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| SchemaError::MalformedFieldRef {
            token: token.to_string(),
            reason: reason.to_string(),
        };

        if token.is_empty() {
            return Err(malformed("token is empty"));
        }

        match token.split_once(':') {
            None => Ok(Self::bare(token)),
            Some((modifier, name)) => {
                let requiredness = Requiredness::from_modifier(modifier)
                    .ok_or_else(|| malformed("unrecognized requiredness modifier"))?;
                if name.is_empty() {
                    return Err(malformed("field name is empty"));
                }
                if name.contains(':') {
                    return Err(malformed("expected a single `modifier:field` pair"));
                }
                Ok(Self {
                    name: name.to_string(),
                    requiredness: Some(requiredness),
                })
            }
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.requiredness {
            None => f.write_str(&self.name),
            Some(req) => write!(f, "{req}:{}", self.name),
        }
    }
}

/// Where a middleware factory gets its schema.
#[derive(Debug, Clone)]
pub enum SchemaSource {
    /// An already-constructed schema, used as-is without derivation.
    Prebuilt(Schema),
    /// Field references to resolve against the registry's master schema.
    FieldRefs(Vec<FieldRef>),
}

/// Conversion into a [`SchemaSource`].
///
/// Implemented for pre-built schemas, structured references, and the string
/// boundary forms. String conversions parse each token and can fail with
/// [`SchemaError::MalformedFieldRef`].
pub trait IntoSchemaSource {
    /// Perform the conversion.
    fn into_schema_source(self) -> Result<SchemaSource, SchemaError>;
}

impl IntoSchemaSource for SchemaSource {
    fn into_schema_source(self) -> Result<SchemaSource, SchemaError> {
        Ok(self)
    }
}

impl IntoSchemaSource for Schema {
    fn into_schema_source(self) -> Result<SchemaSource, SchemaError> {
        Ok(SchemaSource::Prebuilt(self))
    }
}

impl IntoSchemaSource for FieldRef {
    fn into_schema_source(self) -> Result<SchemaSource, SchemaError> {
        Ok(SchemaSource::FieldRefs(vec![self]))
    }
}

impl IntoSchemaSource for Vec<FieldRef> {
    fn into_schema_source(self) -> Result<SchemaSource, SchemaError> {
        Ok(SchemaSource::FieldRefs(self))
    }
}

impl<const N: usize> IntoSchemaSource for [FieldRef; N] {
    fn into_schema_source(self) -> Result<SchemaSource, SchemaError> {
        Ok(SchemaSource::FieldRefs(self.into_iter().collect()))
    }
}

fn parse_tokens<'a>(
    tokens: impl IntoIterator<Item = &'a str>,
) -> Result<SchemaSource, SchemaError> {
    let refs = tokens
        .into_iter()
        .map(FieldRef::from_str)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SchemaSource::FieldRefs(refs))
}

impl IntoSchemaSource for &str {
    fn into_schema_source(self) -> Result<SchemaSource, SchemaError> {
        parse_tokens([self])
    }
}

impl<const N: usize> IntoSchemaSource for [&str; N] {
    fn into_schema_source(self) -> Result<SchemaSource, SchemaError> {
        parse_tokens(self)
    }
}

impl IntoSchemaSource for &[&str] {
    fn into_schema_source(self) -> Result<SchemaSource, SchemaError> {
        parse_tokens(self.iter().copied())
    }
}

impl IntoSchemaSource for Vec<&str> {
    fn into_schema_source(self) -> Result<SchemaSource, SchemaError> {
        parse_tokens(self)
    }
}

impl IntoSchemaSource for Vec<String> {
    fn into_schema_source(self) -> Result<SchemaSource, SchemaError> {
        parse_tokens(self.iter().map(String::as_str))
    }
}
