//! # Validation Middleware
//!
//! The factory surface — [`valid_query`], [`valid_params`], [`valid_body`]
//! — and the tower [`Layer`]/[`Service`] pair it produces.
//!
//! A factory call happens once, at route-definition time: the schema source
//! is resolved against the registry (deriving a sub-schema from field
//! references, or passing a pre-built schema through), compiled, and
//! captured in a cloneable [`ValidationLayer`]. Every wiring mistake —
//! unregistered registry, unknown field, malformed reference — surfaces
//! here as an `Err`, so startup aborts instead of requests failing later.
//!
//! Per request, the wrapped service reads the bound source, coerces text
//! values for string-typed sources, and runs the compiled validator. A
//! clean report forwards the request to the inner service unchanged (body
//! bytes are re-installed for downstream extractors); a non-empty report
//! answers `400` with the report itself as the JSON body and never invokes
//! the inner service.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::extract::Request;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http_body_util::BodyExt;
use serde_json::{Map, Value};
use tower::{Layer, Service};

use gatehouse_schema::{CompiledSchema, IntoSchemaSource, SchemaError, SchemaRegistry};

use crate::error::BodyRejection;
use crate::source::{path_pairs, query_pairs, RequestSource};

/// Validate the URI query string against a derived sub-schema.
///
/// `fields` is either field references (structured or `"r:name"`-style
/// tokens) resolved against `registry`'s master schema, or a pre-built
/// [`Schema`](gatehouse_schema::Schema) used as-is.
///
/// # Errors
///
/// Any [`SchemaError`] from parsing, derivation, or compilation — a route
/// wiring mistake, surfaced before the route ever serves.
pub fn valid_query(
    registry: &SchemaRegistry,
    fields: impl IntoSchemaSource,
) -> Result<ValidationLayer, SchemaError> {
    layer_for(registry, fields, RequestSource::Query)
}

/// Validate the matched route's path parameters. See [`valid_query`].
pub fn valid_params(
    registry: &SchemaRegistry,
    fields: impl IntoSchemaSource,
) -> Result<ValidationLayer, SchemaError> {
    layer_for(registry, fields, RequestSource::Params)
}

/// Validate the JSON request body. See [`valid_query`].
///
/// The produced layer requires requests to carry an `application/json`
/// body; anything else answers a 500-class
/// [`BodyRejection::MissingBodyParser`] — a broken pipeline, not bad input.
pub fn valid_body(
    registry: &SchemaRegistry,
    fields: impl IntoSchemaSource,
) -> Result<ValidationLayer, SchemaError> {
    layer_for(registry, fields, RequestSource::Body)
}

fn layer_for(
    registry: &SchemaRegistry,
    fields: impl IntoSchemaSource,
    source: RequestSource,
) -> Result<ValidationLayer, SchemaError> {
    let schema = registry.resolve(fields.into_schema_source()?)?;
    let compiled = schema.compile()?;
    Ok(ValidationLayer {
        schema: Arc::new(compiled),
        source,
    })
}

/// A per-route validation layer bound to one request data source.
///
/// Produced by [`valid_query`], [`valid_params`], or [`valid_body`]; apply
/// with `MethodRouter::layer` or `Router::route_layer`.
#[derive(Clone, Debug)]
pub struct ValidationLayer {
    schema: Arc<CompiledSchema>,
    source: RequestSource,
}

impl ValidationLayer {
    /// The request source this layer validates.
    pub fn source(&self) -> RequestSource {
        self.source
    }
}

impl<S> Layer<S> for ValidationLayer {
    type Service = ValidationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ValidationService {
            inner,
            schema: self.schema.clone(),
            source: self.source,
        }
    }
}

/// Service wrapper that validates before delegating to `inner`.
#[derive(Clone, Debug)]
pub struct ValidationService<S> {
    inner: S,
    schema: Arc<CompiledSchema>,
    source: RequestSource,
}

impl<S> Service<Request> for ValidationService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future =
        Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let schema = self.schema.clone();
        let source = self.source;
        let inner = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, inner);

        Box::pin(async move {
            match check(&schema, source, request).await {
                Ok(request) => inner.call(request).await,
                Err(rejection) => Ok(rejection),
            }
        })
    }
}

/// Run the bound source through the validator.
///
/// Returns the (possibly rebuilt) request on success, or the response to
/// answer with on rejection.
async fn check(
    schema: &CompiledSchema,
    source: RequestSource,
    request: Request,
) -> Result<Request, Response> {
    match source {
        RequestSource::Query => {
            let values = schema.coerce_strings(query_pairs(&request));
            verdict(schema, source, &values)?;
            Ok(request)
        }
        RequestSource::Params => {
            let (request, pairs) = path_pairs(request).await;
            let values = schema.coerce_strings(pairs);
            verdict(schema, source, &values)?;
            Ok(request)
        }
        RequestSource::Body => {
            if !has_json_body(&request) {
                return Err(BodyRejection::MissingBodyParser.into_response());
            }

            let (parts, body) = request.into_parts();
            let bytes = match body.collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(e) => return Err(BodyRejection::ReadFailed(e.to_string()).into_response()),
            };

            let values = if bytes.is_empty() {
                Map::new()
            } else {
                match serde_json::from_slice::<Value>(&bytes) {
                    Ok(Value::Object(map)) => map,
                    // Non-object JSON carries none of the schema's fields;
                    // required-field violations do the rejecting.
                    Ok(_) => Map::new(),
                    Err(e) => {
                        return Err(BodyRejection::InvalidJson(e.to_string()).into_response())
                    }
                }
            };

            verdict(schema, source, &values)?;

            // Re-install the buffered bytes so downstream extractors can
            // still consume the body.
            Ok(Request::from_parts(parts, Body::from(bytes)))
        }
    }
}

/// Whether the request announces a JSON body.
fn has_json_body(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|content_type| {
            let mime = content_type.split(';').next().unwrap_or("").trim();
            mime == "application/json" || mime.ends_with("+json")
        })
}

/// Empty report: pass. Non-empty report: answer 400 with the report as the
/// JSON body.
fn verdict(
    schema: &CompiledSchema,
    source: RequestSource,
    values: &Map<String, Value>,
) -> Result<(), Response> {
    let report = schema.validate(values);
    if report.is_empty() {
        Ok(())
    } else {
        tracing::debug!(source = %source, fields = report.len(), "request failed validation");
        Err((StatusCode::BAD_REQUEST, Json(report)).into_response())
    }
}
