//! # Request Data Sources
//!
//! The three request mappings a validation layer can be bound to, and the
//! extraction helpers that read each of them off an in-flight request.
//! Query and route parameters are text pairs (coerced before validation);
//! the body is buffered so the bytes can be re-installed for downstream
//! extractors after a successful check.

use std::fmt;

use axum::extract::{FromRequestParts, RawPathParams, Request};

/// The request mapping a validation layer validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestSource {
    /// Route parameters (`/users/{userId}`).
    Params,
    /// The URI query string.
    Query,
    /// The JSON request body.
    Body,
}

impl RequestSource {
    /// Lowercase name, used in log events.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Params => "params",
            Self::Query => "query",
            Self::Body => "body",
        }
    }
}

impl fmt::Display for RequestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decode the URI query string into text pairs. No query ⇒ empty.
pub(crate) fn query_pairs(request: &Request) -> Vec<(String, String)> {
    match request.uri().query() {
        Some(query) => url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect(),
        None => Vec::new(),
    }
}

/// Read the matched route's path parameters as text pairs.
///
/// Takes the request apart to run the extractor and hands it back intact.
/// A request with no matched path parameters yields an empty mapping.
pub(crate) async fn path_pairs(request: Request) -> (Request, Vec<(String, String)>) {
    let (mut parts, body) = request.into_parts();
    let pairs = match RawPathParams::from_request_parts(&mut parts, &()).await {
        Ok(params) => params
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        Err(_) => Vec::new(),
    };
    (Request::from_parts(parts, body), pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(uri: &str) -> Request {
        axum::http::Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn query_pairs_decodes_url_encoding() {
        let pairs = query_pairs(&request("/test?firstName=Ada%20Lovelace&userId=7"));
        assert_eq!(
            pairs,
            vec![
                ("firstName".to_string(), "Ada Lovelace".to_string()),
                ("userId".to_string(), "7".to_string()),
            ]
        );
    }

    #[test]
    fn absent_query_is_an_empty_mapping() {
        assert!(query_pairs(&request("/test")).is_empty());
    }

    #[tokio::test]
    async fn path_pairs_outside_a_router_are_empty() {
        let (_request, pairs) = path_pairs(request("/users/7")).await;
        assert!(pairs.is_empty());
    }

    #[test]
    fn source_names_are_stable() {
        assert_eq!(RequestSource::Params.to_string(), "params");
        assert_eq!(RequestSource::Query.to_string(), "query");
        assert_eq!(RequestSource::Body.to_string(), "body");
    }
}
