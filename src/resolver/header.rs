//! Header-driven resolver for development and tests.
//!
//! Reads the selection header out of the serialized context and returns the
//! first entry of its comma-separated list, e.g.
//! `10.0.0.1:8080,10.0.0.2:8080` resolves to `10.0.0.1:8080`.

use futures_util::future::{BoxFuture, FutureExt};
use serde_json::Value;

use crate::resolver::{EndpointResolver, ResolutionRequest, ResolveError};

#[derive(Debug, Clone)]
pub struct HeaderSelectionResolver {
    header: String,
}

impl HeaderSelectionResolver {
    pub fn new(header: &str) -> Self {
        Self {
            header: header.to_ascii_lowercase(),
        }
    }

    fn select(&self, request: &ResolutionRequest) -> Result<String, ResolveError> {
        // An unreadable context is treated like an empty one.
        let headers: Value = serde_json::from_str(&request.serialized_context)
            .unwrap_or_else(|_| Value::Object(Default::default()));

        let Some(selection) = find_header(&headers, &self.header) else {
            return Err(ResolveError::Engine(format!(
                "no {} header on request, target={}",
                self.header,
                request.target()
            )));
        };

        selection
            .split(',')
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ResolveError::Engine(format!("empty {} header", self.header)))
    }
}

impl EndpointResolver for HeaderSelectionResolver {
    fn resolve<'a>(
        &'a self,
        request: &'a ResolutionRequest,
    ) -> BoxFuture<'a, Result<String, ResolveError>> {
        async move { self.select(request) }.boxed()
    }
}

/// Case-insensitive lookup of a string entry in a JSON object.
fn find_header<'v>(headers: &'v Value, key: &str) -> Option<&'v str> {
    headers
        .as_object()?
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .and_then(|(_, v)| v.as_str())
}
