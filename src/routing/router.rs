//! Location lookup.
//!
//! # Design Decisions
//! - Immutable after construction (shared without locks)
//! - Ordered by priority, then by longest prefix; first match wins
//! - Explicit `None` rather than a silent default location

use std::collections::BTreeMap;

use axum::http::Request;

use crate::config::LocationConfig;
use crate::routing::matcher::{AllOf, HostMatcher, Matcher, PathPrefixMatcher, RequestTarget};

/// A compiled client-facing location.
#[derive(Debug)]
pub struct Location {
    pub name: String,
    pub epp_enabled: bool,
    pub variables: BTreeMap<String, String>,
    pub upstream: Option<String>,
    priority: u32,
    prefix_len: usize,
    matcher: AllOf,
}

impl Location {
    fn compile(config: LocationConfig) -> Self {
        let prefix = PathPrefixMatcher::new(config.path_prefix);
        let prefix_len = prefix.len();
        let mut matchers: Vec<Box<dyn Matcher>> = vec![Box::new(prefix)];
        if let Some(host) = config.host {
            matchers.push(Box::new(HostMatcher::new(host)));
        }

        Self {
            name: config.name,
            epp_enabled: config.epp_enabled,
            variables: config.variables,
            upstream: config.upstream,
            priority: config.priority,
            prefix_len,
            matcher: AllOf::new(matchers),
        }
    }
}

#[derive(Debug, Default)]
pub struct LocationTable {
    locations: Vec<Location>,
}

impl LocationTable {
    pub fn from_config(configs: Vec<LocationConfig>) -> Self {
        let mut locations: Vec<Location> = configs.into_iter().map(Location::compile).collect();
        locations.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.prefix_len.cmp(&a.prefix_len))
        });
        Self { locations }
    }

    pub fn match_request<B>(&self, req: &Request<B>) -> Option<&Location> {
        let target = RequestTarget::of(req);
        self.locations.iter().find(|l| l.matcher.matches(&target))
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}
