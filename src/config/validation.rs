//! Configuration validation.
//!
//! Serde handles syntax; this module checks meaning. Every problem is
//! reported, not just the first one.

use std::collections::HashSet;

use axum::http::HeaderName;
use axum::http::header::CONTENT_TYPE;
use thiserror::Error;

use crate::config::schema::{FailureMode, GatewayConfig, ResolverKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("epp.variables.{field} must not be empty")]
    EmptyVariableName { field: &'static str },

    #[error("epp variable name '{0}' is bound more than once")]
    DuplicateVariableName(String),

    #[error("epp.selection_header '{0}' is not a valid header name")]
    InvalidSelectionHeader(String),

    #[error("epp.selection_header must not be content-type")]
    SelectionHeaderIsContentType,

    #[error("epp.resolver.picker_url is required for the http resolver")]
    MissingPickerUrl,

    #[error("epp.resolver.picker_url '{url}' is invalid: {reason}")]
    InvalidPickerUrl { url: String, reason: String },

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("location '{0}': path_prefix must start with '/'")]
    InvalidPathPrefix(String),

    #[error("internal location '{0}': path must start with '/'")]
    InvalidInternalPath(String),

    #[error("internal location '{0}' is defined more than once")]
    DuplicateInternalPath(String),

    #[error("internal location '{0}': fail_open requires fallback_upstream")]
    MissingFallback(String),
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let epp = &config.epp;

    let names = [
        ("host", &epp.variables.host),
        ("port", &epp.variables.port),
        ("internal_path", &epp.variables.internal_path),
        ("endpoint", &epp.variables.endpoint),
    ];
    let mut seen = HashSet::new();
    for (field, name) in names {
        if name.is_empty() {
            errors.push(ValidationError::EmptyVariableName { field });
        } else if !seen.insert(name.as_str()) {
            errors.push(ValidationError::DuplicateVariableName(name.clone()));
        }
    }

    match HeaderName::from_bytes(epp.selection_header.as_bytes()) {
        Ok(name) if name == CONTENT_TYPE => {
            errors.push(ValidationError::SelectionHeaderIsContentType)
        }
        Ok(_) => {}
        Err(_) => errors.push(ValidationError::InvalidSelectionHeader(
            epp.selection_header.clone(),
        )),
    }

    if epp.resolver.kind == ResolverKind::Http {
        match &epp.resolver.picker_url {
            None => errors.push(ValidationError::MissingPickerUrl),
            Some(raw) => {
                if let Err(e) = url::Url::parse(raw) {
                    errors.push(ValidationError::InvalidPickerUrl {
                        url: raw.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    if epp.resolve_timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "epp.resolve_timeout_ms" });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "timeouts.request_secs" });
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "timeouts.connect_secs" });
    }

    for location in &config.locations {
        if !location.path_prefix.starts_with('/') {
            errors.push(ValidationError::InvalidPathPrefix(location.name.clone()));
        }
    }

    let mut internal_paths = HashSet::new();
    for internal in &config.internal_locations {
        if !internal.path.starts_with('/') {
            errors.push(ValidationError::InvalidInternalPath(internal.path.clone()));
        }
        if !internal_paths.insert(internal.path.as_str()) {
            errors.push(ValidationError::DuplicateInternalPath(internal.path.clone()));
        }
        if internal.failure_mode == FailureMode::FailOpen && internal.fallback_upstream.is_none() {
            errors.push(ValidationError::MissingFallback(internal.path.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{InternalLocationConfig, LocationConfig};

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_reports_all_errors() {
        let mut config = GatewayConfig::default();
        config.epp.variables.port = String::new();
        config.epp.variables.internal_path = config.epp.variables.host.clone();
        config.epp.selection_header = "Content-Type".to_string();
        config.epp.resolver.kind = ResolverKind::Http;
        config.locations.push(LocationConfig {
            name: "bad".into(),
            host: None,
            path_prefix: "v1".into(),
            priority: 0,
            epp_enabled: true,
            variables: Default::default(),
            upstream: None,
        });
        config.internal_locations.push(InternalLocationConfig {
            path: "/_epp/a".into(),
            failure_mode: FailureMode::FailOpen,
            fallback_upstream: None,
        });

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::EmptyVariableName { field: "port" }));
        assert!(errors.contains(&ValidationError::DuplicateVariableName("epp_host".into())));
        assert!(errors.contains(&ValidationError::SelectionHeaderIsContentType));
        assert!(errors.contains(&ValidationError::MissingPickerUrl));
        assert!(errors.contains(&ValidationError::InvalidPathPrefix("bad".into())));
        assert!(errors.contains(&ValidationError::MissingFallback("/_epp/a".into())));
        assert_eq!(errors.len(), 6);
    }

    #[test]
    fn test_invalid_picker_url() {
        let mut config = GatewayConfig::default();
        config.epp.resolver.kind = ResolverKind::Http;
        config.epp.resolver.picker_url = Some("not a url".into());
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidPickerUrl { .. }));
    }

    #[test]
    fn test_zero_timeouts() {
        let mut config = GatewayConfig::default();
        config.timeouts.connect_secs = 0;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::ZeroTimeout { field: "timeouts.connect_secs" }])
        );

        config.timeouts.request_secs = 0;
        config.epp.resolve_timeout_ms = 0;
        assert_eq!(validate_config(&config).unwrap_err().len(), 3);
    }
}
