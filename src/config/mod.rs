//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → EppSettings / LocationTable built once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    EppConfig, FailureMode, GatewayConfig, InternalLocationConfig, ListenerConfig,
    LocationConfig, ObservabilityConfig, ResolverConfig, ResolverKind, TimeoutConfig,
    VariableNames,
};
pub use validation::{validate_config, ValidationError};
