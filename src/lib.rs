//! Endpoint picker gateway library.
//!
//! Requests matching an enabled location are described to an endpoint picker
//! (EPP), whose answer is stored in a request variable, and then internally
//! redirected to a location that forwards to the picked endpoint.

pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod interception;
pub mod lifecycle;
pub mod observability;
pub mod resolver;
pub mod routing;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
