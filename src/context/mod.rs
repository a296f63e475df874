//! Routing context subsystem.
//!
//! # Data Flow
//! ```text
//! RequestVariables (request extension, seeded per location)
//!     → extractor.rs (host, port, internal path; 400 if any is missing)
//!     → serializer.rs (method + allow-listed headers as JSON)
//!     → RoutingContext (immutable for the rest of the request)
//! ```

pub mod extractor;
pub mod serializer;
pub mod store;

pub use extractor::{extract_target, RoutingTarget};
pub use serializer::{HeaderSubset, RoutingContext};
pub use store::{RequestVariables, VariableFlags};
