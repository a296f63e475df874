//! Location routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path)
//!     → router.rs (location lookup)
//!     → matcher.rs (evaluate match conditions)
//!     → Return: matched Location or None
//! ```
//!
//! Locations are compiled once at startup and never change.

pub mod matcher;
pub mod router;

pub use router::{Location, LocationTable};
