//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout)
//!     → middleware/locations.rs (match location, seed variables)
//!     → middleware/epp.rs (extract → serialize → resolve → redirect)
//!     → upstream.rs (internal location forwards to the picked endpoint)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod server;
pub mod upstream;

pub use request::{request_id, X_REQUEST_ID};
pub use server::{build_router, GatewayServer, StartupError};
