//! Request pipeline stages that run before the internal router.

pub mod epp;
pub mod locations;

pub use epp::epp_interception;
pub use locations::bind_location;
