//! REST route definitions
//!
//! Film resources live under /rest; /healthz and /readyz are for probes.

pub mod error;
pub mod films;
pub mod health;

pub use error::ErrorBody;
