//! pl-core: stable foundation for partledger.
//!
//! Contains:
//! - ids (part identity + comparison distance)
//! - numeric (Real + float helpers)
//! - timing (staleness clock)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod timing;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use ids::PartId;
pub use numeric::*;
pub use timing::RefreshableTimer;
