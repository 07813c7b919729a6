//! Built-in job handler implementations.

pub mod liveness;
pub mod retention;

pub use liveness::LivenessJobHandler;
pub use retention::LaunchLogRetentionJobHandler;
