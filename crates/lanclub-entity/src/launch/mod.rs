//! Application launch telemetry.

pub mod model;

pub use model::{LaunchLog, NewLaunchLog};
