//! Club machines and their session registry rows.

pub mod model;
pub mod status;

pub use model::{Computer, ComputerView, HeartbeatUpdate, SessionWindow};
pub use status::ComputerStatus;
