//! # lanclub-core
//!
//! Core crate for LanClub. Contains configuration schemas, pagination
//! types, and the unified error system shared by the backend, the worker,
//! and the kiosk client.
//!
//! This crate has **no** internal dependencies on other LanClub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
