//! Time package catalog.

pub mod model;

pub use model::Package;
