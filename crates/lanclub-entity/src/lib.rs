//! # lanclub-entity
//!
//! Domain entity models for LanClub. Every struct in this crate represents
//! a database table row or a domain value object. All entities derive
//! `Debug`, `Clone`, `Serialize`, `Deserialize`, and database entities
//! additionally derive `sqlx::FromRow`.

pub mod account;
pub mod computer;
pub mod launch;
pub mod package;
pub mod transaction;
