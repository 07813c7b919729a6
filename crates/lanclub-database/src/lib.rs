//! # lanclub-database
//!
//! SQLite connection management and concrete repository implementations
//! for all LanClub entities. Multi-row mutations (purchase, credit, grant)
//! run inside a single transaction whose first statement is a conditional
//! `UPDATE ... RETURNING` on the account row.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
