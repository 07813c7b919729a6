//! Scheduled background jobs for LanClub.
//!
//! This crate provides:
//! - A cron scheduler that runs periodic jobs on the server runtime
//! - The `JobHandler` trait every job implements
//! - Built-in jobs for the registry liveness sweep and launch log retention

pub mod executor;
pub mod jobs;
pub mod scheduler;

pub use executor::{JobExecutionError, JobHandler};
pub use scheduler::CronScheduler;
