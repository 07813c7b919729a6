//! # lanclub-client
//!
//! Kiosk-side runtime for a LanClub machine.
//!
//! A [`SessionController`] owns all mutable session state and consumes
//! events from the session timer, the sync loop and finished background
//! calls over channels. The GUI (or the headless CLI) talks to it with
//! [`Command`]s and renders the [`UiEvent`] stream it emits.

pub mod api;
pub mod cache;
pub mod controller;
pub mod error;
pub mod events;
pub mod expiry;
pub mod heartbeat;
pub mod pool;
pub mod protocol;
pub mod reconcile;
pub mod runtime;
pub mod sync;
pub mod timer;

pub use api::{BackendClient, HttpBackend};
pub use controller::{Command, PackageChoice, PurchaseError, SessionController, UiEvent};
pub use error::ClientError;
pub use expiry::ExpiryHandler;
pub use runtime::ClientRuntime;

#[cfg(test)]
pub(crate) mod testing;
