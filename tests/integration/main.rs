//! End-to-end tests against the assembled router and an in-memory database.

mod admin_test;
mod client_test;
mod helpers;
mod payment_test;
mod session_test;
