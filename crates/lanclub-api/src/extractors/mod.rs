//! Custom Axum extractors.

pub mod admin;
pub mod pagination;
pub mod validated;

pub use admin::AdminUser;
pub use pagination::PaginationParams;
pub use validated::ValidatedJson;
