//! Package catalog repository implementation.

use sqlx::SqlitePool;

use lanclub_core::error::{AppError, ErrorKind};
use lanclub_core::result::AppResult;
use lanclub_entity::package::Package;

/// Repository for the time package catalog.
#[derive(Debug, Clone)]
pub struct PackageRepository {
    pool: SqlitePool,
}

impl PackageRepository {
    /// Create a new package repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Packages currently on sale, in display order.
    pub async fn find_active(&self) -> AppResult<Vec<Package>> {
        sqlx::query_as::<_, Package>(
            "SELECT * FROM packages WHERE is_active = 1 ORDER BY sort_order, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list packages", e))
    }

    /// Find a package by its display label.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Package>> {
        sqlx::query_as::<_, Package>("SELECT * FROM packages WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find package", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_catalog_is_seeded_in_order() {
        let repo = PackageRepository::new(crate::test_support::pool().await);
        let packages = repo.find_active().await.expect("list");
        let prices: Vec<i64> = packages.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![150, 350, 700, 1000, 2000, 3500]);

        let hour = repo
            .find_by_name("1 час")
            .await
            .expect("lookup")
            .expect("seeded");
        assert!(hour.matches(3600, 350));
        assert!(!hour.matches(3600, 300));
    }
}
