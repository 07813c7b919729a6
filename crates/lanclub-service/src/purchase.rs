//! Package purchase: validation against the catalog and the atomic
//! balance-for-time exchange.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use lanclub_core::error::AppError;
use lanclub_database::repositories::{AccountRepository, PackageRepository};
use lanclub_entity::account::{MAX_TIME_DELTA_SECONDS, NewPurchase, PurchaseOutcome};
use lanclub_entity::package::Package;

use crate::account::normalize_username;

/// Sells time packages.
#[derive(Debug, Clone)]
pub struct PurchaseService {
    /// Account repository.
    account_repo: Arc<AccountRepository>,
    /// Package catalog.
    package_repo: Arc<PackageRepository>,
}

impl PurchaseService {
    /// Creates a new purchase service.
    pub fn new(account_repo: Arc<AccountRepository>, package_repo: Arc<PackageRepository>) -> Self {
        Self {
            account_repo,
            package_repo,
        }
    }

    /// Packages currently on sale.
    pub async fn catalog(&self) -> Result<Vec<Package>, AppError> {
        self.package_repo.find_active().await
    }

    /// Exchanges balance for time.
    ///
    /// When `package_name` names an active catalog entry, the requested
    /// seconds and price must match it. Free-form names are accepted as
    /// long as the amounts are sane.
    pub async fn buy(&self, request: NewPurchase) -> Result<PurchaseOutcome, AppError> {
        let username = normalize_username(&request.username)?.to_string();
        let pc_name = request.pc_name.trim().to_string();
        if pc_name.is_empty() {
            return Err(AppError::validation("pc_name must not be empty"));
        }
        if request.seconds <= 0 {
            return Err(AppError::validation("seconds must be positive"));
        }
        if request.seconds > MAX_TIME_DELTA_SECONDS {
            return Err(AppError::validation(format!(
                "seconds must not exceed {MAX_TIME_DELTA_SECONDS}"
            )));
        }
        if request.price < 0 {
            return Err(AppError::validation("price must not be negative"));
        }

        if let Some(package) = self.package_repo.find_by_name(&request.package_name).await? {
            if package.is_active && !package.matches(request.seconds, request.price) {
                return Err(AppError::validation(format!(
                    "Package '{}' costs {} for {} seconds",
                    package.name, package.price, package.seconds
                )));
            }
        }

        let purchase = NewPurchase {
            username,
            pc_name,
            ..request
        };
        let outcome = self.account_repo.purchase(&purchase, Utc::now()).await?;

        info!(
            username = %purchase.username,
            pc_name = %purchase.pc_name,
            package = %purchase.package_name,
            price = purchase.price,
            new_balance = outcome.new_balance,
            new_time = outcome.new_time,
            "Package purchased"
        );
        Ok(outcome)
    }
}
