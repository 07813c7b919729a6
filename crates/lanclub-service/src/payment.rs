//! Kaspi payment webhook: signature verification and idempotent credit.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{info, warn};

use lanclub_core::config::PaymentConfig;
use lanclub_core::error::AppError;
use lanclub_database::repositories::AccountRepository;
use lanclub_entity::transaction::{CreditOutcome, NewTransaction, TransactionKind};

use crate::account::normalize_username;

type HmacSha256 = Hmac<Sha256>;

/// Body of a payment notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KaspiNotification {
    /// Provider order identifier, unique per payment.
    pub order_id: String,
    /// Account to credit.
    pub username: String,
    /// Amount paid.
    pub amount: i64,
}

/// Credits balances from signed payment notifications.
#[derive(Debug, Clone)]
pub struct PaymentService {
    account_repo: Arc<AccountRepository>,
    config: PaymentConfig,
}

impl PaymentService {
    /// Creates a new payment service.
    pub fn new(account_repo: Arc<AccountRepository>, config: PaymentConfig) -> Self {
        Self {
            account_repo,
            config,
        }
    }

    /// Header carrying the hex signature.
    pub fn signature_header(&self) -> &str {
        &self.config.signature_header
    }

    /// Verifies the hex HMAC-SHA256 of the raw body.
    pub fn verify_signature(&self, body: &[u8], signature: Option<&str>) -> Result<(), AppError> {
        let signature = signature
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::authentication("Missing payment signature"))?;
        let expected = hex::decode(signature)
            .map_err(|_| AppError::authentication("Malformed payment signature"))?;

        let mut mac = HmacSha256::new_from_slice(self.config.webhook_secret.as_bytes())
            .map_err(|e| AppError::internal(format!("Invalid webhook secret: {e}")))?;
        mac.update(body);
        mac.verify_slice(&expected)
            .map_err(|_| AppError::authentication("Invalid payment signature"))
    }

    /// Verifies, parses and applies a raw webhook delivery.
    pub async fn handle_webhook(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<CreditOutcome, AppError> {
        if !self.config.enabled || self.config.webhook_secret.is_empty() {
            return Err(AppError::service_unavailable("Payments are disabled"));
        }
        if let Err(e) = self.verify_signature(body, signature) {
            warn!(error = %e, "Rejected payment webhook");
            return Err(e);
        }

        let notification: KaspiNotification = serde_json::from_slice(body)
            .map_err(|e| AppError::validation(format!("Invalid payment notification: {e}")))?;
        self.credit(&notification).await
    }

    /// Credits one notification. Replays of an order id change nothing.
    pub async fn credit(&self, notification: &KaspiNotification) -> Result<CreditOutcome, AppError> {
        let username = normalize_username(&notification.username)?;
        let order_id = notification.order_id.trim();
        if order_id.is_empty() {
            return Err(AppError::validation("order_id must not be empty"));
        }
        if notification.amount <= 0 {
            return Err(AppError::validation("Amount must be positive"));
        }

        let entry = NewTransaction::credit(TransactionKind::PaymentTopUp, username, notification.amount)
            .with_order_id(order_id)
            .with_description("kaspi");
        let outcome = self.account_repo.credit(&entry).await?;

        if outcome.duplicate {
            info!(order_id, username, "Duplicate payment notification ignored");
        } else {
            info!(
                order_id,
                username,
                amount = notification.amount,
                new_balance = outcome.new_balance,
                "Payment credited"
            );
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanclub_core::error::ErrorKind;
    use lanclub_entity::account::CreateAccount;

    const SECRET: &str = "kaspi-secret";

    fn sign(body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).expect("key");
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    async fn service(enabled: bool) -> PaymentService {
        let pool = crate::test_support::pool().await;
        let accounts = Arc::new(AccountRepository::new(pool));
        accounts
            .create(&CreateAccount {
                username: "alice".to_string(),
                password_hash: "x".to_string(),
                balance: 100,
            })
            .await
            .expect("seed");
        PaymentService::new(
            accounts,
            PaymentConfig {
                enabled,
                webhook_secret: SECRET.to_string(),
                ..PaymentConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn test_signed_webhook_credits_once() {
        let svc = service(true).await;
        let body = br#"{"order_id":"K-1","username":"alice","amount":1000}"#;
        let signature = sign(body);

        let first = svc.handle_webhook(body, Some(&signature)).await.expect("credit");
        assert_eq!(first.new_balance, 1100);
        assert!(!first.duplicate);

        let replay = svc.handle_webhook(body, Some(&signature)).await.expect("replay");
        assert_eq!(replay.new_balance, 1100);
        assert!(replay.duplicate);
    }

    #[tokio::test]
    async fn test_bad_signatures_are_rejected() {
        let svc = service(true).await;
        let body = br#"{"order_id":"K-2","username":"alice","amount":10}"#;
        let tampered = sign(br#"{"order_id":"K-2","username":"alice","amount":99999}"#);

        for signature in [None, Some("zz-not-hex"), Some(tampered.as_str())] {
            let err = svc.handle_webhook(body, signature).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::Authentication);
        }
    }

    #[tokio::test]
    async fn test_disabled_payments() {
        let svc = service(false).await;
        let body = br#"{"order_id":"K-3","username":"alice","amount":10}"#;
        let err = svc.handle_webhook(body, Some(&sign(body))).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
    }

    #[tokio::test]
    async fn test_non_positive_amount() {
        let svc = service(true).await;
        let body = br#"{"order_id":"K-4","username":"alice","amount":0}"#;
        let err = svc.handle_webhook(body, Some(&sign(body))).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
