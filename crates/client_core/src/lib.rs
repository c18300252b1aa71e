use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::domain::{CardId, CreditCard, UserId};
use tracing::debug;

pub mod comments_empty_state;
pub mod config;
pub mod outputs;
pub mod payment_methods;
pub mod strings;

pub use comments_empty_state::{CommentsEmptyStateController, CommentsEmptyStateOutput};
pub use config::{load_settings, Settings};
pub use payment_methods::{PaymentMethodsController, PaymentMethodsOutput};
pub use strings::{EnglishStrings, LocalizedKey, StringsProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletePaymentMethodResponse {
    /// Authoritative count of stored cards remaining after the deletion.
    pub total_count: usize,
}

#[async_trait]
pub trait PaymentMethodsService: Send + Sync {
    async fn fetch_payment_methods(&self) -> Result<Vec<CreditCard>>;
    async fn delete_payment_method(
        &self,
        card_id: &CardId,
    ) -> Result<DeletePaymentMethodResponse>;
}

pub struct MissingPaymentMethodsService;

#[async_trait]
impl PaymentMethodsService for MissingPaymentMethodsService {
    async fn fetch_payment_methods(&self) -> Result<Vec<CreditCard>> {
        Err(anyhow!("payment methods service is unavailable"))
    }

    async fn delete_payment_method(
        &self,
        card_id: &CardId,
    ) -> Result<DeletePaymentMethodResponse> {
        Err(anyhow!(
            "payment methods service is unavailable for card {}",
            card_id.0
        ))
    }
}

pub trait SessionProvider: Send + Sync {
    fn current_user(&self) -> Option<UserId>;
}

pub struct AnonymousSession;

impl SessionProvider for AnonymousSession {
    fn current_user(&self) -> Option<UserId> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsEvent {
    ViewedPaymentMethods,
    DeletedPaymentMethod,
    ErroredDeletePaymentMethod,
}

impl AnalyticsEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AnalyticsEvent::ViewedPaymentMethods => "Viewed Payment Methods",
            AnalyticsEvent::DeletedPaymentMethod => "Deleted Payment Method",
            AnalyticsEvent::ErroredDeletePaymentMethod => "Errored Delete Payment Method",
        }
    }
}

/// Fire-and-forget. Implementations must return promptly and never fail the
/// caller; delivery is best-effort.
pub trait AnalyticsSink: Send + Sync {
    fn notify(&self, event: AnalyticsEvent);
}

pub struct NoopAnalytics;

impl AnalyticsSink for NoopAnalytics {
    fn notify(&self, event: AnalyticsEvent) {
        debug!(event = event.name(), "analytics event dropped");
    }
}
