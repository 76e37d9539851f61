//! Payment Provider Seam
//!
//! Types exchanged with the payment provider, and the trait the checkout
//! flow drives. The real implementation wraps the provider's hosted form
//! SDK in the frontend crate; tests substitute a mock.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One-time client secret for an in-progress payment-method-collection
/// session. Consumed by a single confirmation; a retry after the modal is
/// closed needs a fresh handle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupIntentHandle(String);

impl SetupIntentHandle {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

/// Opaque provider-assigned identifier for a saved payment instrument.
/// Exists only to be forwarded to the subscription-creation endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodRef(String);

impl PaymentMethodRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PaymentMethodRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of `POST /stripe/subscriptions`
///
/// `subscription_active == false` is not an error: activation completes
/// out-of-band through the backend's provider webhook, and the caller is
/// expected to offer a manual refresh rather than resubmit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResult {
    pub stripe_customer_id: String,
    pub stripe_subscription_id: String,
    pub subscription_active: bool,
    pub email_limit: u32,
}

impl SubscriptionResult {
    pub fn is_active(&self) -> bool {
        self.subscription_active
    }
}

/// Payment provider trait (the hosted-form SDK surface the checkout consumes)
///
/// `?Send` because the flow runs on a single-threaded UI event loop and the
/// browser implementation holds JS handles.
#[async_trait(?Send)]
pub trait PaymentProvider {
    /// Validate the hosted form input before confirmation. An error here is
    /// client input feedback; the form stays open for correction.
    async fn submit(&self) -> Result<()>;

    /// Confirm the setup intent with the provider without leaving the page,
    /// returning the reference to the saved payment method. A confirmation
    /// response that omits the reference is an error, never a silent retry.
    async fn confirm_setup(&self, intent: &SetupIntentHandle) -> Result<PaymentMethodRef>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_result_wire_format() {
        let result: SubscriptionResult = serde_json::from_value(serde_json::json!({
            "stripeCustomerId": "cus_123",
            "stripeSubscriptionId": "sub_456",
            "subscriptionActive": true,
            "emailLimit": 500
        }))
        .unwrap();
        assert!(result.is_active());
        assert_eq!(result.email_limit, 500);
    }
}
