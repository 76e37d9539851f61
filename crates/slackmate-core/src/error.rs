//! Error Types

use thiserror::Error;

/// Result type alias for checkout operations
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Errors produced by the backend gateway client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Backend answered with a non-success status; `message` is the
    /// human-readable text extracted from the body, when it carried one
    #[error("request failed with status {status}")]
    Status {
        status: u16,
        message: Option<String>,
    },

    /// Request never reached the backend (DNS, connection, transport)
    #[error("network error: {0}")]
    Network(String),

    /// Response body could not be decoded as the expected shape
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Whether the backend asked for (re-)authentication.
    pub fn requires_auth(&self) -> bool {
        matches!(self, GatewayError::Status { status: 401 | 403, .. })
    }

    /// Convert to a user-facing message; a bodyless status falls back to a
    /// generic description.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Status { status, message } => message
                .clone()
                .unwrap_or_else(|| format!("request failed with status {}", status)),
            GatewayError::Network(_) => "Could not reach the server. Please try again.".into(),
            GatewayError::Decode(_) => "The server returned an unexpected response.".into(),
        }
    }
}

/// Errors surfaced by the checkout flow
///
/// One variant per display category, so a decline is never rendered as a
/// validation problem and vice versa.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// Backend request failed (setup intent or subscription creation)
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Payment form input was rejected before confirmation
    #[error("payment details were rejected: {0}")]
    Validation(String),

    /// Provider refused to confirm the setup intent (decline, expiry, ...)
    #[error("payment confirmation failed: {0}")]
    Confirmation(String),

    /// Confirmation succeeded but no payment-method reference came back
    #[error("no payment method was returned after confirmation")]
    MissingPaymentMethod,

    /// Payment provider is not configured (missing publishable key)
    #[error("payments are not configured: {0}")]
    Unconfigured(String),
}

impl CheckoutError {
    /// Convert to a user-facing message
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::Gateway(err) => err.user_message(),
            CheckoutError::Validation(msg) | CheckoutError::Confirmation(msg) => msg.clone(),
            CheckoutError::MissingPaymentMethod => {
                "No payment method was returned after confirmation.".into()
            }
            CheckoutError::Unconfigured(_) => {
                "Payments are not configured. Set the Stripe publishable key.".into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16, message: Option<&str>) -> GatewayError {
        GatewayError::Status {
            status,
            message: message.map(str::to_string),
        }
    }

    #[test]
    fn test_requires_auth_statuses() {
        assert!(status(401, None).requires_auth());
        assert!(status(403, Some("Forbidden")).requires_auth());
        assert!(!status(500, None).requires_auth());
        assert!(!GatewayError::Network("timeout".into()).requires_auth());
    }

    #[test]
    fn test_user_messages_keep_backend_text() {
        let err = CheckoutError::Gateway(status(402, Some("Card declined")));
        assert_eq!(err.user_message(), "Card declined");
        assert_eq!(
            status(500, None).user_message(),
            "request failed with status 500"
        );
        assert!(
            CheckoutError::MissingPaymentMethod
                .user_message()
                .contains("payment method")
        );
    }
}
