//! Offer Catalog
//!
//! Subscription plans as served by `GET /offers`, plus the view state the
//! listing page renders from.

use serde::{Deserialize, Serialize};

/// Purchasable plan kinds (closed enumeration)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferKind {
    Individual,
    Business,
}

impl OfferKind {
    /// Every kind the backend can serve.
    pub const ALL: [OfferKind; 2] = [OfferKind::Individual, OfferKind::Business];

    /// Wire representation, as sent in `offerType` fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferKind::Individual => "INDIVIDUAL",
            OfferKind::Business => "BUSINESS",
        }
    }
}

impl std::fmt::Display for OfferKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A subscription offer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    /// Plan kind
    #[serde(rename = "type")]
    pub kind: OfferKind,

    /// Display title
    pub title: String,

    /// Target-audience text
    pub audience: String,

    /// Monthly price in USD
    pub price_per_month_usd: f64,

    /// Included feature strings
    #[serde(default)]
    pub included: Vec<String>,
}

impl Offer {
    /// Formatted monthly price.
    pub fn price_label(&self) -> String {
        format_usd(self.price_per_month_usd)
    }
}

/// Format a USD amount for display.
///
/// A non-finite or negative amount renders as the zero-currency string
/// instead of propagating `NaN` into the page.
pub fn format_usd(amount: f64) -> String {
    if !amount.is_finite() || amount < 0.0 {
        return "$0.00".to_string();
    }
    format!("${:.2}", amount)
}

/// View state for the offer listing
#[derive(Clone, Debug, PartialEq, Default)]
pub enum CatalogState {
    /// Initial fetch in progress
    #[default]
    Loading,
    /// Fetch failed; message is surfaced verbatim
    Failed(String),
    /// Fetch succeeded (the list may be empty)
    Ready(Vec<Offer>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_kind_wire_format() {
        assert_eq!(
            serde_json::to_string(&OfferKind::Individual).unwrap(),
            "\"INDIVIDUAL\""
        );
        let kind: OfferKind = serde_json::from_str("\"BUSINESS\"").unwrap();
        assert_eq!(kind, OfferKind::Business);
    }

    #[test]
    fn test_offer_deserializes_backend_shape() {
        let offer: Offer = serde_json::from_value(serde_json::json!({
            "type": "INDIVIDUAL",
            "title": "Individual",
            "audience": "For individuals and small teams",
            "pricePerMonthUsd": 12.0,
            "included": ["Translation", "Summaries"]
        }))
        .unwrap();
        assert_eq!(offer.kind, OfferKind::Individual);
        assert_eq!(offer.price_label(), "$12.00");
        assert_eq!(offer.included.len(), 2);
    }

    #[test]
    fn test_format_usd_rounds_to_cents() {
        assert_eq!(format_usd(24.0), "$24.00");
        assert_eq!(format_usd(9.999), "$10.00");
    }

    #[test]
    fn test_format_usd_coerces_bad_values_to_zero() {
        assert_eq!(format_usd(f64::NAN), "$0.00");
        assert_eq!(format_usd(f64::INFINITY), "$0.00");
        assert_eq!(format_usd(f64::NEG_INFINITY), "$0.00");
        assert_eq!(format_usd(-5.0), "$0.00");
    }
}
