//! # slackmate-core
//!
//! Client-side domain logic for the Slackmate console: the offer catalog,
//! the backend gateway client, the account view model and the subscription
//! checkout flow (SetupIntent, hosted payment form, subscription creation).
//!
//! The backend API and the payment provider are external collaborators.
//! Both sit behind traits ([`gateway::BackendGateway`] and
//! [`payment::PaymentProvider`]) so the checkout protocol is testable
//! without a browser or a network; the frontend crate supplies the real
//! implementations.

pub mod account;
pub mod checkout;
pub mod error;
pub mod gateway;
pub mod offer;
pub mod payment;

pub use account::{AccountProfile, LanguageOption, SubscriptionStatus, format_datetime};
pub use checkout::{
    AttemptId, Checkout, CheckoutEvent, CheckoutFlow, CheckoutPhase, drive_selection,
    drive_submission,
};
pub use error::{CheckoutError, GatewayError, Result};
pub use gateway::{
    AuthSession, BackendGateway, CredentialProvider, DEFAULT_BASE_URL, HttpGateway, NoCredentials,
    ProfileUpdate, RegisterAck,
};
pub use offer::{CatalogState, Offer, OfferKind, format_usd};
pub use payment::{PaymentMethodRef, PaymentProvider, SetupIntentHandle, SubscriptionResult};
