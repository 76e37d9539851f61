//! Build-time Configuration
//!
//! Values are baked in at compile time, like the original deployment's
//! public environment variables. A missing backend URL falls back to the
//! gateway's documented default; a missing publishable key disables
//! checkout instead of failing at load.

/// Backend base URL override, when compiled in.
pub fn backend_url() -> Option<&'static str> {
    option_env!("SLACKMATE_BACKEND_URL")
}

/// Stripe publishable key, when compiled in.
pub fn stripe_publishable_key() -> Option<&'static str> {
    option_env!("SLACKMATE_STRIPE_PUBLISHABLE_KEY")
}
