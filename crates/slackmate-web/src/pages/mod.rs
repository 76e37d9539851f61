//! Page Components

mod admin;
mod auth;
mod home;
mod offers;
mod slack_connected;

pub use admin::AdminPage;
pub use auth::AuthPage;
pub use home::HomePage;
pub use offers::OffersPage;
pub use slack_connected::SlackConnectedPage;
