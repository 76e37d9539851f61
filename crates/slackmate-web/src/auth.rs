//! Session Storage
//!
//! localStorage-backed credential provider injected into the gateway, plus
//! helpers to persist and drop the session around login and password
//! changes.

use slackmate_core::{AuthSession, CredentialProvider, HttpGateway};

const ACCESS_TOKEN_KEY: &str = "accessToken";
const TOKEN_TYPE_KEY: &str = "tokenType";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|window| window.local_storage().ok().flatten())
}

/// Reads the persisted session from browser localStorage
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorageCredentials;

impl CredentialProvider for LocalStorageCredentials {
    fn access_token(&self) -> Option<String> {
        local_storage()?.get_item(ACCESS_TOKEN_KEY).ok().flatten()
    }

    fn token_type(&self) -> Option<String> {
        local_storage()?.get_item(TOKEN_TYPE_KEY).ok().flatten()
    }
}

/// Persist a session after a successful login.
pub fn store_session(session: &AuthSession) {
    if let Some(storage) = local_storage() {
        let _ = storage.set_item(ACCESS_TOKEN_KEY, &session.access_token);
        if let Some(token_type) = &session.token_type {
            let _ = storage.set_item(TOKEN_TYPE_KEY, token_type);
        }
    }
}

/// Drop the persisted session (sign-out, password change).
pub fn clear_session() {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(ACCESS_TOKEN_KEY);
        let _ = storage.remove_item(TOKEN_TYPE_KEY);
    }
}

/// Gateway bound to the configured backend and the stored session.
pub fn gateway() -> HttpGateway<LocalStorageCredentials> {
    HttpGateway::new(crate::config::backend_url(), LocalStorageCredentials)
}
