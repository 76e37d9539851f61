//! Backend Gateway Client
//!
//! Builds authenticated JSON requests against the Slackmate backend: base
//! URL resolution, bearer-header injection through an injected credential
//! provider, and error unwrapping. Failures always surface as a typed error
//! carrying a human-readable message, never silently.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::account::{AccountProfile, LanguageOption};
use crate::error::GatewayError;
use crate::offer::{Offer, OfferKind};
use crate::payment::{PaymentMethodRef, SetupIntentHandle, SubscriptionResult};

/// Backend address used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";

/// Supplies the persisted session token, if any.
///
/// The gateway never touches ambient storage itself; the frontend injects a
/// localStorage-backed provider, tests inject a fixed one.
pub trait CredentialProvider {
    /// Raw access token, when a session exists.
    fn access_token(&self) -> Option<String>;

    /// Authorization scheme; `Bearer` when unset.
    fn token_type(&self) -> Option<String> {
        None
    }
}

/// Credential provider for unauthenticated use
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn access_token(&self) -> Option<String> {
        None
    }
}

/// `Authorization` header value for the current session, if one exists.
fn auth_header_value<C: CredentialProvider>(credentials: &C) -> Option<String> {
    let token = credentials.access_token()?;
    let scheme = credentials
        .token_type()
        .unwrap_or_else(|| "Bearer".to_string());
    Some(format!("{} {}", scheme, token))
}

fn normalize_base_url(value: &str) -> String {
    value.trim_end_matches('/').to_string()
}

/// Extract the human-readable `message` field from an error body, if any.
fn body_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(|message| message.as_str())
                .map(str::to_string)
        })
        .filter(|message| !message.is_empty())
}

/// The backend surface the checkout flow drives (seam for tests).
#[async_trait(?Send)]
pub trait BackendGateway {
    /// `GET /offers`
    async fn fetch_offers(&self) -> Result<Vec<Offer>, GatewayError>;

    /// `POST /stripe/setup-intent` scoped to the chosen offer kind.
    async fn create_setup_intent(
        &self,
        offer: OfferKind,
    ) -> Result<SetupIntentHandle, GatewayError>;

    /// `POST /stripe/subscriptions` with the confirmed payment method.
    async fn create_subscription(
        &self,
        payment_method: &PaymentMethodRef,
        offer: OfferKind,
    ) -> Result<SubscriptionResult, GatewayError>;
}

/// Session issued by `POST /auth/login`
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Acknowledgement from `POST /auth/register`
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RegisterAck {
    #[serde(default)]
    pub message: Option<String>,
}

/// Partial update for `PUT /users/me`
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ProfileUpdate {
    pub fn language(language: impl Into<String>) -> Self {
        Self {
            default_language: Some(language.into()),
            ..Self::default()
        }
    }

    pub fn password(password: impl Into<String>) -> Self {
        Self {
            password: Some(password.into()),
            ..Self::default()
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetupIntentResponse {
    client_secret: String,
}

/// HTTP gateway over `reqwest` (works on native and wasm32 targets)
#[derive(Clone)]
pub struct HttpGateway<C> {
    http: reqwest::Client,
    base_url: String,
    credentials: C,
}

impl<C: CredentialProvider> HttpGateway<C> {
    /// Create a gateway. `base_url` falls back to [`DEFAULT_BASE_URL`];
    /// trailing slashes are stripped either way.
    pub fn new(base_url: Option<&str>, credentials: C) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: normalize_base_url(base_url.unwrap_or(DEFAULT_BASE_URL)),
            credentials,
        }
    }

    /// Absolute URL for an API path (leading slash optional).
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, GatewayError> {
        let url = self.endpoint(path);
        let mut builder = self.http.request(method, &url);
        if let Some(header) = auth_header_value(&self.credentials) {
            builder = builder.header(reqwest::header::AUTHORIZATION, header);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| GatewayError::Network(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%url, status = status.as_u16(), "backend request failed");
            Err(GatewayError::Status {
                status: status.as_u16(),
                message: body_message(&body),
            })
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, GatewayError> {
        self.send(method, path, body)
            .await?
            .json::<T>()
            .await
            .map_err(|err| GatewayError::Decode(err.to_string()))
    }

    /// `POST /auth/login`
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, GatewayError> {
        self.request(
            Method::POST,
            "/auth/login",
            Some(&json!({ "email": email, "password": password })),
        )
        .await
    }

    /// `POST /auth/register`
    pub async fn register(&self, email: &str, password: &str) -> Result<RegisterAck, GatewayError> {
        self.request(
            Method::POST,
            "/auth/register",
            Some(&json!({ "email": email, "password": password })),
        )
        .await
    }

    /// `GET /users/me`
    pub async fn fetch_profile(&self) -> Result<AccountProfile, GatewayError> {
        self.request(Method::GET, "/users/me", None).await
    }

    /// `PUT /users/me` (status-only; the response body is not consumed)
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), GatewayError> {
        let body = serde_json::to_value(update)
            .map_err(|err| GatewayError::Decode(err.to_string()))?;
        self.send(Method::PUT, "/users/me", Some(&body)).await?;
        Ok(())
    }

    /// `GET /translate/languages`, normalized to one canonical shape at the
    /// gateway boundary.
    pub async fn fetch_languages(&self) -> Result<Vec<LanguageOption>, GatewayError> {
        let raw: serde_json::Value = self.request(Method::GET, "/translate/languages", None).await?;
        Ok(LanguageOption::normalize(&raw))
    }
}

#[async_trait(?Send)]
impl<C: CredentialProvider> BackendGateway for HttpGateway<C> {
    async fn fetch_offers(&self) -> Result<Vec<Offer>, GatewayError> {
        self.request(Method::GET, "/offers", None).await
    }

    async fn create_setup_intent(
        &self,
        offer: OfferKind,
    ) -> Result<SetupIntentHandle, GatewayError> {
        tracing::debug!(offer = offer.as_str(), "creating setup intent");
        let response: SetupIntentResponse = self
            .request(
                Method::POST,
                "/stripe/setup-intent",
                Some(&json!({ "offerType": offer })),
            )
            .await?;
        Ok(SetupIntentHandle::new(response.client_secret))
    }

    async fn create_subscription(
        &self,
        payment_method: &PaymentMethodRef,
        offer: OfferKind,
    ) -> Result<SubscriptionResult, GatewayError> {
        tracing::debug!(offer = offer.as_str(), "creating subscription");
        self.request(
            Method::POST,
            "/stripe/subscriptions",
            Some(&json!({
                "paymentMethodId": payment_method.as_str(),
                "offerType": offer,
            })),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedCredentials {
        token: Option<&'static str>,
        scheme: Option<&'static str>,
    }

    impl CredentialProvider for FixedCredentials {
        fn access_token(&self) -> Option<String> {
            self.token.map(str::to_string)
        }

        fn token_type(&self) -> Option<String> {
            self.scheme.map(str::to_string)
        }
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let gateway = HttpGateway::new(Some("https://api.example.com/api/v1/"), NoCredentials);
        assert_eq!(
            gateway.endpoint("/offers"),
            "https://api.example.com/api/v1/offers"
        );
        assert_eq!(
            gateway.endpoint("offers"),
            "https://api.example.com/api/v1/offers"
        );
    }

    #[test]
    fn test_endpoint_uses_default_base_url() {
        let gateway = HttpGateway::new(None, NoCredentials);
        assert_eq!(
            gateway.endpoint("/users/me"),
            format!("{}/users/me", DEFAULT_BASE_URL)
        );
    }

    #[test]
    fn test_auth_header_defaults_to_bearer() {
        let credentials = FixedCredentials {
            token: Some("token-123"),
            scheme: None,
        };
        assert_eq!(
            auth_header_value(&credentials).as_deref(),
            Some("Bearer token-123")
        );

        let typed = FixedCredentials {
            token: Some("token-123"),
            scheme: Some("Token"),
        };
        assert_eq!(
            auth_header_value(&typed).as_deref(),
            Some("Token token-123")
        );
    }

    #[test]
    fn test_auth_header_omitted_without_token() {
        assert_eq!(auth_header_value(&NoCredentials), None);
    }

    #[test]
    fn test_body_message_extraction() {
        assert_eq!(
            body_message(r#"{"message":"Email not verified."}"#).as_deref(),
            Some("Email not verified.")
        );
        assert_eq!(body_message("<html>oops</html>"), None);
        assert_eq!(body_message(r#"{"message":""}"#), None);
        assert_eq!(body_message(r#"{"code":42}"#), None);
    }

    #[test]
    fn test_profile_update_skips_absent_fields() {
        let update = ProfileUpdate::language("pl");
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body, serde_json::json!({ "defaultLanguage": "pl" }));

        let update = ProfileUpdate::password("hunter22");
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body, serde_json::json!({ "password": "hunter22" }));
    }
}
