//! Account Profile & Language Options
//!
//! View-model types for the admin page, plus the validated-parse step that
//! turns the heterogeneous `/translate/languages` payloads into one
//! canonical shape before anything renders them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Subscription status embedded in the profile payload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    pub subscription_active: bool,
}

/// The authenticated user's account, as served by `GET /users/me`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountProfile {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub default_language: Option<String>,
    #[serde(default)]
    pub subscription_started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_billing_at: Option<DateTime<Utc>>,
    pub workspace_used: u32,
    #[serde(default)]
    pub current_workspace_count: Option<u32>,
    #[serde(default)]
    pub stripe_subscription: Option<SubscriptionStatus>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl AccountProfile {
    pub fn subscription_active(&self) -> bool {
        self.stripe_subscription
            .as_ref()
            .is_some_and(|status| status.subscription_active)
    }

    /// "Active" / "Inactive" when the backend reported a subscription at all.
    pub fn subscription_label(&self) -> Option<&'static str> {
        self.stripe_subscription.as_ref().map(|status| {
            if status.subscription_active {
                "Active"
            } else {
                "Inactive"
            }
        })
    }

    /// Whether another Slack workspace can still be connected.
    pub fn can_add_workspace(&self) -> bool {
        let count = self.current_workspace_count.unwrap_or(0);
        count > 0 && self.workspace_used <= count
    }
}

/// Format an optional timestamp for the profile/billing detail rows.
pub fn format_datetime(value: Option<&DateTime<Utc>>) -> Option<String> {
    value.map(|datetime| datetime.format("%b %e, %Y %H:%M").to_string())
}

/// One selectable language
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageOption {
    pub value: String,
    pub label: String,
}

impl LanguageOption {
    /// Normalize the language-list payload.
    ///
    /// Accepted shapes: a bare array, `{"languages": [...]}` or
    /// `{"items": [...]}`; entries are either strings or objects. An object's
    /// value is the first non-empty of `code`, `value`, `id`, `name`, `label`
    /// and its label the first non-empty of `label`, `name`, `code`, `value`,
    /// `id`. Entries without a usable value are dropped.
    pub fn normalize(data: &Value) -> Vec<LanguageOption> {
        let empty: &[Value] = &[];
        let items = data
            .as_array()
            .map(Vec::as_slice)
            .or_else(|| data.get("languages").and_then(Value::as_array).map(Vec::as_slice))
            .or_else(|| data.get("items").and_then(Value::as_array).map(Vec::as_slice))
            .unwrap_or(empty);

        items.iter().filter_map(Self::from_item).collect()
    }

    fn from_item(item: &Value) -> Option<LanguageOption> {
        if let Some(code) = item.as_str() {
            if code.is_empty() {
                return None;
            }
            return Some(LanguageOption {
                value: code.to_string(),
                label: code.to_string(),
            });
        }

        let object = item.as_object()?;
        let pick = |keys: &[&str]| {
            keys.iter().find_map(|key| {
                object
                    .get(*key)
                    .and_then(Value::as_str)
                    .filter(|text| !text.is_empty())
                    .map(str::to_string)
            })
        };

        let value = pick(&["code", "value", "id", "name", "label"])?;
        let label = pick(&["label", "name", "code", "value", "id"]).unwrap_or_else(|| value.clone());
        Some(LanguageOption { value, label })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile(value: Value) -> AccountProfile {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_profile_tolerates_missing_fields() {
        let user = profile(json!({
            "id": 7,
            "email": "user@example.com",
            "defaultLanguage": null,
            "workspaceUsed": 1
        }));
        assert_eq!(user.email, "user@example.com");
        assert!(!user.subscription_active());
        assert_eq!(user.subscription_label(), None);
    }

    #[test]
    fn test_subscription_label_follows_active_flag() {
        let user = profile(json!({
            "id": 7,
            "email": "user@example.com",
            "workspaceUsed": 1,
            "stripeSubscription": { "subscriptionActive": true }
        }));
        assert!(user.subscription_active());
        assert_eq!(user.subscription_label(), Some("Active"));

        let user = profile(json!({
            "id": 7,
            "email": "user@example.com",
            "workspaceUsed": 1,
            "stripeSubscription": { "subscriptionActive": false }
        }));
        assert_eq!(user.subscription_label(), Some("Inactive"));
    }

    #[test]
    fn test_can_add_workspace_respects_quota() {
        let quota = |used: u32, count: Value| {
            profile(json!({
                "id": 1,
                "email": "a@b.c",
                "workspaceUsed": used,
                "currentWorkspaceCount": count
            }))
            .can_add_workspace()
        };
        assert!(quota(1, json!(3)));
        assert!(quota(3, json!(3)));
        assert!(!quota(4, json!(3)));
        assert!(!quota(0, json!(null)));
        assert!(!quota(0, json!(0)));
    }

    #[test]
    fn test_normalize_bare_string_array() {
        let options = LanguageOption::normalize(&json!(["en", "pl", ""]));
        assert_eq!(
            options,
            vec![
                LanguageOption { value: "en".into(), label: "en".into() },
                LanguageOption { value: "pl".into(), label: "pl".into() },
            ]
        );
    }

    #[test]
    fn test_normalize_wrapped_object_arrays() {
        let languages = LanguageOption::normalize(&json!({
            "languages": [{ "code": "en", "label": "English" }]
        }));
        assert_eq!(
            languages,
            vec![LanguageOption { value: "en".into(), label: "English".into() }]
        );

        let items = LanguageOption::normalize(&json!({
            "items": [{ "value": "de", "name": "German" }]
        }));
        assert_eq!(
            items,
            vec![LanguageOption { value: "de".into(), label: "German".into() }]
        );
    }

    #[test]
    fn test_normalize_key_precedence() {
        let options = LanguageOption::normalize(&json!([
            { "code": "fr", "value": "ignored", "label": "French" },
            { "name": "Spanish" },
            { "label": "Only label" }
        ]));
        assert_eq!(options[0], LanguageOption { value: "fr".into(), label: "French".into() });
        assert_eq!(options[1], LanguageOption { value: "Spanish".into(), label: "Spanish".into() });
        assert_eq!(options[2], LanguageOption { value: "Only label".into(), label: "Only label".into() });
    }

    #[test]
    fn test_normalize_drops_unusable_entries() {
        let options = LanguageOption::normalize(&json!([
            { "count": 3 },
            42,
            { "code": "" }
        ]));
        assert!(options.is_empty());
        assert!(LanguageOption::normalize(&json!({ "unexpected": true })).is_empty());
        assert!(LanguageOption::normalize(&json!(null)).is_empty());
    }
}
