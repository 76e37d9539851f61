//! Account Admin Page
//!
//! Authenticated profile view: subscription and quota details from
//! `GET /users/me`, default-language selection, and password change. A 401
//! or 403 from the backend flips the page into a sign-in prompt instead of
//! rendering an error row.

use leptos::prelude::*;
use slackmate_core::{format_datetime, AccountProfile, GatewayError, LanguageOption, ProfileUpdate};

use crate::auth;

/// Load state for the profile payload
#[derive(Clone, Debug, PartialEq)]
enum ProfileState {
    Loading,
    RequiresAuth,
    Failed(String),
    Ready(AccountProfile),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Notice {
    Saved,
    Error,
}

fn load_error(err: &GatewayError) -> ProfileState {
    if err.requires_auth() {
        ProfileState::RequiresAuth
    } else {
        ProfileState::Failed(err.user_message())
    }
}

/// A failed language fetch keeps the page usable: the select stays empty and
/// the failure is shown as a notice instead of replacing the page.
fn language_result(
    result: Result<Vec<LanguageOption>, GatewayError>,
) -> Result<Vec<LanguageOption>, (Notice, String)> {
    result.map_err(|_| (Notice::Error, "Unable to load language options.".to_string()))
}

#[component]
pub fn AdminPage() -> impl IntoView {
    let profile = RwSignal::new(ProfileState::Loading);
    let (languages, set_languages) = signal(Vec::<LanguageOption>::new());
    let (selected_language, set_selected_language) = signal(String::new());
    let (new_password, set_new_password) = signal(String::new());
    let (confirm_password, set_confirm_password) = signal(String::new());
    let (saving, set_saving) = signal(false);
    let (notice, set_notice) = signal(None::<(Notice, String)>);

    let load = move || {
        profile.set(ProfileState::Loading);
        leptos::task::spawn_local(async move {
            let gateway = auth::gateway();
            match gateway.fetch_profile().await {
                Ok(account) => {
                    set_selected_language
                        .set(account.default_language.clone().unwrap_or_default());
                    profile.set(ProfileState::Ready(account));
                }
                Err(err) => {
                    profile.set(load_error(&err));
                    return;
                }
            }
            match language_result(gateway.fetch_languages().await) {
                Ok(options) => set_languages.set(options),
                Err(notice) => set_notice.set(Some(notice)),
            }
        });
    };
    load();

    let save_language = move |_| {
        let language = selected_language.get_untracked();
        if language.is_empty() || saving.get_untracked() {
            return;
        }
        set_saving.set(true);
        set_notice.set(None);
        leptos::task::spawn_local(async move {
            let update = ProfileUpdate::language(language);
            match auth::gateway().update_profile(&update).await {
                Ok(()) => set_notice.set(Some((Notice::Saved, "Language saved.".into()))),
                Err(err) if err.requires_auth() => profile.set(ProfileState::RequiresAuth),
                Err(err) => set_notice.set(Some((Notice::Error, err.user_message()))),
            }
            set_saving.set(false);
        });
    };

    let change_password = move |_| {
        if saving.get_untracked() {
            return;
        }
        let password = new_password.get_untracked();
        if password.len() < 8 {
            set_notice.set(Some((
                Notice::Error,
                "Password must be at least 8 characters long.".into(),
            )));
            return;
        }
        if password != confirm_password.get_untracked() {
            set_notice.set(Some((Notice::Error, "Passwords do not match.".into())));
            return;
        }
        set_saving.set(true);
        set_notice.set(None);
        leptos::task::spawn_local(async move {
            let update = ProfileUpdate::password(password);
            match auth::gateway().update_profile(&update).await {
                Ok(()) => {
                    // Password change invalidates the session; force a fresh
                    // sign-in rather than serving stale-token errors.
                    auth::clear_session();
                    set_new_password.set(String::new());
                    set_confirm_password.set(String::new());
                    profile.set(ProfileState::RequiresAuth);
                }
                Err(err) if err.requires_auth() => profile.set(ProfileState::RequiresAuth),
                Err(err) => set_notice.set(Some((Notice::Error, err.user_message()))),
            }
            set_saving.set(false);
        });
    };

    let sign_out = move |_| {
        auth::clear_session();
        profile.set(ProfileState::RequiresAuth);
    };

    view! {
        <div class="admin">
            {move || match profile.get() {
                ProfileState::Loading => {
                    view! { <p class="muted">"Loading account..."</p> }.into_any()
                }
                ProfileState::RequiresAuth => view! {
                    <div class="card">
                        <h1>"Sign in required"</h1>
                        <p>"Your session has expired or you are not signed in."</p>
                        <a class="btn btn-primary" href="/auth">"Go to sign in"</a>
                    </div>
                }
                .into_any(),
                ProfileState::Failed(message) => view! {
                    <div class="card">
                        <p class="error">{message}</p>
                        <button on:click=move |_| load()>"Retry"</button>
                    </div>
                }
                .into_any(),
                ProfileState::Ready(account) => {
                    let usage = match account.current_workspace_count {
                        Some(count) => format!("{} of {}", account.workspace_used, count),
                        None => account.workspace_used.to_string(),
                    };
                    view! {
                        <div class="account">
                            <header>
                                <h1>"Account"</h1>
                                <button on:click=sign_out>"Sign out"</button>
                            </header>

                            <section class="card">
                                <h2>"Profile"</h2>
                                <dl>
                                    <dt>"Email"</dt>
                                    <dd>{account.email.clone()}</dd>
                                    <dt>"Member since"</dt>
                                    <dd>{format_datetime(account.created_at.as_ref())
                                        .unwrap_or_else(|| "—".into())}</dd>
                                </dl>
                            </section>

                            <section class="card">
                                <h2>"Subscription"</h2>
                                <dl>
                                    <dt>"Status"</dt>
                                    <dd>{account.subscription_label().unwrap_or("None")}</dd>
                                    <dt>"Started"</dt>
                                    <dd>{format_datetime(account.subscription_started_at.as_ref())
                                        .unwrap_or_else(|| "—".into())}</dd>
                                    <dt>"Next billing"</dt>
                                    <dd>{format_datetime(account.next_billing_at.as_ref())
                                        .unwrap_or_else(|| "—".into())}</dd>
                                    <dt>"Workspaces"</dt>
                                    <dd>{usage}</dd>
                                </dl>
                                {(!account.subscription_active()).then(|| view! {
                                    <a class="btn btn-primary" href="/offers">"Subscribe"</a>
                                })}
                                {account.can_add_workspace().then(|| view! {
                                    <a class="btn" href="/slack/connected">"Add to Slack"</a>
                                })}
                            </section>

                            <section class="card">
                                <h2>"Default language"</h2>
                                <select
                                    prop:value=move || selected_language.get()
                                    on:change=move |ev| {
                                        set_selected_language.set(event_target_value(&ev));
                                    }
                                >
                                    <option value="">"Select a language"</option>
                                    {move || languages.get().into_iter().map(|option| view! {
                                        <option value=option.value.clone()>
                                            {option.label.clone()}
                                        </option>
                                    }).collect_view()}
                                </select>
                                <button
                                    on:click=save_language
                                    disabled=move || saving.get()
                                        || selected_language.with(String::is_empty)
                                >
                                    "Save language"
                                </button>
                            </section>

                            <section class="card">
                                <h2>"Change password"</h2>
                                <input
                                    type="password"
                                    placeholder="New password"
                                    prop:value=move || new_password.get()
                                    on:input=move |ev| {
                                        set_new_password.set(event_target_value(&ev));
                                    }
                                />
                                <input
                                    type="password"
                                    placeholder="Confirm new password"
                                    prop:value=move || confirm_password.get()
                                    on:input=move |ev| {
                                        set_confirm_password.set(event_target_value(&ev));
                                    }
                                />
                                <button on:click=change_password disabled=move || saving.get()>
                                    {move || if saving.get() { "Please wait..." } else { "Update password" }}
                                </button>
                            </section>

                            {move || notice.get().map(|(kind, message)| {
                                let class = if kind == Notice::Saved { "success" } else { "error" };
                                view! { <p class=class>{message}</p> }
                            })}
                        </div>
                    }
                    .into_any()
                }
            }}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_maps_auth_statuses_to_sign_in() {
        let unauthorized = GatewayError::Status {
            status: 401,
            message: None,
        };
        assert_eq!(load_error(&unauthorized), ProfileState::RequiresAuth);

        let server_error = GatewayError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(
            load_error(&server_error),
            ProfileState::Failed("request failed with status 500".into())
        );
    }

    #[test]
    fn test_language_failure_becomes_a_notice() {
        let failed = language_result(Err(GatewayError::Network("timeout".into())));
        assert_eq!(
            failed,
            Err((Notice::Error, "Unable to load language options.".into()))
        );

        let options = vec![LanguageOption {
            value: "en".into(),
            label: "English".into(),
        }];
        assert_eq!(language_result(Ok(options.clone())), Ok(options));
    }
}
