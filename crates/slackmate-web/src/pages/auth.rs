//! Auth Page
//!
//! Login/register toggle with client-side validation before anything is
//! sent. A successful login persists the session for the gateway's
//! credential provider to pick up.

use leptos::prelude::*;
use slackmate_core::GatewayError;

use crate::auth;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Login,
    Register,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Notice {
    Success(String),
    Error(String),
}

/// Status-specific defaults for auth endpoints when the backend body
/// carries no message of its own.
fn auth_error(err: &GatewayError) -> String {
    match err {
        GatewayError::Status {
            message: Some(message),
            ..
        } => message.clone(),
        GatewayError::Status { status: 409, .. } => "User already exists.".into(),
        GatewayError::Status { status: 401, .. } => "Invalid credentials.".into(),
        GatewayError::Status { status: 403, .. } => "Email not verified.".into(),
        GatewayError::Status { .. } => "Unable to complete the request.".into(),
        other => other.user_message(),
    }
}

#[component]
pub fn AuthPage() -> impl IntoView {
    let (mode, set_mode) = signal(Mode::Login);
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (confirm, set_confirm) = signal(String::new());
    let (notice, set_notice) = signal(None::<Notice>);
    let (submitting, set_submitting) = signal(false);

    let validate = move || -> Option<String> {
        let email = email.get_untracked();
        if email.trim().is_empty() {
            return Some("Enter your email.".into());
        }
        if !email.contains('@') {
            return Some("Enter a valid email address.".into());
        }
        let password = password.get_untracked();
        if password.is_empty() {
            return Some("Enter your password.".into());
        }
        if mode.get_untracked() == Mode::Register {
            if password.len() < 8 {
                return Some("Password must be at least 8 characters.".into());
            }
            if confirm.get_untracked() != password {
                return Some("Passwords do not match.".into());
            }
        }
        None
    };

    let submit = move |_| {
        if submitting.get_untracked() {
            return;
        }
        if let Some(message) = validate() {
            set_notice.set(Some(Notice::Error(message)));
            return;
        }
        set_notice.set(None);
        set_submitting.set(true);

        let current_mode = mode.get_untracked();
        let email_value = email.get_untracked().trim().to_string();
        let password_value = password.get_untracked();
        leptos::task::spawn_local(async move {
            let gateway = auth::gateway();
            match current_mode {
                Mode::Login => match gateway.login(&email_value, &password_value).await {
                    Ok(session) => {
                        auth::store_session(&session);
                        set_notice.set(Some(Notice::Success("Signed in successfully.".into())));
                    }
                    Err(err) => set_notice.set(Some(Notice::Error(auth_error(&err)))),
                },
                Mode::Register => match gateway.register(&email_value, &password_value).await {
                    Ok(ack) => {
                        let message = ack
                            .message
                            .unwrap_or_else(|| "Activation email sent.".into());
                        set_notice.set(Some(Notice::Success(message)));
                    }
                    Err(err) => set_notice.set(Some(Notice::Error(auth_error(&err)))),
                },
            }
            set_submitting.set(false);
        });
    };

    let switch_mode = move |next: Mode| {
        set_mode.set(next);
        set_notice.set(None);
    };

    view! {
        <div class="auth">
            <h1>{move || match mode.get() {
                Mode::Login => "Sign in",
                Mode::Register => "Create an account",
            }}</h1>

            <div class="mode-toggle">
                <button
                    class:active=move || mode.get() == Mode::Login
                    on:click=move |_| switch_mode(Mode::Login)
                >
                    "Login"
                </button>
                <button
                    class:active=move || mode.get() == Mode::Register
                    on:click=move |_| switch_mode(Mode::Register)
                >
                    "Register"
                </button>
            </div>

            <div class="field">
                <label>"Email"</label>
                <input
                    type="email"
                    prop:value=move || email.get()
                    on:input=move |ev| set_email.set(event_target_value(&ev))
                />
            </div>
            <div class="field">
                <label>"Password"</label>
                <input
                    type="password"
                    prop:value=move || password.get()
                    on:input=move |ev| set_password.set(event_target_value(&ev))
                />
            </div>
            <Show when=move || mode.get() == Mode::Register>
                <div class="field">
                    <label>"Confirm password"</label>
                    <input
                        type="password"
                        prop:value=move || confirm.get()
                        on:input=move |ev| set_confirm.set(event_target_value(&ev))
                    />
                </div>
            </Show>

            {move || notice.get().map(|notice| match notice {
                Notice::Success(message) => view! { <p class="notice">{message}</p> }.into_any(),
                Notice::Error(message) => view! { <p class="error">{message}</p> }.into_any(),
            })}

            <button class="btn btn-primary" on:click=submit disabled=move || submitting.get()>
                {move || if submitting.get() { "Please wait..." } else { "Submit" }}
            </button>

            <a href="/">"Back to home"</a>
        </div>
    }
}
