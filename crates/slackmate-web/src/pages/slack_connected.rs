//! Slack Connection Result Page
//!
//! Landing target for the Slack OAuth redirect. The backend reports the
//! outcome through query parameters: `status=error` plus an optional
//! `message`; anything else counts as success.

use leptos::prelude::*;
use leptos_router::hooks::use_query_map;

#[component]
pub fn SlackConnectedPage() -> impl IntoView {
    let query = use_query_map();
    let failed = Signal::derive(move || {
        query.with(|params| params.get("status").as_deref() == Some("error"))
    });
    let message = Signal::derive(move || {
        if failed.get() {
            query.with(|params| params.get("message")).unwrap_or_else(|| {
                "We could not connect your Slack workspace. Please try again.".to_string()
            })
        } else {
            "Your Slack workspace is connected. Summaries will start arriving shortly."
                .to_string()
        }
    });

    view! {
        <div class="slack-connected">
            <div class="card">
                <h1>
                    {move || if failed.get() { "Connection failed" } else { "Workspace connected" }}
                </h1>
                <p class=move || if failed.get() { "error" } else { "success" }>
                    {move || message.get()}
                </p>
                <nav>
                    <a class="btn btn-primary" href="/admin">"Go to admin"</a>
                    <a class="btn" href="/">"Back to home"</a>
                </nav>
            </div>
        </div>
    }
}
