//! Landing Page

use leptos::prelude::*;

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <div class="home">
            <h1>"Slackmate"</h1>
            <p class="subtitle">"Translate, summarize and draft replies right inside Slack."</p>

            <div class="features">
                <div class="feature">
                    <h2>"Translation"</h2>
                    <p>"Instant message translation into your team's default language."</p>
                </div>
                <div class="feature">
                    <h2>"Summaries"</h2>
                    <p>"Catch up on long threads with one-paragraph summaries."</p>
                </div>
                <div class="feature">
                    <h2>"Reply suggestions"</h2>
                    <p>"Drafted answers in the tone of the conversation."</p>
                </div>
            </div>

            <div class="actions">
                <a class="btn btn-primary" href="/offers">"See offers"</a>
                <a class="btn" href="/auth">"Sign in"</a>
            </div>
        </div>
    }
}
