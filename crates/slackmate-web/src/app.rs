//! Main App Component

use leptos::prelude::*;
use leptos_router::{components::*, path};

use crate::pages::{AdminPage, AuthPage, HomePage, OffersPage, SlackConnectedPage};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    view! {
        <Router>
            <main class="app">
                <Routes fallback=|| view! { <p>"Page not found"</p> }>
                    <Route path=path!("/") view=HomePage />
                    <Route path=path!("/auth") view=AuthPage />
                    <Route path=path!("/admin") view=AdminPage />
                    <Route path=path!("/offers") view=OffersPage />
                    <Route path=path!("/slack/connected") view=SlackConnectedPage />
                </Routes>
            </main>
        </Router>
    }
}
