//! UI Components

use leptos::prelude::*;
use slackmate_core::SubscriptionResult;

/// Scoped overlay container for the checkout flow.
///
/// Renders nothing while closed. The close control always fires `on_close`,
/// in-flight work or not; abandoning mid-flight is the flow's concern.
#[component]
pub fn CheckoutModal(
    open: Signal<bool>,
    on_close: Callback<()>,
    #[prop(default = "Finalize subscription")] title: &'static str,
    children: ChildrenFn,
) -> impl IntoView {
    view! {
        <Show when=move || open.get()>
            <div class="modal-backdrop" role="dialog" aria-modal="true">
                <div class="modal">
                    <div class="modal-header">
                        <h2>{title}</h2>
                        <button class="modal-close" on:click=move |_| on_close.run(())>
                            "Close"
                        </button>
                    </div>
                    <div class="modal-body">{children()}</div>
                </div>
            </div>
        </Show>
    }
}

/// Outcome of a subscription attempt: a terminal active confirmation, or a
/// pending-activation notice with a manual refresh affordance. Activation
/// completes out-of-band through the backend's webhook, so refresh simply
/// reloads the page.
#[component]
pub fn SubscriptionOutcome(result: SubscriptionResult) -> impl IntoView {
    let refresh = move |_| {
        if let Some(window) = web_sys::window() {
            let _ = window.location().reload();
        }
    };

    if result.is_active() {
        view! {
            <div class="result result-active">
                <p>"Your subscription is active."</p>
                <p>"Email limit: " {result.email_limit}</p>
            </div>
        }
        .into_any()
    } else {
        view! {
            <div class="result result-pending">
                <p>"Payment saved. Activation is pending and should complete shortly."</p>
                <p>"Email limit: " {result.email_limit}</p>
                <button on:click=refresh>"Refresh"</button>
            </div>
        }
        .into_any()
    }
}
