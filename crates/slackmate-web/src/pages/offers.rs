//! Offer Listing & Checkout Page
//!
//! Renders the offer catalog and drives the checkout flow: selecting an
//! offer requests a setup intent, the modal mounts the hosted payment form
//! against its secret, and submission confirms the intent and creates the
//! subscription. The [`CheckoutFlow`] phase machine lives in a signal; every
//! async completion is applied with the attempt id it belongs to, so a
//! superseded selection can never overwrite newer state.
//!
//! Without a publishable key no attempt can start: selection is disabled and
//! the page shows a configuration warning, so no setup intent is ever
//! created that could not be confirmed.

use leptos::prelude::*;
use slackmate_core::{
    BackendGateway, CatalogState, CheckoutFlow, CheckoutPhase, OfferKind, drive_selection,
    drive_submission,
};

use crate::auth;
use crate::components::{CheckoutModal, SubscriptionOutcome};
use crate::config;
use crate::stripe::ElementsProvider;

const PAYMENT_ELEMENT_SELECTOR: &str = "#payment-element";

/// An offer can be selected only when payments are configured and no call
/// is already in flight.
fn can_select(configured: bool, phase: &CheckoutPhase) -> bool {
    configured && !phase.busy()
}

#[component]
pub fn OffersPage() -> impl IntoView {
    let configured = config::stripe_publishable_key().is_some();
    let (catalog, set_catalog) = signal(CatalogState::Loading);
    let flow = RwSignal::new(CheckoutFlow::new());
    let provider = StoredValue::new_local(None::<ElementsProvider>);
    let (mount_error, set_mount_error) = signal(None::<String>);

    // Initial catalog fetch.
    leptos::task::spawn_local(async move {
        match auth::gateway().fetch_offers().await {
            Ok(offers) => set_catalog.set(CatalogState::Ready(offers)),
            Err(err) => set_catalog.set(CatalogState::Failed(err.user_message())),
        }
    });

    // Mount the hosted form once the overlay for the current intent is up;
    // drop the handle when the attempt ends so a new attempt mounts fresh.
    Effect::new(move |_| {
        let intent = flow.with(|flow| match flow.phase() {
            CheckoutPhase::AwaitingPayment { intent, .. }
            | CheckoutPhase::Confirming { intent, .. }
            | CheckoutPhase::SubmittingSubscription { intent, .. } => Some(intent.clone()),
            _ => None,
        });
        let Some(intent) = intent else {
            provider.set_value(None);
            return;
        };
        if provider.with_value(Option::is_some) {
            return;
        }
        match ElementsProvider::mount(
            config::stripe_publishable_key(),
            &intent,
            PAYMENT_ELEMENT_SELECTOR,
        ) {
            Ok(mounted) => provider.set_value(Some(mounted)),
            Err(err) => set_mount_error.set(Some(err.user_message())),
        }
    });

    let select = move |kind: OfferKind| {
        if !flow.with_untracked(|flow| can_select(configured, flow.phase())) {
            return;
        }
        set_mount_error.set(None);
        let attempt = flow.write().begin(kind);
        leptos::task::spawn_local(async move {
            drive_selection(&auth::gateway(), kind, |event| {
                flow.write().apply(attempt, event);
            })
            .await;
        });
    };

    let submit = move |_| {
        let Some(form) = provider.get_value() else {
            return;
        };
        let selected = flow.with_untracked(|flow| match flow.phase() {
            CheckoutPhase::AwaitingPayment { offer, intent, .. } => {
                Some((flow.current_attempt(), *offer, intent.clone()))
            }
            _ => None,
        });
        let Some((attempt, offer, intent)) = selected else {
            return;
        };
        leptos::task::spawn_local(async move {
            drive_submission(&auth::gateway(), &form, offer, &intent, |event| {
                flow.write().apply(attempt, event);
            })
            .await;
        });
    };

    let modal_open = Signal::derive(move || flow.with(|flow| flow.phase().modal_open()));
    let on_close = Callback::new(move |()| {
        provider.set_value(None);
        set_mount_error.set(None);
        flow.write().abandon();
    });

    view! {
        <div class="offers">
            <header>
                <h1>"Choose an offer"</h1>
                <a href="/admin">"Back to admin"</a>
            </header>

            {(!configured).then(|| view! {
                <p class="error">
                    "Missing Stripe publishable key. Checkout is disabled."
                </p>
            })}

            {move || {
                flow.with(|flow| flow.phase().inline_error().map(str::to_string))
                    .map(|message| view! { <p class="error">{message}</p> })
            }}

            {move || match catalog.get() {
                CatalogState::Loading => {
                    view! { <p class="muted">"Loading offers..."</p> }.into_any()
                }
                CatalogState::Failed(message) => {
                    view! { <p class="error">{message}</p> }.into_any()
                }
                CatalogState::Ready(offers) if offers.is_empty() => {
                    view! { <p class="muted">"No offers to display."</p> }.into_any()
                }
                CatalogState::Ready(offers) => view! {
                    <section class="offer-grid">
                        {offers.into_iter().map(|offer| {
                            let kind = offer.kind;
                            let selecting = move || flow.with(|flow| matches!(
                                flow.phase(),
                                CheckoutPhase::CreatingIntent { offer: selected } if *selected == kind
                            ));
                            view! {
                                <article class="offer-card">
                                    <p class="offer-kind">{kind.as_str()}</p>
                                    <h2>{offer.title.clone()}</h2>
                                    <p class="audience">{offer.audience.clone()}</p>
                                    <p class="price">
                                        {offer.price_label()}
                                        <span>"/month"</span>
                                    </p>
                                    <ul>
                                        {offer.included.iter().map(|item| view! {
                                            <li>{item.clone()}</li>
                                        }).collect_view()}
                                    </ul>
                                    <button
                                        on:click=move |_| select(kind)
                                        disabled=move || flow.with(|flow| {
                                            !can_select(configured, flow.phase())
                                        })
                                    >
                                        {move || if selecting() { "Loading..." } else { "Select" }}
                                    </button>
                                </article>
                            }
                        }).collect_view()}
                    </section>
                }
                .into_any(),
            }}

            <CheckoutModal open=modal_open on_close=on_close title="Confirm subscription">
                {move || match flow.with(|flow| flow.phase().clone()) {
                    CheckoutPhase::Settled { result, .. } => {
                        view! { <SubscriptionOutcome result=result /> }.into_any()
                    }
                    phase => view! {
                        <div class="checkout-form">
                            <div id="payment-element"></div>
                            {mount_error.get().map(|message| view! {
                                <p class="error">{message}</p>
                            })}
                            {phase.form_notice().map(|message| view! {
                                <p class="error">{message.to_string()}</p>
                            })}
                            <button
                                class="btn btn-primary"
                                on:click=submit
                                disabled=move || flow.with(|flow| flow.phase().busy())
                            >
                                {move || if flow.with(|flow| flow.phase().busy()) {
                                    "Processing..."
                                } else {
                                    "Confirm"
                                }}
                            </button>
                        </div>
                    }
                    .into_any(),
                }}
            </CheckoutModal>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_requires_publishable_key() {
        let idle = CheckoutFlow::new();
        assert!(!can_select(false, idle.phase()));
        assert!(can_select(true, idle.phase()));
    }

    #[test]
    fn test_selection_blocked_while_busy() {
        let mut flow = CheckoutFlow::new();
        flow.begin(OfferKind::Individual);
        assert!(!can_select(true, flow.phase()));
    }
}
