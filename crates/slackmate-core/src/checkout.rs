//! Subscription Checkout Flow
//!
//! The checkout protocol: request a setup intent scoped to the chosen offer,
//! collect a payment method through the provider's hosted form, confirm the
//! intent without leaving the page, then ask the backend to create the
//! subscription. Modeled as an explicit phase machine so impossible
//! loading/open flag combinations cannot be represented.
//!
//! Overlapping attempts are resolved with attempt ids: starting a new attempt
//! supersedes the previous one, and events carrying a superseded id are
//! dropped instead of overwriting newer state (last-selection-wins). No
//! cancellation token is needed; a stale completion simply has nowhere to
//! land.

use crate::error::CheckoutError;
use crate::gateway::BackendGateway;
use crate::offer::OfferKind;
use crate::payment::{PaymentProvider, SetupIntentHandle, SubscriptionResult};

/// Identifies one checkout attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttemptId(u64);

/// Where a checkout attempt currently stands
#[derive(Clone, Debug, PartialEq, Default)]
pub enum CheckoutPhase {
    /// No attempt in progress
    #[default]
    Idle,
    /// Waiting for the backend to issue a setup intent
    CreatingIntent { offer: OfferKind },
    /// Hosted form is mounted against the intent secret; waiting for submit
    AwaitingPayment {
        offer: OfferKind,
        intent: SetupIntentHandle,
        /// Message from a rejected previous submission, shown inside the modal
        notice: Option<String>,
    },
    /// Provider is validating and confirming the submitted details
    Confirming {
        offer: OfferKind,
        intent: SetupIntentHandle,
    },
    /// Backend is creating the subscription for the confirmed payment method
    SubmittingSubscription {
        offer: OfferKind,
        intent: SetupIntentHandle,
    },
    /// Subscription created; the active flag picks terminal vs pending view
    Settled {
        offer: OfferKind,
        result: SubscriptionResult,
    },
    /// Setup intent creation failed; shown inline, retry by re-selecting
    Failed { offer: OfferKind, message: String },
}

impl CheckoutPhase {
    /// The overlay is visible from the moment an intent exists until the
    /// attempt is abandoned. Settled results render inside the overlay too.
    pub fn modal_open(&self) -> bool {
        matches!(
            self,
            CheckoutPhase::AwaitingPayment { .. }
                | CheckoutPhase::Confirming { .. }
                | CheckoutPhase::SubmittingSubscription { .. }
                | CheckoutPhase::Settled { .. }
        )
    }

    /// A network or provider call is in flight
    pub fn busy(&self) -> bool {
        matches!(
            self,
            CheckoutPhase::CreatingIntent { .. }
                | CheckoutPhase::Confirming { .. }
                | CheckoutPhase::SubmittingSubscription { .. }
        )
    }

    /// The offer this attempt is for, if any
    pub fn offer(&self) -> Option<OfferKind> {
        match self {
            CheckoutPhase::Idle => None,
            CheckoutPhase::CreatingIntent { offer }
            | CheckoutPhase::AwaitingPayment { offer, .. }
            | CheckoutPhase::Confirming { offer, .. }
            | CheckoutPhase::SubmittingSubscription { offer, .. }
            | CheckoutPhase::Settled { offer, .. }
            | CheckoutPhase::Failed { offer, .. } => Some(*offer),
        }
    }

    /// Message for a rejected submission, shown inside the modal
    pub fn form_notice(&self) -> Option<&str> {
        match self {
            CheckoutPhase::AwaitingPayment { notice, .. } => notice.as_deref(),
            _ => None,
        }
    }

    /// Message for a failed intent creation, shown inline on the page
    pub fn inline_error(&self) -> Option<&str> {
        match self {
            CheckoutPhase::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Phase machine for the checkout protocol
///
/// Every event carries the [`AttemptId`] it belongs to; events from a
/// superseded attempt are ignored. Only [`CheckoutFlow::begin`] and
/// [`CheckoutFlow::abandon`] change the current attempt.
#[derive(Debug, Default)]
pub struct CheckoutFlow {
    phase: CheckoutPhase,
    attempt: u64,
}

/// One transition of the checkout protocol, tagged with the attempt it was
/// produced for when applied.
#[derive(Clone, Debug)]
pub enum CheckoutEvent {
    IntentReady(SetupIntentHandle),
    IntentFailed(String),
    PaymentSubmitted,
    Confirmed,
    PaymentRejected(String),
    Settled(SubscriptionResult),
}

impl CheckoutFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &CheckoutPhase {
        &self.phase
    }

    pub fn current_attempt(&self) -> AttemptId {
        AttemptId(self.attempt)
    }

    pub fn is_current(&self, attempt: AttemptId) -> bool {
        attempt.0 == self.attempt
    }

    /// Start a fresh attempt for the selected offer, superseding any attempt
    /// already in flight.
    pub fn begin(&mut self, offer: OfferKind) -> AttemptId {
        self.attempt += 1;
        self.phase = CheckoutPhase::CreatingIntent { offer };
        AttemptId(self.attempt)
    }

    /// The backend issued a setup intent; open the overlay.
    pub fn intent_ready(&mut self, attempt: AttemptId, intent: SetupIntentHandle) {
        if !self.is_current(attempt) {
            return;
        }
        if let CheckoutPhase::CreatingIntent { offer } = &self.phase {
            self.phase = CheckoutPhase::AwaitingPayment {
                offer: *offer,
                intent,
                notice: None,
            };
        }
    }

    /// Setup intent creation failed; the overlay never opens.
    pub fn intent_failed(&mut self, attempt: AttemptId, message: String) {
        if !self.is_current(attempt) {
            return;
        }
        if let CheckoutPhase::CreatingIntent { offer } = &self.phase {
            self.phase = CheckoutPhase::Failed {
                offer: *offer,
                message,
            };
        }
    }

    /// The user submitted the hosted form.
    pub fn payment_submitted(&mut self, attempt: AttemptId) {
        if !self.is_current(attempt) {
            return;
        }
        if let CheckoutPhase::AwaitingPayment { offer, intent, .. } = &self.phase {
            self.phase = CheckoutPhase::Confirming {
                offer: *offer,
                intent: intent.clone(),
            };
        }
    }

    /// The provider confirmed the intent and produced a payment method.
    pub fn confirmed(&mut self, attempt: AttemptId) {
        if !self.is_current(attempt) {
            return;
        }
        if let CheckoutPhase::Confirming { offer, intent } = &self.phase {
            self.phase = CheckoutPhase::SubmittingSubscription {
                offer: *offer,
                intent: intent.clone(),
            };
        }
    }

    /// Validation, confirmation or subscription creation failed; control
    /// returns to the form with the message, the modal stays open.
    pub fn payment_rejected(&mut self, attempt: AttemptId, message: String) {
        if !self.is_current(attempt) {
            return;
        }
        match &self.phase {
            CheckoutPhase::Confirming { offer, intent }
            | CheckoutPhase::SubmittingSubscription { offer, intent } => {
                self.phase = CheckoutPhase::AwaitingPayment {
                    offer: *offer,
                    intent: intent.clone(),
                    notice: Some(message),
                };
            }
            _ => {}
        }
    }

    /// The backend created the subscription.
    pub fn settled(&mut self, attempt: AttemptId, result: SubscriptionResult) {
        if !self.is_current(attempt) {
            return;
        }
        if let CheckoutPhase::SubmittingSubscription { offer, .. } = &self.phase {
            self.phase = CheckoutPhase::Settled {
                offer: *offer,
                result,
            };
        }
    }

    /// Close the overlay and abandon the attempt. Safe in any phase; the
    /// intent expires provider-side, so no cleanup call is made. Bumps the
    /// attempt so completions still in flight are dropped.
    pub fn abandon(&mut self) {
        self.attempt += 1;
        self.phase = CheckoutPhase::Idle;
    }

    /// Apply one event against the attempt it was produced for. Superseded
    /// attempts are dropped by the per-event guards.
    pub fn apply(&mut self, attempt: AttemptId, event: CheckoutEvent) {
        match event {
            CheckoutEvent::IntentReady(intent) => self.intent_ready(attempt, intent),
            CheckoutEvent::IntentFailed(message) => self.intent_failed(attempt, message),
            CheckoutEvent::PaymentSubmitted => self.payment_submitted(attempt),
            CheckoutEvent::Confirmed => self.confirmed(attempt),
            CheckoutEvent::PaymentRejected(message) => self.payment_rejected(attempt, message),
            CheckoutEvent::Settled(result) => self.settled(attempt, result),
        }
    }
}

/// Request a setup intent for `offer`, emitting the resulting transition.
///
/// Shared by [`Checkout::select_offer`] and signal-backed frontends, so both
/// run the identical selection sequence.
pub async fn drive_selection<G: BackendGateway>(
    gateway: &G,
    offer: OfferKind,
    mut emit: impl FnMut(CheckoutEvent),
) {
    match gateway.create_setup_intent(offer).await {
        Ok(intent) => emit(CheckoutEvent::IntentReady(intent)),
        Err(err) => {
            tracing::warn!(offer = offer.as_str(), %err, "setup intent creation failed");
            emit(CheckoutEvent::IntentFailed(err.user_message()));
        }
    }
}

/// Run the submit, confirm, subscribe sequence against `intent`, emitting
/// each transition in order and stopping at the first failure.
///
/// Shared by [`Checkout::submit_payment`] and signal-backed frontends.
pub async fn drive_submission<G, P>(
    gateway: &G,
    provider: &P,
    offer: OfferKind,
    intent: &SetupIntentHandle,
    mut emit: impl FnMut(CheckoutEvent),
) where
    G: BackendGateway,
    P: PaymentProvider,
{
    emit(CheckoutEvent::PaymentSubmitted);

    if let Err(err) = provider.submit().await {
        emit(CheckoutEvent::PaymentRejected(err.user_message()));
        return;
    }

    let payment_method = match provider.confirm_setup(intent).await {
        Ok(payment_method) => payment_method,
        Err(err) => {
            tracing::warn!(offer = offer.as_str(), %err, "setup confirmation failed");
            emit(CheckoutEvent::PaymentRejected(err.user_message()));
            return;
        }
    };
    emit(CheckoutEvent::Confirmed);

    match gateway.create_subscription(&payment_method, offer).await {
        Ok(result) => emit(CheckoutEvent::Settled(result)),
        Err(err) => {
            tracing::warn!(offer = offer.as_str(), %err, "subscription creation failed");
            emit(CheckoutEvent::PaymentRejected(
                CheckoutError::from(err).user_message(),
            ));
        }
    }
}

/// Drives the phase machine against real collaborators.
///
/// Each method runs its transitions strictly sequentially; the frontend can
/// instead drive [`CheckoutFlow`] directly when the state lives in a
/// reactive signal.
pub struct Checkout<G> {
    gateway: G,
    flow: CheckoutFlow,
}

impl<G: BackendGateway> Checkout<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            flow: CheckoutFlow::new(),
        }
    }

    pub fn phase(&self) -> &CheckoutPhase {
        self.flow.phase()
    }

    /// Select an offer: request a setup intent and open the overlay on
    /// success. Exactly one setup-intent request is sent per selection.
    pub async fn select_offer(&mut self, offer: OfferKind) {
        let attempt = self.flow.begin(offer);
        let Self { gateway, flow } = self;
        drive_selection(gateway, offer, |event| flow.apply(attempt, event)).await;
    }

    /// Submit the payment form: validate, confirm the intent, create the
    /// subscription. No-op outside `AwaitingPayment`.
    pub async fn submit_payment<P: PaymentProvider>(&mut self, provider: &P) {
        let (offer, intent) = match self.flow.phase() {
            CheckoutPhase::AwaitingPayment { offer, intent, .. } => (*offer, intent.clone()),
            _ => return,
        };
        let attempt = self.flow.current_attempt();
        let Self { gateway, flow } = self;
        drive_submission(gateway, provider, offer, &intent, |event| {
            flow.apply(attempt, event);
        })
        .await;
    }

    /// Close the overlay, abandoning any in-flight attempt.
    pub fn close(&mut self) {
        self.flow.abandon();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::error::{CheckoutError, GatewayError, Result};
    use crate::offer::Offer;
    use crate::payment::PaymentMethodRef;

    #[derive(Default)]
    struct GatewayLog {
        setup_intents: Vec<OfferKind>,
        subscriptions: Vec<(String, OfferKind)>,
    }

    #[derive(Clone)]
    struct MockGateway {
        log: Rc<RefCell<GatewayLog>>,
        fail_setup_intent: bool,
        reject_subscription: bool,
        result: SubscriptionResult,
    }

    impl MockGateway {
        fn new() -> Self {
            Self {
                log: Rc::new(RefCell::new(GatewayLog::default())),
                fail_setup_intent: false,
                reject_subscription: false,
                result: subscription_result(true, 500),
            }
        }
    }

    fn subscription_result(active: bool, email_limit: u32) -> SubscriptionResult {
        serde_json::from_value(json!({
            "stripeCustomerId": "cus_123",
            "stripeSubscriptionId": "sub_456",
            "subscriptionActive": active,
            "emailLimit": email_limit,
        }))
        .unwrap()
    }

    #[async_trait(?Send)]
    impl BackendGateway for MockGateway {
        async fn fetch_offers(&self) -> std::result::Result<Vec<Offer>, GatewayError> {
            Ok(Vec::new())
        }

        async fn create_setup_intent(
            &self,
            offer: OfferKind,
        ) -> std::result::Result<SetupIntentHandle, GatewayError> {
            self.log.borrow_mut().setup_intents.push(offer);
            if self.fail_setup_intent {
                Err(GatewayError::Status {
                    status: 500,
                    message: None,
                })
            } else {
                Ok(SetupIntentHandle::new(format!(
                    "seti_secret_{}",
                    offer.as_str()
                )))
            }
        }

        async fn create_subscription(
            &self,
            payment_method: &PaymentMethodRef,
            offer: OfferKind,
        ) -> std::result::Result<SubscriptionResult, GatewayError> {
            self.log
                .borrow_mut()
                .subscriptions
                .push((payment_method.as_str().to_string(), offer));
            if self.reject_subscription {
                Err(GatewayError::Status {
                    status: 402,
                    message: Some("Card declined".into()),
                })
            } else {
                Ok(self.result.clone())
            }
        }
    }

    #[derive(Default)]
    struct MockProvider {
        submit_error: Option<String>,
        confirm_error: Option<String>,
        missing_payment_method: bool,
        confirmed_secrets: RefCell<Vec<String>>,
    }

    #[async_trait(?Send)]
    impl PaymentProvider for MockProvider {
        async fn submit(&self) -> Result<()> {
            match &self.submit_error {
                Some(message) => Err(CheckoutError::Validation(message.clone())),
                None => Ok(()),
            }
        }

        async fn confirm_setup(&self, intent: &SetupIntentHandle) -> Result<PaymentMethodRef> {
            self.confirmed_secrets
                .borrow_mut()
                .push(intent.secret().to_string());
            if let Some(message) = &self.confirm_error {
                return Err(CheckoutError::Confirmation(message.clone()));
            }
            if self.missing_payment_method {
                return Err(CheckoutError::MissingPaymentMethod);
            }
            Ok(PaymentMethodRef::new("pm_123"))
        }
    }

    #[tokio::test]
    async fn test_happy_path_sends_one_request_per_step_for_each_kind() {
        for kind in OfferKind::ALL {
            let gateway = MockGateway::new();
            let log = Rc::clone(&gateway.log);
            let mut checkout = Checkout::new(gateway);

            checkout.select_offer(kind).await;
            assert!(checkout.phase().modal_open());
            assert!(matches!(
                checkout.phase(),
                CheckoutPhase::AwaitingPayment { offer, .. } if *offer == kind
            ));

            checkout.submit_payment(&MockProvider::default()).await;
            match checkout.phase() {
                CheckoutPhase::Settled { offer, result } => {
                    assert_eq!(*offer, kind);
                    assert!(result.is_active());
                    assert_eq!(result.email_limit, 500);
                }
                other => panic!("expected Settled, got {:?}", other),
            }

            let log = log.borrow();
            assert_eq!(log.setup_intents, vec![kind]);
            assert_eq!(log.subscriptions, vec![("pm_123".to_string(), kind)]);
        }
    }

    #[tokio::test]
    async fn test_setup_intent_failure_keeps_modal_closed() {
        let gateway = MockGateway {
            fail_setup_intent: true,
            ..MockGateway::new()
        };
        let log = Rc::clone(&gateway.log);
        let mut checkout = Checkout::new(gateway);

        checkout.select_offer(OfferKind::Business).await;
        assert!(!checkout.phase().modal_open());
        assert_eq!(
            checkout.phase().inline_error(),
            Some("request failed with status 500")
        );
        assert!(log.borrow().subscriptions.is_empty());
    }

    #[tokio::test]
    async fn test_validation_error_keeps_form_open_without_confirming() {
        let gateway = MockGateway::new();
        let log = Rc::clone(&gateway.log);
        let mut checkout = Checkout::new(gateway);
        let provider = MockProvider {
            submit_error: Some("Card number is incomplete.".into()),
            ..MockProvider::default()
        };

        checkout.select_offer(OfferKind::Individual).await;
        checkout.submit_payment(&provider).await;

        assert!(checkout.phase().modal_open());
        assert_eq!(
            checkout.phase().form_notice(),
            Some("Card number is incomplete.")
        );
        assert!(provider.confirmed_secrets.borrow().is_empty());
        assert!(log.borrow().subscriptions.is_empty());
    }

    #[tokio::test]
    async fn test_confirmation_error_returns_to_form() {
        let gateway = MockGateway::new();
        let log = Rc::clone(&gateway.log);
        let mut checkout = Checkout::new(gateway);
        let provider = MockProvider {
            confirm_error: Some("Your card was declined.".into()),
            ..MockProvider::default()
        };

        checkout.select_offer(OfferKind::Individual).await;
        checkout.submit_payment(&provider).await;

        assert!(checkout.phase().modal_open());
        assert_eq!(checkout.phase().form_notice(), Some("Your card was declined."));
        assert!(log.borrow().subscriptions.is_empty());
    }

    #[tokio::test]
    async fn test_missing_payment_method_sends_no_subscription_request() {
        let gateway = MockGateway::new();
        let log = Rc::clone(&gateway.log);
        let mut checkout = Checkout::new(gateway);
        let provider = MockProvider {
            missing_payment_method: true,
            ..MockProvider::default()
        };

        checkout.select_offer(OfferKind::Business).await;
        checkout.submit_payment(&provider).await;

        let notice = checkout.phase().form_notice().unwrap();
        assert!(notice.contains("payment method"), "notice: {}", notice);
        assert!(log.borrow().subscriptions.is_empty());
    }

    #[tokio::test]
    async fn test_backend_rejection_returns_to_form_for_resubmission() {
        let gateway = MockGateway {
            reject_subscription: true,
            ..MockGateway::new()
        };
        let log = Rc::clone(&gateway.log);
        let mut checkout = Checkout::new(gateway);

        checkout.select_offer(OfferKind::Individual).await;
        checkout.submit_payment(&MockProvider::default()).await;

        assert!(checkout.phase().modal_open());
        assert_eq!(checkout.phase().form_notice(), Some("Card declined"));
        assert_eq!(log.borrow().subscriptions.len(), 1);
    }

    #[tokio::test]
    async fn test_pending_activation_result_is_not_an_error() {
        let gateway = MockGateway {
            result: subscription_result(false, 50),
            ..MockGateway::new()
        };
        let mut checkout = Checkout::new(gateway);

        checkout.select_offer(OfferKind::Individual).await;
        checkout.submit_payment(&MockProvider::default()).await;

        match checkout.phase() {
            CheckoutPhase::Settled { result, .. } => {
                assert!(!result.is_active());
                assert_eq!(result.email_limit, 50);
            }
            other => panic!("expected Settled, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_close_mid_flow_then_reselect_starts_fresh_attempt() {
        let gateway = MockGateway::new();
        let log = Rc::clone(&gateway.log);
        let mut checkout = Checkout::new(gateway);

        checkout.select_offer(OfferKind::Individual).await;
        checkout.close();
        assert_eq!(*checkout.phase(), CheckoutPhase::Idle);

        checkout.select_offer(OfferKind::Individual).await;
        assert!(checkout.phase().modal_open());
        assert_eq!(
            log.borrow().setup_intents,
            vec![OfferKind::Individual, OfferKind::Individual]
        );
    }

    #[tokio::test]
    async fn test_event_driven_flow_reaches_settled_like_the_driver() {
        let gateway = MockGateway::new();
        let log = Rc::clone(&gateway.log);
        let flow = Rc::new(RefCell::new(CheckoutFlow::new()));

        let attempt = flow.borrow_mut().begin(OfferKind::Business);
        drive_selection(&gateway, OfferKind::Business, |event| {
            flow.borrow_mut().apply(attempt, event);
        })
        .await;

        let intent = match flow.borrow().phase() {
            CheckoutPhase::AwaitingPayment { intent, .. } => intent.clone(),
            other => panic!("expected AwaitingPayment, got {:?}", other),
        };
        drive_submission(
            &gateway,
            &MockProvider::default(),
            OfferKind::Business,
            &intent,
            |event| flow.borrow_mut().apply(attempt, event),
        )
        .await;

        match flow.borrow().phase() {
            CheckoutPhase::Settled { offer, result } => {
                assert_eq!(*offer, OfferKind::Business);
                assert!(result.is_active());
            }
            other => panic!("expected Settled, got {:?}", other),
        }
        let log = log.borrow();
        assert_eq!(log.setup_intents, vec![OfferKind::Business]);
        assert_eq!(
            log.subscriptions,
            vec![("pm_123".to_string(), OfferKind::Business)]
        );
    }

    #[test]
    fn test_stale_intent_is_ignored_after_reselection() {
        let mut flow = CheckoutFlow::new();
        let first = flow.begin(OfferKind::Individual);
        let second = flow.begin(OfferKind::Business);

        flow.intent_ready(first, SetupIntentHandle::new("stale_secret"));
        assert_eq!(
            *flow.phase(),
            CheckoutPhase::CreatingIntent { offer: OfferKind::Business }
        );

        flow.intent_ready(second, SetupIntentHandle::new("fresh_secret"));
        match flow.phase() {
            CheckoutPhase::AwaitingPayment { offer, intent, .. } => {
                assert_eq!(*offer, OfferKind::Business);
                assert_eq!(intent.secret(), "fresh_secret");
            }
            other => panic!("expected AwaitingPayment, got {:?}", other),
        }
    }

    #[test]
    fn test_abandon_drops_late_completions() {
        let mut flow = CheckoutFlow::new();
        let attempt = flow.begin(OfferKind::Individual);
        flow.abandon();

        flow.intent_ready(attempt, SetupIntentHandle::new("late_secret"));
        assert_eq!(*flow.phase(), CheckoutPhase::Idle);

        flow.intent_failed(attempt, "too late".into());
        assert_eq!(*flow.phase(), CheckoutPhase::Idle);
    }

    #[test]
    fn test_events_out_of_phase_are_no_ops() {
        let mut flow = CheckoutFlow::new();
        let attempt = flow.begin(OfferKind::Business);

        // Settling without an intent or confirmation is impossible.
        flow.settled(attempt, subscription_result(true, 500));
        assert_eq!(
            *flow.phase(),
            CheckoutPhase::CreatingIntent { offer: OfferKind::Business }
        );

        flow.payment_rejected(attempt, "nothing submitted".into());
        assert_eq!(
            *flow.phase(),
            CheckoutPhase::CreatingIntent { offer: OfferKind::Business }
        );
    }
}
