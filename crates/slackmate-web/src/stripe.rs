//! Stripe.js Bindings
//!
//! Minimal bindings to the Stripe.js surface the checkout flow consumes:
//! the `Stripe(publishableKey)` factory, an Elements group bound to a
//! client secret, the hosted Payment Element, `submit()` validation and
//! `confirmSetup` with `redirect: "if_required"`. The confirmation call is
//! owned by Stripe; this module only reads its result shape.

use js_sys::{Object, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use slackmate_core::{CheckoutError, PaymentMethodRef, PaymentProvider, Result, SetupIntentHandle};

#[wasm_bindgen]
extern "C" {
    /// Handle returned by the global `Stripe(...)` factory
    #[derive(Clone)]
    pub type StripeJs;

    #[wasm_bindgen(js_name = Stripe, catch)]
    fn stripe_factory(publishable_key: &str) -> std::result::Result<StripeJs, JsValue>;

    #[wasm_bindgen(method)]
    fn elements(this: &StripeJs, options: &JsValue) -> StripeElements;

    #[wasm_bindgen(method, js_name = confirmSetup)]
    fn confirm_setup(this: &StripeJs, params: &JsValue) -> Promise;

    /// Elements group bound to one client secret
    #[derive(Clone)]
    pub type StripeElements;

    #[wasm_bindgen(method)]
    fn create(this: &StripeElements, element_type: &str) -> StripeElement;

    #[wasm_bindgen(method)]
    fn submit(this: &StripeElements) -> Promise;

    /// A single hosted form element
    pub type StripeElement;

    #[wasm_bindgen(method)]
    fn mount(this: &StripeElement, selector: &str);
}

fn get(value: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(value, &JsValue::from_str(key))
        .ok()
        .filter(|found| !found.is_undefined() && !found.is_null())
}

/// Message of the result's `error` field, when one is present. An error
/// object without a message still counts as an error and gets the fallback.
fn rejection(result: &JsValue, fallback: &str) -> Option<String> {
    let error = get(result, "error")?;
    Some(
        get(&error, "message")
            .and_then(|message| message.as_string())
            .unwrap_or_else(|| fallback.to_string()),
    )
}

/// The hosted payment form for one checkout attempt
#[derive(Clone)]
pub struct ElementsProvider {
    stripe: StripeJs,
    elements: StripeElements,
}

impl ElementsProvider {
    /// Initialize Stripe.js and mount the Payment Element bound to the
    /// intent secret into the node matching `selector`. Fails soft with
    /// `Unconfigured` when the key is absent or the script is not loaded,
    /// so the caller can show a warning instead of crashing.
    pub fn mount(
        publishable_key: Option<&str>,
        intent: &SetupIntentHandle,
        selector: &str,
    ) -> Result<Self> {
        let key = publishable_key.ok_or_else(|| {
            CheckoutError::Unconfigured("missing Stripe publishable key".into())
        })?;
        let stripe = stripe_factory(key)
            .map_err(|_| CheckoutError::Unconfigured("Stripe.js is not loaded".into()))?;

        let options = Object::new();
        let _ = Reflect::set(
            &options,
            &JsValue::from_str("clientSecret"),
            &JsValue::from_str(intent.secret()),
        );
        let elements = stripe.elements(&options);
        elements.create("payment").mount(selector);

        Ok(Self { stripe, elements })
    }
}

#[async_trait::async_trait(?Send)]
impl PaymentProvider for ElementsProvider {
    async fn submit(&self) -> Result<()> {
        let result = JsFuture::from(self.elements.submit())
            .await
            .map_err(|_| CheckoutError::Validation("Could not submit the payment form.".into()))?;
        match rejection(&result, "Could not submit the payment form.") {
            Some(message) => Err(CheckoutError::Validation(message)),
            None => Ok(()),
        }
    }

    async fn confirm_setup(&self, intent: &SetupIntentHandle) -> Result<PaymentMethodRef> {
        let params = Object::new();
        let _ = Reflect::set(&params, &JsValue::from_str("elements"), &self.elements);
        let _ = Reflect::set(
            &params,
            &JsValue::from_str("clientSecret"),
            &JsValue::from_str(intent.secret()),
        );
        let _ = Reflect::set(
            &params,
            &JsValue::from_str("redirect"),
            &JsValue::from_str("if_required"),
        );

        let result = JsFuture::from(self.stripe.confirm_setup(&params))
            .await
            .map_err(|_| CheckoutError::Confirmation("Could not confirm the payment.".into()))?;
        if let Some(message) = rejection(&result, "Could not confirm the payment.") {
            return Err(CheckoutError::Confirmation(message));
        }

        // `payment_method` is an id string unless the caller asked for an
        // expanded object; anything else means the reference is missing.
        let payment_method = get(&result, "setupIntent")
            .and_then(|setup_intent| get(&setup_intent, "payment_method"))
            .and_then(|reference| reference.as_string());
        match payment_method {
            Some(id) => Ok(PaymentMethodRef::new(id)),
            None => Err(CheckoutError::MissingPaymentMethod),
        }
    }
}
