//! WebAssembly bindings for core-auth
//!
//! Lets a page drive the bridge with the hosted JavaScript auth SDK as the
//! identity provider, and connect it to the application's message ports.
//!
//! ```javascript
//! import init, { JsAuthBridge, initLogging } from './core_auth';
//! import { initializeApp } from 'firebase/app';
//! import { getAuth, GoogleAuthProvider, signInWithPopup, signOut } from 'firebase/auth';
//!
//! await init();
//! initLogging('info');
//!
//! const auth = getAuth(initializeApp(firebaseConfig));
//! const provider = {
//!   signIn: () => signInWithPopup(auth, new GoogleAuthProvider()),
//!   signOut: () => signOut(auth),
//!   get currentUser() { return auth.currentUser; },
//! };
//!
//! const bridge = new JsAuthBridge(provider);
//! bridge.wirePorts(app.ports);
//! ```

use crate::bridge::AuthBridge;
use async_trait::async_trait;
use bridge_traits::identity::codes;
use bridge_traits::{IdentityProvider, LogLevel, Principal, ProviderError};
use core_runtime::events::{
    outcome_channel, EventBus, HostIntent, HostNotification, OutcomeReceiver,
};
use core_runtime::logging::{init_logging as init_runtime_logging, LoggingConfig};
use js_sys::{Function, Promise, Reflect};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};

// =============================================================================
// JS interop helpers
// =============================================================================

fn get(target: &JsValue, key: &str) -> JsValue {
    Reflect::get(target, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED)
}

fn get_string(target: &JsValue, key: &str) -> Option<String> {
    get(target, key).as_string().filter(|s| !s.is_empty())
}

fn method(target: &JsValue, name: &str) -> Result<Function, JsValue> {
    get(target, name)
        .dyn_into::<Function>()
        .map_err(|_| JsValue::from_str(&format!("`{}` is not a function", name)))
}

/// Reads `{code, message}` from a rejected promise value.
fn provider_error(value: JsValue) -> ProviderError {
    let message = get_string(&value, "message")
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value));
    let code = get_string(&value, "code").unwrap_or_else(|| codes::INTERNAL_ERROR.to_string());
    ProviderError::new(code, message)
}

/// Calls `target[name]()` and awaits the result if it is a promise.
async fn call_async(target: &JsValue, name: &str) -> Result<JsValue, ProviderError> {
    let function = method(target, name).map_err(provider_error)?;
    let returned = function.call0(target).map_err(provider_error)?;

    match returned.dyn_into::<Promise>() {
        Ok(promise) => JsFuture::from(promise).await.map_err(provider_error),
        Err(value) => Ok(value),
    }
}

// =============================================================================
// Identity provider adapter
// =============================================================================

/// `IdentityProvider` over a JavaScript object.
///
/// The object must expose `signIn(): Promise<{ user }>`,
/// `signOut(): Promise<void>` and a `currentUser` with `getIdToken()`.
pub struct JsIdentityProvider {
    inner: JsValue,
}

impl JsIdentityProvider {
    pub fn new(inner: JsValue) -> Result<Self, JsValue> {
        method(&inner, "signIn")?;
        method(&inner, "signOut")?;
        Ok(Self { inner })
    }
}

#[async_trait(?Send)]
impl IdentityProvider for JsIdentityProvider {
    async fn sign_in_interactive(&self) -> Result<Principal, ProviderError> {
        let result = call_async(&self.inner, "signIn").await?;
        let user = match get(&result, "user") {
            user if user.is_object() => user,
            _ => result,
        };

        let uid = get_string(&user, "uid").ok_or_else(|| {
            ProviderError::internal("Sign-in resolved without a user uid")
        })?;

        let mut principal = Principal::new(uid);
        principal.email = get_string(&user, "email");
        principal.display_name = get_string(&user, "displayName");
        Ok(principal)
    }

    async fn id_token(&self, principal: &Principal) -> Result<String, ProviderError> {
        let user = get(&self.inner, "currentUser");
        if !user.is_object() {
            return Err(ProviderError::new(
                codes::NO_CURRENT_USER,
                "No user is currently signed in.",
            ));
        }

        if get_string(&user, "uid").as_deref() != Some(principal.uid.as_str()) {
            return Err(ProviderError::new(
                codes::USER_TOKEN_EXPIRED,
                "The signed-in user changed before a token could be issued.",
            ));
        }

        call_async(&user, "getIdToken")
            .await?
            .as_string()
            .ok_or_else(|| ProviderError::internal("getIdToken resolved to a non-string value"))
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        call_async(&self.inner, "signOut").await.map(|_| ())
    }
}

// =============================================================================
// Bridge
// =============================================================================

type Listener = Box<dyn FnMut(&HostNotification, JsValue) -> Result<(), JsValue>>;

/// JavaScript-accessible auth bridge
///
/// Outcomes are queued on the outcome port until the first listener is
/// registered through `subscribe` or `wirePorts`, then handed to every
/// listener in attempt order.
#[wasm_bindgen]
pub struct JsAuthBridge {
    bridge: Arc<AuthBridge>,
    outcomes: RefCell<Option<OutcomeReceiver>>,
    listeners: Rc<RefCell<Vec<Listener>>>,
}

#[wasm_bindgen]
impl JsAuthBridge {
    /// Wrap the page's auth provider object.
    #[wasm_bindgen(constructor)]
    pub fn new(provider: JsValue) -> Result<JsAuthBridge, JsValue> {
        let provider = JsIdentityProvider::new(provider)?;
        let (outcome_port, outcomes) = outcome_channel();
        let bridge = AuthBridge::new(Arc::new(provider), EventBus::default())
            .with_outcome_port(outcome_port);
        Ok(Self {
            bridge: Arc::new(bridge),
            outcomes: RefCell::new(Some(outcomes)),
            listeners: Rc::new(RefCell::new(Vec::new())),
        })
    }

    /// Run one sign-in attempt.
    ///
    /// Resolves with the published notification,
    /// e.g. `{ type: "sign-in-succeeded", payload: { token, email, uid } }`.
    #[wasm_bindgen(js_name = signIn)]
    pub async fn sign_in(&self) -> Result<JsValue, JsValue> {
        let notification = self.bridge.handle_sign_in().await;
        serde_wasm_bindgen::to_value(&notification).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Sign out without waiting for the provider.
    #[wasm_bindgen(js_name = signOut)]
    pub fn sign_out(&self) {
        let bridge = Arc::clone(&self.bridge);
        spawn_local(async move {
            bridge.handle_sign_out().await;
        });
    }

    /// Invoke `on_succeeded({token, email, uid})` or
    /// `on_failed({code, message})` for every sign-in outcome.
    pub fn subscribe(&self, on_succeeded: Function, on_failed: Function) {
        self.add_listener(Box::new(move |notification, payload| {
            let callback = match notification {
                HostNotification::SignInSucceeded(_) => &on_succeeded,
                HostNotification::SignInFailed(_) => &on_failed,
            };
            callback.call1(&JsValue::NULL, &payload).map(|_| ())
        }));
    }

    /// Connect the application's ports.
    ///
    /// `ports.signIn` and `ports.signOut` must offer `subscribe(fn)`;
    /// `ports.signInInfo` and `ports.signInError` must offer `send(value)`.
    #[wasm_bindgen(js_name = wirePorts)]
    pub fn wire_ports(&self, ports: JsValue) -> Result<(), JsValue> {
        let sign_in_port = get(&ports, "signIn");
        let sign_out_port = get(&ports, "signOut");
        let info_port = get(&ports, "signInInfo");
        let error_port = get(&ports, "signInError");

        // Fail before subscribing anything
        for (name, port, op) in [
            ("signIn", &sign_in_port, "subscribe"),
            ("signOut", &sign_out_port, "subscribe"),
            ("signInInfo", &info_port, "send"),
            ("signInError", &error_port, "send"),
        ] {
            method(port, op)
                .map_err(|_| JsValue::from_str(&format!("ports.{} has no `{}`", name, op)))?;
        }

        for (port, intent) in [
            (&sign_in_port, HostIntent::RequestSignIn),
            (&sign_out_port, HostIntent::RequestSignOut),
        ] {
            let bridge = Arc::clone(&self.bridge);
            // Port subscriptions live as long as the page
            let handler = Closure::<dyn FnMut()>::new(move || {
                let bridge = Arc::clone(&bridge);
                spawn_local(async move {
                    bridge.dispatch(intent).await;
                });
            });
            method(port, "subscribe")?.call1(port, handler.as_ref().unchecked_ref())?;
            handler.forget();
        }

        self.add_listener(Box::new(move |notification, payload| {
            let port = match notification {
                HostNotification::SignInSucceeded(_) => &info_port,
                HostNotification::SignInFailed(_) => &error_port,
            };
            method(port, "send")?.call1(port, &payload).map(|_| ())
        }));

        Ok(())
    }
}

impl JsAuthBridge {
    /// Register a listener, starting delivery on the first one.
    fn add_listener(&self, listener: Listener) {
        self.listeners.borrow_mut().push(listener);
        if let Some(outcomes) = self.outcomes.borrow_mut().take() {
            spawn_local(deliver_outcomes(outcomes, Rc::clone(&self.listeners)));
        }
    }
}

async fn deliver_outcomes(mut outcomes: OutcomeReceiver, listeners: Rc<RefCell<Vec<Listener>>>) {
    while let Some(notification) = outcomes.recv().await {
        // Listeners may register more listeners while being called
        let mut current = std::mem::take(&mut *listeners.borrow_mut());
        for listener in current.iter_mut() {
            let delivered = outcome_payload(&notification)
                .and_then(|payload| listener(&notification, payload));
            if let Err(err) = delivered {
                tracing::error!(error = ?err, "Failed to deliver sign-in outcome to host");
            }
        }
        let mut slot = listeners.borrow_mut();
        current.append(&mut slot);
        *slot = current;
    }
}

fn outcome_payload(notification: &HostNotification) -> Result<JsValue, JsValue> {
    match notification {
        HostNotification::SignInSucceeded(info) => serde_wasm_bindgen::to_value(info),
        HostNotification::SignInFailed(err) => serde_wasm_bindgen::to_value(err),
    }
    .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Install the browser console subscriber.
///
/// `level` is one of `trace`, `debug`, `info`, `warn`, `error`
/// (default `info`).
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: Option<String>) -> Result<(), JsValue> {
    let level = match level.as_deref().unwrap_or("info") {
        "trace" => LogLevel::Trace,
        "debug" => LogLevel::Debug,
        "info" => LogLevel::Info,
        "warn" => LogLevel::Warn,
        "error" => LogLevel::Error,
        other => return Err(JsValue::from_str(&format!("Unknown log level `{}`", other))),
    };

    init_runtime_logging(LoggingConfig::default().with_level(level))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Get the module version
#[wasm_bindgen(js_name = authVersion)]
pub fn auth_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
