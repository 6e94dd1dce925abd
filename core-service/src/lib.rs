//! Core service façade and bootstrap helpers.
//!
//! This crate wires a host-provided identity provider into the auth bridge
//! and hands the host a [`BridgeHandle`] holding both ports: an intent
//! sender for sign-in/sign-out requests and the receiving end of the
//! outcome port, which keeps every sign-in outcome until the host reads
//! it. Observers that can afford to miss outcomes may also subscribe to
//! the event bus. Desktop apps typically enable the `desktop-shims`
//! feature and call [`bootstrap_firebase`], which talks to Firebase over
//! `reqwest`. WebAssembly builds enable the `wasm` feature and drive the
//! bridge through `JsAuthBridge` instead.

pub mod error;

pub use error::{CoreError, Result};

pub use core_auth::AuthBridge;
pub use core_runtime::config::{BridgeConfig, FirebaseConfig};
pub use core_runtime::events::{
    HostIntent, HostNotification, IntentPortClosed, IntentSender, OutcomeReceiver, Receiver,
    SignInError, SignInInfo, TryRecvError,
};
pub use provider_firebase::FirebaseAuthProvider;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub use core_auth::wasm::{JsAuthBridge, JsIdentityProvider};

use core_runtime::events::{intent_channel, outcome_channel, EventBus};
use core_runtime::task::spawn_detached;
use std::sync::Arc;
use tracing::info;

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
use bridge_traits::CredentialSource;

/// Host-facing handle to a running bridge.
///
/// Dropping the handle (and every sender obtained from
/// [`BridgeHandle::intents`]) closes the intent port and stops the bridge.
pub struct BridgeHandle {
    intents: IntentSender,
    outcomes: OutcomeReceiver,
    event_bus: EventBus,
    firebase: FirebaseConfig,
}

impl BridgeHandle {
    /// Sender for the inbound port.
    pub fn intents(&self) -> IntentSender {
        self.intents.clone()
    }

    /// Next sign-in outcome, in attempt order. `None` once the bridge has
    /// stopped and every outcome has been read.
    pub async fn next_outcome(&mut self) -> Option<HostNotification> {
        self.outcomes.recv().await
    }

    /// Returns an outcome that is already waiting, without blocking.
    pub fn try_next_outcome(&mut self) -> Option<HostNotification> {
        self.outcomes.try_recv()
    }

    /// Observer subscription to the event bus. Only outcomes published after
    /// this call are seen, and a slow observer may lag and skip some.
    pub fn subscribe(&self) -> Receiver<HostNotification> {
        self.event_bus.subscribe()
    }

    pub fn request_sign_in(&self) -> std::result::Result<(), IntentPortClosed> {
        self.intents.request_sign_in()
    }

    pub fn request_sign_out(&self) -> std::result::Result<(), IntentPortClosed> {
        self.intents.request_sign_out()
    }

    /// The descriptor the bridge was started with.
    pub fn provider_config(&self) -> &FirebaseConfig {
        &self.firebase
    }
}

impl std::fmt::Debug for BridgeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeHandle")
            .field("firebase", &self.firebase)
            .field("subscribers", &self.event_bus.subscriber_count())
            .finish()
    }
}

/// Validate `config`, start the bridge and return the host's handle.
///
/// On native targets this must be called from within a Tokio runtime.
///
/// ```ignore
/// let mut handle = core_service::bootstrap(config)?;
/// handle.request_sign_in()?;
/// match handle.next_outcome().await.expect("bridge stopped") {
///     HostNotification::SignInSucceeded(info) => println!("{}", info.uid),
///     HostNotification::SignInFailed(err) => eprintln!("{}", err.code),
/// }
/// ```
pub fn bootstrap(config: BridgeConfig) -> Result<BridgeHandle> {
    config.validate()?;

    #[cfg(not(target_arch = "wasm32"))]
    tokio::runtime::Handle::try_current().map_err(|_| {
        CoreError::InitializationFailed(
            "bootstrap must be called from within a Tokio runtime".to_string(),
        )
    })?;

    let BridgeConfig {
        firebase,
        identity_provider,
        event_buffer_size,
    } = config;

    let event_bus = EventBus::new(event_buffer_size);
    let (intents, inbox) = intent_channel();
    let (outcome_port, outcomes) = outcome_channel();
    let bridge =
        AuthBridge::new(identity_provider, event_bus.clone()).with_outcome_port(outcome_port);
    spawn_detached(Arc::new(bridge).run(inbox));

    info!(project_id = %firebase.project_id, "Sign-in bridge started");

    Ok(BridgeHandle {
        intents,
        outcomes,
        event_bus,
        firebase,
    })
}

/// Bootstrap against Firebase Authentication over HTTPS.
///
/// `credential_source` runs the interactive Google consent on the host.
#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub fn bootstrap_firebase(
    firebase: FirebaseConfig,
    credential_source: Arc<dyn CredentialSource>,
) -> Result<BridgeHandle> {
    firebase.validate()?;

    let http_client = Arc::new(bridge_desktop::ReqwestHttpClient::new()?);
    let provider = FirebaseAuthProvider::new(firebase.clone(), http_client, credential_source);

    let config = BridgeConfig::builder()
        .firebase(firebase)
        .identity_provider(Arc::new(provider))
        .build()?;

    bootstrap(config)
}
