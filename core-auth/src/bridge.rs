//! # Auth Bridge
//!
//! Turns host intents into identity provider calls and provider results into
//! host notifications.
//!
//! ## Sign-in
//!
//! 1. `sign_in_interactive()` on the provider (suspends while the user
//!    interacts with provider-owned UI)
//! 2. `id_token(&principal)` on the provider
//! 3. exactly one notification on the host's outcome port:
//!    `sign-in-succeeded { token, email, uid }` or
//!    `sign-in-failed { code, message }`, mirrored on the [`EventBus`] for
//!    observers
//!
//! A failure at either step ends the attempt; there is no retry. Provider
//! errors reach the host with their code and message unchanged. The one
//! failure the bridge raises itself is `bridge/incomplete-principal`, for a
//! provider that reports success without a token, email or uid.
//!
//! ## Sign-out
//!
//! Calls the provider and returns. Nothing is published whether the call
//! succeeds or fails; a failure is only traced.
//!
//! ## Concurrency
//!
//! Every intent is independent. Two sign-in intents sent back to back produce
//! two provider invocations and two notifications. The provider is shared
//! through an `Arc` and never locked.
//!
//! ## Usage
//!
//! ```no_run
//! use core_auth::AuthBridge;
//! use core_runtime::events::{intent_channel, outcome_channel, EventBus};
//! use std::sync::Arc;
//! # use bridge_traits::{IdentityProvider, Principal, ProviderError};
//! # struct MyProvider;
//! # #[async_trait::async_trait]
//! # impl IdentityProvider for MyProvider {
//! #     async fn sign_in_interactive(&self) -> Result<Principal, ProviderError> { unimplemented!() }
//! #     async fn id_token(&self, _p: &Principal) -> Result<String, ProviderError> { unimplemented!() }
//! #     async fn sign_out(&self) -> Result<(), ProviderError> { unimplemented!() }
//! # }
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (outcome_port, mut outcomes) = outcome_channel();
//! let bridge = AuthBridge::new(Arc::new(MyProvider), EventBus::new(100))
//!     .with_outcome_port(outcome_port);
//!
//! let (intents, inbox) = intent_channel();
//! tokio::spawn(Arc::new(bridge).run(inbox));
//!
//! intents.request_sign_in().unwrap();
//! let outcome = outcomes.recv().await.unwrap();
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::types::AttemptId;
use bridge_traits::{IdentityProvider, Principal};
use core_runtime::events::{
    EventBus, HostIntent, HostNotification, IntentReceiver, OutcomeSender, SignInInfo,
};
use core_runtime::logging::redact_if_sensitive;
use core_runtime::task::spawn_detached;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Mediator between host intents and the identity provider.
pub struct AuthBridge {
    provider: Arc<dyn IdentityProvider>,
    event_bus: EventBus,
    outcome_port: Option<OutcomeSender>,
}

impl fmt::Debug for AuthBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthBridge")
            .field("provider", &"IdentityProvider { ... }")
            .field("event_bus", &self.event_bus)
            .field("outcome_port", &self.outcome_port.is_some())
            .finish()
    }
}

impl AuthBridge {
    /// Creates a bridge publishing to `event_bus`.
    pub fn new(provider: Arc<dyn IdentityProvider>, event_bus: EventBus) -> Self {
        Self {
            provider,
            event_bus,
            outcome_port: None,
        }
    }

    /// Delivers every outcome on `port` as well.
    ///
    /// The port is unbounded, so unlike a bus subscriber the host cannot miss
    /// an outcome by reading late.
    pub fn with_outcome_port(mut self, port: OutcomeSender) -> Self {
        self.outcome_port = Some(port);
        self
    }

    /// The bus notifications are published on.
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Runs one sign-in attempt and publishes its outcome.
    ///
    /// The published notification is also returned, which lets callers that
    /// drive the bridge directly (browser bindings, tests) observe the result
    /// without subscribing.
    #[instrument(skip(self), fields(attempt_id = %AttemptId::new()))]
    pub async fn handle_sign_in(&self) -> HostNotification {
        info!("Sign-in requested");

        let notification = match self.authenticate().await {
            Ok(info) => {
                info!(
                    uid = %info.uid,
                    email = %redact_if_sensitive("email", &info.email),
                    "Sign-in succeeded"
                );
                HostNotification::SignInSucceeded(info)
            }
            Err(err) => {
                warn!(code = %err.code(), error = %err, "Sign-in failed");
                HostNotification::SignInFailed(err.into_sign_in_error())
            }
        };

        if let Some(port) = &self.outcome_port {
            if port.deliver(notification.clone()).is_err() {
                warn!("Host outcome port closed, sign-in outcome not delivered");
            }
        }
        if self.event_bus.emit(notification.clone()).is_err() {
            debug!("No observers for sign-in outcome");
        }

        notification
    }

    async fn authenticate(&self) -> Result<SignInInfo> {
        let principal = self.provider.sign_in_interactive().await?;
        debug!(uid = %principal.uid, "Interactive sign-in completed, requesting token");

        let token = self.provider.id_token(&principal).await?;
        sign_in_info(principal, token)
    }

    /// Ends the provider session. Never publishes a notification.
    #[instrument(skip(self))]
    pub async fn handle_sign_out(&self) {
        info!("Sign-out requested");

        match self.provider.sign_out().await {
            Ok(()) => debug!("Provider sign-out completed"),
            Err(err) => {
                warn!(code = %err.code, message = %err.message, "Provider sign-out failed")
            }
        }
    }

    /// Handles a single intent to completion.
    ///
    /// Returns the notification published for a sign-in, `None` for a
    /// sign-out.
    pub async fn dispatch(&self, intent: HostIntent) -> Option<HostNotification> {
        match intent {
            HostIntent::RequestSignIn => Some(self.handle_sign_in().await),
            HostIntent::RequestSignOut => {
                self.handle_sign_out().await;
                None
            }
        }
    }

    /// Consumes intents until every sender is dropped.
    ///
    /// Each intent runs on its own detached task so a pending provider
    /// interaction never holds up later intents. Tasks still in flight when
    /// the port closes run to completion.
    pub async fn run(self: Arc<Self>, mut intents: IntentReceiver) {
        info!("Auth bridge listening for host intents");

        while let Some(intent) = intents.recv().await {
            debug!(intent = %intent, "Dispatching host intent");
            let bridge = Arc::clone(&self);
            spawn_detached(async move {
                bridge.dispatch(intent).await;
            });
        }

        info!("Intent port closed, auth bridge stopped");
    }
}

fn sign_in_info(principal: Principal, token: String) -> Result<SignInInfo> {
    let email = principal.email.unwrap_or_default();

    if token.is_empty() {
        return Err(AuthError::IncompletePrincipal { field: "token" });
    }
    if email.is_empty() {
        return Err(AuthError::IncompletePrincipal { field: "email" });
    }
    if principal.uid.is_empty() {
        return Err(AuthError::IncompletePrincipal { field: "uid" });
    }

    Ok(SignInInfo {
        token,
        email,
        uid: principal.uid,
    })
}
