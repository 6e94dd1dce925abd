//! # Host Message Boundary
//!
//! Typed messages that cross between the host application and the sign-in
//! bridge, plus the channels that carry them.
//!
//! ## Overview
//!
//! The boundary has two directions:
//! - **Intents** flow from the host to the bridge over an [`IntentSender`] /
//!   [`IntentReceiver`] pair (`tokio::sync::mpsc`). An intent carries no
//!   payload and has no reply channel.
//! - **Outcomes** flow from the bridge to the host's result ports over an
//!   [`OutcomeSender`] / [`OutcomeReceiver`] pair (`tokio::sync::mpsc`). The
//!   channel is unbounded, so a slow host still receives exactly one
//!   notification per sign-in attempt.
//! - The same notifications are mirrored on the [`EventBus`]
//!   (`tokio::sync::broadcast`) for observers such as diagnostics panels.
//!   Observers that fall behind skip notifications; the outcome port never
//!   does.
//!
//! ## Architecture
//!
//! ```text
//!  ┌──────────────┐  request-sign-in   ┌─────────────┐
//!  │              ├───────────────────>│             │
//!  │     Host     │  request-sign-out  │ Auth Bridge │
//!  │ Application  ├───────────────────>│             │
//!  │              │                    │             │
//!  │              │<───────────────────┤             │
//!  └──────────────┘ sign-in-succeeded  └──────┬──────┘
//!                   sign-in-failed            │ mirror
//!                   (outcome port)            v
//!                                        EventBus observers
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{
//!     intent_channel, outcome_channel, HostIntent, HostNotification, SignInError,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (intents, mut inbox) = intent_channel();
//! let (outcome_port, mut outcomes) = outcome_channel();
//!
//! intents.request_sign_in().unwrap();
//! assert_eq!(inbox.recv().await, Some(HostIntent::RequestSignIn));
//!
//! let failed = HostNotification::SignInFailed(SignInError {
//!     code: "auth/popup-closed-by-user".to_string(),
//!     message: "The popup has been closed by the user.".to_string(),
//! });
//! outcome_port.deliver(failed.clone()).unwrap();
//! assert_eq!(outcomes.recv().await, Some(failed));
//! # }
//! ```
//!
//! ## Wire format
//!
//! Both message kinds serialize with an adjacent `type` tag in kebab-case:
//!
//! ```json
//! {"type": "sign-in-succeeded", "payload": {"token": "...", "email": "a@b.com", "uid": "u1"}}
//! {"type": "sign-in-failed", "payload": {"code": "auth/popup-closed-by-user", "message": "..."}}
//! {"type": "request-sign-in"}
//! ```
//!
//! ## Error Handling
//!
//! Bus observers can see `RecvError::Lagged(n)` when they fall more than the
//! bus capacity behind. This is non-fatal and only affects observers.
//! `RecvError::Closed` means the bridge (every sender) has been dropped.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError, TryRecvError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the notification bus.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Intents
// ============================================================================

/// One-way request from the host application.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HostIntent {
    /// Start the interactive sign-in flow.
    RequestSignIn,
    /// End the provider session.
    RequestSignOut,
}

impl HostIntent {
    /// Kebab-case name used on the wire and in traces.
    pub fn as_str(&self) -> &'static str {
        match self {
            HostIntent::RequestSignIn => "request-sign-in",
            HostIntent::RequestSignOut => "request-sign-out",
        }
    }
}

impl fmt::Display for HostIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when an intent is sent after the bridge has stopped listening.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("intent port closed, `{0}` was not delivered")]
pub struct IntentPortClosed(pub HostIntent);

/// Creates a connected intent sender/receiver pair.
///
/// The channel is unbounded: intents are tiny and the host must never block
/// on the bridge.
pub fn intent_channel() -> (IntentSender, IntentReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (IntentSender { tx }, IntentReceiver { rx })
}

/// Host-side handle for delivering intents to the bridge.
#[derive(Clone, Debug)]
pub struct IntentSender {
    tx: mpsc::UnboundedSender<HostIntent>,
}

impl IntentSender {
    /// Deliver an intent.
    pub fn send(&self, intent: HostIntent) -> Result<(), IntentPortClosed> {
        self.tx
            .send(intent)
            .map_err(|mpsc::error::SendError(intent)| IntentPortClosed(intent))
    }

    pub fn request_sign_in(&self) -> Result<(), IntentPortClosed> {
        self.send(HostIntent::RequestSignIn)
    }

    pub fn request_sign_out(&self) -> Result<(), IntentPortClosed> {
        self.send(HostIntent::RequestSignOut)
    }

    /// Returns `true` once the receiving side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Bridge-side end of the intent port.
#[derive(Debug)]
pub struct IntentReceiver {
    rx: mpsc::UnboundedReceiver<HostIntent>,
}

impl IntentReceiver {
    /// Waits for the next intent; `None` once every sender is dropped.
    pub async fn recv(&mut self) -> Option<HostIntent> {
        self.rx.recv().await
    }

    /// Returns a queued intent without waiting.
    pub fn try_recv(&mut self) -> Option<HostIntent> {
        self.rx.try_recv().ok()
    }
}

// ============================================================================
// Outcome port
// ============================================================================

/// Returned when an outcome is delivered after the host dropped its receiver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("outcome port closed, `{}` was not delivered", .0.port_name())]
pub struct OutcomePortClosed(pub HostNotification);

/// Creates a connected outcome sender/receiver pair.
///
/// Unbounded like the intent port: every queued outcome stays queued until
/// the host reads it.
pub fn outcome_channel() -> (OutcomeSender, OutcomeReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (OutcomeSender { tx }, OutcomeReceiver { rx })
}

/// Bridge-side handle for the host's result ports.
#[derive(Clone, Debug)]
pub struct OutcomeSender {
    tx: mpsc::UnboundedSender<HostNotification>,
}

impl OutcomeSender {
    pub fn deliver(&self, notification: HostNotification) -> Result<(), OutcomePortClosed> {
        self.tx
            .send(notification)
            .map_err(|mpsc::error::SendError(notification)| OutcomePortClosed(notification))
    }
}

/// Host-side end of the result ports.
#[derive(Debug)]
pub struct OutcomeReceiver {
    rx: mpsc::UnboundedReceiver<HostNotification>,
}

impl OutcomeReceiver {
    /// Waits for the next outcome; `None` once the bridge is gone.
    pub async fn recv(&mut self) -> Option<HostNotification> {
        self.rx.recv().await
    }

    /// Returns a queued outcome without waiting.
    pub fn try_recv(&mut self) -> Option<HostNotification> {
        self.rx.try_recv().ok()
    }
}

// ============================================================================
// Notifications
// ============================================================================

/// Payload of a successful sign-in.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignInInfo {
    /// Opaque bearer credential
    pub token: String,
    /// Principal email
    pub email: String,
    /// Stable principal identifier
    pub uid: String,
}

// Custom Debug implementation to avoid logging tokens
impl fmt::Debug for SignInInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInInfo")
            .field("token", &"[REDACTED]")
            .field("email", &self.email)
            .field("uid", &self.uid)
            .finish()
    }
}

/// Payload of a failed sign-in, copied verbatim from the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignInError {
    /// Provider-defined error category
    pub code: String,
    /// Human-readable description
    pub message: String,
}

/// One-way report from the bridge to the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum HostNotification {
    /// The user signed in; carries token, email and uid.
    SignInSucceeded(SignInInfo),
    /// The attempt ended with a provider error.
    SignInFailed(SignInError),
}

impl HostNotification {
    /// Returns a human-readable description of the notification.
    pub fn description(&self) -> &str {
        match self {
            HostNotification::SignInSucceeded(_) => "User signed in successfully",
            HostNotification::SignInFailed(_) => "Sign-in failed",
        }
    }

    /// Returns the severity level of the notification.
    pub fn severity(&self) -> EventSeverity {
        match self {
            HostNotification::SignInSucceeded(_) => EventSeverity::Info,
            HostNotification::SignInFailed(_) => EventSeverity::Warning,
        }
    }

    /// Name of the host port this notification is delivered on.
    pub fn port_name(&self) -> &'static str {
        match self {
            HostNotification::SignInSucceeded(_) => "signInInfo",
            HostNotification::SignInFailed(_) => "signInError",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, HostNotification::SignInSucceeded(_))
    }
}

/// Severity of a notification, for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Info,
    Warning,
}

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast bus mirroring [`HostNotification`]s to observers.
///
/// Host result ports read from the [`OutcomeReceiver`] instead; the bus may
/// drop notifications for a subscriber that lags.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends (notifications are cloned for each subscriber)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{EventBus, HostNotification, SignInError};
///
/// # #[tokio::main]
/// # async fn main() {
/// let bus = EventBus::new(100);
/// let mut observer = bus.subscribe();
///
/// bus.emit(HostNotification::SignInFailed(SignInError {
///     code: "auth/popup-closed-by-user".to_string(),
///     message: "The popup has been closed by the user.".to_string(),
/// }))
/// .ok();
///
/// let received = observer.recv().await.unwrap();
/// assert!(!received.is_success());
/// # }
/// ```
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<HostNotification>,
}

impl EventBus {
    /// Creates a new bus.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of notifications buffered per subscriber.
    ///   A subscriber further behind than this receives `RecvError::Lagged`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; `BridgeConfig` validation rejects that
    /// value before a bus is ever built from configuration.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes a notification to all subscribers.
    ///
    /// Returns the number of subscribers that received it, or an error if
    /// there are no active subscribers.
    pub fn emit(
        &self,
        notification: HostNotification,
    ) -> Result<usize, SendError<HostNotification>> {
        self.sender.send(notification)
    }

    /// Creates a new subscriber. Past notifications are not replayed.
    pub fn subscribe(&self) -> Receiver<HostNotification> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    ///
    /// ```rust
    /// use core_runtime::events::EventBus;
    ///
    /// let bus = EventBus::new(8);
    /// assert_eq!(bus.subscriber_count(), 0);
    ///
    /// let _subscriber = bus.subscribe();
    /// assert_eq!(bus.subscriber_count(), 1);
    /// ```
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type NotificationFilter = Box<dyn Fn(&HostNotification) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{EventBus, EventStream};
///
/// let bus = EventBus::new(100);
/// let failures_only = EventStream::new(bus.subscribe()).filter(|n| !n.is_success());
/// ```
pub struct EventStream {
    receiver: Receiver<HostNotification>,
    filter: Option<NotificationFilter>,
}

impl EventStream {
    /// Creates a new stream from a receiver.
    pub fn new(receiver: Receiver<HostNotification>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only notifications matching `predicate` are returned from `recv`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&HostNotification) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, notification: &HostNotification) -> bool {
        self.filter.as_ref().map_or(true, |f| f(notification))
    }

    /// Receives the next notification that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n`.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<HostNotification, RecvError> {
        loop {
            let notification = self.receiver.recv().await?;
            if self.accepts(&notification) {
                return Ok(notification);
            }
        }
    }

    /// Attempts to receive a notification without waiting.
    ///
    /// Returns `None` if nothing matching is currently queued.
    pub fn try_recv(&mut self) -> Option<Result<HostNotification, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(notification) => {
                    if self.accepts(&notification) {
                        return Some(Ok(notification));
                    }
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(TryRecvError::Closed) => {
                    return Some(Err(RecvError::Closed))
                }
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
