//! # Authentication Bridge
//!
//! Connects the host application's sign-in intents to an identity provider.
//!
//! ## Overview
//!
//! The host sends `request-sign-in` and `request-sign-out` intents and listens
//! for `sign-in-succeeded` / `sign-in-failed` notifications. [`AuthBridge`]
//! sits between those messages and an injected
//! [`IdentityProvider`](bridge_traits::IdentityProvider):
//!
//! - Sign-in runs the provider's interactive flow, fetches a bearer token for
//!   the principal and publishes exactly one notification. The host receives
//!   it on the outcome port; observers of the event bus see a copy.
//! - Sign-out calls the provider and publishes nothing.
//!
//! The bridge keeps no authentication state between attempts. Session
//! ownership stays with the provider.
//!
//! ## Failure codes
//!
//! Provider failures reach the host with the provider's `code` and
//! `message` unchanged. The bridge adds one code of its own,
//! `bridge/incomplete-principal` ([`INCOMPLETE_PRINCIPAL`]), published when
//! the provider reports success but the token, email or uid is empty.
//!
//! ## Features
//!
//! - Intent dispatch loop with one detached task per intent
//! - Per-attempt trace ids for correlating provider calls
//! - Browser bindings (`wasm32`) wrapping the hosted JavaScript SDK

pub mod bridge;
pub mod error;
pub mod types;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use bridge::AuthBridge;
pub use error::{AuthError, Result};
pub use types::{AttemptId, INCOMPLETE_PRINCIPAL};
