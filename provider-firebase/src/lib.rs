//! # Firebase Identity Provider
//!
//! Implements `IdentityProvider` on top of the Firebase Authentication
//! Identity Toolkit REST API.
//!
//! ## Overview
//!
//! Sign-in happens in two steps:
//! - The host's [`CredentialSource`](bridge_traits::CredentialSource) runs the
//!   interactive Google consent and yields a Google credential
//! - `accounts:signInWithIdp` exchanges that credential for a Firebase user
//!   and ID token
//!
//! The provider keeps the signed-in user (uid, email, ID token) in memory, the
//! same way the hosted JavaScript SDK does. Nothing is persisted and tokens
//! are never refreshed.
//!
//! Server error messages are translated to the `auth/*` codes the hosted SDK
//! reports, so the host sees one vocabulary regardless of platform.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::{FirebaseAuthProvider, IDENTITY_TOOLKIT_BASE};
pub use error::{FirebaseError, Result};
pub use types::FirebaseUser;
