//! # Host Bridge Traits
//!
//! Capabilities that the host shell must hand to the sign-in bridge.
//!
//! ## Overview
//!
//! This crate defines the contract between the bridge core and the
//! environment it runs in. Each trait represents something the bridge needs
//! but cannot own itself: the identity provider SDK, the interactive consent
//! surface, outbound HTTP, and the host's logging pipeline.
//!
//! ## Traits
//!
//! ### Identity
//! - [`IdentityProvider`](identity::IdentityProvider) - Interactive sign-in, sign-out, bearer tokens
//! - [`CredentialSource`](identity::CredentialSource) - Host-side Google consent (popup, web view, loopback)
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Async HTTP used by REST-backed providers
//!
//! ### Utilities
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Identity provider              | HTTP                  |
//! |----------|--------------------------------|-----------------------|
//! | Desktop  | `provider-firebase`            | `bridge-desktop`      |
//! | Web      | `core-auth` JS adapter (wasm)  | handled by the JS SDK |
//!
//! ## Thread Safety
//!
//! Native builds require `Send + Sync` on every bridge so they can be shared
//! across Tokio tasks. On `wasm32` the bounds collapse to nothing because
//! browser handles are single-threaded; see [`platform`].
//!
//! ## Examples
//!
//! ### Implementing IdentityProvider
//!
//! ```ignore
//! use bridge_traits::identity::{IdentityProvider, Principal, ProviderError};
//! use async_trait::async_trait;
//!
//! pub struct MyProvider;
//!
//! #[async_trait]
//! impl IdentityProvider for MyProvider {
//!     async fn sign_in_interactive(&self) -> Result<Principal, ProviderError> {
//!         todo!()
//!     }
//!
//!     async fn id_token(&self, principal: &Principal) -> Result<String, ProviderError> {
//!         todo!()
//!     }
//!
//!     async fn sign_out(&self) -> Result<(), ProviderError> {
//!         todo!()
//!     }
//! }
//! ```

pub mod error;
pub mod http;
pub mod identity;
pub mod logging;
pub mod platform;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use identity::{CredentialSource, GoogleCredential, IdentityProvider, Principal, ProviderError};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
