//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux):
//! - `HttpClient` using `reqwest` with rustls
//!
//! The interactive Google consent step (`CredentialSource`) stays with the
//! host application, which owns the browser or account picker.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::ReqwestHttpClient;
//! use provider_firebase::FirebaseAuthProvider;
//! use std::sync::Arc;
//!
//! let http_client = Arc::new(ReqwestHttpClient::new()?);
//! let provider = FirebaseAuthProvider::new(firebase, http_client, consent);
//! ```

mod http;

pub use http::ReqwestHttpClient;
