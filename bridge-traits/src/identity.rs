//! Identity Provider Abstractions
//!
//! The bridge never talks to an authentication service directly. It is handed
//! an [`IdentityProvider`] at construction time and drives it through three
//! calls: interactive sign-in, bearer-token retrieval, and sign-out. Session
//! state (who is currently signed in, refresh tokens, persistence) belongs to
//! the provider, never to the bridge.
//!
//! REST-backed providers additionally need the host to run the interactive
//! Google consent step (popup, system browser, web view). That step is the
//! [`CredentialSource`] capability.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::platform::PlatformSendSync;

/// Well-known provider error codes.
///
/// These mirror the `auth/*` codes emitted by the hosted authentication SDK so
/// that host applications see the same vocabulary regardless of which
/// provider implementation is wired in.
pub mod codes {
    pub const POPUP_CLOSED_BY_USER: &str = "auth/popup-closed-by-user";
    pub const CANCELLED_POPUP_REQUEST: &str = "auth/cancelled-popup-request";
    pub const INVALID_CREDENTIAL: &str = "auth/invalid-credential";
    pub const INVALID_API_KEY: &str = "auth/invalid-api-key";
    pub const USER_DISABLED: &str = "auth/user-disabled";
    pub const OPERATION_NOT_ALLOWED: &str = "auth/operation-not-allowed";
    pub const TOO_MANY_REQUESTS: &str = "auth/too-many-requests";
    pub const NETWORK_REQUEST_FAILED: &str = "auth/network-request-failed";
    pub const NO_CURRENT_USER: &str = "auth/no-current-user";
    pub const USER_TOKEN_EXPIRED: &str = "auth/user-token-expired";
    pub const ACCOUNT_EXISTS_WITH_DIFFERENT_CREDENTIAL: &str =
        "auth/account-exists-with-different-credential";
    pub const INTERNAL_ERROR: &str = "auth/internal-error";
}

/// Error reported by an identity provider.
///
/// `code` is a provider-defined category (e.g. `auth/popup-closed-by-user`)
/// and `message` is human-readable. Both are forwarded to the host verbatim.
///
/// # Examples
///
/// ```
/// use bridge_traits::identity::ProviderError;
///
/// let err = ProviderError::new("auth/popup-closed-by-user", "The popup has been closed by the user.");
/// assert_eq!(err.code, "auth/popup-closed-by-user");
/// assert_eq!(err.to_string(), "auth/popup-closed-by-user: The popup has been closed by the user.");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct ProviderError {
    /// Provider-defined error category
    pub code: String,
    /// Human-readable description
    pub message: String,
}

impl ProviderError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Shorthand for [`codes::INTERNAL_ERROR`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL_ERROR, message)
    }

    /// Shorthand for [`codes::NETWORK_REQUEST_FAILED`].
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(codes::NETWORK_REQUEST_FAILED, message)
    }
}

/// The authenticated user as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable principal identifier
    pub uid: String,
    /// Primary email, when the provider exposes one
    pub email: Option<String>,
    /// Display name, when the provider exposes one
    pub display_name: Option<String>,
}

impl Principal {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Identity provider SDK trait
///
/// Both sign-in and token retrieval may suspend for an unbounded time (the
/// user is interacting with provider-owned UI). Implementations must not
/// impose their own retry; a failure is terminal for that call.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::identity::IdentityProvider;
///
/// async fn who(provider: &dyn IdentityProvider) -> Result<String, ProviderError> {
///     let principal = provider.sign_in_interactive().await?;
///     let token = provider.id_token(&principal).await?;
///     Ok(format!("{} ({} byte token)", principal.uid, token.len()))
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait IdentityProvider: PlatformSendSync {
    /// Run the interactive sign-in flow and return the authenticated principal.
    async fn sign_in_interactive(&self) -> Result<Principal, ProviderError>;

    /// Retrieve a bearer (ID) token for `principal`.
    async fn id_token(&self, principal: &Principal) -> Result<String, ProviderError>;

    /// End the provider-side session.
    async fn sign_out(&self) -> Result<(), ProviderError>;
}

/// Google credential produced by the host's consent step.
///
/// At least one of the two tokens must be present.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleCredential {
    /// Google OpenID Connect ID token
    pub id_token: Option<String>,
    /// Google OAuth access token
    pub access_token: Option<String>,
}

impl GoogleCredential {
    pub fn from_id_token(id_token: impl Into<String>) -> Self {
        Self {
            id_token: Some(id_token.into()),
            access_token: None,
        }
    }

    pub fn from_access_token(access_token: impl Into<String>) -> Self {
        Self {
            id_token: None,
            access_token: Some(access_token.into()),
        }
    }

    /// Returns `true` when neither token carries a value.
    pub fn is_empty(&self) -> bool {
        let blank = |t: &Option<String>| t.as_deref().map_or(true, str::is_empty);
        blank(&self.id_token) && blank(&self.access_token)
    }
}

// Tokens never reach logs through Debug
impl fmt::Debug for GoogleCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleCredential")
            .field("id_token", &self.id_token.as_ref().map(|_| "[REDACTED]"))
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Host-side interactive Google consent.
///
/// Desktop hosts typically open the system browser with a loopback redirect;
/// mobile hosts use the platform account picker. Cancellation is reported as
/// [`codes::POPUP_CLOSED_BY_USER`] so hosts see the same code as in a browser.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait CredentialSource: PlatformSendSync {
    async fn obtain_google_credential(&self) -> Result<GoogleCredential, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::new(codes::POPUP_CLOSED_BY_USER, "closed");
        assert_eq!(err.to_string(), "auth/popup-closed-by-user: closed");
    }

    #[test]
    fn test_provider_error_helpers() {
        assert_eq!(ProviderError::internal("x").code, codes::INTERNAL_ERROR);
        assert_eq!(ProviderError::network("x").code, codes::NETWORK_REQUEST_FAILED);
    }

    #[test]
    fn test_provider_error_serialization() {
        let err = ProviderError::new("auth/user-disabled", "The user account has been disabled.");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "auth/user-disabled");
        assert_eq!(json["message"], "The user account has been disabled.");
    }

    #[test]
    fn test_principal_builder() {
        let principal = Principal::new("u1")
            .with_email("a@b.com")
            .with_display_name("Ada");
        assert_eq!(principal.uid, "u1");
        assert_eq!(principal.email.as_deref(), Some("a@b.com"));
        assert_eq!(principal.display_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_google_credential_is_empty() {
        assert!(!GoogleCredential::from_id_token("abc").is_empty());
        assert!(!GoogleCredential::from_access_token("ya29").is_empty());
        assert!(GoogleCredential::from_id_token("").is_empty());
        assert!(GoogleCredential {
            id_token: None,
            access_token: None
        }
        .is_empty());
    }

    #[test]
    fn test_google_credential_debug_redacts() {
        let credential = GoogleCredential::from_id_token("secret_id_token");
        let debug_str = format!("{:?}", credential);
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("secret_id_token"));
    }
}
