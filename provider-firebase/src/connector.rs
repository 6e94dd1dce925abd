//! Identity Toolkit connector
//!
//! Implements the `IdentityProvider` trait over the Firebase Authentication
//! REST API.

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use bridge_traits::identity::{
    codes, CredentialSource, GoogleCredential, IdentityProvider, Principal, ProviderError,
};
use core_runtime::config::FirebaseConfig;
use core_runtime::logging::redact_if_sensitive;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::error::{FirebaseError, Result};
use crate::types::{ApiErrorResponse, FirebaseUser, SignInWithIdpRequest, SignInWithIdpResponse};

/// Identity Toolkit API base URL
pub const IDENTITY_TOOLKIT_BASE: &str = "https://identitytoolkit.googleapis.com/v1";

/// IdP identifier for Google credentials
const GOOGLE_PROVIDER_ID: &str = "google.com";

/// OAuth handler path served on every auth domain
const AUTH_HANDLER_PATH: &str = "/__/auth/handler";

/// Firebase Authentication provider
///
/// Exchanges the Google credential produced by the host's
/// [`CredentialSource`] for a Firebase user via `accounts:signInWithIdp`,
/// and keeps that user as the current user until sign-out or the next
/// successful sign-in.
///
/// # Example
///
/// ```ignore
/// use provider_firebase::FirebaseAuthProvider;
/// use bridge_traits::IdentityProvider;
///
/// let provider = FirebaseAuthProvider::new(firebase_config, http_client, consent);
/// let principal = provider.sign_in_interactive().await?;
/// let token = provider.id_token(&principal).await?;
/// ```
pub struct FirebaseAuthProvider {
    config: FirebaseConfig,

    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// Host-side Google consent
    credential_source: Arc<dyn CredentialSource>,

    /// Identity Toolkit base URL (overridable for the local emulator)
    endpoint: String,

    current_user: RwLock<Option<FirebaseUser>>,
}

impl FirebaseAuthProvider {
    pub fn new(
        config: FirebaseConfig,
        http_client: Arc<dyn HttpClient>,
        credential_source: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            config,
            http_client,
            credential_source,
            endpoint: IDENTITY_TOOLKIT_BASE.to_string(),
            current_user: RwLock::new(None),
        }
    }

    /// Point at another Identity Toolkit, e.g.
    /// `http://127.0.0.1:9099/identitytoolkit.googleapis.com/v1` for the
    /// Auth emulator.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn config(&self) -> &FirebaseConfig {
        &self.config
    }

    /// The signed-in user, if any.
    pub fn current_user(&self) -> Option<FirebaseUser> {
        self.read_user().clone()
    }

    // The lock is never held across an await, so a poisoned guard still
    // holds consistent data.
    fn read_user(&self) -> RwLockReadGuard<'_, Option<FirebaseUser>> {
        self.current_user.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_user(&self) -> RwLockWriteGuard<'_, Option<FirebaseUser>> {
        self.current_user.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn sign_in_url(&self) -> Result<String> {
        let base = format!("{}/accounts:signInWithIdp", self.endpoint);
        Url::parse_with_params(&base, &[("key", self.config.api_key.as_str())])
            .map(|url| url.to_string())
            .map_err(|e| FirebaseError::InvalidRequest(format!("endpoint `{}`: {}", base, e)))
    }

    fn request_uri(&self) -> Result<String> {
        let uri = format!("https://{}{}", self.config.auth_domain, AUTH_HANDLER_PATH);
        Url::parse(&uri)
            .map(|url| url.to_string())
            .map_err(|e| FirebaseError::InvalidRequest(format!("authDomain: {}", e)))
    }

    /// Form-encodes the credential the way the hosted SDK sends it.
    fn post_body(credential: &GoogleCredential) -> Result<String> {
        fn present(token: &Option<String>) -> Option<&str> {
            token.as_deref().filter(|t| !t.is_empty())
        }

        let mut pairs = Vec::with_capacity(3);
        if let Some(id_token) = present(&credential.id_token) {
            pairs.push(("id_token", id_token));
        }
        if let Some(access_token) = present(&credential.access_token) {
            pairs.push(("access_token", access_token));
        }
        pairs.push(("providerId", GOOGLE_PROVIDER_ID));

        serde_urlencoded::to_string(pairs)
            .map_err(|e| FirebaseError::InvalidRequest(e.to_string()))
    }

    /// `accounts:signInWithIdp`
    #[instrument(skip(self, credential))]
    async fn exchange(&self, credential: &GoogleCredential) -> Result<FirebaseUser> {
        if credential.is_empty() {
            return Err(FirebaseError::EmptyCredential);
        }

        let body = SignInWithIdpRequest {
            post_body: Self::post_body(credential)?,
            request_uri: self.request_uri()?,
            return_secure_token: true,
            return_idp_credential: true,
        };
        let request = HttpRequest::new(HttpMethod::Post, self.sign_in_url()?).json(&body)?;

        debug!(endpoint = %self.endpoint, "Exchanging Google credential");
        let response = self.http_client.execute(request).await?;

        if !response.is_success() {
            let message = response
                .json::<ApiErrorResponse>()
                .map(|envelope| envelope.error.message)
                .or_else(|_| response.text())
                .unwrap_or_else(|_| format!("HTTP {}", response.status));

            return Err(FirebaseError::ApiError {
                status_code: response.status,
                message,
            });
        }

        let parsed: SignInWithIdpResponse = response
            .json()
            .map_err(|e| FirebaseError::ParseError(e.to_string()))?;

        if parsed.need_confirmation {
            return Err(FirebaseError::NeedConfirmation);
        }

        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
        let uid = non_empty(parsed.local_id)
            .ok_or_else(|| FirebaseError::ParseError("response has no localId".to_string()))?;
        let id_token = non_empty(parsed.id_token)
            .ok_or_else(|| FirebaseError::ParseError("response has no idToken".to_string()))?;

        Ok(FirebaseUser {
            uid,
            email: non_empty(parsed.email),
            display_name: non_empty(parsed.display_name),
            id_token,
        })
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl IdentityProvider for FirebaseAuthProvider {
    #[instrument(skip(self))]
    async fn sign_in_interactive(&self) -> std::result::Result<Principal, ProviderError> {
        let credential = self.credential_source.obtain_google_credential().await?;

        let user = self.exchange(&credential).await.map_err(|e| {
            warn!(error = %e, "Identity Toolkit sign-in failed");
            ProviderError::from(e)
        })?;

        info!(
            uid = %user.uid,
            email = %redact_if_sensitive("email", user.email.as_deref().unwrap_or_default()),
            "Signed in to Firebase"
        );

        let principal = Principal {
            uid: user.uid.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
        };
        *self.write_user() = Some(user);

        Ok(principal)
    }

    async fn id_token(&self, principal: &Principal) -> std::result::Result<String, ProviderError> {
        match self.read_user().as_ref() {
            Some(user) if user.uid == principal.uid => Ok(user.id_token.clone()),
            Some(_) => Err(ProviderError::new(
                codes::USER_TOKEN_EXPIRED,
                "The signed-in user changed before a token could be issued.",
            )),
            None => Err(ProviderError::new(
                codes::NO_CURRENT_USER,
                "No user is currently signed in.",
            )),
        }
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> std::result::Result<(), ProviderError> {
        if let Some(user) = self.write_user().take() {
            debug!(uid = %user.uid, "Cleared current user");
        }
        Ok(())
    }
}
