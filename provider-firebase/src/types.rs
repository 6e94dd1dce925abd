//! Identity Toolkit API types
//!
//! Request and response bodies for `accounts:signInWithIdp`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// `accounts:signInWithIdp` request body
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignInWithIdpRequest {
    /// Form-encoded IdP credential, e.g. `id_token=...&providerId=google.com`
    pub post_body: String,

    /// URI the IdP redirected to; must be an authorized domain
    pub request_uri: String,

    pub return_secure_token: bool,

    pub return_idp_credential: bool,
}

/// `accounts:signInWithIdp` response body
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInWithIdpResponse {
    /// Firebase uid
    pub local_id: Option<String>,

    pub email: Option<String>,

    pub display_name: Option<String>,

    /// Firebase ID token (JWT)
    pub id_token: Option<String>,

    pub refresh_token: Option<String>,

    /// Token lifetime in seconds, as a decimal string
    pub expires_in: Option<String>,

    /// `google.com` for this flow
    pub provider_id: Option<String>,

    /// Set when the IdP account exists under a different credential
    #[serde(default)]
    pub need_confirmation: bool,
}

impl fmt::Debug for SignInWithIdpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInWithIdpResponse")
            .field("local_id", &self.local_id)
            .field("email", &self.email.as_ref().map(|_| "[REDACTED]"))
            .field("display_name", &self.display_name)
            .field("id_token", &self.id_token.as_ref().map(|_| "[REDACTED]"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_in", &self.expires_in)
            .field("provider_id", &self.provider_id)
            .field("need_confirmation", &self.need_confirmation)
            .finish()
    }
}

/// Error envelope returned on non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: u16,
    pub message: String,
}

/// The provider's signed-in user
#[derive(Clone, PartialEq, Eq)]
pub struct FirebaseUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub id_token: String,
}

impl fmt::Debug for FirebaseUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirebaseUser")
            .field("uid", &self.uid)
            .field("email", &self.email.as_ref().map(|_| "[REDACTED]"))
            .field("display_name", &self.display_name)
            .field("id_token", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_field_names() {
        let request = SignInWithIdpRequest {
            post_body: "id_token=abc&providerId=google.com".to_string(),
            request_uri: "https://demo.firebaseapp.com/__/auth/handler".to_string(),
            return_secure_token: true,
            return_idp_credential: true,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["postBody"], "id_token=abc&providerId=google.com");
        assert_eq!(json["requestUri"], "https://demo.firebaseapp.com/__/auth/handler");
        assert_eq!(json["returnSecureToken"], true);
        assert_eq!(json["returnIdpCredential"], true);
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{
            "federatedId": "https://accounts.google.com/1234",
            "providerId": "google.com",
            "localId": "u1",
            "email": "a@b.com",
            "displayName": "Ada",
            "idToken": "tok123",
            "refreshToken": "refresh",
            "expiresIn": "3600"
        }"#;

        let response: SignInWithIdpResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.local_id.as_deref(), Some("u1"));
        assert_eq!(response.email.as_deref(), Some("a@b.com"));
        assert_eq!(response.id_token.as_deref(), Some("tok123"));
        assert_eq!(response.expires_in.as_deref(), Some("3600"));
        assert!(!response.need_confirmation);

        let debug = format!("{:?}", response);
        assert!(!debug.contains("tok123"));
        assert!(!debug.contains("a@b.com"));
    }

    #[test]
    fn test_error_envelope_parsing() {
        let body = r#"{"error":{"code":400,"message":"INVALID_IDP_RESPONSE","errors":[]}}"#;
        let response: ApiErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.error.code, 400);
        assert_eq!(response.error.message, "INVALID_IDP_RESPONSE");
    }
}
