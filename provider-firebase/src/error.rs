//! Error types for the Firebase provider

use bridge_traits::error::BridgeError;
use bridge_traits::identity::{codes, ProviderError};
use thiserror::Error;

/// Firebase provider errors
#[derive(Error, Debug)]
pub enum FirebaseError {
    /// The Identity Toolkit rejected the request
    #[error("Identity Toolkit error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// The credential source yielded neither an ID token nor an access token
    #[error("Google credential carries no token")]
    EmptyCredential,

    /// The Google account is already linked to a user with another sign-in method
    #[error("An account already exists with the same email address but different sign-in credentials")]
    NeedConfirmation,

    /// Request could not be built (bad endpoint, unserializable body)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Transport failure, no response received
    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Result type for Firebase operations
pub type Result<T> = std::result::Result<T, FirebaseError>;

impl From<BridgeError> for FirebaseError {
    fn from(error: BridgeError) -> Self {
        match error {
            BridgeError::Serialization(msg) => FirebaseError::InvalidRequest(msg),
            other => FirebaseError::NetworkError(other.to_string()),
        }
    }
}

/// Maps an Identity Toolkit error message to the hosted SDK's code.
///
/// Server messages look like `USER_DISABLED` or
/// `INVALID_IDP_RESPONSE : Invalid Idp Response`; only the leading token
/// decides the code.
pub fn code_for_server_message(message: &str) -> &'static str {
    if message.starts_with("API key not valid") {
        return codes::INVALID_API_KEY;
    }

    let token = message.split([' ', ':']).next().unwrap_or_default();
    match token {
        "INVALID_IDP_RESPONSE" => codes::INVALID_CREDENTIAL,
        "USER_DISABLED" => codes::USER_DISABLED,
        "OPERATION_NOT_ALLOWED" => codes::OPERATION_NOT_ALLOWED,
        "INVALID_API_KEY" => codes::INVALID_API_KEY,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => codes::TOO_MANY_REQUESTS,
        _ => codes::INTERNAL_ERROR,
    }
}

impl From<FirebaseError> for ProviderError {
    fn from(error: FirebaseError) -> Self {
        match error {
            FirebaseError::ApiError { message, .. } => {
                ProviderError::new(code_for_server_message(&message), message)
            }
            FirebaseError::EmptyCredential => ProviderError::new(
                codes::INVALID_CREDENTIAL,
                "The supplied auth credential is empty.",
            ),
            e @ FirebaseError::NeedConfirmation => ProviderError::new(
                codes::ACCOUNT_EXISTS_WITH_DIFFERENT_CREDENTIAL,
                e.to_string(),
            ),
            FirebaseError::NetworkError(msg) => ProviderError::network(msg),
            e @ (FirebaseError::InvalidRequest(_) | FirebaseError::ParseError(_)) => {
                ProviderError::internal(e.to_string())
            }
        }
    }
}
