use bridge_traits::ProviderError;
use core_runtime::events::SignInError;
use thiserror::Error;

use crate::types::INCOMPLETE_PRINCIPAL;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Error reported by the identity provider, kept verbatim.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Provider reported success without `{field}`")]
    IncompletePrincipal { field: &'static str },
}

impl AuthError {
    /// Converts the error into the payload published to the host.
    ///
    /// Provider errors keep their code and message untouched.
    pub fn into_sign_in_error(self) -> SignInError {
        match self {
            AuthError::Provider(err) => SignInError {
                code: err.code,
                message: err.message,
            },
            err @ AuthError::IncompletePrincipal { .. } => SignInError {
                code: INCOMPLETE_PRINCIPAL.to_string(),
                message: err.to_string(),
            },
        }
    }

    pub fn code(&self) -> &str {
        match self {
            AuthError::Provider(err) => &err.code,
            AuthError::IncompletePrincipal { .. } => INCOMPLETE_PRINCIPAL,
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
