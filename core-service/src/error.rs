use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Bridge error: {0}")]
    Bridge(#[from] bridge_traits::error::BridgeError),
}

impl From<core_runtime::Error> for CoreError {
    fn from(error: core_runtime::Error) -> Self {
        match error {
            core_runtime::Error::CapabilityMissing {
                capability,
                message,
            } => CoreError::CapabilityMissing {
                capability,
                message,
            },
            core_runtime::Error::Internal(msg) => CoreError::InitializationFailed(msg),
            other => CoreError::Config(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_error_conversion() {
        let err: CoreError = core_runtime::Error::MissingField { field: "apiKey" }.into();
        assert!(matches!(err, CoreError::Config(ref msg) if msg.contains("apiKey")));

        let err: CoreError = core_runtime::Error::CapabilityMissing {
            capability: "IdentityProvider".to_string(),
            message: "required".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            CoreError::CapabilityMissing { ref capability, .. } if capability == "IdentityProvider"
        ));
    }
}
