//! # Bridge Configuration Module
//!
//! Provider descriptor and bridge configuration.
//!
//! ## Overview
//!
//! [`FirebaseConfig`] is the static descriptor issued by the hosted
//! authentication service. Its values are opaque identifiers: the bridge only
//! checks that the required ones are present and hands them to the provider.
//!
//! [`BridgeConfig`] bundles the descriptor with the injected
//! [`IdentityProvider`] and the notification buffer size. It is built through
//! [`BridgeConfigBuilder`], which fails fast with an actionable message when a
//! required capability is missing.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{BridgeConfig, FirebaseConfig};
//! use std::sync::Arc;
//!
//! let firebase = FirebaseConfig::from_env()?;
//! let config = BridgeConfig::builder()
//!     .firebase(firebase)
//!     .identity_provider(Arc::new(MyProvider))
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::{BridgeConfig, FirebaseConfig};
//!
//! // No identity provider injected
//! let config = BridgeConfig::builder()
//!     .firebase(FirebaseConfig::new("key", "demo.firebaseapp.com", "demo", "1:1:web:1"))
//!     .build()
//!     .expect("Should fail - missing identity provider");
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::IdentityProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Upper bound for the notification buffer.
pub const MAX_EVENT_BUFFER_SIZE: usize = 10_000;

/// Environment variable names read by [`FirebaseConfig::from_env`].
pub mod env {
    pub const API_KEY: &str = "FIREBASE_API_KEY";
    pub const AUTH_DOMAIN: &str = "FIREBASE_AUTH_DOMAIN";
    pub const PROJECT_ID: &str = "FIREBASE_PROJECT_ID";
    pub const STORAGE_BUCKET: &str = "FIREBASE_STORAGE_BUCKET";
    pub const MESSAGING_SENDER_ID: &str = "FIREBASE_MESSAGING_SENDER_ID";
    pub const APP_ID: &str = "FIREBASE_APP_ID";
    pub const MEASUREMENT_ID: &str = "FIREBASE_MEASUREMENT_ID";
}

/// Static provider descriptor.
///
/// Field names serialize in camelCase so the descriptor can be pasted
/// straight from the hosting console:
///
/// ```
/// use core_runtime::config::FirebaseConfig;
///
/// let config = FirebaseConfig::from_json(r#"{
///     "apiKey": "AIzaSyExample",
///     "authDomain": "demo.firebaseapp.com",
///     "projectId": "demo",
///     "storageBucket": "demo.appspot.com",
///     "messagingSenderId": "1234567890",
///     "appId": "1:1234567890:web:abcdef",
///     "measurementId": "G-ABCDEF"
/// }"#).unwrap();
///
/// assert_eq!(config.project_id, "demo");
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messaging_sender_id: Option<String>,
    pub app_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement_id: Option<String>,
}

impl FirebaseConfig {
    /// Creates a descriptor from the four required identifiers.
    pub fn new(
        api_key: impl Into<String>,
        auth_domain: impl Into<String>,
        project_id: impl Into<String>,
        app_id: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            auth_domain: auth_domain.into(),
            project_id: project_id.into(),
            storage_bucket: None,
            messaging_sender_id: None,
            app_id: app_id.into(),
            measurement_id: None,
        }
    }

    pub fn with_storage_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.storage_bucket = Some(bucket.into());
        self
    }

    pub fn with_messaging_sender_id(mut self, sender_id: impl Into<String>) -> Self {
        self.messaging_sender_id = Some(sender_id.into());
        self
    }

    pub fn with_measurement_id(mut self, measurement_id: impl Into<String>) -> Self {
        self.measurement_id = Some(measurement_id.into());
        self
    }

    /// Parses and validates a JSON descriptor.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid provider descriptor: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the descriptor from `FIREBASE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the descriptor from an arbitrary key lookup.
    ///
    /// Empty values are treated as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required =
            |key: &str, field: &'static str| get(key).ok_or(Error::MissingField { field });

        let config = Self {
            api_key: required(env::API_KEY, "apiKey")?,
            auth_domain: required(env::AUTH_DOMAIN, "authDomain")?,
            project_id: required(env::PROJECT_ID, "projectId")?,
            storage_bucket: get(env::STORAGE_BUCKET),
            messaging_sender_id: get(env::MESSAGING_SENDER_ID),
            app_id: required(env::APP_ID, "appId")?,
            measurement_id: get(env::MEASUREMENT_ID),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that every required identifier is present.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("apiKey", &self.api_key),
            ("authDomain", &self.auth_domain),
            ("projectId", &self.project_id),
            ("appId", &self.app_id),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::MissingField { field });
            }
        }

        if self.auth_domain.contains("://") || self.auth_domain.contains('/') {
            return Err(Error::Config(format!(
                "authDomain must be a bare host name (got `{}`)",
                self.auth_domain
            )));
        }

        Ok(())
    }
}

impl fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("api_key", &"[REDACTED]")
            .field("auth_domain", &self.auth_domain)
            .field("project_id", &self.project_id)
            .field("storage_bucket", &self.storage_bucket)
            .field("messaging_sender_id", &self.messaging_sender_id)
            .field("app_id", &self.app_id)
            .field("measurement_id", &self.measurement_id)
            .finish()
    }
}

/// Everything the bridge needs at start-up.
#[derive(Clone)]
pub struct BridgeConfig {
    /// Provider descriptor
    pub firebase: FirebaseConfig,

    /// Identity provider the bridge drives (required)
    pub identity_provider: Arc<dyn IdentityProvider>,

    /// Notifications buffered per subscriber before it lags
    pub event_buffer_size: usize,
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("firebase", &self.firebase)
            .field("identity_provider", &"IdentityProvider { ... }")
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl BridgeConfig {
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        self.firebase.validate()?;

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer_size > MAX_EVENT_BUFFER_SIZE {
            return Err(Error::Config(format!(
                "Event buffer size exceeds maximum of {}",
                MAX_EVENT_BUFFER_SIZE
            )));
        }

        Ok(())
    }
}

fn identity_provider_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "IdentityProvider".to_string(),
        message: "An IdentityProvider implementation is required to run sign-in. \
                 Desktop: enable the 'desktop-shims' feature and use bootstrap_firebase with a CredentialSource. \
                 Web: construct JsAuthBridge with the hosted SDK's auth object. \
                 Tests: inject a fake provider."
            .to_string(),
    }
}

/// Builder for [`BridgeConfig`].
#[derive(Default)]
pub struct BridgeConfigBuilder {
    firebase: Option<FirebaseConfig>,
    identity_provider: Option<Arc<dyn IdentityProvider>>,
    event_buffer_size: Option<usize>,
}

impl BridgeConfigBuilder {
    /// Sets the provider descriptor (required).
    pub fn firebase(mut self, config: FirebaseConfig) -> Self {
        self.firebase = Some(config);
        self
    }

    /// Sets the identity provider (required).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use core_runtime::config::BridgeConfig;
    /// use std::sync::Arc;
    /// # use bridge_traits::{IdentityProvider, Principal, ProviderError};
    /// # struct MyProvider;
    /// # #[async_trait::async_trait]
    /// # impl IdentityProvider for MyProvider {
    /// #     async fn sign_in_interactive(&self) -> Result<Principal, ProviderError> { unimplemented!() }
    /// #     async fn id_token(&self, _p: &Principal) -> Result<String, ProviderError> { unimplemented!() }
    /// #     async fn sign_out(&self) -> Result<(), ProviderError> { unimplemented!() }
    /// # }
    ///
    /// let builder = BridgeConfig::builder()
    ///     .identity_provider(Arc::new(MyProvider));
    /// ```
    pub fn identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity_provider = Some(provider);
        self
    }

    /// Sets the notification buffer size.
    ///
    /// Default: 100
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// - `Error::Config` when the descriptor is missing or the buffer size is
    ///   out of range
    /// - `Error::MissingField` when a required descriptor value is empty
    /// - `Error::CapabilityMissing` when no identity provider was injected
    pub fn build(self) -> Result<BridgeConfig> {
        let firebase = self.firebase.ok_or_else(|| {
            Error::Config(
                "Provider descriptor is required. Use .firebase() to set it.".to_string(),
            )
        })?;

        let identity_provider = self
            .identity_provider
            .ok_or_else(identity_provider_missing_error)?;

        let config = BridgeConfig {
            firebase,
            identity_provider,
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::{Principal, ProviderError};
    use std::collections::HashMap;

    struct NoopProvider;

    #[async_trait]
    impl IdentityProvider for NoopProvider {
        async fn sign_in_interactive(&self) -> std::result::Result<Principal, ProviderError> {
            Err(ProviderError::internal("not used"))
        }

        async fn id_token(
            &self,
            _principal: &Principal,
        ) -> std::result::Result<String, ProviderError> {
            Err(ProviderError::internal("not used"))
        }

        async fn sign_out(&self) -> std::result::Result<(), ProviderError> {
            Ok(())
        }
    }

    fn descriptor() -> FirebaseConfig {
        FirebaseConfig::new(
            "AIzaSyExample",
            "demo.firebaseapp.com",
            "demo",
            "1:1234567890:web:abcdef",
        )
    }

    #[test]
    fn test_descriptor_json_uses_camel_case() {
        let config = descriptor()
            .with_storage_bucket("demo.appspot.com")
            .with_messaging_sender_id("1234567890")
            .with_measurement_id("G-ABCDEF");

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["apiKey"], "AIzaSyExample");
        assert_eq!(json["authDomain"], "demo.firebaseapp.com");
        assert_eq!(json["messagingSenderId"], "1234567890");
        assert_eq!(json["measurementId"], "G-ABCDEF");
    }

    #[test]
    fn test_from_json_optional_fields() {
        let config = FirebaseConfig::from_json(
            r#"{"apiKey":"k","authDomain":"demo.firebaseapp.com","projectId":"demo","appId":"1:1:web:1"}"#,
        )
        .unwrap();
        assert!(config.storage_bucket.is_none());
        assert!(config.measurement_id.is_none());
    }

    #[test]
    fn test_from_json_rejects_empty_required_field() {
        let err = FirebaseConfig::from_json(
            r#"{"apiKey":"","authDomain":"demo.firebaseapp.com","projectId":"demo","appId":"1:1:web:1"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingField { field: "apiKey" }));
    }

    #[test]
    fn test_from_json_rejects_malformed_input() {
        let err = FirebaseConfig::from_json("{not json").unwrap_err();
        assert!(err.to_string().contains("Invalid provider descriptor"));
    }

    #[test]
    fn test_from_lookup_reads_all_variables() {
        let vars: HashMap<&str, &str> = [
            (env::API_KEY, "AIzaSyExample"),
            (env::AUTH_DOMAIN, "demo.firebaseapp.com"),
            (env::PROJECT_ID, "demo"),
            (env::STORAGE_BUCKET, "demo.appspot.com"),
            (env::MESSAGING_SENDER_ID, ""),
            (env::APP_ID, "1:1234567890:web:abcdef"),
            (env::MEASUREMENT_ID, "G-ABCDEF"),
        ]
        .into_iter()
        .collect();

        let config =
            FirebaseConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.project_id, "demo");
        assert_eq!(config.storage_bucket.as_deref(), Some("demo.appspot.com"));
        assert!(config.messaging_sender_id.is_none());
        assert_eq!(config.measurement_id.as_deref(), Some("G-ABCDEF"));
    }

    #[test]
    fn test_from_lookup_reports_missing_variable() {
        let err = FirebaseConfig::from_lookup(|key| {
            (key != env::AUTH_DOMAIN).then(|| "value".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("authDomain"));
    }

    #[test]
    fn test_validate_rejects_auth_domain_with_scheme() {
        let mut config = descriptor();
        config.auth_domain = "https://demo.firebaseapp.com".to_string();
        assert!(config.validate().unwrap_err().to_string().contains("bare host"));
    }

    #[test]
    fn test_descriptor_debug_redacts_api_key() {
        let debug_str = format!("{:?}", descriptor());
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("AIzaSyExample"));
        assert!(debug_str.contains("demo.firebaseapp.com"));
    }

    #[test]
    fn test_builder_requires_firebase() {
        let result = BridgeConfig::builder()
            .identity_provider(Arc::new(NoopProvider))
            .build();

        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Provider descriptor is required"));
    }

    #[test]
    fn test_builder_requires_identity_provider() {
        let result = BridgeConfig::builder().firebase(descriptor()).build();

        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("IdentityProvider"));
        assert!(err_msg.contains("desktop-shims"));
    }

    #[test]
    fn test_builder_defaults() {
        let config = BridgeConfig::builder()
            .firebase(descriptor())
            .identity_provider(Arc::new(NoopProvider))
            .build()
            .unwrap();

        assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
        assert_eq!(config.firebase.project_id, "demo");
    }

    #[test]
    fn test_builder_rejects_zero_buffer() {
        let result = BridgeConfig::builder()
            .firebase(descriptor())
            .identity_provider(Arc::new(NoopProvider))
            .event_buffer_size(0)
            .build();

        assert!(result
            .unwrap_err()
            .to_string()
            .contains("must be greater than 0"));
    }

    #[test]
    fn test_builder_rejects_excessive_buffer() {
        let result = BridgeConfig::builder()
            .firebase(descriptor())
            .identity_provider(Arc::new(NoopProvider))
            .event_buffer_size(MAX_EVENT_BUFFER_SIZE + 1)
            .build();

        assert!(result.unwrap_err().to_string().contains("exceeds maximum"));
    }

    #[test]
    fn test_config_debug_hides_provider() {
        let config = BridgeConfig::builder()
            .firebase(descriptor())
            .identity_provider(Arc::new(NoopProvider))
            .build()
            .unwrap();

        let debug_str = format!("{:?}", config);
        assert!(debug_str.contains("IdentityProvider { ... }"));
        assert!(!debug_str.contains("AIzaSyExample"));
    }
}
