//! Bootstrapping the bridge and driving it through the host handle.

use async_trait::async_trait;
use bridge_traits::identity::codes;
use bridge_traits::{
    CredentialSource, GoogleCredential, IdentityProvider, Principal, ProviderError,
};
use core_service::{
    bootstrap, BridgeConfig, CoreError, FirebaseConfig, HostNotification, SignInInfo,
};
use mockall::mock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

fn firebase_config() -> FirebaseConfig {
    FirebaseConfig::new("test-key", "demo.firebaseapp.com", "demo", "1:1:web:1")
}

#[derive(Default)]
struct FixedProvider {
    sign_outs: AtomicUsize,
}

#[async_trait]
impl IdentityProvider for FixedProvider {
    async fn sign_in_interactive(&self) -> Result<Principal, ProviderError> {
        Ok(Principal::new("u1").with_email("a@b.com"))
    }

    async fn id_token(&self, _principal: &Principal) -> Result<String, ProviderError> {
        Ok("tok123".to_string())
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

mock! {
    Consent {}

    #[async_trait]
    impl CredentialSource for Consent {
        async fn obtain_google_credential(&self) -> Result<GoogleCredential, ProviderError>;
    }
}

#[tokio::test]
async fn test_sign_in_through_handle() {
    let config = BridgeConfig::builder()
        .firebase(firebase_config())
        .identity_provider(Arc::new(FixedProvider::default()))
        .build()
        .unwrap();

    let mut handle = bootstrap(config).unwrap();
    assert_eq!(handle.provider_config().project_id, "demo");

    handle.request_sign_in().unwrap();

    let notification = timeout(WAIT, handle.next_outcome()).await.unwrap().unwrap();
    assert_eq!(
        notification,
        HostNotification::SignInSucceeded(SignInInfo {
            token: "tok123".to_string(),
            email: "a@b.com".to_string(),
            uid: "u1".to_string(),
        })
    );
}

#[tokio::test]
async fn test_sign_out_through_handle_publishes_nothing() {
    let provider = Arc::new(FixedProvider::default());
    let config = BridgeConfig::builder()
        .firebase(firebase_config())
        .identity_provider(provider.clone())
        .build()
        .unwrap();

    let mut handle = bootstrap(config).unwrap();
    let mut observer = handle.subscribe();
    handle.intents().request_sign_out().unwrap();

    timeout(WAIT, async {
        while provider.sign_outs.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();
    tokio::task::yield_now().await;

    assert_eq!(handle.try_next_outcome(), None);
    assert!(observer.try_recv().is_err());
}

#[tokio::test]
async fn test_handle_keeps_outcomes_past_event_buffer() {
    let config = BridgeConfig::builder()
        .firebase(firebase_config())
        .identity_provider(Arc::new(FixedProvider::default()))
        .event_buffer_size(1)
        .build()
        .unwrap();

    let mut handle = bootstrap(config).unwrap();
    let mut observer = handle.subscribe();
    handle.request_sign_in().unwrap();
    handle.request_sign_in().unwrap();
    handle.request_sign_in().unwrap();

    for _ in 0..3 {
        let notification = timeout(WAIT, handle.next_outcome()).await.unwrap().unwrap();
        assert!(notification.is_success());
    }
    assert_eq!(handle.try_next_outcome(), None);

    // The observer fell behind a one-slot bus
    assert!(matches!(
        observer.try_recv(),
        Err(core_service::TryRecvError::Lagged(_))
    ));
}

#[tokio::test]
async fn test_invalid_descriptor_is_rejected() {
    let mut firebase = firebase_config();
    firebase.api_key.clear();

    let config = BridgeConfig {
        firebase,
        identity_provider: Arc::new(FixedProvider::default()),
        event_buffer_size: 100,
    };

    let err = bootstrap(config).unwrap_err();
    assert!(matches!(err, CoreError::Config(ref msg) if msg.contains("apiKey")));
}

#[test]
fn test_bootstrap_outside_runtime_fails() {
    let config = BridgeConfig::builder()
        .firebase(firebase_config())
        .identity_provider(Arc::new(FixedProvider::default()))
        .build()
        .unwrap();

    let err = bootstrap(config).unwrap_err();
    assert!(matches!(err, CoreError::InitializationFailed(_)));
}

#[cfg(feature = "desktop-shims")]
#[tokio::test]
async fn test_firebase_bootstrap_forwards_consent_cancellation() {
    let mut consent = MockConsent::new();
    consent.expect_obtain_google_credential().times(1).returning(|| {
        Err(ProviderError::new(
            codes::POPUP_CLOSED_BY_USER,
            "The popup has been closed by the user before finalizing the operation.",
        ))
    });

    let mut handle =
        core_service::bootstrap_firebase(firebase_config(), Arc::new(consent)).unwrap();
    handle.request_sign_in().unwrap();

    match timeout(WAIT, handle.next_outcome()).await.unwrap().unwrap() {
        HostNotification::SignInFailed(err) => {
            assert_eq!(err.code, codes::POPUP_CLOSED_BY_USER);
        }
        other => panic!("Expected SignInFailed, got {:?}", other),
    }
}

#[cfg(feature = "desktop-shims")]
#[tokio::test]
async fn test_firebase_bootstrap_validates_descriptor() {
    let mut firebase = firebase_config();
    firebase.auth_domain = "https://demo.firebaseapp.com/".to_string();

    let err =
        core_service::bootstrap_firebase(firebase, Arc::new(MockConsent::new())).unwrap_err();
    assert!(matches!(err, CoreError::Config(_)));
}
