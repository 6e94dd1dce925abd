//! Integration tests for logging system

use async_trait::async_trait;
use bridge_traits::error::Result as SinkResult;
use bridge_traits::{LogEntry, LogLevel, LoggerSink};
use core_runtime::logging::{init_logging, redact_if_sensitive, LogFormat, LoggingConfig};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct CollectingSink {
    entries: Mutex<Vec<LogEntry>>,
}

#[async_trait]
impl LoggerSink for CollectingSink {
    async fn log(&self, entry: LogEntry) -> SinkResult<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }
}

// A global subscriber can be installed once per process, so every step that
// depends on it lives in this single test.
#[test]
fn test_init_logging_forwards_to_sink_once() {
    let sink = Arc::new(CollectingSink::default());
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Info)
        .with_logger_sink(sink.clone());

    init_logging(config.clone()).expect("first initialization succeeds");

    let email = "a@b.com";
    tracing::info!(
        target: "core_auth::bridge",
        email = %redact_if_sensitive("email", email),
        uid = "u1",
        "Sign-in succeeded"
    );
    tracing::debug!(target: "core_auth::bridge", "Below configured level");

    {
        let entries = sink.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "Sign-in succeeded");
        assert_eq!(entries[0].fields.get("email"), Some(&"a***@[REDACTED]".to_string()));
        assert_eq!(entries[0].fields.get("uid"), Some(&"u1".to_string()));
    }

    let second = init_logging(config);
    assert!(second.is_err());
    assert!(second.unwrap_err().to_string().contains("Failed to initialize logging"));
}

#[test]
fn test_redaction_of_provider_values() {
    assert_eq!(redact_if_sensitive("token", "tok123"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("id_token", "eyJhbGciOi"), "[REDACTED]");
    assert_eq!(
        redact_if_sensitive("post_body", "id_token=abc&providerId=google.com"),
        "[REDACTED]"
    );
    assert!(!redact_if_sensitive("email", "user@example.com").contains("example.com"));
    assert_eq!(redact_if_sensitive("uid", "u1"), "u1");
}
