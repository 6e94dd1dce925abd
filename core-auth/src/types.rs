use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Failure code published when the provider reports success but leaves the
/// token, email or uid empty.
pub const INCOMPLETE_PRINCIPAL: &str = "bridge/incomplete-principal";

/// Identifier of a single sign-in attempt.
///
/// Attempts are independent; the id only exists so the provider calls made
/// for one attempt can be correlated in traces.
///
/// ```
/// use core_auth::AttemptId;
///
/// let a = AttemptId::new();
/// let b = AttemptId::new();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttemptId(Uuid);

impl AttemptId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_principal_code() {
        assert_eq!(INCOMPLETE_PRINCIPAL, "bridge/incomplete-principal");
    }

    #[test]
    fn test_attempt_id_display_is_uuid() {
        let id = AttemptId::new();
        let parsed = Uuid::parse_str(&id.to_string()).unwrap();
        assert_eq!(&parsed, id.as_uuid());
    }
}
