//! Session Identity
//!
//! Opaque session tokens shared by the conversation store and the tools.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh token (32 lowercase hex characters)
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Use a caller-supplied token, or generate one when it is absent or blank
    pub fn resolve(token: Option<&str>) -> Self {
        match token.map(str::trim) {
            Some(t) if !t.is_empty() => Self::from_string(t),
            _ => Self::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
