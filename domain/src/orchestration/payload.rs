//! Orchestrator invocation payload
//!
//! Frameworks disagree on the key that carries the query. The caller picks
//! one with [`PayloadKey::negotiate`], preferring `messages` with a single
//! `user` turn, then `input`, `query`, `question`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Key under which the query travels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKey {
    Messages,
    Input,
    Query,
    Question,
}

impl PayloadKey {
    /// Most forward-compatible first
    pub const PREFERENCE: [PayloadKey; 4] = [
        PayloadKey::Messages,
        PayloadKey::Input,
        PayloadKey::Query,
        PayloadKey::Question,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadKey::Messages => "messages",
            PayloadKey::Input => "input",
            PayloadKey::Query => "query",
            PayloadKey::Question => "question",
        }
    }

    /// Best key among those an orchestrator accepts
    pub fn negotiate(accepted: &[PayloadKey]) -> Option<PayloadKey> {
        Self::PREFERENCE
            .into_iter()
            .find(|key| accepted.contains(key))
    }
}

impl fmt::Display for PayloadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One query, addressed with a negotiated key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationPayload {
    key: PayloadKey,
    query: String,
}

impl InvocationPayload {
    pub fn new(key: PayloadKey, query: impl Into<String>) -> Self {
        Self {
            key,
            query: query.into(),
        }
    }

    pub fn key(&self) -> PayloadKey {
        self.key
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Wire form: `{"messages": [{"role": "user", "content": q}]}` or
    /// `{"<key>": q}`.
    pub fn to_value(&self) -> Value {
        match self.key {
            PayloadKey::Messages => json!({
                "messages": [{"role": "user", "content": self.query}]
            }),
            other => json!({ (other.as_str()): self.query }),
        }
    }
}
