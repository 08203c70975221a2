//! Untrusted evidence units and the proposer's untyped payload.

use serde_json::Value as JsonValue;

use super::MethodDraft;

/// Raw answer from a candidate proposer. Nothing about its shape is guaranteed.
#[derive(Debug, Clone, PartialEq)]
pub enum ProposerOutput {
    Json(JsonValue),
    Text(String),
    Absent,
}

impl ProposerOutput {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// One piece of evidence suggesting an invocation method.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCandidate {
    /// A JSON document believed to carry a server collection.
    Config(JsonValue),
    /// A bare command string.
    Command(String),
    /// A method-shaped guess, already lifted into a draft.
    Guess(MethodDraft),
}
