//! Keep/delete decisions and the audit trail that accompanies them.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Method;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Keep,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Keep => f.write_str("keep"),
            Action::Delete => f.write_str("delete"),
        }
    }
}

/// Classification of a trail line. `Rejected` is the expected negative path;
/// `Failed` marks something that went wrong (parse error, oracle outage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailKind {
    Info,
    Accepted,
    Rejected,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailEntry {
    pub kind: TrailKind,
    pub message: String,
}

/// Ordered, append-only record of every accept/reject made for one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationTrail {
    entries: Vec<TrailEntry>,
}

impl ValidationTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: TrailKind, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(kind = ?kind, "{}", message);
        self.entries.push(TrailEntry { kind, message });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(TrailKind::Info, message);
    }

    pub fn accepted(&mut self, message: impl Into<String>) {
        self.push(TrailKind::Accepted, message);
    }

    pub fn rejected(&mut self, message: impl Into<String>) {
        self.push(TrailKind::Rejected, message);
    }

    pub fn failed(&mut self, message: impl Into<String>) {
        self.push(TrailKind::Failed, message);
    }

    pub fn entries(&self) -> &[TrailEntry] {
        &self.entries
    }

    pub fn count(&self, kind: TrailKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render one line per entry, prefixed by its kind.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|e| {
                let tag = match e.kind {
                    TrailKind::Info => "INFO",
                    TrailKind::Accepted => "ACCEPT",
                    TrailKind::Rejected => "REJECT",
                    TrailKind::Failed => "FAIL",
                };
                format!("[{}] {}", tag, e.message)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Final outcome for one catalog entry. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub action: Action,
    pub reason: String,
    pub methods: Vec<Method>,
    #[serde(default)]
    pub trail: ValidationTrail,
}

impl Decision {
    pub fn keep(methods: Vec<Method>, trail: ValidationTrail) -> Self {
        Self {
            action: Action::Keep,
            reason: format!("Found {} zero-installation methods", methods.len()),
            methods,
            trail,
        }
    }

    pub fn delete(reason: impl Into<String>, trail: ValidationTrail) -> Self {
        Self {
            action: Action::Delete,
            reason: reason.into(),
            methods: Vec::new(),
            trail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trail_distinguishes_rejection_from_failure() {
        let mut t = ValidationTrail::new();
        t.rejected("pip install demo requires an install step");
        t.failed("oracle timed out");
        t.info("done");
        assert_eq!(t.count(TrailKind::Rejected), 1);
        assert_eq!(t.count(TrailKind::Failed), 1);
        let text = t.render();
        assert!(text.starts_with("[REJECT] pip install"));
        assert!(text.contains("\n[FAIL] oracle timed out\n"));
    }

    #[test]
    fn keep_reason_states_count() {
        let d = Decision::keep(Vec::new(), ValidationTrail::new());
        assert_eq!(d.reason, "Found 0 zero-installation methods");
        assert_eq!(d.action, Action::Keep);
    }
}
