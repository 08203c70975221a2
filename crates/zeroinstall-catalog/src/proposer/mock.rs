//! Scripted proposer for tests and dry runs.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

use super::{CandidateProposer, ProposalRequest};
use crate::error::Result;
use crate::model::ProposerOutput;

/// Answers with queued responses in order, then `Absent`.
#[derive(Default)]
pub struct ScriptedProposer {
    responses: Mutex<VecDeque<Result<ProposerOutput>>>,
    calls: AtomicUsize,
}

impl ScriptedProposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses(responses: impl IntoIterator<Item = Result<ProposerOutput>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CandidateProposer for ScriptedProposer {
    async fn propose(&self, _request: &ProposalRequest) -> Result<ProposerOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or(Ok(ProposerOutput::Absent))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
