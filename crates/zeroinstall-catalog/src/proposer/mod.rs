//! Candidate proposers: unreliable oracles that suggest invocation methods
//! from documentation text.

pub mod mock;
pub mod ollama;
pub mod response;

pub use mock::ScriptedProposer;
pub use ollama::OllamaProposer;
pub use response::*;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::ProposerOutput;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalRequest {
    pub server_name: String,
    /// Combined documentation, already truncated to the proposer budget.
    pub context: String,
}

#[async_trait]
pub trait CandidateProposer: Send + Sync {
    async fn propose(&self, request: &ProposalRequest) -> Result<ProposerOutput>;

    fn name(&self) -> &str;
}

/// Proposer that never has an opinion.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProposer;

#[async_trait]
impl CandidateProposer for NullProposer {
    async fn propose(&self, _request: &ProposalRequest) -> Result<ProposerOutput> {
        Ok(ProposerOutput::Absent)
    }

    fn name(&self) -> &str {
        "none"
    }
}
