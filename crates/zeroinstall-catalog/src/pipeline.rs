//! Per-entry pipeline: documents in, one decision out.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::aggregate::decide;
use crate::catalog::CatalogEntry;
use crate::classify::classify_all;
use crate::dedup::deduplicate;
use crate::extract::{drafts_from_candidate, extract_config_drafts};
use crate::known_remotes::{KnownRemotes, apply_known_remote};
use crate::model::{Decision, Method, MethodDraft, MethodOrigin, ValidationTrail};
use crate::normalize::FlagKnowledge;
use crate::proposer::{CandidateProposer, ProposalRequest, interpret_output};
use crate::sources::{
    DocumentSource, MAX_PROPOSER_CONTEXT_CHARS, combine_documentation, truncate_chars,
};

pub const NO_DOCUMENTATION_REASON: &str = "No documentation found";

/// Read-only collaborators shared by every entry of a run.
pub struct Pipeline {
    kb: Arc<FlagKnowledge>,
    known_remotes: Arc<KnownRemotes>,
    source: Arc<dyn DocumentSource>,
    proposer: Arc<dyn CandidateProposer>,
}

impl Pipeline {
    pub fn new(
        kb: Arc<FlagKnowledge>,
        known_remotes: Arc<KnownRemotes>,
        source: Arc<dyn DocumentSource>,
        proposer: Arc<dyn CandidateProposer>,
    ) -> Self {
        Self {
            kb,
            known_remotes,
            source,
            proposer,
        }
    }

    /// Run every stage for `entry`. Collaborator failures end up in the
    /// trail; this never returns an error.
    pub async fn process_entry(&self, entry: &CatalogEntry) -> Decision {
        let mut trail = ValidationTrail::new();
        let remote = self.known_remotes.lookup(&entry.name, &entry.repository_url);

        let docs = match self.source.fetch(entry).await {
            Ok(docs) => docs,
            Err(e) => {
                warn!("document fetch failed for {}: {}", entry.name, e);
                trail.failed(format!("Document fetch via {} failed: {}", self.source.name(), e));
                Default::default()
            }
        };

        let mut methods: Vec<Method> = Vec::new();
        if docs.is_empty() {
            trail.info("No documentation found");
            if remote.is_none() {
                return Decision::delete(NO_DOCUMENTATION_REASON, trail);
            }
        } else {
            let names: Vec<&str> = docs.keys().map(String::as_str).collect();
            trail.info(format!("Documents: {}", names.join(", ")));
            let combined = combine_documentation(&docs);
            methods = self.config_fast_path(&combined, &mut trail);
            if methods.is_empty() {
                methods = self.proposer_path(entry, &combined, &mut trail).await;
            }
        }

        if let Some(remote) = remote {
            apply_known_remote(&mut methods, remote, &self.kb, &mut trail);
        }

        let methods = deduplicate(methods, &self.kb, &mut trail);
        let decision = decide(methods, trail);
        info!(
            "{}: {} ({} methods)",
            entry.name,
            decision.action,
            decision.methods.len()
        );
        decision
    }

    fn config_fast_path(&self, combined: &str, trail: &mut ValidationTrail) -> Vec<Method> {
        let drafts = extract_config_drafts(combined);
        if drafts.is_empty() {
            return Vec::new();
        }
        trail.info(format!("Found {} server configurations in documentation", drafts.len()));
        let methods = classify_all(&drafts, &self.kb, trail);
        if !methods.is_empty() {
            debug!("config fast path produced {} methods", methods.len());
        }
        methods
    }

    async fn proposer_path(
        &self,
        entry: &CatalogEntry,
        combined: &str,
        trail: &mut ValidationTrail,
    ) -> Vec<Method> {
        let request = ProposalRequest {
            server_name: entry.name.clone(),
            context: truncate_chars(combined, MAX_PROPOSER_CONTEXT_CHARS).to_string(),
        };
        let output = match self.proposer.propose(&request).await {
            Ok(output) => output,
            Err(e) => {
                warn!("proposer {} failed for {}: {}", self.proposer.name(), entry.name, e);
                trail.failed(format!("Proposer {} failed: {}", self.proposer.name(), e));
                return Vec::new();
            }
        };
        if output.is_absent() {
            trail.info(format!("Proposer {} returned nothing", self.proposer.name()));
            return Vec::new();
        }

        let candidates = interpret_output(&output, &entry.name);
        let drafts: Vec<MethodDraft> = candidates
            .iter()
            .flat_map(|c| drafts_from_candidate(c, MethodOrigin::Proposer))
            .collect();
        trail.info(format!(
            "Proposer {} suggested {} candidates",
            self.proposer.name(),
            drafts.len()
        ));
        classify_all(&drafts, &self.kb, trail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::NO_METHODS_REASON;
    use crate::error::CatalogError;
    use crate::known_remotes::load_default;
    use crate::model::{Action, MethodType, ProposerOutput, Registry, Runtime, TrailKind};
    use crate::proposer::{NullProposer, ScriptedProposer};
    use crate::sources::StaticSource;
    use serde_json::json;

    fn entry(id: &str, name: &str) -> CatalogEntry {
        CatalogEntry {
            id: id.into(),
            name: name.into(),
            repository_url: String::new(),
            language: None,
            stars: None,
        }
    }

    fn pipeline(source: StaticSource, proposer: Arc<dyn CandidateProposer>) -> Pipeline {
        Pipeline::new(
            Arc::new(FlagKnowledge::builtin()),
            Arc::new(load_default()),
            Arc::new(source),
            proposer,
        )
    }

    #[tokio::test]
    async fn json_fast_path_skips_proposer() {
        let readme = "# Demo\n\n```json\n{\"mcpServers\": {\"demo\": {\"command\":\"npx\", \"args\":[\"-y\",\"@org/demo\"]}}}\n```\n";
        let source = StaticSource::new().with_document("d", "README.md", readme);
        let proposer = Arc::new(ScriptedProposer::new());
        let p = pipeline(source, proposer.clone());

        let d = p.process_entry(&entry("d", "org/demo")).await;
        assert_eq!(d.action, Action::Keep);
        assert_eq!(d.methods.len(), 1);
        let m = &d.methods[0];
        assert_eq!(m.command, "npx -y @org/demo");
        assert_eq!(m.method_type, MethodType::Stdio);
        assert_eq!(m.registry, Registry::Npm);
        assert_eq!(m.runtime, Runtime::Npx);
        assert_eq!(m.package, "@org/demo");
        assert_eq!(m.deployment_score, 10);
        assert_eq!(proposer.calls(), 0);
    }

    #[tokio::test]
    async fn install_only_docs_are_deleted() {
        let readme = "## Install\n\n```\npip install demo && python -m demo\n```\n";
        let source = StaticSource::new().with_document("p", "README.md", readme);
        let proposer = Arc::new(ScriptedProposer::with_responses([Ok(ProposerOutput::Json(
            json!({
                "has_mcp_support": "YES",
                "raw_commands": ["pip install demo && python -m demo"],
                "methods": [{"name": "demo", "command": "pip install demo && python -m demo",
                             "is_valid": "NO", "deployment_ease": 2}]
            }),
        ))]));
        let p = pipeline(source, proposer.clone());

        let d = p.process_entry(&entry("p", "demo")).await;
        assert_eq!(d.action, Action::Delete);
        assert_eq!(d.reason, NO_METHODS_REASON);
        assert!(d.methods.is_empty());
        assert!(d.trail.count(TrailKind::Rejected) >= 1);
        assert_eq!(proposer.calls(), 1);
    }

    #[tokio::test]
    async fn known_remote_is_always_offered() {
        let source =
            StaticSource::new().with_document("g", "README.md", "Build with `go build`.");
        let p = pipeline(source, Arc::new(NullProposer));

        let d = p.process_entry(&entry("g", "github/github-mcp-server")).await;
        assert_eq!(d.action, Action::Keep);
        let remote = d
            .methods
            .iter()
            .find(|m| m.method_type == MethodType::Http)
            .expect("http method");
        assert_eq!(remote.deployment_score, 10);
        assert_eq!(remote.command, "https://api.githubcopilot.com/mcp/");
        assert!(remote.env_vars.contains_key("GITHUB_PERSONAL_ACCESS_TOKEN"));
    }

    #[tokio::test]
    async fn known_remote_survives_missing_docs() {
        let p = pipeline(StaticSource::new(), Arc::new(NullProposer));
        let mut e = entry("g", "github");
        e.repository_url = "https://github.com/github/github-mcp-server".into();
        let d = p.process_entry(&e).await;
        assert_eq!(d.action, Action::Keep);
        assert_eq!(d.methods[0].registry, Registry::Remote);
    }

    #[tokio::test]
    async fn missing_docs_delete() {
        let p = pipeline(StaticSource::new(), Arc::new(NullProposer));
        let d = p.process_entry(&entry("x", "nothing")).await;
        assert_eq!(d.action, Action::Delete);
        assert_eq!(d.reason, NO_DOCUMENTATION_REASON);
    }

    #[tokio::test]
    async fn proposer_failure_falls_through_to_delete() {
        let source = StaticSource::new().with_document("f", "README.md", "no commands here");
        let proposer = Arc::new(ScriptedProposer::with_responses([Err(
            CatalogError::ProposerTimeout(std::time::Duration::from_secs(180)),
        )]));
        let p = pipeline(source, proposer);

        let d = p.process_entry(&entry("f", "flaky")).await;
        assert_eq!(d.action, Action::Delete);
        assert_eq!(d.reason, NO_METHODS_REASON);
        assert_eq!(d.trail.count(TrailKind::Failed), 1);
    }

    #[tokio::test]
    async fn proposer_text_is_scanned_and_deduplicated() {
        let source = StaticSource::new().with_document("t", "README.md", "see below");
        let text = "Run it with:\n$ npx -y pkg@1.2.3\nor\n$ npx -y pkg@latest\n";
        let proposer = Arc::new(ScriptedProposer::with_responses([Ok(ProposerOutput::Text(
            text.into(),
        ))]));
        let p = pipeline(source, proposer);

        let d = p.process_entry(&entry("t", "pkg")).await;
        assert_eq!(d.action, Action::Keep);
        assert_eq!(d.methods.len(), 1);
        assert_eq!(d.methods[0].command, "npx -y pkg@latest");
    }
}
