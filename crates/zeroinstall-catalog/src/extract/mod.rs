//! Config block extractor: structured server configuration embedded in
//! documentation, recovered without consulting any oracle.

pub mod blocks;
pub mod server_config;

pub use blocks::*;
pub use server_config::*;

use crate::model::{MethodDraft, MethodOrigin, RawCandidate};

/// Lift any raw candidate into zero or more drafts.
pub fn drafts_from_candidate(candidate: &RawCandidate, origin: MethodOrigin) -> Vec<MethodDraft> {
    match candidate {
        RawCandidate::Config(doc) => drafts_from_config(doc, origin),
        RawCandidate::Command(cmd) if !cmd.trim().is_empty() => {
            vec![MethodDraft::with_command(origin, cmd.trim())]
        }
        RawCandidate::Command(_) => Vec::new(),
        RawCandidate::Guess(draft) => vec![draft.clone()],
    }
}

/// Every server configuration found in `text`, in block order.
pub fn extract_config_drafts(text: &str) -> Vec<MethodDraft> {
    extract_config_blocks(text)
        .iter()
        .flat_map(|c| drafts_from_candidate(c, MethodOrigin::ConfigBlock))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_path_document() {
        let text = "# Demo\n\n```json\n{\"mcpServers\": {\"demo\": {\"command\":\"npx\", \"args\":[\"-y\",\"@org/demo\"]}}}\n```\n";
        let drafts = extract_config_drafts(text);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].command.as_deref(), Some("npx -y @org/demo"));
        assert_eq!(drafts[0].origin, MethodOrigin::ConfigBlock);
    }

    #[test]
    fn plain_prose_yields_nothing() {
        assert!(extract_config_drafts("pip install demo && python -m demo").is_empty());
    }

    #[test]
    fn blank_commands_are_dropped() {
        let c = RawCandidate::Command("   ".into());
        assert!(drafts_from_candidate(&c, MethodOrigin::Proposer).is_empty());
    }
}
