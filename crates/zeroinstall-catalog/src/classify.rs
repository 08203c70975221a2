//! Classifier: assigns the deployment score and applies the acceptance floor.

use crate::infer::{is_zero_install_command, normalize};
use crate::model::{Method, MethodDraft, MethodOrigin, ValidationTrail};
use crate::normalize::FlagKnowledge;

/// Lowest score that survives classification.
pub const SCORE_FLOOR: u8 = 9;

const ZERO_INSTALL_SCORE: u8 = 10;
const INSTALL_REQUIRED_SCORE: u8 = 1;

fn draft_label(draft: &MethodDraft) -> &str {
    draft.name.as_deref().unwrap_or("unknown")
}

/// Score a draft and return the normalized method if it passes.
///
/// Every decision is written to `trail`; rejections use the `Rejected` kind.
pub fn classify(draft: &MethodDraft, kb: &FlagKnowledge, trail: &mut ValidationTrail) -> Option<Method> {
    let command = draft.command_str();
    if command.is_empty() {
        trail.rejected(format!("{}: no command", draft_label(draft)));
        return None;
    }
    match draft.origin {
        MethodOrigin::ConfigBlock | MethodOrigin::KnownRemote => classify_structured(draft, kb, trail),
        MethodOrigin::Proposer => classify_proposed(draft, kb, trail),
    }
}

/// Structured configuration: the zero-install test alone decides.
fn classify_structured(
    draft: &MethodDraft,
    kb: &FlagKnowledge,
    trail: &mut ValidationTrail,
) -> Option<Method> {
    let command = draft.command_str();
    if !is_zero_install_command(command) {
        trail.rejected(format!(
            "{}: `{}` requires a local install step (score {})",
            draft_label(draft),
            command,
            INSTALL_REQUIRED_SCORE
        ));
        return None;
    }
    let mut scored = draft.clone();
    scored.deployment_score = Some(ZERO_INSTALL_SCORE);
    let method = normalize(&scored, kb);
    trail.accepted(format!(
        "{}: `{}` (score {})",
        method.label(),
        method.command,
        method.deployment_score
    ));
    Some(method)
}

/// Proposer guesses: the oracle may veto, never promote.
fn classify_proposed(
    draft: &MethodDraft,
    kb: &FlagKnowledge,
    trail: &mut ValidationTrail,
) -> Option<Method> {
    let command = draft.command_str();
    if let Some(verdict) = &draft.verdict {
        if verdict.is_valid == Some(false) {
            trail.rejected(format!(
                "{}: marked invalid by proposer ({})",
                draft_label(draft),
                verdict.issues.as_deref().unwrap_or("no reason given")
            ));
            return None;
        }
        if let Some(score) = verdict.score
            && score < SCORE_FLOOR
        {
            trail.rejected(format!(
                "{}: proposer score {} below floor {}",
                draft_label(draft),
                score,
                SCORE_FLOOR
            ));
            return None;
        }
    }

    let score = if is_zero_install_command(command) {
        ZERO_INSTALL_SCORE
    } else {
        INSTALL_REQUIRED_SCORE
    };
    if score < SCORE_FLOOR {
        trail.rejected(format!(
            "{}: `{}` scored {} below floor {}",
            draft_label(draft),
            command,
            score,
            SCORE_FLOOR
        ));
        return None;
    }

    let mut scored = draft.clone();
    scored.deployment_score = Some(score);
    let method = normalize(&scored, kb);
    trail.accepted(format!(
        "{}: `{}` (score {})",
        method.label(),
        method.command,
        method.deployment_score
    ));
    Some(method)
}

/// Classify every draft, keeping survivors in input order.
pub fn classify_all(
    drafts: &[MethodDraft],
    kb: &FlagKnowledge,
    trail: &mut ValidationTrail,
) -> Vec<Method> {
    drafts
        .iter()
        .filter_map(|d| classify(d, kb, trail))
        .collect()
}
