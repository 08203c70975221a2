//! Decision aggregator.
//!
//! Survivors of deduplication are kept verbatim. There is no second ranking
//! pass over them.

use crate::classify::SCORE_FLOOR;
use crate::model::{Decision, Method, ValidationTrail};

pub const NO_METHODS_REASON: &str = "No zero-installation methods available.";

pub fn decide(methods: Vec<Method>, mut trail: ValidationTrail) -> Decision {
    let methods: Vec<Method> = methods
        .into_iter()
        .filter(|m| m.deployment_score >= SCORE_FLOOR && !m.command.trim().is_empty())
        .collect();
    if methods.is_empty() {
        trail.info(format!("Decision: delete ({})", NO_METHODS_REASON));
        return Decision::delete(NO_METHODS_REASON, trail);
    }
    let labels: Vec<String> = methods
        .iter()
        .map(|m| format!("{} ({})", m.label(), m.method_type))
        .collect();
    trail.info(format!("Decision: keep {}", labels.join(", ")));
    Decision::keep(methods, trail)
}
