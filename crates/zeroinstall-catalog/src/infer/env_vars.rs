//! Environment-variable discovery from command strings and header templates.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::policy::{infer_env_var_name, is_system_env_var, likely_needs_env_var};
use crate::normalize::{FlagKnowledge, ToolKind, parse_command};

static BRACED_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("braced env ref regex"));
static BARE_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([A-Z_][A-Z_0-9]*)").expect("bare env ref regex"));

/// Strip the `input:` prefix used by editor configs (`${input:github_token}`).
fn ref_name(raw: &str) -> &str {
    raw.strip_prefix("input:").unwrap_or(raw).trim()
}

/// `${VAR}` / `$VAR` references in `text`, in order of appearance.
pub fn env_references(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let braced = BRACED_REF.captures_iter(text).map(|c| c[1].to_string());
    let bare = BARE_REF.captures_iter(text).map(|c| c[1].to_string());
    for raw in braced.chain(bare) {
        let name = ref_name(&raw);
        if name.is_empty() || is_system_env_var(name) {
            continue;
        }
        if !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    }
    out
}

/// Environment variables implied by `command`.
///
/// Union of Docker `-e`/`--env` names, configurable flags whose value should
/// come from the environment, and explicit `${VAR}`/`$VAR` references. Later
/// sources overwrite the description of an earlier one.
pub fn extract_env_vars(command: &str, kb: &FlagKnowledge) -> BTreeMap<String, String> {
    let mut env_vars = BTreeMap::new();
    if command.trim().is_empty() {
        return env_vars;
    }
    let parsed = parse_command(command, kb);

    if parsed.tool == ToolKind::Docker {
        let mut i = 0;
        while i < parsed.args.len() {
            let arg = parsed.args[i].as_str();
            if (arg == "-e" || arg == "--env") && i + 1 < parsed.args.len() {
                let raw = parsed.args[i + 1].as_str();
                let name = raw.split('=').next().unwrap_or(raw);
                if !name.is_empty() && !name.starts_with('-') {
                    env_vars.insert(name.to_string(), "Docker environment variable".to_string());
                }
                i += 2;
            } else {
                i += 1;
            }
        }
    }

    for param in &parsed.params {
        // values that already reference a variable are covered below
        if let Some(value) = &param.value
            && env_references(value).is_empty()
            && likely_needs_env_var(&param.flag, value)
        {
            env_vars.insert(
                infer_env_var_name(&param.flag, value),
                format!("Configuration for {} parameter", param.flag),
            );
        }
    }

    for name in env_references(command) {
        env_vars.insert(name, "Environment variable reference".to_string());
    }

    env_vars
}

/// Env vars referenced by HTTP header templates.
pub fn header_env_vars(headers: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for (header, value) in headers {
        for name in env_references(value) {
            out.entry(name)
                .or_insert_with(|| format!("Required for {} header authentication", header));
        }
    }
    out
}
