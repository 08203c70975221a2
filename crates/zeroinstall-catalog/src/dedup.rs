//! Deduplicator: one representative per package/image/endpoint identity.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::infer::package::{
    docker_image, npm_package, pypi_package, strip_image_tag, strip_npm_version,
    strip_pypi_version,
};
use crate::model::{Method, ValidationTrail};
use crate::normalize::{FlagKnowledge, ToolKind};

static PINNED_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@\d+\.\d+\.\d+").expect("pinned version regex"));

const WINDOWS_WRAPPERS: [&str; 2] = ["cmd /c ", "cmd.exe /c "];

/// Command with any Windows `cmd /c` wrapper removed.
pub fn strip_wrapper(command: &str) -> &str {
    let trimmed = command.trim();
    for w in WINDOWS_WRAPPERS {
        if trimmed
            .get(..w.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(w))
        {
            return trimmed[w.len()..].trim_start();
        }
    }
    trimmed
}

/// Identity used to group equivalent methods.
pub fn method_key(method: &Method, kb: &FlagKnowledge) -> String {
    let clean = strip_wrapper(&method.command);
    if method.method_type.is_remote() || clean.contains("http://") || clean.contains("https://") {
        return format!("http:{}", clean);
    }
    let tokens: Vec<&str> = clean.split_whitespace().collect();
    match ToolKind::detect(&tokens) {
        ToolKind::Npx => {
            if let Some(pkg) = npm_package(clean, kb) {
                return format!("npm:{}", strip_npm_version(&pkg));
            }
        }
        ToolKind::Docker if tokens.get(1) == Some(&"run") => {
            if let Some(image) = docker_image(clean, kb) {
                return format!("docker:{}", strip_image_tag(&image));
            }
        }
        ToolKind::Uvx => {
            if let Some(pkg) = pypi_package(clean, kb) {
                return format!("uvx:{}", strip_pypi_version(&pkg));
            }
        }
        _ => {}
    }
    format!("{}:{}", method.method_type, clean)
}

/// Preference within a group; higher wins.
pub fn score_method(command: &str) -> i32 {
    let cmd = command.trim();
    let mut score = 0;

    if PINNED_VERSION.is_match(cmd) {
        score -= 5;
    } else if cmd.contains("@latest") {
        score += 10;
    } else {
        score += 15;
    }

    if cmd.contains("--node-options") {
        score -= 3;
    }
    if cmd.contains("--experimental") {
        score -= 2;
    }
    if WINDOWS_WRAPPERS
        .iter()
        .any(|w| cmd.to_ascii_lowercase().starts_with(w))
    {
        score -= 5;
    }

    if cmd.starts_with("npx -y ") && cmd.split_whitespace().count() <= 3 {
        score += 5;
    }
    if cmd.starts_with("docker run ") && cmd.contains("-i --rm") {
        score += 5;
    }
    score
}

/// Collapse `methods` to one per key. Groups keep first-seen order; ties go
/// to the earliest member.
pub fn deduplicate(
    methods: Vec<Method>,
    kb: &FlagKnowledge,
    trail: &mut ValidationTrail,
) -> Vec<Method> {
    let mut groups: Vec<(String, Vec<Method>)> = Vec::new();
    for m in methods {
        let key = method_key(&m, kb);
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(m),
            None => groups.push((key, vec![m])),
        }
    }

    let mut out = Vec::with_capacity(groups.len());
    for (key, members) in groups {
        let count = members.len();
        let mut best: Option<(i32, Method)> = None;
        for m in members {
            let s = score_method(&m.command);
            if best.as_ref().is_none_or(|(bs, _)| s > *bs) {
                best = Some((s, m));
            }
        }
        let Some((_, winner)) = best else {
            continue;
        };
        if count > 1 {
            trail.info(format!(
                "Deduplicated {} similar methods ({}) to: {}",
                count, key, winner.command
            ));
        }
        out.push(winner);
    }
    out
}
