//! Locating JSON configuration blocks inside prose.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;

use crate::model::RawCandidate;

static FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json\s*\n(.*?)\n```").expect("fenced json regex"));
static FENCED_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```\s*\n(\{.*?\})\s*\n```").expect("fenced object regex"));
static BARE_SERVERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\{[^{}]*"servers"\s*:\s*\{"#).expect("bare servers regex"));

/// The balanced `{...}` span opening at byte `start`, string literals respected.
pub fn balanced_span(text: &str, start: usize) -> Option<&str> {
    let rest = text.get(start..)?;
    if !rest.starts_with('{') {
        return None;
    }
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in rest.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&rest[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// First balanced JSON object anywhere in `text`.
pub fn first_object_span(text: &str) -> Option<&str> {
    text.match_indices('{')
        .find_map(|(i, _)| balanced_span(text, i))
}

/// Candidate block texts in pattern order, identical texts reported once.
///
/// Fenced ```` ```json ```` blocks, generic fences holding a single object, and
/// bare objects carrying a `"servers"` key.
pub fn find_json_blocks(text: &str) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::new();
    for re in [&*FENCED_JSON, &*FENCED_OBJECT] {
        for caps in re.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                add_block(&mut out, m.as_str());
            }
        }
    }
    for m in BARE_SERVERS.find_iter(text) {
        if let Some(span) = balanced_span(text, m.start()) {
            add_block(&mut out, span);
        }
    }
    out
}

fn add_block<'a>(out: &mut Vec<&'a str>, block: &'a str) {
    let block = block.trim();
    if !block.is_empty() && !out.contains(&block) {
        out.push(block);
    }
}

/// Every block that parses as a JSON object. Parse failures are skipped.
pub fn extract_config_blocks(text: &str) -> Vec<RawCandidate> {
    let mut out = Vec::new();
    for (i, block) in find_json_blocks(text).into_iter().enumerate() {
        match serde_json::from_str::<JsonValue>(block) {
            Ok(v @ JsonValue::Object(_)) => out.push(RawCandidate::Config(v)),
            Ok(_) => tracing::debug!("json block {} is not an object", i + 1),
            Err(e) => tracing::debug!("json block {} parse failed: {}", i + 1, e),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_fenced_json() {
        let text = "Intro\n```json\n{\"mcpServers\": {}}\n```\nOutro";
        let blocks = find_json_blocks(text);
        assert_eq!(blocks, vec!["{\"mcpServers\": {}}"]);
    }

    #[test]
    fn finds_generic_fence_with_object() {
        let text = "```\n{\"a\": 1}\n```\n```\nnpm install x\n```";
        let candidates = extract_config_blocks(text);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn finds_bare_servers_object() {
        let text = r#"Add this to settings: {"servers": {"demo": {"command": "uvx", "args": ["demo"]}}} and restart."#;
        let candidates = extract_config_blocks(text);
        assert_eq!(candidates.len(), 1);
        let RawCandidate::Config(v) = &candidates[0] else {
            panic!("expected config candidate");
        };
        assert!(v.get("servers").is_some());
    }

    #[test]
    fn malformed_blocks_are_skipped() {
        let text = "```json\n{\"mcpServers\": {\"x\": }\n```\n```json\n[1, 2]\n```";
        assert!(extract_config_blocks(text).is_empty());
    }

    #[test]
    fn duplicate_blocks_reported_once() {
        let block = "```json\n{\"servers\": {\"a\": {\"url\": \"https://a.example/mcp\"}}}\n```";
        let text = format!("{block}\n\n{block}");
        assert_eq!(find_json_blocks(&text).len(), 1);
    }
}
