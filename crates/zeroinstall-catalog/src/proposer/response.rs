//! Interpreting whatever the proposer returned.
//!
//! Nothing is trusted: every field is optional, every string may or may not
//! be JSON, and every list may contain junk.

use serde_json::{Map, Value as JsonValue};

use crate::extract::{extract_config_blocks, first_object_span, server_collection};
use crate::infer::policy::is_url;
use crate::model::{
    MethodDraft, MethodOrigin, MethodType, OracleVerdict, ProposerOutput, RawCandidate, Registry,
};
use crate::normalize::program_name;

/// Lift raw response text into the tagged payload.
///
/// Tries JSON, then JSON encoded as a string, then the first balanced object
/// in the text; anything else stays text. Blank text is `Absent`.
pub fn parse_output_text(text: &str) -> ProposerOutput {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return ProposerOutput::Absent;
    }
    if let Ok(v) = serde_json::from_str::<JsonValue>(trimmed) {
        if let JsonValue::String(inner) = &v
            && let Ok(v2) = serde_json::from_str::<JsonValue>(inner.trim())
        {
            return ProposerOutput::Json(v2);
        }
        return ProposerOutput::Json(v);
    }
    if let Some(span) = first_object_span(trimmed)
        && let Ok(v) = serde_json::from_str::<JsonValue>(span)
    {
        return ProposerOutput::Json(v);
    }
    ProposerOutput::Text(trimmed.to_string())
}

/// `"YES"`/`"NO"`/`true`/`false` in any casing.
fn yes_no(v: Option<&JsonValue>) -> Option<bool> {
    match v? {
        JsonValue::Bool(b) => Some(*b),
        JsonValue::String(s) => match s.trim().to_ascii_uppercase().as_str() {
            "YES" | "TRUE" | "VALID" => Some(true),
            "NO" | "FALSE" | "INVALID" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn score_value(v: Option<&JsonValue>) -> Option<u8> {
    let n = match v? {
        JsonValue::Number(n) => n.as_f64()?,
        JsonValue::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !n.is_finite() {
        return None;
    }
    Some(n.round().clamp(0.0, 10.0) as u8)
}

fn str_field<'a>(obj: &'a Map<String, JsonValue>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(JsonValue::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// A list that may also arrive as a JSON-encoded string.
fn loose_array(v: Option<&JsonValue>) -> Vec<JsonValue> {
    match v {
        Some(JsonValue::Array(a)) => a.clone(),
        Some(JsonValue::String(s)) => match serde_json::from_str::<JsonValue>(s) {
            Ok(JsonValue::Array(a)) => a,
            Ok(other) => vec![other],
            Err(_) if !s.trim().is_empty() => vec![JsonValue::String(s.clone())],
            Err(_) => Vec::new(),
        },
        Some(JsonValue::Null) | None => Vec::new(),
        Some(other) => vec![other.clone()],
    }
}

fn string_map(v: Option<&JsonValue>, default_description: &str) -> Vec<(String, String)> {
    match v {
        Some(JsonValue::Object(o)) => o
            .iter()
            .filter(|(k, _)| !k.trim().is_empty())
            .map(|(k, v)| {
                let desc = v
                    .as_str()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or(default_description);
                (k.trim().to_string(), desc.to_string())
            })
            .collect(),
        Some(JsonValue::Array(a)) => a
            .iter()
            .filter_map(|item| match item {
                JsonValue::String(s) => Some((s.trim().to_string(), default_description.to_string())),
                JsonValue::Object(o) => str_field(o, &["name", "key"]).map(|name| {
                    let desc = str_field(o, &["description"]).unwrap_or(default_description);
                    (name.to_string(), desc.to_string())
                }),
                _ => None,
            })
            .filter(|(k, _)| !k.is_empty())
            .collect(),
        Some(JsonValue::String(s)) => match serde_json::from_str::<JsonValue>(s) {
            Ok(parsed @ (JsonValue::Object(_) | JsonValue::Array(_))) => {
                string_map(Some(&parsed), default_description)
            }
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn parameter_list(v: Option<&JsonValue>) -> Vec<String> {
    loose_array(v)
        .iter()
        .filter_map(|item| match item {
            JsonValue::String(s) => Some(s.trim().to_string()),
            JsonValue::Object(o) => str_field(o, &["flag", "name"]).map(str::to_string),
            _ => None,
        })
        .filter(|p| p.starts_with('-'))
        .collect()
}

/// A method-shaped object lifted into a draft carrying the oracle's verdict.
pub fn method_guess(obj: &Map<String, JsonValue>) -> Option<MethodDraft> {
    let base = str_field(obj, &["command", "startup", "run"])?;
    let args: Vec<String> = loose_array(obj.get("args"))
        .iter()
        .filter_map(|a| a.as_str().map(str::to_string))
        .collect();
    let command = std::iter::once(base.to_string())
        .chain(args)
        .collect::<Vec<_>>()
        .join(" ");

    let mut draft = MethodDraft::with_command(MethodOrigin::Proposer, command);
    draft.name = str_field(obj, &["name"]).map(str::to_string);
    draft.method_type = str_field(obj, &["type", "transport"]).and_then(MethodType::parse);
    draft.registry = str_field(obj, &["registry"])
        .and_then(Registry::parse)
        .filter(|r| *r != Registry::Unknown);
    draft.package = str_field(obj, &["package"]).map(str::to_string);
    draft.description = str_field(obj, &["description"]).map(str::to_string);
    draft.parameters = parameter_list(obj.get("parameters"));
    draft.env_vars = string_map(obj.get("env_vars"), "Required environment variable")
        .into_iter()
        .collect();
    draft.headers = match obj.get("headers") {
        Some(JsonValue::Object(h)) => h
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect(),
        _ => Default::default(),
    };

    let verdict = OracleVerdict {
        is_valid: yes_no(obj.get("is_valid")),
        score: score_value(obj.get("deployment_ease").or_else(|| obj.get("deployment_score"))),
        issues: str_field(obj, &["issues"]).map(str::to_string),
    };
    if verdict != OracleVerdict::default() {
        draft.verdict = Some(verdict);
    }
    Some(draft)
}

/// Env var a hosted endpoint likely needs, judged from its description.
pub fn remote_env_var(server_name: &str, description: &str) -> Option<(String, String)> {
    let desc = description.to_ascii_lowercase();
    if !["auth", "token", "key", "bearer"].iter().any(|k| desc.contains(k)) {
        return None;
    }
    if server_name.to_ascii_lowercase().contains("github") {
        return Some((
            "GITHUB_PERSONAL_ACCESS_TOKEN".to_string(),
            "GitHub Personal Access Token for API authentication".to_string(),
        ));
    }
    if desc.contains("api") {
        let upper = server_name.to_ascii_uppercase().replace(['-', '/', ' ', '.'], "_");
        return Some((
            format!("{}_API_TOKEN", upper),
            format!("API token for {} authentication", server_name),
        ));
    }
    None
}

/// Remote-endpoint guess for one `urls[]` item.
pub fn remote_guess(item: &JsonValue, server_name: &str) -> Option<MethodDraft> {
    let (url, description) = match item {
        JsonValue::String(s) => (s.trim(), "Remote API endpoint"),
        JsonValue::Object(o) => (
            str_field(o, &["url"])?,
            str_field(o, &["description"]).unwrap_or("Remote API endpoint"),
        ),
        _ => return None,
    };
    if !is_url(url) {
        return None;
    }
    let mut draft = MethodDraft::with_command(MethodOrigin::Proposer, url);
    draft.name = Some(format!("{}-remote", server_name));
    draft.method_type = Some(MethodType::Http);
    draft.registry = Some(Registry::Remote);
    draft.package = Some(url.to_string());
    draft.description = Some(description.to_string());
    if let Some((var, desc)) = remote_env_var(server_name, description) {
        draft.env_vars.insert(var, desc);
    }
    Some(draft)
}

/// A prose line that is itself a zero-install invocation, cleaned of prompt
/// and list markers.
pub fn command_line(line: &str) -> Option<String> {
    let cleaned = line
        .trim()
        .trim_start_matches(['$', '>', '-', '*', '`', ' '])
        .trim_end_matches(['`', ' '])
        .trim();
    let mut tokens = cleaned.split_whitespace();
    let first = tokens.next()?;
    let launcher = program_name(first);
    let ok = match launcher.as_str() {
        "npx" | "uvx" => tokens.next().is_some(),
        "docker" => tokens.next() == Some("run"),
        _ => is_url(cleaned) && !cleaned.contains(' '),
    };
    ok.then(|| cleaned.to_string())
}

fn command_candidates(items: &[JsonValue]) -> Vec<RawCandidate> {
    items
        .iter()
        .filter_map(|c| match c {
            JsonValue::String(s) if !s.trim().is_empty() => Some(RawCandidate::Command(s.trim().to_string())),
            JsonValue::Object(o) => str_field(o, &["command"]).map(|s| RawCandidate::Command(s.to_string())),
            _ => None,
        })
        .collect()
}

fn config_candidates(items: &[JsonValue]) -> Vec<RawCandidate> {
    let mut out = Vec::new();
    for item in items {
        match item {
            JsonValue::Object(_) if server_collection(item).is_some() => {
                out.push(RawCandidate::Config(item.clone()));
            }
            JsonValue::String(s) => match serde_json::from_str::<JsonValue>(s) {
                Ok(v) if server_collection(&v).is_some() => out.push(RawCandidate::Config(v)),
                _ => out.extend(extract_config_blocks(s)),
            },
            _ => {}
        }
    }
    out
}

const MAX_NESTING: usize = 3;

fn interpret_json(v: &JsonValue, server_name: &str, depth: usize) -> Vec<RawCandidate> {
    if depth > MAX_NESTING {
        return Vec::new();
    }
    match v {
        JsonValue::String(s) => match parse_output_text(s) {
            ProposerOutput::Json(inner) => interpret_json(&inner, server_name, depth + 1),
            ProposerOutput::Text(t) => interpret_text(&t),
            ProposerOutput::Absent => Vec::new(),
        },
        JsonValue::Array(items) => items
            .iter()
            .flat_map(|item| match item {
                JsonValue::String(s) => command_line(s)
                    .map(RawCandidate::Command)
                    .into_iter()
                    .collect::<Vec<_>>(),
                JsonValue::Object(o) if server_collection(item).is_none() => {
                    method_guess(o).map(RawCandidate::Guess).into_iter().collect()
                }
                other => interpret_json(other, server_name, depth + 1),
            })
            .collect(),
        JsonValue::Object(obj) => {
            if yes_no(obj.get("has_mcp_support")) == Some(false) {
                return Vec::new();
            }
            let mut out = Vec::new();
            if server_collection(v).is_some() {
                out.push(RawCandidate::Config(v.clone()));
            }
            out.extend(command_candidates(&loose_array(obj.get("raw_commands"))));
            out.extend(config_candidates(&loose_array(obj.get("config_examples"))));
            for m in loose_array(obj.get("methods")) {
                if let JsonValue::Object(mo) = &m
                    && let Some(d) = method_guess(mo)
                {
                    out.push(RawCandidate::Guess(d));
                }
            }
            if yes_no(obj.get("has_remote_option")) == Some(true) {
                for item in loose_array(obj.get("urls")) {
                    if let Some(d) = remote_guess(&item, server_name) {
                        out.push(RawCandidate::Guess(d));
                    }
                }
            }
            if out.is_empty() && obj.contains_key("command") {
                out.extend(method_guess(obj).map(RawCandidate::Guess));
            }
            out
        }
        _ => Vec::new(),
    }
}

fn interpret_text(text: &str) -> Vec<RawCandidate> {
    let mut out = extract_config_blocks(text);
    out.extend(text.lines().filter_map(command_line).map(RawCandidate::Command));
    out
}

/// Raw candidates carried by a proposer payload.
pub fn interpret_output(output: &ProposerOutput, server_name: &str) -> Vec<RawCandidate> {
    match output {
        ProposerOutput::Json(v) => interpret_json(v, server_name, 0),
        ProposerOutput::Text(t) => interpret_text(t),
        ProposerOutput::Absent => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_json_string_and_embedded_object() {
        assert!(matches!(parse_output_text(""), ProposerOutput::Absent));
        assert!(matches!(
            parse_output_text(r#"{"raw_commands": []}"#),
            ProposerOutput::Json(_)
        ));
        let quoted = serde_json::to_string(r#"{"raw_commands": ["npx -y a"]}"#).expect("encode");
        let ProposerOutput::Json(v) = parse_output_text(&quoted) else {
            panic!("expected json");
        };
        assert!(v.get("raw_commands").is_some());
        let ProposerOutput::Json(v) =
            parse_output_text("Sure! Here it is: {\"methods\": []} hope it helps")
        else {
            panic!("expected json");
        };
        assert!(v.get("methods").is_some());
        assert!(matches!(
            parse_output_text("I could not find anything"),
            ProposerOutput::Text(_)
        ));
    }

    #[test]
    fn no_mcp_support_yields_nothing() {
        let out = ProposerOutput::Json(json!({
            "has_mcp_support": "NO",
            "raw_commands": ["npx -y something"]
        }));
        assert!(interpret_output(&out, "s").is_empty());
    }

    #[test]
    fn full_payload_is_interpreted() {
        let out = ProposerOutput::Json(json!({
            "has_mcp_support": "YES",
            "raw_commands": ["npx -y @org/demo", 42, ""],
            "config_examples": [
                "{\"mcpServers\": {\"d\": {\"command\": \"uvx\", \"args\": [\"demo\"]}}}",
                {"servers": {"e": {"url": "https://e.example/mcp"}}}
            ],
            "methods": [
                {"name": "docker", "command": "docker run -i --rm org/demo", "is_valid": "YES", "deployment_ease": "10"},
                {"name": "broken"}
            ],
            "has_remote_option": "YES",
            "urls": [{"url": "https://api.demo.dev/mcp", "description": "Needs an API key"}, {"url": "ftp://x"}]
        }));
        let cands = interpret_output(&out, "demo-server");
        let commands = cands.iter().filter(|c| matches!(c, RawCandidate::Command(_))).count();
        let configs = cands.iter().filter(|c| matches!(c, RawCandidate::Config(_))).count();
        let guesses: Vec<&MethodDraft> = cands
            .iter()
            .filter_map(|c| match c {
                RawCandidate::Guess(d) => Some(d),
                _ => None,
            })
            .collect();
        assert_eq!(commands, 1);
        assert_eq!(configs, 2);
        assert_eq!(guesses.len(), 2);
        let verdict = guesses[0].verdict.as_ref().expect("verdict");
        assert_eq!(verdict.is_valid, Some(true));
        assert_eq!(verdict.score, Some(10));
        assert_eq!(guesses[1].name.as_deref(), Some("demo-server-remote"));
        assert!(guesses[1].env_vars.contains_key("DEMO_SERVER_API_TOKEN"));
    }

    #[test]
    fn urls_ignored_without_remote_option() {
        let out = ProposerOutput::Json(json!({
            "has_remote_option": "NO",
            "urls": ["https://api.demo.dev/mcp"]
        }));
        assert!(interpret_output(&out, "demo").is_empty());
    }

    #[test]
    fn github_remote_env_var() {
        let (var, _) = remote_env_var("github/github-mcp-server", "OAuth or bearer token")
            .expect("env var");
        assert_eq!(var, "GITHUB_PERSONAL_ACCESS_TOKEN");
        assert!(remote_env_var("demo", "public endpoint").is_none());
        assert!(remote_env_var("demo", "requires a token").is_none());
    }

    #[test]
    fn plain_text_is_scanned() {
        let text = "To run it:\n\n    $ npx -y @org/tool --port 3000\n\nor `docker run -i --rm org/tool`\n\npip install tool\n";
        let cands = interpret_output(&ProposerOutput::Text(text.into()), "tool");
        assert_eq!(
            cands,
            vec![RawCandidate::Command("npx -y @org/tool --port 3000".into())]
        );
    }

    #[test]
    fn wrong_types_are_tolerated() {
        for v in [json!(null), json!(7), json!({"methods": "nonsense"}), json!({"raw_commands": {"a": 1}})] {
            let _ = interpret_output(&ProposerOutput::Json(v), "x");
        }
        let arr = ProposerOutput::Json(json!(["uvx demo", {"command": "npx -y z"}, "hello"]));
        assert_eq!(interpret_output(&arr, "x").len(), 2);
    }
}
