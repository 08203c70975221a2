//! Server collections inside parsed configuration documents.

use serde_json::{Map, Value as JsonValue};

use crate::infer::env_references;
use crate::model::{MethodDraft, MethodOrigin, MethodType};

type JsonMap = Map<String, JsonValue>;

/// The server collection of a configuration document and the key it came from.
///
/// Checked in priority order `mcp.servers`, `servers`, `mcpServers`,
/// `context_servers`; only the first present collection is read.
pub fn server_collection(doc: &JsonValue) -> Option<(&'static str, &JsonMap)> {
    if let Some(servers) = doc
        .get("mcp")
        .and_then(|m| m.get("servers"))
        .and_then(JsonValue::as_object)
    {
        return Some(("mcp.servers", servers));
    }
    for key in ["servers", "mcpServers", "context_servers"] {
        if let Some(servers) = doc.get(key).and_then(JsonValue::as_object) {
            return Some((key, servers));
        }
    }
    None
}

fn scalar_string(v: &JsonValue) -> Option<String> {
    match v {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_list(v: Option<&JsonValue>) -> Vec<String> {
    v.and_then(JsonValue::as_array)
        .map(|a| a.iter().filter_map(scalar_string).collect())
        .unwrap_or_default()
}

fn string_map(v: Option<&JsonValue>) -> Vec<(String, String)> {
    v.and_then(JsonValue::as_object)
        .map(|o| {
            o.iter()
                .filter_map(|(k, v)| scalar_string(v).map(|s| (k.clone(), s)))
                .collect()
        })
        .unwrap_or_default()
}

/// Convert one `name -> config` pair. Entries with neither a command nor a
/// URL yield `None`.
pub fn draft_from_entry(name: &str, config: &JsonValue, origin: MethodOrigin) -> Option<MethodDraft> {
    let cfg = config.as_object()?;
    let mut draft = MethodDraft::new(origin);
    draft.name = Some(name.to_string());

    if let Some(cmd) = cfg.get("command") {
        let (path, args) = match cmd {
            JsonValue::String(path) => (path.clone(), string_list(cfg.get("args"))),
            JsonValue::Object(o) => (
                o.get("path").and_then(JsonValue::as_str)?.to_string(),
                string_list(o.get("args")),
            ),
            _ => return None,
        };
        let path = path.trim();
        if path.is_empty() {
            return None;
        }
        let command = std::iter::once(path.to_string())
            .chain(args)
            .collect::<Vec<_>>()
            .join(" ");
        draft.command = Some(command.trim().to_string());
        draft.method_type = Some(MethodType::Stdio);
        for (var, value) in string_map(cfg.get("env")) {
            // `"TOKEN": "${input:token}"` means TOKEN itself must be provided
            if !env_references(&value).is_empty() || value.contains("${") {
                draft
                    .env_vars
                    .insert(var, "Required environment variable".to_string());
            } else {
                draft.env.insert(var, value);
            }
        }
        return Some(draft);
    }

    let declared = cfg
        .get("type")
        .and_then(JsonValue::as_str)
        .and_then(MethodType::parse);
    let url = cfg
        .get("url")
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|u| !u.is_empty())?;
    draft.command = Some(url.to_string());
    draft.method_type = Some(declared.filter(|t| t.is_remote()).unwrap_or(MethodType::Http));
    draft.headers = string_map(cfg.get("headers")).into_iter().collect();
    Some(draft)
}

/// Drafts for every usable entry of the document's server collection.
pub fn drafts_from_config(doc: &JsonValue, origin: MethodOrigin) -> Vec<MethodDraft> {
    let Some((source, servers)) = server_collection(doc) else {
        tracing::debug!("no server collection in json block");
        return Vec::new();
    };
    let mut out = Vec::new();
    for (name, config) in servers {
        match draft_from_entry(name, config, origin) {
            Some(d) => out.push(d),
            None => tracing::debug!("skipping malformed server '{}' in {}", name, source),
        }
    }
    tracing::debug!("found {} server(s) in {}", out.len(), source);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collection_priority() {
        let doc = json!({"servers": {"a": {}}, "mcpServers": {"b": {}}});
        assert_eq!(server_collection(&doc).map(|(k, _)| k), Some("servers"));
        let doc = json!({"mcp": {"servers": {"a": {}}}, "servers": {"b": {}}});
        assert_eq!(server_collection(&doc).map(|(k, _)| k), Some("mcp.servers"));
        let doc = json!({"context_servers": {"z": {}}});
        assert_eq!(server_collection(&doc).map(|(k, _)| k), Some("context_servers"));
        // `mcp` without servers falls through to the next key
        let doc = json!({"mcp": {"inputs": []}, "mcpServers": {"b": {}}});
        assert_eq!(server_collection(&doc).map(|(k, _)| k), Some("mcpServers"));
        assert!(server_collection(&json!({"other": 1})).is_none());
    }

    #[test]
    fn command_and_args_shape() {
        let d = draft_from_entry(
            "demo",
            &json!({"command": "npx", "args": ["-y", "@org/demo"], "env": {"API_KEY": "your-api-key", "MODE": "fast"}}),
            MethodOrigin::ConfigBlock,
        )
        .expect("draft");
        assert_eq!(d.command.as_deref(), Some("npx -y @org/demo"));
        assert_eq!(d.method_type, Some(MethodType::Stdio));
        assert_eq!(d.env.get("API_KEY").map(String::as_str), Some("your-api-key"));
        assert!(d.env_vars.is_empty());
    }

    #[test]
    fn nested_command_object_shape() {
        let d = draft_from_entry(
            "ctx",
            &json!({"command": {"path": "uvx", "args": ["mcp-server-time", "--local-timezone", "UTC"]}}),
            MethodOrigin::ConfigBlock,
        )
        .expect("draft");
        assert_eq!(
            d.command.as_deref(),
            Some("uvx mcp-server-time --local-timezone UTC")
        );
    }

    #[test]
    fn input_references_name_the_key() {
        let d = draft_from_entry(
            "github",
            &json!({"command": "docker", "args": ["run", "-i", "--rm", "ghcr.io/github/github-mcp-server"],
                    "env": {"GITHUB_PERSONAL_ACCESS_TOKEN": "${input:github_token}"}}),
            MethodOrigin::ConfigBlock,
        )
        .expect("draft");
        assert_eq!(
            d.env_vars["GITHUB_PERSONAL_ACCESS_TOKEN"],
            "Required environment variable"
        );
    }

    #[test]
    fn url_shape() {
        let d = draft_from_entry(
            "remote",
            &json!({"type": "sse", "url": "https://mcp.example.com/sse", "headers": {"Authorization": "Bearer ${TOKEN}"}}),
            MethodOrigin::ConfigBlock,
        )
        .expect("draft");
        assert_eq!(d.method_type, Some(MethodType::Sse));
        assert_eq!(d.command.as_deref(), Some("https://mcp.example.com/sse"));
        assert_eq!(d.headers["Authorization"], "Bearer ${TOKEN}");
    }

    #[test]
    fn malformed_entries_are_dropped() {
        let doc = json!({"mcpServers": {
            "no-command": {"env": {}},
            "bad-command": {"command": 42},
            "type-only": {"type": "http"},
            "ok": {"command": "npx", "args": ["-y", "ok"]}
        }});
        let drafts = drafts_from_config(&doc, MethodOrigin::ConfigBlock);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].name.as_deref(), Some("ok"));
    }
}
