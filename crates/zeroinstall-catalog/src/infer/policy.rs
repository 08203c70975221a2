//! Tunable heuristics: placeholder and secret detection, env var naming, and
//! the zero-install command test.

use once_cell::sync::Lazy;
use regex::Regex;

static ZERO_INSTALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(npx\s+|uvx\s+|docker\s+run|^https?://)").expect("zero-install regex")
});

static CAMEL_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("camel-case regex"));

/// True when the command needs no prior local install: an auto-fetching
/// runtime (`npx`, `uvx`), a container pull (`docker run`), or a plain
/// HTTP(S) endpoint.
pub fn is_zero_install_command(command: &str) -> bool {
    ZERO_INSTALL.is_match(command.trim())
}

pub fn is_url(command: &str) -> bool {
    let c = command.trim_start();
    let lower = c.get(..8).unwrap_or(c).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn is_all_caps(value: &str) -> bool {
    let mut saw_alpha = false;
    for c in value.chars() {
        if c.is_alphabetic() {
            saw_alpha = true;
            if !c.is_uppercase() {
                return false;
            }
        }
    }
    saw_alpha
}

/// Does `value` look like something the user must replace before running?
pub fn is_placeholder_value(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    let upper = value.to_uppercase();
    if ["YOUR_", "MY_", "EXAMPLE_", "TEST_", "SAMPLE_"]
        .iter()
        .any(|p| value.starts_with(p))
    {
        return true;
    }
    if ["_HERE", "_PLACEHOLDER", "_EXAMPLE"]
        .iter()
        .any(|s| value.ends_with(s))
    {
        return true;
    }
    if (value.starts_with('<') && value.ends_with('>'))
        || (value.starts_with('{') && value.ends_with('}'))
    {
        return true;
    }
    if ["CHANGEME", "REPLACEME", "TODO", "FIXME"].contains(&upper.as_str()) {
        return true;
    }
    is_all_caps(value)
        && ["YOUR", "EXAMPLE", "TEST", "API", "KEY", "TOKEN"]
            .iter()
            .any(|w| upper.contains(w))
        && !["HTTP", "HTTPS", "FTP"].iter().any(|p| value.starts_with(p))
}

const SECRET_FLAG_WORDS: [&str; 7] = [
    "key",
    "token",
    "secret",
    "password",
    "auth",
    "credential",
    "pass",
];

/// Should the value passed to `flag` be supplied through an environment variable?
pub fn likely_needs_env_var(flag: &str, value: &str) -> bool {
    if is_placeholder_value(value) {
        return true;
    }
    let flag_lower = flag.to_ascii_lowercase();
    if SECRET_FLAG_WORDS.iter().any(|w| flag_lower.contains(w)) {
        return true;
    }
    if ["/", "./", "../", "~/"].iter().any(|p| value.starts_with(p)) {
        return false;
    }
    let lower = value.to_ascii_lowercase();
    lower.contains("example.com") || lower.contains("your-")
}

/// Environment variable name for a flag's value.
///
/// Placeholder values name the variable themselves (`YOUR-KEY` -> `YOUR_KEY`,
/// `<myApiKey>` -> `MY_API_KEY`); real-looking values fall back to the flag
/// name (`--api-key` -> `API_KEY`) so secrets never leak into the name.
pub fn infer_env_var_name(flag: &str, value: &str) -> String {
    let trimmed = value.trim_matches(|c: char| matches!(c, '<' | '>' | '{' | '}' | '$'));
    if !trimmed.is_empty() && is_placeholder_value(value) {
        let normalized = trimmed.replace(['-', ' ', '.'], "_");
        if is_all_caps(&normalized) {
            return normalized;
        }
        return CAMEL_BOUNDARY
            .replace_all(&normalized, "${1}_${2}")
            .to_uppercase();
    }
    flag.trim_start_matches('-').to_uppercase().replace('-', "_")
}

/// Placeholder check applied to values of a configuration `env` block.
pub fn env_value_looks_required(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    ["your-", "api-key", "token", "key"]
        .iter()
        .any(|w| lower.contains(w))
        || is_placeholder_value(value)
}

/// Whether an env var name denotes a credential.
pub fn is_secret_name(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    ["KEY", "TOKEN", "SECRET", "PASSWORD", "AUTH"]
        .iter()
        .any(|w| upper.contains(w))
}

/// Common system variables that are never requirements of a server.
pub fn is_system_env_var(name: &str) -> bool {
    ["path", "home", "user"].contains(&name.to_ascii_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_install_patterns() {
        assert!(is_zero_install_command("npx -y @org/demo"));
        assert!(is_zero_install_command("uvx mcp-server-fetch"));
        assert!(is_zero_install_command("docker run -i --rm mcp/x"));
        assert!(is_zero_install_command("https://api.example.com/mcp"));
        assert!(is_zero_install_command("NPX  pkg"));
        assert!(!is_zero_install_command("pip install demo && python -m demo"));
        assert!(!is_zero_install_command("npm install -g demo"));
        assert!(!is_zero_install_command("curl https://x.sh | sh"));
        assert!(!is_zero_install_command("npx"));
    }

    #[test]
    fn placeholder_detection() {
        for v in [
            "YOUR_API_KEY",
            "MY_TOKEN",
            "TOKEN_HERE",
            "<api-key>",
            "{token}",
            "changeme",
            "API_KEY",
        ] {
            assert!(is_placeholder_value(v), "{v} should be a placeholder");
        }
        for v in ["", "8080", "/tmp/data", "HTTPS_PROXY_API", "production"] {
            assert!(!is_placeholder_value(v), "{v} should not be a placeholder");
        }
    }

    #[test]
    fn env_var_needed_for_secrets_and_placeholders() {
        assert!(likely_needs_env_var("--api-key", "sk-123"));
        assert!(likely_needs_env_var("--host", "YOUR_HOST"));
        assert!(likely_needs_env_var("--url", "https://your-instance.example.com"));
        assert!(!likely_needs_env_var("--port", "8080"));
        assert!(!likely_needs_env_var("--root", "/srv/data"));
    }

    #[test]
    fn env_var_names() {
        assert_eq!(infer_env_var_name("--key", "YOUR-KEY"), "YOUR_KEY");
        assert_eq!(infer_env_var_name("--key", "YOUR_API_KEY"), "YOUR_API_KEY");
        assert_eq!(infer_env_var_name("--key", "<myApiKey>"), "MY_API_KEY");
        assert_eq!(infer_env_var_name("--api-key", "sk-123"), "API_KEY");
        assert_eq!(infer_env_var_name("--github-token", ""), "GITHUB_TOKEN");
    }

    #[test]
    fn secret_names() {
        assert!(is_secret_name("GITHUB_PERSONAL_ACCESS_TOKEN"));
        assert!(is_secret_name("api_key"));
        assert!(!is_secret_name("LOG_LEVEL"));
    }
}
