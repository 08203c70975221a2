//! Package / image identity extraction.

use crate::model::Registry;
use crate::normalize::{FlagKnowledge, ToolKind, program_name};

/// First positional token after the `launcher` program, skipping flags and the
/// values they consume.
fn first_positional_after(
    command: &str,
    launcher: &str,
    kind: ToolKind,
    kb: &FlagKnowledge,
    skip: &[&str],
) -> Option<String> {
    let tokens: Vec<&str> = command.split_whitespace().collect();
    let start = tokens.iter().position(|t| program_name(t) == launcher)? + 1;
    let mut iter = tokens[start..].iter().peekable();
    while let Some(tok) = iter.next() {
        if tok.starts_with('-') {
            if !tok.contains('=')
                && kb.takes_value(kind, tok)
                && iter.peek().is_some_and(|n| !n.starts_with('-'))
            {
                iter.next();
            }
            continue;
        }
        if skip.contains(tok) {
            continue;
        }
        return Some(tok.to_string());
    }
    None
}

/// npm package after `npx` (`npx -y @org/demo --flag` -> `@org/demo`).
pub fn npm_package(command: &str, kb: &FlagKnowledge) -> Option<String> {
    first_positional_after(command, "npx", ToolKind::Npx, kb, &[])
}

/// PyPI package after `uvx`.
pub fn pypi_package(command: &str, kb: &FlagKnowledge) -> Option<String> {
    first_positional_after(command, "uvx", ToolKind::Uvx, kb, &[])
}

/// Image reference of a `docker run` command.
///
/// Takes the first positional after `run` (Docker's own `OPTIONS IMAGE`
/// order). When an unrecognized option swallowed the image, fall back to the
/// last non-flag token containing `/` that is not a path, skipping values of
/// declared value flags such as `-v` and `-e`.
pub fn docker_image(command: &str, kb: &FlagKnowledge) -> Option<String> {
    if let Some(image) = first_positional_after(command, "docker", ToolKind::Docker, kb, &["run"])
    {
        return Some(image);
    }
    let tokens: Vec<&str> = command.split_whitespace().collect();
    let mut last = None;
    let mut skip_next = false;
    for tok in tokens {
        if skip_next {
            skip_next = false;
            continue;
        }
        if tok.starts_with('-') {
            skip_next = !tok.contains('=') && kb.is_value_flag(ToolKind::Docker, tok);
            continue;
        }
        if tok.contains('/') && !tok.starts_with('/') && !tok.starts_with('.') {
            last = Some(tok.to_string());
        }
    }
    last
}

/// Resolve the package identity for a registry, falling back to `name`.
pub fn resolve_package(registry: Registry, command: &str, name: &str, kb: &FlagKnowledge) -> String {
    let found = match registry {
        Registry::Npm => npm_package(command, kb),
        Registry::Pypi => pypi_package(command, kb),
        Registry::Docker => docker_image(command, kb),
        Registry::Remote => Some(command.trim().to_string()).filter(|c| !c.is_empty()),
        Registry::Unknown => None,
    };
    found.unwrap_or_else(|| name.to_string())
}

/// `@scope/name@1.2.3` -> `@scope/name`, `pkg@latest` -> `pkg`.
pub fn strip_npm_version(package: &str) -> &str {
    let search_from = usize::from(package.starts_with('@'));
    match package[search_from..].find('@') {
        Some(idx) => &package[..search_from + idx],
        None => package,
    }
}

/// `pkg==1.0` / `pkg@1.0` -> `pkg`.
pub fn strip_pypi_version(package: &str) -> &str {
    let end = [package.find("=="), package.find('@')]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(package.len());
    &package[..end]
}

/// `ghcr.io/org/img:1.2` -> `ghcr.io/org/img`; registry ports are preserved.
pub fn strip_image_tag(image: &str) -> &str {
    let image = image.split('@').next().unwrap_or(image);
    let name_start = image.rfind('/').map(|i| i + 1).unwrap_or(0);
    match image[name_start..].find(':') {
        Some(idx) => &image[..name_start + idx],
        None => image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kb() -> FlagKnowledge {
        FlagKnowledge::builtin()
    }

    #[test]
    fn npm_packages() {
        assert_eq!(npm_package("npx -y @org/demo", &kb()).as_deref(), Some("@org/demo"));
        assert_eq!(
            npm_package("npx --registry https://r.example pkg@1.0 --x", &kb()).as_deref(),
            Some("pkg@1.0")
        );
        assert_eq!(
            npm_package("cmd /c npx -y server-x", &kb()).as_deref(),
            Some("server-x")
        );
        assert_eq!(npm_package("npx -y", &kb()), None);
    }

    #[test]
    fn pypi_packages() {
        assert_eq!(
            pypi_package("uvx mcp-server-fetch", &kb()).as_deref(),
            Some("mcp-server-fetch")
        );
        assert_eq!(
            pypi_package("uvx --from git+https://github.com/a/b pkg-b", &kb()).as_deref(),
            Some("pkg-b")
        );
    }

    #[test]
    fn docker_images() {
        assert_eq!(
            docker_image(
                "docker run -i --rm -e GITHUB_PERSONAL_ACCESS_TOKEN ghcr.io/github/github-mcp-server",
                &kb()
            )
            .as_deref(),
            Some("ghcr.io/github/github-mcp-server")
        );
        assert_eq!(
            docker_image(
                "docker run -i --rm -v /a:/b mcp/filesystem /projects",
                &kb()
            )
            .as_deref(),
            Some("mcp/filesystem")
        );
        assert_eq!(
            docker_image("docker run -i --rm postgres", &kb()).as_deref(),
            Some("postgres")
        );
        // unknown boolean-looking option swallows the image; fall back to last slashed token
        assert_eq!(
            docker_image("docker run --read-only mcp/time", &kb()).as_deref(),
            Some("mcp/time")
        );
    }

    #[test]
    fn resolve_falls_back_to_name() {
        assert_eq!(
            resolve_package(Registry::Unknown, "python -m x", "demo", &kb()),
            "demo"
        );
        assert_eq!(
            resolve_package(Registry::Remote, "https://api.example.com/mcp", "demo", &kb()),
            "https://api.example.com/mcp"
        );
    }

    #[test]
    fn version_stripping() {
        assert_eq!(strip_npm_version("@scope/name@1.2.3"), "@scope/name");
        assert_eq!(strip_npm_version("@scope/name"), "@scope/name");
        assert_eq!(strip_npm_version("pkg@latest"), "pkg");
        assert_eq!(strip_pypi_version("pkg==1.0"), "pkg");
        assert_eq!(strip_pypi_version("pkg@0.3"), "pkg");
        assert_eq!(strip_image_tag("ghcr.io/org/img:1.2"), "ghcr.io/org/img");
        assert_eq!(strip_image_tag("localhost:5000/img"), "localhost:5000/img");
        assert_eq!(strip_image_tag("mcp/x@sha256:abc"), "mcp/x");
    }
}
