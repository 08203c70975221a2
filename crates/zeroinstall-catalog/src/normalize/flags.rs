//! Per-tool CLI flag knowledge base.
//!
//! Built once at startup (defaults plus optional `[flags.<tool>]` tables from
//! `config.toml`) and then shared read-only with the command normalizer.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::ToolFlagsCfg;

/// Launcher a command string is driven by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Docker,
    Npx,
    Uvx,
    Unknown,
}

impl ToolKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "docker" => Some(Self::Docker),
            "npx" => Some(Self::Npx),
            "uvx" => Some(Self::Uvx),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Pick the launcher from whitespace tokens.
    ///
    /// Docker must be the leading program, after an optional `cmd /c`
    /// wrapper; npx/uvx may appear anywhere.
    pub fn detect(tokens: &[&str]) -> Self {
        let Some(first) = tokens.get(wrapper_len(tokens)) else {
            return Self::Unknown;
        };
        if program_name(first) == "docker" {
            return Self::Docker;
        }
        if tokens.iter().any(|t| program_name(t) == "npx") {
            return Self::Npx;
        }
        if tokens.iter().any(|t| program_name(t) == "uvx") {
            return Self::Uvx;
        }
        Self::Unknown
    }
}

/// Number of leading tokens forming a Windows `cmd /c` wrapper (0 or 2).
pub fn wrapper_len(tokens: &[&str]) -> usize {
    match tokens {
        [shell, switch, ..]
            if program_name(shell) == "cmd" && switch.eq_ignore_ascii_case("/c") =>
        {
            2
        }
        _ => 0,
    }
}

/// Strip a directory prefix and a Windows launcher suffix: `C:\bin\npx.cmd` -> `npx`.
pub fn program_name(token: &str) -> String {
    let base = token.rsplit(['/', '\\']).next().unwrap_or(token);
    let lower = base.to_ascii_lowercase();
    for suffix in [".cmd", ".exe", ".bat"] {
        if let Some(stripped) = lower.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    lower
}

/// Flags declared for one launcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolFlags {
    pub boolean: BTreeSet<String>,
    pub value: BTreeSet<String>,
    /// Runtime plumbing: recorded in the token stream but never surfaced as a
    /// user-configurable parameter.
    pub operational: BTreeSet<String>,
}

impl ToolFlags {
    fn from_lists(boolean: &[&str], value: &[&str], operational: &[&str]) -> Self {
        let set = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>();
        Self {
            boolean: set(boolean),
            value: set(value),
            operational: set(operational),
        }
    }

    fn merge(&mut self, cfg: &ToolFlagsCfg) {
        for f in cfg.boolean.iter().flatten() {
            self.value.remove(f);
            self.boolean.insert(f.clone());
        }
        for f in cfg.value.iter().flatten() {
            self.boolean.remove(f);
            self.value.insert(f.clone());
        }
        for f in cfg.operational.iter().flatten() {
            self.operational.insert(f.clone());
        }
    }
}

/// Read-only knowledge base consulted by the command normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagKnowledge {
    docker: ToolFlags,
    npx: ToolFlags,
    uvx: ToolFlags,
    unknown: ToolFlags,
    /// Configuration flags that always take a value, for every launcher.
    config_values: BTreeSet<String>,
}

impl Default for FlagKnowledge {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FlagKnowledge {
    pub fn builtin() -> Self {
        let docker_values = [
            "-e",
            "--env",
            "-v",
            "--volume",
            "-p",
            "--publish",
            "--name",
            "--network",
            "--user",
            "-u",
            "--workdir",
            "-w",
            "--memory",
            "-m",
            "--cpus",
            "--label",
            "-l",
            "--restart",
            "--env-file",
            "--entrypoint",
            "--platform",
            "--mount",
        ];
        let docker_bool = [
            "-i",
            "--interactive",
            "-t",
            "--tty",
            "-it",
            "-d",
            "--detach",
            "--rm",
            "--privileged",
            "--no-healthcheck",
            "--init",
        ];
        let mut docker_operational: Vec<&str> = docker_values.to_vec();
        docker_operational.extend(docker_bool);
        docker_operational.retain(|f| *f != "--privileged");

        let docker = ToolFlags::from_lists(&docker_bool, &docker_values, &docker_operational);

        let npx = ToolFlags::from_lists(
            &[
                "-y",
                "--yes",
                "--no-install",
                "--quiet",
                "-q",
                "--verbose",
                "--debug",
                "--dry-run",
            ],
            &["--registry", "--prefix", "--workspace", "-w", "--package"],
            &[
                "-y",
                "--yes",
                "--no-install",
                "--registry",
                "--prefix",
                "--workspace",
                "--package",
            ],
        );

        let uvx = ToolFlags::from_lists(
            &["--quiet", "--no-cache", "--isolated", "--force"],
            &[
                "--python",
                "-p",
                "--index-url",
                "--extra-index-url",
                "--from",
                "--with",
            ],
            &[
                "--python",
                "-p",
                "--index-url",
                "--extra-index-url",
                "--from",
                "--with",
                "--no-cache",
                "--isolated",
            ],
        );

        let config_values = [
            "--api-key",
            "--token",
            "--auth",
            "--key",
            "--secret",
            "--url",
            "--host",
            "--port",
            "--config",
            "--file",
            "-f",
            "--output",
            "-o",
            "--input",
            "--path",
            "--database",
            "--figma-api-key",
            "--github-token",
            "--openai-api-key",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        Self {
            docker,
            npx,
            uvx,
            unknown: ToolFlags::default(),
            config_values,
        }
    }

    /// Layer `[flags.<tool>]` tables over the defaults. Unknown tool names are
    /// logged and ignored.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, ToolFlagsCfg>) -> Self {
        for (tool, cfg) in overrides {
            match ToolKind::parse(tool) {
                Some(kind) => self.tool_mut(kind).merge(cfg),
                None if tool.eq_ignore_ascii_case("config") => {
                    for f in cfg.value.iter().flatten() {
                        self.config_values.insert(f.clone());
                    }
                }
                None => tracing::warn!("ignoring flag overrides for unknown tool '{}'", tool),
            }
        }
        self
    }

    pub fn tool(&self, kind: ToolKind) -> &ToolFlags {
        match kind {
            ToolKind::Docker => &self.docker,
            ToolKind::Npx => &self.npx,
            ToolKind::Uvx => &self.uvx,
            ToolKind::Unknown => &self.unknown,
        }
    }

    fn tool_mut(&mut self, kind: ToolKind) -> &mut ToolFlags {
        match kind {
            ToolKind::Docker => &mut self.docker,
            ToolKind::Npx => &mut self.npx,
            ToolKind::Uvx => &mut self.uvx,
            ToolKind::Unknown => &mut self.unknown,
        }
    }

    /// Whether `flag` consumes the following token.
    ///
    /// Declared value flags win, then declared booleans; after that, shared
    /// configuration flags take values and any other `--long` flag longer
    /// than three characters is assumed to take one.
    pub fn takes_value(&self, kind: ToolKind, flag: &str) -> bool {
        let tool = self.tool(kind);
        if tool.value.contains(flag) {
            return true;
        }
        if tool.boolean.contains(flag) {
            return false;
        }
        if self.config_values.contains(flag) {
            return true;
        }
        flag.starts_with("--") && flag.len() > 3
    }

    pub fn is_operational(&self, kind: ToolKind, flag: &str) -> bool {
        self.tool(kind).operational.contains(flag)
    }

    /// Flags after which the next token is a value rather than a candidate
    /// image or package name.
    pub fn is_value_flag(&self, kind: ToolKind, flag: &str) -> bool {
        self.tool(kind).value.contains(flag)
    }
}
