use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::LintError;

/// File names probed, in order, in each directory while walking up.
const CONFIG_FILE_NAMES: [&str; 4] = [
    ".lintdigest.toml",
    "lintdigest.toml",
    "go-lint.config.json",
    ".go-lint.config.json",
];

/// lintdigest configuration (loaded from .lintdigest.toml or a JSON file)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LintConfig {
    /// Extra analyzers run once per target
    #[serde(default)]
    pub analyzers: Vec<AnalyzerConfig>,

    /// Ordered priority levels used to pick the displayed group
    #[serde(default, alias = "priorityLevels")]
    pub priority_levels: Vec<PriorityLevel>,

    #[serde(default)]
    pub primary: PrimaryConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// An external analyzer as declared by the user or found on PATH
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub name: String,

    /// Command tokens; `{target}` / `${target}` are substituted per target
    #[serde(default)]
    pub command: Vec<String>,

    #[serde(default)]
    pub severity: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityLevel {
    /// Only positive levels take part in prioritization
    pub level: i64,

    #[serde(default)]
    pub name: String,

    /// Tool names (case-insensitive) mapped to this level
    #[serde(default)]
    pub rules: Vec<String>,
}

/// The structured linter whose JSON report seeds the issue set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Command tokens; targets are appended
    #[serde(default = "default_primary_command")]
    pub command: Vec<String>,
}

impl Default for PrimaryConfig {
    fn default() -> Self {
        PrimaryConfig {
            enabled: true,
            command: default_primary_command(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Maximum number of issues rendered per run (0 = unlimited)
    #[serde(default = "default_max_issues")]
    pub max_issues: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            max_issues: default_max_issues(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_primary_command() -> Vec<String> {
    ["golangci-lint", "run", "--out-format", "json", "--show-stats", "false"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_max_issues() -> usize {
    15
}

impl LintConfig {
    /// Try to find and load a config file in `start` or its parents.
    /// Unreadable or malformed files are logged and ignored.
    pub fn discover(start: &Path) -> Option<Self> {
        let config_path = find_config_file(start)?;
        debug!("Found config: {}", config_path.display());

        match Self::load_from(&config_path) {
            Ok(config) => {
                info!("Loaded config from {}", config_path.display());
                Some(config)
            }
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    /// Load a specific config file. `.json` files are read as JSON,
    /// everything else as TOML.
    pub fn load_from(path: &Path) -> Result<Self, LintError> {
        let content = std::fs::read_to_string(path).map_err(|source| LintError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| e.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            serde_json::from_str::<LintConfig>(&content).map_err(|e| e.to_string())
        } else {
            toml::from_str::<LintConfig>(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| LintError::Config {
            path: path.to_path_buf(),
            message,
        })
    }
}

/// Walk up from `start` to find the first known config file
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in CONFIG_FILE_NAMES {
            let candidate = current.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Create a default .lintdigest.toml in the current directory
pub fn init_config() -> Result<()> {
    let config_path = std::env::current_dir()?.join(".lintdigest.toml");

    if config_path.exists() {
        println!("⚠️  .lintdigest.toml already exists in this directory");
        return Ok(());
    }

    let default_config = r#"# lintdigest configuration

[primary]
# Linter producing a JSON report ({"Issues": [...]}); targets are appended.
enabled = true
command = ["golangci-lint", "run", "--out-format", "json", "--show-stats", "false"]

[output]
# Maximum number of issues shown per run (0 = unlimited)
max_issues = 15

# Extra analyzers. `{target}` or `${target}` is replaced with each target;
# without a placeholder the target is appended as the last argument.
# Severity: "error" (default), "warning", "info" or any custom label.
#
# [[analyzers]]
# name = "staticcheck"
# command = ["staticcheck", "{target}"]
# severity = "warning"

# Only the most urgent level that has issues is shown.
#
# [[priority_levels]]
# level = 1
# name = "critical"
# rules = ["govet", "errcheck"]
"#;

    std::fs::write(&config_path, default_config)?;
    println!("✅ Created .lintdigest.toml");
    println!("   Edit it to declare analyzers and priority levels.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_toml_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".lintdigest.toml");
        fs::write(
            &path,
            r#"
[[analyzers]]
name = "staticcheck"
command = ["staticcheck", "{target}"]
severity = "warn"

[[priority_levels]]
level = 1
name = "critical"
rules = ["govet"]

[output]
max_issues = 3
"#,
        )
        .unwrap();

        let cfg = LintConfig::load_from(&path).unwrap();
        assert_eq!(cfg.analyzers.len(), 1);
        assert_eq!(cfg.analyzers[0].command, vec!["staticcheck", "{target}"]);
        assert_eq!(cfg.priority_levels[0].rules, vec!["govet"]);
        assert_eq!(cfg.output.max_issues, 3);
        assert!(cfg.primary.enabled);
        assert_eq!(cfg.primary.command[0], "golangci-lint");
    }

    #[test]
    fn test_load_json_config_with_camel_case_levels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("go-lint.config.json");
        fs::write(
            &path,
            r#"{
  "analyzers": [{"name": "smbgo"}],
  "priorityLevels": [{"level": 2, "name": "style", "rules": ["revive"]}]
}"#,
        )
        .unwrap();

        let cfg = LintConfig::load_from(&path).unwrap();
        assert_eq!(cfg.analyzers[0].name, "smbgo");
        assert!(cfg.analyzers[0].command.is_empty());
        assert_eq!(cfg.analyzers[0].severity, "");
        assert_eq!(cfg.priority_levels[0].level, 2);
        assert_eq!(cfg.output.max_issues, 15);
    }

    #[test]
    fn test_discover_walks_up_and_skips_broken_files() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            dir.path().join("lintdigest.toml"),
            "[output]\nmax_issues = 7\n",
        )
        .unwrap();

        let cfg = LintConfig::discover(&nested).unwrap();
        assert_eq!(cfg.output.max_issues, 7);

        fs::write(nested.join(".lintdigest.toml"), "not = [valid").unwrap();
        assert!(LintConfig::discover(&nested).is_none());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = LintConfig::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, LintError::Io { .. }));
    }
}
