use std::collections::BTreeMap;

use tracing::{debug, error, info, warn};

use crate::config::AnalyzerConfig;
use crate::engine::exec::CommandRunner;
use crate::engine::parser::parse_diagnostics;
use crate::report::issue::{Issue, Severity};

/// Target used when the caller passes none
pub const DEFAULT_TARGET: &str = "./...";

const TARGET_PLACEHOLDERS: [&str; 2] = ["${target}", "{target}"];

struct KnownAnalyzer {
    name: &'static str,
    command: &'static [&'static str],
    severity: &'static str,
}

/// Analyzers picked up automatically when their binary is on PATH
const KNOWN_ANALYZERS: [KnownAnalyzer; 1] = [KnownAnalyzer {
    name: "smbgo",
    command: &["smbgo", "{target}"],
    severity: "error",
}];

/// An analyzer ready to run: command resolved and severity normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerSpec {
    pub name: String,
    pub command: Vec<String>,
    pub severity: Severity,
}

impl AnalyzerSpec {
    fn from_config(cfg: AnalyzerConfig) -> Self {
        let command = if cfg.command.is_empty() {
            vec![cfg.name.clone()]
        } else {
            cfg.command
        };
        AnalyzerSpec {
            severity: Severity::normalize(&cfg.severity),
            name: cfg.name,
            command,
        }
    }
}

/// Known analyzers whose binary `is_installed` reports as present
pub fn detect_auto_analyzers(is_installed: impl Fn(&str) -> bool) -> Vec<AnalyzerConfig> {
    KNOWN_ANALYZERS
        .iter()
        .filter(|known| is_installed(known.name))
        .map(|known| AnalyzerConfig {
            name: known.name.to_string(),
            command: known.command.iter().map(|s| s.to_string()).collect(),
            severity: known.severity.to_string(),
        })
        .collect()
}

/// Whether `name` resolves to an executable on PATH
pub fn on_path(name: &str) -> bool {
    !name.is_empty() && which::which(name).is_ok()
}

/// Overlay user analyzers on auto-detected ones by name.
///
/// A user entry replaces the detected entry of the same name wholesale.
/// Unnamed entries are dropped. The result is sorted by name.
pub fn merge_analyzers(auto: Vec<AnalyzerConfig>, user: &[AnalyzerConfig]) -> Vec<AnalyzerSpec> {
    let mut merged: BTreeMap<String, AnalyzerConfig> = BTreeMap::new();
    for cfg in auto.into_iter().chain(user.iter().cloned()) {
        if cfg.name.is_empty() {
            continue;
        }
        merged.insert(cfg.name.clone(), cfg);
    }
    merged.into_values().map(AnalyzerSpec::from_config).collect()
}

/// Substitute `{target}` / `${target}` in every token.
///
/// Without a placeholder the target is appended, unless some token already
/// equals the target exactly. Substring matches do not count.
pub fn expand_command(parts: &[String], target: &str) -> Vec<String> {
    let mut had_placeholder = false;
    let mut expanded: Vec<String> = parts
        .iter()
        .map(|part| {
            if TARGET_PLACEHOLDERS.iter().any(|p| part.contains(p)) {
                had_placeholder = true;
            }
            TARGET_PLACEHOLDERS
                .iter()
                .fold(part.clone(), |acc, p| acc.replace(p, target))
        })
        .collect();

    let already_present = parts.iter().any(|p| p == target);
    if !expanded.is_empty() && !had_placeholder && !already_present && !target.is_empty() {
        expanded.push(target.to_string());
    }
    expanded
}

/// Runs every analyzer once per target, sequentially, and parses the output
pub struct Orchestrator<'r, R: CommandRunner> {
    specs: Vec<AnalyzerSpec>,
    runner: &'r R,
}

impl<'r, R: CommandRunner> Orchestrator<'r, R> {
    pub fn new(specs: Vec<AnalyzerSpec>, runner: &'r R) -> Self {
        Orchestrator { specs, runner }
    }

    /// Collect issues from all analyzers. Launch failures are logged and
    /// skipped; they never stop the remaining analyzers or targets.
    pub fn run(&self, targets: &[String]) -> Vec<Issue> {
        if self.specs.is_empty() {
            return Vec::new();
        }

        let default_targets = [DEFAULT_TARGET.to_string()];
        let targets = if targets.is_empty() {
            &default_targets[..]
        } else {
            targets
        };

        info!(
            "Running {} analyzer(s): {}",
            self.specs.len(),
            self.specs.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join(", ")
        );

        let mut collected = Vec::new();
        for spec in &self.specs {
            for target in targets {
                let argv = expand_command(&spec.command, target);
                if argv.is_empty() {
                    continue;
                }

                match self.runner.run(&spec.name, &argv) {
                    Ok(capture) => {
                        if capture.timed_out {
                            warn!("{} timed out on {}; keeping partial output", spec.name, target);
                        }
                        let issues = parse_diagnostics(&capture.output, &spec.name, &spec.severity);
                        debug!("{} on {}: {} issue(s)", spec.name, target, issues.len());
                        collected.extend(issues);
                    }
                    Err(e) => {
                        error!("❌ {} failed on {}: {}", spec.name, target, e);
                    }
                }
            }
        }

        collected
    }
}
