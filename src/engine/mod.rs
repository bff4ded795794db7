pub mod analyzers;
pub mod exec;
pub mod parser;
pub mod primary;

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::{ConfigArgs, RunArgs};
use crate::config::{AnalyzerConfig, LintConfig};
use crate::error::LintError;
use crate::report::context::{render_context, SourceCache};
use crate::report::digest::{DigestReport, DisplayedIssue};
use crate::report::docs::doc_url;
use crate::report::issue::IssueSummary;
use crate::report::merger::dedupe_issues;
use crate::report::paths::PathResolver;
use crate::report::priority::PriorityTable;
use crate::report::sorter::{select_group, sort_issues};

use analyzers::{detect_auto_analyzers, merge_analyzers, on_path, Orchestrator, DEFAULT_TARGET};
use exec::{CommandRunner, ExecOptions, ProcessRunner};
use primary::PrimarySource;

/// Resolve the effective configuration for a command
pub fn load_config(args: &ConfigArgs) -> Result<LintConfig> {
    if let Some(ref path) = args.config {
        return Ok(LintConfig::load_from(path)?);
    }
    if args.no_config {
        debug!("Config discovery disabled");
        return Ok(LintConfig::default());
    }
    let cwd = std::env::current_dir()?;
    Ok(LintConfig::discover(&cwd).unwrap_or_default())
}

/// The diagnostics pipeline. Collects issues from the primary report and
/// the extra analyzers, merges them, and prepares the displayed group.
pub struct Pipeline {
    targets: Vec<String>,
    config: LintConfig,
    primary: PrimarySource,
    max_issues: usize,
    timeout: Option<Duration>,
}

impl Pipeline {
    pub fn new(args: &RunArgs) -> Result<Self> {
        let config = load_config(&args.settings)?;

        let primary = if args.no_primary || !config.primary.enabled {
            PrimarySource::Disabled
        } else {
            match args.report.as_deref() {
                Some(p) if p == Path::new("-") => PrimarySource::Stdin,
                Some(p) => PrimarySource::File(p.to_path_buf()),
                None => PrimarySource::Command(config.primary.command.clone()),
            }
        };

        let max_issues = args.max_issues.unwrap_or(config.output.max_issues);
        let timeout = args.timeout.filter(|s| *s > 0).map(Duration::from_secs);

        Ok(Self::with_config(
            args.targets.clone(),
            config,
            primary,
            max_issues,
            timeout,
        ))
    }

    pub fn with_config(
        targets: Vec<String>,
        config: LintConfig,
        primary: PrimarySource,
        max_issues: usize,
        timeout: Option<Duration>,
    ) -> Self {
        let targets = if targets.is_empty() {
            vec![DEFAULT_TARGET.to_string()]
        } else {
            targets
        };
        Pipeline {
            targets,
            config,
            primary,
            max_issues,
            timeout,
        }
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Run against real processes and the analyzers found on PATH
    pub fn run(&self) -> Result<DigestReport, LintError> {
        let primary_runner = ProcessRunner::new(ExecOptions {
            timeout: self.timeout,
            merge_stderr: false,
        });
        let analyzer_runner = ProcessRunner::new(ExecOptions {
            timeout: self.timeout,
            merge_stderr: true,
        });
        self.run_with(
            &primary_runner,
            &analyzer_runner,
            detect_auto_analyzers(on_path),
        )
    }

    /// Run the full pipeline. Only a failure to obtain the primary report
    /// is an error; everything else is logged and skipped.
    pub fn run_with(
        &self,
        primary_runner: &impl CommandRunner,
        analyzer_runner: &impl CommandRunner,
        auto_analyzers: Vec<AnalyzerConfig>,
    ) -> Result<DigestReport, LintError> {
        let start = Instant::now();

        // Per-run caches, dropped when the run ends
        let mut paths = PathResolver::new();
        let mut sources = SourceCache::new();

        // Step 1: Primary report
        let mut issues = self.primary.collect(&self.targets, primary_runner)?;

        // Step 2: Extra analyzers, one after another
        let specs = merge_analyzers(auto_analyzers, &self.config.analyzers);
        let orchestrator = Orchestrator::new(specs, analyzer_runner);
        issues.extend(orchestrator.run(&self.targets));

        info!("Raw issues: {}", issues.len());

        // Step 3: Merge, dedup, and sort
        let mut issues = dedupe_issues(issues, &mut paths);
        let priorities = PriorityTable::new(&self.config.priority_levels);
        sort_issues(&mut issues, &priorities);

        info!("Issues after dedup: {}", issues.len());

        // Step 4: Pick the group and render context for what will be shown
        let summary = IssueSummary::from_issues(&issues);
        let group = select_group(&issues, &priorities);
        let limit = if self.max_issues == 0 {
            usize::MAX
        } else {
            self.max_issues
        };

        let displayed: Vec<DisplayedIssue> = group
            .issues
            .iter()
            .take(limit)
            .map(|issue| {
                let abs = paths.resolve(&issue.position.filename);
                DisplayedIssue {
                    id: issue.fingerprint(),
                    context: render_context(
                        &abs,
                        issue.position.line,
                        issue.position.column,
                        &mut sources,
                    ),
                    doc_url: doc_url(issue),
                    issue: issue.clone(),
                }
            })
            .collect();

        debug!("Read {} source file(s) for context", sources.cached_files());

        Ok(DigestReport {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            targets: self.targets.clone(),
            duration_ms: start.elapsed().as_millis() as u64,
            group_size: group.issues.len(),
            hidden: group.issues.len().saturating_sub(displayed.len()),
            group: group.kind,
            issues: displayed,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PriorityLevel;
    use crate::engine::exec::Capture;
    use crate::report::issue::Severity;
    use crate::report::sorter::GroupKind;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::tempdir;

    /// Returns output keyed by program name
    struct Scripted {
        outputs: Vec<(&'static str, String)>,
        calls: RefCell<Vec<Vec<String>>>,
    }

    impl Scripted {
        fn new(outputs: Vec<(&'static str, String)>) -> Self {
            Scripted {
                outputs,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl CommandRunner for Scripted {
        fn run(&self, name: &str, argv: &[String]) -> Result<Capture, LintError> {
            self.calls.borrow_mut().push(argv.to_vec());
            match self.outputs.iter().find(|(n, _)| *n == name) {
                Some((_, out)) => Ok(Capture {
                    output: out.clone().into_bytes(),
                    status: None,
                    timed_out: false,
                }),
                None => Err(LintError::Launch {
                    name: name.to_string(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                }),
            }
        }
    }

    fn analyzer(name: &str, severity: &str) -> AnalyzerConfig {
        AnalyzerConfig {
            name: name.into(),
            command: vec![name.into(), "{target}".into()],
            severity: severity.into(),
        }
    }

    fn primary_json(file: &str) -> String {
        format!(
            r#"{{"Issues":[
{{"FromLinter":"govet","Text":"printf: wrong verb","Severity":"error","Pos":{{"Filename":"{file}","Line":2,"Column":5}}}},
{{"FromLinter":"staticcheck","Text":"SA4006: x unused","Severity":"warning","Pos":{{"Filename":"{file}","Line":3,"Column":1}}}}
]}}"#
        )
    }

    #[test]
    fn test_full_run_merges_dedupes_and_groups() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("main.go");
        fs::write(&src, "package main\nfunc main() {\n\tx := 1\n}\n").unwrap();
        let file = src.to_string_lossy().to_string();

        let primary = Scripted::new(vec![("golangci-lint", primary_json(&file))]);
        let extra = Scripted::new(vec![(
            "govet",
            // same key as the primary govet issue, but a longer message
            format!("{file}:2:5: printf: wrong verb %d for string\n"),
        )]);

        let mut config = LintConfig::default();
        config.analyzers = vec![analyzer("govet", "error")];
        config.priority_levels = vec![PriorityLevel {
            level: 1,
            name: "critical".into(),
            rules: vec!["govet".into()],
        }];

        let pipeline = Pipeline::with_config(
            vec!["./...".into()],
            config,
            PrimarySource::Command(vec!["golangci-lint".into(), "run".into()]),
            15,
            None,
        );
        let report = pipeline.run_with(&primary, &extra, Vec::new()).unwrap();

        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.errors, 1);
        assert_eq!(report.summary.warnings, 1);
        assert_eq!(
            report.group,
            GroupKind::Level {
                level: 1,
                name: "critical".into()
            }
        );
        assert_eq!(report.issues.len(), 1);
        let shown = &report.issues[0];
        assert_eq!(shown.issue.message, "printf: wrong verb %d for string");
        assert!(shown.context.contains(">    2 | func main() {"));
        assert_eq!(shown.doc_url.as_deref(), Some("https://pkg.go.dev/cmd/vet"));
        assert_eq!(report.exit_code(), 1);
        assert_eq!(
            primary.calls.borrow()[0],
            vec!["golangci-lint", "run", "./..."]
        );
    }

    #[test]
    fn test_clean_run_without_primary() {
        let none = Scripted::new(Vec::new());
        let pipeline = Pipeline::with_config(
            Vec::new(),
            LintConfig::default(),
            PrimarySource::Disabled,
            15,
            None,
        );
        let report = pipeline.run_with(&none, &none, Vec::new()).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.group, GroupKind::All);
        assert_eq!(report.exit_code(), 0);
        assert_eq!(pipeline.targets(), ["./...".to_string()]);
    }

    #[test]
    fn test_primary_launch_failure_is_fatal() {
        let none = Scripted::new(Vec::new());
        let pipeline = Pipeline::with_config(
            Vec::new(),
            LintConfig::default(),
            PrimarySource::Command(vec!["golangci-lint".into()]),
            15,
            None,
        );
        assert!(matches!(
            pipeline.run_with(&none, &none, Vec::new()),
            Err(LintError::Launch { .. })
        ));
    }

    #[test]
    fn test_display_cap_and_auto_analyzer_override() {
        let out: String = (1..=5)
            .map(|i| format!("missing.go:{i}:1: finding {i}\n"))
            .collect();
        let extra = Scripted::new(vec![("smbgo", out)]);
        let none = Scripted::new(Vec::new());

        let mut config = LintConfig::default();
        // user entry replaces the detected one, including severity
        config.analyzers = vec![analyzer("smbgo", "warning")];

        let pipeline = Pipeline::with_config(
            vec!["./pkg".into()],
            config,
            PrimarySource::Disabled,
            2,
            None,
        );
        let auto = detect_auto_analyzers(|_| true);
        let report = pipeline.run_with(&none, &extra, auto).unwrap();

        assert_eq!(report.group_size, 5);
        assert_eq!(report.issues.len(), 2);
        assert_eq!(report.hidden, 3);
        assert_eq!(report.issues[0].issue.severity, Severity::Warning);
        assert!(report.issues[0].context.contains("could not read file"));
        assert_eq!(report.exit_code(), 0);
        assert_eq!(extra.calls.borrow()[0], vec!["smbgo", "./pkg"]);
    }
}
