use std::io::Read;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::engine::exec::CommandRunner;
use crate::error::LintError;
use crate::report::issue::{Issue, Position, Severity};

/// Raw output longer than this is cut when echoed back
const SANITIZED_LIMIT: usize = 4096;

/// Wire shape of a golangci-lint style JSON report
#[derive(Debug, Default, Deserialize)]
struct RawReport {
    #[serde(rename = "Issues", default)]
    issues: Option<Vec<RawIssue>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawIssue {
    #[serde(rename = "FromLinter")]
    from_linter: String,
    #[serde(rename = "Text")]
    text: String,
    #[serde(rename = "Severity")]
    severity: String,
    #[serde(rename = "Pos")]
    pos: RawPosition,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPosition {
    #[serde(rename = "Filename")]
    filename: String,
    #[serde(rename = "Line")]
    line: usize,
    #[serde(rename = "Column")]
    column: usize,
}

impl From<RawIssue> for Issue {
    fn from(raw: RawIssue) -> Self {
        Issue::new(
            raw.from_linter,
            raw.text,
            Severity::normalize(&raw.severity),
            Position {
                filename: raw.pos.filename,
                line: raw.pos.line,
                column: raw.pos.column,
            },
        )
    }
}

/// Where the pre-structured report comes from
#[derive(Debug, Clone)]
pub enum PrimarySource {
    /// Run this command with the targets appended
    Command(Vec<String>),
    /// Read a report file
    File(PathBuf),
    Stdin,
    Disabled,
}

impl PrimarySource {
    /// Gather issues from the primary source.
    ///
    /// Malformed payloads are recovered here: the raw output is echoed and
    /// an empty list returned. An error means no payload could be obtained
    /// at all and the run should stop.
    pub fn collect(&self, targets: &[String], runner: &impl CommandRunner) -> Result<Vec<Issue>, LintError> {
        let raw = match self {
            PrimarySource::Disabled => return Ok(Vec::new()),
            PrimarySource::File(path) => std::fs::read(path).map_err(|source| LintError::Io {
                path: path.clone(),
                source,
            })?,
            PrimarySource::Stdin => {
                let mut buf = Vec::new();
                std::io::stdin()
                    .read_to_end(&mut buf)
                    .map_err(|source| LintError::Io {
                        path: PathBuf::from("<stdin>"),
                        source,
                    })?;
                buf
            }
            PrimarySource::Command(command) => {
                let Some(program) = command.first() else {
                    return Ok(Vec::new());
                };
                let mut argv = command.clone();
                argv.extend(targets.iter().cloned());

                let capture = runner.run(program, &argv)?;
                if capture.timed_out {
                    warn!("{} timed out; parsing partial output", program);
                }
                if capture.output.iter().all(u8::is_ascii_whitespace) && !capture.success() {
                    return Err(LintError::PrimaryFailed {
                        name: program.clone(),
                        status: capture.status_text(),
                    });
                }
                capture.output
            }
        };

        if raw.iter().all(u8::is_ascii_whitespace) {
            debug!("Primary source produced no output");
            return Ok(Vec::new());
        }

        match decode_report(&raw) {
            Ok(issues) => {
                info!("Primary report: {} issue(s)", issues.len());
                Ok(issues)
            }
            Err(e) => {
                warn!("❌ could not parse primary report: {}", e);
                if let Some(text) = sanitize(&raw) {
                    eprintln!("{}", text);
                }
                Ok(Vec::new())
            }
        }
    }
}

/// Slice out the JSON object, skipping any noise the tool printed around it
pub fn extract_json(raw: &[u8]) -> Result<&[u8], LintError> {
    let trimmed = raw.trim_ascii();
    let start = trimmed.iter().position(|&b| b == b'{');
    let end = trimmed.iter().rposition(|&b| b == b'}');
    let (Some(start), Some(end)) = (start, end) else {
        return Err(LintError::NoJsonObject);
    };
    if start > end {
        return Err(LintError::NoJsonObject);
    }

    let candidate = &trimmed[start..=end];
    if !contains(candidate, br#""Issues""#) {
        return Err(LintError::UnexpectedPayload);
    }
    Ok(candidate)
}

pub fn decode_report(raw: &[u8]) -> Result<Vec<Issue>, LintError> {
    let json = extract_json(raw)?;
    let report: RawReport = serde_json::from_slice(json)?;
    Ok(report
        .issues
        .unwrap_or_default()
        .into_iter()
        .map(Issue::from)
        .collect())
}

/// Trimmed raw output capped for display; `None` when blank
pub fn sanitize(raw: &[u8]) -> Option<String> {
    let cleaned = raw.trim_ascii();
    if cleaned.is_empty() {
        return None;
    }
    if cleaned.len() > SANITIZED_LIMIT {
        let head = String::from_utf8_lossy(&cleaned[..SANITIZED_LIMIT - 3]);
        return Some(format!("{}...", head));
    }
    Some(String::from_utf8_lossy(cleaned).into_owned())
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
