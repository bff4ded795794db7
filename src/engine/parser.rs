//! Parser for compiler-style tool output.
//!
//! A diagnostic starts with a header line `<path>:<line>:<column>: <message>`.
//! Lines after a header that are not headers themselves continue its message.
//! Everything else is noise.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::report::issue::{Issue, Position, Severity};

/// Non-greedy path so drive letters and other colons stay in the path,
/// anchored on the first `:digits:digits:` group.
static HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+?):(\d+):(\d+):\s*(.+)$").unwrap());

/// Outcome of testing a single line against the header pattern
#[derive(Debug, PartialEq, Eq)]
enum Header<'a> {
    Valid {
        path: &'a str,
        line: usize,
        column: usize,
        text: &'a str,
    },
    /// Header-shaped, but line or column is not a positive integer
    Malformed,
    NotHeader,
}

fn classify(line: &str) -> Header<'_> {
    let Some(caps) = HEADER.captures(line) else {
        return Header::NotHeader;
    };
    let (Some(path), Some(ln), Some(col), Some(text)) = (caps.get(1), caps.get(2), caps.get(3), caps.get(4))
    else {
        return Header::NotHeader;
    };
    match (ln.as_str().parse::<usize>(), col.as_str().parse::<usize>()) {
        (Ok(line), Ok(column)) if line > 0 && column > 0 => Header::Valid {
            path: path.as_str(),
            line,
            column,
            text: text.as_str().trim(),
        },
        _ => Header::Malformed,
    }
}

/// A diagnostic whose message is still collecting continuation lines
struct Pending {
    position: Position,
    lines: Vec<String>,
}

impl Pending {
    fn finish(self, tool: &str, severity: &Severity) -> Issue {
        Issue::new(tool, self.lines.join("\n"), severity.clone(), self.position)
    }
}

enum State {
    ScanningForHeader,
    Accumulating(Pending),
}

/// Turn raw tool output into issues tagged with `tool` and `severity`.
///
/// Pure: the same input always yields the same issues.
pub fn parse_diagnostics(output: &[u8], tool: &str, severity: &Severity) -> Vec<Issue> {
    let text = String::from_utf8_lossy(output).replace("\r\n", "\n");
    let mut issues = Vec::new();
    let mut state = State::ScanningForHeader;

    // the newline ending the last line does not open an empty one
    for raw in text.lines() {
        let trimmed = raw.trim();

        state = match (classify(trimmed), state) {
            (Header::Valid { path, line, column, text }, prev) => {
                if let State::Accumulating(pending) = prev {
                    issues.push(pending.finish(tool, severity));
                }
                State::Accumulating(Pending {
                    position: Position {
                        filename: path.to_string(),
                        line,
                        column,
                    },
                    lines: vec![text.to_string()],
                })
            }
            (Header::Malformed, prev) => {
                if let State::Accumulating(pending) = prev {
                    issues.push(pending.finish(tool, severity));
                }
                State::ScanningForHeader
            }
            (Header::NotHeader, State::Accumulating(mut pending)) => {
                if trimmed.is_empty() {
                    pending.lines.push(String::new());
                } else {
                    pending.lines.push(raw.trim_end_matches('\r').to_string());
                }
                State::Accumulating(pending)
            }
            (Header::NotHeader, State::ScanningForHeader) => State::ScanningForHeader,
        };
    }

    if let State::Accumulating(pending) = state {
        issues.push(pending.finish(tool, severity));
    }

    issues
}
