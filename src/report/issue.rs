use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Severity of a diagnostic.
///
/// The three known tiers rank above any custom severity an analyzer
/// declares; custom values are kept lower-cased so they still print.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Other(String),
}

impl Severity {
    /// Case-insensitive mapping of a declared severity. An empty value is
    /// treated as blocking.
    pub fn normalize(raw: &str) -> Self {
        let lower = raw.trim().to_lowercase();
        match lower.as_str() {
            "" | "error" => Severity::Error,
            "warn" | "warning" => Severity::Warning,
            "info" | "information" => Severity::Info,
            _ => Severity::Other(lower),
        }
    }

    /// Ranking used for sorting and duplicate resolution.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Error => 3,
            Severity::Warning => 2,
            Severity::Info => 1,
            Severity::Other(_) => 0,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Other(s) => s,
        }
    }

    /// Fixed-width label shown in front of each rendered issue.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "[ERROR]",
            Severity::Warning => "[WARN ]",
            _ => "[INFO ]",
        }
    }
}

impl From<String> for Severity {
    fn from(s: String) -> Self {
        Severity::normalize(&s)
    }
}

impl From<Severity> for String {
    fn from(s: Severity) -> Self {
        s.as_str().to_string()
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Location of a diagnostic exactly as the tool reported it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// File path, not yet canonicalized. May be empty when the tool gave none.
    pub filename: String,
    /// 1-based line
    pub line: usize,
    /// 1-based column
    pub column: usize,
}

/// A single normalized diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Analyzer or linter that produced this issue
    pub tool: String,

    /// Message text, possibly spanning several lines
    pub message: String,

    pub severity: Severity,

    pub position: Position,
}

impl Issue {
    pub fn new(
        tool: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
        position: Position,
    ) -> Self {
        Issue {
            tool: tool.into(),
            message: message.into(),
            severity,
            position,
        }
    }

    /// Deterministic ID based on tool and location, e.g. "LD-1f2e3d4c"
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.tool.to_lowercase().as_bytes());
        hasher.update(self.position.filename.as_bytes());
        hasher.update(self.position.line.to_string().as_bytes());
        hasher.update(b":");
        hasher.update(self.position.column.to_string().as_bytes());
        let hex = format!("{:x}", hasher.finalize());
        format!("LD-{}", &hex[..8])
    }
}

/// Summary counts over the deduplicated issue set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl IssueSummary {
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut summary = IssueSummary {
            total: issues.len(),
            ..Default::default()
        };
        for issue in issues {
            match issue.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => summary.infos += 1,
                Severity::Other(_) => {}
            }
        }
        summary
    }

    /// The run fails whenever an error-severity issue survives dedup.
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue_at(tool: &str, file: &str, line: usize, column: usize) -> Issue {
        Issue::new(
            tool,
            "msg",
            Severity::Error,
            Position {
                filename: file.into(),
                line,
                column,
            },
        )
    }

    #[test]
    fn test_normalize_known_aliases() {
        assert_eq!(Severity::normalize("ERROR"), Severity::Error);
        assert_eq!(Severity::normalize("Warn"), Severity::Warning);
        assert_eq!(Severity::normalize("warning"), Severity::Warning);
        assert_eq!(Severity::normalize("information"), Severity::Info);
        assert_eq!(Severity::normalize("Info"), Severity::Info);
    }

    #[test]
    fn test_normalize_empty_is_error_and_custom_passes_through() {
        assert_eq!(Severity::normalize(""), Severity::Error);
        assert_eq!(Severity::normalize("Hint"), Severity::Other("hint".into()));
        assert_eq!(Severity::normalize("Hint").rank(), 0);
        assert_eq!(Severity::normalize("Hint").label(), "[INFO ]");
    }

    #[test]
    fn test_rank_order() {
        assert!(Severity::Error.rank() > Severity::Warning.rank());
        assert!(Severity::Warning.rank() > Severity::Info.rank());
        assert!(Severity::Info.rank() > Severity::Other("x".into()).rank());
    }

    #[test]
    fn test_severity_serializes_as_string() {
        let json = serde_json::to_string(&Severity::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
        let back: Severity = serde_json::from_str("\"WARN\"").unwrap();
        assert_eq!(back, Severity::Warning);
    }

    #[test]
    fn test_fingerprint_ignores_message_and_tool_case() {
        let a = issue_at("govet", "a.go", 1, 2);
        let mut b = issue_at("GoVet", "a.go", 1, 2);
        b.message = "different".into();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert!(a.fingerprint().starts_with("LD-"));
        assert_ne!(a.fingerprint(), issue_at("govet", "a.go", 12, 0).fingerprint());
    }

    #[test]
    fn test_summary_counts() {
        let mut issues = vec![issue_at("a", "x.go", 1, 1), issue_at("b", "x.go", 2, 1)];
        issues[1].severity = Severity::Warning;
        issues.push(Issue {
            severity: Severity::Other("style".into()),
            ..issue_at("c", "x.go", 3, 1)
        });
        let summary = IssueSummary::from_issues(&issues);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.warnings, 1);
        assert_eq!(summary.infos, 0);
        assert!(summary.has_errors());
    }
}
