use serde::Serialize;

use crate::report::issue::{Issue, IssueSummary};
use crate::report::sorter::GroupKind;

/// One issue as it will be shown, with its rendered context
#[derive(Debug, Clone, Serialize)]
pub struct DisplayedIssue {
    /// Deterministic ID, see [`Issue::fingerprint`]
    pub id: String,

    #[serde(flatten)]
    pub issue: Issue,

    /// Source window with caret, or a note explaining why there is none
    pub context: String,

    pub doc_url: Option<String>,
}

/// The result of one run
#[derive(Debug, Clone, Serialize)]
pub struct DigestReport {
    pub version: String,

    /// When the run was performed
    pub timestamp: String,

    pub targets: Vec<String>,

    pub duration_ms: u64,

    /// Which group was selected for display
    pub group: GroupKind,

    /// Size of the selected group before the display cap
    pub group_size: usize,

    /// Issues of the selected group, capped at the configured maximum
    pub issues: Vec<DisplayedIssue>,

    /// Issues of the selected group that were not rendered
    pub hidden: usize,

    /// Counts over every issue after dedup, not only the displayed group
    pub summary: IssueSummary,
}

impl DigestReport {
    /// Process exit code: 1 when any error-severity issue remains
    pub fn exit_code(&self) -> i32 {
        if self.summary.has_errors() {
            1
        } else {
            0
        }
    }

    pub fn is_clean(&self) -> bool {
        self.summary.total == 0
    }

    pub fn heading(&self) -> String {
        self.group.heading(self.group_size)
    }
}

impl DisplayedIssue {
    /// Header line: label, location, tool and trimmed message
    pub fn headline(&self) -> String {
        format!(
            "{} {}:{}:{} @{} - {}",
            self.issue.severity.label(),
            self.issue.position.filename,
            self.issue.position.line,
            self.issue.position.column,
            self.issue.tool,
            self.issue.message.trim()
        )
    }
}
