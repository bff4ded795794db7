use serde::Serialize;

use crate::report::issue::Issue;
use crate::report::priority::PriorityTable;

/// Sort by severity (most severe first), then priority level, then location.
/// The sort is stable, so fully tied issues keep their merge order.
pub fn sort_issues(issues: &mut [Issue], priorities: &PriorityTable) {
    issues.sort_by(|a, b| {
        b.severity
            .rank()
            .cmp(&a.severity.rank())
            .then_with(|| priorities.priority_of(a).cmp(&priorities.priority_of(b)))
            .then_with(|| a.position.filename.cmp(&b.position.filename))
            .then_with(|| a.position.line.cmp(&b.position.line))
            .then_with(|| a.position.column.cmp(&b.position.column))
    });
}

/// Which slice of the sorted issues is shown this run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GroupKind {
    /// The most urgent priority level that has at least one issue
    Level { level: i64, name: String },
    /// No table, or no level matched: everything
    All,
}

#[derive(Debug, Clone)]
pub struct IssueGroup {
    pub kind: GroupKind,
    pub issues: Vec<Issue>,
}

impl GroupKind {
    pub fn heading(&self, count: usize) -> String {
        match self {
            GroupKind::Level { level, name } => {
                format!("=== Level {}: {} ({} issues) ===", level, name, count)
            }
            GroupKind::All => format!("=== Issues ({} items) ===", count),
        }
    }
}

/// Pick the displayed group from already-sorted issues.
///
/// Levels are scanned in ascending order and the first one with matching
/// issues becomes the only group shown. Lower-urgency levels are left out
/// on purpose until the urgent ones are fixed.
pub fn select_group(sorted: &[Issue], priorities: &PriorityTable) -> IssueGroup {
    if !priorities.is_empty() {
        for lvl in priorities.levels() {
            let matching: Vec<Issue> = sorted
                .iter()
                .filter(|is| priorities.priority_of(is) == lvl.level)
                .cloned()
                .collect();
            if !matching.is_empty() {
                return IssueGroup {
                    kind: GroupKind::Level {
                        level: lvl.level,
                        name: lvl.name.clone(),
                    },
                    issues: matching,
                };
            }
        }
    }

    IssueGroup {
        kind: GroupKind::All,
        issues: sorted.to_vec(),
    }
}
