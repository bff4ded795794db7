use std::cmp::Ordering;
use std::collections::HashMap;

use crate::report::issue::Issue;
use crate::report::paths::PathResolver;

/// Identity of a diagnostic: two issues with the same key are the same
/// finding even when their messages differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub tool: String,
}

impl DedupKey {
    pub fn of(issue: &Issue, paths: &mut PathResolver) -> Self {
        DedupKey {
            file: paths.canonical_key(&issue.position.filename),
            line: issue.position.line,
            column: issue.position.column,
            tool: issue.tool.to_lowercase(),
        }
    }
}

/// Deduplicate issues, keeping first-seen order of distinct keys.
/// Colliding issues are resolved with [`compare_preference`].
pub fn dedupe_issues(issues: Vec<Issue>, paths: &mut PathResolver) -> Vec<Issue> {
    let mut slots: HashMap<DedupKey, usize> = HashMap::new();
    let mut kept: Vec<Issue> = Vec::with_capacity(issues.len());

    for issue in issues {
        let key = DedupKey::of(&issue, paths);
        match slots.get(&key) {
            Some(&slot) => {
                if compare_preference(&issue, &kept[slot]) == Ordering::Greater {
                    kept[slot] = issue;
                }
            }
            None => {
                slots.insert(key, kept.len());
                kept.push(issue);
            }
        }
    }

    kept
}

/// Total order over issues sharing a key; `Greater` means `a` is preferred.
///
/// Higher severity wins, then a "did you mean" hint, then the longer
/// message. Remaining ties fall back to plain field comparison so the
/// winner never depends on arrival order.
pub fn compare_preference(a: &Issue, b: &Issue) -> Ordering {
    a.severity
        .rank()
        .cmp(&b.severity.rank())
        .then_with(|| has_hint(a).cmp(&has_hint(b)))
        .then_with(|| a.message.len().cmp(&b.message.len()))
        .then_with(|| b.message.cmp(&a.message))
        .then_with(|| b.severity.as_str().cmp(a.severity.as_str()))
        .then_with(|| b.position.filename.cmp(&a.position.filename))
        .then_with(|| b.tool.cmp(&a.tool))
}

fn has_hint(issue: &Issue) -> bool {
    issue.message.to_lowercase().contains("did you mean")
}
