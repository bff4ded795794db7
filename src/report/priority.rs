use std::collections::HashMap;

use crate::config::PriorityLevel;
use crate::report::issue::Issue;

/// Priority of a tool that no level claims. Sorts after every real level.
pub const UNPRIORITIZED: i64 = i64::MAX;

/// Index from lower-cased tool name to priority level.
///
/// Non-positive levels and empty rule names are ignored. When the same tool
/// is listed under several levels, the last declaration wins.
#[derive(Debug, Clone, Default)]
pub struct PriorityTable {
    levels: Vec<PriorityLevel>,
    index: HashMap<String, i64>,
}

impl PriorityTable {
    pub fn new(levels: &[PriorityLevel]) -> Self {
        let mut index = HashMap::new();
        for lvl in levels.iter().filter(|l| l.level > 0) {
            for rule in lvl.rules.iter().filter(|r| !r.is_empty()) {
                index.insert(rule.to_lowercase(), lvl.level);
            }
        }

        let mut levels: Vec<PriorityLevel> =
            levels.iter().filter(|l| l.level > 0).cloned().collect();
        levels.sort_by_key(|l| l.level);

        PriorityTable { levels, index }
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Positive levels in ascending order
    pub fn levels(&self) -> &[PriorityLevel] {
        &self.levels
    }

    pub fn priority_of(&self, issue: &Issue) -> i64 {
        self.priority_of_tool(&issue.tool)
    }

    /// Level for a tool name, case-insensitive
    pub fn priority_of_tool(&self, tool: &str) -> i64 {
        self.index
            .get(&tool.to_lowercase())
            .copied()
            .unwrap_or(UNPRIORITIZED)
    }

    /// The level entry that claims `tool`, if any
    pub fn level_of_tool(&self, tool: &str) -> Option<&PriorityLevel> {
        let level = self.priority_of_tool(tool);
        if level == UNPRIORITIZED {
            return None;
        }
        let key = tool.to_lowercase();
        self.levels
            .iter()
            .rev()
            .find(|l| l.level == level && l.rules.iter().any(|r| r.to_lowercase() == key))
    }
}
