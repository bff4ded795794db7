use comfy_table::{presets::UTF8_FULL, Table};

use crate::config::LintConfig;
use crate::engine::analyzers::{detect_auto_analyzers, merge_analyzers, on_path, AnalyzerSpec};
use crate::report::priority::PriorityTable;

/// List the analyzers a run would execute, in execution order
pub fn list_analyzers(config: &LintConfig) {
    let specs = merge_analyzers(detect_auto_analyzers(on_path), &config.analyzers);
    let priorities = PriorityTable::new(&config.priority_levels);

    println!();
    println!("🔍 lintdigest — Analyzers");
    println!();

    if config.primary.enabled {
        println!("  Primary: {}", config.primary.command.join(" "));
    } else {
        println!("  Primary: disabled");
    }
    println!();

    if specs.is_empty() {
        println!("  No extra analyzers detected or configured.");
        println!("  Run `lintdigest init` and add [[analyzers]] entries to declare some.");
        println!();
        return;
    }

    println!("{}", analyzer_table(&specs, &priorities));
    println!();
    println!("  {} analyzer(s) loaded", specs.len());
    println!();
}

fn analyzer_table(specs: &[AnalyzerSpec], priorities: &PriorityTable) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Name", "Severity", "Priority", "Command"]);

    for spec in specs {
        let level = priorities
            .level_of_tool(&spec.name)
            .map(|l| format!("{} ({})", l.level, l.name))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            spec.name.clone(),
            spec.severity.to_string(),
            level,
            spec.command.join(" "),
        ]);
    }
    table
}
