use owo_colors::OwoColorize;

use crate::report::digest::{DigestReport, DisplayedIssue};
use crate::report::issue::Severity;

fn use_colors() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Render a digest to the terminal
pub fn render(report: &DigestReport) {
    print!("{}", format_report(report, use_colors()));
}

/// Build the full terminal text for a digest
pub fn format_report(report: &DigestReport, color: bool) -> String {
    let mut out = String::new();

    if report.is_clean() {
        out.push_str(&format!("\n{}\n", summary_line(report, color)));
        return out;
    }

    let heading = report.heading();
    if color {
        out.push_str(&format!("\n{}\n", heading.bold()));
    } else {
        out.push_str(&format!("\n{}\n", heading));
    }

    for shown in &report.issues {
        out.push('\n');
        out.push_str(&format_issue(shown, color));
    }

    if report.hidden > 0 {
        let more = format!("... and {} more in this group", report.hidden);
        if color {
            out.push_str(&format!("\n{}\n", more.dimmed()));
        } else {
            out.push_str(&format!("\n{}\n", more));
        }
    }

    out.push_str(&format!("\n{}\n", summary_line(report, color)));
    out
}

fn format_issue(shown: &DisplayedIssue, color: bool) -> String {
    let headline = shown.headline();
    let headline = if color {
        match shown.issue.severity {
            Severity::Error => headline.red().bold().to_string(),
            Severity::Warning => headline.yellow().bold().to_string(),
            _ => headline.blue().to_string(),
        }
    } else {
        headline
    };

    let mut out = format!("{}\n{}\n", headline, shown.context);
    if let Some(ref url) = shown.doc_url {
        out.push_str(&format!(" 📖 docs: {}\n", url));
    }
    out
}

fn summary_line(report: &DigestReport, color: bool) -> String {
    let line = format!(
        "📊 Total: {} errors, {} warnings.",
        report.summary.errors, report.summary.warnings
    );
    if !color {
        return line;
    }
    if report.summary.has_errors() {
        line.red().bold().to_string()
    } else {
        line.green().to_string()
    }
}
