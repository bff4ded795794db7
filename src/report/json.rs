use anyhow::Result;
use crate::report::digest::DigestReport;

/// Render a digest as pretty-printed JSON
pub fn render(report: &DigestReport) -> Result<String> {
    let json = serde_json::to_string_pretty(report)?;
    Ok(json)
}
