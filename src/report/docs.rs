use once_cell::sync::Lazy;
use regex::Regex;

use crate::report::issue::Issue;

/// staticcheck / gosimple / stylecheck check identifiers
static CHECK_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:SA\d{4}|S\d{4}|ST\d{4})\b").unwrap());

/// First staticcheck-style check code mentioned in the message
pub fn check_code(text: &str) -> Option<&str> {
    CHECK_CODE.find(text).map(|m| m.as_str())
}

/// Documentation page for the rule behind an issue, when one is known
pub fn doc_url(issue: &Issue) -> Option<String> {
    if let Some(code) = check_code(&issue.message) {
        return Some(format!("https://staticcheck.dev/docs/checks#{}", code));
    }
    match issue.tool.to_lowercase().as_str() {
        "govet" => Some("https://pkg.go.dev/cmd/vet".to_string()),
        "revive" => Some("https://revive.run/".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::issue::{Position, Severity};

    fn issue(tool: &str, text: &str) -> Issue {
        Issue::new(
            tool,
            text,
            Severity::Warning,
            Position {
                filename: "a.go".into(),
                line: 1,
                column: 1,
            },
        )
    }

    #[test]
    fn test_check_code_links_to_staticcheck() {
        let is = issue("staticcheck", "SA4006: this value of x is never used");
        assert_eq!(
            doc_url(&is).as_deref(),
            Some("https://staticcheck.dev/docs/checks#SA4006")
        );
        assert_eq!(check_code("ST1003 naming"), Some("ST1003"));
        assert_eq!(check_code("XSA1000"), None);
    }

    #[test]
    fn test_tool_fallbacks() {
        assert_eq!(
            doc_url(&issue("GoVet", "printf: wrong type")).as_deref(),
            Some("https://pkg.go.dev/cmd/vet")
        );
        assert_eq!(
            doc_url(&issue("revive", "exported: comment")).as_deref(),
            Some("https://revive.run/")
        );
        assert_eq!(doc_url(&issue("errcheck", "unchecked error")), None);
    }
}
