//! Source snippets around a diagnostic location.
//!
//! Output looks like:
//! ```text
//!       9 | func f() {
//!      10 |     x := 1
//!  >   11 |     return y
//!                     ^
//!      12 | }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Lines shown before the target line
const LINES_BEFORE: usize = 2;
/// Lines shown after the target line
const LINES_AFTER: usize = 1;

/// Per-run cache of file contents split into lines.
/// Each distinct path is read at most once, failed reads included.
#[derive(Debug, Default)]
pub struct SourceCache {
    files: HashMap<PathBuf, Result<Vec<String>, String>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines of `path`, or the read error text. Bytes that are not valid
    /// UTF-8 are shown as replacement characters.
    pub fn lines(&mut self, path: &Path) -> Result<&[String], &str> {
        let entry = self.files.entry(path.to_path_buf()).or_insert_with(|| {
            debug!("Reading {} for context", path.display());
            std::fs::read(path)
                .map(|bytes| {
                    String::from_utf8_lossy(&bytes)
                        .lines()
                        .map(str::to_string)
                        .collect()
                })
                .map_err(|e| e.to_string())
        });
        match entry {
            Ok(lines) => Ok(lines.as_slice()),
            Err(e) => Err(e.as_str()),
        }
    }

    pub fn cached_files(&self) -> usize {
        self.files.len()
    }
}

/// Render the window around `line`/`column` in `path`.
///
/// Failures never abort the caller; they come back as a one-line note.
pub fn render_context(path: &Path, line: usize, column: usize, cache: &mut SourceCache) -> String {
    if path.as_os_str().is_empty() {
        return " (no context available: missing file path)".to_string();
    }

    let lines = match cache.lines(path) {
        Ok(lines) => lines,
        Err(e) => return format!(" (could not read file for context: {})", e),
    };

    if line == 0 || line > lines.len() {
        return " (context not available: invalid line number)".to_string();
    }

    let start = line.saturating_sub(LINES_BEFORE).max(1);
    let end = (line + LINES_AFTER).min(lines.len());

    let mut out = Vec::with_capacity(end - start + 2);
    for number in start..=end {
        let marker = if number == line { ">" } else { " " };
        let prefix = format!(" {} {:>4} | ", marker, number);
        let text = &lines[number - 1];
        out.push(format!("{}{}", prefix, text));
        if number == line {
            out.push(caret_line(&prefix, text, column));
        }
    }
    out.join("\n")
}

/// Caret under `column`, clamped to the line. Columns below 1 count as 1.
fn caret_line(prefix: &str, text: &str, column: usize) -> String {
    let offset = column.max(1) - 1;
    let offset = offset.min(text.chars().count());
    format!("{}^", " ".repeat(prefix.chars().count() + offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_window_two_before_one_after() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "a.go", "l1\nl2\nl3\nl4\nl5\nl6\n");
        let mut cache = SourceCache::new();
        let out = render_context(&path, 4, 2, &mut cache);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "      2 | l2",
                "      3 | l3",
                " >    4 | l4",
                "           ^",
                "      5 | l5",
            ]
        );
    }

    #[test]
    fn test_single_line_file_clamps_window_and_column() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "one.go", "abc\n");
        let mut cache = SourceCache::new();
        let out = render_context(&path, 1, 99, &mut cache);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], " >    1 | abc");
        // prefix is 10 chars wide, caret sits after the last character
        assert_eq!(lines[1], format!("{}^", " ".repeat(13)));
    }

    #[test]
    fn test_column_below_one_counts_as_one() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "c.go", "xyz");
        let mut cache = SourceCache::new();
        let out = render_context(&path, 1, 0, &mut cache);
        assert_eq!(out.lines().nth(1).unwrap(), format!("{}^", " ".repeat(10)));
    }

    #[test]
    fn test_crlf_lines_are_normalized() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "w.go", "a\r\nb\r\n");
        let mut cache = SourceCache::new();
        let out = render_context(&path, 2, 1, &mut cache);
        assert!(out.contains(" >    2 | b"));
        assert!(!out.contains('\r'));
    }

    #[test]
    fn test_failure_messages() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "short.go", "only\n");
        let mut cache = SourceCache::new();

        assert!(render_context(Path::new(""), 1, 1, &mut cache).contains("no context available"));
        assert!(render_context(&path, 5, 1, &mut cache).contains("invalid line number"));
        assert!(render_context(&path, 0, 1, &mut cache).contains("invalid line number"));
        let missing = dir.path().join("missing.go");
        assert!(render_context(&missing, 1, 1, &mut cache).contains("could not read file"));
    }

    #[test]
    fn test_file_read_once() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "a.go", "one\ntwo\n");
        let mut cache = SourceCache::new();
        render_context(&path, 1, 1, &mut cache);
        fs::remove_file(&path).unwrap();
        // still served from the cache after the file is gone
        assert!(render_context(&path, 2, 1, &mut cache).contains("two"));
        assert_eq!(cache.cached_files(), 1);
    }

    #[test]
    fn test_failed_read_is_cached_too() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("late.go");
        let mut cache = SourceCache::new();
        assert!(render_context(&path, 1, 1, &mut cache).contains("could not read file"));
        // created after the first lookup; the cached failure is reused
        fs::write(&path, "now here\n").unwrap();
        assert!(render_context(&path, 1, 1, &mut cache).contains("could not read file"));
        assert_eq!(cache.cached_files(), 1);
    }

    #[test]
    fn test_non_utf8_source_still_renders() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin1.c");
        fs::write(&path, b"int x;\n/* caf\xe9 */ int y;\n").unwrap();
        let mut cache = SourceCache::new();
        let out = render_context(&path, 2, 1, &mut cache);
        assert!(out.contains(" >    2 | /* caf\u{FFFD} */ int y;"));
        assert!(!out.contains("could not read file"));
    }
}
