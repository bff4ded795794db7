use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Per-run cache from reported path to absolute path.
///
/// Resolution is purely lexical: nothing is read from disk and symlinks are
/// left alone, so paths of files that no longer exist still compare equal.
#[derive(Debug, Default)]
pub struct PathResolver {
    base: Option<PathBuf>,
    cache: HashMap<String, PathBuf>,
}

impl PathResolver {
    /// Resolve relative paths against the process working directory
    pub fn new() -> Self {
        Self::with_base(std::env::current_dir().ok())
    }

    /// Resolve relative paths against `base`; `None` keeps them relative
    pub fn with_base(base: Option<PathBuf>) -> Self {
        PathResolver {
            base,
            cache: HashMap::new(),
        }
    }

    /// Absolute, cleaned form of `path`. An empty path stays empty.
    pub fn resolve(&mut self, path: &str) -> PathBuf {
        if path.is_empty() {
            return PathBuf::new();
        }
        if let Some(hit) = self.cache.get(path) {
            return hit.clone();
        }

        let raw = Path::new(path);
        let resolved = match &self.base {
            Some(base) if !raw.is_absolute() => clean(&base.join(raw)),
            _ => clean(raw),
        };
        self.cache.insert(path.to_string(), resolved.clone());
        resolved
    }

    /// Case-insensitive key used to decide whether two reports point at
    /// the same file.
    pub fn canonical_key(&mut self, path: &str) -> String {
        self.resolve(path).to_string_lossy().to_lowercase()
    }
}

/// Lexically remove `.` and `..` components
pub fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
