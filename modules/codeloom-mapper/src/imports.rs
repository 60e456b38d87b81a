//! Import path resolution for rendered output.
//!
//! The proposer's candidate path is probed against the real filesystem,
//! falling back through the paths it actually inspected; files living under
//! a package whose manifest names the package and exposes a root or
//! wildcard export are imported by package name instead of relative path.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

const SOURCE_EXTENSIONS: &[&str] = &["tsx", "ts", "jsx", "js", "mjs", "vue", "svelte"];

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedImport {
    /// What goes inside the import statement's quotes.
    pub specifier: String,
    /// Set when no probe hit and the candidate was kept as a best guess.
    pub warning: Option<String>,
}

pub struct ImportResolver {
    root: PathBuf,
    inspected_paths: Vec<String>,
}

impl ImportResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            inspected_paths: Vec::new(),
        }
    }

    /// Paths the proposer actually read, tried in order when the candidate
    /// itself misses.
    pub fn with_inspected_paths(mut self, paths: Vec<String>) -> Self {
        self.inspected_paths = paths;
        self
    }

    pub fn resolve(&self, candidate: &str) -> ResolvedImport {
        if let Some(file) = self.probe(candidate) {
            return self.finish(candidate, &file);
        }
        for inspected in &self.inspected_paths {
            if let Some(file) = self.probe(inspected) {
                debug!(candidate, fallback = inspected.as_str(), "import resolved via inspected path");
                return self.finish(inspected, &file);
            }
        }
        // Path resolution failures are recoverable by a human reviewing
        // output; keep the best guess and flag it.
        ResolvedImport {
            specifier: strip_known_extension(candidate),
            warning: Some(format!(
                "import path `{candidate}` not found under {}; keeping proposer candidate",
                self.root.display()
            )),
        }
    }

    fn probe(&self, relative: &str) -> Option<PathBuf> {
        let direct = self.root.join(relative);
        if direct.is_file() {
            return Some(direct);
        }
        for ext in SOURCE_EXTENSIONS {
            let with_ext = self.root.join(format!("{relative}.{ext}"));
            if with_ext.is_file() {
                return Some(with_ext);
            }
        }
        None
    }

    fn finish(&self, relative: &str, file: &Path) -> ResolvedImport {
        if let Some(package) = self.package_name_for(file) {
            return ResolvedImport {
                specifier: package,
                warning: None,
            };
        }
        ResolvedImport {
            specifier: strip_known_extension(relative),
            warning: None,
        }
    }

    /// Walk up from the resolved file to the nearest `package.json`. The
    /// package name wins only when the manifest both names the package and
    /// exposes a root (`.`) or wildcard (`./*`) export entry.
    fn package_name_for(&self, file: &Path) -> Option<String> {
        let mut dir = file.parent();
        while let Some(current) = dir {
            let manifest_path = current.join("package.json");
            if manifest_path.is_file() {
                let manifest: Value =
                    serde_json::from_str(&std::fs::read_to_string(&manifest_path).ok()?).ok()?;
                let name = manifest.get("name").and_then(Value::as_str)?;
                let exports_root = match manifest.get("exports") {
                    Some(Value::Object(map)) => map.contains_key(".") || map.contains_key("./*"),
                    Some(Value::String(_)) => true,
                    _ => false,
                };
                return exports_root.then(|| name.to_string());
            }
            if current == self.root {
                break;
            }
            dir = current.parent();
        }
        None
    }
}

fn strip_known_extension(path: &str) -> String {
    for ext in SOURCE_EXTENSIONS {
        if let Some(stripped) = path.strip_suffix(&format!(".{ext}")) {
            return stripped.to_string();
        }
    }
    path.to_string()
}
