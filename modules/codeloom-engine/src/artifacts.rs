//! Artifact writing: one rendered file per accepted component, one
//! diagnostic record per exhausted one.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use codeloom_common::ident;
use codeloom_common::types::ComponentRun;

/// Per-run filename arena: sanitized base name plus a numeric suffix
/// counter. Owned by the artifact-writing step of a single run — collision
/// state never crosses runs.
#[derive(Debug, Default)]
pub struct FileArena {
    used: HashMap<String, u32>,
}

impl FileArena {
    /// Claim a unique file name for `base` with the given extension.
    /// First claim gets `Base.ext`, later ones `Base-2.ext`, `Base-3.ext`.
    pub fn claim(&mut self, base: &str, extension: &str) -> String {
        let stem = match ident::sanitize_token(base) {
            s if s.is_empty() || s == "_" => "component".to_string(),
            s => s,
        };
        let count = self.used.entry(stem.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            format!("{stem}.{extension}")
        } else {
            format!("{stem}-{count}.{extension}")
        }
    }
}

pub struct ArtifactWriter {
    output_dir: PathBuf,
    diagnostics_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>, data_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.into(),
            diagnostics_dir: data_dir.join("diagnostics"),
        }
    }

    /// Write an accepted component's rendered code under the output dir.
    pub fn write_artifact(&self, file_name: &str, code: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("creating {}", self.output_dir.display()))?;
        let path = self.output_dir.join(file_name);
        std::fs::write(&path, code).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "artifact written");
        Ok(path)
    }

    /// Exhausted runs get their full record (attempts, violations, last
    /// rendered best-guess) as JSON under the diagnostics dir — never as a
    /// production file.
    pub fn write_diagnostic(&self, arena: &mut FileArena, run: &ComponentRun) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.diagnostics_dir)
            .with_context(|| format!("creating {}", self.diagnostics_dir.display()))?;
        let file_name = arena.claim(&run.component_name, "json");
        let path = self.diagnostics_dir.join(file_name);
        std::fs::write(&path, serde_json::to_string_pretty(run)?)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), component = run.component_name.as_str(), "diagnostic written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_counts_collisions_per_base_name() {
        let mut arena = FileArena::default();
        assert_eq!(arena.claim("Button", "figma.tsx"), "Button.figma.tsx");
        assert_eq!(arena.claim("Button", "figma.tsx"), "Button-2.figma.tsx");
        assert_eq!(arena.claim("Button", "figma.tsx"), "Button-3.figma.tsx");
        assert_eq!(arena.claim("Card", "figma.tsx"), "Card.figma.tsx");
    }

    #[test]
    fn arena_sanitizes_awkward_names() {
        let mut arena = FileArena::default();
        assert_eq!(arena.claim("Card / Header", "figma.tsx"), "Card_Header.figma.tsx");
        assert_eq!(arena.claim("---", "figma.tsx"), "component.figma.tsx");
    }

    #[test]
    fn fresh_arenas_do_not_share_collision_state() {
        let mut first = FileArena::default();
        let mut second = FileArena::default();
        assert_eq!(first.claim("Button", "figma.tsx"), "Button.figma.tsx");
        assert_eq!(second.claim("Button", "figma.tsx"), "Button.figma.tsx");
    }
}
