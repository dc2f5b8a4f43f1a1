//! Notes, assets and the loaded vault directory.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use omh_core::FrontMatter;

use crate::names;

/// A markdown note found in the vault.
#[derive(Debug, Clone, PartialEq)]
pub struct ObsidianNote {
    /// Path relative to the vault root.
    pub path: PathBuf,
    pub front_matter: FrontMatter,
    /// Trimmed markdown body without the front matter block.
    pub body: String,
    /// False when the file had no front matter block at all.
    pub has_front_matter: bool,
    /// Output slug; empty until names are resolved.
    pub slug: String,
}

impl ObsidianNote {
    pub fn new(path: impl Into<PathBuf>, front_matter: FrontMatter, body: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            front_matter,
            body: body.into(),
            has_front_matter: true,
            slug: String::new(),
        }
    }

    /// Base name of the note without its extension.
    #[must_use]
    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Normalized tags stored under `tags_key`.
    #[must_use]
    pub fn tags(&self, tags_key: &str) -> Vec<String> {
        self.front_matter.tags(tags_key)
    }
}

/// Any non-markdown file in the vault, copied verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObsidianAsset {
    /// Path relative to the vault root.
    pub path: PathBuf,
}

impl ObsidianAsset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Path below the static sub-path: directories lower-cased, base name kept.
    #[must_use]
    pub fn destination(&self) -> PathBuf {
        let mut dest = PathBuf::new();
        if let Some(parent) = self.path.parent() {
            for component in parent.components() {
                if let Component::Normal(dir) = component {
                    dest.push(dir.to_string_lossy().to_lowercase());
                }
            }
        }
        if let Some(name) = self.path.file_name() {
            dest.push(name);
        }
        dest
    }
}

/// The result of walking a vault.
#[derive(Debug, Clone, Default)]
pub struct ObsidianDirectory {
    pub root: PathBuf,
    /// Retained notes in relative path order.
    pub notes: Vec<ObsidianNote>,
    /// Assets in relative path order.
    pub assets: Vec<ObsidianAsset>,
    /// Relative source path to slug, one entry per retained note.
    pub slugs: BTreeMap<PathBuf, String>,
    /// Notes the filter pipeline rejected.
    pub excluded: Vec<PathBuf>,
}

impl ObsidianDirectory {
    #[must_use]
    pub fn slug_for(&self, path: &Path) -> Option<&str> {
        self.slugs.get(path).map(String::as_str)
    }

    #[must_use]
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.excluded.iter().any(|p| p == path)
    }

    /// Assign slugs to every note with `convert_name`, replacing earlier ones.
    pub fn resolve_names(&mut self, convert_name: &dyn Fn(&str) -> String) {
        self.slugs = names::resolve_slugs(&mut self.notes, convert_name);
    }
}

/// Relative path with `/` separators regardless of platform.
#[must_use]
pub fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
