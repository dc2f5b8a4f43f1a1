//! Walks a vault root into an [`ObsidianDirectory`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use omh_core::error::{OmhError, Result};
use omh_core::{parse_note, slug, ParsedNote};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::filter::FilterPipeline;
use crate::note::{ObsidianAsset, ObsidianDirectory, ObsidianNote};

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Load every note and asset below `root`.
///
/// Without `recursive` only the direct children of `root` are read and
/// subdirectories are ignored. Hidden files and directories (`.obsidian`,
/// `.trash`, ...) are always skipped. Notes rejected by `filter` are
/// dropped and listed in [`ObsidianDirectory::excluded`]. Retained notes get
/// slugs from [`slug::convert_name`].
///
/// # Errors
///
/// Returns [`OmhError::Config`] if `root` is not a directory,
/// [`OmhError::Parse`] if a note has malformed front matter and
/// [`OmhError::Vault`] if the tree cannot be read.
pub fn load_obsidian_directory(
    root: &Path,
    filter: Option<&FilterPipeline>,
    recursive: bool,
) -> Result<ObsidianDirectory> {
    if !root.is_dir() {
        return Err(OmhError::Config(format!(
            "vault root {} is not a readable directory",
            root.display()
        )));
    }

    let mut walker = WalkDir::new(root).min_depth(1).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut notes = Vec::new();
    let mut assets = Vec::new();
    for entry in walker.into_iter().filter_entry(|e| !is_hidden(e)) {
        let entry = entry.map_err(|e| OmhError::Vault(format!("failed to walk vault: {e}")))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| OmhError::Vault(e.to_string()))?
            .to_path_buf();

        if is_markdown(entry.path()) {
            notes.push(read_note(entry.path(), relative)?);
        } else {
            debug!(path = %relative.display(), "found asset");
            assets.push(ObsidianAsset::new(relative));
        }
    }

    notes.sort_by(|a, b| a.path.cmp(&b.path));
    assets.sort_by(|a, b| a.path.cmp(&b.path));
    let discovered = notes.len();

    let mut excluded = Vec::new();
    if let Some(filter) = filter {
        notes.retain(|note| {
            let keep = filter.accepts(note);
            if !keep {
                debug!(path = %note.path.display(), "note rejected by filter");
                excluded.push(note.path.clone());
            }
            keep
        });
    }

    info!(
        root = %root.display(),
        discovered,
        retained = notes.len(),
        assets = assets.len(),
        "loaded vault"
    );

    let mut directory = ObsidianDirectory {
        root: root.to_path_buf(),
        notes,
        assets,
        slugs: BTreeMap::new(),
        excluded,
    };
    directory.resolve_names(&slug::convert_name);
    Ok(directory)
}

fn read_note(path: &Path, relative: PathBuf) -> Result<ObsidianNote> {
    let bytes = fs::read(path)
        .map_err(|e| OmhError::Vault(format!("failed to read {}: {e}", relative.display())))?;
    let content = String::from_utf8_lossy(&bytes);

    let (parsed, has_front_matter) = match parse_note(&content) {
        Ok(parsed) => (parsed, true),
        Err(err) if err.is_missing() => {
            debug!(path = %relative.display(), "note has no front matter");
            (ParsedNote::plain(&content), false)
        }
        Err(source) => {
            return Err(OmhError::Parse {
                path: relative,
                source,
            })
        }
    };

    Ok(ObsidianNote {
        path: relative,
        front_matter: parsed.front_matter,
        body: parsed.body,
        has_front_matter,
        slug: String::new(),
    })
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|md| ext.eq_ignore_ascii_case(md))
        })
}
