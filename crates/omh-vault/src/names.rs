//! Collision-free slug assignment.
//!
//! Notes are visited in relative path order. The first note deriving a slug
//! keeps it; later notes with the same slug get a discriminator taken from
//! the SHA-256 of their relative path, so the outcome only depends on the
//! vault's contents.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::note::{slash_path, ObsidianNote};

/// Hex digits of the path digest appended on a collision.
const DISCRIMINATOR_LEN: usize = 8;

/// Stem used when a note's name derives to an empty slug.
const FALLBACK_STEM: &str = "note";

/// File names Hugo treats as page bundles; a note using one would turn the
/// whole section into a single page.
const RESERVED_SLUGS: &[&str] = &["index", "_index"];

/// Assign a unique slug to every note and return the path to slug table.
pub fn resolve_slugs(
    notes: &mut [ObsidianNote],
    convert_name: &dyn Fn(&str) -> String,
) -> BTreeMap<PathBuf, String> {
    let mut order: Vec<usize> = (0..notes.len()).collect();
    order.sort_by(|&a, &b| notes[a].path.cmp(&notes[b].path));

    let mut taken: HashSet<String> = RESERVED_SLUGS.iter().map(|s| (*s).to_string()).collect();
    let mut table = BTreeMap::new();

    for index in order {
        let note = &mut notes[index];
        let base = convert_name(&note.name());
        let slug = unique_slug(&base, &note.path, &taken);
        if slug != base {
            debug!(path = %note.path.display(), base = %base, slug = %slug, "disambiguated slug");
        }
        taken.insert(slug.clone());
        note.slug.clone_from(&slug);
        table.insert(note.path.clone(), slug);
    }

    table
}

fn unique_slug(base: &str, path: &Path, taken: &HashSet<String>) -> String {
    if !base.is_empty() && !taken.contains(base) {
        return base.to_string();
    }

    let stem = if base.is_empty() { FALLBACK_STEM } else { base };
    let digest = path_digest(path);
    for len in (DISCRIMINATOR_LEN..=digest.len()).step_by(4) {
        let candidate = format!("{stem}-{}", &digest[..len]);
        if !taken.contains(&candidate) {
            return candidate;
        }
    }

    let mut counter = 2usize;
    loop {
        let candidate = format!("{stem}-{digest}-{counter}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

fn path_digest(path: &Path) -> String {
    let hash = Sha256::digest(slash_path(path).as_bytes());
    hash.iter().map(|b| format!("{b:02x}")).collect()
}
