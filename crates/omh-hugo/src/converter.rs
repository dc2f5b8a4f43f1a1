//! Writes a loaded vault into a Hugo site.
//!
//! Layout produced below the Hugo root:
//! - `content/<sub-path>/<slug>.md` for every retained note
//! - `static/<sub-path>/<asset path>` for every asset
//!
//! A run is not transactional: the first failing write aborts it and files
//! written before stay in place.

use std::fs;
use std::path::{Component, Path, PathBuf};

use omh_core::error::{OmhError, Result};
use omh_core::{slug, write_note, FrontMatter, FrontMatterPrecedence};
use omh_vault::{ObsidianDirectory, ObsidianNote};
use tracing::{debug, info};

use crate::links::LinkRewriter;
use crate::report::{ConversionReport, CopiedAsset, UnresolvedLink, WrittenNote};
use crate::timezone::OutputTimeZone;

pub const DEFAULT_SUB_PATH: &str = "posts";
pub const DEFAULT_TAGS_KEY: &str = "tags";

/// Front matter keys Hugo reads as dates.
const DATE_KEYS: &[&str] = &["date", "lastmod", "publishDate", "expiryDate"];

/// Naming policy turning a note's base name into its slug.
pub type ConvertName = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Options for a [`Converter`].
pub struct ConverterConfig {
    pub hugo_root: PathBuf,
    /// Single path segment used below both `content/` and `static/`.
    pub sub_path: String,
    /// Extra front matter added to every page.
    pub front_matter: FrontMatter,
    pub precedence: FrontMatterPrecedence,
    pub tags_key: String,
    pub convert_name: ConvertName,
    pub time_zone: OutputTimeZone,
}

impl ConverterConfig {
    pub fn new(hugo_root: impl Into<PathBuf>) -> Self {
        Self {
            hugo_root: hugo_root.into(),
            sub_path: DEFAULT_SUB_PATH.to_string(),
            front_matter: FrontMatter::new(),
            precedence: FrontMatterPrecedence::default(),
            tags_key: DEFAULT_TAGS_KEY.to_string(),
            convert_name: Box::new(slug::convert_name),
            time_zone: OutputTimeZone::default(),
        }
    }
}

/// Converts an [`ObsidianDirectory`] into Hugo content and static files.
pub struct Converter {
    directory: ObsidianDirectory,
    config: ConverterConfig,
}

impl Converter {
    /// Validate `config` and assign slugs with its naming policy.
    ///
    /// # Errors
    ///
    /// Returns [`OmhError::Config`] if the sub-path is not a single path
    /// segment.
    pub fn new(mut directory: ObsidianDirectory, config: ConverterConfig) -> Result<Self> {
        validate_sub_path(&config.sub_path)?;
        directory.resolve_names(&*config.convert_name);
        Ok(Self { directory, config })
    }

    #[must_use]
    pub fn content_dir(&self) -> PathBuf {
        self.config
            .hugo_root
            .join("content")
            .join(&self.config.sub_path)
    }

    #[must_use]
    pub fn static_dir(&self) -> PathBuf {
        self.config
            .hugo_root
            .join("static")
            .join(&self.config.sub_path)
    }

    /// Write every note and copy every asset.
    ///
    /// # Errors
    ///
    /// Returns [`OmhError::Write`] on the first file that cannot be written
    /// or copied, and [`OmhError::Serialization`] if front matter cannot be
    /// encoded.
    pub fn run(&self) -> Result<ConversionReport> {
        let rewriter = LinkRewriter::new(&self.directory, &self.config.sub_path);
        let content_dir = self.content_dir();
        let static_dir = self.static_dir();

        let mut report = ConversionReport {
            excluded: self.directory.excluded.clone(),
            ..ConversionReport::default()
        };

        for note in &self.directory.notes {
            let rewritten = rewriter.rewrite(&note.body, &note.path);
            let front_matter = self.front_matter_for(note);
            let document = write_note(&front_matter, &rewritten.body)?;

            let output = content_dir.join(format!("{}.md", note.slug));
            write_file(&output, document.as_bytes())?;
            debug!(
                source = %note.path.display(),
                output = %output.display(),
                links = rewritten.resolved,
                "wrote note"
            );

            report.notes.push(WrittenNote {
                source: note.path.clone(),
                slug: note.slug.clone(),
                output,
            });
            report
                .unresolved
                .extend(rewritten.unresolved.into_iter().map(|link| UnresolvedLink {
                    note: note.path.clone(),
                    link,
                }));
        }

        for asset in &self.directory.assets {
            let source = self.directory.root.join(&asset.path);
            let output = static_dir.join(asset.destination());
            copy_file(&source, &output)?;
            debug!(source = %asset.path.display(), output = %output.display(), "copied asset");

            report.assets.push(CopiedAsset {
                source: asset.path.clone(),
                output,
            });
        }

        info!(
            notes = report.notes.len(),
            assets = report.assets.len(),
            unresolved = report.unresolved.len(),
            "conversion finished"
        );
        Ok(report)
    }

    /// Front matter written for `note`: merged extra keys, normalized tags,
    /// a default title and dates in the output time zone.
    fn front_matter_for(&self, note: &ObsidianNote) -> FrontMatter {
        let mut front_matter = note.front_matter.clone();
        front_matter.merge(&self.config.front_matter, self.config.precedence);

        let tags_key = self.config.tags_key.as_str();
        if front_matter.has(tags_key) {
            let tags = front_matter.tags(tags_key);
            front_matter.insert(tags_key, tags);
        }

        if !front_matter.has("title") {
            front_matter.insert("title", note.name());
        }

        for key in DATE_KEYS {
            let normalized = front_matter
                .get(key)
                .and_then(|value| value.as_str())
                .and_then(|text| self.config.time_zone.normalize(text));
            if let Some(normalized) = normalized {
                front_matter.insert(*key, normalized);
            }
        }

        front_matter
    }
}

fn validate_sub_path(sub_path: &str) -> Result<()> {
    let mut components = Path::new(sub_path).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !sub_path.contains(['/', '\\']) => Ok(()),
        _ => Err(OmhError::Config(format!(
            "sub-path '{sub_path}' must be a single directory name"
        ))),
    }
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| OmhError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    create_parent(path)?;
    fs::write(path, contents).map_err(|source| OmhError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn copy_file(source: &Path, destination: &Path) -> Result<()> {
    create_parent(destination)?;
    fs::copy(source, destination).map_err(|source_err| OmhError::Write {
        path: destination.to_path_buf(),
        source: source_err,
    })?;
    Ok(())
}
