//! Summary of a conversion run.

use std::path::PathBuf;

use serde::Serialize;

/// What a [`crate::Converter`] run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    pub notes: Vec<WrittenNote>,
    pub assets: Vec<CopiedAsset>,
    /// Notes the filter pipeline kept out of the site.
    pub excluded: Vec<PathBuf>,
    pub unresolved: Vec<UnresolvedLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenNote {
    pub source: PathBuf,
    pub slug: String,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopiedAsset {
    pub source: PathBuf,
    pub output: PathBuf,
}

/// An internal link left untouched because nothing matched it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedLink {
    /// Note containing the link.
    pub note: PathBuf,
    pub link: String,
}

impl ConversionReport {
    /// One-line human readable summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} notes written, {} assets copied, {} notes excluded, {} unresolved links",
            self.notes.len(),
            self.assets.len(),
            self.excluded.len(),
            self.unresolved.len()
        )
    }
}
