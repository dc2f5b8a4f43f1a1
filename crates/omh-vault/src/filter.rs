//! Note filters deciding which notes get published.
//!
//! Each [`NoteFilter`] is an independent predicate; a [`FilterPipeline`]
//! accepts a note only if every filter does. "No filters configured" is
//! represented by the absence of a pipeline, not by an empty one.

use std::collections::BTreeSet;

use crate::note::ObsidianNote;

/// A single publishing predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteFilter {
    /// Accept notes with at least one of `tags` under `key`.
    IncludeTags { key: String, tags: BTreeSet<String> },
    /// Reject notes with any of `tags` under `key`.
    ExcludeTags { key: String, tags: BTreeSet<String> },
    /// Accept notes that have at least one of these front matter keys.
    RequireAnyField(BTreeSet<String>),
}

impl NoteFilter {
    #[must_use]
    pub fn accepts(&self, note: &ObsidianNote) -> bool {
        match self {
            Self::IncludeTags { key, tags } => {
                tags.is_empty() || note.tags(key).iter().any(|tag| tags.contains(tag))
            }
            Self::ExcludeTags { key, tags } => {
                !note.tags(key).iter().any(|tag| tags.contains(tag))
            }
            Self::RequireAnyField(fields) => {
                fields.is_empty() || fields.iter().any(|field| note.front_matter.has(field))
            }
        }
    }
}

/// Conjunction of [`NoteFilter`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPipeline {
    filters: Vec<NoteFilter>,
}

impl FilterPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter; the pipeline accepts only what all filters accept.
    #[must_use]
    pub fn with(mut self, filter: NoteFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Build the pipeline for the given options.
    ///
    /// Empty option lists add no filter. Returns `None` when nothing is
    /// configured, meaning every note is accepted.
    #[must_use]
    pub fn from_options(
        include_tags: &[String],
        exclude_tags: &[String],
        publish_fields: &[String],
        tags_key: &str,
    ) -> Option<Self> {
        let mut pipeline = Self::new();
        if !include_tags.is_empty() {
            pipeline = pipeline.with(NoteFilter::IncludeTags {
                key: tags_key.to_string(),
                tags: include_tags.iter().cloned().collect(),
            });
        }
        if !exclude_tags.is_empty() {
            pipeline = pipeline.with(NoteFilter::ExcludeTags {
                key: tags_key.to_string(),
                tags: exclude_tags.iter().cloned().collect(),
            });
        }
        if !publish_fields.is_empty() {
            pipeline = pipeline.with(NoteFilter::RequireAnyField(
                publish_fields.iter().cloned().collect(),
            ));
        }

        if pipeline.is_empty() {
            None
        } else {
            Some(pipeline)
        }
    }

    #[must_use]
    pub fn filters(&self) -> &[NoteFilter] {
        &self.filters
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Whether `note` passes every filter. Stops at the first rejection.
    #[must_use]
    pub fn accepts(&self, note: &ObsidianNote) -> bool {
        self.filters.iter().all(|filter| filter.accepts(note))
    }
}
