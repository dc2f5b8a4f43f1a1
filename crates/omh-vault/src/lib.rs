//! # omh-vault
//!
//! Reads an Obsidian vault from disk.
//!
//! The vault is walked once into an [`ObsidianDirectory`]: parsed notes,
//! non-markdown assets, and a slug for every note that survived the
//! [`FilterPipeline`]. Nothing here writes to disk.

pub mod filter;
pub mod loader;
pub mod names;
pub mod note;

pub use filter::{FilterPipeline, NoteFilter};
pub use loader::load_obsidian_directory;
pub use names::resolve_slugs;
pub use note::{slash_path, ObsidianAsset, ObsidianDirectory, ObsidianNote};
