//! # omh-hugo
//!
//! Turns a loaded [`omh_vault::ObsidianDirectory`] into a Hugo site.
//!
//! - [`LinkRewriter`] rewrites wikilinks, embeds and relative markdown links
//!   into Hugo URLs
//! - [`Converter`] writes pages under `content/` and copies assets under
//!   `static/`
//! - [`OutputTimeZone`] controls how front matter dates are rendered
//! - [`ConversionReport`] describes what a run produced

pub mod converter;
pub mod links;
pub mod report;
pub mod timezone;

pub use converter::{
    ConvertName, Converter, ConverterConfig, DEFAULT_SUB_PATH, DEFAULT_TAGS_KEY,
};
pub use links::{LinkRewriter, LinkTarget, Rewritten};
pub use report::{ConversionReport, CopiedAsset, UnresolvedLink, WrittenNote};
pub use timezone::OutputTimeZone;
