//! # omh-core
//!
//! Core types and rules shared by the omh crates.
//!
//! - [`FrontMatter`]: typed access to a note's YAML header
//! - [`Value`]: dynamically-typed front matter values
//! - Note splitting and writing ([`frontmatter`])
//! - Naming rules ([`slug::sanitize`], [`slug::convert_name`])
//! - Error hierarchy ([`OmhError`], [`FrontMatterError`])

pub mod error;
pub mod frontmatter;
pub mod slug;
pub mod value;

pub use error::{FrontMatterError, OmhError, Result};
pub use frontmatter::{parse_note, write_note, FrontMatter, FrontMatterPrecedence, ParsedNote};
pub use value::Value;
