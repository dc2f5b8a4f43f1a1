//! YAML front matter parsing and writing.
//!
//! Handles the `---` delimited YAML header of Obsidian notes.
//! Format:
//! ```markdown
//! ---
//! title: "Alpha"
//! tags: [blog, rust]
//! ---
//!
//! Body content here, may link to [[Other Note]].
//! ```

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Serialize;
use serde_yaml::Value as YamlValue;

use crate::error::{FrontMatterError, OmhError};
use crate::value::Value;

/// Line that opens and closes the front matter block.
pub const DELIMITER: &str = "---";

/// Meta information of a note, keyed by front matter attribute.
///
/// Keys are case-sensitive and kept sorted so written output is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FrontMatter(BTreeMap<String, Value>);

/// Which side wins when extra front matter collides with a note's own keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FrontMatterPrecedence {
    /// Extra front matter overrides the note.
    #[default]
    Extra,
    /// The note's own value is kept.
    Note,
}

impl FromStr for FrontMatterPrecedence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "extra" => Ok(Self::Extra),
            "note" => Ok(Self::Note),
            other => Err(format!("unknown precedence '{other}', expected 'extra' or 'note'")),
        }
    }
}

impl FrontMatter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a YAML block into front matter.
    ///
    /// An empty document yields empty front matter.
    ///
    /// # Errors
    ///
    /// Returns [`FrontMatterError::Malformed`] for invalid YAML and
    /// [`FrontMatterError::NotAMapping`] when the document is not a mapping.
    pub fn from_yaml(yaml: &str) -> Result<Self, FrontMatterError> {
        let blank = yaml.lines().all(|line| {
            let line = line.trim();
            line.is_empty() || line.starts_with('#')
        });
        if blank {
            return Ok(Self::default());
        }

        let value: YamlValue = serde_yaml::from_str(yaml)?;
        match Value::from(value) {
            Value::Map(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(FrontMatterError::NotAMapping(other.type_name())),
        }
    }

    /// Checks if a specific key exists, regardless of its value.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Value of `key` as a string; empty if absent.
    ///
    /// Non-string values use their default string conversion.
    #[must_use]
    pub fn string(&self, key: &str) -> String {
        match self.0.get(key) {
            None => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Value of `key` as a list of strings.
    ///
    /// `None` if the key is absent or its value is not a list. Each element
    /// of a list is converted with the default string conversion.
    #[must_use]
    pub fn strings(&self, key: &str) -> Option<Vec<String>> {
        let items = self.0.get(key)?.as_list()?;
        Some(items.iter().map(ToString::to_string).collect())
    }

    /// Tags stored under `key`, normalized.
    ///
    /// Accepts a list or a single string separated by commas or whitespace.
    /// A leading `#` is stripped and empty entries are dropped.
    #[must_use]
    pub fn tags(&self, key: &str) -> Vec<String> {
        let raw = match self.0.get(key) {
            None => return Vec::new(),
            Some(Value::String(s)) => s
                .split(|c: char| c == ',' || c.is_whitespace())
                .map(str::to_string)
                .collect(),
            Some(_) => self.strings(key).unwrap_or_default(),
        };
        raw.iter()
            .map(|tag| tag.trim().trim_start_matches('#').to_string())
            .filter(|tag| !tag.is_empty())
            .collect()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge `extra` into this front matter, resolving key conflicts by
    /// `precedence`.
    pub fn merge(&mut self, extra: &FrontMatter, precedence: FrontMatterPrecedence) {
        for (key, value) in &extra.0 {
            match precedence {
                FrontMatterPrecedence::Extra => {
                    self.0.insert(key.clone(), value.clone());
                }
                FrontMatterPrecedence::Note => {
                    self.0.entry(key.clone()).or_insert_with(|| value.clone());
                }
            }
        }
    }
}

impl FromIterator<(String, Value)> for FrontMatter {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A note split into its front matter and trimmed body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedNote {
    pub front_matter: FrontMatter,
    pub body: String,
}

impl ParsedNote {
    /// A note without front matter: the whole content becomes the body.
    #[must_use]
    pub fn plain(content: &str) -> Self {
        Self {
            front_matter: FrontMatter::default(),
            body: content.trim().to_string(),
        }
    }
}

/// Split a markdown file into front matter and body.
///
/// Blank lines may precede the opening `---`. Only the first two delimiter
/// lines count; any later `---` is body text.
///
/// # Errors
///
/// Returns [`FrontMatterError::Missing`] if no non-empty delimited block
/// opens the file, and [`FrontMatterError::Malformed`] or
/// [`FrontMatterError::NotAMapping`] if the block cannot be decoded.
pub fn parse_note(content: &str) -> Result<ParsedNote, FrontMatterError> {
    #[derive(PartialEq)]
    enum State {
        Before,
        Inside,
        After,
    }

    let mut state = State::Before;
    let mut meta_lines = Vec::new();
    let mut body_lines = Vec::new();

    for line in content.lines() {
        let is_delimiter = line.trim_end_matches('\r') == DELIMITER;
        match state {
            State::Before if is_delimiter => state = State::Inside,
            State::Before if line.trim().is_empty() => {}
            State::Before => return Err(FrontMatterError::Missing),
            State::Inside if is_delimiter => state = State::After,
            State::Inside => meta_lines.push(line),
            State::After => body_lines.push(line),
        }
    }

    if state != State::After || meta_lines.is_empty() {
        return Err(FrontMatterError::Missing);
    }

    let front_matter = FrontMatter::from_yaml(&meta_lines.join("\n"))?;
    Ok(ParsedNote {
        front_matter,
        body: body_lines.join("\n").trim().to_string(),
    })
}

/// Render front matter and body as a markdown document.
///
/// # Errors
///
/// Returns [`OmhError::Serialization`] if the front matter cannot be encoded.
pub fn write_note(front_matter: &FrontMatter, body: &str) -> Result<String, OmhError> {
    let yaml = if front_matter.is_empty() {
        String::new()
    } else {
        serde_yaml::to_string(front_matter).map_err(|e| OmhError::Serialization(e.to_string()))?
    };

    let mut output = String::with_capacity(yaml.len() + body.len() + 10);
    output.push_str(DELIMITER);
    output.push('\n');
    output.push_str(&yaml);
    output.push_str(DELIMITER);
    output.push('\n');
    if !body.is_empty() {
        output.push('\n');
        output.push_str(body);
        if !body.ends_with('\n') {
            output.push('\n');
        }
    }

    Ok(output)
}
