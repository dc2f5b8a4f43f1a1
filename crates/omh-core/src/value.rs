//! Dynamically-typed front matter values.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_yaml::Value as YamlValue;

/// A single front matter value as decoded from YAML.
///
/// YAML tags are dropped and mapping keys are coerced to strings, so every
/// value in a note's header can be represented without loss of the parts
/// Hugo cares about.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Short name of the variant, used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "sequence",
            Self::Map(_) => "mapping",
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Decode a single scalar from YAML text, falling back to a plain string.
    ///
    /// `"true"` becomes a boolean and `"3"` an integer, while text that is
    /// not valid YAML is kept verbatim.
    #[must_use]
    pub fn from_yaml_scalar(text: &str) -> Self {
        match serde_yaml::from_str::<YamlValue>(text) {
            Ok(YamlValue::Sequence(_) | YamlValue::Mapping(_) | YamlValue::Tagged(_)) | Err(_) => {
                Self::String(text.to_string())
            }
            Ok(YamlValue::Null) if !matches!(text.trim(), "~" | "null" | "Null" | "NULL") => {
                Self::String(text.to_string())
            }
            Ok(value) => Self::from(value),
        }
    }
}

impl From<YamlValue> for Value {
    fn from(value: YamlValue) -> Self {
        match value {
            YamlValue::Null => Self::Null,
            YamlValue::Bool(b) => Self::Bool(b),
            YamlValue::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            YamlValue::String(s) => Self::String(s),
            YamlValue::Sequence(seq) => Self::List(seq.into_iter().map(Self::from).collect()),
            YamlValue::Mapping(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (Self::from(k).to_string(), Self::from(v)))
                    .collect(),
            ),
            YamlValue::Tagged(tagged) => Self::from(tagged.value),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Self::List(items.into_iter().map(Self::String).collect())
    }
}

/// Default string conversion: scalars in their canonical form, null as the
/// empty string, lists as `[a b]` and mappings as `map[k:v]`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(map) => {
                f.write_str("map[")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{key}:{value}")?;
                }
                f.write_str("]")
            }
        }
    }
}
