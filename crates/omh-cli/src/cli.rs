//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;
use clap_complete::Shell;
use omh_core::{FrontMatterPrecedence, Value};
use omh_hugo::{OutputTimeZone, DEFAULT_SUB_PATH, DEFAULT_TAGS_KEY};

#[derive(Debug, Parser)]
#[command(name = "omh")]
#[command(version)]
#[command(about = "Publish an Obsidian vault as a Hugo site")]
pub struct Cli {
    /// Root directory of the Obsidian vault
    #[arg(
        short = 'O',
        long = "obsidian-root",
        value_name = "DIR",
        required_unless_present = "completions"
    )]
    pub obsidian_root: Option<PathBuf>,

    /// Root directory of the Hugo site
    #[arg(
        short = 'H',
        long = "hugo-root",
        value_name = "DIR",
        required_unless_present = "completions"
    )]
    pub hugo_root: Option<PathBuf>,

    /// Directory below content/ and static/ receiving the output
    #[arg(short = 'p', long = "sub-path", default_value = DEFAULT_SUB_PATH)]
    pub sub_path: String,

    /// Walk subdirectories of the vault
    #[arg(short = 'R', long)]
    pub recursive: bool,

    /// Only publish notes carrying one of these tags
    #[arg(short = 'i', long = "include-tag", value_name = "TAG")]
    pub include_tags: Vec<String>,

    /// Never publish notes carrying one of these tags
    #[arg(short = 'e', long = "exclude-tag", value_name = "TAG")]
    pub exclude_tags: Vec<String>,

    /// Only publish notes whose front matter has one of these keys
    #[arg(short = 'f', long = "publish-field", value_name = "FIELD")]
    pub publish_fields: Vec<String>,

    /// Extra front matter added to every page
    #[arg(
        short = 'F',
        long = "front-matter",
        value_name = "KEY:VALUE",
        value_parser = parse_front_matter_pair
    )]
    pub front_matter: Vec<(String, Value)>,

    /// Which side wins when a note already has an extra front matter key
    #[arg(long, value_name = "extra|note", default_value = "extra")]
    pub front_matter_precedence: FrontMatterPrecedence,

    /// Front matter key holding a note's tags
    #[arg(short = 't', long = "tags-key", default_value = DEFAULT_TAGS_KEY)]
    pub tags_key: String,

    /// Time zone for front matter dates: UTC, Local, an IANA name or an offset
    #[arg(short = 'z', long = "time-zone", value_name = "TZ", default_value = "Local")]
    pub time_zone: OutputTimeZone,

    /// Enable debug logging
    #[arg(short = 'D', long)]
    pub debug: bool,

    /// Print the conversion report as JSON
    #[arg(long)]
    pub json: bool,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL", exclusive = true)]
    pub completions: Option<Shell>,
}

/// Parse `key:value`; the value is read as a YAML scalar.
fn parse_front_matter_pair(s: &str) -> Result<(String, Value), String> {
    let (key, value) = s
        .split_once(':')
        .ok_or_else(|| format!("expected KEY:VALUE, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), Value::from_yaml_scalar(value.trim())))
}
