//! omh: publish an Obsidian vault as a Hugo site.
//!
//! Loads the vault, applies tag and field filters, rewrites internal links
//! and writes pages and assets below the Hugo root.

mod cli;

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use omh_core::FrontMatter;
use omh_hugo::{ConversionReport, Converter, ConverterConfig};
use omh_vault::{load_obsidian_directory, FilterPipeline};
use tracing_subscriber::EnvFilter;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "omh", &mut io::stdout());
        return Ok(());
    }

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let report = convert(&cli)?;

    if cli.json {
        let json =
            serde_json::to_string_pretty(&report).context("failed to serialize the report")?;
        println!("{json}");
    } else {
        println!("{}", report.summary());
    }
    Ok(())
}

fn convert(cli: &Cli) -> Result<ConversionReport> {
    // Both are required by clap unless --completions is given.
    let (Some(obsidian_root), Some(hugo_root)) = (&cli.obsidian_root, &cli.hugo_root) else {
        anyhow::bail!("--obsidian-root and --hugo-root are required");
    };

    let filter = FilterPipeline::from_options(
        &cli.include_tags,
        &cli.exclude_tags,
        &cli.publish_fields,
        &cli.tags_key,
    );

    let directory = load_obsidian_directory(obsidian_root, filter.as_ref(), cli.recursive)
        .with_context(|| format!("failed to load vault {}", obsidian_root.display()))?;

    let converter = Converter::new(directory, config_from(cli, hugo_root))
        .context("invalid conversion settings")?;
    converter
        .run()
        .with_context(|| format!("failed to write Hugo site {}", hugo_root.display()))
}

fn config_from(cli: &Cli, hugo_root: &Path) -> ConverterConfig {
    let mut config = ConverterConfig::new(hugo_root);
    config.sub_path = cli.sub_path.clone();
    config.tags_key = cli.tags_key.clone();
    config.precedence = cli.front_matter_precedence;
    config.time_zone = cli.time_zone;
    config.front_matter = cli.front_matter.iter().cloned().collect::<FrontMatter>();
    config
}
