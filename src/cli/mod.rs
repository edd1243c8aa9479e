pub mod common;
pub mod parser;
pub mod reader;

pub use common::*;
pub use parser::{Overrides, ParsedConfig, RepoExpression, RepoFilter};

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use parser::parse_config;
use reader::read_config;

/// Moves the repositories of a Bitbucket Server project into a GitLab group and marks the
/// originals as deprecated.
#[derive(Parser, Debug)]
#[clap(version)]
pub struct Args {
    #[clap(short, long, parse(from_os_str))]
    config: PathBuf,

    /// Overrides source.access_token.
    #[clap(long, env = "GITPORT_SOURCE_TOKEN", hide_env_values = true)]
    source_token: Option<String>,

    /// Overrides target.access_token.
    #[clap(long, env = "GITPORT_TARGET_TOKEN", hide_env_values = true)]
    target_token: Option<String>,

    /// Report what would be migrated without writing anything.
    #[clap(long)]
    dry_run: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            source_token: self.source_token.clone(),
            target_token: self.target_token.clone(),
            dry_run: self.dry_run,
        }
    }
}

pub fn run() -> Result<ParsedConfig> {
    let args = Args::parse();

    let content = std::fs::read_to_string(&args.config)
        .with_context(|| format!("could not read file `{:?}`", &args.config))?;

    let config = read_config(&content)
        .with_context(|| format!("could not parse config `{:?}`", &args.config))?;

    parse_config(config, &args.overrides())
}
