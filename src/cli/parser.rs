use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;

use super::reader;
use crate::coordinator::MigrationConfig;
use crate::models::{SourceCredentials, TargetCredentials};
use crate::rest;

const GLOB_EXPRESSION: &str = r#"^glob\("(.*)"\)$"#;

#[derive(Clone, Debug)]
pub struct ParsedConfig {
    pub version: String,
    pub source: SourceCredentials,
    pub target: TargetCredentials,
    pub migration: MigrationConfig,
}

/// Values that take precedence over the config file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub source_token: Option<String>,
    pub target_token: Option<String>,
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub enum RepoExpression {
    Glob(glob::Pattern),
    Name(String),
}

impl RepoExpression {
    pub fn matches(&self, repo_name: &str) -> bool {
        match self {
            RepoExpression::Glob(pattern) => pattern.matches(repo_name),
            RepoExpression::Name(name) => name == repo_name,
        }
    }
}

/// Which source repositories take part in a run. Exclusion wins; an empty include list
/// selects everything.
#[derive(Debug, Clone, Default)]
pub struct RepoFilter {
    pub include: Vec<RepoExpression>,
    pub exclude: Vec<RepoExpression>,
}

impl RepoFilter {
    pub fn allows(&self, repo_name: &str) -> bool {
        if self.exclude.iter().any(|e| e.matches(repo_name)) {
            return false;
        }

        self.include.is_empty() || self.include.iter().any(|e| e.matches(repo_name))
    }
}

pub fn parse_config(config: reader::Config, overrides: &Overrides) -> Result<ParsedConfig> {
    let reader::Config {
        version,
        source,
        target,
    } = config;

    if source.readme_banner.is_empty() {
        bail!("source.readme_banner needs at least one line");
    }
    if source.project_key.trim().is_empty() {
        bail!("source.project_key is empty");
    }
    if target.group_name.trim().is_empty() {
        bail!("target.group_name is empty");
    }

    let source_url = rest::base_url(&source.host)
        .with_context(|| format!("invalid source host `{}`", source.host))?;
    let target_url = rest::base_url(&target.host)
        .with_context(|| format!("invalid target host `{}`", target.host))?;

    let source_token = pick_token(
        &overrides.source_token,
        source.access_token,
        "source",
        "--source-token or GITPORT_SOURCE_TOKEN",
    )?;
    let target_token = pick_token(
        &overrides.target_token,
        target.access_token,
        "target",
        "--target-token or GITPORT_TARGET_TOKEN",
    )?;

    let repo_filter = RepoFilter {
        include: parse_repo_list(source.repos_to_include.as_deref().unwrap_or_default())
            .context("invalid source.repos_to_include")?,
        exclude: parse_repo_list(source.repos_to_exclude.as_deref().unwrap_or_default())
            .context("invalid source.repos_to_exclude")?,
    };

    let source_credentials = SourceCredentials {
        base_url: source_url,
        username: source.username,
        access_token: source_token,
    };
    let target_credentials = TargetCredentials {
        base_url: target_url.clone(),
        access_token: target_token,
    };

    let migration = MigrationConfig {
        project_key: source.project_key,
        group_name: target.group_name,
        parent_group_id: target.parent_group_id,
        repo_filter,
        readme_banner: source.readme_banner,
        description: source.description,
        import_mode: target.import_mode,
        source_credentials: source_credentials.clone(),
        target_web_url: target_url,
        dry_run: overrides.dry_run,
    };

    Ok(ParsedConfig {
        version,
        source: source_credentials,
        target: target_credentials,
        migration,
    })
}

fn pick_token(
    flag: &Option<String>,
    file: Option<String>,
    side: &str,
    hint: &str,
) -> Result<String> {
    flag.clone()
        .or(file)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            anyhow!(
                "no access token for the {} host; set {}.access_token, {}",
                side,
                side,
                hint
            )
        })
}

/// Parses a comma separated list of repository names and `glob("...")` expressions.
pub fn parse_repo_list(val: &str) -> Result<Vec<RepoExpression>> {
    let glob_expression = Regex::new(GLOB_EXPRESSION)?;

    val.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| parse_repo_expression(&glob_expression, entry))
        .collect()
}

fn parse_repo_expression(glob_expression: &Regex, val: &str) -> Result<RepoExpression> {
    if !val.starts_with("glob(") {
        return Ok(RepoExpression::Name(val.to_string()));
    }

    let pattern = glob_expression
        .captures(val)
        .and_then(|captures| captures.get(1))
        .ok_or_else(|| anyhow!("invalid glob expression `{}`", val))?;

    let pattern = glob::Pattern::new(pattern.as_str())
        .with_context(|| format!("invalid glob pattern in `{}`", val))?;

    Ok(RepoExpression::Glob(pattern))
}
