//! Marks a source repository as moved: banner on top of the readme, a description pointing at
//! the new location, and a read-only restriction on every branch.
//!
//! Both templates may contain `$URL`, which is replaced with the new repository location.

use anyhow::{Context, Result};

use crate::models::{BranchRestriction, FileCommit};
use crate::provider::SourceProvider;

pub const URL_PLACEHOLDER: &str = "$URL";
pub const README_HINT: &str = "readme";
pub const DEFAULT_README: &str = "README.md";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deprecation {
    Deprecated,
    /// The readme already started with the banner; nothing was written.
    AlreadyDeprecated,
}

pub fn render_template(template: &str, url: &str) -> String {
    template.replace(URL_PLACEHOLDER, url)
}

pub fn render_banner(banner: &[String], url: &str) -> Vec<String> {
    banner
        .iter()
        .map(|line| render_template(line, url))
        .collect()
}

/// True when the first line of `existing` is the first line of `banner`.
pub fn has_banner(existing: &[String], banner: &[String]) -> bool {
    match (existing.first(), banner.first()) {
        (Some(current), Some(expected)) => current == expected,
        _ => false,
    }
}

/// Banner lines followed by the original lines, one per line.
pub fn compose_readme(banner: &[String], original: &[String]) -> String {
    banner
        .iter()
        .chain(original)
        .fold(String::new(), |mut content, line| {
            content.push_str(line);
            content.push('\n');
            content
        })
}

pub fn commit_message(file_name: &str) -> String {
    format!("Update {} with deprecation banner", file_name)
}

pub struct RepoDeprecator<'a, S: ?Sized> {
    source: &'a S,
    project_key: &'a str,
    readme_banner: &'a [String],
    description: &'a str,
}

impl<'a, S> RepoDeprecator<'a, S>
where
    S: SourceProvider + ?Sized,
{
    pub fn new(
        source: &'a S,
        project_key: &'a str,
        readme_banner: &'a [String],
        description: &'a str,
    ) -> Self {
        RepoDeprecator {
            source,
            project_key,
            readme_banner,
            description,
        }
    }

    /// Deprecates `repo_name` in favour of `new_repo_url`.
    ///
    /// A readme that already carries the banner means an earlier run got here, and the whole
    /// deprecation is skipped. Steps completed before a failure are not undone.
    pub async fn deprecate_repo(&self, repo_name: &str, new_repo_url: &str) -> Result<Deprecation> {
        tracing::info!(repo = repo_name, url = new_repo_url, "deprecating repo");

        let banner = render_banner(self.readme_banner, new_repo_url);

        let readme = self
            .source
            .find_file(self.project_key, repo_name, README_HINT)
            .await
            .with_context(|| format!("Error finding readme of repo {}", repo_name))?;

        let (file_name, original) = match readme {
            Some(file_name) => {
                let lines = self
                    .source
                    .read_file(self.project_key, repo_name, &file_name)
                    .await
                    .with_context(|| format!("Error reading {} of repo {}", file_name, repo_name))?;

                if has_banner(&lines, &banner) {
                    tracing::debug!(repo = repo_name, "readme already has banner");
                    return Ok(Deprecation::AlreadyDeprecated);
                }

                (file_name, Some(lines))
            }
            None => (DEFAULT_README.to_string(), None),
        };

        let branch = self
            .source
            .get_default_branch(self.project_key, repo_name)
            .await
            .with_context(|| format!("Error getting default branch of repo {}", repo_name))?;

        let commit = FileCommit {
            content: compose_readme(&banner, original.as_deref().unwrap_or_default()),
            message: commit_message(&file_name),
            branch: branch.display_id,
            // Only an existing file is updated against its latest commit.
            source_commit_id: original.as_ref().map(|_| branch.latest_commit),
            file_name,
        };
        self.source
            .write_file(self.project_key, repo_name, &commit)
            .await
            .with_context(|| format!("Error updating {} of repo {}", commit.file_name, repo_name))?;

        let description = render_template(self.description, new_repo_url);
        self.source
            .set_description(self.project_key, repo_name, &description)
            .await
            .with_context(|| format!("Error updating description of repo {}", repo_name))?;

        self.source
            .add_branch_restriction(
                self.project_key,
                repo_name,
                &BranchRestriction::read_only_everywhere(),
            )
            .await
            .with_context(|| format!("Error locking branches of repo {}", repo_name))?;

        Ok(Deprecation::Deprecated)
    }
}
