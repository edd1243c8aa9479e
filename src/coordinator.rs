//! Drives one migration run: resolve the group once, then port and deprecate each selected
//! repository in turn. A failing repository is logged and recorded, never fatal to the batch.

use anyhow::{Context, Result};
use url::Url;

use crate::cli::RepoFilter;
use crate::deprecator::{Deprecation, RepoDeprecator};
use crate::group::get_or_create_group_id;
use crate::models::{GroupId, ImportMode, RepositoryRecord, SourceCredentials};
use crate::porter::RepoPorter;
use crate::provider::{SourceProvider, TargetProvider};
use crate::rest;

/// Everything a run needs besides the two host clients.
#[derive(Clone, Debug)]
pub struct MigrationConfig {
    pub project_key: String,
    pub group_name: String,
    pub parent_group_id: Option<GroupId>,
    pub repo_filter: RepoFilter,
    pub readme_banner: Vec<String>,
    pub description: String,
    pub import_mode: ImportMode,
    pub source_credentials: SourceCredentials,
    /// Base the new repository urls are built on.
    pub target_web_url: Url,
    pub dry_run: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MigratedRepo {
    pub name: String,
    pub url: String,
    pub deprecation: Deprecation,
}

#[derive(Debug)]
pub struct RepoFailure {
    pub repo: String,
    pub error: anyhow::Error,
}

#[derive(Debug, Default)]
pub struct MigrationReport {
    pub migrated: Vec<MigratedRepo>,
    pub already_migrated: Vec<String>,
    /// Repositories a dry run would have ported.
    pub planned: Vec<String>,
    pub failed: Vec<RepoFailure>,
}

impl MigrationReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn already_deprecated(&self) -> usize {
        self.migrated
            .iter()
            .filter(|repo| repo.deprecation == Deprecation::AlreadyDeprecated)
            .count()
    }

    pub fn log_summary(&self) {
        tracing::info!(
            migrated = self.migrated.len(),
            already_migrated = self.already_migrated.len(),
            already_deprecated = self.already_deprecated(),
            planned = self.planned.len(),
            failed = self.failed.len(),
            "migration finished"
        );
    }
}

pub struct Coordinator<'a, S: ?Sized, T: ?Sized> {
    source: &'a S,
    target: &'a T,
    config: &'a MigrationConfig,
}

impl<'a, S, T> Coordinator<'a, S, T>
where
    S: SourceProvider + ?Sized,
    T: TargetProvider + ?Sized,
{
    pub fn new(source: &'a S, target: &'a T, config: &'a MigrationConfig) -> Self {
        Coordinator {
            source,
            target,
            config,
        }
    }

    /// Errors only when the run cannot start; per-repository failures end up in the report.
    pub async fn run(&self) -> Result<MigrationReport> {
        if self.config.dry_run {
            return self.plan().await;
        }

        let group_id = get_or_create_group_id(
            self.target,
            &self.config.group_name,
            self.config.parent_group_id,
        )
        .await?;
        tracing::info!(group = %self.config.group_name, %group_id, "resolved target group");

        let repos = self.selected_repositories().await?;

        let porter = RepoPorter::new(
            self.source,
            self.target,
            &self.config.project_key,
            group_id,
            self.config.import_mode,
            &self.config.source_credentials,
        );
        let deprecator = RepoDeprecator::new(
            self.source,
            &self.config.project_key,
            &self.config.readme_banner,
            &self.config.description,
        );

        let mut report = MigrationReport::default();
        for repo in &repos {
            match self.migrate(&porter, &deprecator, repo).await {
                Ok(Some(migrated)) => {
                    tracing::info!(repo = %repo.name, url = %migrated.url, "migrated repo");
                    report.migrated.push(migrated);
                }
                Ok(None) => report.already_migrated.push(repo.name.clone()),
                Err(error) => {
                    tracing::error!(repo = %repo.name, "migration failed: {:#}", error);
                    report.failed.push(RepoFailure {
                        repo: repo.name.clone(),
                        error,
                    });
                }
            }
        }

        Ok(report)
    }

    async fn migrate(
        &self,
        porter: &RepoPorter<'_, S, T>,
        deprecator: &RepoDeprecator<'_, S>,
        repo: &RepositoryRecord,
    ) -> Result<Option<MigratedRepo>> {
        let project = match porter.port_repo(repo).await? {
            Some(project) => project,
            None => return Ok(None),
        };

        let url = rest::join_path(&self.config.target_web_url, &project.full_path);
        let deprecation = deprecator.deprecate_repo(&repo.name, &url).await?;

        Ok(Some(MigratedRepo {
            name: repo.name.clone(),
            url,
            deprecation,
        }))
    }

    /// Same selection as a real run, reading only.
    async fn plan(&self) -> Result<MigrationReport> {
        let group_name = &self.config.group_name;
        let group_id = self
            .target
            .find_group_id(group_name)
            .await
            .with_context(|| format!("Error getting group {}", group_name))?;
        match group_id {
            Some(id) => tracing::info!(group = %group_name, %id, "dry run: group exists"),
            None => tracing::info!(group = %group_name, "dry run: group would be created"),
        }

        let repos = self.selected_repositories().await?;

        let mut report = MigrationReport::default();
        for repo in repos {
            let present = match group_id {
                Some(id) => self
                    .target
                    .is_project_in_group(&repo.name, id)
                    .await
                    .with_context(|| {
                        format!("Error checking group {} for repo {}", id, repo.name)
                    })?,
                None => false,
            };

            if present {
                tracing::info!(repo = %repo.name, "dry run: already migrated");
                report.already_migrated.push(repo.name);
            } else {
                tracing::info!(repo = %repo.name, "dry run: would migrate");
                report.planned.push(repo.name);
            }
        }

        Ok(report)
    }

    async fn selected_repositories(&self) -> Result<Vec<RepositoryRecord>> {
        let project_key = &self.config.project_key;
        let mut repos = self
            .source
            .list_repositories(project_key)
            .await
            .with_context(|| format!("Error listing repos of project {}", project_key))?;

        repos.retain(|repo| self.config.repo_filter.allows(&repo.name));
        repos.sort();

        tracing::info!(
            project = %project_key,
            repos = ?repos.iter().map(|repo| repo.name.as_str()).collect::<Vec<_>>(),
            "selected repos"
        );

        Ok(repos)
    }
}
