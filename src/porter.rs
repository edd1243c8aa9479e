use anyhow::{anyhow, Context, Result};
use url::Url;

use crate::models::{
    GroupId, ImportMode, ImportRequest, ImportSource, ImportedProject, RepositoryRecord,
    SourceCredentials,
};
use crate::provider::{SourceProvider, TargetProvider};

/// Imports repositories into one target group and configures them the way we want them.
pub struct RepoPorter<'a, S: ?Sized, T: ?Sized> {
    source: &'a S,
    target: &'a T,
    project_key: &'a str,
    group_id: GroupId,
    import_mode: ImportMode,
    credentials: &'a SourceCredentials,
}

impl<'a, S, T> RepoPorter<'a, S, T>
where
    S: SourceProvider + ?Sized,
    T: TargetProvider + ?Sized,
{
    pub fn new(
        source: &'a S,
        target: &'a T,
        project_key: &'a str,
        group_id: GroupId,
        import_mode: ImportMode,
        credentials: &'a SourceCredentials,
    ) -> Self {
        RepoPorter {
            source,
            target,
            project_key,
            group_id,
            import_mode,
            credentials,
        }
    }

    /// Imports `repo` unless the group already has it, in which case `None` is returned and
    /// nothing is written. Completed steps are not undone when a later one fails.
    pub async fn port_repo(&self, repo: &RepositoryRecord) -> Result<Option<ImportedProject>> {
        tracing::info!(repo = %repo.name, "porting repo");

        let present = self
            .target
            .is_project_in_group(&repo.name, self.group_id)
            .await
            .with_context(|| {
                format!("Error checking group {} for repo {}", self.group_id, repo.name)
            })?;
        if present {
            tracing::info!(repo = %repo.name, "repo already in target group, skipping");
            return Ok(None);
        }

        let target_namespace = self
            .target
            .group_full_path(self.group_id)
            .await
            .with_context(|| format!("Error getting path for group {}", self.group_id))?;

        let request = ImportRequest {
            repo_name: repo.name.clone(),
            group_id: self.group_id,
            target_namespace,
            source: self.import_source(repo)?,
        };

        // A 403 here usually means the Bitbucket Server importer is disabled on the target.
        let project = self
            .target
            .import_repository(&request)
            .await
            .with_context(|| format!("Error importing repo {}", repo.name))?;
        tracing::info!(
            repo = %repo.name,
            project = %project.id,
            path = %project.full_path,
            status = project.import_status.as_deref().unwrap_or("unknown"),
            "imported repo"
        );

        self.target
            .apply_baseline_settings(project.id)
            .await
            .with_context(|| format!("Error configuring project {}", project.id))?;

        // The import does not carry the description over, so copy it even when empty.
        let description = self
            .source
            .get_description(self.project_key, &repo.name)
            .await
            .with_context(|| format!("Error getting description of repo {}", repo.name))?;
        self.target
            .set_description(project.id, &description)
            .await
            .with_context(|| format!("Error updating description of project {}", project.id))?;

        Ok(Some(project))
    }

    fn import_source(&self, repo: &RepositoryRecord) -> Result<ImportSource> {
        match self.import_mode {
            ImportMode::BitbucketServer => Ok(ImportSource::BitbucketServer {
                credentials: self.credentials.clone(),
                project_key: self.project_key.to_string(),
            }),
            ImportMode::CloneUrl => {
                let url = authenticated_clone_url(&repo.clone_url, self.credentials)
                    .with_context(|| format!("Error building import url for repo {}", repo.name))?;
                Ok(ImportSource::CloneUrl(url))
            }
        }
    }
}

fn authenticated_clone_url(clone_url: &str, credentials: &SourceCredentials) -> Result<Url> {
    if clone_url.is_empty() {
        return Err(anyhow!("repository has no http clone url"));
    }

    let mut url = Url::parse(clone_url)?;
    url.set_username(&credentials.username)
        .and_then(|_| url.set_password(Some(&credentials.access_token)))
        .map_err(|_| anyhow!("clone url {} cannot carry credentials", clone_url))?;

    Ok(url)
}
