use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    BranchRestriction, DefaultBranch, FileCommit, GroupId, ImportRequest, ImportedProject,
    NewGroup, ProjectId, RepositoryRecord,
};

/// What the migration needs from the host repositories are moved away from.
#[async_trait]
pub trait SourceProvider {
    async fn list_repositories(&self, project_key: &str) -> Result<Vec<RepositoryRecord>>;

    /// Name of the first root entry whose name contains `name_substring`, ignoring case.
    async fn find_file(
        &self,
        project_key: &str,
        repo_name: &str,
        name_substring: &str,
    ) -> Result<Option<String>>;

    async fn read_file(
        &self,
        project_key: &str,
        repo_name: &str,
        file_name: &str,
    ) -> Result<Vec<String>>;

    async fn write_file(&self, project_key: &str, repo_name: &str, commit: &FileCommit)
        -> Result<()>;

    /// Empty when the repository has no description.
    async fn get_description(&self, project_key: &str, repo_name: &str) -> Result<String>;

    async fn set_description(&self, project_key: &str, repo_name: &str, text: &str) -> Result<()>;

    async fn get_default_branch(&self, project_key: &str, repo_name: &str)
        -> Result<DefaultBranch>;

    async fn add_branch_restriction(
        &self,
        project_key: &str,
        repo_name: &str,
        restriction: &BranchRestriction,
    ) -> Result<()>;
}

/// What the migration needs from the host repositories are moved to.
#[async_trait]
pub trait TargetProvider {
    /// Id of the first group named `name`, ignoring case.
    async fn find_group_id(&self, name: &str) -> Result<Option<GroupId>>;

    async fn create_group(&self, group: &NewGroup) -> Result<GroupId>;

    async fn group_full_path(&self, group_id: GroupId) -> Result<String>;

    async fn is_project_in_group(&self, repo_name: &str, group_id: GroupId) -> Result<bool>;

    async fn import_repository(&self, request: &ImportRequest) -> Result<ImportedProject>;

    async fn apply_baseline_settings(&self, project_id: ProjectId) -> Result<()>;

    async fn set_description(&self, project_id: ProjectId, text: &str) -> Result<()>;
}
