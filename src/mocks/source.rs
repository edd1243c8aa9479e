use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::remote_failure;
use crate::error::Result;
use crate::models::{BranchRestriction, DefaultBranch, FileCommit, RepositoryRecord};
use crate::provider::SourceProvider;

pub const DEFAULT_BRANCH: &str = "main";
pub const LATEST_COMMIT: &str = "c0ffee";

#[derive(Clone, Debug, PartialEq)]
pub enum SourceCall {
    ListRepositories,
    FindFile { repo: String },
    ReadFile { repo: String, file: String },
    WriteFile { repo: String, commit: FileCommit },
    GetDescription { repo: String },
    SetDescription { repo: String, text: String },
    DefaultBranch { repo: String },
    AddRestriction { repo: String, restriction: BranchRestriction },
}

#[derive(Default)]
struct SourceState {
    repos: Vec<RepositoryRecord>,
    files: HashMap<String, Vec<(String, Vec<String>)>>,
    descriptions: HashMap<String, String>,
    failing_repos: Vec<String>,
    calls: Vec<SourceCall>,
}

#[derive(Default)]
pub struct FakeSource {
    state: Mutex<SourceState>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repo(mut self, name: &str) -> Self {
        self.state.get_mut().unwrap().repos.push(RepositoryRecord {
            name: name.to_string(),
            clone_url: format!("https://bitbucket.example/scm/prj/{}.git", name),
        });
        self
    }

    pub fn with_file(mut self, repo: &str, file: &str, lines: &[&str]) -> Self {
        self.state
            .get_mut()
            .unwrap()
            .files
            .entry(repo.to_string())
            .or_default()
            .push((file.to_string(), lines.iter().map(|l| l.to_string()).collect()));
        self
    }

    pub fn with_description(mut self, repo: &str, text: &str) -> Self {
        self.state
            .get_mut()
            .unwrap()
            .descriptions
            .insert(repo.to_string(), text.to_string());
        self
    }

    /// Every call touching `repo` fails.
    pub fn failing(mut self, repo: &str) -> Self {
        self.state
            .get_mut()
            .unwrap()
            .failing_repos
            .push(repo.to_string());
        self
    }

    pub fn calls(&self) -> Vec<SourceCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn writes(&self) -> Vec<SourceCall> {
        self.calls()
            .into_iter()
            .filter(|call| {
                matches!(
                    call,
                    SourceCall::WriteFile { .. }
                        | SourceCall::SetDescription { .. }
                        | SourceCall::AddRestriction { .. }
                )
            })
            .collect()
    }

    fn record(&self, repo: &str, call: SourceCall) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);

        if state.failing_repos.iter().any(|failing| failing == repo) {
            return Err(remote_failure(repo));
        }

        Ok(())
    }
}

#[async_trait]
impl SourceProvider for FakeSource {
    async fn list_repositories(&self, _project_key: &str) -> Result<Vec<RepositoryRecord>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(SourceCall::ListRepositories);

        Ok(state.repos.clone())
    }

    async fn find_file(
        &self,
        _project_key: &str,
        repo_name: &str,
        name_substring: &str,
    ) -> Result<Option<String>> {
        self.record(
            repo_name,
            SourceCall::FindFile {
                repo: repo_name.to_string(),
            },
        )?;

        let needle = name_substring.to_lowercase();
        let state = self.state.lock().unwrap();
        let found = state.files.get(repo_name).and_then(|files| {
            files
                .iter()
                .map(|(name, _)| name)
                .find(|name| name.to_lowercase().contains(&needle))
                .cloned()
        });

        Ok(found)
    }

    async fn read_file(
        &self,
        _project_key: &str,
        repo_name: &str,
        file_name: &str,
    ) -> Result<Vec<String>> {
        self.record(
            repo_name,
            SourceCall::ReadFile {
                repo: repo_name.to_string(),
                file: file_name.to_string(),
            },
        )?;

        let state = self.state.lock().unwrap();
        let lines = state
            .files
            .get(repo_name)
            .and_then(|files| files.iter().find(|(name, _)| name == file_name))
            .map(|(_, lines)| lines.clone())
            .unwrap_or_default();

        Ok(lines)
    }

    async fn write_file(
        &self,
        _project_key: &str,
        repo_name: &str,
        commit: &FileCommit,
    ) -> Result<()> {
        self.record(
            repo_name,
            SourceCall::WriteFile {
                repo: repo_name.to_string(),
                commit: commit.clone(),
            },
        )?;

        let lines: Vec<String> = commit.content.lines().map(String::from).collect();
        let mut state = self.state.lock().unwrap();
        let files = state.files.entry(repo_name.to_string()).or_default();
        match files.iter_mut().find(|(name, _)| *name == commit.file_name) {
            Some((_, existing)) => *existing = lines,
            None => files.push((commit.file_name.clone(), lines)),
        }

        Ok(())
    }

    async fn get_description(&self, _project_key: &str, repo_name: &str) -> Result<String> {
        self.record(
            repo_name,
            SourceCall::GetDescription {
                repo: repo_name.to_string(),
            },
        )?;

        let state = self.state.lock().unwrap();
        Ok(state.descriptions.get(repo_name).cloned().unwrap_or_default())
    }

    async fn set_description(&self, _project_key: &str, repo_name: &str, text: &str) -> Result<()> {
        self.record(
            repo_name,
            SourceCall::SetDescription {
                repo: repo_name.to_string(),
                text: text.to_string(),
            },
        )?;

        self.state
            .lock()
            .unwrap()
            .descriptions
            .insert(repo_name.to_string(), text.to_string());
        Ok(())
    }

    async fn get_default_branch(
        &self,
        _project_key: &str,
        repo_name: &str,
    ) -> Result<DefaultBranch> {
        self.record(
            repo_name,
            SourceCall::DefaultBranch {
                repo: repo_name.to_string(),
            },
        )?;

        Ok(DefaultBranch {
            id: format!("refs/heads/{}", DEFAULT_BRANCH),
            display_id: DEFAULT_BRANCH.to_string(),
            latest_commit: LATEST_COMMIT.to_string(),
        })
    }

    async fn add_branch_restriction(
        &self,
        _project_key: &str,
        repo_name: &str,
        restriction: &BranchRestriction,
    ) -> Result<()> {
        self.record(
            repo_name,
            SourceCall::AddRestriction {
                repo: repo_name.to_string(),
                restriction: restriction.clone(),
            },
        )
    }
}
