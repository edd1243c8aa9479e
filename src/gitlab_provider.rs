//! Target host: GitLab REST API v4, authenticated with the `PRIVATE-TOKEN` header.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::error::Result;
use crate::models::{GroupId, ImportRequest, ImportSource, ImportedProject, NewGroup, ProjectId};
use crate::provider::TargetProvider;
use crate::rest::{api_path, RestClient};

const API_ROOT: [&str; 2] = ["api", "v4"];
const PER_PAGE: usize = 100;
const SUGGESTION_COMMIT_MESSAGE: &str =
    "Apply %{suggestions_count} suggestion(s) to %{files_count} file(s)";

#[derive(Debug, Deserialize)]
struct GroupSummary {
    id: GroupId,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CreatedGroup {
    id: GroupId,
}

#[derive(Debug, Deserialize)]
struct Namespace {
    full_path: String,
}

#[derive(Debug, Deserialize)]
struct ProjectSummary {
    name: String,
    #[serde(default)]
    path: String,
}

#[derive(Serialize)]
struct BitbucketServerImport<'a> {
    bitbucket_server_url: &'a str,
    bitbucket_server_username: &'a str,
    personal_access_token: &'a str,
    bitbucket_server_project: &'a str,
    bitbucket_server_repo: &'a str,
    target_namespace: &'a str,
}

#[derive(Serialize)]
struct UrlImport<'a> {
    name: &'a str,
    namespace_id: GroupId,
    import_url: &'a str,
}

/// Project settings every imported project gets.
#[derive(Debug, PartialEq, Serialize)]
pub struct BaselineSettings {
    pub squash_option: &'static str,
    pub only_allow_merge_if_all_discussions_are_resolved: bool,
    pub suggestion_commit_message: &'static str,
}

impl Default for BaselineSettings {
    fn default() -> Self {
        BaselineSettings {
            squash_option: "never",
            only_allow_merge_if_all_discussions_are_resolved: true,
            suggestion_commit_message: SUGGESTION_COMMIT_MESSAGE,
        }
    }
}

fn same_name(left: &str, right: &str) -> bool {
    left.to_lowercase() == right.to_lowercase()
}

#[derive(Clone)]
pub struct GitlabProvider {
    rest: RestClient,
    access_token: String,
}

impl GitlabProvider {
    pub fn new(base_url: Url, access_token: impl Into<String>) -> Result<Self> {
        Ok(GitlabProvider {
            rest: RestClient::new(base_url)?,
            access_token: access_token.into(),
        })
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.rest
            .request(method, url)
            .header("PRIVATE-TOKEN", self.access_token.as_str())
    }

    fn url(&self, parts: &[&str], query: &[(&str, String)]) -> Result<Url> {
        self.rest.endpoint(api_path(&API_ROOT, parts), query)
    }
}

#[async_trait]
impl TargetProvider for GitlabProvider {
    async fn find_group_id(&self, name: &str) -> Result<Option<GroupId>> {
        // TODO: page through the search when more than PER_PAGE groups match the name.
        let url = self.url(
            &["groups"],
            &[("search", name.to_string()), ("per_page", PER_PAGE.to_string())],
        )?;
        let groups: Vec<GroupSummary> = self.rest.json(self.request(Method::GET, url)).await?;

        Ok(groups
            .into_iter()
            .find(|group| same_name(&group.name, name))
            .map(|group| group.id))
    }

    async fn create_group(&self, group: &NewGroup) -> Result<GroupId> {
        let url = self.url(&["groups"], &[])?;
        let created: CreatedGroup = self
            .rest
            .json(self.request(Method::POST, url).json(group))
            .await?;

        tracing::info!(group = %group.name, id = %created.id, "created group");

        Ok(created.id)
    }

    async fn group_full_path(&self, group_id: GroupId) -> Result<String> {
        let id = group_id.to_string();
        let url = self.url(&["namespaces", id.as_str()], &[])?;
        let namespace: Namespace = self.rest.json(self.request(Method::GET, url)).await?;

        Ok(namespace.full_path)
    }

    async fn is_project_in_group(&self, repo_name: &str, group_id: GroupId) -> Result<bool> {
        let id = group_id.to_string();
        let mut page = 1;

        loop {
            let url = self.url(
                &["groups", id.as_str(), "projects"],
                &[
                    ("search", repo_name.to_string()),
                    ("per_page", PER_PAGE.to_string()),
                    ("page", page.to_string()),
                ],
            )?;
            let projects: Vec<ProjectSummary> =
                self.rest.json(self.request(Method::GET, url)).await?;

            let found = projects.iter().any(|project| {
                same_name(&project.name, repo_name) || same_name(&project.path, repo_name)
            });
            if found {
                return Ok(true);
            }

            if projects.len() < PER_PAGE {
                return Ok(false);
            }
            page += 1;
        }
    }

    async fn import_repository(&self, request: &ImportRequest) -> Result<ImportedProject> {
        let builder = match &request.source {
            ImportSource::BitbucketServer {
                credentials,
                project_key,
            } => {
                let url = self.url(&["import", "bitbucket_server"], &[])?;
                self.request(Method::POST, url).json(&BitbucketServerImport {
                    bitbucket_server_url: credentials.base_url.as_str(),
                    bitbucket_server_username: &credentials.username,
                    personal_access_token: &credentials.access_token,
                    bitbucket_server_project: project_key,
                    bitbucket_server_repo: &request.repo_name,
                    target_namespace: &request.target_namespace,
                })
            }
            ImportSource::CloneUrl(import_url) => {
                let url = self.url(&["projects"], &[])?;
                self.request(Method::POST, url).json(&UrlImport {
                    name: &request.repo_name,
                    namespace_id: request.group_id,
                    import_url: import_url.as_str(),
                })
            }
        };

        self.rest.json(builder).await
    }

    async fn apply_baseline_settings(&self, project_id: ProjectId) -> Result<()> {
        let id = project_id.to_string();
        let url = self.url(&["projects", id.as_str()], &[])?;

        self.rest
            .execute(
                self.request(Method::PUT, url)
                    .json(&BaselineSettings::default()),
            )
            .await?;

        Ok(())
    }

    async fn set_description(&self, project_id: ProjectId, text: &str) -> Result<()> {
        let id = project_id.to_string();
        let url = self.url(&["projects", id.as_str()], &[])?;

        self.rest
            .execute(
                self.request(Method::PUT, url)
                    .json(&json!({ "description": text })),
            )
            .await?;

        Ok(())
    }
}
