//! Source host: Bitbucket Server REST API.
//!
//! Every request authenticates with basic auth (username + personal access token).
//! List endpoints are paged with `limit`/`start` and report `isLastPage`/`nextPageStart`.

use async_trait::async_trait;
use reqwest::{multipart::Form, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use url::Url;

use crate::error::Result;
use crate::models::{BranchRestriction, DefaultBranch, FileCommit, RepositoryRecord};
use crate::provider::SourceProvider;
use crate::rest::{api_path, RestClient};

const API_ROOT: [&str; 3] = ["rest", "api", "1.0"];
const BRANCH_PERMISSIONS_ROOT: [&str; 3] = ["rest", "branch-permissions", "2.0"];
const PAGE_LIMIT: u32 = 1000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
struct Page<T> {
    #[serde(default, alias = "lines")]
    values: Vec<T>,
    #[serde(default = "last_page")]
    is_last_page: bool,
    next_page_start: Option<u64>,
}

fn last_page() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct Repo {
    slug: String,
    #[serde(default)]
    links: RepoLinks,
}

#[derive(Debug, Default, Deserialize)]
struct RepoLinks {
    #[serde(default)]
    clone: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct Browse {
    children: Page<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    path: ChildPath,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChildPath {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Line {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct RepoDetails {
    #[serde(default)]
    description: Option<String>,
}

#[derive(Clone)]
pub struct BitbucketProvider {
    rest: RestClient,
    username: String,
    access_token: String,
}

impl BitbucketProvider {
    pub fn new(
        base_url: Url,
        username: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self> {
        Ok(BitbucketProvider {
            rest: RestClient::new(base_url)?,
            username: username.into(),
            access_token: access_token.into(),
        })
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.rest
            .request(method, url)
            .basic_auth(&self.username, Some(&self.access_token))
    }

    fn repo_url(
        &self,
        project_key: &str,
        repo_name: &str,
        tail: &[&str],
        query: &[(&str, String)],
    ) -> Result<Url> {
        let mut segments = api_path(&API_ROOT, &["projects", project_key, "repos", repo_name]);
        segments.extend_from_slice(tail);

        self.rest.endpoint(segments, query)
    }

    /// Follows `nextPageStart` until the host reports the last page.
    async fn collect_pages<R, T>(
        &self,
        url_for: impl Fn(u64) -> Result<Url> + Send,
        into_page: fn(R) -> Page<T>,
    ) -> Result<Vec<T>>
    where
        R: DeserializeOwned + Send,
        T: Send,
    {
        let mut items = Vec::new();
        let mut start = 0;

        loop {
            let url = url_for(start)?;
            let response: R = self.rest.json(self.request(Method::GET, url)).await?;
            let page = into_page(response);

            items.extend(page.values);

            match (page.is_last_page, page.next_page_start) {
                (false, Some(next)) if next > start => start = next,
                _ => break,
            }
        }

        Ok(items)
    }
}

fn paging(start: u64) -> [(&'static str, String); 2] {
    [("limit", PAGE_LIMIT.to_string()), ("start", start.to_string())]
}

#[async_trait]
impl SourceProvider for BitbucketProvider {
    async fn list_repositories(&self, project_key: &str) -> Result<Vec<RepositoryRecord>> {
        let repos: Vec<Repo> = self
            .collect_pages(
                |start| {
                    let segments = api_path(&API_ROOT, &["projects", project_key, "repos"]);
                    self.rest.endpoint(segments, &paging(start))
                },
                |page: Page<Repo>| page,
            )
            .await?;

        let records = repos
            .into_iter()
            .map(|repo| {
                let clone_url = repo
                    .links
                    .clone
                    .into_iter()
                    .find(|link| link.name == "http")
                    .map(|link| link.href)
                    .unwrap_or_default();

                RepositoryRecord {
                    name: repo.slug,
                    clone_url,
                }
            })
            .collect();

        Ok(records)
    }

    async fn find_file(
        &self,
        project_key: &str,
        repo_name: &str,
        name_substring: &str,
    ) -> Result<Option<String>> {
        let children = self
            .collect_pages(
                |start| self.repo_url(project_key, repo_name, &["browse"], &paging(start)),
                |browse: Browse| browse.children,
            )
            .await?;

        let needle = name_substring.to_lowercase();
        let found = children
            .into_iter()
            .filter(|child| child.kind.as_deref() != Some("DIRECTORY"))
            .map(|child| child.path.name)
            .find(|name| name.to_lowercase().contains(&needle));

        Ok(found)
    }

    async fn read_file(
        &self,
        project_key: &str,
        repo_name: &str,
        file_name: &str,
    ) -> Result<Vec<String>> {
        let lines = self
            .collect_pages(
                |start| {
                    self.repo_url(project_key, repo_name, &["browse", file_name], &paging(start))
                },
                |page: Page<Line>| page,
            )
            .await?;

        Ok(lines.into_iter().map(|line| line.text).collect())
    }

    async fn write_file(
        &self,
        project_key: &str,
        repo_name: &str,
        commit: &FileCommit,
    ) -> Result<()> {
        let tail = ["browse", commit.file_name.as_str()];
        let url = self.repo_url(project_key, repo_name, &tail, &[])?;

        let mut form = Form::new()
            .text("content", commit.content.clone())
            .text("message", commit.message.clone())
            .text("branch", commit.branch.clone());
        if let Some(commit_id) = &commit.source_commit_id {
            form = form.text("sourceCommitId", commit_id.clone());
        }

        self.rest
            .execute(self.request(Method::PUT, url).multipart(form))
            .await?;

        Ok(())
    }

    async fn get_description(&self, project_key: &str, repo_name: &str) -> Result<String> {
        let url = self.repo_url(project_key, repo_name, &[], &[])?;
        let details: RepoDetails = self.rest.json(self.request(Method::GET, url)).await?;

        Ok(details.description.unwrap_or_default())
    }

    async fn set_description(&self, project_key: &str, repo_name: &str, text: &str) -> Result<()> {
        let url = self.repo_url(project_key, repo_name, &[], &[])?;

        self.rest
            .execute(
                self.request(Method::PUT, url)
                    .json(&json!({ "description": text })),
            )
            .await?;

        Ok(())
    }

    async fn get_default_branch(
        &self,
        project_key: &str,
        repo_name: &str,
    ) -> Result<DefaultBranch> {
        let url = self.repo_url(project_key, repo_name, &["default-branch"], &[])?;

        self.rest.json(self.request(Method::GET, url)).await
    }

    async fn add_branch_restriction(
        &self,
        project_key: &str,
        repo_name: &str,
        restriction: &BranchRestriction,
    ) -> Result<()> {
        let segments = api_path(
            &BRANCH_PERMISSIONS_ROOT,
            &["projects", project_key, "repos", repo_name, "restrictions"],
        );
        let url = self.rest.endpoint(segments, &[])?;

        self.rest
            .execute(self.request(Method::POST, url).json(restriction))
            .await?;

        Ok(())
    }
}
