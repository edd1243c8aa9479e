use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// A repository found in the source project. Only the name is used as a key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RepositoryRecord {
    pub name: String,
    pub clone_url: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub u64);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Group to create on the target host.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewGroup {
    pub name: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<GroupId>,
}

/// A project created on the target host by an import.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ImportedProject {
    pub id: ProjectId,
    pub name: String,
    #[serde(alias = "path_with_namespace")]
    pub full_path: String,
    #[serde(default)]
    pub import_status: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultBranch {
    pub id: String,
    pub display_id: String,
    pub latest_commit: String,
}

/// How the source host is reached and authenticated against.
#[derive(Clone, PartialEq)]
pub struct SourceCredentials {
    pub base_url: Url,
    pub username: String,
    pub access_token: String,
}

// Tokens stay out of logs.
impl fmt::Debug for SourceCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceCredentials")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, PartialEq)]
pub struct TargetCredentials {
    pub base_url: Url,
    pub access_token: String,
}

impl fmt::Debug for TargetCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetCredentials")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Which importer of the target host pulls the repositories over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    #[default]
    BitbucketServer,
    CloneUrl,
}

/// Where the target host pulls one repository from.
#[derive(Clone, PartialEq)]
pub enum ImportSource {
    /// The target host's Bitbucket Server importer.
    BitbucketServer {
        credentials: SourceCredentials,
        project_key: String,
    },
    /// A plain git import from a clone url that already carries credentials.
    CloneUrl(Url),
}

impl fmt::Debug for ImportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportSource::BitbucketServer {
                credentials,
                project_key,
            } => f
                .debug_struct("BitbucketServer")
                .field("credentials", credentials)
                .field("project_key", project_key)
                .finish(),
            ImportSource::CloneUrl(url) => {
                let mut redacted = url.clone();
                let _ = redacted.set_password(None);
                f.debug_tuple("CloneUrl").field(&redacted.as_str()).finish()
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImportRequest {
    pub repo_name: String,
    pub group_id: GroupId,
    pub target_namespace: String,
    pub source: ImportSource,
}

/// A single commit of one whole file on the source host.
#[derive(Clone, Debug, PartialEq)]
pub struct FileCommit {
    pub file_name: String,
    pub content: String,
    pub message: String,
    pub branch: String,
    /// Latest commit known for the file; `None` creates the file instead of updating it.
    pub source_commit_id: Option<String>,
}

/// Branch permission payload for the source host.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BranchRestriction {
    #[serde(rename = "type")]
    pub kind: String,
    pub matcher: BranchMatcher,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchMatcher {
    pub id: String,
    pub display_id: String,
    #[serde(rename = "type")]
    pub kind: MatcherType,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatcherType {
    pub id: String,
    pub name: String,
}

impl BranchRestriction {
    /// Read-only on every branch.
    pub fn read_only_everywhere() -> Self {
        let pattern = "**/*".to_string();

        BranchRestriction {
            kind: "read-only".to_string(),
            matcher: BranchMatcher {
                id: pattern.clone(),
                display_id: pattern,
                kind: MatcherType {
                    id: "PATTERN".to_string(),
                    name: "Pattern".to_string(),
                },
                active: true,
            },
        }
    }
}
