use serde::{Deserialize, Deserializer};

use crate::models::{GroupId, ImportMode};

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SourceSettings {
    pub host: String,
    pub username: String,
    pub access_token: Option<String>,
    pub project_key: String,
    /// Comma separated names or `glob("...")` expressions.
    #[serde(default)]
    pub repos_to_exclude: Option<String>,
    #[serde(default)]
    pub repos_to_include: Option<String>,
    pub readme_banner: Vec<String>,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TargetSettings {
    pub host: String,
    pub access_token: Option<String>,
    pub group_name: String,
    /// Any negative id means a top-level group.
    #[serde(default, deserialize_with = "parent_group_id")]
    pub parent_group_id: Option<GroupId>,
    #[serde(default)]
    pub import_mode: ImportMode,
}

fn parent_group_id<'de, D>(deserializer: D) -> Result<Option<GroupId>, D::Error>
where
    D: Deserializer<'de>,
{
    let id = Option::<i64>::deserialize(deserializer)?;
    Ok(id.and_then(|id| u64::try_from(id).ok()).map(GroupId))
}
