//! Finds the target group by name, creating it on first use.
//!
//! Names are compared ignoring case. The two hosts normalize display names differently, so
//! names that differ only in special characters are treated as different groups.

use anyhow::{Context, Result};

use crate::models::{GroupId, NewGroup};
use crate::provider::TargetProvider;

/// Url path for a new group: whitespace runs become single hyphens, lower-cased.
pub fn group_path(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

pub async fn get_or_create_group_id<T>(
    target: &T,
    name: &str,
    parent_id: Option<GroupId>,
) -> Result<GroupId>
where
    T: TargetProvider + ?Sized,
{
    let existing = target
        .find_group_id(name)
        .await
        .with_context(|| format!("Error getting group {}", name))?;

    if let Some(id) = existing {
        tracing::debug!(group = name, %id, "found existing group");
        return Ok(id);
    }

    let group = NewGroup {
        name: name.to_string(),
        path: group_path(name),
        parent_id,
    };

    target
        .create_group(&group)
        .await
        .with_context(|| format!("Error creating group {}", name))
}
