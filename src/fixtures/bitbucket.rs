use serde_json::{json, Value};

pub fn get_repo_json(slug: &str, http_clone_url: Option<&str>) -> Value {
    let mut clone = vec![json!({
        "href": format!("ssh://git@bitbucket.example:7999/prj/{}.git", slug),
        "name": "ssh",
    })];
    if let Some(href) = http_clone_url {
        clone.push(json!({ "href": href, "name": "http" }));
    }

    json!({
        "slug": slug,
        "name": slug,
        "state": "AVAILABLE",
        "links": { "clone": clone },
    })
}

/// One page of a paged list; `next_page_start` set means more pages follow.
pub fn get_page_json(values: Vec<Value>, start: u64, next_page_start: Option<u64>) -> Value {
    let mut page = json!({
        "size": values.len(),
        "limit": 1000,
        "start": start,
        "isLastPage": next_page_start.is_none(),
        "values": values,
    });
    if let Some(next) = next_page_start {
        page["nextPageStart"] = json!(next);
    }

    page
}

pub fn get_child_json(name: &str, r#type: &str) -> Value {
    json!({
        "path": { "components": [name], "name": name, "toString": name },
        "type": r#type,
        "size": 42,
    })
}

pub fn get_browse_json(children: Vec<Value>, next_page_start: Option<u64>) -> Value {
    json!({
        "path": { "components": [], "name": "", "toString": "" },
        "children": get_page_json(children, 0, next_page_start),
    })
}

pub fn get_lines_json(lines: &[&str], start: u64, next_page_start: Option<u64>) -> Value {
    let mut page = json!({
        "lines": lines.iter().map(|line| json!({ "text": line })).collect::<Vec<_>>(),
        "start": start,
        "size": lines.len(),
        "isLastPage": next_page_start.is_none(),
    });
    if let Some(next) = next_page_start {
        page["nextPageStart"] = json!(next);
    }

    page
}

pub fn get_repo_details_json(slug: &str, description: Option<&str>) -> Value {
    let mut repo = json!({ "slug": slug, "name": slug });
    if let Some(description) = description {
        repo["description"] = json!(description);
    }

    repo
}

pub fn get_default_branch_json(display_id: &str, latest_commit: &str) -> Value {
    json!({
        "id": format!("refs/heads/{}", display_id),
        "displayId": display_id,
        "type": "BRANCH",
        "latestCommit": latest_commit,
        "isDefault": true,
    })
}
