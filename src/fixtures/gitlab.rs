use serde_json::{json, Value};

pub fn get_group_json(id: u64, name: &str, full_path: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "path": full_path.rsplit('/').next().unwrap_or(full_path),
        "full_path": full_path,
        "parent_id": null,
    })
}

pub fn get_namespace_json(id: u64, full_path: &str) -> Value {
    json!({
        "id": id,
        "kind": "group",
        "full_path": full_path,
    })
}

pub fn get_project_json(id: u64, name: &str, path: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "path": path,
    })
}

/// Answer of the Bitbucket Server importer.
pub fn get_bitbucket_import_json(id: u64, name: &str, full_path: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "full_path": full_path,
        "full_name": name,
        "import_status": "scheduled",
    })
}

/// Answer of a project created with an `import_url`.
pub fn get_url_import_json(id: u64, name: &str, path_with_namespace: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "path": name,
        "path_with_namespace": path_with_namespace,
        "import_status": "scheduled",
    })
}
