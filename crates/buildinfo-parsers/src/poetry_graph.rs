//! Building a dependency tree out of `poetry.lock` (+ `pyproject.toml` for
//! the direct dependency set and group scopes).
//!
//! Poetry, like Cargo and Bundler, has no separate native "print the tree"
//! step: `poetry.lock`'s flat package list already carries every resolved
//! version and dependency edge.

use std::collections::{HashMap, HashSet, VecDeque};

use buildinfo_manifest::poetry::{LockedPythonPackage, PyProjectToml};
use buildinfo_model::{Ecosystem, Id, Scope};

use crate::ParsedNode;

pub fn build_poetry_tree(
    project: &PyProjectToml,
    lock: &[LockedPythonPackage],
) -> Vec<ParsedNode> {
    let by_name: HashMap<String, &LockedPythonPackage> = lock
        .iter()
        .map(|p| (p.name.to_ascii_lowercase(), p))
        .collect();

    let mut direct_scopes: HashMap<String, Scope> = HashMap::new();
    if let Some(poetry) = project.tool.as_ref().and_then(|t| t.poetry.as_ref()) {
        for name in poetry.dependencies.keys() {
            if name == "python" {
                continue;
            }
            direct_scopes.insert(name.to_ascii_lowercase(), Scope::map(Ecosystem::Poetry, "main"));
        }
        for group in poetry.groups.values() {
            for name in group.dependencies.keys() {
                direct_scopes
                    .entry(name.to_ascii_lowercase())
                    .or_insert_with(|| Scope::map(Ecosystem::Poetry, "dev"));
            }
        }
    }

    let mut nodes = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<(String, Option<Id>, Scope)> = VecDeque::new();
    for (name, scope) in &direct_scopes {
        queue.push_back((name.clone(), None, *scope));
    }

    while let Some((name, parent_id, scope)) = queue.pop_front() {
        let Some(pkg) = by_name.get(&name) else {
            continue;
        };
        let id = Id(format!("{}:{}", pkg.name, pkg.version));
        let key = format!("{}<-{}", id, parent_id.as_ref().map(Id::to_string).unwrap_or_default());
        if !visited.insert(key) {
            continue;
        }

        nodes.push(ParsedNode {
            id: id.clone(),
            name: pkg.name.clone(),
            version: pkg.version.clone(),
            scope,
            parent_id,
            omitted_for_duplicate: false,
            checksum: None,
        });

        for dep_name in &pkg.dependencies {
            queue.push_back((dep_name.to_ascii_lowercase(), Some(id.clone()), scope));
        }
    }

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildinfo_manifest::poetry::{parse_poetry_lock, parse_pyproject_toml};

    #[test]
    fn builds_tree_from_main_dependencies() {
        let project = parse_pyproject_toml(
            r#"
[tool.poetry]
name = "demo"
version = "0.1.0"

[tool.poetry.dependencies]
python = "^3.11"
requests = "^2.31"
"#,
        )
        .unwrap();

        let lock = parse_poetry_lock(
            r#"
[[package]]
name = "requests"
version = "2.31.0"
dependencies = { urllib3 = "^2.0" }

[[package]]
name = "urllib3"
version = "2.0.7"
"#,
        )
        .unwrap();

        let nodes = build_poetry_tree(&project, &lock);
        let requests = nodes.iter().find(|n| n.name == "requests").unwrap();
        assert!(requests.parent_id.is_none());
        assert_eq!(requests.scope, Scope::Python);

        let urllib3 = nodes.iter().find(|n| n.name == "urllib3").unwrap();
        assert_eq!(urllib3.parent_id, Some(requests.id.clone()));
    }
}
