//! Parser for `conan graph info --format=json` output.
//!
//! Conan 2's graph JSON is a flat map of numeric node ids to node records,
//! each carrying its own `dependencies` map of child node ids. Node `"0"`
//! is always the root (the consumer itself, with no `ref`).

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Deserialize;

use buildinfo_model::{Ecosystem, Id, Scope};
use buildinfo_util::errors::BuildInfoError;

use crate::ParsedNode;

#[derive(Debug, Deserialize)]
struct GraphInfo {
    graph: Graph,
}

#[derive(Debug, Deserialize)]
struct Graph {
    nodes: HashMap<String, GraphNode>,
}

#[derive(Debug, Deserialize)]
struct GraphNode {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    package_folder: Option<String>,
    #[serde(default)]
    dependencies: HashMap<String, DependencyEdge>,
}

#[derive(Debug, Deserialize)]
struct DependencyEdge {
    #[serde(default)]
    build: bool,
    #[serde(default)]
    test: bool,
}

/// Parse `conan graph info --format=json` output into a flat node list,
/// with each node's resolved local `package_folder` (when Conan has
/// already built/downloaded it) carried along for the Artifact Locator.
pub fn parse_conan_graph(json: &str) -> Result<Vec<ParsedNode>, BuildInfoError> {
    let info: GraphInfo = serde_json::from_str(json).map_err(|e| BuildInfoError::ParseError {
        message: format!("failed to parse conan graph json: {e}"),
    })?;

    let mut nodes = Vec::new();
    let mut visited = HashSet::new();
    let mut queue: VecDeque<(String, Option<Id>, Scope)> = VecDeque::new();
    queue.push_back(("0".to_string(), None, Scope::Compile));

    while let Some((node_id, parent_id, scope)) = queue.pop_front() {
        if !visited.insert(node_id.clone()) {
            continue;
        }
        let Some(node) = info.graph.nodes.get(&node_id) else {
            continue;
        };

        // Node "0" is the consumer itself, with no name/version to record.
        if node_id != "0" {
            let name = node.name.clone().unwrap_or_default();
            let version = node.version.clone().unwrap_or_default();
            let id = Id(format!("{name}/{version}"));
            nodes.push(ParsedNode {
                id,
                name,
                version,
                scope,
                parent_id: parent_id.clone(),
                omitted_for_duplicate: false,
                checksum: None,
            });
        }

        let this_id = if node_id == "0" {
            None
        } else {
            nodes.last().map(|n| n.id.clone())
        };

        for (child_id, edge) in &node.dependencies {
            let child_scope = if edge.test {
                Scope::Test
            } else if edge.build {
                Scope::Build
            } else {
                Scope::map(Ecosystem::Conan, "requires")
            };
            queue.push_back((child_id.clone(), this_id.clone(), child_scope));
        }
    }

    Ok(nodes)
}

/// Extract `package_folder` entries keyed by `name/version` reference, for
/// nodes Conan has already resolved to a local cache path.
pub fn package_folders(json: &str) -> Result<HashMap<String, String>, BuildInfoError> {
    let info: GraphInfo = serde_json::from_str(json).map_err(|e| BuildInfoError::ParseError {
        message: format!("failed to parse conan graph json: {e}"),
    })?;

    Ok(info
        .graph
        .nodes
        .values()
        .filter_map(|n| {
            let name = n.name.clone()?;
            let version = n.version.clone()?;
            let folder = n.package_folder.clone()?;
            Some((format!("{name}/{version}"), folder))
        })
        .collect())
}
