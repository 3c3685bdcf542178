//! Building a dependency tree out of `Cargo.lock` + `Cargo.toml`.
//!
//! Cargo has no separate "print the tree" native command to shell out to —
//! `Cargo.lock`'s flat package list, read via `buildinfo_manifest::cargo`,
//! already contains every resolved version and the full transitive edge
//! set. This module only does the BFS from the root package's direct
//! dependencies (with their scope taken from the manifest) out through the
//! lockfile's edges.
//!
//! Lockfile edges reference a dependent purely by crate name (this reader
//! doesn't disambiguate Cargo.lock's rare same-name/different-version
//! case — see `DESIGN.md`), so the first matching name in the package list
//! wins when more than one version of a crate appears in the graph.

use std::collections::{HashMap, HashSet, VecDeque};

use buildinfo_manifest::cargo::{CargoManifest, LockedCrate};
use buildinfo_model::{Ecosystem, Id, Scope};

use crate::ParsedNode;

pub fn build_cargo_tree(manifest: &CargoManifest, lock: &[LockedCrate]) -> Vec<ParsedNode> {
    let by_name: HashMap<&str, &LockedCrate> =
        lock.iter().map(|p| (p.name.as_str(), p)).collect();

    let root_name = manifest
        .package
        .as_ref()
        .map(|p| p.name.as_str())
        .unwrap_or_default();

    let mut direct_scopes: HashMap<&str, Scope> = HashMap::new();
    for name in manifest.dependencies.keys() {
        direct_scopes.insert(name.as_str(), Scope::map(Ecosystem::Cargo, "normal"));
    }
    for name in manifest.dev_dependencies.keys() {
        direct_scopes.insert(name.as_str(), Scope::map(Ecosystem::Cargo, "dev"));
    }
    for name in manifest.build_dependencies.keys() {
        direct_scopes.insert(name.as_str(), Scope::map(Ecosystem::Cargo, "build"));
    }

    let mut nodes = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<(String, Option<Id>, Scope)> = VecDeque::new();

    for (name, scope) in &direct_scopes {
        if *name == root_name {
            continue;
        }
        queue.push_back((name.to_string(), None, *scope));
    }

    while let Some((name, parent_id, scope)) = queue.pop_front() {
        let Some(locked) = by_name.get(name.as_str()) else {
            continue;
        };
        let id = Id(format!("{}:{}", locked.name, locked.version));
        let key = format!("{}<-{}", id, parent_id.as_ref().map(Id::to_string).unwrap_or_default());
        if !visited.insert(key) {
            continue;
        }

        nodes.push(ParsedNode {
            id: id.clone(),
            name: locked.name.clone(),
            version: locked.version.clone(),
            scope,
            parent_id,
            omitted_for_duplicate: false,
            checksum: locked.checksum.clone(),
        });

        for dep_name in &locked.dependencies {
            if dep_name == &root_name {
                continue;
            }
            // Transitive edges inherit the scope of the edge that first
            // pulled the dependency in.
            queue.push_back((dep_name.clone(), Some(id.clone()), scope));
        }
    }

    nodes
}
