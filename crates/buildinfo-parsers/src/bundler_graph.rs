//! Building a dependency tree out of `Gemfile.lock`.
//!
//! Like Cargo, Bundler has no separate native "print the tree" command —
//! the lockfile's `GEM`/`specs:` block already is the fully resolved graph.
//! This module does a BFS from the lockfile's own `DEPENDENCIES` list (the
//! project's direct gems) out through each gem's recorded dependency names.
//!
//! Direct gems get both `runtime` and `compile` scopes — Bundler doesn't
//! distinguish a compile-time-only dependency from a runtime one the way
//! Maven/Gradle do, so a direct `Gemfile` entry is unconditionally available
//! at both. Transitive gems get a single inherited scope.

use std::collections::{HashMap, HashSet, VecDeque};

use buildinfo_manifest::gemfile::GemfileLock;
use buildinfo_model::{Ecosystem, Id, Scope};

use crate::ParsedNode;

pub fn build_bundler_tree(lock: &GemfileLock) -> Vec<ParsedNode> {
    let by_name: HashMap<&str, _> = lock.gems.iter().map(|g| (g.name.as_str(), g)).collect();
    let transitive_scope = Scope::map(Ecosystem::Bundler, "main");
    let direct: HashSet<&str> = lock.top_level_dependencies.iter().map(String::as_str).collect();

    let mut nodes = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<(String, Option<Id>)> = VecDeque::new();

    for name in &lock.top_level_dependencies {
        queue.push_back((name.clone(), None));
    }

    while let Some((name, parent_id)) = queue.pop_front() {
        let Some(gem) = by_name.get(name.as_str()) else {
            continue;
        };
        let id = Id(format!("{}:{}", gem.name, gem.version));
        let key = format!("{}<-{}", id, parent_id.as_ref().map(Id::to_string).unwrap_or_default());
        if !visited.insert(key) {
            continue;
        }

        let scopes: &[Scope] = if direct.contains(name.as_str()) {
            &[Scope::Runtime, Scope::Compile]
        } else {
            std::slice::from_ref(&transitive_scope)
        };
        for &scope in scopes {
            nodes.push(ParsedNode {
                id: id.clone(),
                name: gem.name.clone(),
                version: gem.version.clone(),
                scope,
                parent_id: parent_id.clone(),
                omitted_for_duplicate: false,
                checksum: None,
            });
        }

        for dep_name in &gem.dependencies {
            queue.push_back((dep_name.clone(), Some(id.clone())));
        }
    }

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildinfo_manifest::gemfile::parse_gemfile_lock;

    #[test]
    fn builds_tree_from_dependencies_section() {
        let lock = parse_gemfile_lock(
            "GEM\n  remote: https://rubygems.org/\n  specs:\n    rails (7.1.0)\n      railties (= 7.1.0)\n    railties (7.1.0)\n\nDEPENDENCIES\n  rails\n",
        )
        .unwrap();

        let nodes = build_bundler_tree(&lock);
        let rails = nodes.iter().find(|n| n.name == "rails").unwrap();
        assert!(rails.parent_id.is_none());

        let railties = nodes.iter().find(|n| n.name == "railties").unwrap();
        assert_eq!(railties.parent_id, Some(rails.id.clone()));
    }
}
