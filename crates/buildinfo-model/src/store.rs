use std::collections::{HashMap, VecDeque};

use crate::id::Id;
use crate::info::Dependency;

/// The in-memory dependency graph built up during resolution for a single
/// module.
///
/// Deliberately a pair of plain `HashMap`s rather than a graph crate: nodes
/// are keyed by [`Id`] and edges are `Id -> Vec<Id>` child lists, so merging
/// two parsers' output for the same node is a matter of looking the id up
/// once, and there is never an owning reference between nodes to fight the
/// borrow checker over.
#[derive(Debug, Default, Clone)]
pub struct DependencyStore {
    nodes: HashMap<Id, Dependency>,
    children: HashMap<Id, Vec<Id>>,
    root: Option<Id>,
}

impl DependencyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_root(&mut self, id: Id) {
        self.root = Some(id);
    }

    pub fn root(&self) -> Option<&Id> {
        self.root.as_ref()
    }

    /// Insert a dependency, or merge into an existing entry with the same
    /// id. Merging unions the scope set and fills in a checksum/path only if
    /// the existing entry doesn't already have one — the first parser to
    /// see a node wins on those fields, since a later sighting (e.g. the
    /// same artifact reached through a different scope) carries no more
    /// authoritative data.
    pub fn insert_or_merge(&mut self, dep: Dependency) {
        match self.nodes.get_mut(&dep.id) {
            Some(existing) => {
                existing.scopes.extend(dep.scopes);
                if existing.checksum.is_none() {
                    existing.checksum = dep.checksum;
                }
                if existing.path.is_none() {
                    existing.path = dep.path;
                }
            }
            None => {
                self.children.entry(dep.id.clone()).or_default();
                self.nodes.insert(dep.id.clone(), dep);
            }
        }
    }

    /// Record an edge `parent -> child`. Both ids must already have been
    /// inserted via [`insert_or_merge`](Self::insert_or_merge).
    pub fn add_edge(&mut self, parent: &Id, child: &Id) {
        let list = self.children.entry(parent.clone()).or_default();
        if !list.contains(child) {
            list.push(child.clone());
        }
    }

    pub fn get(&self, id: &Id) -> Option<&Dependency> {
        self.nodes.get(id)
    }

    pub fn children_of(&self, id: &Id) -> &[Id] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &Id> {
        self.nodes.keys()
    }

    /// Compute `requestedBy` for every node by inverting the adjacency map
    /// with a single BFS from the root, then baking each node's parent
    /// chains into its `Dependency::requested_by` field.
    ///
    /// This runs once, at assembly time, rather than being threaded through
    /// the BFS resolution loop: a node can gain additional parents right up
    /// until resolution finishes, so computing it incrementally would mean
    /// re-walking prefixes anyway. Parent lists are sorted lexicographically
    /// (by id) so the computed chains are stable across runs regardless of
    /// the `HashMap` iteration order used to build them.
    pub fn finalize_requested_by(&mut self) {
        let Some(root) = self.root.clone() else {
            return;
        };

        let mut parents: HashMap<Id, Vec<Id>> = HashMap::new();
        for (parent, kids) in &self.children {
            for child in kids {
                parents.entry(child.clone()).or_default().push(parent.clone());
            }
        }
        for list in parents.values_mut() {
            list.sort();
        }

        let mut chains: HashMap<Id, Vec<Vec<Id>>> = HashMap::new();
        chains.insert(root.clone(), vec![vec![root.clone()]]);

        let mut queue = VecDeque::new();
        queue.push_back(root.clone());
        let mut visited = std::collections::HashSet::new();
        visited.insert(root.clone());

        while let Some(current) = queue.pop_front() {
            let current_chains = chains.get(&current).cloned().unwrap_or_default();
            for child in self.children_of(&current).to_vec() {
                let mut child_chains: Vec<Vec<Id>> = current_chains
                    .iter()
                    .map(|chain| {
                        let mut c = chain.clone();
                        c.push(child.clone());
                        c
                    })
                    .collect();
                let entry = chains.entry(child.clone()).or_default();
                entry.append(&mut child_chains);
                entry.sort();
                entry.dedup();

                if visited.insert(child.clone()) {
                    queue.push_back(child);
                }
            }
        }

        for (id, dep) in self.nodes.iter_mut() {
            if let Some(chain_list) = chains.get(id) {
                dep.requested_by = chain_list
                    .iter()
                    .map(|chain| chain[..chain.len().saturating_sub(1)].to_vec())
                    .filter(|ancestors| !ancestors.is_empty())
                    .collect();
                dep.requested_by.sort();
                dep.requested_by.dedup();
            }
        }
    }

    pub fn into_dependencies(self) -> Vec<Dependency> {
        let mut deps: Vec<Dependency> = self.nodes.into_values().collect();
        deps.sort_by(|a, b| a.id.cmp(&b.id));
        deps
    }
}
