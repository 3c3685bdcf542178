//! Parser for `gradle dependencies` (and `gradle :module:dependencies`)
//! text output.
//!
//! The format groups dependencies under a configuration header (e.g.
//! `compileClasspath - Compile classpath for source set 'main'.`), then one
//! tree per configuration using 5-character indent units (`"|    "` or
//! `"     "`) followed by a `"+--- "` or `"\\--- "` branch marker. Entries
//! may carry a `"-> "` resolution arrow (requested version overridden by
//! conflict resolution), a trailing `"(*)"` (subtree already printed
//! elsewhere — stop descending), `"(c)"` (a version constraint, not a real
//! dependency — also stop descending), `"(n)"` (not resolved, likewise),
//! or reference a sibling subproject as `"project :path"`.
//!
//! A `project :path` entry is resolved against the modules map the Assembler
//! builds from submodule discovery (keyed by Gradle project path, e.g.
//! `":lib:core"`, plus a `""` entry for the root's own identity). An
//! unresolved path is synthesized using the root's group/version and the
//! path's last segment as name.

use std::collections::HashMap;

use buildinfo_model::{format_id, parse_id, Ecosystem, Id, Scope};

use crate::ParsedNode;

/// One configuration's worth of parsed nodes, e.g. `compileClasspath`.
#[derive(Debug, Clone)]
pub struct GradleConfiguration {
    pub name: String,
    pub nodes: Vec<ParsedNode>,
}

/// Parse the full `gradle dependencies` output, splitting on configuration
/// header lines. `modules` is the Assembler's Gradle project-path → Id map
/// (see module docs), used to resolve `project :path` entries.
pub fn parse_gradle_dependencies(output: &str, modules: &HashMap<String, Id>) -> Vec<GradleConfiguration> {
    let mut configs = Vec::new();
    let mut current_name: Option<String> = None;
    let mut current_lines: Vec<&str> = Vec::new();

    for line in output.lines() {
        if is_configuration_header(line) {
            if let Some(name) = current_name.take() {
                configs.push(GradleConfiguration {
                    nodes: parse_tree_lines(&current_lines, &name, modules),
                    name,
                });
            }
            current_lines.clear();
            current_name = Some(
                line.split(|c: char| c == ' ' || c == '-')
                    .next()
                    .unwrap_or(line)
                    .trim()
                    .to_string(),
            );
            continue;
        }
        if current_name.is_some() {
            if line.trim().is_empty() {
                continue;
            }
            if line.trim() == "No dependencies" {
                continue;
            }
            current_lines.push(line);
        }
    }
    if let Some(name) = current_name.take() {
        configs.push(GradleConfiguration {
            nodes: parse_tree_lines(&current_lines, &name, modules),
            name,
        });
    }

    configs
}

fn is_configuration_header(line: &str) -> bool {
    !line.starts_with(['+', '\\', '|', ' '])
        && !line.trim().is_empty()
        && (line.contains(" - ") || !line.contains(':'))
        && !line.starts_with("project ")
}

fn parse_tree_lines(lines: &[&str], config_name: &str, modules: &HashMap<String, Id>) -> Vec<ParsedNode> {
    let scope = Scope::map(Ecosystem::Gradle, config_name);
    let mut nodes: Vec<ParsedNode> = Vec::new();
    // Stack of (depth, id) tracking the current path to the root so a new
    // line's parent can be found by popping back to its depth - 1.
    let mut stack: Vec<(usize, Id)> = Vec::new();

    for line in lines {
        let Some((depth, content)) = indent_depth_and_marker(line) else {
            continue;
        };
        let Some(entry) = parse_entry(content, modules) else {
            continue;
        };

        while stack.last().map(|(d, _)| *d >= depth).unwrap_or(false) {
            stack.pop();
        }
        let parent_id = stack.last().map(|(_, id)| id.clone());

        let node = ParsedNode {
            id: entry.id.clone(),
            name: entry.name,
            version: entry.version,
            scope,
            parent_id,
            omitted_for_duplicate: entry.omitted,
            checksum: None,
        };
        let id = node.id.clone();
        nodes.push(node);

        if !entry.omitted {
            stack.push((depth, id));
        }
    }

    nodes
}

fn indent_depth_and_marker(line: &str) -> Option<(usize, &str)> {
    let mut depth = 0;
    let mut rest = line;
    loop {
        if let Some(stripped) = rest.strip_prefix("+--- ") {
            return Some((depth, stripped));
        }
        if let Some(stripped) = rest.strip_prefix("\\--- ") {
            return Some((depth, stripped));
        }
        if rest.len() >= 5 {
            depth += 1;
            rest = &rest[5..];
        } else {
            return None;
        }
    }
}

struct Entry {
    id: Id,
    name: String,
    version: String,
    omitted: bool,
}

fn parse_entry(content: &str, modules: &HashMap<String, Id>) -> Option<Entry> {
    let mut text = content.trim();
    let mut omitted = false;

    for marker in [" (*)", " (c)", " (n)"] {
        if let Some(stripped) = text.strip_suffix(marker) {
            text = stripped;
            omitted = true;
        }
    }

    if let Some(path) = text.strip_prefix("project ") {
        let path = path.trim();
        return Some(resolve_project_reference(path, modules, omitted));
    }

    // Strip an `@type` artifact-type suffix (e.g. `@aar`), which is not
    // part of the coordinate.
    let text = match text.rfind('@') {
        Some(at) if text[at + 1..].chars().all(|c| c.is_ascii_alphanumeric()) => &text[..at],
        _ => text,
    };

    // A conflict-resolution arrow: "requested -> resolved" — the resolved
    // side is authoritative.
    let coordinate = if let Some((_, resolved)) = text.split_once(" -> ") {
        let requested_parts: Vec<&str> = text.split(" -> ").next().unwrap().split(':').collect();
        if requested_parts.len() >= 2 {
            format!("{}:{}:{}", requested_parts[0], requested_parts[1], resolved.trim())
        } else {
            resolved.trim().to_string()
        }
    } else {
        text.to_string()
    };

    let parts: Vec<&str> = coordinate.split(':').collect();
    if parts.len() < 3 {
        return None;
    }
    let (group, name, version) = (parts[0], parts[1], parts[2]);

    Some(Entry {
        id: Id(format!("{group}:{name}:{version}")),
        name: name.to_string(),
        version: version.to_string(),
        omitted,
    })
}

/// Resolve a `project :a:b:c` reference against the Assembler's modules
/// map. Falls back to synthesizing an id from the root's group/version
/// (stored under the `""` key) and the path's last segment when the path
/// is not a known submodule.
fn resolve_project_reference(path: &str, modules: &HashMap<String, Id>, omitted: bool) -> Entry {
    if let Some(id) = modules.get(path) {
        if let Some((_, name, version, _)) = parse_id(&id.0) {
            return Entry { id: id.clone(), name, version, omitted };
        }
    }

    tracing::debug!(path, "gradle project reference not found in modules map, synthesizing");
    let synthesized_name = path.rsplit(':').next().unwrap_or(path).to_string();
    let (root_group, root_version) = modules
        .get("")
        .and_then(|id| parse_id(&id.0))
        .map(|(group, _, version, _)| (group, version))
        .unwrap_or((None, "unspecified".to_string()));

    Entry {
        id: Id(format_id(root_group.as_deref(), &synthesized_name, &root_version, None)),
        name: synthesized_name,
        version: root_version,
        omitted,
    }
}
