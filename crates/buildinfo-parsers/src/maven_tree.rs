//! Parser for `mvn dependency:tree` text output.
//!
//! Each line is prefixed with `"[INFO] "`. The first such line is the
//! project's own coordinate (`group:artifact:packaging:version`, no branch
//! marker) and is skipped — the caller already knows its own module id.
//! Every other line uses 3-character indent units (`"|  "` or `"   "`)
//! followed by a `"+- "` or `"\\- "` marker, and a leaf coordinate of the
//! form `group:artifact:packaging[:classifier]:version:scope`.

use buildinfo_model::{Ecosystem, Id, Scope};

use crate::ParsedNode;

pub fn parse_maven_tree(output: &str) -> Vec<ParsedNode> {
    let mut nodes = Vec::new();
    let mut stack: Vec<(usize, Id)> = Vec::new();
    let mut seen_root = false;

    for raw_line in output.lines() {
        let Some(line) = raw_line.strip_prefix("[INFO] ") else {
            continue;
        };
        if line.trim().is_empty() {
            continue;
        }

        if !seen_root {
            seen_root = true;
            continue;
        }

        let Some((depth, content)) = indent_depth_and_marker(line) else {
            continue;
        };
        let Some(entry) = parse_leaf(content) else {
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
            scope: entry.scope,
            parent_id,
            omitted_for_duplicate: false,
            checksum: None,
        };
        let id = node.id.clone();
        nodes.push(node);
        stack.push((depth, id));
    }

    nodes
}

fn indent_depth_and_marker(line: &str) -> Option<(usize, &str)> {
    let mut depth = 0;
    let mut rest = line;
    loop {
        if let Some(stripped) = rest.strip_prefix("+- ") {
            return Some((depth, stripped));
        }
        if let Some(stripped) = rest.strip_prefix("\\- ") {
            return Some((depth, stripped));
        }
        if rest.len() >= 3 {
            depth += 1;
            rest = &rest[3..];
        } else {
            return None;
        }
    }
}

struct Leaf {
    id: Id,
    name: String,
    version: String,
    scope: Scope,
}

fn parse_leaf(content: &str) -> Option<Leaf> {
    let trimmed = content.trim();
    // `-Dverbose` wraps an entire omitted-duplicate leaf in parens, e.g.
    // "(org.x:y:jar:1.0:compile - version managed from 1.1; omitted for
    // duplicate)" — filter the whole line rather than parsing garbage out
    // of it.
    if trimmed.starts_with('(') && trimmed.ends_with(')') && trimmed.contains("omitted for duplicate")
    {
        return None;
    }

    // Strip an optional "(scope managed from X)" suffix some mvn versions
    // append when dependency management overrode the declared scope — the
    // leading scope field is already the effective one.
    let content = match content.find(" (") {
        Some(idx) => &content[..idx],
        None => content,
    };

    let parts: Vec<&str> = content.split(':').collect();
    let (group, artifact, version, scope_str) = match parts.len() {
        5 => (parts[0], parts[1], parts[3], parts[4]),
        6 => (parts[0], parts[1], parts[4], parts[5]),
        _ => return None,
    };

    Some(Leaf {
        id: Id(format!("{group}:{artifact}:{version}")),
        name: artifact.to_string(),
        version: version.to_string(),
        scope: Scope::map(Ecosystem::Maven, scope_str),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
[INFO] com.example:my-app:jar:1.0.0
[INFO] +- com.google.guava:guava:jar:32.1.0-jre:compile
[INFO] |  +- com.google.guava:failureaccess:jar:1.0.1:compile
[INFO] |  \\- com.google.guava:listenablefuture:jar:9999.0-empty-to-avoid-conflict-with-guava:compile
[INFO] \\- junit:junit:jar:4.13.2:test
";

    #[test]
    fn skips_root_line() {
        let nodes = parse_maven_tree(SAMPLE);
        assert!(!nodes.iter().any(|n| n.name == "my-app"));
    }

    #[test]
    fn parses_nested_dependencies() {
        let nodes = parse_maven_tree(SAMPLE);
        assert_eq!(nodes.len(), 4);

        let guava = nodes.iter().find(|n| n.name == "guava").unwrap();
        assert!(guava.parent_id.is_none());
        assert_eq!(guava.scope, Scope::Compile);

        let failureaccess = nodes.iter().find(|n| n.name == "failureaccess").unwrap();
        assert_eq!(failureaccess.parent_id.as_ref(), Some(&guava.id));
    }

    #[test]
    fn assigns_test_scope() {
        let nodes = parse_maven_tree(SAMPLE);
        let junit = nodes.iter().find(|n| n.name == "junit").unwrap();
        assert_eq!(junit.scope, Scope::Test);
        assert!(junit.parent_id.is_none());
    }

    #[test]
    fn parses_leaf_with_classifier() {
        let leaf = parse_leaf("org.example:lib:jar:sources:1.0.0:compile").unwrap();
        assert_eq!(leaf.version, "1.0.0");
        assert_eq!(leaf.name, "lib");
    }

    #[test]
    fn strips_scope_managed_from_suffix() {
        let leaf = parse_leaf("org.example:lib:jar:1.0.0:compile (scope managed from test)").unwrap();
        assert_eq!(leaf.scope, Scope::Compile);
    }

    #[test]
    fn filters_verbose_omitted_for_duplicate_leaf() {
        let leaf = parse_leaf(
            "(org.example:lib:jar:1.0:compile - version managed from 1.1; omitted for duplicate)",
        );
        assert!(leaf.is_none());
    }

    #[test]
    fn verbose_omitted_for_duplicate_line_produces_no_node() {
        let output = "\
[INFO] com.example:my-app:jar:1.0.0
[INFO] +- com.google.guava:guava:jar:32.1.0-jre:compile
[INFO] |  \\- (org.example:lib:jar:1.0:compile - version managed from 1.1; omitted for duplicate)
";
        let nodes = parse_maven_tree(output);
        assert_eq!(nodes.len(), 1);
        assert!(!nodes.iter().any(|n| n.name == "lib"));
    }
}
