//! Declarative fallback parser for `build.gradle[.kts]` when no native
//! Gradle invocation is available (e.g. the wrapper is missing and no
//! system `gradle` is installed).
//!
//! Scans for a top-level `dependencies { ... }` block using a brace
//! matcher that understands single/double-quoted strings and `//` / `/* */`
//! comments (so a `{` inside a string literal or comment doesn't confuse
//! the block boundary), then parses each declaration inside it. This only
//! recovers *direct* dependencies — there is no transitive resolution
//! without actually running Gradle.

use buildinfo_model::{Ecosystem, Id, Scope};

use crate::ParsedNode;

/// Extract the contents of the first top-level `dependencies { ... }`
/// block, or `None` if the file has no such block.
pub fn extract_dependencies_block(source: &str) -> Option<String> {
    let keyword_pos = find_dependencies_keyword(source)?;
    let after_keyword = &source[keyword_pos + "dependencies".len()..];
    let brace_offset = after_keyword.find('{')?;
    // Reject a false match like "dependenciesToCheck" by requiring only
    // whitespace between the keyword and the brace.
    if !after_keyword[..brace_offset].trim().is_empty() {
        return None;
    }

    let body_start = keyword_pos + "dependencies".len() + brace_offset + 1;
    let body_end = find_matching_brace(&source[body_start..])?;
    Some(source[body_start..body_start + body_end].to_string())
}

fn find_dependencies_keyword(source: &str) -> Option<usize> {
    let mut cursor = 0;
    while let Some(rel) = source[cursor..].find("dependencies") {
        let pos = cursor + rel;
        let preceded_by_ident = pos > 0
            && source.as_bytes()[pos - 1].is_ascii_alphanumeric();
        let followed_by_ident = source.as_bytes()[pos + "dependencies".len()..]
            .first()
            .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_');
        if !preceded_by_ident && !followed_by_ident {
            return Some(pos);
        }
        cursor = pos + "dependencies".len();
    }
    None
}

/// Given text starting just after an opening `{`, find the byte offset of
/// its matching closing `}`, skipping over brace characters that appear
/// inside string literals or comments.
fn find_matching_brace(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 1usize;
    let mut i = 0usize;
    let mut in_line_comment = false;
    let mut in_block_comment = false;
    let mut in_string: Option<u8> = None;

    while i < bytes.len() {
        let c = bytes[i];

        if in_line_comment {
            if c == b'\n' {
                in_line_comment = false;
            }
            i += 1;
            continue;
        }
        if in_block_comment {
            if c == b'*' && bytes.get(i + 1) == Some(&b'/') {
                in_block_comment = false;
                i += 2;
                continue;
            }
            i += 1;
            continue;
        }
        if let Some(quote) = in_string {
            if c == b'\\' {
                i += 2;
                continue;
            }
            if c == quote {
                in_string = None;
            }
            i += 1;
            continue;
        }

        match c {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                in_line_comment = true;
                i += 2;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                in_block_comment = true;
                i += 2;
            }
            b'\'' | b'"' => {
                in_string = Some(c);
                i += 1;
            }
            b'{' => {
                depth += 1;
                i += 1;
            }
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    None
}

/// Parse each declaration line inside a `dependencies { ... }` block body.
///
/// Recognizes the shorthand string form (`implementation
/// 'group:artifact:version'` / `implementation("group:artifact:version")`)
/// and the map form (`implementation group: 'g', name: 'n', version:
/// 'v'`).
pub fn parse_dependency_block(body: &str) -> Vec<ParsedNode> {
    let mut nodes = Vec::new();

    for raw_line in body.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        let Some((configuration, rest)) = split_configuration(line) else {
            continue;
        };

        let coordinate = if rest.contains("group:") || rest.contains("group =") {
            parse_map_form(rest)
        } else {
            parse_string_form(rest)
        };

        let Some((group, name, version)) = coordinate else {
            continue;
        };

        nodes.push(ParsedNode {
            id: Id(format!("{group}:{name}:{version}")),
            name,
            version,
            scope: Scope::map(Ecosystem::Gradle, configuration),
            parent_id: None,
            omitted_for_duplicate: false,
            checksum: None,
        });
    }

    nodes
}

fn split_configuration(line: &str) -> Option<(&str, &str)> {
    let ident_end = line.find(|c: char| !c.is_ascii_alphanumeric())?;
    if ident_end == 0 {
        return None;
    }
    Some((&line[..ident_end], line[ident_end..].trim()))
}

fn parse_string_form(rest: &str) -> Option<(String, String, String)> {
    let rest = rest.trim_start_matches('(').trim_end_matches(')').trim();
    let inner = extract_quoted(rest)?;
    let parts: Vec<&str> = inner.split(':').collect();
    if parts.len() < 3 {
        return None;
    }
    Some((parts[0].to_string(), parts[1].to_string(), parts[2].to_string()))
}

fn parse_map_form(rest: &str) -> Option<(String, String, String)> {
    let group = extract_field(rest, "group")?;
    let name = extract_field(rest, "name")?;
    let version = extract_field(rest, "version")?;
    Some((group, name, version))
}

fn extract_field(text: &str, field: &str) -> Option<String> {
    for sep in [":", "="] {
        let needle = format!("{field}{sep}");
        if let Some(pos) = text.find(&needle) {
            let after = &text[pos + needle.len()..];
            return extract_quoted(after);
        }
    }
    None
}

fn extract_quoted(text: &str) -> Option<String> {
    let text = text.trim_start();
    let quote = text.chars().next()?;
    if quote != '\'' && quote != '"' {
        return None;
    }
    let rest = &text[1..];
    let end = rest.find(quote)?;
    Some(rest[..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUILD_GRADLE: &str = r#"
plugins {
    id("java")
}

dependencies {
    // core runtime deps
    implementation 'com.google.guava:guava:32.1.0-jre'
    implementation("org.slf4j:slf4j-api:2.0.9")
    testImplementation group: 'junit', name: 'junit', version: '4.13.2'
    /* excluded: compileOnly 'should:not:leak' inside this comment { } */
}

tasks {
    test { useJUnitPlatform() }
}
"#;

    #[test]
    fn extracts_dependencies_block_ignoring_other_braces() {
        let block = extract_dependencies_block(BUILD_GRADLE).unwrap();
        assert!(block.contains("guava"));
        assert!(!block.contains("useJUnitPlatform"));
    }

    #[test]
    fn comment_braces_do_not_confuse_block_boundary() {
        let block = extract_dependencies_block(BUILD_GRADLE).unwrap();
        assert!(block.contains("junit"));
        assert!(block.contains("should:not:leak"));
    }

    #[test]
    fn parses_string_and_map_form_declarations() {
        let block = extract_dependencies_block(BUILD_GRADLE).unwrap();
        let nodes = parse_dependency_block(&block);

        let guava = nodes.iter().find(|n| n.name == "guava").unwrap();
        assert_eq!(guava.version, "32.1.0-jre");
        assert_eq!(guava.scope, Scope::Compile);

        let slf4j = nodes.iter().find(|n| n.name == "slf4j-api").unwrap();
        assert_eq!(slf4j.version, "2.0.9");

        let junit = nodes.iter().find(|n| n.name == "junit").unwrap();
        assert_eq!(junit.version, "4.13.2");
        assert_eq!(junit.scope, Scope::Test);
    }

    #[test]
    fn ignores_commented_out_declaration() {
        let block = extract_dependencies_block(BUILD_GRADLE).unwrap();
        let nodes = parse_dependency_block(&block);
        assert!(!nodes.iter().any(|n| n.name == "not"));
    }
}
