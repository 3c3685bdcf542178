//! `settings.gradle[.kts]` reading: submodule discovery.
//!
//! The declarative dependency block extractor (for the no-native-tool
//! fallback path) lives in `buildinfo-parsers`, since it operates on
//! `build.gradle[.kts]` dependency blocks rather than manifest identity.
//! This module only recovers the project's module list from `include(...)`
//! statements, in either Groovy or Kotlin DSL syntax.

use buildinfo_util::errors::BuildInfoError;

/// Extract Gradle subproject paths (e.g. `:app`, `:lib:core`) from a
/// `settings.gradle` or `settings.gradle.kts` file's `include(...)` calls.
/// Handles both the Groovy `include 'a', 'b'` form and the Kotlin DSL
/// `include(":a")` / repeated `include(":a")` form.
pub fn parse_include_statements(contents: &str) -> Result<Vec<String>, BuildInfoError> {
    let mut modules = Vec::new();
    let mut rest = contents;

    while let Some(pos) = rest.find("include") {
        let after_keyword = &rest[pos + "include".len()..];
        let Some(open) = after_keyword.find(|c: char| c == '(' || c == ' ' || c == '\'' || c == '"')
        else {
            rest = after_keyword;
            continue;
        };

        // Find the end of the statement: first newline not inside a string,
        // or the closing paren for the Kotlin DSL call form.
        let stmt_end = after_keyword[open..]
            .find('\n')
            .map(|n| open + n)
            .unwrap_or(after_keyword.len());
        let statement = &after_keyword[..stmt_end];

        // Walk quoted segments left to right, always resuming the scan
        // right after a matched pair's closing quote so consecutive
        // comma-separated values ('a', 'b', 'c') pair up correctly instead
        // of the closing quote of one value being mistaken for the opening
        // quote of the next.
        let mut cursor = 0;
        while let Some(rel_open) = statement[cursor..].find(['\'', '"']) {
            let open = cursor + rel_open;
            let quote = statement.as_bytes()[open] as char;
            let Some(rel_close) = statement[open + 1..].find(quote) else {
                break;
            };
            let close = open + 1 + rel_close;
            let module = &statement[open + 1..close];
            if !module.is_empty() {
                // Gradle prefixes a bare Groovy-style module name ("app")
                // with a colon to form its project path (":app");
                // already-prefixed Kotlin DSL references pass through
                // unchanged.
                if module.starts_with(':') {
                    modules.push(module.to_string());
                } else {
                    modules.push(format!(":{module}"));
                }
            }
            cursor = close + 1;
        }

        rest = &after_keyword[stmt_end..];
    }

    Ok(modules)
}

/// Extract top-level `group`/`version` assignments from a `build.gradle` or
/// `build.gradle.kts` file, e.g. `group = 'com.example'` (Kotlin DSL) or
/// `group 'com.example'` (Groovy). Either or both may be absent.
pub fn parse_group_and_version(contents: &str) -> (Option<String>, Option<String>) {
    (
        find_top_level_assignment(contents, "group"),
        find_top_level_assignment(contents, "version"),
    )
}

fn find_top_level_assignment(contents: &str, field: &str) -> Option<String> {
    for line in contents.lines() {
        let line = line.trim();
        if !line.starts_with(field) {
            continue;
        }
        let after_field = &line[field.len()..];
        match after_field.chars().next() {
            Some(' ') | Some('=') => {}
            _ => continue,
        }
        let rest = after_field.trim_start();
        let rest = rest.strip_prefix('=').unwrap_or(rest).trim_start();
        let Some(quote) = rest.chars().next().filter(|c| *c == '\'' || *c == '"') else {
            continue;
        };
        let after_quote = &rest[1..];
        if let Some(end) = after_quote.find(quote) {
            return Some(after_quote[..end].to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_group_and_version_groovy_style() {
        let build_gradle = "group 'com.example'\nversion '1.2.3'\n";
        assert_eq!(
            parse_group_and_version(build_gradle),
            (Some("com.example".to_string()), Some("1.2.3".to_string()))
        );
    }

    #[test]
    fn parses_group_and_version_kotlin_dsl_style() {
        let build_gradle_kts = "group = \"com.example\"\nversion = \"1.2.3\"\n";
        assert_eq!(
            parse_group_and_version(build_gradle_kts),
            (Some("com.example".to_string()), Some("1.2.3".to_string()))
        );
    }

    #[test]
    fn missing_group_or_version_is_none() {
        assert_eq!(parse_group_and_version("plugins { id(\"java\") }"), (None, None));
    }

    #[test]
    fn parses_groovy_style_multi_include() {
        let settings = "rootProject.name = 'demo'\ninclude 'app', 'lib:core', 'lib:util'\n";
        let modules = parse_include_statements(settings).unwrap();
        assert_eq!(
            modules,
            vec![
                ":app".to_string(),
                ":lib:core".to_string(),
                ":lib:util".to_string()
            ]
        );
    }

    #[test]
    fn parses_kotlin_dsl_style_includes() {
        let settings = r#"
rootProject.name = "demo"
include(":app")
include(":lib:core")
include(":lib:util")
"#;
        let modules = parse_include_statements(settings).unwrap();
        assert_eq!(
            modules,
            vec![
                ":app".to_string(),
                ":lib:core".to_string(),
                ":lib:util".to_string()
            ]
        );
    }
}
