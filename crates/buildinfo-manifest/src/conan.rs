//! `conanfile.txt` / `conanfile.py` reading.
//!
//! `conanfile.txt` is declarative ini-style text; `conanfile.py` is an
//! arbitrary Python script, so rather than embedding a Python interpreter
//! this reads it the way a human skimming the file would — scanning for
//! `self.requires(...)`/`self.build_requires(...)` call sites — which is
//! enough to recover the declared reference set without executing anything.

use std::path::Path;

use buildinfo_util::errors::BuildInfoError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConanRequirement {
    pub reference: String,
    pub scope: ConanScope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConanScope {
    Requires,
    BuildRequires,
    TestRequires,
}

/// Parse the `[requires]` / `[build_requires]` / `[test_requires]` sections
/// of a `conanfile.txt`.
pub fn parse_conanfile_txt(contents: &str) -> Result<Vec<ConanRequirement>, BuildInfoError> {
    let mut out = Vec::new();
    let mut section: Option<ConanScope> = None;

    for line in contents.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            section = match &trimmed[1..trimmed.len() - 1] {
                "requires" => Some(ConanScope::Requires),
                "build_requires" | "tool_requires" => Some(ConanScope::BuildRequires),
                "test_requires" => Some(ConanScope::TestRequires),
                _ => None,
            };
            continue;
        }
        if let Some(scope) = section {
            let reference = trimmed.split(['#']).next().unwrap_or_default().trim();
            if !reference.is_empty() {
                out.push(ConanRequirement {
                    reference: reference.to_string(),
                    scope,
                });
            }
        }
    }

    Ok(out)
}

/// Scan a `conanfile.py` for `self.requires("ref")` /
/// `self.build_requires("ref")` / `self.test_requires("ref")` call sites.
pub fn scan_conanfile_py(contents: &str) -> Vec<ConanRequirement> {
    let mut out = Vec::new();
    for (needle, scope) in [
        ("self.requires(", ConanScope::Requires),
        ("self.build_requires(", ConanScope::BuildRequires),
        ("self.tool_requires(", ConanScope::BuildRequires),
        ("self.test_requires(", ConanScope::TestRequires),
    ] {
        let mut rest = contents;
        while let Some(pos) = rest.find(needle) {
            let after = &rest[pos + needle.len()..];
            if let Some(reference) = extract_quoted_string(after) {
                out.push(ConanRequirement {
                    reference,
                    scope,
                });
            }
            rest = &after[1.min(after.len())..];
        }
    }
    out
}

fn extract_quoted_string(s: &str) -> Option<String> {
    let s = s.trim_start();
    let quote = s.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let rest = &s[1..];
    let end = rest.find(quote)?;
    Some(rest[..end].to_string())
}

pub fn read_conanfile_txt(path: &Path) -> Result<Vec<ConanRequirement>, BuildInfoError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BuildInfoError::ManifestMissing {
                path: path.to_path_buf(),
            }
        } else {
            BuildInfoError::Io(e)
        }
    })?;
    parse_conanfile_txt(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_requires_sections() {
        let txt = r#"
[requires]
zlib/1.3.1
boost/1.84.0

[build_requires]
cmake/3.28.1

[generators]
CMakeDeps
"#;
        let reqs = parse_conanfile_txt(txt).unwrap();
        assert_eq!(reqs.len(), 3);
        assert_eq!(reqs[0].reference, "zlib/1.3.1");
        assert_eq!(reqs[0].scope, ConanScope::Requires);
        assert_eq!(reqs[2].scope, ConanScope::BuildRequires);
    }

    #[test]
    fn scans_python_requires_calls() {
        let py = r#"
from conan import ConanFile

class MyPkg(ConanFile):
    def requirements(self):
        self.requires("zlib/1.3.1")
        self.requires('boost/1.84.0')

    def build_requirements(self):
        self.tool_requires("cmake/3.28.1")
"#;
        let reqs = scan_conanfile_py(py);
        assert_eq!(reqs.len(), 3);
        assert!(reqs.iter().any(|r| r.reference == "zlib/1.3.1" && r.scope == ConanScope::Requires));
        assert!(reqs
            .iter()
            .any(|r| r.reference == "cmake/3.28.1" && r.scope == ConanScope::BuildRequires));
    }
}
