//! `Gemfile.lock` reading.
//!
//! Like Cargo, Bundler has no separate "print the tree" native command —
//! `Gemfile.lock`'s `GEM`/`specs:` block already is the fully resolved
//! graph, indentation-encoded: gems at 4-space indent are resolved
//! packages, gems at 6-space indent under them are their dependencies
//! (referenced by name only, resolved against the specs map).

use std::path::Path;

use buildinfo_util::errors::BuildInfoError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedGem {
    pub name: String,
    pub version: String,
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GemfileLock {
    pub gems: Vec<LockedGem>,
    pub top_level_dependencies: Vec<String>,
}

/// Parse the `GEM`/`specs:` and `DEPENDENCIES` sections of a `Gemfile.lock`.
pub fn parse_gemfile_lock(contents: &str) -> Result<GemfileLock, BuildInfoError> {
    let mut gems: Vec<LockedGem> = Vec::new();
    let mut top_level = Vec::new();

    let mut section = Section::None;
    let mut current: Option<usize> = None;

    for raw_line in contents.lines() {
        if raw_line.is_empty() {
            continue;
        }
        if !raw_line.starts_with(' ') {
            section = match raw_line.trim() {
                "GEM" => Section::Gem,
                "DEPENDENCIES" => Section::Dependencies,
                _ => Section::None,
            };
            current = None;
            continue;
        }

        match section {
            Section::Gem => {
                let indent = raw_line.len() - raw_line.trim_start().len();
                let trimmed = raw_line.trim();
                if trimmed == "specs:" || trimmed.starts_with("remote:") {
                    continue;
                }
                if indent == 4 {
                    if let Some((name, version)) = parse_name_and_version(trimmed) {
                        gems.push(LockedGem {
                            name,
                            version,
                            dependencies: Vec::new(),
                        });
                        current = Some(gems.len() - 1);
                    }
                } else if indent >= 6 {
                    if let Some(idx) = current {
                        let dep_name = trimmed
                            .split_whitespace()
                            .next()
                            .unwrap_or_default()
                            .to_string();
                        if !dep_name.is_empty() {
                            gems[idx].dependencies.push(dep_name);
                        }
                    }
                }
            }
            Section::Dependencies => {
                let trimmed = raw_line.trim();
                let name = trimmed
                    .split(|c: char| c == '(' || c.is_whitespace())
                    .next()
                    .unwrap_or_default()
                    .trim_end_matches('!')
                    .to_string();
                if !name.is_empty() {
                    top_level.push(name);
                }
            }
            Section::None => {}
        }
    }

    Ok(GemfileLock {
        gems,
        top_level_dependencies: top_level,
    })
}

enum Section {
    None,
    Gem,
    Dependencies,
}

fn parse_name_and_version(line: &str) -> Option<(String, String)> {
    let open = line.find('(')?;
    let close = line.find(')')?;
    let name = line[..open].trim().to_string();
    let version = line[open + 1..close].trim().to_string();
    if name.is_empty() || version.is_empty() {
        None
    } else {
        Some((name, version))
    }
}

pub fn read_lockfile(path: &Path) -> Result<GemfileLock, BuildInfoError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BuildInfoError::ManifestMissing {
                path: path.to_path_buf(),
            }
        } else {
            BuildInfoError::Io(e)
        }
    })?;
    parse_gemfile_lock(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCKFILE: &str = r#"GEM
  remote: https://rubygems.org/
  specs:
    actioncable (7.1.0)
      actionpack (= 7.1.0)
      activesupport (= 7.1.0)
      nio4r (~> 2.0)
    actionpack (7.1.0)
      actionview (= 7.1.0)
      activesupport (= 7.1.0)
    activesupport (7.1.0)
    nio4r (2.7.0)

PLATFORMS
  ruby

DEPENDENCIES
  rails (~> 7.1.0)

BUNDLED WITH
   2.4.10
"#;

    #[test]
    fn parses_specs_with_versions_and_dependencies() {
        let lock = parse_gemfile_lock(LOCKFILE).unwrap();
        assert_eq!(lock.gems.len(), 4);

        let actioncable = lock.gems.iter().find(|g| g.name == "actioncable").unwrap();
        assert_eq!(actioncable.version, "7.1.0");
        assert_eq!(
            actioncable.dependencies,
            vec!["actionpack".to_string(), "activesupport".to_string(), "nio4r".to_string()]
        );

        let leaf = lock.gems.iter().find(|g| g.name == "nio4r").unwrap();
        assert!(leaf.dependencies.is_empty());
    }

    #[test]
    fn parses_top_level_dependencies() {
        let lock = parse_gemfile_lock(LOCKFILE).unwrap();
        assert_eq!(lock.top_level_dependencies, vec!["rails".to_string()]);
    }
}
