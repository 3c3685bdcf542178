use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which build ecosystem a manifest/tool-output belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Maven,
    Gradle,
    Cargo,
    Bundler,
    Poetry,
    Conan,
    Helm,
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Ecosystem::Maven => "maven",
            Ecosystem::Gradle => "gradle",
            Ecosystem::Cargo => "cargo",
            Ecosystem::Bundler => "bundler",
            Ecosystem::Poetry => "poetry",
            Ecosystem::Conan => "conan",
            Ecosystem::Helm => "helm",
        };
        f.write_str(s)
    }
}

impl FromStr for Ecosystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "maven" => Ok(Ecosystem::Maven),
            "gradle" => Ok(Ecosystem::Gradle),
            "cargo" => Ok(Ecosystem::Cargo),
            "bundler" => Ok(Ecosystem::Bundler),
            "poetry" => Ok(Ecosystem::Poetry),
            "conan" => Ok(Ecosystem::Conan),
            "helm" => Ok(Ecosystem::Helm),
            other => Err(format!("unknown ecosystem: {other}")),
        }
    }
}

/// A loosely structured reference to an artifact, as it appears in a
/// manifest or a native tool's dependency tree, before it has been resolved
/// against a lockfile or a cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub group: Option<String>,
    pub name: String,
    pub version: String,
    pub classifier: Option<String>,
    pub type_: String,
}

impl Reference {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            group: None,
            name: name.into(),
            version: version.into(),
            classifier: None,
            type_: "jar".to_string(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    pub fn with_type(mut self, type_: impl Into<String>) -> Self {
        self.type_ = type_.into();
        self
    }

    pub fn id(&self) -> Id {
        Id(format_id(
            self.group.as_deref(),
            &self.name,
            &self.version,
            self.classifier.as_deref(),
        ))
    }
}

/// The canonical identity of a dependency: `group:name:version[:classifier]`.
///
/// Interned by value everywhere — [`DependencyStore`](crate::DependencyStore)
/// keys on `Id`, and every adjacency edge is a pair of `Id`s rather than an
/// owning reference, so the store never needs self-referential structures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id(pub String);

impl Id {
    pub fn parse(s: &str) -> Option<Id> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.len() {
            2 => Some(Id(format_id(None, parts[0], parts[1], None))),
            3 => Some(Id(format_id(Some(parts[0]), parts[1], parts[2], None))),
            4 => Some(Id(format_id(
                Some(parts[0]),
                parts[1],
                parts[2],
                Some(parts[3]),
            ))),
            _ => None,
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Id {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Id::parse(s).ok_or_else(|| format!("not a valid dependency id: {s}"))
    }
}

/// Render a `group:name:version[:classifier]` string. `group` is omitted
/// entirely (not left blank) for ecosystems that have no concept of it —
/// Cargo crates and Conan references, for example.
pub fn format_id(
    group: Option<&str>,
    name: &str,
    version: &str,
    classifier: Option<&str>,
) -> String {
    let mut out = String::new();
    if let Some(g) = group {
        out.push_str(g);
        out.push(':');
    }
    out.push_str(name);
    out.push(':');
    out.push_str(version);
    if let Some(c) = classifier {
        out.push(':');
        out.push_str(c);
    }
    out
}

/// Parse a `group:name:version[:classifier]` string into its parts.
pub fn parse_id(s: &str) -> Option<(Option<String>, String, String, Option<String>)> {
    let parts: Vec<&str> = s.split(':').collect();
    match parts.len() {
        2 => Some((None, parts[0].to_string(), parts[1].to_string(), None)),
        3 => Some((
            Some(parts[0].to_string()),
            parts[1].to_string(),
            parts[2].to_string(),
            None,
        )),
        4 => Some((
            Some(parts[0].to_string()),
            parts[1].to_string(),
            parts[2].to_string(),
            Some(parts[3].to_string()),
        )),
        _ => None,
    }
}

/// The scope a dependency was pulled in under, normalized across ecosystems.
///
/// Each native ecosystem has its own vocabulary (Gradle's `implementation`/
/// `api`/`testImplementation`, Poetry's dependency groups, Conan's
/// `requires`/`build_requires`...); `map` is the single place that knows how
/// to fold a native scope name into this shared set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Compile,
    Runtime,
    Test,
    Provided,
    System,
    Import,
    Build,
    Dev,
    Transitive,
    Python,
}

impl Scope {
    /// Map a native, ecosystem-specific scope/configuration name onto the
    /// normalized set. Unknown names fall back to `compile` (Maven/Gradle)
    /// or `runtime` (Ruby/Poetry/Cargo/Conan/Helm) per the ecosystem's
    /// conventional default, with a debug log so an unrecognized native
    /// scope is still visible.
    pub fn map(ecosystem: Ecosystem, native: &str) -> Scope {
        let lower = native.to_ascii_lowercase();
        match ecosystem {
            Ecosystem::Maven => match lower.as_str() {
                "compile" => Scope::Compile,
                "runtime" => Scope::Runtime,
                "test" => Scope::Test,
                "provided" => Scope::Provided,
                "system" => Scope::System,
                "import" => Scope::Import,
                other => {
                    tracing::debug!(ecosystem = "maven", scope = other, "unknown native scope, defaulting to compile");
                    Scope::Compile
                }
            },
            Ecosystem::Gradle => {
                if lower.contains("test") {
                    Scope::Test
                } else if lower.contains("runtimeonly") || lower == "runtime" {
                    Scope::Runtime
                } else if lower.contains("compileonly") {
                    Scope::Provided
                } else if lower.contains("implementation") || lower.contains("api") {
                    Scope::Compile
                } else {
                    tracing::debug!(ecosystem = "gradle", scope = %lower, "unknown native configuration, defaulting to compile");
                    Scope::Compile
                }
            }
            Ecosystem::Cargo => match lower.as_str() {
                "build" => Scope::Build,
                "dev" => Scope::Dev,
                other => {
                    tracing::debug!(ecosystem = "cargo", scope = other, "unknown native scope, defaulting to runtime");
                    Scope::Runtime
                }
            },
            Ecosystem::Bundler => {
                if lower.contains("test") || lower.contains("development") {
                    Scope::Dev
                } else {
                    if lower != "main" && lower != "runtime" {
                        tracing::debug!(ecosystem = "bundler", scope = %lower, "unrecognized native scope, defaulting to runtime");
                    }
                    Scope::Runtime
                }
            }
            Ecosystem::Poetry => {
                if lower == "main" || lower.is_empty() {
                    Scope::Python
                } else if lower == "dev" {
                    Scope::Dev
                } else {
                    tracing::debug!(ecosystem = "poetry", scope = %lower, "unknown native scope, defaulting to runtime");
                    Scope::Runtime
                }
            }
            Ecosystem::Conan => match lower.as_str() {
                "build_requires" | "tool_requires" => Scope::Build,
                "test_requires" => Scope::Test,
                other => {
                    tracing::debug!(ecosystem = "conan", scope = other, "unknown native scope, defaulting to runtime");
                    Scope::Runtime
                }
            },
            Ecosystem::Helm => Scope::Runtime,
        }
    }
}
