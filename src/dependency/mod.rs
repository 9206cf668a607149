//! Dependency catalogue
//!
//! The buildpack ships a `buildpack.toml` listing every archive it can
//! install. A build plan names what the application requires, and
//! resolution picks the best catalogue entry for the current stack.

pub mod plan;
pub mod resolve;

pub use plan::{BuildPlan, PlanEntry};
pub use resolve::{requested_version, resolve_dependency};

use crate::error::{TomcatError, TomcatResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::warn;

/// Stack id that matches every stack
pub const ANY_STACK: &str = "*";

/// A resolved, installable dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Identifier used in build plans (`tomcat`)
    pub id: String,

    /// Human-readable name
    #[serde(default)]
    pub name: String,

    /// Semantic version of the archive
    pub version: String,

    /// Where the archive can be fetched from
    pub uri: String,

    /// SHA-256 of the archive, used as the layer fingerprint
    pub sha256: String,

    /// Stacks the archive runs on
    #[serde(default)]
    pub stacks: Vec<String>,
}

impl Dependency {
    /// Content fingerprint deciding cache validity
    pub fn fingerprint(&self) -> &str {
        &self.sha256
    }

    /// Parsed semantic version, `None` if the catalogue entry is malformed
    pub fn semver(&self) -> Option<semver::Version> {
        semver::Version::parse(&self.version).ok()
    }

    /// Whether the archive runs on `stack`
    pub fn supports_stack(&self, stack: &str) -> bool {
        self.stacks.is_empty()
            || stack == ANY_STACK
            || self.stacks.iter().any(|s| s == stack || s == ANY_STACK)
    }

    /// File name of the archive (last URI path segment)
    pub fn file_name(&self) -> &str {
        self.uri
            .rsplit('/')
            .find(|s| !s.is_empty())
            .unwrap_or(self.id.as_str())
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        };
        write!(f, "{} {}", name, self.version)
    }
}

/// All dependencies a buildpack can install
#[derive(Debug, Clone, Default)]
pub struct Dependencies(Vec<Dependency>);

impl Dependencies {
    pub fn new(deps: Vec<Dependency>) -> Self {
        Self(deps)
    }

    /// Highest version of `id` satisfying `constraint` on `stack`
    pub fn best(&self, id: &str, constraint: &str, stack: &str) -> TomcatResult<Dependency> {
        let req = parse_constraint(id, constraint)?;

        let mut candidates: Vec<(semver::Version, &Dependency)> = Vec::new();
        for dep in self.0.iter().filter(|d| d.id == id) {
            let Some(version) = dep.semver() else {
                warn!("Skipping {} with unparseable version {}", dep.id, dep.version);
                continue;
            };
            if dep.supports_stack(stack) && req.matches(&version) {
                candidates.push((version, dep));
            }
        }

        candidates
            .into_iter()
            .max_by(|a, b| a.0.cmp(&b.0))
            .map(|(_, dep)| dep.clone())
            .ok_or_else(|| TomcatError::ResolutionFailed {
                id: id.to_string(),
                constraint: constraint.to_string(),
                stack: stack.to_string(),
            })
    }
}

/// Parse a version constraint; empty and `latest` mean any version.
///
/// A complete version such as `9.0.85` pins exactly that release rather
/// than the caret range `semver` would otherwise read it as.
fn parse_constraint(id: &str, constraint: &str) -> TomcatResult<semver::VersionReq> {
    let trimmed = constraint.trim();
    if trimmed.is_empty() || trimmed == "latest" {
        return Ok(semver::VersionReq::STAR);
    }

    let req = if semver::Version::parse(trimmed).is_ok() {
        semver::VersionReq::parse(&format!("={}", trimmed))
    } else {
        semver::VersionReq::parse(trimmed)
    };

    req.map_err(|_| TomcatError::VersionConstraint {
        id: id.to_string(),
        constraint: constraint.to_string(),
    })
}

/// Parsed `buildpack.toml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildpackDescriptor {
    #[serde(default)]
    pub buildpack: BuildpackInfo,

    #[serde(default)]
    pub metadata: BuildpackMetadata,
}

/// `[buildpack]` section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildpackInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// `[metadata]` section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildpackMetadata {
    /// Version constraint used when the plan does not request one
    #[serde(default)]
    pub default_versions: BTreeMap<String, String>,

    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl BuildpackDescriptor {
    /// Parse the descriptor at `<dir>/buildpack.toml`
    pub fn from_dir(dir: &Path) -> TomcatResult<Self> {
        let path = dir.join("buildpack.toml");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| TomcatError::io(format!("reading {}", path.display()), e))?;
        Self::parse(&content).map_err(|e| match e {
            TomcatError::TomlParse(e) => TomcatError::ConfigInvalid {
                path,
                reason: e.to_string(),
            },
            other => other,
        })
    }

    pub fn parse(content: &str) -> TomcatResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn dependencies(&self) -> Dependencies {
        Dependencies::new(self.metadata.dependencies.clone())
    }

    /// Default version constraint for `id`
    pub fn default_version(&self, id: &str) -> Option<&str> {
        self.metadata.default_versions.get(id).map(String::as_str)
    }
}
