//! Build plan entries
//!
//! A plan can carry several entries for the same dependency (one per
//! buildpack that required it). They are shallow-merged before use.

use crate::error::{TomcatError, TomcatResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One requirement in the build plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "toml::Table::is_empty")]
    pub metadata: toml::Table,
}

impl PlanEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Requested version: the `version` field, else `metadata.version`
    pub fn requested_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .or_else(|| self.metadata.get("version").and_then(|v| v.as_str()))
            .filter(|v| !v.trim().is_empty())
    }
}

/// Parsed build plan (`[[entries]]`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildPlan {
    #[serde(default)]
    pub entries: Vec<PlanEntry>,
}

impl BuildPlan {
    pub fn from_file(path: &Path) -> TomcatResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TomcatError::io(format!("reading build plan {}", path.display()), e))?;
        toml::from_str(&content).map_err(|e| TomcatError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn save(&self, path: &Path) -> TomcatResult<()> {
        let content = toml::to_string(self)?;
        std::fs::write(path, content)
            .map_err(|e| TomcatError::io(format!("writing build plan {}", path.display()), e))
    }

    /// Merge every entry named `name`.
    ///
    /// Later entries win for conflicting metadata keys and for the version.
    pub fn shallow_merged(&self, name: &str) -> TomcatResult<PlanEntry> {
        let mut matching = self.entries.iter().filter(|e| e.name == name).peekable();
        if matching.peek().is_none() {
            return Err(TomcatError::PlanEntryMissing(name.to_string()));
        }

        let mut merged = PlanEntry::new(name);
        for entry in matching {
            if let Some(version) = entry.version.as_ref().filter(|v| !v.is_empty()) {
                merged.version = Some(version.clone());
            }
            for (key, value) in &entry.metadata {
                merged.metadata.insert(key.clone(), value.clone());
            }
        }

        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PLAN: &str = r#"
[[entries]]
name = "jvm"
[entries.metadata]
launch = true

[[entries]]
name = "tomcat"
version = "9.*"
[entries.metadata]
launch = true
source = "detect"

[[entries]]
name = "tomcat"
[entries.metadata]
source = "override"
"#;

    #[test]
    fn merge_later_entries_win() {
        let plan: BuildPlan = toml::from_str(PLAN).unwrap();
        let merged = plan.shallow_merged("tomcat").unwrap();

        assert_eq!(merged.requested_version(), Some("9.*"));
        assert_eq!(
            merged.metadata.get("launch").and_then(|v| v.as_bool()),
            Some(true)
        );
        assert_eq!(
            merged.metadata.get("source").and_then(|v| v.as_str()),
            Some("override")
        );
    }

    #[test]
    fn missing_entry_errors() {
        let plan: BuildPlan = toml::from_str(PLAN).unwrap();
        let err = plan.shallow_merged("jetty").unwrap_err();
        assert!(matches!(err, TomcatError::PlanEntryMissing(ref n) if n == "jetty"));
    }

    #[test]
    fn version_from_metadata() {
        let plan: BuildPlan = toml::from_str(
            "[[entries]]\nname = \"tomcat\"\n[entries.metadata]\nversion = \"10.1.*\"\n",
        )
        .unwrap();
        let merged = plan.shallow_merged("tomcat").unwrap();
        assert_eq!(merged.requested_version(), Some("10.1.*"));
    }

    #[test]
    fn blank_version_is_unset() {
        let mut entry = PlanEntry::new("tomcat");
        entry.version = Some("  ".to_string());
        assert_eq!(entry.requested_version(), None);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("plan.toml");
        let plan = BuildPlan {
            entries: vec![PlanEntry::new("tomcat")],
        };
        plan.save(&path).unwrap();
        assert_eq!(BuildPlan::from_file(&path).unwrap(), plan);
    }
}
