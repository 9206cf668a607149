//! Layer environment entries
//!
//! Each entry is one file under `env/`, `env.build/` or `env.launch/`
//! named `KEY.<mode>`. Entries are merged onto the inherited environment
//! per phase, the same way the launcher does it.

use std::collections::BTreeMap;
use std::fmt;

/// Separator used for `append`/`prepend` entries
pub const PATH_DELIMITER: &str = ":";

/// Phase an entry is visible in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EnvPhase {
    /// Both build and launch (`env/`)
    Any,
    /// Subsequent buildpacks only (`env.build/`)
    Build,
    /// Application process only (`env.launch/`)
    Launch,
}

impl EnvPhase {
    /// Directory name inside the layer root
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Any => "env",
            Self::Build => "env.build",
            Self::Launch => "env.launch",
        }
    }

    /// Whether an entry scoped to `self` is visible when running `phase`
    fn visible_in(&self, phase: EnvPhase) -> bool {
        matches!(self, Self::Any) || *self == phase
    }
}

/// How an entry combines with an inherited value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EnvMode {
    /// Always replaces the inherited value
    Override,
    /// Only set when nothing is inherited
    Default,
    /// Joined after the inherited value
    Append,
    /// Joined before the inherited value
    Prepend,
}

impl EnvMode {
    /// File suffix for this mode
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::Default => "default",
            Self::Append => "append",
            Self::Prepend => "prepend",
        }
    }

    /// Parse a file suffix
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "override" => Some(Self::Override),
            "default" => Some(Self::Default),
            "append" => Some(Self::Append),
            "prepend" => Some(Self::Prepend),
            _ => None,
        }
    }
}

impl fmt::Display for EnvMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

/// A single environment entry contributed by a layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvEntry {
    pub key: String,
    pub value: String,
    pub mode: EnvMode,
    pub phase: EnvPhase,
}

impl EnvEntry {
    /// File name for the entry (`CATALINA_HOME.override`)
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.key, self.mode)
    }
}

/// Environment entries contributed by one layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerEnv {
    entries: Vec<EnvEntry>,
}

impl LayerEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the entry for `(key, phase)`
    pub fn insert(&mut self, phase: EnvPhase, mode: EnvMode, key: &str, value: &str) {
        self.entries
            .retain(|e| !(e.key == key && e.phase == phase && e.mode == mode));
        self.entries.push(EnvEntry {
            key: key.to_string(),
            value: value.to_string(),
            mode,
            phase,
        });
    }

    /// Shorthand for a launch-scoped override
    pub fn override_launch(&mut self, key: &str, value: &str) {
        self.insert(EnvPhase::Launch, EnvMode::Override, key, value);
    }

    pub fn entries(&self) -> &[EnvEntry] {
        &self.entries
    }

    /// Compute the environment seen in `phase` on top of `inherited`.
    ///
    /// Override entries win over inherited values of the same key; default
    /// entries only fill missing keys. Entries scoped to another phase are
    /// ignored entirely.
    pub fn apply(
        &self,
        phase: EnvPhase,
        inherited: &BTreeMap<String, String>,
    ) -> BTreeMap<String, String> {
        let mut env = inherited.clone();

        for entry in self.entries.iter().filter(|e| e.phase.visible_in(phase)) {
            match entry.mode {
                EnvMode::Override => {
                    env.insert(entry.key.clone(), entry.value.clone());
                }
                EnvMode::Default => {
                    env.entry(entry.key.clone())
                        .or_insert_with(|| entry.value.clone());
                }
                EnvMode::Append => {
                    let joined = match env.get(&entry.key) {
                        Some(cur) if !cur.is_empty() => {
                            format!("{}{}{}", cur, PATH_DELIMITER, entry.value)
                        }
                        _ => entry.value.clone(),
                    };
                    env.insert(entry.key.clone(), joined);
                }
                EnvMode::Prepend => {
                    let joined = match env.get(&entry.key) {
                        Some(cur) if !cur.is_empty() => {
                            format!("{}{}{}", entry.value, PATH_DELIMITER, cur)
                        }
                        _ => entry.value.clone(),
                    };
                    env.insert(entry.key.clone(), joined);
                }
            }
        }

        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inherited(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn override_wins_over_inherited() {
        let mut env = LayerEnv::new();
        env.override_launch("CATALINA_HOME", "/layers/tomcat");

        let view = env.apply(
            EnvPhase::Launch,
            &inherited(&[("CATALINA_HOME", "/usr/share/tomcat")]),
        );
        assert_eq!(view.get("CATALINA_HOME").unwrap(), "/layers/tomcat");
    }

    #[test]
    fn launch_override_hidden_from_build() {
        let mut env = LayerEnv::new();
        env.override_launch("CATALINA_HOME", "/layers/tomcat");

        let view = env.apply(EnvPhase::Build, &inherited(&[]));
        assert!(!view.contains_key("CATALINA_HOME"));

        let view = env.apply(
            EnvPhase::Build,
            &inherited(&[("CATALINA_HOME", "/usr/share/tomcat")]),
        );
        assert_eq!(view.get("CATALINA_HOME").unwrap(), "/usr/share/tomcat");
    }

    #[test]
    fn default_only_fills_missing() {
        let mut env = LayerEnv::new();
        env.insert(EnvPhase::Any, EnvMode::Default, "JAVA_OPTS", "-Xmx512m");
        env.insert(EnvPhase::Any, EnvMode::Default, "CATALINA_OPTS", "-server");

        let view = env.apply(EnvPhase::Launch, &inherited(&[("JAVA_OPTS", "-Xmx1g")]));
        assert_eq!(view.get("JAVA_OPTS").unwrap(), "-Xmx1g");
        assert_eq!(view.get("CATALINA_OPTS").unwrap(), "-server");
    }

    #[test]
    fn append_and_prepend_join_with_delimiter() {
        let mut env = LayerEnv::new();
        env.insert(EnvPhase::Any, EnvMode::Prepend, "PATH", "/layers/tomcat/bin");
        env.insert(EnvPhase::Any, EnvMode::Append, "CLASSPATH", "/extra.jar");

        let view = env.apply(
            EnvPhase::Launch,
            &inherited(&[("PATH", "/usr/bin"), ("CLASSPATH", "")]),
        );
        assert_eq!(view.get("PATH").unwrap(), "/layers/tomcat/bin:/usr/bin");
        assert_eq!(view.get("CLASSPATH").unwrap(), "/extra.jar");
    }

    #[test]
    fn insert_replaces_same_key() {
        let mut env = LayerEnv::new();
        env.override_launch("CATALINA_HOME", "/old");
        env.override_launch("CATALINA_HOME", "/new");
        assert_eq!(env.entries().len(), 1);
        assert_eq!(env.entries()[0].value, "/new");
        assert_eq!(env.entries()[0].file_name(), "CATALINA_HOME.override");
    }

    #[test]
    fn mode_suffix_roundtrip() {
        for mode in [
            EnvMode::Override,
            EnvMode::Default,
            EnvMode::Append,
            EnvMode::Prepend,
        ] {
            assert_eq!(EnvMode::from_suffix(mode.suffix()), Some(mode));
        }
        assert_eq!(EnvMode::from_suffix("delim"), None);
    }
}
