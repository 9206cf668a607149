//! Buildpack layer system
//!
//! A layer is a directory scoped to one dependency plus a metadata record
//! that persists across builds. Contributors decide whether the cached
//! contents are still valid by comparing the recorded fingerprint with the
//! dependency they are about to install.
//!
//! # On-disk layout
//!
//! | Path | Contents |
//! |------|----------|
//! | `<layers>/<name>/` | Layer root |
//! | `<layers>/<name>.toml` | Flags + `[metadata]` (fingerprint) |
//! | `<layers>/<name>/env.launch/KEY.override` | Launch-scoped env entries |
//! | `<layers>/launch.toml` | Process types for the application |

pub mod env;
pub mod fs;
pub mod launch;

pub use env::{EnvEntry, EnvMode, EnvPhase, LayerEnv};
pub use fs::{FsLayer, FsLayers};
pub use launch::{LaunchMetadata, LaunchMetadataWriter, Process};

use crate::error::TomcatResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Metadata key holding the fingerprint the layer was populated from
pub const FINGERPRINT_KEY: &str = "sha256";

/// When a layer is visible
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerFlags {
    /// Exported into the launch image
    pub launch: bool,
    /// Visible to subsequent buildpacks during the build
    pub build: bool,
    /// Restored from cache on the next build
    pub cache: bool,
}

impl LayerFlags {
    /// Launch-only layer (the application server is not needed at build time)
    pub fn launch() -> Self {
        Self {
            launch: true,
            build: false,
            cache: false,
        }
    }
}

/// Persisted record of a successfully populated layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerRecord {
    #[serde(flatten)]
    pub flags: LayerFlags,

    /// Descriptive metadata; `sha256` is the fingerprint
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl LayerRecord {
    /// Build a record for the given fingerprint
    pub fn new(flags: LayerFlags, fingerprint: &str) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert(FINGERPRINT_KEY.to_string(), fingerprint.to_string());
        Self { flags, metadata }
    }

    /// Attach an extra descriptive field
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Fingerprint the layer was populated from, if any
    pub fn fingerprint(&self) -> Option<&str> {
        self.metadata.get(FINGERPRINT_KEY).map(String::as_str)
    }
}

/// Capability set a contributor needs from the layer cache.
///
/// Persistence and cross-process locking belong to the implementation;
/// contributors assume exclusive access for the duration of a build.
pub trait Layer {
    /// Layer name (directory name under the layers root)
    fn name(&self) -> &str;

    /// Root directory the dependency is installed into
    fn root(&self) -> &Path;

    /// Read the persisted record, `None` on first build
    fn read_record(&self) -> TomcatResult<Option<LayerRecord>>;

    /// Persist the record, marking the contents valid
    fn write_record(&mut self, record: &LayerRecord) -> TomcatResult<()>;

    /// Drop the record and every file under the root
    fn reset(&mut self) -> TomcatResult<()>;

    /// Set an env var visible only at launch that wins over inherited values
    fn override_launch_env(&mut self, key: &str, value: &str) -> TomcatResult<()>;

    /// Fingerprint recorded for the current contents
    fn fingerprint(&self) -> TomcatResult<Option<String>> {
        Ok(self
            .read_record()?
            .and_then(|r| r.fingerprint().map(str::to_string)))
    }
}
