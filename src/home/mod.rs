//! CATALINA_HOME layer contribution
//!
//! Installs the resolved Tomcat archive into its layer, patches the
//! startup script, points `CATALINA_HOME` at the layer for launch and
//! publishes the process types.
//!
//! # States
//!
//! | Stored fingerprint | Decision | Work done |
//! |--------------------|----------|-----------|
//! | none | Repopulate | fetch, extract, patch, record |
//! | differs | Repopulate | same; old contents are removed first |
//! | equal | Reuse | env override re-affirmed only |
//!
//! The fingerprint is written last, so any failure while populating
//! leaves the layer without a record and the next build starts over.

pub mod patch;

pub use patch::{patch_classpath, patch_startup_script, PatchOutcome};

use crate::artifact::{ArtifactFetcher, Extractor};
use crate::dependency::Dependency;
use crate::error::TomcatResult;
use crate::layer::{
    LaunchMetadata, LaunchMetadataWriter, Layer, LayerFlags, LayerRecord, Process,
};
use std::fmt;
use tracing::{debug, info};

/// Build plan / catalogue id of the Tomcat dependency
pub const TOMCAT_DEPENDENCY: &str = "tomcat";

/// Launch env var pointing at the installation
pub const CATALINA_HOME: &str = "CATALINA_HOME";

/// Command shared by every process type
pub const DEFAULT_COMMAND: &str = "catalina.sh run";

/// Startup script, relative to the layer root
pub const STARTUP_SCRIPT: &str = "bin/catalina.sh";

/// Leading path components wrapping the installation in the archive
const ARCHIVE_STRIP: usize = 1;

/// Outcome of the cache check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contribution {
    /// Stored fingerprint matches; contents are used as they are
    Reuse,
    /// Missing or stale fingerprint; the layer is rebuilt from the archive
    Repopulate,
}

impl Contribution {
    /// Compare the stored fingerprint with the dependency's
    pub fn decide(stored: Option<&str>, dependency: &Dependency) -> Self {
        match stored {
            Some(fp) if fp == dependency.fingerprint() => Self::Reuse,
            _ => Self::Repopulate,
        }
    }
}

impl fmt::Display for Contribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reuse => write!(f, "reused"),
            Self::Repopulate => write!(f, "populated"),
        }
    }
}

/// Contributes the Tomcat installation layer
pub struct CatalinaHome<'a, L: Layer> {
    dependency: Dependency,
    layer: L,
    launch: &'a dyn LaunchMetadataWriter,
    fetcher: &'a dyn ArtifactFetcher,
    extractor: &'a dyn Extractor,
    env_var: String,
    command: String,
}

impl<'a, L: Layer> CatalinaHome<'a, L> {
    pub fn new(
        dependency: Dependency,
        layer: L,
        launch: &'a dyn LaunchMetadataWriter,
        fetcher: &'a dyn ArtifactFetcher,
        extractor: &'a dyn Extractor,
    ) -> Self {
        Self {
            dependency,
            layer,
            launch,
            fetcher,
            extractor,
            env_var: CATALINA_HOME.to_string(),
            command: DEFAULT_COMMAND.to_string(),
        }
    }

    /// Use a different launch env var name
    pub fn with_env_var(mut self, env_var: impl Into<String>) -> Self {
        self.env_var = env_var.into();
        self
    }

    /// Use a different launch command
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn layer(&self) -> &L {
        &self.layer
    }

    /// Make the layer match the dependency and publish launch metadata
    pub fn contribute(&mut self) -> TomcatResult<Contribution> {
        let stored = self.layer.fingerprint()?;
        let decision = Contribution::decide(stored.as_deref(), &self.dependency);

        match decision {
            Contribution::Reuse => {
                info!("Reusing cached layer {} ({})", self.layer.name(), self.dependency);
            }
            Contribution::Repopulate => {
                debug!(
                    "Layer {} fingerprint {:?} != {}",
                    self.layer.name(),
                    stored,
                    self.dependency.fingerprint()
                );
                self.populate()?;
            }
        }

        let root = self.layer.root().display().to_string();
        self.layer.override_launch_env(&self.env_var, &root)?;

        self.launch.write_launch_metadata(&self.launch_metadata())?;

        Ok(decision)
    }

    fn populate(&mut self) -> TomcatResult<()> {
        info!("Contributing {} to layer {}", self.dependency, self.layer.name());

        let archive = self.fetcher.fetch(&self.dependency)?;

        self.layer.reset()?;
        let root = self.layer.root().to_path_buf();

        info!("Extracting to {}", root.display());
        self.extractor.extract(&archive, &root, ARCHIVE_STRIP)?;

        patch_startup_script(&root.join(STARTUP_SCRIPT))?;

        let record = LayerRecord::new(LayerFlags::launch(), self.dependency.fingerprint())
            .with("id", self.dependency.id.as_str())
            .with("name", self.dependency.name.as_str())
            .with("version", self.dependency.version.as_str())
            .with("uri", self.dependency.uri.as_str());
        self.layer.write_record(&record)
    }

    /// The three process types, all running the same command
    pub fn launch_metadata(&self) -> LaunchMetadata {
        LaunchMetadata {
            processes: vec![
                Process::new("task", self.command.as_str()),
                Process::new(self.dependency.id.as_str(), self.command.as_str()),
                Process::new("web", self.command.as_str()),
            ],
        }
    }
}
