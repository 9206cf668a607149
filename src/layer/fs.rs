//! Filesystem-backed layers
//!
//! Implements the layer capability on top of a layers directory using the
//! buildpack on-disk conventions.

use crate::error::{TomcatError, TomcatResult};
use crate::layer::env::{EnvMode, EnvPhase, LayerEnv};
use crate::layer::launch::{LaunchMetadata, LaunchMetadataWriter};
use crate::layer::{Layer, LayerRecord};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The layers directory handed to a buildpack
#[derive(Debug, Clone)]
pub struct FsLayers {
    root: PathBuf,
}

impl FsLayers {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Open (without creating) the layer with the given name
    pub fn layer(&self, name: &str) -> FsLayer {
        FsLayer {
            name: name.to_string(),
            root: self.root.join(name),
            record_path: self.root.join(format!("{}.toml", name)),
        }
    }

    /// Path of the launch metadata file
    pub fn launch_metadata_path(&self) -> PathBuf {
        self.root.join("launch.toml")
    }

    /// Read back the launch metadata, `None` if never written
    pub fn read_launch_metadata(&self) -> TomcatResult<Option<LaunchMetadata>> {
        let path = self.launch_metadata_path();
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(toml::from_str(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TomcatError::io(
                format!("reading launch metadata {}", path.display()),
                e,
            )),
        }
    }
}

impl LaunchMetadataWriter for FsLayers {
    fn write_launch_metadata(&self, metadata: &LaunchMetadata) -> TomcatResult<()> {
        fs::create_dir_all(&self.root).map_err(|e| {
            TomcatError::io(format!("creating layers dir {}", self.root.display()), e)
        })?;

        let path = self.launch_metadata_path();
        let content = toml::to_string(metadata)?;
        fs::write(&path, content).map_err(|e| {
            TomcatError::io(format!("writing launch metadata {}", path.display()), e)
        })?;

        debug!("Wrote {} process types to {}", metadata.processes.len(), path.display());
        Ok(())
    }
}

/// A single layer directory plus its `<name>.toml` record
#[derive(Debug, Clone)]
pub struct FsLayer {
    name: String,
    root: PathBuf,
    record_path: PathBuf,
}

impl FsLayer {
    /// Write each entry to `<phase dir>/<KEY>.<mode>`
    pub fn write_env(&self, env: &LayerEnv) -> TomcatResult<()> {
        for entry in env.entries() {
            let dir = self.root.join(entry.phase.dir_name());
            fs::create_dir_all(&dir)
                .map_err(|e| TomcatError::io(format!("creating {}", dir.display()), e))?;

            let path = dir.join(entry.file_name());
            fs::write(&path, &entry.value)
                .map_err(|e| TomcatError::io(format!("writing {}", path.display()), e))?;
            debug!("Set {} {} ({:?})", entry.mode, entry.key, entry.phase);
        }
        Ok(())
    }

    /// Load the env entries currently stored in the layer
    pub fn env(&self) -> TomcatResult<LayerEnv> {
        let mut env = LayerEnv::new();

        for phase in [EnvPhase::Any, EnvPhase::Build, EnvPhase::Launch] {
            let dir = self.root.join(phase.dir_name());
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(TomcatError::io(
                        format!("reading env dir {}", dir.display()),
                        e,
                    ))
                }
            };

            for entry in entries {
                let entry = entry
                    .map_err(|e| TomcatError::io(format!("reading {}", dir.display()), e))?;
                let file_name = entry.file_name().to_string_lossy().to_string();
                let Some((key, suffix)) = file_name.rsplit_once('.') else {
                    continue;
                };
                let Some(mode) = EnvMode::from_suffix(suffix) else {
                    continue;
                };
                let value = fs::read_to_string(entry.path()).map_err(|e| {
                    TomcatError::io(format!("reading {}", entry.path().display()), e)
                })?;
                env.insert(phase, mode, key, &value);
            }
        }

        Ok(env)
    }
}

impl Layer for FsLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn read_record(&self) -> TomcatResult<Option<LayerRecord>> {
        let content = match fs::read_to_string(&self.record_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(TomcatError::io(
                    format!("reading layer record {}", self.record_path.display()),
                    e,
                ))
            }
        };

        toml::from_str(&content)
            .map(Some)
            .map_err(|e| TomcatError::ConfigInvalid {
                path: self.record_path.clone(),
                reason: e.to_string(),
            })
    }

    fn write_record(&mut self, record: &LayerRecord) -> TomcatResult<()> {
        if let Some(parent) = self.record_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| TomcatError::io(format!("creating {}", parent.display()), e))?;
        }

        let content = toml::to_string(record)?;
        fs::write(&self.record_path, content).map_err(|e| {
            TomcatError::io(
                format!("writing layer record {}", self.record_path.display()),
                e,
            )
        })
    }

    fn reset(&mut self) -> TomcatResult<()> {
        match fs::remove_file(&self.record_path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(TomcatError::io(
                    format!("removing layer record {}", self.record_path.display()),
                    e,
                ))
            }
        }

        if self.root.exists() {
            fs::remove_dir_all(&self.root).map_err(|e| {
                TomcatError::io(format!("removing layer {}", self.root.display()), e)
            })?;
        }

        fs::create_dir_all(&self.root)
            .map_err(|e| TomcatError::io(format!("creating layer {}", self.root.display()), e))
    }

    fn override_launch_env(&mut self, key: &str, value: &str) -> TomcatResult<()> {
        let mut env = LayerEnv::new();
        env.override_launch(key, value);
        self.write_env(&env)
    }
}
