//! Checksum-addressed archive cache

use crate::dependency::Dependency;
use crate::error::{TomcatError, TomcatResult};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Obtains the archive bytes for a dependency
pub trait ArtifactFetcher {
    /// Return a local path to the verified archive
    fn fetch(&self, dependency: &Dependency) -> TomcatResult<PathBuf>;
}

/// Hex SHA-256 of a file's contents
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Where an archive URI points
#[derive(Debug, PartialEq, Eq)]
enum Source<'a> {
    Local(&'a Path),
    Remote(&'a str),
}

impl<'a> Source<'a> {
    fn parse(uri: &'a str) -> Self {
        if let Some(path) = uri.strip_prefix("file://") {
            Self::Local(Path::new(path))
        } else if uri.starts_with("http://") || uri.starts_with("https://") {
            Self::Remote(uri)
        } else {
            Self::Local(Path::new(uri))
        }
    }
}

/// Fetcher backed by an on-disk download cache
#[derive(Debug, Clone)]
pub struct CachedFetcher {
    cache_dir: PathBuf,
    offline: bool,
}

impl CachedFetcher {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            offline: false,
        }
    }

    /// Refuse to download over the network; cached and local archives still work
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Cache location for a dependency's archive
    pub fn cached_path(&self, dependency: &Dependency) -> TomcatResult<PathBuf> {
        let digest = &dependency.sha256;
        if digest.len() != 64 || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TomcatError::InvalidDigest {
                uri: dependency.uri.clone(),
                digest: digest.clone(),
            });
        }

        Ok(self
            .cache_dir
            .join(digest.to_ascii_lowercase())
            .join(dependency.file_name()))
    }

    fn copy_to(&self, uri: &str, source: Source<'_>, dest: &Path) -> TomcatResult<()> {
        match source {
            Source::Local(path) => {
                debug!("Copying {} from {}", uri, path.display());
                fs::copy(path, dest).map_err(|e| TomcatError::fetch(uri, e))?;
            }
            Source::Remote(url) => {
                if self.offline {
                    return Err(TomcatError::fetch(uri, "network access disabled (offline)"));
                }

                info!("Downloading {}", url);
                let response = ureq::get(url)
                    .call()
                    .map_err(|e| TomcatError::fetch(uri, e))?;
                let mut reader = response.into_body().into_reader();
                let mut file = fs::File::create(dest).map_err(|e| {
                    TomcatError::io(format!("creating {}", dest.display()), e)
                })?;
                io::copy(&mut reader, &mut file).map_err(|e| TomcatError::fetch(uri, e))?;
            }
        }
        Ok(())
    }
}

impl ArtifactFetcher for CachedFetcher {
    fn fetch(&self, dependency: &Dependency) -> TomcatResult<PathBuf> {
        let expected = dependency.sha256.to_ascii_lowercase();
        let path = self.cached_path(dependency)?;

        if path.is_file() {
            let actual = sha256_file(&path)
                .map_err(|e| TomcatError::io(format!("hashing {}", path.display()), e))?;
            if actual == expected {
                debug!("Reusing cached {} at {}", dependency, path.display());
                return Ok(path);
            }
            warn!("Cached {} is corrupt, fetching again", path.display());
            fs::remove_file(&path)
                .map_err(|e| TomcatError::io(format!("removing {}", path.display()), e))?;
        }

        let dir = path
            .parent()
            .ok_or_else(|| TomcatError::Internal("cache path has no parent".to_string()))?;
        fs::create_dir_all(dir)
            .map_err(|e| TomcatError::io(format!("creating cache dir {}", dir.display()), e))?;

        let partial = dir.join(format!("{}.partial", dependency.file_name()));
        let result = self
            .copy_to(&dependency.uri, Source::parse(&dependency.uri), &partial)
            .and_then(|()| {
                sha256_file(&partial)
                    .map_err(|e| TomcatError::io(format!("hashing {}", partial.display()), e))
            });

        let actual = match result {
            Ok(actual) => actual,
            Err(e) => {
                let _ = fs::remove_file(&partial);
                return Err(e);
            }
        };

        if actual != expected {
            let _ = fs::remove_file(&partial);
            return Err(TomcatError::ChecksumMismatch {
                uri: dependency.uri.clone(),
                expected,
                actual,
            });
        }

        fs::rename(&partial, &path)
            .map_err(|e| TomcatError::io(format!("moving archive into {}", path.display()), e))?;

        info!("Cached {} at {}", dependency, path.display());
        Ok(path)
    }
}
