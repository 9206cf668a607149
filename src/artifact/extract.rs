//! Archive extraction

use crate::error::{TomcatError, TomcatResult};
use flate2::read::GzDecoder;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Unpacks an archive into a directory
pub trait Extractor {
    /// Extract `archive` into `dest`, dropping `strip` leading path components
    fn extract(&self, archive: &Path, dest: &Path, strip: usize) -> TomcatResult<()>;
}

/// Extractor for `.tar.gz` archives
#[derive(Debug, Clone, Copy, Default)]
pub struct TarGzExtractor;

/// Path of an entry once `strip` components are removed.
///
/// Returns `Ok(None)` for entries that disappear entirely (the wrapper
/// directory itself) and `Err(())` for entries escaping the destination.
fn strip_components(path: &Path, strip: usize) -> Result<Option<PathBuf>, ()> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return Err(()),
        }
    }

    if parts.len() <= strip {
        return Ok(None);
    }
    Ok(Some(parts[strip..].iter().collect()))
}

impl Extractor for TarGzExtractor {
    fn extract(&self, archive: &Path, dest: &Path, strip: usize) -> TomcatResult<()> {
        let file = fs::File::open(archive).map_err(|e| TomcatError::extraction(archive, e))?;
        let mut tar = tar::Archive::new(GzDecoder::new(io::BufReader::new(file)));

        fs::create_dir_all(dest).map_err(|e| TomcatError::extraction(archive, e))?;

        let mut count = 0usize;
        for entry in tar.entries().map_err(|e| TomcatError::extraction(archive, e))? {
            let mut entry = entry.map_err(|e| TomcatError::extraction(archive, e))?;
            let path = entry
                .path()
                .map_err(|e| TomcatError::extraction(archive, e))?
                .into_owned();

            let relative = match strip_components(&path, strip) {
                Ok(Some(relative)) => relative,
                Ok(None) => continue,
                Err(()) => {
                    return Err(TomcatError::UnsafeArchiveEntry {
                        archive: archive.to_path_buf(),
                        entry: path.display().to_string(),
                    })
                }
            };

            let target = dest.join(&relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| TomcatError::extraction(archive, e))?;
            }

            let kind = entry.header().entry_type();
            if kind.is_symlink() || kind.is_hard_link() {
                let unsafe_link = || TomcatError::UnsafeArchiveEntry {
                    archive: archive.to_path_buf(),
                    entry: path.display().to_string(),
                };
                let link = entry
                    .link_name()
                    .map_err(|e| TomcatError::extraction(archive, e))?
                    .ok_or_else(unsafe_link)?
                    .into_owned();

                if kind.is_hard_link() {
                    // Hard link targets are archive paths, so they get the same strip
                    let Ok(Some(source)) = strip_components(&link, strip) else {
                        return Err(unsafe_link());
                    };
                    fs::hard_link(dest.join(source), &target)
                        .map_err(|e| TomcatError::extraction(archive, e))?;
                    count += 1;
                    continue;
                }

                // Symlinks resolve next to the link; no absolute or `..` targets
                if !matches!(strip_components(&link, 0), Ok(Some(_))) {
                    return Err(unsafe_link());
                }
            }

            entry
                .unpack(&target)
                .map_err(|e| TomcatError::extraction(archive, e))?;
            count += 1;
        }

        debug!("Extracted {} entries from {}", count, archive.display());
        Ok(())
    }
}

/// Helpers for building fixture archives in tests
#[cfg(test)]
pub(crate) mod fixture {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::path::Path;

    /// Write a `.tar.gz` with `(path, contents, mode)` file entries
    pub(crate) fn write_tar_gz(path: &Path, files: &[(&str, &str, u32)]) {
        write_tar_gz_with_links(path, files, &[]);
    }

    /// Like [`write_tar_gz`], followed by `(path, target, kind)` link entries
    pub(crate) fn write_tar_gz_with_links(
        path: &Path,
        files: &[(&str, &str, u32)],
        links: &[(&str, &str, tar::EntryType)],
    ) {
        let file = std::fs::File::create(path).unwrap();
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));

        for (name, contents, mode) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(*mode);
            header.set_cksum();
            builder
                .append_data(&mut header, name, contents.as_bytes())
                .unwrap();
        }

        for (name, target, kind) in links {
            let mut header = tar::Header::new_gnu();
            header.set_entry_type(*kind);
            header.set_size(0);
            header.set_mode(0o777);
            builder.append_link(&mut header, name, target).unwrap();
        }

        builder.into_inner().unwrap().finish().unwrap();
    }
}
