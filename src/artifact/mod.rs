//! Dependency archives
//!
//! Fetching is checksum-addressed: an archive lives at
//! `<cache>/<sha256>/<file name>` and is only trusted when its content hash
//! matches the catalogue entry. Extraction unpacks a gzip-compressed tar
//! into a layer, stripping the wrapper directory.

pub mod extract;
pub mod fetch;

pub use extract::{Extractor, TarGzExtractor};
pub use fetch::{sha256_file, ArtifactFetcher, CachedFetcher};
