//! catalina.sh patching
//!
//! Stock `catalina.sh` resets `CLASSPATH=` on a line of its own before
//! building the launch classpath, discarding anything outer tooling put
//! there. The assignment is commented out. Lines that already carry a
//! value, or are already commented, are left alone, so patching a patched
//! script is a no-op.

use crate::error::{TomcatError, TomcatResult};
use regex::Regex;
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::info;

/// `CLASSPATH=` with nothing but horizontal whitespace around it on its line
static EMPTY_CLASSPATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*CLASSPATH=[ \t]*$").expect("EMPTY_CLASSPATH pattern is valid")
});

const REPLACEMENT: &str = "#CLASSPATH=";

/// Result of patching a script on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Nothing matched; the file was not written
    Unchanged,
    /// This many assignments were commented out
    Patched(usize),
}

/// Comment out every empty `CLASSPATH=` assignment.
///
/// A match must be preceded and followed by a newline. All matches are
/// replaced in one pass; consecutive empty assignments are each rewritten.
pub fn patch_classpath(content: &str) -> (Cow<'_, str>, usize) {
    let mut out = String::new();
    let mut last = 0;
    let mut replaced = 0;

    for m in EMPTY_CLASSPATH.find_iter(content) {
        // `^` already guarantees a preceding '\n' when start > 0, `$` a following one when end < len
        if m.start() == 0 || m.end() == content.len() {
            continue;
        }
        out.push_str(&content[last..m.start()]);
        out.push_str(REPLACEMENT);
        last = m.end();
        replaced += 1;
    }

    if replaced == 0 {
        return (Cow::Borrowed(content), 0);
    }

    out.push_str(&content[last..]);
    (Cow::Owned(out), replaced)
}

/// Patch the startup script at `path` in place, keeping its permissions
pub fn patch_startup_script(path: &Path) -> TomcatResult<PatchOutcome> {
    info!("Modifying {}", file_label(path));

    let content = fs::read_to_string(path).map_err(|e| TomcatError::patch_io(path, e))?;

    let (patched, count) = patch_classpath(&content);
    if count == 0 {
        info!("No replacements needed");
        return Ok(PatchOutcome::Unchanged);
    }

    info!("Replacements needed");
    let permissions = fs::metadata(path)
        .map_err(|e| TomcatError::patch_io(path, e))?
        .permissions();
    fs::write(path, patched.as_bytes()).map_err(|e| TomcatError::patch_io(path, e))?;
    fs::set_permissions(path, permissions).map_err(|e| TomcatError::patch_io(path, e))?;

    Ok(PatchOutcome::Patched(count))
}

fn file_label(path: &Path) -> Cow<'_, str> {
    path.file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_else(|| path.to_string_lossy())
}
