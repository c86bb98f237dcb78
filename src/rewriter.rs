//! Rewriting version declarations across the source tree.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::FilePatterns;
use crate::domain::declaration;
use crate::error::Result;
use crate::locator::find_files;
use crate::text::{read_text, write_text, TextEncoding};

/// A file whose declarations have been rewritten to the new version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenFile {
    pub path: PathBuf,
    pub content: String,
    /// Encoding the file was read in and is written back with
    pub encoding: TextEncoding,
}

/// Computes the new content of every file that declares a version.
///
/// Candidates are the files matching any of the shared, per-project or
/// resource patterns. Files without a recognised declaration are left out.
/// Nothing is written.
pub fn plan_rewrites(
    root: &Path,
    patterns: &FilePatterns,
    new_version: &str,
) -> Result<Vec<RewrittenFile>> {
    let mut planned = Vec::new();

    for path in find_files(root, |name| patterns.matches_any(name)) {
        let Some(text) = read_text(&path)? else {
            continue;
        };

        if !declaration::contains_any(&text.content) {
            debug!(path = %path.display(), "no version declaration, skipping");
            continue;
        }

        let content = declaration::rewrite_all(&text.content, new_version);
        planned.push(RewrittenFile {
            path,
            content,
            encoding: text.encoding,
        });
    }

    Ok(planned)
}

/// Overwrites each file in place with its planned content.
///
/// Files are written even when the content is unchanged, in the encoding
/// they were read in. Read-only working-copy files are made writable first.
pub fn apply_rewrites(files: &[RewrittenFile]) -> Result<()> {
    for file in files {
        clear_readonly(&file.path)?;
        write_text(&file.path, &file.content, file.encoding)?;
        info!(path = %file.path.display(), "rewrote version declarations");
    }
    Ok(())
}

/// Removes the read-only attribute from `path` if it is set.
#[allow(clippy::permissions_set_readonly_false)]
pub(crate) fn clear_readonly(path: &Path) -> Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();
    if permissions.readonly() {
        permissions.set_readonly(false);
        fs::set_permissions(path, permissions)?;
    }
    Ok(())
}
