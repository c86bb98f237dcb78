//! Finding the current version in the shared version file.

use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::domain::declaration::{self, DeclarationKind};
use crate::error::Result;
use crate::text::read_text;

/// The version read from the source tree and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedVersion {
    pub path: PathBuf,
    pub kind: DeclarationKind,
    pub version: String,
}

/// Recursively lists files under `root` whose name satisfies `accept`.
///
/// Entries are visited in file name order and symlinks are not followed.
/// Entries that cannot be read are logged and skipped.
pub fn find_files<F>(root: &Path, accept: F) -> Vec<PathBuf>
where
    F: Fn(&str) -> bool,
{
    let walker = WalkDir::new(root).follow_links(false).sort_by_file_name();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if accept(&entry.file_name().to_string_lossy()) {
            files.push(entry.into_path());
        }
    }
    files
}

/// Finds the current version in the first shared version file that declares one.
///
/// Each matching file is tested against the declaration kinds in priority
/// order; the search stops at the first successful extraction.
///
/// # Returns
/// * `Ok(Some(LocatedVersion))` - Version found
/// * `Ok(None)` - No shared file exists, or none declares a version
/// * `Err` - A candidate file could not be read
pub fn locate_version(root: &Path, shared: &Pattern) -> Result<Option<LocatedVersion>> {
    let candidates = find_files(root, |name| shared.matches(name));
    debug!(count = candidates.len(), "shared version file candidates");

    for path in candidates {
        let Some(text) = read_text(&path)? else {
            continue;
        };

        if let Some((kind, version)) = declaration::extract_first(&text.content) {
            info!(path = %path.display(), %kind, %version, "found current version");
            return Ok(Some(LocatedVersion {
                path,
                kind,
                version,
            }));
        }

        debug!(path = %path.display(), "no version declaration in candidate");
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn shared() -> Pattern {
        Pattern::new("SharedAssemblyInfo.*").unwrap()
    }

    #[test]
    fn test_locates_version_in_nested_file() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("src").join("Shared");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            nested.join("SharedAssemblyInfo.cs"),
            r#"[assembly: AssemblyVersion("4.3.2.1")]"#,
        )
        .unwrap();

        let located = locate_version(dir.path(), &shared()).unwrap().unwrap();
        assert_eq!(located.version, "4.3.2.1");
        assert_eq!(located.kind, DeclarationKind::AssemblyVersion);
        assert!(located.path.ends_with("src/Shared/SharedAssemblyInfo.cs"));
    }

    #[test]
    fn test_skips_shared_file_without_declaration() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a");
        let second = dir.path().join("b");
        fs::create_dir_all(&first).unwrap();
        fs::create_dir_all(&second).unwrap();
        fs::write(first.join("SharedAssemblyInfo.cs"), "// nothing here").unwrap();
        fs::write(
            second.join("SharedAssemblyInfo.cs"),
            r#"[assembly: AssemblyFileVersion("2.0.0.9")]"#,
        )
        .unwrap();

        let located = locate_version(dir.path(), &shared()).unwrap().unwrap();
        assert_eq!(located.version, "2.0.0.9");
        assert_eq!(located.kind, DeclarationKind::AssemblyFileVersion);
    }

    #[test]
    fn test_ignores_non_shared_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("AssemblyInfo.cs"),
            r#"[assembly: AssemblyVersion("1.1.1.1")]"#,
        )
        .unwrap();

        assert!(locate_version(dir.path(), &shared()).unwrap().is_none());
    }

    #[test]
    fn test_empty_tree() {
        let dir = tempfile::tempdir().unwrap();
        assert!(locate_version(dir.path(), &shared()).unwrap().is_none());
    }

    #[test]
    fn test_binary_candidate_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("SharedAssemblyInfo.bin"), [0xff, 0xfe, 0x00]).unwrap();
        assert!(locate_version(dir.path(), &shared()).unwrap().is_none());
    }

    #[test]
    fn test_locates_version_in_utf16_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend(
            r#"[assembly: AssemblyVersion("3.1.0.7")]"#
                .encode_utf16()
                .flat_map(u16::to_le_bytes),
        );
        fs::write(dir.path().join("SharedAssemblyInfo.cs"), bytes).unwrap();

        let located = locate_version(dir.path(), &shared()).unwrap().unwrap();
        assert_eq!(located.version, "3.1.0.7");
    }

    #[test]
    fn test_find_files_is_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.rc", "a.rc", "b.txt"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let files = find_files(dir.path(), |name| name.ends_with(".rc"));
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.rc", "c.rc"]);
    }
}
