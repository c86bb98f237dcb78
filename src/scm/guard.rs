//! Scoped ownership of source control resources.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::Result;
use crate::rewriter::clear_readonly;
use crate::scm::SourceControl;

/// Deletes the temporary workspace when dropped.
pub struct WorkspaceGuard<'a, S: SourceControl + ?Sized> {
    scm: &'a S,
    name: String,
}

impl<'a, S: SourceControl + ?Sized> WorkspaceGuard<'a, S> {
    pub fn create(scm: &'a S, name: &str) -> Result<Self> {
        scm.create_workspace(name)?;
        debug!(workspace = name, "created temporary workspace");
        Ok(WorkspaceGuard {
            scm,
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<S: SourceControl + ?Sized> Drop for WorkspaceGuard<'_, S> {
    fn drop(&mut self) {
        match self.scm.delete_workspace() {
            Ok(()) => debug!(workspace = %self.name, "deleted temporary workspace"),
            Err(e) => warn!(workspace = %self.name, error = %e, "failed to delete temporary workspace"),
        }
    }
}

/// Removes a working folder mapping when dropped.
pub struct MappingGuard<'a, S: SourceControl + ?Sized> {
    scm: &'a S,
    server_path: String,
}

impl<'a, S: SourceControl + ?Sized> MappingGuard<'a, S> {
    pub fn map(scm: &'a S, server_path: &str, local_path: &Path) -> Result<Self> {
        scm.map_folder(server_path, local_path)?;
        Ok(MappingGuard {
            scm,
            server_path: server_path.to_string(),
        })
    }
}

impl<S: SourceControl + ?Sized> Drop for MappingGuard<'_, S> {
    fn drop(&mut self) {
        if let Err(e) = self.scm.unmap_folder(&self.server_path) {
            warn!(server_path = %self.server_path, error = %e, "failed to remove mapping");
        }
    }
}

/// Deletes a temporary file when dropped, clearing its read-only bit first.
pub struct TempFileGuard {
    path: PathBuf,
}

impl TempFileGuard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TempFileGuard { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if !self.path.exists() {
            return;
        }
        let removed = clear_readonly(&self.path)
            .and_then(|()| fs::remove_file(&self.path).map_err(Into::into));
        if let Err(e) = removed {
            warn!(path = %self.path.display(), error = %e, "failed to delete temporary file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StampError;
    use crate::scm::{MockSourceControl, ScmCall};

    #[test]
    fn test_guards_release_in_reverse_order() {
        let scm = MockSourceControl::new();
        {
            let _workspace = WorkspaceGuard::create(&scm, "ws").unwrap();
            let _mapping = MappingGuard::map(&scm, "$/P/a.rc", Path::new("/tmp/a.rc")).unwrap();
        }

        assert_eq!(
            scm.calls(),
            vec![
                ScmCall::CreateWorkspace("ws".to_string()),
                ScmCall::Map("$/P/a.rc".to_string(), PathBuf::from("/tmp/a.rc")),
                ScmCall::Unmap("$/P/a.rc".to_string()),
                ScmCall::DeleteWorkspace,
            ]
        );
    }

    #[test]
    fn test_guards_release_on_error_path() {
        let scm = MockSourceControl::new();
        scm.fail_checkout("$/P/a.rc");

        let result: Result<()> = (|| {
            let _workspace = WorkspaceGuard::create(&scm, "ws")?;
            let _mapping = MappingGuard::map(&scm, "$/P/a.rc", Path::new("/tmp/a.rc"))?;
            scm.get_and_checkout("$/P/a.rc")?;
            Ok(())
        })();

        assert!(matches!(result, Err(StampError::SourceControl(_))));
        let calls = scm.calls();
        assert_eq!(calls.last(), Some(&ScmCall::DeleteWorkspace));
        assert!(calls.contains(&ScmCall::Unmap("$/P/a.rc".to_string())));
    }

    #[test]
    fn test_temp_file_guard_deletes_readonly_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AssemblyInfo.cs");
        fs::write(&path, "x").unwrap();
        let mut permissions = fs::metadata(&path).unwrap().permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&path, permissions).unwrap();

        {
            let guard = TempFileGuard::new(&path);
            assert_eq!(guard.path(), path);
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_temp_file_guard_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let _guard = TempFileGuard::new(dir.path().join("never-created"));
    }
}
