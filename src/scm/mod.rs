//! Source control abstraction layer
//!
//! This module provides a trait-based abstraction over the version control
//! operations the check-in stage needs, allowing for a real implementation
//! and a mock implementation for testing.
//!
//! # Overview
//!
//! The primary abstraction is the [SourceControl] trait. The concrete
//! implementations include:
//!
//! - [git::GitSourceControl]: A real implementation using the `git2` crate
//! - [mock::MockSourceControl]: A recording mock for testing
//!
//! Resources acquired through the trait (the temporary workspace, folder
//! mappings and the temporary file) are held by the guards in [guard], which
//! release them when dropped, including on error paths.
//!
//! ```rust
//! # use version_stamp::scm::{SourceControl, WorkspaceGuard, MappingGuard};
//! # use std::path::Path;
//! # fn example<S: SourceControl>(scm: &S) -> version_stamp::Result<()> {
//! let _workspace = WorkspaceGuard::create(scm, "VersionStamp_42")?;
//! let _mapping = MappingGuard::map(scm, "$/Product/app.rc", Path::new("/tmp/app.rc"))?;
//! scm.get_and_checkout("$/Product/app.rc")?;
//! scm.check_in("Updated version")?;
//! # Ok(())
//! # }
//! ```

pub mod git;
pub mod guard;
pub mod mock;

pub use git::GitSourceControl;
pub use guard::{MappingGuard, TempFileGuard, WorkspaceGuard};
pub use mock::{MockSourceControl, ScmCall};

use std::path::Path;

use crate::error::Result;

/// Version control operations used by the check-in stage
///
/// Server paths use the `$/Project/Folder/File` form.
///
/// ## Thread Safety
///
/// All implementors must be `Send + Sync` to allow safe sharing across threads.
///
/// ## Error Handling
///
/// Implementations map their underlying errors (like `git2::Error`) to
/// [crate::error::StampError] variants.
pub trait SourceControl: Send + Sync {
    /// Create the temporary workspace named `name`
    fn create_workspace(&self, name: &str) -> Result<()>;

    /// Delete the temporary workspace and everything it holds
    fn delete_workspace(&self) -> Result<()>;

    /// Map a server item to a local path in the workspace
    fn map_folder(&self, server_path: &str, local_path: &Path) -> Result<()>;

    /// Remove a mapping created by [SourceControl::map_folder]
    fn unmap_folder(&self, server_path: &str) -> Result<()>;

    /// Get the latest version of a single mapped item and pend an edit on it
    ///
    /// Non-recursive: only the named item is fetched.
    fn get_and_checkout(&self, server_path: &str) -> Result<()>;

    /// Submit every pending change in the workspace as one changeset
    ///
    /// # Returns
    /// * `Ok(Some(id))` - The changeset identifier
    /// * `Ok(None)` - Nothing differed from the server, no changeset created
    fn check_in(&self, comment: &str) -> Result<Option<String>>;
}

/// Splits a `$/`-rooted server path into its repository-relative form.
pub fn repository_path(server_path: &str) -> &str {
    server_path
        .strip_prefix("$/")
        .unwrap_or(server_path)
        .trim_start_matches('/')
}
