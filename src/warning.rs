use std::fmt;
use std::path::PathBuf;

/// Non-fatal issues met while stamping. These are reported to the user and
/// processing continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StampWarning {
    /// A rewritten file lies under no workspace mapping, so it stays modified locally only
    UnmappedFile { path: PathBuf },
    /// The server already holds the new content for this item
    NothingToCheckIn { server_path: String },
    /// No file matched the rewrite patterns
    NoFilesToRewrite,
}

impl fmt::Display for StampWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StampWarning::UnmappedFile { path } => write!(
                f,
                "'{}' is not under any workspace mapping; not checking it in",
                path.display()
            ),
            StampWarning::NothingToCheckIn { server_path } => {
                write!(f, "No changes to check in for '{}'", server_path)
            }
            StampWarning::NoFilesToRewrite => {
                write!(f, "No files with version declarations were found to rewrite")
            }
        }
    }
}
