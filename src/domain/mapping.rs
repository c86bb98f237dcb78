use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use crate::error::StampError;

/// Pairs a local directory with the server folder it is checked out from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WorkspaceMapping {
    pub local: PathBuf,
    pub server: String,
}

impl WorkspaceMapping {
    pub fn new(local: impl Into<PathBuf>, server: impl Into<String>) -> Self {
        WorkspaceMapping {
            local: local.into(),
            server: server.into(),
        }
    }

    /// Server path for `path` when it lies under this mapping's local root.
    pub fn server_path_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.local).ok()?;

        let mut server = self.server.trim_end_matches('/').to_string();
        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    server.push('/');
                    server.push_str(&part.to_string_lossy());
                }
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(server)
    }

    /// This mapping with its local root made absolute against `base` and
    /// canonicalised when it exists.
    pub fn anchored(&self, base: &Path) -> WorkspaceMapping {
        let joined = base.join(&self.local);
        let local = joined.canonicalize().unwrap_or(joined);
        WorkspaceMapping {
            local,
            server: self.server.clone(),
        }
    }

    fn depth(&self) -> usize {
        self.local.components().count()
    }
}

/// Parses the `LOCAL=SERVER` form accepted on the command line.
impl FromStr for WorkspaceMapping {
    type Err = StampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (local, server) = s.split_once('=').ok_or_else(|| {
            StampError::config(format!("Mapping '{}' must have the form LOCAL=SERVER", s))
        })?;

        let local = local.trim();
        let server = server.trim();
        if local.is_empty() || server.is_empty() {
            return Err(StampError::config(format!(
                "Mapping '{}' has an empty local or server side",
                s
            )));
        }

        Ok(WorkspaceMapping::new(local, server))
    }
}

/// The set of mappings a run may check files in through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceMappings {
    mappings: Vec<WorkspaceMapping>,
}

impl WorkspaceMappings {
    pub fn new(mappings: Vec<WorkspaceMapping>) -> Self {
        WorkspaceMappings { mappings }
    }

    pub fn push(&mut self, mapping: WorkspaceMapping) {
        self.mappings.push(mapping);
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// All mappings anchored at `base`, so they compare equal to canonical file paths.
    pub fn anchored(&self, base: &Path) -> WorkspaceMappings {
        WorkspaceMappings::new(self.mappings.iter().map(|m| m.anchored(base)).collect())
    }

    /// Resolves a local file to its server path.
    ///
    /// When several local roots contain the file, the deepest one wins.
    /// Matching is per path component, so `/src2/a.cs` is not under `/src`.
    pub fn resolve(&self, path: &Path) -> Option<String> {
        self.mappings
            .iter()
            .filter_map(|mapping| {
                mapping
                    .server_path_for(path)
                    .map(|server| (mapping.depth(), server))
            })
            .max_by_key(|(depth, _)| *depth)
            .map(|(_, server)| server)
    }
}

impl From<Vec<WorkspaceMapping>> for WorkspaceMappings {
    fn from(mappings: Vec<WorkspaceMapping>) -> Self {
        WorkspaceMappings::new(mappings)
    }
}
