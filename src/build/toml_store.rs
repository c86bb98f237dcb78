use std::fs;
use std::path::{Path, PathBuf};

use crate::build::{BuildRecord, BuildService};
use crate::error::{Result, StampError};

/// Build records stored as `<collection>/builds/<build-id>.toml`.
pub struct TomlBuildService {
    path: PathBuf,
}

impl TomlBuildService {
    /// Use the record file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TomlBuildService { path: path.into() }
    }

    /// Locate the record for `build_uri` in the collection at `collection_uri`.
    ///
    /// The collection must be a local directory or a `file://` URI. The build
    /// id is the last path segment of the build URI, so
    /// `vstfs:///Build/Build/42` maps to `builds/42.toml`.
    pub fn for_build(collection_uri: &str, build_uri: &str) -> Result<Self> {
        let collection = collection_dir(collection_uri)?;
        let build_id = build_id(build_uri)?;
        Ok(Self::new(
            collection.join("builds").join(format!("{}.toml", build_id)),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn collection_dir(collection_uri: &str) -> Result<PathBuf> {
    if let Some(path) = collection_uri.strip_prefix("file://") {
        return Ok(PathBuf::from(path));
    }
    if collection_uri.contains("://") {
        return Err(StampError::build(format!(
            "Collection '{}' is not a local directory or file:// URI",
            collection_uri
        )));
    }
    Ok(PathBuf::from(collection_uri))
}

fn build_id(build_uri: &str) -> Result<&str> {
    build_uri
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty() && !id.contains(':'))
        .ok_or_else(|| StampError::build(format!("Cannot derive a build id from '{}'", build_uri)))
}

impl BuildService for TomlBuildService {
    fn load(&self) -> Result<BuildRecord> {
        let text = fs::read_to_string(&self.path).map_err(|e| {
            StampError::build(format!(
                "Cannot read build record '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(toml::from_str(&text)?)
    }

    fn save(&self, record: &BuildRecord) -> Result<()> {
        let text = toml::to_string_pretty(record)
            .map_err(|e| StampError::build(format!("Cannot serialise build record: {}", e)))?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}
