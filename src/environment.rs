use std::path::PathBuf;

use crate::error::{Result, StampError};

pub const SOURCES_DIRECTORY_VAR: &str = "TF_BUILD_SOURCESDIRECTORY";
pub const BUILD_URI_VAR: &str = "TF_BUILD_BUILDURI";
pub const COLLECTION_URI_VAR: &str = "TF_BUILD_COLLECTIONURI";
pub const TEMP_DIRECTORY_VAR: &str = "TEMP";

/// Values the build agent hands to the pre-build step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEnvironment {
    /// Root of the checked-out source tree.
    pub sources_dir: PathBuf,
    /// Identifier of the running build.
    pub build_uri: String,
    /// Address of the server holding builds and source control.
    pub collection_uri: String,
    /// Scratch directory for the temporary workspace.
    pub temp_dir: PathBuf,
}

impl BuildEnvironment {
    /// Reads the required variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the required variables through `lookup`.
    ///
    /// Empty values count as missing. The sources directory must exist and is
    /// returned as a canonical absolute path.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| -> Result<String> {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| {
                    StampError::environment(format!(
                        "Required environment variable {} is not set",
                        name
                    ))
                })
        };

        let sources_value = PathBuf::from(require(SOURCES_DIRECTORY_VAR)?);
        let build_uri = require(BUILD_URI_VAR)?;
        let collection_uri = require(COLLECTION_URI_VAR)?;
        let temp_dir = PathBuf::from(require(TEMP_DIRECTORY_VAR)?);

        if !sources_value.is_dir() {
            return Err(StampError::environment(format!(
                "{} points to '{}', which is not a directory",
                SOURCES_DIRECTORY_VAR,
                sources_value.display()
            )));
        }
        let sources_dir = sources_value.canonicalize().map_err(|e| {
            StampError::environment(format!(
                "Cannot resolve {} '{}': {}",
                SOURCES_DIRECTORY_VAR,
                sources_value.display(),
                e
            ))
        })?;

        Ok(BuildEnvironment {
            sources_dir,
            build_uri,
            collection_uri,
            temp_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: HashMap<&'static str, String>) -> impl Fn(&str) -> Option<String> {
        move |name: &str| vars.get(name).cloned()
    }

    fn full_vars(sources: &str) -> HashMap<&'static str, String> {
        let mut vars = HashMap::new();
        vars.insert(SOURCES_DIRECTORY_VAR, sources.to_string());
        vars.insert(BUILD_URI_VAR, "vstfs:///Build/Build/42".to_string());
        vars.insert(COLLECTION_URI_VAR, "https://tfs.example.com/tfs/Default".to_string());
        vars.insert(TEMP_DIRECTORY_VAR, "/tmp".to_string());
        vars
    }

    #[test]
    fn test_all_variables_present() {
        let dir = tempfile::tempdir().unwrap();
        let sources = dir.path().to_str().unwrap();
        let env = BuildEnvironment::from_lookup(lookup_from(full_vars(sources))).unwrap();
        assert_eq!(env.sources_dir, dir.path().canonicalize().unwrap());
        assert_eq!(env.build_uri, "vstfs:///Build/Build/42");
        assert_eq!(env.temp_dir, PathBuf::from("/tmp"));
    }

    #[test]
    fn test_each_missing_variable_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let sources = dir.path().to_str().unwrap();

        for name in [
            SOURCES_DIRECTORY_VAR,
            BUILD_URI_VAR,
            COLLECTION_URI_VAR,
            TEMP_DIRECTORY_VAR,
        ] {
            let mut vars = full_vars(sources);
            vars.remove(name);
            let err = BuildEnvironment::from_lookup(lookup_from(vars)).unwrap_err();
            assert!(err.to_string().contains(name), "got: {}", err);
        }
    }

    #[test]
    fn test_empty_variable_counts_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut vars = full_vars(dir.path().to_str().unwrap());
        vars.insert(BUILD_URI_VAR, "  ".to_string());
        assert!(BuildEnvironment::from_lookup(lookup_from(vars)).is_err());
    }

    #[test]
    fn test_sources_directory_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let vars = full_vars(missing.to_str().unwrap());
        let err = BuildEnvironment::from_lookup(lookup_from(vars)).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    #[serial_test::serial]
    fn test_relative_sources_directory_is_made_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();

        let result = BuildEnvironment::from_lookup(lookup_from(full_vars(".")));

        std::env::set_current_dir(original_dir).unwrap();
        let env = result.unwrap();
        assert!(env.sources_dir.is_absolute());
        assert_eq!(env.sources_dir, dir.path().canonicalize().unwrap());
    }
}
