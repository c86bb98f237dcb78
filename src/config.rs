use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::domain::{WorkspaceMapping, WorkspaceMappings};
use crate::error::Result;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "versionstamp.toml";

/// Represents the complete configuration for version-stamp.
///
/// Contains the file name patterns to scan, check-in settings and the
/// local-to-server workspace mappings.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub files: FilesConfig,

    #[serde(default)]
    pub checkin: CheckInConfig,

    #[serde(default)]
    pub mappings: Vec<WorkspaceMapping>,
}

fn default_shared_pattern() -> String {
    "SharedAssemblyInfo.*".to_string()
}

fn default_project_pattern() -> String {
    "AssemblyInfo.*".to_string()
}

fn default_resource_pattern() -> String {
    "*.rc".to_string()
}

/// File name patterns for the files that carry version declarations.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FilesConfig {
    /// The shared version file the current version is read from.
    #[serde(default = "default_shared_pattern")]
    pub shared: String,

    /// Per-project metadata files.
    #[serde(default = "default_project_pattern")]
    pub project: String,

    /// Native resource scripts.
    #[serde(default = "default_resource_pattern")]
    pub resource: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        FilesConfig {
            shared: default_shared_pattern(),
            project: default_project_pattern(),
            resource: default_resource_pattern(),
        }
    }
}

fn default_comment() -> String {
    "Updated version to {version} for build {build} ***NO_CI***".to_string()
}

fn default_workspace_prefix() -> String {
    "VersionStamp".to_string()
}

fn default_author_name() -> String {
    "Build Server".to_string()
}

fn default_author_email() -> String {
    "build@localhost".to_string()
}

/// Settings for checking rewritten files back in.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CheckInConfig {
    /// Changeset comment; `{version}` and `{build}` are substituted.
    #[serde(default = "default_comment")]
    pub comment: String,

    /// Prefix of the temporary workspace name.
    #[serde(default = "default_workspace_prefix")]
    pub workspace_prefix: String,

    #[serde(default = "default_author_name")]
    pub author_name: String,

    #[serde(default = "default_author_email")]
    pub author_email: String,
}

impl Default for CheckInConfig {
    fn default() -> Self {
        CheckInConfig {
            comment: default_comment(),
            workspace_prefix: default_workspace_prefix(),
            author_name: default_author_name(),
            author_email: default_author_email(),
        }
    }
}

/// Compiled file name patterns.
#[derive(Debug, Clone)]
pub struct FilePatterns {
    pub shared: Pattern,
    pub project: Pattern,
    pub resource: Pattern,
}

impl FilePatterns {
    /// True when `file_name` matches any of the three patterns.
    pub fn matches_any(&self, file_name: &str) -> bool {
        self.shared.matches(file_name)
            || self.project.matches(file_name)
            || self.resource.matches(file_name)
    }
}

impl Default for FilePatterns {
    fn default() -> Self {
        FilesConfig::default()
            .compile()
            .unwrap_or_else(|e| panic!("default file patterns must compile: {}", e))
    }
}

impl FilesConfig {
    /// Compiles the configured glob patterns.
    pub fn compile(&self) -> Result<FilePatterns> {
        Ok(FilePatterns {
            shared: Pattern::new(&self.shared)?,
            project: Pattern::new(&self.project)?,
            resource: Pattern::new(&self.resource)?,
        })
    }
}

impl Config {
    /// Configured mappings plus any extra ones supplied at invocation.
    pub fn workspace_mappings(&self, extra: &[WorkspaceMapping]) -> WorkspaceMappings {
        let mut mappings = WorkspaceMappings::new(self.mappings.clone());
        for mapping in extra {
            mappings.push(mapping.clone());
        }
        mappings
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `versionstamp.toml` in current directory
/// 3. `.versionstamp.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        fs::read_to_string(CONFIG_FILE_NAME)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(format!(".{}", CONFIG_FILE_NAME));
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
}
