//! Build record abstraction layer
//!
//! The running build exposes a number, a label and a drop location. The
//! stamping run rewrites the version embedded in each of them before
//! compilation starts, so the build shows the version it is producing.
//!
//! - [TomlBuildService]: build records kept as TOML files under the collection directory
//! - [MockBuildService]: in-memory record for tests

pub mod mock;
pub mod toml_store;

pub use mock::MockBuildService;
pub use toml_store::TomlBuildService;

use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::info;

use crate::error::Result;

/// The display fields of a build that carry its version.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct BuildRecord {
    pub number: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub drop_location: String,
}

/// Read/write access to the running build's record.
pub trait BuildService {
    /// Fetch the current record.
    fn load(&self) -> Result<BuildRecord>;

    /// Persist all fields of `record` in one call.
    fn save(&self, record: &BuildRecord) -> Result<()>;
}

fn four_part_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\d+\.\d+\.\d+\.\d+")
            .unwrap_or_else(|e| panic!("invalid four-part pattern: {}", e))
    })
}

/// Replaces the first four-part version in `field` with `new_version`.
///
/// Pure text substitution: a field without a four-part version is returned unchanged.
pub fn replace_first_version(field: &str, new_version: &str) -> String {
    four_part_pattern()
        .replace(field, NoExpand(new_version))
        .into_owned()
}

/// Rewrites the build number, label and drop location to `new_version` and saves once.
pub fn update_build_metadata<B>(service: &B, new_version: &str) -> Result<BuildRecord>
where
    B: BuildService + ?Sized,
{
    let current = service.load()?;

    let updated = BuildRecord {
        number: replace_first_version(&current.number, new_version),
        label: replace_first_version(&current.label, new_version),
        drop_location: replace_first_version(&current.drop_location, new_version),
    };

    service.save(&updated)?;
    info!(
        number = %updated.number,
        label = %updated.label,
        drop_location = %updated.drop_location,
        "updated build record"
    );

    Ok(updated)
}
