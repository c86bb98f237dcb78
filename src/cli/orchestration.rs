//! Main workflow orchestration logic
//!
//! Runs the stamping pipeline over injected build and source control
//! services, so the whole flow can be driven programmatically and tested
//! against mocks.

use std::path::PathBuf;
use tracing::info;

use crate::build::{update_build_metadata, BuildRecord, BuildService};
use crate::checkin::{check_in_files, workspace_name, CheckInContext, CheckInReport};
use crate::config::{CheckInConfig, FilePatterns};
use crate::domain::{StampOptions, WorkspaceMappings};
use crate::error::Result;
use crate::locator::locate_version;
use crate::rewriter::{apply_rewrites, plan_rewrites};
use crate::scm::SourceControl;
use crate::version::transform_version;
use crate::warning::StampWarning;

/// Everything one stamping run needs, resolved up front.
#[derive(Debug, Clone)]
pub struct StampRequest {
    /// Root of the source tree to scan
    pub sources_dir: PathBuf,
    /// Directory for the temporary workspace and files
    pub temp_dir: PathBuf,
    /// Identifier of the running build
    pub build_uri: String,
    pub options: StampOptions,
    pub patterns: FilePatterns,
    pub mappings: WorkspaceMappings,
    pub checkin: CheckInConfig,
    /// Report what would change without changing anything
    pub dry_run: bool,
}

/// Result of a run that found a version
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    pub old_version: String,
    pub new_version: String,
    /// The shared file the current version was read from
    pub version_source: PathBuf,
    /// The saved build record; `None` in dry-run mode
    pub build: Option<BuildRecord>,
    /// Files rewritten (or, in dry-run mode, that would be)
    pub rewritten: Vec<PathBuf>,
    /// `None` when check-in was disabled or in dry-run mode
    pub check_in: Option<CheckInReport>,
    pub warnings: Vec<StampWarning>,
    pub dry_run: bool,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum StampOutcome {
    /// No version declaration in the source tree; nothing was touched
    NoVersionFound,
    Stamped(WorkflowResult),
}

/// Main stamping workflow
///
/// 1. Locate the current version in the shared version file
/// 2. Compute the new version from the resolved options
/// 3. Rewrite the build number, label and drop location
/// 4. Rewrite every file carrying a version declaration
/// 5. Optionally check the rewritten files in
///
/// Stops before step 3 when no version is found. The source root and the
/// local mapping roots are made absolute first, so relative paths in either
/// still resolve files to their server paths.
pub fn run_stamp_workflow<B, S>(
    request: &StampRequest,
    build_service: &B,
    scm: &S,
) -> Result<StampOutcome>
where
    B: BuildService + ?Sized,
    S: SourceControl + ?Sized,
{
    let sources_dir = request.sources_dir.canonicalize()?;
    let Some(located) = locate_version(&sources_dir, &request.patterns.shared)? else {
        return Ok(StampOutcome::NoVersionFound);
    };

    let mut warnings = Vec::new();
    let old_version = located.version;

    let new_version = transform_version(&old_version, &request.options);
    info!(%old_version, %new_version, "computed new version");

    let planned = plan_rewrites(&sources_dir, &request.patterns, &new_version)?;
    if planned.is_empty() {
        warnings.push(StampWarning::NoFilesToRewrite);
    }
    let rewritten: Vec<PathBuf> = planned.iter().map(|file| file.path.clone()).collect();

    if request.dry_run {
        return Ok(StampOutcome::Stamped(WorkflowResult {
            old_version,
            new_version,
            version_source: located.path,
            build: None,
            rewritten,
            check_in: None,
            warnings,
            dry_run: true,
        }));
    }

    let build = update_build_metadata(build_service, &new_version)?;
    apply_rewrites(&planned)?;

    let check_in = if request.options.check_in {
        let context = CheckInContext {
            new_version: new_version.clone(),
            build: build.number.clone(),
            comment_template: request.checkin.comment.clone(),
            workspace_name: workspace_name(&request.checkin.workspace_prefix, &request.build_uri),
            temp_dir: request.temp_dir.clone(),
        };
        let mappings = request.mappings.anchored(&std::env::current_dir()?);
        let report = check_in_files(scm, &planned, &mappings, &context)?;
        warnings.extend(report.warnings.iter().cloned());
        Some(report)
    } else {
        info!("check-in disabled");
        None
    };

    Ok(StampOutcome::Stamped(WorkflowResult {
        old_version,
        new_version,
        version_source: located.path,
        build: Some(build),
        rewritten,
        check_in,
        warnings,
        dry_run: false,
    }))
}
