//! Checking rewritten files back in, one checkout/edit/check-in cycle per file.

use std::path::{Path, PathBuf};
use tracing::{info, info_span, warn};

use crate::domain::WorkspaceMappings;
use crate::error::{Result, StampError};
use crate::rewriter::RewrittenFile;
use crate::scm::{MappingGuard, SourceControl, TempFileGuard, WorkspaceGuard};
use crate::text::write_text;
use crate::warning::StampWarning;

/// What the check-in stage needs to know about the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInContext {
    pub new_version: String,
    /// Build number as shown on the build record
    pub build: String,
    /// Changeset comment template with `{version}` and `{build}` placeholders
    pub comment_template: String,
    /// Name of the temporary workspace
    pub workspace_name: String,
    /// Directory temporary files are placed in
    pub temp_dir: PathBuf,
}

impl CheckInContext {
    pub fn comment(&self) -> String {
        self.comment_template
            .replace("{version}", &self.new_version)
            .replace("{build}", &self.build)
    }
}

/// Outcome of the check-in stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckInReport {
    /// Changeset ids, in the order files were processed
    pub changesets: Vec<String>,
    /// Files checked in (or found unchanged on the server)
    pub checked_in: Vec<PathBuf>,
    /// Files left modified locally only
    pub skipped: Vec<PathBuf>,
    pub warnings: Vec<StampWarning>,
}

/// Builds a workspace name that is unique per build.
pub fn workspace_name(prefix: &str, build_uri: &str) -> String {
    let id: String = build_uri
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_{}", prefix, id.trim_matches('_'))
}

/// Checks every rewritten file in through `scm`.
///
/// Each file goes through its own map, get-latest + checkout, edit, check-in,
/// unmap and temp-file cleanup before the next one starts, so each file
/// becomes its own changeset. Files without a mapping are skipped with a
/// warning. The workspace is only created when at least one file is mapped,
/// and is deleted once all files are processed or as soon as an error aborts
/// the stage.
pub fn check_in_files<S>(
    scm: &S,
    files: &[RewrittenFile],
    mappings: &WorkspaceMappings,
    context: &CheckInContext,
) -> Result<CheckInReport>
where
    S: SourceControl + ?Sized,
{
    let mut report = CheckInReport::default();
    let comment = context.comment();

    let mut mapped = Vec::new();
    for file in files {
        match mappings.resolve(&file.path) {
            Some(server_path) => mapped.push((file, server_path)),
            None => {
                let warning = StampWarning::UnmappedFile {
                    path: file.path.clone(),
                };
                warn!("{}", warning);
                report.warnings.push(warning);
                report.skipped.push(file.path.clone());
            }
        }
    }

    if mapped.is_empty() {
        info!("no mapped files to check in");
        return Ok(report);
    }

    let _workspace = WorkspaceGuard::create(scm, &context.workspace_name)?;

    for (file, server_path) in mapped {
        let span = info_span!("check_in", server_path = %server_path);
        let _entered = span.enter();

        let changeset = check_in_one(scm, file, &server_path, &comment, &context.temp_dir)?;
        match &changeset {
            Some(id) => info!(changeset = %id, "checked in"),
            None => {
                let warning = StampWarning::NothingToCheckIn { server_path };
                info!("{}", warning);
                report.warnings.push(warning);
            }
        }

        report.changesets.extend(changeset);
        report.checked_in.push(file.path.clone());
    }

    Ok(report)
}

fn check_in_one<S>(
    scm: &S,
    file: &RewrittenFile,
    server_path: &str,
    comment: &str,
    temp_dir: &Path,
) -> Result<Option<String>>
where
    S: SourceControl + ?Sized,
{
    let file_name = file.path.file_name().ok_or_else(|| {
        StampError::source_control(format!("'{}' has no file name", file.path.display()))
    })?;
    let temp_file = TempFileGuard::new(temp_dir.join(file_name));

    // Declared after the temp file so it is released first.
    let _mapping = MappingGuard::map(scm, server_path, temp_file.path())?;
    scm.get_and_checkout(server_path)?;

    crate::rewriter::clear_readonly(temp_file.path())?;
    write_text(temp_file.path(), &file.content, file.encoding)?;

    scm.check_in(comment)
}
