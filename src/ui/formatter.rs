//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic. Functions here print
//! and do nothing else. `console` drops the styling when output is not a
//! terminal, which keeps build logs clean.

use console::style;
use std::path::PathBuf;

use crate::build::BuildRecord;
use crate::checkin::CheckInReport;
use crate::warning::StampWarning;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a non-fatal warning.
pub fn display_warning(warning: &StampWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Display the version change.
///
/// Shows "From: old -> To: new", or notes that the version is unchanged.
pub fn display_version_change(old_version: &str, new_version: &str) {
    if old_version == new_version {
        println!("\n{}", style("Version unchanged:").bold());
        println!("  {}", style(new_version).green());
        return;
    }

    println!("\n{}", style("Version Change:").bold());
    println!("  From: {}", style(old_version).red());
    println!("  To:   {}", style(new_version).green());
}

/// Display the build record after it was saved.
pub fn display_build_record(record: &BuildRecord) {
    println!("\n{}", style("Build record:").bold());
    println!("  Number:        {}", record.number);
    println!("  Label:         {}", record.label);
    println!("  Drop location: {}", record.drop_location);
}

/// Display the files that were, or in dry-run mode would be, rewritten.
///
/// Shows up to 20 paths, then a count of the rest.
pub fn display_rewritten_files(files: &[PathBuf], dry_run: bool) {
    let heading = if dry_run {
        format!("Would rewrite {} file(s):", files.len())
    } else {
        format!("Rewrote {} file(s):", files.len())
    };
    println!("\n{}", style(heading).underlined());

    for path in files.iter().take(20) {
        println!("  - {}", path.display());
    }

    if files.len() > 20 {
        println!("  ... and {} more files", files.len() - 20);
    }
}

/// Display the check-in summary.
pub fn display_check_in_report(report: &CheckInReport) {
    println!("\n{}", style("Check-in:").bold());
    println!("  Checked in: {} file(s)", report.checked_in.len());
    if !report.changesets.is_empty() {
        println!("  Changesets: {}", report.changesets.join(", "));
    }
    if !report.skipped.is_empty() {
        println!("  Skipped:    {} file(s)", report.skipped.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_error() {
        // Visual verification test - output is printed to stderr
        display_error("test error");
    }

    #[test]
    fn test_display_version_change_unchanged() {
        display_version_change("1.2.3.4", "1.2.3.4");
    }

    #[test]
    fn test_display_rewritten_files_truncates() {
        let files: Vec<PathBuf> = (0..25).map(|i| PathBuf::from(format!("f{}.rc", i))).collect();
        display_rewritten_files(&files, true);
    }
}
