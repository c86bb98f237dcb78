//! User interface module - console output for build logs.
//!
//! The stamping run is unattended, so there are no prompts; everything here
//! is formatting.

pub mod formatter;

pub use formatter::{
    display_build_record, display_check_in_report, display_error, display_rewritten_files,
    display_status, display_success, display_version_change, display_warning,
};
