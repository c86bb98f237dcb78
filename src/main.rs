use anyhow::Result;
use clap::Parser;

use version_stamp::build::TomlBuildService;
use version_stamp::cli::orchestration::{run_stamp_workflow, StampOutcome, StampRequest};
use version_stamp::config;
use version_stamp::domain::{RequestedFlags, StampOptions, WorkspaceMapping};
use version_stamp::environment::BuildEnvironment;
use version_stamp::logging;
use version_stamp::scm::GitSourceControl;
use version_stamp::ui;

#[derive(clap::Parser)]
#[command(
    name = "version-stamp",
    version,
    about = "Stamp the shared version number into source files before a build"
)]
struct Args {
    #[arg(
        long,
        alias = "DoNotIncrement",
        help = "Keep the current version and skip check-in"
    )]
    do_not_increment: bool,

    #[arg(
        long,
        alias = "IncrementBuildNumber",
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Increment the build component (on unless only the revision is requested)"
    )]
    increment_build_number: Option<bool>,

    #[arg(
        long,
        alias = "IncrementRevisionNumber",
        help = "Increment the revision component"
    )]
    increment_revision_number: bool,

    #[arg(
        long,
        alias = "DoNotCheckIn",
        help = "Rewrite files locally without checking them in"
    )]
    do_not_check_in: bool,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(
        long = "map",
        value_name = "LOCAL=SERVER",
        help = "Map a local directory to a server folder (repeatable)"
    )]
    mappings: Vec<WorkspaceMapping>,

    #[arg(long, help = "Preview what would happen without making changes")]
    dry_run: bool,

    #[arg(short, long, help = "Enable debug logging")]
    verbose: bool,
}

impl Args {
    fn requested_flags(&self) -> RequestedFlags {
        RequestedFlags {
            do_not_increment: self.do_not_increment,
            increment_build_number: self.increment_build_number,
            increment_revision_number: self.increment_revision_number,
            do_not_check_in: self.do_not_check_in,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::initialize_logging(args.verbose);

    let env = match BuildEnvironment::from_env() {
        Ok(env) => env,
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    };

    let config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };

    let patterns = match config.files.compile() {
        Ok(patterns) => patterns,
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    };

    let build_service = match TomlBuildService::for_build(&env.collection_uri, &env.build_uri) {
        Ok(service) => service,
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    };

    let scm = GitSourceControl::new(env.collection_uri.clone(), env.temp_dir.clone())
        .with_author(
            config.checkin.author_name.clone(),
            config.checkin.author_email.clone(),
        );

    let options = StampOptions::resolve(&args.requested_flags());
    let request = StampRequest {
        sources_dir: env.sources_dir.clone(),
        temp_dir: env.temp_dir.clone(),
        build_uri: env.build_uri.clone(),
        options,
        patterns,
        mappings: config.workspace_mappings(&args.mappings),
        checkin: config.checkin.clone(),
        dry_run: args.dry_run,
    };

    ui::display_status(&format!(
        "Looking for the version in {}",
        env.sources_dir.display()
    ));

    let result = match run_stamp_workflow(&request, &build_service, &scm) {
        Ok(StampOutcome::NoVersionFound) => {
            ui::display_error(&format!(
                "No version number found under {}; nothing was changed",
                env.sources_dir.display()
            ));
            return Ok(());
        }
        Ok(StampOutcome::Stamped(result)) => result,
        Err(e) => {
            ui::display_error(&format!("Version stamping failed: {}", e));
            std::process::exit(1);
        }
    };

    ui::display_version_change(&result.old_version, &result.new_version);
    if let Some(record) = &result.build {
        ui::display_build_record(record);
    }
    ui::display_rewritten_files(&result.rewritten, result.dry_run);
    if let Some(report) = &result.check_in {
        ui::display_check_in_report(report);
    }
    for warning in &result.warnings {
        ui::display_warning(warning);
    }

    if result.dry_run {
        ui::display_status("Dry run: no files, build record or source control were changed");
    } else {
        println!();
        ui::display_success(&format!("Stamped version {}", result.new_version));
    }

    Ok(())
}
