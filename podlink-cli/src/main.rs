mod config;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use config::ConfigMerger;
use podlink_core::adapters::{FsLibrarySource, FsWritePort};
use podlink_core::pipeline::{
    IntegrateRunOutcome, LibraryStatusReport, run_integrate, run_status, write_artifacts,
};
use podlink_core::FsProjectStore;
use podlink_core::settings::{IntegrateSettings, resolve};
use podlink_integrate::TargetState;
use podlink_render::{render_diagnostic_text, render_event_text};
use podlink_types::report::ToolInfo;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "podlink",
    version,
    about = "Links generated pod libraries into the targets of Xcode projects."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Integrate every library descriptor into its user project.
    Integrate(IntegrateArgs),
    /// Show which declared targets already link their library.
    Status(StatusArgs),
}

#[derive(Debug, Parser)]
struct IntegrateArgs {
    /// Project root that descriptor paths are relative to (default: current directory).
    #[arg(long, default_value = ".")]
    project_root: Utf8PathBuf,

    /// Directory containing library descriptors (default: <project_root>/Pods/Integration).
    #[arg(long)]
    descriptors_dir: Option<Utf8PathBuf>,

    /// Output directory for report artifacts (default: <project_root>/Pods/Integration/report).
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,

    /// Compute every change and write the patch, but leave projects untouched.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Exit with code 2 when any override warning is raised.
    #[arg(long, default_value_t = false)]
    fail_on_warnings: bool,
}

#[derive(Debug, Parser)]
struct StatusArgs {
    /// Project root that descriptor paths are relative to (default: current directory).
    #[arg(long, default_value = ".")]
    project_root: Utf8PathBuf,

    /// Directory containing library descriptors (default: <project_root>/Pods/Integration).
    #[arg(long)]
    descriptors_dir: Option<Utf8PathBuf>,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.cmd {
        Command::Integrate(args) => cmd_integrate(args),
        Command::Status(args) => cmd_status(args),
    };
    match result {
        Ok(code) => code,
        Err(e) => {
            debug!("{:?}", e);
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn cmd_integrate(args: IntegrateArgs) -> anyhow::Result<ExitCode> {
    let project_root = args.project_root;

    // Load config file and merge with CLI arguments
    let file_config = config::load_or_default(&project_root).context("load podlink.toml config")?;
    let merged = ConfigMerger::new(file_config).merge_integrate_args(
        args.descriptors_dir,
        args.out_dir,
        args.fail_on_warnings,
    );
    debug!(
        "merged config: descriptors_dir={}, out_dir={}, fail_on_warnings={}",
        merged.descriptors_dir, merged.out_dir, merged.fail_on_warnings
    );

    let settings = IntegrateSettings {
        project_root: project_root.clone(),
        descriptors_dir: merged.descriptors_dir,
        out_dir: merged.out_dir,
        dry_run: args.dry_run,
        fail_on_warnings: merged.fail_on_warnings,
    };
    let source = FsLibrarySource::new(settings.resolved_descriptors_dir());
    let store = FsProjectStore::new(project_root);

    let run = match run_integrate(&settings, &source, &store, tool_info()) {
        Ok(run) => run,
        Err(e) => {
            debug!("{:?}", e);
            eprintln!("error: {}", e);
            return Ok(ExitCode::from(e.exit_code()));
        }
    };

    print_run(&run);

    let out_dir = settings.resolved_out_dir();
    write_artifacts(&run, &out_dir, &FsWritePort).context("write report artifacts")?;
    info!("wrote report to {}", out_dir);

    if run.policy_block {
        eprintln!("error: override warnings raised and fail_on_warnings is set");
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

fn print_run(run: &IntegrateRunOutcome) {
    if run.outcomes.is_empty() {
        println!("No library descriptors found.");
        return;
    }
    for outcome in &run.outcomes {
        if outcome.is_noop() {
            println!("`{}` is already integrated", outcome.product_name);
        }
        for event in &outcome.events {
            print!("{}", render_event_text(event));
        }
        for diagnostic in &outcome.diagnostics {
            print!("\n{}", render_diagnostic_text(diagnostic));
        }
    }
    if run.report.run.dry_run {
        println!("Dry run: no project was saved.");
    }
}

fn cmd_status(args: StatusArgs) -> anyhow::Result<ExitCode> {
    let project_root = args.project_root;
    let file_config = config::load_or_default(&project_root).context("load podlink.toml config")?;
    let merged = ConfigMerger::new(file_config).merge_status_args(args.descriptors_dir);

    let source = FsLibrarySource::new(resolve(&project_root, &merged.descriptors_dir));
    let store = FsProjectStore::new(project_root);
    let statuses = match run_status(&source, &store) {
        Ok(statuses) => statuses,
        Err(e) => {
            debug!("{:?}", e);
            eprintln!("error: {}", e);
            return Ok(ExitCode::from(e.exit_code()));
        }
    };

    match args.format {
        OutputFormat::Text => print_status_text(&statuses),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&statuses)?),
    }
    Ok(ExitCode::SUCCESS)
}

fn print_status_text(statuses: &[LibraryStatusReport]) {
    if statuses.is_empty() {
        println!("No library descriptors found.");
        return;
    }
    for status in statuses {
        println!("{} ({})", status.product_name, status.project_path);
        for target in &status.targets {
            let state = match target.state {
                TargetState::Integrated => "integrated",
                TargetState::Pending => "pending",
                TargetState::Missing => "missing",
            };
            let name = target.name.as_deref().unwrap_or("<unknown>");
            println!("  {:<24} {:<11} {}", name, state, target.uuid);
        }
    }
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "podlink".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
        commit: None,
    }
}
