use std::fs::create_dir_all;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::error;
use structured_logger::json::new_writer;
use structured_logger::Builder;

use osm_wrangle::config::{load_user_config, UserConfig};
use osm_wrangle::errors::{Error, Result};
use osm_wrangle::etl::audit::AuditEtl;
use osm_wrangle::etl::tabulate::TabulateEtl;
use osm_wrangle::etl::Etl;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Stage {
    All,
    Tabulate,
    Audit,
}

/// Clean an OSM XML export into nodes/ways/tags tables and audit its tagging.
#[derive(Debug, Parser)]
#[command(name = "osm-wrangle", version)]
struct Cli {
    /// JSON configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// OSM document to read (`.osm` or `.osm.xz`), overriding `data_path`.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output root, overriding `dest_path`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Which stages to run.
    #[arg(long, value_enum, default_value_t = Stage::All)]
    stage: Stage,

    /// Re-run stages even if their outputs already exist.
    #[arg(long)]
    force: bool,
}

fn create_output_dir(config: &UserConfig) -> Result<PathBuf> {
    let input_fname = config
        .data_path
        .file_name()
        .ok_or_else(|| Error::config("Could not get input file name"))?;
    let output_dir = config.dest_path.join(input_fname);
    create_dir_all(&output_dir)?;
    Ok(output_dir)
}

fn setup_logging(level: &str) {
    Builder::with_level(level)
        .with_target_writer("*", new_writer(io::stdout()))
        .init();
}

fn run_stage<E: Etl>(etl: &mut E, dir: &Path, force: bool) -> Result<()> {
    if force {
        etl.clean(dir)?;
    }
    etl.process(dir)
}

fn run(cli: &Cli, config: &UserConfig) -> Result<()> {
    let output_dir = create_output_dir(config)?;

    if matches!(cli.stage, Stage::All | Stage::Tabulate) {
        run_stage(&mut TabulateEtl::new(config), &output_dir, cli.force)?;
    }
    if matches!(cli.stage, Stage::All | Stage::Audit) {
        run_stage(&mut AuditEtl::new(config), &output_dir, cli.force)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut user_config = match &cli.config {
        Some(path) => match load_user_config(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("{err}");
                return ExitCode::FAILURE;
            }
        },
        None => UserConfig::default(),
    };
    if let Some(input) = &cli.input {
        user_config.data_path = input.clone();
    }
    if let Some(output) = &cli.output {
        user_config.dest_path = output.clone();
    }

    setup_logging(&user_config.log_level);

    match run(&cli, &user_config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(err = err.to_string(); "Run failed");
            ExitCode::FAILURE
        }
    }
}
