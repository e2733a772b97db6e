use clap::Parser;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;
use txp_migrate::application::{migrate, MigrateOptions, MigrationReport};
use txp_migrate::cli::{format_report, Cli};
use txp_migrate::error::MigrateError;
use txp_migrate::infrastructure::MigrationConfig;

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.log_level().into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();

    match run(cli) {
        Ok(report) => {
            print!("{}", format_report(&report));
            std::process::exit(0)
        }
        Err(e) => {
            eprintln!("Error: {}", e.display_with_suggestions());
            std::process::exit(e.exit_code());
        }
    }
}

fn run(cli: Cli) -> Result<MigrationReport, MigrateError> {
    let config = MigrationConfig::load_or_default(cli.config.as_deref())?;

    let options = MigrateOptions {
        database: cli.database,
        source_dir: cli.source,
        output_dir: cli.output,
        config,
        dry_run: cli.dry_run,
    };

    migrate(&options)
}
