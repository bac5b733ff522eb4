use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use appveyor_triage::appveyor::AppVeyorClient;
use appveyor_triage::sink::{FileSink, ReportSink, StdoutSink};
use appveyor_triage::source::{AppVeyorSource, FileSource, LogSource};
use appveyor_triage::{run, ReportFormat, TriageConfig};
use clap::Parser;
use tracing::{info, warn};
use triage::Pipeline;

/// Summarize the MSVC warnings and errors of an AppVeyor build log
#[derive(Parser, Debug)]
#[command(name = "appveyor-triage", version, about)]
struct Args {
    /// Saved console feed to triage instead of fetching from AppVeyor
    log_file: Option<PathBuf>,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// AppVeyor account name
    #[arg(long)]
    account: Option<String>,

    /// AppVeyor project slug
    #[arg(long)]
    project: Option<String>,

    /// Report format
    #[arg(long, value_enum)]
    format: Option<ReportFormat>,

    /// Directory to write the report into
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print the report instead of writing a file
    #[arg(long)]
    stdout: bool,

    /// Exit with status 2 when the build has errors
    #[arg(long)]
    fail_on_errors: bool,
}

impl Args {
    fn apply(&self, config: &mut TriageConfig) {
        if let Some(account) = &self.account {
            config.account = Some(account.clone());
        }
        if let Some(project) = &self.project {
            config.project = Some(project.clone());
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr so `--stdout` output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = TriageConfig::load(args.config.as_deref())?;
    args.apply(&mut config);

    let source: Box<dyn LogSource> = match &args.log_file {
        Some(path) => Box::new(FileSource::new(path)),
        None => {
            let (account, project) = config.project_slug()?;
            let client =
                AppVeyorClient::new(&config.api_url, config.token.clone(), config.http_timeout())?;
            Box::new(AppVeyorSource::new(client, account, project))
        }
    };
    let sink: Box<dyn ReportSink> = if args.stdout {
        Box::new(StdoutSink)
    } else {
        Box::new(FileSink::new(&config.output_dir))
    };

    let result = run(source.as_ref(), sink.as_ref(), &Pipeline::default(), config.format).await?;

    let summary = &result.outcome.summary;
    info!(
        build = %result.build_id,
        warning_codes = summary.warnings.len(),
        error_codes = summary.errors.len(),
        "triage complete"
    );

    if args.fail_on_errors && result.has_errors() {
        warn!(
            error_locations = summary.errors.location_count(),
            "build has errors"
        );
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}
