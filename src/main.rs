use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use snapback::catalog::Catalog;
use snapback::config::Settings;
use snapback::engine::{
    BackupEngine, FreeSpaceProbe, ResticEngine, SshFreeSpaceProbe, UnknownFreeSpaceProbe,
};
use snapback::notify::notify_run_complete;
use snapback::run::{run_groups, FileMetricsSink};
use snapback::secrets::SecretStore;

#[derive(Parser)]
#[command(
    name = "snapback",
    author = "Kaylee Beyene",
    version,
    about = "Group-oriented backup orchestrator for restic repositories",
    long_about = "snapback drives periodic multi-target backups against a single \
                  restic repository. Paths are grouped into named backup groups, \
                  each with its own retention policy; groups are processed \
                  sequentially and one failing group never aborts the rest of \
                  the run."
)]
struct Cli {
    /// Restrict the run to groups with this exact name (default: all groups)
    group: Option<String>,

    /// Path to the config file (default: $SNAPBACK_CONFIG, then
    /// ~/.config/snapback/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip the post-run repository integrity check
    #[arg(long)]
    no_check: bool,
}

fn main() {
    init_tracing();

    let cli = Cli::parse();

    match run(cli) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

/// Configure log output: timestamped lines to stderr, level from SNAPBACK_LOG
fn init_tracing() {
    let filter = EnvFilter::try_from_env("SNAPBACK_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Drive one full run; errors returned here are fatal preconditions
fn run(cli: Cli) -> Result<i32> {
    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::load_default()?,
    };

    // Catalog and filter problems abort before anything touches the
    // secret store or the repository.
    let catalog = Catalog::parse(settings.catalog_value()?)?;
    let groups = catalog.filtered(cli.group.as_deref())?;

    let store = SecretStore::new(settings.vault_binary.as_str(), settings.secret_store.clone());
    let passphrase = store.fetch_passphrase()?;

    let engine = ResticEngine::new(
        settings.engine_binary.as_str(),
        settings.repository.as_str(),
        passphrase,
    );

    let probe: Box<dyn FreeSpaceProbe> = match &settings.free_space {
        Some(target) => Box::new(SshFreeSpaceProbe::new(target.host.as_str(), target.path.as_str())),
        None => Box::new(UnknownFreeSpaceProbe),
    };

    let mut metrics = FileMetricsSink::new(settings.metrics_file.clone());

    info!(
        "Starting backup run: {} group(s) against {}",
        groups.len(),
        settings.repository
    );

    let report = run_groups(&groups, &engine, probe.as_ref(), &mut metrics);

    let summary = &report.summary;
    info!(
        "Run complete: {} total, {} succeeded, {} failed, {} skipped, {}s",
        summary.total,
        summary.succeeded,
        summary.failed,
        summary.skipped,
        summary.total_duration.as_secs()
    );

    notify_run_complete(&settings.syslog_tag, summary);

    // Best-effort integrity check; never changes the exit code.
    if settings.run_check && !cli.no_check {
        info!(
            "Checking repository integrity (reading {} of pack data)",
            settings.check_data_subset
        );
        let check = engine.check(&settings.check_data_subset);
        if check.ok {
            info!("Repository integrity check passed");
        } else {
            warn!(
                "Repository integrity check failed: {}",
                check.output.trim()
            );
        }
    }

    Ok(summary.exit_code())
}
