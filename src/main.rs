use std::process::ExitCode;

use anyhow::Result;

use gitport::bitbucket_provider::BitbucketProvider;
use gitport::cli;
use gitport::coordinator::Coordinator;
use gitport::gitlab_provider::GitlabProvider;

/// Exit code when the run finished but some repositories failed.
const PARTIAL_FAILURE: u8 = 2;

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();

    let config = cli::run()?;
    tracing::info!(
        version = %config.version,
        dry_run = config.migration.dry_run,
        "starting migration"
    );

    let source = BitbucketProvider::new(
        config.source.base_url.clone(),
        config.source.username.as_str(),
        config.source.access_token.as_str(),
    )?;
    let target = GitlabProvider::new(
        config.target.base_url.clone(),
        config.target.access_token.as_str(),
    )?;

    let report = Coordinator::new(&source, &target, &config.migration)
        .run()
        .await?;
    report.log_summary();

    if report.has_failures() {
        return Ok(ExitCode::from(PARTIAL_FAILURE));
    }

    Ok(ExitCode::SUCCESS)
}
