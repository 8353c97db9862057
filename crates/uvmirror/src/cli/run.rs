use anyhow::{Context, Result, bail};
use tracing::error;
use uvmirror::serve::serve;
use uvmirror::{Config, Mirror};
use uvmirror_fetch::{Fetcher, ReqwestClient};
use uvmirror_source::{GithubRelease, ManifestSource, PythonDownloads};
use uvmirror_store::S3Store;

use crate::cli::app::{App, Commands, Target};

type Production = Mirror<ReqwestClient, S3Store>;

pub async fn run(app: App) -> Result<()> {
    let mut config = Config::load(app.config.as_deref()).context("failed to load configuration")?;

    match app.cmd {
        Commands::Sync(arg) => {
            if let Some(concurrency) = arg.concurrency {
                config.concurrency = concurrency;
            }
            let mirror = connect(&config).await?;
            each_target(&mirror, &config, arg.target, false).await
        }
        Commands::Plan(arg) => {
            let mirror = connect(&config).await?;
            each_target(&mirror, &config, arg.target, true).await
        }
        Commands::Serve(arg) => {
            if let Some(listen) = arg.listen {
                config.serve.listen = listen.to_string();
            }
            if let Some(root) = arg.root {
                config.serve.root = root;
            }
            serve(&config.serve).await.context("server failed")
        }
    }
}

async fn connect(config: &Config) -> Result<Production> {
    let client = ReqwestClient::new(&config.http).context("failed to build HTTP client")?;
    let store = S3Store::connect(&config.storage)
        .await
        .context("failed to configure bucket client")?;
    Ok(Mirror::new(Fetcher::new(client), store).with_concurrency(config.concurrency))
}

/// Run every selected source. A source that aborts does not stop the next
/// one, but makes the whole command fail.
async fn each_target(mirror: &Production, config: &Config, target: Target, dry_run: bool) -> Result<()> {
    let mut aborted = Vec::new();

    if target.includes_python() {
        let source = PythonDownloads::new(&config.python).context("invalid python source configuration")?;
        if let Err(e) = execute(mirror, &source, dry_run).await {
            error!(source = source.name(), "{e:#}");
            aborted.push(source.name().to_string());
        }
    }

    if target.includes_uv() {
        let source = GithubRelease::new(config.uv.clone()).context("invalid uv source configuration")?;
        if let Err(e) = execute(mirror, &source, dry_run).await {
            error!(source = source.name(), "{e:#}");
            aborted.push(source.name().to_string());
        }
    }

    if !aborted.is_empty() {
        bail!("run aborted for: {}", aborted.join(", "));
    }
    Ok(())
}

async fn execute<M: ManifestSource>(mirror: &Production, source: &M, dry_run: bool) -> Result<()> {
    if dry_run {
        let plan = mirror.plan(source).await?;
        print!("{plan}");
    } else {
        let report = mirror.run(source).await?;
        print!("{report}");
    }
    Ok(())
}
