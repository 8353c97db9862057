use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Clone, Debug, Parser)]
#[command(name = "uvmirror", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    /// Configuration file. Defaults to ./uvmirror.toml when present.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "s", name = "sync", about = "Reconcile the bucket with upstream")]
    Sync(SyncArg),
    #[command(alias = "p", name = "plan", about = "Show what a sync would change, without writing")]
    Plan(PlanArg),
    #[command(name = "serve", about = "Serve the mounted bucket over HTTP")]
    Serve(ServeArg),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Target {
    /// Python interpreter builds
    Python,
    /// uv release assets
    Uv,
    /// Both, python first
    All,
}

impl Target {
    pub fn includes_python(self) -> bool { matches!(self, Self::Python | Self::All) }

    pub fn includes_uv(self) -> bool { matches!(self, Self::Uv | Self::All) }
}

#[derive(Clone, Debug, Args)]
pub struct SyncArg {
    #[arg(value_enum, default_value_t = Target::All)]
    pub target:      Target,
    /// Maximum transfers in flight. Overrides the configured value.
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,
}

#[derive(Clone, Debug, Args)]
pub struct PlanArg {
    #[arg(value_enum, default_value_t = Target::All)]
    pub target: Target,
}

#[derive(Clone, Debug, Args)]
pub struct ServeArg {
    #[arg(long)]
    pub listen: Option<SocketAddr>,
    /// Directory the bucket is mounted at.
    #[arg(long)]
    pub root:   Option<PathBuf>,
}
