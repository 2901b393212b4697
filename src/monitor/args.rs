use std::path::PathBuf;

use clap::Parser;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(
    name = "session-sentinel",
    version,
    about = "Keeps a storefront session alive while you work and logs you out on inactivity"
)]
pub struct SentinelArgs {
    /// Base URL of the storefront server.
    #[arg(long, default_value = "http://localhost:5000")]
    pub base_url: String,
    /// CSRF token the server embeds in its pages.
    #[arg(long, default_value = "")]
    pub csrf_token: String,
    /// Run as an unauthenticated page would: skip the monitor entirely.
    #[arg(long)]
    pub unauthenticated: bool,
    /// Override the inactivity timeout, in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
    /// Override the server poll period, in seconds.
    #[arg(long)]
    pub poll_secs: Option<u64>,
    /// Directory for logs. By default tries $XDG_STATE_HOME or $HOME/.local/state
    #[arg(long)]
    pub dir: Option<PathBuf>,
    /// This option is for debugging purposes only.
    #[arg(long = "log-console")]
    pub log_console: bool,
    #[arg(long = "log-filter")]
    pub log: Option<LevelFilter>,
}
