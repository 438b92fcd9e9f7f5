use std::path::PathBuf;

use clap::Parser;

/// School records sidecar. Reads one JSON request per line on stdin and
/// writes one JSON response per line on stdout.
#[derive(Debug, Clone, Parser)]
#[command(name = "schooldeskd", version)]
pub struct Config {
    /// Open this workspace directory at startup instead of the in-memory store.
    #[arg(long, env = "SCHOOLDESK_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Start the in-memory store empty instead of loading demo records.
    #[arg(long, env = "SCHOOLDESK_NO_SEED")]
    pub no_seed: bool,

    /// Rows per page when a request does not specify one.
    #[arg(long, env = "SCHOOLDESK_PAGE_SIZE", default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..=500))]
    pub page_size: u64,

    /// Open table views kept at once; the least recently used is dropped beyond this.
    #[arg(long, env = "SCHOOLDESK_MAX_VIEWS", default_value_t = 32, value_parser = clap::value_parser!(u64).range(1..=1000))]
    pub max_views: u64,

    /// Log filter directives, e.g. `info` or `schooldeskd=debug`. Logs go to stderr.
    #[arg(long = "log", env = "SCHOOLDESK_LOG", default_value = "info")]
    pub log_filter: String,
}

impl Config {
    pub fn default_page_size(&self) -> usize {
        self.page_size as usize
    }

    pub fn max_views(&self) -> usize {
        self.max_views as usize
    }
}
