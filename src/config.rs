//! Command-line and environment configuration

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::session::SessionConfig;
use crate::stealth::StealthProfile;
use crate::targets::DEFAULT_BASE_URL;
use crate::traits::{LaunchOptions, SiteSelectors};

/// Scrape upcoming fixtures and odds from OddsPortal into CSV and JSON
#[derive(Debug, Clone, Parser)]
#[command(name = "odds-scout", version)]
pub struct Settings {
    /// Root directory for per-sport and consolidated output
    #[arg(long, env = "ODDS_OUTPUT_DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Site root the target URLs are built from
    #[arg(long, env = "ODDS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Browser user agent; a random one from the pool when unset
    #[arg(long, env = "ODDS_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Proxy as scheme://host:port
    #[arg(long, env = "ODDS_PROXY")]
    pub proxy: Option<String>,

    /// Pick a proxy from the built-in pool when --proxy is not given
    #[arg(long, env = "ODDS_ROTATE_PROXY")]
    pub rotate_proxy: bool,

    /// Only scrape these sport keys (e.g. nfl,tennis)
    #[arg(long, env = "ODDS_SPORTS", value_delimiter = ',')]
    pub sports: Vec<String>,

    /// Targets scraped at the same time (1 to 5)
    #[arg(long, env = "ODDS_CONCURRENCY", default_value_t = 1)]
    pub concurrency: usize,

    #[arg(long, env = "ODDS_NAV_TIMEOUT_SECS", default_value_t = 60)]
    pub nav_timeout_secs: u64,

    /// Fixed wait after navigation for the page to render
    #[arg(long, env = "ODDS_SETTLE_SECS", default_value_t = 5)]
    pub settle_secs: u64,

    #[arg(long, env = "ODDS_READY_TIMEOUT_SECS", default_value_t = 30)]
    pub ready_timeout_secs: u64,

    /// Wall-clock limit for a whole run
    #[arg(long, env = "ODDS_RUN_TIMEOUT_SECS", default_value_t = 600)]
    pub run_timeout_secs: u64,

    /// Show the browser window
    #[arg(long, env = "ODDS_HEADED")]
    pub headed: bool,

    /// Scrape saved <sport>.html files from this directory instead of the live site
    #[arg(long, env = "ODDS_REPLAY_DIR")]
    pub replay: Option<PathBuf>,

    /// Cron expression (with seconds) for repeated runs, e.g. "0 0 6 * * *"
    #[arg(long, env = "ODDS_SCHEDULE")]
    pub schedule: Option<String>,

    #[arg(long, env = "DISCORD_WEBHOOK_URL", hide_env_values = true)]
    pub discord_webhook: Option<String>,
}

impl Settings {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            output_root: self.output_dir.clone(),
            selectors: SiteSelectors::default(),
            navigation_timeout: Duration::from_secs(self.nav_timeout_secs),
            settle_delay: Duration::from_secs(self.settle_secs),
            ready_timeout: Duration::from_secs(self.ready_timeout_secs),
            ..SessionConfig::default()
        }
    }

    /// Launch options for a run, resolving user agent and proxy from the pools
    /// where not pinned. Call once per run so rotation happens between runs.
    pub fn launch_options(&self) -> LaunchOptions {
        let profile =
            StealthProfile::resolve(self.user_agent.clone(), self.proxy.clone(), self.rotate_proxy);
        LaunchOptions {
            user_agent: profile.user_agent,
            proxy: profile.proxy,
            headless: !self.headed,
            request_timeout: Duration::from_secs(self.nav_timeout_secs),
        }
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }
}
