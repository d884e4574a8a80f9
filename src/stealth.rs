//! User-agent and proxy pools for rotating browser identities

use rand::seq::SliceRandom;

pub const USER_AGENTS: [&str; 6] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.0.0",
];

/// Public proxies; short-lived, refresh from a proxy list before relying on them.
pub const FREE_PROXIES: [&str; 5] = [
    "http://190.61.88.147:8080",
    "http://138.128.91.65:8000",
    "http://51.81.82.175:3128",
    "http://103.167.68.25:8080",
    "http://64.225.8.132:9981",
];

/// Browser identity for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StealthProfile {
    pub user_agent: String,
    pub proxy: Option<String>,
}

impl StealthProfile {
    /// Fill whatever the operator did not pin from the pools.
    ///
    /// A pinned `proxy` wins over rotation; with neither, no proxy is used.
    pub fn resolve(user_agent: Option<String>, proxy: Option<String>, rotate_proxy: bool) -> Self {
        let user_agent = user_agent
            .filter(|ua| !ua.trim().is_empty())
            .unwrap_or_else(|| random_user_agent().to_string());
        let proxy = proxy
            .filter(|p| !p.trim().is_empty())
            .or_else(|| rotate_proxy.then(|| random_proxy().to_string()));

        Self { user_agent, proxy }
    }
}

pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

pub fn random_proxy() -> &'static str {
    FREE_PROXIES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FREE_PROXIES[0])
}
