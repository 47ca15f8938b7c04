use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Desktop browser user agent sent with every outbound request.
///
/// Several sites serve a stripped or blocked page to non-browser clients, so
/// the default mimics a current Chrome build.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Third-party favicon-by-host service used as the last candidate.
pub const DEFAULT_PROXY_TEMPLATE: &str = "https://icons.duckduckgo.com/ip3/{host}.ico";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// YAML override table; `None` uses the built-in table.
    pub overrides_path: Option<PathBuf>,
    /// Base URL prepended to override icons given as bare file names.
    pub static_host: Option<String>,
    pub user_agent: String,
    pub page_timeout_ms: u64,
    pub manifest_timeout_ms: u64,
    pub icon_timeout_ms: u64,
    pub target_size: u16,
    /// `{host}` is replaced with the query host. `None` disables the proxy tier.
    pub proxy_template: Option<String>,
    pub cache_max_age_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            env: Environment::Development,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8787)),
            log_level: "info".to_string(),
            overrides_path: None,
            static_host: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            page_timeout_ms: 5000,
            manifest_timeout_ms: 2000,
            icon_timeout_ms: 2500,
            target_size: 144,
            proxy_template: Some(DEFAULT_PROXY_TEMPLATE.to_string()),
            cache_max_age_secs: 604_800,
        }
    }
}
