use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_TRACK_HOST: &str = "https://api.mixpanel.com";
pub const DEFAULT_ENGAGE_HOST: &str = "https://api.mixpanel.com";
pub const DEFAULT_EXPORT_HOST: &str = "https://data.mixpanel.com";
pub const DEFAULT_QUERY_HOST: &str = "https://mixpanel.com";

/// Base URLs for every API surface the clients talk to.
///
/// Hosts carry no trailing slash; paths are appended by the clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Ingestion host for `/track`
    pub track_host: String,
    /// Ingestion host for `/engage` profile updates
    pub engage_host: String,
    /// Raw data export host for `/api/2.0/export`
    pub export_host: String,
    /// Query API host for `/api/2.0/engage`
    pub query_host: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            track_host: DEFAULT_TRACK_HOST.to_string(),
            engage_host: DEFAULT_ENGAGE_HOST.to_string(),
            export_host: DEFAULT_EXPORT_HOST.to_string(),
            query_host: DEFAULT_QUERY_HOST.to_string(),
        }
    }
}

impl Endpoints {
    /// Point every surface at a single base URL (mock servers, proxies)
    pub fn single_host(host: &str) -> Self {
        let host = host.trim_end_matches('/').to_string();
        Self {
            track_host: host.clone(),
            engage_host: host.clone(),
            export_host: host.clone(),
            query_host: host,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub user_agent: String,
    #[serde(default = "HttpConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl HttpConfig {
    const fn default_timeout_secs() -> u64 {
        30
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("mixpanel-rs/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

/// Settings for the command line tool, read from `MIXPANEL_*` variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_secret: Option<String>,
    #[serde(default)]
    pub track_host: Option<String>,
    #[serde(default)]
    pub engage_host: Option<String>,
    #[serde(default)]
    pub export_host: Option<String>,
    #[serde(default)]
    pub query_host: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        ::config::Config::builder()
            .add_source(::config::Environment::with_prefix("MIXPANEL"))
            .build()
            .context("failed to read MIXPANEL_* environment")?
            .try_deserialize()
            .context("invalid MIXPANEL_* settings")
    }

    pub fn endpoints(&self) -> Endpoints {
        let defaults = Endpoints::default();
        let pick = |value: &Option<String>, fallback: String| {
            value
                .as_deref()
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(fallback)
        };

        Endpoints {
            track_host: pick(&self.track_host, defaults.track_host),
            engage_host: pick(&self.engage_host, defaults.engage_host),
            export_host: pick(&self.export_host, defaults.export_host),
            query_host: pick(&self.query_host, defaults.query_host),
        }
    }

    pub fn http(&self) -> HttpConfig {
        let mut http = HttpConfig::default();
        if let Some(secs) = self.timeout_secs {
            http.timeout_secs = secs;
        }
        http
    }

    pub fn token(&self) -> anyhow::Result<&str> {
        self.token
            .as_deref()
            .context("MIXPANEL_TOKEN must be set for tracking commands")
    }

    pub fn api_credentials(&self) -> anyhow::Result<(&str, &str)> {
        let key = self
            .api_key
            .as_deref()
            .context("MIXPANEL_API_KEY must be set for export commands")?;
        let secret = self
            .api_secret
            .as_deref()
            .context("MIXPANEL_API_SECRET must be set for export commands")?;
        Ok((key, secret))
    }
}
