use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Shared key clients must present (header or query parameter).
    #[serde(default)]
    pub key: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplingConfig {
    /// Width of the two-snapshot sampling window in milliseconds.
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    /// Interface name excluded from the aggregate network figures.
    #[serde(default = "default_loopback")]
    pub loopback: String,
    /// Mount path behind the report's `disk` field. Platform default when omitted.
    #[serde(default)]
    pub root_path: Option<String>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            loopback: default_loopback(),
            root_path: None,
        }
    }
}

impl SamplingConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    8080
}

fn default_window_ms() -> u64 {
    500
}

fn default_loopback() -> String {
    "lo".into()
}

impl AppConfig {
    /// Load from CONFIG_FILE (default config.toml). A missing file is not an
    /// error; the agent runs with defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        match std::fs::read_to_string(&path) {
            Ok(s) => Self::load_from_str(&s),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path, "config file not found; using defaults");
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            self.sampling.window_ms > 0,
            "sampling.window_ms must be > 0, got {}",
            self.sampling.window_ms
        );
        anyhow::ensure!(
            !self.sampling.loopback.is_empty(),
            "sampling.loopback must be non-empty"
        );
        if let Some(root) = &self.sampling.root_path {
            anyhow::ensure!(!root.is_empty(), "sampling.root_path must be non-empty");
        }
        Ok(())
    }
}
