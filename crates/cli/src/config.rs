use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tfplan_extractor::ExtractorConfig;

const CONFIG_PATH_ENV: &str = "TFPLAN_CONFIG";
const STRICT_TALLY_ENV: &str = "TFPLAN_STRICT_TALLY";

/// Settings for the HTTP front end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address, e.g. 127.0.0.1:5000
    pub bind: String,

    /// Browser origins allowed to call the API
    pub cors_origins: Vec<String>,

    /// Largest accepted request body
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            cors_origins: vec!["http://localhost:5173".to_string()],
            max_upload_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Contents of the optional TOML config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub extractor: ExtractorConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load from `path` (or `$TFPLAN_CONFIG`), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let from_env = env::var_os(CONFIG_PATH_ENV).map(std::path::PathBuf::from);
        let mut config = match path.or(from_env.as_deref()) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(strict) = env_flag(STRICT_TALLY_ENV) {
            config.extractor.strict_tally = strict;
        }
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config
            .extractor
            .validate()
            .map_err(|msg| anyhow::anyhow!("extractor: {msg}"))?;
        if config.server.max_upload_bytes == 0 {
            anyhow::bail!("server.max_upload_bytes must be > 0");
        }
        Ok(config)
    }
}

/// `Some(true)` for 1/true/yes/on, `Some(false)` for 0/false/no/off.
fn env_flag(var: &str) -> Option<bool> {
    let value = env::var(var).ok()?;
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        other => {
            log::warn!("ignoring {var}={other}: expected a boolean");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.server.bind, "127.0.0.1:5000");
    }

    #[test]
    fn sections_override_defaults() {
        let config = AppConfig::from_toml(
            r#"
[extractor]
strict_tally = true
keyword_window_before = 50

[server]
cors_origins = ["http://localhost:3000", "https://plans.example.com"]
"#,
        )
        .unwrap();

        assert!(config.extractor.strict_tally);
        assert_eq!(config.extractor.keyword_window_before, 50);
        assert_eq!(config.extractor.keyword_window_after, 10_000);
        assert_eq!(config.server.cors_origins.len(), 2);
        assert_eq!(config.server.max_upload_bytes, 64 * 1024 * 1024);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(AppConfig::from_toml("[extractor]\nkeyword_window_after = 0\n").is_err());
        assert!(AppConfig::from_toml("[server]\nmax_upload_bytes = 0\n").is_err());
        assert!(AppConfig::from_toml("[extractor]\nstrict_tally = \"maybe\"\n").is_err());
    }
}
