use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Result, WrapErr};
use log::debug;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_TRANSCRIPT_TIMEOUT_SECS: u64 = 30;

/// Optional settings read from `config.toml`; every field falls back to a default
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub host: Option<IpAddr>,
    pub port: Option<u16>,
    pub languages: Option<Vec<String>>,
    pub transcript_timeout_secs: Option<u64>,
}

impl Config {
    /// Load config from ~/.config/ytxd/config.toml if it exists
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(path)?;
            let config: Config =
                toml::from_str(&content).wrap_err_with(|| format!("invalid config file {}", path.display()))?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host.unwrap_or(DEFAULT_HOST), self.port.unwrap_or(DEFAULT_PORT))
    }

    pub fn languages(&self) -> Vec<String> {
        match &self.languages {
            Some(langs) if !langs.is_empty() => langs.clone(),
            _ => vec!["en".to_string()],
        }
    }

    pub fn transcript_timeout(&self) -> Duration {
        Duration::from_secs(
            self.transcript_timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_TRANSCRIPT_TIMEOUT_SECS),
        )
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytxd")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
host = "127.0.0.1"
port = 8080
languages = ["de", "en"]
transcript_timeout_secs = 45
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.languages(), vec!["de".to_string(), "en".to_string()]);
        assert_eq!(config.transcript_timeout(), Duration::from_secs(45));
    }

    #[test]
    fn test_parse_empty_config() {
        let toml_str = "";
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:5001".parse().unwrap());
        assert_eq!(config.languages(), vec!["en".to_string()]);
        assert_eq!(config.transcript_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"port = 9000"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.bind_addr().port(), 9000);
        assert_eq!(config.bind_addr().ip(), DEFAULT_HOST);
    }

    #[test]
    fn test_degenerate_values_use_defaults() {
        let toml_str = r#"
languages = []
transcript_timeout_secs = 0
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.languages(), vec!["en".to_string()]);
        assert_eq!(config.transcript_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_load_missing_file() {
        let config = Config::load_from(Path::new("/nonexistent/ytxd/config.toml")).unwrap();
        assert!(config.port.is_none());
    }

    #[test]
    fn test_load_invalid_file() {
        let path = std::env::temp_dir().join(format!("ytxd-invalid-{}.toml", std::process::id()));
        std::fs::write(&path, "port = \"not a number\"").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(err.to_string().starts_with("invalid config file"));
    }
}
