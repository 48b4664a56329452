use extrato_import::ConversionProfile;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_ENV: &str = "EXTRATO_CONFIG";
pub const HOST_ENV: &str = "EXTRATO_HOST";
pub const PORT_ENV: &str = "EXTRATO_PORT";
pub const DEFAULT_CONFIG_FILE: &str = "extrato.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid value for {var}: '{value}'")]
    Env { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Requests larger than this are rejected before the upload is read.
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    /// Used for any form field the upload leaves out.
    pub defaults: ConversionProfile,
}

impl Settings {
    /// Reads `$EXTRATO_CONFIG`, else `./extrato.toml` when it exists, else
    /// built-in defaults. Host and port environment variables win over the
    /// file.
    pub fn load() -> Result<Self, ConfigError> {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(p) => Some(PathBuf::from(p)),
            None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
        };
        let mut settings = Self::load_from(path.as_deref())?;
        settings.apply_env(|var| std::env::var(var).ok())?;
        Ok(settings)
    }

    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Settings::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(HOST_ENV) {
            self.server.host = host;
        }
        if let Some(port) = lookup(PORT_ENV) {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::Env {
                var: PORT_ENV,
                value: port,
            })?;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extrato_core::{AccountKind, DecimalConvention};
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn no_file_gives_defaults() {
        let settings = Settings::load_from(None).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.bind_addr(), "0.0.0.0:5000");
        assert_eq!(settings.defaults.delimiter, ";");
    }

    #[test]
    fn reads_partial_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[server]
port = 8080

[defaults]
account_kind = "credit_card"
delimiter = ","
decimal = "ponto"
"#
        )
        .unwrap();

        let settings = Settings::load_from(Some(file.path())).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.defaults.account_kind, AccountKind::CreditCard);
        assert_eq!(settings.defaults.delimiter, ",");
        assert_eq!(settings.defaults.decimal, DecimalConvention::Dot);
        assert!(settings.defaults.exclude.is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Settings::load_from(Some(Path::new("/nonexistent/extrato.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn malformed_file_is_toml_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[server]\nport = \"not a number\"\n").unwrap();
        let err = Settings::load_from(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));
    }

    #[test]
    fn env_overrides_host_and_port() {
        let env: HashMap<&str, &str> = [(HOST_ENV, "127.0.0.1"), (PORT_ENV, "9000")].into();
        let mut settings = Settings::default();
        settings
            .apply_env(|var| env.get(var).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(settings.bind_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn env_rejects_bad_port() {
        let mut settings = Settings::default();
        let err = settings
            .apply_env(|var| (var == PORT_ENV).then(|| "http".to_string()))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for EXTRATO_PORT: 'http'");
    }
}
