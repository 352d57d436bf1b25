use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context, Result};
use reqwest::Url;
use serde::Deserialize;

const CONFIG_DIR: &str = "taskers";
const CONFIG_FILE: &str = "config.toml";
const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Settings loaded from `config.toml`. Every key is optional.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Root the `/tasks` endpoints hang off.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    #[serde(default = "default_level")]
    pub level: String,
    pub directory: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            directory: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_level() -> String {
    "info".to_string()
}

impl Config {
    /// Loads `path` when given, otherwise the per-user config file if it
    /// exists, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match Self::source(path) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.base_url()?;
        Ok(config)
    }

    /// The file [`Config::load`] reads for `path`, if any.
    pub fn source(path: Option<&Path>) -> Option<PathBuf> {
        path.map(Path::to_path_buf)
            .or_else(|| default_config_path().filter(|path| path.exists()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// The backend root. Only absolute `http`/`https` URLs are accepted.
    pub fn base_url(&self) -> Result<Url> {
        let raw = &self.server.base_url;
        let url = Url::parse(raw).with_context(|| format!("invalid server.base_url {raw:?}"))?;
        ensure!(
            matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base(),
            "invalid server.base_url {raw:?}: expected an http:// or https:// url"
        );
        Ok(url)
    }

    /// Directory log files are written to.
    pub fn log_directory(&self) -> PathBuf {
        self.log.directory.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(CONFIG_DIR)
        })
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_point_at_localhost() {
        let config = Config::default();
        assert_eq!(config.base_url().unwrap().as_str(), "http://localhost:8080/");
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn reads_explicit_file() {
        let file = write_config(
            r#"
            [server]
            base_url = "http://tasks.internal:9000/api/"

            [log]
            level = "debug"
            directory = "/var/log/taskers"
            "#,
        );
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.server.base_url, "http://tasks.internal:9000/api/");
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log_directory(), PathBuf::from("/var/log/taskers"));
    }

    #[test]
    fn explicit_path_is_the_source() {
        let file = write_config("");
        assert_eq!(
            Config::source(Some(file.path())),
            Some(file.path().to_path_buf())
        );
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let file = write_config("[log]\nlevel = \"warn\"\n");
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.server.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn rejects_bad_base_url() {
        let file = write_config("[server]\nbase_url = \"not a url\"\n");
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("invalid server.base_url"));
    }

    #[test]
    fn rejects_url_without_http_scheme() {
        let file = write_config("[server]\nbase_url = \"localhost:8080\"\n");
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("expected an http:// or https:// url"));

        let mut config = Config::default();
        config.server.base_url = "ftp://tasks.internal/".into();
        assert!(config.base_url().is_err());
        config.server.base_url = "https://tasks.internal/api/".into();
        assert!(config.base_url().is_ok());
    }

    #[test]
    fn rejects_unknown_keys() {
        let file = write_config("[server]\nbase = \"http://x\"\n");
        assert!(Config::load(Some(file.path())).is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
