//! TOML configuration loading.
//!
//! The only real configuration surface is the ordered list of searchable
//! columns; server bind address and upload directory have sensible defaults.
//! A missing or malformed config file never fails startup — it falls back to
//! an empty column list, which surfaces as a configuration error on the
//! first index rebuild instead.

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SearchConfig {
    /// Ordered list of column names whose text is concatenated into the
    /// derived `search_text` column. Order matters: it fixes the join order.
    #[serde(default)]
    pub columns: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory where raw uploads are stored. Older uploads are retained
    /// here but only the newest file is ever searched.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
        }
    }
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

/// Load configuration from a TOML file, falling back to defaults on any
/// failure. Called once at startup; the result is immutable afterwards.
pub fn load_config(path: &Path) -> Config {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(
                "config file {} not readable ({}); using default empty config",
                path.display(),
                e
            );
            return Config::default();
        }
    };

    match toml::from_str::<Config>(&content) {
        Ok(config) => {
            tracing::info!("loaded config from {}", path.display());
            config
        }
        Err(e) => {
            tracing::error!(
                "failed to parse {} ({}); using default empty config",
                path.display(),
                e
            );
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config(Path::new("/nonexistent/inq.toml"));
        assert!(config.search.columns.is_empty());
        assert_eq!(config.server.bind, "127.0.0.1:8000");
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("inq.toml");
        fs::write(&path, "this is { not toml").unwrap();
        let config = load_config(&path);
        assert!(config.search.columns.is_empty());
    }

    #[test]
    fn parses_search_columns_in_order() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("inq.toml");
        fs::write(
            &path,
            r#"
[search]
columns = ["title", "body"]

[server]
bind = "0.0.0.0:9000"

[storage]
upload_dir = "/tmp/uploads"
"#,
        )
        .unwrap();
        let config = load_config(&path);
        assert_eq!(config.search.columns, vec!["title", "body"]);
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.storage.upload_dir, PathBuf::from("/tmp/uploads"));
    }
}
