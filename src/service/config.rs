//! Service configuration loading.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::{Result, TaskManagerError};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "TASKMANAGER_CONFIG";

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Data directory for database and logs
    pub data_dir: PathBuf,
    /// Address the request server listens on
    pub listen_addr: String,
    /// Sender address on notification emails
    pub mail_sender: String,
    /// Default tracing filter when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        let data_dir = ProjectDirs::from("com", "recruitment", "taskmanager")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("taskmanager-data"));

        Self {
            data_dir,
            listen_addr: "127.0.0.1:7878".to_string(),
            mail_sender: "noreply@taskmanager.local".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from file or return defaults.
    ///
    /// Uses the file named by `TASKMANAGER_CONFIG` when set, otherwise
    /// `config.toml` inside the default data directory if present.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load_from(Path::new(&path));
        }

        let defaults = Self::default();
        let candidate = defaults.data_dir.join("config.toml");
        if candidate.exists() {
            Self::load_from(&candidate)
        } else {
            Ok(defaults)
        }
    }

    /// Load configuration from a TOML file; missing keys take defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
            .map_err(|e| TaskManagerError::Config(format!("{}: {}", path.display(), e)))
    }

    fn from_toml(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// SQLite database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("taskmanager.db")
    }

    /// Directory for rolling log files.
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ServiceConfig::from_toml(
            r#"
            data_dir = "/var/lib/taskmanager"
            listen_addr = "0.0.0.0:9000"
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/var/lib/taskmanager"));
        assert_eq!(config.listen_addr, "0.0.0.0:9000");
        assert_eq!(config.log_filter, "info");
        assert_eq!(
            config.database_path(),
            PathBuf::from("/var/lib/taskmanager/taskmanager.db")
        );
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = std::env::temp_dir().join("taskmanager_test_config");
        let _ = fs::remove_dir_all(&temp_dir);
        fs::create_dir_all(&temp_dir).unwrap();

        let path = temp_dir.join("config.toml");
        fs::write(&path, "mail_sender = \"tasks@example.com\"\n").unwrap();

        let config = ServiceConfig::load_from(&path).unwrap();
        assert_eq!(config.mail_sender, "tasks@example.com");

        let _ = fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let temp_dir = std::env::temp_dir().join("taskmanager_test_bad_config");
        let _ = fs::remove_dir_all(&temp_dir);
        fs::create_dir_all(&temp_dir).unwrap();

        let path = temp_dir.join("config.toml");
        fs::write(&path, "listen_addr = 42\n").unwrap();

        assert!(matches!(
            ServiceConfig::load_from(&path),
            Err(TaskManagerError::Config(_))
        ));

        let _ = fs::remove_dir_all(&temp_dir);
    }
}
