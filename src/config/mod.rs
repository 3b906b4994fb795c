use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_state_file")]
    pub state_file: String,
    #[serde(default = "default_operator")]
    pub operator: String,
    #[serde(default = "default_separator_char")]
    pub separator_char: String,
}

fn default_state_file() -> String {
    Config::state_file_path().to_string_lossy().to_string()
}
fn default_operator() -> String {
    env::var("USER")
        .or_else(|_| env::var("USERNAME"))
        .unwrap_or_else(|_| "operator".to_string())
}
fn default_separator_char() -> String {
    "-".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            state_file: default_state_file(),
            operator: default_operator(),
            separator_char: default_separator_char(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("repairtimer")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".repairtimer")
        }
    }

    pub fn config_file() -> PathBuf {
        Self::config_dir().join("repairtimer.conf")
    }

    pub fn database_file() -> PathBuf {
        Self::config_dir().join("repairtimer.sqlite")
    }

    /// Local timer slot shared by every shell of this operator.
    pub fn state_file_path() -> PathBuf {
        Self::config_dir().join("active_timer.json")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        serde_yaml::from_str(&content).map_err(|e| AppError::Config(e.to_string()))
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        serde_yaml::to_string(self).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Create the config directory, the config file (unless `is_test`)
    /// and an empty database file.
    pub fn init_all(base: &Config, is_test: bool) -> AppResult<Self> {
        fs::create_dir_all(Self::config_dir())?;

        let config = base.clone();
        let db_path = PathBuf::from(&config.database);

        if !is_test {
            let yaml = config.to_yaml()?;
            let mut file =
                fs::File::create(Self::config_file()).map_err(|_| AppError::ConfigSave)?;
            file.write_all(yaml.as_bytes())
                .map_err(|_| AppError::ConfigSave)?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        Ok(config)
    }
}
