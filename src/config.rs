use crate::error::{AppError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub images: ImagesConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3060,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file; the in-memory store is used when unset
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    pub base_url: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            base_url: "https://images.opencollective.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub max_page_size: i32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            max_page_size: 1000,
        }
    }
}

impl Config {
    /// Load `config.toml` from the working directory (defaults when absent),
    /// then apply environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load the given file, or `config.toml` when present, then apply
    /// environment overrides. An explicit path must exist.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(port) = std::env::var("COLLECTIVES_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| AppError::Config(format!("Invalid COLLECTIVES_PORT: {port}")))?;
        }
        if let Ok(path) = std::env::var("DATABASE_PATH") {
            self.database.path = Some(PathBuf::from(path));
        }
        if let Ok(url) = std::env::var("IMAGES_URL") {
            self.images.base_url = url;
        }
        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if self.pagination.max_page_size <= 0 {
            return Err(AppError::Config(
                "pagination.max_page_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
