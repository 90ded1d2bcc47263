/// Application configuration
///
/// Values come from, in order of precedence:
/// - `PHOTO_SHELF_CACHE_PATH` / `PHOTO_SHELF_DATABASE_PATH` environment variables
/// - the JSON file named by `PHOTO_SHELF_CONFIG`
/// - platform defaults (see [`Config::default`])
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::Result;

const APP_DIR: &str = "photo-shelf";
const CONFIG_ENV: &str = "PHOTO_SHELF_CONFIG";
const CACHE_PATH_ENV: &str = "PHOTO_SHELF_CACHE_PATH";
const DATABASE_PATH_ENV: &str = "PHOTO_SHELF_DATABASE_PATH";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Root of all derived artifacts (thumbnails, previews)
    pub cache_path: PathBuf,
    /// Location of the SQLite catalog
    pub database_path: PathBuf,
}

impl Default for Config {
    /// Platform directories:
    /// - Linux: ~/.cache/photo-shelf and ~/.local/share/photo-shelf/photo_shelf.db
    /// - macOS: ~/Library/Caches/photo-shelf and ~/Library/Application Support/photo-shelf/photo_shelf.db
    /// - Windows: %LOCALAPPDATA%\photo-shelf and %APPDATA%\photo-shelf\photo_shelf.db
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

        let mut cache_path = dirs::cache_dir().unwrap_or_else(|| home.clone());
        cache_path.push(APP_DIR);

        let mut database_path = dirs::data_dir().unwrap_or(home);
        database_path.push(APP_DIR);
        database_path.push("photo_shelf.db");

        Self {
            cache_path,
            database_path,
        }
    }
}

impl Config {
    /// Load the configuration from the environment
    pub fn load() -> Result<Self> {
        let config = match std::env::var_os(CONFIG_ENV) {
            Some(file) => Self::from_file(Path::new(&file))?,
            None => Self::default(),
        };

        config.with_env_overrides()
    }

    /// Apply the path environment variables on top of `self`
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|name| std::env::var_os(name))
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<OsString>) -> Result<Self> {
        if let Some(cache_path) = var(CACHE_PATH_ENV) {
            self.cache_path = PathBuf::from(cache_path);
        }
        if let Some(database_path) = var(DATABASE_PATH_ENV) {
            self.database_path = PathBuf::from(database_path);
        }

        self.cache_path = absolutize(&self.cache_path)?;
        Ok(self)
    }

    /// Parse a JSON config file; missing fields keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Resolve a relative path against the working directory
fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths_use_app_dir() {
        let config = Config::default();
        assert!(config.cache_path.ends_with(APP_DIR));
        assert!(config.database_path.ends_with("photo-shelf/photo_shelf.db"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(r#"{ "cache_path": "/cache" }"#).unwrap();
        assert_eq!(config.cache_path, PathBuf::from("/cache"));
        assert_eq!(config.database_path, Config::default().database_path);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let result = Config::from_json("{ not json");
        assert!(matches!(result, Err(crate::error::ShelfError::Config(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("shelf.json");
        std::fs::write(&file, r#"{ "database_path": "/data/catalog.db" }"#).unwrap();

        let config = Config::from_file(&file).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/data/catalog.db"));
    }

    #[test]
    fn test_overrides_replace_paths() {
        let vars = |name: &str| match name {
            CACHE_PATH_ENV => Some(OsString::from("/override/cache")),
            DATABASE_PATH_ENV => Some(OsString::from("/override/shelf.db")),
            _ => None,
        };

        let config = Config::default().with_overrides(vars).unwrap();
        assert_eq!(config.cache_path, PathBuf::from("/override/cache"));
        assert_eq!(config.database_path, PathBuf::from("/override/shelf.db"));
    }

    #[test]
    fn test_overrides_keep_unset_paths_and_absolutize_cache() {
        let vars = |name: &str| (name == CACHE_PATH_ENV).then(|| OsString::from("relative-cache"));

        let config = Config::default().with_overrides(vars).unwrap();
        assert!(config.cache_path.is_absolute());
        assert!(config.cache_path.ends_with("relative-cache"));
        assert_eq!(config.database_path, Config::default().database_path);
    }

    #[test]
    fn test_absolutize_relative_path() {
        let resolved = absolutize(Path::new("cache")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("cache"));

        let absolute = absolutize(Path::new("/cache")).unwrap();
        assert_eq!(absolute, PathBuf::from("/cache"));
    }
}
