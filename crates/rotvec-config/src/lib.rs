mod types;

pub use types::*;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Returns the config directory, e.g. `~/.config/rotvec-app/`.
pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("rotvec-app");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Returns the default config file path: `<config_dir>/config.toml`.
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load config from the default location.
pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path()?)
}

/// Load and validate config from `path`. A missing file is created with
/// the defaults so there is something to edit next time.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let config = if path.exists() {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        info!(?path, "Loaded config");
        config
    } else {
        info!(?path, "No config found, writing defaults");
        let config = AppConfig::default();
        save_config_to(&config, path)?;
        config
    };
    config.validate()?;
    Ok(config)
}

/// Save config to `path`, creating parent directories as needed.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    info!(?path, "Saved config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = load_config_from(&path).unwrap();

        assert!(path.exists());
        assert_eq!(config.sensor.max_latency_us, 10_000);
        let reloaded = load_config_from(&path).unwrap();
        assert_eq!(reloaded.window.width, config.window.width);
    }

    #[test]
    fn edited_file_is_respected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[render]\ncamera_distance = 5.0\n").unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.render.camera_distance, 5.0);
        assert_eq!(config.render.far, 10.0);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        std::fs::write(&path, "[render]\nnear = 4.0\nfar = 2.0\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());

        std::fs::write(&path, "[render\n").unwrap();
        assert!(load_config_from(&path).is_err());
    }
}
