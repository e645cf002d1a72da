use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::GanttConfig;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse gantry.toml: {0}")]
    Parse(#[from] toml::de::Error),
}

pub const CONFIG_FILE: &str = "gantry.toml";

/// Walk up from `start` looking for a directory containing gantry.toml.
pub fn discover_config_dir(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).is_file() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load the configuration from `dir`. A missing file yields the defaults;
/// a present but malformed file is an error.
pub fn load_config(dir: &Path) -> Result<GanttConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE);
    if !path.is_file() {
        return Ok(GanttConfig::default());
    }
    let text = fs::read_to_string(&path).map_err(|e| ConfigError::Read {
        path: path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::scale::TimeUnit;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.schedule.file, "schedule.json");
        assert_eq!(config.view.unit, TimeUnit::Month);
        assert_eq!(config.view.cell_width, 100.0);
        assert_eq!(config.view.cell_gap, 2.0);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "[view]\nunit = \"day\"\ncell_width = 40.0\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.view.unit, TimeUnit::Day);
        assert_eq!(config.view.cell_width, 40.0);
        assert_eq!(config.view.cell_gap, 2.0);
        assert_eq!(config.schedule.file, "schedule.json");
    }

    #[test]
    fn test_discovery_walks_up() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "").unwrap();
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        let found = discover_config_dir(&nested).unwrap();
        assert_eq!(found, dir.path());
    }
}
