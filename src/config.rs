use crate::error::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "station_revenue.json";
pub const CONFIG_ENV: &str = "STATION_REVENUE_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub dataset_path: PathBuf,
    pub output_dir: PathBuf,
    pub preview_rows: usize,
    pub top_pos: usize,
    pub merged_file_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            dataset_path: PathBuf::from("Stationary_Perf.xlsx"),
            output_dir: PathBuf::from("."),
            preview_rows: 12,
            top_pos: 10,
            merged_file_name: "combined_dataset.csv".to_string(),
        }
    }
}

impl AppConfig {
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}

/// Resolve the config file from the environment, falling back to defaults
/// when no file exists.
pub fn load_or_default() -> Result<AppConfig> {
    let path = std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    if path.exists() {
        log::info!("Loading config from {}", path.display());
        load_config(&path)
    } else {
        log::debug!("No config at {}, using defaults", path.display());
        Ok(AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let dir = std::env::temp_dir().join(format!("station-config-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("should create temp dir");
        let path = dir.join("cfg.json");
        fs::write(&path, r#"{"dataset_path": "data/merged.csv", "top_pos": 5}"#)
            .expect("should write config");

        let cfg = load_config(&path).expect("config should parse");
        assert_eq!(cfg.dataset_path, PathBuf::from("data/merged.csv"));
        assert_eq!(cfg.top_pos, 5);
        assert_eq!(cfg.preview_rows, 12);
        assert_eq!(cfg.merged_file_name, "combined_dataset.csv");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = std::env::temp_dir().join(format!("station-config-bad-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("should create temp dir");
        let path = dir.join("cfg.json");
        fs::write(&path, "{ not json").expect("should write config");
        assert!(load_config(&path).is_err());
        let _ = fs::remove_dir_all(&dir);
    }
}
