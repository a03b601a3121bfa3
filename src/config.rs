use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub filter: FilterConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub tick_ms: u64,
    pub cpu_sample_window_ms: u64,
    pub chart_window: usize,
    pub list_refresh_ms: u64,
    pub kill_signal: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            tick_ms: 500,
            cpu_sample_window_ms: 1000,
            chart_window: 20,
            list_refresh_ms: 2000,
            kill_signal: "kill".to_string(),
        }
    }
}

impl GeneralConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn cpu_sample_window(&self) -> Duration {
        Duration::from_millis(self.cpu_sample_window_ms)
    }

    pub fn list_refresh(&self) -> Duration {
        Duration::from_millis(self.list_refresh_ms.max(1))
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub memory_threshold_mb: u64,
    pub cpu_threshold_percent: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            memory_threshold_mb: 100,
            cpu_threshold_percent: 10.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub dir: Option<PathBuf>,
    pub file: String,
    pub level: String,
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            dir: None,
            file: "process_log.txt".to_string(),
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl LogConfig {
    pub fn path(&self) -> PathBuf {
        let dir = self.dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .map(|p| p.join("procwatch"))
                .unwrap_or_else(|| PathBuf::from("Process_log_directory"))
        });
        dir.join(&self.file)
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("procwatch").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
        Err(_) => Config::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.general.tick_ms, 500);
        assert_eq!(config.general.cpu_sample_window_ms, 1000);
        assert_eq!(config.general.chart_window, 20);
        assert_eq!(config.general.kill_signal, "kill");
        assert_eq!(config.filter.memory_threshold_mb, 100);
        assert_eq!(config.log.file, "process_log.txt");
        assert!(config.log.dir.is_none());
    }

    #[test]
    fn parse_partial_toml() {
        let toml_str = r#"
[general]
tick_ms = 250
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.tick_ms, 250);
        // Other fields should be defaults
        assert_eq!(config.general.list_refresh_ms, 2000);
        assert!((config.filter.cpu_threshold_percent - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
[general]
tick_ms = 1000
cpu_sample_window_ms = 0
chart_window = 60
kill_signal = "term"

[filter]
memory_threshold_mb = 512
cpu_threshold_percent = 42.5

[log]
dir = "/tmp/procwatch-logs"
level = "debug"
format = "json"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.tick(), Duration::from_millis(1000));
        assert!(config.general.cpu_sample_window().is_zero());
        assert_eq!(config.general.chart_window, 60);
        assert_eq!(config.general.kill_signal, "term");
        assert_eq!(config.filter.memory_threshold_mb, 512);
        assert_eq!(
            config.log.path(),
            PathBuf::from("/tmp/procwatch-logs/process_log.txt")
        );
        assert_eq!(config.log.format, "json");
    }

    #[test]
    fn missing_file_returns_default() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.toml"));
        assert_eq!(config.general.tick_ms, 500);
    }

    #[test]
    fn invalid_toml_returns_default() {
        let temp = std::env::temp_dir().join("procwatch_test_invalid.toml");
        std::fs::write(&temp, "this is not valid toml {{{{").unwrap();
        let config = load_config_from_path(&temp);
        assert_eq!(config.general.tick_ms, 500);
        let _ = std::fs::remove_file(&temp);
    }
}
