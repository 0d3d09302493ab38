// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::model::*;
use crate::error::{ClipReviewError, ClipReviewResult};
use crate::utils::logging::LogLevel;

/// Name of the TOML table holding the settings
pub const CONFIG_SECTION: &str = "clipreview";

/// Bounds for the tick interval
pub const MIN_TICK_INTERVAL_MS: u64 = 50;
pub const MAX_TICK_INTERVAL_MS: u64 = 1000;

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base directories scanned for videos; relative paths resolve against home
    pub video_dirs: Vec<PathBuf>,
    /// Clip storage directory; relative paths resolve against home
    pub clip_dir: PathBuf,
    /// Known video extensions, without dots
    pub extensions: Vec<String>,
    /// Pre-roll subtracted when marking a clip start
    pub start_preroll_ms: Millis,
    /// Pre-roll subtracted from the clip start when a loop restarts
    pub loop_preroll_ms: Millis,
    /// Default skip step
    pub skip_seconds: f64,
    /// Tick period for boundary checks
    pub tick_interval_ms: u64,
    /// Persist clip comments
    pub save_comments: bool,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            video_dirs: vec![PathBuf::from("Videos")],
            clip_dir: PathBuf::from("clips"),
            extensions: vec!["mp4".to_string(), "avi".to_string()],
            start_preroll_ms: 500,
            loop_preroll_ms: 100,
            skip_seconds: 3.0,
            tick_interval_ms: 200,
            save_comments: true,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Reject settings the rest of the application cannot honour
    pub fn validate(&self) -> ClipReviewResult<()> {
        LogLevel::parse(&self.log_level).map_err(|e| ClipReviewError::Config {
            message: e.to_string(),
        })?;

        if self.extensions.is_empty() {
            return Err(ClipReviewError::Config {
                message: "At least one video extension is required".to_string(),
            });
        }
        if self.start_preroll_ms < 0 || self.loop_preroll_ms < 0 {
            return Err(ClipReviewError::Config {
                message: "Pre-roll values cannot be negative".to_string(),
            });
        }
        if !self.skip_seconds.is_finite() || self.skip_seconds <= 0.0 {
            return Err(ClipReviewError::Config {
                message: format!("Skip step must be positive, got {}", self.skip_seconds),
            });
        }

        Ok(())
    }

    /// Timing knobs for the playback controller
    pub fn timing(&self) -> TimingSettings {
        TimingSettings {
            start_preroll_ms: self.start_preroll_ms,
            loop_preroll_ms: self.loop_preroll_ms,
        }
    }

    /// Tick interval clamped to the supported range
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
            .clamp(MIN_TICK_INTERVAL_MS, MAX_TICK_INTERVAL_MS)
    }

    /// Video directories resolved against `home`
    pub fn resolved_video_dirs(&self, home: &Path) -> Vec<PathBuf> {
        self.video_dirs.iter().map(|dir| resolve(home, dir)).collect()
    }

    /// Clip directory resolved against `home`
    pub fn resolved_clip_dir(&self, home: &Path) -> PathBuf {
        resolve(home, &self.clip_dir)
    }
}

fn resolve(home: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        home.join(path)
    }
}

/// Home directory used to resolve relative paths, falling back to the current directory
pub fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    clipreview: AppConfig,
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Get default config file path
    pub fn default_config_path() -> PathBuf {
        // On Windows, use %APPDATA%/ClipReview/config.toml
        if let Some(appdata) = std::env::var_os("APPDATA") {
            PathBuf::from(appdata).join("ClipReview").join("config.toml")
        } else if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(xdg).join("clipreview").join("config.toml")
        } else {
            home_dir().join(".config").join("clipreview").join("config.toml")
        }
    }

    /// Deserialize config from TOML string
    pub fn parse(toml_content: &str) -> ClipReviewResult<AppConfig> {
        let document: ConfigDocument = toml::from_str(toml_content)?;
        Ok(document.clipreview)
    }

    /// Serialize config to TOML string
    pub fn render(config: &AppConfig) -> ClipReviewResult<String> {
        let document = ConfigDocument {
            clipreview: config.clone(),
        };
        toml::to_string_pretty(&document).map_err(|e| ClipReviewError::Config {
            message: format!("Failed to serialize config: {}", e),
        })
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> ClipReviewResult<AppConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| ClipReviewError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        let config = Self::parse(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(config: &AppConfig, path: &Path) -> ClipReviewResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, Self::render(config)?)?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_parse_partial_section_keeps_defaults() {
        let config = TomlConfigAdapter::parse(
            r#"
            [clipreview]
            loop_preroll_ms = 500
            extensions = ["mp4"]
            "#,
        )
        .unwrap();

        assert_eq!(config.loop_preroll_ms, 500);
        assert_eq!(config.extensions, vec!["mp4".to_string()]);
        assert_eq!(config.start_preroll_ms, 500);
        assert_eq!(config.tick_interval_ms, 200);
    }

    #[test]
    fn test_parse_empty_document() {
        assert_eq!(TomlConfigAdapter::parse("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_parse_invalid_toml() {
        assert!(TomlConfigAdapter::parse("[clipreview\nfoo = ").is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.log_level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.extensions.clear();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.loop_preroll_ms = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tick_interval_is_clamped() {
        let mut config = AppConfig::default();
        config.tick_interval_ms = 5;
        assert_eq!(config.tick_interval_ms(), MIN_TICK_INTERVAL_MS);
        config.tick_interval_ms = 10_000;
        assert_eq!(config.tick_interval_ms(), MAX_TICK_INTERVAL_MS);
    }

    #[test]
    fn test_relative_paths_resolve_against_home() {
        let config = AppConfig::default();
        let home = Path::new("/home/learner");
        assert_eq!(
            config.resolved_clip_dir(home),
            PathBuf::from("/home/learner/clips")
        );
        assert_eq!(
            config.resolved_video_dirs(home),
            vec![PathBuf::from("/home/learner/Videos")]
        );
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cfg").join("config.toml");
        let mut config = AppConfig::default();
        config.skip_seconds = 5.0;
        config.clip_dir = PathBuf::from("/data/clips");

        TomlConfigAdapter::save(&config, &path).unwrap();
        assert_eq!(TomlConfigAdapter::load(&path).unwrap(), config);
    }
}
