use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::view::{NewFileZoom, PositionPolicy, ZoomPolicy};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
/// Persisted settings for glimpse. Anything missing or malformed on disk
/// falls back to the defaults.
pub struct AppConfig {
    pub window_width: Option<f32>,
    pub window_height: Option<f32>,
    /// Match the file manager's display order when it can be queried.
    pub sort_by_shell_order: bool,
    pub autoplay_animations: bool,
    pub preview_thumbnails: bool,
    pub parse_exif: bool,
    pub calculate_histograms: bool,
    pub zoom_policy: ZoomPolicy,
    pub new_file_zoom: NewFileZoom,
    pub position_policy: PositionPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_width: None,
            window_height: None,
            sort_by_shell_order: true,
            autoplay_animations: true,
            preview_thumbnails: true,
            parse_exif: true,
            calculate_histograms: true,
            zoom_policy: ZoomPolicy::default(),
            new_file_zoom: NewFileZoom::default(),
            position_policy: PositionPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Returns the user config file path, if a config directory is available.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("glimpse").join("config.toml"))
    }

    /// Loads config from disk, falling back to defaults on any error.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        let Ok(contents) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        toml::from_str(&contents).unwrap_or_default()
    }

    /// Writes config to disk, ignoring filesystem/serialization errors.
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Ok(s) = toml::to_string_pretty(self) {
            let _ = std::fs::write(&path, s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_survive_a_toml_round_trip() {
        let config = AppConfig::default();
        let text = toml::to_string_pretty(&config).expect("serialize");
        let back: AppConfig = toml::from_str(&text).expect("deserialize");
        assert_eq!(back.sort_by_shell_order, config.sort_by_shell_order);
        assert_eq!(back.zoom_policy, config.zoom_policy);
        assert_eq!(back.position_policy, config.position_policy);
    }

    #[test]
    fn unknown_and_missing_fields_fall_back() {
        let parsed: AppConfig =
            toml::from_str("autoplay_animations = false\n").expect("deserialize");
        assert!(!parsed.autoplay_animations);
        assert!(parsed.preview_thumbnails);
        assert_eq!(parsed.zoom_policy, ZoomPolicy::PerFile);
    }
}
