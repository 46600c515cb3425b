// Settings persistence: docking tunables and the panel registry, stored in the
// platform config dir, e.g. ~/.config/berth/settings.json on Linux.

use std::path::{Path, PathBuf};

use berth_core::{PanelHandle, Rect, Size};
use berth_layout::DockConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BerthSettings {
    #[serde(default)]
    pub dock: DockConfig,
    /// Panels the host can show. Restored layouts only keep these.
    #[serde(default = "default_panels")]
    pub panels: Vec<PanelHandle>,
    #[serde(default = "default_window_width")]
    pub window_width: f32,
    #[serde(default = "default_window_height")]
    pub window_height: f32,
}

impl Default for BerthSettings {
    fn default() -> Self {
        Self {
            dock: DockConfig::default(),
            panels: default_panels(),
            window_width: default_window_width(),
            window_height: default_window_height(),
        }
    }
}

impl BerthSettings {
    /// Content area of the main window.
    pub fn main_bounds(&self) -> Rect {
        let bounds = Rect::new(0.0, 0.0, self.window_width, self.window_height);
        if bounds.is_valid() {
            bounds
        } else {
            log::warn!(
                "window size {}x{} is invalid, using defaults",
                self.window_width,
                self.window_height
            );
            Rect::new(0.0, 0.0, default_window_width(), default_window_height())
        }
    }
}

fn default_panels() -> Vec<PanelHandle> {
    vec![
        PanelHandle::new("explorer", "Explorer").preferred_size(Size::new(280.0, 600.0)),
        PanelHandle::new("editor", "Editor").closable(false),
        PanelHandle::new("terminal", "Terminal"),
        PanelHandle::new("output", "Output"),
        PanelHandle::new("problems", "Problems"),
    ]
}

fn default_window_width() -> f32 {
    1280.0
}

fn default_window_height() -> f32 {
    800.0
}

pub fn settings_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("berth").join("settings.json"))
}

pub fn load_settings() -> BerthSettings {
    match settings_path() {
        Some(path) => load_settings_from(&path),
        None => BerthSettings::default(),
    }
}

/// A missing file yields the defaults silently; an unreadable one with a warning.
pub fn load_settings_from(path: &Path) -> BerthSettings {
    match std::fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Failed to parse {}: {}", path.display(), e);
                BerthSettings::default()
            }
        },
        Err(_) => BerthSettings::default(),
    }
}

pub fn save_settings_to(path: &Path, settings: &BerthSettings) {
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            log::error!("Failed to create config dir {}: {}", parent.display(), e);
            return;
        }
    }

    match serde_json::to_string_pretty(settings) {
        Ok(json) => {
            if let Err(e) = std::fs::write(path, json) {
                log::error!("Failed to write {}: {}", path.display(), e);
            }
        }
        Err(e) => {
            log::error!("Failed to serialize settings: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from(&dir.path().join("settings.json"));
        assert_eq!(settings, BerthSettings::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"dock":{"snap_distance":4.0},"window_width":900}"#).unwrap();

        let settings = load_settings_from(&path);
        assert_eq!(settings.dock.snap_distance, 4.0);
        assert_eq!(settings.dock.edge_band, DockConfig::default().edge_band);
        assert_eq!(settings.window_width, 900.0);
        assert_eq!(settings.window_height, 800.0);
        assert_eq!(settings.panels.len(), 5);
    }

    #[test]
    fn garbage_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings_from(&path), BerthSettings::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut settings = BerthSettings::default();
        settings.panels.truncate(2);
        settings.dock.float_on_release_outside = false;

        save_settings_to(&path, &settings);
        assert_eq!(load_settings_from(&path), settings);
    }

    #[test]
    fn invalid_window_size_falls_back() {
        let settings = BerthSettings {
            window_width: -1.0,
            ..BerthSettings::default()
        };
        assert_eq!(settings.main_bounds(), Rect::new(0.0, 0.0, 1280.0, 800.0));
    }
}
