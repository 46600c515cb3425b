// Layout persistence: the docking snapshot saved next to the settings file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use berth_layout::snapshot::restore_or_default;
use berth_layout::{DockLayout, LayoutSnapshot};

use crate::settings::BerthSettings;

pub fn default_layout_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("berth").join("layout.json"))
}

/// Load the saved layout, falling back to every registered panel in one tab
/// group when the file is missing or cannot be restored.
pub fn load_layout(path: &Path, settings: &BerthSettings) -> DockLayout {
    let mut layout = match std::fs::read_to_string(path) {
        Ok(data) => match LayoutSnapshot::from_json(&data) {
            Ok(snapshot) => restore_or_default(&snapshot, &settings.panels, settings.dock).0,
            Err(e) => {
                log::warn!("Failed to parse {}: {}", path.display(), e);
                default_layout(settings)
            }
        },
        Err(_) => default_layout(settings),
    };
    layout.set_main_bounds(settings.main_bounds());
    // Loading is not an edit.
    layout.take_events();
    layout
}

pub fn default_layout(settings: &BerthSettings) -> DockLayout {
    let mut layout = DockLayout::with_panels(settings.panels.clone(), settings.dock);
    layout.set_main_bounds(settings.main_bounds());
    layout
}

pub fn save_layout(path: &Path, layout: &DockLayout) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = layout.snapshot().to_json()?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    log::debug!("saved layout to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use berth_core::{DockOperation, PanelId, Side, WindowId};
    use berth_layout::{NodePath, NodeRef};

    fn settings() -> BerthSettings {
        BerthSettings::default()
    }

    #[test]
    fn missing_layout_file_gives_single_group() {
        let dir = tempfile::tempdir().unwrap();
        let layout = load_layout(&dir.path().join("layout.json"), &settings());
        assert_eq!(layout.panel_count(), 5);
        assert!(layout.node(&NodeRef::main(NodePath::root())).unwrap().as_leaf().is_some());
        assert_eq!(layout.main_bounds(), settings().main_bounds());
    }

    #[test]
    fn saved_layout_is_restored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("berth").join("layout.json");
        let settings = settings();

        let mut layout = default_layout(&settings);
        let terminal = layout.panel(&PanelId::new("terminal")).cloned().unwrap();
        layout
            .dock(&terminal, &NodeRef::main(NodePath::root()), DockOperation::SplitBottom, None)
            .unwrap();
        save_layout(&path, &layout).unwrap();

        let restored = load_layout(&path, &settings);
        assert_eq!(restored.snapshot(), layout.snapshot());
        let location = restored.find_panel(&PanelId::new("terminal")).unwrap();
        assert_eq!(location.window, WindowId::Main);
        assert_eq!(location.path.as_slice(), &[1]);
    }

    #[test]
    fn stashed_panels_and_lock_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        let settings = settings();

        let mut layout = default_layout(&settings);
        layout
            .pin_to_sidebar(&PanelId::new("terminal"), Side::Left, None)
            .unwrap();
        layout.close_panel(&PanelId::new("output")).unwrap();
        layout.set_locked(true);
        save_layout(&path, &layout).unwrap();

        let restored = load_layout(&path, &settings);
        assert!(restored.pending_events().is_empty());
        assert!(restored.is_locked());
        assert_eq!(restored.panel_count(), 3);
        assert_eq!(
            restored.stash().side_of(&PanelId::new("terminal")),
            Some(Side::Left)
        );
        assert!(restored.stash().is_hidden(&PanelId::new("output")));
    }

    #[test]
    fn malformed_layout_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        std::fs::write(
            &path,
            r#"{"version":1,"main":{"node":{"kind":"split","orientation":"horizontal","weights":[1.0],"children":[]}}}"#,
        )
        .unwrap();

        let layout = load_layout(&path, &settings());
        assert_eq!(layout.panel_count(), 5);
        assert!(layout.check_invariants().is_ok());
    }

    #[test]
    fn unparsable_layout_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        std::fs::write(&path, "[]").unwrap();
        assert_eq!(load_layout(&path, &settings()).panel_count(), 5);
    }
}
