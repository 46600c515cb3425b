use berth_core::{Size, Vec2};
use serde::{Deserialize, Serialize};

/// What closing a panel does with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloseBehavior {
    /// Keep it in the hidden list so it can be restored where it was.
    #[default]
    Hide,
    /// Drop it from the layout.
    Remove,
}

/// Tunables for hit-testing, floating windows and divider drags.
///
/// Every field has a default, so a partial `settings.json` section is fine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockConfig {
    /// Width of a leaf's edge bands as a fraction of the leaf's shorter side.
    pub edge_band: f32,
    /// Width of the window-level outer band as a fraction of the window extent.
    pub window_band: f32,
    /// Margin (px) around a nested leaf left to the window band.
    pub leaf_inset: f32,
    /// Size of a freshly undocked floating window when the panel has no preference.
    pub floating_size: Size,
    /// Offset of the pointer from a new floating window's top-left corner.
    pub floating_grab_offset: Vec2,
    /// Releasing a drag outside every window undocks the panel into a floating window.
    pub float_on_release_outside: bool,
    /// Whether new floating windows stay above the main window.
    pub floating_always_on_top: bool,
    pub close_behavior: CloseBehavior,
    /// Maximum distance (px) over which a moved floating window snaps to an edge.
    pub snap_distance: f32,
    /// Distance (px) from a divider within which a press starts a resize.
    pub divider_hit_threshold: f32,
    /// Smallest share either neighbour keeps when a divider is dragged.
    pub min_split_ratio: f32,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            edge_band: 0.25,
            window_band: 0.10,
            leaf_inset: 8.0,
            floating_size: Size::new(640.0, 420.0),
            floating_grab_offset: Vec2::new(40.0, 12.0),
            float_on_release_outside: true,
            floating_always_on_top: true,
            close_behavior: CloseBehavior::Hide,
            snap_distance: 12.0,
            divider_hit_threshold: 8.0,
            min_split_ratio: 0.1,
        }
    }
}

impl DockConfig {
    /// Replace out-of-range values with their defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let mut config = self;

        if !fraction_in_range(config.edge_band) {
            log::warn!("edge_band {} out of range, using {}", config.edge_band, defaults.edge_band);
            config.edge_band = defaults.edge_band;
        }
        if !fraction_in_range(config.window_band) {
            log::warn!(
                "window_band {} out of range, using {}",
                config.window_band,
                defaults.window_band
            );
            config.window_band = defaults.window_band;
        }
        if !non_negative(config.leaf_inset) {
            config.leaf_inset = defaults.leaf_inset;
        }
        if !(positive(config.floating_size.width) && positive(config.floating_size.height)) {
            log::warn!("floating_size must be positive, using default");
            config.floating_size = defaults.floating_size;
        }
        if !config.floating_grab_offset.x.is_finite() || !config.floating_grab_offset.y.is_finite() {
            config.floating_grab_offset = defaults.floating_grab_offset;
        }
        if !non_negative(config.snap_distance) {
            config.snap_distance = defaults.snap_distance;
        }
        if !non_negative(config.divider_hit_threshold) {
            config.divider_hit_threshold = defaults.divider_hit_threshold;
        }
        if !fraction_in_range(config.min_split_ratio) {
            log::warn!(
                "min_split_ratio {} out of range, using {}",
                config.min_split_ratio,
                defaults.min_split_ratio
            );
            config.min_split_ratio = defaults.min_split_ratio;
        }
        config
    }
}

fn fraction_in_range(value: f32) -> bool {
    value > 0.0 && value < 0.5
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn non_negative(value: f32) -> bool {
    value.is_finite() && value >= 0.0
}
