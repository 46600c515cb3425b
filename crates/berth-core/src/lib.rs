// Core types shared by the docking engine and its hosts.
// Geometry, panel identity, split orientation and drop zones. No state.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

// ──────────────────────────────────────────────
// Geometry
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_origin_size(origin: Vec2, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Length of the shorter side.
    pub fn shorter_side(&self) -> f32 {
        self.width.min(self.height)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Finite coordinates and a strictly positive size.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Shrunk by `amount` on every side. May come out empty or negative.
    pub fn inset(&self, amount: f32) -> Rect {
        Rect::new(
            self.x + amount,
            self.y + amount,
            self.width - 2.0 * amount,
            self.height - 2.0 * amount,
        )
    }

    /// The half of this rect lying on the given side.
    pub fn half(&self, zone: DropZone) -> Rect {
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;
        match zone {
            DropZone::Top => Rect::new(self.x, self.y, self.width, half_h),
            DropZone::Bottom => Rect::new(self.x, self.y + half_h, self.width, half_h),
            DropZone::Left => Rect::new(self.x, self.y, half_w, self.height),
            DropZone::Right => Rect::new(self.x + half_w, self.y, half_w, self.height),
            DropZone::Center => *self,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

// ──────────────────────────────────────────────
// Identity
// ──────────────────────────────────────────────

/// Application-owned identifier of one dockable panel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PanelId(String);

impl PanelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PanelId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PanelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for PanelId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A reference to one dockable unit of content plus the metadata the engine
/// needs to lay it out. The content itself stays with the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelHandle {
    pub id: PanelId,
    pub title: String,
    #[serde(default = "default_closable")]
    pub closable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_size: Option<Size>,
}

fn default_closable() -> bool {
    true
}

impl PanelHandle {
    pub fn new(id: impl Into<PanelId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            closable: true,
            preferred_size: None,
        }
    }

    pub fn closable(mut self, closable: bool) -> Self {
        self.closable = closable;
        self
    }

    pub fn preferred_size(mut self, size: Size) -> Self {
        self.preferred_size = Some(size);
        self
    }
}

/// Identity of a floating window. Never reused within one layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RootId(pub u64);

impl fmt::Display for RootId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which window a tree lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowId {
    Main,
    Floating(RootId),
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowId::Main => f.write_str("main"),
            WindowId::Floating(id) => write!(f, "floating {}", id),
        }
    }
}

// ──────────────────────────────────────────────
// Layout types
// ──────────────────────────────────────────────

/// Horizontal splits lay children out left to right, vertical splits top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitDirection {
    Horizontal,
    Vertical,
}

impl SplitDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitDirection::Horizontal => "horizontal",
            SplitDirection::Vertical => "vertical",
        }
    }
}

/// Whether a new node goes before (left/top) or after (right/bottom) the one it splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitSide {
    Before,
    After,
}

/// Window edge a side bar is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Geometric zone of a drop region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropZone {
    Top,
    Bottom,
    Left,
    Right,
    Center,
}

impl DropZone {
    /// Orientation and side of the split this zone produces; `None` for Center.
    pub fn split(&self) -> Option<(SplitDirection, SplitSide)> {
        match self {
            DropZone::Top => Some((SplitDirection::Vertical, SplitSide::Before)),
            DropZone::Bottom => Some((SplitDirection::Vertical, SplitSide::After)),
            DropZone::Left => Some((SplitDirection::Horizontal, SplitSide::Before)),
            DropZone::Right => Some((SplitDirection::Horizontal, SplitSide::After)),
            DropZone::Center => None,
        }
    }
}

/// The docking operation a drop resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DockOperation {
    TabInto,
    SplitTop,
    SplitBottom,
    SplitLeft,
    SplitRight,
}

impl DockOperation {
    pub fn zone(&self) -> DropZone {
        match self {
            DockOperation::TabInto => DropZone::Center,
            DockOperation::SplitTop => DropZone::Top,
            DockOperation::SplitBottom => DropZone::Bottom,
            DockOperation::SplitLeft => DropZone::Left,
            DockOperation::SplitRight => DropZone::Right,
        }
    }
}

impl From<DropZone> for DockOperation {
    fn from(zone: DropZone) -> Self {
        match zone {
            DropZone::Top => DockOperation::SplitTop,
            DropZone::Bottom => DockOperation::SplitBottom,
            DropZone::Left => DockOperation::SplitLeft,
            DropZone::Right => DockOperation::SplitRight,
            DropZone::Center => DockOperation::TabInto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_contains_is_inclusive() {
        let r = Rect::new(10.0, 10.0, 100.0, 50.0);
        assert!(r.contains(Vec2::new(10.0, 10.0)));
        assert!(r.contains(Vec2::new(110.0, 60.0)));
        assert!(!r.contains(Vec2::new(110.1, 60.0)));
    }

    #[test]
    fn rect_half_matches_side() {
        let r = Rect::new(0.0, 0.0, 800.0, 600.0);
        assert_eq!(r.half(DropZone::Right), Rect::new(400.0, 0.0, 400.0, 600.0));
        assert_eq!(r.half(DropZone::Bottom), Rect::new(0.0, 300.0, 800.0, 300.0));
        assert_eq!(r.half(DropZone::Center), r);
    }

    #[test]
    fn rect_inset_shrinks_every_side() {
        let r = Rect::new(400.0, 0.0, 400.0, 600.0);
        assert_eq!(r.inset(8.0), Rect::new(408.0, 8.0, 384.0, 584.0));
        assert!(!Rect::new(0.0, 0.0, 10.0, 10.0).inset(6.0).is_valid());
    }

    #[test]
    fn zone_split_mapping() {
        assert_eq!(
            DropZone::Right.split(),
            Some((SplitDirection::Horizontal, SplitSide::After))
        );
        assert_eq!(
            DropZone::Top.split(),
            Some((SplitDirection::Vertical, SplitSide::Before))
        );
        assert_eq!(DropZone::Center.split(), None);
        assert_eq!(DockOperation::from(DropZone::Left), DockOperation::SplitLeft);
        assert_eq!(DockOperation::SplitBottom.zone(), DropZone::Bottom);
    }

    #[test]
    fn invalid_rects() {
        assert!(!Rect::new(0.0, 0.0, 0.0, 10.0).is_valid());
        assert!(!Rect::new(f32::NAN, 0.0, 10.0, 10.0).is_valid());
        assert!(Rect::new(-5.0, -5.0, 10.0, 10.0).is_valid());
    }

    #[test]
    fn panel_handle_serde_defaults() {
        let handle: PanelHandle = serde_json::from_str(r#"{"id":"log","title":"Log"}"#).unwrap();
        assert_eq!(handle.id, PanelId::from("log"));
        assert!(handle.closable);
        assert_eq!(handle.preferred_size, None);
    }

    #[test]
    fn dock_operation_serializes_snake_case() {
        let json = serde_json::to_string(&DockOperation::SplitRight).unwrap();
        assert_eq!(json, "\"split_right\"");
        let side: Side = serde_json::from_str("\"left\"").unwrap();
        assert_eq!(side, Side::Left);
    }

    #[test]
    fn split_direction_serializes_lowercase() {
        let json = serde_json::to_string(&SplitDirection::Vertical).unwrap();
        assert_eq!(json, "\"vertical\"");
    }
}
