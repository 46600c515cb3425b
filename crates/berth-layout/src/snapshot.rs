// Layout persistence: a serializable description of every dock tree that
// references panels by id only, and the rules for rebuilding a layout from it
// against the panels the host currently has.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use berth_core::{PanelHandle, PanelId, Rect, Side, SplitDirection};

use crate::config::DockConfig;
use crate::error::SnapshotError;
use crate::floating::FloatingWindows;
use crate::node::{DockNode, Leaf, Split, WEIGHT_SUM_TOLERANCE};
use crate::stash::{Placement, Stash, StashedPanel, DEFAULT_SIDEBAR_WIDTH};
use crate::tree::Root;
use crate::DockLayout;

pub const CURRENT_VERSION: u32 = 1;

// ──────────────────────────────────────────────
// Serializable snapshot types
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub version: u32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,
    pub main: RootDescriptor,
    #[serde(default)]
    pub floating: Vec<RootDescriptor>,
    /// Only side bars that differ from the default are written.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sidebars: Vec<SideBarDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hidden: Vec<StashedDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Rect>,
    /// Floating windows only; missing means the configured default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_on_top: Option<bool>,
    pub node: Option<NodeDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideBarDescriptor {
    pub side: Side,
    #[serde(default, skip_serializing_if = "is_false")]
    pub pinned_open: bool,
    /// Missing means the default width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panel_width: Option<f32>,
    #[serde(default)]
    pub panels: Vec<StashedDescriptor>,
}

/// A side bar or hidden panel and the place it returns to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StashedDescriptor {
    pub panel: PanelId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore: Option<Placement>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl StashedDescriptor {
    fn from_entry(entry: &StashedPanel) -> Self {
        Self {
            panel: entry.panel.id.clone(),
            restore: entry.placement.clone(),
        }
    }

    fn validate(&self, path: &str) -> Result<(), SnapshotError> {
        if let Some(Placement::Floating { bounds }) = &self.restore {
            if !bounds.is_valid() {
                return Err(SnapshotError::malformed(
                    format!("{}.restore.bounds", path),
                    "bounds must be finite with a positive size",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeDescriptor {
    Leaf {
        panels: Vec<PanelId>,
        #[serde(default)]
        selected: usize,
    },
    Split {
        orientation: SplitDirection,
        weights: Vec<f32>,
        children: Vec<NodeDescriptor>,
    },
}

impl NodeDescriptor {
    fn from_node(node: &DockNode) -> Self {
        match node {
            DockNode::Leaf(leaf) => NodeDescriptor::Leaf {
                panels: leaf.panels().iter().map(|p| p.id.clone()).collect(),
                selected: leaf.selected(),
            },
            DockNode::Split(split) => NodeDescriptor::Split {
                orientation: split.direction(),
                weights: split.weights().to_vec(),
                children: split.children().iter().map(Self::from_node).collect(),
            },
        }
    }

    fn validate(&self, path: &str) -> Result<(), SnapshotError> {
        match self {
            NodeDescriptor::Leaf { panels, .. } => {
                if panels.is_empty() {
                    return Err(SnapshotError::malformed(
                        format!("{}.panels", path),
                        "leaf has no panels",
                    ));
                }
                Ok(())
            }
            NodeDescriptor::Split {
                weights, children, ..
            } => {
                if children.len() < 2 {
                    return Err(SnapshotError::malformed(
                        format!("{}.children", path),
                        format!("split needs at least 2 children, got {}", children.len()),
                    ));
                }
                if weights.len() != children.len() {
                    return Err(SnapshotError::malformed(
                        format!("{}.weights", path),
                        format!(
                            "{} weights for {} children",
                            weights.len(),
                            children.len()
                        ),
                    ));
                }
                for (i, weight) in weights.iter().enumerate() {
                    if !weight.is_finite() || *weight <= 0.0 {
                        return Err(SnapshotError::malformed(
                            format!("{}.weights[{}]", path, i),
                            format!("weight {} is not strictly positive", weight),
                        ));
                    }
                }
                let sum: f32 = weights.iter().sum();
                if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
                    return Err(SnapshotError::malformed(
                        format!("{}.weights", path),
                        format!("weights sum to {}", sum),
                    ));
                }
                for (i, child) in children.iter().enumerate() {
                    child.validate(&format!("{}.children[{}]", path, i))?;
                }
                Ok(())
            }
        }
    }
}

impl LayoutSnapshot {
    /// Structural checks. Panel ids are not checked here; unknown ids are
    /// skipped during restore.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.version != CURRENT_VERSION {
            return Err(SnapshotError::malformed(
                "$.version",
                format!("unsupported version {}", self.version),
            ));
        }
        if let Some(node) = &self.main.node {
            node.validate("$.main.node")?;
        }
        for (i, root) in self.floating.iter().enumerate() {
            let path = format!("$.floating[{}]", i);
            match root.bounds {
                Some(bounds) if bounds.is_valid() => {}
                Some(_) => {
                    return Err(SnapshotError::malformed(
                        format!("{}.bounds", path),
                        "bounds must be finite with a positive size",
                    ))
                }
                None => {
                    return Err(SnapshotError::malformed(
                        format!("{}.bounds", path),
                        "floating window without bounds",
                    ))
                }
            }
            match &root.node {
                Some(node) => node.validate(&format!("{}.node", path))?,
                None => {
                    return Err(SnapshotError::malformed(
                        format!("{}.node", path),
                        "floating window without a tree",
                    ))
                }
            }
        }
        let mut sides = HashSet::new();
        for (i, bar) in self.sidebars.iter().enumerate() {
            let path = format!("$.sidebars[{}]", i);
            if !sides.insert(bar.side) {
                return Err(SnapshotError::malformed(
                    format!("{}.side", path),
                    format!("{} side bar listed twice", bar.side.as_str()),
                ));
            }
            if let Some(width) = bar.panel_width {
                if !width.is_finite() || width <= 0.0 {
                    return Err(SnapshotError::malformed(
                        format!("{}.panel_width", path),
                        format!("width {} is not strictly positive", width),
                    ));
                }
            }
            for (j, entry) in bar.panels.iter().enumerate() {
                entry.validate(&format!("{}.panels[{}]", path, j))?;
            }
        }
        for (i, entry) in self.hidden.iter().enumerate() {
            entry.validate(&format!("$.hidden[{}]", i))?;
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}

// ──────────────────────────────────────────────
// Serialize / restore
// ──────────────────────────────────────────────

/// Describe the whole layout. Floating windows keep their z-order.
pub fn serialize(layout: &DockLayout) -> LayoutSnapshot {
    let stash = layout.stash();
    LayoutSnapshot {
        version: CURRENT_VERSION,
        locked: layout.is_locked(),
        main: RootDescriptor {
            bounds: None,
            always_on_top: None,
            node: layout.main().node().map(NodeDescriptor::from_node),
        },
        floating: layout
            .floating()
            .windows()
            .iter()
            .map(|window| RootDescriptor {
                bounds: Some(window.bounds()),
                always_on_top: Some(window.always_on_top()),
                node: window.root().node().map(NodeDescriptor::from_node),
            })
            .collect(),
        sidebars: Side::ALL
            .into_iter()
            .filter(|side| !stash.sidebar(*side).is_default())
            .map(|side| {
                let bar = stash.sidebar(side);
                SideBarDescriptor {
                    side,
                    pinned_open: bar.is_pinned_open(),
                    panel_width: (bar.panel_width() != DEFAULT_SIDEBAR_WIDTH)
                        .then_some(bar.panel_width()),
                    panels: bar.panels().iter().map(StashedDescriptor::from_entry).collect(),
                }
            })
            .collect(),
        hidden: stash.hidden().iter().map(StashedDescriptor::from_entry).collect(),
    }
}

/// Rebuild a layout from `snapshot`, keeping only `available` panels.
///
/// Unknown ids are skipped and the trees collapse around them. Side bar and
/// hidden panels go back where they were. Available panels the snapshot does
/// not mention anywhere are appended to the main window as one new tab group.
pub fn restore(
    snapshot: &LayoutSnapshot,
    available: &[PanelHandle],
    config: DockConfig,
) -> Result<DockLayout, SnapshotError> {
    snapshot.validate()?;

    let mut registry: HashMap<&PanelId, &PanelHandle> = HashMap::new();
    for panel in available {
        registry.entry(&panel.id).or_insert(panel);
    }
    let mut builder = Builder {
        registry,
        used: HashSet::new(),
    };

    let main_node = snapshot.main.node.as_ref().and_then(|n| builder.build(n));
    let mut main = Root::new(main_node);

    let config = config.sanitized();
    let mut floating = FloatingWindows::new(&config);
    for descriptor in &snapshot.floating {
        let (Some(node), Some(bounds)) = (descriptor.node.as_ref(), descriptor.bounds) else {
            continue;
        };
        match builder.build(node) {
            Some(node) => {
                let id = floating.insert_root(node, bounds);
                if let Some(always_on_top) = descriptor.always_on_top {
                    floating.set_always_on_top(id, always_on_top);
                }
            }
            None => log::debug!("dropping floating window with no available panels"),
        }
    }

    let mut stash = Stash::default();
    for descriptor in &snapshot.sidebars {
        let bar = stash.sidebar_mut(descriptor.side);
        bar.set_pinned_open(descriptor.pinned_open);
        bar.set_panel_width(descriptor.panel_width.unwrap_or(DEFAULT_SIDEBAR_WIDTH));
        for entry in builder.stashed(&descriptor.panels) {
            stash.pin(descriptor.side, entry, None);
        }
    }
    for entry in builder.stashed(&snapshot.hidden) {
        stash.hide(entry);
    }

    let mut seen = HashSet::new();
    let leftovers: Vec<PanelHandle> = available
        .iter()
        .filter(|p| !builder.used.contains(&p.id) && seen.insert(&p.id))
        .cloned()
        .collect();
    if let Some(leaf) = Leaf::with_panels(leftovers, 0) {
        log::debug!("appending {} panel(s) missing from the snapshot", leaf.len());
        main.append(DockNode::Leaf(leaf));
    }

    let mut layout = DockLayout::from_parts(main, floating, config);
    layout.stash = stash;
    layout.locked = snapshot.locked;
    Ok(layout)
}

/// Like [`restore`], but a malformed snapshot yields the default layout (all
/// available panels as tabs of one group) together with the error.
pub fn restore_or_default(
    snapshot: &LayoutSnapshot,
    available: &[PanelHandle],
    config: DockConfig,
) -> (DockLayout, Option<SnapshotError>) {
    match restore(snapshot, available, config) {
        Ok(layout) => (layout, None),
        Err(err) => {
            log::error!("Failed to restore layout, using default: {}", err);
            (DockLayout::with_panels(available.to_vec(), config), Some(err))
        }
    }
}

struct Builder<'a> {
    registry: HashMap<&'a PanelId, &'a PanelHandle>,
    used: HashSet<PanelId>,
}

impl Builder<'_> {
    /// Claim a panel id. `None` for unknown ids and ids already placed.
    fn claim(&mut self, id: &PanelId) -> Option<PanelHandle> {
        let Some(handle) = self.registry.get(id) else {
            log::debug!("skipping unknown panel `{}`", id);
            return None;
        };
        if !self.used.insert(id.clone()) {
            log::warn!("panel `{}` appears twice in the layout, keeping the first", id);
            return None;
        }
        Some((*handle).clone())
    }

    fn stashed(&mut self, descriptors: &[StashedDescriptor]) -> Vec<StashedPanel> {
        descriptors
            .iter()
            .filter_map(|d| {
                self.claim(&d.panel).map(|panel| StashedPanel {
                    panel,
                    placement: d.restore.clone(),
                })
            })
            .collect()
    }

    /// Build the available part of a descriptor; `None` when nothing survives.
    fn build(&mut self, descriptor: &NodeDescriptor) -> Option<DockNode> {
        match descriptor {
            NodeDescriptor::Leaf { panels, selected } => {
                let selected_id = panels.get(*selected);
                let mut kept = Vec::with_capacity(panels.len());
                let mut new_selected = None;
                for id in panels {
                    let Some(handle) = self.claim(id) else {
                        continue;
                    };
                    if Some(id) == selected_id {
                        new_selected = Some(kept.len());
                    }
                    kept.push(handle);
                }
                let selected = new_selected.unwrap_or(*selected);
                Leaf::with_panels(kept, selected).map(DockNode::Leaf)
            }
            NodeDescriptor::Split {
                orientation,
                weights,
                children,
            } => {
                let mut kept_children = Vec::with_capacity(children.len());
                let mut kept_weights = Vec::with_capacity(children.len());
                for (child, weight) in children.iter().zip(weights) {
                    if let Some(node) = self.build(child) {
                        kept_children.push(node);
                        kept_weights.push(*weight);
                    }
                }
                match kept_children.len() {
                    0 => None,
                    1 => kept_children.pop(),
                    _ => Some(DockNode::Split(Split::from_parts(
                        *orientation,
                        kept_children,
                        kept_weights,
                    ))),
                }
            }
        }
    }
}

impl DockLayout {
    pub fn snapshot(&self) -> LayoutSnapshot {
        serialize(self)
    }
}
