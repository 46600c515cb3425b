//! Property tests: random drag, float, close, pin and attach sequences must
//! keep every tree well formed, every panel in exactly one place, and survive
//! a snapshot round trip.

use std::collections::BTreeSet;

use berth_core::{PanelHandle, PanelId, Rect, RootId, Side, Vec2};
use berth_layout::snapshot::{restore, serialize};
use berth_layout::{DockConfig, DockLayout, DragSession, LayoutSnapshot, NodeDescriptor};
use proptest::prelude::*;

const WINDOW: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 800.0,
    height: 600.0,
};

#[derive(Debug, Clone)]
enum Op {
    Drag { panel: usize, x: f32, y: f32 },
    Float { panel: usize, x: f32, y: f32 },
    Close { panel: usize },
    Add,
    Select { panel: usize },
    Attach { window: usize },
    Pin { panel: usize, right: bool },
    Unstash { panel: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0usize..32, -100.0f32..1600.0, -100.0f32..1200.0)
            .prop_map(|(panel, x, y)| Op::Drag { panel, x, y }),
        1 => (0usize..32, 0.0f32..1200.0, 0.0f32..900.0)
            .prop_map(|(panel, x, y)| Op::Float { panel, x, y }),
        1 => (0usize..32).prop_map(|panel| Op::Close { panel }),
        1 => Just(Op::Add),
        1 => (0usize..32).prop_map(|panel| Op::Select { panel }),
        1 => (0usize..4).prop_map(|window| Op::Attach { window }),
        1 => (0usize..32, any::<bool>()).prop_map(|(panel, right)| Op::Pin { panel, right }),
        1 => (0usize..32).prop_map(|panel| Op::Unstash { panel }),
    ]
}

fn handle(id: &str) -> PanelHandle {
    PanelHandle::new(id, id.to_uppercase())
}

fn initial_layout() -> (DockLayout, BTreeSet<PanelId>) {
    let panels: Vec<_> = (0..4).map(|i| handle(&format!("p{}", i))).collect();
    let expected = panels.iter().map(|p| p.id.clone()).collect();
    let mut layout = DockLayout::with_panels(panels, DockConfig::default());
    layout.set_main_bounds(WINDOW);
    (layout, expected)
}

fn pick(layout: &DockLayout, index: usize) -> Option<PanelHandle> {
    let ids = layout.panel_ids();
    if ids.is_empty() {
        return None;
    }
    layout.panel(&ids[index % ids.len()]).cloned()
}

fn apply(layout: &mut DockLayout, expected: &mut BTreeSet<PanelId>, next: &mut usize, op: &Op) {
    match op {
        Op::Drag { panel, x, y } => {
            let Some(panel) = pick(layout, *panel) else {
                return;
            };
            let mut drag = DragSession::new();
            drag.drag_started(layout, panel);
            drag.pointer_moved(layout, Vec2::new(*x, *y), &mut ());
            drag.pointer_released(layout, Vec2::new(*x, *y), &mut ());
        }
        Op::Float { panel, x, y } => {
            if let Some(panel) = pick(layout, *panel) {
                layout.float_panel(&panel, Vec2::new(*x, *y)).unwrap();
            }
        }
        Op::Close { panel } => {
            // Closing hides, so the panel stays known to the layout.
            if let Some(panel) = pick(layout, *panel) {
                layout.close_panel(&panel.id).unwrap();
            }
        }
        Op::Add => {
            let panel = handle(&format!("n{}", next));
            *next += 1;
            expected.insert(panel.id.clone());
            layout.add_panel(panel).unwrap();
        }
        Op::Select { panel } => {
            if let Some(panel) = pick(layout, *panel) {
                layout.select_tab(&panel.id).unwrap();
            }
        }
        Op::Attach { window } => {
            let ids: Vec<RootId> = layout.floating().windows().iter().map(|w| w.id()).collect();
            if !ids.is_empty() {
                layout.attach_floating(ids[window % ids.len()]).unwrap();
            }
        }
        Op::Pin { panel, right } => {
            let side = if *right { Side::Right } else { Side::Left };
            if let Some(panel) = pick(layout, *panel) {
                layout.pin_to_sidebar(&panel.id, side, None).unwrap();
            }
        }
        Op::Unstash { panel } => {
            let ids = stashed_ids(layout);
            if ids.is_empty() {
                return;
            }
            let id = &ids[panel % ids.len()];
            if layout.stash().is_hidden(id) {
                layout.restore_hidden(id).unwrap();
            } else {
                layout.restore_from_sidebar(id).unwrap();
            }
        }
    }
}

fn stashed_ids(layout: &DockLayout) -> Vec<PanelId> {
    layout
        .stash()
        .entries()
        .map(|entry| entry.panel.id.clone())
        .collect()
}

fn run(ops: &[Op]) -> (DockLayout, BTreeSet<PanelId>) {
    let (mut layout, mut expected) = initial_layout();
    let mut next = 0;
    for op in ops {
        apply(&mut layout, &mut expected, &mut next, op);
    }
    (layout, expected)
}

fn assert_layout_invariants(layout: &DockLayout, expected: &BTreeSet<PanelId>) {
    if let Err(err) = layout.check_invariants() {
        panic!("{}\n{}", err, layout);
    }
    let mut ids = layout.panel_ids();
    ids.extend(stashed_ids(layout));
    let unique: BTreeSet<PanelId> = ids.iter().cloned().collect();
    assert_eq!(ids.len(), unique.len(), "duplicate panel ids:\n{}", layout);
    assert_eq!(&unique, expected, "panel set changed:\n{}", layout);
}

fn nodes_approx_eq(a: &NodeDescriptor, b: &NodeDescriptor) -> bool {
    match (a, b) {
        (
            NodeDescriptor::Leaf {
                panels: pa,
                selected: sa,
            },
            NodeDescriptor::Leaf {
                panels: pb,
                selected: sb,
            },
        ) => pa == pb && sa == sb,
        (
            NodeDescriptor::Split {
                orientation: oa,
                weights: wa,
                children: ca,
            },
            NodeDescriptor::Split {
                orientation: ob,
                weights: wb,
                children: cb,
            },
        ) => {
            oa == ob
                && wa.len() == wb.len()
                && wa.iter().zip(wb).all(|(x, y)| (x - y).abs() < 1e-4)
                && ca.len() == cb.len()
                && ca.iter().zip(cb).all(|(x, y)| nodes_approx_eq(x, y))
        }
        _ => false,
    }
}

fn snapshots_approx_eq(a: &LayoutSnapshot, b: &LayoutSnapshot) -> bool {
    let roots_eq = |x: &Option<NodeDescriptor>, y: &Option<NodeDescriptor>| match (x, y) {
        (Some(x), Some(y)) => nodes_approx_eq(x, y),
        (None, None) => true,
        _ => false,
    };
    a.version == b.version
        && a.locked == b.locked
        && a.sidebars == b.sidebars
        && a.hidden == b.hidden
        && roots_eq(&a.main.node, &b.main.node)
        && a.floating.len() == b.floating.len()
        && a.floating
            .iter()
            .zip(&b.floating)
            .all(|(x, y)| {
                x.bounds == y.bounds
                    && x.always_on_top == y.always_on_top
                    && roots_eq(&x.node, &y.node)
            })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_operations_preserve_invariants(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let (mut layout, mut expected) = initial_layout();
        let mut next = 0;
        for op in &ops {
            apply(&mut layout, &mut expected, &mut next, op);
            assert_layout_invariants(&layout, &expected);
        }
    }

    #[test]
    fn resolution_is_pure(
        ops in prop::collection::vec(op_strategy(), 0..30),
        x in -100.0f32..1600.0,
        y in -100.0f32..1200.0,
        panel in 0usize..32,
    ) {
        let (layout, _) = run(&ops);
        let Some(panel) = pick(&layout, panel) else {
            return Ok(());
        };
        let revision = layout.revision();
        let first = layout.resolve_drop(Vec2::new(x, y), &panel.id);
        let second = layout.resolve_drop(Vec2::new(x, y), &panel.id);
        prop_assert_eq!(first, second);
        prop_assert_eq!(layout.revision(), revision);
    }

    #[test]
    fn resolved_targets_apply_cleanly(
        ops in prop::collection::vec(op_strategy(), 0..30),
        x in -100.0f32..1600.0,
        y in -100.0f32..1200.0,
        panel in 0usize..32,
    ) {
        let (mut layout, expected) = run(&ops);
        let Some(panel) = pick(&layout, panel) else {
            return Ok(());
        };
        if let Some(target) = layout.resolve_drop(Vec2::new(x, y), &panel.id) {
            let outcome = layout.apply_drop(&panel, &target);
            prop_assert!(outcome.is_ok(), "{:?} failed: {:?}", target, outcome);
        }
        assert_layout_invariants(&layout, &expected);
    }

    #[test]
    fn snapshot_round_trip(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let (layout, _) = run(&ops);
        let snapshot = serialize(&layout);
        let json = snapshot.to_json().unwrap();
        let parsed = LayoutSnapshot::from_json(&json).unwrap();

        let mut ids = layout.panel_ids();
        ids.extend(stashed_ids(&layout));
        let available: Vec<PanelHandle> = ids
            .iter()
            .filter_map(|id| layout.panel(id).cloned())
            .collect();
        let restored = restore(&parsed, &available, DockConfig::default()).unwrap();
        prop_assert!(restored.check_invariants().is_ok());
        prop_assert!(snapshots_approx_eq(&serialize(&restored), &snapshot));
    }
}
