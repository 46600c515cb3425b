// Berth: command-line host for the docking layout engine.

mod cli;
mod session;
mod settings;

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use clap::Parser;

use berth_core::{PanelHandle, PanelId, Rect, RootId, Vec2};
use berth_layout::{
    DockLayout, DockObserver, DragSession, DropResult, DropTarget, FloatingState,
};

use cli::{CliArgs, Command};
use settings::BerthSettings;

/// Reports the engine's callbacks on the log.
struct LogObserver;

impl DockObserver for LogObserver {
    fn tree_changed(&mut self, layout: &DockLayout) {
        log::info!("layout changed (revision {})", layout.revision());
    }

    fn preview_changed(&mut self, target: Option<&DropTarget>) {
        match target {
            Some(t) => log::debug!("preview {:?} at {}", t.operation, t.node),
            None => log::debug!("preview cleared"),
        }
    }

    fn floating_created(&mut self, id: RootId, bounds: Rect) {
        log::info!("opened floating window {} at {:?}", id, bounds);
    }

    fn floating_destroyed(&mut self, id: RootId) {
        log::info!("closed floating window {}", id);
    }

    fn floating_state_changed(&mut self, id: RootId, state: FloatingState) {
        log::debug!("floating window {} is {:?}", id, state);
    }

    fn floating_moved(&mut self, id: RootId, bounds: Rect) {
        log::info!("moved floating window {} to {:?}", id, bounds);
    }

    fn floating_pin_changed(&mut self, id: RootId, always_on_top: bool) {
        log::info!("floating window {} always on top: {}", id, always_on_top);
    }

    fn lock_changed(&mut self, locked: bool) {
        log::info!("layout {}", if locked { "locked" } else { "unlocked" });
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = CliArgs::parse();

    let settings = match &args.settings {
        Some(path) => settings::load_settings_from(path),
        None => settings::load_settings(),
    };
    let layout_path = match args.layout.clone() {
        Some(path) => path,
        None => session::default_layout_path()
            .context("could not determine the config directory; pass --layout")?,
    };

    let command = args.command.unwrap_or(Command::Show { json: false });
    if let Command::Settings { write } = command {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        if write {
            let path = match args.settings {
                Some(path) => path,
                None => settings::settings_path()
                    .context("could not determine the config directory; pass --settings")?,
            };
            settings::save_settings_to(&path, &settings);
        }
        return Ok(());
    }
    run(command, &settings, layout_path)
}

fn run(command: Command, settings: &BerthSettings, layout_path: PathBuf) -> anyhow::Result<()> {
    let mut layout = session::load_layout(&layout_path, settings);
    let revision = layout.revision();
    let mut save = false;

    match command {
        Command::Show { json: true } => println!("{}", layout.snapshot().to_json()?),
        Command::Show { json: false } => print!("{}", layout),
        Command::Resolve { panel, x, y } => {
            let panel = PanelId::new(panel);
            match layout.resolve_drop(Vec2::new(x, y), &panel) {
                Some(target) => println!(
                    "{:?} at {} (preview {:?})",
                    target.operation, target.node, target.preview
                ),
                None => println!("no drop target"),
            }
        }
        Command::Drop { panel, x, y } => {
            let handle = find_handle(&layout, &panel)?;
            let position = Vec2::new(x, y);
            let mut drag = DragSession::new();
            let mut observer = LogObserver;
            if !drag.drag_started(&layout, handle) {
                bail!("the layout is locked");
            }
            drag.pointer_moved(&layout, position, &mut observer);
            match drag.pointer_released(&mut layout, position, &mut observer) {
                DropResult::Docked(_) => println!("docked `{}`", panel),
                DropResult::Floated(_) => println!("floated `{}`", panel),
                DropResult::Cancelled => println!("nothing to do"),
            }
        }
        Command::Float { panel, x, y } => {
            let handle = find_handle(&layout, &panel)?;
            let outcome = layout.float_panel(&handle, Vec2::new(x, y))?;
            if let Some(id) = outcome.created {
                println!("floated `{}` into window {}", panel, id);
            }
        }
        Command::Attach { window } => layout.attach_floating(RootId(window))?,
        Command::Close { panel } => {
            layout.close_panel(&PanelId::new(panel))?;
        }
        Command::Pin { panel, side } => {
            layout.pin_to_sidebar(&PanelId::new(panel), side.into(), None)?;
        }
        Command::Hide { panel } => {
            layout.hide_panel(&PanelId::new(panel))?;
        }
        Command::Restore { panel } => {
            let id = PanelId::new(panel);
            if layout.stash().is_hidden(&id) {
                layout.restore_hidden(&id)?;
            } else {
                layout.restore_from_sidebar(&id)?;
            }
        }
        Command::Lock => layout.set_locked(true),
        Command::Unlock => layout.set_locked(false),
        Command::Check => {
            layout.check_invariants()?;
            println!("ok: {} panel(s)", layout.panel_count());
        }
        Command::Reset => {
            layout = session::default_layout(settings);
            save = true;
        }
        Command::Settings { .. } => {}
    }

    // Lock changes are persisted but do not bump the revision.
    let changed = layout.revision() != revision || !layout.pending_events().is_empty();
    layout.dispatch_events(&mut LogObserver);
    if save || changed {
        session::save_layout(&layout_path, &layout)?;
        print!("{}", layout);
    }
    Ok(())
}

fn find_handle(layout: &DockLayout, id: &str) -> anyhow::Result<PanelHandle> {
    layout
        .panel(&PanelId::new(id))
        .cloned()
        .ok_or_else(|| anyhow!("no panel `{}` in the layout", id))
}
