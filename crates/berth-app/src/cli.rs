//! Command-line argument parsing for the layout tool
//!
//! Every command loads the saved layout, applies at most one change and
//! writes the layout back when something changed.

use berth_core::Side;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Inspect and edit a saved docking layout
#[derive(Parser, Debug)]
#[command(name = "berth", version, about = "Inspect and edit a saved docking layout")]
pub struct CliArgs {
    /// Layout file (defaults to <config dir>/berth/layout.json)
    #[arg(long, value_name = "FILE", global = true)]
    pub layout: Option<PathBuf>,

    /// Settings file (defaults to <config dir>/berth/settings.json)
    #[arg(long, value_name = "FILE", global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the dock trees (the default)
    Show {
        /// Print the JSON snapshot instead
        #[arg(long)]
        json: bool,
    },
    /// Print the drop target under a pointer position without changing anything
    Resolve {
        panel: String,
        x: f32,
        y: f32,
    },
    /// Drag a panel and release it at a pointer position
    Drop {
        panel: String,
        x: f32,
        y: f32,
    },
    /// Undock a panel into a floating window at a pointer position
    Float {
        panel: String,
        x: f32,
        y: f32,
    },
    /// Dock a floating window back into the main window
    Attach {
        /// Floating window number as shown by `show`
        window: u64,
    },
    /// Close a panel (hidden or removed, per the `close_behavior` setting)
    Close { panel: String },
    /// Move a panel to a side bar
    Pin {
        panel: String,
        #[arg(value_enum)]
        side: SideArg,
    },
    /// Hide a panel, remembering where it was
    Hide { panel: String },
    /// Put a side bar or hidden panel back where it was
    Restore { panel: String },
    /// Refuse structural changes until unlocked
    Lock,
    Unlock,
    /// Discard the saved layout and start from one tab group
    Reset,
    /// Verify the layout's structural invariants
    Check,
    /// Print the effective settings
    Settings {
        /// Also write them to the settings file
        #[arg(long)]
        write: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideArg {
    Left,
    Right,
}

impl From<SideArg> for Side {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Left => Side::Left,
            SideArg::Right => Side::Right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_parses() {
        let args = CliArgs::try_parse_from(["berth"]).unwrap();
        assert_eq!(args.command, None);
        assert_eq!(args.layout, None);
    }

    #[test]
    fn drop_with_global_layout_flag() {
        let args =
            CliArgs::try_parse_from(["berth", "drop", "terminal", "10", "590", "--layout", "l.json"])
                .unwrap();
        assert_eq!(args.layout, Some(PathBuf::from("l.json")));
        assert_eq!(
            args.command,
            Some(Command::Drop {
                panel: "terminal".into(),
                x: 10.0,
                y: 590.0,
            })
        );
    }

    #[test]
    fn attach_needs_a_number() {
        assert!(CliArgs::try_parse_from(["berth", "attach", "one"]).is_err());
    }

    #[test]
    fn pin_takes_a_side() {
        let args = CliArgs::try_parse_from(["berth", "pin", "terminal", "right"]).unwrap();
        assert_eq!(
            args.command,
            Some(Command::Pin {
                panel: "terminal".into(),
                side: SideArg::Right,
            })
        );
        assert_eq!(Side::from(SideArg::Right), Side::Right);
        assert!(CliArgs::try_parse_from(["berth", "pin", "terminal", "top"]).is_err());
    }

    #[test]
    fn lock_and_restore_parse() {
        let args = CliArgs::try_parse_from(["berth", "lock"]).unwrap();
        assert_eq!(args.command, Some(Command::Lock));
        let args = CliArgs::try_parse_from(["berth", "restore", "output"]).unwrap();
        assert_eq!(
            args.command,
            Some(Command::Restore {
                panel: "output".into()
            })
        );
    }
}
