//! Hierarchical menus: menu bars, popups and context menus.
//!
//! All popups live in one arena owned by [`MenuEngine`], addressed by
//! [`PopupId`]. Parent/child links are ids, never references, so closing
//! or destroying a subtree is a walk over the arena.

mod context_menu;
mod engine;
mod item;
mod menu_bar;
mod popup;

use std::fmt;

pub use engine::{FocusRequest, HoverTarget, MenuEngine, MenuNotice};
pub use item::{
    CheckboxItem, CommandItem, Enabled, MenuItem, RadioGroup, RadioOption, SubmenuItem,
    TopLevelMenu,
};
pub use menu_bar::{MenuBar, MenuBarEntry};
pub use popup::{MenuPopup, MenuRow, PopupOwner, RowDisplay, RowKind, SubmenuState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PopupId(pub(crate) u64);

impl fmt::Display for PopupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "popup#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MenuBarId(pub(crate) u64);

impl fmt::Display for MenuBarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "menubar#{}", self.0)
    }
}
