//! Input focus targets and the "last focus outside menus" tracker.
//!
//! Dismissing a menu hands keyboard focus back to whatever held it before
//! the menu took over. The tracker records every focus change that lands
//! outside menu surfaces; menu surfaces never reach it.

use std::fmt;

use crate::window::WindowId;

/// Something that can hold keyboard focus outside the menu system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FocusTarget {
    /// The desktop surface itself (icons, wallpaper).
    Desktop,
    /// A window's content area.
    Window(WindowId),
    /// A specific control inside a window, numbered by the application.
    Control { window: WindowId, control: u32 },
}

impl FocusTarget {
    pub fn window(self) -> Option<WindowId> {
        match self {
            FocusTarget::Desktop => None,
            FocusTarget::Window(id) | FocusTarget::Control { window: id, .. } => Some(id),
        }
    }
}

/// Injectable service remembering where focus was before a menu opened.
pub trait FocusTracking: fmt::Debug {
    fn record(&mut self, target: FocusTarget);
    fn last_outside_menus(&self) -> Option<FocusTarget>;
    /// Drop any memory of a window that no longer exists.
    fn forget_window(&mut self, id: WindowId);
}

#[derive(Debug, Clone, Default)]
pub struct FocusTracker {
    last: Option<FocusTarget>,
}

impl FocusTracker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FocusTracking for FocusTracker {
    fn record(&mut self, target: FocusTarget) {
        self.last = Some(target);
    }

    fn last_outside_menus(&self) -> Option<FocusTarget> {
        self.last
    }

    fn forget_window(&mut self, id: WindowId) {
        if self.last.and_then(FocusTarget::window) == Some(id) {
            self.last = None;
        }
    }
}
