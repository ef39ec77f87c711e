//! Error and degradation types for the window and menu engine.
//!
//! Only caller logic errors are surfaced as [`WmError`]. Everything the
//! engine can recover from on its own is reported as a [`Degradation`],
//! logged, and otherwise ignored.

use thiserror::Error;

use crate::menu::{MenuBarId, PopupId};
use crate::window::WindowId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WmError {
    #[error("window {id} is closed or was never opened")]
    InvalidWindowState { id: WindowId },
    #[error("menu bar {id} does not exist")]
    UnknownMenuBar { id: MenuBarId },
    #[error("menu popup {id} does not exist")]
    UnknownPopup { id: PopupId },
}

pub type WmResult<T> = Result<T, WmError>;

/// Recoverable inconsistencies. The engine falls back silently and records
/// the reason in the log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Degradation {
    #[error("transition for window {id} could not be measured ({reason}); applying instantly")]
    DegradedAnimation { id: WindowId, reason: &'static str },
    #[error("menu popup {id} has no interactive items; showing placeholder")]
    EmptyMenu { id: PopupId },
    #[error("submenu {label:?} has no items; showing placeholder")]
    MissingSubmenuTarget { label: String },
}

impl Degradation {
    pub(crate) fn report(self) {
        tracing::warn!(degradation = %self, "falling back");
    }
}
