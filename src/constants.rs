//! Shared crate-wide constants.

use std::time::Duration;

/// Hover time over a submenu row before the submenu opens on its own.
pub const SUBMENU_OPEN_DELAY: Duration = Duration::from_millis(501);

/// Time the pointer may rest elsewhere in a parent popup before its open
/// submenu closes.
pub const SUBMENU_CLOSE_DELAY: Duration = Duration::from_millis(500);

/// Length of the title-bar transition played by minimize, unminimize,
/// maximize and restore.
pub const TITLEBAR_TRANSITION: Duration = Duration::from_millis(200);

/// First z-slot handed out to windows.
pub const BASE_Z_SLOT: u64 = 5;

/// Offset added to the shared z counter for menu popups so they always draw
/// above windows.
pub const MAX_MENU_NESTING: u64 = 1000;

/// Smallest outer window size. Frame, title bar and one content row.
pub const WINDOW_MIN_WIDTH: u16 = 6;
pub const WINDOW_MIN_HEIGHT: u16 = 4;

/// Outer size used when an open request names no dimensions.
pub const DEFAULT_WINDOW_WIDTH: u16 = 40;
pub const DEFAULT_WINDOW_HEIGHT: u16 = 12;

/// Rows taken by the frame above and below the content: top border, title
/// bar, bottom border.
pub const FRAME_ROWS: u16 = 3;

/// Columns taken by the left and right borders.
pub const FRAME_COLUMNS: u16 = 2;

/// Label shown by a popup built from an empty item list.
pub const EMPTY_MENU_LABEL: &str = "(Empty)";
