//! Window lifecycle and hierarchical menus for a simulated desktop drawn on
//! a character-cell surface.
//!
//! [`WindowManager`](window::WindowManager) owns every window and the
//! [`MenuEngine`](menu::MenuEngine) shared by menu bars and context menus.
//! Hosts feed it crossterm events, call `tick` when a deadline passes and
//! paint it with [`DesktopRenderer`](render::DesktopRenderer).

pub mod access_keys;
pub mod config;
pub mod constants;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod focus;
pub mod keybindings;
pub mod menu;
pub mod positioner;
pub mod render;
pub mod scheduler;
pub mod tracing_sub;
pub mod ui;
pub mod window;

pub use config::{EngineConfig, LayoutDirection};
pub use error::{WmError, WmResult};
pub use window::{WindowEvent, WindowId, WindowManager, WindowOptions};
