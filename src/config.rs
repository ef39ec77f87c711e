//! Engine configuration.
//!
//! Every timing constant and environment input the engine consults lives
//! here so hosts and tests can inject their own values.

use std::time::Duration;

use ratatui::layout::Size;

use crate::constants::{SUBMENU_CLOSE_DELAY, SUBMENU_OPEN_DELAY, TITLEBAR_TRANSITION};

/// Writing/layout direction of the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutDirection {
    #[default]
    Ltr,
    Rtl,
}

impl LayoutDirection {
    /// Whether a horizontal arrow pointing right moves "forward" (towards
    /// submenus and the next top-level menu).
    pub fn is_forward(self, right: bool) -> bool {
        (self == LayoutDirection::Ltr) == right
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub submenu_open_delay: Duration,
    pub submenu_close_delay: Duration,
    /// Zero disables title-bar animation entirely.
    pub transition_duration: Duration,
    /// Suppresses hover auto-close of submenus. Meant for deterministic
    /// inspection and tests.
    pub debug_keep_menus_open: bool,
    pub direction: LayoutDirection,
    pub viewport: Size,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            submenu_open_delay: SUBMENU_OPEN_DELAY,
            submenu_close_delay: SUBMENU_CLOSE_DELAY,
            transition_duration: TITLEBAR_TRANSITION,
            debug_keep_menus_open: false,
            direction: LayoutDirection::Ltr,
            viewport: Size::new(80, 24),
        }
    }
}

impl EngineConfig {
    pub fn with_direction(mut self, direction: LayoutDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_viewport(mut self, viewport: Size) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_transition_duration(mut self, duration: Duration) -> Self {
        self.transition_duration = duration;
        self
    }

    pub fn with_debug_keep_menus_open(mut self, keep: bool) -> Self {
        self.debug_keep_menus_open = keep;
        self
    }

    pub fn with_submenu_delays(mut self, open: Duration, close: Duration) -> Self {
        self.submenu_open_delay = open;
        self.submenu_close_delay = close;
        self
    }

    pub fn animations_enabled(&self) -> bool {
        !self.transition_duration.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_delays_stay_independent() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.submenu_open_delay, Duration::from_millis(501));
        assert_eq!(cfg.submenu_close_delay, Duration::from_millis(500));
        assert!(cfg.animations_enabled());
    }

    #[test]
    fn forward_arrow_follows_direction() {
        assert!(LayoutDirection::Ltr.is_forward(true));
        assert!(!LayoutDirection::Ltr.is_forward(false));
        assert!(LayoutDirection::Rtl.is_forward(false));
        assert!(!LayoutDirection::Rtl.is_forward(true));
    }
}
