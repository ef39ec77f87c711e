pub mod decorator;
pub mod options;
pub mod transition;

mod window_manager;

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use ratatui::prelude::Rect;

use crate::constants::BASE_Z_SLOT;
use crate::menu::MenuBarId;

pub use options::{Dimensions, IconSet, IconSize, WindowOptions};
pub use transition::{Transition, TransitionKind};
pub use window_manager::{InputFocus, WindowEvent, WindowManager};

/// Signed floating rectangle origin with unsigned size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FloatRect {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

impl FloatRect {
    pub fn new(x: i32, y: i32, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + i32::from(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y + i32::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Portion of the rectangle inside `bounds`, as an unsigned `Rect`.
    pub fn visible_in(&self, bounds: Rect) -> Rect {
        let x0 = self.x.max(i32::from(bounds.x));
        let y0 = self.y.max(i32::from(bounds.y));
        let x1 = self.right().min(i32::from(bounds.right()));
        let y1 = self.bottom().min(i32::from(bounds.bottom()));
        if x1 <= x0 || y1 <= y0 {
            return Rect::default();
        }
        Rect {
            x: x0 as u16,
            y: y0 as u16,
            width: (x1 - x0) as u16,
            height: (y1 - y0) as u16,
        }
    }

    /// Linear interpolation towards `to`; `t` is clamped to `0.0..=1.0`.
    pub fn lerp(&self, to: FloatRect, t: f32) -> FloatRect {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: f32, b: f32| (a + (b - a) * t).round();
        FloatRect {
            x: mix(self.x as f32, to.x as f32) as i32,
            y: mix(self.y as f32, to.y as f32) as i32,
            width: mix(f32::from(self.width), f32::from(to.width)) as u16,
            height: mix(f32::from(self.height), f32::from(to.height)) as u16,
        }
    }
}

impl From<Rect> for FloatRect {
    fn from(rect: Rect) -> Self {
        Self {
            x: i32::from(rect.x),
            y: i32::from(rect.y),
            width: rect.width,
            height: rect.height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowState {
    #[default]
    Normal,
    Minimized,
    Maximized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowKind {
    #[default]
    Normal,
    /// Owned helper window: no minimize/maximize buttons, closes with its
    /// parent.
    Tool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub resizable: bool,
    pub closable: bool,
    pub minimizable: bool,
    pub maximizable: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            resizable: true,
            closable: true,
            minimizable: true,
            maximizable: true,
        }
    }
}

/// Shared, monotonically increasing z counter.
///
/// Windows and menu popups draw from the same sequence so a popup opened
/// after a window was raised still lands on top of it.
#[derive(Debug, Clone)]
pub struct ZCounter {
    next: Rc<Cell<u64>>,
}

impl Default for ZCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl ZCounter {
    pub fn new() -> Self {
        Self {
            next: Rc::new(Cell::new(BASE_Z_SLOT)),
        }
    }

    pub fn next(&self) -> u64 {
        let value = self.next.get();
        self.next.set(value + 1);
        value
    }

    pub fn peek(&self) -> u64 {
        self.next.get()
    }
}

/// Layout of the window frame: where the title bar, menu bar and content
/// land for a given outer geometry.
pub fn title_bar_rect(geometry: FloatRect) -> FloatRect {
    FloatRect {
        x: geometry.x + 1,
        y: geometry.y + 1,
        width: geometry.width.saturating_sub(2),
        height: 1,
    }
}

pub fn menu_bar_rect(geometry: FloatRect) -> FloatRect {
    FloatRect {
        x: geometry.x + 1,
        y: geometry.y + 2,
        width: geometry.width.saturating_sub(2),
        height: 1,
    }
}

pub fn content_rect(geometry: FloatRect, has_menu_bar: bool) -> FloatRect {
    let top = if has_menu_bar { 3 } else { 2 };
    FloatRect {
        x: geometry.x + 1,
        y: geometry.y + top,
        width: geometry.width.saturating_sub(2),
        height: geometry.height.saturating_sub(top as u16 + 1),
    }
}

#[derive(Debug, Clone)]
pub struct Window {
    id: WindowId,
    title: String,
    geometry: FloatRect,
    saved_geometry: Option<FloatRect>,
    state: WindowState,
    /// State to return to when unminimized.
    restore_state: WindowState,
    focused: bool,
    visible: bool,
    z: u64,
    parent: Option<WindowId>,
    children: Vec<WindowId>,
    kind: WindowKind,
    capabilities: Capabilities,
    icons: IconSet,
    menu_bar: Option<MenuBarId>,
    minimize_target: Option<FloatRect>,
    transition: Option<Transition>,
}

impl Window {
    fn new(id: WindowId, geometry: FloatRect, z: u64) -> Self {
        Self {
            id,
            title: String::new(),
            geometry,
            saved_geometry: None,
            state: WindowState::Normal,
            restore_state: WindowState::Normal,
            focused: false,
            visible: true,
            z,
            parent: None,
            children: Vec::new(),
            kind: WindowKind::Normal,
            capabilities: Capabilities::default(),
            icons: IconSet::default(),
            menu_bar: None,
            minimize_target: None,
            transition: None,
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn geometry(&self) -> FloatRect {
        self.geometry
    }

    pub fn saved_geometry(&self) -> Option<FloatRect> {
        self.saved_geometry
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn z_slot(&self) -> u64 {
        self.z
    }

    pub fn parent(&self) -> Option<WindowId> {
        self.parent
    }

    pub fn children(&self) -> &[WindowId] {
        &self.children
    }

    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn icons(&self) -> &IconSet {
        &self.icons
    }

    pub fn menu_bar(&self) -> Option<MenuBarId> {
        self.menu_bar
    }

    pub fn minimize_target(&self) -> Option<FloatRect> {
        self.minimize_target
    }

    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    pub fn title_bar_rect(&self) -> FloatRect {
        title_bar_rect(self.geometry)
    }

    pub fn menu_bar_rect(&self) -> Option<FloatRect> {
        self.menu_bar.map(|_| menu_bar_rect(self.geometry))
    }

    pub fn content_rect(&self) -> FloatRect {
        content_rect(self.geometry, self.menu_bar.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_in_clips_negative_offsets() {
        let bounds = Rect {
            x: 0,
            y: 0,
            width: 80,
            height: 24,
        };
        let rect = FloatRect::new(-5, 3, 20, 6);
        let visible = rect.visible_in(bounds);
        assert_eq!(visible, Rect::new(0, 3, 15, 6));
        assert_eq!(FloatRect::new(90, 0, 5, 5).visible_in(bounds), Rect::default());
    }

    #[test]
    fn lerp_hits_both_ends() {
        let a = FloatRect::new(0, 0, 10, 1);
        let b = FloatRect::new(20, 10, 30, 1);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), FloatRect::new(10, 5, 20, 1));
    }

    #[test]
    fn frame_layout_stacks_title_menu_and_content() {
        let g = FloatRect::new(10, 4, 30, 12);
        assert_eq!(title_bar_rect(g), FloatRect::new(11, 5, 28, 1));
        assert_eq!(menu_bar_rect(g), FloatRect::new(11, 6, 28, 1));
        assert_eq!(content_rect(g, true), FloatRect::new(11, 7, 28, 8));
        assert_eq!(content_rect(g, false), FloatRect::new(11, 6, 28, 9));
    }

    #[test]
    fn z_counter_is_shared_between_clones() {
        let a = ZCounter::new();
        let b = a.clone();
        let first = a.next();
        let second = b.next();
        assert_eq!(second, first + 1);
        assert_eq!(a.peek(), second + 1);
    }
}
