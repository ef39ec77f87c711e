use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::{Rect, Size};
use tracing::{debug, trace};

use super::decorator::{HeaderAction, header_action};
use super::{
    Capabilities, Dimensions, FloatRect, IconSet, Transition, TransitionKind, Window, WindowId,
    WindowKind, WindowOptions, WindowState, ZCounter, menu_bar_rect, title_bar_rect,
};
use crate::config::EngineConfig;
use crate::constants::{
    DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH, FRAME_COLUMNS, FRAME_ROWS, WINDOW_MIN_HEIGHT,
    WINDOW_MIN_WIDTH,
};
use crate::error::{Degradation, WmError, WmResult};
use crate::focus::{FocusTarget, FocusTracking};
use crate::keybindings::{Action, KeyBindings};
use crate::menu::{MenuBarId, MenuEngine, MenuItem, MenuNotice, PopupId, PopupOwner, TopLevelMenu};
use crate::scheduler::{Clock, SystemClock};

const DOUBLE_CLICK: Duration = Duration::from_millis(500);

/// Notifications emitted by window operations, drained by the host with
/// [`WindowManager::drain_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    Focus,
    Blur,
    Minimize,
    Restore,
    Maximize,
    Unmaximize,
    Closed,
    TitleChange,
    IconChange,
    Resize,
}

/// Where keyboard input currently goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFocus {
    Nowhere,
    /// An open menu or a menu bar with roving focus.
    Menus,
    Target(FocusTarget),
}

#[derive(Debug, Clone, Copy)]
struct HeaderDrag {
    id: WindowId,
    initial_x: i32,
    initial_y: i32,
    start_x: u16,
    start_y: u16,
}

/// Window registry, z-order, focus and input routing for the desktop.
///
/// Windows live in an arena keyed by [`WindowId`]; handles stay valid
/// after close and every operation on a closed window reports
/// [`WmError::InvalidWindowState`].
#[derive(Debug)]
pub struct WindowManager {
    windows: BTreeMap<WindowId, Window>,
    next_id: u64,
    z: ZCounter,
    focused: Option<WindowId>,
    input_target: Option<FocusTarget>,
    menus: MenuEngine,
    config: EngineConfig,
    clock: Rc<dyn Clock>,
    keybindings: KeyBindings,
    work_area: Rect,
    events: Vec<(WindowId, WindowEvent)>,
    drag_header: Option<HeaderDrag>,
    last_header_click: Option<(WindowId, Instant)>,
    hovered_bar: Option<MenuBarId>,
}

impl WindowManager {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, Rc::new(SystemClock))
    }

    pub fn with_clock(config: EngineConfig, clock: Rc<dyn Clock>) -> Self {
        let z = ZCounter::new();
        let menus = MenuEngine::new(config, clock.clone()).with_z_counter(z.clone());
        Self {
            windows: BTreeMap::new(),
            next_id: 1,
            z,
            focused: None,
            input_target: None,
            menus,
            config,
            clock,
            keybindings: KeyBindings::default(),
            work_area: Rect::new(0, 0, config.viewport.width, config.viewport.height),
            events: Vec::new(),
            drag_header: None,
            last_header_click: None,
            hovered_bar: None,
        }
    }

    pub fn set_focus_tracker(&mut self, tracker: Box<dyn FocusTracking>) {
        self.menus.set_focus_tracker(tracker);
    }

    pub fn set_keybindings(&mut self, keybindings: KeyBindings) {
        self.menus.set_keybindings(keybindings.clone());
        self.keybindings = keybindings;
    }

    pub fn keybindings(&self) -> &KeyBindings {
        &self.keybindings
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn menus(&self) -> &MenuEngine {
        &self.menus
    }

    /// Direct access to the menu engine. Focus hand-backs it requests are
    /// applied on the next [`tick`](Self::tick) or event.
    pub fn menus_mut(&mut self) -> &mut MenuEngine {
        &mut self.menus
    }

    pub fn work_area(&self) -> Rect {
        self.work_area
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(&id)
    }

    pub fn window_ids(&self) -> Vec<WindowId> {
        self.windows.keys().copied().collect()
    }

    /// All windows, bottom-most first.
    pub fn windows_in_z_order(&self) -> Vec<&Window> {
        let mut ordered: Vec<&Window> = self.windows.values().collect();
        ordered.sort_by_key(|w| w.z);
        ordered
    }

    pub fn focused_window(&self) -> Option<WindowId> {
        self.focused
    }

    pub fn input_focus(&self) -> InputFocus {
        if self.menus.has_keyboard() {
            return InputFocus::Menus;
        }
        match self.input_target {
            Some(target) => InputFocus::Target(target),
            None => InputFocus::Nowhere,
        }
    }

    pub fn drain_events(&mut self) -> Vec<(WindowId, WindowEvent)> {
        std::mem::take(&mut self.events)
    }

    pub fn take_menu_notices(&mut self) -> Vec<MenuNotice> {
        self.menus.take_notices()
    }

    fn emit(&mut self, id: WindowId, event: WindowEvent) {
        trace!(window = %id, ?event, "window event");
        self.events.push((id, event));
    }

    fn ensure_open(&self, id: WindowId) -> WmResult<()> {
        if self.windows.contains_key(&id) {
            Ok(())
        } else {
            Err(WmError::InvalidWindowState { id })
        }
    }

    fn window_mut(&mut self, id: WindowId) -> WmResult<&mut Window> {
        self.windows
            .get_mut(&id)
            .ok_or(WmError::InvalidWindowState { id })
    }

    fn outer_size(dimensions: Dimensions, has_menu_bar: bool, fallback: (u16, u16)) -> (u16, u16) {
        let extra_rows = FRAME_ROWS + u16::from(has_menu_bar);
        let width = dimensions
            .outer_width
            .or(dimensions
                .inner_width
                .map(|w| w.saturating_add(FRAME_COLUMNS)))
            .unwrap_or(fallback.0);
        let height = dimensions
            .outer_height
            .or(dimensions
                .inner_height
                .map(|h| h.saturating_add(extra_rows)))
            .unwrap_or(fallback.1);
        (width.max(WINDOW_MIN_WIDTH), height.max(WINDOW_MIN_HEIGHT))
    }

    fn centered_origin(&self, width: u16, height: u16) -> (i32, i32) {
        let area = self.work_area;
        (
            i32::from(area.x) + i32::from(area.width.saturating_sub(width) / 2),
            i32::from(area.y) + i32::from(area.height.saturating_sub(height) / 2),
        )
    }

    /// Create a window in the Normal state and focus it.
    pub fn open(&mut self, options: WindowOptions) -> WmResult<WindowId> {
        if let Some(parent) = options.parent {
            self.ensure_open(parent)?;
        }
        let id = WindowId(self.next_id);
        self.next_id += 1;

        let has_menu_bar = options.menu_bar.is_some();
        let (width, height) = Self::outer_size(
            options.dimensions,
            has_menu_bar,
            (DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT),
        );
        let (x, y) = options
            .position
            .unwrap_or_else(|| self.centered_origin(width, height));

        let mut window = Window::new(id, FloatRect::new(x, y, width, height), self.z.next());
        let tool = options.tool_window;
        window.title = options.title;
        window.kind = if tool {
            WindowKind::Tool
        } else {
            WindowKind::Normal
        };
        window.capabilities = Capabilities {
            resizable: options.resizable.unwrap_or(true),
            closable: options.closable.unwrap_or(true),
            minimizable: !tool && options.minimizable.unwrap_or(true),
            maximizable: !tool && options.maximizable.unwrap_or(true),
        };
        window.icons = options.icons;
        window.parent = options.parent;
        window.minimize_target = options.minimize_target;
        if let Some(menus) = options.menu_bar {
            let bar = self.menus.create_menu_bar(&menus);
            self.menus.set_bar_scope(bar, Some(id))?;
            window.menu_bar = Some(bar);
        }
        self.windows.insert(id, window);
        if let Some(parent) = options.parent
            && let Some(p) = self.windows.get_mut(&parent)
        {
            p.children.push(id);
        }
        self.sync_menu_bar(id);
        debug!(window = %id, width, height, "window opened");
        self.focus(id)?;
        Ok(id)
    }

    /// Raise and focus `id`, blurring whichever window had focus. A
    /// minimized window is unminimized instead.
    pub fn focus(&mut self, id: WindowId) -> WmResult<()> {
        self.ensure_open(id)?;
        self.finish_transition(id);
        if self.windows.get(&id).is_some_and(|w| w.state == WindowState::Minimized) {
            return self.unminimize(id);
        }
        self.focus_visible(id);
        Ok(())
    }

    /// Whether nothing outside `id` and the windows it owns sits above it.
    fn is_topmost(&self, id: WindowId) -> bool {
        let Some(z) = self.windows.get(&id).map(|w| w.z) else {
            return false;
        };
        self.windows
            .iter()
            .all(|(other, w)| w.z <= z || self.is_owned_by(*other, id))
    }

    fn is_owned_by(&self, id: WindowId, owner: WindowId) -> bool {
        let mut current = self.windows.get(&id).and_then(|w| w.parent);
        while let Some(parent) = current {
            if parent == owner {
                return true;
            }
            current = self.windows.get(&parent).and_then(|w| w.parent);
        }
        false
    }

    fn focus_visible(&mut self, id: WindowId) {
        let already = self.focused == Some(id) && self.windows.get(&id).is_some_and(|w| w.focused);
        if already && self.is_topmost(id) {
            return;
        }
        if let Some(prev) = self.focused
            && prev != id
        {
            if let Some(p) = self.windows.get_mut(&prev) {
                p.focused = false;
            }
            self.emit(prev, WindowEvent::Blur);
        }
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        let newly_focused = !window.focused;
        window.focused = true;
        self.focused = Some(id);
        if newly_focused {
            self.emit(id, WindowEvent::Focus);
        }
        self.bring_to_front(id);
        if self.input_target.and_then(FocusTarget::window) != Some(id) {
            self.record_input_target(FocusTarget::Window(id));
        }
        if let Some((PopupOwner::MenuBar(bar), _)) = self.menus.active_tree()
            && self.menus.bar(bar).and_then(|b| b.scope()) != Some(id)
        {
            self.menus.dismiss();
        }
    }

    /// Raise `id` and, after it, every child so owned windows stay above
    /// their owner.
    fn bring_to_front(&mut self, id: WindowId) {
        let children = match self.windows.get_mut(&id) {
            Some(window) => {
                window.z = self.z.next();
                window.children.clone()
            }
            None => return,
        };
        for child in children {
            self.bring_to_front(child);
        }
    }

    fn record_input_target(&mut self, target: FocusTarget) {
        self.input_target = Some(target);
        self.menus.focus_tracker_mut().record(target);
    }

    /// Move keyboard focus to something outside the menus. Focusing inside
    /// a window also focuses the window; the desktop blurs it.
    pub fn set_input_focus(&mut self, target: FocusTarget) -> WmResult<()> {
        match target.window() {
            Some(window) => {
                self.ensure_open(window)?;
                self.record_input_target(target);
                if self.focused != Some(window) {
                    self.focus(window)?;
                }
            }
            None => {
                if let Some(prev) = self.focused {
                    self.blur(prev)?;
                }
                self.record_input_target(target);
            }
        }
        Ok(())
    }

    pub fn blur(&mut self, id: WindowId) -> WmResult<()> {
        let window = self.window_mut(id)?;
        let was_focused = window.focused;
        window.focused = false;
        if self.focused == Some(id) {
            self.focused = None;
        }
        if was_focused {
            self.emit(id, WindowEvent::Blur);
        }
        if self.input_target.and_then(FocusTarget::window) == Some(id) {
            self.input_target = None;
        }
        Ok(())
    }

    pub fn minimize(&mut self, id: WindowId) -> WmResult<()> {
        self.ensure_open(id)?;
        self.finish_transition(id);
        let window = self.window_mut(id)?;
        if window.state == WindowState::Minimized {
            return Ok(());
        }
        window.restore_state = window.state;
        let from = title_bar_rect(window.geometry);
        let target = window.minimize_target;
        self.emit(id, WindowEvent::Minimize);
        match target {
            Some(to) => self.start_transition(id, TransitionKind::Minimize, from, to),
            None => self.degrade(id, TransitionKind::Minimize, "no minimize target"),
        }
        Ok(())
    }

    pub fn unminimize(&mut self, id: WindowId) -> WmResult<()> {
        self.ensure_open(id)?;
        self.finish_transition(id);
        let window = self.window_mut(id)?;
        if window.state != WindowState::Minimized {
            return Ok(());
        }
        let to = title_bar_rect(window.geometry);
        let target = window.minimize_target;
        self.emit(id, WindowEvent::Restore);
        match target {
            Some(from) => self.start_transition(id, TransitionKind::Unminimize, from, to),
            None => self.degrade(id, TransitionKind::Unminimize, "no minimize target"),
        }
        Ok(())
    }

    /// Fill the work area, remembering the current geometry. No-op for
    /// windows that are not resizable or already maximized.
    pub fn maximize(&mut self, id: WindowId) -> WmResult<()> {
        self.ensure_open(id)?;
        self.finish_transition(id);
        let window = self.window_mut(id)?;
        if !window.capabilities.resizable || window.state != WindowState::Normal {
            trace!(window = %id, state = ?window.state, "maximize ignored");
            return Ok(());
        }
        self.animate_maximize(id, TransitionKind::Maximize);
        Ok(())
    }

    /// Return a maximized window to its remembered geometry.
    pub fn restore(&mut self, id: WindowId) -> WmResult<()> {
        self.ensure_open(id)?;
        self.finish_transition(id);
        let window = self.window_mut(id)?;
        if window.state != WindowState::Maximized {
            return Ok(());
        }
        self.animate_maximize(id, TransitionKind::Unmaximize);
        Ok(())
    }

    pub fn toggle_maximize(&mut self, id: WindowId) -> WmResult<()> {
        self.ensure_open(id)?;
        self.finish_transition(id);
        match self.windows.get(&id).map(|w| w.state) {
            Some(WindowState::Maximized) => self.restore(id),
            Some(WindowState::Minimized) => self.unminimize(id),
            _ => self.maximize(id),
        }
    }

    /// The far end of a maximize or restore is measured by applying the
    /// change, reading the title bar and reverting.
    fn animate_maximize(&mut self, id: WindowId, kind: TransitionKind) {
        let Some(before) = self.windows.get(&id).map(|w| title_bar_rect(w.geometry)) else {
            return;
        };
        let after = match kind {
            TransitionKind::Maximize => {
                self.apply_maximize(id);
                let after = self.windows.get(&id).map(|w| title_bar_rect(w.geometry));
                self.apply_unmaximize(id);
                after
            }
            _ => {
                self.apply_unmaximize(id);
                let after = self.windows.get(&id).map(|w| title_bar_rect(w.geometry));
                self.apply_maximize(id);
                after
            }
        };
        match after {
            Some(after) => self.start_transition(id, kind, before, after),
            None => self.degrade(id, kind, "window vanished while measuring"),
        }
    }

    fn apply_maximize(&mut self, id: WindowId) {
        let area = FloatRect::from(self.work_area);
        if let Some(window) = self.windows.get_mut(&id) {
            window.saved_geometry = Some(window.geometry);
            window.geometry = area;
            window.state = WindowState::Maximized;
        }
    }

    fn apply_unmaximize(&mut self, id: WindowId) {
        if let Some(window) = self.windows.get_mut(&id) {
            if let Some(saved) = window.saved_geometry.take() {
                window.geometry = saved;
            }
            window.state = WindowState::Normal;
        }
    }

    fn start_transition(&mut self, id: WindowId, kind: TransitionKind, from: FloatRect, to: FloatRect) {
        if !self.config.animations_enabled() {
            self.commit(id, kind);
            return;
        }
        if from.is_empty() || to.is_empty() {
            self.degrade(id, kind, "title bar has no area");
            return;
        }
        let now = self.clock.now();
        let duration = self.config.transition_duration;
        if let Some(window) = self.windows.get_mut(&id) {
            window.transition = Some(Transition::new(kind, from, to, now, duration));
            trace!(window = %id, ?kind, "transition started");
        }
    }

    fn degrade(&mut self, id: WindowId, kind: TransitionKind, reason: &'static str) {
        if self.config.animations_enabled() {
            Degradation::DegradedAnimation { id, reason }.report();
        }
        self.commit(id, kind);
    }

    /// Complete a running transition right away.
    fn finish_transition(&mut self, id: WindowId) {
        let Some(kind) = self
            .windows
            .get_mut(&id)
            .and_then(|w| w.transition.take())
            .map(|t| t.kind())
        else {
            return;
        };
        self.commit(id, kind);
    }

    fn commit(&mut self, id: WindowId, kind: TransitionKind) {
        match kind {
            TransitionKind::Minimize => {
                let Some(window) = self.windows.get_mut(&id) else {
                    return;
                };
                window.state = WindowState::Minimized;
                window.visible = false;
                let was_focused = window.focused;
                window.focused = false;
                if self.focused == Some(id) {
                    self.focused = None;
                }
                if was_focused {
                    self.emit(id, WindowEvent::Blur);
                }
                if self.input_target.and_then(FocusTarget::window) == Some(id) {
                    self.input_target = None;
                }
                if let Some(bar) = self.windows.get(&id).and_then(|w| w.menu_bar)
                    && self
                        .menus
                        .active_tree()
                        .is_some_and(|(owner, _)| owner == PopupOwner::MenuBar(bar))
                {
                    self.menus.dismiss();
                }
                debug!(window = %id, "window minimized");
            }
            TransitionKind::Unminimize => {
                let Some(window) = self.windows.get_mut(&id) else {
                    return;
                };
                window.state = window.restore_state;
                window.visible = true;
                debug!(window = %id, state = ?window.state, "window unminimized");
                self.focus_visible(id);
            }
            TransitionKind::Maximize => {
                self.apply_maximize(id);
                self.emit(id, WindowEvent::Maximize);
                self.emit(id, WindowEvent::Resize);
                debug!(window = %id, "window maximized");
            }
            TransitionKind::Unmaximize => {
                self.apply_unmaximize(id);
                self.emit(id, WindowEvent::Unmaximize);
                self.emit(id, WindowEvent::Resize);
                debug!(window = %id, "window restored");
            }
        }
        self.sync_menu_bar(id);
    }

    /// Remove `id`. Tool children close with it, other children lose their
    /// owner, and focus passes to the highest remaining visible window
    /// once the whole tree is gone.
    pub fn close(&mut self, id: WindowId) -> WmResult<()> {
        self.ensure_open(id)?;
        if self.remove_tree(id) {
            self.focused = None;
            if let Some(next) = self.topmost_visible() {
                self.focus_visible(next);
            }
        }
        Ok(())
    }

    /// Unregister `id` and its tool children. Returns whether focus was
    /// somewhere in the removed tree.
    fn remove_tree(&mut self, id: WindowId) -> bool {
        let Some(window) = self.windows.get(&id) else {
            return false;
        };
        let children = window.children.clone();
        let parent = window.parent;
        let bar = window.menu_bar;

        let mut lost_focus = false;
        for child in children {
            match self.windows.get(&child).map(|c| c.kind) {
                Some(WindowKind::Tool) => lost_focus |= self.remove_tree(child),
                Some(WindowKind::Normal) => {
                    if let Some(c) = self.windows.get_mut(&child) {
                        c.parent = None;
                    }
                }
                None => {}
            }
        }
        if let Some(parent) = parent
            && let Some(p) = self.windows.get_mut(&parent)
        {
            p.children.retain(|c| *c != id);
        }
        if let Some(bar) = bar
            && let Err(err) = self.menus.destroy_menu_bar(bar)
        {
            trace!(%err, "menu bar already gone");
        }
        lost_focus |= self.windows.remove(&id).is_some_and(|w| w.focused);
        if self.focused == Some(id) {
            self.focused = None;
            lost_focus = true;
        }
        self.menus.focus_tracker_mut().forget_window(id);
        if self.input_target.and_then(FocusTarget::window) == Some(id) {
            self.input_target = None;
        }
        if self.drag_header.is_some_and(|d| d.id == id) {
            self.drag_header = None;
        }
        if self.hovered_bar.is_some() && bar == self.hovered_bar {
            self.hovered_bar = None;
        }
        self.emit(id, WindowEvent::Closed);
        debug!(window = %id, "window closed");
        lost_focus
    }

    fn topmost_visible(&self) -> Option<WindowId> {
        self.windows
            .values()
            .filter(|w| w.visible && w.state != WindowState::Minimized)
            .max_by_key(|w| w.z)
            .map(|w| w.id)
    }

    pub fn set_title(&mut self, id: WindowId, title: impl Into<String>) -> WmResult<()> {
        let title = title.into();
        let window = self.window_mut(id)?;
        if window.title == title {
            return Ok(());
        }
        window.title = title;
        self.emit(id, WindowEvent::TitleChange);
        Ok(())
    }

    pub fn set_icons(&mut self, id: WindowId, icons: IconSet) -> WmResult<()> {
        self.window_mut(id)?.icons = icons;
        self.emit(id, WindowEvent::IconChange);
        Ok(())
    }

    pub fn icon_at_size(&self, id: WindowId, size: u16) -> WmResult<Option<&str>> {
        let window = self
            .windows
            .get(&id)
            .ok_or(WmError::InvalidWindowState { id })?;
        Ok(window.icons.at_size(size))
    }

    /// Resize from outer or inner dimensions. A maximized window keeps
    /// filling the work area; the new size applies once it is restored.
    pub fn set_dimensions(&mut self, id: WindowId, dimensions: Dimensions) -> WmResult<()> {
        self.ensure_open(id)?;
        self.finish_transition(id);
        let window = self.window_mut(id)?;
        let has_menu_bar = window.menu_bar.is_some();
        let maximized = window.state == WindowState::Maximized;
        let current = if maximized {
            window.saved_geometry.unwrap_or(window.geometry)
        } else {
            window.geometry
        };
        let (width, height) =
            Self::outer_size(dimensions, has_menu_bar, (current.width, current.height));
        let resized = FloatRect { width, height, ..current };
        if maximized {
            window.saved_geometry = Some(resized);
        } else {
            window.geometry = resized;
        }
        self.emit(id, WindowEvent::Resize);
        self.sync_menu_bar(id);
        Ok(())
    }

    pub fn center(&mut self, id: WindowId) -> WmResult<()> {
        let geometry = self
            .windows
            .get(&id)
            .ok_or(WmError::InvalidWindowState { id })?
            .geometry;
        let (x, y) = self.centered_origin(geometry.width, geometry.height);
        self.move_window(id, x, y)
    }

    pub fn move_window(&mut self, id: WindowId, x: i32, y: i32) -> WmResult<()> {
        let window = self.window_mut(id)?;
        if window.state == WindowState::Maximized {
            return Ok(());
        }
        window.geometry.x = x;
        window.geometry.y = y;
        self.sync_menu_bar(id);
        Ok(())
    }

    /// Replace (or with `None`, remove) the window's menu bar.
    pub fn set_menu_bar(&mut self, id: WindowId, menus: Option<Vec<TopLevelMenu>>) -> WmResult<()> {
        let old = self.window_mut(id)?.menu_bar.take();
        if let Some(old) = old {
            self.menus.destroy_menu_bar(old)?;
        }
        if let Some(menus) = menus {
            let bar = self.menus.create_menu_bar(&menus);
            self.menus.set_bar_scope(bar, Some(id))?;
            self.window_mut(id)?.menu_bar = Some(bar);
        }
        self.sync_menu_bar(id);
        Ok(())
    }

    pub fn set_minimize_target(&mut self, id: WindowId, target: Option<FloatRect>) -> WmResult<()> {
        self.window_mut(id)?.minimize_target = target;
        Ok(())
    }

    /// Change the area maximized windows fill; maximized windows follow.
    pub fn set_work_area(&mut self, area: Rect) {
        self.work_area = area;
        let maximized: Vec<WindowId> = self
            .windows
            .values()
            .filter(|w| w.state == WindowState::Maximized)
            .map(|w| w.id)
            .collect();
        for id in maximized {
            if let Some(window) = self.windows.get_mut(&id) {
                window.geometry = FloatRect::from(area);
            }
            self.emit(id, WindowEvent::Resize);
            self.sync_menu_bar(id);
        }
    }

    /// New surface size. The work area resets to the full viewport.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.config.viewport = viewport;
        self.menus.set_config(self.config);
        self.set_work_area(Rect::new(0, 0, viewport.width, viewport.height));
    }

    /// Advance transitions and menu timers. Returns whether anything
    /// changed.
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now();
        let done: Vec<WindowId> = self
            .windows
            .values()
            .filter(|w| w.transition.is_some_and(|t| t.is_done(now)))
            .map(|w| w.id)
            .collect();
        let mut changed = !done.is_empty();
        for id in done {
            self.finish_transition(id);
        }
        changed |= self.menus.tick();
        self.apply_menu_focus_requests();
        changed
    }

    /// Earliest instant at which [`tick`](Self::tick) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        let transitions = self
            .windows
            .values()
            .filter_map(|w| w.transition.map(|t| t.ends_at()));
        transitions.chain(self.menus.next_deadline()).min()
    }

    /// Title-bar rectangle to draw for a running transition.
    pub fn transition_frame(&self, id: WindowId) -> Option<FloatRect> {
        let transition = self.windows.get(&id)?.transition?;
        Some(transition.frame(self.clock.now()))
    }

    pub fn is_animating(&self) -> bool {
        self.windows.values().any(|w| w.transition.is_some())
    }

    pub fn open_context_menu(&mut self, items: &[MenuItem], x: i32, y: i32) -> PopupId {
        self.menus.open_context_menu(items, x, y)
    }

    /// Close any open menu and give focus back to where it was.
    pub fn close_menus(&mut self) {
        self.menus.release();
        self.apply_menu_focus_requests();
    }

    fn apply_menu_focus_requests(&mut self) {
        for request in self.menus.take_focus_requests() {
            let target = request.target.filter(|target| {
                target.window().is_none_or(|w| {
                    self.windows
                        .get(&w)
                        .is_some_and(|w| w.state != WindowState::Minimized)
                })
            });
            let result = match (target, request.fallback) {
                (Some(target), _) => self.set_input_focus(target),
                (None, Some(window)) if self.windows.contains_key(&window) => self.focus(window),
                _ => Ok(()),
            };
            if let Err(err) = result {
                trace!(%err, "focus hand-back skipped");
            }
        }
    }

    fn sync_menu_bar(&mut self, id: WindowId) {
        let Some(window) = self.windows.get(&id) else {
            return;
        };
        let Some(bar) = window.menu_bar else {
            return;
        };
        let origin = (window.visible && window.state != WindowState::Minimized)
            .then(|| menu_bar_rect(window.geometry));
        if let Err(err) = self.menus.set_bar_origin(bar, origin) {
            trace!(%err, "menu bar out of sync");
        }
    }

    /// Topmost visible window under `(x, y)`.
    pub fn window_at(&self, x: i32, y: i32) -> Option<WindowId> {
        self.windows
            .values()
            .filter(|w| w.visible && w.geometry.contains(x, y))
            .max_by_key(|w| w.z)
            .map(|w| w.id)
    }

    fn bar_button_at(&self, x: i32, y: i32) -> Option<(WindowId, MenuBarId, usize)> {
        let id = self.window_at(x, y)?;
        let bar = self.windows.get(&id)?.menu_bar?;
        let index = self
            .menus
            .bar(bar)?
            .button_at(self.config.direction, x, y)?;
        Some((id, bar, index))
    }

    /// Focus the next (or previous) window in creation order, wrapping.
    pub fn cycle_focus(&mut self, forward: bool) -> WmResult<()> {
        let ids = self.window_ids();
        if ids.is_empty() {
            return Ok(());
        }
        let len = ids.len();
        let next = match self.focused.and_then(|f| ids.iter().position(|id| *id == f)) {
            Some(pos) if forward => ids[(pos + 1) % len],
            Some(pos) => ids[(pos + len - 1) % len],
            None => ids[0],
        };
        self.focus(next)
    }

    /// Route a terminal event through menus, menu bars, title bars and
    /// window shortcuts. Returns whether it was consumed.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        let consumed = match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => {
                self.set_viewport(Size::new(*width, *height));
                false
            }
            _ => false,
        };
        self.apply_menu_focus_requests();
        consumed
    }

    fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        if self.menus.has_keyboard() {
            let consumed = self.menus.handle_key(key);
            self.apply_menu_focus_requests();
            if consumed {
                return true;
            }
        }
        let focused_bar = self
            .focused
            .and_then(|id| self.windows.get(&id))
            .and_then(|w| w.menu_bar);
        if let Some(bar) = focused_bar
            && !self.menus.has_keyboard()
        {
            if let KeyCode::Char(c) = key.code
                && key.modifiers == KeyModifiers::ALT
            {
                match self.menus.bar_access_key(bar, c) {
                    Ok(true) => return true,
                    Ok(false) => {}
                    Err(err) => trace!(%err, "menu bar gone"),
                }
            }
            if self.keybindings.matches(Action::MenuRelease, key)
                && self.menus.focus_bar(bar).is_ok()
            {
                return true;
            }
        }
        let Some(action) = self.keybindings.action_for_key(key) else {
            return false;
        };
        let result = match (action, self.focused) {
            (Action::CycleNextWindow, _) => self.cycle_focus(true),
            (Action::CyclePrevWindow, _) => self.cycle_focus(false),
            (Action::MinimizeWindow, Some(id)) if self.has_capability(id, |c| c.minimizable) => {
                self.minimize(id)
            }
            (Action::MaximizeWindow, Some(id)) if self.has_capability(id, |c| c.maximizable) => {
                self.toggle_maximize(id)
            }
            (Action::CloseWindow, Some(id)) if self.has_capability(id, |c| c.closable) => {
                self.close(id)
            }
            _ => return false,
        };
        if let Err(err) = result {
            trace!(%err, ?action, "window shortcut failed");
        }
        true
    }

    fn has_capability(&self, id: WindowId, check: impl Fn(&Capabilities) -> bool) -> bool {
        self.windows.get(&id).is_some_and(|w| check(&w.capabilities))
    }

    fn update_bar_hover(&mut self, hit: Option<(MenuBarId, usize)>) {
        if let Some(prev) = self.hovered_bar
            && hit.map(|(bar, _)| bar) != Some(prev)
            && let Err(err) = self.menus.bar_hover(prev, None)
        {
            trace!(%err, "hovered menu bar gone");
        }
        if let Some((bar, index)) = hit
            && let Err(err) = self.menus.bar_hover(bar, Some(index))
        {
            trace!(%err, "hovered menu bar gone");
        }
        self.hovered_bar = hit.map(|(bar, _)| bar);
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) -> bool {
        let (x, y) = (i32::from(mouse.column), i32::from(mouse.row));
        match mouse.kind {
            MouseEventKind::Drag(MouseButton::Left) if self.drag_header.is_some() => {
                if let Some(drag) = self.drag_header {
                    let nx = drag.initial_x + i32::from(mouse.column) - i32::from(drag.start_x);
                    let ny = drag.initial_y + i32::from(mouse.row) - i32::from(drag.start_y);
                    if let Err(err) = self.move_window(drag.id, nx, ny) {
                        trace!(%err, "dragged window gone");
                        self.drag_header = None;
                    }
                }
                true
            }
            MouseEventKind::Moved | MouseEventKind::Drag(MouseButton::Left) => {
                let popup_hit = self.menus.hit_test(x, y);
                self.menus.pointer_move(popup_hit);
                let bar_hit = if popup_hit.is_none() {
                    self.bar_button_at(x, y)
                } else {
                    None
                };
                self.update_bar_hover(bar_hit.map(|(_, bar, index)| (bar, index)));
                popup_hit.is_some() || bar_hit.is_some()
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(hit) = self.menus.hit_test(x, y) {
                    if let Some(row) = hit.row
                        && let Err(err) = self.menus.pointer_down(hit.popup, row)
                    {
                        trace!(%err, "pressed popup gone");
                    }
                    return true;
                }
                if let Some((window, bar, index)) = self.bar_button_at(x, y) {
                    if let Err(err) = self
                        .focus(window)
                        .and_then(|_| self.menus.bar_pointer_down(bar, index))
                    {
                        trace!(%err, "menu bar press failed");
                    }
                    return true;
                }
                if self.menus.is_open() || self.menus.has_keyboard() {
                    self.menus.dismiss();
                }
                match self.window_at(x, y) {
                    Some(id) => {
                        self.press_window(id, mouse);
                        true
                    }
                    None => {
                        if let Err(err) = self.set_input_focus(FocusTarget::Desktop) {
                            trace!(%err, "desktop focus failed");
                        }
                        false
                    }
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.drag_header.take().is_some() {
                    return true;
                }
                let Some(hit) = self.menus.hit_test(x, y) else {
                    return false;
                };
                if let Some(row) = hit.row
                    && let Err(err) = self.menus.click(hit.popup, row)
                {
                    trace!(%err, "clicked popup gone");
                }
                true
            }
            MouseEventKind::Down(_) => {
                if self.menus.hit_test(x, y).is_some() {
                    return true;
                }
                if self.menus.is_open() {
                    self.menus.dismiss();
                }
                false
            }
            _ => false,
        }
    }

    fn press_window(&mut self, id: WindowId, mouse: &MouseEvent) {
        let Some(window) = self.windows.get(&id) else {
            return;
        };
        let action = header_action(
            window.geometry,
            window.capabilities,
            i32::from(mouse.column),
            i32::from(mouse.row),
        );
        let geometry = window.geometry;
        let state = window.state;
        if let Err(err) = self.focus(id) {
            trace!(%err, "pressed window gone");
            return;
        }
        let result = match action {
            Some(HeaderAction::Minimize) => {
                self.last_header_click = None;
                self.minimize(id)
            }
            Some(HeaderAction::Maximize) => {
                self.last_header_click = None;
                self.toggle_maximize(id)
            }
            Some(HeaderAction::Close) => {
                self.last_header_click = None;
                self.close(id)
            }
            Some(HeaderAction::Drag) => {
                let now = self.clock.now();
                if let Some((prev_id, prev)) = self.last_header_click
                    && prev_id == id
                    && now.saturating_duration_since(prev) <= DOUBLE_CLICK
                {
                    self.last_header_click = None;
                    self.toggle_maximize(id)
                } else {
                    self.last_header_click = Some((id, now));
                    if state == WindowState::Normal {
                        self.drag_header = Some(HeaderDrag {
                            id,
                            initial_x: geometry.x,
                            initial_y: geometry.y,
                            start_x: mouse.column,
                            start_y: mouse.row,
                        });
                    }
                    Ok(())
                }
            }
            None => Ok(()),
        };
        if let Err(err) = result {
            trace!(%err, "title bar action failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::focus::FocusTarget;
    use crate::scheduler::ManualClock;
    use crossterm::event::{KeyEvent, MouseEvent};
    use std::time::Duration;

    fn instant_wm() -> WindowManager {
        WindowManager::with_clock(
            EngineConfig::default().with_transition_duration(Duration::ZERO),
            Rc::new(ManualClock::new()),
        )
    }

    fn animated_wm() -> (WindowManager, ManualClock) {
        let clock = ManualClock::new();
        let wm = WindowManager::with_clock(EngineConfig::default(), Rc::new(clock.clone()));
        (wm, clock)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn open_focuses_and_stacks_windows() {
        let mut wm = instant_wm();
        let a = wm.open(WindowOptions::new("A")).unwrap();
        let b = wm.open(WindowOptions::new("B")).unwrap();
        assert_eq!(wm.focused_window(), Some(b));
        assert!(!wm.window(a).unwrap().is_focused());
        assert!(wm.window(b).unwrap().z_slot() > wm.window(a).unwrap().z_slot());
        assert_eq!(
            wm.drain_events(),
            vec![
                (a, WindowEvent::Focus),
                (a, WindowEvent::Blur),
                (b, WindowEvent::Focus)
            ]
        );
    }

    #[test]
    fn focusing_the_focused_topmost_window_is_a_no_op() {
        let mut wm = instant_wm();
        let a = wm.open(WindowOptions::new("A")).unwrap();
        let z = wm.window(a).unwrap().z_slot();
        wm.drain_events();
        wm.focus(a).unwrap();
        assert_eq!(wm.window(a).unwrap().z_slot(), z);
        assert!(wm.drain_events().is_empty());
    }

    #[test]
    fn inner_size_adds_frame_and_menu_row() {
        let mut wm = instant_wm();
        let plain = wm.open(WindowOptions::new("P").inner_size(20, 5)).unwrap();
        let with_bar = wm
            .open(
                WindowOptions::new("M")
                    .inner_size(20, 5)
                    .menu_bar(vec![TopLevelMenu::new("&File", vec![])]),
            )
            .unwrap();
        let p = wm.window(plain).unwrap().geometry();
        let m = wm.window(with_bar).unwrap().geometry();
        assert_eq!((p.width, p.height), (22, 8));
        assert_eq!((m.width, m.height), (22, 9));
        assert_eq!(wm.window(with_bar).unwrap().content_rect().height, 5);
    }

    #[test]
    fn tiny_sizes_clamp_to_minimum() {
        let mut wm = instant_wm();
        let id = wm.open(WindowOptions::new("T").outer_size(1, 1)).unwrap();
        let g = wm.window(id).unwrap().geometry();
        assert_eq!((g.width, g.height), (WINDOW_MIN_WIDTH, WINDOW_MIN_HEIGHT));
    }

    #[test]
    fn maximize_waits_for_the_transition_to_commit() {
        let (mut wm, clock) = animated_wm();
        let id = wm
            .open(WindowOptions::new("A").outer_size(20, 8).at(5, 5))
            .unwrap();
        wm.drain_events();
        wm.maximize(id).unwrap();
        assert_eq!(wm.window(id).unwrap().state(), WindowState::Normal);
        assert_eq!(wm.window(id).unwrap().geometry(), FloatRect::new(5, 5, 20, 8));
        assert_eq!(wm.transition_frame(id), Some(FloatRect::new(6, 6, 18, 1)));

        clock.advance_ms(100);
        assert_eq!(wm.transition_frame(id), Some(FloatRect::new(4, 4, 48, 1)));
        clock.advance_ms(100);
        assert!(wm.tick());
        let window = wm.window(id).unwrap();
        assert_eq!(window.state(), WindowState::Maximized);
        assert_eq!(window.geometry(), FloatRect::new(0, 0, 80, 24));
        assert_eq!(window.saved_geometry(), Some(FloatRect::new(5, 5, 20, 8)));
        assert_eq!(
            wm.drain_events(),
            vec![(id, WindowEvent::Maximize), (id, WindowEvent::Resize)]
        );
    }

    #[test]
    fn a_new_operation_completes_the_pending_transition() {
        let (mut wm, _clock) = animated_wm();
        let id = wm
            .open(WindowOptions::new("A").outer_size(20, 8).at(5, 5))
            .unwrap();
        wm.maximize(id).unwrap();
        wm.restore(id).unwrap();
        // maximize committed immediately, restore is now in flight
        assert_eq!(wm.window(id).unwrap().state(), WindowState::Maximized);
        assert_eq!(
            wm.window(id).unwrap().transition().map(|t| t.kind()),
            Some(TransitionKind::Unmaximize)
        );
    }

    #[test]
    fn restore_returns_to_saved_geometry() {
        let mut wm = instant_wm();
        let id = wm
            .open(WindowOptions::new("A").outer_size(20, 8).at(3, 2))
            .unwrap();
        wm.toggle_maximize(id).unwrap();
        assert_eq!(wm.window(id).unwrap().state(), WindowState::Maximized);
        wm.toggle_maximize(id).unwrap();
        let window = wm.window(id).unwrap();
        assert_eq!(window.state(), WindowState::Normal);
        assert_eq!(window.geometry(), FloatRect::new(3, 2, 20, 8));
        assert_eq!(window.saved_geometry(), None);
    }

    #[test]
    fn non_resizable_windows_do_not_maximize() {
        let mut wm = instant_wm();
        let id = wm.open(WindowOptions::new("A").resizable(false)).unwrap();
        wm.drain_events();
        wm.maximize(id).unwrap();
        assert_eq!(wm.window(id).unwrap().state(), WindowState::Normal);
        assert!(wm.drain_events().is_empty());
    }

    #[test]
    fn minimize_without_target_is_instant_and_focus_unminimizes() {
        let (mut wm, _clock) = animated_wm();
        let id = wm.open(WindowOptions::new("A")).unwrap();
        wm.drain_events();
        wm.minimize(id).unwrap();
        let window = wm.window(id).unwrap();
        assert_eq!(window.state(), WindowState::Minimized);
        assert!(!window.is_visible());
        assert_eq!(wm.focused_window(), None);
        assert_eq!(
            wm.drain_events(),
            vec![(id, WindowEvent::Minimize), (id, WindowEvent::Blur)]
        );

        wm.focus(id).unwrap();
        let window = wm.window(id).unwrap();
        assert_eq!(window.state(), WindowState::Normal);
        assert!(window.is_visible());
        assert!(window.is_focused());
    }

    #[test]
    fn minimize_with_target_animates_towards_it() {
        let (mut wm, clock) = animated_wm();
        let target = FloatRect::new(0, 23, 10, 1);
        let id = wm
            .open(WindowOptions::new("A").minimize_target(target))
            .unwrap();
        wm.minimize(id).unwrap();
        assert!(wm.window(id).unwrap().is_visible());
        clock.advance(Duration::from_millis(200));
        wm.tick();
        assert!(!wm.window(id).unwrap().is_visible());

        wm.unminimize(id).unwrap();
        assert_eq!(wm.transition_frame(id), Some(target));
        clock.advance(Duration::from_millis(200));
        wm.tick();
        assert_eq!(wm.window(id).unwrap().state(), WindowState::Normal);
        assert_eq!(wm.focused_window(), Some(id));
    }

    #[test]
    fn unminimize_returns_to_maximized() {
        let mut wm = instant_wm();
        let id = wm.open(WindowOptions::new("A")).unwrap();
        wm.maximize(id).unwrap();
        wm.minimize(id).unwrap();
        wm.unminimize(id).unwrap();
        assert_eq!(wm.window(id).unwrap().state(), WindowState::Maximized);
    }

    #[test]
    fn close_moves_focus_to_highest_visible_window() {
        let mut wm = instant_wm();
        let a = wm.open(WindowOptions::new("A")).unwrap();
        let b = wm.open(WindowOptions::new("B")).unwrap();
        let c = wm.open(WindowOptions::new("C")).unwrap();
        wm.minimize(b).unwrap();
        wm.drain_events();
        wm.close(c).unwrap();
        assert_eq!(wm.focused_window(), Some(a));
        assert_eq!(
            wm.drain_events(),
            vec![(c, WindowEvent::Closed), (a, WindowEvent::Focus)]
        );
        assert_eq!(wm.close(c), Err(WmError::InvalidWindowState { id: c }));
        assert_eq!(wm.focus(c), Err(WmError::InvalidWindowState { id: c }));
    }

    #[test]
    fn tool_children_close_with_owner_and_others_are_released() {
        let mut wm = instant_wm();
        let owner = wm.open(WindowOptions::new("Paint")).unwrap();
        let tool = wm
            .open(WindowOptions::new("Colors").parent(owner).tool_window())
            .unwrap();
        let child = wm.open(WindowOptions::new("Help").parent(owner)).unwrap();
        assert!(!wm.window(tool).unwrap().capabilities().minimizable);

        wm.close(owner).unwrap();
        assert!(wm.window(tool).is_none());
        assert_eq!(wm.window(child).unwrap().parent(), None);
    }

    #[test]
    fn closing_an_owner_with_a_focused_tool_hands_focus_on_once() {
        let mut wm = instant_wm();
        let other = wm.open(WindowOptions::new("Notes")).unwrap();
        let owner = wm.open(WindowOptions::new("Paint")).unwrap();
        let tool = wm
            .open(WindowOptions::new("Colors").parent(owner).tool_window())
            .unwrap();
        assert_eq!(wm.focused_window(), Some(tool));
        wm.drain_events();

        wm.close(owner).unwrap();
        assert_eq!(
            wm.drain_events(),
            vec![
                (tool, WindowEvent::Closed),
                (owner, WindowEvent::Closed),
                (other, WindowEvent::Focus)
            ]
        );
        assert_eq!(wm.focused_window(), Some(other));
    }

    #[test]
    fn focusing_an_owner_raises_its_children_above_it() {
        let mut wm = instant_wm();
        let owner = wm.open(WindowOptions::new("Owner")).unwrap();
        let child = wm.open(WindowOptions::new("Child").parent(owner)).unwrap();
        let other = wm.open(WindowOptions::new("Other")).unwrap();
        wm.focus(owner).unwrap();
        let z = |id| wm.window(id).unwrap().z_slot();
        assert!(z(child) > z(owner));
        assert!(z(owner) > z(other));
    }

    #[test]
    fn refocusing_a_front_owner_keeps_its_z_slots() {
        let mut wm = instant_wm();
        let owner = wm.open(WindowOptions::new("Owner")).unwrap();
        let child = wm.open(WindowOptions::new("Child").parent(owner)).unwrap();
        wm.focus(owner).unwrap();
        wm.drain_events();
        let slots = |wm: &WindowManager| {
            (
                wm.window(owner).unwrap().z_slot(),
                wm.window(child).unwrap().z_slot(),
            )
        };
        let before = slots(&wm);

        wm.focus(owner).unwrap();
        wm.focus(owner).unwrap();
        assert_eq!(slots(&wm), before);
        assert!(wm.drain_events().is_empty());
    }

    #[test]
    fn work_area_changes_follow_maximized_windows() {
        let mut wm = instant_wm();
        let id = wm.open(WindowOptions::new("A")).unwrap();
        wm.maximize(id).unwrap();
        wm.set_work_area(Rect::new(0, 0, 80, 23));
        assert_eq!(wm.window(id).unwrap().geometry(), FloatRect::new(0, 0, 80, 23));
    }

    #[test]
    fn title_change_only_fires_on_change() {
        let mut wm = instant_wm();
        let id = wm.open(WindowOptions::new("A")).unwrap();
        wm.drain_events();
        wm.set_title(id, "A").unwrap();
        wm.set_title(id, "B").unwrap();
        assert_eq!(wm.drain_events(), vec![(id, WindowEvent::TitleChange)]);
        assert_eq!(wm.window(id).unwrap().title(), "B");
    }

    #[test]
    fn title_bar_buttons_and_double_click() {
        let mut wm = instant_wm();
        let id = wm
            .open(WindowOptions::new("A").outer_size(20, 8).at(0, 0))
            .unwrap();
        // maximize button sits at columns 13..16 of the title row
        wm.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), 14, 1));
        assert_eq!(wm.window(id).unwrap().state(), WindowState::Maximized);
        wm.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), 5, 1));
        wm.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), 5, 1));
        assert_eq!(wm.window(id).unwrap().state(), WindowState::Normal);
    }

    #[test]
    fn dragging_the_title_bar_moves_the_window() {
        let mut wm = instant_wm();
        let id = wm
            .open(WindowOptions::new("A").outer_size(20, 8).at(0, 0))
            .unwrap();
        wm.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), 3, 1));
        wm.handle_event(&mouse(MouseEventKind::Drag(MouseButton::Left), 8, 4));
        wm.handle_event(&mouse(MouseEventKind::Up(MouseButton::Left), 8, 4));
        let g = wm.window(id).unwrap().geometry();
        assert_eq!((g.x, g.y), (5, 3));
    }

    #[test]
    fn desktop_click_blurs_the_focused_window() {
        let mut wm = instant_wm();
        let id = wm
            .open(WindowOptions::new("A").outer_size(10, 5).at(0, 0))
            .unwrap();
        assert!(!wm.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), 50, 20)));
        assert!(!wm.window(id).unwrap().is_focused());
        assert_eq!(wm.input_focus(), InputFocus::Target(FocusTarget::Desktop));
    }

    #[test]
    fn alt_tab_cycles_and_alt_f4_closes() {
        let mut wm = instant_wm();
        let a = wm.open(WindowOptions::new("A")).unwrap();
        let b = wm.open(WindowOptions::new("B")).unwrap();
        wm.handle_event(&Event::Key(KeyEvent::new(KeyCode::Tab, KeyModifiers::ALT)));
        assert_eq!(wm.focused_window(), Some(a));
        wm.handle_event(&Event::Key(KeyEvent::new(KeyCode::F(4), KeyModifiers::ALT)));
        assert!(wm.window(a).is_none());
        assert_eq!(wm.focused_window(), Some(b));
    }

    #[test]
    fn menu_release_restores_the_control_that_had_focus() {
        let mut wm = instant_wm();
        let id = wm
            .open(WindowOptions::new("Notepad").menu_bar(vec![TopLevelMenu::new(
                "&File",
                vec![MenuItem::command("&New", || {})],
            )]))
            .unwrap();
        let control = FocusTarget::Control {
            window: id,
            control: 2,
        };
        wm.set_input_focus(control).unwrap();

        assert!(wm.handle_event(&Event::Key(KeyEvent::new(
            KeyCode::Char('f'),
            KeyModifiers::ALT
        ))));
        assert_eq!(wm.input_focus(), InputFocus::Menus);
        wm.handle_event(&Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(!wm.menus().is_open());
        assert_eq!(wm.input_focus(), InputFocus::Target(control));
    }

    #[test]
    fn closing_the_window_destroys_its_menu_bar() {
        let mut wm = instant_wm();
        let id = wm
            .open(WindowOptions::new("Notepad").menu_bar(vec![TopLevelMenu::new(
                "&File",
                vec![MenuItem::command("&New", || {})],
            )]))
            .unwrap();
        let bar = wm.window(id).unwrap().menu_bar().unwrap();
        wm.close(id).unwrap();
        assert!(wm.menus().bar(bar).is_none());
    }
}
