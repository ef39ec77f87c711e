use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode};
use tracing::{debug, trace};

use crate::config::EngineConfig;
use crate::constants::MAX_MENU_NESTING;
use crate::error::{Degradation, WmError, WmResult};
use crate::focus::{FocusTarget, FocusTracker, FocusTracking};
use crate::keybindings::{Action, KeyBindings};
use crate::positioner::PopupPositioner;
use crate::scheduler::{Clock, Scheduler};
use crate::window::{FloatRect, WindowId, ZCounter};

use super::item::MenuItem;
use super::menu_bar::MenuBar;
use super::popup::{Entry, MenuPopup, MenuRow, ParentLink, PopupOwner, RowKind, SubmenuState};
use super::{MenuBarId, PopupId};

/// Status-line notices for the host, drained with
/// [`MenuEngine::take_notices`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuNotice {
    /// Description of the highlighted row (`None` clears the line).
    Info(Option<String>),
    /// Menus closed; show the application's default status text.
    DefaultInfo,
}

/// Where the pointer currently is inside the menu system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverTarget {
    pub popup: PopupId,
    /// `None` over borders and dividers.
    pub row: Option<usize>,
}

/// Request for the host to hand keyboard focus back after menus let go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusRequest {
    pub target: Option<FocusTarget>,
    /// Window to refocus when `target` is gone.
    pub fallback: Option<WindowId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ActiveTree {
    pub owner: PopupOwner,
    pub root: PopupId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum TimerKey {
    Open { popup: PopupId, row: usize },
    Close { popup: PopupId, row: usize },
}

impl TimerKey {
    fn popup(&self) -> PopupId {
        match self {
            TimerKey::Open { popup, .. } | TimerKey::Close { popup, .. } => *popup,
        }
    }
}

/// Owns every menu bar and popup and drives their keyboard, pointer and
/// timer behavior.
///
/// At most one popup tree is open at a time. Opening a menu anywhere first
/// closes whatever tree was active.
#[derive(Debug)]
pub struct MenuEngine {
    pub(super) popups: BTreeMap<PopupId, MenuPopup>,
    pub(super) bars: BTreeMap<MenuBarId, MenuBar>,
    next_popup: u64,
    next_bar: u64,
    pub(super) active: Option<ActiveTree>,
    pub(super) active_popup: Option<PopupId>,
    pub(super) bar_focus: Option<MenuBarId>,
    timers: Scheduler<TimerKey>,
    hover: Option<HoverTarget>,
    focus: Box<dyn FocusTracking>,
    pub(super) config: EngineConfig,
    clock: Rc<dyn Clock>,
    pub(super) keybindings: KeyBindings,
    z: ZCounter,
    pub(super) notices: Vec<MenuNotice>,
    focus_requests: Vec<FocusRequest>,
}

impl MenuEngine {
    pub fn new(config: EngineConfig, clock: Rc<dyn Clock>) -> Self {
        Self {
            popups: BTreeMap::new(),
            bars: BTreeMap::new(),
            next_popup: 1,
            next_bar: 1,
            active: None,
            active_popup: None,
            bar_focus: None,
            timers: Scheduler::new(),
            hover: None,
            focus: Box::new(FocusTracker::new()),
            config,
            clock,
            keybindings: KeyBindings::default(),
            z: ZCounter::new(),
            notices: Vec::new(),
            focus_requests: Vec::new(),
        }
    }

    /// Share a z counter with the window layer.
    pub fn with_z_counter(mut self, z: ZCounter) -> Self {
        self.z = z;
        self
    }

    pub fn set_focus_tracker(&mut self, tracker: Box<dyn FocusTracking>) {
        self.focus = tracker;
    }

    pub fn focus_tracker(&self) -> &dyn FocusTracking {
        self.focus.as_ref()
    }

    pub fn focus_tracker_mut(&mut self) -> &mut dyn FocusTracking {
        self.focus.as_mut()
    }

    pub fn set_keybindings(&mut self, keybindings: KeyBindings) {
        self.keybindings = keybindings;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
    }

    pub fn positioner(&self) -> PopupPositioner {
        PopupPositioner::new(self.config.viewport, self.config.direction)
    }

    pub fn popup(&self, id: PopupId) -> Option<&MenuPopup> {
        self.popups.get(&id)
    }

    /// Open popups, bottom-most first.
    pub fn open_popups(&self) -> Vec<&MenuPopup> {
        let mut open: Vec<&MenuPopup> = self.popups.values().filter(|p| p.open).collect();
        open.sort_by_key(|p| p.z);
        open
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    /// Root of the open popup tree and what it belongs to.
    pub fn active_tree(&self) -> Option<(PopupOwner, PopupId)> {
        self.active.map(|tree| (tree.owner, tree.root))
    }

    /// Popup receiving keyboard input.
    pub fn active_popup(&self) -> Option<PopupId> {
        self.active_popup
    }

    /// Whether menus currently own the keyboard (an open popup or a menu
    /// bar with roving focus).
    pub fn has_keyboard(&self) -> bool {
        self.active_popup.is_some() || self.bar_focus.is_some()
    }

    pub fn hover(&self) -> Option<HoverTarget> {
        self.hover
    }

    pub fn take_notices(&mut self) -> Vec<MenuNotice> {
        std::mem::take(&mut self.notices)
    }

    pub fn take_focus_requests(&mut self) -> Vec<FocusRequest> {
        std::mem::take(&mut self.focus_requests)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub(super) fn allocate_bar_id(&mut self) -> MenuBarId {
        let id = MenuBarId(self.next_bar);
        self.next_bar += 1;
        id
    }

    /// Build a popup (and its submenus, depth first) from item
    /// descriptions. The popup starts closed.
    pub(super) fn build_popup(
        &mut self,
        items: &[MenuItem],
        owner: PopupOwner,
        parent: Option<ParentLink>,
        scope: Option<WindowId>,
    ) -> PopupId {
        let id = PopupId(self.next_popup);
        self.next_popup += 1;

        let mut entries = Vec::new();
        let mut rows: Vec<MenuRow> = Vec::new();
        for item in items {
            let entry = entries.len();
            match item {
                MenuItem::Divider => entries.push(Entry::Divider),
                MenuItem::Command(cmd) => {
                    let mut row = MenuRow::new(
                        cmd.label.clone(),
                        cmd.enabled.clone(),
                        RowKind::Command(cmd.action.clone()),
                        entry,
                    );
                    row.icon = cmd.icon.clone();
                    row.shortcut = cmd.shortcut.clone();
                    row.description = cmd.description.clone();
                    entries.push(Entry::Row(rows.len()));
                    rows.push(row);
                }
                MenuItem::Checkbox(cb) => {
                    let mut row = MenuRow::new(
                        cb.label.clone(),
                        cb.enabled.clone(),
                        RowKind::Checkbox {
                            check: cb.check.clone(),
                            toggle: cb.toggle.clone(),
                        },
                        entry,
                    );
                    row.shortcut = cb.shortcut.clone();
                    row.description = cb.description.clone();
                    entries.push(Entry::Row(rows.len()));
                    rows.push(row);
                }
                MenuItem::Radio(group) => {
                    for option in &group.options {
                        let row = MenuRow::new(
                            option.label.clone(),
                            group.enabled.clone(),
                            RowKind::Radio {
                                value: option.value.clone(),
                                get_value: group.get_value.clone(),
                                set_value: group.set_value.clone(),
                            },
                            entries.len(),
                        );
                        entries.push(Entry::Row(rows.len()));
                        rows.push(row);
                    }
                }
                MenuItem::Submenu(sub) => {
                    if sub.items.is_empty() {
                        Degradation::MissingSubmenuTarget {
                            label: sub.label.clone(),
                        }
                        .report();
                    }
                    let link = ParentLink {
                        popup: id,
                        row: rows.len(),
                    };
                    let child = self.build_popup(&sub.items, owner, Some(link), scope);
                    let mut row = MenuRow::new(
                        sub.label.clone(),
                        sub.enabled.clone(),
                        RowKind::Submenu {
                            popup: child,
                            state: SubmenuState::Idle,
                        },
                        entry,
                    );
                    row.description = sub.description.clone();
                    entries.push(Entry::Row(rows.len()));
                    rows.push(row);
                }
            }
        }
        if rows.is_empty() {
            Degradation::EmptyMenu { id }.report();
            entries = vec![Entry::Row(0)];
            rows.push(MenuRow::placeholder(0));
        }
        for row in &mut rows {
            row.refresh();
        }
        self.popups.insert(
            id,
            MenuPopup {
                id,
                owner,
                entries,
                rows,
                highlight: None,
                open: false,
                parent,
                rect: FloatRect::default(),
                z: 0,
                scope,
            },
        );
        id
    }

    /// `root` and every popup reachable from it through submenu rows.
    pub(super) fn subtree(&self, root: PopupId) -> Vec<PopupId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(popup) = self.popups.get(&id) else {
                continue;
            };
            out.push(id);
            stack.extend(popup.submenu_rows().map(|(_, child, _)| child));
        }
        out
    }

    pub(super) fn root_of(&self, mut id: PopupId) -> PopupId {
        while let Some(link) = self.popups.get(&id).and_then(|p| p.parent) {
            id = link.popup;
        }
        id
    }

    pub(super) fn destroy_tree(&mut self, root: PopupId) {
        let ids = self.subtree(root);
        for id in &ids {
            self.popups.remove(id);
        }
        self.timers.cancel_where(|key| ids.contains(&key.popup()));
        if self.hover.is_some_and(|h| ids.contains(&h.popup)) {
            self.hover = None;
        }
        if self.active_popup.is_some_and(|p| ids.contains(&p)) {
            self.active_popup = None;
        }
        trace!(%root, count = ids.len(), "popup tree destroyed");
    }

    pub(super) fn set_tree_scope(&mut self, root: PopupId, scope: Option<WindowId>) {
        for id in self.subtree(root) {
            if let Some(popup) = self.popups.get_mut(&id) {
                popup.scope = scope;
            }
        }
    }

    /// Re-evaluate enabled and checked state for every row in the tree
    /// containing `popup`.
    pub fn update(&mut self, popup: PopupId) -> WmResult<()> {
        if !self.popups.contains_key(&popup) {
            return Err(WmError::UnknownPopup { id: popup });
        }
        let root = self.root_of(popup);
        for id in self.subtree(root) {
            if let Some(p) = self.popups.get_mut(&id) {
                p.rows.iter_mut().for_each(MenuRow::refresh);
            }
        }
        Ok(())
    }

    /// Re-evaluate every popup the engine knows about.
    pub fn update_all(&mut self) {
        for popup in self.popups.values_mut() {
            popup.rows.iter_mut().for_each(MenuRow::refresh);
        }
    }

    pub(super) fn show_popup(&mut self, id: PopupId, rect: FloatRect) {
        let z = self.z.next() + MAX_MENU_NESTING;
        if let Some(popup) = self.popups.get_mut(&id) {
            popup.open = true;
            popup.rect = rect;
            popup.z = z;
            popup.highlight = None;
            popup.rows.iter_mut().for_each(MenuRow::refresh);
        }
    }

    pub(super) fn highlight(&mut self, popup: PopupId, row: Option<usize>) {
        let Some(p) = self.popups.get_mut(&popup) else {
            return;
        };
        p.highlight = row.filter(|r| *r < p.rows.len());
        let info = p
            .highlight
            .and_then(|r| p.rows.get(r))
            .and_then(|r| r.description.clone());
        self.notices.push(MenuNotice::Info(info));
    }

    fn slot_state(&self, popup: PopupId, row: usize) -> Option<SubmenuState> {
        self.popups
            .get(&popup)?
            .rows
            .get(row)?
            .submenu()
            .map(|(_, state)| state)
    }

    fn slot_child(&self, popup: PopupId, row: usize) -> Option<PopupId> {
        self.popups
            .get(&popup)?
            .rows
            .get(row)?
            .submenu()
            .map(|(child, _)| child)
    }

    fn set_slot_state(&mut self, popup: PopupId, row: usize, state: SubmenuState) {
        if let Some(r) = self.popups.get_mut(&popup).and_then(|p| p.rows.get_mut(row)) {
            r.set_submenu_state(state);
        }
    }

    fn cancel_slot_timers(&mut self, popup: PopupId, row: usize) {
        self.timers.cancel(TimerKey::Open { popup, row });
        self.timers.cancel(TimerKey::Close { popup, row });
    }

    /// Open the submenu behind `row`. `highlight_first` also moves the
    /// highlight and keyboard focus into it; otherwise the submenu is a
    /// preview and the keyboard stays on `popup`.
    pub fn open_submenu(
        &mut self,
        popup: PopupId,
        row: usize,
        highlight_first: bool,
    ) -> WmResult<()> {
        let parent = self
            .popups
            .get(&popup)
            .ok_or(WmError::UnknownPopup { id: popup })?;
        if !parent.open {
            return Ok(());
        }
        let Some(trigger) = parent.rows.get(row) else {
            return Ok(());
        };
        let Some((child, state)) = trigger.submenu() else {
            return Ok(());
        };
        if !trigger.enabled.evaluate() {
            trace!(%popup, row, "submenu row disabled");
            return Ok(());
        }
        let anchor = parent.row_rect(row).unwrap_or_default();

        self.cancel_slot_timers(popup, row);
        if !matches!(state, SubmenuState::Open | SubmenuState::PendingClose) {
            self.close_children(popup);
            let size = self
                .popups
                .get(&child)
                .map(MenuPopup::measure)
                .unwrap_or_default();
            let rect = self.positioner().place_submenu(anchor, size);
            self.show_popup(child, rect);
            debug!(%popup, row, %child, "submenu opened");
        }
        self.set_slot_state(popup, row, SubmenuState::Open);
        if let Some(p) = self.popups.get_mut(&popup) {
            p.highlight = Some(row);
        }
        if highlight_first {
            self.highlight(child, Some(0));
            self.active_popup = Some(child);
        }
        Ok(())
    }

    /// Close `popup` and everything below it. With `focus_parent` the
    /// keyboard returns to the row that opened it. Closing the root of the
    /// active tree closes the whole tree.
    pub fn close_popup(&mut self, popup: PopupId, focus_parent: bool) -> WmResult<()> {
        let parent = self
            .popups
            .get(&popup)
            .ok_or(WmError::UnknownPopup { id: popup })?
            .parent;
        if self.active.is_some_and(|tree| tree.root == popup) {
            self.close_menus();
            return Ok(());
        }
        self.hide_popup(popup);
        if focus_parent && let Some(link) = parent {
            self.active_popup = Some(link.popup);
            self.highlight(link.popup, Some(link.row));
        }
        Ok(())
    }

    fn hide_popup(&mut self, id: PopupId) {
        self.close_children(id);
        let Some(popup) = self.popups.get_mut(&id) else {
            return;
        };
        let was_open = popup.open;
        popup.open = false;
        popup.highlight = None;
        let parent = popup.parent;
        self.timers.cancel_where(|key| key.popup() == id);
        if let Some(link) = parent {
            self.cancel_slot_timers(link.popup, link.row);
            self.set_slot_state(link.popup, link.row, SubmenuState::Idle);
        }
        if self.active_popup == Some(id) {
            self.active_popup = parent.map(|link| link.popup);
        }
        if self.hover.is_some_and(|h| h.popup == id) {
            self.hover = None;
        }
        if was_open {
            trace!(popup = %id, "popup closed");
        }
    }

    /// Close every submenu (open or pending) hanging off `popup`.
    fn close_children(&mut self, popup: PopupId) {
        let children: Vec<PopupId> = match self.popups.get(&popup) {
            Some(p) => p
                .submenu_rows()
                .filter(|(_, _, state)| *state != SubmenuState::Idle)
                .map(|(_, child, _)| child)
                .collect(),
            None => return,
        };
        for child in children {
            self.hide_popup(child);
        }
    }

    /// Close the active tree without touching keyboard focus.
    pub fn close_menus(&mut self) {
        let Some(tree) = self.active.take() else {
            self.active_popup = None;
            return;
        };
        self.hide_popup(tree.root);
        self.active_popup = None;
        match tree.owner {
            PopupOwner::MenuBar(bar) => {
                if let Some(b) = self.bars.get_mut(&bar) {
                    b.selecting = false;
                    b.open_index = None;
                }
            }
            PopupOwner::Context => self.destroy_tree(tree.root),
        }
        self.notices.push(MenuNotice::DefaultInfo);
        debug!(root = %tree.root, "menus closed");
    }

    fn keyboard_scope(&self) -> Option<WindowId> {
        if let Some(bar) = self.bar_focus {
            return self.bars.get(&bar).and_then(|b| b.scope);
        }
        self.active
            .and_then(|tree| self.popups.get(&tree.root))
            .and_then(|p| p.scope)
    }

    /// Close everything, drop menu-bar keyboard focus and ask the host to
    /// restore the focus held before menus took over.
    pub fn release(&mut self) {
        let fallback = self.keyboard_scope();
        self.close_menus();
        if let Some(bar) = self.bar_focus.take()
            && let Some(b) = self.bars.get_mut(&bar)
        {
            b.highlight = None;
        }
        self.focus_requests.push(FocusRequest {
            target: self.focus.last_outside_menus(),
            fallback,
        });
    }

    /// Pointer pressed outside every menu surface: close without moving
    /// focus, which goes to whatever was clicked.
    pub fn dismiss(&mut self) {
        self.close_menus();
        if let Some(bar) = self.bar_focus.take()
            && let Some(b) = self.bars.get_mut(&bar)
        {
            b.highlight = None;
        }
    }

    /// Activate a row the way a click or Enter would. Returns whether
    /// anything happened; disabled rows are ignored.
    pub fn activate(&mut self, popup: PopupId, row: usize) -> WmResult<bool> {
        let p = self
            .popups
            .get(&popup)
            .ok_or(WmError::UnknownPopup { id: popup })?;
        let Some(r) = p.rows.get(row) else {
            return Ok(false);
        };
        if !r.enabled.evaluate() {
            trace!(%popup, row, "activation ignored, row disabled");
            return Ok(false);
        }
        match r.kind.clone() {
            RowKind::Command(action) => {
                self.release();
                action();
            }
            RowKind::Checkbox { toggle, .. } => {
                toggle();
                self.update(popup)?;
            }
            RowKind::Radio {
                value, set_value, ..
            } => {
                self.release();
                set_value(&value);
            }
            RowKind::Submenu { .. } => self.open_submenu(popup, row, true)?,
            RowKind::Placeholder => return Ok(false),
        }
        Ok(true)
    }

    /// Pointer pressed on a row: submenu rows open at once, without moving
    /// the highlight into the submenu.
    pub fn pointer_down(&mut self, popup: PopupId, row: usize) -> WmResult<()> {
        if self.slot_child(popup, row).is_some() {
            self.open_submenu(popup, row, false)?;
        }
        Ok(())
    }

    /// Pointer released on a row.
    pub fn click(&mut self, popup: PopupId, row: usize) -> WmResult<bool> {
        self.activate(popup, row)
    }

    /// Topmost open popup under `(x, y)`.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<HoverTarget> {
        self.open_popups()
            .into_iter()
            .rev()
            .find_map(|p| p.hit_test(x, y).map(|row| HoverTarget { popup: p.id, row }))
    }

    /// Feed the pointer position (already hit-tested). Enter and leave
    /// transitions are derived from the previous position.
    pub fn pointer_move(&mut self, target: Option<HoverTarget>) {
        let prev = self.hover;
        if prev == target {
            return;
        }
        self.hover = target;
        if let Some(prev) = prev {
            if let Some(row) = prev.row {
                self.row_pointer_leave(prev.popup, row);
            }
            let next = target.map(|t| t.popup);
            if next != Some(prev.popup) {
                self.popup_pointer_leave(prev.popup, next);
            }
        }
        if let Some(t) = target {
            if prev.map(|p| p.popup) != Some(t.popup) {
                self.popup_pointer_enter(t.popup);
            }
            if let Some(row) = t.row {
                self.row_pointer_enter(t.popup, row);
                self.schedule_auto_close(t.popup, row);
            }
        }
    }

    fn row_pointer_enter(&mut self, popup: PopupId, row: usize) {
        let Some(p) = self.popups.get(&popup) else {
            return;
        };
        if !p.open {
            return;
        }
        let enabled = p.rows.get(row).is_some_and(|r| r.enabled.evaluate());
        self.active_popup = Some(popup);
        self.highlight(popup, Some(row));
        match self.slot_state(popup, row) {
            Some(SubmenuState::PendingClose) => {
                self.timers.cancel(TimerKey::Close { popup, row });
                self.set_slot_state(popup, row, SubmenuState::Open);
            }
            Some(SubmenuState::Idle | SubmenuState::PendingOpen) if enabled => {
                self.timers.schedule(
                    TimerKey::Open { popup, row },
                    self.clock.now(),
                    self.config.submenu_open_delay,
                );
                self.set_slot_state(popup, row, SubmenuState::PendingOpen);
            }
            _ => {}
        }
    }

    fn row_pointer_leave(&mut self, popup: PopupId, row: usize) {
        if self.slot_state(popup, row) == Some(SubmenuState::PendingOpen) {
            self.timers.cancel(TimerKey::Open { popup, row });
            self.set_slot_state(popup, row, SubmenuState::Idle);
        }
    }

    /// Entering a submenu keeps every ancestor's slot open.
    fn popup_pointer_enter(&mut self, popup: PopupId) {
        let mut cursor = self.popups.get(&popup).and_then(|p| p.parent);
        while let Some(link) = cursor {
            self.timers.cancel(TimerKey::Close {
                popup: link.popup,
                row: link.row,
            });
            if self.slot_state(link.popup, link.row) == Some(SubmenuState::PendingClose) {
                self.set_slot_state(link.popup, link.row, SubmenuState::Open);
            }
            cursor = self.popups.get(&link.popup).and_then(|p| p.parent);
        }
    }

    /// Leaving a popup parks the highlight on the row whose submenu is
    /// open, or clears it. Unless the pointer went into one of its own
    /// submenus, pending auto-closes are called off.
    fn popup_pointer_leave(&mut self, popup: PopupId, next: Option<PopupId>) {
        let Some(p) = self.popups.get(&popup) else {
            return;
        };
        if !p.open {
            return;
        }
        let row = p.open_submenu_row();
        let pending: Vec<usize> = p
            .submenu_rows()
            .filter(|(_, _, state)| *state == SubmenuState::PendingClose)
            .map(|(row, _, _)| row)
            .collect();
        self.highlight(popup, row);
        if next.is_some_and(|next| self.is_below(next, popup)) {
            return;
        }
        for row in pending {
            self.timers.cancel(TimerKey::Close { popup, row });
            self.set_slot_state(popup, row, SubmenuState::Open);
        }
    }

    /// Whether `popup` hangs somewhere under `ancestor`.
    fn is_below(&self, popup: PopupId, ancestor: PopupId) -> bool {
        let mut cursor = self.popups.get(&popup).and_then(|p| p.parent);
        while let Some(link) = cursor {
            if link.popup == ancestor {
                return true;
            }
            cursor = self.popups.get(&link.popup).and_then(|p| p.parent);
        }
        false
    }

    fn schedule_auto_close(&mut self, popup: PopupId, hovered: usize) {
        if self.config.debug_keep_menus_open {
            return;
        }
        // Slots already pending keep their original deadline.
        let open: Vec<usize> = match self.popups.get(&popup) {
            Some(p) => p
                .submenu_rows()
                .filter(|(row, _, state)| *row != hovered && *state == SubmenuState::Open)
                .map(|(row, _, _)| row)
                .collect(),
            None => return,
        };
        let now = self.clock.now();
        for row in open {
            self.timers.schedule(
                TimerKey::Close { popup, row },
                now,
                self.config.submenu_close_delay,
            );
            self.set_slot_state(popup, row, SubmenuState::PendingClose);
        }
    }

    /// Fire due timers. Each one re-checks that its slot is still in the
    /// state that scheduled it. Returns whether anything fired.
    pub fn tick(&mut self) -> bool {
        let due = self.timers.take_due(self.clock.now());
        let fired = !due.is_empty();
        for key in due {
            match key {
                TimerKey::Open { popup, row } => {
                    if self.slot_state(popup, row) == Some(SubmenuState::PendingOpen)
                        && let Err(err) = self.open_submenu(popup, row, false)
                    {
                        trace!(%err, "stale submenu open timer");
                    }
                }
                TimerKey::Close { popup, row } => {
                    if self.slot_state(popup, row) == Some(SubmenuState::PendingClose)
                        && let Some(child) = self.slot_child(popup, row)
                    {
                        self.hide_popup(child);
                        trace!(%popup, row, "submenu auto-closed");
                    }
                }
            }
        }
        fired
    }

    /// Route a key press to the menus. Returns `false` when the key should
    /// continue to the application.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release || !self.has_keyboard() {
            return false;
        }
        if is_bare_alt(key) || self.keybindings.matches(Action::MenuRelease, key) {
            self.release();
            return true;
        }
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER | KeyModifiers::META)
        {
            // Chords belong to the application; menus get out of the way.
            self.release();
            return false;
        }
        let popup = self
            .active_popup
            .filter(|id| self.popups.get(id).is_some_and(|p| p.open));
        if let Some(popup) = popup {
            return self.popup_key(popup, key);
        }
        if let Some(bar) = self.bar_focus {
            return self.bar_key(bar, key);
        }
        false
    }

    fn popup_key(&mut self, popup: PopupId, key: &KeyEvent) -> bool {
        let highlight = self.popups.get(&popup).and_then(|p| p.highlight);
        match self.keybindings.action_for_key(key) {
            Some(Action::MenuDown) => self.move_highlight(popup, 1),
            Some(Action::MenuUp) => self.move_highlight(popup, -1),
            Some(action @ (Action::MenuRight | Action::MenuLeft)) => {
                let forward = self
                    .config
                    .direction
                    .is_forward(action == Action::MenuRight);
                self.horizontal(popup, forward);
            }
            Some(Action::MenuActivate) => {
                if let Some(row) = highlight
                    && let Err(err) = self.activate(popup, row)
                {
                    trace!(%err, "activation on vanished popup");
                }
            }
            Some(Action::MenuCancel) => self.cancel(popup),
            _ => match key.code {
                KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::ALT) => {
                    return self.switch_by_access_key(c);
                }
                KeyCode::Char(c) => self.type_ahead(popup, c),
                _ if key.modifiers.contains(KeyModifiers::ALT) => return false,
                _ => {}
            },
        }
        true
    }

    fn move_highlight(&mut self, popup: PopupId, delta: isize) {
        let Some(p) = self.popups.get(&popup) else {
            return;
        };
        let count = p.rows.len() as isize;
        if count == 0 {
            return;
        }
        let next = match p.highlight {
            None if delta > 0 => 0,
            None => count - 1,
            Some(current) => (current as isize + delta).rem_euclid(count),
        };
        self.highlight(popup, Some(next as usize));
    }

    fn horizontal(&mut self, popup: PopupId, forward: bool) {
        let Some(p) = self.popups.get(&popup) else {
            return;
        };
        let parent = p.parent;
        if forward
            && let Some(row) = p.highlight
            && p.rows.get(row).is_some_and(|r| r.submenu().is_some() && r.enabled.evaluate())
        {
            if let Err(err) = self.open_submenu(popup, row, true) {
                trace!(%err, "submenu vanished");
            }
            return;
        }
        if !forward && parent.is_some() {
            if let Err(err) = self.close_popup(popup, true) {
                trace!(%err, "popup vanished");
            }
            return;
        }
        if let Some(ActiveTree {
            owner: PopupOwner::MenuBar(bar),
            ..
        }) = self.active
        {
            self.cycle_bar(bar, if forward { 1 } else { -1 });
        }
    }

    /// Escape: close the current popup and return to its parent row, or
    /// leave menus entirely from the top level.
    fn cancel(&mut self, popup: PopupId) {
        let has_parent = self.popups.get(&popup).is_some_and(|p| p.parent.is_some());
        if has_parent {
            if let Err(err) = self.close_popup(popup, true) {
                trace!(%err, "popup vanished");
            }
        } else {
            self.release();
        }
    }

    /// Letter typed while a popup has the keyboard. A single match is
    /// activated; several matches cycle the highlight.
    fn type_ahead(&mut self, popup: PopupId, typed: char) {
        let typed = typed.to_ascii_lowercase();
        let Some(p) = self.popups.get(&popup) else {
            return;
        };
        let matches: Vec<usize> = p
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| !row.is_placeholder() && row.type_ahead_key() == Some(typed))
            .map(|(index, _)| index)
            .collect();
        match matches.as_slice() {
            [] => {}
            [only] => {
                let only = *only;
                self.highlight(popup, Some(only));
                if let Err(err) = self.activate(popup, only) {
                    trace!(%err, "type-ahead target vanished");
                }
            }
            several => {
                let next = several
                    .iter()
                    .copied()
                    .find(|row| p.highlight.is_none_or(|current| *row > current))
                    .unwrap_or(several[0]);
                self.highlight(popup, Some(next));
            }
        }
    }
}

fn is_bare_alt(key: &KeyEvent) -> bool {
    matches!(
        key.code,
        KeyCode::Modifier(ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt)
    )
}
