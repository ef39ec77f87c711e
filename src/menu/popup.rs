use std::rc::Rc;

use ratatui::layout::Size;
use ratatui::text::Line;

use crate::access_keys;
use crate::constants::EMPTY_MENU_LABEL;
use crate::window::{FloatRect, WindowId};

use super::item::{Action, Enabled};
use super::{MenuBarId, PopupId};

/// Lifecycle of a submenu slot (one per row that owns a submenu).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmenuState {
    #[default]
    Idle,
    PendingOpen,
    Open,
    PendingClose,
}

/// What a popup tree hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupOwner {
    MenuBar(MenuBarId),
    /// Context menus have no persistent owner and are destroyed on close.
    Context,
}

#[derive(Clone)]
pub enum RowKind {
    Command(Action),
    Checkbox {
        check: Rc<dyn Fn() -> bool>,
        toggle: Action,
    },
    Radio {
        value: String,
        get_value: Rc<dyn Fn() -> String>,
        set_value: Rc<dyn Fn(&str)>,
    },
    Submenu {
        popup: PopupId,
        state: SubmenuState,
    },
    /// Disabled stand-in for a menu with nothing to show.
    Placeholder,
}

/// Rendered snapshot of a row's dynamic state, refreshed by
/// [`super::MenuEngine::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowDisplay {
    pub disabled: bool,
    /// `Some` for checkbox and radio rows.
    pub checked: Option<bool>,
}

#[derive(Clone)]
pub struct MenuRow {
    pub(crate) label: String,
    pub(crate) icon: Option<String>,
    pub(crate) shortcut: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) enabled: Enabled,
    pub(crate) kind: RowKind,
    pub(crate) display: RowDisplay,
    /// Position among the popup's entries (dividers included).
    pub(crate) entry: usize,
}

impl std::fmt::Debug for MenuRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuRow")
            .field("label", &self.label)
            .field("display", &self.display)
            .field("submenu", &self.submenu())
            .finish_non_exhaustive()
    }
}

impl MenuRow {
    pub(crate) fn new(label: String, enabled: Enabled, kind: RowKind, entry: usize) -> Self {
        Self {
            label,
            icon: None,
            shortcut: None,
            description: None,
            enabled,
            kind,
            display: RowDisplay::default(),
            entry,
        }
    }

    pub(crate) fn placeholder(entry: usize) -> Self {
        let mut row = Self::new(
            EMPTY_MENU_LABEL.to_string(),
            Enabled::Always(false),
            RowKind::Placeholder,
            entry,
        );
        row.display.disabled = true;
        row
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn text(&self) -> String {
        access_keys::to_text(&self.label)
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn shortcut(&self) -> Option<&str> {
        self.shortcut.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn display(&self) -> RowDisplay {
        self.display
    }

    pub fn kind(&self) -> &RowKind {
        &self.kind
    }

    pub fn entry_index(&self) -> usize {
        self.entry
    }

    pub fn submenu(&self) -> Option<(PopupId, SubmenuState)> {
        match self.kind {
            RowKind::Submenu { popup, state } => Some((popup, state)),
            _ => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.kind, RowKind::Placeholder)
    }

    pub(crate) fn set_submenu_state(&mut self, next: SubmenuState) {
        if let RowKind::Submenu { state, .. } = &mut self.kind {
            *state = next;
        }
    }

    /// Re-read the enabled predicate and checked state.
    pub(crate) fn refresh(&mut self) {
        self.display.disabled = !self.enabled.evaluate();
        self.display.checked = match &self.kind {
            RowKind::Checkbox { check, .. } => Some(check()),
            RowKind::Radio {
                value, get_value, ..
            } => Some(get_value() == *value),
            _ => None,
        };
    }

    /// Label type-ahead key: the access key if marked, else the first
    /// character of the visible text.
    pub(crate) fn type_ahead_key(&self) -> Option<char> {
        access_keys::get(&self.label)
            .or_else(|| access_keys::to_text(&self.label).chars().next())
            .map(|c| c.to_ascii_lowercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Entry {
    Divider,
    Row(usize),
}

/// Link from a submenu popup back to the row that opens it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ParentLink {
    pub popup: PopupId,
    pub row: usize,
}

#[derive(Debug, Clone)]
pub struct MenuPopup {
    pub(crate) id: PopupId,
    pub(crate) owner: PopupOwner,
    pub(crate) entries: Vec<Entry>,
    pub(crate) rows: Vec<MenuRow>,
    pub(crate) highlight: Option<usize>,
    pub(crate) open: bool,
    pub(crate) parent: Option<ParentLink>,
    pub(crate) rect: FloatRect,
    pub(crate) z: u64,
    /// Window whose keyboard scope the popup belongs to, if any.
    pub(crate) scope: Option<WindowId>,
}

impl MenuPopup {
    pub fn id(&self) -> PopupId {
        self.id
    }

    pub fn owner(&self) -> PopupOwner {
        self.owner
    }

    pub fn rows(&self) -> &[MenuRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&MenuRow> {
        self.rows.get(index)
    }

    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn parent(&self) -> Option<(PopupId, usize)> {
        self.parent.map(|link| (link.popup, link.row))
    }

    pub fn rect(&self) -> FloatRect {
        self.rect
    }

    pub fn z_slot(&self) -> u64 {
        self.z
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_divider(&self, entry: usize) -> bool {
        matches!(self.entries.get(entry), Some(Entry::Divider))
    }

    /// Row rendered at entry position `entry`, if it is not a divider.
    pub fn row_at_entry(&self, entry: usize) -> Option<usize> {
        match self.entries.get(entry) {
            Some(Entry::Row(row)) => Some(*row),
            _ => None,
        }
    }

    /// Rectangle of a row, spanning the full popup width including its
    /// border columns.
    pub fn row_rect(&self, row: usize) -> Option<FloatRect> {
        let entry = self.rows.get(row)?.entry;
        Some(FloatRect {
            x: self.rect.x,
            y: self.rect.y + 1 + entry as i32,
            width: self.rect.width,
            height: 1,
        })
    }

    /// Which row sits under `(x, y)`: outer `None` when the point misses
    /// the popup, inner `None` for borders and dividers.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<Option<usize>> {
        if !self.open || !self.rect.contains(x, y) {
            return None;
        }
        let inside_x = x > self.rect.x && x < self.rect.right() - 1;
        let entry = y - self.rect.y - 1;
        if !inside_x || entry < 0 {
            return Some(None);
        }
        Some(self.row_at_entry(entry as usize))
    }

    /// Columns and lines needed to show every row without truncation.
    pub fn measure(&self) -> Size {
        let label_width = self
            .rows
            .iter()
            .map(|row| Line::from(row.text()).width())
            .max()
            .unwrap_or(0);
        let shortcut_width = self
            .rows
            .iter()
            .filter_map(|row| row.shortcut.as_deref())
            .map(|s| Line::from(s).width())
            .max()
            .map(|w| w + 2)
            .unwrap_or(0);
        // check column + label + shortcut + submenu arrow + borders
        let width = 2 + label_width + shortcut_width + 2 + 2;
        let height = self.entries.len() + 2;
        Size::new(
            width.min(usize::from(u16::MAX)) as u16,
            height.min(usize::from(u16::MAX)) as u16,
        )
    }

    pub(crate) fn submenu_rows(&self) -> impl Iterator<Item = (usize, PopupId, SubmenuState)> + '_ {
        self.rows.iter().enumerate().filter_map(|(index, row)| {
            row.submenu().map(|(popup, state)| (index, popup, state))
        })
    }

    /// Row whose submenu is currently open, if any.
    pub(crate) fn open_submenu_row(&self) -> Option<usize> {
        self.submenu_rows()
            .find(|(_, _, state)| matches!(state, SubmenuState::Open | SubmenuState::PendingClose))
            .map(|(row, _, _)| row)
    }
}
