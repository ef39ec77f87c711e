use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::text::Line;
use tracing::{debug, trace};

use crate::access_keys;
use crate::config::LayoutDirection;
use crate::error::{WmError, WmResult};
use crate::keybindings::Action;
use crate::window::{FloatRect, WindowId};

use super::engine::{ActiveTree, MenuEngine, MenuNotice};
use super::item::TopLevelMenu;
use super::popup::PopupOwner;
use super::{MenuBarId, PopupId};

#[derive(Debug, Clone)]
pub struct MenuBarEntry {
    pub label: String,
    pub popup: PopupId,
}

impl MenuBarEntry {
    pub fn text(&self) -> String {
        access_keys::to_text(&self.label)
    }

    pub fn access_key(&self) -> Option<char> {
        access_keys::get(&self.label)
    }

    /// Button width: the label plus one column of padding each side.
    pub fn width(&self) -> u16 {
        let width = Line::from(self.text()).width() + 2;
        width.min(usize::from(u16::MAX)) as u16
    }
}

/// A row of top-level buttons, each owning a dropdown popup tree.
///
/// While `selecting`, hovering another button switches the open dropdown.
#[derive(Debug, Clone)]
pub struct MenuBar {
    pub(super) id: MenuBarId,
    pub(super) entries: Vec<MenuBarEntry>,
    pub(super) selecting: bool,
    pub(super) highlight: Option<usize>,
    pub(super) open_index: Option<usize>,
    pub(super) scope: Option<WindowId>,
    pub(super) origin: Option<FloatRect>,
}

impl MenuBar {
    pub fn id(&self) -> MenuBarId {
        self.id
    }

    pub fn entries(&self) -> &[MenuBarEntry] {
        &self.entries
    }

    pub fn is_selecting(&self) -> bool {
        self.selecting
    }

    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    pub fn open_index(&self) -> Option<usize> {
        self.open_index
    }

    /// Window whose keyboard shortcuts reach this bar.
    pub fn scope(&self) -> Option<WindowId> {
        self.scope
    }

    /// Row the bar is laid out on, if it is currently visible.
    pub fn origin(&self) -> Option<FloatRect> {
        self.origin
    }

    /// Button rectangles in entry order. Buttons flow from the leading
    /// edge of the bar row.
    pub fn button_rects(&self, direction: LayoutDirection) -> Vec<FloatRect> {
        let Some(origin) = self.origin else {
            return Vec::new();
        };
        let mut rects = Vec::with_capacity(self.entries.len());
        let mut cursor = match direction {
            LayoutDirection::Ltr => origin.x,
            LayoutDirection::Rtl => origin.right(),
        };
        for entry in &self.entries {
            let width = entry.width();
            let x = match direction {
                LayoutDirection::Ltr => {
                    let x = cursor;
                    cursor += i32::from(width);
                    x
                }
                LayoutDirection::Rtl => {
                    cursor -= i32::from(width);
                    cursor
                }
            };
            rects.push(FloatRect::new(x, origin.y, width, 1));
        }
        rects
    }

    pub fn button_at(&self, direction: LayoutDirection, x: i32, y: i32) -> Option<usize> {
        self.button_rects(direction)
            .iter()
            .position(|rect| rect.contains(x, y))
    }

    fn index_for_access_key(&self, typed: char) -> Option<usize> {
        let typed = typed.to_ascii_lowercase();
        self.entries
            .iter()
            .position(|entry| entry.access_key().map(|c| c.to_ascii_lowercase()) == Some(typed))
    }
}

impl MenuEngine {
    pub fn create_menu_bar(&mut self, menus: &[TopLevelMenu]) -> MenuBarId {
        let id = self.allocate_bar_id();
        let entries = menus
            .iter()
            .map(|menu| MenuBarEntry {
                label: menu.label.clone(),
                popup: self.build_popup(&menu.items, PopupOwner::MenuBar(id), None, None),
            })
            .collect();
        self.bars.insert(
            id,
            MenuBar {
                id,
                entries,
                selecting: false,
                highlight: None,
                open_index: None,
                scope: None,
                origin: None,
            },
        );
        debug!(bar = %id, menus = menus.len(), "menu bar created");
        id
    }

    pub fn destroy_menu_bar(&mut self, id: MenuBarId) -> WmResult<()> {
        if !self.bars.contains_key(&id) {
            return Err(WmError::UnknownMenuBar { id });
        }
        if self
            .active
            .is_some_and(|tree| tree.owner == PopupOwner::MenuBar(id))
        {
            self.close_menus();
        }
        if self.bar_focus == Some(id) {
            self.bar_focus = None;
        }
        if let Some(bar) = self.bars.remove(&id) {
            for entry in bar.entries {
                self.destroy_tree(entry.popup);
            }
        }
        debug!(bar = %id, "menu bar destroyed");
        Ok(())
    }

    pub fn bar(&self, id: MenuBarId) -> Option<&MenuBar> {
        self.bars.get(&id)
    }

    fn bar_mut(&mut self, id: MenuBarId) -> WmResult<&mut MenuBar> {
        self.bars.get_mut(&id).ok_or(WmError::UnknownMenuBar { id })
    }

    /// Bind the bar to a window so Alt+letter in that window reaches it.
    pub fn set_bar_scope(&mut self, id: MenuBarId, scope: Option<WindowId>) -> WmResult<()> {
        let bar = self.bar_mut(id)?;
        bar.scope = scope;
        let roots: Vec<PopupId> = bar.entries.iter().map(|e| e.popup).collect();
        for root in roots {
            self.set_tree_scope(root, scope);
        }
        Ok(())
    }

    pub fn set_bar_origin(&mut self, id: MenuBarId, origin: Option<FloatRect>) -> WmResult<()> {
        self.bar_mut(id)?.origin = origin;
        Ok(())
    }

    /// Open the dropdown of entry `index`, closing any other open tree.
    /// `highlight_first` is the keyboard path: the first row gets the
    /// highlight.
    pub fn open_top_level(
        &mut self,
        bar: MenuBarId,
        index: usize,
        highlight_first: bool,
    ) -> WmResult<()> {
        let b = self.bars.get(&bar).ok_or(WmError::UnknownMenuBar { id: bar })?;
        let Some(entry) = b.entries.get(index) else {
            return Ok(());
        };
        let root = entry.popup;
        let already_open =
            b.open_index == Some(index) && self.popups.get(&root).is_some_and(|p| p.open);
        if already_open {
            if highlight_first {
                self.highlight(root, Some(0));
                self.active_popup = Some(root);
            }
            return Ok(());
        }
        let anchor = b
            .button_rects(self.config.direction)
            .get(index)
            .copied()
            .unwrap_or_default();

        self.close_menus();
        let b = self.bar_mut(bar)?;
        b.selecting = true;
        b.open_index = Some(index);
        b.highlight = Some(index);

        let size = self
            .popups
            .get(&root)
            .map(|p| p.measure())
            .unwrap_or_default();
        let rect = self.positioner().place_dropdown(anchor, size);
        self.show_popup(root, rect);
        self.active = Some(ActiveTree {
            owner: PopupOwner::MenuBar(bar),
            root,
        });
        self.active_popup = Some(root);
        self.bar_focus = Some(bar);
        if highlight_first {
            self.highlight(root, Some(0));
        } else {
            self.notices.push(MenuNotice::Info(None));
        }
        debug!(%bar, index, %root, "top-level menu opened");
        Ok(())
    }

    /// Pointer pressed on a bar button. Pressing the button of the open
    /// dropdown closes it and gives focus back.
    pub fn bar_pointer_down(&mut self, bar: MenuBarId, index: usize) -> WmResult<()> {
        let b = self.bars.get(&bar).ok_or(WmError::UnknownMenuBar { id: bar })?;
        if b.open_index == Some(index) {
            self.release();
            return Ok(());
        }
        self.open_top_level(bar, index, false)
    }

    /// Pointer over a bar button (`None` once it leaves the bar). While
    /// selecting, hovering switches the open dropdown.
    pub fn bar_hover(&mut self, bar: MenuBarId, index: Option<usize>) -> WmResult<()> {
        let has_focus = self.bar_focus == Some(bar);
        let b = self.bar_mut(bar)?;
        match index {
            Some(index) => {
                b.highlight = Some(index);
                if b.selecting && b.open_index != Some(index) {
                    self.open_top_level(bar, index, false)?;
                }
            }
            None => {
                if b.open_index.is_none() && !has_focus {
                    b.highlight = None;
                }
            }
        }
        Ok(())
    }

    /// Give the bar roving keyboard focus without opening anything.
    pub fn focus_bar(&mut self, bar: MenuBarId) -> WmResult<()> {
        self.close_menus();
        let b = self.bar_mut(bar)?;
        b.highlight = if b.entries.is_empty() { None } else { Some(0) };
        self.bar_focus = Some(bar);
        trace!(%bar, "menu bar focused");
        Ok(())
    }

    /// Open the entry whose access key matches `typed`.
    pub fn bar_access_key(&mut self, bar: MenuBarId, typed: char) -> WmResult<bool> {
        let b = self.bars.get(&bar).ok_or(WmError::UnknownMenuBar { id: bar })?;
        let Some(index) = b.index_for_access_key(typed) else {
            return Ok(false);
        };
        self.open_top_level(bar, index, true)?;
        Ok(true)
    }

    /// Alt+letter while a bar dropdown is open jumps to another entry.
    pub(super) fn switch_by_access_key(&mut self, typed: char) -> bool {
        let Some(ActiveTree {
            owner: PopupOwner::MenuBar(bar),
            ..
        }) = self.active
        else {
            return false;
        };
        self.bar_access_key(bar, typed).unwrap_or(false)
    }

    pub(super) fn cycle_bar(&mut self, bar: MenuBarId, delta: isize) {
        let Some(b) = self.bars.get(&bar) else {
            return;
        };
        let count = b.entries.len() as isize;
        if count == 0 {
            return;
        }
        let current = b.open_index.or(b.highlight).unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(count) as usize;
        if let Err(err) = self.open_top_level(bar, next, true) {
            trace!(%err, "menu bar vanished");
        }
    }

    /// Keys while the bar has roving focus and no dropdown is open.
    pub(super) fn bar_key(&mut self, bar: MenuBarId, key: &KeyEvent) -> bool {
        let Some(b) = self.bars.get_mut(&bar) else {
            self.bar_focus = None;
            return false;
        };
        let count = b.entries.len() as isize;
        match self.keybindings.action_for_key(key) {
            Some(action @ (Action::MenuLeft | Action::MenuRight)) if count > 0 => {
                let step = if self.config.direction.is_forward(action == Action::MenuRight) {
                    1
                } else {
                    -1
                };
                let current = b.highlight.unwrap_or(0) as isize;
                b.highlight = Some((current + step).rem_euclid(count) as usize);
            }
            Some(Action::MenuDown | Action::MenuUp | Action::MenuActivate) => {
                let index = b.highlight.unwrap_or(0);
                if let Err(err) = self.open_top_level(bar, index, true) {
                    trace!(%err, "menu bar vanished");
                }
            }
            Some(Action::MenuCancel) => self.release(),
            _ => match key.code {
                KeyCode::Char(c) => {
                    if let Err(err) = self.bar_access_key(bar, c) {
                        trace!(%err, "menu bar vanished");
                    }
                }
                _ if key.modifiers.contains(KeyModifiers::ALT) => return false,
                _ => {}
            },
        }
        true
    }
}
