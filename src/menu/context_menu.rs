use tracing::debug;

use super::engine::{ActiveTree, MenuEngine};
use super::item::MenuItem;
use super::popup::PopupOwner;
use super::PopupId;

impl MenuEngine {
    /// Show a transient popup tree at a pointer position. Any open menu
    /// closes first; the new tree is destroyed as soon as it closes.
    pub fn open_context_menu(&mut self, items: &[MenuItem], x: i32, y: i32) -> PopupId {
        self.dismiss();
        let root = self.build_popup(items, PopupOwner::Context, None, None);
        let size = self
            .popups
            .get(&root)
            .map(|p| p.measure())
            .unwrap_or_default();
        let rect = self.positioner().place_at_point(x, y, size);
        self.show_popup(root, rect);
        self.active = Some(ActiveTree {
            owner: PopupOwner::Context,
            root,
        });
        self.active_popup = Some(root);
        debug!(%root, x, y, "context menu opened");
        root
    }

    /// Open popup tree of the current context menu, if one is showing.
    pub fn context_menu(&self) -> Option<PopupId> {
        match self.active {
            Some(ActiveTree {
                owner: PopupOwner::Context,
                root,
            }) => Some(root),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::EngineConfig;
    use crate::menu::{MenuEngine, MenuItem};
    use crate::scheduler::ManualClock;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::cell::Cell;
    use std::rc::Rc;

    fn engine() -> MenuEngine {
        MenuEngine::new(EngineConfig::default(), Rc::new(ManualClock::new()))
    }

    #[test]
    fn context_menu_flips_near_the_corner() {
        let mut engine = engine();
        let root = engine.open_context_menu(
            &[MenuItem::command("&Arrange Icons", || {}), MenuItem::command("&Refresh", || {})],
            78,
            23,
        );
        let rect = engine.popup(root).unwrap().rect();
        assert!(rect.right() <= 80);
        assert!(rect.bottom() <= 24);
        assert!(rect.x < 78);
    }

    #[test]
    fn closing_destroys_the_tree() {
        let mut engine = engine();
        let root = engine.open_context_menu(
            &[MenuItem::submenu("&New", vec![MenuItem::command("&Folder", || {})])],
            5,
            5,
        );
        let child = engine.popup(root).unwrap().rows()[0].submenu().unwrap().0;
        engine.close_menus();
        assert!(engine.popup(root).is_none());
        assert!(engine.popup(child).is_none());
        assert_eq!(engine.context_menu(), None);
    }

    #[test]
    fn a_second_context_menu_replaces_the_first() {
        let mut engine = engine();
        let first = engine.open_context_menu(&[MenuItem::command("&Undo", || {})], 1, 1);
        let second = engine.open_context_menu(&[MenuItem::command("&Redo", || {})], 2, 2);
        assert!(engine.popup(first).is_none());
        assert_eq!(engine.context_menu(), Some(second));
    }

    #[test]
    fn activation_runs_the_command_and_closes() {
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let mut engine = engine();
        let root = engine.open_context_menu(
            &[MenuItem::command("&Properties", move || counter.set(counter.get() + 1))],
            3,
            3,
        );
        engine.handle_key(&KeyEvent::new(KeyCode::Down, KeyModifiers::NONE));
        engine.handle_key(&KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(hits.get(), 1);
        assert!(engine.popup(root).is_none());
        assert!(!engine.has_keyboard());
    }
}
