use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, ModifierKeyCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    // Menu navigation
    MenuUp,
    MenuDown,
    MenuLeft,
    MenuRight,
    MenuActivate,
    MenuCancel,
    // Closes every menu and hands focus back (bare Alt)
    MenuRelease,
    // Window management
    CycleNextWindow,
    CyclePrevWindow,
    MinimizeWindow,
    MaximizeWindow,
    CloseWindow,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Quit => "Quit",
            Action::MenuUp => "Menu up",
            Action::MenuDown => "Menu down",
            Action::MenuLeft => "Menu left",
            Action::MenuRight => "Menu right",
            Action::MenuActivate => "Activate menu item",
            Action::MenuCancel => "Close menu",
            Action::MenuRelease => "Leave menus",
            Action::CycleNextWindow => "Cycle next window",
            Action::CyclePrevWindow => "Cycle previous window",
            Action::MinimizeWindow => "Minimize window",
            Action::MaximizeWindow => "Maximize / restore window",
            Action::CloseWindow => "Close window",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        key.code == self.code && key.modifiers == self.mods
    }

    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.mods.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        if self.mods.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        let code = match self.code {
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::BackTab => "Shift+Tab".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::F(n) => format!("F{}", n),
            KeyCode::Modifier(ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt) => {
                "Alt".to_string()
            }
            _ => format!("{:?}", self.code),
        };
        parts.push(code);
        parts.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<Action, Vec<KeyCombo>>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        use Action::*;
        let mut kb = Self::new();
        kb.add(
            Quit,
            KeyCombo::new(KeyCode::Char('q'), KeyModifiers::CONTROL),
        );
        kb.add(MenuUp, KeyCombo::new(KeyCode::Up, KeyModifiers::NONE));
        kb.add(MenuDown, KeyCombo::new(KeyCode::Down, KeyModifiers::NONE));
        kb.add(MenuLeft, KeyCombo::new(KeyCode::Left, KeyModifiers::NONE));
        kb.add(MenuRight, KeyCombo::new(KeyCode::Right, KeyModifiers::NONE));
        kb.add(
            MenuActivate,
            KeyCombo::new(KeyCode::Enter, KeyModifiers::NONE),
        );
        kb.add(
            MenuActivate,
            KeyCombo::new(KeyCode::Char(' '), KeyModifiers::NONE),
        );
        kb.add(MenuCancel, KeyCombo::new(KeyCode::Esc, KeyModifiers::NONE));
        // Bare Alt only arrives with the kitty keyboard protocol enabled.
        kb.add(
            MenuRelease,
            KeyCombo::new(
                KeyCode::Modifier(ModifierKeyCode::LeftAlt),
                KeyModifiers::ALT,
            ),
        );
        kb.add(
            MenuRelease,
            KeyCombo::new(KeyCode::F(10), KeyModifiers::NONE),
        );
        kb.add(
            CycleNextWindow,
            KeyCombo::new(KeyCode::Tab, KeyModifiers::ALT),
        );
        kb.add(
            CyclePrevWindow,
            KeyCombo::new(KeyCode::BackTab, KeyModifiers::ALT),
        );
        kb.add(
            MinimizeWindow,
            KeyCombo::new(KeyCode::F(9), KeyModifiers::ALT),
        );
        kb.add(
            MaximizeWindow,
            KeyCombo::new(KeyCode::F(10), KeyModifiers::ALT),
        );
        kb.add(
            CloseWindow,
            KeyCombo::new(KeyCode::F(4), KeyModifiers::ALT),
        );
        kb
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn add(&mut self, action: Action, combo: KeyCombo) {
        self.map.entry(action).or_default().push(combo);
    }

    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        if let Some(list) = self.map.get(&action) {
            list.iter().any(|c| c.matches(key))
        } else {
            false
        }
    }

    /// First action, in a fixed priority order, bound to `key`.
    pub fn action_for_key(&self, key: &KeyEvent) -> Option<Action> {
        use Action::*;
        [
            Quit,
            MenuUp,
            MenuDown,
            MenuLeft,
            MenuRight,
            MenuActivate,
            MenuCancel,
            MenuRelease,
            CycleNextWindow,
            CyclePrevWindow,
            MinimizeWindow,
            MaximizeWindow,
            CloseWindow,
        ]
        .into_iter()
        .find(|action| self.matches(*action, key))
    }

    /// Return the display strings for all combos mapped to `action`.
    pub fn combos_for(&self, action: Action) -> Vec<String> {
        self.map
            .get(&action)
            .map(|list| list.iter().map(|c| c.display()).collect())
            .unwrap_or_default()
    }
}
