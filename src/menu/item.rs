//! Application-facing menu item descriptions.
//!
//! Items are plain data plus callbacks. The engine turns them into popup
//! rows when a menu is built and never mutates them afterwards; dynamic
//! state (enabled, checked, selected radio value) is re-read through the
//! callbacks whenever a popup refreshes.

use std::fmt;
use std::rc::Rc;

pub type Action = Rc<dyn Fn()>;

/// Whether a row can be activated: a fixed flag or a predicate evaluated
/// on every refresh and again at activation time.
#[derive(Clone)]
pub enum Enabled {
    Always(bool),
    When(Rc<dyn Fn() -> bool>),
}

impl Enabled {
    pub fn when(predicate: impl Fn() -> bool + 'static) -> Self {
        Enabled::When(Rc::new(predicate))
    }

    pub fn evaluate(&self) -> bool {
        match self {
            Enabled::Always(flag) => *flag,
            Enabled::When(predicate) => predicate(),
        }
    }
}

impl Default for Enabled {
    fn default() -> Self {
        Enabled::Always(true)
    }
}

impl From<bool> for Enabled {
    fn from(flag: bool) -> Self {
        Enabled::Always(flag)
    }
}

impl fmt::Debug for Enabled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Enabled::Always(flag) => write!(f, "Always({flag})"),
            Enabled::When(_) => f.write_str("When(..)"),
        }
    }
}

#[derive(Clone)]
pub struct CommandItem {
    pub label: String,
    pub icon: Option<String>,
    pub shortcut: Option<String>,
    pub description: Option<String>,
    pub enabled: Enabled,
    pub(crate) action: Action,
}

impl CommandItem {
    pub fn new(label: impl Into<String>, action: impl Fn() + 'static) -> Self {
        Self {
            label: label.into(),
            icon: None,
            shortcut: None,
            description: None,
            enabled: Enabled::default(),
            action: Rc::new(action),
        }
    }

    pub fn shortcut(mut self, shortcut: impl Into<String>) -> Self {
        self.shortcut = Some(shortcut.into());
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn enabled(mut self, enabled: impl Into<Enabled>) -> Self {
        self.enabled = enabled.into();
        self
    }
}

#[derive(Clone)]
pub struct CheckboxItem {
    pub label: String,
    pub shortcut: Option<String>,
    pub description: Option<String>,
    pub enabled: Enabled,
    pub(crate) check: Rc<dyn Fn() -> bool>,
    pub(crate) toggle: Action,
}

impl CheckboxItem {
    pub fn new(
        label: impl Into<String>,
        check: impl Fn() -> bool + 'static,
        toggle: impl Fn() + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            shortcut: None,
            description: None,
            enabled: Enabled::default(),
            check: Rc::new(check),
            toggle: Rc::new(toggle),
        }
    }

    pub fn shortcut(mut self, shortcut: impl Into<String>) -> Self {
        self.shortcut = Some(shortcut.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn enabled(mut self, enabled: impl Into<Enabled>) -> Self {
        self.enabled = enabled.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioOption {
    pub label: String,
    pub value: String,
}

impl RadioOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Mutually exclusive options sharing one value. Renders as one row per
/// option.
#[derive(Clone)]
pub struct RadioGroup {
    pub aria_label: Option<String>,
    pub options: Vec<RadioOption>,
    pub enabled: Enabled,
    pub(crate) get_value: Rc<dyn Fn() -> String>,
    pub(crate) set_value: Rc<dyn Fn(&str)>,
}

impl RadioGroup {
    pub fn new(
        options: Vec<RadioOption>,
        get_value: impl Fn() -> String + 'static,
        set_value: impl Fn(&str) + 'static,
    ) -> Self {
        Self {
            aria_label: None,
            options,
            enabled: Enabled::default(),
            get_value: Rc::new(get_value),
            set_value: Rc::new(set_value),
        }
    }

    pub fn aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = Some(label.into());
        self
    }

    pub fn enabled(mut self, enabled: impl Into<Enabled>) -> Self {
        self.enabled = enabled.into();
        self
    }
}

#[derive(Clone)]
pub struct SubmenuItem {
    pub label: String,
    pub description: Option<String>,
    pub enabled: Enabled,
    pub items: Vec<MenuItem>,
}

impl SubmenuItem {
    pub fn new(label: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Self {
            label: label.into(),
            description: None,
            enabled: Enabled::default(),
            items,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn enabled(mut self, enabled: impl Into<Enabled>) -> Self {
        self.enabled = enabled.into();
        self
    }
}

#[derive(Clone)]
pub enum MenuItem {
    Divider,
    Command(CommandItem),
    Checkbox(CheckboxItem),
    Radio(RadioGroup),
    Submenu(SubmenuItem),
}

impl MenuItem {
    pub fn command(label: impl Into<String>, action: impl Fn() + 'static) -> Self {
        MenuItem::Command(CommandItem::new(label, action))
    }

    pub fn checkbox(
        label: impl Into<String>,
        check: impl Fn() -> bool + 'static,
        toggle: impl Fn() + 'static,
    ) -> Self {
        MenuItem::Checkbox(CheckboxItem::new(label, check, toggle))
    }

    pub fn submenu(label: impl Into<String>, items: Vec<MenuItem>) -> Self {
        MenuItem::Submenu(SubmenuItem::new(label, items))
    }

    pub fn divider() -> Self {
        MenuItem::Divider
    }

    pub fn is_interactive(&self) -> bool {
        match self {
            MenuItem::Divider => false,
            MenuItem::Radio(group) => !group.options.is_empty(),
            _ => true,
        }
    }
}

impl From<CommandItem> for MenuItem {
    fn from(item: CommandItem) -> Self {
        MenuItem::Command(item)
    }
}

impl From<CheckboxItem> for MenuItem {
    fn from(item: CheckboxItem) -> Self {
        MenuItem::Checkbox(item)
    }
}

impl From<RadioGroup> for MenuItem {
    fn from(group: RadioGroup) -> Self {
        MenuItem::Radio(group)
    }
}

impl From<SubmenuItem> for MenuItem {
    fn from(item: SubmenuItem) -> Self {
        MenuItem::Submenu(item)
    }
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuItem::Divider => f.write_str("Divider"),
            MenuItem::Command(item) => f.debug_tuple("Command").field(&item.label).finish(),
            MenuItem::Checkbox(item) => f.debug_tuple("Checkbox").field(&item.label).finish(),
            MenuItem::Radio(group) => f
                .debug_tuple("Radio")
                .field(&group.options.iter().map(|o| &o.label).collect::<Vec<_>>())
                .finish(),
            MenuItem::Submenu(item) => f
                .debug_struct("Submenu")
                .field("label", &item.label)
                .field("items", &item.items)
                .finish(),
        }
    }
}

/// One entry of a menu bar: a button label and the items of its dropdown.
#[derive(Clone, Debug)]
pub struct TopLevelMenu {
    pub label: String,
    pub items: Vec<MenuItem>,
}

impl TopLevelMenu {
    pub fn new(label: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Self {
            label: label.into(),
            items,
        }
    }
}
