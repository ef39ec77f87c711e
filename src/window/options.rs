use std::collections::BTreeMap;

use crate::menu::TopLevelMenu;

use super::{FloatRect, WindowId};

/// Icon slot: either a concrete square size in cells or the catch-all
/// "any" entry used when no exact size exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IconSize {
    Px(u16),
    Any,
}

/// Icons keyed by size. Values are opaque to the engine (a glyph, a path,
/// a resource name).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IconSet {
    icons: BTreeMap<IconSize, String>,
}

impl IconSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, size: IconSize, icon: impl Into<String>) -> Self {
        self.icons.insert(size, icon.into());
        self
    }

    pub fn insert(&mut self, size: IconSize, icon: impl Into<String>) {
        self.icons.insert(size, icon.into());
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    /// Exact size first, then the "any" entry, then the nearest concrete
    /// size (smaller wins a tie).
    pub fn at_size(&self, target: u16) -> Option<&str> {
        if let Some(icon) = self.icons.get(&IconSize::Px(target)) {
            return Some(icon);
        }
        if let Some(icon) = self.icons.get(&IconSize::Any) {
            return Some(icon);
        }
        self.icons
            .iter()
            .filter_map(|(size, icon)| match size {
                IconSize::Px(px) => Some((px.abs_diff(target), *px, icon)),
                IconSize::Any => None,
            })
            .min_by_key(|(distance, px, _)| (*distance, *px))
            .map(|(_, _, icon)| icon.as_str())
    }
}

/// Requested size. Outer dimensions include the frame; inner dimensions
/// describe the content area and get the frame (and menu bar row) added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dimensions {
    pub outer_width: Option<u16>,
    pub outer_height: Option<u16>,
    pub inner_width: Option<u16>,
    pub inner_height: Option<u16>,
}

impl Dimensions {
    pub fn outer(width: u16, height: u16) -> Self {
        Self {
            outer_width: Some(width),
            outer_height: Some(height),
            ..Self::default()
        }
    }

    pub fn inner(width: u16, height: u16) -> Self {
        Self {
            inner_width: Some(width),
            inner_height: Some(height),
            ..Self::default()
        }
    }
}

#[derive(Clone, Default)]
pub struct WindowOptions {
    pub title: String,
    pub dimensions: Dimensions,
    pub position: Option<(i32, i32)>,
    pub resizable: Option<bool>,
    pub minimizable: Option<bool>,
    pub maximizable: Option<bool>,
    pub closable: Option<bool>,
    pub tool_window: bool,
    pub parent: Option<WindowId>,
    pub icons: IconSet,
    pub menu_bar: Option<Vec<TopLevelMenu>>,
    pub minimize_target: Option<FloatRect>,
}

impl std::fmt::Debug for WindowOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowOptions")
            .field("title", &self.title)
            .field("dimensions", &self.dimensions)
            .field("position", &self.position)
            .field("tool_window", &self.tool_window)
            .field("parent", &self.parent)
            .field("menu_bar", &self.menu_bar.as_ref().map(Vec::len))
            .finish_non_exhaustive()
    }
}

impl WindowOptions {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn outer_size(mut self, width: u16, height: u16) -> Self {
        self.dimensions = Dimensions::outer(width, height);
        self
    }

    pub fn inner_size(mut self, width: u16, height: u16) -> Self {
        self.dimensions = Dimensions::inner(width, height);
        self
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.position = Some((x, y));
        self
    }

    pub fn resizable(mut self, resizable: bool) -> Self {
        self.resizable = Some(resizable);
        self
    }

    pub fn minimizable(mut self, minimizable: bool) -> Self {
        self.minimizable = Some(minimizable);
        self
    }

    pub fn maximizable(mut self, maximizable: bool) -> Self {
        self.maximizable = Some(maximizable);
        self
    }

    pub fn closable(mut self, closable: bool) -> Self {
        self.closable = Some(closable);
        self
    }

    pub fn tool_window(mut self) -> Self {
        self.tool_window = true;
        self
    }

    pub fn parent(mut self, parent: WindowId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn icons(mut self, icons: IconSet) -> Self {
        self.icons = icons;
        self
    }

    pub fn menu_bar(mut self, menus: Vec<TopLevelMenu>) -> Self {
        self.menu_bar = Some(menus);
        self
    }

    pub fn minimize_target(mut self, target: FloatRect) -> Self {
        self.minimize_target = Some(target);
        self
    }
}
