//! Viewport-aware popup placement.
//!
//! Pure geometry: callers measure the popup content first and hand the
//! resulting size in, so a popup is committed to its final rectangle in a
//! single step.

use ratatui::layout::Size;

use crate::config::LayoutDirection;
use crate::window::FloatRect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupPositioner {
    viewport: Size,
    direction: LayoutDirection,
}

impl PopupPositioner {
    pub fn new(viewport: Size, direction: LayoutDirection) -> Self {
        Self {
            viewport,
            direction,
        }
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn direction(&self) -> LayoutDirection {
        self.direction
    }

    /// Place a submenu beside its trigger row.
    ///
    /// Opens past the row's trailing edge (right in LTR, left in RTL) with
    /// the tops aligned. Horizontal overflow flips the popup to the other
    /// side of the row; bottom overflow shifts it up by the overflow amount.
    pub fn place_submenu(&self, anchor: FloatRect, content: Size) -> FloatRect {
        let width = i32::from(content.width);
        let vw = i32::from(self.viewport.width);
        let x = match self.direction {
            LayoutDirection::Ltr => {
                let preferred = anchor.right();
                if preferred + width > vw {
                    (anchor.x - width).max(0)
                } else {
                    preferred
                }
            }
            LayoutDirection::Rtl => {
                let preferred = anchor.x - width;
                if preferred < 0 {
                    let flipped = anchor.right();
                    if flipped + width > vw {
                        (vw - width).max(0)
                    } else {
                        flipped
                    }
                } else {
                    preferred
                }
            }
        };
        FloatRect {
            x,
            y: self.fit_vertically(anchor.y, content.height),
            width: content.width,
            height: content.height,
        }
    }

    /// Place a menu-bar dropdown directly below its button, aligned to the
    /// button's leading edge and clamped into the viewport.
    pub fn place_dropdown(&self, anchor: FloatRect, content: Size) -> FloatRect {
        let width = i32::from(content.width);
        let vw = i32::from(self.viewport.width);
        let mut x = match self.direction {
            LayoutDirection::Ltr => anchor.x,
            LayoutDirection::Rtl => anchor.right() - width,
        };
        if x + width > vw {
            x = vw - width;
        }
        FloatRect {
            x: x.max(0),
            y: self.fit_vertically(anchor.bottom(), content.height),
            width: content.width,
            height: content.height,
        }
    }

    /// Place a context menu at a pointer position, treated as a zero-size
    /// anchor.
    pub fn place_at_point(&self, x: i32, y: i32, content: Size) -> FloatRect {
        self.place_submenu(
            FloatRect {
                x,
                y,
                width: 0,
                height: 0,
            },
            content,
        )
    }

    fn fit_vertically(&self, top: i32, height: u16) -> i32 {
        let vh = i32::from(self.viewport.height);
        let overflow = top + i32::from(height) - vh;
        if overflow > 0 {
            (top - overflow).max(0)
        } else {
            top
        }
    }
}
