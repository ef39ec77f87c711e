use ratatui::style::{Color, Modifier, Style};

use super::{Capabilities, FloatRect, title_bar_rect};
use crate::ui::UiFrame;

/// Part of a title bar under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderAction {
    Minimize,
    Maximize,
    Close,
    Drag,
}

pub const BUTTON_WIDTH: u16 = 3;

/// Title-bar buttons present for `caps`, from the trailing edge inwards.
pub fn header_buttons(geometry: FloatRect, caps: Capabilities) -> Vec<(HeaderAction, FloatRect)> {
    let title = title_bar_rect(geometry);
    let mut right = title.right();
    let mut buttons = Vec::new();
    for (action, present) in [
        (HeaderAction::Close, caps.closable),
        (HeaderAction::Maximize, caps.maximizable),
        (HeaderAction::Minimize, caps.minimizable),
    ] {
        if !present {
            continue;
        }
        right -= i32::from(BUTTON_WIDTH);
        if right < title.x {
            break;
        }
        buttons.push((action, FloatRect::new(right, title.y, BUTTON_WIDTH, 1)));
    }
    buttons
}

/// What a press at `(x, y)` on the title bar means, if it lands there.
pub fn header_action(
    geometry: FloatRect,
    caps: Capabilities,
    x: i32,
    y: i32,
) -> Option<HeaderAction> {
    if !title_bar_rect(geometry).contains(x, y) {
        return None;
    }
    let action = header_buttons(geometry, caps)
        .into_iter()
        .find(|(_, rect)| rect.contains(x, y))
        .map(|(action, _)| action)
        .unwrap_or(HeaderAction::Drag);
    Some(action)
}

/// Everything a decorator needs to paint one window frame.
#[derive(Debug, Clone, Copy)]
pub struct WindowFrame<'a> {
    pub geometry: FloatRect,
    pub title: &'a str,
    pub icon: Option<&'a str>,
    pub focused: bool,
    pub maximized: bool,
    pub capabilities: Capabilities,
}

pub trait WindowDecorator: std::fmt::Debug {
    fn render_window(&self, frame: &mut UiFrame<'_>, window: &WindowFrame<'_>);

    /// Paint just a title bar at `rect`, used while a transition is running.
    fn render_title_bar(&self, frame: &mut UiFrame<'_>, rect: FloatRect, title: &str, focused: bool);
}

#[derive(Debug, Default)]
pub struct ClassicDecorator;

impl ClassicDecorator {
    fn header_style(focused: bool) -> Style {
        if focused {
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().bg(Color::DarkGray).fg(Color::White)
        }
    }
}

impl WindowDecorator for ClassicDecorator {
    fn render_window(&self, frame: &mut UiFrame<'_>, window: &WindowFrame<'_>) {
        let g = window.geometry;
        if g.is_empty() {
            return;
        }
        let border_style = Style::default().fg(Color::DarkGray).bg(Color::Reset);
        let left = g.x;
        let right = g.right() - 1;
        let top = g.y;
        let bottom = g.bottom() - 1;

        frame.fill_signed(g, " ", Style::default());
        for x in left..=right {
            let (top_symbol, bottom_symbol) = if x == left {
                ("┌", "└")
            } else if x == right {
                ("┐", "┘")
            } else {
                ("─", "─")
            };
            frame.put_signed(x, top, top_symbol, border_style);
            frame.put_signed(x, bottom, bottom_symbol, border_style);
        }
        for y in top + 1..bottom {
            frame.put_signed(left, y, "│", border_style);
            frame.put_signed(right, y, "│", border_style);
        }

        let title = match window.icon {
            Some(icon) => format!("{icon} {}", window.title),
            None => window.title.to_string(),
        };
        self.render_title_bar(frame, title_bar_rect(g), &title, window.focused);

        let style = Self::header_style(window.focused);
        for (action, rect) in header_buttons(g, window.capabilities) {
            let label = match action {
                HeaderAction::Minimize => " _ ",
                HeaderAction::Maximize if window.maximized => " ❐ ",
                HeaderAction::Maximize => " □ ",
                HeaderAction::Close => " x ",
                HeaderAction::Drag => continue,
            };
            frame.set_string_signed(rect.x, rect.y, label, style, rect.width);
        }
    }

    fn render_title_bar(&self, frame: &mut UiFrame<'_>, rect: FloatRect, title: &str, focused: bool) {
        if rect.is_empty() {
            return;
        }
        let style = Self::header_style(focused);
        frame.fill_signed(rect, " ", style);
        let title_len = title.chars().count() as i32;
        let width = i32::from(rect.width);
        let start = if title_len <= width {
            rect.x + (width - title_len) / 2
        } else {
            rect.x
        };
        frame.set_string_signed(start, rect.y, title, style, rect.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_line_up_from_the_right() {
        let g = FloatRect::new(0, 0, 20, 6);
        let buttons = header_buttons(g, Capabilities::default());
        assert_eq!(buttons[0], (HeaderAction::Close, FloatRect::new(16, 1, 3, 1)));
        assert_eq!(buttons[1].0, HeaderAction::Maximize);
        assert_eq!(buttons[2], (HeaderAction::Minimize, FloatRect::new(10, 1, 3, 1)));
    }

    #[test]
    fn tool_windows_only_get_a_close_button() {
        let caps = Capabilities {
            minimizable: false,
            maximizable: false,
            ..Capabilities::default()
        };
        let g = FloatRect::new(0, 0, 20, 6);
        assert_eq!(header_action(g, caps, 17, 1), Some(HeaderAction::Close));
        assert_eq!(header_action(g, caps, 11, 1), Some(HeaderAction::Drag));
        assert_eq!(header_action(g, caps, 11, 3), None);
    }
}
