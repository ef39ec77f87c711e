//! Paints a [`WindowManager`] onto a [`UiFrame`]: windows bottom to top,
//! their menu bars, running title-bar transitions and finally the open
//! menu popups above everything.

use ratatui::style::{Color, Modifier, Style};

use crate::access_keys;
use crate::menu::{MenuBar, MenuEngine, MenuPopup, MenuRow, RowKind};
use crate::ui::{UiFrame, truncate_to_width};
use crate::window::decorator::{ClassicDecorator, WindowDecorator, WindowFrame};
use crate::window::{Window, WindowManager, WindowState};

const ICON_SIZE: u16 = 1;

#[derive(Debug)]
pub struct DesktopRenderer {
    decorator: Box<dyn WindowDecorator>,
    pub desktop_style: Style,
    pub menu_style: Style,
    pub highlight_style: Style,
    pub disabled_style: Style,
}

impl Default for DesktopRenderer {
    fn default() -> Self {
        Self::new(Box::new(ClassicDecorator))
    }
}

impl DesktopRenderer {
    pub fn new(decorator: Box<dyn WindowDecorator>) -> Self {
        Self {
            decorator,
            desktop_style: Style::default().bg(Color::Cyan),
            menu_style: Style::default().bg(Color::Gray).fg(Color::Black),
            highlight_style: Style::default().bg(Color::Blue).fg(Color::White),
            disabled_style: Style::default().bg(Color::Gray).fg(Color::DarkGray),
        }
    }

    pub fn render(&self, frame: &mut UiFrame<'_>, wm: &WindowManager) {
        let area = frame.area();
        frame.fill_signed(area.into(), " ", self.desktop_style);
        for window in wm.windows_in_z_order() {
            if let Some(rect) = wm.transition_frame(window.id()) {
                self.decorator
                    .render_title_bar(frame, rect, window.title(), window.is_focused());
                continue;
            }
            if !window.is_visible() || window.state() == WindowState::Minimized {
                continue;
            }
            self.render_window(frame, wm, window);
        }
        for popup in wm.menus().open_popups() {
            self.render_popup(frame, popup);
        }
    }

    fn render_window(&self, frame: &mut UiFrame<'_>, wm: &WindowManager, window: &Window) {
        let icon = window.icons().at_size(ICON_SIZE);
        self.decorator.render_window(
            frame,
            &WindowFrame {
                geometry: window.geometry(),
                title: window.title(),
                icon,
                focused: window.is_focused(),
                maximized: window.state() == WindowState::Maximized,
                capabilities: window.capabilities(),
            },
        );
        if let Some(bar) = window.menu_bar().and_then(|id| wm.menus().bar(id)) {
            self.render_menu_bar(frame, wm.menus(), bar);
        }
    }

    fn render_menu_bar(&self, frame: &mut UiFrame<'_>, menus: &MenuEngine, bar: &MenuBar) {
        let Some(origin) = bar.origin() else {
            return;
        };
        frame.fill_signed(origin, " ", self.menu_style);
        let show_highlight = bar.is_selecting() || menus.has_keyboard();
        let rects = bar.button_rects(menus.config().direction);
        for (index, (entry, rect)) in bar.entries().iter().zip(rects).enumerate() {
            let style = if show_highlight && bar.highlight() == Some(index) {
                self.highlight_style
            } else {
                self.menu_style
            };
            frame.fill_signed(rect, " ", style);
            let line = access_keys::to_line(&entry.label, style);
            frame.set_line_signed(rect.x + 1, rect.y, &line, rect.width.saturating_sub(1));
        }
    }

    fn render_popup(&self, frame: &mut UiFrame<'_>, popup: &MenuPopup) {
        let rect = popup.rect();
        if rect.is_empty() {
            return;
        }
        frame.fill_signed(rect, " ", self.menu_style);
        let left = rect.x;
        let right = rect.right() - 1;
        let top = rect.y;
        let bottom = rect.bottom() - 1;
        for x in left..=right {
            let (t, b) = if x == left {
                ("┌", "└")
            } else if x == right {
                ("┐", "┘")
            } else {
                ("─", "─")
            };
            frame.put_signed(x, top, t, self.menu_style);
            frame.put_signed(x, bottom, b, self.menu_style);
        }
        for entry in 0..popup.entry_count() {
            let y = top + 1 + entry as i32;
            if popup.is_divider(entry) {
                frame.put_signed(left, y, "├", self.menu_style);
                frame.put_signed(right, y, "┤", self.menu_style);
                for x in left + 1..right {
                    frame.put_signed(x, y, "─", self.menu_style);
                }
                continue;
            }
            frame.put_signed(left, y, "│", self.menu_style);
            frame.put_signed(right, y, "│", self.menu_style);
            if let Some(index) = popup.row_at_entry(entry)
                && let Some(row) = popup.row(index)
            {
                let highlighted = popup.highlight() == Some(index);
                self.render_row(frame, row, left + 1, y, rect.width.saturating_sub(2), highlighted);
            }
        }
    }

    fn render_row(
        &self,
        frame: &mut UiFrame<'_>,
        row: &MenuRow,
        x: i32,
        y: i32,
        width: u16,
        highlighted: bool,
    ) {
        let display = row.display();
        let mut style = if display.disabled {
            self.disabled_style
        } else {
            self.menu_style
        };
        if highlighted {
            style = self.highlight_style;
            if display.disabled {
                style = style.add_modifier(Modifier::DIM);
            }
        }
        frame.set_string_signed(x, y, &" ".repeat(usize::from(width)), style, width);

        let mark = match (row.kind(), display.checked) {
            (RowKind::Radio { .. }, Some(true)) => "•",
            (_, Some(true)) => "✓",
            _ => " ",
        };
        frame.put_signed(x, y, mark, style);

        let arrow = row.submenu().is_some();
        let shortcut = row.shortcut().unwrap_or_default();
        let trailing = if arrow { 2 } else { 0 } + shortcut.chars().count() as u16;
        let label_width = width.saturating_sub(2 + trailing);
        let line = access_keys::to_line(row.label(), style);
        frame.set_line_signed(x + 2, y, &line, label_width);

        let end = x + i32::from(width);
        if arrow {
            frame.put_signed(end - 1, y, "▸", style);
        }
        if !shortcut.is_empty() {
            let shortcut = truncate_to_width(shortcut, usize::from(width.saturating_sub(4)));
            let start = end - if arrow { 2 } else { 1 } - shortcut.chars().count() as i32;
            frame.set_string_signed(start, y, &shortcut, style, width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::menu::{MenuItem, TopLevelMenu};
    use crate::scheduler::ManualClock;
    use crate::window::WindowOptions;
    use ratatui::buffer::Buffer;
    use ratatui::layout::Rect;
    use std::rc::Rc;
    use std::time::Duration;

    fn line(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
            .collect()
    }

    #[test]
    fn draws_window_menu_bar_and_open_dropdown() {
        let mut wm = WindowManager::with_clock(
            EngineConfig::default()
                .with_transition_duration(Duration::ZERO)
                .with_viewport(ratatui::layout::Size::new(30, 12)),
            Rc::new(ManualClock::new()),
        );
        wm.set_viewport(ratatui::layout::Size::new(30, 12));
        let id = wm
            .open(
                WindowOptions::new("Notes")
                    .outer_size(24, 8)
                    .at(0, 0)
                    .menu_bar(vec![TopLevelMenu::new(
                        "&File",
                        vec![
                            MenuItem::command("&Open", || {}),
                            MenuItem::divider(),
                            MenuItem::command("E&xit", || {}),
                        ],
                    )]),
            )
            .unwrap();
        let bar = wm.window(id).unwrap().menu_bar().unwrap();
        wm.menus_mut().bar_access_key(bar, 'f').unwrap();

        let area = Rect::new(0, 0, 30, 12);
        let mut buf = Buffer::empty(area);
        let mut frame = UiFrame::from_parts(area, &mut buf);
        DesktopRenderer::default().render(&mut frame, &wm);

        assert!(line(&buf, 0).starts_with("┌"));
        assert!(line(&buf, 1).contains("Notes"));
        assert!(line(&buf, 2).contains("File"));
        // dropdown sits right below the File button
        assert_eq!(buf.cell((1, 3)).unwrap().symbol(), "┌");
        assert!(line(&buf, 4).contains("Open"));
        assert!(line(&buf, 5).contains("├"));
        assert!(line(&buf, 6).contains("Exit"));
    }

    #[test]
    fn minimized_windows_are_not_drawn() {
        let mut wm = WindowManager::with_clock(
            EngineConfig::default().with_transition_duration(Duration::ZERO),
            Rc::new(ManualClock::new()),
        );
        let id = wm
            .open(WindowOptions::new("Gone").outer_size(20, 6).at(0, 0))
            .unwrap();
        wm.minimize(id).unwrap();
        let area = Rect::new(0, 0, 20, 6);
        let mut buf = Buffer::empty(area);
        let mut frame = UiFrame::from_parts(area, &mut buf);
        DesktopRenderer::default().render(&mut frame, &wm);
        assert!(!line(&buf, 1).contains("Gone"));
    }
}
