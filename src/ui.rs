//! UiFrame: a thin wrapper around a ratatui buffer that clamps drawing to
//! the visible area.
//!
//! Window and popup geometry is signed: a window dragged past the left edge
//! has a negative origin. Every `*_signed` helper takes desktop coordinates
//! and silently drops whatever falls outside the frame, so decorators and
//! the desktop renderer never bounds-check by hand.
use crate::window::FloatRect;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

pub struct UiFrame<'a> {
    area: Rect,
    buffer: &'a mut Buffer,
}

impl<'a> UiFrame<'a> {
    pub fn new(frame: &'a mut Frame<'_>) -> Self {
        let area = frame.area();
        let buffer = frame.buffer_mut();
        Self { area, buffer }
    }

    /// Construct a `UiFrame` directly from an area and buffer, for offscreen
    /// rendering and tests.
    pub fn from_parts(area: Rect, buffer: &'a mut Buffer) -> Self {
        Self { area, buffer }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        self.buffer
    }

    fn clip_rect(&self, rect: Rect) -> Option<Rect> {
        let clipped = rect.intersection(self.area);
        if clipped.width == 0 || clipped.height == 0 {
            None
        } else {
            Some(clipped)
        }
    }

    pub fn render_widget<W>(&mut self, widget: W, area: Rect)
    where
        W: Widget,
    {
        if let Some(clipped) = self.clip_rect(area) {
            widget.render(clipped, self.buffer);
        }
    }

    fn cell_in_frame(&self, x: i32, y: i32) -> Option<(u16, u16)> {
        let x0 = i32::from(self.area.x);
        let y0 = i32::from(self.area.y);
        let x1 = x0 + i32::from(self.area.width);
        let y1 = y0 + i32::from(self.area.height);
        if x < x0 || x >= x1 || y < y0 || y >= y1 {
            return None;
        }
        Some((x as u16, y as u16))
    }

    /// Fill the visible part of `rect` with `symbol`.
    pub fn fill_signed(&mut self, rect: FloatRect, symbol: &str, style: Style) {
        let visible = rect.visible_in(self.area);
        for y in visible.y..visible.y.saturating_add(visible.height) {
            for x in visible.x..visible.x.saturating_add(visible.width) {
                if let Some(cell) = self.buffer.cell_mut((x, y)) {
                    cell.set_symbol(symbol).set_style(style);
                }
            }
        }
    }

    /// Set a single cell.
    pub fn put_signed(&mut self, x: i32, y: i32, symbol: &str, style: Style) {
        if let Some(pos) = self.cell_in_frame(x, y)
            && let Some(cell) = self.buffer.cell_mut(pos)
        {
            cell.set_symbol(symbol).set_style(style);
        }
    }

    /// Write `text` starting at `(x, y)`, at most `max_width` columns wide.
    /// Characters left of the frame are skipped one by one, so a string
    /// starting off-screen still shows its visible tail.
    pub fn set_string_signed(&mut self, x: i32, y: i32, text: &str, style: Style, max_width: u16) {
        let mut column = x;
        let limit = x + i32::from(max_width);
        for ch in text.chars() {
            let mut buf = [0u8; 4];
            let symbol: &str = ch.encode_utf8(&mut buf);
            let width = column_width(symbol) as i32;
            if width == 0 {
                continue;
            }
            if column + width > limit {
                break;
            }
            self.put_signed(column, y, symbol, style);
            column += width;
        }
    }

    /// Write a styled line (for example an access-key label with its
    /// underlined key) starting at `(x, y)`.
    pub fn set_line_signed(&mut self, x: i32, y: i32, line: &Line<'_>, max_width: u16) {
        let mut column = x;
        let limit = x + i32::from(max_width);
        for span in &line.spans {
            let remaining = limit - column;
            if remaining <= 0 {
                break;
            }
            let style = line.style.patch(span.style);
            self.set_string_signed(column, y, &span.content, style, remaining as u16);
            column += span.width() as i32;
        }
    }
}

fn column_width(text: &str) -> usize {
    Span::raw(text).width()
}

pub(crate) fn truncate_to_width(value: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in value.chars() {
        let mut buf = [0u8; 4];
        let w = column_width(ch.encode_utf8(&mut buf));
        if used + w > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}
