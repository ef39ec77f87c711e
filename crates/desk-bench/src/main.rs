use std::io;
use std::rc::Rc;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use indoc::formatdoc;
use ratatui::buffer::Buffer;
use ratatui::layout::{Rect, Size};

use desk_wm::menu::{MenuItem, TopLevelMenu};
use desk_wm::render::DesktopRenderer;
use desk_wm::scheduler::ManualClock;
use desk_wm::ui::UiFrame;
use desk_wm::{EngineConfig, WindowManager, WindowOptions};

#[derive(Parser, Debug)]
#[command(
    name = "desk-bench",
    version = env!("CARGO_PKG_VERSION"),
    about = "Drive a headless desktop through scripted input and report throughput"
)]
struct BenchCli {
    /// Number of windows, each with its own menu bar.
    #[arg(short = 'w', long = "windows", default_value_t = 16)]
    windows: usize,

    /// Scripted interaction rounds.
    #[arg(short = 'r', long = "rounds", default_value_t = 2_000)]
    rounds: usize,

    /// Surface size as COLSxROWS.
    #[arg(long = "size", default_value = "120x40", value_parser = parse_size)]
    size: Size,
}

fn parse_size(value: &str) -> Result<Size, String> {
    let (cols, rows) = value
        .split_once('x')
        .ok_or_else(|| format!("expected COLSxROWS, got {value:?}"))?;
    let cols: u16 = cols.parse().map_err(|err| format!("columns: {err}"))?;
    let rows: u16 = rows.parse().map_err(|err| format!("rows: {err}"))?;
    if cols < 20 || rows < 10 {
        return Err("surface must be at least 20x10".to_string());
    }
    Ok(Size::new(cols, rows))
}

#[derive(Debug, Default)]
struct BenchStats {
    events: u64,
    frames: u64,
    menus_opened: u64,
    event_time: Duration,
    render_time: Duration,
}

impl BenchStats {
    fn per_second(count: u64, time: Duration) -> f64 {
        let secs = time.as_secs_f64();
        if secs == 0.0 { 0.0 } else { count as f64 / secs }
    }

    fn report(&self) -> String {
        formatdoc! {"
            events dispatched: {events} ({eps:.0}/s)
            frames rendered:   {frames} ({fps:.0}/s)
            menus opened:      {menus}
        ",
            events = self.events,
            eps = Self::per_second(self.events, self.event_time),
            frames = self.frames,
            fps = Self::per_second(self.frames, self.render_time),
            menus = self.menus_opened,
        }
    }
}

fn sample_menus() -> Vec<TopLevelMenu> {
    let leaf = |label: &str| MenuItem::command(label.to_string(), || {});
    vec![
        TopLevelMenu::new(
            "&File",
            vec![
                leaf("&New"),
                leaf("&Open"),
                MenuItem::submenu("&Recent", vec![leaf("&One"), leaf("&Two"), leaf("T&hree")]),
                MenuItem::divider(),
                leaf("E&xit"),
            ],
        ),
        TopLevelMenu::new("&Edit", vec![leaf("Cu&t"), leaf("&Copy"), leaf("&Paste")]),
        TopLevelMenu::new("&Help", vec![leaf("&About")]),
    ]
}

fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
    Event::Key(KeyEvent::new(code, modifiers))
}

fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
    Event::Mouse(MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

/// One round: open the File menu by access key, walk into the submenu,
/// let its timers run, back out, cycle windows and wiggle the pointer.
fn round_script(size: Size, round: usize) -> Vec<Event> {
    let x = (round * 7 % usize::from(size.width)) as u16;
    let y = (round * 3 % usize::from(size.height)) as u16;
    vec![
        key(KeyCode::Char('f'), KeyModifiers::ALT),
        key(KeyCode::Down, KeyModifiers::NONE),
        key(KeyCode::Down, KeyModifiers::NONE),
        key(KeyCode::Right, KeyModifiers::NONE),
        key(KeyCode::Esc, KeyModifiers::NONE),
        key(KeyCode::Esc, KeyModifiers::NONE),
        key(KeyCode::Tab, KeyModifiers::ALT),
        mouse(MouseEventKind::Moved, x, y),
        mouse(MouseEventKind::Down(MouseButton::Right), x, y),
    ]
}

fn run(cli: &BenchCli) -> BenchStats {
    let clock = ManualClock::new();
    let config = EngineConfig::default().with_viewport(cli.size);
    let mut wm = WindowManager::with_clock(config, Rc::new(clock.clone()));
    wm.set_viewport(cli.size);
    for i in 0..cli.windows {
        let offset = (i % 10) as i32 * 2;
        let opened = wm.open(
            WindowOptions::new(format!("Window {i}"))
                .outer_size(40, 12)
                .at(offset, offset)
                .menu_bar(sample_menus()),
        );
        if let Err(err) = opened {
            eprintln!("window {i} not opened: {err}");
        }
    }

    let renderer = DesktopRenderer::default();
    let area = Rect::new(0, 0, cli.size.width, cli.size.height);
    let mut buffer = Buffer::empty(area);
    let mut stats = BenchStats::default();

    for round in 0..cli.rounds {
        let started = Instant::now();
        for event in round_script(cli.size, round) {
            wm.handle_event(&event);
            if wm.menus().is_open() {
                stats.menus_opened += 1;
            }
            stats.events += 1;
        }
        clock.advance_ms(600);
        wm.tick();
        wm.close_menus();
        stats.event_time += started.elapsed();

        let started = Instant::now();
        buffer.reset();
        let mut frame = UiFrame::from_parts(area, &mut buffer);
        renderer.render(&mut frame, &wm);
        stats.render_time += started.elapsed();
        stats.frames += 1;
    }
    stats
}

fn main() -> io::Result<()> {
    let cli = BenchCli::parse();
    let stats = run(&cli);
    println!("{}", stats.report());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_parser_rejects_garbage() {
        assert_eq!(parse_size("80x24"), Ok(Size::new(80, 24)));
        assert!(parse_size("80").is_err());
        assert!(parse_size("5x5").is_err());
    }

    #[test]
    fn short_run_counts_every_event_and_frame() {
        let cli = BenchCli {
            windows: 2,
            rounds: 3,
            size: Size::new(80, 24),
        };
        let stats = run(&cli);
        assert_eq!(stats.frames, 3);
        assert_eq!(stats.events, 27);
        assert!(stats.menus_opened > 0);
    }
}
