use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use desk_wm::render::DesktopRenderer;
use desk_wm::scheduler::ManualClock;
use desk_wm::ui::UiFrame;
use desk_wm::window::{FloatRect, WindowState};
use desk_wm::{EngineConfig, WindowEvent, WindowManager, WindowOptions};

const TASKBAR_SLOT: FloatRect = FloatRect {
    x: 0,
    y: 23,
    width: 12,
    height: 1,
};

fn animated() -> (WindowManager, ManualClock) {
    let clock = ManualClock::new();
    let wm = WindowManager::with_clock(EngineConfig::default(), Rc::new(clock.clone()));
    (wm, clock)
}

fn instant() -> WindowManager {
    WindowManager::with_clock(
        EngineConfig::default().with_transition_duration(Duration::ZERO),
        Rc::new(ManualClock::new()),
    )
}

fn draw(wm: &WindowManager) -> Buffer {
    let area = Rect::new(0, 0, 80, 24);
    let mut buffer = Buffer::empty(area);
    let mut frame = UiFrame::from_parts(area, &mut buffer);
    DesktopRenderer::default().render(&mut frame, wm);
    buffer
}

#[test]
fn minimize_to_the_taskbar_and_back() {
    let (mut wm, clock) = animated();
    let paint = wm
        .open(
            WindowOptions::new("Paint")
                .outer_size(30, 8)
                .at(0, 0)
                .minimize_target(TASKBAR_SLOT),
        )
        .unwrap();
    wm.drain_events();

    wm.minimize(paint).unwrap();
    assert_eq!(wm.drain_events(), vec![(paint, WindowEvent::Minimize)]);
    assert_eq!(wm.window(paint).unwrap().state(), WindowState::Normal);
    assert_eq!(wm.transition_frame(paint), Some(FloatRect::new(1, 1, 28, 1)));
    assert!(wm.next_deadline().is_some());

    // only the moving title bar is painted while the transition runs
    let buffer = draw(&wm);
    assert_eq!(buffer[(0, 0)].symbol(), " ");
    assert_eq!(buffer[(12, 1)].symbol(), "P");

    clock.advance_ms(200);
    assert!(wm.tick());
    let window = wm.window(paint).unwrap();
    assert_eq!(window.state(), WindowState::Minimized);
    assert!(!window.is_visible());
    assert_eq!(wm.focused_window(), None);
    assert_eq!(wm.drain_events(), vec![(paint, WindowEvent::Blur)]);
    assert_eq!(wm.next_deadline(), None);

    wm.focus(paint).unwrap();
    assert_eq!(wm.drain_events(), vec![(paint, WindowEvent::Restore)]);
    assert_eq!(wm.transition_frame(paint), Some(TASKBAR_SLOT));

    clock.advance_ms(200);
    wm.tick();
    assert_eq!(wm.window(paint).unwrap().state(), WindowState::Normal);
    assert_eq!(wm.focused_window(), Some(paint));
    assert_eq!(wm.drain_events(), vec![(paint, WindowEvent::Focus)]);
}

#[test]
fn minimize_then_maximize_round_trip_restores_geometry() {
    let (mut wm, clock) = animated();
    let id = wm
        .open(
            WindowOptions::new("Paint")
                .outer_size(20, 8)
                .at(5, 5)
                .minimize_target(TASKBAR_SLOT),
        )
        .unwrap();
    let original = FloatRect::new(5, 5, 20, 8);
    let settle = |wm: &mut WindowManager| {
        clock.advance_ms(200);
        wm.tick();
    };

    wm.minimize(id).unwrap();
    settle(&mut wm);
    assert_eq!(wm.window(id).unwrap().state(), WindowState::Minimized);

    wm.focus(id).unwrap();
    settle(&mut wm);
    assert_eq!(wm.window(id).unwrap().state(), WindowState::Normal);
    assert_eq!(wm.window(id).unwrap().geometry(), original);

    wm.maximize(id).unwrap();
    settle(&mut wm);
    assert_eq!(wm.window(id).unwrap().state(), WindowState::Maximized);
    assert_eq!(wm.window(id).unwrap().geometry(), FloatRect::new(0, 0, 80, 24));

    wm.restore(id).unwrap();
    settle(&mut wm);
    let window = wm.window(id).unwrap();
    assert_eq!(window.state(), WindowState::Normal);
    assert_eq!(window.geometry(), original);
    assert_eq!(window.saved_geometry(), None);
    assert_eq!(wm.focused_window(), Some(id));
}

#[test]
fn closing_an_owner_takes_its_tool_windows_along() {
    let mut wm = instant();
    let notes = wm.open(WindowOptions::new("Notes").at(40, 2)).unwrap();
    let paint = wm.open(WindowOptions::new("Paint").at(2, 2)).unwrap();
    let colors = wm
        .open(
            WindowOptions::new("Colors")
                .outer_size(16, 6)
                .parent(paint)
                .tool_window(),
        )
        .unwrap();
    wm.drain_events();

    wm.close(paint).unwrap();
    assert!(wm.window(paint).is_none());
    assert!(wm.window(colors).is_none());
    assert_eq!(wm.focused_window(), Some(notes));

    let events = wm.drain_events();
    assert!(events.contains(&(colors, WindowEvent::Closed)));
    assert!(events.contains(&(paint, WindowEvent::Closed)));
    assert_eq!(events.last(), Some(&(notes, WindowEvent::Focus)));

    // handles outlive the window but every operation on them fails
    assert!(wm.focus(paint).is_err());
    assert!(wm.set_title(colors, "Palette").is_err());
}

#[test]
fn keyboard_shortcuts_drive_the_focused_window() {
    let mut wm = instant();
    let a = wm.open(WindowOptions::new("A").outer_size(20, 8).at(2, 2)).unwrap();
    let b = wm.open(WindowOptions::new("B").outer_size(20, 8).at(30, 2)).unwrap();
    wm.drain_events();

    let press = |wm: &mut WindowManager, code: KeyCode| {
        wm.handle_event(&Event::Key(KeyEvent::new(code, KeyModifiers::ALT)))
    };

    assert!(press(&mut wm, KeyCode::F(10)));
    assert_eq!(wm.window(b).unwrap().state(), WindowState::Maximized);
    assert_eq!(wm.window(b).unwrap().geometry(), FloatRect::new(0, 0, 80, 24));
    assert!(press(&mut wm, KeyCode::F(10)));
    assert_eq!(wm.window(b).unwrap().geometry(), FloatRect::new(30, 2, 20, 8));

    assert!(press(&mut wm, KeyCode::F(9)));
    assert_eq!(wm.window(b).unwrap().state(), WindowState::Minimized);
    assert_eq!(wm.focused_window(), None);

    assert!(press(&mut wm, KeyCode::Tab));
    assert_eq!(wm.focused_window(), Some(a));

    assert!(press(&mut wm, KeyCode::F(4)));
    assert!(wm.window(a).is_none());
    assert_eq!(
        wm.drain_events()
            .into_iter()
            .filter(|(_, e)| *e == WindowEvent::Closed)
            .count(),
        1
    );
}

#[test]
fn non_closable_windows_ignore_alt_f4() {
    let mut wm = instant();
    let id = wm.open(WindowOptions::new("Pinned").closable(false)).unwrap();
    wm.handle_event(&Event::Key(KeyEvent::new(KeyCode::F(4), KeyModifiers::ALT)));
    assert!(wm.window(id).is_some());
    // programmatic close is always honoured
    wm.close(id).unwrap();
    assert!(wm.window(id).is_none());
}
