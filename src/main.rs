use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{Event, MouseButton, MouseEventKind};
use indoc::indoc;
use ratatui::layout::{Rect, Size};
use ratatui::style::{Color, Style};
use tracing::{Level, info};

use desk_wm::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use desk_wm::drivers::{InputDriver, OutputDriver};
use desk_wm::event_loop::{ControlFlow, EventLoop};
use desk_wm::keybindings::Action;
use desk_wm::menu::{CommandItem, MenuItem, MenuNotice, RadioGroup, RadioOption, TopLevelMenu};
use desk_wm::render::DesktopRenderer;
use desk_wm::tracing_sub::{self, LogTarget, SubscriberMakeWriter};
use desk_wm::window::{FloatRect, IconSet, IconSize, WindowEvent, WindowManager, WindowOptions};
use desk_wm::{EngineConfig, LayoutDirection};

const AFTER_HELP: &str = indoc! {"
    Keys:
      Alt+letter / F10   open or focus the menu bar
      Alt+Tab            cycle windows
      Alt+F9 / Alt+F10   minimize / maximize
      Alt+F4             close the focused window
      Ctrl+Q             quit
    Right-click the desktop for a context menu.
"};

#[derive(Debug, Parser)]
#[command(name = "desk-wm", about = "Simulated desktop with windows and menus", after_help = AFTER_HELP)]
struct Cli {
    /// Lay out menus and submenus right to left.
    #[arg(long)]
    rtl: bool,
    /// Apply minimize and maximize instantly.
    #[arg(long)]
    no_animations: bool,
    /// Keep hovered submenus open when the pointer leaves them.
    #[arg(long)]
    keep_menus_open: bool,
    /// Append debug logs to this file.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[derive(Debug)]
struct DemoState {
    status: String,
    word_wrap: bool,
    zoom: String,
    quit: bool,
}

type Shared = Rc<RefCell<DemoState>>;

fn say(state: &Shared, text: &'static str) -> impl Fn() + 'static {
    let state = state.clone();
    move || state.borrow_mut().status = text.to_string()
}

fn notepad_menus(state: &Shared) -> Vec<TopLevelMenu> {
    let quit = {
        let state = state.clone();
        move || state.borrow_mut().quit = true
    };
    let wrap_check = {
        let state = state.clone();
        move || state.borrow().word_wrap
    };
    let wrap_toggle = {
        let state = state.clone();
        move || {
            let mut s = state.borrow_mut();
            s.word_wrap = !s.word_wrap;
        }
    };
    let zoom_get = {
        let state = state.clone();
        move || state.borrow().zoom.clone()
    };
    let zoom_set = {
        let state = state.clone();
        move |value: &str| state.borrow_mut().zoom = value.to_string()
    };
    vec![
        TopLevelMenu::new(
            "&File",
            vec![
                CommandItem::new("&New", say(state, "New document"))
                    .shortcut("Ctrl+N")
                    .into(),
                CommandItem::new("&Open...", say(state, "Open requested"))
                    .shortcut("Ctrl+O")
                    .description("Open an existing document")
                    .into(),
                MenuItem::submenu(
                    "&Recent",
                    vec![
                        MenuItem::command("&1 notes.txt", say(state, "Opened notes.txt")),
                        MenuItem::command("&2 todo.txt", say(state, "Opened todo.txt")),
                    ],
                ),
                MenuItem::divider(),
                MenuItem::command("E&xit", quit),
            ],
        ),
        TopLevelMenu::new(
            "&Edit",
            vec![
                CommandItem::new("Cu&t", say(state, "Cut"))
                    .shortcut("Ctrl+X")
                    .into(),
                CommandItem::new("&Copy", say(state, "Copied"))
                    .shortcut("Ctrl+C")
                    .into(),
                CommandItem::new("&Paste", say(state, "Pasted"))
                    .shortcut("Ctrl+V")
                    .enabled(false)
                    .into(),
            ],
        ),
        TopLevelMenu::new(
            "&View",
            vec![
                MenuItem::checkbox("&Word Wrap", wrap_check, wrap_toggle),
                MenuItem::divider(),
                MenuItem::Radio(RadioGroup::new(
                    vec![
                        RadioOption::new("&Small", "small"),
                        RadioOption::new("&Normal", "normal"),
                        RadioOption::new("&Large", "large"),
                    ],
                    zoom_get,
                    zoom_set,
                )),
            ],
        ),
        TopLevelMenu::new(
            "&Help",
            vec![MenuItem::command("&About", say(state, "desk-wm demo"))],
        ),
    ]
}

fn desktop_menu(state: &Shared) -> Vec<MenuItem> {
    vec![
        MenuItem::command("&Refresh", say(state, "Desktop refreshed")),
        MenuItem::submenu(
            "&Arrange",
            vec![
                MenuItem::command("By &Name", say(state, "Arranged by name")),
                MenuItem::command("By &Date", say(state, "Arranged by date")),
            ],
        ),
        MenuItem::divider(),
        MenuItem::command("&Properties", say(state, "No properties yet")),
    ]
}

fn open_demo_windows(wm: &mut WindowManager, state: &Shared, viewport: Size) -> io::Result<()> {
    let taskbar_slot = FloatRect::new(0, i32::from(viewport.height.saturating_sub(1)), 12, 1);
    let paint = wm
        .open(
            WindowOptions::new("Paint")
                .outer_size(36, 12)
                .at(4, 2)
                .icons(IconSet::new().with(IconSize::Px(1), "🎨"))
                .minimize_target(taskbar_slot),
        )
        .map_err(io::Error::other)?;
    wm.open(
        WindowOptions::new("Colors")
            .outer_size(16, 6)
            .at(24, 9)
            .parent(paint)
            .tool_window(),
    )
    .map_err(io::Error::other)?;
    wm.open(
        WindowOptions::new("Notepad")
            .inner_size(40, 8)
            .at(30, 5)
            .menu_bar(notepad_menus(state))
            .minimize_target(taskbar_slot),
    )
    .map_err(io::Error::other)?;
    Ok(())
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let writer = match &cli.log_file {
        Some(path) => SubscriberMakeWriter::to_file(path)?,
        None => SubscriberMakeWriter::new(LogTarget::Discard),
    };
    tracing_sub::init_default(writer, Level::DEBUG);

    let (width, height) = crossterm::terminal::size()?;
    let viewport = Size::new(width, height);
    let mut config = EngineConfig::default()
        .with_viewport(viewport)
        .with_debug_keep_menus_open(cli.keep_menus_open);
    if cli.rtl {
        config = config.with_direction(LayoutDirection::Rtl);
    }
    if cli.no_animations {
        config = config.with_transition_duration(Duration::ZERO);
    }

    let mut wm = WindowManager::new(config);
    let ready = format!(
        "Ready. {} quits",
        wm.keybindings().combos_for(Action::Quit).join(" / ")
    );
    let state: Shared = Rc::new(RefCell::new(DemoState {
        status: ready.clone(),
        word_wrap: false,
        zoom: "normal".to_string(),
        quit: false,
    }));

    set_viewport(&mut wm, viewport);
    open_demo_windows(&mut wm, &state, viewport)?;

    let mut output = ConsoleOutputDriver::new()?;
    output.enter()?;
    let mut input = ConsoleInputDriver::new();
    input.set_mouse_capture(true)?;
    info!(width, height, "desktop started");

    let renderer = DesktopRenderer::default();
    let mut event_loop = EventLoop::new(input, Duration::from_millis(50));
    let result = event_loop.run(|lp, event| {
        match event {
            Some(event) => {
                let quit = matches!(&event, Event::Key(key) if wm.keybindings().matches(Action::Quit, key));
                if quit {
                    return Ok(ControlFlow::Quit);
                }
                if let Event::Resize(w, h) = event {
                    set_viewport(&mut wm, Size::new(w, h));
                } else if !wm.handle_event(&event)
                    && let Event::Mouse(mouse) = event
                    && mouse.kind == MouseEventKind::Down(MouseButton::Right)
                    && wm.window_at(i32::from(mouse.column), i32::from(mouse.row)).is_none()
                {
                    wm.open_context_menu(
                        &desktop_menu(&state),
                        i32::from(mouse.column),
                        i32::from(mouse.row),
                    );
                }
            }
            None => {
                wm.tick();
            }
        }
        for notice in wm.take_menu_notices() {
            let mut s = state.borrow_mut();
            match notice {
                MenuNotice::Info(Some(text)) => s.status = text,
                MenuNotice::Info(None) => s.status.clear(),
                MenuNotice::DefaultInfo => s.status = ready.clone(),
            }
        }
        for (id, event) in wm.drain_events() {
            if event == WindowEvent::Closed {
                info!(window = %id, "closed");
            }
        }
        if state.borrow().quit {
            return Ok(ControlFlow::Quit);
        }
        lp.wake_at(wm.next_deadline());
        output.draw(|mut frame| {
            renderer.render(&mut frame, &wm);
            let area = frame.area();
            let status_row = FloatRect::new(
                0,
                i32::from(area.height.saturating_sub(1)),
                area.width,
                1,
            );
            let style = Style::default().bg(Color::Gray).fg(Color::Black);
            frame.fill_signed(status_row, " ", style);
            frame.set_string_signed(1, status_row.y, &state.borrow().status, style, area.width);
        })?;
        Ok(ControlFlow::Continue)
    });

    output.exit()?;
    result
}

/// The bottom row is the status line; windows maximize above it.
fn set_viewport(wm: &mut WindowManager, viewport: Size) {
    wm.set_viewport(viewport);
    wm.set_work_area(Rect::new(
        0,
        0,
        viewport.width,
        viewport.height.saturating_sub(1),
    ));
}
