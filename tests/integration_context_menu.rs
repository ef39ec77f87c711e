use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use desk_wm::menu::{CommandItem, MenuItem, RadioGroup, RadioOption};
use desk_wm::scheduler::ManualClock;
use desk_wm::{EngineConfig, LayoutDirection, WindowManager};

fn wm_with(config: EngineConfig) -> WindowManager {
    WindowManager::with_clock(config, Rc::new(ManualClock::new()))
}

fn click(wm: &mut WindowManager, x: i32, y: i32) {
    for kind in [
        MouseEventKind::Moved,
        MouseEventKind::Down(MouseButton::Left),
        MouseEventKind::Up(MouseButton::Left),
    ] {
        wm.handle_event(&Event::Mouse(MouseEvent {
            kind,
            column: x as u16,
            row: y as u16,
            modifiers: KeyModifiers::NONE,
        }));
    }
}

#[test]
fn checkbox_toggles_and_menu_stays_open() {
    let mut wm = wm_with(EngineConfig::default());
    let checked = Rc::new(Cell::new(false));
    let (c1, c2) = (checked.clone(), checked.clone());
    let root = wm.open_context_menu(
        &[MenuItem::checkbox(
            "&Status Bar",
            move || c1.get(),
            move || c2.set(!c2.get()),
        )],
        10,
        5,
    );
    let row = wm.menus().popup(root).unwrap().row_rect(0).unwrap();
    click(&mut wm, row.x + 2, row.y);

    assert!(checked.get());
    assert!(wm.menus().is_open());
    let display = wm.menus().popup(root).unwrap().row(0).unwrap().display();
    assert_eq!(display.checked, Some(true));
}

#[test]
fn radio_selection_closes_the_menu() {
    let mut wm = wm_with(EngineConfig::default());
    let value = Rc::new(RefCell::new("b".to_string()));
    let (get, set) = (value.clone(), value.clone());
    let root = wm.open_context_menu(
        &[MenuItem::Radio(RadioGroup::new(
            vec![
                RadioOption::new("&Alpha", "a"),
                RadioOption::new("&Beta", "b"),
            ],
            move || get.borrow().clone(),
            move |v: &str| *set.borrow_mut() = v.to_string(),
        ))],
        10,
        5,
    );
    let popup = wm.menus().popup(root).unwrap();
    assert_eq!(popup.row(0).unwrap().display().checked, Some(false));
    assert_eq!(popup.row(1).unwrap().display().checked, Some(true));
    let row = popup.row_rect(0).unwrap();

    click(&mut wm, row.x + 2, row.y);
    assert_eq!(*value.borrow(), "a");
    assert!(!wm.menus().is_open());
    assert!(wm.menus().popup(root).is_none());
}

#[test]
fn disabled_rows_ignore_activation() {
    let mut wm = wm_with(EngineConfig::default());
    let ran = Rc::new(Cell::new(false));
    let flag = ran.clone();
    let root = wm.open_context_menu(
        &[MenuItem::from(
            CommandItem::new("&Paste", move || flag.set(true)).enabled(false),
        )],
        10,
        5,
    );
    let row = wm.menus().popup(root).unwrap().row_rect(0).unwrap();
    click(&mut wm, row.x + 2, row.y);
    assert!(!ran.get());
    assert!(wm.menus().is_open());
}

#[test]
fn popups_stay_inside_the_viewport_near_edges() {
    let mut wm = wm_with(EngineConfig::default());
    let items = vec![
        MenuItem::command("&Refresh", || {}),
        MenuItem::submenu("&Arrange", vec![MenuItem::command("By &Name", || {})]),
        MenuItem::command("&Properties", || {}),
    ];
    let root = wm.open_context_menu(&items, 78, 22);
    let rect = wm.menus().popup(root).unwrap().rect();
    assert!(rect.right() <= 80);
    assert!(rect.bottom() <= 24);
    assert!(rect.x < 78);

    wm.menus_mut().open_submenu(root, 1, true).unwrap();
    let (child, _) = wm.menus().popup(root).unwrap().row(1).unwrap().submenu().unwrap();
    let child_rect = wm.menus().popup(child).unwrap().rect();
    // no room on the right, so the submenu flips to the left of its row
    assert_eq!(child_rect.right(), rect.x);
    assert!(child_rect.bottom() <= 24);
}

#[test]
fn rtl_submenus_open_to_the_left() {
    let mut wm = wm_with(EngineConfig::default().with_direction(LayoutDirection::Rtl));
    let items = vec![MenuItem::submenu(
        "&More",
        vec![MenuItem::command("&One", || {})],
    )];
    let root = wm.open_context_menu(&items, 40, 5);
    wm.menus_mut().open_submenu(root, 0, true).unwrap();
    let rect = wm.menus().popup(root).unwrap().rect();
    let (child, _) = wm.menus().popup(root).unwrap().row(0).unwrap().submenu().unwrap();
    assert_eq!(wm.menus().popup(child).unwrap().rect().right(), rect.x);

    // in RTL, Left is the forward arrow and Right goes back
    wm.handle_event(&Event::Key(KeyEvent::new(KeyCode::Right, KeyModifiers::NONE)));
    assert!(!wm.menus().popup(child).unwrap().is_open());
}

#[test]
fn empty_context_menu_shows_a_disabled_placeholder() {
    let mut wm = wm_with(EngineConfig::default());
    let root = wm.open_context_menu(&[], 5, 5);
    let popup = wm.menus().popup(root).unwrap();
    assert_eq!(popup.rows().len(), 1);
    assert!(popup.row(0).unwrap().is_placeholder());
    assert_eq!(popup.row(0).unwrap().text(), "(Empty)");
}

#[test]
fn type_ahead_activates_a_unique_match() {
    let mut wm = wm_with(EngineConfig::default());
    let ran = Rc::new(Cell::new(0));
    let (a, b) = (ran.clone(), ran.clone());
    wm.open_context_menu(
        &[
            MenuItem::command("&Copy", move || a.set(1)),
            MenuItem::command("C&ut", move || b.set(2)),
            MenuItem::command("&Paste", || {}),
        ],
        5,
        5,
    );
    wm.handle_event(&Event::Key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::NONE)));
    assert_eq!(ran.get(), 2);
    assert!(!wm.menus().is_open());
}
