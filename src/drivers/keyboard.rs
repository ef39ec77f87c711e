//! Raw key event cleanup before events reach the window manager.
//!
//! Shift+Tab becomes BackTab and releases are dropped, except that a lone
//! Alt tap (press then release with nothing in between) is turned into a
//! single Alt press, which the menus read as "toggle the menu bar". Alt
//! press and release only arrive when the terminal reports event types.
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode};

#[derive(Debug, Default)]
pub struct KeyboardNormalizer {
    esc_down: bool,
    alt_armed: bool,
}

fn is_alt(code: KeyCode) -> bool {
    matches!(
        code,
        KeyCode::Modifier(ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt)
    )
}

impl KeyboardNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize(&mut self, evt: Event) -> Option<Event> {
        let Event::Key(mut key) = evt else {
            self.alt_armed = false;
            return Some(evt);
        };
        if key.code == KeyCode::Tab && key.modifiers.contains(KeyModifiers::SHIFT) {
            key.code = KeyCode::BackTab;
            key.modifiers.remove(KeyModifiers::SHIFT);
        }
        if is_alt(key.code) {
            match key.kind {
                KeyEventKind::Press => self.alt_armed = true,
                KeyEventKind::Release if self.alt_armed => {
                    self.alt_armed = false;
                    return Some(Event::Key(KeyEvent::new(
                        KeyCode::Modifier(ModifierKeyCode::LeftAlt),
                        KeyModifiers::ALT,
                    )));
                }
                _ => {}
            }
            return None;
        }
        match key.kind {
            KeyEventKind::Release => {
                if key.code == KeyCode::Esc {
                    self.esc_down = false;
                }
                return None;
            }
            KeyEventKind::Repeat if cfg!(windows) => return None,
            _ => {}
        }
        self.alt_armed = false;
        if cfg!(windows) && key.code == KeyCode::Esc {
            if self.esc_down {
                return None;
            }
            self.esc_down = true;
        } else {
            self.esc_down = false;
        }
        Some(Event::Key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, kind: KeyEventKind) -> Event {
        let mut key = KeyEvent::new(code, KeyModifiers::NONE);
        key.kind = kind;
        Event::Key(key)
    }

    #[test]
    fn tab_with_shift_becomes_backtab() {
        let mut norm = KeyboardNormalizer::new();
        let evt = Event::Key(KeyEvent::new(KeyCode::Tab, KeyModifiers::SHIFT));
        let Some(Event::Key(k)) = norm.normalize(evt) else {
            panic!("expected key event");
        };
        assert_eq!(k.code, KeyCode::BackTab);
        assert!(!k.modifiers.contains(KeyModifiers::SHIFT));
    }

    #[test]
    fn release_key_is_ignored() {
        let mut norm = KeyboardNormalizer::new();
        assert!(
            norm.normalize(key(KeyCode::Char('a'), KeyEventKind::Release))
                .is_none()
        );
    }

    #[test]
    fn lone_alt_tap_becomes_one_press() {
        let alt = KeyCode::Modifier(ModifierKeyCode::LeftAlt);
        let mut norm = KeyboardNormalizer::new();
        assert!(norm.normalize(key(alt, KeyEventKind::Press)).is_none());
        let Some(Event::Key(k)) = norm.normalize(key(alt, KeyEventKind::Release)) else {
            panic!("expected synthesized alt press");
        };
        assert_eq!(k.code, alt);
        assert_eq!(k.kind, KeyEventKind::Press);
    }

    #[test]
    fn alt_chord_does_not_toggle() {
        let alt = KeyCode::Modifier(ModifierKeyCode::LeftAlt);
        let mut norm = KeyboardNormalizer::new();
        norm.normalize(key(alt, KeyEventKind::Press));
        assert!(
            norm.normalize(key(KeyCode::Char('f'), KeyEventKind::Press))
                .is_some()
        );
        assert!(norm.normalize(key(alt, KeyEventKind::Release)).is_none());
    }

    #[test]
    fn non_key_events_pass_through() {
        let mut norm = KeyboardNormalizer::new();
        assert!(norm.normalize(Event::Resize(10, 20)).is_some());
    }
}
