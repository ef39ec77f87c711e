use std::io;
use std::time::{Duration, Instant};

use crossterm::event::Event;

use crate::drivers::InputDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Quit,
}

/// The single loop that owns the UI thread.
///
/// It polls the input driver, hands each event to the handler and calls
/// the handler with `None` between events so timers and transitions can
/// advance. The handler may return a deadline through
/// [`EventLoop::wake_at`]; polling never sleeps past it.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
    wake_at: Option<Instant>,
}

/// How long to block waiting for input: the poll interval, shortened so a
/// pending deadline is not overslept.
pub fn poll_timeout(poll_interval: Duration, deadline: Option<Instant>, now: Instant) -> Duration {
    match deadline {
        Some(deadline) => poll_interval.min(deadline.saturating_duration_since(now)),
        None => poll_interval,
    }
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
            wake_at: None,
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Next instant the idle handler must run by, typically the window
    /// manager's next timer or transition end.
    pub fn wake_at(&mut self, deadline: Option<Instant>) {
        self.wake_at = deadline;
    }

    /// Run until the handler returns [`ControlFlow::Quit`]. The handler
    /// receives `Some(event)` for input and `None` when idle.
    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut Self, Option<Event>) -> io::Result<ControlFlow>,
    {
        loop {
            if handler(self, None)? == ControlFlow::Quit {
                return Ok(());
            }
            let timeout = poll_timeout(self.poll_interval, self.wake_at, Instant::now());
            if !self.driver.poll(timeout)? {
                continue;
            }
            // Drain bursts (drags, scrolling) before the next idle pass.
            loop {
                let event = self.driver.read()?;
                if handler(self, Some(event))? == ControlFlow::Quit {
                    return Ok(());
                }
                if !self.driver.poll(Duration::ZERO)? {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::scripted::ScriptedInput;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn timeout_never_oversleeps_a_deadline() {
        let now = Instant::now();
        let interval = Duration::from_millis(50);
        assert_eq!(poll_timeout(interval, None, now), interval);
        assert_eq!(
            poll_timeout(interval, Some(now + Duration::from_millis(10)), now),
            Duration::from_millis(10)
        );
        assert_eq!(poll_timeout(interval, Some(now), now + interval), Duration::ZERO);
    }

    #[test]
    fn drains_script_and_idles_between_bursts() {
        let key = |c| Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        let input = ScriptedInput::new([key('a'), key('b')]);
        let mut event_loop = EventLoop::new(input, Duration::ZERO);
        let mut seen = Vec::new();
        let mut idles = 0;
        event_loop
            .run(|lp, event| {
                match event {
                    Some(Event::Key(k)) => seen.push(k.code),
                    Some(_) => {}
                    None => {
                        idles += 1;
                        if lp.driver().remaining() == 0 {
                            return Ok(ControlFlow::Quit);
                        }
                    }
                }
                Ok(ControlFlow::Continue)
            })
            .unwrap();
        assert_eq!(seen, vec![KeyCode::Char('a'), KeyCode::Char('b')]);
        assert_eq!(idles, 2);
    }
}
