use std::time::{Duration, Instant};

use super::FloatRect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Minimize,
    Unminimize,
    Maximize,
    Unmaximize,
}

/// A title-bar rectangle travelling between two measured positions.
///
/// The window's real state only changes when the transition is committed;
/// the rectangles here are purely what gets drawn meanwhile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    kind: TransitionKind,
    from: FloatRect,
    to: FloatRect,
    started: Instant,
    duration: Duration,
}

impl Transition {
    pub fn new(
        kind: TransitionKind,
        from: FloatRect,
        to: FloatRect,
        started: Instant,
        duration: Duration,
    ) -> Self {
        Self {
            kind,
            from,
            to,
            started,
            duration,
        }
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    pub fn from(&self) -> FloatRect {
        self.from
    }

    pub fn to(&self) -> FloatRect {
        self.to
    }

    pub fn ends_at(&self) -> Instant {
        self.started + self.duration
    }

    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn is_done(&self, now: Instant) -> bool {
        now >= self.ends_at()
    }

    /// Title-bar rectangle to draw at `now`.
    pub fn frame(&self, now: Instant) -> FloatRect {
        self.from.lerp(self.to, self.progress(now))
    }
}
