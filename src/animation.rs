//! Time-based handle animations.
//!
//! An [`Animation`] is a plain value: start and end positions, a start instant,
//! a duration and a caller-defined `kind` describing what should happen when it
//! finishes. The owner samples it on every tick with the current time from a
//! [`Clock`]; there are no timers or callbacks, so tests drive animations with
//! a [`ManualClock`].

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::geometry::ScreenPosition;

pub trait Clock {
    fn now(&self) -> Instant;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time, so a test
/// can keep one clone after handing another to a session.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// One sampled frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationFrame {
    pub position: ScreenPosition,
    /// Set on the final frame, whose position is exactly the target.
    pub finished: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Animation<K> {
    from: ScreenPosition,
    to: ScreenPosition,
    started_at: Instant,
    duration: Duration,
    kind: K,
}

impl<K: Copy> Animation<K> {
    pub fn new(
        from: ScreenPosition,
        to: ScreenPosition,
        started_at: Instant,
        duration: Duration,
        kind: K,
    ) -> Self {
        Self {
            from,
            to,
            started_at,
            duration,
            kind,
        }
    }

    pub fn start(&self) -> ScreenPosition {
        self.from
    }

    pub fn target(&self) -> ScreenPosition {
        self.to
    }

    pub fn kind(&self) -> K {
        self.kind
    }

    /// Fraction of the duration elapsed at `now`, in `0.0..=1.0`.
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn sample(&self, now: Instant) -> AnimationFrame {
        let t = self.progress(now);
        AnimationFrame {
            position: self.from.lerp(self.to, t),
            finished: t >= 1.0,
        }
    }
}
