//! Episode-transition gesture handling for the player surface.
//!
//! The UI shell feeds raw touch and wheel input here and drives its slide
//! animation from the resulting state. Everything is clock-explicit: callers
//! pass a monotonic timestamp with each event, so the whole machine is
//! deterministic and unit-testable. Two invariants matter: no navigation
//! fires below the gesture threshold, and no second navigation fires while
//! a transition animation is in flight.

use std::time::Duration;

/// Minimum net touch displacement before a swipe counts.
pub const SWIPE_THRESHOLD_PX: f32 = 50.0;
/// Accumulated wheel distance before a trackpad swipe counts.
pub const WHEEL_THRESHOLD_PX: f32 = 100.0;
/// Wheel accumulation resets after this much input silence.
pub const WHEEL_IDLE_RESET: Duration = Duration::from_millis(300);
/// Slide animation window during which further navigations are rejected.
pub const TRANSITION_DURATION: Duration = Duration::from_millis(450);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Swipe up: move to the next episode.
    Advance,
    /// Swipe down: move to the previous episode.
    Retreat,
}

/// Tracks one touch drag. The decision is made on release from the net
/// vertical displacement.
#[derive(Debug, Default)]
pub struct SwipeTracker {
    start_y: Option<f32>,
    last_y: Option<f32>,
}

impl SwipeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touch_start(&mut self, y: f32) {
        self.start_y = Some(y);
        self.last_y = None;
    }

    pub fn touch_move(&mut self, y: f32) {
        if self.start_y.is_some() {
            self.last_y = Some(y);
        }
    }

    /// End the drag. Returns the requested navigation, if the displacement
    /// cleared the threshold. Releases during an in-flight transition are
    /// swallowed.
    pub fn release(&mut self, in_transition: bool) -> Option<Navigation> {
        let start = self.start_y.take();
        let end = self.last_y.take();
        if in_transition {
            return None;
        }
        let (start, end) = (start?, end?);
        let delta = start - end;
        if delta > SWIPE_THRESHOLD_PX {
            Some(Navigation::Advance)
        } else if delta < -SWIPE_THRESHOLD_PX {
            Some(Navigation::Retreat)
        } else {
            None
        }
    }
}

/// Accumulates trackpad wheel deltas in one direction until they cross the
/// threshold. A direction change or an idle gap restarts accumulation.
#[derive(Debug, Default)]
pub struct WheelAccumulator {
    accumulated: f32,
    direction: Option<Navigation>,
    last_event: Option<Duration>,
}

impl WheelAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one wheel event. `now` is any monotonic timestamp; negative
    /// `delta_y` scrolls up (advance).
    pub fn wheel(&mut self, delta_y: f32, now: Duration, in_transition: bool) -> Option<Navigation> {
        if delta_y == 0.0 {
            return None;
        }
        if in_transition {
            self.reset();
            return None;
        }

        let direction = if delta_y < 0.0 {
            Navigation::Advance
        } else {
            Navigation::Retreat
        };

        let idle = self
            .last_event
            .map(|last| now.saturating_sub(last) > WHEEL_IDLE_RESET)
            .unwrap_or(false);
        if idle || self.direction != Some(direction) {
            self.accumulated = 0.0;
        }

        self.direction = Some(direction);
        self.last_event = Some(now);
        self.accumulated += delta_y.abs();

        if self.accumulated > WHEEL_THRESHOLD_PX {
            self.reset();
            Some(direction)
        } else {
            None
        }
    }

    fn reset(&mut self) {
        self.accumulated = 0.0;
        self.direction = None;
        self.last_event = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransitionState {
    Idle,
    Animating {
        direction: Navigation,
        started_at: Duration,
    },
}

/// Gate that serialises slide animations: one transition at a time, and a
/// new one is only accepted once the previous window has elapsed.
#[derive(Debug)]
pub struct TransitionController {
    state: TransitionState,
}

impl Default for TransitionController {
    fn default() -> Self {
        Self::new()
    }
}

impl TransitionController {
    pub fn new() -> Self {
        Self {
            state: TransitionState::Idle,
        }
    }

    /// Accept a gesture-driven navigation. Returns `false` while a previous
    /// transition is still animating.
    pub fn begin(&mut self, direction: Navigation, now: Duration) -> bool {
        if self.is_animating() {
            return false;
        }
        self.state = TransitionState::Animating {
            direction,
            started_at: now,
        };
        true
    }

    /// Advance the animation clock, returning to idle once the window has
    /// elapsed.
    pub fn tick(&mut self, now: Duration) {
        if let TransitionState::Animating { started_at, .. } = self.state {
            if now.saturating_sub(started_at) >= TRANSITION_DURATION {
                self.state = TransitionState::Idle;
            }
        }
    }

    /// Programmatic episode switches (no gesture) bypass animation.
    pub fn jump(&mut self) {
        self.state = TransitionState::Idle;
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.state, TransitionState::Animating { .. })
    }

    pub fn direction(&self) -> Option<Navigation> {
        match self.state {
            TransitionState::Animating { direction, .. } => Some(direction),
            TransitionState::Idle => None,
        }
    }
}

/// Cursor over the fixed episode list; navigation clamps at both ends.
#[derive(Debug)]
pub struct EpisodeRail {
    len: usize,
    cursor: usize,
}

impl EpisodeRail {
    pub fn new(len: usize) -> Self {
        Self { len, cursor: 0 }
    }

    pub fn current(&self) -> usize {
        self.cursor
    }

    /// Apply a navigation; returns whether the cursor actually moved.
    pub fn navigate(&mut self, navigation: Navigation) -> bool {
        match navigation {
            Navigation::Advance if self.cursor + 1 < self.len => {
                self.cursor += 1;
                true
            }
            Navigation::Retreat if self.cursor > 0 => {
                self.cursor -= 1;
                true
            }
            _ => false,
        }
    }
}
