//! Press-and-hold repetition.
//!
//! `Idle → LeadWait` on `begin` (the caller applies the immediate step),
//! `LeadWait → Repeating` when the lead timer fires, and every tick after that
//! shrinks the interval by `decay` down to `floor_speed`. `end` cancels both
//! timer lines.

use web_time::{Duration, Instant};

use crate::config::SpinTiming;
use crate::engine::FieldId;
use crate::input::Direction;
use crate::timer::{Due, TimerId, TimerKind, TimerQueue};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AccelPhase {
    #[default]
    Idle,
    LeadWait,
    Repeating,
}

#[derive(Debug, Default)]
pub struct AccelerationController {
    phase: AccelPhase,
    direction: Option<Direction>,
    speed: Duration,
    lead: Option<TimerId>,
    repeat: Option<TimerId>,
}

impl AccelerationController {
    pub fn phase(&self) -> AccelPhase {
        self.phase
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Current inter-step delay.
    pub fn speed(&self) -> Duration {
        self.speed
    }

    pub fn is_active(&self) -> bool {
        self.phase != AccelPhase::Idle
    }

    /// Arms the lead timer. Returns `false` without touching anything when a
    /// repetition is already running.
    pub fn begin(
        &mut self,
        field: FieldId,
        direction: Direction,
        timing: &SpinTiming,
        timers: &mut TimerQueue,
        now: Instant,
    ) -> bool {
        if self.is_active() {
            log::trace!("{:?}: begin ignored, already {:?}", field, self.phase);
            return false;
        }
        self.direction = Some(direction);
        self.speed = timing.start_speed;
        self.lead = Some(timers.schedule(field, TimerKind::Lead, now + timing.lead_delay));
        self.phase = AccelPhase::LeadWait;
        true
    }

    /// Handles a fired lead or repeat timer and schedules the next tick.
    /// Returns the direction to step in, or `None` for a timer this controller
    /// no longer owns.
    pub fn on_timer(
        &mut self,
        fired: &Due,
        timing: &SpinTiming,
        timers: &mut TimerQueue,
    ) -> Option<Direction> {
        match (self.phase, fired.kind) {
            (AccelPhase::LeadWait, TimerKind::Lead) if self.lead == Some(fired.id) => {
                self.lead = None;
                self.phase = AccelPhase::Repeating;
            }
            (AccelPhase::Repeating, TimerKind::Repeat) if self.repeat == Some(fired.id) => {
                self.repeat = None;
            }
            _ => return None,
        }
        self.speed = next_speed(self.speed, timing);
        self.repeat = Some(timers.schedule(fired.field, TimerKind::Repeat, fired.at + self.speed));
        self.direction
    }

    /// Stops repetition. Returns whether anything was running.
    pub fn end(&mut self, timers: &mut TimerQueue) -> bool {
        let was_active = self.is_active();
        timers.cancel_slot(&mut self.lead);
        timers.cancel_slot(&mut self.repeat);
        self.phase = AccelPhase::Idle;
        self.direction = None;
        was_active
    }
}

pub fn next_speed(current: Duration, timing: &SpinTiming) -> Duration {
    current.mul_f64(timing.decay).max(timing.floor_speed)
}
