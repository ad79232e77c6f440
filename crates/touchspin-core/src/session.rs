use crate::accel::AccelerationController;
use crate::timer::{TimerId, TimerQueue};

/// Where a field is in its start/stop lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Resting,
    InteractionActive,
    /// Released; the stop event fires when the finalize timer does.
    FinalizePending,
}

/// Mutable per-field state. Owned by the engine; created on first interaction.
#[derive(Debug, Default)]
pub struct SessionState {
    pub(crate) accel: AccelerationController,
    pub(crate) started: bool,
    /// A control is physically held down.
    pub(crate) held: bool,
    pub(crate) start_value: Option<f64>,
    /// Step and precision are re-inferred from the text on every keystroke.
    pub(crate) step_unknown: bool,
    pub(crate) finalize: Option<TimerId>,
    /// Set by a commit, cleared by the next focus. Stops Enter + blur from
    /// committing twice.
    pub(crate) commit_processed: bool,
}

impl SessionState {
    pub fn new(step_unknown: bool) -> Self {
        Self {
            step_unknown,
            ..Self::default()
        }
    }

    pub fn accel(&self) -> &AccelerationController {
        &self.accel
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn held(&self) -> bool {
        self.held
    }

    pub fn start_value(&self) -> Option<f64> {
        self.start_value
    }

    pub fn step_unknown(&self) -> bool {
        self.step_unknown
    }

    pub fn finalize_pending(&self) -> bool {
        self.finalize.is_some()
    }

    pub fn phase(&self) -> Phase {
        match (self.started, self.finalize.is_some()) {
            (false, _) => Phase::Resting,
            (true, true) => Phase::FinalizePending,
            (true, false) => Phase::InteractionActive,
        }
    }

    /// Opens a session unless one is open. Returns the recorded start value
    /// when this call opened it.
    pub(crate) fn open(&mut self, current: f64) -> Option<f64> {
        if self.started {
            return None;
        }
        self.started = true;
        self.start_value = Some(current);
        Some(current)
    }

    /// Closes the session and hands back its start value.
    pub(crate) fn close(&mut self) -> Option<f64> {
        self.started = false;
        self.held = false;
        self.start_value.take()
    }

    /// Cancels the repeat chain and any pending finalize.
    pub(crate) fn cancel_timers(&mut self, timers: &mut TimerQueue) {
        self.accel.end(timers);
        timers.cancel_slot(&mut self.finalize);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FieldId;
    use crate::timer::TimerKind;
    use web_time::Instant;

    #[test]
    fn test_open_once_until_closed() {
        let mut s = SessionState::new(false);
        assert_eq!(s.phase(), Phase::Resting);
        assert_eq!(s.open(4.0), Some(4.0));
        assert_eq!(s.open(9.0), None);
        assert_eq!(s.start_value(), Some(4.0));
        assert_eq!(s.phase(), Phase::InteractionActive);

        let mut q = TimerQueue::new();
        s.finalize = Some(q.schedule(FieldId::default(), TimerKind::Finalize, Instant::now()));
        assert_eq!(s.phase(), Phase::FinalizePending);
        s.cancel_timers(&mut q);
        assert!(q.is_empty());
        assert_eq!(s.phase(), Phase::InteractionActive);

        assert_eq!(s.close(), Some(4.0));
        assert_eq!(s.close(), None);
        assert_eq!(s.phase(), Phase::Resting);
    }
}
