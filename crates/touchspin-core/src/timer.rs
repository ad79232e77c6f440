//! Cancellable scheduled tasks.
//!
//! Entries carry the field and what to do (`TimerKind`), never a closure, so a
//! cancelled or superseded timer cannot act on stale state: the owner compares
//! the fired id against the handle it still holds.

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;
use web_time::Instant;

use crate::engine::FieldId;

new_key_type! {
    pub struct TimerId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    /// Single shot between the first immediate step and auto-repeat.
    Lead,
    Repeat,
    /// Debounced end of a press session.
    Finalize,
}

#[derive(Clone, Copy, Debug)]
pub struct Due {
    pub id: TimerId,
    pub field: FieldId,
    pub kind: TimerKind,
    /// Scheduled time, not the time the queue was polled.
    pub at: Instant,
}

struct Entry {
    field: FieldId,
    kind: TimerKind,
    at: Instant,
    seq: u64,
}

#[derive(Default)]
pub struct TimerQueue {
    entries: SlotMap<TimerId, Entry>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, field: FieldId, kind: TimerKind, at: Instant) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let id = self.entries.insert(Entry {
            field,
            kind,
            at,
            seq,
        });
        log::trace!("timer {:?} {:?} scheduled for {:?}", id, kind, field);
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Cancels the timer held in `slot` (if any) and clears the handle.
    pub fn cancel_slot(&mut self, slot: &mut Option<TimerId>) -> bool {
        match slot.take() {
            Some(id) => self.cancel(id),
            None => false,
        }
    }

    pub fn cancel_field(&mut self, field: FieldId) -> SmallVec<[TimerId; 3]> {
        let ids: SmallVec<[TimerId; 3]> = self
            .entries
            .iter()
            .filter(|(_, e)| e.field == field)
            .map(|(id, _)| id)
            .collect();
        for id in &ids {
            self.entries.remove(*id);
        }
        ids
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.values().map(|e| e.at).min()
    }

    /// Removes and returns the earliest entry due at `now`. Equal deadlines
    /// fire in scheduling order.
    pub fn pop_due(&mut self, now: Instant) -> Option<Due> {
        let (id, _) = self
            .entries
            .iter()
            .filter(|(_, e)| e.at <= now)
            .min_by_key(|(_, e)| (e.at, e.seq))?;
        let e = self.entries.remove(id)?;
        Some(Due {
            id,
            field: e.field,
            kind: e.kind,
            at: e.at,
        })
    }
}
