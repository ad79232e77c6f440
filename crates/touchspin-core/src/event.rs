use crate::engine::FieldId;
use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq)]
pub enum SpinEvent {
    /// Field attached; carries the validated initial value.
    Init { value: f64 },
    /// A session opened; carries the value it started from.
    Start { value: f64 },
    /// A session closed.
    Stop { value: f64, diff: f64 },
    /// Configuration problems found at attach time.
    Error(Vec<ConfigError>),
}

pub type SubId = usize;

#[derive(Default)]
pub(crate) struct Listeners {
    subs: Vec<(SubId, Box<dyn Fn(FieldId, &SpinEvent)>)>,
    next: SubId,
}

impl Listeners {
    pub(crate) fn subscribe(&mut self, f: impl Fn(FieldId, &SpinEvent) + 'static) -> SubId {
        let id = self.next;
        self.next += 1;
        self.subs.push((id, Box::new(f)));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubId) -> bool {
        let before = self.subs.len();
        self.subs.retain(|(s, _)| *s != id);
        self.subs.len() != before
    }

    pub(crate) fn emit(&self, field: FieldId, event: &SpinEvent) {
        for (_, f) in &self.subs {
            f(field, event);
        }
    }
}
