//! # SpinEngine
//!
//! Owns every attached field, its session and its timers. All work happens
//! synchronously inside one call: either an interaction signal or `tick`.
//!
//! The field text is the value. Each operation re-reads it from the adapter,
//! validates it and writes the canonical form back; nothing numeric is cached
//! between calls.

use slotmap::{SlotMap, new_key_type};
use web_time::Instant;

use crate::adapter::{Affix, Control, Glyph, PresentationAdapter};
use crate::clock::{Clock, SystemClock};
use crate::config::{SpinConfig, SpinOptions, StartPolicy, default_template};
use crate::event::{Listeners, SpinEvent, SubId};
use crate::input::{CommitSource, Direction, InteractionSignal};
use crate::session::{Phase, SessionState};
use crate::step::{self, ResolvedStep};
use crate::timer::{Due, TimerKind, TimerQueue};
use crate::validate::{self, Finality, Validated};

new_key_type! {
    pub struct FieldId;
}

/// Upper bound on timers fired by one `tick`, so a host that stalls for a
/// long time cannot spin through an unbounded catch-up.
const MAX_FIRES_PER_TICK: usize = 10_000;

struct Field {
    adapter: Box<dyn PresentationAdapter>,
    config: SpinConfig,
    resolved: ResolvedStep,
    session: Option<SessionState>,
    original_text: String,
    up_enabled: bool,
    down_enabled: bool,
}

impl Field {
    fn session_mut(&mut self) -> &mut SessionState {
        let auto = self.config.step.is_auto();
        self.session.get_or_insert_with(|| SessionState::new(auto))
    }

    fn text(&self) -> String {
        self.adapter.text()
    }

    /// Parsed text; anything unreadable counts as 0.
    fn current(&self) -> f64 {
        validate::parse(&self.text(), Finality::Final).unwrap_or(0.0)
    }

    fn enabled(&self, control: Control) -> bool {
        match control {
            Control::Up => self.up_enabled,
            Control::Down => self.down_enabled,
        }
    }

    fn write(&mut self, v: &Validated) {
        if self.text() != v.display {
            self.adapter.set_text(&v.display);
        }
    }

    fn refresh_controls(&mut self, value: f64) {
        let ResolvedStep { step, decimals } = self.resolved;
        let bounds = self.config.bounds.at_precision(decimals);
        let current = validate::round(value, decimals);

        self.down_enabled = current > bounds.min;
        self.up_enabled = current < bounds.max;
        self.adapter.set_control_enabled(Control::Down, self.down_enabled);
        self.adapter.set_control_enabled(Control::Up, self.up_enabled);

        let glyph = |zero_side: f64| {
            if current == validate::round(zero_side, decimals) {
                Glyph::ZeroClear
            } else {
                Glyph::Normal
            }
        };
        self.adapter.set_control_glyph(Control::Up, glyph(-step));
        self.adapter.set_control_glyph(Control::Down, glyph(step));
    }

    fn show_overlay(&mut self, value: f64) {
        if let Some(f) = &self.config.formatter {
            let display = f.format(value, self.resolved.decimals, &self.config.locale);
            self.adapter.show_formatted_overlay(&display);
        }
    }

    /// Writes `v`, then brings controls and overlay in line with it.
    fn apply(&mut self, v: &Validated) {
        self.write(v);
        self.refresh_controls(v.numeric);
        self.show_overlay(v.numeric);
    }

    fn step(&mut self, direction: Direction) -> f64 {
        let ResolvedStep { step, decimals } = self.resolved;
        let next = validate::canonical(
            self.current() + direction.sign() * step,
            self.config.bounds,
            decimals,
        );
        log::trace!("step {:?} -> {}", direction, next.display);
        self.apply(&next);
        next.numeric
    }

    /// Final validation of whatever the text holds now.
    fn settle(&mut self) -> Validated {
        let v = validate::canonical(self.current(), self.config.bounds, self.resolved.decimals);
        self.apply(&v);
        v
    }
}

fn unknown(id: FieldId) {
    log::debug!("unknown field {:?}", id);
}

pub struct SpinEngine {
    fields: SlotMap<FieldId, Field>,
    timers: TimerQueue,
    listeners: Listeners,
    clock: Box<dyn Clock>,
}

impl Default for SpinEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SpinEngine {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    pub fn with_clock(clock: impl Clock) -> Self {
        Self {
            fields: SlotMap::with_key(),
            timers: TimerQueue::new(),
            listeners: Listeners::default(),
            clock: Box::new(clock),
        }
    }

    /// Registers a listener for events of every field.
    pub fn subscribe(&mut self, f: impl Fn(FieldId, &SpinEvent) + 'static) -> SubId {
        self.listeners.subscribe(f)
    }

    pub fn unsubscribe(&mut self, id: SubId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn emit(&self, id: FieldId, event: SpinEvent) {
        log::debug!("{:?}: {:?}", id, event);
        self.listeners.emit(id, &event);
        let Some(field) = self.fields.get(id) else {
            return;
        };
        let cfg = &field.config;
        match event {
            SpinEvent::Init { value } => {
                if let Some(cb) = &cfg.on_init {
                    cb(value);
                }
            }
            SpinEvent::Start { value } => {
                if let Some(cb) = &cfg.on_start {
                    cb(value);
                }
            }
            SpinEvent::Stop { value, diff } => {
                if let Some(cb) = &cfg.on_stop {
                    cb(value, diff);
                }
            }
            SpinEvent::Error(_) => {}
        }
    }

    /// Takes over `adapter`'s field. The current text is validated and
    /// written back in canonical form; configuration problems are reported
    /// once through [`SpinEvent::Error`] before [`SpinEvent::Init`].
    pub fn attach(
        &mut self,
        adapter: impl PresentationAdapter + 'static,
        options: SpinOptions,
    ) -> FieldId {
        let (config, errors) = options.resolve(&default_template());
        for e in &errors {
            log::warn!("touchspin: {}", e);
        }

        let original_text = adapter.text();
        let resolved = step::resolve(&config.step, &original_text);
        let initial = validate::validate(
            &original_text,
            config.bounds,
            resolved.decimals,
            Finality::Typing,
        )
        .unwrap_or_else(|| validate::canonical(0.0, config.bounds, resolved.decimals));

        let mut field = Field {
            adapter: Box::new(adapter),
            config,
            resolved,
            session: None,
            original_text,
            up_enabled: true,
            down_enabled: true,
        };
        field.adapter.set_affix(Affix::Prefix, field.config.prefix.as_deref());
        field.adapter.set_affix(Affix::Postfix, field.config.postfix.as_deref());
        field.adapter.set_editable(field.config.allow_text_entry);
        field.apply(&initial);

        let id = self.fields.insert(field);
        log::debug!("{:?}: attached with {:?}", id, self.fields[id].config);
        if !errors.is_empty() {
            self.emit(id, SpinEvent::Error(errors));
        }
        self.emit(
            id,
            SpinEvent::Init {
                value: initial.numeric,
            },
        );
        id
    }

    /// Releases the field: cancels its timers, restores the text it had before
    /// `attach` and calls the adapter's `detached` hook. No events follow.
    pub fn detach(&mut self, id: FieldId) -> bool {
        let Some(mut field) = self.fields.remove(id) else {
            unknown(id);
            return false;
        };
        let cancelled = self.timers.cancel_field(id);
        log::debug!("{:?}: detached, {} timer(s) cancelled", id, cancelled.len());

        field.adapter.hide_formatted_overlay();
        field.adapter.set_affix(Affix::Prefix, None);
        field.adapter.set_affix(Affix::Postfix, None);
        field.adapter.set_editable(true);
        field.adapter.set_text(&field.original_text);
        field.adapter.detached();
        true
    }

    pub fn contains(&self, id: FieldId) -> bool {
        self.fields.contains_key(id)
    }

    /// Pointer or touch down on a control: one immediate step, then
    /// acceleration. Ignored while a control is already held.
    pub fn press_start(&mut self, id: FieldId, direction: Direction) -> bool {
        let now = self.clock.now();
        let Some(field) = self.fields.get_mut(id) else {
            unknown(id);
            return false;
        };
        let current = field.current();
        let session = field.session_mut();
        if session.held {
            log::trace!("{:?}: press ignored, already held", id);
            return false;
        }
        session.held = true;
        session.commit_processed = false;
        if self.timers.cancel_slot(&mut session.finalize) {
            log::debug!("{:?}: pending finalize cancelled by press", id);
        }
        let opened = session.open(current);
        field.adapter.set_editable(false);

        if let Some(value) = opened {
            self.emit(id, SpinEvent::Start { value });
        }

        let Some(field) = self.fields.get_mut(id) else {
            return true;
        };
        let control = direction.control();
        if !field.enabled(control) {
            log::debug!("{:?}: {:?} disabled, no step", id, control);
            return true;
        }
        field.step(direction);
        if field.enabled(control) {
            let timing = field.config.timing;
            field
                .session_mut()
                .accel
                .begin(id, direction, &timing, &mut self.timers, now);
        }
        true
    }

    /// Pointer up or leave: stops acceleration and arms the finalize timer.
    pub fn press_end(&mut self, id: FieldId) -> bool {
        let now = self.clock.now();
        let Some(field) = self.fields.get_mut(id) else {
            unknown(id);
            return false;
        };
        let allow_text_entry = field.config.allow_text_entry;
        let finalize_delay = field.config.timing.finalize_delay;
        let Some(session) = field.session.as_mut().filter(|s| s.held) else {
            return false;
        };
        session.held = false;
        session.accel.end(&mut self.timers);
        self.timers.cancel_slot(&mut session.finalize);
        session.finalize = Some(self.timers.schedule(id, TimerKind::Finalize, now + finalize_delay));
        field.adapter.set_editable(allow_text_entry);
        true
    }

    /// Applies a single step in `direction` without opening a session.
    pub fn step_once(&mut self, id: FieldId, direction: Direction) -> Option<f64> {
        let Some(field) = self.fields.get_mut(id) else {
            unknown(id);
            return None;
        };
        Some(field.step(direction))
    }

    pub fn focus(&mut self, id: FieldId) -> bool {
        let Some(field) = self.fields.get_mut(id) else {
            unknown(id);
            return false;
        };
        let current = field.current();
        let allow_text_entry = field.config.allow_text_entry;
        let policy = field.config.start_policy;
        let session = field.session_mut();
        let was_held = session.held;
        session.cancel_timers(&mut self.timers);
        session.held = false;
        session.commit_processed = false;
        let opened = match policy {
            StartPolicy::OnFocusOrPress => session.open(current),
            StartPolicy::OnPressOnly => None,
        };
        if was_held {
            field.adapter.set_editable(allow_text_entry);
        }
        if let Some(value) = opened {
            self.emit(id, SpinEvent::Start { value });
        }
        true
    }

    /// A keystroke changed the text. Re-infers precision for auto steps and
    /// updates control state; the text itself is left alone.
    pub fn text_edited(&mut self, id: FieldId) -> bool {
        let Some(field) = self.fields.get_mut(id) else {
            unknown(id);
            return false;
        };
        if !field.config.allow_text_entry {
            return false;
        }
        let text = field.text();
        if field.session_mut().step_unknown {
            field.resolved = step::resolve(&field.config.step, &text);
        }
        if let Some(value) = validate::parse(&text, Finality::Typing) {
            field.refresh_controls(value);
        }
        true
    }

    /// Enter or blur. Validates, writes the canonical text and closes an open
    /// session. A second commit before the next focus is ignored.
    pub fn commit(&mut self, id: FieldId, source: CommitSource) -> bool {
        let Some(field) = self.fields.get_mut(id) else {
            unknown(id);
            return false;
        };
        let text = field.text();
        let session = field.session_mut();
        if session.commit_processed {
            log::trace!("{:?}: {:?} commit already processed", id, source);
            return false;
        }
        session.commit_processed = true;
        session.cancel_timers(&mut self.timers);
        let was_held = std::mem::take(&mut session.held);
        let start = session.started.then(|| session.close());
        if session.step_unknown {
            field.resolved = step::resolve(&field.config.step, &text);
        }
        if was_held {
            field.adapter.set_editable(field.config.allow_text_entry);
        }

        let settled = field.settle();
        log::debug!("{:?}: committed by {:?} as {}", id, source, settled.display);
        if let Some(start) = start {
            let diff = validate::diff(settled.numeric, start, field.resolved.decimals);
            self.emit(
                id,
                SpinEvent::Stop {
                    value: settled.numeric,
                    diff,
                },
            );
        }
        true
    }

    /// The read-only formatted overlay was clicked: hide it and focus.
    pub fn overlay_activated(&mut self, id: FieldId) -> bool {
        let Some(field) = self.fields.get_mut(id) else {
            unknown(id);
            return false;
        };
        field.adapter.hide_formatted_overlay();
        self.focus(id)
    }

    pub fn handle(&mut self, id: FieldId, signal: InteractionSignal) -> bool {
        match signal {
            InteractionSignal::PressStart(direction) => self.press_start(id, direction),
            InteractionSignal::PressEnd => self.press_end(id),
            InteractionSignal::TextEdited => self.text_edited(id),
            InteractionSignal::Committed(source) => self.commit(id, source),
            InteractionSignal::FocusGained => self.focus(id),
            InteractionSignal::OverlayActivated => self.overlay_activated(id),
        }
    }

    /// Validated value of the current text, without writing anything.
    pub fn value(&self, id: FieldId) -> Option<f64> {
        let field = self.fields.get(id)?;
        Some(validate::canonical(field.current(), field.config.bounds, field.resolved.decimals).numeric)
    }

    /// Sets the value programmatically (rounded and clamped). Does not open
    /// or close a session.
    pub fn set_value(&mut self, id: FieldId, value: f64) -> bool {
        let Some(field) = self.fields.get_mut(id) else {
            unknown(id);
            return false;
        };
        let v = validate::canonical(value, field.config.bounds, field.resolved.decimals);
        field.apply(&v);
        true
    }

    pub fn set_prefix(&mut self, id: FieldId, text: Option<&str>) -> bool {
        self.set_affix(id, Affix::Prefix, text)
    }

    pub fn set_postfix(&mut self, id: FieldId, text: Option<&str>) -> bool {
        self.set_affix(id, Affix::Postfix, text)
    }

    fn set_affix(&mut self, id: FieldId, affix: Affix, text: Option<&str>) -> bool {
        let Some(field) = self.fields.get_mut(id) else {
            unknown(id);
            return false;
        };
        let slot = match affix {
            Affix::Prefix => &mut field.config.prefix,
            Affix::Postfix => &mut field.config.postfix,
        };
        *slot = text.map(str::to_string);
        field.adapter.set_affix(affix, text);
        true
    }

    pub fn phase(&self, id: FieldId) -> Option<Phase> {
        let field = self.fields.get(id)?;
        Some(field.session.as_ref().map_or(Phase::Resting, SessionState::phase))
    }

    pub fn session(&self, id: FieldId) -> Option<&SessionState> {
        self.fields.get(id)?.session.as_ref()
    }

    pub fn resolved_step(&self, id: FieldId) -> Option<ResolvedStep> {
        self.fields.get(id).map(|f| f.resolved)
    }

    pub fn is_control_enabled(&self, id: FieldId, control: Control) -> Option<bool> {
        self.fields.get(id).map(|f| f.enabled(control))
    }

    pub fn config(&self, id: FieldId) -> Option<&SpinConfig> {
        self.fields.get(id).map(|f| &f.config)
    }

    /// Earliest pending timer deadline across all fields.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Fires every timer due at the clock's current time, in deadline order.
    /// Returns how many fired.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now();
        let mut fired = 0;
        while let Some(due) = self.timers.pop_due(now) {
            fired += 1;
            match due.kind {
                TimerKind::Lead | TimerKind::Repeat => self.repeat(due),
                TimerKind::Finalize => self.finalize(due),
            }
            if fired >= MAX_FIRES_PER_TICK {
                log::warn!("tick fired {} timers; deferring the rest", fired);
                break;
            }
        }
        fired
    }

    fn repeat(&mut self, due: Due) {
        let Some(field) = self.fields.get_mut(due.field) else {
            return;
        };
        let timing = field.config.timing;
        let Some(session) = field.session.as_mut() else {
            return;
        };
        let Some(direction) = session.accel.on_timer(&due, &timing, &mut self.timers) else {
            log::trace!("{:?}: stale {:?} timer", due.field, due.kind);
            return;
        };
        field.step(direction);
        if !field.enabled(direction.control()) {
            log::debug!("{:?}: bound reached, acceleration ends", due.field);
            field.session_mut().accel.end(&mut self.timers);
        }
    }

    fn finalize(&mut self, due: Due) {
        let Some(field) = self.fields.get_mut(due.field) else {
            return;
        };
        let Some(session) = field.session.as_mut() else {
            return;
        };
        if session.finalize != Some(due.id) {
            log::trace!("{:?}: stale finalize", due.field);
            return;
        }
        session.finalize = None;
        let start = session.close();
        let settled = field.settle();
        let diff = validate::diff(settled.numeric, start, field.resolved.decimals);
        self.emit(
            due.field,
            SpinEvent::Stop {
                value: settled.numeric,
                diff,
            },
        );
    }
}
