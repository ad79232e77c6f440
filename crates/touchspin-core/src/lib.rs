//! # Touchspin engine
//!
//! A numeric spinner is a text field with up/down controls. This crate is the
//! part that does not draw anything: it decides what the text should say,
//! when controls are enabled, how fast a held control repeats and when the
//! start/stop lifecycle events fire.
//!
//! - [`SpinEngine`] owns attached fields and their timers.
//! - [`PresentationAdapter`] is the widget seen from the engine;
//!   [`MemoryAdapter`] is a headless implementation.
//! - [`SpinOptions`] configure a field; [`SpinEvent`]s report back.
//!
//! ## Driving time
//!
//! The engine never sleeps or spawns. The host calls `tick()` (every frame, or
//! once `next_deadline()` has passed) and due timers fire in order:
//!
//! ```rust
//! use touchspin_core::*;
//!
//! let clock = TestClock::starting_now();
//! let mut engine = SpinEngine::with_clock(clock.clone());
//! let field = MemoryAdapter::new("5");
//! let id = engine.attach(field.clone(), SpinOptions::new().min(0.0).max(10.0));
//!
//! engine.press_start(id, Direction::Up);
//! assert_eq!(field.current_text(), "6");
//!
//! clock.advance_ms(300); // lead delay
//! engine.tick();
//! assert_eq!(field.current_text(), "7");
//!
//! engine.press_end(id);
//! clock.advance_ms(1000); // finalize delay
//! engine.tick();
//! assert_eq!(engine.phase(id), Some(Phase::Resting));
//! ```
//!
//! ## Events
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use touchspin_core::*;
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let mut engine = SpinEngine::new();
//! engine.subscribe({
//!     let seen = seen.clone();
//!     move |_, ev| seen.borrow_mut().push(ev.clone())
//! });
//!
//! let id = engine.attach(MemoryAdapter::new("2"), SpinOptions::new());
//! engine.focus(id);
//! engine.commit(id, CommitSource::Enter);
//!
//! assert_eq!(
//!     *seen.borrow(),
//!     vec![
//!         SpinEvent::Init { value: 2.0 },
//!         SpinEvent::Start { value: 2.0 },
//!         SpinEvent::Stop { value: 2.0, diff: 0.0 },
//!     ]
//! );
//! ```

pub mod accel;
pub mod adapter;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod input;
pub mod session;
pub mod step;
pub mod timer;
pub mod validate;

pub use accel::{AccelPhase, AccelerationController};
pub use adapter::{Affix, Control, Glyph, MemoryAdapter, MemoryField, PresentationAdapter};
pub use clock::{Clock, SystemClock, TestClock};
pub use config::{
    BOUND_SENTINEL, MAX_TIMING_DELAY, SpinConfig, SpinOptions, SpinTemplate, SpinTiming, StartPolicy,
    default_template, reset_default_template, set_default_template,
};
pub use engine::{FieldId, SpinEngine};
pub use error::ConfigError;
pub use event::{SpinEvent, SubId};
pub use input::{CommitSource, Direction, InteractionSignal};
pub use session::{Phase, SessionState};
pub use step::{ResolvedStep, Step};
pub use validate::{Bounds, Finality, Validated};

pub use touchspin_format::{Locale, NumberFormatter, NumberStyle};
