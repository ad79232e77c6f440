//! The engine's view of the widget it drives.
//!
//! Element construction, styling and icons stay with the host; the engine only
//! reads and writes text and flips a handful of presentational switches.

use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Glyph {
    #[default]
    Normal,
    /// One more step in this direction lands on zero.
    ZeroClear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Affix {
    Prefix,
    Postfix,
}

pub trait PresentationAdapter {
    /// Raw field text; the authoritative value.
    fn text(&self) -> String;
    fn set_text(&mut self, text: &str);
    fn set_control_enabled(&mut self, control: Control, enabled: bool);
    fn set_control_glyph(&mut self, control: Control, glyph: Glyph);
    fn show_formatted_overlay(&mut self, display: &str);
    fn hide_formatted_overlay(&mut self);
    fn set_affix(&mut self, affix: Affix, text: Option<&str>);
    /// Whether the user may type into the field right now.
    fn set_editable(&mut self, editable: bool);
    /// Called once after the engine released the field.
    fn detached(&mut self) {}
}

/// Everything a [`MemoryAdapter`] has been told so far.
#[derive(Clone, Debug, PartialEq)]
pub struct MemoryField {
    pub text: String,
    pub up_enabled: bool,
    pub down_enabled: bool,
    pub up_glyph: Glyph,
    pub down_glyph: Glyph,
    pub overlay: Option<String>,
    pub prefix: Option<String>,
    pub postfix: Option<String>,
    pub editable: bool,
    pub detached: bool,
    /// Number of `set_text` calls made by the engine.
    pub writes: usize,
}

impl Default for MemoryField {
    fn default() -> Self {
        Self {
            text: String::new(),
            up_enabled: true,
            down_enabled: true,
            up_glyph: Glyph::Normal,
            down_glyph: Glyph::Normal,
            overlay: None,
            prefix: None,
            postfix: None,
            editable: true,
            detached: false,
            writes: 0,
        }
    }
}

impl MemoryField {
    pub fn enabled(&self, control: Control) -> bool {
        match control {
            Control::Up => self.up_enabled,
            Control::Down => self.down_enabled,
        }
    }

    pub fn glyph(&self, control: Control) -> Glyph {
        match control {
            Control::Up => self.up_glyph,
            Control::Down => self.down_glyph,
        }
    }
}

/// Headless adapter backed by shared in-memory state. Clones observe the same
/// field, so a host keeps one handle after giving another to the engine.
#[derive(Clone, Default)]
pub struct MemoryAdapter {
    state: Rc<RefCell<MemoryField>>,
}

impl MemoryAdapter {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            state: Rc::new(RefCell::new(MemoryField {
                text: text.into(),
                ..MemoryField::default()
            })),
        }
    }

    pub fn snapshot(&self) -> MemoryField {
        self.state.borrow().clone()
    }

    pub fn current_text(&self) -> String {
        self.state.borrow().text.clone()
    }

    /// Replaces the text the way a user edit would (not counted as a write).
    pub fn type_text(&self, text: impl Into<String>) {
        self.state.borrow_mut().text = text.into();
    }
}

impl PresentationAdapter for MemoryAdapter {
    fn text(&self) -> String {
        self.current_text()
    }

    fn set_text(&mut self, text: &str) {
        let mut s = self.state.borrow_mut();
        s.text = text.to_string();
        s.writes += 1;
    }

    fn set_control_enabled(&mut self, control: Control, enabled: bool) {
        let mut s = self.state.borrow_mut();
        match control {
            Control::Up => s.up_enabled = enabled,
            Control::Down => s.down_enabled = enabled,
        }
    }

    fn set_control_glyph(&mut self, control: Control, glyph: Glyph) {
        let mut s = self.state.borrow_mut();
        match control {
            Control::Up => s.up_glyph = glyph,
            Control::Down => s.down_glyph = glyph,
        }
    }

    fn show_formatted_overlay(&mut self, display: &str) {
        self.state.borrow_mut().overlay = Some(display.to_string());
    }

    fn hide_formatted_overlay(&mut self) {
        self.state.borrow_mut().overlay = None;
    }

    fn set_affix(&mut self, affix: Affix, text: Option<&str>) {
        let mut s = self.state.borrow_mut();
        let slot = match affix {
            Affix::Prefix => &mut s.prefix,
            Affix::Postfix => &mut s.postfix,
        };
        *slot = text.map(str::to_string);
    }

    fn set_editable(&mut self, editable: bool) {
        self.state.borrow_mut().editable = editable;
    }

    fn detached(&mut self) {
        self.state.borrow_mut().detached = true;
    }
}
