#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Down,
    Up,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Down => -1.0,
            Direction::Up => 1.0,
        }
    }

    pub fn control(self) -> crate::Control {
        match self {
            Direction::Down => crate::Control::Down,
            Direction::Up => crate::Control::Up,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitSource {
    Enter,
    Blur,
}

/// Raw interaction signals a presentation adapter forwards to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionSignal {
    /// Pointer or touch down on a control.
    PressStart(Direction),
    /// Pointer up, leave or touch end on a control.
    PressEnd,
    /// A keystroke changed the field text.
    TextEdited,
    Committed(CommitSource),
    FocusGained,
    /// The read-only formatted overlay was clicked.
    OverlayActivated,
}
