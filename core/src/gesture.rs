use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
}

/// Game action requested by a completed pointer gesture.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GestureAction {
    None,
    Reveal(Coord2),
    ToggleFlag(Coord2),
    Chord(Coord2),
}

/// Tracks left/right buttons over the board and turns press, move and release edges into game actions.
///
/// Valid transitions:
/// - Idle -> LeftDown | RightDown (press)
/// - LeftDown | RightDown -> BothDown (press of the other button, anchored on the current cell)
/// - LeftDown -> Idle (release, reveals), RightDown -> Idle (release, flags)
/// - BothDown -> Spent (first release over the anchor chords, leaving the anchor cancels)
/// - Spent -> Idle (once every button is up)
///
/// A release outside the board resets to Idle from any state without an action.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChordGesture {
    #[default]
    Idle,
    LeftDown(Coord2),
    RightDown(Coord2),
    BothDown(Coord2),
    /// Gesture already resolved, swallows releases until both buttons are up.
    Spent { left: bool, right: bool },
}

impl ChordGesture {
    pub fn press(&mut self, button: MouseButton, at: Coord2) -> GestureAction {
        use ChordGesture::*;
        use MouseButton::*;

        let next = match (*self, button) {
            (Idle, Left) | (LeftDown(_), Left) => LeftDown(at),
            (Idle, Right) | (RightDown(_), Right) => RightDown(at),
            (LeftDown(_), Right) | (RightDown(_), Left) => BothDown(at),
            (BothDown(anchor), _) => BothDown(anchor),
            (Spent { right: true, .. }, Left) | (Spent { left: true, .. }, Right) => BothDown(at),
            (Spent { right, .. }, Left) => Spent { left: true, right },
            (Spent { left, .. }, Right) => Spent { left, right: true },
        };
        self.transition(next);
        GestureAction::None
    }

    pub fn release(&mut self, button: MouseButton, at: Coord2) -> GestureAction {
        use ChordGesture::*;
        use MouseButton::*;

        let (next, action) = match (*self, button) {
            (LeftDown(_), Left) => (Idle, GestureAction::Reveal(at)),
            (RightDown(_), Right) => (Idle, GestureAction::ToggleFlag(at)),
            (BothDown(anchor), released) => {
                let action = if anchor == at {
                    GestureAction::Chord(anchor)
                } else {
                    GestureAction::None
                };
                let still_down = Self::spent_with(released);
                (still_down, action)
            }
            (Spent { right, .. }, Left) => (Self::settle(false, right), GestureAction::None),
            (Spent { left, .. }, Right) => (Self::settle(left, false), GestureAction::None),
            (state, _) => (state, GestureAction::None),
        };
        self.transition(next);
        action
    }

    /// Pointer moved onto `at` with buttons possibly held.
    pub fn enter(&mut self, at: Coord2) {
        use ChordGesture::*;

        let next = match *self {
            LeftDown(_) => LeftDown(at),
            RightDown(_) => RightDown(at),
            BothDown(anchor) if anchor != at => Spent {
                left: true,
                right: true,
            },
            state => state,
        };
        self.transition(next);
    }

    /// Pointer left the board, a held chord is cancelled.
    pub fn leave(&mut self) {
        if matches!(self, Self::BothDown(_)) {
            self.transition(Self::Spent {
                left: true,
                right: true,
            });
        }
    }

    /// A button went up somewhere off the board, nothing fires.
    pub fn release_outside(&mut self) {
        self.transition(Self::Idle);
    }

    /// Cell whose neighbors should be drawn pressed while a chord is held.
    pub fn chord_anchor(&self) -> Option<Coord2> {
        match *self {
            Self::BothDown(anchor) => Some(anchor),
            _ => None,
        }
    }

    /// Cell drawn pressed while only the left button is held.
    pub fn pressed_cell(&self) -> Option<Coord2> {
        match *self {
            Self::LeftDown(at) => Some(at),
            _ => None,
        }
    }

    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    const fn spent_with(released: MouseButton) -> Self {
        match released {
            MouseButton::Left => Self::Spent {
                left: false,
                right: true,
            },
            MouseButton::Right => Self::Spent {
                left: true,
                right: false,
            },
        }
    }

    const fn settle(left: bool, right: bool) -> Self {
        if left || right {
            Self::Spent { left, right }
        } else {
            Self::Idle
        }
    }

    fn transition(&mut self, next: Self) {
        if *self != next {
            log::trace!("gesture: {:?} -> {:?}", self, next);
            *self = next;
        }
    }
}
