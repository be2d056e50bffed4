//! Integer sibling positions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order of an item among its siblings. Lower sorts first.
///
/// Positions are assigned by the engine, never by the user. Values need not be
/// contiguous; the engine densifies them whenever it reorders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position(i64);

impl Position {
    /// Wrap a raw position value
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Position immediately after this one
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Get the raw value
    pub fn value(self) -> i64 {
        self.0
    }
}

impl From<i64> for Position {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// First position handed out in an empty container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionBase {
    /// Positions run 0, 1, 2, ...
    #[default]
    Zero,
    /// Positions run 1, 2, 3, ...
    One,
}

impl PositionBase {
    /// The first position of a dense run
    pub fn first(self) -> Position {
        match self {
            Self::Zero => Position(0),
            Self::One => Position(1),
        }
    }

    /// Position of the element at `index` in a dense run
    pub fn at(self, index: usize) -> Position {
        Position(self.first().0 + index as i64)
    }
}

/// An item ordered among siblings by an integer position.
pub trait Positioned {
    type Id: PartialEq + fmt::Display;

    fn id(&self) -> &Self::Id;
    fn position(&self) -> Position;
    fn set_position(&mut self, position: Position);
}
