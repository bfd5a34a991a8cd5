//! Navigation cursor over the climb list

use crate::catalog::ClimbPosition;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Which way the cursor was asked to move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CursorError {
    #[error("Cannot move {direction} from position {position}: catalog holds {len} climbs")]
    OutOfRange {
        direction: Direction,
        position: usize,
        len: usize,
    },

    #[error("Start position {position} is outside the catalog ({len} climbs)")]
    StartOutOfRange { position: i64, len: usize },

    #[error("Catalog is empty; there is nothing to annotate")]
    EmptyCatalog,

    #[error("Unknown start mode: {0} (expected 'resume' or 'zero')")]
    UnknownStartMode(String),
}

pub type CursorResult<T> = Result<T, CursorError>;

/// How the cursor picks its first position at startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartMode {
    /// Largest position with saved edges, or 0 for an empty store
    #[default]
    Resume,
    /// Always 0, ignoring saved progress
    Zero,
}

impl FromStr for StartMode {
    type Err = CursorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "resume" => Ok(StartMode::Resume),
            "zero" => Ok(StartMode::Zero),
            other => Err(CursorError::UnknownStartMode(other.to_string())),
        }
    }
}

impl std::fmt::Display for StartMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartMode::Resume => write!(f, "resume"),
            StartMode::Zero => write!(f, "zero"),
        }
    }
}

/// Current climb being annotated.
///
/// Always inside `0..len`; a move that would leave that range fails and
/// leaves the position where it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationCursor {
    position: usize,
    len: usize,
}

impl NavigationCursor {
    /// Cursor at an explicit starting position
    pub fn new(len: usize, start: i64) -> CursorResult<Self> {
        if len == 0 {
            return Err(CursorError::EmptyCatalog);
        }
        let position = usize::try_from(start)
            .ok()
            .filter(|&p| p < len)
            .ok_or(CursorError::StartOutOfRange {
                position: start,
                len,
            })?;
        Ok(Self { position, len })
    }

    /// Cursor initialised by `mode`. `persisted_max` is the largest
    /// `graph_index` currently stored, if any.
    pub fn start(mode: StartMode, len: usize, persisted_max: Option<i64>) -> CursorResult<Self> {
        let start = match mode {
            StartMode::Resume => persisted_max.unwrap_or(0),
            StartMode::Zero => 0,
        };
        Self::new(len, start)
    }

    pub fn position(&self) -> ClimbPosition {
        ClimbPosition::new(self.position)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn at_start(&self) -> bool {
        self.position == 0
    }

    pub fn at_end(&self) -> bool {
        self.position + 1 == self.len
    }

    pub fn next(&mut self) -> CursorResult<ClimbPosition> {
        if self.at_end() {
            return Err(self.out_of_range(Direction::Forward));
        }
        self.position += 1;
        Ok(self.position())
    }

    pub fn previous(&mut self) -> CursorResult<ClimbPosition> {
        if self.at_start() {
            return Err(self.out_of_range(Direction::Backward));
        }
        self.position -= 1;
        Ok(self.position())
    }

    /// Jump straight to a position already validated by the catalog
    pub fn seek(&mut self, position: ClimbPosition) -> CursorResult<ClimbPosition> {
        if position.index() >= self.len {
            return Err(CursorError::StartOutOfRange {
                position: position.as_i64(),
                len: self.len,
            });
        }
        self.position = position.index();
        Ok(position)
    }

    fn out_of_range(&self, direction: Direction) -> CursorError {
        CursorError::OutOfRange {
            direction,
            position: self.position,
            len: self.len,
        }
    }
}
