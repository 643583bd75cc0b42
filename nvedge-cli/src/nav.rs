//! Navigation vocabulary: directions, actions, window numbers and outcomes

use std::fmt;
use std::str::FromStr;

use rmpv::Value;

use nvedge_utils::{NavError, Result};

/// One of the four vi-style directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Down,
    Up,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::Left, Self::Down, Self::Up, Self::Right];

    /// The `h`/`j`/`k`/`l` key the editor's `winnr()` understands
    pub fn key(self) -> char {
        match self {
            Self::Left => 'h',
            Self::Down => 'j',
            Self::Up => 'k',
            Self::Right => 'l',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Down => "down",
            Self::Up => "up",
            Self::Right => "right",
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Self::Left | Self::Right => Axis::Horizontal,
            Self::Down | Self::Up => Axis::Vertical,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|dir| wanted == dir.key().to_string() || wanted == dir.name())
            .ok_or_else(|| format!("invalid -dir: {:?} (expected h, j, k or l)", s))
    }
}

/// The axis a resize works along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Width: left and right neighbours
    Horizontal,
    /// Height: neighbours below and above
    Vertical,
}

impl Axis {
    /// The two opposite directions spanning this axis
    pub fn directions(self) -> [Direction; 2] {
        match self {
            Self::Horizontal => [Direction::Left, Direction::Right],
            Self::Vertical => [Direction::Down, Direction::Up],
        }
    }
}

/// What the multiplexer wants to do in the given direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move,
    Resize,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move => write!(f, "move"),
            Self::Resize => write!(f, "resize"),
        }
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "move" => Ok(Self::Move),
            "resize" => Ok(Self::Resize),
            _ => Err(format!("invalid -action: {:?} (expected move or resize)", s)),
        }
    }
}

/// Position of a window in the editor's current layout
///
/// Only meaningful within the batch that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowNumber(u32);

impl WindowNumber {
    pub fn new(n: u32) -> Option<Self> {
        (n > 0).then_some(Self(n))
    }

    /// Read the result of query `index` in a batch
    pub fn from_value(index: usize, value: &Value) -> Result<Self> {
        value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .and_then(Self::new)
            .ok_or_else(|| {
                NavError::batch(format!(
                    "query {} returned {}, expected a window number",
                    index, value
                ))
            })
    }
}

impl fmt::Display for WindowNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Answer to "would this move or resize do anything inside the editor?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// There is a window to move to or resize against
    Possible,
    /// Focus would stay in the same window
    Blocked,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parse_case_insensitive() {
        assert_eq!("h".parse::<Direction>().unwrap(), Direction::Left);
        assert_eq!("J".parse::<Direction>().unwrap(), Direction::Down);
        assert_eq!("K".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!("Right".parse::<Direction>().unwrap(), Direction::Right);
    }

    #[test]
    fn test_direction_parse_rejects_other() {
        for bad in ["", "x", "hj", "north"] {
            let err = bad.parse::<Direction>().unwrap_err();
            assert!(err.contains("invalid -dir"), "{}", err);
        }
    }

    #[test]
    fn test_direction_key_roundtrip() {
        for dir in Direction::ALL {
            assert_eq!(dir.key().to_string().parse::<Direction>().unwrap(), dir);
        }
    }

    #[test]
    fn test_axis_pairs() {
        assert_eq!(Direction::Left.axis(), Axis::Horizontal);
        assert_eq!(Direction::Right.axis(), Axis::Horizontal);
        assert_eq!(Direction::Down.axis(), Axis::Vertical);
        assert_eq!(Direction::Up.axis(), Axis::Vertical);
        assert_eq!(
            Axis::Horizontal.directions(),
            [Direction::Left, Direction::Right]
        );
        assert_eq!(Axis::Vertical.directions(), [Direction::Down, Direction::Up]);
    }

    #[test]
    fn test_action_parse() {
        assert_eq!("move".parse::<Action>().unwrap(), Action::Move);
        assert_eq!("RESIZE".parse::<Action>().unwrap(), Action::Resize);
        assert!("swap".parse::<Action>().is_err());
    }

    #[test]
    fn test_window_number_rejects_zero() {
        assert!(WindowNumber::new(0).is_none());
        assert_eq!(WindowNumber::new(3).map(|w| w.to_string()), Some("3".into()));
    }

    #[test]
    fn test_window_number_from_value() {
        assert_eq!(
            WindowNumber::from_value(0, &Value::from(4)).unwrap(),
            WindowNumber(4)
        );

        for bad in [Value::from(0), Value::from(-2), Value::from("3"), Value::Nil] {
            let err = WindowNumber::from_value(1, &bad).unwrap_err();
            assert!(matches!(err, NavError::Batch(_)));
            assert!(err.to_string().contains("query 1"));
        }
    }
}
