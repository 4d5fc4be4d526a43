use serde::{Deserialize, Serialize};

/// A resolved movement command for the falling piece.
///
/// `Up` rotates clockwise; the other three translate by one cell. "No
/// command" is expressed as `Option::<Direction>::None` wherever a step
/// accepts input.
///
/// Text parsing is case-insensitive:
///
/// ```
/// use rltetris_engine::Direction;
///
/// assert_eq!("left".parse::<Direction>().ok(), Some(Direction::Left));
/// assert_eq!(Direction::parse_command("jump"), None);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[display("up")]
    Up,
    #[display("down")]
    Down,
    #[display("left")]
    Left,
    #[display("right")]
    Right,
}

impl Direction {
    /// All directions in one-hot slot order.
    pub const ALL: [Self; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Left,
        Direction::Down,
    ];

    /// Decodes an agent action vector.
    ///
    /// `[1,0,0,0]` is `Up`, `[0,1,0,0]` is `Right`, `[0,0,1,0]` is `Left` and
    /// `[0,0,0,1]` is `Down`. Every other vector decodes to no command.
    #[must_use]
    pub fn from_one_hot(action: &[u8]) -> Option<Self> {
        match action {
            [1, 0, 0, 0] => Some(Direction::Up),
            [0, 1, 0, 0] => Some(Direction::Right),
            [0, 0, 1, 0] => Some(Direction::Left),
            [0, 0, 0, 1] => Some(Direction::Down),
            _ => None,
        }
    }

    #[must_use]
    pub const fn to_one_hot(self) -> [u8; 4] {
        match self {
            Direction::Up => [1, 0, 0, 0],
            Direction::Right => [0, 1, 0, 0],
            Direction::Left => [0, 0, 1, 0],
            Direction::Down => [0, 0, 0, 1],
        }
    }

    /// Decodes a text command, treating anything unrecognized as no command.
    #[must_use]
    pub fn parse_command(input: &str) -> Option<Self> {
        input.trim().parse().ok()
    }

    /// Anchor offset for translations; `None` for the rotation command.
    #[must_use]
    pub const fn offset(self) -> Option<(i32, i32)> {
        match self {
            Direction::Up => None,
            Direction::Down => Some((0, 1)),
            Direction::Left => Some((-1, 0)),
            Direction::Right => Some((1, 0)),
        }
    }
}
