use serde::{Deserialize, Serialize};

/// Who is driving the engine.
///
/// The mode only scales the elapsed time fed to the automatic drop timer;
/// rules are identical in both modes.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Human-paced drops.
    #[default]
    #[display("player")]
    Player,
    /// Drops sped up tenfold for automated play.
    #[display("machine")]
    Machine,
}

impl GameMode {
    /// Factor applied to elapsed milliseconds before they reach the fall timer.
    #[must_use]
    pub const fn speed_multiplier(self) -> u64 {
        match self {
            GameMode::Player => 1,
            GameMode::Machine => 10,
        }
    }
}
