use serde::{Deserialize, Serialize};

/// Hit points a blackjack field absorbs before busting when hits are allowed.
pub const HIT_CEILING: u32 = 21;

/// How forgiving a blackjack field is about revealing mines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum HitTolerance {
    /// Any revealed card busts the field.
    Disallow,
    /// Cards revealed by a wrong guess are absorbed; direct clicks still bust.
    #[default]
    GuessesOnly,
    /// Cards are absorbed from any reveal until the ceiling is passed.
    AnyClick,
}

impl HitTolerance {
    pub fn level(self) -> u8 {
        match self {
            HitTolerance::Disallow => 0,
            HitTolerance::GuessesOnly => 1,
            HitTolerance::AnyClick => 2,
        }
    }

    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(HitTolerance::Disallow),
            1 => Some(HitTolerance::GuessesOnly),
            2 => Some(HitTolerance::AnyClick),
            _ => None,
        }
    }

    pub fn threshold(self) -> u32 {
        match self {
            HitTolerance::Disallow => 0,
            _ => HIT_CEILING,
        }
    }
}

/// Player options. Persisted next to the records and snapshotted into a
/// field when its mines are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    pub mode: usize,
    pub sound: bool,
    pub mouseover: bool,
    pub tracker: bool,
    pub allow_hits: HitTolerance,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            mode: 3,
            sound: false,
            mouseover: true,
            tracker: true,
            allow_hits: HitTolerance::GuessesOnly,
        }
    }
}
