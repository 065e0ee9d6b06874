use crate::{GameError, ModeConfig};
use std::fmt::Debug;

/// Decides the next flag value of a concealed cell.
///
/// `requested` is a specific rank (keyboard shortcut) or `None` to cycle.
/// Returns 0 for "unflagged".
pub trait FlagHandler: Debug {
    fn next_flag(&self, current: u8, requested: Option<u8>) -> Result<u8, GameError>;
}

/// Plain on/off flags.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardFlags;

impl FlagHandler for StandardFlags {
    fn next_flag(&self, current: u8, requested: Option<u8>) -> Result<u8, GameError> {
        match requested {
            None | Some(1) => Ok(if current == 1 { 0 } else { 1 }),
            Some(rank) => Err(GameError::InvalidRank(rank)),
        }
    }
}

/// Flags that carry a guessed card rank and cycle 0, 1, ..., 10, 0.
#[derive(Debug, Default, Clone, Copy)]
pub struct RankedFlags;

impl RankedFlags {
    pub const MAX_RANK: u8 = 10;
}

impl FlagHandler for RankedFlags {
    fn next_flag(&self, current: u8, requested: Option<u8>) -> Result<u8, GameError> {
        match requested {
            None => Ok((current + 1) % (Self::MAX_RANK + 1)),
            Some(rank) if (1..=Self::MAX_RANK).contains(&rank) => {
                Ok(if current == rank { 0 } else { rank })
            }
            Some(rank) => Err(GameError::InvalidRank(rank)),
        }
    }
}

pub fn handler_for(mode: &ModeConfig) -> Box<dyn FlagHandler> {
    if mode.special {
        Box::new(RankedFlags)
    } else {
        Box::new(StandardFlags)
    }
}
