use crate::Position;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Position {0:?} is out of bounds")]
    OutOfBounds(Position),
    #[error("Too many mines ({mines}) for board size {width}x{height}")]
    TooManyMines { width: u32, height: u32, mines: u32 },
    #[error("Blackjack mode needs whole sets of 13 cards, got {0}")]
    PartialDeck(u32),
    #[error("No mode with index {0}")]
    UnknownMode(usize),
    #[error("Flag rank {0} is not valid for this mode")]
    InvalidRank(u8),
}

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Record store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Record store is corrupted: {0}")]
    Corrupted(String),
    #[error("Record store could not be encoded: {0}")]
    Encode(#[from] bincode::Error),
    #[error("Could not determine a data directory for the record store")]
    NoDataDirectory,
}
