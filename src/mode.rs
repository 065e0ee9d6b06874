use crate::GameError;
use std::fmt;

/// Cards in one suit-set of a deck: ranks 1-9 once, rank 10 four times.
pub const CARDS_PER_SET: u32 = 13;

/// Immutable description of a playable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeConfig {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    /// Mine count; in blackjack mode this is the number of cards.
    pub amount: u32,
    /// Selects the blackjack variant where mines carry card values.
    pub special: bool,
}

pub const MODES: [ModeConfig; 6] = [
    ModeConfig::fixed("Fresh", 8, 8, 10, false),
    ModeConfig::fixed("Skilled", 16, 16, 40, false),
    ModeConfig::fixed("Pro", 30, 16, 99, false),
    ModeConfig::fixed("Half Deck", 12, 12, 52 / 2, true),
    ModeConfig::fixed("Full Deck", 16, 16, 52, true),
    ModeConfig::fixed("Double Deck", 28, 16, 52 * 2, true),
];

const fn table_is_valid(modes: &[ModeConfig]) -> bool {
    let mut i = 0;
    while i < modes.len() {
        let mode = modes[i];
        if mode.amount >= mode.width * mode.height {
            return false;
        }
        if mode.special && mode.amount % CARDS_PER_SET != 0 {
            return false;
        }
        i += 1;
    }
    true
}

const _: () = assert!(table_is_valid(&MODES), "mode table has an unplayable entry");

impl ModeConfig {
    const fn fixed(name: &'static str, width: u32, height: u32, amount: u32, special: bool) -> Self {
        Self {
            name,
            width,
            height,
            amount,
            special,
        }
    }

    /// Builds a custom mode, rejecting layouts that cannot be played.
    pub fn new(
        name: &'static str,
        width: u32,
        height: u32,
        amount: u32,
        special: bool,
    ) -> Result<Self, GameError> {
        if amount >= width * height {
            return Err(GameError::TooManyMines {
                width,
                height,
                mines: amount,
            });
        }
        if special && amount % CARDS_PER_SET != 0 {
            return Err(GameError::PartialDeck(amount));
        }
        Ok(Self::fixed(name, width, height, amount, special))
    }

    /// Builds a standard mode whose mine count is a fraction of the cells.
    pub fn with_rate(name: &'static str, width: u32, height: u32, rate: f64) -> Result<Self, GameError> {
        let amount = (f64::from(width * height) * rate) as u32;
        Self::new(name, width, height, amount, false)
    }

    pub fn from_index(index: usize) -> Result<Self, GameError> {
        MODES.get(index).copied().ok_or(GameError::UnknownMode(index))
    }

    pub fn cell_count(&self) -> u32 {
        self.width * self.height
    }

    /// Number of 13-card sets in play (2, 4 and 8 for the shipped decks).
    pub fn deck_sets(&self) -> u32 {
        self.amount / CARDS_PER_SET
    }

    /// Number of full 52-card decks, rounded down (0 for the half deck).
    pub fn deck_multiplier(&self) -> u32 {
        self.amount / 52
    }

    /// The unshuffled card multiset for this mode. Empty for standard modes.
    pub fn deck(&self) -> Vec<u8> {
        if !self.special {
            return Vec::new();
        }
        let set: Vec<u8> = (1..=9).chain(std::iter::repeat(10).take(4)).collect();
        set.iter()
            .copied()
            .cycle()
            .take((self.deck_sets() * CARDS_PER_SET) as usize)
            .collect()
    }

    /// Key used by the record store, e.g. `Normal: Fresh (10 mines @ 8x8)`.
    pub fn descriptor(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ModeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({} mines @ {}x{})",
            if self.special { "Blackjack" } else { "Normal" },
            self.name,
            self.amount,
            self.width,
            self.height
        )
    }
}
