//! Reproducible mine layouts.
//!
//! A layout is a function of the seed, the mode and the first revealed
//! position. Mines are scattered by rejection sampling and, in blackjack
//! mode, dealt cards from a shuffled deck in ascending position order.

use crate::{ModeConfig, Position};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Mine positions mapped to their weight (1, or a card value 1-10).
pub type Layout = BTreeMap<Position, u8>;

#[derive(Debug, Clone)]
pub struct SeedManager {
    seed: Option<u64>,
    explicit: bool,
}

impl SeedManager {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            seed,
            explicit: seed.is_some(),
        }
    }

    /// The seed in use, if one was supplied or has been drawn.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Whether the player chose the seed. Such sessions never make the records.
    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    /// Draws a seed on first use and returns a generator for it.
    pub fn rng(&mut self) -> ChaCha8Rng {
        let seed = *self.seed.get_or_insert_with(|| {
            let drawn: u64 = rand::thread_rng().gen();
            debug!(seed = drawn, "drew a fresh seed");
            drawn
        });
        ChaCha8Rng::seed_from_u64(seed)
    }

    /// Produces the full layout for `mode`, never placing a mine on `first`.
    pub fn layout(&mut self, mode: &ModeConfig, first: Position) -> Layout {
        let mut rng = self.rng();
        let mines = scatter(&mut rng, mode, first);
        deal(&mut rng, mode, mines)
    }
}

/// Picks `mode.amount` distinct positions, skipping `exclude`.
pub fn scatter<R: Rng>(rng: &mut R, mode: &ModeConfig, exclude: Position) -> BTreeSet<Position> {
    let mut mines = BTreeSet::new();
    while mines.len() < mode.amount as usize {
        let pos = Position::new(
            rng.gen_range(0..mode.width) as i32,
            rng.gen_range(0..mode.height) as i32,
        );
        if pos != exclude {
            mines.insert(pos);
        }
    }
    mines
}

/// Assigns weights to the mines. Cards are popped from the back of the
/// shuffled deck while walking mines in sorted order.
pub fn deal<R: Rng>(rng: &mut R, mode: &ModeConfig, mines: BTreeSet<Position>) -> Layout {
    if !mode.special {
        return mines.into_iter().map(|pos| (pos, 1)).collect();
    }
    let mut cards = mode.deck();
    cards.shuffle(rng);
    mines
        .into_iter()
        .map(|pos| (pos, cards.pop().unwrap_or(1)))
        .collect()
}
