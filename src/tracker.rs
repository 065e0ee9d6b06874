use crate::ModeConfig;

/// Bookkeeping for one card rank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankEntry {
    /// Cards of this rank in the deck.
    pub capacity: u32,
    pub flagged: u32,
    /// Confirmed by a correct guess.
    pub locked: u32,
    /// Revealed as a hit.
    pub blown: u32,
}

impl RankEntry {
    pub fn total(&self) -> u32 {
        self.flagged + self.locked + self.blown
    }

    /// More cards of this rank are accounted for than exist.
    pub fn over(&self) -> bool {
        self.total() > self.capacity
    }
}

/// Per-rank flag tracker for blackjack fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankTracker {
    entries: [RankEntry; 10],
}

impl RankTracker {
    pub fn new(mode: &ModeConfig) -> Self {
        let sets = mode.deck_sets();
        let mut entries = [RankEntry::default(); 10];
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.capacity = if i == 9 { sets * 4 } else { sets };
        }
        Self { entries }
    }

    pub fn entry(&self, rank: u8) -> Option<&RankEntry> {
        self.entries.get(usize::from(rank).checked_sub(1)?)
    }

    fn entry_mut(&mut self, rank: u8) -> Option<&mut RankEntry> {
        self.entries.get_mut(usize::from(rank).checked_sub(1)?)
    }

    pub fn entries(&self) -> impl Iterator<Item = (u8, &RankEntry)> {
        (1..=10).zip(self.entries.iter())
    }

    pub(crate) fn flag(&mut self, rank: u8) {
        if let Some(entry) = self.entry_mut(rank) {
            entry.flagged += 1;
        }
    }

    pub(crate) fn unflag(&mut self, rank: u8) {
        if let Some(entry) = self.entry_mut(rank) {
            entry.flagged = entry.flagged.saturating_sub(1);
        }
    }

    pub(crate) fn lock(&mut self, rank: u8) {
        if let Some(entry) = self.entry_mut(rank) {
            entry.locked += 1;
        }
    }

    pub(crate) fn blow(&mut self, rank: u8) {
        if let Some(entry) = self.entry_mut(rank) {
            entry.blown += 1;
        }
    }
}
