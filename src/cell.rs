/// What an observer is allowed to draw for a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellView {
    Concealed,
    Flagged(u8),
    /// A flag shown wrong at the end of the game.
    FalseFlag(u8),
    Clue(u8),
    Mine(u8),
}

/// One square of the board.
///
/// `mine` is 0 for a safe cell, 1 for a standard mine, or the card value in
/// blackjack mode. `revealed` only ever goes from false to true.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    mine: u8,
    clue: u8,
    flag: u8,
    revealed: bool,
    false_flag: bool,
}

impl Cell {
    pub fn is_mine(&self) -> bool {
        self.mine != 0
    }

    pub fn mine_value(&self) -> u8 {
        self.mine
    }

    /// Weighted count of neighbouring mines. Only meaningful once revealed.
    pub fn clue(&self) -> u8 {
        self.clue
    }

    pub fn flag(&self) -> u8 {
        self.flag
    }

    pub fn is_flagged(&self) -> bool {
        self.flag != 0
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn is_false_flag(&self) -> bool {
        self.false_flag
    }

    pub fn view(&self) -> CellView {
        match (self.revealed, self.flag) {
            (true, _) if self.is_mine() => CellView::Mine(self.mine),
            (true, _) => CellView::Clue(self.clue),
            (false, 0) => CellView::Concealed,
            (false, flag) if self.false_flag => CellView::FalseFlag(flag),
            (false, flag) => CellView::Flagged(flag),
        }
    }

    pub(crate) fn arm(&mut self, weight: u8) {
        self.mine = weight;
    }

    pub(crate) fn set_flag(&mut self, flag: u8) {
        self.flag = flag;
    }

    pub(crate) fn mark_false_flag(&mut self) {
        self.false_flag = true;
    }

    /// Reveals the cell with its clue, dropping any flag. Returns the flag
    /// that was cleared.
    pub(crate) fn reveal(&mut self, clue: u8) -> u8 {
        self.revealed = true;
        self.clue = if self.is_mine() { 0 } else { clue };
        std::mem::take(&mut self.flag)
    }
}
