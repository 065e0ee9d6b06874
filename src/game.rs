use crate::flag::{handler_for, FlagHandler};
use crate::options::HitTolerance;
use crate::{
    Board, CellView, FieldEvent, GameError, ModeConfig, Options, Position, RankTracker, Record,
    SeedManager, Status, Timer,
};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, info, trace};

/// Hit total at which the status face starts to worry.
const WOAH_HITS: u32 = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    /// No cell revealed yet; mines not placed.
    Setup,
    Active,
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Reveal,
    /// Cycle the flag, or toggle a specific rank.
    Flag(Option<u8>),
    /// Reveal a flagged cell, betting its flag matches the card.
    Guess,
    Chord,
}

/// Mouseover summary for a revealed cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hint {
    pub total: u32,
    pub flags_hits: u32,
    pub remaining: i64,
}

/// One game session on one board.
#[derive(Debug)]
pub struct Field {
    mode: ModeConfig,
    board: Board,
    flags: Box<dyn FlagHandler>,
    seeds: SeedManager,
    options: Options,
    snapshot: Option<Options>,
    tracker: Option<RankTracker>,
    timer: Timer,
    state: GameState,
    status: Status,
    cleared_count: u32,
    goal: u32,
    mines_remaining: i64,
    hit_count: u32,
    blow_count: u32,
    guess_count: u32,
    events: Vec<FieldEvent>,
}

impl Field {
    pub fn new(mode: ModeConfig, seed: Option<u64>, options: Options) -> Result<Self, GameError> {
        let board = Board::new(mode.width, mode.height, mode.amount)?;
        Ok(Self {
            mode,
            board,
            flags: handler_for(&mode),
            seeds: SeedManager::new(seed),
            options,
            snapshot: None,
            tracker: mode.special.then(|| RankTracker::new(&mode)),
            timer: Timer::new(),
            state: GameState::Setup,
            status: Status::Okay,
            cleared_count: 0,
            goal: mode.cell_count() - mode.amount,
            mines_remaining: i64::from(mode.amount),
            hit_count: 0,
            blow_count: 0,
            guess_count: 0,
            events: Vec::new(),
        })
    }

    /// Starts a field for the mode at `options.mode`.
    pub fn from_options(seed: Option<u64>, options: Options) -> Result<Self, GameError> {
        Self::new(ModeConfig::from_index(options.mode)?, seed, options)
    }

    /// A field whose mines are already laid out; the first reveal only
    /// starts the clock.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn with_layout(
        mode: ModeConfig,
        layout: &crate::seed::Layout,
        options: Options,
    ) -> Result<Self, GameError> {
        let mut field = Self::new(mode, None, options)?;
        for &pos in layout.keys() {
            field.ensure_in_bounds(pos)?;
        }
        field.board.set_mines(layout);
        Ok(field)
    }

    pub fn perform_action(&mut self, pos: Position, action: Action) -> Result<(), GameError> {
        match action {
            Action::Reveal => self.reveal(pos),
            Action::Flag(rank) => self.flag(pos, rank),
            Action::Guess => self.guess(pos),
            Action::Chord => self.chord(pos),
        }
    }

    /// Plain click. Flagged, revealed and post-game cells are ignored.
    pub fn reveal(&mut self, pos: Position) -> Result<(), GameError> {
        self.ensure_in_bounds(pos)?;
        self.clicked(pos, None);
        Ok(())
    }

    /// Mid-click on a flagged cell in blackjack mode.
    pub fn guess(&mut self, pos: Position) -> Result<(), GameError> {
        self.ensure_in_bounds(pos)?;
        if self.is_over() || !self.mode.special {
            return Ok(());
        }
        let cell = self.board.get_cell(pos)?;
        if cell.is_revealed() || !cell.is_flagged() {
            return Ok(());
        }
        let guess_safe = cell.flag() == cell.mine_value();
        self.guess_count += 1;
        debug!(?pos, guess_safe, "guess");
        self.clicked(pos, Some(guess_safe));
        Ok(())
    }

    pub fn flag(&mut self, pos: Position, rank: Option<u8>) -> Result<(), GameError> {
        self.ensure_in_bounds(pos)?;
        if self.is_over() {
            return Ok(());
        }
        let cell = self.board.get_cell(pos)?;
        if cell.is_revealed() {
            return Ok(());
        }
        let current = cell.flag();
        let next = self.flags.next_flag(current, rank)?;
        if next == current {
            return Ok(());
        }

        if let Some(cell) = self.board.cell_mut(pos) {
            cell.set_flag(next);
        }
        match (current, next) {
            (0, _) => self.mines_remaining -= 1,
            (_, 0) => self.mines_remaining += 1,
            _ => {}
        }
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.unflag(current);
            tracker.flag(next);
        }
        self.events.push(FieldEvent::FlagChanged { pos, flag: next });
        Ok(())
    }

    /// Reveals every concealed neighbour when the accounted-for total around
    /// `pos` equals its clue.
    pub fn chord(&mut self, pos: Position) -> Result<(), GameError> {
        self.ensure_in_bounds(pos)?;
        if self.is_over() {
            return Ok(());
        }
        let cell = self.board.get_cell(pos)?;
        if cell.is_revealed() && cell.is_mine() {
            return Ok(());
        }
        if !cell.is_revealed() || self.board.adjacent_flags(pos) != u32::from(cell.clue()) {
            if self.options.sound {
                self.events.push(FieldEvent::Warning { pos });
            }
            return Ok(());
        }
        for neighbor in self.board.neighbors(pos).to_vec() {
            self.clicked(neighbor, None);
        }
        Ok(())
    }

    fn clicked(&mut self, origin: Position, guess_safe: Option<bool>) {
        if self.is_over() || !self.can_reveal(origin, guess_safe) {
            return;
        }
        if self.state == GameState::Setup {
            self.activate(origin);
        }

        let mut queue = VecDeque::from([(origin, guess_safe)]);
        while let Some((pos, guess)) = queue.pop_front() {
            if self.is_over() {
                break;
            }
            if !self.can_reveal(pos, guess) {
                continue;
            }
            let (is_mine, clue) = self.uncover(pos, guess);
            if !is_mine && clue == 0 {
                queue.extend(
                    self.board
                        .neighbors(pos)
                        .iter()
                        .filter(|&&p| self.can_reveal(p, None))
                        .map(|&p| (p, None)),
                );
            }
            self.settle(pos, guess);
        }
    }

    fn can_reveal(&self, pos: Position, guess_safe: Option<bool>) -> bool {
        match self.board.get_cell(pos) {
            Ok(cell) => !cell.is_revealed() && (!cell.is_flagged() || guess_safe.is_some()),
            Err(_) => false,
        }
    }

    fn activate(&mut self, first: Position) {
        if !self.board.mines_placed() {
            let layout = self.seeds.layout(&self.mode, first);
            self.board.set_mines(&layout);
        }
        let seed = self.seeds.seed().unwrap_or_default();
        info!(
            mode = %self.mode,
            seed,
            explicit = self.seeds.is_explicit(),
            "mines placed"
        );
        self.snapshot = Some(self.options);
        self.state = GameState::Active;
        self.timer.start();
        self.events.push(FieldEvent::MinesPlaced { seed });
    }

    /// Flips the cell face up. Returns whether it is a mine and its clue.
    fn uncover(&mut self, pos: Position, guess_safe: Option<bool>) -> (bool, u8) {
        let clue = self.board.compute_clue(pos);
        let Some(cell) = self.board.cell_mut(pos) else {
            return (false, 0);
        };
        let cleared_flag = cell.reveal(clue);
        let (is_mine, value, view) = (cell.is_mine(), cell.mine_value(), cell.view());

        if cleared_flag != 0 {
            self.mines_remaining += 1;
            if let Some(tracker) = self.tracker.as_mut() {
                tracker.unflag(cleared_flag);
            }
        }
        if is_mine {
            self.mines_remaining -= 1;
            if let Some(tracker) = self.tracker.as_mut() {
                if guess_safe == Some(true) {
                    tracker.lock(value);
                } else {
                    tracker.blow(value);
                }
            }
        }
        trace!(?pos, ?view, "revealed");
        self.events.push(FieldEvent::CellRevealed { pos, view });
        (is_mine, clue)
    }

    fn settle(&mut self, pos: Position, guess_safe: Option<bool>) {
        let value = match self.board.get_cell(pos) {
            Ok(cell) => cell.mine_value(),
            Err(_) => return,
        };
        if value != 0 {
            self.absorb_hit(pos, value, guess_safe);
        } else if guess_safe == Some(false) {
            self.lose(pos);
        } else {
            self.cleared_count += 1;
            if self.cleared_count >= self.goal {
                self.win();
            }
        }
    }

    fn absorb_hit(&mut self, pos: Position, value: u8, guess_safe: Option<bool>) {
        if guess_safe != Some(true) {
            self.hit_count += u32::from(value);
            self.blow_count += 1;
        }
        let direct = guess_safe.is_none();
        let tolerance = self.tolerance();
        if self.hit_count > tolerance.threshold() || (direct && tolerance < HitTolerance::AnyClick)
        {
            self.lose(pos);
        } else if self.hit_count >= WOAH_HITS && self.status != Status::Woah {
            self.set_status(Status::Woah);
        }
    }

    fn tolerance(&self) -> HitTolerance {
        if self.mode.special {
            self.options.allow_hits
        } else {
            HitTolerance::Disallow
        }
    }

    fn win(&mut self) {
        let elapsed = self.timer.stop();
        self.state = GameState::Won;
        info!(mode = %self.mode, ?elapsed, hits = self.hit_count, "field cleared");
        self.set_status(Status::Yeah);
        self.events.push(FieldEvent::Won);
        self.expose(false);
    }

    fn lose(&mut self, at: Position) {
        let elapsed = self.timer.stop();
        self.state = GameState::Lost;
        info!(mode = %self.mode, ?at, ?elapsed, hits = self.hit_count, "field blew up");
        self.set_status(Status::Boom);
        self.events.push(FieldEvent::Lost { at });
        self.expose(true);
    }

    /// Shows every unflagged mine. After a loss, also marks wrong flags.
    fn expose(&mut self, mark_false_flags: bool) {
        let special = self.mode.special;
        for pos in self.board.mines().collect::<Vec<_>>() {
            if let Some(cell) = self.board.cell_mut(pos) {
                if !cell.is_revealed() && !cell.is_flagged() {
                    cell.reveal(0);
                    let view = cell.view();
                    self.events.push(FieldEvent::CellRevealed { pos, view });
                }
            }
        }
        if !mark_false_flags {
            return;
        }
        for pos in self.board.positions().collect::<Vec<_>>() {
            if let Some(cell) = self.board.cell_mut(pos) {
                let wrong = !cell.is_mine() || (special && cell.flag() != cell.mine_value());
                if !cell.is_revealed() && cell.is_flagged() && wrong {
                    cell.mark_false_flag();
                    self.events.push(FieldEvent::FalseFlag { pos });
                }
            }
        }
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
        self.events.push(FieldEvent::StatusChanged(status));
    }

    fn ensure_in_bounds(&self, pos: Position) -> Result<(), GameError> {
        if self.board.is_within_bounds(pos) {
            Ok(())
        } else {
            Err(GameError::OutOfBounds(pos))
        }
    }

    /// Summary for the mouseover hint bar, when that aid is on.
    pub fn hint(&self, pos: Position) -> Option<Hint> {
        if self.is_over() || !self.options.mouseover || !self.mode.special {
            return None;
        }
        let cell = self.board.get_cell(pos).ok()?;
        if !cell.is_revealed() || cell.is_mine() {
            return None;
        }
        let total = u32::from(cell.clue());
        let flags_hits = self.board.adjacent_flags(pos);
        Some(Hint {
            total,
            flags_hits,
            remaining: i64::from(total) - i64::from(flags_hits),
        })
    }

    /// The rank tracker, when that aid is on.
    pub fn tracker(&self) -> Option<&RankTracker> {
        self.tracker.as_ref().filter(|_| self.options.tracker)
    }

    /// Applies changed options. The hit threshold follows immediately. Once
    /// mines are placed, the record keeps the most lenient aids seen so far.
    pub fn set_options(&mut self, options: Options) {
        self.options = options;
        if let Some(snapshot) = self.snapshot.as_mut() {
            snapshot.mouseover |= options.mouseover;
            snapshot.tracker |= options.tracker;
            snapshot.allow_hits = snapshot.allow_hits.max(options.allow_hits);
        }
    }

    /// Highscore entry for a won game that was not played from a chosen seed.
    pub fn record(&self) -> Option<Record> {
        if self.state != GameState::Won || self.seeds.is_explicit() {
            return None;
        }
        let elapsed = self.timer.elapsed();
        let snapshot = self.snapshot.unwrap_or(self.options);
        let mut record = Record::new(elapsed, self.seeds.seed().unwrap_or_default());
        if self.mode.special {
            record.guesses = self.guess_count;
            record.hits = self.hit_count;
            record.blows = self.blow_count;
            record.opt_mouseover = snapshot.mouseover;
            record.opt_tracker = snapshot.tracker;
            record.opt_allow_hits = snapshot.allow_hits;
        }
        Some(record)
    }

    /// Queued notifications since the last call.
    pub fn drain_events(&mut self) -> Vec<FieldEvent> {
        std::mem::take(&mut self.events)
    }

    /// Timer display while the game runs.
    pub fn tick(&self) -> Option<String> {
        self.timer.tick_at(std::time::Instant::now())
    }

    pub fn get_cell(&self, pos: Position) -> Result<&crate::Cell, GameError> {
        self.board.get_cell(pos)
    }

    pub fn view(&self, pos: Position) -> Result<CellView, GameError> {
        self.board.get_cell(pos).map(|cell| cell.view())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn mode(&self) -> &ModeConfig {
        &self.mode
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        matches!(self.state, GameState::Won | GameState::Lost)
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn cleared_count(&self) -> u32 {
        self.cleared_count
    }

    pub fn goal(&self) -> u32 {
        self.goal
    }

    /// Mines not yet flagged or exposed. Negative when over-flagged.
    pub fn mines_remaining(&self) -> i64 {
        self.mines_remaining
    }

    pub fn hit_count(&self) -> u32 {
        self.hit_count
    }

    pub fn hit_threshold(&self) -> u32 {
        self.tolerance().threshold()
    }

    pub fn blow_count(&self) -> u32 {
        self.blow_count
    }

    pub fn guess_count(&self) -> u32 {
        self.guess_count
    }

    pub fn seed(&self) -> Option<u64> {
        self.seeds.seed()
    }

    pub fn used_seed(&self) -> bool {
        self.seeds.is_explicit()
    }

    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.board.dimensions()
    }
}

impl Drop for Field {
    fn drop(&mut self) {
        if self.timer.is_running() {
            debug!(mode = %self.mode, "abandoning running field");
            self.timer.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::LayoutBuilder;
    use crate::MODES;
    use proptest::prelude::*;

    fn pos(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    fn revealed_count(field: &Field) -> usize {
        field
            .board()
            .positions()
            .filter(|&p| field.get_cell(p).unwrap().is_revealed())
            .count()
    }

    #[test]
    fn test_first_reveal_places_mines_and_is_safe() {
        let mut field = Field::new(MODES[0], Some(42), Options::default()).unwrap();
        assert_eq!(field.state(), GameState::Setup);
        assert!(!field.board().mines_placed());

        field.reveal(pos(0, 0)).unwrap();

        assert!(field.board().mines_placed());
        assert_eq!(field.board().mines().count(), 10);
        assert!(!field.get_cell(pos(0, 0)).unwrap().is_mine());
        assert_ne!(field.state(), GameState::Lost);
        assert!(field
            .drain_events()
            .contains(&FieldEvent::MinesPlaced { seed: 42 }));
    }

    #[test]
    fn test_flood_fill_stops_at_clues() {
        // Mine in the far corner: everything else opens from (0, 0).
        let mut field = LayoutBuilder::standard(4, 4).mine(3, 3).build();
        field.reveal(pos(0, 0)).unwrap();

        assert_eq!(field.cleared_count(), 15);
        assert_eq!(field.state(), GameState::Won);
        assert_eq!(field.view(pos(2, 2)).unwrap(), CellView::Clue(1));
        assert_eq!(field.view(pos(0, 0)).unwrap(), CellView::Clue(0));
    }

    #[test]
    fn test_flood_fill_reveals_zero_component_and_border() {
        // A wall of mines on column 2 splits the board.
        let mut field = LayoutBuilder::standard(5, 3)
            .mine(2, 0)
            .mine(2, 1)
            .mine(2, 2)
            .build();
        field.reveal(pos(0, 1)).unwrap();

        for y in 0..3 {
            assert!(field.get_cell(pos(0, y)).unwrap().is_revealed());
            assert!(field.get_cell(pos(1, y)).unwrap().is_revealed());
            assert!(!field.get_cell(pos(3, y)).unwrap().is_revealed());
            assert!(!field.get_cell(pos(4, y)).unwrap().is_revealed());
        }
        assert_eq!(field.cleared_count(), 6);

        // Revealing again changes nothing.
        field.reveal(pos(0, 1)).unwrap();
        field.reveal(pos(1, 1)).unwrap();
        assert_eq!(field.cleared_count(), 6);
        assert_eq!(revealed_count(&field), 6);
    }

    #[test]
    fn test_standard_mine_loses_and_exposes() {
        let mut field = LayoutBuilder::standard(3, 3)
            .mine(0, 0)
            .mine(2, 2)
            .build();
        field.flag(pos(1, 0), None).unwrap();
        field.reveal(pos(1, 1)).unwrap();
        field.reveal(pos(0, 0)).unwrap();

        assert_eq!(field.state(), GameState::Lost);
        assert_eq!(field.status(), Status::Boom);
        assert_eq!(field.view(pos(2, 2)).unwrap(), CellView::Mine(1));
        assert_eq!(field.view(pos(1, 0)).unwrap(), CellView::FalseFlag(1));

        let before = field.cleared_count();
        field.reveal(pos(2, 0)).unwrap();
        field.flag(pos(2, 1), None).unwrap();
        assert_eq!(field.cleared_count(), before);
        assert!(!field.get_cell(pos(2, 1)).unwrap().is_flagged());
    }

    #[test]
    fn test_flagged_cell_ignores_plain_click() {
        let mut field = LayoutBuilder::standard(3, 3).mine(0, 0).build();
        field.flag(pos(2, 2), None).unwrap();
        field.reveal(pos(2, 2)).unwrap();
        assert!(!field.get_cell(pos(2, 2)).unwrap().is_revealed());
        assert_eq!(field.state(), GameState::Setup);
    }

    #[test]
    fn test_remaining_counter() {
        let mut field = LayoutBuilder::standard(3, 3).mine(0, 0).build();
        assert_eq!(field.mines_remaining(), 1);
        field.flag(pos(0, 0), None).unwrap();
        field.flag(pos(1, 0), None).unwrap();
        assert_eq!(field.mines_remaining(), -1);
        field.flag(pos(1, 0), None).unwrap();
        assert_eq!(field.mines_remaining(), 0);
    }

    #[test]
    fn test_chord_reveals_when_flags_match() {
        let mut field = LayoutBuilder::standard(3, 3).mine(0, 0).build();
        field.reveal(pos(1, 1)).unwrap();
        field.flag(pos(0, 0), None).unwrap();
        field.chord(pos(1, 1)).unwrap();

        assert_eq!(field.cleared_count(), 8);
        assert_eq!(field.state(), GameState::Won);
    }

    #[test]
    fn test_chord_mismatch_changes_nothing() {
        let options = Options {
            sound: true,
            ..Options::default()
        };
        let mut field = LayoutBuilder::standard(3, 3)
            .mine(0, 0)
            .mine(2, 0)
            .options(options)
            .build();
        field.reveal(pos(1, 1)).unwrap();
        field.flag(pos(0, 0), None).unwrap();
        field.drain_events();

        let views: Vec<_> = field.board().positions().map(|p| field.view(p).unwrap()).collect();
        field.chord(pos(1, 1)).unwrap();
        let after: Vec<_> = field.board().positions().map(|p| field.view(p).unwrap()).collect();

        assert_eq!(views, after);
        assert_eq!(field.drain_events(), vec![FieldEvent::Warning { pos: pos(1, 1) }]);
    }

    #[test]
    fn test_chord_warning_is_silenced_without_sound() {
        let mut field = LayoutBuilder::standard(3, 3).mine(0, 0).build();
        field.reveal(pos(1, 1)).unwrap();
        field.drain_events();
        field.chord(pos(1, 1)).unwrap();
        assert!(field.drain_events().is_empty());
    }

    #[test]
    fn test_wrong_flag_chord_hits_mine() {
        let mut field = LayoutBuilder::standard(3, 3).mine(0, 0).build();
        field.reveal(pos(1, 1)).unwrap();
        field.flag(pos(1, 0), None).unwrap();
        field.chord(pos(1, 1)).unwrap();
        assert_eq!(field.state(), GameState::Lost);
    }

    #[test]
    fn test_blackjack_flag_cycle_is_idempotent() {
        let mut field = LayoutBuilder::blackjack(4, 4).card(0, 0, 5).build();
        let before = field.mines_remaining();
        for _ in 0..11 {
            field.flag(pos(2, 2), None).unwrap();
        }
        assert_eq!(field.get_cell(pos(2, 2)).unwrap().flag(), 0);
        assert_eq!(field.mines_remaining(), before);
    }

    #[test]
    fn test_rank_changes_consume_one_unit() {
        let mut field = LayoutBuilder::blackjack(4, 4).card(0, 0, 5).build();
        field.flag(pos(2, 2), Some(3)).unwrap();
        field.flag(pos(2, 2), Some(9)).unwrap();
        assert_eq!(field.mines_remaining(), 0);

        let tracker = field.tracker().unwrap();
        assert_eq!(tracker.entry(3).unwrap().flagged, 0);
        assert_eq!(tracker.entry(9).unwrap().flagged, 1);
        assert!(matches!(
            field.flag(pos(2, 2), Some(11)),
            Err(GameError::InvalidRank(11))
        ));
    }

    #[test]
    fn test_correct_guess_is_free() {
        let mut field = LayoutBuilder::blackjack(4, 4)
            .card(0, 0, 7)
            .card(3, 0, 2)
            .tolerance(HitTolerance::Disallow)
            .build();
        field.reveal(pos(0, 3)).unwrap();
        assert_eq!(field.cleared_count(), 12);
        field.flag(pos(0, 0), Some(7)).unwrap();
        field.guess(pos(0, 0)).unwrap();

        assert_eq!(field.view(pos(0, 0)).unwrap(), CellView::Mine(7));
        assert_eq!(field.hit_count(), 0);
        assert_eq!(field.guess_count(), 1);
        assert_eq!(field.mines_remaining(), 1);
        assert_eq!(field.tracker().unwrap().entry(7).unwrap().locked, 1);
        assert_eq!(field.state(), GameState::Active);
    }

    #[test]
    fn test_wrong_guess_on_mine_is_a_hit() {
        let mut field = LayoutBuilder::blackjack(4, 4)
            .card(0, 0, 7)
            .card(3, 0, 2)
            .tolerance(HitTolerance::GuessesOnly)
            .build();
        field.reveal(pos(0, 3)).unwrap();
        field.flag(pos(0, 0), Some(4)).unwrap();
        field.guess(pos(0, 0)).unwrap();

        assert_eq!(field.hit_count(), 7);
        assert_eq!(field.blow_count(), 1);
        assert_eq!(field.state(), GameState::Active);
        assert_eq!(field.tracker().unwrap().entry(7).unwrap().blown, 1);
    }

    #[test]
    fn test_wrong_guess_on_safe_cell_loses() {
        let mut field = LayoutBuilder::blackjack(4, 4)
            .card(0, 0, 7)
            .card(3, 0, 2)
            .build();
        field.flag(pos(0, 2), Some(2)).unwrap();
        field.reveal(pos(0, 3)).unwrap();
        assert!(!field.get_cell(pos(0, 2)).unwrap().is_revealed());

        field.guess(pos(0, 2)).unwrap();
        assert_eq!(field.state(), GameState::Lost);
        assert_eq!(field.guess_count(), 1);
    }

    #[test]
    fn test_guess_needs_flag_and_blackjack() {
        let mut standard = LayoutBuilder::standard(3, 3).mine(0, 0).build();
        standard.flag(pos(0, 0), None).unwrap();
        standard.guess(pos(0, 0)).unwrap();
        assert!(!standard.get_cell(pos(0, 0)).unwrap().is_revealed());

        let mut blackjack = LayoutBuilder::blackjack(3, 3).card(0, 0, 3).build();
        blackjack.guess(pos(0, 0)).unwrap();
        assert_eq!(blackjack.guess_count(), 0);
        assert!(!blackjack.get_cell(pos(0, 0)).unwrap().is_revealed());
    }

    #[test]
    fn test_direct_hits_need_any_click_tolerance() {
        let build = |tolerance| {
            LayoutBuilder::blackjack(4, 4)
                .card(0, 0, 10)
                .card(3, 0, 10)
                .card(0, 3, 2)
                .tolerance(tolerance)
                .build()
        };

        let mut strict = build(HitTolerance::GuessesOnly);
        strict.reveal(pos(0, 0)).unwrap();
        assert_eq!(strict.state(), GameState::Lost);

        let mut lenient = build(HitTolerance::AnyClick);
        lenient.reveal(pos(0, 0)).unwrap();
        assert_eq!(lenient.state(), GameState::Active);
        lenient.reveal(pos(3, 0)).unwrap();
        assert_eq!(lenient.hit_count(), 20);
        assert_eq!(lenient.status(), Status::Woah);
        assert_eq!(lenient.state(), GameState::Active);
        lenient.reveal(pos(0, 3)).unwrap();
        assert_eq!(lenient.hit_count(), 22);
        assert_eq!(lenient.state(), GameState::Lost);
    }

    #[test]
    fn test_exactly_twenty_one_survives() {
        let mut field = LayoutBuilder::blackjack(5, 5)
            .card(0, 0, 10)
            .card(4, 0, 10)
            .card(0, 4, 1)
            .tolerance(HitTolerance::AnyClick)
            .build();
        for p in [pos(0, 0), pos(4, 0), pos(0, 4)] {
            field.reveal(p).unwrap();
        }
        assert_eq!(field.hit_count(), 21);
        assert_ne!(field.state(), GameState::Lost);
        assert_eq!(field.mines_remaining(), 0);
    }

    #[test]
    fn test_hint() {
        let mut field = LayoutBuilder::blackjack(3, 3)
            .card(0, 0, 4)
            .card(2, 0, 6)
            .build();
        field.reveal(pos(1, 1)).unwrap();
        field.flag(pos(0, 0), Some(4)).unwrap();

        let hint = field.hint(pos(1, 1)).unwrap();
        assert_eq!(hint.total, 10);
        assert_eq!(hint.flags_hits, 4);
        assert_eq!(hint.remaining, 6);
        assert_eq!(field.hint(pos(0, 0)), None);

        field.set_options(Options {
            mouseover: false,
            ..Options::default()
        });
        assert_eq!(field.hint(pos(1, 1)), None);
    }

    #[test]
    fn test_record_only_for_unseeded_wins() {
        let mut field = LayoutBuilder::standard(3, 3).mine(0, 0).build();
        assert!(field.record().is_none());
        field.reveal(pos(2, 2)).unwrap();
        assert_eq!(field.state(), GameState::Won);
        let record = field.record().unwrap();
        assert_eq!((record.guesses, record.hits, record.blows), (0, 0, 0));

        let mut seeded = Field::new(MODES[0], Some(42), Options::default()).unwrap();
        seeded.reveal(pos(0, 0)).unwrap();
        assert!(seeded.used_seed());
        assert!(seeded.record().is_none());
    }

    #[test]
    fn test_record_keeps_option_snapshot() {
        let mut field = LayoutBuilder::blackjack(3, 3)
            .card(0, 0, 5)
            .tolerance(HitTolerance::AnyClick)
            .build();
        field.reveal(pos(0, 0)).unwrap();
        field.set_options(Options::default());
        field.reveal(pos(2, 2)).unwrap();
        assert_eq!(field.state(), GameState::Won);

        let record = field.record().unwrap();
        assert_eq!(record.hits, 5);
        assert_eq!(record.blows, 1);
        assert_eq!(record.opt_allow_hits, HitTolerance::AnyClick);
    }

    #[test]
    fn test_record_escalates_aids_enabled_mid_game() {
        let quiet = Options {
            mouseover: false,
            tracker: false,
            allow_hits: HitTolerance::Disallow,
            ..Options::default()
        };
        let mut field = LayoutBuilder::blackjack(3, 3)
            .card(0, 0, 5)
            .options(quiet)
            .build();
        field.reveal(pos(1, 1)).unwrap();
        field.set_options(Options {
            mouseover: true,
            tracker: true,
            allow_hits: HitTolerance::AnyClick,
            ..quiet
        });
        field.reveal(pos(0, 0)).unwrap();
        field.set_options(quiet);
        field.reveal(pos(2, 2)).unwrap();
        assert_eq!(field.state(), GameState::Won);

        let record = field.record().unwrap();
        assert_eq!(record.hits, 5);
        assert!(record.opt_mouseover);
        assert!(record.opt_tracker);
        assert_eq!(record.opt_allow_hits, HitTolerance::AnyClick);
        assert!(record.rating(field.mode()) < 0.6);
    }

    #[test]
    fn test_wrong_rank_is_marked_only_on_loss() {
        let build = || {
            LayoutBuilder::blackjack(3, 3)
                .card(0, 0, 7)
                .card(2, 0, 3)
                .tolerance(HitTolerance::GuessesOnly)
                .build()
        };

        let mut won = build();
        won.flag(pos(0, 0), Some(4)).unwrap();
        won.reveal(pos(0, 2)).unwrap();
        won.reveal(pos(1, 0)).unwrap();
        assert_eq!(won.state(), GameState::Won);
        assert_eq!(won.view(pos(0, 0)).unwrap(), CellView::Flagged(4));
        assert!(!won
            .drain_events()
            .iter()
            .any(|e| matches!(e, FieldEvent::FalseFlag { .. })));

        let mut lost = build();
        lost.flag(pos(0, 0), Some(4)).unwrap();
        lost.reveal(pos(0, 2)).unwrap();
        lost.reveal(pos(2, 0)).unwrap();
        assert_eq!(lost.state(), GameState::Lost);
        assert_eq!(lost.view(pos(0, 0)).unwrap(), CellView::FalseFlag(4));
    }

    #[test]
    fn test_blackjack_chord_weighs_flag_ranks() {
        let mut field = LayoutBuilder::blackjack(3, 3)
            .card(0, 0, 7)
            .card(2, 0, 3)
            .build();
        field.reveal(pos(1, 1)).unwrap();
        assert_eq!(field.view(pos(1, 1)).unwrap(), CellView::Clue(10));
        field.flag(pos(0, 0), Some(7)).unwrap();
        field.flag(pos(2, 0), Some(3)).unwrap();
        field.chord(pos(1, 1)).unwrap();

        assert_eq!(field.cleared_count(), 7);
        assert_eq!(field.hit_count(), 0);
        assert_eq!(field.state(), GameState::Won);
    }

    #[test]
    fn test_blackjack_chord_with_wrong_rank_changes_nothing() {
        let mut field = LayoutBuilder::blackjack(3, 3)
            .card(0, 0, 7)
            .card(2, 0, 3)
            .build();
        field.reveal(pos(1, 1)).unwrap();
        field.flag(pos(0, 0), Some(7)).unwrap();
        field.flag(pos(2, 0), Some(2)).unwrap();

        let views: Vec<_> = field.board().positions().map(|p| field.view(p).unwrap()).collect();
        field.chord(pos(1, 1)).unwrap();
        let after: Vec<_> = field.board().positions().map(|p| field.view(p).unwrap()).collect();

        assert_eq!(views, after);
        assert_eq!(field.cleared_count(), 1);
        assert_eq!(field.state(), GameState::Active);
    }

    #[test]
    fn test_blackjack_chord_counts_absorbed_mines() {
        let mut field = LayoutBuilder::blackjack(3, 3)
            .card(0, 0, 7)
            .card(2, 0, 3)
            .tolerance(HitTolerance::AnyClick)
            .build();
        field.reveal(pos(1, 1)).unwrap();
        field.reveal(pos(2, 0)).unwrap();
        assert_eq!(field.hit_count(), 3);
        assert_eq!(field.state(), GameState::Active);

        field.flag(pos(0, 0), Some(7)).unwrap();
        field.chord(pos(1, 1)).unwrap();

        assert_eq!(field.cleared_count(), 7);
        assert_eq!(field.hit_count(), 3);
        assert_eq!(field.state(), GameState::Won);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut field = Field::new(MODES[0], None, Options::default()).unwrap();
        assert!(matches!(
            field.reveal(pos(8, 0)),
            Err(GameError::OutOfBounds(_))
        ));
        assert!(field.flag(pos(-1, 0), None).is_err());
        assert!(field.chord(pos(0, 8)).is_err());
    }

    proptest! {
        #[test]
        fn prop_cleared_count_tracks_safe_reveals(seed in any::<u64>(), clicks in proptest::collection::vec((0i32..8, 0i32..8), 1..40)) {
            let options = Options { allow_hits: HitTolerance::AnyClick, ..Options::default() };
            let mut field = Field::new(MODES[0], Some(seed), options).unwrap();
            let mut last = 0;
            for (x, y) in clicks {
                field.reveal(pos(x, y)).unwrap();
                let safe_revealed = field
                    .board()
                    .positions()
                    .filter(|&p| {
                        let cell = field.get_cell(p).unwrap();
                        cell.is_revealed() && !cell.is_mine()
                    })
                    .count() as u32;
                prop_assert_eq!(field.cleared_count(), safe_revealed);
                prop_assert!(field.cleared_count() >= last);
                last = field.cleared_count();
                prop_assert_eq!(field.state() == GameState::Won, field.cleared_count() == field.goal());
            }
        }
    }
}
