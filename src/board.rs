use crate::{seed::Layout, Cell, GameError, Position};
use itertools::iproduct;
use ndarray::Array2;
use std::collections::BTreeSet;

/// The grid of cells. Mines are absent until `set_mines` runs, and fixed
/// afterwards.
#[derive(Debug)]
pub struct Board {
    cells: Array2<Cell>,
    adjacents: Array2<Vec<Position>>,
    mines: BTreeSet<Position>,
    width: u32,
    height: u32,
    mines_count: u32,
}

impl Board {
    pub fn new(width: u32, height: u32, mines_count: u32) -> Result<Self, GameError> {
        if mines_count >= width * height {
            return Err(GameError::TooManyMines {
                width,
                height,
                mines: mines_count,
            });
        }

        let shape = (height as usize, width as usize);
        let adjacents: Array2<Vec<Position>> = Array2::from_shape_fn(shape, |(y, x)| {
            Position::new(x as i32, y as i32)
                .neighbors()
                .filter(|p| p.x >= 0 && p.x < width as i32 && p.y >= 0 && p.y < height as i32)
                .collect()
        });

        Ok(Board {
            cells: Array2::default(shape),
            adjacents,
            mines: BTreeSet::new(),
            width,
            height,
            mines_count,
        })
    }

    fn index(&self, pos: Position) -> Option<[usize; 2]> {
        self.is_within_bounds(pos)
            .then(|| [pos.y as usize, pos.x as usize])
    }

    pub fn is_within_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width as i32 && pos.y >= 0 && pos.y < self.height as i32
    }

    pub fn get_cell(&self, pos: Position) -> Result<&Cell, GameError> {
        self.index(pos)
            .and_then(|idx| self.cells.get(idx))
            .ok_or(GameError::OutOfBounds(pos))
    }

    pub(crate) fn cell_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        let idx = self.index(pos)?;
        self.cells.get_mut(idx)
    }

    /// In-bounds neighbours of `pos`; empty for an out-of-bounds position.
    pub fn neighbors(&self, pos: Position) -> &[Position] {
        self.index(pos)
            .and_then(|idx| self.adjacents.get(idx))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Arms the layout. Ignored once mines have been placed.
    pub(crate) fn set_mines(&mut self, layout: &Layout) -> bool {
        if self.mines_placed() {
            return false;
        }
        for (&pos, &weight) in layout {
            if let Some(cell) = self.cell_mut(pos) {
                cell.arm(weight);
                self.mines.insert(pos);
            }
        }
        true
    }

    pub fn mines_placed(&self) -> bool {
        !self.mines.is_empty()
    }

    /// Mine positions in ascending order.
    pub fn mines(&self) -> impl Iterator<Item = Position> + '_ {
        self.mines.iter().copied()
    }

    /// Sum of neighbouring mine weights; 0 for a mine itself.
    pub fn compute_clue(&self, pos: Position) -> u8 {
        match self.get_cell(pos) {
            Ok(cell) if !cell.is_mine() => self
                .neighbors(pos)
                .iter()
                .filter_map(|&p| self.get_cell(p).ok())
                .map(|c| c.mine_value())
                .sum(),
            _ => 0,
        }
    }

    /// What the player has accounted for around `pos`: flag ranks plus the
    /// values of mines already exposed.
    pub fn adjacent_flags(&self, pos: Position) -> u32 {
        self.neighbors(pos)
            .iter()
            .filter_map(|&p| self.get_cell(p).ok())
            .map(|c| {
                let exposed = if c.is_revealed() { c.mine_value() } else { 0 };
                u32::from(c.flag()) + u32::from(exposed)
            })
            .sum()
    }

    /// All positions, row by row.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        iproduct!(0..self.height as i32, 0..self.width as i32).map(|(y, x)| Position::new(x, y))
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn mines_count(&self) -> u32 {
        self.mines_count
    }
}
