//! Fields with hand-placed mines.

use crate::options::HitTolerance;
use crate::seed::Layout;
use crate::{Field, ModeConfig, Options, Position};

/// Builds a `Field` with a fixed layout instead of a seeded one.
#[derive(Debug, Clone)]
pub struct LayoutBuilder {
    width: u32,
    height: u32,
    special: bool,
    layout: Layout,
    options: Options,
}

impl LayoutBuilder {
    pub fn standard(width: u32, height: u32) -> Self {
        Self::new(width, height, false)
    }

    pub fn blackjack(width: u32, height: u32) -> Self {
        Self::new(width, height, true)
    }

    fn new(width: u32, height: u32, special: bool) -> Self {
        Self {
            width,
            height,
            special,
            layout: Layout::new(),
            options: Options::default(),
        }
    }

    pub fn mine(self, x: i32, y: i32) -> Self {
        self.card(x, y, 1)
    }

    pub fn card(mut self, x: i32, y: i32, value: u8) -> Self {
        self.layout.insert(Position::new(x, y), value);
        self
    }

    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn tolerance(mut self, allow_hits: HitTolerance) -> Self {
        self.options.allow_hits = allow_hits;
        self
    }

    pub fn mode(&self) -> ModeConfig {
        ModeConfig {
            name: "Layout",
            width: self.width,
            height: self.height,
            amount: self.layout.len() as u32,
            special: self.special,
        }
    }

    /// Panics on a layout that does not fit the board.
    pub fn build(self) -> Field {
        match Field::with_layout(self.mode(), &self.layout, self.options) {
            Ok(field) => field,
            Err(err) => panic!("invalid test layout: {err}"),
        }
    }
}
