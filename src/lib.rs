pub mod board;
pub mod cell;
pub mod error;
pub mod event;
pub mod flag;
pub mod game;
pub mod mode;
pub mod options;
pub mod position;
pub mod record;
pub mod seed;
pub mod timer;
pub mod tracker;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use board::Board;
pub use cell::{Cell, CellView};
pub use error::{GameError, RecordError};
pub use event::{FieldEvent, Status};
pub use flag::{FlagHandler, RankedFlags, StandardFlags};
pub use game::{Action, Field, GameState, Hint};
pub use mode::{ModeConfig, MODES};
pub use options::{HitTolerance, Options};
pub use position::Position;
pub use record::{Record, RecordStore};
pub use seed::SeedManager;
pub use timer::Timer;
pub use tracker::RankTracker;
