use crate::{CellView, Position};

/// The face on the status button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Okay,
    /// Close to busting.
    Woah,
    Boom,
    Yeah,
}

/// State changes a renderer can subscribe to through `Field::drain_events`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEvent {
    MinesPlaced { seed: u64 },
    CellRevealed { pos: Position, view: CellView },
    FlagChanged { pos: Position, flag: u8 },
    FalseFlag { pos: Position },
    /// A chord was refused; only emitted when sound is enabled.
    Warning { pos: Position },
    StatusChanged(Status),
    Won,
    Lost { at: Position },
}
