use thiserror::Error;

use crate::types::CellIndex;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("maze has no tiles")]
    EmptyMaze,

    #[error("maze row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown tile {tile:?} at row {row}, column {column}")]
    UnknownTile { tile: char, row: usize, column: usize },

    #[error("{what} {cell:?} lies outside the maze")]
    CellOutOfRange { what: &'static str, cell: CellIndex },

    #[error("{what} {cell:?} is not an empty cell")]
    CellBlocked { what: &'static str, cell: CellIndex },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("cell {cell:?} is outside the {rows}x{columns} grid")]
    OutOfRange {
        cell: CellIndex,
        rows: u16,
        columns: u16,
    },
}
