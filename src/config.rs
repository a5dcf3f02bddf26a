use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::constants::{
    CLASSIC_AI_JSON, CLASSIC_LEVEL_JSON, DEFAULT_CELL_SIZE, DEFAULT_CLYDE_RELEASE_FRACTION,
    DEFAULT_INKY_RELEASE_DOTS,
};
use crate::error::ConfigError;
use crate::grid::Grid;
use crate::types::{CellIndex, DotType, GhostId, GhostState, MapCellType, MoveDirection};

#[derive(Clone, Debug)]
pub struct ParsedTiles {
    pub rows: u16,
    pub columns: u16,
    pub cells: Vec<MapCellType>,
    pub dots: Vec<(CellIndex, DotType)>,
}

/// `#` wall, `-` door, ` ` empty, `.` small pellet, `o` power pellet.
pub fn parse_tiles<S: AsRef<str>>(tiles: &[S]) -> Result<ParsedTiles, ConfigError> {
    let Some(first) = tiles.first() else {
        return Err(ConfigError::EmptyMaze);
    };
    let columns = first.as_ref().chars().count();
    if columns == 0 {
        return Err(ConfigError::EmptyMaze);
    }
    if tiles.len() > u16::MAX as usize || columns > u16::MAX as usize {
        return Err(ConfigError::InvalidValue {
            field: "tiles",
            reason: "maze is too large".to_string(),
        });
    }

    let mut cells = Vec::with_capacity(tiles.len() * columns);
    let mut dots = Vec::new();
    for (row, line) in tiles.iter().enumerate() {
        let found = line.as_ref().chars().count();
        if found != columns {
            return Err(ConfigError::RaggedRow {
                row,
                expected: columns,
                found,
            });
        }
        for (column, tile) in line.as_ref().chars().enumerate() {
            let cell = match tile {
                '#' => MapCellType::Wall,
                '-' => MapCellType::Door,
                ' ' => MapCellType::Empty,
                '.' | 'o' => {
                    let kind = if tile == 'o' { DotType::Big } else { DotType::Small };
                    dots.push((CellIndex::new(row as u16, column as u16), kind));
                    MapCellType::Empty
                }
                _ => return Err(ConfigError::UnknownTile { tile, row, column }),
            };
            cells.push(cell);
        }
    }

    Ok(ParsedTiles {
        rows: tiles.len() as u16,
        columns: columns as u16,
        cells,
        dots,
    })
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ActorSetup {
    #[serde(rename = "startCell")]
    pub start_cell: CellIndex,
    #[serde(rename = "startDirection")]
    pub start_direction: MoveDirection,
    pub speed: f32,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct GhostSetup {
    #[serde(rename = "startCell")]
    pub start_cell: CellIndex,
    #[serde(rename = "startDirection")]
    pub start_direction: MoveDirection,
    pub speed: f32,
    #[serde(rename = "startState")]
    pub start_state: GhostState,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LevelConfig {
    #[serde(rename = "cellSize", default = "default_cell_size")]
    pub cell_size: u16,
    pub tiles: Vec<String>,
    #[serde(rename = "leftTunnelExit")]
    pub left_tunnel_exit: CellIndex,
    #[serde(rename = "rightTunnelExit")]
    pub right_tunnel_exit: CellIndex,
    pub pacman: ActorSetup,
}

fn default_cell_size() -> u16 {
    DEFAULT_CELL_SIZE
}

impl LevelConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn classic() -> Result<Self, ConfigError> {
        Self::from_json(CLASSIC_LEVEL_JSON)
    }

    pub fn build_grid(&self) -> Result<Grid, ConfigError> {
        let grid = Grid::from_tiles(
            &self.tiles,
            self.cell_size,
            self.left_tunnel_exit,
            self.right_tunnel_exit,
        )?;
        grid.require_empty("pacman start cell", self.pacman.start_cell)?;
        validate_speed("pacman.speed", self.pacman.speed)?;
        Ok(grid)
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct PerGhost<T> {
    pub blinky: T,
    pub pinky: T,
    pub inky: T,
    pub clyde: T,
}

impl<T: Copy> PerGhost<T> {
    pub fn get(&self, id: GhostId) -> T {
        match id {
            GhostId::Blinky => self.blinky,
            GhostId::Pinky => self.pinky,
            GhostId::Inky => self.inky,
            GhostId::Clyde => self.clyde,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "(CellIndex, MoveDirection)")]
pub struct DirectionDiscard {
    pub cell: CellIndex,
    pub direction: MoveDirection,
}

impl From<(CellIndex, MoveDirection)> for DirectionDiscard {
    fn from((cell, direction): (CellIndex, MoveDirection)) -> Self {
        Self { cell, direction }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AiInfo {
    #[serde(rename = "scatterTargets")]
    pub scatter_targets: PerGhost<CellIndex>,
    #[serde(rename = "scatterDuration")]
    pub scatter_duration: u64,
    #[serde(rename = "scatterInterval")]
    pub scatter_interval: u64,
    #[serde(rename = "frightDuration")]
    pub fright_duration: u64,
    #[serde(rename = "directionDiscard", default)]
    pub direction_discard: Vec<DirectionDiscard>,
    #[serde(rename = "houseExit")]
    pub house_exit: CellIndex,
    #[serde(rename = "inkyReleaseDots", default = "default_inky_release_dots")]
    pub inky_release_dots: usize,
    #[serde(rename = "clydeReleaseFraction", default = "default_clyde_release_fraction")]
    pub clyde_release_fraction: f32,
    pub ghosts: PerGhost<GhostSetup>,
}

fn default_inky_release_dots() -> usize {
    DEFAULT_INKY_RELEASE_DOTS
}

fn default_clyde_release_fraction() -> f32 {
    DEFAULT_CLYDE_RELEASE_FRACTION
}

impl AiInfo {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn classic() -> Result<Self, ConfigError> {
        Self::from_json(CLASSIC_AI_JSON)
    }

    pub fn is_discarded(&self, cell: CellIndex, direction: MoveDirection) -> bool {
        self.direction_discard
            .iter()
            .any(|discard| discard.cell == cell && discard.direction == direction)
    }

    pub fn validate(&self, grid: &Grid) -> Result<(), ConfigError> {
        for (field, value) in [
            ("scatterDuration", self.scatter_duration),
            ("scatterInterval", self.scatter_interval),
            ("frightDuration", self.fright_duration),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "duration must be positive".to_string(),
                });
            }
        }
        if self.scatter_duration >= self.scatter_interval {
            return Err(ConfigError::InvalidValue {
                field: "scatterDuration",
                reason: format!(
                    "{} ms must be shorter than scatterInterval {} ms",
                    self.scatter_duration, self.scatter_interval
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.clyde_release_fraction) {
            return Err(ConfigError::InvalidValue {
                field: "clydeReleaseFraction",
                reason: format!("{} is outside [0, 1]", self.clyde_release_fraction),
            });
        }
        grid.require_empty("house exit", self.house_exit)?;
        for discard in &self.direction_discard {
            if !grid.contains(discard.cell) {
                return Err(ConfigError::CellOutOfRange {
                    what: "direction discard cell",
                    cell: discard.cell,
                });
            }
            if discard.direction == MoveDirection::None {
                return Err(ConfigError::InvalidValue {
                    field: "directionDiscard",
                    reason: format!("cell {:?} discards no direction", discard.cell),
                });
            }
        }
        for id in GhostId::ALL {
            let setup = self.ghosts.get(id);
            if !grid.contains(setup.start_cell) {
                return Err(ConfigError::CellOutOfRange {
                    what: "ghost start cell",
                    cell: setup.start_cell,
                });
            }
            if grid.get_cell(setup.start_cell) == Ok(MapCellType::Wall) {
                return Err(ConfigError::CellBlocked {
                    what: "ghost start cell",
                    cell: setup.start_cell,
                });
            }
            validate_speed("ghosts.speed", setup.speed)?;
            if setup.start_state == GhostState::Frightened {
                return Err(ConfigError::InvalidValue {
                    field: "ghosts.startState",
                    reason: format!("{} cannot start frightened", id.name()),
                });
            }
            self.validate_house_route(id, &setup, grid)?;
        }
        Ok(())
    }

    fn validate_house_route(&self, id: GhostId, setup: &GhostSetup, grid: &Grid) -> Result<(), ConfigError> {
        let starts: Vec<CellIndex> = match setup.start_state {
            GhostState::Wait => {
                let top = grid.find_max_available_cell(setup.start_cell, MoveDirection::Up);
                let bottom = grid.find_max_available_cell(setup.start_cell, MoveDirection::Down);
                if top == bottom {
                    return Err(ConfigError::InvalidValue {
                        field: "ghosts.startCell",
                        reason: format!("{} has no room to wait at {:?}", id.name(), setup.start_cell),
                    });
                }
                (top.row..=bottom.row)
                    .map(|row| CellIndex::new(row, setup.start_cell.column))
                    .collect()
            }
            GhostState::LeaveHouse => vec![setup.start_cell],
            _ => return Ok(()),
        };
        for start in starts {
            if !reaches_house_exit(grid, start, self.house_exit) {
                return Err(ConfigError::InvalidValue {
                    field: "houseExit",
                    reason: format!("{} cannot leave the house from {start:?}", id.name()),
                });
            }
        }
        Ok(())
    }
}

fn reaches_house_exit(grid: &Grid, mut cell: CellIndex, exit: CellIndex) -> bool {
    let limit = grid.rows() as usize * grid.columns() as usize;
    for _ in 0..=limit {
        if cell == exit {
            return true;
        }
        match grid.step_toward_exit(cell, exit) {
            Some((_, next)) => cell = next,
            None => return false,
        }
    }
    false
}

fn validate_speed(field: &'static str, speed: f32) -> Result<(), ConfigError> {
    if speed.is_finite() && speed > 0.0 {
        return Ok(());
    }
    Err(ConfigError::InvalidValue {
        field,
        reason: format!("speed {speed} must be positive"),
    })
}
