use serde::{Deserialize, Serialize, Serializer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "[u16; 2]", into = "[u16; 2]")]
pub struct CellIndex {
    pub row: u16,
    pub column: u16,
}

impl CellIndex {
    pub const fn new(row: u16, column: u16) -> Self {
        Self { row, column }
    }
}

impl From<[u16; 2]> for CellIndex {
    fn from(value: [u16; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<CellIndex> for [u16; 2] {
    fn from(value: CellIndex) -> Self {
        [value.row, value.column]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    #[default]
    None,
    Left,
    Right,
    Up,
    Down,
}

impl MoveDirection {
    /// Enumeration order used for direction selection and tie-breaks.
    pub const TRAVEL: [MoveDirection; 4] = [
        MoveDirection::Left,
        MoveDirection::Right,
        MoveDirection::Up,
        MoveDirection::Down,
    ];

    pub fn back(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::None => Self::None,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MapCellType {
    Empty,
    Wall,
    /// Ghost house gate, passable upward only.
    Door,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapNeighborsInfo {
    pub left: MapCellType,
    pub right: MapCellType,
    pub up: MapCellType,
    pub down: MapCellType,
}

impl MapNeighborsInfo {
    pub fn get(&self, direction: MoveDirection) -> MapCellType {
        match direction {
            MoveDirection::Left => self.left,
            MoveDirection::Right => self.right,
            MoveDirection::Up => self.up,
            MoveDirection::Down => self.down,
            MoveDirection::None => MapCellType::Wall,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostState {
    Wait,
    LeaveHouse,
    Chase,
    Scatter,
    Frightened,
}

impl GhostState {
    pub fn is_in_house(self) -> bool {
        matches!(self, Self::Wait | Self::LeaveHouse)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostId {
    Blinky,
    Pinky,
    Inky,
    Clyde,
}

impl GhostId {
    pub const ALL: [GhostId; 4] = [GhostId::Blinky, GhostId::Pinky, GhostId::Inky, GhostId::Clyde];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Blinky => "blinky",
            Self::Pinky => "pinky",
            Self::Inky => "inky",
            Self::Clyde => "clyde",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActorKey {
    Pacman,
    Ghost(GhostId),
}

impl ActorKey {
    pub fn name(self) -> &'static str {
        match self {
            Self::Pacman => "pacman",
            Self::Ghost(id) => id.name(),
        }
    }
}

impl Serialize for ActorKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Vec2) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DotType {
    Small,
    Big,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    GhostStateChanged {
        ghost: GhostId,
        from: GhostState,
        to: GhostState,
    },
    ScatterStarted,
    ChaseResumed,
    FrightenedStarted,
    FrightenedEnded,
    GhostReleased {
        ghost: GhostId,
    },
    TunnelWrap {
        actor: ActorKey,
        to: CellIndex,
    },
    DotEaten {
        cell: CellIndex,
        kind: DotType,
    },
    LevelCleared,
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostView {
    pub id: GhostId,
    pub state: GhostState,
    pub cell: CellIndex,
    pub dir: MoveDirection,
    #[serde(rename = "targetCell")]
    pub target_cell: CellIndex,
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Debug, Serialize)]
pub struct PacmanView {
    pub cell: CellIndex,
    pub dir: MoveDirection,
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: u64,
    pub pacman: PacmanView,
    pub ghosts: Vec<GhostView>,
    #[serde(rename = "dotsEaten")]
    pub dots_eaten: usize,
    #[serde(rename = "dotsTotal")]
    pub dots_total: usize,
    #[serde(rename = "frightenedActive")]
    pub frightened_active: bool,
    #[serde(rename = "scatterActive")]
    pub scatter_active: bool,
    pub events: Vec<GameEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tunnel_wrap_event_names_the_actor() {
        let event = GameEvent::TunnelWrap {
            actor: ActorKey::Ghost(GhostId::Inky),
            to: CellIndex::new(14, 27),
        };
        assert_eq!(
            serde_json::to_value(&event).expect("event should serialize"),
            serde_json::json!({ "type": "tunnel_wrap", "actor": "inky", "to": [14, 27] })
        );
        assert_eq!(
            serde_json::to_value(ActorKey::Pacman).expect("key should serialize"),
            serde_json::json!("pacman")
        );
    }
}
