pub const TICK_RATE: u32 = 60;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

pub const DEFAULT_CELL_SIZE: u16 = 16;

pub const PINKY_TARGET_OFFSET: u16 = 4;
pub const INKY_TARGET_OFFSET: u16 = 2;
pub const CLYDE_CHASE_DISTANCE: f32 = 8.0;

pub const DEFAULT_INKY_RELEASE_DOTS: usize = 30;
pub const DEFAULT_CLYDE_RELEASE_FRACTION: f32 = 1.0 / 3.0;

pub const FLOAT_EPSILON: f32 = 1e-4;

pub const CLASSIC_LEVEL_JSON: &str = include_str!("../assets/level.json");
pub const CLASSIC_AI_JSON: &str = include_str!("../assets/ai.json");
