pub mod actor;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod game;
pub mod grid;
pub mod pellets;
pub mod position_cache;
pub mod rng;
pub mod scheduler;
pub mod types;
