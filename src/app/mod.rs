//! Application layer: the thread-safe engine facade, its config and wire DTOs.

pub mod config;
pub mod dto;
pub mod engine;

pub use config::EngineConfig;
pub use engine::MatchEngine;
