//! Loads the resource catalog and meal configuration from RON, TOML or JSON
//! data files.

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, GameData, load_game_data};
