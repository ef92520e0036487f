use bevy::prelude::*;

/// Top-level flow of the game. Each variant stands in for an engine scene.
#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameState {
    #[default]
    Loading,
    LevelSelection,
    InLevel,
    LevelComplete, // Ending dialog is up, waiting for the player to pick where to go
}
