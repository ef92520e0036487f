use {
    bevy::prelude::*,
    serde::{Deserialize, Serialize},
};

// --- Asset Definition ---

/// All levels shipped with the game, in play order.
#[derive(Asset, TypePath, Debug, Clone, Default, Deserialize, Serialize)]
pub struct LevelCatalog {
    pub levels: Vec<LevelDefinition>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LevelDefinition {
    /// Scene name, e.g. `Level3`. The save slot is derived from it.
    pub scene: String,
    /// Slot key used when the scene name carries no level number.
    #[serde(default)]
    pub save_key: Option<String>,
    pub batches: BatchLayout,
    /// Ordered drop targets; batches are ranges over this list.
    pub spots: Vec<SpotDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SpotDefinition {
    pub item_id: String,
    #[serde(default)]
    pub sprite_name: String,
}

/// How the ordered target list is cut into batches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum BatchLayout {
    /// `batches` batches of `per_batch` targets each.
    Uniform { batches: usize, per_batch: usize },
    /// Explicit size of every batch, in order.
    Custom(Vec<usize>),
}

impl Default for BatchLayout {
    fn default() -> Self {
        Self::Uniform {
            batches: 3,
            per_batch: 7,
        }
    }
}

impl BatchLayout {
    pub fn sizes(&self) -> Vec<usize> {
        match self {
            Self::Uniform { batches, per_batch } => vec![*per_batch; *batches],
            Self::Custom(sizes) => sizes.clone(),
        }
    }

    /// Number of targets the layout expects the level to have.
    pub fn required_targets(&self) -> usize {
        match self {
            Self::Uniform { batches, per_batch } => batches * per_batch,
            Self::Custom(sizes) => sizes.iter().sum(),
        }
    }
}

// --- Resources ---

/// The level currently being played. Inserted by the level loader before
/// entering `GameState::InLevel`.
#[derive(Resource, Debug, Clone)]
pub struct ActiveLevel {
    pub definition: LevelDefinition,
}

impl ActiveLevel {
    pub fn new(definition: LevelDefinition) -> Self {
        Self { definition }
    }

    pub fn scene(&self) -> &str {
        &self.definition.scene
    }

    /// 1-based level number parsed from the scene name.
    pub fn level_number(&self) -> Option<u32> {
        parse_level_number(&self.definition.scene)
    }
}

/// Parses `Level3`, `Level_3` or `Level 3` into `3`.
pub fn parse_level_number(scene: &str) -> Option<u32> {
    let rest = scene.strip_prefix("Level")?;
    let digits = rest.trim_start_matches(['_', ' ']);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
