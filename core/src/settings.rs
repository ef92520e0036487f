use {
    ad_gate::GateSettings,
    bevy::prelude::*,
    levels::LevelSettings,
    progress::ProgressSettings,
    serde::Deserialize,
    std::{fs, io::ErrorKind, path::Path},
};

pub const SETTINGS_PATH: &str = "assets/settings.ron";

/// Tunables read once at startup. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    pub gate: GateSettings,
    pub progress: ProgressSettings,
    pub levels: LevelSettings,
}

impl SettingsFile {
    pub fn from_ron(src: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(src)
    }

    /// Reads `path`, falling back to defaults when it is missing or invalid.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let src = match fs::read_to_string(path) {
            Ok(src) => src,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No settings file, using defaults");
                return Self::default();
            }
            Err(e) => {
                warn!(path = %path.display(), "Failed to read settings, using defaults: {}", e);
                return Self::default();
            }
        };

        match Self::from_ron(&src) {
            Ok(settings) => {
                info!(path = %path.display(), "Settings loaded");
                settings
            }
            Err(e) => {
                warn!(path = %path.display(), "Invalid settings, using defaults: {}", e);
                Self::default()
            }
        }
    }

    pub fn insert_into(self, app: &mut App) {
        app.insert_resource(self.gate)
            .insert_resource(self.progress)
            .insert_resource(self.levels);
    }
}
