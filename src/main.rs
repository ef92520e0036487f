use {
    bevy::{log::LogPlugin, prelude::*},
    game_core::CorePlugin,
    level_events::LoadLevel,
    levels::LevelPointer,
    states::GameState,
};

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins.set(LogPlugin {
                filter: "error,progress=debug,\
                    batches=debug,\
                    ad_gate=debug,\
                    drop_spots=info,\
                    levels=debug,\
                    prefs=info,\
                    game_core=info"
                    .into(),
                level: bevy::log::Level::TRACE,
                ..Default::default()
            }),
        )
        .add_plugins(CorePlugin)
        .add_systems(Startup, setup_camera)
        .add_systems(OnEnter(GameState::LevelSelection), continue_current_level)
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// No selection screen yet: jump straight into the level the player is on.
fn continue_current_level(mut commands: Commands, pointer: Res<LevelPointer>) {
    commands.trigger(LoadLevel {
        level: pointer.current_level(),
    });
}
