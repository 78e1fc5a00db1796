mod shared;
mod registry;
mod animate;
mod input;
mod town_map;
mod overworld;
mod audio;
mod save;
mod data;

use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use shared::*;

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Embervale".into(),
                        resolution: WindowResolution::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                        present_mode: PresentMode::AutoVsync,
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        // Game state
        .init_state::<GameState>()
        // Shared resources
        .init_resource::<RegionRegistry>()
        .init_resource::<MapRegistry>()
        .init_resource::<MarkIconRegistry>()
        .init_resource::<GameSwitches>()
        .init_resource::<VisitedMaps>()
        .init_resource::<PlayerLocation>()
        .init_resource::<MarkingStore>()
        .init_resource::<Settings>()
        .init_resource::<PlayerInput>()
        .init_resource::<InputContext>()
        .init_resource::<KeyBindings>()
        // Events (save/load events live in SavePlugin)
        .add_event::<MapScreenClosedEvent>()
        .add_event::<MapCanvasRefreshEvent>()
        .add_event::<PlaySfxEvent>()
        // Domain plugins
        .add_plugins(input::InputPlugin)
        .add_plugins(town_map::TownMapPlugin)
        .add_plugins(overworld::OverworldPlugin)
        .add_plugins(audio::SfxPlugin)
        .add_plugins(save::SavePlugin)
        // Data loading
        .add_plugins(data::DataPlugin)
        // Camera
        .add_systems(Startup, setup_camera)
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
