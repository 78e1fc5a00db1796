//! One-shot sound effect playback.
//!
//! Lives in its own plugin, added only by main.rs, so headless runs
//! never touch the audio device or asset IO.

use bevy::prelude::*;

use crate::shared::*;

pub struct SfxPlugin;

impl Plugin for SfxPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, handle_play_sfx);
    }
}

/// Maps UI cue IDs to actual audio file paths.
fn sfx_path(sfx: Sfx) -> &'static str {
    match sfx {
        Sfx::Cursor => "audio/sfx/sfx_menu_move1.ogg",
        Sfx::Decision => "audio/sfx/sfx_menu_select1.ogg",
        Sfx::Cancel => "audio/sfx/sfx_menu_back1.ogg",
        Sfx::Buzzer => "audio/sfx/sfx_sounds_error1.ogg",
    }
}

/// Listen for PlaySfxEvent and spawn one-shot audio sources that auto-despawn.
fn handle_play_sfx(
    mut events: EventReader<PlaySfxEvent>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
) {
    for event in events.read() {
        commands.spawn((
            AudioPlayer::new(asset_server.load(sfx_path(event.sfx))),
            PlaybackSettings::DESPAWN,
        ));
    }
}
