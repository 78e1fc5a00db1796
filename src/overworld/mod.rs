//! Minimal overworld shell around the atlas screen.
//!
//! A full game would put movement, encounters and events here. This
//! build keeps exactly the surface the atlas depends on: the player's
//! current map, switch and visited-map bookkeeping, keys that open the
//! screen in each of its modes, and handling of whatever the screen
//! hands back when it closes.

use bevy::prelude::*;

use crate::shared::*;

/// F5/F9 both target this slot.
const QUICK_SLOT: usize = 0;

pub struct OverworldPlugin;

impl Plugin for OverworldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StatusLine>()
            .add_systems(OnEnter(GameState::Playing), spawn_overworld_hud)
            .add_systems(OnExit(GameState::Playing), despawn_overworld_hud)
            .add_systems(
                Update,
                (
                    track_visited_maps,
                    overworld_controls,
                    handle_map_closed,
                    save_feedback,
                    update_hud,
                )
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// One-line feedback strip at the bottom of the HUD.
#[derive(Resource, Default)]
struct StatusLine(String);

// ─── Systems ────────────────────────────────────────────────────────────

/// Every map the player stands on counts as visited. Fly targets and the
/// region picker both key off this set.
fn track_visited_maps(location: Res<PlayerLocation>, mut visited: ResMut<VisitedMaps>) {
    if !visited.contains(location.map_id) {
        visited.visit(location.map_id);
    }
}

fn overworld_controls(
    mut commands: Commands,
    input: Res<PlayerInput>,
    mut switches: ResMut<GameSwitches>,
    mut next_state: ResMut<NextState<GameState>>,
    mut save_events: EventWriter<SaveRequestEvent>,
    mut load_events: EventWriter<LoadRequestEvent>,
) {
    if input.open_map {
        commands.insert_resource(MapScreenRequest {
            mode: MapMode::Normal,
            region: None,
        });
        next_state.set(GameState::TownMap);
    } else if input.open_wall_map {
        commands.insert_resource(MapScreenRequest {
            mode: MapMode::WallMap,
            region: None,
        });
        next_state.set(GameState::TownMap);
    } else if input.open_fly {
        commands.insert_resource(MapScreenRequest {
            mode: MapMode::Fly,
            region: None,
        });
        next_state.set(GameState::TownMap);
    }

    if input.debug_switch {
        switches.toggle(FERRY_SWITCH);
        info!(
            "Ferry switch now {}",
            if switches.is_on(FERRY_SWITCH) { "on" } else { "off" }
        );
    }
    if input.quicksave {
        save_events.send(SaveRequestEvent { slot: QUICK_SLOT });
    }
    if input.quickload {
        load_events.send(LoadRequestEvent { slot: QUICK_SLOT });
    }
}

/// Acts on the atlas screen's result once it has closed. A fly result
/// relocates the player; Quit needs nothing beyond the state change the
/// screen already made.
fn handle_map_closed(
    mut events: EventReader<MapScreenClosedEvent>,
    maps: Res<MapRegistry>,
    mut location: ResMut<PlayerLocation>,
    mut visited: ResMut<VisitedMaps>,
    mut status: ResMut<StatusLine>,
) {
    for event in events.read() {
        if let MapScreenResult::Fly { map_id, x, y } = event.result {
            location.map_id = map_id;
            visited.visit(map_id);
            let name = maps
                .table
                .try_get(map_id)
                .map(|m| m.name.clone())
                .unwrap_or_else(|| format!("map {map_id}"));
            info!("Flew to {name} ({x}, {y})");
            status.0 = format!("Flew to {name}");
        }
    }
}

fn save_feedback(
    mut saves: EventReader<SaveCompleteEvent>,
    mut loads: EventReader<LoadCompleteEvent>,
    mut status: ResMut<StatusLine>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    for event in saves.read() {
        status.0 = if event.success {
            format!("Saved to slot {}", event.slot)
        } else {
            event
                .error_message
                .clone()
                .unwrap_or_else(|| "Save failed".into())
        };
    }
    for event in loads.read() {
        if event.success {
            status.0 = "Save loaded".into();
        } else {
            status.0 = "No save to load".into();
            sfx.send(PlaySfxEvent { sfx: Sfx::Buzzer });
        }
    }
}

// ─── HUD ────────────────────────────────────────────────────────────────

#[derive(Component)]
struct OverworldHud;

#[derive(Component)]
struct HudLocationText;

#[derive(Component)]
struct HudStatusText;

fn spawn_overworld_hud(mut commands: Commands) {
    commands
        .spawn((
            OverworldHud,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(10.0),
                padding: UiRect::all(Val::Px(24.0)),
                ..default()
            },
            BackgroundColor(Color::srgb(0.07, 0.09, 0.07)),
        ))
        .with_children(|root| {
            root.spawn((
                Text::new("Embervale"),
                TextFont {
                    font_size: 28.0,
                    ..default()
                },
                TextColor(Color::srgb(0.95, 0.8, 0.5)),
            ));
            root.spawn((
                HudLocationText,
                Text::new(""),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::srgb(0.9, 0.9, 0.95)),
            ));
            root.spawn((
                Text::new("M: map   N: wall map   F: fly   G: ferry   F5: save   F9: load"),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(0.6, 0.6, 0.7)),
            ));
            root.spawn((
                HudStatusText,
                Text::new(""),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(0.7, 0.85, 0.7)),
            ));
        });
}

fn despawn_overworld_hud(mut commands: Commands, huds: Query<Entity, With<OverworldHud>>) {
    for entity in &huds {
        commands.entity(entity).despawn_recursive();
    }
}

fn update_hud(
    location: Res<PlayerLocation>,
    maps: Res<MapRegistry>,
    switches: Res<GameSwitches>,
    status: Res<StatusLine>,
    mut loc_text: Query<&mut Text, (With<HudLocationText>, Without<HudStatusText>)>,
    mut status_text: Query<&mut Text, (With<HudStatusText>, Without<HudLocationText>)>,
) {
    if let Ok(mut text) = loc_text.get_single_mut() {
        let name = maps
            .table
            .try_get(location.map_id)
            .map(|m| m.name.as_str())
            .unwrap_or("Unknown");
        let ferry = if switches.is_on(FERRY_SWITCH) {
            "running"
        } else {
            "docked"
        };
        text.0 = format!("Location: {name}   (ferry {ferry})");
    }
    if let Ok(mut text) = status_text.get_single_mut() {
        text.0 = status.0.clone();
    }
}
