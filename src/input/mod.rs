use bevy::prelude::*;
use crate::shared::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            PreUpdate,
            (reset_and_read_input, manage_input_context).chain(),
        );
    }
}

fn any_pressed(keys: &ButtonInput<KeyCode>, set: &[KeyCode]) -> bool {
    set.iter().any(|k| keys.pressed(*k))
}

fn any_just_pressed(keys: &ButtonInput<KeyCode>, set: &[KeyCode]) -> bool {
    set.iter().any(|k| keys.just_pressed(*k))
}

/// The single point where hardware input becomes game actions.
fn reset_and_read_input(
    keys: Res<ButtonInput<KeyCode>>,
    bindings: Res<KeyBindings>,
    context: Res<InputContext>,
    mut input: ResMut<PlayerInput>,
) {
    *input = PlayerInput::default();

    match *context {
        InputContext::Disabled => {}

        InputContext::Gameplay => {
            input.open_map = any_just_pressed(&keys, bindings.open_map);
            input.open_wall_map = any_just_pressed(&keys, bindings.open_wall_map);
            input.open_fly = any_just_pressed(&keys, bindings.open_fly);
            input.debug_switch = any_just_pressed(&keys, bindings.debug_switch);
            input.debug_export = any_just_pressed(&keys, bindings.debug_export);

            input.quicksave = any_just_pressed(&keys, bindings.quicksave);
            input.quickload = any_just_pressed(&keys, bindings.quickload);
        }

        InputContext::MapScreen => {
            // Held state: the map cursor keeps stepping while a direction
            // is held down. Menus and the marking editor want edges instead.
            input.up = any_pressed(&keys, bindings.up);
            input.down = any_pressed(&keys, bindings.down);
            input.left = any_pressed(&keys, bindings.left);
            input.right = any_pressed(&keys, bindings.right);
            input.up_just = any_just_pressed(&keys, bindings.up);
            input.down_just = any_just_pressed(&keys, bindings.down);
            input.left_just = any_just_pressed(&keys, bindings.left);
            input.right_just = any_just_pressed(&keys, bindings.right);

            input.confirm = any_just_pressed(&keys, bindings.confirm);
            input.cancel = any_just_pressed(&keys, bindings.cancel);
            input.action = any_just_pressed(&keys, bindings.action);
        }
    }
}

/// Derives InputContext from GameState. ONE system, replaces all per-domain guards.
fn manage_input_context(game_state: Res<State<GameState>>, mut context: ResMut<InputContext>) {
    *context = match *game_state.get() {
        GameState::Loading => InputContext::Disabled,
        GameState::Playing => InputContext::Gameplay,
        GameState::TownMap => InputContext::MapScreen,
    };
}
