//! The per-cell marking editor.
//!
//! A small two-row panel: the top row shows the cell's four marking
//! slots, the bottom row is the icon lineup the active slot picks from
//! (entry 0 clears the slot). Horizontal movement wraps around its row
//! and key-repeats while held. Leaving the editor writes the slots back
//! to the store in one go; a cell whose slots are all empty is dropped.

use bevy::prelude::*;

use super::{MapPhase, TownMapSession};
use crate::shared::*;

const REPEAT_INTERVAL: f32 = 0.125;

const PANEL_BG: Color = Color::srgb(0.1, 0.1, 0.18);
const PANEL_BORDER: Color = Color::srgb(0.8, 0.8, 0.85);
const BOX_BORDER: Color = Color::srgb(0.35, 0.35, 0.45);
const BOX_HIGHLIGHT: Color = Color::srgb(1.0, 0.85, 0.3);
const EMPTY_FILL: Color = Color::srgb(0.22, 0.22, 0.28);

/// Editing state for one cell. Lives as a resource only while the panel
/// is open; the slots are a working copy, applied on close.
#[derive(Resource, Debug)]
pub struct MarkingEditor {
    pub x: i32,
    pub y: i32,
    pub slots: [u8; MARKING_SLOTS],
    pub active_slot: usize,
    pub lineup_index: Option<usize>,
    repeat: Timer,
}

/// One key press translated to an editor action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditorAct {
    Left,
    Right,
    Up,
    Down,
    Use,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditorOutcome {
    Idle,
    Moved,
    /// Dropped into the lineup row.
    Entered,
    /// Wrote the lineup choice into the active slot.
    Committed,
    /// Left the lineup row without writing.
    CanceledLineup,
    /// Leave the editor and apply the slots.
    Close,
}

fn lineup_len(icon_count: usize) -> usize {
    icon_count + 1
}

fn wrap(index: usize, dir: i32, len: usize) -> usize {
    (index as i32 + dir).rem_euclid(len as i32) as usize
}

fn editor_action(editor: &mut MarkingEditor, act: EditorAct, lineup: usize) -> EditorOutcome {
    match editor.lineup_index {
        // Slot row.
        None => match act {
            EditorAct::Left => {
                editor.active_slot = wrap(editor.active_slot, -1, MARKING_SLOTS);
                EditorOutcome::Moved
            }
            EditorAct::Right => {
                editor.active_slot = wrap(editor.active_slot, 1, MARKING_SLOTS);
                EditorOutcome::Moved
            }
            EditorAct::Down => {
                editor.lineup_index = Some(seed_index(editor, lineup));
                EditorOutcome::Moved
            }
            EditorAct::Use => {
                editor.lineup_index = Some(seed_index(editor, lineup));
                EditorOutcome::Entered
            }
            EditorAct::Back => EditorOutcome::Close,
            EditorAct::Up => EditorOutcome::Idle,
        },
        // Lineup row.
        Some(index) => match act {
            EditorAct::Left => {
                editor.lineup_index = Some(wrap(index, -1, lineup));
                EditorOutcome::Moved
            }
            EditorAct::Right => {
                editor.lineup_index = Some(wrap(index, 1, lineup));
                EditorOutcome::Moved
            }
            EditorAct::Use => {
                editor.slots[editor.active_slot] = index as u8;
                editor.lineup_index = None;
                EditorOutcome::Committed
            }
            EditorAct::Up => {
                editor.lineup_index = None;
                EditorOutcome::Moved
            }
            EditorAct::Back => {
                editor.lineup_index = None;
                EditorOutcome::CanceledLineup
            }
            EditorAct::Down => EditorOutcome::Idle,
        },
    }
}

/// Starting lineup entry when dropping in from a slot: whatever the slot
/// already holds, clamped in case the store outgrew the icon table.
fn seed_index(editor: &MarkingEditor, lineup: usize) -> usize {
    (editor.slots[editor.active_slot] as usize).min(lineup - 1)
}

/// Opens the editor on the cursor's cell with a copy of its stored slots.
pub(super) fn open_editor(
    commands: &mut Commands,
    session: &mut TownMapSession,
    marks: &MarkingStore,
) {
    let (x, y) = (session.cursor.x, session.cursor.y);
    commands.insert_resource(MarkingEditor {
        x,
        y,
        slots: marks.slots_at(session.region_number(), x, y),
        active_slot: 0,
        lineup_index: None,
        repeat: Timer::from_seconds(REPEAT_INTERVAL, TimerMode::Repeating),
    });
    session.phase = MapPhase::MarkingEdit;
}

// ─── Systems ────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
pub fn marking_editor_input(
    mut commands: Commands,
    mut session: ResMut<TownMapSession>,
    editor: Option<ResMut<MarkingEditor>>,
    icons: Res<MarkIconRegistry>,
    mut marks: ResMut<MarkingStore>,
    input: Res<PlayerInput>,
    time: Res<Time>,
    mut refresh: EventWriter<MapCanvasRefreshEvent>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    if session.phase != MapPhase::MarkingEdit {
        return;
    }
    let Some(mut editor) = editor else {
        return;
    };
    // The confirm press that opened the panel must not also edit it.
    if editor.is_added() {
        return;
    }
    let lineup = lineup_len(icons.table.len());

    // Horizontal steps repeat while held; everything else is edge-only.
    let mut acts = Vec::new();
    let edge = (input.right_just as i32) - (input.left_just as i32);
    let held = (input.right as i32) - (input.left as i32);
    if edge != 0 {
        editor.repeat.reset();
        acts.push(if edge < 0 { EditorAct::Left } else { EditorAct::Right });
    } else if held != 0 {
        editor.repeat.tick(time.delta());
        if editor.repeat.just_finished() {
            acts.push(if held < 0 { EditorAct::Left } else { EditorAct::Right });
        }
    } else {
        editor.repeat.reset();
    }
    if input.up_just {
        acts.push(EditorAct::Up);
    }
    if input.down_just {
        acts.push(EditorAct::Down);
    }
    if input.confirm {
        acts.push(EditorAct::Use);
    }
    if input.cancel {
        acts.push(EditorAct::Back);
    }

    for act in acts {
        match editor_action(&mut editor, act, lineup) {
            EditorOutcome::Idle => {}
            EditorOutcome::Moved => {
                sfx.send(PlaySfxEvent { sfx: Sfx::Cursor });
            }
            EditorOutcome::Entered | EditorOutcome::Committed => {
                sfx.send(PlaySfxEvent { sfx: Sfx::Decision });
            }
            EditorOutcome::CanceledLineup => {
                sfx.send(PlaySfxEvent { sfx: Sfx::Cancel });
            }
            EditorOutcome::Close => {
                let region = session.region_number();
                marks.apply(
                    region,
                    MarkingEntry {
                        x: editor.x,
                        y: editor.y,
                        slots: editor.slots,
                    },
                );
                commands.remove_resource::<MarkingEditor>();
                session.phase = if session.viewport.zoomed {
                    MapPhase::Zoomed
                } else {
                    MapPhase::Idle
                };
                refresh.send(MapCanvasRefreshEvent);
                sfx.send(PlaySfxEvent { sfx: Sfx::Cancel });
                return;
            }
        }
    }
}

// ─── UI ─────────────────────────────────────────────────────────────────

#[derive(Component)]
pub struct MarkingEditorRoot;

#[derive(Component)]
struct SlotBox {
    index: usize,
}

#[derive(Component)]
struct LineupBox {
    index: usize,
}

/// Keeps the panel in step with the editor resource: spawns it when the
/// editor opens, recolors every box each frame, tears it down on close.
pub fn sync_marking_editor_ui(
    mut commands: Commands,
    editor: Option<Res<MarkingEditor>>,
    icons: Res<MarkIconRegistry>,
    roots: Query<Entity, With<MarkingEditorRoot>>,
    mut slot_boxes: Query<(&SlotBox, &mut BackgroundColor, &mut BorderColor), Without<LineupBox>>,
    mut lineup_boxes: Query<
        (&LineupBox, &mut BackgroundColor, &mut BorderColor),
        Without<SlotBox>,
    >,
) {
    let Some(editor) = editor else {
        for root in &roots {
            commands.entity(root).despawn_recursive();
        }
        return;
    };

    if roots.is_empty() {
        spawn_editor_panel(&mut commands, &icons);
        return;
    }

    let palette: Vec<Color> = icons
        .table
        .iter()
        .map(|icon| Color::srgb(icon.color.0, icon.color.1, icon.color.2))
        .collect();
    let on_lineup = editor.lineup_index.is_some();

    for (slot, mut bg, mut border) in &mut slot_boxes {
        *bg = BackgroundColor(fill_for(editor.slots[slot.index] as usize, &palette));
        let active = !on_lineup && slot.index == editor.active_slot;
        *border = BorderColor(if active { BOX_HIGHLIGHT } else { BOX_BORDER });
    }
    for (entry, mut bg, mut border) in &mut lineup_boxes {
        *bg = BackgroundColor(fill_for(entry.index, &palette));
        let active = editor.lineup_index == Some(entry.index);
        *border = BorderColor(if active { BOX_HIGHLIGHT } else { BOX_BORDER });
    }
}

/// Fill color for a slot value or lineup entry: 0 is "no mark".
fn fill_for(value: usize, palette: &[Color]) -> Color {
    if value == 0 {
        EMPTY_FILL
    } else {
        palette.get(value - 1).copied().unwrap_or(EMPTY_FILL)
    }
}

fn spawn_editor_panel(commands: &mut Commands, icons: &MarkIconRegistry) {
    commands
        .spawn((
            MarkingEditorRoot,
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(140.0),
                top: Val::Px(368.0),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(8.0),
                padding: UiRect::all(Val::Px(10.0)),
                border: UiRect::all(Val::Px(2.0)),
                ..default()
            },
            BackgroundColor(PANEL_BG),
            BorderColor(PANEL_BORDER),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Markings"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(0.9, 0.9, 0.95)),
            ));

            parent
                .spawn(Node {
                    flex_direction: FlexDirection::Row,
                    column_gap: Val::Px(6.0),
                    ..default()
                })
                .with_children(|row| {
                    for index in 0..MARKING_SLOTS {
                        row.spawn((
                            SlotBox { index },
                            Node {
                                width: Val::Px(32.0),
                                height: Val::Px(32.0),
                                border: UiRect::all(Val::Px(2.0)),
                                ..default()
                            },
                            BackgroundColor(EMPTY_FILL),
                            BorderColor(BOX_BORDER),
                        ));
                    }
                });

            parent
                .spawn(Node {
                    flex_direction: FlexDirection::Row,
                    column_gap: Val::Px(6.0),
                    ..default()
                })
                .with_children(|row| {
                    for index in 0..lineup_len(icons.table.len()) {
                        row.spawn((
                            LineupBox { index },
                            Node {
                                width: Val::Px(24.0),
                                height: Val::Px(24.0),
                                border: UiRect::all(Val::Px(2.0)),
                                ..default()
                            },
                            BackgroundColor(EMPTY_FILL),
                            BorderColor(BOX_BORDER),
                        ));
                    }
                });
        });
}

// ═══════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> MarkingEditor {
        MarkingEditor {
            x: 3,
            y: 4,
            slots: [0; MARKING_SLOTS],
            active_slot: 0,
            lineup_index: None,
            repeat: Timer::from_seconds(REPEAT_INTERVAL, TimerMode::Repeating),
        }
    }

    #[test]
    fn the_slot_row_wraps_both_ways() {
        let mut ed = editor();
        assert_eq!(editor_action(&mut ed, EditorAct::Left, 5), EditorOutcome::Moved);
        assert_eq!(ed.active_slot, MARKING_SLOTS - 1);
        editor_action(&mut ed, EditorAct::Right, 5);
        assert_eq!(ed.active_slot, 0);
    }

    #[test]
    fn the_lineup_wraps_across_its_own_length() {
        let mut ed = editor();
        editor_action(&mut ed, EditorAct::Down, 5);
        assert_eq!(ed.lineup_index, Some(0));
        editor_action(&mut ed, EditorAct::Left, 5);
        assert_eq!(ed.lineup_index, Some(4));
        editor_action(&mut ed, EditorAct::Right, 5);
        assert_eq!(ed.lineup_index, Some(0));
    }

    #[test]
    fn entering_the_lineup_seeds_from_the_active_slot() {
        let mut ed = editor();
        ed.slots[2] = 3;
        ed.active_slot = 2;
        editor_action(&mut ed, EditorAct::Use, 5);
        assert_eq!(ed.lineup_index, Some(3));
    }

    #[test]
    fn an_oversized_stored_value_seeds_the_last_entry() {
        let mut ed = editor();
        ed.slots[0] = 9;
        editor_action(&mut ed, EditorAct::Down, 3);
        assert_eq!(ed.lineup_index, Some(2));
    }

    #[test]
    fn use_commits_the_lineup_choice_into_the_slot() {
        let mut ed = editor();
        ed.active_slot = 1;
        editor_action(&mut ed, EditorAct::Down, 5);
        editor_action(&mut ed, EditorAct::Right, 5);
        editor_action(&mut ed, EditorAct::Right, 5);
        let out = editor_action(&mut ed, EditorAct::Use, 5);
        assert_eq!(out, EditorOutcome::Committed);
        assert_eq!(ed.slots[1], 2);
        assert_eq!(ed.lineup_index, None);
    }

    #[test]
    fn up_leaves_the_lineup_without_writing() {
        let mut ed = editor();
        ed.slots[0] = 1;
        editor_action(&mut ed, EditorAct::Down, 5);
        editor_action(&mut ed, EditorAct::Right, 5);
        editor_action(&mut ed, EditorAct::Up, 5);
        assert_eq!(ed.slots[0], 1, "slot keeps its old value");
        assert_eq!(ed.lineup_index, None);
    }

    #[test]
    fn back_cancels_the_lineup_then_closes_the_editor() {
        let mut ed = editor();
        editor_action(&mut ed, EditorAct::Down, 5);
        assert_eq!(
            editor_action(&mut ed, EditorAct::Back, 5),
            EditorOutcome::CanceledLineup
        );
        assert_eq!(
            editor_action(&mut ed, EditorAct::Back, 5),
            EditorOutcome::Close
        );
    }

    #[test]
    fn committed_slots_round_trip_through_the_store() {
        let mut store = MarkingStore::default();
        let mut ed = editor();
        ed.slots = [2, 0, 0, 1];
        store.apply(0, MarkingEntry { x: ed.x, y: ed.y, slots: ed.slots });
        assert_eq!(store.slots_at(0, 3, 4), [2, 0, 0, 1]);

        // Clearing every slot removes the cell entirely.
        store.apply(0, MarkingEntry { x: ed.x, y: ed.y, slots: [0; MARKING_SLOTS] });
        assert!(store.entries(0).is_empty());
    }
}
