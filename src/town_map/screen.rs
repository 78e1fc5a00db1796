//! Widget tree for the atlas screen.
//!
//! Everything is flat-color UI nodes laid out over the 960x540 window:
//! the scrolling canvas inside a clipping frame on the left, the title,
//! location bar and hint footer around it, and the details panel on the
//! right. Cell content (points, pins, fly icons, markings, the cursor)
//! lives as canvas children and is rebuilt whenever a refresh event
//! fires; per-frame systems only move and recolor what exists.

use bevy::prelude::*;

use super::{marking_editor, menu, points, MapPhase, TownMapSession};
use crate::shared::*;

const SCREEN_BG: Color = Color::srgb(0.05, 0.05, 0.1);
const FRAME_BORDER: Color = Color::srgb(0.8, 0.8, 0.85);
// TODO: draw each region's map_image instead of the flat sea backdrop
// once art assets land.
const SEA_FILL: Color = Color::srgb(0.16, 0.35, 0.6);
const POINT_FILL: Color = Color::srgb(0.92, 0.54, 0.2);
const PIN_FILL: Color = Color::srgb(0.9, 0.15, 0.15);
const PIN_BORDER: Color = Color::srgb(1.0, 1.0, 1.0);
const FLY_FILL: Color = Color::srgb(1.0, 0.9, 0.3);
const FLY_FILL_DIM: Color = Color::srgba(1.0, 0.9, 0.3, 0.35);
const CURSOR_BORDER: Color = Color::srgb(1.0, 0.2, 0.2);
const PANEL_BG: Color = Color::srgb(0.1, 0.1, 0.18);
const TEXT_COLOR: Color = Color::srgb(0.9, 0.9, 0.95);
const TEXT_DIM: Color = Color::srgb(0.6, 0.6, 0.7);

const POINT_DOT: f32 = 6.0;
const PIN_SIZE: f32 = 10.0;
const FLY_ICON_SIZE: f32 = 12.0;
const MARK_CLUSTER: f32 = 14.0;
const BLINK_INTERVAL: f32 = 0.35;

// ─── Markers ────────────────────────────────────────────────────────────

#[derive(Component)]
pub struct MapScreenRoot;

#[derive(Component)]
pub struct MapCanvas;

/// A canvas child glued to a grid cell. The anchor survives zoom because
/// its screen position is recomputed from the cell every frame.
#[derive(Component)]
struct CellAnchored {
    cell: Vec2,
    size: Vec2,
    /// Extra screen-pixel shove, used by fly icons.
    nudge: Vec2,
}

#[derive(Component)]
pub struct MapCursorNode;

#[derive(Component)]
struct FlyIconNode;

#[derive(Component)]
struct TitleText;

#[derive(Component)]
struct LocationText;

#[derive(Component)]
struct HintText;

#[derive(Component)]
struct DetailsPanel;

#[derive(Component)]
struct DetailsTitle;

#[derive(Component)]
struct DetailsBody;

/// Shared blink clock for fly icons.
#[derive(Resource)]
pub struct FlyIconBlink {
    timer: Timer,
    lit: bool,
}

impl Default for FlyIconBlink {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(BLINK_INTERVAL, TimerMode::Repeating),
            lit: true,
        }
    }
}

// ─── Enter / exit ───────────────────────────────────────────────────────

pub fn spawn_town_map(
    mut commands: Commands,
    request: Option<Res<MapScreenRequest>>,
    regions: Res<RegionRegistry>,
    maps: Res<MapRegistry>,
    location: Res<PlayerLocation>,
    switches: Res<GameSwitches>,
    visited: Res<VisitedMaps>,
    mut refresh: EventWriter<MapCanvasRefreshEvent>,
) {
    let request = request.map(|r| *r).unwrap_or_default();
    commands.remove_resource::<MapScreenRequest>();

    let region_number = request.region.unwrap_or_else(|| {
        maps.table
            .try_get(location.map_id)
            .and_then(|m| m.atlas_position)
            .map(|(region, _, _)| region)
            .unwrap_or(0)
    });
    let region = regions.table.get(region_number).clone();

    let mut session = TownMapSession::new(region, request.mode);
    super::position_cursor_for_region(&mut session, &location, &maps);
    if session.fly_mode() {
        session.fly_positions = points::fly_positions(&session.region, &switches, &visited);
    }

    spawn_screen_tree(&mut commands);
    commands.insert_resource(session);
    refresh.send(MapCanvasRefreshEvent);
}

pub fn despawn_town_map(
    mut commands: Commands,
    roots: Query<Entity, With<MapScreenRoot>>,
    menus: Query<Entity, With<menu::MapMenuRoot>>,
    editors: Query<Entity, With<marking_editor::MarkingEditorRoot>>,
) {
    for entity in roots.iter().chain(menus.iter()).chain(editors.iter()) {
        commands.entity(entity).despawn_recursive();
    }
    commands.remove_resource::<TownMapSession>();
    commands.remove_resource::<menu::MapMenu>();
    commands.remove_resource::<marking_editor::MarkingEditor>();
}

fn spawn_screen_tree(commands: &mut Commands) {
    commands
        .spawn((
            MapScreenRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                ..default()
            },
            BackgroundColor(SCREEN_BG),
        ))
        .with_children(|root| {
            // Clipping frame with the scrolling canvas inside.
            root.spawn((
                Node {
                    position_type: PositionType::Absolute,
                    left: Val::Px(MAP_TOP_LEFT.x),
                    top: Val::Px(MAP_TOP_LEFT.y),
                    width: Val::Px(MAP_VIEW_SIZE.x),
                    height: Val::Px(MAP_VIEW_SIZE.y),
                    border: UiRect::all(Val::Px(2.0)),
                    overflow: Overflow::clip(),
                    ..default()
                },
                BackgroundColor(SCREEN_BG),
                BorderColor(FRAME_BORDER),
            ))
            .with_children(|frame| {
                frame.spawn((
                    MapCanvas,
                    Node {
                        position_type: PositionType::Absolute,
                        left: Val::Px(0.0),
                        top: Val::Px(0.0),
                        ..default()
                    },
                    BackgroundColor(SEA_FILL),
                ));
            });

            root.spawn((
                TitleText,
                Text::new(""),
                TextFont {
                    font_size: 22.0,
                    ..default()
                },
                TextColor(TEXT_COLOR),
                Node {
                    position_type: PositionType::Absolute,
                    left: Val::Px(512.0),
                    top: Val::Px(16.0),
                    ..default()
                },
            ));

            root.spawn((
                LocationText,
                Text::new(""),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(TEXT_COLOR),
                Node {
                    position_type: PositionType::Absolute,
                    left: Val::Px(MAP_TOP_LEFT.x),
                    top: Val::Px(MAP_TOP_LEFT.y + MAP_VIEW_SIZE.y + 10.0),
                    ..default()
                },
            ));

            root.spawn((
                DetailsPanel,
                Visibility::Hidden,
                Node {
                    position_type: PositionType::Absolute,
                    left: Val::Px(512.0),
                    top: Val::Px(56.0),
                    width: Val::Px(432.0),
                    min_height: Val::Px(120.0),
                    flex_direction: FlexDirection::Column,
                    row_gap: Val::Px(8.0),
                    padding: UiRect::all(Val::Px(12.0)),
                    border: UiRect::all(Val::Px(2.0)),
                    ..default()
                },
                BackgroundColor(PANEL_BG),
                BorderColor(FRAME_BORDER),
            ))
            .with_children(|panel| {
                panel.spawn((
                    DetailsTitle,
                    Text::new(""),
                    TextFont {
                        font_size: 18.0,
                        ..default()
                    },
                    TextColor(TEXT_COLOR),
                ));
                panel.spawn((
                    DetailsBody,
                    Text::new(""),
                    TextFont {
                        font_size: 14.0,
                        ..default()
                    },
                    TextColor(TEXT_DIM),
                ));
            });

            root.spawn((
                HintText,
                Text::new(""),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(TEXT_DIM),
                Node {
                    position_type: PositionType::Absolute,
                    left: Val::Px(MAP_TOP_LEFT.x),
                    top: Val::Px(SCREEN_HEIGHT - 32.0),
                    ..default()
                },
            ));
        });
}

// ─── Canvas content ─────────────────────────────────────────────────────

/// Tears down and respawns every cell-anchored child. Runs only when a
/// refresh event announces that cell content actually changed.
#[allow(clippy::too_many_arguments)]
pub fn rebuild_canvas(
    mut commands: Commands,
    mut events: EventReader<MapCanvasRefreshEvent>,
    session: Res<TownMapSession>,
    switches: Res<GameSwitches>,
    visited: Res<VisitedMaps>,
    marks: Res<MarkingStore>,
    icons: Res<MarkIconRegistry>,
    canvas: Query<Entity, With<MapCanvas>>,
) {
    if events.is_empty() {
        return;
    }
    events.clear();
    let Ok(canvas) = canvas.get_single() else {
        return;
    };

    let palette: Vec<Color> = icons
        .table
        .iter()
        .map(|icon| Color::srgb(icon.color.0, icon.color.1, icon.color.2))
        .collect();

    commands.entity(canvas).despawn_descendants();
    commands.entity(canvas).with_children(|c| {
        for point in &session.region.points {
            if !points::point_visible(point, session.mode, &switches) {
                continue;
            }
            c.spawn((
                CellAnchored {
                    cell: Vec2::new(point.position.0 as f32, point.position.1 as f32),
                    size: Vec2::splat(POINT_DOT),
                    nudge: Vec2::ZERO,
                },
                Node {
                    position_type: PositionType::Absolute,
                    width: Val::Px(POINT_DOT),
                    height: Val::Px(POINT_DOT),
                    ..default()
                },
                BackgroundColor(POINT_FILL),
            ));
        }

        if let Some((x, y)) = session.player_pin {
            c.spawn((
                CellAnchored {
                    cell: Vec2::new(x as f32, y as f32),
                    size: Vec2::splat(PIN_SIZE),
                    nudge: Vec2::ZERO,
                },
                Node {
                    position_type: PositionType::Absolute,
                    width: Val::Px(PIN_SIZE),
                    height: Val::Px(PIN_SIZE),
                    border: UiRect::all(Val::Px(1.0)),
                    ..default()
                },
                BackgroundColor(PIN_FILL),
                BorderColor(PIN_BORDER),
            ));
        }

        if session.fly_mode() {
            for point in points::fly_icon_points(&session.region, &switches, &visited) {
                c.spawn((
                    FlyIconNode,
                    CellAnchored {
                        cell: Vec2::new(point.position.0 as f32, point.position.1 as f32),
                        size: Vec2::splat(FLY_ICON_SIZE),
                        nudge: Vec2::new(
                            point.fly_icon_offset.0 as f32,
                            point.fly_icon_offset.1 as f32,
                        ),
                    },
                    Node {
                        position_type: PositionType::Absolute,
                        width: Val::Px(FLY_ICON_SIZE),
                        height: Val::Px(FLY_ICON_SIZE),
                        ..default()
                    },
                    BackgroundColor(FLY_FILL),
                ));
            }
        }

        for entry in marks.entries(session.region_number()) {
            c.spawn((
                CellAnchored {
                    cell: Vec2::new(entry.x as f32, entry.y as f32),
                    size: Vec2::splat(MARK_CLUSTER),
                    nudge: Vec2::ZERO,
                },
                Node {
                    position_type: PositionType::Absolute,
                    width: Val::Px(MARK_CLUSTER),
                    height: Val::Px(MARK_CLUSTER),
                    flex_wrap: FlexWrap::Wrap,
                    column_gap: Val::Px(2.0),
                    row_gap: Val::Px(2.0),
                    ..default()
                },
            ))
            .with_children(|cluster| {
                for value in entry.slots {
                    let fill = if value == 0 {
                        Color::NONE
                    } else {
                        palette
                            .get(value as usize - 1)
                            .copied()
                            .unwrap_or(Color::NONE)
                    };
                    cluster.spawn((
                        Node {
                            width: Val::Px(POINT_DOT),
                            height: Val::Px(POINT_DOT),
                            ..default()
                        },
                        BackgroundColor(fill),
                    ));
                }
            });
        }

        c.spawn((
            MapCursorNode,
            Node {
                position_type: PositionType::Absolute,
                border: UiRect::all(Val::Px(2.0)),
                ..default()
            },
            BackgroundColor(Color::NONE),
            BorderColor(CURSOR_BORDER),
        ));
    });
}

/// Per-frame geometry: canvas scroll and scale, cell anchors, cursor box.
pub fn sync_map_visuals(
    session: Res<TownMapSession>,
    mut canvas: Query<&mut Node, (With<MapCanvas>, Without<CellAnchored>, Without<MapCursorNode>)>,
    mut anchored: Query<(&CellAnchored, &mut Node), (Without<MapCanvas>, Without<MapCursorNode>)>,
    mut cursor: Query<&mut Node, (With<MapCursorNode>, Without<MapCanvas>, Without<CellAnchored>)>,
) {
    let vp = &session.viewport;

    if let Ok(mut node) = canvas.get_single_mut() {
        let size = vp.canvas_size_at(vp.zoom);
        node.left = Val::Px(-vp.offset.x);
        node.top = Val::Px(-vp.offset.y);
        node.width = Val::Px(size.x);
        node.height = Val::Px(size.y);
    }

    for (anchor, mut node) in &mut anchored {
        let center = vp.point_to_screen(anchor.cell) + anchor.nudge;
        node.left = Val::Px(center.x - anchor.size.x / 2.0);
        node.top = Val::Px(center.y - anchor.size.y / 2.0);
    }

    if let Ok(mut node) = cursor.get_single_mut() {
        let size = vp.cell * vp.zoom;
        node.left = Val::Px(session.cursor_px.x - size.x / 2.0);
        node.top = Val::Px(session.cursor_px.y - size.y / 2.0);
        node.width = Val::Px(size.x);
        node.height = Val::Px(size.y);
    }
}

pub fn blink_fly_icons(
    time: Res<Time>,
    mut blink: ResMut<FlyIconBlink>,
    mut icons: Query<&mut BackgroundColor, With<FlyIconNode>>,
) {
    blink.timer.tick(time.delta());
    if blink.timer.just_finished() {
        blink.lit = !blink.lit;
    }
    let fill = if blink.lit { FLY_FILL } else { FLY_FILL_DIM };
    for mut bg in &mut icons {
        *bg = BackgroundColor(fill);
    }
}

// ─── Text panels ────────────────────────────────────────────────────────

pub fn update_title_text(
    session: Res<TownMapSession>,
    mut title: Query<&mut Text, With<TitleText>>,
) {
    let Ok(mut text) = title.get_single_mut() else {
        return;
    };
    let name = &session.region.name;
    text.0 = if session.fly_mode() {
        format!("Fly: {name}")
    } else if session.mode == MapMode::WallMap {
        format!("{name} Wall Map")
    } else {
        name.clone()
    };
}

pub fn update_location_text(
    session: Res<TownMapSession>,
    switches: Res<GameSwitches>,
    mut location: Query<&mut Text, With<LocationText>>,
) {
    let Ok(mut text) = location.get_single_mut() else {
        return;
    };
    let point = points::point_at(
        &session.region,
        session.cursor.x,
        session.cursor.y,
        session.mode,
        &switches,
    );
    text.0 = point.map(|p| p.name.clone()).unwrap_or_default();
}

pub fn update_details_panel(
    session: Res<TownMapSession>,
    switches: Res<GameSwitches>,
    mut panel: Query<&mut Visibility, With<DetailsPanel>>,
    mut title: Query<&mut Text, (With<DetailsTitle>, Without<DetailsBody>)>,
    mut body: Query<&mut Text, (With<DetailsBody>, Without<DetailsTitle>)>,
) {
    let Ok(mut visibility) = panel.get_single_mut() else {
        return;
    };
    *visibility = if session.details_visible {
        Visibility::Visible
    } else {
        Visibility::Hidden
    };
    if !session.details_visible {
        return;
    }

    let point = points::point_at(
        &session.region,
        session.cursor.x,
        session.cursor.y,
        session.mode,
        &switches,
    );
    if let Ok(mut text) = title.get_single_mut() {
        text.0 = point.map(|p| p.name.clone()).unwrap_or_else(|| "---".into());
    }
    if let Ok(mut text) = body.get_single_mut() {
        text.0 = point.map(|p| p.description.clone()).unwrap_or_default();
    }
}

pub fn update_hint_text(session: Res<TownMapSession>, mut hint: Query<&mut Text, With<HintText>>) {
    let Ok(mut text) = hint.get_single_mut() else {
        return;
    };
    text.0 = String::from(if session.fly_mode() {
        "Z: fly there   X: cancel"
    } else {
        match session.phase {
            MapPhase::Zoomed => "Z: markings   X: zoom out",
            MapPhase::MarkingEdit => "Z: pick   X: done",
            MapPhase::Menu => "Z: choose   X: back",
            _ => "Z: select   Space: menu   X: close",
        }
    });
}
