//! The region atlas screen.
//!
//! One resource, [`TownMapSession`], holds everything about the current
//! showing; systems advance it phase by phase:
//!
//! ```text
//!              direction held                 both axes done
//!   Idle/Zoomed ─────────────▶ CursorMoving ────────────────▶ Idle/Zoomed
//!   Idle ──confirm──▶ Zooming ──▶ Zoomed ──cancel──▶ Zooming ──▶ Idle
//!   Idle/Zoomed ──confirm──▶ MarkingEdit ──cancel──▶ back where it was
//!   Idle ──action──▶ Menu ──▶ Idle (or straight to the fly sub-mode)
//! ```
//!
//! The fly chooser is not a phase: it is `mode == Fly` or the `fly_active`
//! flag, because the cursor keeps gliding normally while choosing.

pub mod coords;
pub mod cursor;
pub mod marking_editor;
pub mod menu;
pub mod points;
pub mod screen;
pub mod zoom;

use bevy::prelude::*;

use crate::shared::*;
use coords::MapViewport;
use cursor::CursorGlide;
use zoom::ZoomGlide;

pub struct TownMapPlugin;

impl Plugin for TownMapPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<screen::FlyIconBlink>()
            .add_systems(OnEnter(GameState::TownMap), screen::spawn_town_map)
            .add_systems(OnExit(GameState::TownMap), screen::despawn_town_map)
            .add_systems(
                Update,
                (
                    zoom::advance_zoom,
                    cursor::advance_cursor_glide,
                    cursor::cursor_direction_input,
                    map_interaction,
                    menu::menu_input,
                    marking_editor::marking_editor_input,
                    resolve_map_result,
                )
                    .chain()
                    .run_if(in_state(GameState::TownMap)),
            )
            .add_systems(
                Update,
                (
                    menu::sync_menu_ui,
                    marking_editor::sync_marking_editor_ui,
                    screen::rebuild_canvas,
                    screen::sync_map_visuals,
                    screen::update_title_text,
                    screen::update_location_text,
                    screen::update_details_panel,
                    screen::update_hint_text,
                    screen::blink_fly_icons,
                )
                    .chain()
                    .run_if(in_state(GameState::TownMap)),
            );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SESSION STATE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapPhase {
    #[default]
    Idle,
    CursorMoving,
    Zooming,
    Zoomed,
    MarkingEdit,
    Menu,
}

/// Everything about the current showing of the atlas screen.
#[derive(Resource)]
pub struct TownMapSession {
    pub mode: MapMode,
    /// Fly chooser entered from the menu while in `Normal` mode.
    pub fly_active: bool,
    /// The displayed region def, cloned out of the registry so systems
    /// need no registry access on the hot path.
    pub region: RegionDef,
    pub phase: MapPhase,
    /// Logical cursor cell. Updates the moment a glide starts.
    pub cursor: IVec2,
    /// Canvas position of the cursor sprite, which trails the logical cell
    /// while gliding.
    pub cursor_px: Vec2,
    pub viewport: MapViewport,
    pub move_anim: Option<CursorGlide>,
    pub zoom_anim: Option<ZoomGlide>,
    /// The player's cell on this region, when their map is part of it.
    pub player_pin: Option<(i32, i32)>,
    /// Cells that accept a fly command. Empty outside the fly chooser.
    pub fly_positions: Vec<(i32, i32)>,
    pub details_visible: bool,
    /// Set once the screen is finished; picked up by [`resolve_map_result`].
    pub result: Option<MapScreenResult>,
}

impl TownMapSession {
    pub fn new(region: RegionDef, mode: MapMode) -> Self {
        let viewport = MapViewport::new(&region);
        Self {
            mode,
            fly_active: false,
            region,
            phase: MapPhase::Idle,
            cursor: IVec2::ZERO,
            cursor_px: Vec2::ZERO,
            viewport,
            move_anim: None,
            zoom_anim: None,
            player_pin: None,
            fly_positions: Vec::new(),
            details_visible: false,
            result: None,
        }
    }

    pub fn region_number(&self) -> i32 {
        self.region.id_number
    }

    /// Fly semantics apply: either the screen was opened as a chooser or
    /// the sub-mode was toggled from the menu.
    pub fn fly_mode(&self) -> bool {
        self.mode == MapMode::Fly || self.fly_active
    }

    /// Snaps the cursor to a cell with no glide.
    pub fn warp_cursor(&mut self, x: i32, y: i32) {
        self.cursor = IVec2::new(x, y);
        self.cursor_px = self.viewport.point_to_screen(self.cursor.as_vec2());
    }
}

/// Places pin and cursor for the session's region: on the player when their
/// map belongs to the region, else cursor to the grid middle with no pin.
/// The view centers on the cursor either way.
pub fn position_cursor_for_region(
    session: &mut TownMapSession,
    location: &PlayerLocation,
    maps: &MapRegistry,
) {
    let pin = points::player_atlas_cell(session.region_number(), location, maps);
    session.player_pin = pin;
    let (cx, cy) = pin.unwrap_or_else(|| points::default_cursor_cell(&session.region));
    session.warp_cursor(cx, cy);
    let px = session.cursor_px;
    session.viewport.center_on(px);
}

/// Swaps the displayed region and re-derives the whole view for it.
pub fn set_region(
    session: &mut TownMapSession,
    region: RegionDef,
    location: &PlayerLocation,
    maps: &MapRegistry,
) {
    session.viewport = MapViewport::new(&region);
    session.region = region;
    session.fly_active = false;
    session.fly_positions.clear();
    position_cursor_for_region(session, location, maps);
}

// ═══════════════════════════════════════════════════════════════════════
// CAPABILITIES
// ═══════════════════════════════════════════════════════════════════════

pub fn can_zoom(session: &TownMapSession, settings: &Settings) -> bool {
    settings.zoom_for_details && session.mode == MapMode::Normal && !session.viewport.zoomed
}

/// Marking is the confirm fallback wherever zoom does not claim the press:
/// with zoom disabled it fires straight from Idle, with zoom enabled it
/// fires while already zoomed in.
pub fn can_mark(session: &TownMapSession, settings: &Settings) -> bool {
    settings.marking && session.mode == MapMode::Normal && !can_zoom(session, settings)
}

// ═══════════════════════════════════════════════════════════════════════
// INTERACTION DISPATCH
// ═══════════════════════════════════════════════════════════════════════

/// Routes confirm/action/cancel while the cursor is at rest. Runs after the
/// direction input system, so a press that started a glide this frame is
/// never double-handled.
#[allow(clippy::too_many_arguments)]
pub fn map_interaction(
    mut commands: Commands,
    mut session: ResMut<TownMapSession>,
    input: Res<PlayerInput>,
    settings: Res<Settings>,
    switches: Res<GameSwitches>,
    visited: Res<VisitedMaps>,
    maps: Res<MapRegistry>,
    location: Res<PlayerLocation>,
    marks: Res<MarkingStore>,
    mut refresh: EventWriter<MapCanvasRefreshEvent>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    if !matches!(session.phase, MapPhase::Idle | MapPhase::Zoomed) {
        return;
    }

    if input.confirm {
        if session.fly_mode() {
            let cell = (session.cursor.x, session.cursor.y);
            if session.fly_positions.contains(&cell) {
                let point =
                    points::point_at(&session.region, cell.0, cell.1, session.mode, &switches);
                let Some(spot) = point.and_then(|p| p.fly_spot) else {
                    // A cell can only be in fly_positions via a fly point;
                    // anything else is corrupt region data.
                    panic!(
                        "fly point at {cell:?} in region {} has no destination",
                        session.region.id
                    );
                };
                session.result = Some(MapScreenResult::Fly {
                    map_id: spot.0,
                    x: spot.1,
                    y: spot.2,
                });
                sfx.send(PlaySfxEvent { sfx: Sfx::Decision });
            }
        } else if can_zoom(&session, &settings) {
            zoom::start_zoom_in(&mut session);
            sfx.send(PlaySfxEvent { sfx: Sfx::Decision });
        } else if can_mark(&session, &settings) {
            marking_editor::open_editor(&mut commands, &mut session, &marks);
            sfx.send(PlaySfxEvent { sfx: Sfx::Decision });
        }
        return;
    }

    if input.action {
        menu::try_open_menu(
            &mut commands,
            &mut session,
            &settings,
            &switches,
            &visited,
            &maps,
            &location,
            &mut refresh,
            &mut sfx,
        );
        return;
    }

    if input.cancel {
        if session.fly_active {
            session.fly_active = false;
            session.fly_positions.clear();
            refresh.send(MapCanvasRefreshEvent);
            sfx.send(PlaySfxEvent { sfx: Sfx::Cancel });
        } else if session.phase == MapPhase::Zoomed {
            zoom::start_zoom_out(&mut session);
            sfx.send(PlaySfxEvent { sfx: Sfx::Cancel });
        } else {
            session.result = Some(MapScreenResult::Quit);
            sfx.send(PlaySfxEvent { sfx: Sfx::Cancel });
        }
    }
}

/// Hands the finished screen's result to the overworld and leaves the state.
pub fn resolve_map_result(
    mut session: ResMut<TownMapSession>,
    mut closed: EventWriter<MapScreenClosedEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if let Some(result) = session.result.take() {
        closed.send(MapScreenClosedEvent { result });
        next_state.set(GameState::Playing);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════
