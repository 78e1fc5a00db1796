//! The map screen's command menu.
//!
//! Opened with the action key while browsing. Offers at most two real
//! commands: switching to another visited region and toggling the fly
//! chooser for the current one. When fly is the only real command the
//! menu skips itself and drops straight into the chooser.

use bevy::prelude::*;

use super::{points, MapPhase, TownMapSession};
use crate::shared::*;

const PANEL_BG: Color = Color::srgb(0.1, 0.1, 0.18);
const PANEL_BORDER: Color = Color::srgb(0.8, 0.8, 0.85);
const LINE_COLOR: Color = Color::srgb(0.85, 0.85, 0.9);
const LINE_HIGHLIGHT: Color = Color::srgb(1.0, 0.85, 0.3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    ChangeRegion,
    FlyMode,
    Cancel,
}

impl MenuOption {
    fn label(self) -> &'static str {
        match self {
            MenuOption::ChangeRegion => "Change Region",
            MenuOption::FlyMode => "Fly",
            MenuOption::Cancel => "Cancel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    Main,
    /// Region picker reached through ChangeRegion.
    Region,
}

/// Open menu state. Exists as a resource only while the menu is up.
#[derive(Resource, Debug)]
pub struct MapMenu {
    pub kind: MenuKind,
    pub options: Vec<MenuOption>,
    /// Region numbers and display names, filled when entering the picker.
    pub region_choices: Vec<(i32, String)>,
    pub cursor: usize,
}

impl MapMenu {
    fn list_len(&self) -> usize {
        match self.kind {
            MenuKind::Main => self.options.len(),
            MenuKind::Region => self.region_choices.len(),
        }
    }

    fn labels(&self) -> Vec<String> {
        match self.kind {
            MenuKind::Main => self.options.iter().map(|o| o.label().to_string()).collect(),
            MenuKind::Region => self
                .region_choices
                .iter()
                .map(|(_, name)| name.clone())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuPlan {
    Nothing,
    /// Fly is the only real command; skip the menu.
    DirectFly,
    Open,
}

fn wrap_index(index: usize, step: i32, len: usize) -> usize {
    (index as i32 + step).rem_euclid(len as i32) as usize
}

/// Commands available right now. Cancel is always last; the rest depend
/// on mode, settings and progress.
fn build_options(
    session: &TownMapSession,
    settings: &Settings,
    switches: &GameSwitches,
    visited: &VisitedMaps,
    maps: &MapRegistry,
    location: &PlayerLocation,
) -> Vec<MenuOption> {
    let mut options = Vec::new();
    if session.mode == MapMode::Normal {
        if points::visited_regions(maps, visited).len() >= 2 {
            options.push(MenuOption::ChangeRegion);
        }
        let player_here =
            points::player_atlas_cell(session.region_number(), location, maps).is_some();
        if settings.fly_from_map
            && player_here
            && !points::fly_positions(&session.region, switches, visited).is_empty()
        {
            options.push(MenuOption::FlyMode);
        }
    }
    options.push(MenuOption::Cancel);
    options
}

fn plan_for(options: &[MenuOption]) -> MenuPlan {
    if options.len() < 2 {
        MenuPlan::Nothing
    } else if options.len() == 2 && options.contains(&MenuOption::FlyMode) {
        MenuPlan::DirectFly
    } else {
        MenuPlan::Open
    }
}

/// Turns on the fly chooser over the current region.
pub(super) fn begin_fly_select(
    session: &mut TownMapSession,
    switches: &GameSwitches,
    visited: &VisitedMaps,
    refresh: &mut EventWriter<MapCanvasRefreshEvent>,
) {
    session.fly_active = true;
    session.fly_positions = points::fly_positions(&session.region, switches, visited);
    refresh.send(MapCanvasRefreshEvent);
}

/// Handles the action key: opens the menu, or nothing when no command
/// beyond Cancel would be offered.
#[allow(clippy::too_many_arguments)]
pub(super) fn try_open_menu(
    commands: &mut Commands,
    session: &mut TownMapSession,
    settings: &Settings,
    switches: &GameSwitches,
    visited: &VisitedMaps,
    maps: &MapRegistry,
    location: &PlayerLocation,
    refresh: &mut EventWriter<MapCanvasRefreshEvent>,
    sfx: &mut EventWriter<PlaySfxEvent>,
) {
    if session.mode != MapMode::Normal || session.fly_active || session.viewport.zoomed {
        return;
    }
    let options = build_options(session, settings, switches, visited, maps, location);
    match plan_for(&options) {
        MenuPlan::Nothing => {}
        MenuPlan::DirectFly => {
            begin_fly_select(session, switches, visited, refresh);
            sfx.send(PlaySfxEvent { sfx: Sfx::Decision });
        }
        MenuPlan::Open => {
            commands.insert_resource(MapMenu {
                kind: MenuKind::Main,
                options,
                region_choices: Vec::new(),
                cursor: 0,
            });
            session.phase = MapPhase::Menu;
            sfx.send(PlaySfxEvent { sfx: Sfx::Decision });
        }
    }
}

fn close_menu(commands: &mut Commands, session: &mut TownMapSession) {
    commands.remove_resource::<MapMenu>();
    session.phase = MapPhase::Idle;
}

// ─── Systems ────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
pub fn menu_input(
    mut commands: Commands,
    mut session: ResMut<TownMapSession>,
    menu: Option<ResMut<MapMenu>>,
    input: Res<PlayerInput>,
    regions: Res<RegionRegistry>,
    maps: Res<MapRegistry>,
    location: Res<PlayerLocation>,
    switches: Res<GameSwitches>,
    visited: Res<VisitedMaps>,
    mut refresh: EventWriter<MapCanvasRefreshEvent>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    if session.phase != MapPhase::Menu {
        return;
    }
    let Some(mut menu) = menu else {
        return;
    };

    let step = (input.down_just as i32) - (input.up_just as i32);
    if step != 0 {
        let len = menu.list_len();
        if len > 1 {
            menu.cursor = wrap_index(menu.cursor, step, len);
            sfx.send(PlaySfxEvent { sfx: Sfx::Cursor });
        }
        return;
    }

    if input.cancel {
        close_menu(&mut commands, &mut session);
        sfx.send(PlaySfxEvent { sfx: Sfx::Cancel });
        return;
    }
    if !input.confirm {
        return;
    }

    match menu.kind {
        MenuKind::Main => match menu.options[menu.cursor] {
            MenuOption::Cancel => {
                close_menu(&mut commands, &mut session);
                sfx.send(PlaySfxEvent { sfx: Sfx::Cancel });
            }
            MenuOption::FlyMode => {
                close_menu(&mut commands, &mut session);
                begin_fly_select(&mut session, &switches, &visited, &mut refresh);
                sfx.send(PlaySfxEvent { sfx: Sfx::Decision });
            }
            MenuOption::ChangeRegion => {
                let current = session.region_number();
                let choices: Vec<(i32, String)> = points::visited_regions(&maps, &visited)
                    .into_iter()
                    .filter_map(|number| {
                        regions
                            .table
                            .try_get(number)
                            .map(|r| (number, r.name.clone()))
                    })
                    .collect();
                menu.cursor = choices.iter().position(|(n, _)| *n == current).unwrap_or(0);
                menu.region_choices = choices;
                menu.kind = MenuKind::Region;
                sfx.send(PlaySfxEvent { sfx: Sfx::Decision });
            }
        },
        MenuKind::Region => {
            let number = menu.region_choices[menu.cursor].0;
            close_menu(&mut commands, &mut session);
            if number != session.region_number() {
                let region = regions.table.get(number).clone();
                super::set_region(&mut session, region, &location, &maps);
                refresh.send(MapCanvasRefreshEvent);
            }
            sfx.send(PlaySfxEvent { sfx: Sfx::Decision });
        }
    }
}

// ─── UI ─────────────────────────────────────────────────────────────────

#[derive(Component)]
pub struct MapMenuRoot;

/// What the panel was built for; a mismatch forces a rebuild.
#[derive(Component)]
pub(super) struct MenuPanel {
    kind: MenuKind,
    len: usize,
}

#[derive(Component)]
struct MenuLine {
    index: usize,
}

pub fn sync_menu_ui(
    mut commands: Commands,
    menu: Option<Res<MapMenu>>,
    roots: Query<(Entity, &MenuPanel), With<MapMenuRoot>>,
    mut lines: Query<(&MenuLine, &mut TextColor)>,
) {
    let Some(menu) = menu else {
        for (root, _) in &roots {
            commands.entity(root).despawn_recursive();
        }
        return;
    };

    let labels = menu.labels();
    match roots.get_single() {
        Ok((_, panel)) if panel.kind == menu.kind && panel.len == labels.len() => {
            for (line, mut color) in &mut lines {
                *color = TextColor(if line.index == menu.cursor {
                    LINE_HIGHLIGHT
                } else {
                    LINE_COLOR
                });
            }
        }
        Ok((root, _)) => {
            commands.entity(root).despawn_recursive();
            spawn_menu_panel(&mut commands, &menu, &labels);
        }
        Err(_) => {
            spawn_menu_panel(&mut commands, &menu, &labels);
        }
    }
}

fn spawn_menu_panel(commands: &mut Commands, menu: &MapMenu, labels: &[String]) {
    commands
        .spawn((
            MapMenuRoot,
            MenuPanel {
                kind: menu.kind,
                len: labels.len(),
            },
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(700.0),
                top: Val::Px(120.0),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(6.0),
                padding: UiRect::all(Val::Px(12.0)),
                border: UiRect::all(Val::Px(2.0)),
                min_width: Val::Px(180.0),
                ..default()
            },
            BackgroundColor(PANEL_BG),
            BorderColor(PANEL_BORDER),
        ))
        .with_children(|parent| {
            for (index, label) in labels.iter().enumerate() {
                parent.spawn((
                    MenuLine { index },
                    Text::new(label.clone()),
                    TextFont {
                        font_size: 18.0,
                        ..default()
                    },
                    TextColor(if index == menu.cursor {
                        LINE_HIGHLIGHT
                    } else {
                        LINE_COLOR
                    }),
                ));
            }
        });
}

// ═══════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn fly_point(x: i32, y: i32, map_id: i32) -> PointDef {
        PointDef {
            position: (x, y),
            name: "Town".into(),
            description: String::new(),
            fly_spot: Some((map_id, 10, 12)),
            hide_fly_icon: false,
            fly_icon_offset: (0, 0),
            switch: None,
        }
    }

    fn region_with_fly() -> RegionDef {
        RegionDef {
            id: "home".into(),
            id_number: 0,
            name: "Home".into(),
            map_image: "home.png".into(),
            size: (30, 20),
            margins: (0, 0),
            cell_size: (16, 16),
            points: vec![fly_point(4, 6, 1)],
        }
    }

    fn map(id: i32, region: i32, x: i32, y: i32) -> MapInfo {
        MapInfo {
            id,
            name: format!("Map {id}"),
            atlas_position: Some((region, x, y)),
        }
    }

    struct World {
        session: TownMapSession,
        settings: Settings,
        switches: GameSwitches,
        visited: VisitedMaps,
        maps: MapRegistry,
        location: PlayerLocation,
    }

    fn world(mode: MapMode) -> World {
        let mut maps = MapRegistry::default();
        maps.table.register(map(1, 0, 4, 6));
        maps.table.register(map(2, 1, 3, 3));
        let mut visited = VisitedMaps::default();
        visited.visit(1);
        World {
            session: TownMapSession::new(region_with_fly(), mode),
            settings: Settings::default(),
            switches: GameSwitches::default(),
            visited,
            maps,
            location: PlayerLocation { map_id: 1 },
        }
    }

    fn options_of(w: &World) -> Vec<MenuOption> {
        build_options(
            &w.session,
            &w.settings,
            &w.switches,
            &w.visited,
            &w.maps,
            &w.location,
        )
    }

    #[test]
    fn fly_is_offered_on_the_players_own_region() {
        let w = world(MapMode::Normal);
        assert_eq!(options_of(&w), vec![MenuOption::FlyMode, MenuOption::Cancel]);
    }

    #[test]
    fn a_second_visited_region_unlocks_the_region_picker() {
        let mut w = world(MapMode::Normal);
        w.visited.visit(2);
        assert_eq!(
            options_of(&w),
            vec![
                MenuOption::ChangeRegion,
                MenuOption::FlyMode,
                MenuOption::Cancel
            ]
        );
    }

    #[test]
    fn the_wall_map_offers_no_commands() {
        let mut w = world(MapMode::WallMap);
        w.visited.visit(2);
        assert_eq!(options_of(&w), vec![MenuOption::Cancel]);
    }

    #[test]
    fn fly_needs_the_setting_switched_on() {
        let mut w = world(MapMode::Normal);
        w.settings.fly_from_map = false;
        assert_eq!(options_of(&w), vec![MenuOption::Cancel]);
    }

    #[test]
    fn fly_needs_the_player_standing_in_the_shown_region() {
        let mut w = world(MapMode::Normal);
        w.visited.visit(2);
        w.location.map_id = 2;
        assert_eq!(
            options_of(&w),
            vec![MenuOption::ChangeRegion, MenuOption::Cancel]
        );
    }

    #[test]
    fn a_lone_fly_command_skips_the_menu() {
        assert_eq!(
            plan_for(&[MenuOption::FlyMode, MenuOption::Cancel]),
            MenuPlan::DirectFly
        );
        assert_eq!(plan_for(&[MenuOption::Cancel]), MenuPlan::Nothing);
        assert_eq!(
            plan_for(&[MenuOption::ChangeRegion, MenuOption::Cancel]),
            MenuPlan::Open
        );
        assert_eq!(
            plan_for(&[
                MenuOption::ChangeRegion,
                MenuOption::FlyMode,
                MenuOption::Cancel
            ]),
            MenuPlan::Open
        );
    }

    #[test]
    fn the_cursor_wraps_around_the_list() {
        assert_eq!(wrap_index(0, -1, 3), 2);
        assert_eq!(wrap_index(2, 1, 3), 0);
        assert_eq!(wrap_index(1, 1, 3), 2);
    }
}
