//! Landmark lookup and visibility rules.
//!
//! Points are plain data on the region def; everything stateful (world
//! switches, visited maps) comes in as arguments so these stay pure.

use crate::shared::*;

/// Whether a point shows up at all in the given screen mode.
///
/// A point with no switch is always visible. A switch-gated point is
/// hidden on wall charts outright, and otherwise shown only for a valid
/// (positive) switch id that is currently on.
pub fn point_visible(point: &PointDef, mode: MapMode, switches: &GameSwitches) -> bool {
    match point.switch {
        None => true,
        Some(id) => !(mode == MapMode::WallMap || id <= 0 || !switches.is_on(id)),
    }
}

/// The point under a cell, if any. The first entry matching the position
/// wins; if that entry is gated off, the cell reads as empty even when a
/// later entry shares the position.
pub fn point_at<'a>(
    region: &'a RegionDef,
    x: i32,
    y: i32,
    mode: MapMode,
    switches: &GameSwitches,
) -> Option<&'a PointDef> {
    region
        .points
        .iter()
        .find(|p| p.position == (x, y))
        .filter(|p| point_visible(p, mode, switches))
}

/// Whether a point can actually be flown to right now: it must carry a fly
/// spot, pass its switch gate, and target a map the player has visited.
pub fn fly_usable(point: &PointDef, switches: &GameSwitches, visited: &VisitedMaps) -> bool {
    let Some((map_id, _, _)) = point.fly_spot else {
        return false;
    };
    let gate_ok = match point.switch {
        None => true,
        Some(id) => id > 0 && switches.is_on(id),
    };
    gate_ok && visited.contains(map_id)
}

/// Cells that accept a fly command, hidden-icon destinations included.
pub fn fly_positions(
    region: &RegionDef,
    switches: &GameSwitches,
    visited: &VisitedMaps,
) -> Vec<(i32, i32)> {
    region
        .points
        .iter()
        .filter(|p| fly_usable(p, switches, visited))
        .map(|p| p.position)
        .collect()
}

/// Fly destinations that get an icon drawn on the canvas.
pub fn fly_icon_points<'a>(
    region: &'a RegionDef,
    switches: &GameSwitches,
    visited: &VisitedMaps,
) -> Vec<&'a PointDef> {
    region
        .points
        .iter()
        .filter(|p| fly_usable(p, switches, visited) && !p.hide_fly_icon)
        .collect()
}

/// Numeric ids of regions the player has been to, in map-id order of first
/// encounter. Drives the change-region menu.
pub fn visited_regions(maps: &MapRegistry, visited: &VisitedMaps) -> Vec<i32> {
    let mut regions = Vec::new();
    for map in maps.table.iter() {
        let Some((region, _, _)) = map.atlas_position else {
            continue;
        };
        if regions.contains(&region) || !visited.contains(map.id) {
            continue;
        }
        regions.push(region);
    }
    regions
}

/// The player's cell on the given region atlas, or `None` when the current
/// map has no atlas position or belongs to another region.
pub fn player_atlas_cell(
    region_number: i32,
    location: &PlayerLocation,
    maps: &MapRegistry,
) -> Option<(i32, i32)> {
    let map = maps.table.try_get(location.map_id)?;
    let (region, x, y) = map.atlas_position?;
    (region == region_number).then_some((x, y))
}

/// Fallback cursor cell when the player is off-atlas: the grid's middle.
pub fn default_cursor_cell(region: &RegionDef) -> (i32, i32) {
    ((region.size.0 - 1) / 2, (region.size.1 - 1) / 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: i32, y: i32, name: &str) -> PointDef {
        PointDef {
            position: (x, y),
            name: name.into(),
            description: String::new(),
            fly_spot: None,
            hide_fly_icon: false,
            fly_icon_offset: (0, 0),
            switch: None,
        }
    }

    fn region_with(points: Vec<PointDef>) -> RegionDef {
        RegionDef {
            id: "test".into(),
            id_number: 0,
            name: "Test".into(),
            map_image: "test.png".into(),
            size: (10, 10),
            margins: (0, 0),
            cell_size: (16, 16),
            points,
        }
    }

    fn map(id: i32, region: i32, x: i32, y: i32) -> MapInfo {
        MapInfo {
            id,
            name: format!("Map {id}"),
            atlas_position: Some((region, x, y)),
        }
    }

    #[test]
    fn ungated_points_are_always_visible() {
        let switches = GameSwitches::default();
        let region = region_with(vec![point(3, 3, "Harbor")]);

        assert!(point_at(&region, 3, 3, MapMode::Normal, &switches).is_some());
        assert!(point_at(&region, 3, 3, MapMode::WallMap, &switches).is_some());
        assert!(point_at(&region, 4, 3, MapMode::Normal, &switches).is_none());
    }

    #[test]
    fn switch_gating_follows_the_switch_state() {
        let mut switches = GameSwitches::default();
        let mut p = point(3, 3, "Ferry Landing");
        p.switch = Some(5);
        let region = region_with(vec![p]);

        assert!(point_at(&region, 3, 3, MapMode::Normal, &switches).is_none());
        switches.set(5, true);
        assert_eq!(
            point_at(&region, 3, 3, MapMode::Normal, &switches).map(|p| p.name.as_str()),
            Some("Ferry Landing")
        );
    }

    #[test]
    fn wall_charts_never_show_gated_points() {
        let mut switches = GameSwitches::default();
        switches.set(5, true);
        let mut p = point(3, 3, "Ferry Landing");
        p.switch = Some(5);
        let region = region_with(vec![p]);

        assert!(point_at(&region, 3, 3, MapMode::WallMap, &switches).is_none());
    }

    #[test]
    fn nonpositive_switch_ids_hide_the_point() {
        let switches = GameSwitches::default();
        let mut p = point(2, 2, "Broken Data");
        p.switch = Some(0);
        let region = region_with(vec![p]);

        assert!(point_at(&region, 2, 2, MapMode::Normal, &switches).is_none());
    }

    #[test]
    fn a_gated_first_entry_shadows_later_entries_on_the_cell() {
        let switches = GameSwitches::default();
        let mut gated = point(3, 3, "Hidden Cove");
        gated.switch = Some(9);
        let open = point(3, 3, "Open Cove");
        let region = region_with(vec![gated, open]);

        // First match wins and is gated off; the cell reads empty.
        assert!(point_at(&region, 3, 3, MapMode::Normal, &switches).is_none());
    }

    #[test]
    fn fly_needs_a_spot_a_passing_gate_and_a_visited_target() {
        let mut switches = GameSwitches::default();
        let mut visited = VisitedMaps::default();

        let mut p = point(1, 1, "Ashport");
        assert!(!fly_usable(&p, &switches, &visited));

        p.fly_spot = Some((4, 10, 12));
        assert!(!fly_usable(&p, &switches, &visited), "target not visited");

        visited.visit(4);
        assert!(fly_usable(&p, &switches, &visited));

        p.switch = Some(5);
        assert!(!fly_usable(&p, &switches, &visited), "gate off");
        switches.set(5, true);
        assert!(fly_usable(&p, &switches, &visited));
    }

    #[test]
    fn hidden_icon_destinations_stay_usable_but_undrawn() {
        let switches = GameSwitches::default();
        let mut visited = VisitedMaps::default();
        visited.visit(4);

        let mut p = point(1, 1, "Secret Grove");
        p.fly_spot = Some((4, 2, 2));
        p.hide_fly_icon = true;
        let region = region_with(vec![p]);

        assert_eq!(fly_positions(&region, &switches, &visited), vec![(1, 1)]);
        assert!(fly_icon_points(&region, &switches, &visited).is_empty());
    }

    #[test]
    fn visited_regions_dedupe_in_first_encounter_order() {
        let mut maps = MapRegistry::default();
        maps.table.register(map(1, 0, 2, 2));
        maps.table.register(map(2, 0, 3, 2));
        maps.table.register(map(3, 1, 5, 5));
        maps.table.register(MapInfo {
            id: 4,
            name: "Deep Cave".into(),
            atlas_position: None,
        });

        let mut visited = VisitedMaps::default();
        visited.visit(2);
        visited.visit(3);
        visited.visit(4);

        assert_eq!(visited_regions(&maps, &visited), vec![0, 1]);
    }

    #[test]
    fn player_cell_requires_the_matching_region() {
        let mut maps = MapRegistry::default();
        maps.table.register(map(1, 0, 2, 2));
        let location = PlayerLocation { map_id: 1 };

        assert_eq!(player_atlas_cell(0, &location, &maps), Some((2, 2)));
        assert_eq!(player_atlas_cell(1, &location, &maps), None);

        let lost = PlayerLocation { map_id: 99 };
        assert_eq!(player_atlas_cell(0, &lost, &maps), None);
    }

    #[test]
    fn fallback_cursor_cell_is_the_grid_middle() {
        let region = region_with(vec![]);
        assert_eq!(default_cursor_cell(&region), (4, 4));
    }
}
