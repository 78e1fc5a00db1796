//! Data layer — populates all registries at game startup.
//!
//! This plugin runs in OnEnter(GameState::Loading), fills every registry
//! (RegionRegistry, MapRegistry, MarkIconRegistry) from the hard-coded
//! definitions in submodules, then transitions into GameState::Playing.
//!
//! On native builds a RON file under `assets/data/` replaces the built-in
//! table wholesale, so regions can be reshaped without a rebuild; F12
//! exports the built-ins as editable templates. No other domain seeds
//! these resources.

mod icons;
mod maps;
mod regions;

use bevy::prelude::*;

use crate::shared::*;

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Loading), load_all_data);
        #[cfg(not(target_arch = "wasm32"))]
        app.add_systems(
            Update,
            export_data_templates.run_if(in_state(GameState::Playing)),
        );
    }
}

/// Single system that populates every registry and then transitions to
/// Playing.
fn load_all_data(
    mut regions: ResMut<RegionRegistry>,
    mut maps: ResMut<MapRegistry>,
    mut icons: ResMut<MarkIconRegistry>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    info!("DataPlugin: populating registries");

    regions::populate_regions(&mut regions);
    #[cfg(not(target_arch = "wasm32"))]
    load_override(&mut regions.table, "regions");
    info!("  Regions loaded: {}", regions.table.len());

    maps::populate_maps(&mut maps);
    #[cfg(not(target_arch = "wasm32"))]
    load_override(&mut maps.table, "maps");
    info!("  Maps loaded: {}", maps.table.len());

    icons::populate_mark_icons(&mut icons);
    #[cfg(not(target_arch = "wasm32"))]
    load_override(&mut icons.table, "mark_icons");
    info!("  Mark icons loaded: {}", icons.table.len());

    info!("DataPlugin: all registries populated. Transitioning to Playing.");
    next_state.set(GameState::Playing);
}

/// Replaces a built-in table with `assets/data/<name>.ron` when the file
/// exists. A file that fails to parse is reported and ignored so the game
/// still boots on the shipped data.
#[cfg(not(target_arch = "wasm32"))]
fn load_override<R, S>(table: &mut crate::registry::Table<R, S>, name: &str)
where
    R: crate::registry::TableRecord + serde::Serialize + serde::de::DeserializeOwned,
    S: crate::registry::KeyScheme,
{
    let path = std::path::Path::new("assets/data").join(format!("{name}.ron"));
    if !path.exists() {
        return;
    }
    match crate::registry::Table::load(&path) {
        Ok(loaded) => {
            *table = loaded;
            info!("  Override applied: {}", path.display());
        }
        Err(err) => warn!("  Ignoring {}: {err}", path.display()),
    }
}

/// F12 writes the live tables out as RON under `assets/data/`, giving a
/// starting point for hand edits.
#[cfg(not(target_arch = "wasm32"))]
fn export_data_templates(
    input: Res<PlayerInput>,
    regions: Res<RegionRegistry>,
    maps: Res<MapRegistry>,
    icons: Res<MarkIconRegistry>,
) {
    if !input.debug_export {
        return;
    }
    let dir = std::path::Path::new("assets/data");
    if let Err(err) = std::fs::create_dir_all(dir) {
        warn!("Could not create {}: {err}", dir.display());
        return;
    }
    export_one(&regions.table, &dir.join("regions.ron"));
    export_one(&maps.table, &dir.join("maps.ron"));
    export_one(&icons.table, &dir.join("mark_icons.ron"));
}

#[cfg(not(target_arch = "wasm32"))]
fn export_one<R, S>(table: &crate::registry::Table<R, S>, path: &std::path::Path)
where
    R: crate::registry::TableRecord + serde::Serialize + serde::de::DeserializeOwned,
    S: crate::registry::KeyScheme,
{
    match table.save(path) {
        Ok(()) => info!("Exported {}", path.display()),
        Err(err) => warn!("Export of {} failed: {err}", path.display()),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn populated() -> (RegionRegistry, MapRegistry, MarkIconRegistry) {
        let mut regions = RegionRegistry::default();
        let mut maps = MapRegistry::default();
        let mut icons = MarkIconRegistry::default();
        regions::populate_regions(&mut regions);
        maps::populate_maps(&mut maps);
        icons::populate_mark_icons(&mut icons);
        (regions, maps, icons)
    }

    #[test]
    fn regions_resolve_by_both_key_flavors() {
        let (regions, _, _) = populated();
        assert_eq!(regions.table.get("embervale").id_number, 0);
        assert_eq!(regions.table.get(1).name, "Frostmere");
        assert!(regions.table.try_get("hoenn").is_none());
    }

    #[test]
    fn every_fly_destination_is_a_real_map() {
        let (regions, maps, _) = populated();
        for region in regions.table.iter() {
            for point in &region.points {
                if let Some((map_id, _, _)) = point.fly_spot {
                    assert!(
                        maps.table.contains(map_id),
                        "{} names missing map {map_id}",
                        point.name
                    );
                }
            }
        }
    }

    #[test]
    fn every_atlas_position_lands_inside_its_region_grid() {
        let (regions, maps, _) = populated();
        for map in maps.table.iter() {
            let Some((region_number, x, y)) = map.atlas_position else {
                continue;
            };
            let region = regions
                .table
                .try_get(region_number)
                .unwrap_or_else(|| panic!("{} names missing region {region_number}", map.name));
            assert!(
                x >= 0 && x < region.size.0 && y >= 0 && y < region.size.1,
                "{} sits outside the {} grid",
                map.name,
                region.name
            );
        }
    }

    #[test]
    fn the_starting_map_is_on_the_first_region() {
        let (_, maps, _) = populated();
        let start = maps.table.get(STARTING_MAP_ID);
        assert_eq!(start.atlas_position.map(|(r, _, _)| r), Some(0));
    }

    #[test]
    fn the_ferry_dock_waits_on_its_switch() {
        let (regions, _, _) = populated();
        let dock = regions
            .table
            .get("embervale")
            .points
            .iter()
            .find(|p| p.position == (22, 12))
            .unwrap();
        assert_eq!(dock.switch, Some(FERRY_SWITCH));
        assert!(dock.fly_spot.is_some());
    }

    #[test]
    fn mark_icons_keep_registration_order() {
        let (_, _, icons) = populated();
        let ids: Vec<&str> = icons.table.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["flag_red", "flag_blue", "star", "skull"]);
    }
}
