use crate::shared::*;

/// Populate the MapRegistry with every playable map.
///
/// `atlas_position` places the map on a region atlas as `(region, x, y)`.
/// Interiors carry `None` and inherit their position from whatever map
/// the player last stood on outdoors.
pub fn populate_maps(registry: &mut MapRegistry) {
    let maps: Vec<MapInfo> = vec![
        MapInfo {
            id: 1,
            name: "Emberhollow".into(),
            atlas_position: Some((0, 4, 6)),
        },
        MapInfo {
            id: 2,
            name: "Emberhollow Forge".into(),
            atlas_position: None,
        },
        MapInfo {
            id: 3,
            name: "Ashford".into(),
            atlas_position: Some((0, 13, 5)),
        },
        MapInfo {
            id: 4,
            name: "Cinder Road".into(),
            atlas_position: Some((0, 9, 6)),
        },
        MapInfo {
            id: 5,
            name: "Pyrewatch".into(),
            atlas_position: Some((0, 18, 8)),
        },
        MapInfo {
            id: 6,
            name: "Kiln Pass".into(),
            atlas_position: Some((0, 16, 7)),
        },
        MapInfo {
            id: 7,
            name: "Glacier Gate".into(),
            atlas_position: Some((1, 6, 5)),
        },
        MapInfo {
            id: 8,
            name: "Frostmere Town".into(),
            atlas_position: Some((1, 11, 9)),
        },
        MapInfo {
            id: 9,
            name: "Hermit's Hollow".into(),
            atlas_position: Some((0, 2, 14)),
        },
        MapInfo {
            id: 10,
            name: "Smelter's Quay".into(),
            atlas_position: Some((0, 22, 12)),
        },
    ];

    for map in maps {
        registry.table.register(map);
    }
}
