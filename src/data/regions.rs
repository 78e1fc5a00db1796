use crate::shared::*;

/// Populate the RegionRegistry with the shipped region atlases.
///
/// Grid coordinates are atlas cells, not world tiles. A point's `fly_spot`
/// is `(map id, warp x, warp y)` on the destination map; points without
/// one (routes, landmarks) are browsable but never fly targets. A `switch`
/// entry keeps the point off the map until that game switch is on.
pub fn populate_regions(registry: &mut RegionRegistry) {
    let regions: Vec<RegionDef> = vec![
        // ── Embervale (mainland) ────────────────────────────────────────
        RegionDef {
            id: "embervale".into(),
            id_number: 0,
            name: "Embervale".into(),
            map_image: "atlas_embervale.png".into(),
            size: (30, 20),
            margins: (0, 0),
            cell_size: (16, 16),
            points: vec![
                PointDef {
                    position: (4, 6),
                    name: "Emberhollow".into(),
                    description: "A quiet town warmed by the old forge.".into(),
                    fly_spot: Some((1, 10, 12)),
                    hide_fly_icon: false,
                    fly_icon_offset: (0, 0),
                    switch: None,
                },
                PointDef {
                    position: (9, 6),
                    name: "Cinder Road".into(),
                    description: "The ash-strewn road east out of Emberhollow.".into(),
                    fly_spot: None,
                    hide_fly_icon: false,
                    fly_icon_offset: (0, 0),
                    switch: None,
                },
                PointDef {
                    position: (13, 5),
                    name: "Ashford".into(),
                    description: "A river crossing built on grey silt.".into(),
                    fly_spot: Some((3, 22, 9)),
                    hide_fly_icon: false,
                    fly_icon_offset: (0, 0),
                    switch: None,
                },
                PointDef {
                    position: (16, 7),
                    name: "Kiln Pass".into(),
                    description: "A steep cut through the firing hills.".into(),
                    fly_spot: None,
                    hide_fly_icon: false,
                    fly_icon_offset: (0, 0),
                    switch: None,
                },
                PointDef {
                    position: (18, 8),
                    name: "Pyrewatch".into(),
                    description: "The capital. Its beacons never go out.".into(),
                    fly_spot: Some((5, 14, 30)),
                    hide_fly_icon: false,
                    // Beacon tower art sits a touch above the cell center.
                    fly_icon_offset: (0, -4),
                    switch: None,
                },
                PointDef {
                    position: (2, 14),
                    name: "Hermit's Hollow".into(),
                    description: "An unmarked dell. Few know the way back.".into(),
                    fly_spot: Some((9, 5, 5)),
                    // Reachable by fly once visited, but never advertised.
                    hide_fly_icon: true,
                    fly_icon_offset: (0, 0),
                    switch: None,
                },
                PointDef {
                    position: (22, 12),
                    name: "Smelter's Quay".into(),
                    description: "Boats leave for Frostmere when the ferry runs.".into(),
                    fly_spot: Some((10, 8, 6)),
                    hide_fly_icon: false,
                    fly_icon_offset: (0, 0),
                    switch: Some(FERRY_SWITCH),
                },
            ],
        },
        // ── Frostmere (northern island) ─────────────────────────────────
        RegionDef {
            id: "frostmere".into(),
            id_number: 1,
            name: "Frostmere".into(),
            map_image: "atlas_frostmere.png".into(),
            size: (24, 18),
            margins: (8, 8),
            cell_size: (16, 16),
            points: vec![
                PointDef {
                    position: (6, 5),
                    name: "Glacier Gate".into(),
                    description: "The ferry landing under the ice wall.".into(),
                    fly_spot: Some((7, 8, 6)),
                    hide_fly_icon: false,
                    fly_icon_offset: (0, 0),
                    switch: None,
                },
                PointDef {
                    position: (11, 9),
                    name: "Frostmere Town".into(),
                    description: "Houses dug into the snow for warmth.".into(),
                    fly_spot: Some((8, 15, 20)),
                    hide_fly_icon: false,
                    fly_icon_offset: (0, 0),
                    switch: None,
                },
                PointDef {
                    position: (16, 4),
                    name: "Aurora Shelf".into(),
                    description: "A lookout over the frozen sea.".into(),
                    fly_spot: None,
                    hide_fly_icon: false,
                    fly_icon_offset: (0, 0),
                    switch: None,
                },
            ],
        },
    ];

    for region in regions {
        registry.table.register(region);
    }
}
