use crate::shared::*;

/// Populate the MarkIconRegistry. Registration order is the order the
/// marking editor's lineup shows, after its leading "no mark" entry.
pub fn populate_mark_icons(registry: &mut MarkIconRegistry) {
    let icons: Vec<MarkIconDef> = vec![
        MarkIconDef {
            id: "flag_red".into(),
            name: "Red Flag".into(),
            color: (0.86, 0.2, 0.2),
        },
        MarkIconDef {
            id: "flag_blue".into(),
            name: "Blue Flag".into(),
            color: (0.25, 0.45, 0.9),
        },
        MarkIconDef {
            id: "star".into(),
            name: "Star".into(),
            color: (1.0, 0.85, 0.3),
        },
        MarkIconDef {
            id: "skull".into(),
            name: "Skull".into(),
            color: (0.6, 0.6, 0.65),
        },
    ];

    for icon in icons {
        registry.table.register(icon);
    }
}
