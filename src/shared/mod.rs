//! Shared components, resources, events, and states for Embervale.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly, with the deliberate
//! exception of `registry`, which is a plain library module.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::registry::{DualKey, NumericKey, RawKey, SymbolKey, Table, TableRecord};

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE — top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
    TownMap,
}

// ═══════════════════════════════════════════════════════════════════════
// STATIC DATA — REGION ATLASES
// ═══════════════════════════════════════════════════════════════════════

/// One landmark cell on a region atlas.
///
/// `fly_spot` is the warp target `(map id, x, y)` for points that double as
/// fly destinations. `switch` gates visibility behind a world switch; points
/// without one are always shown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointDef {
    pub position: (i32, i32),
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fly_spot: Option<(i32, i32, i32)>,
    #[serde(default)]
    pub hide_fly_icon: bool,
    #[serde(default)]
    pub fly_icon_offset: (i32, i32),
    #[serde(default)]
    pub switch: Option<i32>,
}

/// A whole region atlas: artwork, grid geometry and its landmark points.
///
/// Known by a symbolic id and by a stable numeric id; saves and older data
/// reference regions by number, scripts by symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionDef {
    pub id: String,
    pub id_number: i32,
    pub name: String,
    /// Artwork file under `assets/map/`.
    pub map_image: String,
    /// Grid extent in cells.
    pub size: (i32, i32),
    /// Artwork border in pixels outside the grid.
    #[serde(default)]
    pub margins: (i32, i32),
    /// Pixel size of one grid cell.
    #[serde(default = "default_cell_size")]
    pub cell_size: (i32, i32),
    pub points: Vec<PointDef>,
}

fn default_cell_size() -> (i32, i32) {
    (16, 16)
}

impl TableRecord for RegionDef {
    const KIND: &'static str = "region";

    fn symbol_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn numeric_id(&self) -> Option<i32> {
        Some(self.id_number)
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

// A region compares equal to either of its ids, so code holding a def can
// test it against keys without re-resolving.
impl PartialEq for RegionDef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl PartialEq<&str> for RegionDef {
    fn eq(&self, other: &&str) -> bool {
        self.id == *other
    }
}

impl PartialEq<i32> for RegionDef {
    fn eq(&self, other: &i32) -> bool {
        self.id_number == *other
    }
}

impl PartialEq<RawKey> for RegionDef {
    fn eq(&self, other: &RawKey) -> bool {
        match other {
            RawKey::Symbol(s) => self.id == *s,
            RawKey::Number(n) => self.id_number == *n,
        }
    }
}

#[derive(Resource, Default)]
pub struct RegionRegistry {
    pub table: Table<RegionDef, DualKey>,
}

// ═══════════════════════════════════════════════════════════════════════
// STATIC DATA — GAME MAPS
// ═══════════════════════════════════════════════════════════════════════

/// Per-map metadata. `atlas_position` is `(region numeric id, x, y)`: the
/// cell this map occupies on its region atlas. Maps without one (interiors,
/// caves) never place the player pin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapInfo {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub atlas_position: Option<(i32, i32, i32)>,
}

impl TableRecord for MapInfo {
    const KIND: &'static str = "map";

    fn numeric_id(&self) -> Option<i32> {
        Some(self.id)
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for MapInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl PartialEq<i32> for MapInfo {
    fn eq(&self, other: &i32) -> bool {
        self.id == *other
    }
}

#[derive(Resource, Default)]
pub struct MapRegistry {
    pub table: Table<MapInfo, NumericKey>,
}

// ═══════════════════════════════════════════════════════════════════════
// STATIC DATA — MARKER ICONS
// ═══════════════════════════════════════════════════════════════════════

/// One stamp icon usable in the marker slots of an atlas cell. Lineup order
/// on the editor's icon row is registration order; slot value `n` means the
/// `n`-th registered icon, with 0 reserved for "empty".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkIconDef {
    pub id: String,
    pub name: String,
    /// Flat display color as sRGB components.
    pub color: (f32, f32, f32),
}

impl TableRecord for MarkIconDef {
    const KIND: &'static str = "mark icon";

    fn symbol_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for MarkIconDef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl PartialEq<&str> for MarkIconDef {
    fn eq(&self, other: &&str) -> bool {
        self.id == *other
    }
}

#[derive(Resource, Default)]
pub struct MarkIconRegistry {
    pub table: Table<MarkIconDef, SymbolKey>,
}

// ═══════════════════════════════════════════════════════════════════════
// WORLD PROGRESS
// ═══════════════════════════════════════════════════════════════════════

/// Story/world boolean switches, keyed by positive id.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameSwitches {
    pub switches: HashMap<i32, bool>,
}

impl GameSwitches {
    pub fn is_on(&self, id: i32) -> bool {
        *self.switches.get(&id).unwrap_or(&false)
    }

    pub fn set(&mut self, id: i32, on: bool) {
        self.switches.insert(id, on);
    }

    pub fn toggle(&mut self, id: i32) -> bool {
        let on = !self.is_on(id);
        self.set(id, on);
        on
    }
}

/// Ids of maps the player has set foot on. Gates fly destinations and the
/// region list of the atlas screen.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisitedMaps {
    pub maps: HashSet<i32>,
}

impl VisitedMaps {
    pub fn visit(&mut self, map_id: i32) {
        self.maps.insert(map_id);
    }

    pub fn contains(&self, map_id: i32) -> bool {
        self.maps.contains(&map_id)
    }
}

/// Where the player currently stands.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct PlayerLocation {
    pub map_id: i32,
}

impl Default for PlayerLocation {
    fn default() -> Self {
        Self {
            map_id: STARTING_MAP_ID,
        }
    }
}

/// Number of marker slots per atlas cell.
pub const MARKING_SLOTS: usize = 4;

/// Player-placed markers for one atlas cell. `slots[i] == 0` means slot `i`
/// is empty; `n > 0` selects the `n`-th registered marker icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkingEntry {
    pub x: i32,
    pub y: i32,
    pub slots: [u8; MARKING_SLOTS],
}

impl MarkingEntry {
    pub fn is_blank(&self) -> bool {
        self.slots.iter().all(|&s| s == 0)
    }
}

/// All placed markers, grouped by region numeric id. Storage is sparse:
/// cells with no marker have no entry, and writing an all-empty entry
/// deletes whatever was stored for that cell.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkingStore {
    pub regions: HashMap<i32, Vec<MarkingEntry>>,
}

impl MarkingStore {
    /// Slot values at a cell; zeros when nothing is stored.
    pub fn slots_at(&self, region: i32, x: i32, y: i32) -> [u8; MARKING_SLOTS] {
        self.regions
            .get(&region)
            .and_then(|entries| entries.iter().find(|e| e.x == x && e.y == y))
            .map(|e| e.slots)
            .unwrap_or([0; MARKING_SLOTS])
    }

    /// Stores, replaces or deletes the entry for the cell `entry` names.
    pub fn apply(&mut self, region: i32, entry: MarkingEntry) {
        if entry.is_blank() {
            if let Some(entries) = self.regions.get_mut(&region) {
                entries.retain(|e| e.x != entry.x || e.y != entry.y);
                if entries.is_empty() {
                    self.regions.remove(&region);
                }
            }
            return;
        }
        let entries = self.regions.entry(region).or_default();
        match entries.iter_mut().find(|e| e.x == entry.x && e.y == entry.y) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
    }

    pub fn entries(&self, region: i32) -> &[MarkingEntry] {
        self.regions.get(&region).map(Vec::as_slice).unwrap_or(&[])
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SETTINGS
// ═══════════════════════════════════════════════════════════════════════

/// Feature toggles for the atlas screen.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Confirm on a cell zooms in and shows the details panel.
    pub zoom_for_details: bool,
    /// The marker editor is available.
    pub marking: bool,
    /// Fly travel can be started from the atlas screen menu.
    pub fly_from_map: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            zoom_for_details: true,
            marking: true,
            fly_from_map: true,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// INPUT
// ═══════════════════════════════════════════════════════════════════════

/// Logical input state for the current frame, written by the input plugin
/// in PreUpdate. Direction fields are held-state; the `_just` variants and
/// everything else are just-pressed edges.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub up_just: bool,
    pub down_just: bool,
    pub left_just: bool,
    pub right_just: bool,
    pub confirm: bool,
    pub cancel: bool,
    pub action: bool,
    pub open_map: bool,
    pub open_wall_map: bool,
    pub open_fly: bool,
    pub quicksave: bool,
    pub quickload: bool,
    pub debug_switch: bool,
    pub debug_export: bool,
}

/// Which logical inputs get read this frame, derived from [`GameState`].
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputContext {
    #[default]
    Disabled,
    Gameplay,
    MapScreen,
}

/// Physical keys per logical input.
#[derive(Resource, Debug, Clone)]
pub struct KeyBindings {
    pub up: &'static [KeyCode],
    pub down: &'static [KeyCode],
    pub left: &'static [KeyCode],
    pub right: &'static [KeyCode],
    pub confirm: &'static [KeyCode],
    pub cancel: &'static [KeyCode],
    pub action: &'static [KeyCode],
    pub open_map: &'static [KeyCode],
    pub open_wall_map: &'static [KeyCode],
    pub open_fly: &'static [KeyCode],
    pub quicksave: &'static [KeyCode],
    pub quickload: &'static [KeyCode],
    pub debug_switch: &'static [KeyCode],
    pub debug_export: &'static [KeyCode],
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            up: &[KeyCode::ArrowUp, KeyCode::KeyW],
            down: &[KeyCode::ArrowDown, KeyCode::KeyS],
            left: &[KeyCode::ArrowLeft, KeyCode::KeyA],
            right: &[KeyCode::ArrowRight, KeyCode::KeyD],
            confirm: &[KeyCode::Enter, KeyCode::KeyZ],
            cancel: &[KeyCode::Escape, KeyCode::KeyX],
            action: &[KeyCode::Space, KeyCode::KeyC],
            open_map: &[KeyCode::KeyM],
            open_wall_map: &[KeyCode::KeyN],
            open_fly: &[KeyCode::KeyF],
            quicksave: &[KeyCode::F5],
            quickload: &[KeyCode::F9],
            debug_switch: &[KeyCode::KeyG],
            debug_export: &[KeyCode::F12],
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ATLAS SCREEN CONTRACT
// ═══════════════════════════════════════════════════════════════════════

/// How the atlas screen behaves for one showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapMode {
    /// Interactive: zoom, markers, menu, optional fly sub-mode.
    #[default]
    Normal,
    /// Decorative wall chart: browse only, switch-gated points stay hidden.
    WallMap,
    /// Opened as a fly-destination chooser.
    Fly,
}

/// Why the atlas screen closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapScreenResult {
    Quit,
    Fly { map_id: i32, x: i32, y: i32 },
}

/// Inserted by the overworld before switching to [`GameState::TownMap`];
/// consumed by the screen on entry. `region: None` derives the region from
/// the player's current map.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct MapScreenRequest {
    pub mode: MapMode,
    pub region: Option<i32>,
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Event, Debug, Clone)]
pub struct SaveRequestEvent {
    pub slot: usize,
}

#[derive(Event, Debug, Clone)]
pub struct LoadRequestEvent {
    pub slot: usize,
}

#[derive(Event, Debug, Clone)]
pub struct SaveCompleteEvent {
    pub slot: usize,
    pub success: bool,
    pub error_message: Option<String>,
}

#[derive(Event, Debug, Clone)]
pub struct LoadCompleteEvent {
    pub success: bool,
}

/// The atlas screen is done; the overworld acts on the result.
#[derive(Event, Debug, Clone)]
pub struct MapScreenClosedEvent {
    pub result: MapScreenResult,
}

/// Cell-level content of the atlas canvas changed (region swap, marker
/// edit, fly icons shown or hidden); visuals rebuild in response.
#[derive(Event, Debug, Clone, Default)]
pub struct MapCanvasRefreshEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sfx {
    Cursor,
    Decision,
    Cancel,
    Buzzer,
}

#[derive(Event, Debug, Clone)]
pub struct PlaySfxEvent {
    pub sfx: Sfx,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const SCREEN_WIDTH: f32 = 960.0;
pub const SCREEN_HEIGHT: f32 = 540.0;

/// Top-left of the scrolling map window, in UI pixels.
pub const MAP_TOP_LEFT: Vec2 = Vec2::new(16.0, 16.0);
/// Size of the scrolling map window.
pub const MAP_VIEW_SIZE: Vec2 = Vec2::new(480.0, 320.0);
/// Cursor distance from a window edge that starts scroll-follow.
pub const MAP_SCROLL_PADDING: Vec2 = Vec2::new(64.0, 64.0);
/// Where the cursor is pinned on screen while zoomed in.
pub const ZOOM_CURSOR_POS: Vec2 = Vec2::new(120.0, 160.0);

/// Seconds to glide one cell at zoom 1.
pub const CURSOR_MOVE_TIME: f32 = 0.08;
/// Seconds for the zoom in/out transition.
pub const ZOOM_TIME: f32 = 0.2;
/// Magnification while the details panel is open.
pub const DETAIL_ZOOM: f32 = 2.0;

/// Map the player starts on in a fresh game.
pub const STARTING_MAP_ID: i32 = 1;

/// Switch toggled by the overworld debug key, gating the ferry landmark.
pub const FERRY_SWITCH: i32 = 5;

// ═══════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(x: i32, y: i32, slots: [u8; MARKING_SLOTS]) -> MarkingEntry {
        MarkingEntry { x, y, slots }
    }

    #[test]
    fn marking_store_returns_zeros_for_untouched_cells() {
        let store = MarkingStore::default();
        assert_eq!(store.slots_at(0, 4, 7), [0; MARKING_SLOTS]);
        assert!(store.entries(0).is_empty());
    }

    #[test]
    fn marking_store_replaces_entries_per_cell() {
        let mut store = MarkingStore::default();
        store.apply(0, entry(4, 7, [1, 0, 0, 0]));
        store.apply(0, entry(4, 7, [1, 0, 3, 0]));
        store.apply(0, entry(2, 2, [0, 2, 0, 0]));

        assert_eq!(store.slots_at(0, 4, 7), [1, 0, 3, 0]);
        assert_eq!(store.entries(0).len(), 2);
    }

    #[test]
    fn clearing_every_slot_deletes_the_stored_entry() {
        let mut store = MarkingStore::default();
        store.apply(0, entry(4, 7, [1, 0, 0, 0]));
        store.apply(0, entry(4, 7, [0, 0, 0, 0]));

        assert!(store.entries(0).is_empty());
        // The region bucket itself goes away once its last entry does.
        assert!(store.regions.is_empty());
    }

    #[test]
    fn blank_apply_on_an_empty_store_is_a_no_op() {
        let mut store = MarkingStore::default();
        store.apply(3, entry(0, 0, [0; MARKING_SLOTS]));
        assert!(store.regions.is_empty());
    }

    #[test]
    fn markings_are_kept_per_region() {
        let mut store = MarkingStore::default();
        store.apply(0, entry(4, 7, [1, 0, 0, 0]));
        store.apply(1, entry(4, 7, [2, 0, 0, 0]));

        assert_eq!(store.slots_at(0, 4, 7), [1, 0, 0, 0]);
        assert_eq!(store.slots_at(1, 4, 7), [2, 0, 0, 0]);
    }

    #[test]
    fn region_def_compares_against_its_keys() {
        let region = RegionDef {
            id: "embervale".into(),
            id_number: 0,
            name: "Embervale".into(),
            map_image: "region_embervale.png".into(),
            size: (10, 10),
            margins: (0, 0),
            cell_size: (16, 16),
            points: vec![],
        };
        assert!(region == "embervale");
        assert!(region == 0);
        assert!(region == RawKey::Symbol("embervale".into()));
        assert!(region != 3);
    }

    #[test]
    fn switches_default_off_and_toggle() {
        let mut switches = GameSwitches::default();
        assert!(!switches.is_on(FERRY_SWITCH));
        assert!(switches.toggle(FERRY_SWITCH));
        assert!(switches.is_on(FERRY_SWITCH));
        assert!(!switches.toggle(FERRY_SWITCH));
    }
}
