//! Save and load.
//!
//! One JSON file per slot under `saves/` next to the executable. Writes
//! go to a temp file first and rename into place, so a crash mid-write
//! never eats an existing save. Browser builds keep the same JSON blobs
//! in localStorage under per-slot keys.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
#[cfg(not(target_arch = "wasm32"))]
use std::fs;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;
use std::time::Duration;
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// PUBLIC TYPES
// ═══════════════════════════════════════════════════════════════════════

pub const SAVE_VERSION: u32 = 1;
pub const NUM_SAVE_SLOTS: usize = 3;

/// Metadata for one slot, shown in logs and any future load screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSlotInfo {
    pub slot: usize,
    pub exists: bool,
    pub map_id: i32,
    pub visited_count: usize,
    pub play_time_seconds: u64,
    pub save_timestamp: u64,
}

impl Default for SaveSlotInfo {
    fn default() -> Self {
        Self {
            slot: 0,
            exists: false,
            map_id: STARTING_MAP_ID,
            visited_count: 0,
            play_time_seconds: 0,
            save_timestamp: 0,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// RESOURCES
// ═══════════════════════════════════════════════════════════════════════

/// Wall-clock play time. `carry` keeps the sub-second remainder between
/// whole-second transfers into `seconds`.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayTime {
    pub seconds: u64,
    carry: Duration,
}

/// Cached metadata for every slot, filled by the startup scan.
#[derive(Resource, Debug, Clone, Default)]
pub struct SaveSlotInfoCache {
    pub slots: Vec<SaveSlotInfo>,
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayTime>()
            .init_resource::<SaveSlotInfoCache>()
            .add_event::<SaveRequestEvent>()
            .add_event::<LoadRequestEvent>()
            .add_event::<SaveCompleteEvent>()
            .add_event::<LoadCompleteEvent>()
            .add_systems(Startup, scan_save_slots)
            .add_systems(
                Update,
                (tick_play_time, handle_save_request, handle_load_request)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// STORAGE BACKENDS
// ═══════════════════════════════════════════════════════════════════════

#[cfg(not(target_arch = "wasm32"))]
fn saves_directory() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));
    exe_dir.join("saves")
}

#[cfg(not(target_arch = "wasm32"))]
fn slot_path(slot: usize) -> PathBuf {
    saves_directory().join(format!("slot_{slot}.json"))
}

#[cfg(not(target_arch = "wasm32"))]
fn store_blob(slot: usize, json: &str) -> Result<(), String> {
    let dir = saves_directory();
    fs::create_dir_all(&dir).map_err(|e| format!("Could not create {}: {e}", dir.display()))?;

    let path = slot_path(slot);
    // Write to a temp file first, then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json)
        .map_err(|e| format!("Write failed for {}: {e}", tmp_path.display()))?;
    fs::rename(&tmp_path, &path).map_err(|e| format!("Rename failed: {e}"))?;
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn fetch_blob(slot: usize) -> Result<String, String> {
    let path = slot_path(slot);
    if !path.exists() {
        return Err(format!("Save slot {slot} does not exist"));
    }
    fs::read_to_string(&path).map_err(|e| format!("Read failed for {}: {e}", path.display()))
}

#[cfg(not(target_arch = "wasm32"))]
fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(target_arch = "wasm32")]
fn storage_key(slot: usize) -> String {
    format!("embervale_save_slot_{slot}")
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

#[cfg(target_arch = "wasm32")]
fn store_blob(slot: usize, json: &str) -> Result<(), String> {
    local_storage()
        .ok_or_else(|| String::from("localStorage unavailable"))?
        .set_item(&storage_key(slot), json)
        .map_err(|_| String::from("localStorage write failed"))
}

#[cfg(target_arch = "wasm32")]
fn fetch_blob(slot: usize) -> Result<String, String> {
    local_storage()
        .ok_or_else(|| String::from("localStorage unavailable"))?
        .get_item(&storage_key(slot))
        .ok()
        .flatten()
        .ok_or_else(|| format!("Save slot {slot} does not exist"))
}

#[cfg(target_arch = "wasm32")]
fn current_timestamp() -> u64 {
    0
}

// ═══════════════════════════════════════════════════════════════════════
// SAVE FILE
// ═══════════════════════════════════════════════════════════════════════

/// Everything a slot persists.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SaveFile {
    version: u32,
    slot: usize,
    save_timestamp: u64,
    play_time_seconds: u64,
    location: PlayerLocation,
    visited: VisitedMaps,
    switches: GameSwitches,
    markings: MarkingStore,
    settings: Settings,
}

impl SaveFile {
    fn to_slot_info(&self) -> SaveSlotInfo {
        SaveSlotInfo {
            slot: self.slot,
            exists: true,
            map_id: self.location.map_id,
            visited_count: self.visited.maps.len(),
            play_time_seconds: self.play_time_seconds,
            save_timestamp: self.save_timestamp,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn write_save(
    slot: usize,
    location: &PlayerLocation,
    visited: &VisitedMaps,
    switches: &GameSwitches,
    markings: &MarkingStore,
    settings: &Settings,
    play_time: &PlayTime,
) -> Result<(), String> {
    let file = SaveFile {
        version: SAVE_VERSION,
        slot,
        save_timestamp: current_timestamp(),
        play_time_seconds: play_time.seconds,
        location: location.clone(),
        visited: visited.clone(),
        switches: switches.clone(),
        markings: markings.clone(),
        settings: settings.clone(),
    };
    let json =
        serde_json::to_string_pretty(&file).map_err(|e| format!("Serialization failed: {e}"))?;
    store_blob(slot, &json)
}

fn read_save(slot: usize) -> Result<SaveFile, String> {
    let json = fetch_blob(slot)?;
    let file: SaveFile =
        serde_json::from_str(&json).map_err(|e| format!("Deserialization failed: {e}"))?;

    // Version check — future versions can add migration here
    if file.version != SAVE_VERSION {
        warn!(
            "Save slot {} has version {} but current version is {}. Attempting to load anyway.",
            slot, file.version, SAVE_VERSION
        );
    }
    Ok(file)
}

fn peek_save(slot: usize) -> SaveSlotInfo {
    match read_save(slot) {
        Ok(file) => file.to_slot_info(),
        Err(_) => SaveSlotInfo {
            slot,
            ..Default::default()
        },
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

fn scan_save_slots(mut cache: ResMut<SaveSlotInfoCache>) {
    cache.slots = (0..NUM_SAVE_SLOTS).map(peek_save).collect();
    let used = cache.slots.iter().filter(|s| s.exists).count();
    info!("Save slot scan complete. {used} of {NUM_SAVE_SLOTS} slots in use.");
}

fn tick_play_time(time: Res<Time>, mut play: ResMut<PlayTime>) {
    play.carry += time.delta();
    let whole = play.carry.as_secs();
    if whole > 0 {
        play.seconds = play.seconds.saturating_add(whole);
        play.carry -= Duration::from_secs(whole);
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_save_request(
    mut save_events: EventReader<SaveRequestEvent>,
    mut complete_events: EventWriter<SaveCompleteEvent>,
    mut cache: ResMut<SaveSlotInfoCache>,
    location: Res<PlayerLocation>,
    visited: Res<VisitedMaps>,
    switches: Res<GameSwitches>,
    markings: Res<MarkingStore>,
    settings: Res<Settings>,
    play_time: Res<PlayTime>,
) {
    for ev in save_events.read() {
        let slot = ev.slot;
        info!("Saving to slot {slot}...");

        match write_save(
            slot,
            &location,
            &visited,
            &switches,
            &markings,
            &settings,
            &play_time,
        ) {
            Ok(()) => {
                info!("Save to slot {slot} succeeded.");
                if let Some(cached) = cache.slots.get_mut(slot) {
                    *cached = peek_save(slot);
                }
                complete_events.send(SaveCompleteEvent {
                    slot,
                    success: true,
                    error_message: None,
                });
            }
            Err(e) => {
                warn!("Save to slot {slot} FAILED: {e}");
                complete_events.send(SaveCompleteEvent {
                    slot,
                    success: false,
                    error_message: Some(e),
                });
            }
        }
    }
}

fn handle_load_request(
    mut load_events: EventReader<LoadRequestEvent>,
    mut complete_events: EventWriter<LoadCompleteEvent>,
    mut location: ResMut<PlayerLocation>,
    mut visited: ResMut<VisitedMaps>,
    mut switches: ResMut<GameSwitches>,
    mut markings: ResMut<MarkingStore>,
    mut settings: ResMut<Settings>,
    mut play_time: ResMut<PlayTime>,
) {
    for ev in load_events.read() {
        let slot = ev.slot;
        info!("Loading from slot {slot}...");

        match read_save(slot) {
            Ok(file) => {
                *location = file.location;
                *visited = file.visited;
                *switches = file.switches;
                *markings = file.markings;
                *settings = file.settings;
                play_time.seconds = file.play_time_seconds;
                play_time.carry = Duration::ZERO;

                info!("Load from slot {slot} succeeded.");
                complete_events.send(LoadCompleteEvent { success: true });
            }
            Err(e) => {
                warn!("Load from slot {slot} FAILED: {e}");
                complete_events.send(LoadCompleteEvent { success: false });
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> (PlayerLocation, VisitedMaps, GameSwitches, MarkingStore, Settings) {
        let location = PlayerLocation { map_id: 5 };
        let mut visited = VisitedMaps::default();
        visited.visit(1);
        visited.visit(5);
        let mut switches = GameSwitches::default();
        switches.set(FERRY_SWITCH, true);
        let mut markings = MarkingStore::default();
        markings.apply(
            0,
            MarkingEntry {
                x: 3,
                y: 4,
                slots: [2, 0, 0, 1],
            },
        );
        let mut settings = Settings::default();
        settings.marking = false;
        (location, visited, switches, markings, settings)
    }

    #[test]
    fn a_save_round_trips_through_disk() {
        let slot = 91;
        let (location, visited, switches, markings, settings) = sample_state();
        let play_time = PlayTime {
            seconds: 321,
            ..Default::default()
        };

        write_save(
            slot, &location, &visited, &switches, &markings, &settings, &play_time,
        )
        .unwrap();
        let file = read_save(slot).unwrap();
        fs::remove_file(slot_path(slot)).ok();

        assert_eq!(file.version, SAVE_VERSION);
        assert_eq!(file.location.map_id, 5);
        assert!(file.visited.contains(5));
        assert!(file.switches.is_on(FERRY_SWITCH));
        assert_eq!(file.markings.slots_at(0, 3, 4), [2, 0, 0, 1]);
        assert!(!file.settings.marking);
        assert_eq!(file.play_time_seconds, 321);
    }

    #[test]
    fn loading_a_missing_slot_reports_it() {
        let err = read_save(97).unwrap_err();
        assert!(err.contains("does not exist"), "{err}");
    }

    #[test]
    fn peeking_a_missing_slot_yields_an_empty_entry() {
        let info = peek_save(96);
        assert!(!info.exists);
        assert_eq!(info.slot, 96);
    }

    #[test]
    fn a_newer_save_still_loads_with_a_warning() {
        let slot = 92;
        let (location, visited, switches, markings, settings) = sample_state();
        let play_time = PlayTime::default();
        write_save(
            slot, &location, &visited, &switches, &markings, &settings, &play_time,
        )
        .unwrap();

        // Bump the version field in place and reload.
        let mut value: serde_json::Value =
            serde_json::from_str(&fetch_blob(slot).unwrap()).unwrap();
        value["version"] = serde_json::json!(SAVE_VERSION + 1);
        store_blob(slot, &value.to_string()).unwrap();

        let file = read_save(slot).unwrap();
        fs::remove_file(slot_path(slot)).ok();
        assert_eq!(file.version, SAVE_VERSION + 1);
        assert_eq!(file.location.map_id, 5);
    }

    #[test]
    fn slot_metadata_reflects_the_file() {
        let slot = 93;
        let (location, visited, switches, markings, settings) = sample_state();
        let play_time = PlayTime {
            seconds: 60,
            ..Default::default()
        };
        write_save(
            slot, &location, &visited, &switches, &markings, &settings, &play_time,
        )
        .unwrap();

        let info = peek_save(slot);
        fs::remove_file(slot_path(slot)).ok();
        assert!(info.exists);
        assert_eq!(info.map_id, 5);
        assert_eq!(info.visited_count, 2);
        assert_eq!(info.play_time_seconds, 60);
    }
}
