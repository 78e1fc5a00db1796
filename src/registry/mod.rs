//! Generic keyed definition tables.
//!
//! Every static-data registry in the game (regions, maps, marker icons) is a
//! [`Table`] parameterised over a record type and a [`KeyScheme`]. The scheme
//! decides which keys a record is indexed under and in what order the table
//! iterates:
//!
//! * [`DualKey`]   — records carry a symbolic id *and* a stable numeric id;
//!   lookups accept either, iteration follows the numeric id.
//! * [`SymbolKey`] — records are known by symbolic id only; iteration follows
//!   registration order, with a by-name alternative for UI lists.
//! * [`NumericKey`] — records are known by numeric id only; iteration is
//!   numerically sorted.
//!
//! Tables serialize to RON as a plain record list, so a table written with
//! [`Table::save`] can be hand-edited and read back with [`Table::load`].

use std::cmp::Ordering;
use std::collections::HashMap;
use std::marker::PhantomData;
#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

// ═══════════════════════════════════════════════════════════════════════
// KEYS
// ═══════════════════════════════════════════════════════════════════════

/// A lookup key as supplied by calling code: either a symbolic id or a
/// numeric id. Which kinds a given table honours depends on its scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RawKey {
    Symbol(String),
    Number(i32),
}

impl From<&str> for RawKey {
    fn from(s: &str) -> Self {
        RawKey::Symbol(s.to_string())
    }
}

impl From<String> for RawKey {
    fn from(s: String) -> Self {
        RawKey::Symbol(s)
    }
}

impl From<&String> for RawKey {
    fn from(s: &String) -> Self {
        RawKey::Symbol(s.clone())
    }
}

impl From<i32> for RawKey {
    fn from(n: i32) -> Self {
        RawKey::Number(n)
    }
}

impl From<&RawKey> for RawKey {
    fn from(k: &RawKey) -> Self {
        k.clone()
    }
}

impl std::fmt::Display for RawKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawKey::Symbol(s) => write!(f, "{s}"),
            RawKey::Number(n) => write!(f, "#{n}"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// RECORD + SCHEME TRAITS
// ═══════════════════════════════════════════════════════════════════════

/// Implemented by every definition type stored in a [`Table`].
///
/// A record exposes whichever ids it actually carries; the table's scheme
/// decides which of them become index keys. `display_name` feeds
/// [`Table::iter_by_name`].
pub trait TableRecord {
    /// Short noun for error messages, e.g. `"region"`.
    const KIND: &'static str;

    fn symbol_id(&self) -> Option<&str> {
        None
    }

    fn numeric_id(&self) -> Option<i32> {
        None
    }

    fn display_name(&self) -> &str;
}

/// Key-resolution strategy for a [`Table`].
pub trait KeyScheme {
    /// Keys a record is indexed under. Never empty for a well-formed record.
    fn index_keys<R: TableRecord>(record: &R) -> Vec<RawKey>;

    /// Whether this scheme resolves the given key kind at all.
    fn accepts(key: &RawKey) -> bool;

    /// Iteration order for [`Table::iter`]. `None` keeps registration order.
    fn ordering<R: TableRecord>(a: &R, b: &R) -> Option<Ordering>;
}

/// Symbolic + numeric id, iterate by numeric id.
pub struct DualKey;

impl KeyScheme for DualKey {
    fn index_keys<R: TableRecord>(record: &R) -> Vec<RawKey> {
        let mut keys = Vec::with_capacity(2);
        if let Some(sym) = record.symbol_id() {
            keys.push(RawKey::Symbol(sym.to_string()));
        }
        if let Some(num) = record.numeric_id() {
            keys.push(RawKey::Number(num));
        }
        keys
    }

    fn accepts(_key: &RawKey) -> bool {
        true
    }

    fn ordering<R: TableRecord>(a: &R, b: &R) -> Option<Ordering> {
        Some(a.numeric_id().cmp(&b.numeric_id()))
    }
}

/// Symbolic id only, iterate in registration order.
pub struct SymbolKey;

impl KeyScheme for SymbolKey {
    fn index_keys<R: TableRecord>(record: &R) -> Vec<RawKey> {
        record
            .symbol_id()
            .map(|sym| vec![RawKey::Symbol(sym.to_string())])
            .unwrap_or_default()
    }

    fn accepts(key: &RawKey) -> bool {
        matches!(key, RawKey::Symbol(_))
    }

    fn ordering<R: TableRecord>(_a: &R, _b: &R) -> Option<Ordering> {
        None
    }
}

/// Numeric id only, iterate by numeric id.
pub struct NumericKey;

impl KeyScheme for NumericKey {
    fn index_keys<R: TableRecord>(record: &R) -> Vec<RawKey> {
        record
            .numeric_id()
            .map(|num| vec![RawKey::Number(num)])
            .unwrap_or_default()
    }

    fn accepts(key: &RawKey) -> bool {
        matches!(key, RawKey::Number(_))
    }

    fn ordering<R: TableRecord>(a: &R, b: &R) -> Option<Ordering> {
        Some(a.numeric_id().cmp(&b.numeric_id()))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TABLE
// ═══════════════════════════════════════════════════════════════════════

/// A registry of definitions indexed per the scheme `S`.
///
/// Records live in a `Vec` in registration order; the index maps every
/// accepted key to a slot. `len` therefore counts definitions, not index
/// entries, no matter how many keys each record is filed under.
pub struct Table<R, S> {
    records: Vec<R>,
    index: HashMap<RawKey, usize>,
    _scheme: PhantomData<S>,
}

impl<R, S> Default for Table<R, S> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
            _scheme: PhantomData,
        }
    }
}

impl<R: TableRecord, S: KeyScheme> Table<R, S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a definition under all keys its scheme derives. Registering a
    /// key that is already present replaces the stored definition in place,
    /// keeping the table's size and iteration slot stable.
    pub fn register(&mut self, record: R) {
        let keys = S::index_keys(&record);
        debug_assert!(!keys.is_empty(), "{} record has no index keys", R::KIND);
        let slot = keys.iter().find_map(|k| self.index.get(k).copied());
        let slot = match slot {
            Some(i) => {
                self.records[i] = record;
                i
            }
            None => {
                self.records.push(record);
                self.records.len() - 1
            }
        };
        for key in keys {
            self.index.insert(key, slot);
        }
    }

    /// Looks a definition up, or `None` when the key is unknown or of a kind
    /// this table's scheme does not resolve.
    pub fn try_get(&self, key: impl Into<RawKey>) -> Option<&R> {
        let key = key.into();
        if !S::accepts(&key) {
            return None;
        }
        self.index.get(&key).map(|&i| &self.records[i])
    }

    /// Resolves a whole sequence of keys in one call. Each element maps to
    /// its definition or to `None`; the output always has the same length
    /// and order as the input, absent keys are never filtered out.
    pub fn try_get_many<I, K>(&self, keys: I) -> Vec<Option<&R>>
    where
        I: IntoIterator<Item = K>,
        K: Into<RawKey>,
    {
        keys.into_iter().map(|k| self.try_get(k)).collect()
    }

    /// Looks a definition up, panicking on an unknown key. Reserved for call
    /// sites where absence is a content bug; prefer [`Table::try_get`] when
    /// the key comes from user input or save data.
    pub fn get(&self, key: impl Into<RawKey>) -> &R {
        let key = key.into();
        match self.try_get(&key) {
            Some(record) => record,
            None => panic!("unknown {} id {key}", R::KIND),
        }
    }

    pub fn contains(&self, key: impl Into<RawKey>) -> bool {
        self.try_get(key).is_some()
    }

    /// Number of definitions (not index entries).
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All index keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &RawKey> + '_ {
        self.index.keys()
    }

    /// Iterates definitions in the scheme's order. The order is computed up
    /// front, so the iterator is unaffected by the cost of repeated calls.
    pub fn iter(&self) -> impl Iterator<Item = &R> + '_ {
        let mut snapshot: Vec<&R> = self.records.iter().collect();
        // Stable sort, so schemes without an ordering keep registration order.
        snapshot.sort_by(|a, b| S::ordering(*a, *b).unwrap_or(Ordering::Equal));
        snapshot.into_iter()
    }

    /// Iterates definitions sorted by display name, for UI listings.
    pub fn iter_by_name(&self) -> impl Iterator<Item = &R> + '_ {
        let mut snapshot: Vec<&R> = self.records.iter().collect();
        snapshot.sort_by(|a, b| a.display_name().cmp(b.display_name()));
        snapshot.into_iter()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// RON PERSISTENCE
// ═══════════════════════════════════════════════════════════════════════

impl<R, S> Table<R, S>
where
    R: TableRecord + Serialize + DeserializeOwned,
    S: KeyScheme,
{
    /// Parses a RON record list into a fresh table.
    pub fn from_ron_str(text: &str) -> Result<Self, String> {
        let records: Vec<R> =
            ron::from_str(text).map_err(|e| format!("bad {} data: {e}", R::KIND))?;
        let mut table = Self::default();
        for record in records {
            table.register(record);
        }
        Ok(table)
    }

    /// Serializes the table as a pretty-printed RON record list, in
    /// registration order.
    pub fn to_ron_string(&self) -> Result<String, String> {
        ron::ser::to_string_pretty(&self.records, ron::ser::PrettyConfig::default())
            .map_err(|e| format!("failed to serialize {} data: {e}", R::KIND))
    }

    /// Reads a table from a RON file on disk.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        Self::from_ron_str(&text)
    }

    /// Writes the table to a RON file on disk.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), String> {
        let path = path.as_ref();
        let text = self.to_ron_string()?;
        std::fs::write(path, text)
            .map_err(|e| format!("failed to write {}: {e}", path.display()))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Town {
        id: String,
        id_number: i32,
        name: String,
    }

    impl TableRecord for Town {
        const KIND: &'static str = "town";

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

    fn town(id: &str, num: i32, name: &str) -> Town {
        Town {
            id: id.to_string(),
            id_number: num,
            name: name.to_string(),
        }
    }

    // ── DualKey ──────────────────────────────────────────────────────────

    #[test]
    fn dual_key_resolves_symbol_and_number_to_same_record() {
        let mut table: Table<Town, DualKey> = Table::new();
        table.register(town("ashport", 0, "Ashport"));
        table.register(town("gullcrest", 1, "Gullcrest"));

        assert_eq!(table.get("ashport").id_number, 0);
        assert_eq!(table.get(1).id, "gullcrest");
        assert_eq!(table.get(RawKey::Symbol("gullcrest".into())).id_number, 1);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn dual_key_iterates_by_numeric_id_once_per_record() {
        let mut table: Table<Town, DualKey> = Table::new();
        table.register(town("gullcrest", 2, "Gullcrest"));
        table.register(town("ashport", 0, "Ashport"));
        table.register(town("brinemarsh", 1, "Brinemarsh"));

        let order: Vec<i32> = table.iter().map(|t| t.id_number).collect();
        assert_eq!(order, vec![0, 1, 2]);
        // 6 index keys, 3 records
        assert_eq!(table.keys().count(), 6);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn reregistering_a_key_replaces_in_place() {
        let mut table: Table<Town, DualKey> = Table::new();
        table.register(town("ashport", 0, "Ashport"));
        table.register(town("ashport", 0, "New Ashport"));

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("ashport").name, "New Ashport");
        assert_eq!(table.get(0).name, "New Ashport");
    }

    // ── SymbolKey ────────────────────────────────────────────────────────

    #[test]
    fn symbol_key_keeps_registration_order_and_sorts_by_name() {
        let mut table: Table<Town, SymbolKey> = Table::new();
        table.register(town("zeta", 9, "Zeta Point"));
        table.register(town("alpha", 5, "Alpha Cove"));
        table.register(town("mid", 7, "Mid Island"));

        let reg_order: Vec<&str> = table.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(reg_order, vec!["zeta", "alpha", "mid"]);

        let by_name: Vec<&str> = table.iter_by_name().map(|t| t.name.as_str()).collect();
        assert_eq!(by_name, vec!["Alpha Cove", "Mid Island", "Zeta Point"]);
    }

    #[test]
    fn symbol_key_rejects_numeric_lookups() {
        let mut table: Table<Town, SymbolKey> = Table::new();
        table.register(town("alpha", 5, "Alpha Cove"));

        // 5 is the record's numeric id, but this scheme never indexes it.
        assert!(table.try_get(5).is_none());
        assert!(!table.contains(5));
        assert!(table.contains("alpha"));
    }

    #[test]
    #[should_panic(expected = "unknown town id")]
    fn get_panics_on_unknown_key() {
        let mut table: Table<Town, SymbolKey> = Table::new();
        table.register(town("alpha", 5, "Alpha Cove"));
        table.get("omega");
    }

    // ── NumericKey ───────────────────────────────────────────────────────

    #[test]
    fn numeric_key_sorts_iteration_and_rejects_symbols() {
        let mut table: Table<Town, NumericKey> = Table::new();
        table.register(town("c", 30, "C"));
        table.register(town("a", 10, "A"));
        table.register(town("b", 20, "B"));

        let order: Vec<i32> = table.iter().map(|t| t.id_number).collect();
        assert_eq!(order, vec![10, 20, 30]);
        assert!(table.try_get("a").is_none());
        assert_eq!(table.get(10).id, "a");
    }

    // ── Sequence lookup ──────────────────────────────────────────────────

    #[test]
    fn try_get_many_pads_missing_keys_with_none() {
        let mut table: Table<Town, SymbolKey> = Table::new();
        table.register(town("alpha", 5, "Alpha Cove"));
        table.register(town("mid", 7, "Mid Island"));

        let found = table.try_get_many(["alpha", "ghost", "mid"]);
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].map(|t| t.id.as_str()), Some("alpha"));
        assert!(found[1].is_none());
        assert_eq!(found[2].map(|t| t.id.as_str()), Some("mid"));
    }

    // ── RON persistence ──────────────────────────────────────────────────

    #[test]
    fn ron_round_trip_preserves_records_and_resolution() {
        let mut table: Table<Town, DualKey> = Table::new();
        table.register(town("ashport", 0, "Ashport"));
        table.register(town("gullcrest", 1, "Gullcrest"));

        let text = table.to_ron_string().unwrap();
        let restored: Table<Town, DualKey> = Table::from_ron_str(&text).unwrap();

        assert_eq!(restored.len(), 2);
        assert_eq!(restored.get("ashport").name, "Ashport");
        assert_eq!(restored.get(1).id, "gullcrest");
    }

    #[test]
    fn save_and_load_through_a_file() {
        let mut table: Table<Town, NumericKey> = Table::new();
        table.register(town("a", 10, "A"));

        let path = std::env::temp_dir().join(format!("table_io_{}.ron", std::process::id()));
        table.save(&path).unwrap();
        let restored: Table<Town, NumericKey> = Table::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(restored.len(), 1);
        assert_eq!(restored.get(10).name, "A");
    }

    #[test]
    fn from_ron_str_reports_parse_errors() {
        let err = Table::<Town, DualKey>::from_ron_str("not ron at all").unwrap_err();
        assert!(err.contains("bad town data"), "unexpected error: {err}");
    }
}
