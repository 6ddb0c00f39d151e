use crate::model::{GameProgress, GameType, UserStats};
use log::{error, trace};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const GAME_PROGRESS_KEY: &str = "bollywood_game_progress";
pub const LAST_PLAYED_KEY: &str = "bollywood_last_played";
pub const USER_STATS_KEY: &str = "bollywood_user_stats";
const GAME_STATS_FIELD: &str = "gameStats";

fn is_known_game_type(slug: &str) -> bool {
    GameType::all().iter().any(|game_type| game_type.slug() == slug)
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed stored data: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Flat string key-value persistence.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.data_dir)?;
        fs::write(self.key_path(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Best-effort persistence of progress, cooldowns and stats.
///
/// Nothing here returns an error: failures are logged and reads fall back to
/// "no data", so a broken store only costs the player their saved progress.
#[derive(Debug)]
pub struct GameStorage<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> GameStorage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.store.get(key)? {
            Some(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            None => Ok(None),
        }
    }

    fn write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let contents = serde_json::to_string(value)?;
        self.store.set(key, &contents)
    }

    fn read_or_log<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.read_json(key) {
            Ok(value) => value,
            Err(err) => {
                error!(target: "storage", "Error reading {}: {}", key, err);
                None
            }
        }
    }

    /// A namespace as raw JSON entries, so one bad entry can't hide the rest.
    fn raw_map(&self, key: &str) -> Map<String, Value> {
        match self.read_or_log::<Value>(key) {
            Some(Value::Object(entries)) => entries,
            Some(other) => {
                error!(target: "storage", "Expected an object under {}, found {}", key, other);
                Map::new()
            }
            None => Map::new(),
        }
    }

    fn write_map(&self, key: &str, entries: &Map<String, Value>) {
        if let Err(err) = self.write_json(key, entries) {
            error!(target: "storage", "Error writing {}: {}", key, err);
        }
    }

    fn decode_entry<T: DeserializeOwned>(key: &str, id: &str, value: Value) -> Option<T> {
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                error!(target: "storage", "Ignoring malformed {} entry {}: {}", key, id, err);
                None
            }
        }
    }

    pub fn get_progress(&self, game_id: &str) -> Option<GameProgress> {
        let value = self.raw_map(GAME_PROGRESS_KEY).remove(game_id)?;
        Self::decode_entry(GAME_PROGRESS_KEY, game_id, value)
    }

    /// Insert or replace the record for `game_id`, leaving every other record as stored.
    pub fn save_progress(&self, game_id: &str, progress: &GameProgress) {
        let value = match serde_json::to_value(progress) {
            Ok(value) => value,
            Err(err) => {
                error!(target: "storage", "Error saving game progress: {}", err);
                return;
            }
        };
        let mut all_progress = self.raw_map(GAME_PROGRESS_KEY);
        all_progress.insert(game_id.to_string(), value);
        trace!(target: "storage", "Saving progress for {}: {:?}", game_id, progress);
        self.write_map(GAME_PROGRESS_KEY, &all_progress);
    }

    pub fn clear_progress(&self, game_id: &str) {
        let mut all_progress = self.raw_map(GAME_PROGRESS_KEY);
        if all_progress.remove(game_id).is_some() {
            self.write_map(GAME_PROGRESS_KEY, &all_progress);
        }
    }

    pub fn get_last_played(&self, game_type: GameType) -> Option<i64> {
        let value = self.raw_map(LAST_PLAYED_KEY).remove(game_type.slug())?;
        Self::decode_entry(LAST_PLAYED_KEY, game_type.slug(), value)
    }

    pub fn set_last_played(&self, game_type: GameType, now_ms: i64) {
        let mut last_played = self.raw_map(LAST_PLAYED_KEY);
        last_played.insert(game_type.slug().to_string(), Value::from(now_ms));
        self.write_map(LAST_PLAYED_KEY, &last_played);
    }

    pub fn clear_last_played(&self, game_type: GameType) {
        let mut last_played = self.raw_map(LAST_PLAYED_KEY);
        if last_played.remove(game_type.slug()).is_some() {
            self.write_map(LAST_PLAYED_KEY, &last_played);
        }
    }

    /// Stored stats with game types missing from older data backfilled.
    ///
    /// Per-game entries for game types this build doesn't know are skipped
    /// here and carried over by [`GameStorage::save_user_stats`].
    pub fn get_user_stats(&self) -> UserStats {
        let mut stored = self.raw_map(USER_STATS_KEY);
        if let Some(Value::Object(game_stats)) = stored.get_mut(GAME_STATS_FIELD) {
            game_stats.retain(|slug, _| is_known_game_type(slug));
        }
        match Self::decode_entry::<UserStats>(USER_STATS_KEY, "totals", Value::Object(stored)) {
            Some(mut stats) => {
                stats.migrate();
                stats
            }
            None => UserStats::default(),
        }
    }

    pub fn save_user_stats(&self, stats: &UserStats) {
        let mut value = match serde_json::to_value(stats) {
            Ok(Value::Object(value)) => value,
            Ok(_) => return,
            Err(err) => {
                error!(target: "storage", "Error saving user stats: {}", err);
                return;
            }
        };
        let unknown: Map<String, Value> = match self.raw_map(USER_STATS_KEY).remove(GAME_STATS_FIELD) {
            Some(Value::Object(game_stats)) => game_stats
                .into_iter()
                .filter(|(slug, _)| !is_known_game_type(slug))
                .collect(),
            _ => Map::new(),
        };
        if let Some(Value::Object(game_stats)) = value.get_mut(GAME_STATS_FIELD) {
            game_stats.extend(unknown);
        }
        self.write_map(USER_STATS_KEY, &value);
    }

    pub fn update_user_stats(
        &self,
        game_type: GameType,
        won: bool,
        attempts: u32,
        score: Option<u32>,
        played_at: String,
    ) {
        let mut stats = self.get_user_stats();
        stats.record(game_type, won, attempts, score, played_at);
        self.save_user_stats(&stats);
    }

    pub fn clear_all_data(&self) {
        for key in [GAME_PROGRESS_KEY, LAST_PLAYED_KEY, USER_STATS_KEY] {
            if let Err(err) = self.store.remove(key) {
                error!(target: "storage", "Error clearing {}: {}", key, err);
            }
        }
    }
}
