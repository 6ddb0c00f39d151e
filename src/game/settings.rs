use crate::game::cooldown::{COOLDOWN_PERIOD, COOLDOWN_TICK};
use crate::game::share::DEFAULT_SHARE_URL;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds, DurationSeconds};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_DIR_NAME: &str = "bollywood-dailies";
pub const DATA_DIR_ENV: &str = "BOLLYWOOD_DAILIES_DATA_DIR";
const SETTINGS_FILE: &str = "settings.json";
const CURRENT_VERSION: u32 = 2;

#[serde_as]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    #[serde(default = "default_version")]
    version: u32,

    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_cooldown")]
    pub cooldown: Duration,

    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_cooldown_tick")]
    pub cooldown_tick: Duration,

    #[serde(default = "default_share_url")]
    pub share_url: String,

    /// Overrides where game progress is stored.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_version() -> u32 {
    1
}
fn default_cooldown() -> Duration {
    COOLDOWN_PERIOD
}
fn default_cooldown_tick() -> Duration {
    COOLDOWN_TICK
}
fn default_share_url() -> String {
    DEFAULT_SHARE_URL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            version: CURRENT_VERSION,
            cooldown: COOLDOWN_PERIOD,
            cooldown_tick: COOLDOWN_TICK,
            share_url: default_share_url(),
            data_dir: None,
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        Self::load_from(&Self::settings_path())
    }

    /// Read settings from `path`, writing defaults there when missing or unreadable.
    pub fn load_from(path: &Path) -> Self {
        if let Ok(contents) = fs::read_to_string(path) {
            match serde_json::from_str::<Settings>(&contents) {
                Ok(mut settings) => {
                    settings.migrate();
                    return settings;
                }
                Err(err) => warn!(target: "settings", "Ignoring malformed {}: {}", path.display(), err),
            }
        }
        let default = Settings::default();
        if let Err(err) = default.save_to(path) {
            warn!(target: "settings", "Could not write {}: {}", path.display(), err);
        }
        default
    }

    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&Self::settings_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)
    }

    /// Directory holding settings, defaulting to the user data dir.
    pub fn app_dir() -> PathBuf {
        std::env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| glib::user_data_dir().join(APP_DIR_NAME))
    }

    fn settings_path() -> PathBuf {
        Self::app_dir().join(SETTINGS_FILE)
    }

    /// Where game progress, cooldowns and stats are stored.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(Self::app_dir)
    }

    fn migrate(&mut self) {
        // version 1 had no tick setting and polled every 5 seconds
        if self.version < 2 {
            self.cooldown_tick = COOLDOWN_TICK;
            self.version = 2;
        }
    }

    pub fn is_debug_mode() -> bool {
        std::env::var("DEBUG").map(|v| v == "1").unwrap_or(false)
    }

    /// Fixed seed for tile shuffling.
    pub fn seed_from_env() -> Option<u64> {
        std::env::var("SEED").ok().and_then(|v| v.parse::<u64>().ok())
    }
}
