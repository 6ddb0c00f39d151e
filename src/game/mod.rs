pub mod catalog;
pub mod clock;
pub mod connections;
pub mod cooldown;
pub mod dual_entity;
pub mod face_mash;
pub mod glimpsed;
pub mod guess;
pub mod plot_fusion;
pub mod progress;
pub mod scoring;
pub mod settings;
pub mod share;
pub mod storage;

pub use catalog::{EntityLookup, GameCatalog};
pub use clock::{Clock, ManualClock, SystemClock};
pub use connections::{ConnectionsGame, ConnectionsGameState};
pub use cooldown::{CooldownHandle, CooldownTimers, CooldownTracker};
pub use dual_entity::{DualEntityGameState, DualEntityPuzzle, EntitySlot};
pub use face_mash::face_mash_puzzle;
pub use glimpsed::{GlimpsedGame, GlimpsedGameState};
pub use guess::{GuessOutcome, RejectReason};
pub use plot_fusion::plot_fusion_puzzle;
pub use progress::{GameSummary, ProgressService, ProgressUpdate};
pub use settings::Settings;
pub use storage::{FileStore, GameStorage, KeyValueStore, MemoryStore, StorageError};
