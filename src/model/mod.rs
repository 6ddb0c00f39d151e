mod cooldown_state;
mod entity;
mod game_definition;
mod game_progress;
mod game_type;
mod user_stats;

pub use cooldown_state::{format_time_remaining, CooldownState};
pub use entity::{Actor, Gender, Movie, MovieHint, MovieHintKind};
pub use game_definition::{
    ConnectionsGameData, ConnectionsGroup, FaceMashActor, FaceMashGameData, FaceMashHint,
    FaceMashHintKind, GameDefinition, GlimpsedGameData, GroupDifficulty, MovieRef,
    PlotFusionGameData, PlotFusionMovies,
};
pub use game_progress::{
    AttemptResult, ConnectionsState, DualEntityState, EntityState, GameProgress, GameStateData,
    GameStatus, GlimpsedState,
};
pub use game_type::GameType;
pub use user_stats::{GameTypeStats, UserStats};
