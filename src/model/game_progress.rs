use crate::model::GameType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

/// Outcome of a single Connections submission.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AttemptResult {
    Correct,
    OneAway,
    Wrong,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionsState {
    #[serde(default)]
    pub solved_groups: Vec<String>,
    /// Sorted items of every submitted selection, for rejecting repeats after a resume.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub previous_selections: Vec<Vec<String>>,
}

/// Progress against one hidden actor or movie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EntityState {
    #[serde(default)]
    pub found: bool,
    #[serde(default)]
    pub guesses: Vec<String>,
    #[serde(default)]
    pub hints_revealed: u32,
}

impl EntityState {
    /// Guesses charged against this entity that were not the answer.
    pub fn wrong_guesses(&self) -> usize {
        self.guesses.len() - usize::from(self.found && !self.guesses.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DualEntityState {
    #[serde(alias = "actor1State", alias = "movie1State", default)]
    pub entity1: EntityState,
    #[serde(alias = "actor2State", alias = "movie2State", default)]
    pub entity2: EntityState,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GlimpsedState {
    pub current_frame: u32,
    #[serde(default)]
    pub guesses: Vec<String>,
    #[serde(default)]
    pub movie_found: bool,
}

impl Default for GlimpsedState {
    fn default() -> Self {
        Self {
            current_frame: 1,
            guesses: Vec::new(),
            movie_found: false,
        }
    }
}

/// Game specific part of a progress record, tagged by game type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GameStateData {
    Connections(ConnectionsState),
    FaceMash(DualEntityState),
    PlotFusion(DualEntityState),
    Glimpsed(GlimpsedState),
}

impl GameStateData {
    pub fn game_type(&self) -> GameType {
        match self {
            GameStateData::Connections(_) => GameType::Connections,
            GameStateData::FaceMash(_) => GameType::FaceMash,
            GameStateData::PlotFusion(_) => GameType::PlotFusion,
            GameStateData::Glimpsed(_) => GameType::Glimpsed,
        }
    }

    /// Whether the stored state describes a solved puzzle.
    pub fn is_won(&self) -> bool {
        match self {
            // all four groups, a loss always leaves at least two unsolved
            GameStateData::Connections(state) => state.solved_groups.len() >= 4,
            GameStateData::FaceMash(state) | GameStateData::PlotFusion(state) => {
                state.entity1.found && state.entity2.found
            }
            GameStateData::Glimpsed(state) => state.movie_found,
        }
    }
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameProgress {
    pub game_id: String,
    #[serde(default)]
    pub status: GameStatus,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub hints_used: u32,
    #[serde(default)]
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub score: Option<u32>,
    #[serde(default)]
    pub completed: bool,
    pub game_state: Option<GameStateData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attempt_results: Vec<AttemptResult>,
}

impl GameProgress {
    pub fn new(game_id: &str, start_time: i64) -> Self {
        Self {
            game_id: game_id.to_string(),
            status: GameStatus::NotStarted,
            attempts: 0,
            hints_used: 0,
            start_time,
            end_time: None,
            score: None,
            completed: false,
            game_state: None,
            attempt_results: Vec::new(),
        }
    }

    pub fn connections_state(&self) -> Option<&ConnectionsState> {
        match &self.game_state {
            Some(GameStateData::Connections(state)) => Some(state),
            _ => None,
        }
    }

    /// Entity states of either dual entity game.
    pub fn dual_entity_state(&self) -> Option<&DualEntityState> {
        match &self.game_state {
            Some(GameStateData::FaceMash(state)) | Some(GameStateData::PlotFusion(state)) => {
                Some(state)
            }
            _ => None,
        }
    }

    pub fn glimpsed_state(&self) -> Option<&GlimpsedState> {
        match &self.game_state {
            Some(GameStateData::Glimpsed(state)) => Some(state),
            _ => None,
        }
    }
}
