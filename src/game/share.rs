//! Spoiler-free result text for finished games.

use crate::game::connections::{ConnectionsGameState, GROUP_COUNT, GROUP_SIZE};
use crate::game::dual_entity::{DualEntityGameState, MAX_TOTAL_ATTEMPTS};
use crate::game::glimpsed::{GlimpsedGameState, MAX_ATTEMPTS as GLIMPSED_MAX_ATTEMPTS};
use crate::model::{AttemptResult, EntityState};
use itertools::Itertools;

pub const DEFAULT_SHARE_URL: &str = "https://bollywood-dailies.app";

const WRONG_MARK: &str = "❌";
const FOUND_MARK: &str = "✅";

/// Trailing digits of the game id without leading zeros, or the whole id when it has none.
pub fn game_number(game_id: &str) -> String {
    let digits: String = game_id
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if digits.is_empty() {
        return game_id.to_string();
    }
    match digits.trim_start_matches('0') {
        "" => "0".to_string(),
        number => number.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityShare {
    pub found: bool,
    pub attempts: u32,
}

impl From<&EntityState> for EntityShare {
    fn from(state: &EntityState) -> Self {
        Self {
            found: state.found,
            attempts: state.guesses.len() as u32,
        }
    }
}

/// Shared by Face Mash and Plot Fusion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DualEntityShareData {
    pub game_id: String,
    pub game_won: bool,
    pub total_attempts: u32,
    pub max_attempts: u32,
    pub entity1: EntityShare,
    pub entity2: EntityShare,
}

impl DualEntityShareData {
    pub fn new(game_id: &str, state: &DualEntityGameState) -> Self {
        Self {
            game_id: game_id.to_string(),
            game_won: state.game_won,
            total_attempts: state.attempts,
            max_attempts: MAX_TOTAL_ATTEMPTS,
            entity1: EntityShare::from(&state.entity1),
            entity2: EntityShare::from(&state.entity2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionsShareData {
    pub game_id: String,
    pub game_won: bool,
    pub total_attempts: u32,
    pub solved_groups: usize,
    pub attempt_results: Vec<AttemptResult>,
}

impl ConnectionsShareData {
    pub fn new(game_id: &str, state: &ConnectionsGameState) -> Self {
        Self {
            game_id: game_id.to_string(),
            game_won: state.game_won(),
            total_attempts: state.attempts,
            solved_groups: state.solved_groups.len(),
            attempt_results: state.attempt_results.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlimpsedShareData {
    pub game_id: String,
    pub game_won: bool,
    pub total_attempts: u32,
    pub frames_shown: u32,
}

impl GlimpsedShareData {
    pub fn new(game_id: &str, state: &GlimpsedGameState) -> Self {
        Self {
            game_id: game_id.to_string(),
            game_won: state.movie_found,
            total_attempts: state.attempts,
            frames_shown: state.current_frame,
        }
    }
}

fn entity_progress(entity: &EntityShare) -> String {
    let wrong = if entity.found {
        entity.attempts.saturating_sub(1)
    } else {
        entity.attempts
    };
    let mut marks = std::iter::repeat(WRONG_MARK).take(wrong as usize);
    if entity.found {
        marks.chain(std::iter::once(FOUND_MARK)).join(" ")
    } else {
        marks.join(" ")
    }
}

pub fn face_mash_share_text(data: &DualEntityShareData, share_url: &str) -> String {
    format!(
        "🎭 Face Mash #{}\n\nA: {}\nB: {}\n\n{}",
        game_number(&data.game_id),
        entity_progress(&data.entity1),
        entity_progress(&data.entity2),
        share_url
    )
}

pub fn plot_fusion_share_text(data: &DualEntityShareData, share_url: &str) -> String {
    format!(
        "🎬 Plot Fusion #{}\n\nMovie 1: {}\nMovie 2: {}\n\n{}",
        game_number(&data.game_id),
        entity_progress(&data.entity1),
        entity_progress(&data.entity2),
        share_url
    )
}

fn result_row(result: &AttemptResult) -> String {
    let square = match result {
        AttemptResult::Correct => "🟩",
        AttemptResult::OneAway => "🟨",
        AttemptResult::Wrong => "🟥",
    };
    square.repeat(GROUP_SIZE)
}

pub fn connections_share_text(data: &ConnectionsShareData, share_url: &str) -> String {
    let number = game_number(&data.game_id);
    let grid = data.attempt_results.iter().map(result_row).join("\n");
    let status = if data.game_won {
        format!("Puzzle #{}", number)
    } else {
        format!("Puzzle #{} ({}/{} groups)", number, data.solved_groups, GROUP_COUNT)
    };
    format!("🔗 Connections #{}\n{}\n\n{}\n{}", number, grid, status, share_url)
}

pub fn glimpsed_share_text(data: &GlimpsedShareData, share_url: &str) -> String {
    let marks = (1..=data.total_attempts)
        .map(|attempt| {
            if data.game_won && attempt == data.total_attempts {
                FOUND_MARK
            } else {
                WRONG_MARK
            }
        })
        .join(" ");
    let result = if data.game_won {
        format!("{}/{}", data.total_attempts, GLIMPSED_MAX_ATTEMPTS)
    } else {
        format!("X/{}", GLIMPSED_MAX_ATTEMPTS)
    };
    format!(
        "🎞️ Glimpsed #{} {}\n\n{}\nFrames seen: {}\n\n{}",
        game_number(&data.game_id),
        result,
        marks,
        data.frames_shown,
        share_url
    )
}
