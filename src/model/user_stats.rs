use crate::model::GameType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GameTypeStats {
    #[serde(default)]
    pub played: u32,
    #[serde(default)]
    pub completed: u32,
    #[serde(default)]
    pub best_score: u32,
    #[serde(default)]
    pub average_attempts: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    #[serde(default)]
    pub total_games_played: u32,
    #[serde(default)]
    pub total_games_completed: u32,
    #[serde(default)]
    pub average_attempts: f64,
    #[serde(default)]
    pub streak_count: u32,
    #[serde(default)]
    pub last_played_date: String,
    #[serde(default)]
    pub game_stats: BTreeMap<GameType, GameTypeStats>,
}

impl Default for UserStats {
    fn default() -> Self {
        let mut stats = Self {
            total_games_played: 0,
            total_games_completed: 0,
            average_attempts: 0.0,
            streak_count: 0,
            last_played_date: String::new(),
            game_stats: BTreeMap::new(),
        };
        stats.migrate();
        stats
    }
}

impl UserStats {
    /// Backfill zeroed entries for game types added after the stats were written.
    pub fn migrate(&mut self) {
        for game_type in GameType::all() {
            self.game_stats.entry(game_type).or_default();
        }
    }

    pub fn for_game(&self, game_type: GameType) -> GameTypeStats {
        self.game_stats
            .get(&game_type)
            .cloned()
            .unwrap_or_default()
    }

    /// Fold one finished game into the running totals.
    pub fn record(
        &mut self,
        game_type: GameType,
        won: bool,
        attempts: u32,
        score: Option<u32>,
        played_at: String,
    ) {
        self.total_games_played += 1;
        self.last_played_date = played_at;

        if won {
            self.total_games_completed += 1;
            self.streak_count += 1;
        } else {
            self.streak_count = 0;
        }

        let game_stats = self.game_stats.entry(game_type).or_default();
        game_stats.played += 1;
        if won {
            game_stats.completed += 1;
            if let Some(score) = score {
                game_stats.best_score = game_stats.best_score.max(score);
            }
        }
        game_stats.average_attempts =
            running_average(game_stats.average_attempts, game_stats.played, attempts);
        self.average_attempts =
            running_average(self.average_attempts, self.total_games_played, attempts);
    }
}

fn running_average(previous: f64, count: u32, value: u32) -> f64 {
    if count == 0 {
        return 0.0;
    }
    (previous * f64::from(count - 1) + f64::from(value)) / f64::from(count)
}
