use crate::game::clock::Clock;
use crate::game::cooldown::CooldownTimers;
use crate::game::scoring::{performance_summary, PerformanceSummary};
use crate::game::storage::{GameStorage, KeyValueStore};
use crate::model::{AttemptResult, GameProgress, GameStateData, GameStatus, GameType};
use log::{debug, info};
use std::rc::Rc;
use std::time::Duration;

/// Everything a state machine hands over after a guess.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub attempts: u32,
    pub completed: bool,
    /// Known once the game is completed.
    pub won: Option<bool>,
    pub hints_used: u32,
    pub score: Option<u32>,
    pub game_state: GameStateData,
    pub attempt_results: Vec<AttemptResult>,
}

/// Finished game as reported to the player.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSummary {
    pub game_id: String,
    pub game_type: GameType,
    pub won: bool,
    pub attempts: u32,
    pub hints_used: u32,
    pub score: Option<u32>,
    pub completion_time: Option<Duration>,
    pub performance: PerformanceSummary,
}

/// Persists game progress and the side effects of finishing a game.
pub struct ProgressService<S: KeyValueStore> {
    storage: Rc<GameStorage<S>>,
    clock: Rc<dyn Clock>,
}

impl<S: KeyValueStore> Clone for ProgressService<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Rc::clone(&self.storage),
            clock: Rc::clone(&self.clock),
        }
    }
}

impl<S: KeyValueStore> ProgressService<S> {
    pub fn new(storage: Rc<GameStorage<S>>, clock: Rc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    pub fn storage(&self) -> &Rc<GameStorage<S>> {
        &self.storage
    }

    pub fn clock(&self) -> &Rc<dyn Clock> {
        &self.clock
    }

    pub fn load(&self, game_id: &str) -> Option<GameProgress> {
        self.storage.get_progress(game_id)
    }

    /// Write the progress record for `game_id`.
    ///
    /// The first save that marks a game completed also starts the cooldown for
    /// its game type and records the result in the user stats. Later saves of
    /// an already completed game only rewrite the record and keep its end time.
    pub fn save(&self, game_id: &str, game_type: GameType, update: ProgressUpdate) {
        let now = self.clock.now_ms();
        let previous = self.storage.get_progress(game_id);
        let was_completed = previous.as_ref().is_some_and(|progress| progress.completed);
        let start_time = previous.as_ref().map_or(now, |progress| progress.start_time);
        let end_time = if !update.completed {
            None
        } else if was_completed {
            previous.and_then(|progress| progress.end_time).or(Some(now))
        } else {
            Some(now)
        };

        let status = if update.completed {
            GameStatus::Completed
        } else {
            GameStatus::InProgress
        };
        let progress = GameProgress {
            game_id: game_id.to_string(),
            status,
            attempts: update.attempts,
            hints_used: update.hints_used,
            start_time,
            end_time,
            score: update.score,
            completed: update.completed,
            game_state: Some(update.game_state),
            attempt_results: update.attempt_results,
        };
        self.storage.save_progress(game_id, &progress);

        if !update.completed || was_completed {
            return;
        }

        info!(target: "progress", "Completed {} ({}) in {} attempts", game_id, game_type, update.attempts);
        self.storage.set_last_played(game_type, now);
        if let Some(won) = update.won {
            self.storage.update_user_stats(
                game_type,
                won,
                update.attempts,
                update.score,
                self.clock.now_rfc3339(),
            );
        }
    }

    /// Forget the game so it can be played again right away.
    pub fn replay(&self, game_id: &str, game_type: GameType, timers: Option<&CooldownTimers>) {
        debug!(target: "progress", "Replaying {} ({})", game_id, game_type);
        if let Some(timers) = timers {
            timers.cancel(game_type);
        }
        self.storage.clear_progress(game_id);
        self.storage.clear_last_played(game_type);
    }

    /// Summary of a completed game, `None` while it is still being played.
    pub fn summary(&self, game_id: &str) -> Option<GameSummary> {
        let progress = self.load(game_id).filter(|progress| progress.completed)?;
        let game_state = progress.game_state.as_ref()?;
        let completion_time = progress
            .end_time
            .map(|end_time| end_time.saturating_sub(progress.start_time).max(0) as u64)
            .map(Duration::from_millis);

        Some(GameSummary {
            game_id: progress.game_id.clone(),
            game_type: game_state.game_type(),
            won: game_state.is_won(),
            attempts: progress.attempts,
            hints_used: progress.hints_used,
            score: progress.score,
            completion_time,
            performance: performance_summary(
                progress.score.unwrap_or(0),
                progress.attempts,
                progress.hints_used,
                completion_time,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::clock::ManualClock;
    use crate::game::storage::MemoryStore;
    use crate::model::{ConnectionsState, GlimpsedState};

    fn service() -> (ProgressService<MemoryStore>, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new(1_000_000));
        let storage = Rc::new(GameStorage::new(MemoryStore::new()));
        (ProgressService::new(storage, clock.clone()), clock)
    }

    fn glimpsed_update(attempts: u32, completed: bool, won: bool) -> ProgressUpdate {
        ProgressUpdate {
            attempts,
            completed,
            won: completed.then_some(won),
            hints_used: attempts.saturating_sub(1),
            score: (completed && won).then_some(100),
            game_state: GameStateData::Glimpsed(GlimpsedState {
                current_frame: attempts,
                guesses: Vec::new(),
                movie_found: won,
            }),
            attempt_results: Vec::new(),
        }
    }

    #[test]
    fn test_save_keeps_start_time_and_sets_end_time() {
        let (service, clock) = service();
        service.save("glimpsed-001", GameType::Glimpsed, glimpsed_update(1, false, false));
        let progress = service.load("glimpsed-001").unwrap();
        assert_eq!(progress.status, GameStatus::InProgress);
        assert_eq!(progress.start_time, 1_000_000);
        assert_eq!(progress.end_time, None);
        assert_eq!(service.storage().get_last_played(GameType::Glimpsed), None);

        clock.advance(Duration::from_secs(42));
        service.save("glimpsed-001", GameType::Glimpsed, glimpsed_update(1, true, true));
        let progress = service.load("glimpsed-001").unwrap();
        assert_eq!(progress.status, GameStatus::Completed);
        assert_eq!(progress.start_time, 1_000_000);
        assert_eq!(progress.end_time, Some(1_042_000));
        assert_eq!(
            service.storage().get_last_played(GameType::Glimpsed),
            Some(1_042_000)
        );

        let summary = service.summary("glimpsed-001").unwrap();
        assert!(summary.won);
        assert_eq!(summary.game_type, GameType::Glimpsed);
        assert_eq!(summary.completion_time, Some(Duration::from_secs(42)));
        assert_eq!(summary.performance.completion_seconds, Some(42));
    }

    #[test]
    fn test_stats_recorded_once_per_completion() {
        let (service, clock) = service();
        let update = glimpsed_update(2, true, true);
        service.save("glimpsed-001", GameType::Glimpsed, update.clone());
        clock.advance(Duration::from_secs(5));
        service.save("glimpsed-001", GameType::Glimpsed, update);

        let stats = service.storage().get_user_stats();
        assert_eq!(stats.total_games_played, 1);
        assert_eq!(stats.streak_count, 1);
        assert_eq!(stats.for_game(GameType::Glimpsed).best_score, 100);
        // cooldown and completion time keep the first completion
        assert_eq!(
            service.storage().get_last_played(GameType::Glimpsed),
            Some(1_000_000)
        );
        assert_eq!(service.load("glimpsed-001").unwrap().end_time, Some(1_000_000));
        assert_eq!(
            service.summary("glimpsed-001").unwrap().completion_time,
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn test_loss_resets_streak() {
        let (service, _clock) = service();
        service.save("glimpsed-001", GameType::Glimpsed, glimpsed_update(1, true, true));
        let lost = ProgressUpdate {
            won: Some(false),
            score: None,
            game_state: GameStateData::Connections(ConnectionsState {
                solved_groups: vec!["group1".to_string()],
                ..Default::default()
            }),
            ..glimpsed_update(5, true, false)
        };
        service.save("connections-001", GameType::Connections, lost);

        let stats = service.storage().get_user_stats();
        assert_eq!(stats.total_games_played, 2);
        assert_eq!(stats.total_games_completed, 1);
        assert_eq!(stats.streak_count, 0);
        assert_eq!(stats.average_attempts, 3.0);

        let summary = service.summary("connections-001").unwrap();
        assert!(!summary.won);
        assert_eq!(summary.score, None);
    }

    #[test]
    fn test_replay_clears_progress_and_cooldown() {
        let (service, _clock) = service();
        service.save("glimpsed-001", GameType::Glimpsed, glimpsed_update(1, true, true));
        assert!(service.summary("glimpsed-001").is_some());

        service.replay("glimpsed-001", GameType::Glimpsed, None);
        assert_eq!(service.load("glimpsed-001"), None);
        assert_eq!(service.storage().get_last_played(GameType::Glimpsed), None);
        assert_eq!(service.summary("glimpsed-001"), None);
        // stats survive a replay
        assert_eq!(service.storage().get_user_stats().total_games_played, 1);
    }

    #[test]
    fn test_summary_requires_completion() {
        let (service, _clock) = service();
        assert_eq!(service.summary("glimpsed-001"), None);
        service.save("glimpsed-001", GameType::Glimpsed, glimpsed_update(1, false, false));
        assert_eq!(service.summary("glimpsed-001"), None);
    }
}
