use crate::game::guess::{guess_matches, is_duplicate, GuessOutcome, RejectReason};
use crate::game::progress::{ProgressService, ProgressUpdate};
use crate::game::storage::KeyValueStore;
use crate::model::{GameProgress, GameStateData, GameType, GlimpsedGameData, GlimpsedState};
use log::{debug, trace};

pub const MAX_FRAMES: u32 = 6;
pub const MAX_ATTEMPTS: u32 = 6;

const FRAME_PENALTY: u32 = 15;
const ATTEMPT_PENALTY: u32 = 5;
const MIN_WINNING_SCORE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlimpsedGameState {
    pub current_frame: u32,
    pub guesses: Vec<String>,
    pub movie_found: bool,
    pub attempts: u32,
    pub game_completed: bool,
}

impl Default for GlimpsedGameState {
    fn default() -> Self {
        Self {
            current_frame: 1,
            guesses: Vec::new(),
            movie_found: false,
            attempts: 0,
            game_completed: false,
        }
    }
}

impl GlimpsedGameState {
    /// Frames shown beyond the first.
    pub fn hints_used(&self) -> u32 {
        self.current_frame.saturating_sub(1)
    }

    pub fn attempts_remaining(&self) -> u32 {
        MAX_ATTEMPTS.saturating_sub(self.attempts)
    }
}

pub struct GlimpsedGame<'a> {
    data: &'a GlimpsedGameData,
}

impl<'a> GlimpsedGame<'a> {
    pub fn new(data: &'a GlimpsedGameData) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &'a GlimpsedGameData {
        self.data
    }

    pub fn process_guess(
        &self,
        guess: &str,
        state: &GlimpsedGameState,
    ) -> GuessOutcome<GlimpsedGameState> {
        if guess.trim().is_empty() {
            return GuessOutcome::Rejected(RejectReason::Empty);
        }
        if state.game_completed {
            return GuessOutcome::Rejected(RejectReason::GameCompleted);
        }
        if is_duplicate(guess, &state.guesses) {
            debug!(target: "glimpsed", "Duplicate guess {:?}", guess);
            return GuessOutcome::Rejected(RejectReason::AlreadyGuessed);
        }

        let mut next = state.clone();
        next.guesses.push(guess.to_string());
        next.attempts += 1;

        if guess_matches(guess, &self.data.movie_name) {
            next.movie_found = true;
            next.game_completed = true;
        } else {
            next.current_frame = (next.current_frame + 1).min(MAX_FRAMES);
            trace!(target: "glimpsed", "Wrong guess, showing frame {}", next.current_frame);
            if next.attempts >= MAX_ATTEMPTS {
                debug!(target: "glimpsed", "Out of attempts for {}", self.data.id);
                next.game_completed = true;
            }
        }
        GuessOutcome::Accepted(next)
    }

    /// Points for a won game; a lost game has no score.
    pub fn score(&self, state: &GlimpsedGameState) -> Option<u32> {
        if !state.movie_found {
            return None;
        }
        let frame_penalty = state.hints_used() * FRAME_PENALTY;
        let attempt_penalty = state.attempts.saturating_sub(1) * ATTEMPT_PENALTY;
        let score = 100u32
            .saturating_sub(frame_penalty)
            .saturating_sub(attempt_penalty);
        Some(score.max(MIN_WINNING_SCORE))
    }

    pub fn from_progress(&self, progress: Option<&GameProgress>) -> GlimpsedGameState {
        let Some(progress) = progress else {
            return GlimpsedGameState::default();
        };
        let stored = progress.glimpsed_state().cloned().unwrap_or_default();
        GlimpsedGameState {
            current_frame: stored.current_frame.clamp(1, MAX_FRAMES),
            guesses: stored.guesses,
            movie_found: stored.movie_found,
            attempts: progress.attempts,
            game_completed: progress.completed,
        }
    }

    pub fn progress_update(&self, state: &GlimpsedGameState) -> ProgressUpdate {
        ProgressUpdate {
            attempts: state.attempts,
            completed: state.game_completed,
            won: state.game_completed.then_some(state.movie_found),
            hints_used: state.hints_used(),
            score: self.score(state),
            game_state: GameStateData::Glimpsed(GlimpsedState {
                current_frame: state.current_frame,
                guesses: state.guesses.clone(),
                movie_found: state.movie_found,
            }),
            attempt_results: Vec::new(),
        }
    }

    pub fn load<S: KeyValueStore>(&self, progress: &ProgressService<S>) -> GlimpsedGameState {
        self.from_progress(progress.load(&self.data.id).as_ref())
    }

    pub fn save<S: KeyValueStore>(&self, progress: &ProgressService<S>, state: &GlimpsedGameState) {
        progress.save(&self.data.id, GameType::Glimpsed, self.progress_update(state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::catalog::GameCatalog;
    use crate::game::clock::ManualClock;
    use crate::game::storage::{GameStorage, MemoryStore};
    use std::rc::Rc;

    fn game_data() -> GlimpsedGameData {
        GameCatalog::builtin().glimpsed[0].clone()
    }

    #[test]
    fn test_first_try_win() {
        let data = game_data();
        let game = GlimpsedGame::new(&data);
        let state = game
            .process_guess("chalte chalte", &GlimpsedGameState::default())
            .accepted()
            .unwrap();

        assert_eq!(state.current_frame, 1);
        assert_eq!(state.guesses, vec!["chalte chalte"]);
        assert!(state.movie_found);
        assert!(state.game_completed);
        assert_eq!(game.score(&state), Some(100));
        assert_eq!(
            game.process_guess("Veer-Zaara", &state).rejection(),
            Some(RejectReason::GameCompleted)
        );
    }

    #[test]
    fn test_wrong_guesses_reveal_frames() {
        let data = game_data();
        let game = GlimpsedGame::new(&data);
        let mut state = GlimpsedGameState::default();
        for (guess, frame) in [("Swades", 2), ("Kal Ho Naa Ho", 3)] {
            state = game.process_guess(guess, &state).accepted().unwrap();
            assert_eq!(state.current_frame, frame);
        }
        assert_eq!(
            game.process_guess(" SWADES ", &state).rejection(),
            Some(RejectReason::AlreadyGuessed)
        );
        assert_eq!(
            game.process_guess("", &state).rejection(),
            Some(RejectReason::Empty)
        );

        state = game.process_guess("Chalte Chalte", &state).accepted().unwrap();
        assert_eq!(state.current_frame, 3);
        assert_eq!(state.attempts, 3);
        // 100 - 2 frames * 15 - 2 extra attempts * 5
        assert_eq!(game.score(&state), Some(60));
        assert_eq!(game.progress_update(&state).hints_used, 2);
    }

    #[test]
    fn test_six_misses_lose() {
        let data = game_data();
        let game = GlimpsedGame::new(&data);
        let mut state = GlimpsedGameState::default();
        for attempt in 1..=MAX_ATTEMPTS {
            state = game
                .process_guess(&format!("Miss {}", attempt), &state)
                .accepted()
                .unwrap();
            assert_eq!(state.game_completed, attempt == MAX_ATTEMPTS);
        }
        assert_eq!(state.current_frame, MAX_FRAMES);
        assert!(!state.movie_found);
        assert_eq!(game.score(&state), None);
        assert_eq!(game.progress_update(&state).won, Some(false));
    }

    #[test]
    fn test_score_floor() {
        let data = game_data();
        let game = GlimpsedGame::new(&data);
        let state = GlimpsedGameState {
            current_frame: 6,
            guesses: Vec::new(),
            movie_found: true,
            attempts: 6,
            game_completed: true,
        };
        assert_eq!(game.score(&state), Some(10));
    }

    #[test]
    fn test_save_and_resume() {
        let data = game_data();
        let game = GlimpsedGame::new(&data);
        let storage = Rc::new(GameStorage::new(MemoryStore::new()));
        let progress = ProgressService::new(storage.clone(), Rc::new(ManualClock::new(5_000)));

        assert_eq!(game.load(&progress), GlimpsedGameState::default());
        let state = game
            .process_guess("Devdas", &GlimpsedGameState::default())
            .accepted()
            .unwrap();
        game.save(&progress, &state);
        assert_eq!(game.load(&progress), state);
        assert_eq!(storage.get_progress(&data.id).unwrap().hints_used, 1);
        assert_eq!(storage.get_last_played(GameType::Glimpsed), None);

        let state = game.process_guess("Chalte Chalte", &state).accepted().unwrap();
        game.save(&progress, &state);
        assert_eq!(game.load(&progress), state);
        assert_eq!(storage.get_last_played(GameType::Glimpsed), Some(5_000));
        assert_eq!(storage.get_user_stats().for_game(GameType::Glimpsed).best_score, 80);
    }
}
