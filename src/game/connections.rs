use crate::game::guess::{GuessOutcome, RejectReason};
use crate::game::progress::{ProgressService, ProgressUpdate};
use crate::game::storage::KeyValueStore;
use crate::model::{
    AttemptResult, ConnectionsGameData, ConnectionsState, GameProgress, GameStateData, GameType,
};
use itertools::Itertools;
use log::{debug, trace};
use rand::seq::SliceRandom;
use rand::Rng;

pub const MAX_WRONG_ATTEMPTS: u32 = 5;
pub const GROUP_SIZE: usize = 4;
pub const GROUP_COUNT: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub item: String,
    pub group_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMatch {
    pub is_correct: bool,
    pub group_id: Option<String>,
    pub is_one_away: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionsGameState {
    pub selected: Vec<Tile>,
    /// Unsolved tiles in display order.
    pub remaining: Vec<Tile>,
    pub solved_groups: Vec<String>,
    pub attempts: u32,
    pub attempt_results: Vec<AttemptResult>,
    pub game_completed: bool,
    pub game_over: bool,
    /// Persisted with the progress record so repeats stay rejected after a resume.
    previous_selections: Vec<Vec<String>>,
}

impl ConnectionsGameState {
    pub fn wrong_attempts(&self) -> u32 {
        self.attempt_results
            .iter()
            .filter(|result| **result != AttemptResult::Correct)
            .count() as u32
    }

    pub fn game_won(&self) -> bool {
        self.solved_groups.len() == GROUP_COUNT
    }

    pub fn mistakes_remaining(&self) -> u32 {
        MAX_WRONG_ATTEMPTS.saturating_sub(self.wrong_attempts())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub state: ConnectionsGameState,
    pub result: AttemptResult,
    pub group_id: Option<String>,
    /// Feedback for a wrong submission.
    pub message: Option<String>,
}

/// Resumed state plus whether resuming finished the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedGame {
    pub state: ConnectionsGameState,
    pub auto_completed: bool,
}

pub struct ConnectionsGame<'a> {
    data: &'a ConnectionsGameData,
}

fn selection_key(selected: &[Tile]) -> Vec<String> {
    selected.iter().map(|tile| tile.item.clone()).sorted().collect()
}

pub fn can_select_item(selected: &[Tile], item: &str) -> bool {
    selected.iter().any(|tile| tile.item == item) || selected.len() < GROUP_SIZE
}

/// Deselect `item` if selected, otherwise select it while fewer than four are chosen.
pub fn toggle_item_selection(selected: &[Tile], item: &str, group_id: &str) -> Vec<Tile> {
    if selected.iter().any(|tile| tile.item == item) {
        return selected
            .iter()
            .filter(|tile| tile.item != item)
            .cloned()
            .collect();
    }
    let mut selected = selected.to_vec();
    if selected.len() < GROUP_SIZE {
        selected.push(Tile {
            item: item.to_string(),
            group_id: group_id.to_string(),
        });
    }
    selected
}

fn largest_group_count(selected: &[Tile]) -> usize {
    selected
        .iter()
        .map(|tile| tile.group_id.as_str())
        .counts()
        .into_values()
        .max()
        .unwrap_or(0)
}

pub fn closeness_message(selected: &[Tile]) -> &'static str {
    match largest_group_count(selected) {
        3 => "So close! You were 1 away from the correct group.",
        2 => "Getting warmer! You were 2 away from the correct group.",
        _ => "Not quite right. Try a different combination!",
    }
}

pub fn check_group_match(selected: &[Tile], solved_groups: &[String]) -> GroupMatch {
    if selected.len() != GROUP_SIZE {
        return GroupMatch {
            is_correct: false,
            group_id: None,
            is_one_away: false,
        };
    }

    let first_group = &selected[0].group_id;
    if selected.iter().all(|tile| &tile.group_id == first_group)
        && !solved_groups.contains(first_group)
    {
        return GroupMatch {
            is_correct: true,
            group_id: Some(first_group.clone()),
            is_one_away: false,
        };
    }

    GroupMatch {
        is_correct: false,
        group_id: None,
        is_one_away: largest_group_count(selected) == 3,
    }
}

impl<'a> ConnectionsGame<'a> {
    pub fn new(data: &'a ConnectionsGameData) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &'a ConnectionsGameData {
        self.data
    }

    fn tiles_excluding(&self, solved_groups: &[String]) -> Vec<Tile> {
        self.data
            .groups
            .iter()
            .filter(|group| !solved_groups.contains(&group.id))
            .flat_map(|group| {
                group.items.iter().map(|item| Tile {
                    item: item.clone(),
                    group_id: group.id.clone(),
                })
            })
            .collect()
    }

    pub fn initial_state<R: Rng + ?Sized>(&self, rng: &mut R) -> ConnectionsGameState {
        let mut remaining = self.tiles_excluding(&[]);
        remaining.shuffle(rng);
        ConnectionsGameState {
            remaining,
            ..Default::default()
        }
    }

    /// Reorder the unsolved tiles. Game logic is unaffected.
    pub fn shuffle_remaining<R: Rng + ?Sized>(
        &self,
        state: &ConnectionsGameState,
        rng: &mut R,
    ) -> ConnectionsGameState {
        let mut state = state.clone();
        state.remaining.shuffle(rng);
        state
    }

    pub fn tile(&self, item: &str) -> Option<Tile> {
        self.data.groups.iter().find_map(|group| {
            group
                .items
                .iter()
                .find(|candidate| candidate.eq_ignore_ascii_case(item.trim()))
                .map(|found| Tile {
                    item: found.clone(),
                    group_id: group.id.clone(),
                })
        })
    }

    pub fn toggle(&self, state: &ConnectionsGameState, item: &str) -> ConnectionsGameState {
        let mut state = state.clone();
        if state.game_completed {
            return state;
        }
        if let Some(tile) = state.remaining.iter().find(|tile| tile.item == item) {
            state.selected = toggle_item_selection(&state.selected, &tile.item, &tile.group_id);
        }
        state
    }

    fn unsolved_group(&self, solved_groups: &[String]) -> Option<&'a str> {
        self.data
            .groups
            .iter()
            .find(|group| !solved_groups.contains(&group.id))
            .map(|group| group.id.as_str())
    }

    /// With three groups solved the last one is forced, so finish the game.
    fn auto_complete(&self, state: &mut ConnectionsGameState) -> bool {
        if state.game_completed || state.solved_groups.len() != GROUP_COUNT - 1 {
            return false;
        }
        let Some(last_group) = self.unsolved_group(&state.solved_groups) else {
            return false;
        };
        trace!(target: "connections", "Auto-solving final group {}", last_group);
        state.solved_groups.push(last_group.to_string());
        state.remaining.clear();
        state.selected.clear();
        state.game_completed = true;
        true
    }

    /// Submit the four selected tiles.
    pub fn submit(&self, state: &ConnectionsGameState) -> GuessOutcome<Submission> {
        if state.game_completed {
            return GuessOutcome::Rejected(RejectReason::GameCompleted);
        }
        if state.selected.len() != GROUP_SIZE {
            return GuessOutcome::Rejected(RejectReason::IncompleteSelection);
        }
        let key = selection_key(&state.selected);
        if state.previous_selections.contains(&key) {
            debug!(target: "connections", "Rejecting repeated selection {:?}", key);
            return GuessOutcome::Rejected(RejectReason::AlreadyGuessed);
        }

        let group_match = check_group_match(&state.selected, &state.solved_groups);
        let mut next = state.clone();
        next.previous_selections.push(key);
        next.attempts += 1;

        if let (true, Some(group_id)) = (group_match.is_correct, group_match.group_id.clone()) {
            next.solved_groups.push(group_id.clone());
            next.remaining.retain(|tile| tile.group_id != group_id);
            next.attempt_results.push(AttemptResult::Correct);
            next.selected.clear();
            if next.game_won() {
                next.game_completed = true;
            } else {
                self.auto_complete(&mut next);
            }
            return GuessOutcome::Accepted(Submission {
                state: next,
                result: AttemptResult::Correct,
                group_id: Some(group_id),
                message: None,
            });
        }

        let result = if group_match.is_one_away {
            AttemptResult::OneAway
        } else {
            AttemptResult::Wrong
        };
        let message = closeness_message(&state.selected).to_string();
        next.attempt_results.push(result);
        next.selected.clear();
        if next.wrong_attempts() >= MAX_WRONG_ATTEMPTS {
            debug!(target: "connections", "Out of attempts, revealing remaining groups");
            next.game_over = true;
            next.game_completed = true;
        }

        GuessOutcome::Accepted(Submission {
            state: next,
            result,
            group_id: None,
            message: Some(message),
        })
    }

    /// Rebuild the state from a stored record, auto-completing a 3-of-4 board.
    pub fn from_progress<R: Rng + ?Sized>(
        &self,
        progress: Option<&GameProgress>,
        rng: &mut R,
    ) -> LoadedGame {
        let Some(progress) = progress else {
            return LoadedGame {
                state: self.initial_state(rng),
                auto_completed: false,
            };
        };

        let stored = progress.connections_state().cloned().unwrap_or_default();
        let solved_groups = stored.solved_groups;
        let mut remaining = self.tiles_excluding(&solved_groups);
        remaining.shuffle(rng);

        let mut state = ConnectionsGameState {
            selected: Vec::new(),
            remaining,
            solved_groups,
            attempts: progress.attempts,
            attempt_results: progress.attempt_results.clone(),
            game_completed: progress.completed,
            game_over: false,
            previous_selections: stored.previous_selections,
        };
        if state.game_completed {
            state.game_over = !state.game_won();
            if state.game_won() {
                state.remaining.clear();
            }
        }
        let auto_completed = self.auto_complete(&mut state);
        LoadedGame {
            state,
            auto_completed,
        }
    }

    /// Points for a won game; lost and unfinished games have no score.
    pub fn score(&self, state: &ConnectionsGameState) -> Option<u32> {
        if !state.game_completed || !state.game_won() {
            return None;
        }
        Some(100u32.saturating_sub(state.attempts.saturating_mul(10)))
    }

    pub fn progress_update(&self, state: &ConnectionsGameState) -> ProgressUpdate {
        ProgressUpdate {
            attempts: state.attempts,
            completed: state.game_completed,
            won: state.game_completed.then(|| state.game_won()),
            hints_used: 0,
            score: self.score(state),
            game_state: GameStateData::Connections(ConnectionsState {
                solved_groups: state.solved_groups.clone(),
                previous_selections: state.previous_selections.clone(),
            }),
            attempt_results: state.attempt_results.clone(),
        }
    }

    /// Load and resume, persisting an auto-completed board straight away.
    pub fn load<S: KeyValueStore, R: Rng + ?Sized>(
        &self,
        progress: &ProgressService<S>,
        rng: &mut R,
    ) -> ConnectionsGameState {
        let stored = progress.load(&self.data.id);
        let loaded = self.from_progress(stored.as_ref(), rng);
        if loaded.auto_completed {
            self.save(progress, &loaded.state);
        }
        loaded.state
    }

    pub fn save<S: KeyValueStore>(&self, progress: &ProgressService<S>, state: &ConnectionsGameState) {
        progress.save(&self.data.id, GameType::Connections, self.progress_update(state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::catalog::GameCatalog;
    use crate::game::clock::ManualClock;
    use crate::game::storage::{GameStorage, MemoryStore};
    use crate::model::GameStatus;
    use std::rc::Rc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn game_data() -> ConnectionsGameData {
        GameCatalog::builtin().connections[0].clone()
    }

    fn select_group(game: &ConnectionsGame, state: &ConnectionsGameState, group_index: usize) -> ConnectionsGameState {
        let mut state = state.clone();
        for item in &game.data().groups[group_index].items {
            state = game.toggle(&state, item);
        }
        state
    }

    fn select_items(game: &ConnectionsGame, state: &ConnectionsGameState, items: &[&str]) -> ConnectionsGameState {
        let mut state = state.clone();
        for item in items {
            state = game.toggle(&state, item);
        }
        state
    }

    fn submit(game: &ConnectionsGame, state: &ConnectionsGameState) -> Submission {
        game.submit(state).accepted().expect("submission accepted")
    }

    #[test]
    fn test_check_group_match() {
        let tile = |item: &str, group: &str| Tile {
            item: item.to_string(),
            group_id: group.to_string(),
        };
        let all_same = vec![tile("a", "g1"), tile("b", "g1"), tile("c", "g1"), tile("d", "g1")];
        let result = check_group_match(&all_same, &[]);
        assert!(result.is_correct);
        assert_eq!(result.group_id.as_deref(), Some("g1"));

        let already_solved = check_group_match(&all_same, &["g1".to_string()]);
        assert!(!already_solved.is_correct);

        let one_away = vec![tile("a", "g1"), tile("b", "g1"), tile("c", "g1"), tile("x", "g2")];
        let result = check_group_match(&one_away, &[]);
        assert!(!result.is_correct);
        assert!(result.is_one_away);

        let two_two = vec![tile("a", "g1"), tile("b", "g1"), tile("x", "g2"), tile("y", "g2")];
        assert!(!check_group_match(&two_two, &[]).is_one_away);
        assert_eq!(closeness_message(&two_two), "Getting warmer! You were 2 away from the correct group.");
        assert!(!check_group_match(&two_two[..3], &[]).is_correct);
    }

    #[test]
    fn test_selection_limits() {
        let data = game_data();
        let game = ConnectionsGame::new(&data);
        let mut rng = StdRng::seed_from_u64(7);
        let state = game.initial_state(&mut rng);
        assert_eq!(state.remaining.len(), 16);

        let items: Vec<&str> = data.groups[0].items.iter().map(String::as_str).collect();
        let state = select_items(&game, &state, &items);
        assert_eq!(state.selected.len(), 4);
        assert!(!can_select_item(&state.selected, "War"));
        assert!(can_select_item(&state.selected, items[0]));

        let state = game.toggle(&state, "War");
        assert_eq!(state.selected.len(), 4);
        let state = game.toggle(&state, items[1]);
        assert_eq!(state.selected.len(), 3);
    }

    #[test]
    fn test_three_correct_auto_completes() {
        let data = game_data();
        let game = ConnectionsGame::new(&data);
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = game.initial_state(&mut rng);

        for group_index in [2, 0] {
            state = submit(&game, &select_group(&game, &state, group_index)).state;
            assert!(!state.game_completed);
        }
        let submission = submit(&game, &select_group(&game, &state, 3));
        let state = submission.state;

        assert_eq!(submission.result, AttemptResult::Correct);
        assert!(state.game_completed);
        assert!(state.game_won());
        assert_eq!(state.solved_groups, vec!["group3", "group1", "group4", "group2"]);
        assert_eq!(state.attempt_results, vec![AttemptResult::Correct; 3]);
        assert!(state.remaining.is_empty());
        assert_eq!(game.score(&state), Some(70));

        assert_eq!(
            game.submit(&state).rejection(),
            Some(RejectReason::GameCompleted)
        );
    }

    #[test]
    fn test_five_wrong_attempts_lose() {
        let data = game_data();
        let game = ConnectionsGame::new(&data);
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = game.initial_state(&mut rng);

        let wrong_selections = [
            ["Dil To Pagal Hai", "Veer-Zaara", "Rab Ne Bana Di Jodi", "War"],
            ["Dil To Pagal Hai", "Veer-Zaara", "Cocktail", "War"],
            ["Dil To Pagal Hai", "Chennai Express", "Cocktail", "War"],
            ["Veer-Zaara", "Chennai Express", "Cocktail", "War"],
            ["Veer-Zaara", "Chennai Express", "Cocktail", "Kabir Singh"],
        ];
        for (index, items) in wrong_selections.iter().enumerate() {
            let submission = submit(&game, &select_items(&game, &state, items));
            state = submission.state;
            assert!(submission.message.is_some());
            assert_eq!(state.game_completed, index == 4);
        }

        assert_eq!(
            state.attempt_results,
            vec![
                AttemptResult::OneAway,
                AttemptResult::Wrong,
                AttemptResult::Wrong,
                AttemptResult::Wrong,
                AttemptResult::Wrong
            ]
        );
        assert!(state.game_over);
        assert_eq!(state.mistakes_remaining(), 0);
        assert_eq!(game.score(&state), None);
        let update = game.progress_update(&state);
        assert_eq!(update.won, Some(false));
    }

    #[test]
    fn test_repeated_selection_is_rejected() {
        let data = game_data();
        let game = ConnectionsGame::new(&data);
        let mut rng = StdRng::seed_from_u64(5);
        let state = game.initial_state(&mut rng);
        let items = ["Dil To Pagal Hai", "Veer-Zaara", "Cocktail", "War"];

        let state = submit(&game, &select_items(&game, &state, &items)).state;
        let reordered = ["War", "Cocktail", "Veer-Zaara", "Dil To Pagal Hai"];
        let again = select_items(&game, &state, &reordered);
        assert_eq!(game.submit(&again).rejection(), Some(RejectReason::AlreadyGuessed));
        assert_eq!(state.attempts, 1);

        let partial = select_items(&game, &state, &items[..2]);
        assert_eq!(
            game.submit(&partial).rejection(),
            Some(RejectReason::IncompleteSelection)
        );
    }

    #[test]
    fn test_resume_with_three_solved_auto_completes() {
        let data = game_data();
        let game = ConnectionsGame::new(&data);
        let mut rng = StdRng::seed_from_u64(9);
        let progress = GameProgress {
            status: GameStatus::InProgress,
            attempts: 4,
            game_state: Some(GameStateData::Connections(ConnectionsState {
                solved_groups: vec!["group1".into(), "group4".into(), "group2".into()],
                ..Default::default()
            })),
            attempt_results: vec![
                AttemptResult::Correct,
                AttemptResult::Wrong,
                AttemptResult::Correct,
                AttemptResult::Correct,
            ],
            ..GameProgress::new(&data.id, 0)
        };

        let loaded = game.from_progress(Some(&progress), &mut rng);
        assert!(loaded.auto_completed);
        assert!(loaded.state.game_completed);
        assert_eq!(
            loaded.state.solved_groups,
            vec!["group1", "group4", "group2", "group3"]
        );
        assert_eq!(loaded.state.attempt_results.len(), 4);
        assert_eq!(game.score(&loaded.state), Some(60));
    }

    #[test]
    fn test_resume_partial_board() {
        let data = game_data();
        let game = ConnectionsGame::new(&data);
        let mut rng = StdRng::seed_from_u64(11);
        let progress = GameProgress {
            attempts: 2,
            game_state: Some(GameStateData::Connections(ConnectionsState {
                solved_groups: vec!["group2".into()],
                ..Default::default()
            })),
            attempt_results: vec![AttemptResult::OneAway, AttemptResult::Correct],
            ..GameProgress::new(&data.id, 0)
        };

        let loaded = game.from_progress(Some(&progress), &mut rng);
        assert!(!loaded.auto_completed);
        assert_eq!(loaded.state.remaining.len(), 12);
        assert!(loaded
            .state
            .remaining
            .iter()
            .all(|tile| tile.group_id != "group2"));
        assert_eq!(loaded.state.wrong_attempts(), 1);

        let reshuffled = game.shuffle_remaining(&loaded.state, &mut rng);
        assert_eq!(reshuffled.remaining.len(), 12);
        assert_eq!(reshuffled.solved_groups, loaded.state.solved_groups);
    }

    #[test]
    fn test_load_persists_auto_completion() {
        let data = game_data();
        let game = ConnectionsGame::new(&data);
        let storage = Rc::new(GameStorage::new(MemoryStore::new()));
        let progress = ProgressService::new(storage.clone(), Rc::new(ManualClock::new(77)));
        let mut rng = StdRng::seed_from_u64(13);

        let mut state = game.load(&progress, &mut rng);
        for group_index in 0..3 {
            state = submit(&game, &select_group(&game, &state, group_index)).state;
            if group_index == 0 {
                game.save(&progress, &state);
            }
        }
        assert!(state.game_completed);

        // a crash after the third group left only one group saved
        let stored = storage.get_progress(&data.id).unwrap();
        assert_eq!(stored.connections_state().unwrap().solved_groups.len(), 1);
        storage.save_progress(
            &data.id,
            &GameProgress {
                attempts: 3,
                game_state: Some(GameStateData::Connections(ConnectionsState {
                    solved_groups: state.solved_groups[..3].to_vec(),
                    ..Default::default()
                })),
                ..stored
            },
        );

        let resumed = game.load(&progress, &mut rng);
        assert!(resumed.game_completed);
        let stored = storage.get_progress(&data.id).unwrap();
        assert!(stored.completed);
        assert_eq!(stored.status, GameStatus::Completed);
        assert_eq!(stored.score, Some(70));
        assert_eq!(storage.get_last_played(GameType::Connections), Some(77));
        assert_eq!(storage.get_user_stats().for_game(GameType::Connections).completed, 1);
    }

    #[test]
    fn test_repeat_rejected_after_resume() {
        let data = game_data();
        let game = ConnectionsGame::new(&data);
        let storage = Rc::new(GameStorage::new(MemoryStore::new()));
        let progress = ProgressService::new(storage.clone(), Rc::new(ManualClock::new(0)));
        let mut rng = StdRng::seed_from_u64(17);
        let items = ["Dil To Pagal Hai", "Veer-Zaara", "Cocktail", "War"];

        let state = game.load(&progress, &mut rng);
        let state = submit(&game, &select_items(&game, &state, &items)).state;
        game.save(&progress, &state);

        let resumed = game.load(&progress, &mut rng);
        assert_eq!(resumed.attempts, 1);
        let again = select_items(&game, &resumed, &["War", "Veer-Zaara", "Cocktail", "Dil To Pagal Hai"]);
        assert_eq!(game.submit(&again).rejection(), Some(RejectReason::AlreadyGuessed));

        let stored = storage.get_progress(&data.id).unwrap();
        assert_eq!(
            stored.connections_state().unwrap().previous_selections,
            vec![vec!["Cocktail", "Dil To Pagal Hai", "Veer-Zaara", "War"]]
        );
    }
}
