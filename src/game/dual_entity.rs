//! Guess-and-reveal state machine shared by Face Mash and Plot Fusion.
//!
//! Two hidden entities are guessed in any order. A wrong guess is charged
//! against one entity and reveals that entity's next hint.

use crate::game::catalog::EntityLookup;
use crate::game::guess::{guess_matches, is_duplicate, GuessOutcome, RejectReason};
use crate::game::progress::{ProgressService, ProgressUpdate};
use crate::game::scoring::{
    attempt_based_score, final_score, hint_penalty, DEFAULT_ATTEMPT_PENALTY, DEFAULT_BASE_SCORE,
    DEFAULT_HINT_PENALTY,
};
use crate::game::storage::KeyValueStore;
use crate::model::{DualEntityState, EntityState, GameProgress, GameStateData, GameType, Gender};
use log::{debug, trace};

/// Wrong guesses after which an entity is out of play.
pub const MAX_WRONG_GUESSES_PER_ENTITY: usize = 5;
/// Hard cap on guesses for the whole game.
pub const MAX_TOTAL_ATTEMPTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntitySlot {
    Entity1,
    Entity2,
}

impl EntitySlot {
    pub fn other(&self) -> EntitySlot {
        match self {
            EntitySlot::Entity1 => EntitySlot::Entity2,
            EntitySlot::Entity2 => EntitySlot::Entity1,
        }
    }
}

/// One hidden entity as the puzzle defines it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleEntity {
    pub name: String,
    /// Hints in display order.
    pub hints: Vec<String>,
    pub gender: Option<Gender>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DualEntityPuzzle {
    pub game_type: GameType,
    pub game_id: String,
    pub entity1: PuzzleEntity,
    pub entity2: PuzzleEntity,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DualEntityGameState {
    pub entity1: EntityState,
    pub entity2: EntityState,
    pub attempts: u32,
    pub game_completed: bool,
    pub game_won: bool,
    pub show_answers: bool,
    /// Entity the player explicitly picked for the next wrong guess.
    pub current_target: Option<EntitySlot>,
}

impl DualEntityGameState {
    pub fn entity(&self, slot: EntitySlot) -> &EntityState {
        match slot {
            EntitySlot::Entity1 => &self.entity1,
            EntitySlot::Entity2 => &self.entity2,
        }
    }

    fn entity_mut(&mut self, slot: EntitySlot) -> &mut EntityState {
        match slot {
            EntitySlot::Entity1 => &mut self.entity1,
            EntitySlot::Entity2 => &mut self.entity2,
        }
    }

    pub fn hints_used(&self) -> u32 {
        self.entity1.hints_revealed + self.entity2.hints_revealed
    }

    fn all_guesses(&self) -> impl Iterator<Item = &String> {
        self.entity1.guesses.iter().chain(self.entity2.guesses.iter())
    }

    pub fn from_progress(progress: Option<&GameProgress>) -> Self {
        let Some(progress) = progress else {
            return Self::default();
        };
        let entities = progress.dual_entity_state().cloned().unwrap_or_default();
        let game_won = entities.entity1.found && entities.entity2.found;
        Self {
            entity1: entities.entity1,
            entity2: entities.entity2,
            attempts: progress.attempts,
            game_completed: progress.completed,
            game_won,
            show_answers: progress.completed,
            current_target: None,
        }
    }

    pub fn to_game_state(&self, game_type: GameType) -> GameStateData {
        let entities = DualEntityState {
            entity1: self.entity1.clone(),
            entity2: self.entity2.clone(),
        };
        match game_type {
            GameType::PlotFusion => GameStateData::PlotFusion(entities),
            _ => GameStateData::FaceMash(entities),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DualGuessResult {
    pub state: DualEntityGameState,
    pub is_correct: bool,
    pub target: EntitySlot,
}

impl DualEntityPuzzle {
    pub fn entity(&self, slot: EntitySlot) -> &PuzzleEntity {
        match slot {
            EntitySlot::Entity1 => &self.entity1,
            EntitySlot::Entity2 => &self.entity2,
        }
    }

    /// Hints the player can currently see; a found entity shows all of them.
    pub fn visible_hints<'a>(&'a self, state: &DualEntityGameState, slot: EntitySlot) -> &'a [String] {
        let hints = &self.entity(slot).hints;
        let entity_state = state.entity(slot);
        if entity_state.found {
            return hints;
        }
        let revealed = (entity_state.hints_revealed as usize).min(hints.len());
        &hints[..revealed]
    }

    /// Pick the entity a wrong guess is charged against.
    pub fn determine_target(
        &self,
        guess: &str,
        state: &DualEntityGameState,
        lookup: &dyn EntityLookup,
    ) -> EntitySlot {
        if let Some(target) = state.current_target.filter(|slot| !state.entity(*slot).found) {
            return target;
        }

        match (state.entity1.found, state.entity2.found) {
            (true, false) => return EntitySlot::Entity2,
            (false, true) => return EntitySlot::Entity1,
            _ => {}
        }

        let (gender1, gender2) = (self.entity1.gender, self.entity2.gender);
        if gender1 != gender2 {
            if let Some(guessed_gender) = lookup.person_by_name(guess).and_then(|person| person.gender) {
                if gender1 == Some(guessed_gender) {
                    return EntitySlot::Entity1;
                }
                if gender2 == Some(guessed_gender) {
                    return EntitySlot::Entity2;
                }
            }
        }

        if state.entity1.hints_revealed <= state.entity2.hints_revealed {
            EntitySlot::Entity1
        } else {
            EntitySlot::Entity2
        }
    }

    pub fn process_guess(
        &self,
        guess: &str,
        state: &DualEntityGameState,
        lookup: &dyn EntityLookup,
    ) -> GuessOutcome<DualGuessResult> {
        if guess.trim().is_empty() {
            return GuessOutcome::Rejected(RejectReason::Empty);
        }
        if state.game_completed {
            return GuessOutcome::Rejected(RejectReason::GameCompleted);
        }
        if is_duplicate(guess, state.all_guesses()) {
            debug!(target: "dual_entity", "Duplicate guess {:?} for {}", guess, self.game_id);
            return GuessOutcome::Rejected(RejectReason::AlreadyGuessed);
        }

        let mut next = state.clone();
        next.attempts += 1;

        let correct_slot = [EntitySlot::Entity1, EntitySlot::Entity2]
            .into_iter()
            .find(|slot| !state.entity(*slot).found && guess_matches(guess, &self.entity(*slot).name));

        let (target, is_correct) = match correct_slot {
            Some(slot) => {
                let hint_count = self.entity(slot).hints.len() as u32;
                let entity = next.entity_mut(slot);
                entity.found = true;
                entity.guesses.push(guess.to_string());
                entity.hints_revealed = entity.hints_revealed.max(hint_count);
                if next.current_target == Some(slot) {
                    next.current_target = None;
                }
                (slot, true)
            }
            None => {
                let slot = self.determine_target(guess, state, lookup);
                let hint_count = self.entity(slot).hints.len() as u32;
                let entity = next.entity_mut(slot);
                entity.guesses.push(guess.to_string());
                entity.hints_revealed = (entity.hints_revealed + 1).min(hint_count).max(entity.hints_revealed);
                trace!(
                    target: "dual_entity",
                    "Wrong guess {:?} charged to {:?}, {} hints revealed",
                    guess,
                    slot,
                    entity.hints_revealed
                );
                (slot, false)
            }
        };

        if next.entity1.found && next.entity2.found {
            next.game_won = true;
            next.game_completed = true;
            next.show_answers = true;
        } else if !is_correct && self.is_exhausted(&next) {
            debug!(target: "dual_entity", "Game {} lost after {} attempts", self.game_id, next.attempts);
            next.game_completed = true;
            next.show_answers = true;
        }

        GuessOutcome::Accepted(DualGuessResult {
            state: next,
            is_correct,
            target,
        })
    }

    fn is_exhausted(&self, state: &DualEntityGameState) -> bool {
        if state.attempts >= MAX_TOTAL_ATTEMPTS {
            return true;
        }
        let done = |entity: &EntityState| {
            entity.found || entity.wrong_guesses() >= MAX_WRONG_GUESSES_PER_ENTITY
        };
        done(&state.entity1) && done(&state.entity2)
    }

    /// Zero unless both entities were found.
    pub fn score(&self, state: &DualEntityGameState) -> u32 {
        if !state.game_won {
            return 0;
        }
        let base = attempt_based_score(
            state.attempts,
            MAX_TOTAL_ATTEMPTS,
            DEFAULT_BASE_SCORE,
            DEFAULT_ATTEMPT_PENALTY,
        );
        let penalty = hint_penalty(state.hints_used(), DEFAULT_HINT_PENALTY);
        final_score(base, 0, penalty, 0.0)
    }

    /// Charge the next wrong guess to `slot`, or clear the choice. Found entities can't be picked.
    pub fn select_target(
        &self,
        state: &DualEntityGameState,
        slot: Option<EntitySlot>,
    ) -> DualEntityGameState {
        let mut next = state.clone();
        next.current_target = slot.filter(|slot| !state.entity(*slot).found);
        next
    }

    pub fn progress_update(&self, state: &DualEntityGameState) -> ProgressUpdate {
        ProgressUpdate {
            attempts: state.attempts,
            completed: state.game_completed,
            won: state.game_completed.then_some(state.game_won),
            hints_used: state.hints_used(),
            score: state.game_completed.then(|| self.score(state)),
            game_state: state.to_game_state(self.game_type),
            attempt_results: Vec::new(),
        }
    }

    pub fn load<S: KeyValueStore>(&self, progress: &ProgressService<S>) -> DualEntityGameState {
        DualEntityGameState::from_progress(progress.load(&self.game_id).as_ref())
    }

    pub fn save<S: KeyValueStore>(&self, progress: &ProgressService<S>, state: &DualEntityGameState) {
        progress.save(&self.game_id, self.game_type, self.progress_update(state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::catalog::GameCatalog;
    use crate::tests::UsingLogger;
    use test_context::test_context;

    fn puzzle() -> DualEntityPuzzle {
        let hints = |prefix: &str| (1..=3).map(|n| format!("{} hint {}", prefix, n)).collect();
        DualEntityPuzzle {
            game_type: GameType::FaceMash,
            game_id: "face-mash-001".to_string(),
            entity1: PuzzleEntity {
                name: "Shah Rukh Khan".to_string(),
                hints: hints("srk"),
                gender: Some(Gender::Male),
            },
            entity2: PuzzleEntity {
                name: "Aishwarya Rai".to_string(),
                hints: hints("ash"),
                gender: Some(Gender::Female),
            },
        }
    }

    fn guess(
        puzzle: &DualEntityPuzzle,
        catalog: &GameCatalog,
        state: &DualEntityGameState,
        text: &str,
    ) -> DualGuessResult {
        puzzle
            .process_guess(text, state, catalog)
            .accepted()
            .expect("guess accepted")
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_gender_targets_wrong_guess(_: &mut UsingLogger) {
        let puzzle = puzzle();
        let catalog = GameCatalog::builtin();
        let state = DualEntityGameState::default();

        let result = guess(&puzzle, &catalog, &state, "Salman Khan");
        assert!(!result.is_correct);
        assert_eq!(result.target, EntitySlot::Entity1);
        assert_eq!(result.state.entity1.guesses, vec!["Salman Khan"]);
        assert_eq!(result.state.entity1.hints_revealed, 1);
        assert_eq!(result.state.attempts, 1);

        // female guess lands on the female entity even though it has fewer hints
        let result = guess(&puzzle, &catalog, &result.state, "Alia Bhatt");
        assert_eq!(result.target, EntitySlot::Entity2);
        // unknown names fall back to the entity with fewer hints revealed
        let result = guess(&puzzle, &catalog, &result.state, "Nobody In Particular");
        assert_eq!(result.target, EntitySlot::Entity1);
        assert_eq!(result.state.entity1.hints_revealed, 2);
    }

    #[test]
    fn test_explicit_and_found_targeting() {
        let mut puzzle = puzzle();
        puzzle.entity2.gender = Some(Gender::Male);
        let catalog = GameCatalog::builtin();

        let mut state = DualEntityGameState {
            current_target: Some(EntitySlot::Entity2),
            ..Default::default()
        };
        assert_eq!(
            puzzle.determine_target("Alia Bhatt", &state, &catalog),
            EntitySlot::Entity2
        );

        state.current_target = None;
        state.entity2.hints_revealed = 0;
        state.entity1.hints_revealed = 2;
        // same genders: gender heuristic skipped, fewer hints wins
        assert_eq!(
            puzzle.determine_target("Salman Khan", &state, &catalog),
            EntitySlot::Entity2
        );

        state.entity2.found = true;
        assert_eq!(
            puzzle.determine_target("Salman Khan", &state, &catalog),
            EntitySlot::Entity1
        );
    }

    #[test]
    fn test_win_reveals_hints_and_scores() {
        let puzzle = puzzle();
        let catalog = GameCatalog::builtin();
        let state = DualEntityGameState::default();

        let result = guess(&puzzle, &catalog, &state, " shah rukh khan ");
        assert!(result.is_correct);
        assert_eq!(result.target, EntitySlot::Entity1);
        assert!(result.state.entity1.found);
        assert_eq!(result.state.entity1.hints_revealed, 3);
        assert!(!result.state.game_completed);
        assert_eq!(puzzle.visible_hints(&result.state, EntitySlot::Entity1).len(), 3);
        assert!(puzzle.visible_hints(&result.state, EntitySlot::Entity2).is_empty());

        let result = guess(&puzzle, &catalog, &result.state, "Aishwarya Rai");
        let state = result.state;
        assert!(state.game_won);
        assert!(state.game_completed);
        assert!(state.show_answers);
        // 100 - 2*15 - 6 hints * 5
        assert_eq!(puzzle.score(&state), 40);

        assert_eq!(
            puzzle.process_guess("Kajol", &state, &catalog).rejection(),
            Some(RejectReason::GameCompleted)
        );
    }

    #[test]
    fn test_duplicate_and_empty_guesses_are_rejected() {
        let puzzle = puzzle();
        let catalog = GameCatalog::builtin();
        let state = guess(&puzzle, &catalog, &DualEntityGameState::default(), "Salman Khan").state;

        assert_eq!(
            puzzle.process_guess("  SALMAN khan", &state, &catalog).rejection(),
            Some(RejectReason::AlreadyGuessed)
        );
        assert_eq!(
            puzzle.process_guess("   ", &state, &catalog).rejection(),
            Some(RejectReason::Empty)
        );
        assert_eq!(state.attempts, 1);
    }

    #[test]
    fn test_loss_needs_both_entities_done() {
        let puzzle = puzzle();
        let catalog = GameCatalog::builtin();
        let mut state = DualEntityGameState::default();

        state = guess(&puzzle, &catalog, &state, "Aishwarya Rai").state;
        for name in ["Salman Khan", "Aamir Khan", "Akshay Kumar", "Hrithik Roshan"] {
            state = guess(&puzzle, &catalog, &state, name).state;
            assert!(!state.game_completed);
        }
        assert_eq!(state.entity1.hints_revealed, 3);

        let result = guess(&puzzle, &catalog, &state, "Ranbir Kapoor");
        assert_eq!(result.target, EntitySlot::Entity1);
        assert!(result.state.game_completed);
        assert!(!result.state.game_won);
        assert!(result.state.show_answers);
        assert_eq!(puzzle.score(&result.state), 0);
    }

    #[test]
    fn test_total_attempt_cap_ends_game() {
        let puzzle = puzzle();
        let catalog = GameCatalog::builtin();
        let mut state = DualEntityGameState {
            current_target: Some(EntitySlot::Entity1),
            ..Default::default()
        };

        for attempt in 1..=MAX_TOTAL_ATTEMPTS {
            let name = format!("Wrong Guess {}", attempt);
            state = guess(&puzzle, &catalog, &state, &name).state;
            assert_eq!(state.game_completed, attempt == MAX_TOTAL_ATTEMPTS);
        }
        assert_eq!(state.entity1.guesses.len(), 10);
        assert_eq!(state.entity1.hints_revealed, 3);
        assert!(state.entity2.guesses.is_empty());
    }

    #[test]
    fn test_progress_roundtrip() {
        let puzzle = puzzle();
        let catalog = GameCatalog::builtin();
        let state = guess(&puzzle, &catalog, &DualEntityGameState::default(), "Salman Khan").state;
        let progress = GameProgress {
            attempts: state.attempts,
            game_state: Some(state.to_game_state(GameType::PlotFusion)),
            ..GameProgress::new("1", 0)
        };
        assert_eq!(DualEntityGameState::from_progress(Some(&progress)), state);
        assert_eq!(
            DualEntityGameState::from_progress(None),
            DualEntityGameState::default()
        );
    }
}
