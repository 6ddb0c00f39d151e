use crate::game::dual_entity::{DualEntityPuzzle, PuzzleEntity};
use crate::model::{FaceMashActor, FaceMashGameData, FaceMashHintKind, GameType};
use log::trace;

/// Display position of a hint; the gender hint is never shown.
fn hint_rank(kind: FaceMashHintKind) -> Option<u8> {
    match kind {
        FaceMashHintKind::BirthYear | FaceMashHintKind::BirthDate => Some(0),
        FaceMashHintKind::FamousMovies => Some(1),
        FaceMashHintKind::Initials => Some(2),
        FaceMashHintKind::Gender => None,
    }
}

/// Hints in reveal order, at most one per display slot.
pub fn ordered_hints(actor: &FaceMashActor) -> Vec<String> {
    let mut hints = Vec::new();
    for rank in 0..=2 {
        if let Some(hint) = actor
            .hints
            .iter()
            .find(|hint| hint_rank(hint.kind) == Some(rank))
        {
            hints.push(hint.content.clone());
        }
    }
    hints
}

fn puzzle_entity(actor: &FaceMashActor) -> PuzzleEntity {
    PuzzleEntity {
        name: actor.name.clone(),
        hints: ordered_hints(actor),
        gender: actor.gender(),
    }
}

/// Two blended faces, guessed by actor name.
pub fn face_mash_puzzle(data: &FaceMashGameData) -> DualEntityPuzzle {
    trace!(target: "face_mash", "Building puzzle {}", data.id);
    DualEntityPuzzle {
        game_type: GameType::FaceMash,
        game_id: data.id.clone(),
        entity1: puzzle_entity(&data.actor1),
        entity2: puzzle_entity(&data.actor2),
    }
}
