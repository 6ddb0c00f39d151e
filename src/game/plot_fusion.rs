use crate::game::catalog::EntityLookup;
use crate::game::dual_entity::{DualEntityPuzzle, PuzzleEntity};
use crate::model::{GameType, MovieRef, PlotFusionGameData};
use log::warn;

fn puzzle_entity(movie: &MovieRef, lookup: &dyn EntityLookup) -> PuzzleEntity {
    let hints: Vec<String> = lookup
        .movie_hints(&movie.movie_id)
        .iter()
        .map(|hint| hint.text.clone())
        .collect();
    if hints.is_empty() {
        warn!(target: "plot_fusion", "No hints for movie {} ({})", movie.name, movie.movie_id);
    }
    PuzzleEntity {
        name: movie.name.clone(),
        hints,
        gender: None,
    }
}

/// Two plots fused into one, guessed by movie title.
pub fn plot_fusion_puzzle(data: &PlotFusionGameData, lookup: &dyn EntityLookup) -> DualEntityPuzzle {
    DualEntityPuzzle {
        game_type: GameType::PlotFusion,
        game_id: data.id.clone(),
        entity1: puzzle_entity(&data.movies.movie1, lookup),
        entity2: puzzle_entity(&data.movies.movie2, lookup),
    }
}
