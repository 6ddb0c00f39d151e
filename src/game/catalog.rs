use crate::model::{
    Actor, ConnectionsGameData, FaceMashGameData, GameDefinition, GameType, GlimpsedGameData,
    Movie, MovieHint, PlotFusionGameData,
};
use chrono::NaiveDate;
use log::error;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.json");

/// Resolves actors and movies referenced by puzzles.
pub trait EntityLookup {
    /// Person whose name matches `name` exactly, ignoring case and surrounding whitespace.
    fn person_by_name(&self, name: &str) -> Option<&Actor>;

    fn movie_by_id(&self, movie_id: &str) -> Option<&Movie>;

    fn movie_hints(&self, movie_id: &str) -> &[MovieHint] {
        self.movie_by_id(movie_id)
            .map(|movie| movie.hints.as_slice())
            .unwrap_or_default()
    }
}

/// Read-only puzzle content for every game type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameCatalog {
    #[serde(default)]
    pub connections: Vec<ConnectionsGameData>,
    #[serde(default)]
    pub face_mash: Vec<FaceMashGameData>,
    #[serde(default)]
    pub plot_fusion: Vec<PlotFusionGameData>,
    #[serde(default)]
    pub glimpsed: Vec<GlimpsedGameData>,
    #[serde(default)]
    pub actors: Vec<Actor>,
    #[serde(default)]
    pub movies: Vec<Movie>,
}

impl GameCatalog {
    pub fn builtin() -> Self {
        serde_json::from_str(BUILTIN_CATALOG).unwrap_or_else(|err| {
            error!(target: "catalog", "Built-in catalog is malformed: {}", err);
            GameCatalog::default()
        })
    }

    pub fn load(path: &Path) -> std::io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn all_games(&self, game_type: GameType) -> Vec<GameDefinition<'_>> {
        match game_type {
            GameType::Connections => self
                .connections
                .iter()
                .map(GameDefinition::Connections)
                .collect(),
            GameType::FaceMash => self.face_mash.iter().map(GameDefinition::FaceMash).collect(),
            GameType::PlotFusion => self
                .plot_fusion
                .iter()
                .map(GameDefinition::PlotFusion)
                .collect(),
            GameType::Glimpsed => self.glimpsed.iter().map(GameDefinition::Glimpsed).collect(),
        }
    }

    /// The puzzle dated `today`, falling back to the first puzzle of the type.
    pub fn todays_game(&self, game_type: GameType, today: NaiveDate) -> Option<GameDefinition<'_>> {
        let today = today.format("%Y-%m-%d").to_string();
        let games = self.all_games(game_type);
        games
            .iter()
            .find(|game| game.date() == today)
            .or_else(|| games.first())
            .copied()
    }

    pub fn game_by_id(&self, game_id: &str) -> Option<GameDefinition<'_>> {
        GameType::all()
            .into_iter()
            .flat_map(|game_type| self.all_games(game_type))
            .find(|game| game.id() == game_id)
    }
}

impl EntityLookup for GameCatalog {
    fn person_by_name(&self, name: &str) -> Option<&Actor> {
        let name = name.trim().to_lowercase();
        self.actors
            .iter()
            .find(|actor| actor.name.to_lowercase() == name)
    }

    fn movie_by_id(&self, movie_id: &str) -> Option<&Movie> {
        self.movies.iter().find(|movie| movie.id == movie_id)
    }
}
