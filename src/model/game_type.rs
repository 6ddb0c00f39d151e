use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum GameType {
    Connections,
    FaceMash,
    PlotFusion,
    Glimpsed,
}

impl GameType {
    pub fn all() -> Vec<GameType> {
        vec![
            GameType::Connections,
            GameType::FaceMash,
            GameType::PlotFusion,
            GameType::Glimpsed,
        ]
    }

    /// Identifier used for storage keys and on the command line.
    pub fn slug(&self) -> &'static str {
        match self {
            GameType::Connections => "connections",
            GameType::FaceMash => "face-mash",
            GameType::PlotFusion => "plot-fusion",
            GameType::Glimpsed => "glimpsed",
        }
    }

    pub fn from_slug(slug: &str) -> Option<GameType> {
        GameType::all()
            .into_iter()
            .find(|game_type| game_type.slug() == slug.trim().to_lowercase())
    }

    pub fn title(&self) -> &'static str {
        match self {
            GameType::Connections => "Connections",
            GameType::FaceMash => "Face Mash",
            GameType::PlotFusion => "Plot Fusion",
            GameType::Glimpsed => "Glimpsed",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
