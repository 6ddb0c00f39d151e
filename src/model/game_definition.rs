use crate::model::{Gender, GameType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GroupDifficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionsGroup {
    pub id: String,
    pub category: String,
    pub items: Vec<String>,
    pub difficulty: GroupDifficulty,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionsGameData {
    pub id: String,
    pub title: String,
    pub date: String,
    pub groups: Vec<ConnectionsGroup>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FaceMashHintKind {
    Gender,
    BirthDate,
    BirthYear,
    FamousMovies,
    Initials,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FaceMashHint {
    #[serde(rename = "type")]
    pub kind: FaceMashHintKind,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FaceMashActor {
    pub name: String,
    #[serde(default)]
    pub image: String,
    pub hints: Vec<FaceMashHint>,
}

impl FaceMashActor {
    /// Gender taken from the (undisplayed) gender hint.
    pub fn gender(&self) -> Option<Gender> {
        self.hints
            .iter()
            .find(|hint| hint.kind == FaceMashHintKind::Gender)
            .and_then(|hint| Gender::parse(&hint.content))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FaceMashGameData {
    pub id: String,
    pub title: String,
    pub date: String,
    pub actor1: FaceMashActor,
    pub actor2: FaceMashActor,
    #[serde(default)]
    pub mashed_image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MovieRef {
    pub movie_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlotFusionMovies {
    pub movie1: MovieRef,
    pub movie2: MovieRef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlotFusionGameData {
    pub id: String,
    pub title: String,
    pub date: String,
    pub fused_plot: String,
    pub movies: PlotFusionMovies,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GlimpsedGameData {
    pub id: String,
    pub title: String,
    pub date: String,
    pub movie_id: String,
    pub movie_name: String,
    pub total_frames: u32,
}

/// Borrowed view of one day's puzzle, whatever its game type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameDefinition<'a> {
    Connections(&'a ConnectionsGameData),
    FaceMash(&'a FaceMashGameData),
    PlotFusion(&'a PlotFusionGameData),
    Glimpsed(&'a GlimpsedGameData),
}

impl<'a> GameDefinition<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            GameDefinition::Connections(data) => &data.id,
            GameDefinition::FaceMash(data) => &data.id,
            GameDefinition::PlotFusion(data) => &data.id,
            GameDefinition::Glimpsed(data) => &data.id,
        }
    }

    pub fn title(&self) -> &'a str {
        match self {
            GameDefinition::Connections(data) => &data.title,
            GameDefinition::FaceMash(data) => &data.title,
            GameDefinition::PlotFusion(data) => &data.title,
            GameDefinition::Glimpsed(data) => &data.title,
        }
    }

    pub fn date(&self) -> &'a str {
        match self {
            GameDefinition::Connections(data) => &data.date,
            GameDefinition::FaceMash(data) => &data.date,
            GameDefinition::PlotFusion(data) => &data.date,
            GameDefinition::Glimpsed(data) => &data.date,
        }
    }

    pub fn game_type(&self) -> GameType {
        match self {
            GameDefinition::Connections(_) => GameType::Connections,
            GameDefinition::FaceMash(_) => GameType::FaceMash,
            GameDefinition::PlotFusion(_) => GameType::PlotFusion,
            GameDefinition::Glimpsed(_) => GameType::Glimpsed,
        }
    }
}
