pub mod destroyable;
pub mod game;
pub mod model;
