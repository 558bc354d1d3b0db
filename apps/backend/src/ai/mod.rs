pub mod generator;
pub mod profiles;

pub use generator::BotMoveGenerator;
pub use profiles::{BotDifficulty, BotProfile};
