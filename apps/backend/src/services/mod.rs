pub mod games;
pub mod matchmaking;
