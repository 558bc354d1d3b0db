pub mod bridge;

pub use bridge::{EngineError, EngineHandle, MoveSearch};
