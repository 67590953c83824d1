use thiserror::Error;

/// Errors raised while setting up a game.
///
/// Running out of room for food is not an error: it ends the game with
/// [`EndReason::GridFull`](super::EndReason::GridFull).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("grid {width}x{height} is outside the playable range {min}x{min} to {max}x{max}")]
    InvalidDimensions {
        width: usize,
        height: usize,
        min: usize,
        max: usize,
    },

    #[error("initial snake length {length} does not fit on a grid {width} cells wide")]
    InvalidSnakeLength { length: usize, width: usize },

    #[error("{name} must be greater than zero")]
    InvalidInterval { name: &'static str },

    #[error("game loop already owns an engine; stop it before starting another")]
    EngineAttached,
}
