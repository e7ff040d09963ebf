//! Centralized error types for the runtime.
//!
//! None of these ever reach the player. The frame loop logs them and carries on;
//! see [`crate::game::Game::tick`].

use crate::room::RoomId;

/// Main error type for the runtime.
///
/// This is the primary error type that should be used in public APIs.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("Room error: {0}")]
    Room(#[from] RoomError),

    #[error("Texture error: {0}")]
    Texture(#[from] TextureError),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Errors raised by the fixed-capacity queue.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    #[error("Queue overflow (capacity {capacity})")]
    Overflow { capacity: usize },

    #[error("The queue is empty")]
    Underflow,
}

/// Errors related to room tables.
#[derive(thiserror::Error, Debug)]
pub enum RoomError {
    #[error("Room not found: {0}")]
    UnknownRoom(RoomId),

    #[error("Room table parsing failed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid room table: {0}")]
    InvalidConfig(String),

    #[error("Room table is full ({0} rooms)")]
    TableFull(usize),
}

/// Errors related to pixel buffer operations.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TextureError {
    #[error("Image of {width}x{height} is too large to fill")]
    ImageTooLarge { width: usize, height: usize },

    #[error("Pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Pixel ({x}, {y}) lies outside the image")]
    OutOfBounds { x: usize, y: usize },

    #[error("Fill aborted: {0}")]
    Queue(#[from] QueueError),
}

/// Result type for runtime operations.
pub type GameResult<T> = Result<T, GameError>;
