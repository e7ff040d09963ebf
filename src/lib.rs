//! Movement, collision and room-transition core of a point-and-click adventure runtime.

pub mod constants;
pub mod entity;
pub mod error;
pub mod events;
pub mod formatter;
pub mod game;
pub mod input;
pub mod queue;
pub mod room;
pub mod texture;
