//! Core business logic layer
//!
//! Board generation, line detection, board state and input routing.
//! NO imports from frontend/ or rendering code.
//! Frontends read from `AppCore` and send it actions.

pub mod app_core;
pub mod board;
pub mod input_router;
pub mod lines;
pub mod state;

pub use app_core::{AppCore, Overlay};
pub use input_router::BoardAction;
