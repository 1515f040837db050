//! Keyboard and pointer input accumulated from window events

pub mod state;

pub use state::InputState;
