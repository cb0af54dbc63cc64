//! Input: key mapping, pointer presses and the terminal event source.

pub mod handler;
pub mod keys;
pub mod pointer;

pub use handler::InputHandler;
