//! User interface rendering and input classification.
//!
//! - **renderer**: crossterm page renderer (history, live line, tab bar,
//!   settings footer, help overlay)
//! - **keymapper**: crossterm key events to typewriter keys

pub mod keymapper;
pub mod renderer;

pub use keymapper::KeyMapper;
pub use renderer::Renderer;
