//! Terminal input and rendering.
//!
//! - **events**: `EventSource` and the crossterm-backed `TerminalEvents`
//! - **keymapper**: input events to logical `EditCommand`s
//! - **renderer**: `LineRenderer`, prompt + buffer redraw on one row

pub mod events;
pub mod keymapper;
pub mod renderer;

pub use events::{EventSource, InputEvent, TerminalEvents};
pub use keymapper::{EditCommand, KeyMapper, Modifiers};
pub use renderer::LineRenderer;
