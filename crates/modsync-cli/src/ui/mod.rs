//! Terminal rendering.

pub mod progress;
pub mod theme;

pub use progress::EventRenderer;
pub use theme::Theme;
