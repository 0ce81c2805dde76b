//! Theme styling for the dashboard.
//!
//! Semantic roles plus helper builders for Ratatui widgets and styles. Prefer
//! these helpers over hard-coding colors to keep the UI consistent.

pub mod nord;
pub mod roles;
pub mod theme_helpers;

pub use nord::NordTheme;
pub use roles::Theme;
