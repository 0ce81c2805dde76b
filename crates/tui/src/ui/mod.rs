//! UI rendering for the dashboard: the runtime loop, the root view, the
//! components and the theme.

pub mod components;
pub mod main_component;
pub mod runtime;
pub mod theme;
pub mod utils;
