//! UI components: workflow details, the actions popup, dialogs and toasts.

pub mod actions_popup;
pub mod common;
pub mod component;
pub mod notifications;
pub mod workflow_details;

pub use component::*;
