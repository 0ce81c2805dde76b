mod confirmation_modal;

pub mod scroll;

pub use confirmation_modal::{ConfirmationButton, ConfirmationModal, ConfirmationModalState};
pub use scroll::{ScrollMetrics, render_vertical_scrollbar};
