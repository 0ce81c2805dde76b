mod actions_popup_component;
mod menu;

pub use actions_popup_component::{ActionsPopup, Propagation};
pub use menu::{MenuItem, SessionCapabilities, build_menu, session_opened_message};
