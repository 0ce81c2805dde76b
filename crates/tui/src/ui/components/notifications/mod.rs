mod state;
mod toast_component;

pub use state::NotificationCenter;
pub use toast_component::ToastComponent;
