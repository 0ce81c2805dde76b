//! Component system for the REANA dashboard.
//!
//! Components are self-contained UI elements that own their local state,
//! react to input and application messages, and render themselves into a
//! provided `Rect`. Anything that touches the outside world is reported back as
//! an [`Effect`] instead of being performed in place.

use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Span;
use reana_types::{Effect, Msg};

use crate::app::App;

/// A UI component with its own state and behavior.
///
/// Lifecycle:
///
/// 1. `on_route_enter` when the component becomes the visible view
/// 2. `handle_message`, `handle_key_events` and `handle_mouse_events` while mounted
/// 3. `render` once per frame, with a shared borrow of the app
/// 4. `on_route_exit` when the view is torn down; owned resources are released here
pub(crate) trait Component {
    /// React to an application message after [`App::update`] has folded it
    /// into shared state.
    fn handle_message(&mut self, _app: &mut App, _msg: &Msg) -> Vec<Effect> {
        Vec::new()
    }

    /// Handle key events while this component has focus.
    fn handle_key_events(&mut self, _app: &mut App, _key: KeyEvent) -> Vec<Effect> {
        Vec::new()
    }

    /// Handle mouse events while this component has focus.
    fn handle_mouse_events(&mut self, _app: &mut App, _mouse: MouseEvent) -> Vec<Effect> {
        Vec::new()
    }

    /// Called when the component becomes the active route.
    fn on_route_enter(&mut self, _app: &mut App) -> Vec<Effect> {
        Vec::new()
    }

    /// Called when the component stops being the active route.
    fn on_route_exit(&mut self, _app: &mut App) -> Vec<Effect> {
        Vec::new()
    }

    /// Key hints shown in the footer while this component has focus.
    fn get_hint_spans(&self, _app: &App) -> Vec<Span<'static>> {
        Vec::new()
    }

    /// Split `area` into the regions this component draws into.
    fn get_preferred_layout(&self, _app: &App, area: Rect) -> Vec<Rect> {
        vec![area]
    }

    /// Render the component into the given area. Rendering never mutates
    /// application state; layout caches used for hit testing live on `self`.
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &App);
}
