use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, List, ListItem, ListState, Paragraph};
use reana_types::Effect;

use super::menu::{MenuItem, MenuKey};
use crate::ui::theme::Theme;
use crate::ui::theme::theme_helpers as th;

/// Whether an input event was consumed by the popup.
///
/// `Stop` carries the effects of the activated item (possibly none) and keeps
/// the event away from the surrounding view; `Continue` hands it on.
#[derive(Debug, PartialEq, Eq)]
pub enum Propagation {
    Stop(Vec<Effect>),
    Continue,
}

/// Popup listing the actions of one workflow, anchored below a `⋮` trigger.
#[derive(Debug, Default)]
pub struct ActionsPopup {
    open: bool,
    /// Tracked by key so a menu rebuilt between events keeps pointing at the
    /// same action.
    selected: Option<MenuKey>,
    trigger_area: Rect,
    item_areas: Vec<Rect>,
    /// Keys of the rows last drawn, parallel to `item_areas`.
    item_keys: Vec<MenuKey>,
    menu_area: Rect,
}

impl ActionsPopup {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Open the popup. An empty menu has no popup.
    pub fn open(&mut self, items: &[MenuItem]) -> bool {
        if items.is_empty() {
            return false;
        }
        self.open = true;
        self.selected = items.first().map(|item| item.key);
        true
    }

    pub fn close(&mut self) {
        self.open = false;
        self.item_areas.clear();
        self.item_keys.clear();
        self.menu_area = Rect::default();
    }

    pub fn handle_key_events(&mut self, key: KeyEvent, items: Vec<MenuItem>) -> Propagation {
        if !self.open {
            return match key.code {
                KeyCode::Char('a') | KeyCode::Char('.') if self.open(&items) => Propagation::Stop(Vec::new()),
                _ => Propagation::Continue,
            };
        }
        if items.is_empty() {
            self.close();
            return Propagation::Stop(Vec::new());
        }

        let Some(index) = self.selected_index(&items) else {
            // The selected action is gone from the rebuilt menu.
            self.selected = items.first().map(|item| item.key);
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('a') | KeyCode::Char('.') | KeyCode::Char('q')) {
                self.close();
            }
            return Propagation::Stop(Vec::new());
        };

        match key.code {
            KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => {
                let previous = index.checked_sub(1).unwrap_or(items.len() - 1);
                self.selected = Some(items[previous].key);
            }
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => {
                self.selected = Some(items[(index + 1) % items.len()].key);
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let selected = items[index].key;
                return self.activate(items, selected);
            }
            KeyCode::Esc | KeyCode::Char('a') | KeyCode::Char('.') | KeyCode::Char('q') => self.close(),
            _ => {}
        }
        Propagation::Stop(Vec::new())
    }

    pub fn handle_mouse_events(&mut self, mouse: MouseEvent, items: Vec<MenuItem>) -> Propagation {
        let position = Position::new(mouse.column, mouse.row);
        if !self.open {
            if mouse.kind == MouseEventKind::Down(MouseButton::Left)
                && self.trigger_area.contains(position)
                && self.open(&items)
            {
                return Propagation::Stop(Vec::new());
            }
            return Propagation::Continue;
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(key) = self.key_at(position) {
                    return self.activate(items, key);
                }
                // Clicks on the frame keep the menu open.
                if !self.menu_area.contains(position) {
                    self.close();
                }
            }
            MouseEventKind::Moved => {
                if let Some(key) = self.key_at(position) {
                    self.selected = Some(key);
                }
            }
            _ => {}
        }
        Propagation::Stop(Vec::new())
    }

    fn selected_index(&self, items: &[MenuItem]) -> Option<usize> {
        let selected = self.selected?;
        items.iter().position(|item| item.key == selected)
    }

    fn key_at(&self, position: Position) -> Option<MenuKey> {
        let row = self.item_areas.iter().position(|area| area.contains(position))?;
        self.item_keys.get(row).copied()
    }

    /// Run the item with `key`. A key missing from `items` activates nothing.
    fn activate(&mut self, items: Vec<MenuItem>, key: MenuKey) -> Propagation {
        let effects = items
            .into_iter()
            .find(|item| item.key == key)
            .map(|item| item.action.into_effects())
            .unwrap_or_default();
        self.close();
        Propagation::Stop(effects)
    }

    /// Draw the `⋮` trigger; nothing is drawn (or clickable) for an empty menu.
    pub fn render_trigger(&mut self, frame: &mut Frame, area: Rect, has_items: bool, theme: &dyn Theme) {
        if !has_items || area.width == 0 {
            self.trigger_area = Rect::default();
            return;
        }
        let trigger = Rect::new(area.x + area.width.saturating_sub(3), area.y, 3.min(area.width), 1);
        let style = if self.open {
            theme.accent_emphasis_style()
        } else {
            theme.text_secondary_style()
        };
        frame.render_widget(Paragraph::new(Span::styled(" ⋮ ", style)), trigger);
        self.trigger_area = trigger;
    }

    /// Draw the open menu below the trigger, kept inside `bounds`.
    pub fn render_menu(&mut self, frame: &mut Frame, bounds: Rect, items: &[MenuItem], theme: &dyn Theme) {
        if !self.open || items.is_empty() {
            return;
        }
        let selected = self.selected_index(items).unwrap_or(0);
        self.selected = Some(items[selected].key);

        let label_width = items.iter().map(|item| item.label.chars().count()).max().unwrap_or(0) as u16;
        let width = (label_width + 6).min(bounds.width);
        let height = (items.len() as u16 + 2).min(bounds.height);
        let right = (self.trigger_area.x + self.trigger_area.width).min(bounds.x + bounds.width);
        let x = right.saturating_sub(width).max(bounds.x);
        let below = self.trigger_area.y + 1;
        let y = if below + height <= bounds.y + bounds.height {
            below
        } else {
            (bounds.y + bounds.height).saturating_sub(height)
        };
        let area = Rect::new(x, y, width, height);

        let block = th::block(theme, Some("Actions"), true);
        let inner = block.inner(area);
        let list_items: Vec<ListItem> = items
            .iter()
            .map(|item| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!(" {} ", item.icon), theme.accent_primary_style()),
                    Span::styled(item.label, theme.text_primary_style()),
                ]))
            })
            .collect();
        let list = List::new(list_items)
            .block(block)
            .highlight_style(th::table_selected_style(theme));
        let mut state = ListState::default().with_selected(Some(selected));

        frame.render_widget(Clear, area);
        frame.render_stateful_widget(list, area, &mut state);

        self.menu_area = area;
        self.item_areas = (0..items.len() as u16)
            .take_while(|row| *row < inner.height)
            .map(|row| Rect::new(inner.x, inner.y + row, inner.width, 1))
            .collect();
        self.item_keys = items.iter().take(self.item_areas.len()).map(|item| item.key).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::components::actions_popup::{SessionCapabilities, build_menu};
    use crossterm::event::KeyModifiers;
    use reana_types::{Modal, Workflow, WorkflowSize, WorkflowStatus};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn menu(status: WorkflowStatus) -> Vec<MenuItem> {
        let workflow = Workflow {
            id: "wf".into(),
            status,
            size: WorkflowSize {
                raw: 4096,
                human_readable: "4 KiB".into(),
            },
            ..Workflow::default()
        };
        build_menu(&workflow, &SessionCapabilities::default())
    }

    #[test]
    fn closed_popup_lets_unrelated_keys_through() {
        let mut popup = ActionsPopup::default();
        assert_eq!(
            popup.handle_key_events(key(KeyCode::Tab), menu(WorkflowStatus::Running)),
            Propagation::Continue
        );
    }

    #[test]
    fn empty_menu_never_opens() {
        let mut popup = ActionsPopup::default();
        assert_eq!(popup.handle_key_events(key(KeyCode::Char('a')), Vec::new()), Propagation::Continue);
        assert!(!popup.is_open());
    }

    #[test]
    fn activation_stops_propagation_and_closes() {
        let mut popup = ActionsPopup::default();
        let items = menu(WorkflowStatus::Running);
        assert_eq!(popup.handle_key_events(key(KeyCode::Char('a')), items.clone()), Propagation::Stop(Vec::new()));
        assert!(popup.is_open());

        // Open, Share, Stop
        popup.handle_key_events(key(KeyCode::Down), items.clone());
        popup.handle_key_events(key(KeyCode::Down), items.clone());
        let outcome = popup.handle_key_events(key(KeyCode::Enter), items);
        assert_eq!(
            outcome,
            Propagation::Stop(vec![Effect::ShowModal(Modal::StopWorkflow("wf".into()))])
        );
        assert!(!popup.is_open());
    }

    #[test]
    fn open_popup_swallows_navigation_keys() {
        let mut popup = ActionsPopup::default();
        let items = menu(WorkflowStatus::Finished);
        popup.handle_key_events(key(KeyCode::Char('.')), items.clone());
        assert_eq!(popup.handle_key_events(key(KeyCode::Char('2')), items.clone()), Propagation::Stop(Vec::new()));
        assert_eq!(popup.handle_key_events(key(KeyCode::Esc), items), Propagation::Stop(Vec::new()));
        assert!(!popup.is_open());
    }

    #[test]
    fn clicks_open_from_trigger_and_activate_items() {
        let mut popup = ActionsPopup {
            trigger_area: Rect::new(10, 0, 3, 1),
            ..ActionsPopup::default()
        };
        let items = menu(WorkflowStatus::Finished);
        assert_eq!(popup.handle_mouse_events(click(0, 0), items.clone()), Propagation::Continue);
        assert_eq!(popup.handle_mouse_events(click(11, 0), items.clone()), Propagation::Stop(Vec::new()));
        assert!(popup.is_open());

        popup.item_areas = vec![Rect::new(0, 2, 20, 1), Rect::new(0, 3, 20, 1), Rect::new(0, 4, 20, 1)];
        popup.item_keys = items.iter().map(|item| item.key).collect();
        let outcome = popup.handle_mouse_events(click(5, 3), items);
        assert_eq!(
            outcome,
            Propagation::Stop(vec![Effect::ShowModal(Modal::ShareWorkflow("wf".into()))])
        );
        assert!(!popup.is_open());
    }

    #[test]
    fn click_outside_open_menu_closes_without_effects() {
        let mut popup = ActionsPopup::default();
        let items = menu(WorkflowStatus::Finished);
        popup.open(&items);
        popup.item_areas = vec![Rect::new(0, 2, 20, 1)];
        assert_eq!(popup.handle_mouse_events(click(40, 20), items), Propagation::Stop(Vec::new()));
        assert!(!popup.is_open());
    }

    #[test]
    fn selection_follows_the_action_when_the_menu_is_rebuilt() {
        let mut popup = ActionsPopup::default();
        // Open, Share, Delete
        let finished = menu(WorkflowStatus::Finished);
        popup.handle_key_events(key(KeyCode::Char('a')), finished.clone());
        popup.handle_key_events(key(KeyCode::Up), finished);

        // A poll reports the workflow deleted: Share, Free up disk.
        let deleted = menu(WorkflowStatus::Deleted);
        assert_eq!(
            deleted.iter().map(|item| item.key).collect::<Vec<_>>(),
            vec![MenuKey::Share, MenuKey::FreeUpDisk]
        );
        assert_eq!(popup.handle_key_events(key(KeyCode::Enter), deleted.clone()), Propagation::Stop(Vec::new()));
        assert!(popup.is_open());
        assert_eq!(popup.selected, Some(MenuKey::Share));

        // A second Enter runs the action now highlighted.
        assert_eq!(
            popup.handle_key_events(key(KeyCode::Enter), deleted),
            Propagation::Stop(vec![Effect::ShowModal(Modal::ShareWorkflow("wf".into()))])
        );
    }

    #[test]
    fn selection_keeps_its_action_when_rows_shift() {
        let mut popup = ActionsPopup::default();
        // Open, Share, Stop: select Stop.
        let running = menu(WorkflowStatus::Running);
        popup.handle_key_events(key(KeyCode::Char('a')), running.clone());
        popup.handle_key_events(key(KeyCode::Up), running);

        let mut shifted = menu(WorkflowStatus::Running);
        shifted.remove(0);
        assert_eq!(
            popup.handle_key_events(key(KeyCode::Enter), shifted),
            Propagation::Stop(vec![Effect::ShowModal(Modal::StopWorkflow("wf".into()))])
        );
    }

    #[test]
    fn click_on_a_row_whose_action_vanished_does_nothing() {
        let mut popup = ActionsPopup::default();
        let finished = menu(WorkflowStatus::Finished);
        popup.open(&finished);
        popup.item_areas = vec![Rect::new(0, 2, 20, 1), Rect::new(0, 3, 20, 1), Rect::new(0, 4, 20, 1)];
        popup.item_keys = finished.iter().map(|item| item.key).collect();

        // The Delete row was drawn, but the menu no longer offers it.
        let outcome = popup.handle_mouse_events(click(5, 4), menu(WorkflowStatus::Deleted));
        assert_eq!(outcome, Propagation::Stop(Vec::new()));
    }
}
