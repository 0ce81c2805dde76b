use reana_types::{Effect, Severity};

/// One button of a confirmation dialog and the effects it emits when pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationButton {
    pub label: String,
    pub effects: Vec<Effect>,
    /// Single-key accelerator pressing this button from anywhere in the dialog.
    pub shortcut: Option<char>,
}

impl ConfirmationButton {
    pub fn new(label: impl Into<String>, effects: Vec<Effect>) -> Self {
        Self {
            label: label.into(),
            effects,
            shortcut: None,
        }
    }

    pub fn with_shortcut(mut self, shortcut: char) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    /// A button that only dismisses the dialog.
    pub fn dismiss(label: impl Into<String>) -> Self {
        Self::new(label, vec![Effect::CloseModal])
    }
}

/// Content and focus of the dialog currently on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmationModalState {
    title: String,
    message: String,
    severity: Severity,
    buttons: Vec<ConfirmationButton>,
    focused: usize,
}

impl ConfirmationModalState {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
        buttons: Vec<ConfirmationButton>,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
            buttons,
            focused: 0,
        }
    }

    /// Move initial focus, e.g. onto the safe choice of a destructive dialog.
    pub fn with_focus(mut self, index: usize) -> Self {
        if index < self.buttons.len() {
            self.focused = index;
        }
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn buttons(&self) -> &[ConfirmationButton] {
        &self.buttons
    }

    pub fn is_button_focused(&self, index: usize) -> bool {
        self.focused == index
    }

    pub fn focus_next(&mut self) {
        if !self.buttons.is_empty() {
            self.focused = (self.focused + 1) % self.buttons.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.buttons.is_empty() {
            self.focused = self.focused.checked_sub(1).unwrap_or(self.buttons.len() - 1);
        }
    }

    /// Effects of the focused button.
    pub fn press_focused(&self) -> Vec<Effect> {
        self.press(self.focused)
    }

    /// Index of the button bound to `key`, if any.
    pub fn shortcut_index(&self, key: char) -> Option<usize> {
        self.buttons.iter().position(|button| button.shortcut == Some(key))
    }

    pub fn press(&self, index: usize) -> Vec<Effect> {
        self.buttons
            .get(index)
            .map(|button| button.effects.clone())
            .unwrap_or_default()
    }
}
