use std::fmt::Debug;

use ratatui::style::{Color, Modifier, Style};
use reana_types::{Severity, WorkflowStatus};

/// Semantic color roles used throughout the UI.
#[derive(Debug, Clone)]
pub struct ThemeRoles {
    pub background: Color,
    pub surface: Color,
    pub surface_muted: Color,
    pub border: Color,
    pub divider: Color,

    pub text: Color,
    pub text_secondary: Color,
    pub text_muted: Color,

    pub accent_primary: Color,
    pub accent_secondary: Color,

    pub info: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,

    pub selection_bg: Color,
    pub selection_fg: Color,
    pub focus: Color,

    /// Background color used when displaying modal overlays.
    ///
    /// Darker than the primary background so the active dialog reads as
    /// elevated while staying inside the palette.
    pub modal_bg: Color,
}

/// Theme trait exposes semantic roles and common style builders.
pub trait Theme: Send + Sync + Debug {
    fn roles(&self) -> &ThemeRoles;

    // Text styles
    fn text_primary_style(&self) -> Style {
        Style::default().fg(self.roles().text)
    }
    fn text_secondary_style(&self) -> Style {
        Style::default().fg(self.roles().text_secondary)
    }
    fn text_muted_style(&self) -> Style {
        Style::default().fg(self.roles().text_muted)
    }

    // Borders and focus
    fn border_style(&self, focused: bool) -> Style {
        let color = if focused { self.roles().focus } else { self.roles().border };
        Style::default().fg(color)
    }

    // Selection
    fn selection_style(&self) -> Style {
        Style::default().fg(self.roles().selection_fg).bg(self.roles().selection_bg)
    }

    fn modal_background_style(&self) -> Style {
        Style::default().bg(self.roles().modal_bg)
    }

    // Status styles
    fn status_info(&self) -> Style {
        Style::default().fg(self.roles().info)
    }
    fn status_success(&self) -> Style {
        Style::default().fg(self.roles().success)
    }
    fn status_warning(&self) -> Style {
        Style::default().fg(self.roles().warning)
    }
    fn status_error(&self) -> Style {
        Style::default().fg(self.roles().error)
    }

    fn severity_style(&self, severity: Severity) -> Style {
        match severity {
            Severity::Info => self.status_info(),
            Severity::Success => self.status_success(),
            Severity::Warning => self.status_warning(),
            Severity::Error => self.status_error(),
        }
    }

    /// Color of a workflow status label.
    fn workflow_status_style(&self, status: WorkflowStatus) -> Style {
        let style = match status {
            WorkflowStatus::Finished => self.status_success(),
            WorkflowStatus::Failed => self.status_error(),
            WorkflowStatus::Running => self.status_info(),
            WorkflowStatus::Queued | WorkflowStatus::Pending => self.status_warning(),
            WorkflowStatus::Stopped | WorkflowStatus::Deleted | WorkflowStatus::Unknown => self.text_muted_style(),
            WorkflowStatus::Created => self.text_secondary_style(),
        };
        style.add_modifier(Modifier::BOLD)
    }

    // Accents
    fn accent_primary_style(&self) -> Style {
        Style::default().fg(self.roles().accent_primary)
    }
    fn accent_emphasis_style(&self) -> Style {
        Style::default().fg(self.roles().accent_primary).add_modifier(Modifier::BOLD)
    }
}
