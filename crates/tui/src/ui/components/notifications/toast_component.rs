use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph, Wrap};

use crate::app::App;
use crate::ui::theme::Theme;
use crate::ui::theme::theme_helpers as th;

const TOAST_WIDTH: u16 = 48;

/// Stack of transient notifications in the top-right corner.
#[derive(Debug, Default)]
pub struct ToastComponent;

impl ToastComponent {
    pub fn render(&self, frame: &mut Frame, area: Rect, app: &App) {
        let theme = &*app.ctx.theme;
        let width = TOAST_WIDTH.min(area.width);
        let inner_width = width.saturating_sub(2).max(1) as usize;
        let mut y = area.y + 1;

        for toast in app.notifications.visible() {
            let wrapped_rows = toast.message.chars().count().div_ceil(inner_width).max(1) as u16;
            let height = wrapped_rows + 2;
            if y + height > area.y + area.height {
                break;
            }
            let rect = Rect::new(area.x + area.width - width, y, width, height);
            let block = th::block_with_severity(theme, toast.severity, Some(toast.title.as_str()))
                .style(Style::default().bg(theme.roles().surface_muted));
            let body = Paragraph::new(Line::from(Span::styled(
                toast.message.as_str(),
                theme.text_primary_style(),
            )))
            .wrap(Wrap { trim: true })
            .block(block);

            frame.render_widget(Clear, rect);
            frame.render_widget(body, rect);
            y += height;
        }
    }
}
