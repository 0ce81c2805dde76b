//! Vertical scrolling for the detail panes.
//!
//! Keys move the offset immediately; content and viewport heights are only
//! known while rendering, so the render pass reports them and the offset is
//! clamped then.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Scrollbar, ScrollbarOrientation, ScrollbarState};

use crate::ui::theme::Theme;

/// Scroll position in terminal rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollMetrics {
    offset: usize,
    content_height: usize,
    viewport_height: usize,
    /// Keep the view glued to the last row as content grows (log tailing).
    follow: bool,
}

impl ScrollMetrics {
    pub fn following() -> Self {
        Self {
            follow: true,
            ..Self::default()
        }
    }

    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub fn max_offset(&self) -> usize {
        self.content_height.saturating_sub(self.viewport_height)
    }

    pub fn is_scrollable(&self) -> bool {
        self.content_height > self.viewport_height && self.viewport_height > 0
    }

    /// Record the measured sizes from the latest render.
    pub fn measure(&mut self, content_height: usize, viewport_height: usize) {
        self.content_height = content_height;
        self.viewport_height = viewport_height;
        if self.follow {
            self.offset = self.max_offset();
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }

    /// Scroll by `delta` rows (`+` down). Scrolling up detaches from the tail;
    /// reaching the bottom again reattaches.
    pub fn scroll_lines(&mut self, delta: i32) {
        if delta == 0 || !self.is_scrollable() {
            return;
        }
        self.offset = self.offset.saturating_add_signed(delta as isize).min(self.max_offset());
        self.follow = self.offset == self.max_offset();
    }

    pub fn scroll_pages(&mut self, pages: i32) {
        let page = i32::try_from(self.viewport_height.saturating_sub(1).max(1)).unwrap_or(i32::MAX);
        self.scroll_lines(page.saturating_mul(pages));
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
        self.follow = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
        self.follow = true;
    }
}

/// Themed scrollbar on the right edge of `area`; nothing when content fits.
pub fn render_vertical_scrollbar(frame: &mut Frame, area: Rect, theme: &dyn Theme, metrics: &ScrollMetrics) {
    if !metrics.is_scrollable() {
        return;
    }
    let mut state = ScrollbarState::new(metrics.max_offset())
        .position(metrics.offset())
        .viewport_content_length(metrics.viewport_height);
    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .thumb_style(Style::default().fg(theme.roles().accent_secondary))
        .track_style(Style::default().fg(theme.roles().divider));
    frame.render_stateful_widget(scrollbar, area, &mut state);
}
