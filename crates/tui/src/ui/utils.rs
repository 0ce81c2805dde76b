//! Layout and text helpers shared by the UI components.

use ratatui::prelude::*;
use reana_types::parse_server_timestamp;

/// Frames of the loading spinner, advanced on every UI tick.
pub const THROBBER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Centered rectangle of at least `min_width` x `min_height` cells (bounded
/// by `r`) that otherwise takes `percent_x`/`percent_y` of `r`.
pub fn centered_min(percent_x: u16, percent_y: u16, min_width: u16, min_height: u16, r: Rect) -> Rect {
    let scale = |total: u16, percent: u16| (u32::from(total) * u32::from(percent) / 100) as u16;
    let width = scale(r.width, percent_x).max(min_width).min(r.width);
    let height = scale(r.height, percent_y).max(min_height).min(r.height);
    Rect::new(
        r.x + (r.width - width) / 2,
        r.y + (r.height - height) / 2,
        width,
        height,
    )
}

/// Renders a server timestamp as `YYYY-MM-DD HH:MM:SS`, or the raw text when
/// it cannot be parsed.
pub fn display_timestamp(raw: &str) -> String {
    parse_server_timestamp(raw)
        .map(|parsed| parsed.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| raw.to_string())
}
