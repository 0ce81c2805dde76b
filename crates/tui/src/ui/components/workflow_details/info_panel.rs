//! Header panel summarizing one workflow.

use std::time::Duration;

use chrono::{DateTime, Utc};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use reana_types::{Workflow, WorkflowProgress};
use reana_util::{format_duration_secs, truncate_with_ellipsis};

use crate::ui::theme::Theme;
use crate::ui::theme::theme_helpers as th;
use crate::ui::utils::display_timestamp;

/// Rows occupied by the panel, borders included.
pub const INFO_PANEL_HEIGHT: u16 = 6;

/// What the panel shows about the refresh schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingSummary {
    pub interval: Option<Duration>,
    pub active: bool,
}

/// Absolute notebook address; the server reports paths relative to itself.
pub fn session_address(server_url: &str, uri: &str) -> String {
    if uri.starts_with("http://") || uri.starts_with("https://") {
        return uri.to_string();
    }
    format!("{}/{}", server_url.trim_end_matches('/'), uri.trim_start_matches('/'))
}

pub fn progress_summary(progress: &WorkflowProgress) -> String {
    let mut summary = format!("{}/{} jobs finished", progress.finished, progress.total);
    let mut extras = Vec::new();
    if progress.running > 0 {
        extras.push(format!("{} running", progress.running));
    }
    if progress.failed > 0 {
        extras.push(format!("{} failed", progress.failed));
    }
    if !extras.is_empty() {
        summary.push_str(&format!(" ({})", extras.join(", ")));
    }
    summary
}

fn polling_label(polling: PollingSummary) -> String {
    match polling.interval {
        Some(interval) if polling.active => format!("auto-refresh every {}", format_duration_secs(interval.as_secs() as i64)),
        Some(interval) if !interval.is_zero() => "auto-refresh stopped".to_string(),
        _ => "auto-refresh off".to_string(),
    }
}

fn field<'a>(theme: &dyn Theme, label: &'a str, value: String) -> [Span<'a>; 2] {
    [
        Span::styled(label, theme.text_muted_style()),
        Span::styled(value, theme.text_secondary_style()),
    ]
}

/// Draw the panel and return the row where the actions trigger belongs.
pub fn render_info_panel(
    frame: &mut Frame,
    area: Rect,
    theme: &dyn Theme,
    workflow: &Workflow,
    server_url: &str,
    polling: PollingSummary,
    now: DateTime<Utc>,
) -> Rect {
    let block = th::block(theme, None, false);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut title = vec![
        Span::styled(
            truncate_with_ellipsis(&workflow.display_name(), inner.width.saturating_sub(16) as usize),
            theme.text_primary_style().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(workflow.status.as_str(), theme.workflow_status_style(workflow.status)),
    ];
    if let Some(duration) = workflow.run_duration(now) {
        title.push(Span::styled(
            format!("  in {}", format_duration_secs(duration.num_seconds())),
            theme.text_muted_style(),
        ));
    }

    let mut timestamps = Vec::new();
    for (label, value) in [
        ("created ", workflow.created.as_deref()),
        ("started ", workflow.started.as_deref()),
        ("finished ", workflow.finished.as_deref()),
    ] {
        if let Some(value) = value {
            if !timestamps.is_empty() {
                timestamps.push(Span::raw("   "));
            }
            timestamps.extend(field(theme, label, display_timestamp(value)));
        }
    }

    let mut usage = Vec::new();
    if let Some(progress) = workflow.progress.as_ref().filter(|progress| progress.total > 0) {
        usage.extend(field(theme, "progress ", progress_summary(progress)));
        usage.push(Span::raw("   "));
    }
    let size = if workflow.size.human_readable.is_empty() {
        format!("{} bytes", workflow.size.raw)
    } else {
        workflow.size.human_readable.clone()
    };
    usage.extend(field(theme, "disk ", size));
    usage.push(Span::raw("   "));
    usage.push(Span::styled(polling_label(polling), theme.text_muted_style()));

    let session = match workflow.session_uri.as_deref() {
        Some(uri) if workflow.has_open_session() => vec![
            Span::styled("notebook ", theme.text_muted_style()),
            Span::styled(
                session_address(server_url, uri),
                theme.accent_primary_style().add_modifier(Modifier::UNDERLINED),
            ),
        ],
        _ => Vec::new(),
    };

    let lines = vec![Line::from(title), Line::from(timestamps), Line::from(usage), Line::from(session)];
    frame.render_widget(Paragraph::new(lines), inner);

    Rect::new(inner.x, inner.y, inner.width, 1.min(inner.height))
}
