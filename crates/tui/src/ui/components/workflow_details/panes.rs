//! Tabbed panes under the workflow info panel.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, List, ListItem, ListState, Paragraph, Row, Table, TableState};
use reana_types::{JobLog, LogBundle, WorkspaceFile};
use serde_json::Value;

use super::specification::specification_lines;
use crate::ui::components::common::{ScrollMetrics, render_vertical_scrollbar};
use crate::ui::theme::Theme;
use crate::ui::theme::theme_helpers as th;
use crate::ui::utils::display_timestamp;

const JOB_LIST_WIDTH: u16 = 28;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DetailTab {
    #[default]
    JobLogs,
    EngineLogs,
    Workspace,
    Specification,
}

impl DetailTab {
    pub const ALL: [DetailTab; 4] = [Self::JobLogs, Self::EngineLogs, Self::Workspace, Self::Specification];

    pub fn title(self) -> &'static str {
        match self {
            Self::JobLogs => "Job logs",
            Self::EngineLogs => "Engine logs",
            Self::Workspace => "Workspace",
            Self::Specification => "Specification",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::JobLogs => 0,
            Self::EngineLogs => 1,
            Self::Workspace => 2,
            Self::Specification => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Selection and scroll positions of every pane. Survives tab switches so
/// coming back to a tab restores where the user was.
#[derive(Debug, Clone)]
pub struct PanesState {
    pub selected_job: usize,
    scroll: [ScrollMetrics; 4],
}

impl Default for PanesState {
    fn default() -> Self {
        Self {
            selected_job: 0,
            scroll: [
                ScrollMetrics::following(),
                ScrollMetrics::following(),
                ScrollMetrics::default(),
                ScrollMetrics::default(),
            ],
        }
    }
}

impl PanesState {
    pub fn scroll(&self, tab: DetailTab) -> &ScrollMetrics {
        &self.scroll[tab.index()]
    }

    pub fn scroll_mut(&mut self, tab: DetailTab) -> &mut ScrollMetrics {
        &mut self.scroll[tab.index()]
    }

    /// Select another job and show its log from the end.
    pub fn select_job(&mut self, index: usize) {
        if index != self.selected_job {
            self.selected_job = index;
            self.scroll[DetailTab::JobLogs.index()] = ScrollMetrics::following();
        }
    }

    pub fn select_next_job(&mut self, job_count: usize) {
        if job_count > 0 {
            self.select_job((self.selected_job + 1).min(job_count - 1));
        }
    }

    pub fn select_prev_job(&mut self) {
        self.select_job(self.selected_job.saturating_sub(1));
    }
}

fn placeholder(frame: &mut Frame, area: Rect, theme: &dyn Theme, text: &str) {
    frame.render_widget(
        Paragraph::new(Span::styled(text.to_string(), theme.text_muted_style())).centered(),
        area,
    );
}

/// Lines of `lines` that fit a viewport of `height` rows at the current
/// offset. Logs can be far longer than a `u16` paragraph scroll reaches.
fn visible_window<'a>(lines: Vec<Line<'a>>, height: u16, metrics: &mut ScrollMetrics) -> Vec<Line<'a>> {
    metrics.measure(lines.len(), usize::from(height));
    lines
        .into_iter()
        .skip(metrics.offset())
        .take(usize::from(height))
        .collect()
}

/// Render `lines` with the tab's scroll offset and a scrollbar.
fn render_scrolled(frame: &mut Frame, area: Rect, theme: &dyn Theme, lines: Vec<Line<'_>>, metrics: &mut ScrollMetrics) {
    let window = visible_window(lines, area.height, metrics);
    frame.render_widget(Paragraph::new(window), area);
    render_vertical_scrollbar(frame, area, theme, metrics);
}

fn log_lines<'a>(text: &'a str, theme: &dyn Theme) -> Vec<Line<'a>> {
    text.lines()
        .map(|line| Line::from(Span::styled(line, theme.text_primary_style())))
        .collect()
}

/// Style for the free-form job status strings reported in job logs.
fn job_status_style(theme: &dyn Theme, status: &str) -> Style {
    match status {
        "finished" => theme.status_success(),
        "failed" => theme.status_error(),
        "running" => theme.status_info(),
        "queued" | "pending" | "created" => theme.status_warning(),
        _ => theme.text_muted_style(),
    }
}

pub fn render_job_logs(
    frame: &mut Frame,
    area: Rect,
    theme: &dyn Theme,
    logs: Option<&LogBundle>,
    state: &mut PanesState,
) {
    let Some(logs) = logs else {
        placeholder(frame, area, theme, "Loading logs...");
        return;
    };
    if logs.job_logs.is_empty() {
        placeholder(frame, area, theme, "No jobs have been scheduled yet.");
        return;
    }
    state.selected_job = state.selected_job.min(logs.job_logs.len() - 1);

    let [list_area, log_area] =
        Layout::horizontal([Constraint::Length(JOB_LIST_WIDTH.min(area.width / 2)), Constraint::Min(1)]).areas(area);

    let items: Vec<ListItem> = logs
        .job_logs
        .values()
        .map(|job| {
            let status = job.status.as_deref().unwrap_or("unknown");
            ListItem::new(Line::from(vec![
                Span::styled("● ", job_status_style(theme, status)),
                Span::styled(job.job_name.clone(), theme.text_primary_style()),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(th::block(theme, Some("Jobs"), false))
        .highlight_style(th::table_selected_style(theme));
    let mut list_state = ListState::default().with_selected(Some(state.selected_job));
    frame.render_stateful_widget(list, list_area, &mut list_state);

    let Some((_, job)) = logs.job_logs.get_index(state.selected_job) else {
        return;
    };
    let block = th::block(theme, Some(job.job_name.as_str()), true);
    let inner = block.inner(log_area);
    frame.render_widget(block, log_area);

    let [meta_area, body_area] = Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).areas(inner);
    frame.render_widget(Paragraph::new(job_meta_line(job, theme)), meta_area);
    if job.logs.is_empty() {
        placeholder(frame, body_area, theme, "This job has not produced any output yet.");
        return;
    }
    render_scrolled(
        frame,
        body_area,
        theme,
        log_lines(&job.logs, theme),
        state.scroll_mut(DetailTab::JobLogs),
    );
}

fn job_meta_line(job: &JobLog, theme: &dyn Theme) -> Line<'static> {
    let mut spans = Vec::new();
    let mut push = |label: &str, value: String| {
        if !spans.is_empty() {
            spans.push(Span::styled("  ", theme.text_muted_style()));
        }
        spans.push(Span::styled(format!("{label} "), theme.text_muted_style()));
        spans.push(Span::styled(value, theme.text_secondary_style()));
    };
    if let Some(status) = job.status.as_deref() {
        push("status", status.to_string());
    }
    if let Some(backend) = job.compute_backend.as_deref() {
        push("backend", backend.to_string());
    }
    if let Some(started) = job.started_at.as_deref() {
        push("started", display_timestamp(started));
    }
    if let Some(finished) = job.finished_at.as_deref() {
        push("finished", display_timestamp(finished));
    }
    Line::from(spans)
}

pub fn render_engine_logs(
    frame: &mut Frame,
    area: Rect,
    theme: &dyn Theme,
    logs: Option<&LogBundle>,
    state: &mut PanesState,
) {
    match logs {
        None => placeholder(frame, area, theme, "Loading logs..."),
        Some(logs) if logs.engine_logs.trim().is_empty() => {
            placeholder(frame, area, theme, "The workflow engine has not logged anything yet.")
        }
        Some(logs) => render_scrolled(
            frame,
            area,
            theme,
            log_lines(&logs.engine_logs, theme),
            state.scroll_mut(DetailTab::EngineLogs),
        ),
    }
}

pub fn render_workspace(
    frame: &mut Frame,
    area: Rect,
    theme: &dyn Theme,
    files: Option<&[WorkspaceFile]>,
    state: &mut PanesState,
) {
    let Some(files) = files else {
        placeholder(frame, area, theme, "Loading workspace...");
        return;
    };
    if files.is_empty() {
        placeholder(frame, area, theme, "The workspace is empty.");
        return;
    }

    let metrics = state.scroll_mut(DetailTab::Workspace);
    metrics.measure(files.len(), usize::from(area.height.saturating_sub(1)));

    let header = Row::new(["Name", "Size", "Modified"].map(|title| Cell::from(title).style(th::table_header_style(theme))));
    let rows = files.iter().map(|file| {
        Row::new([
            Cell::from(file.name.clone()).style(theme.text_primary_style()),
            Cell::from(file.size.human_readable.clone()).style(theme.text_secondary_style()),
            Cell::from(file.last_modified.as_deref().map(display_timestamp).unwrap_or_default())
                .style(theme.text_muted_style()),
        ])
    });
    let table = Table::new(
        rows,
        [Constraint::Fill(1), Constraint::Length(12), Constraint::Length(19)],
    )
    .header(header)
    .column_spacing(2);
    let mut table_state = TableState::default().with_offset(metrics.offset());
    frame.render_stateful_widget(table, area, &mut table_state);
    render_vertical_scrollbar(frame, area, theme, metrics);
}

pub fn render_specification(
    frame: &mut Frame,
    area: Rect,
    theme: &dyn Theme,
    specification: Option<&Value>,
    state: &mut PanesState,
) {
    let Some(specification) = specification else {
        placeholder(frame, area, theme, "Loading specification...");
        return;
    };
    let lines = specification_lines(specification, theme);
    render_scrolled(frame, area, theme, lines, state.scroll_mut(DetailTab::Specification));
}

/// Tab bar titles with the active tab emphasized; returns the clickable
/// area of each title.
pub fn render_tab_bar(frame: &mut Frame, area: Rect, theme: &dyn Theme, active: DetailTab) -> Vec<Rect> {
    let titles: Vec<Span> = DetailTab::ALL
        .iter()
        .enumerate()
        .map(|(index, tab)| Span::raw(format!("{} {}", index + 1, tab.title())))
        .collect();

    // Tabs renders " title " separated by "│".
    let mut x = area.x;
    let mut areas = Vec::with_capacity(titles.len());
    for title in &titles {
        let width = title.width() as u16 + 2;
        areas.push(Rect::new(x, area.y, width.min((area.x + area.width).saturating_sub(x)), 1));
        x = x.saturating_add(width + 1);
    }

    frame.render_widget(th::tabs(theme, titles, active.index()), area);
    areas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabs_cycle_in_both_directions() {
        assert_eq!(DetailTab::JobLogs.next(), DetailTab::EngineLogs);
        assert_eq!(DetailTab::Specification.next(), DetailTab::JobLogs);
        assert_eq!(DetailTab::JobLogs.prev(), DetailTab::Specification);
        assert_eq!(DetailTab::from_index(2), Some(DetailTab::Workspace));
        assert_eq!(DetailTab::from_index(4), None);
    }

    #[test]
    fn changing_job_resets_its_scroll_to_the_tail() {
        let mut state = PanesState::default();
        state.scroll_mut(DetailTab::JobLogs).measure(100, 10);
        state.scroll_mut(DetailTab::JobLogs).scroll_to_top();
        assert_eq!(state.scroll(DetailTab::JobLogs).offset(), 0);

        state.select_next_job(3);
        assert_eq!(state.selected_job, 1);
        state.scroll_mut(DetailTab::JobLogs).measure(100, 10);
        assert_eq!(state.scroll(DetailTab::JobLogs).offset(), 90);

        state.select_next_job(2);
        state.select_next_job(2);
        assert_eq!(state.selected_job, 1);
        state.select_prev_job();
        state.select_prev_job();
        assert_eq!(state.selected_job, 0);
    }

    #[test]
    fn following_window_shows_the_tail_of_huge_logs() {
        let text: String = (0..70_000).map(|row| format!("line {row}\n")).collect();
        let theme = crate::ui::theme::NordTheme::new();
        let mut metrics = ScrollMetrics::following();

        let window = visible_window(log_lines(&text, &theme), 5, &mut metrics);
        assert_eq!(window.len(), 5);
        assert_eq!(window[4].to_string(), "line 69999");
        assert_eq!(metrics.offset(), 69_995);

        metrics.scroll_to_top();
        let window = visible_window(log_lines(&text, &theme), 5, &mut metrics);
        assert_eq!(window[0].to_string(), "line 0");
    }

    #[test]
    fn job_status_colors_follow_workflow_palette() {
        let theme = crate::ui::theme::NordTheme::new();
        assert_eq!(job_status_style(&theme, "failed"), theme.status_error());
        assert_eq!(job_status_style(&theme, "finished"), theme.status_success());
        assert_eq!(job_status_style(&theme, "mystery"), theme.text_muted_style());
    }
}
