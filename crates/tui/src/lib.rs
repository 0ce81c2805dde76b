//! # REANA Dashboard TUI Library
//!
//! Terminal dashboard for a single REANA workflow. It shows the workflow's
//! status, logs, workspace and specification, keeps them fresh by polling the
//! server while the workflow is active, and offers the workflow's actions
//! (interactive sessions, stop, delete, share) from a popup menu.
//!
//! ## Architecture
//!
//! State lives in [`app::App`] and its workflow store. Input and gateway
//! responses become `Msg`s, updates return `Effect`s, and the command layer
//! turns effects into spawned gateway calls whose results come back as
//! messages. Views are components that render from a shared borrow of the app.

mod app;
mod cmd;
mod polling;
mod store;
#[cfg(test)]
mod test_support;
mod ui;

use std::sync::Arc;

use anyhow::Result;
use reana_api::WorkflowGateway;
use reana_util::DashboardConfig;

/// Runs the dashboard for `workflow_id` (a UUID or a `name.run` reference)
/// until the user quits.
///
/// # Errors
///
/// Terminal setup failures (raw mode, alternate screen) and drawing errors.
pub async fn run(config: DashboardConfig, gateway: Arc<dyn WorkflowGateway>, workflow_id: String) -> Result<()> {
    ui::runtime::run_app(config, gateway, workflow_id).await
}
