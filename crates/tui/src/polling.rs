//! Polling controller for the workflow detail view.
//!
//! The controller owns at most one [`PollingHandle`]. A handle is a spawned
//! timer task that posts [`Msg::PollTick`] into the runtime's message channel;
//! the view turns each tick into background refetches. Dropping or closing the
//! handle aborts the task, so tearing the view down always releases the timer.
//!
//! Every subscription carries a generation number. Ticks already queued in the
//! channel when a subscription is replaced or stopped carry an old generation
//! and are ignored.

use std::time::Duration;

use reana_types::{Effect, FetchOptions, Msg, Workflow};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

/// Longest period the timer accepts. Larger configured values (up to
/// `u64::MAX` seconds) would overflow the first deadline.
pub const MAX_POLLING_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Scoped timer resource: acquired by [`PollingHandle::spawn`], released by
/// [`PollingHandle::close`] or on drop.
#[derive(Debug)]
pub struct PollingHandle {
    task: JoinHandle<()>,
}

impl PollingHandle {
    /// Start a repeating timer. The first tick fires one full `interval` after
    /// the call; the caller issues the immediate fetch itself.
    pub fn spawn(workflow_id: String, generation: u64, interval: Duration, sender: mpsc::Sender<Msg>) -> Self {
        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let tick = Msg::PollTick {
                    workflow_id: workflow_id.clone(),
                    generation,
                };
                if sender.send(tick).await.is_err() {
                    break;
                }
            }
        });
        Self { task }
    }

    /// Stop the timer. Further ticks are never sent.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for PollingHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Subscription {
    workflow_id: String,
    generation: u64,
    /// Set once a terminal status was observed; the timer is not restarted for
    /// this subscription afterwards.
    settled: bool,
}

/// Refresh state machine for one mounted detail view.
#[derive(Debug, Default)]
pub struct PollingController {
    interval: Option<Duration>,
    subscription: Option<Subscription>,
    handle: Option<PollingHandle>,
    generation: u64,
}

impl PollingController {
    /// `None` disables the timer; the immediate fetch still happens on
    /// activation.
    pub fn new(interval: Option<Duration>) -> Self {
        Self {
            interval: bounded(interval),
            ..Self::default()
        }
    }

    /// Subscribe to `workflow_id`: request the immediate metadata fetch and
    /// start the timer when polling is enabled and none is running. A different
    /// identifier replaces the previous subscription and its timer.
    pub fn activate(&mut self, workflow_id: &str, sender: &mpsc::Sender<Msg>) -> Vec<Effect> {
        let same_subscription = self
            .subscription
            .as_ref()
            .is_some_and(|subscription| subscription.workflow_id == workflow_id);
        if !same_subscription {
            self.handle = None;
            self.generation += 1;
            self.subscription = Some(Subscription {
                workflow_id: workflow_id.to_string(),
                generation: self.generation,
                settled: false,
            });
        }
        self.arm(sender);

        vec![Effect::FetchWorkflow {
            workflow_id: workflow_id.to_string(),
            options: FetchOptions::default(),
        }]
    }

    /// Turn a timer tick into the lightweight metadata + logs refetch. Ticks
    /// from replaced, stopped, or foreign subscriptions produce nothing.
    pub fn on_tick(&self, workflow_id: &str, generation: u64) -> Vec<Effect> {
        let current = self.subscription.as_ref().is_some_and(|subscription| {
            subscription.workflow_id == workflow_id && subscription.generation == generation
        });
        if !current || self.handle.is_none() {
            debug!(workflow_id, generation, "ignoring stale polling tick");
            return Vec::new();
        }
        background_refetch(workflow_id)
    }

    /// One-off background refetch outside the timer schedule.
    pub fn refresh(&self) -> Vec<Effect> {
        self.subscription
            .as_ref()
            .map(|subscription| background_refetch(&subscription.workflow_id))
            .unwrap_or_default()
    }

    /// Inspect freshly loaded metadata; a terminal status stops the timer.
    pub fn observe(&mut self, workflow: &Workflow) {
        if !workflow.status.is_terminal() {
            return;
        }
        if let Some(subscription) = self.subscription.as_mut() {
            subscription.settled = true;
        }
        if let Some(handle) = self.handle.take() {
            debug!(workflow = %workflow.id, status = %workflow.status, "workflow settled; polling stopped");
            handle.close();
        }
    }

    /// Apply a new polling interval. A running timer with a different interval
    /// is restarted; `None` stops it.
    pub fn set_interval(&mut self, interval: Option<Duration>, sender: &mpsc::Sender<Msg>) {
        let interval = bounded(interval);
        if self.interval == interval {
            return;
        }
        self.interval = interval;
        if self.handle.take().is_some() {
            self.generation += 1;
            if let Some(subscription) = self.subscription.as_mut() {
                subscription.generation = self.generation;
            }
        }
        self.arm(sender);
    }

    /// Tear down: release the timer and forget the subscription.
    pub fn deactivate(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.close();
        }
        self.subscription = None;
    }

    pub fn is_polling(&self) -> bool {
        self.handle.is_some()
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    fn arm(&mut self, sender: &mpsc::Sender<Msg>) {
        if self.handle.is_some() {
            return;
        }
        let (Some(interval), Some(subscription)) = (self.interval, self.subscription.as_ref()) else {
            return;
        };
        if subscription.settled || interval.is_zero() {
            return;
        }
        debug!(workflow_id = %subscription.workflow_id, interval_secs = interval.as_secs(), "polling started");
        self.handle = Some(PollingHandle::spawn(
            subscription.workflow_id.clone(),
            subscription.generation,
            interval,
            sender.clone(),
        ));
    }
}

fn bounded(interval: Option<Duration>) -> Option<Duration> {
    interval.map(|interval| interval.min(MAX_POLLING_INTERVAL))
}

fn background_refetch(workflow_id: &str) -> Vec<Effect> {
    vec![
        Effect::FetchWorkflow {
            workflow_id: workflow_id.to_string(),
            options: FetchOptions::background(),
        },
        Effect::FetchWorkflowLogs {
            workflow_id: workflow_id.to_string(),
            options: FetchOptions::background(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use reana_types::WorkflowStatus;

    fn workflow(status: WorkflowStatus) -> Workflow {
        Workflow {
            id: "wf".into(),
            status,
            ..Workflow::default()
        }
    }

    async fn next_tick(receiver: &mut mpsc::Receiver<Msg>) -> (String, u64) {
        match receiver.recv().await {
            Some(Msg::PollTick { workflow_id, generation }) => (workflow_id, generation),
            other => panic!("expected a poll tick, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn activation_fetches_immediately_and_ticks_every_interval() {
        let (sender, mut receiver) = mpsc::channel(8);
        let mut controller = PollingController::new(Some(Duration::from_secs(30)));

        let effects = controller.activate("wf", &sender);
        assert_eq!(
            effects,
            vec![Effect::FetchWorkflow {
                workflow_id: "wf".into(),
                options: FetchOptions::default(),
            }]
        );
        assert!(controller.is_polling());

        let started = Instant::now();
        let (workflow_id, generation) = next_tick(&mut receiver).await;
        assert_eq!(workflow_id, "wf");
        assert!(started.elapsed() >= Duration::from_secs(30));

        let refetch = controller.on_tick(&workflow_id, generation);
        assert_eq!(refetch, background_refetch("wf"));
        assert!(refetch.iter().all(|effect| match effect {
            Effect::FetchWorkflow { options, .. } | Effect::FetchWorkflowLogs { options, .. } =>
                !options.show_loader && options.refetch,
            _ => false,
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_status_stops_further_ticks() {
        let (sender, mut receiver) = mpsc::channel(8);
        let mut controller = PollingController::new(Some(Duration::from_secs(30)));
        controller.activate("wf", &sender);

        let (workflow_id, generation) = next_tick(&mut receiver).await;
        assert_eq!(controller.on_tick(&workflow_id, generation).len(), 2);

        controller.observe(&workflow(WorkflowStatus::Running));
        assert!(controller.is_polling());

        controller.observe(&workflow(WorkflowStatus::Finished));
        assert!(!controller.is_polling());
        assert!(controller.on_tick(&workflow_id, generation).is_empty());

        let later = time::timeout(Duration::from_secs(120), receiver.recv()).await;
        assert!(later.is_err(), "no tick may arrive after a terminal status");
    }

    #[tokio::test(start_paused = true)]
    async fn reactivation_after_terminal_status_does_not_restart_timer() {
        let (sender, _receiver) = mpsc::channel(8);
        let mut controller = PollingController::new(Some(Duration::from_secs(30)));
        controller.activate("wf", &sender);
        controller.observe(&workflow(WorkflowStatus::Failed));

        let effects = controller.activate("wf", &sender);
        assert_eq!(effects.len(), 1);
        assert!(!controller.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn deactivation_releases_the_timer() {
        let (sender, mut receiver) = mpsc::channel(8);
        let mut controller = PollingController::new(Some(Duration::from_secs(30)));
        controller.activate("wf", &sender);
        controller.deactivate();
        assert!(!controller.is_polling());
        drop(sender);

        // The aborted task dropped its sender clone, so the channel closes.
        assert!(receiver.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn new_identifier_replaces_subscription() {
        let (sender, mut receiver) = mpsc::channel(8);
        let mut controller = PollingController::new(Some(Duration::from_secs(10)));
        controller.activate("first", &sender);
        controller.activate("second", &sender);

        let (workflow_id, generation) = next_tick(&mut receiver).await;
        assert_eq!(workflow_id, "second");
        assert_eq!(controller.on_tick(&workflow_id, generation).len(), 2);
        assert!(controller.on_tick("first", generation - 1).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_interval_fetches_once_without_timer() {
        let (sender, _receiver) = mpsc::channel(8);
        let mut controller = PollingController::new(None);
        assert_eq!(controller.activate("wf", &sender).len(), 1);
        assert!(!controller.is_polling());
        assert_eq!(controller.refresh().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn huge_configured_interval_keeps_the_timer_alive() {
        let (sender, mut receiver) = mpsc::channel(8);
        let config = reana_util::DashboardConfig {
            polling_secs: Some(u64::MAX),
            ..reana_util::DashboardConfig::default()
        };
        let mut controller = PollingController::new(config.polling_interval());
        controller.activate("wf", &sender);
        assert_eq!(controller.interval(), Some(MAX_POLLING_INTERVAL));

        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        let handle = controller.handle.as_ref().expect("timer running");
        assert!(!handle.task.is_finished());
        assert!(receiver.try_recv().is_err());

        controller.set_interval(Some(Duration::from_secs(u64::MAX)), &sender);
        assert_eq!(controller.interval(), Some(MAX_POLLING_INTERVAL));
        assert!(controller.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn interval_change_restarts_timer_and_invalidates_old_ticks() {
        let (sender, mut receiver) = mpsc::channel(8);
        let mut controller = PollingController::new(None);
        controller.activate("wf", &sender);
        assert!(!controller.is_polling());

        controller.set_interval(Some(Duration::from_secs(5)), &sender);
        assert!(controller.is_polling());
        let (_, first_generation) = next_tick(&mut receiver).await;

        controller.set_interval(Some(Duration::from_secs(20)), &sender);
        assert!(controller.on_tick("wf", first_generation).is_empty());
        let (_, second_generation) = next_tick(&mut receiver).await;
        assert_eq!(controller.on_tick("wf", second_generation).len(), 2);
        assert_eq!(controller.interval(), Some(Duration::from_secs(20)));
    }
}
