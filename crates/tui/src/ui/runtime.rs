//! Runtime: event loop and input routing for the dashboard.
//!
//! Responsibilities
//! - Own the terminal lifecycle (enter/leave alternate screen, raw mode).
//! - Drive a single event loop over terminal input, the message channel
//!   (polling ticks), finished gateway calls and a UI tick.
//! - Route input to the main view and execute returned `Effect`s.
//!
//! Input comes from a dedicated OS thread that blocks on
//! `crossterm::event::read()` and forwards events over a channel, so the loop
//! itself never blocks.

use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event, KeyCode, KeyModifiers,
    MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use ratatui::Terminal;
use ratatui::prelude::CrosstermBackend;
use reana_api::WorkflowGateway;
use reana_types::{Effect, Msg, Route};
use reana_util::DashboardConfig;
use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};

use crate::app::App;
use crate::cmd;
use crate::ui::components::Component;
use crate::ui::main_component::MainView;

type Backend = CrosstermBackend<Stdout>;

/// UI tick driving the throbber and toast expiry.
const TICK_INTERVAL: Duration = Duration::from_millis(250);
const MOUSE_MOVE_THROTTLE: Duration = Duration::from_millis(16);

/// Spawn the input thread. It exits when the receiver is dropped or the
/// terminal stops delivering events.
fn spawn_input_thread() -> mpsc::Receiver<Event> {
    let (sender, receiver) = mpsc::channel(500);
    std::thread::spawn(move || {
        let mut last_mouse_move = Instant::now();
        loop {
            match event::read() {
                Ok(event) => {
                    // Throttle mouse moves to one per 16 ms.
                    let is_mouse_move = event.as_mouse_event().is_some_and(|e| e.kind == MouseEventKind::Moved);
                    if is_mouse_move {
                        if last_mouse_move.elapsed() < MOUSE_MOVE_THROTTLE {
                            continue;
                        }
                        last_mouse_move = Instant::now();
                    }
                    if sender.blocking_send(event).is_err() {
                        break;
                    }
                }
                Err(error) => {
                    warn!(%error, "failed to read terminal event");
                    break;
                }
            }
        }
    });
    receiver
}

/// Put the terminal into raw mode and enter the alternate screen.
fn setup_terminal() -> Result<Terminal<Backend>> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableFocusChange).context("enter alternate screen")?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

/// Restore terminal settings and leave the alternate screen.
fn cleanup_terminal(terminal: &mut Terminal<Backend>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn render(terminal: &mut Terminal<Backend>, app: &App, main_view: &mut MainView) -> Result<()> {
    terminal.draw(|frame| main_view.render(frame, frame.area(), app))?;
    Ok(())
}

/// Route a raw crossterm event into the main view.
fn handle_input_event(app: &mut App, main_view: &mut MainView, input_event: Event) -> Vec<Effect> {
    match input_event {
        Event::Key(key_event) => main_view.handle_key_events(app, key_event),
        Event::Mouse(mouse_event) => main_view.handle_mouse_events(app, mouse_event),
        Event::Resize(width, height) => main_view.handle_message(app, &Msg::Resize(width, height)),
        // Coming back to the terminal is a good moment for fresh data.
        Event::FocusGained => main_view.handle_message(app, &Msg::RefreshRequested),
        Event::FocusLost | Event::Paste(_) => Vec::new(),
    }
}

/// Entry point for the dashboard runtime: sets up the terminal, opens the
/// detail view for `workflow_id`, runs the event loop and restores the
/// terminal on exit, including when the loop fails.
pub async fn run_app(config: DashboardConfig, gateway: Arc<dyn WorkflowGateway>, workflow_id: String) -> Result<()> {
    let (msg_sender, msg_receiver) = mpsc::channel(256);
    let mut app = App::new(config, gateway, msg_sender);
    let mut main_view = MainView::default();
    let input_receiver = spawn_input_thread();
    let mut terminal = setup_terminal()?;

    let initial_effects = vec![Effect::FetchServerConfig, Effect::SwitchTo(Route::WorkflowDetails(workflow_id))];
    let outcome = event_loop(
        &mut terminal,
        &mut app,
        &mut main_view,
        input_receiver,
        msg_receiver,
        initial_effects,
    )
    .await;

    if let Some(mut view) = main_view.content_view.take() {
        view.on_route_exit(&mut app);
    }
    cleanup_terminal(&mut terminal)?;
    info!("dashboard closed");
    outcome
}

async fn event_loop(
    terminal: &mut Terminal<Backend>,
    app: &mut App,
    main_view: &mut MainView,
    mut input_receiver: mpsc::Receiver<Event>,
    mut msg_receiver: mpsc::Receiver<Msg>,
    mut effects: Vec<Effect>,
) -> Result<()> {
    let mut pending: FuturesUnordered<JoinHandle<Msg>> = FuturesUnordered::new();
    let mut ticker = time::interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // Navigation can queue follow-up effects (route enter/exit); drain
        // until the queue settles.
        while !effects.is_empty() {
            let mut effects_to_process = std::mem::take(&mut effects);
            handle_navigation_effects(app, main_view, &mut effects_to_process, &mut effects);
            process_effects(app, effects_to_process, &mut pending);
        }
        if app.should_quit {
            break;
        }
        render(terminal, app, main_view)?;

        tokio::select! {
            // Terminal input events
            maybe_event = input_receiver.recv() => {
                let Some(event) = maybe_event else {
                    // Input channel closed; shut down cleanly.
                    break;
                };
                if let Event::Key(key_event) = event
                    && key_event.code == KeyCode::Char('c')
                    && key_event.modifiers.contains(KeyModifiers::CONTROL)
                {
                    break;
                }
                effects.extend(handle_input_event(app, main_view, event));
            }

            // Messages posted by timers (polling ticks)
            Some(msg) = msg_receiver.recv() => {
                effects.extend(main_view.handle_message(app, &msg));
            }

            Some(joined) = pending.next(), if !pending.is_empty() => {
                match joined {
                    Ok(msg) => effects.extend(main_view.handle_message(app, &msg)),
                    Err(error) => warn!(%error, "gateway task failed"),
                }
                app.executing = !pending.is_empty();
            }

            // Periodic animation tick
            _ = ticker.tick() => {
                effects.extend(main_view.handle_message(app, &Msg::Tick));
            }

            _ = signal::ctrl_c() => break,
        }
    }
    Ok(())
}

fn handle_navigation_effects(
    app: &mut App,
    main_view: &mut MainView,
    effects: &mut Vec<Effect>,
    queued_effects: &mut Vec<Effect>,
) {
    let navigation_effects = effects
        .extract_if(.., |effect| {
            matches!(effect, Effect::SwitchTo(_) | Effect::ShowModal(_) | Effect::CloseModal)
        })
        .collect::<Vec<Effect>>();

    for effect in navigation_effects {
        match effect {
            Effect::SwitchTo(route) => {
                if let Some(mut view) = main_view.content_view.take() {
                    queued_effects.extend(view.on_route_exit(app));
                }
                main_view.set_current_route(app, route);
                if let Some(view) = main_view.content_view.as_mut() {
                    queued_effects.extend(view.on_route_enter(app));
                }
            }
            Effect::ShowModal(modal) => main_view.set_open_modal(app, Some(modal)),
            Effect::CloseModal => main_view.set_open_modal(app, None),
            _ => {}
        }
    }
}

fn process_effects(app: &mut App, effects: Vec<Effect>, pending: &mut FuturesUnordered<JoinHandle<Msg>>) {
    if effects.is_empty() {
        return;
    }
    let command_batch = cmd::run_from_effects(app, effects);
    if !command_batch.pending.is_empty() {
        if !app.executing {
            app.throbber_idx = 0;
        }
        pending.extend(command_batch.pending);
        app.executing = true;
    }
}
