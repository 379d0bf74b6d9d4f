use chrono::Duration;
use clap::Subcommand;
use flowdoro_core::Event;

use crate::host;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start the armed session
    Start,
    /// Pause the running session
    Pause,
    /// Resume a paused session
    Resume,
    /// Stop and reset the current session
    Stop,
    /// Skip the armed break
    SkipBreak,
    /// Tick the countdown and print the current state as JSON
    Status,
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut host = host::load()?;

    match action {
        TimerAction::Start => {
            if let Some(event) = host.timer.start() {
                println!("{}", serde_json::to_string_pretty(&event)?);
            } else {
                // Already running.
                println!("{}", serde_json::to_string_pretty(&host.timer.snapshot())?);
            }
        }
        TimerAction::Pause => {
            if let Some(event) = host.timer.pause() {
                println!("{}", serde_json::to_string_pretty(&event)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&host.timer.snapshot())?);
            }
        }
        TimerAction::Resume => {
            if let Some(event) = host.timer.resume() {
                println!("{}", serde_json::to_string_pretty(&event)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&host.timer.snapshot())?);
            }
        }
        TimerAction::Stop => {
            if let Some(event) = host.timer.stop() {
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
        }
        TimerAction::SkipBreak => {
            let events = host.timer.skip_break();
            if events.is_empty() {
                eprintln!("no break to skip");
            }
            for event in &events {
                println!("{}", serde_json::to_string_pretty(event)?);
            }
        }
        TimerAction::Status => {
            let events = host.timer.tick();
            record_completed_breaks(&host, &events);
            println!("{}", serde_json::to_string_pretty(&host.timer.snapshot())?);
            for event in &events {
                println!("{}", serde_json::to_string_pretty(event)?);
            }
            if host.timer.pending_rating() {
                eprintln!("rate the finished session: flowdoro flow rate <distracted|ok|focused|flow>");
            }
        }
    }

    Ok(())
}

/// Completed breaks go straight into the history; work sessions are
/// recorded when their rating arrives.
fn record_completed_breaks(host: &host::Host, events: &[Event]) {
    for event in events {
        if let Event::SessionCompleted {
            session_type,
            duration_secs,
            at,
        } = event
        {
            if !session_type.is_break() {
                continue;
            }
            let started_at = *at - Duration::seconds(*duration_secs as i64);
            if let Err(e) =
                host.db
                    .record_session(*session_type, *duration_secs, None, started_at, *at)
            {
                tracing::warn!("failed to record break session: {e}");
            }
        }
    }
}
