use chrono::{Duration, Utc};
use clap::Subcommand;
use flowdoro_core::{Event, FlowRating, SessionType};
use serde::Serialize;

use crate::host;

#[derive(Subcommand)]
pub enum FlowAction {
    /// Rate the just-finished work session
    Rate {
        /// One of: distracted, ok, focused, flow
        rating: String,
    },
    /// Close the rating prompt without an answer
    Dismiss,
    /// Show streak, recent ratings and daily progress as JSON
    Status,
}

#[derive(Serialize)]
struct FlowStatus {
    streak: u32,
    recent: Vec<FlowRating>,
    average_flow_ratio: f64,
    daily: flowdoro_core::DailyProgress,
    pending_rating: bool,
    config_error: bool,
}

pub fn run(action: FlowAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut host = host::load()?;

    match action {
        FlowAction::Rate { rating } => {
            let rating: FlowRating = rating.parse()?;
            let events = host.timer.record_rating(rating);
            if events.is_empty() {
                eprintln!("no work session is waiting for a rating");
                return Ok(());
            }
            record_rated_session(&host, rating, &events);
            for event in &events {
                println!("{}", serde_json::to_string_pretty(event)?);
            }
        }
        FlowAction::Dismiss => {
            let events = host.timer.dismiss_rating();
            if events.is_empty() {
                eprintln!("no work session is waiting for a rating");
                return Ok(());
            }
            for event in &events {
                println!("{}", serde_json::to_string_pretty(event)?);
            }
        }
        FlowAction::Status => {
            let tracker = host.timer.flow();
            let status = FlowStatus {
                streak: tracker.streak(),
                recent: tracker.recent().to_vec(),
                average_flow_ratio: tracker.average_flow_ratio(),
                daily: tracker.daily_progress(),
                pending_rating: host.timer.pending_rating(),
                config_error: host.timer.config_error(),
            };
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    Ok(())
}

/// The rated work session enters the history with the duration it
/// actually ran (the pre-adjustment work duration).
fn record_rated_session(host: &host::Host, rating: FlowRating, events: &[Event]) {
    let duration_secs = events.iter().find_map(|e| match e {
        Event::DurationAdjusted { previous_secs, .. } => Some(*previous_secs),
        _ => None,
    });
    let Some(duration_secs) = duration_secs else {
        return;
    };
    let completed_at = Utc::now();
    let started_at = completed_at - Duration::seconds(duration_secs as i64);
    if let Err(e) = host.db.record_session(
        SessionType::Work,
        duration_secs,
        Some(rating),
        started_at,
        completed_at,
    ) {
        tracing::warn!("failed to record work session: {e}");
    }
}
