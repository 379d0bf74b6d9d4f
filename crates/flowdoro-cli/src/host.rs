//! Host-environment collaborators and controller wiring.
//!
//! The CLI is the "external UI collaborator" of the core: it dispatches
//! OS notifications, receives the lifecycle signals, and persists state
//! between invocations through the SQLite store.

use std::rc::Rc;

use chrono::Utc;
use flowdoro_core::storage::{Config, Database};
use flowdoro_core::{FlowTimer, Notifier, SignalHook};
use tracing::{debug, warn};

const KEY_DAILY_STAMP: &str = "daily_stamp";

/// Sends desktop notifications via the platform notification daemon.
pub struct DesktopNotifier {
    enabled: bool,
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), Box<dyn std::error::Error>> {
        if !self.enabled {
            return Ok(());
        }
        notify_rust::Notification::new()
            .appname("flowdoro")
            .summary(title)
            .body(body)
            .show()?;
        Ok(())
    }
}

/// Logs lifecycle signals; a host shell can follow the log stream for
/// OS-level bookkeeping.
pub struct LoggingSignalHook;

impl SignalHook for LoggingSignalHook {
    fn on_start(&self) -> Result<(), Box<dyn std::error::Error>> {
        debug!("signal: on_start");
        Ok(())
    }

    fn on_pause(&self) -> Result<(), Box<dyn std::error::Error>> {
        debug!("signal: on_pause");
        Ok(())
    }

    fn on_resume(&self) -> Result<(), Box<dyn std::error::Error>> {
        debug!("signal: on_resume");
        Ok(())
    }

    fn on_stop(&self) -> Result<(), Box<dyn std::error::Error>> {
        debug!("signal: on_stop");
        Ok(())
    }

    fn on_skip_break(&self) -> Result<(), Box<dyn std::error::Error>> {
        debug!("signal: on_skip_break");
        Ok(())
    }
}

/// The wired-up core plus the handles commands need alongside it.
pub struct Host {
    pub timer: FlowTimer,
    pub db: Rc<Database>,
}

/// Load config and state, build the controller, and roll the daily
/// counter over when the calendar day changed since the last invocation.
pub fn load() -> Result<Host, Box<dyn std::error::Error>> {
    let (config, config_failed) = match Config::load() {
        Ok(cfg) => (cfg, false),
        Err(e) => {
            warn!("config load failed, using defaults: {e}");
            (Config::default(), true)
        }
    };

    let db = Rc::new(Database::open()?);
    let mut timer = FlowTimer::new(
        config.settings(),
        Box::new(db.clone()),
        Box::new(DesktopNotifier {
            enabled: config.notifications.enabled,
        }),
        Box::new(LoggingSignalHook),
    );
    timer.set_config_error(config_failed);

    let today = Utc::now().format("%Y-%m-%d").to_string();
    let stamp = db.kv_get(KEY_DAILY_STAMP).unwrap_or(None);
    if stamp.as_deref() != Some(today.as_str()) {
        if stamp.is_some() {
            timer.reset_daily();
        }
        if let Err(e) = db.kv_set(KEY_DAILY_STAMP, &today) {
            warn!("failed to persist daily stamp: {e}");
        }
    }

    Ok(Host { timer, db })
}
