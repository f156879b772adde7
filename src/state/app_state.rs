//! Main application state shared with the HTTP handlers

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, warn};

use crate::{
    error::ControlError,
    tasks::{Command, Request},
};
use super::TimerSnapshot;

/// Handle on the countdown task plus server metadata
#[derive(Debug)]
pub struct AppState {
    /// Commands for the countdown task
    pub commands: mpsc::Sender<Request>,
    /// Latest snapshot published by the countdown task
    pub snapshots: watch::Receiver<TimerSnapshot>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    pub fn new(
        port: u16,
        host: String,
        commands: mpsc::Sender<Request>,
        snapshots: watch::Receiver<TimerSnapshot>,
    ) -> Self {
        Self {
            commands,
            snapshots,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Send a command to the countdown task and wait for its answer
    pub async fn send(&self, action: &str, command: Command) -> Result<TimerSnapshot, ControlError> {
        debug!("Sending {:?} to countdown task", command);
        let (reply, response) = oneshot::channel();

        self.commands
            .send(Request { command, reply })
            .await
            .map_err(|_| ControlError::DriverUnavailable)?;
        let result = response.await.map_err(|_| ControlError::DriverUnavailable)?;

        // Only accepted commands count as the last action
        if result.is_ok() {
            self.record_action(action);
        }
        result
    }

    fn record_action(&self, action: &str) {
        match self.last_action.lock() {
            Ok(mut last_action) => *last_action = Some(action.to_string()),
            Err(e) => warn!("Failed to lock last action: {}", e),
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Latest published snapshot
    pub fn current_snapshot(&self) -> TimerSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;
        
        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
