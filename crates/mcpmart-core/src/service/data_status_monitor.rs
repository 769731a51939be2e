//! Periodic backend health polling
//!
//! Polls `GET /data-status`, stores the result in [`AppState`] and emits
//! [`DomainEvent::DataStatusChanged`] whenever the status flips. The poll
//! task lives exactly as long as its [`MonitorHandle`].

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::api_client::CatalogApiClient;
use crate::config::DEFAULT_STATUS_POLL_INTERVAL;
use crate::domain::{DataStatus, DomainEvent};
use crate::event_bus::EventSender;
use crate::state::SharedAppState;

/// Shortest accepted poll period; `tokio::time::interval` panics on zero
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

pub struct DataStatusMonitor {
    client: CatalogApiClient,
    state: SharedAppState,
    events: EventSender,
    interval: Duration,
}

impl DataStatusMonitor {
    pub fn new(client: CatalogApiClient, state: SharedAppState, events: EventSender) -> Self {
        Self {
            client,
            state,
            events,
            interval: DEFAULT_STATUS_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one check and record it. Request failures count as `Unavailable`.
    pub async fn check_once(&self) -> DataStatus {
        let (status, message) = match self.client.fetch_data_status().await {
            Ok(report) => (report.status(), report.message.clone()),
            Err(e) => {
                warn!(error = %e, "[DataStatus] Status check failed");
                (DataStatus::Unavailable, None)
            }
        };

        if let Some(previous) = self
            .state
            .record_data_status(status, message.clone())
            .await
        {
            info!(
                "[DataStatus] Status changed: {} -> {}",
                previous.as_str(),
                status.as_str()
            );
            self.events.emit(DomainEvent::DataStatusChanged {
                previous,
                current: status,
                message,
            });
        } else {
            debug!(status = status.as_str(), "[DataStatus] Status unchanged");
        }

        status
    }

    /// Check immediately, then every interval until the handle is stopped or dropped
    pub fn start(self: Arc<Self>) -> MonitorHandle {
        let period = self.interval;
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                self.check_once().await;
            }
        });

        info!(interval_secs = period.as_secs(), "[DataStatus] Monitor started");
        MonitorHandle { task: Some(task) }
    }
}

/// Owns the poll task; dropping it stops polling
pub struct MonitorHandle {
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("[DataStatus] Monitor stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
