// MindTwin Viewer - Metrics poller
// Copyright (c) 2025 MindTwin contributors
//
// Licensed under AGPL-3.0.
// See LICENSE file for details.

//! Periodic metrics refresh.
//!
//! The poller fetches immediately, then every `interval`, resolves each
//! document into [`Drivers`] and publishes them into a shared
//! [`DriverCell`]. A failed fetch publishes the neutral drivers.
//!
//! Stopping is cooperative: [`PollerHandle::stop`] clears the running flag
//! and wakes the task. A fetch still in flight is abandoned and its result
//! never published.

use mindtwin::{DriverCell, Drivers, MetricResolver, DEFAULT_POLL_INTERVAL_SECS};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{Result, ViewerError};
use crate::source::MetricsSource;

/// Poller configuration.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Patient whose metrics drive the view
    pub patient_id: String,
    /// Time between fetches
    pub interval: Duration,
}

impl PollerConfig {
    pub fn new(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.patient_id.trim().is_empty() {
            return Err(ViewerError::Config("patient id is empty".to_string()));
        }
        if self.interval.is_zero() {
            return Err(ViewerError::Config("poll interval must be positive".to_string()));
        }
        Ok(())
    }
}

/// Shared poller state.
#[derive(Debug, Default)]
pub struct PollerState {
    /// Whether the poller is running.
    pub running: AtomicBool,
    /// Completed fetches, successful or not.
    pub polls: AtomicU64,
    /// Fetches that failed and published neutral drivers.
    pub failures: AtomicU64,
    wake: Notify,
    // held across the running check and the publish, and by stop()
    publish_gate: Mutex<()>,
}

impl PollerState {
    fn gate(&self) -> MutexGuard<'_, ()> {
        self.publish_gate
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Background metrics refresher.
pub struct Poller<S> {
    source: Arc<S>,
    resolver: MetricResolver,
    cell: Arc<DriverCell>,
    config: PollerConfig,
    state: Arc<PollerState>,
}

impl<S: MetricsSource + 'static> Poller<S> {
    pub fn new(source: Arc<S>, cell: Arc<DriverCell>, config: PollerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            resolver: MetricResolver::new(),
            cell,
            config,
            state: Arc::new(PollerState::default()),
        })
    }

    pub fn with_resolver(mut self, resolver: MetricResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Start polling on the current tokio runtime.
    pub fn spawn(self) -> PollerHandle {
        self.state.running.store(true, Ordering::SeqCst);
        let state = Arc::clone(&self.state);
        let task = tokio::spawn(async move { self.run().await });
        PollerHandle {
            state,
            task: Some(task),
        }
    }

    async fn run(self) {
        info!(
            "Polling metrics for {} every {:?}",
            self.config.patient_id, self.config.interval
        );

        loop {
            if !self.running() {
                break;
            }

            let fetched = tokio::select! {
                result = self.source.fetch(&self.config.patient_id) => result,
                _ = self.state.wake.notified() => {
                    debug!("fetch abandoned on stop");
                    continue;
                }
            };

            let drivers = match fetched {
                Ok(raw) => self.resolver.resolve(&raw),
                Err(e) => {
                    warn!("Failed to fetch metrics for {}: {}", self.config.patient_id, e);
                    self.state.failures.fetch_add(1, Ordering::SeqCst);
                    self.resolver.neutral()
                }
            };
            if !self.publish(drivers) {
                break;
            }

            tokio::select! {
                _ = sleep(self.config.interval) => {}
                _ = self.state.wake.notified() => {}
            }
        }

        info!("Poller stopped");
    }

    fn running(&self) -> bool {
        self.state.running.load(Ordering::SeqCst)
    }

    /// Publish unless stopped. Once `stop()` has returned this never
    /// publishes again.
    fn publish(&self, drivers: Drivers) -> bool {
        let _gate = self.state.gate();
        if !self.running() {
            return false;
        }
        let generation = self.cell.publish(drivers);
        self.state.polls.fetch_add(1, Ordering::SeqCst);
        debug!(generation, ?drivers, "drivers published");
        true
    }
}

/// Control handle for a spawned [`Poller`]. Dropping it stops the poller.
#[derive(Debug)]
pub struct PollerHandle {
    state: Arc<PollerState>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Stop polling. Idempotent.
    pub fn stop(&self) {
        let stopped = {
            let _gate = self.state.gate();
            self.state.running.swap(false, Ordering::SeqCst)
        };
        if stopped {
            // notify_one keeps a permit if the task is not waiting yet
            self.state.wake.notify_one();
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> Arc<PollerState> {
        Arc::clone(&self.state)
    }

    /// Stop and wait for the task to exit.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Poller task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
