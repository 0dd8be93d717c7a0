//! Background refresher: keeps tracked-city weather fresh.
//!
//! A single long-lived task runs one full refresh pass immediately at
//! startup and then once per period. Passes never overlap: the loop awaits
//! each pass to completion before the next tick, and a slow upstream
//! extends the cycle instead of stacking passes.
//!
//! Lifecycle is an explicit state machine, `Stopped -> Running -> Stopping
//! -> Stopped`. Shutdown flips a watch channel; the task is cancelled at
//! its next await point and joined. The registry persist is a synchronous
//! write performed under the registry lock with no intervening await, so
//! cancellation can never interleave with it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::api::WeatherClient;
use crate::registry::CityRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefresherState {
    Stopped,
    Running,
    Stopping,
}

/// Owning handle to the spawned refresh task.
pub struct Refresher {
    shutdown_tx: watch::Sender<bool>,
    state_rx: watch::Receiver<RefresherState>,
    handle: JoinHandle<()>,
}

impl Refresher {
    /// Spawn the refresh loop in `Running` state. The first pass starts
    /// immediately; subsequent ticks come every `period`.
    pub fn spawn(registry: Arc<CityRegistry>, client: WeatherClient, period: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(RefresherState::Running);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(period_secs = period.as_secs(), "Background refresher running");

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        let _ = state_tx.send(RefresherState::Stopping);
                        break;
                    }
                    _ = async {
                        interval.tick().await;
                        if let Err(e) = registry.refresh_all(&client).await {
                            // Per-city upstream failures are already handled
                            // inside the pass; this is the persist failing.
                            warn!(error = %e, "Failed to persist registry after refresh pass");
                        }
                    } => {}
                }
            }

            let _ = state_tx.send(RefresherState::Stopped);
            debug!("Background refresher stopped");
        });

        Self {
            shutdown_tx,
            state_rx,
            handle,
        }
    }

    pub fn state(&self) -> RefresherState {
        *self.state_rx.borrow()
    }

    /// Watch handle that outlives `shutdown`, for observing the final
    /// transition to `Stopped`.
    pub fn state_watch(&self) -> watch::Receiver<RefresherState> {
        self.state_rx.clone()
    }

    /// Signal the task and wait for it to exit. An in-flight pass is
    /// cancelled at its next await point; nothing detached survives.
    pub async fn shutdown(self) {
        info!("Stopping background refresher");
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.handle.await {
            warn!(error = %e, "Refresher task failed during shutdown");
        }
    }
}
