use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics::{counter, histogram};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{info, warn};

use boa_supply_domain::{
    config::ConfigError, services::telemetry::TelemetryError, storage::StorageError,
    PublishOutcome,
};

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("tick exceeded {0:?}")]
    Timeout(Duration),
    #[error("{figure} supply would be negative ({value})")]
    NegativeSupply { figure: &'static str, value: String },
    #[error("tick aborted: {0}")]
    Aborted(String),
}

impl From<reqwest::Error> for MonitorError {
    fn from(value: reqwest::Error) -> Self {
        Self::Rpc(value.to_string())
    }
}

/// One unit of periodic work. The scheduler never runs two ticks of the same
/// job at once.
#[async_trait]
pub trait SupplyJob: Send + Sync + 'static {
    async fn tick(&self) -> Result<PublishOutcome, MonitorError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopped,
}

/// Drives a [`SupplyJob`] on a fixed interval: one tick immediately on
/// start, then one per interval. Each tick runs in its own task under a
/// timeout, so an error, a panic or a hung remote call only fails that tick.
#[derive(Debug, Clone, Copy)]
pub struct IntervalScheduler {
    interval: Duration,
    tick_timeout: Duration,
}

impl IntervalScheduler {
    pub fn new(interval: Duration, tick_timeout: Duration) -> Self {
        Self {
            interval,
            tick_timeout,
        }
    }

    pub fn start<J: SupplyJob>(&self, job: Arc<J>) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(SchedulerState::Idle);
        let interval = self.interval;
        let tick_timeout = self.tick_timeout;

        info!(
            interval_secs = interval.as_secs(),
            tick_timeout_secs = tick_timeout.as_secs(),
            "starting supply scheduler"
        );
        let task = tokio::spawn(drive(job, interval, tick_timeout, shutdown_rx, state_tx));

        SchedulerHandle {
            shutdown: shutdown_tx,
            state: state_rx,
            task,
        }
    }
}

/// Owned control over a running scheduler.
#[derive(Debug)]
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    state: watch::Receiver<SchedulerState>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    /// Signals shutdown, lets an in-flight tick finish, and returns once no
    /// further tick can start.
    pub async fn stop(self) -> Result<(), MonitorError> {
        let _ = self.shutdown.send(true);
        self.task
            .await
            .map_err(|err| MonitorError::Aborted(err.to_string()))?;
        info!("supply scheduler stopped");
        Ok(())
    }
}

async fn drive<J: SupplyJob>(
    job: Arc<J>,
    interval: Duration,
    tick_timeout: Duration,
    mut shutdown: watch::Receiver<bool>,
    state: watch::Sender<SchedulerState>,
) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {}
        }

        state.send_replace(SchedulerState::Running);
        let _ = run_tick(Arc::clone(&job), tick_timeout).await;
        state.send_replace(SchedulerState::Idle);
    }

    state.send_replace(SchedulerState::Stopped);
}

/// Runs a single tick with failure isolation. Errors are logged and counted
/// here; the caller only needs the result for tests and diagnostics.
pub async fn run_tick<J: SupplyJob>(
    job: Arc<J>,
    tick_timeout: Duration,
) -> Result<PublishOutcome, MonitorError> {
    let started = Instant::now();
    let mut task = tokio::spawn(async move { job.tick().await });

    let result = match time::timeout(tick_timeout, &mut task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(MonitorError::Aborted(join_err.to_string())),
        Err(_) => {
            // Abandon the tick; dropping its futures returns any pooled
            // connection it holds.
            task.abort();
            Err(MonitorError::Timeout(tick_timeout))
        }
    };

    histogram!("supply_tick_duration_seconds").record(started.elapsed().as_secs_f64());
    match &result {
        Ok(outcome) => {
            counter!("supply_ticks_total", "result" => "ok").increment(1);
            info!(outcome = outcome.label(), "supply tick completed");
        }
        Err(err) => {
            counter!("supply_ticks_total", "result" => "error").increment(1);
            warn!(%err, "supply tick failed; keeping last published snapshot");
        }
    }
    result
}
