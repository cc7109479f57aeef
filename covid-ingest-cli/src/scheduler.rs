//! Periodic pipeline runner.
//!
//! Every tick launches each registered pipeline on tokio's blocking pool.
//! A pipeline whose previous run is still going is skipped for that tick,
//! so two runs of the same pipeline never overlap. Failed runs are logged
//! and the schedule carries on.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use covid_ingest_import::{ImportProgress, Pipeline, PipelineError, RunStats};
use tokio::task::{JoinError, JoinSet};
use tokio::time::MissedTickBehavior;

pub(crate) type SharedProgress = Arc<dyn ImportProgress + Send + Sync>;

/// Result of one finished pipeline run.
pub(crate) struct Outcome {
    pub pipeline: &'static str,
    pub result: Result<RunStats, PipelineError>,
}

struct Task {
    pipeline: Arc<dyn Pipeline>,
    progress: SharedProgress,
    running: Arc<AtomicBool>,
}

/// Clears a pipeline's in-flight flag when its run ends, including by panic.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub(crate) struct Scheduler {
    tasks: Vec<Task>,
    interval: Duration,
}

impl Scheduler {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            tasks: Vec::new(),
            interval,
        }
    }

    pub(crate) fn add(&mut self, pipeline: Arc<dyn Pipeline>, progress: SharedProgress) {
        self.tasks.push(Task {
            pipeline,
            progress,
            running: Arc::new(AtomicBool::new(false)),
        });
    }

    /// Start every pipeline that is not already running. Returns how many
    /// were started.
    fn launch(&self, in_flight: &mut JoinSet<Outcome>) -> usize {
        let mut started = 0;
        for task in &self.tasks {
            let name = task.pipeline.name();
            if task
                .running
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                log::warn!("{name}: previous run still in progress, skipping this tick");
                continue;
            }

            let guard = InFlight(task.running.clone());
            let pipeline = task.pipeline.clone();
            let progress = task.progress.clone();
            in_flight.spawn_blocking(move || {
                let _guard = guard;
                let progress: &dyn ImportProgress = &*progress;
                let result = pipeline.run(Some(progress));
                if let Err(e) = &result {
                    log::error!("{name}: run failed ({}): {e}", e.kind());
                }
                Outcome {
                    pipeline: name,
                    result,
                }
            });
            started += 1;
        }
        started
    }

    /// Run every pipeline once, concurrently, and wait for all of them.
    ///
    /// Runs that panicked are logged and left out of the result.
    pub(crate) async fn run_once(&self) -> Vec<Outcome> {
        let mut in_flight = JoinSet::new();
        self.launch(&mut in_flight);

        let mut outcomes = Vec::with_capacity(self.tasks.len());
        while let Some(joined) = in_flight.join_next().await {
            if let Some(outcome) = reap(joined) {
                outcomes.push(outcome);
            }
        }
        outcomes
    }

    /// Launch the pipelines immediately and then once per interval until
    /// `shutdown` resolves. Runs still in progress at shutdown are awaited.
    pub(crate) async fn run_until(&self, shutdown: impl Future<Output = ()>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut in_flight = JoinSet::new();
        tokio::pin!(shutdown);

        log::info!(
            "Scheduling {} pipeline(s) every {}",
            self.tasks.len(),
            format_interval(self.interval)
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.launch(&mut in_flight);
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    reap(joined);
                }
                _ = &mut shutdown => {
                    break;
                }
            }
        }

        if !in_flight.is_empty() {
            log::info!(
                "Shutting down; waiting for {} running pipeline(s)",
                in_flight.len()
            );
        }
        while let Some(joined) = in_flight.join_next().await {
            reap(joined);
        }
        log::info!("Scheduler stopped");
    }
}

fn reap(joined: Result<Outcome, JoinError>) -> Option<Outcome> {
    match joined {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            log::error!("Pipeline task aborted: {e}");
            None
        }
    }
}

fn format_interval(interval: Duration) -> String {
    let secs = interval.as_secs();
    if secs >= 3600 && secs.is_multiple_of(3600) {
        format!("{}h", secs / 3600)
    } else {
        format!("{:?}", interval)
    }
}

/// Resolves when the process receives Ctrl-C.
pub(crate) async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Received Ctrl-C"),
        Err(e) => {
            log::warn!("Cannot listen for Ctrl-C ({e}); stop the process to end the schedule");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
#[path = "tests/scheduler_tests.rs"]
mod tests;
