//! Submit-and-poll loop for long-running generation jobs.

use std::time::Duration;

use reelgen_models::{GenerationJob, JobState, ProgressEvent, STAGE_MESSAGES};
use tokio::sync::watch;
use tokio::time::{timeout_at, Instant};
use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::metrics;
use crate::progress::ProgressSink;
use crate::provider::VideoProvider;
use crate::request::ProviderRequest;

const SUBMIT_PERCENT: u8 = 5;
const POLLING_PERCENT: u8 = 15;
const PERCENT_PER_CYCLE: usize = 5;
const MAX_POLLING_PERCENT: usize = 90;

/// Cooperative cancellation for a running generation.
///
/// Sending `true` stops the loop at the next iteration boundary, including
/// mid-sleep. The remote job is left running.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Option<watch::Receiver<bool>>);

impl Cancellation {
    /// A token that never fires.
    pub fn none() -> Self {
        Self(None)
    }

    pub fn new(receiver: watch::Receiver<bool>) -> Self {
        Self(Some(receiver))
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.as_ref().is_some_and(|rx| *rx.borrow())
    }

    fn check(&self) -> PipelineResult<()> {
        if self.is_cancelled() {
            Err(PipelineError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Sleep for `duration` unless cancelled first.
    async fn sleep(&mut self, duration: Duration) -> PipelineResult<()> {
        let Some(rx) = self.0.as_mut() else {
            tokio::time::sleep(duration).await;
            return Ok(());
        };

        let sleep = tokio::time::sleep(duration);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => return Ok(()),
                changed = rx.changed() => {
                    if changed.is_err() {
                        // Sender dropped; nothing can cancel any more.
                        (&mut sleep).await;
                        return Ok(());
                    }
                    if *rx.borrow_and_update() {
                        return Err(PipelineError::Cancelled);
                    }
                }
            }
        }
    }
}

impl From<watch::Receiver<bool>> for Cancellation {
    fn from(receiver: watch::Receiver<bool>) -> Self {
        Self::new(receiver)
    }
}

/// Progress percentage after the given poll cycle (1-based).
pub fn polling_percent(cycle: usize) -> u8 {
    let percent = POLLING_PERCENT as usize + PERCENT_PER_CYCLE * cycle;
    percent.min(MAX_POLLING_PERCENT) as u8
}

/// Drives one job from submission to a terminal state.
pub struct JobPoller<'a> {
    provider: &'a dyn VideoProvider,
    interval: Duration,
    timeout: Duration,
}

impl<'a> JobPoller<'a> {
    pub fn new(provider: &'a dyn VideoProvider, config: &PipelineConfig) -> Self {
        Self {
            provider,
            interval: config.poll_interval,
            timeout: config.poll_timeout,
        }
    }

    /// Submit `request` and poll until the job is done.
    ///
    /// Returns the finished job on success, `JobFailed` when the job
    /// carries a structured error, or `TimedOut` once the deadline passes.
    /// The deadline also bounds a poll that is still in flight.
    pub async fn run(
        &self,
        request: &ProviderRequest,
        progress: &dyn ProgressSink,
        cancel: &mut Cancellation,
    ) -> PipelineResult<GenerationJob> {
        cancel.check()?;
        progress.emit(ProgressEvent::new(SUBMIT_PERCENT, STAGE_MESSAGES[0]));

        let mut job = self.provider.submit(request).await?;
        let started = Instant::now();
        let deadline = started + self.timeout;
        debug!(
            operation = ?job.handle().name(),
            state = %JobState::Submitted,
            "Generation job submitted"
        );
        progress.emit(ProgressEvent::new(POLLING_PERCENT, STAGE_MESSAGES[1]));

        let mut cycle = 1usize;
        while !job.is_done() {
            cancel.check()?;
            cancel.sleep(self.interval).await?;

            if Instant::now() > deadline {
                return Err(self.timed_out(&job, started));
            }

            job = match timeout_at(deadline, self.provider.poll(&job)).await {
                Ok(polled) => polled?,
                Err(_) => return Err(self.timed_out(&job, started)),
            };

            let state = job.state();
            metrics::record_poll(state);
            debug!(
                operation = ?job.handle().name(),
                state = %state,
                cycle,
                "Polled generation job"
            );
            progress.emit(ProgressEvent::new(
                polling_percent(cycle),
                ProgressEvent::stage_for_cycle(cycle),
            ));
            cycle += 1;
        }

        let state = job.state();
        metrics::record_job_finished(state);
        if state == JobState::Failed {
            return Err(PipelineError::JobFailed(Box::new(job)));
        }
        Ok(job)
    }

    fn timed_out(&self, job: &GenerationJob, started: Instant) -> PipelineError {
        metrics::record_job_finished(JobState::TimedOut);
        debug!(
            operation = ?job.handle().name(),
            state = %JobState::TimedOut,
            elapsed_secs = started.elapsed().as_secs(),
            "Poll deadline exceeded"
        );
        PipelineError::TimedOut(self.timeout)
    }
}
