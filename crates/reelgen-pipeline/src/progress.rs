//! Progress observation.

use reelgen_models::ProgressEvent;
use tracing::debug;

/// Receives progress events from a running generation.
///
/// Emission is fire-and-forget; a sink must not block.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn emit(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn emit(&self, _event: ProgressEvent) {}
}

/// Writes every event to the log.
#[derive(Debug, Clone)]
pub struct TracingProgress {
    generation_id: String,
}

impl TracingProgress {
    pub fn new(generation_id: impl Into<String>) -> Self {
        Self {
            generation_id: generation_id.into(),
        }
    }
}

impl ProgressSink for TracingProgress {
    fn emit(&self, event: ProgressEvent) {
        debug!(
            generation_id = %self.generation_id,
            percent = event.percent,
            "{}", event.stage
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_closure_sink() {
        let seen = Mutex::new(Vec::new());
        let sink = |event: ProgressEvent| seen.lock().unwrap().push(event.percent);

        sink.emit(ProgressEvent::new(5, "a"));
        sink.emit(ProgressEvent::new(15, "b"));

        assert_eq!(*seen.lock().unwrap(), vec![5, 15]);
    }
}
