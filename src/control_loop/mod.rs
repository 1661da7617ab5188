//! ControlLoop - Serialized Control Cycles
//!
//! ## Responsibilities
//!
//! - Pull one detection batch at a time from the feed
//! - Run exactly one arbitration cycle per batch
//! - Forward every produced command to the actuator before the next batch
//! - Synthesize empty batches when the feed goes quiet (optional idle tick)
//!
//! The loop owns the `ModeArbiter`, so control state is only ever touched
//! by one cycle at a time.

use crate::actuator_link::ActuatorSink;
use crate::detection_feed::{DetectionBatch, DetectionSource};
use crate::error::Result;
use crate::servo_controller::{CycleOutcome, ModeArbiter};
use std::time::Duration;

/// Counters for one run of the loop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub cycles: u64,
    pub tracking_commands: u64,
    pub scan_steps: u64,
    pub held_cycles: u64,
    pub dropped_messages: u64,
}

/// Control loop instance
pub struct ControlLoop<S, A> {
    arbiter: ModeArbiter,
    source: S,
    sink: A,
    idle_tick: Option<Duration>,
    stats: LoopStats,
}

impl<S, A> ControlLoop<S, A>
where
    S: DetectionSource,
    A: ActuatorSink,
{
    pub fn new(arbiter: ModeArbiter, source: S, sink: A) -> Self {
        Self {
            arbiter,
            source,
            sink,
            idle_tick: None,
            stats: LoopStats::default(),
        }
    }

    /// Run an empty-batch cycle whenever the feed is silent for `tick`
    pub fn with_idle_tick(mut self, tick: Option<Duration>) -> Self {
        self.idle_tick = tick;
        self
    }

    /// Run until the feed closes (Ok) or a fatal error occurs (Err)
    pub async fn run(mut self) -> Result<LoopStats> {
        tracing::info!(
            mode = %self.arbiter.mode(),
            position = %self.arbiter.position(),
            idle_tick_ms = ?self.idle_tick.map(|t| t.as_millis() as u64),
            "Control loop started"
        );

        let result = loop {
            let batch = match self.next_batch().await {
                Some(Ok(batch)) => batch,
                Some(Err(e)) if !e.is_fatal() => {
                    self.stats.dropped_messages += 1;
                    tracing::warn!(error = %e, "Dropping feed message");
                    continue;
                }
                Some(Err(e)) => break Err(e),
                None => {
                    tracing::info!("Detection feed closed");
                    break Ok(());
                }
            };

            if let Err(e) = self.run_cycle(&batch).await {
                break Err(e);
            }
        };

        let stats = self.stats;
        match &result {
            Ok(()) => tracing::info!(
                cycles = stats.cycles,
                tracking_commands = stats.tracking_commands,
                scan_steps = stats.scan_steps,
                held_cycles = stats.held_cycles,
                dropped_messages = stats.dropped_messages,
                "Control loop stopped"
            ),
            Err(e) => tracing::error!(
                error = %e,
                cycles = stats.cycles,
                "Control loop aborted"
            ),
        }

        result.map(|()| stats)
    }

    /// One full cycle: arbitrate, then write every command in order
    pub async fn run_cycle(&mut self, batch: &DetectionBatch) -> Result<CycleOutcome> {
        let outcome = self.arbiter.on_batch(&batch.boxes, batch.received_at);

        for command in outcome.commands() {
            self.sink.send(command).await?;
        }

        self.stats.cycles += 1;
        match &outcome {
            CycleOutcome::Tracked(commands) => {
                self.stats.tracking_commands += commands.len() as u64
            }
            CycleOutcome::Scanned(_) => self.stats.scan_steps += 1,
            CycleOutcome::Held => self.stats.held_cycles += 1,
        }

        Ok(outcome)
    }

    async fn next_batch(&mut self) -> Option<Result<DetectionBatch>> {
        let Some(tick) = self.idle_tick else {
            return self.source.next_batch().await;
        };

        match tokio::time::timeout(tick, self.source.next_batch()).await {
            Ok(next) => next,
            Err(_) => {
                tracing::trace!("Feed idle, running empty cycle");
                Some(Ok(DetectionBatch::empty(
                    tokio::time::Instant::now().into_std(),
                )))
            }
        }
    }

    pub fn stats(&self) -> &LoopStats {
        &self.stats
    }
}
