//! # Stage instrumentation
//!
//! Hiding and unveiling are wrapped in coarse stages so callers can see
//! where the time goes, mostly to separate cipher cost from embedding cost.
//! [`StageTimings`] is the ready made observer; anything implementing
//! [`StageObserver`] can listen instead, a progress bar for instance.

use std::time::{Duration, Instant};

/// The stages the engine reports, in nesting order: the cipher stages run
/// inside their embedding stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Hide,
    Encrypt,
    Unveil,
    Decrypt,
}

/// Callback surface for stage boundaries. Failed operations may leave a
/// started stage unfinished.
pub trait StageObserver {
    fn started(&mut self, _stage: Stage) {}
    fn finished(&mut self, _stage: Stage) {}
}

/// Observer used by the plain entry points.
pub(crate) struct NoopObserver;

impl StageObserver for NoopObserver {}

/// Wall clock per stage, one sample per completed stage span.
#[derive(Debug, Default)]
pub struct StageTimings {
    open: Vec<(Stage, Instant)>,
    samples: Vec<(Stage, Duration)>,
}

impl StageTimings {
    pub fn new() -> StageTimings {
        StageTimings::default()
    }

    /// Summed duration of all completed spans of `stage`.
    pub fn elapsed(&self, stage: Stage) -> Duration {
        self.samples
            .iter()
            .filter(|(recorded, _)| *recorded == stage)
            .map(|(_, duration)| *duration)
            .sum()
    }

    /// Total time across both embedding stages. The cipher stages nest
    /// inside those, so they are not added again.
    pub fn total(&self) -> Duration {
        self.elapsed(Stage::Hide) + self.elapsed(Stage::Unveil)
    }

    pub fn samples(&self) -> &[(Stage, Duration)] {
        &self.samples
    }
}

impl StageObserver for StageTimings {
    fn started(&mut self, stage: Stage) {
        self.open.push((stage, Instant::now()));
    }

    fn finished(&mut self, stage: Stage) {
        if let Some(position) = self.open.iter().rposition(|(open, _)| *open == stage) {
            let (_, start) = self.open.swap_remove(position);
            self.samples.push((stage, start.elapsed()));
        }
    }
}
