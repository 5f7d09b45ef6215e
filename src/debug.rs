//! Observation hooks for solver runs.
//!
//! Solvers report every attempt, failed ones included, to a
//! [`ProngObserver`] passed in by the caller. Observers only watch; nothing
//! they do feeds back into the computation.

use kurbo::{Circle, Point};

use crate::point::PointOnShape;
use crate::prong::{FailReason, Scope};

/// One 2-prong search, successful or not.
#[derive(Debug, Clone)]
pub struct TwoProngRecord {
    pub y: PointOnShape,
    pub scope: Scope,
    /// Center estimates in iteration order, starting with the osculating
    /// circle's center.
    pub estimates: Vec<Point>,
    /// The last second contact found, if any.
    pub z: Option<PointOnShape>,
    pub circle: Option<Circle>,
    pub failure: Option<FailReason>,
    /// Steps that did not bring the estimate closer to `y`.
    pub stalled_steps: usize,
}

/// A 1-prong, inserted or suppressed.
#[derive(Debug, Clone, Copy)]
pub struct OneProngRecord {
    pub pos: PointOnShape,
    /// 1-prongs at dull corners are reported but never inserted.
    pub at_dull_corner: bool,
}

/// One candidate split tried by the 3-prong search.
#[derive(Debug, Clone, Copy)]
pub struct ThreeProngCandidate {
    pub split: usize,
    pub circle: Circle,
    pub error: f64,
}

/// One 3-prong search over a walked boundary region.
#[derive(Debug, Clone)]
pub struct ThreeProngRecord {
    pub delta_count: usize,
    pub candidates: Vec<ThreeProngCandidate>,
    /// Index into `candidates` of the accepted one.
    pub best: Option<usize>,
}

/// Receives solver reports. All methods default to doing nothing.
pub trait ProngObserver {
    fn two_prong(&mut self, _record: &TwoProngRecord) {}
    fn one_prong(&mut self, _record: &OneProngRecord) {}
    fn three_prong(&mut self, _record: &ThreeProngRecord) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProngObserver for NoopObserver {}

/// Observer that keeps every report, for offline inspection.
#[derive(Debug, Clone, Default)]
pub struct DebugRecorder {
    pub two_prongs: Vec<TwoProngRecord>,
    pub one_prongs: Vec<OneProngRecord>,
    pub three_prongs: Vec<ThreeProngRecord>,
}

impl DebugRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failed_two_prongs(&self) -> impl Iterator<Item = &TwoProngRecord> {
        self.two_prongs.iter().filter(|r| r.failure.is_some())
    }
}

impl ProngObserver for DebugRecorder {
    fn two_prong(&mut self, record: &TwoProngRecord) {
        self.two_prongs.push(record.clone());
    }

    fn one_prong(&mut self, record: &OneProngRecord) {
        self.one_prongs.push(*record);
    }

    fn three_prong(&mut self, record: &ThreeProngRecord) {
        self.three_prongs.push(record.clone());
    }
}
