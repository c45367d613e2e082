use crate::error::DataIntegrityError;
use crate::event::{Axis, AxisPair, Event};
use crate::peak::AxisPeak;
use crate::pipeline::AxisReconstruction;
use crate::Observer;
use serde::Serialize;
use std::marker::PhantomData;

/// Pass/fail tally of a single cut.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CutCounter {
    pub passed: u64,
    pub failed: u64,
}

impl CutCounter {
    pub fn fill(&mut self, cut: bool) {
        if cut {
            self.failed += 1;
        } else {
            self.passed += 1;
        }
    }

    pub fn total(&self) -> u64 {
        self.passed + self.failed
    }
    /// Fraction of tested hits that passed. `None` if nothing was tested.
    pub fn efficiency(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(self.passed as f64 / total as f64),
        }
    }
}

/// Outcome counts of one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AxisStatistics {
    pub no_hit: u64,
    pub below_threshold: u64,
    pub integrity_errors: u64,
    pub reconstructed: u64,
    pub absolute_position: CutCounter,
    /// Only hits that passed the absolute position cut are tested.
    pub proportion: CutCounter,
    pub accepted: u64,
}

impl AxisStatistics {
    /// Fraction of reconstructed hits accepted by the neighbour cuts.
    pub fn acceptance(&self) -> Option<f64> {
        match self.reconstructed {
            0 => None,
            n => Some(self.accepted as f64 / n as f64),
        }
    }
}

/// An [`Observer`] that counts the outcome of every event, including
/// rejections, so that cut efficiencies can be measured.
///
/// # Examples
///
/// ```
/// use mmreco::event::{Axis, Event, StripSample, Timestamp};
/// use mmreco::limits::ProportionLimits;
/// use mmreco::stats::CutStatistics;
/// use mmreco::{Config, Reconstructor};
///
/// let config = Config::builder()
///     .limits(ProportionLimits::new([(10, 100)])?)
///     .time_slices(2)
///     .build()?;
/// let events = vec![Event::new(0, Timestamp::default(), vec![
///     StripSample::from_samples(5, 40, vec![1i16, 20]),
/// ])];
///
/// let stats = Reconstructor::builder()
///     .config(config)
///     .observer(CutStatistics::new())
///     .build()
///     .run(events);
/// assert_eq!(stats.events, 1);
/// assert_eq!(stats.axes[Axis::X].reconstructed, 1);
/// assert_eq!(stats.axes[Axis::Y].no_hit, 1);
/// # Ok::<(), mmreco::ConfigError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CutStatistics<Q> {
    pub events: u64,
    pub axes: AxisPair<AxisStatistics>,
    pub coincidences: u64,
    #[serde(skip)]
    charge: PhantomData<fn() -> Q>,
}

impl<Q> CutStatistics<Q> {
    pub fn new() -> Self {
        Self {
            events: 0,
            axes: AxisPair::default(),
            coincidences: 0,
            charge: PhantomData,
        }
    }
}

impl<Q> Default for CutStatistics<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q> Observer for CutStatistics<Q> {
    type Charge = Q;

    fn on_event(&mut self, _event: &Event<Q>) {
        self.events += 1;
    }

    fn on_no_hit(&mut self, _event: &Event<Q>, axis: Axis) {
        self.axes[axis].no_hit += 1;
    }

    fn on_below_threshold(&mut self, _event: &Event<Q>, axis: Axis, _peak: &AxisPeak<Q>) {
        self.axes[axis].below_threshold += 1;
    }

    fn on_integrity_error(&mut self, _event: &Event<Q>, axis: Axis, _error: &DataIntegrityError) {
        self.axes[axis].integrity_errors += 1;
    }

    fn on_reconstructed(&mut self, _event: &Event<Q>, reconstruction: &AxisReconstruction<'_, Q>) {
        let stats = &mut self.axes[reconstruction.axis];
        let decision = reconstruction.cut.decision;

        stats.reconstructed += 1;
        stats.absolute_position.fill(decision.absolute_position_cut);
        if !decision.absolute_position_cut {
            stats.proportion.fill(decision.proportion_cut);
        }
        if decision.accepted() {
            stats.accepted += 1;
        }
    }

    fn on_coincidence(
        &mut self,
        _event: &Event<Q>,
        _x: &AxisReconstruction<'_, Q>,
        _y: &AxisReconstruction<'_, Q>,
    ) {
        self.coincidences += 1;
    }
}
