use crate::event::{Axis, AxisPair, Charge, Event};
use crate::peak::{find_peaks, AxisPeak};
use bon::bon;
use tracing::{debug, info, warn};

pub use crate::config::Config;
pub use crate::error::{ConfigError, DataIntegrityError};
pub use crate::pipeline::{AxisOutcome, AxisReconstruction};

/// Contiguous strip run around the peak.
pub mod cluster;
/// Run configuration.
pub mod config;
/// Strip charges at the peak time slice.
pub mod cross_section;
/// Neighbour-proportion quality cut.
pub mod cut;
mod error;
/// Detector readout data.
pub mod event;
/// Proportion limits tables and their file format.
pub mod limits;
/// Search for the strip with the largest charge.
pub mod peak;
mod pipeline;
/// Charge-weighted position and width of a hit.
pub mod profile;
/// Signal shape over time of the peak strip.
pub mod shape;
/// Outcome and cut counting.
pub mod stats;

/// A trait that defines the interface for a consumer of reconstruction
/// results.
///
/// Every event produces exactly one outcome callback per axis, so rejected
/// and skipped hits are visible to the observer as well. The default
/// implementation of all methods is a no-op. Users are expected to override
/// the methods they are interested in.
#[allow(unused_variables)]
pub trait Observer {
    type Charge;

    /// Called before an event is reconstructed.
    fn on_event(&mut self, event: &Event<Self::Charge>) {}
    /// Called when an axis has no active strips.
    fn on_no_hit(&mut self, event: &Event<Self::Charge>, axis: Axis) {}
    /// Called when the peak of an axis does not pass the charge threshold.
    fn on_below_threshold(
        &mut self,
        event: &Event<Self::Charge>,
        axis: Axis,
        peak: &AxisPeak<Self::Charge>,
    ) {
    }
    /// Called when an axis is skipped because of inconsistent data.
    fn on_integrity_error(
        &mut self,
        event: &Event<Self::Charge>,
        axis: Axis,
        error: &DataIntegrityError,
    ) {
    }
    /// Called for every reconstructed axis, whether it passed the neighbour
    /// cuts or not.
    fn on_reconstructed(
        &mut self,
        event: &Event<Self::Charge>,
        reconstruction: &AxisReconstruction<'_, Self::Charge>,
    ) {
    }
    /// Called when both axes were reconstructed and their peaks are within
    /// the coincidence window.
    fn on_coincidence(
        &mut self,
        event: &Event<Self::Charge>,
        x: &AxisReconstruction<'_, Self::Charge>,
        y: &AxisReconstruction<'_, Self::Charge>,
    ) {
    }
}

impl<A, B> Observer for (A, B)
where
    A: Observer,
    B: Observer<Charge = A::Charge>,
{
    type Charge = A::Charge;

    fn on_event(&mut self, event: &Event<Self::Charge>) {
        self.0.on_event(event);
        self.1.on_event(event);
    }

    fn on_no_hit(&mut self, event: &Event<Self::Charge>, axis: Axis) {
        self.0.on_no_hit(event, axis);
        self.1.on_no_hit(event, axis);
    }

    fn on_below_threshold(
        &mut self,
        event: &Event<Self::Charge>,
        axis: Axis,
        peak: &AxisPeak<Self::Charge>,
    ) {
        self.0.on_below_threshold(event, axis, peak);
        self.1.on_below_threshold(event, axis, peak);
    }

    fn on_integrity_error(
        &mut self,
        event: &Event<Self::Charge>,
        axis: Axis,
        error: &DataIntegrityError,
    ) {
        self.0.on_integrity_error(event, axis, error);
        self.1.on_integrity_error(event, axis, error);
    }

    fn on_reconstructed(
        &mut self,
        event: &Event<Self::Charge>,
        reconstruction: &AxisReconstruction<'_, Self::Charge>,
    ) {
        self.0.on_reconstructed(event, reconstruction);
        self.1.on_reconstructed(event, reconstruction);
    }

    fn on_coincidence(
        &mut self,
        event: &Event<Self::Charge>,
        x: &AxisReconstruction<'_, Self::Charge>,
        y: &AxisReconstruction<'_, Self::Charge>,
    ) {
        self.0.on_coincidence(event, x, y);
        self.1.on_coincidence(event, x, y);
    }
}

/// Event loop of a reconstruction run.
pub struct Reconstructor<Q, O> {
    config: Config<Q>,
    observer: O,
    max_events: Option<usize>,
}

#[bon]
impl<Q, O> Reconstructor<Q, O> {
    #[builder]
    pub fn new(
        config: Config<Q>,
        observer: O,
        /// Stop after this many events.
        max_events: Option<usize>,
    ) -> Self {
        Self {
            config,
            observer,
            max_events,
        }
    }
}

impl<Q, O> Reconstructor<Q, O>
where
    Q: Charge,
    O: Observer<Charge = Q>,
{
    /// Reconstruct every event until the source is exhausted or the event
    /// limit is reached, and hand back the observer.
    pub fn run<I>(mut self, events: I) -> O
    where
        I: IntoIterator<Item = Event<Q>>,
    {
        let events = events.into_iter();
        let limit = self.max_events.unwrap_or(usize::MAX);
        let total = events.size_hint().1.map(|n| n.min(limit));
        info!(total = ?total, "reconstructing events");

        let step = total.map(|n| (n / 100).max(1));
        let mut processed = 0;
        for event in events.take(limit) {
            if let (Some(total), Some(step)) = (total, step) {
                if processed % step == 0 {
                    debug!(processed, total, "{}% done", processed * 100 / total.max(1));
                }
            }
            self.process(&event);
            processed += 1;
        }
        info!(processed, "reconstruction done");

        self.observer
    }

    fn process(&mut self, event: &Event<Q>) {
        self.observer.on_event(event);

        let peaks = find_peaks(event, self.config.axis_map());
        let mut reconstructed = AxisPair::new(None, None);
        for axis in Axis::ALL {
            match self.config.reconstruct_peak(event, axis, peaks[axis]) {
                Ok(AxisOutcome::NoHit) => {
                    debug!(event = event.number(), %axis, "no hit");
                    self.observer.on_no_hit(event, axis);
                }
                Ok(AxisOutcome::BelowThreshold(peak)) => {
                    debug!(
                        event = event.number(),
                        %axis,
                        charge = ?peak.charge,
                        "peak below threshold"
                    );
                    self.observer.on_below_threshold(event, axis, &peak);
                }
                Ok(AxisOutcome::Reconstructed(reconstruction)) => {
                    self.observer.on_reconstructed(event, &reconstruction);
                    reconstructed[axis] = Some(reconstruction);
                }
                Err(error) => {
                    warn!(event = event.number(), %axis, %error, "skipping axis");
                    self.observer.on_integrity_error(event, axis, &error);
                }
            }
        }

        if let AxisPair {
            x: Some(x),
            y: Some(y),
        } = &reconstructed
        {
            if self.config.coincident(&x.peak, &y.peak) {
                self.observer.on_coincidence(event, x, y);
            }
        }
    }
}
