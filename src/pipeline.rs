use crate::cluster::{cluster_extent, ClusterExtent};
use crate::config::Config;
use crate::cross_section::CrossSection;
use crate::cut::CutEvaluation;
use crate::error::DataIntegrityError;
use crate::event::{Axis, Charge, Event};
use crate::peak::{find_peaks, AxisPeak};
use crate::profile::ChargeProfile;
use crate::shape::{time_shape, TimeShape};
use serde::Serialize;

/// Everything reconstructed for one axis of an event.
#[derive(Clone, Debug, Serialize)]
pub struct AxisReconstruction<'e, Q> {
    pub axis: Axis,
    pub peak: AxisPeak<Q>,
    pub cross_section: CrossSection<Q>,
    pub cut: CutEvaluation,
    pub cluster: ClusterExtent,
    /// `None` if no strip of the cross-section has positive charge.
    pub profile: Option<ChargeProfile>,
    #[serde(skip)]
    peak_samples: &'e [Q],
}

impl<'e, Q: Charge> AxisReconstruction<'e, Q> {
    /// Whether the neighbour quality cuts accepted the hit.
    pub fn accepted(&self) -> bool {
        self.cut.decision.accepted()
    }
    /// Time shape of the peak strip.
    pub fn time_shape(&self) -> TimeShape<'e, Q> {
        time_shape(self.peak_samples, self.peak.charge, self.peak.time_slice)
    }
}

/// Result of reconstructing one axis of an event.
#[derive(Clone, Debug, Serialize)]
pub enum AxisOutcome<'e, Q> {
    /// The axis has no active strips.
    NoHit,
    /// The peak charge does not pass the threshold of the axis.
    BelowThreshold(AxisPeak<Q>),
    Reconstructed(AxisReconstruction<'e, Q>),
}

impl<Q: Charge> Config<Q> {
    /// Reconstructs the hit on one axis of an event.
    ///
    /// # Errors
    ///
    /// Returns a [`DataIntegrityError`] if the strips of the axis are
    /// inconsistent. Such an error only affects this axis of this event.
    ///
    /// # Examples
    ///
    /// ```
    /// use mmreco::event::{Axis, Event, StripSample, Timestamp};
    /// use mmreco::limits::ProportionLimits;
    /// use mmreco::{AxisOutcome, Config};
    ///
    /// let config = Config::builder()
    ///     .limits(ProportionLimits::new([(0, 100)])?)
    ///     .time_slices(3)
    ///     .build()?;
    /// let event = Event::new(0, Timestamp::default(), vec![
    ///     StripSample::from_samples(5, 40, vec![1i16, 20, 4]),
    ///     StripSample::from_samples(5, 41, vec![0, 8, 2]),
    /// ]);
    ///
    /// let AxisOutcome::Reconstructed(x) = config.reconstruct(&event, Axis::X)? else {
    ///     panic!("expected a hit on the X axis");
    /// };
    /// assert_eq!(x.peak.strip, 40);
    /// assert!(x.accepted());
    /// assert_eq!(x.cluster.size(), 2);
    ///
    /// assert!(matches!(config.reconstruct(&event, Axis::Y)?, AxisOutcome::NoHit));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn reconstruct<'e>(
        &self,
        event: &'e Event<Q>,
        axis: Axis,
    ) -> Result<AxisOutcome<'e, Q>, DataIntegrityError> {
        let peak = find_peaks(event, self.axis_map())[axis];
        self.reconstruct_peak(event, axis, peak)
    }

    /// Same as [`Config::reconstruct`], for a peak already found with
    /// [`find_peaks`].
    pub fn reconstruct_peak<'e>(
        &self,
        event: &'e Event<Q>,
        axis: Axis,
        peak: Option<AxisPeak<Q>>,
    ) -> Result<AxisOutcome<'e, Q>, DataIntegrityError> {
        let Some(peak) = peak else {
            return Ok(AxisOutcome::NoHit);
        };
        if !self.passes_threshold(axis, &peak) {
            return Ok(AxisOutcome::BelowThreshold(peak));
        }

        if let Some((_, sample)) = event
            .axis_strips(self.axis_map(), axis)
            .find(|(_, s)| s.samples.len() != self.time_slices())
        {
            return Err(DataIntegrityError::SampleCountMismatch {
                strip: sample.strip,
                expected: self.time_slices(),
                actual: sample.samples.len(),
            });
        }

        let Some(cross_section) = CrossSection::build(event, self.axis_map(), axis, &peak)? else {
            return Ok(AxisOutcome::NoHit);
        };

        let cut = self.proportion_cut(axis).evaluate(&cross_section);
        let cluster = cluster_extent(&cross_section);
        let profile = ChargeProfile::from_cross_section(&cross_section);
        let peak_samples = event
            .strips()
            .get(peak.index)
            .map_or(&[][..], |sample| sample.samples.as_slice());

        Ok(AxisOutcome::Reconstructed(AxisReconstruction {
            axis,
            peak,
            cross_section,
            cut,
            cluster,
            profile,
            peak_samples,
        }))
    }
}
