use crate::error::ConfigError;
use crate::event::{Axis, AxisMap, AxisPair, Charge};
use crate::limits::ProportionLimits;
use crate::peak::AxisPeak;
use bon::bon;
use uom::si::f64::Time;
use uom::si::time::nanosecond;

/// Number of strips per axis of the laboratory detector.
pub const DEFAULT_STRIPS: u32 = 360;
/// Number of time slices recorded per event.
pub const DEFAULT_TIME_SLICES: usize = 27;
/// Width of a time slice in nanoseconds.
pub const DEFAULT_SLICE_WIDTH_NS: f64 = 25.0;

/// Read-only settings of a reconstruction run.
///
/// A [`Config`] is validated when it is built; an invalid configuration
/// never reaches the event loop.
///
/// # Examples
///
/// ```
/// use mmreco::event::AxisPair;
/// use mmreco::limits::ProportionLimits;
/// use mmreco::Config;
///
/// let config = Config::builder()
///     .limits(ProportionLimits::new([(10, 90), (0, 60)])?)
///     .min_charge(AxisPair::splat(20i16))
///     .build()?;
/// assert_eq!(config.max_distance(), 2);
/// assert_eq!(config.time_slices(), 27);
/// # Ok::<(), mmreco::ConfigError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Config<Q> {
    axis_map: AxisMap,
    strips: AxisPair<u32>,
    time_slices: usize,
    min_charge: AxisPair<Q>,
    limits: ProportionLimits,
    max_distance: usize,
    coincidence_window: usize,
    slice_width: Time,
}

#[bon]
impl<Q: Charge> Config<Q> {
    #[builder]
    pub fn new(
        /// Acceptable neighbour charge proportions.
        limits: ProportionLimits,
        /// Channel to axis assignment. Defaults to [`AxisMap::default`].
        axis_map: Option<AxisMap>,
        /// Number of strips of each axis.
        strips: Option<AxisPair<u32>>,
        /// Number of time slices of every strip.
        time_slices: Option<usize>,
        /// An axis is only reconstructed if its peak charge is strictly larger
        /// than this threshold. Defaults to zero.
        min_charge: Option<AxisPair<Q>>,
        /// Largest neighbour distance tested by the proportion cut. Defaults
        /// to the length of `limits`.
        max_distance: Option<usize>,
        /// Largest difference in peak time slices for the X and Y peaks to
        /// count as one hit.
        coincidence_window: Option<usize>,
        /// Duration of one time slice.
        slice_width: Option<Time>,
    ) -> Result<Self, ConfigError> {
        let axis_map = axis_map.unwrap_or_default();
        if let Some(&channel) = axis_map
            .channels(Axis::X)
            .iter()
            .find(|channel| axis_map.channels(Axis::Y).contains(channel))
        {
            return Err(ConfigError::AmbiguousChannel(channel));
        }

        let strips = strips.unwrap_or(AxisPair::splat(DEFAULT_STRIPS));
        if let Some(axis) = Axis::ALL.into_iter().find(|&axis| strips[axis] == 0) {
            return Err(ConfigError::NoStrips(axis));
        }

        let time_slices = time_slices.unwrap_or(DEFAULT_TIME_SLICES);
        if time_slices == 0 {
            return Err(ConfigError::NoTimeSlices);
        }

        let max_distance = max_distance.unwrap_or(limits.len());
        if max_distance > limits.len() {
            return Err(ConfigError::LimitsTooShort {
                required: max_distance,
                available: limits.len(),
            });
        }

        Ok(Self {
            axis_map,
            strips,
            time_slices,
            min_charge: min_charge.unwrap_or(AxisPair::splat(Q::zero())),
            limits,
            max_distance,
            coincidence_window: coincidence_window.unwrap_or(1),
            slice_width: slice_width.unwrap_or(Time::new::<nanosecond>(DEFAULT_SLICE_WIDTH_NS)),
        })
    }
}

impl<Q: Charge> Config<Q> {
    /// Returns `true` if the peak is strictly above the charge threshold of
    /// its axis. A peak without positive charge never passes.
    pub fn passes_threshold(&self, axis: Axis, peak: &AxisPeak<Q>) -> bool {
        peak.charge > self.min_charge[axis] && peak.charge > Q::zero()
    }
}

impl<Q> Config<Q> {
    pub fn axis_map(&self) -> &AxisMap {
        &self.axis_map
    }

    pub fn strips(&self, axis: Axis) -> u32 {
        self.strips[axis]
    }

    pub fn time_slices(&self) -> usize {
        self.time_slices
    }

    pub fn min_charge(&self, axis: Axis) -> &Q {
        &self.min_charge[axis]
    }

    pub fn limits(&self) -> &ProportionLimits {
        &self.limits
    }

    pub fn max_distance(&self) -> usize {
        self.max_distance
    }

    pub fn coincidence_window(&self) -> usize {
        self.coincidence_window
    }

    pub fn slice_width(&self) -> Time {
        self.slice_width
    }
    /// Returns `true` if an X and a Y peak are close enough in time to
    /// belong to the same particle.
    pub fn coincident<T>(&self, x: &AxisPeak<T>, y: &AxisPeak<T>) -> bool {
        x.time_slice.abs_diff(y.time_slice) <= self.coincidence_window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> ProportionLimits {
        ProportionLimits::new([(10, 200), (0, 100)]).unwrap()
    }

    fn peak(charge: i16, time_slice: usize) -> AxisPeak<i16> {
        AxisPeak {
            charge,
            index: 0,
            strip: 1,
            time_slice,
            hit_count: 1,
        }
    }

    #[test]
    fn config_defaults() {
        let config = Config::<i16>::builder().limits(limits()).build().unwrap();
        assert_eq!(config.axis_map(), &AxisMap::default());
        assert_eq!(config.strips(Axis::X), 360);
        assert_eq!(config.strips(Axis::Y), 360);
        assert_eq!(config.time_slices(), 27);
        assert_eq!(*config.min_charge(Axis::X), 0);
        assert_eq!(config.max_distance(), 2);
        assert_eq!(config.coincidence_window(), 1);
        assert_eq!(config.slice_width().get::<nanosecond>(), 25.0);
    }

    #[test]
    fn config_limits_too_short() {
        let error = Config::<i16>::builder()
            .limits(limits())
            .max_distance(3)
            .build()
            .unwrap_err();
        assert!(matches!(
            error,
            ConfigError::LimitsTooShort {
                required: 3,
                available: 2
            }
        ));
    }

    #[test]
    fn config_shorter_max_distance() {
        let config = Config::<i16>::builder()
            .limits(limits())
            .max_distance(1)
            .build()
            .unwrap();
        assert_eq!(config.max_distance(), 1);
    }

    #[test]
    fn config_ambiguous_channel() {
        let error = Config::<i16>::builder()
            .limits(limits())
            .axis_map(AxisMap::new([1, 2], [2, 3]))
            .build()
            .unwrap_err();
        assert!(matches!(error, ConfigError::AmbiguousChannel(2)));
    }

    #[test]
    fn config_zero_sizes() {
        assert!(matches!(
            Config::<i16>::builder()
                .limits(limits())
                .time_slices(0)
                .build(),
            Err(ConfigError::NoTimeSlices)
        ));
        assert!(matches!(
            Config::<i16>::builder()
                .limits(limits())
                .strips(AxisPair::new(360, 0))
                .build(),
            Err(ConfigError::NoStrips(Axis::Y))
        ));
    }

    #[test]
    fn config_threshold() {
        let config = Config::builder()
            .limits(limits())
            .min_charge(AxisPair::new(10i16, -5))
            .build()
            .unwrap();
        assert!(!config.passes_threshold(Axis::X, &peak(10, 0)));
        assert!(config.passes_threshold(Axis::X, &peak(11, 0)));
        // A misconfigured negative threshold still rejects an empty peak.
        assert!(!config.passes_threshold(Axis::Y, &peak(0, 0)));
        assert!(config.passes_threshold(Axis::Y, &peak(1, 0)));
    }

    #[test]
    fn config_coincidence() {
        let config = Config::<i16>::builder().limits(limits()).build().unwrap();
        assert!(config.coincident(&peak(5, 10), &peak(5, 11)));
        assert!(config.coincident(&peak(5, 11), &peak(5, 10)));
        assert!(!config.coincident(&peak(5, 10), &peak(5, 12)));
    }
}
