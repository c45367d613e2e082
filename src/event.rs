use num_traits::{AsPrimitive, PrimInt};
use serde::Serialize;
use std::fmt;
use std::ops::{Index, IndexMut};
use uom::si::f64::Time;
use uom::si::time::{microsecond, second};

/// Integer type used for digitized strip charges.
///
/// Implemented for every primitive integer; the APV readout produces `i16`
/// samples.
pub trait Charge: PrimInt + AsPrimitive<f64> + fmt::Debug {}

impl<T> Charge for T where T: PrimInt + AsPrimitive<f64> + fmt::Debug {}

/// One of the two orthogonal readout directions of the detector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::X, Axis::Y];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "X"),
            Axis::Y => write!(f, "Y"),
        }
    }
}

/// A value for each [`Axis`].
///
/// # Examples
///
/// ```
/// use mmreco::event::{Axis, AxisPair};
///
/// let mut hits = AxisPair::splat(0);
/// hits[Axis::Y] += 3;
/// assert_eq!(hits.x, 0);
/// assert_eq!(hits.y, 3);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AxisPair<T> {
    pub x: T,
    pub y: T,
}

impl<T> AxisPair<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    pub fn splat(value: T) -> Self
    where
        T: Clone,
    {
        Self {
            x: value.clone(),
            y: value,
        }
    }
}

impl<T> Index<Axis> for AxisPair<T> {
    type Output = T;

    fn index(&self, axis: Axis) -> &T {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }
}

impl<T> IndexMut<Axis> for AxisPair<T> {
    fn index_mut(&mut self, axis: Axis) -> &mut T {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        }
    }
}

/// Assignment of readout channels (APV chip ids) to axes.
///
/// The default mapping is the one used while acquiring data with the
/// laboratory setup: APVs 4, 5 and 6 read the X strips, APVs 0, 1 and 2 the
/// Y strips.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AxisMap {
    channels: AxisPair<Vec<u32>>,
}

impl AxisMap {
    /// Creates a mapping from the channel ids of each axis.
    ///
    /// Validity (no channel on both axes) is checked when the mapping is
    /// handed to [`Config`](crate::Config).
    pub fn new(x: impl IntoIterator<Item = u32>, y: impl IntoIterator<Item = u32>) -> Self {
        Self {
            channels: AxisPair::new(x.into_iter().collect(), y.into_iter().collect()),
        }
    }
    /// Returns the axis read out by `channel`, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use mmreco::event::{Axis, AxisMap};
    ///
    /// let map = AxisMap::default();
    /// assert_eq!(map.classify(5), Some(Axis::X));
    /// assert_eq!(map.classify(1), Some(Axis::Y));
    /// assert_eq!(map.classify(3), None);
    /// ```
    pub fn classify(&self, channel: u32) -> Option<Axis> {
        Axis::ALL
            .into_iter()
            .find(|&axis| self.channels[axis].contains(&channel))
    }

    pub fn channels(&self, axis: Axis) -> &[u32] {
        &self.channels[axis]
    }
}

impl Default for AxisMap {
    fn default() -> Self {
        Self::new([5, 4, 6], [0, 1, 2])
    }
}

/// The recorded signal of a single strip in one event.
///
/// Strips that measured no charge are zero suppressed by the acquisition, so
/// an [`Event`] only contains the active strips and their absolute strip
/// numbers have gaps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StripSample<Q> {
    /// Id of the readout chip that digitized this strip.
    pub channel: u32,
    /// Absolute strip number along its axis (starting at 1).
    pub strip: u32,
    /// Charge of every time slice.
    pub samples: Vec<Q>,
    /// Maximum charge over all time slices, as reported by the acquisition.
    pub peak_charge: Q,
    /// Time slice of `peak_charge`.
    pub peak_time_slice: usize,
}

impl<Q: Charge> StripSample<Q> {
    /// Creates a strip sample, deriving the peak charge and its time slice
    /// from the time series. The earliest maximum wins.
    ///
    /// # Examples
    ///
    /// ```
    /// use mmreco::event::StripSample;
    ///
    /// let sample = StripSample::from_samples(5, 42, vec![1i16, 7, 3, 7]);
    /// assert_eq!(sample.peak_charge, 7);
    /// assert_eq!(sample.peak_time_slice, 1);
    /// ```
    pub fn from_samples(channel: u32, strip: u32, samples: Vec<Q>) -> Self {
        let mut peak_charge = Q::zero();
        let mut peak_time_slice = 0;
        for (t, &charge) in samples.iter().enumerate() {
            if t == 0 || charge > peak_charge {
                peak_charge = charge;
                peak_time_slice = t;
            }
        }

        Self {
            channel,
            strip,
            samples,
            peak_charge,
            peak_time_slice,
        }
    }
}

/// Acquisition time of an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub microseconds: u32,
}

impl Timestamp {
    pub fn new(seconds: i64, microseconds: u32) -> Self {
        Self {
            seconds,
            microseconds,
        }
    }

    pub fn to_time(self) -> Time {
        Time::new::<second>(self.seconds as f64)
            + Time::new::<microsecond>(f64::from(self.microseconds))
    }
}

/// A single triggered readout of the detector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Event<Q> {
    number: u64,
    timestamp: Timestamp,
    strips: Vec<StripSample<Q>>,
}

impl<Q> Event<Q> {
    pub fn new(number: u64, timestamp: Timestamp, strips: Vec<StripSample<Q>>) -> Self {
        Self {
            number,
            timestamp,
            strips,
        }
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Active strips in acquisition order.
    pub fn strips(&self) -> &[StripSample<Q>] {
        &self.strips
    }

    /// Active strips read out by `axis`, together with their position in
    /// [`Event::strips`].
    pub fn axis_strips<'a>(
        &'a self,
        map: &'a AxisMap,
        axis: Axis,
    ) -> impl Iterator<Item = (usize, &'a StripSample<Q>)> + 'a {
        self.strips
            .iter()
            .enumerate()
            .filter(move |(_, s)| map.classify(s.channel) == Some(axis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_map_default_channels() {
        let map = AxisMap::default();
        for channel in [4, 5, 6] {
            assert_eq!(map.classify(channel), Some(Axis::X));
        }
        for channel in [0, 1, 2] {
            assert_eq!(map.classify(channel), Some(Axis::Y));
        }
        assert_eq!(map.classify(3), None);
        assert_eq!(map.classify(7), None);
    }

    #[test]
    fn axis_map_custom() {
        let map = AxisMap::new([10], [11, 12]);
        assert_eq!(map.classify(10), Some(Axis::X));
        assert_eq!(map.classify(12), Some(Axis::Y));
        assert_eq!(map.classify(5), None);
        assert_eq!(map.channels(Axis::Y), &[11, 12]);
    }

    #[test]
    fn strip_sample_first_maximum() {
        let sample = StripSample::from_samples(0, 1, vec![3i16, 9, 9, 2]);
        assert_eq!(sample.peak_charge, 9);
        assert_eq!(sample.peak_time_slice, 1);

        let negative = StripSample::from_samples(0, 1, vec![-4i16, -2, -3]);
        assert_eq!(negative.peak_charge, -2);
        assert_eq!(negative.peak_time_slice, 1);

        let empty = StripSample::<i16>::from_samples(0, 1, Vec::new());
        assert_eq!(empty.peak_charge, 0);
        assert_eq!(empty.peak_time_slice, 0);
    }

    #[test]
    fn event_axis_strips() {
        let event = Event::new(
            0,
            Timestamp::default(),
            vec![
                StripSample::from_samples(5, 10, vec![1i16]),
                StripSample::from_samples(0, 20, vec![2]),
                StripSample::from_samples(3, 30, vec![3]),
                StripSample::from_samples(4, 11, vec![4]),
            ],
        );
        let map = AxisMap::default();

        let x: Vec<_> = event
            .axis_strips(&map, Axis::X)
            .map(|(i, s)| (i, s.strip))
            .collect();
        assert_eq!(x, vec![(0, 10), (3, 11)]);

        let y: Vec<_> = event
            .axis_strips(&map, Axis::Y)
            .map(|(i, s)| (i, s.strip))
            .collect();
        assert_eq!(y, vec![(1, 20)]);
    }

    #[test]
    fn timestamp_to_time() {
        let time = Timestamp::new(2, 500_000).to_time();
        assert!((time.get::<microsecond>() - 2_500_000.0).abs() < 1e-6);
    }
}
