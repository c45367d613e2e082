use crate::event::{AxisMap, AxisPair, Charge, Event};
use serde::Serialize;
use uom::si::f64::Time;

/// The strip with the largest charge on one axis of an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AxisPeak<Q> {
    /// Peak charge of the strip.
    pub charge: Q,
    /// Position of the strip in [`Event::strips`].
    pub index: usize,
    /// Absolute strip number.
    pub strip: u32,
    /// Time slice at which the strip reached its peak charge.
    pub time_slice: usize,
    /// Number of active strips on the axis.
    pub hit_count: usize,
}

impl<Q> AxisPeak<Q> {
    /// Time of the peak relative to the start of the readout window.
    ///
    /// # Examples
    ///
    /// ```
    /// use mmreco::peak::AxisPeak;
    /// use uom::si::f64::Time;
    /// use uom::si::time::nanosecond;
    ///
    /// let peak = AxisPeak { charge: 100i16, index: 0, strip: 12, time_slice: 4, hit_count: 1 };
    /// let time = peak.arrival_time(Time::new::<nanosecond>(25.0));
    /// assert_eq!(time.get::<nanosecond>(), 100.0);
    /// ```
    pub fn arrival_time(&self, slice_width: Time) -> Time {
        slice_width * self.time_slice as f64
    }
}

/// Finds the strip with the largest peak charge on each axis.
///
/// Every strip of the event is visited once. On ties the strip that comes
/// first in the event keeps the peak. An axis without any active strip has no
/// peak.
///
/// # Examples
///
/// ```
/// use mmreco::event::{AxisMap, Event, StripSample, Timestamp};
/// use mmreco::peak::find_peaks;
///
/// let event = Event::new(0, Timestamp::default(), vec![
///     StripSample::from_samples(5, 10, vec![1i16, 4, 2]),
///     StripSample::from_samples(5, 11, vec![2, 8, 3]),
/// ]);
/// let peaks = find_peaks(&event, &AxisMap::default());
///
/// let x = peaks.x.unwrap();
/// assert_eq!((x.charge, x.strip, x.time_slice, x.hit_count), (8, 11, 1, 2));
/// assert!(peaks.y.is_none());
/// ```
pub fn find_peaks<Q: Charge>(event: &Event<Q>, map: &AxisMap) -> AxisPair<Option<AxisPeak<Q>>> {
    let mut peaks: AxisPair<Option<AxisPeak<Q>>> = AxisPair::new(None, None);

    for (index, strip) in event.strips().iter().enumerate() {
        let Some(axis) = map.classify(strip.channel) else {
            continue;
        };

        let current = peaks[axis];
        let hit_count = current.map_or(0, |peak| peak.hit_count) + 1;
        peaks[axis] = Some(match current {
            Some(peak) if strip.peak_charge <= peak.charge => AxisPeak { hit_count, ..peak },
            _ => AxisPeak {
                charge: strip.peak_charge,
                index,
                strip: strip.strip,
                time_slice: strip.peak_time_slice,
                hit_count,
            },
        });
    }

    peaks
}
