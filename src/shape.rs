use crate::event::Charge;
use serde::Serialize;
use std::iter::Enumerate;
use std::slice::Iter;

/// Charge of the peak strip at one time slice, relative to its peak.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TimeShapeSample {
    /// Time slice relative to the peak time slice.
    pub offset: i64,
    /// Charge in percent of the peak charge.
    pub percent: f64,
}

/// Iterator over the time shape of a strip signal.
///
/// Created by [`time_shape`].
#[derive(Clone, Debug)]
pub struct TimeShape<'a, Q> {
    samples: Enumerate<Iter<'a, Q>>,
    peak_charge: f64,
    peak_time_slice: usize,
}

/// Expresses every sample of a strip, except the one at the peak time slice,
/// in percent of the peak charge.
///
/// The samples are produced lazily in time order. `peak_charge` must be
/// positive for the percentages to be finite.
///
/// # Examples
///
/// ```
/// use mmreco::shape::time_shape;
///
/// let shape: Vec<_> = time_shape(&[10i16, 40, 20], 40, 1)
///     .map(|s| (s.offset, s.percent))
///     .collect();
/// assert_eq!(shape, vec![(-1, 25.0), (1, 50.0)]);
/// ```
pub fn time_shape<Q: Charge>(
    samples: &[Q],
    peak_charge: Q,
    peak_time_slice: usize,
) -> TimeShape<'_, Q> {
    TimeShape {
        samples: samples.iter().enumerate(),
        peak_charge: peak_charge.as_(),
        peak_time_slice,
    }
}

impl<Q: Charge> Iterator for TimeShape<'_, Q> {
    type Item = TimeShapeSample;

    fn next(&mut self) -> Option<Self::Item> {
        let peak_time_slice = self.peak_time_slice;
        let (t, &charge) = self.samples.find(|(t, _)| *t != peak_time_slice)?;
        let charge: f64 = charge.as_();

        Some(TimeShapeSample {
            offset: t as i64 - peak_time_slice as i64,
            percent: 100.0 * charge / self.peak_charge,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_shape_skips_peak() {
        let samples = [0i16, 5, 20, 10, 0];
        let shape: Vec<_> = time_shape(&samples, 20, 2).collect();

        assert_eq!(shape.len(), samples.len() - 1);
        assert_eq!(
            shape.iter().map(|s| s.offset).collect::<Vec<_>>(),
            vec![-2, -1, 1, 2]
        );
        assert_eq!(
            shape.iter().map(|s| s.percent).collect::<Vec<_>>(),
            vec![0.0, 25.0, 50.0, 0.0]
        );
    }

    #[test]
    fn time_shape_peak_at_edges() {
        let first: Vec<_> = time_shape(&[8i32, 4, 2], 8, 0).map(|s| s.offset).collect();
        assert_eq!(first, vec![1, 2]);

        let last: Vec<_> = time_shape(&[2i32, 4, 8], 8, 2).map(|s| s.offset).collect();
        assert_eq!(last, vec![-2, -1]);
    }

    #[test]
    fn time_shape_is_lazy() {
        let samples = [1i16, 2, 4, 3];
        let mut shape = time_shape(&samples, 4, 2);
        assert_eq!(shape.next().map(|s| s.offset), Some(-2));
        assert_eq!(shape.next().map(|s| s.offset), Some(-1));
        assert_eq!(shape.next().map(|s| s.offset), Some(1));
        assert_eq!(shape.next(), None);
    }
}
