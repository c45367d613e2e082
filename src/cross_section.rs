use crate::error::DataIntegrityError;
use crate::event::{Axis, AxisMap, Charge, Event};
use crate::peak::AxisPeak;
use serde::Serialize;

/// Charge of one strip at a fixed time slice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StripCharge<Q> {
    pub strip: u32,
    pub charge: Q,
}

/// Charges of all active strips of one axis at the time slice of the axis
/// peak, ordered by absolute strip number.
///
/// Because of zero suppression the strip numbers may have gaps; positions in
/// the cross-section are not strip numbers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CrossSection<Q> {
    axis: Axis,
    entries: Vec<StripCharge<Q>>,
    peak_position: usize,
}

impl<Q: Charge> CrossSection<Q> {
    /// Builds the cross-section of `axis` at the time slice of `peak`.
    ///
    /// The position of the peak is searched again after sorting: it is the
    /// first entry whose charge equals the peak charge. Returns `Ok(None)` if
    /// the axis has no active strips.
    ///
    /// # Errors
    ///
    /// Returns a [`DataIntegrityError`] if two strips of the axis share a
    /// strip number, if the peak time slice is outside the time series of a
    /// strip, or if no strip carries the peak charge.
    ///
    /// # Examples
    ///
    /// ```
    /// use mmreco::cross_section::CrossSection;
    /// use mmreco::event::{Axis, AxisMap, Event, StripSample, Timestamp};
    /// use mmreco::peak::find_peaks;
    ///
    /// let event = Event::new(0, Timestamp::default(), vec![
    ///     StripSample::from_samples(5, 12, vec![0i16, 9, 1]),
    ///     StripSample::from_samples(5, 10, vec![0, 3, 2]),
    /// ]);
    /// let map = AxisMap::default();
    /// let peak = find_peaks(&event, &map).x.unwrap();
    ///
    /// let section = CrossSection::build(&event, &map, Axis::X, &peak)?.unwrap();
    /// let strips: Vec<_> = section.entries().iter().map(|e| e.strip).collect();
    /// assert_eq!(strips, vec![10, 12]);
    /// assert_eq!(section.peak_position(), 1);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn build(
        event: &Event<Q>,
        map: &AxisMap,
        axis: Axis,
        peak: &AxisPeak<Q>,
    ) -> Result<Option<Self>, DataIntegrityError> {
        let mut entries = event
            .axis_strips(map, axis)
            .map(|(_, sample)| {
                sample
                    .samples
                    .get(peak.time_slice)
                    .map(|&charge| StripCharge {
                        strip: sample.strip,
                        charge,
                    })
                    .ok_or(DataIntegrityError::TimeSliceOutOfRange {
                        strip: sample.strip,
                        time_slice: peak.time_slice,
                        len: sample.samples.len(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if entries.is_empty() {
            return Ok(None);
        }

        entries.sort_by_key(|entry| entry.strip);
        if let Some(pair) = entries.windows(2).find(|w| w[0].strip == w[1].strip) {
            return Err(DataIntegrityError::DuplicateStrip {
                axis,
                strip: pair[0].strip,
            });
        }

        let peak_position = entries
            .iter()
            .position(|entry| entry.charge == peak.charge)
            .ok_or(DataIntegrityError::PeakNotInCrossSection(axis))?;

        Ok(Some(Self {
            axis,
            entries,
            peak_position,
        }))
    }

    /// Creates a cross-section from entries already sorted by strip number.
    ///
    /// Returns `None` if the entries are not strictly increasing in strip
    /// number or `peak_position` is out of bounds.
    pub fn from_sorted(
        axis: Axis,
        entries: Vec<StripCharge<Q>>,
        peak_position: usize,
    ) -> Option<Self> {
        let increasing = entries.windows(2).all(|w| w[0].strip < w[1].strip);
        (increasing && peak_position < entries.len()).then_some(Self {
            axis,
            entries,
            peak_position,
        })
    }

    /// Looks up the entry of an absolute strip number.
    pub fn find(&self, strip: u32) -> Option<&StripCharge<Q>> {
        self.entries
            .binary_search_by_key(&strip, |entry| entry.strip)
            .ok()
            .map(|i| &self.entries[i])
    }
}

impl<Q> CrossSection<Q> {
    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn entries(&self) -> &[StripCharge<Q>] {
        &self.entries
    }

    /// Position of the peak strip in [`CrossSection::entries`].
    pub fn peak_position(&self) -> usize {
        self.peak_position
    }

    pub fn peak(&self) -> &StripCharge<Q> {
        &self.entries[self.peak_position]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
