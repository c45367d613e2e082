use crate::cross_section::CrossSection;
use serde::Serialize;

/// Run of consecutive strip numbers around the peak strip, in strip offsets
/// relative to the peak.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ClusterExtent {
    /// Offset of the first strip of the run (never positive).
    pub start: i64,
    /// Offset of the last strip of the run (never negative).
    pub end: i64,
}

impl ClusterExtent {
    /// Number of strips in the cluster, peak strip included.
    pub fn size(&self) -> usize {
        (self.end - self.start + 1) as usize
    }
}

/// Measures the cluster around the peak of a cross-section.
///
/// Starting at the peak strip the cluster grows one strip at a time in each
/// direction, as long as the next entry carries the next strip number. Each
/// direction stops independently at the first gap in the strip numbering or
/// at the end of the cross-section. Charges are not looked at.
///
/// # Examples
///
/// ```
/// use mmreco::cluster::cluster_extent;
/// use mmreco::cross_section::{CrossSection, StripCharge};
/// use mmreco::event::Axis;
///
/// let section = CrossSection::from_sorted(Axis::Y, vec![
///     StripCharge { strip: 3, charge: 1i16 },
///     StripCharge { strip: 5, charge: 4 },
///     StripCharge { strip: 6, charge: 9 },
///     StripCharge { strip: 7, charge: 2 },
/// ], 2).unwrap();
///
/// let extent = cluster_extent(&section);
/// assert_eq!((extent.start, extent.end), (-1, 1));
/// assert_eq!(extent.size(), 3);
/// ```
pub fn cluster_extent<Q>(section: &CrossSection<Q>) -> ClusterExtent {
    let entries = section.entries();
    let position = section.peak_position();
    let peak_strip = i64::from(entries[position].strip);

    let right = entries[position + 1..]
        .iter()
        .zip(1i64..)
        .take_while(|(entry, step)| i64::from(entry.strip) == peak_strip + step)
        .count();
    let left = entries[..position]
        .iter()
        .rev()
        .zip(1i64..)
        .take_while(|(entry, step)| i64::from(entry.strip) == peak_strip - step)
        .count();

    ClusterExtent {
        start: -(left as i64),
        end: right as i64,
    }
}
