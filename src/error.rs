use crate::event::Axis;
use crate::limits::ParseError;
use thiserror::Error;

/// Errors that make a run configuration unusable.
///
/// These are raised while building a [`Config`](crate::Config), before any
/// event is processed.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The proportion limits table has fewer bands than the requested
    /// maximum neighbour distance.
    #[error("proportion limits table has {available} bands, but a maximum distance of {required} was requested")]
    LimitsTooShort { required: usize, available: usize },

    /// A proportion band whose lower bound exceeds its upper bound.
    #[error("proportion band for distance {distance} is inverted: lower bound {lower}% > upper bound {upper}%")]
    InvertedBand {
        distance: usize,
        lower: u32,
        upper: u32,
    },

    /// The proportion limits file could not be parsed.
    #[error("invalid proportion limits file\n{0}")]
    Parse(#[from] ParseError),

    #[error("number of time slices per event must be non-zero")]
    NoTimeSlices,

    #[error("number of strips on the {0} axis must be non-zero")]
    NoStrips(Axis),

    /// The same readout channel is assigned to both axes.
    #[error("channel {0} is mapped to both the X and the Y axis")]
    AmbiguousChannel(u32),
}

/// Errors caused by inconsistent event data.
///
/// A data integrity error only invalidates the axis of the event it was
/// found in; the run carries on with the next axis/event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataIntegrityError {
    /// Two strips on the same axis share an absolute strip number.
    #[error("strip {strip} appears more than once on the {axis} axis")]
    DuplicateStrip { axis: Axis, strip: u32 },

    /// A time slice index outside the recorded time series of a strip.
    #[error("time slice {time_slice} is outside the {len} recorded samples of strip {strip}")]
    TimeSliceOutOfRange {
        strip: u32,
        time_slice: usize,
        len: usize,
    },

    /// A strip whose time series length differs from the configured number of
    /// time slices.
    #[error("strip {strip} has {actual} samples, expected {expected}")]
    SampleCountMismatch {
        strip: u32,
        expected: usize,
        actual: usize,
    },

    /// No strip of the cross-section carries the axis peak charge at the
    /// peak time slice.
    #[error("peak charge is not present in the {0} axis cross-section")]
    PeakNotInCrossSection(Axis),
}
