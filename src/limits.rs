use crate::error::ConfigError;
use serde::Serialize;
use std::fmt;
use winnow::ascii::{dec_uint, line_ending, space0, space1};
use winnow::combinator::{delimited, opt, separated, separated_pair, terminated};
use winnow::error::ContextError;
use winnow::Parser;

/// Acceptable range of a neighbour strip charge, in percent of the peak
/// charge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ProportionBand {
    pub lower: u32,
    pub upper: u32,
}

impl ProportionBand {
    pub fn new(lower: u32, upper: u32) -> Self {
        Self { lower, upper }
    }
    /// Returns `true` if `proportion` (in percent) lies within the band,
    /// bounds included.
    pub fn contains(&self, proportion: f64) -> bool {
        proportion >= f64::from(self.lower) && proportion <= f64::from(self.upper)
    }
    /// A band with a non-zero lower bound expects the neighbour strip to have
    /// measured some charge.
    pub fn requires_signal(&self) -> bool {
        self.lower > 0
    }
}

impl From<(u32, u32)> for ProportionBand {
    fn from((lower, upper): (u32, u32)) -> Self {
        Self { lower, upper }
    }
}

/// Acceptable neighbour charge proportions, one [`ProportionBand`] per
/// distance (in strips) from the peak strip.
///
/// The first band applies to the direct neighbours of the peak strip, the
/// second one to the strips two positions away, and so on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProportionLimits {
    bands: Vec<ProportionBand>,
}

impl ProportionLimits {
    /// Creates a limits table, ordered by distance from the peak strip.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvertedBand`] if a band has a lower bound
    /// larger than its upper bound.
    ///
    /// # Examples
    ///
    /// ```
    /// use mmreco::limits::{ProportionBand, ProportionLimits};
    ///
    /// let limits = ProportionLimits::new([(10, 90), (0, 60)])?;
    /// assert_eq!(limits.band(1), Some(&ProportionBand::new(10, 90)));
    /// assert_eq!(limits.band(3), None);
    ///
    /// assert!(ProportionLimits::new([(50, 20)]).is_err());
    /// # Ok::<(), mmreco::ConfigError>(())
    /// ```
    pub fn new<B>(bands: impl IntoIterator<Item = B>) -> Result<Self, ConfigError>
    where
        B: Into<ProportionBand>,
    {
        let bands: Vec<ProportionBand> = bands.into_iter().map(Into::into).collect();
        if let Some((i, band)) = bands.iter().enumerate().find(|(_, b)| b.lower > b.upper) {
            return Err(ConfigError::InvertedBand {
                distance: i + 1,
                lower: band.lower,
                upper: band.upper,
            });
        }

        Ok(Self { bands })
    }
    /// Returns the band for a distance from the peak strip. Distances start
    /// at 1.
    pub fn band(&self, distance: usize) -> Option<&ProportionBand> {
        distance.checked_sub(1).and_then(|i| self.bands.get(i))
    }

    pub fn bands(&self) -> &[ProportionBand] {
        &self.bands
    }
    /// Largest distance covered by the table.
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

impl fmt::Display for ProportionLimits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .bands
            .iter()
            .map(|band| format!("{} {}", band.lower, band.upper))
            .collect::<Vec<_>>()
            .join("\n");

        write!(f, "{text}")
    }
}

fn parse_band(input: &mut &str) -> winnow::Result<(u32, u32)> {
    delimited(space0, separated_pair(dec_uint, space1, dec_uint), space0).parse_next(input)
}

/// The error type returned when parsing a [`ProportionLimits`] file fails.
#[derive(Debug)]
pub struct ParseError {
    input: String,
    span: std::ops::Range<usize>,
}

impl ParseError {
    fn from_parse(error: winnow::error::ParseError<&str, ContextError>) -> Self {
        let input = error.input().to_string();
        let span = error.char_span();
        Self { input, span }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = annotate_snippets::Level::Error
            .title("expected `<lower> <upper>` here")
            .snippet(
                annotate_snippets::Snippet::source(&self.input)
                    .fold(true)
                    .annotation(annotate_snippets::Level::Error.span(self.span.clone())),
            );
        let renderer = annotate_snippets::Renderer::plain();
        let rendered = renderer.render(message);
        rendered.fmt(f)
    }
}

impl std::error::Error for ParseError {}

impl std::str::FromStr for ProportionLimits {
    type Err = ConfigError;

    /// Parse a limits table from its file format: one `<lower> <upper>` line
    /// per distance from the peak strip, bounds in integer percent. Lines may
    /// end in `\n` or `\r\n`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mmreco::limits::ProportionLimits;
    ///
    /// let limits: ProportionLimits = "20 90\n0 70\n".parse()?;
    /// assert_eq!(limits.len(), 2);
    /// assert_eq!(limits.to_string(), "20 90\n0 70");
    /// # Ok::<(), mmreco::ConfigError>(())
    /// ```
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let bands: Vec<(u32, u32)> =
            terminated(separated(0.., parse_band, line_ending), opt(line_ending))
                .parse(input)
                .map_err(ParseError::from_parse)?;

        Self::new(bands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn proportion_band_contains() {
        let band = ProportionBand::new(10, 200);
        assert!(band.contains(10.0));
        assert!(band.contains(200.0));
        assert!(band.contains(55.5));
        assert!(!band.contains(9.99));
        assert!(!band.contains(200.01));
        assert!(band.requires_signal());
        assert!(!ProportionBand::new(0, 50).requires_signal());
    }

    #[test]
    fn proportion_limits_band_lookup() {
        let limits = ProportionLimits::new([(10, 200), (5, 100)]).unwrap();
        assert_eq!(limits.band(0), None);
        assert_eq!(limits.band(1), Some(&ProportionBand::new(10, 200)));
        assert_eq!(limits.band(2), Some(&ProportionBand::new(5, 100)));
        assert_eq!(limits.band(3), None);
        assert_eq!(limits.len(), 2);
    }

    #[test]
    fn proportion_limits_inverted() {
        let error = ProportionLimits::new([(10, 200), (80, 20)]).unwrap_err();
        assert!(matches!(
            error,
            ConfigError::InvertedBand {
                distance: 2,
                lower: 80,
                upper: 20
            }
        ));
    }

    #[test]
    fn proportion_limits_from_str() {
        assert!(ProportionLimits::from_str("").unwrap().is_empty());

        let limits = ProportionLimits::from_str("10 200\n  5   100  \n").unwrap();
        assert_eq!(limits, ProportionLimits::new([(10, 200), (5, 100)]).unwrap());

        assert_eq!(limits, ProportionLimits::from_str(&limits.to_string()).unwrap());
    }

    #[test]
    fn proportion_limits_from_str_crlf() {
        let limits = ProportionLimits::from_str("10 200\r\n5 100\r\n").unwrap();
        assert_eq!(limits, ProportionLimits::new([(10, 200), (5, 100)]).unwrap());
        assert!(ProportionLimits::from_str("10 200\r\n5\r100\r\n").is_err());
    }

    #[test]
    fn proportion_limits_from_str_invalid() {
        let error = ProportionLimits::from_str("10 200\n5,100\n").unwrap_err();
        let ConfigError::Parse(parse_error) = error else {
            panic!("expected a parse error");
        };
        assert!(parse_error.to_string().contains("5,100"));

        assert!(matches!(
            ProportionLimits::from_str("30 20"),
            Err(ConfigError::InvertedBand { .. })
        ));
    }
}
