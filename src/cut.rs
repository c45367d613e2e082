use crate::config::Config;
use crate::cross_section::CrossSection;
use crate::error::ConfigError;
use crate::event::{Axis, Charge};
use crate::limits::ProportionLimits;
use serde::Serialize;

/// Outcome of the neighbour quality cuts of one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct CutDecision {
    /// A neighbour strip that should have been tested lies outside the
    /// detector.
    pub absolute_position_cut: bool,
    /// A neighbour strip is missing or its charge proportion is outside the
    /// configured band.
    pub proportion_cut: bool,
}

impl CutDecision {
    pub fn accepted(&self) -> bool {
        !self.absolute_position_cut && !self.proportion_cut
    }
}

/// Charge of a neighbour strip relative to the peak strip.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct NeighbourSample {
    /// Signed distance in strips from the peak strip.
    pub offset: i64,
    /// Charge in percent of the peak charge.
    pub proportion: f64,
}

/// Result of [`ProportionCut::evaluate`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CutEvaluation {
    pub decision: CutDecision,
    /// One sample per neighbour strip whose proportion was computed, ordered
    /// by offset.
    pub neighbours: Vec<NeighbourSample>,
}

/// Neighbour-proportion cut.
///
/// The strips up to `max_distance` positions left and right of the peak strip
/// are compared with the peak charge. Each offset is tested on its own and
/// all of them are always visited, so a rejected cross-section still yields
/// the complete set of neighbour samples.
#[derive(Clone, Copy, Debug)]
pub struct ProportionCut<'a> {
    limits: &'a ProportionLimits,
    max_distance: usize,
    total_strips: u32,
}

impl<'a> ProportionCut<'a> {
    /// `total_strips` is the number of strips of the axis; valid strip
    /// numbers are `1..=total_strips`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LimitsTooShort`] if `limits` has fewer bands
    /// than `max_distance`.
    pub fn new(
        limits: &'a ProportionLimits,
        max_distance: usize,
        total_strips: u32,
    ) -> Result<Self, ConfigError> {
        if max_distance > limits.len() {
            return Err(ConfigError::LimitsTooShort {
                required: max_distance,
                available: limits.len(),
            });
        }

        Ok(Self {
            limits,
            max_distance,
            total_strips,
        })
    }

    /// Applies the cut to a cross-section.
    ///
    /// A cross-section whose peak charge is not positive is rejected by the
    /// proportion cut without computing any proportion.
    ///
    /// # Examples
    ///
    /// ```
    /// use mmreco::cross_section::{CrossSection, StripCharge};
    /// use mmreco::cut::ProportionCut;
    /// use mmreco::event::Axis;
    /// use mmreco::limits::ProportionLimits;
    ///
    /// let section = CrossSection::from_sorted(Axis::X, vec![
    ///     StripCharge { strip: 10, charge: 4i16 },
    ///     StripCharge { strip: 11, charge: 10 },
    ///     StripCharge { strip: 12, charge: 6 },
    /// ], 1).unwrap();
    /// let limits = ProportionLimits::new([(30, 80)])?;
    ///
    /// let evaluation = ProportionCut::new(&limits, 1, 360)?.evaluate(&section);
    /// assert!(evaluation.decision.accepted());
    /// assert_eq!(evaluation.neighbours.len(), 2);
    /// # Ok::<(), mmreco::ConfigError>(())
    /// ```
    pub fn evaluate<Q: Charge>(&self, section: &CrossSection<Q>) -> CutEvaluation {
        let peak = section.peak();
        let mut decision = CutDecision::default();
        let mut neighbours = Vec::new();

        if peak.charge <= Q::zero() {
            decision.proportion_cut = true;
            return CutEvaluation {
                decision,
                neighbours,
            };
        }
        let peak_charge: f64 = peak.charge.as_();

        let max_distance = self.max_distance as i64;
        for offset in (-max_distance..=max_distance).filter(|&offset| offset != 0) {
            let Some(band) = self.limits.band(offset.unsigned_abs() as usize) else {
                continue;
            };

            let expected = i64::from(peak.strip) + offset;
            if expected < 1 || expected > i64::from(self.total_strips) {
                decision.absolute_position_cut = true;
                continue;
            }

            // Zero suppressed strips are missing from the cross-section.
            let Some(neighbour) = u32::try_from(expected).ok().and_then(|s| section.find(s)) else {
                if band.requires_signal() {
                    decision.proportion_cut = true;
                }
                continue;
            };

            let charge: f64 = neighbour.charge.as_();
            let proportion = 100.0 * charge / peak_charge;
            if !band.contains(proportion) {
                decision.proportion_cut = true;
            }
            neighbours.push(NeighbourSample { offset, proportion });
        }

        CutEvaluation {
            decision,
            neighbours,
        }
    }
}

impl<Q> Config<Q> {
    /// The neighbour cut of `axis`.
    pub fn proportion_cut(&self, axis: Axis) -> ProportionCut<'_> {
        // The builder already checked the distance against the table.
        ProportionCut {
            limits: self.limits(),
            max_distance: self.max_distance(),
            total_strips: self.strips(axis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cross_section::StripCharge;
    use crate::event::AxisPair;

    fn cross_section(strips: &[u32], charges: &[i16], peak_position: usize) -> CrossSection<i16> {
        let entries = strips
            .iter()
            .zip(charges)
            .map(|(&strip, &charge)| StripCharge { strip, charge })
            .collect();
        CrossSection::from_sorted(Axis::X, entries, peak_position).unwrap()
    }

    fn limits_table(bands: &[(u32, u32)]) -> ProportionLimits {
        ProportionLimits::new(bands.iter().copied()).unwrap()
    }

    #[test]
    fn proportion_cut_contiguous_accepted() {
        let section = cross_section(&[10, 11, 12, 13, 14], &[2, 5, 9, 4, 1], 2);
        let limits = limits_table(&[(10, 200), (10, 200)]);
        let evaluation = ProportionCut::new(&limits, 2, 360).unwrap().evaluate(&section);

        assert_eq!(evaluation.decision, CutDecision::default());
        assert!(evaluation.decision.accepted());
        let offsets: Vec<_> = evaluation.neighbours.iter().map(|n| n.offset).collect();
        assert_eq!(offsets, vec![-2, -1, 1, 2]);
        assert!((evaluation.neighbours[1].proportion - 500.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn proportion_cut_out_of_band() {
        let section = cross_section(&[10, 11, 12], &[1, 9, 5], 1);
        let limits = limits_table(&[(20, 200)]);
        let evaluation = ProportionCut::new(&limits, 1, 360).unwrap().evaluate(&section);

        assert!(evaluation.decision.proportion_cut);
        assert!(!evaluation.decision.absolute_position_cut);
        assert!(!evaluation.decision.accepted());
        // The failing neighbour is still sampled.
        assert_eq!(evaluation.neighbours.len(), 2);
    }

    #[test]
    fn proportion_cut_missing_neighbour() {
        let section = cross_section(&[10, 11, 13, 14, 15], &[2, 5, 9, 4, 1], 2);

        let strict = limits_table(&[(10, 200), (10, 200)]);
        let evaluation = ProportionCut::new(&strict, 2, 360).unwrap().evaluate(&section);
        assert!(evaluation.decision.proportion_cut);
        let offsets: Vec<_> = evaluation.neighbours.iter().map(|n| n.offset).collect();
        assert_eq!(offsets, vec![-2, 1, 2]);

        let tolerant = limits_table(&[(0, 200), (10, 200)]);
        let evaluation = ProportionCut::new(&tolerant, 2, 360).unwrap().evaluate(&section);
        assert!(evaluation.decision.accepted());
    }

    #[test]
    fn proportion_cut_finds_strips_beyond_gap() {
        // Strip 11 is missing, so the strip two positions away sits right
        // next to the peak in the cross-section.
        let section = cross_section(&[10, 12, 13], &[3, 9, 5], 1);
        let limits = limits_table(&[(0, 100), (20, 100)]);
        let evaluation = ProportionCut::new(&limits, 2, 360).unwrap().evaluate(&section);

        assert!(evaluation.decision.proportion_cut);
        let samples: Vec<_> = evaluation
            .neighbours
            .iter()
            .map(|n| (n.offset, n.proportion.round() as i64))
            .collect();
        assert_eq!(samples, vec![(-2, 33), (1, 56)]);
    }

    #[test]
    fn proportion_cut_absolute_position() {
        let section = cross_section(&[1, 2, 3], &[9, 4, 1], 0);
        let limits = limits_table(&[(0, 100), (0, 100)]);
        let evaluation = ProportionCut::new(&limits, 2, 360).unwrap().evaluate(&section);
        assert!(evaluation.decision.absolute_position_cut);
        assert!(!evaluation.decision.proportion_cut);
        assert_eq!(evaluation.neighbours.len(), 2);

        let section = cross_section(&[359, 360], &[4, 9], 1);
        let evaluation = ProportionCut::new(&limits, 2, 360).unwrap().evaluate(&section);
        assert!(evaluation.decision.absolute_position_cut);
    }

    #[test]
    fn proportion_cut_both_failures() {
        let section = cross_section(&[1, 2], &[9, 1], 0);
        let limits = limits_table(&[(50, 100)]);
        let evaluation = ProportionCut::new(&limits, 1, 360).unwrap().evaluate(&section);
        assert!(evaluation.decision.absolute_position_cut);
        assert!(evaluation.decision.proportion_cut);
    }

    #[test]
    fn proportion_cut_non_positive_peak() {
        let section = cross_section(&[4, 5, 6], &[0, 0, 0], 1);
        let limits = limits_table(&[(0, 100)]);
        let evaluation = ProportionCut::new(&limits, 1, 360).unwrap().evaluate(&section);
        assert!(evaluation.decision.proportion_cut);
        assert!(evaluation.neighbours.is_empty());
    }

    #[test]
    fn proportion_cut_limits_too_short() {
        let limits = limits_table(&[(10, 100)]);
        assert!(matches!(
            ProportionCut::new(&limits, 5, 360),
            Err(ConfigError::LimitsTooShort {
                required: 5,
                available: 1
            })
        ));
        assert!(ProportionCut::new(&limits, 0, 360).is_ok());
    }

    #[test]
    fn proportion_cut_from_config() {
        let config = Config::<i16>::builder()
            .limits(limits_table(&[(0, 100), (0, 50)]))
            .max_distance(1)
            .strips(AxisPair::new(360, 12))
            .build()
            .unwrap();

        // Only the direct neighbours are tested; strip 12 is the last Y strip.
        let section = cross_section(&[10, 11, 12], &[4, 5, 9], 2);
        let evaluation = config.proportion_cut(Axis::Y).evaluate(&section);
        assert!(evaluation.decision.absolute_position_cut);
        assert_eq!(evaluation.neighbours.len(), 1);
        assert!(config.proportion_cut(Axis::X).evaluate(&section).decision.accepted());
    }
}
