use crate::cross_section::CrossSection;
use crate::event::Charge;
use serde::Serialize;

/// Charge-weighted summary of a cross-section: where the charge cloud is
/// centred along the axis and how wide it is.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ChargeProfile {
    /// Charge-weighted mean strip number.
    pub mean: f64,
    /// Charge-weighted RMS width in strips.
    pub sigma: f64,
    /// Sum of all positive strip charges.
    pub total_charge: f64,
}

impl ChargeProfile {
    /// Computes the profile from the positive strip charges of a
    /// cross-section. Returns `None` if no strip carries positive charge.
    ///
    /// # Examples
    ///
    /// ```
    /// use mmreco::cross_section::{CrossSection, StripCharge};
    /// use mmreco::event::Axis;
    /// use mmreco::profile::ChargeProfile;
    ///
    /// let section = CrossSection::from_sorted(Axis::X, vec![
    ///     StripCharge { strip: 9, charge: 5i16 },
    ///     StripCharge { strip: 10, charge: 10 },
    ///     StripCharge { strip: 11, charge: 5 },
    /// ], 1).unwrap();
    ///
    /// let profile = ChargeProfile::from_cross_section(&section).unwrap();
    /// assert_eq!(profile.mean, 10.0);
    /// assert_eq!(profile.total_charge, 20.0);
    /// ```
    pub fn from_cross_section<Q: Charge>(section: &CrossSection<Q>) -> Option<Self> {
        let weighted = || {
            section
                .entries()
                .iter()
                .filter(|entry| entry.charge > Q::zero())
                .map(|entry| {
                    let charge: f64 = entry.charge.as_();
                    (f64::from(entry.strip), charge)
                })
        };

        let total_charge: f64 = weighted().map(|(_, q)| q).sum();
        if total_charge <= 0.0 {
            return None;
        }
        let mean = weighted().map(|(x, q)| x * q).sum::<f64>() / total_charge;
        let variance = weighted().map(|(x, q)| q * (x - mean).powi(2)).sum::<f64>() / total_charge;

        Some(Self {
            mean,
            sigma: variance.sqrt(),
            total_charge,
        })
    }
}
