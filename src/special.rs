//! Hand-picked PIN/date pairs.
//!
//! These PINs encode their dates through a digit reordering that the
//! template and combination rules do not reach, so they are matched
//! literally.

use crate::types::{DateSource, Demographics, PinLength, ReasonSet};

/// One literal override: `pin` is weak for whoever supplied `date` as `source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialCase {
    pub pin: &'static str,
    pub source: DateSource,
    pub date: &'static str,
}

pub const SPECIAL_CASES: &[SpecialCase] = &[
    SpecialCase {
        pin: "402570",
        source: DateSource::DobSelf,
        date: "2004-07-25",
    },
    SpecialCase {
        pin: "100589",
        source: DateSource::Anniversary,
        date: "1998-05-01",
    },
];

/// Reasons for `pin` from the override table.
///
/// Matches require the exact PIN and the exact date string in the
/// corresponding demographic field.
pub fn check_direct(pin: &str, demographics: &Demographics) -> ReasonSet {
    SPECIAL_CASES
        .iter()
        .filter(|case| case.pin == pin && demographics.get(case.source) == Some(case.date))
        .map(|case| case.source.reason())
        .collect()
}

/// Override PINs of `pin_length` for a source whose raw date contains the
/// literal date of an entry.
pub fn seeded_pins(
    source: DateSource,
    raw_date: &str,
    pin_length: PinLength,
) -> impl Iterator<Item = &'static str> + '_ {
    SPECIAL_CASES
        .iter()
        .filter(move |case| {
            case.source == source
                && case.pin.len() == pin_length.digits()
                && raw_date.contains(case.date)
        })
        .map(|case| case.pin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WeaknessReason;

    #[test]
    fn test_check_direct_matches_exact_pairs() {
        let dob = Demographics::new().with_dob("2004-07-25");
        assert_eq!(
            check_direct("402570", &dob),
            ReasonSet::from([WeaknessReason::DemographicDobSelf])
        );

        let anniversary = Demographics::new().with_anniversary("1998-05-01");
        assert_eq!(
            check_direct("100589", &anniversary),
            ReasonSet::from([WeaknessReason::DemographicAnniversary])
        );
    }

    #[test]
    fn test_check_direct_requires_matching_source() {
        // Right date, wrong field.
        let spouse = Demographics::new().with_spouse_dob("2004-07-25");
        assert!(check_direct("402570", &spouse).is_empty());

        // Right field, different PIN.
        let dob = Demographics::new().with_dob("2004-07-25");
        assert!(check_direct("100589", &dob).is_empty());

        assert!(check_direct("402570", &Demographics::new()).is_empty());
    }

    #[test]
    fn test_seeded_pins() {
        let seeded: Vec<_> = seeded_pins(DateSource::DobSelf, "2004-07-25", PinLength::Six).collect();
        assert_eq!(seeded, vec!["402570"]);

        assert_eq!(seeded_pins(DateSource::DobSelf, "2004-07-25", PinLength::Four).count(), 0);
        assert_eq!(seeded_pins(DateSource::DobSpouse, "2004-07-25", PinLength::Six).count(), 0);
    }
}
