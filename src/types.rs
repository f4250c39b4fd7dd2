//! Shared types: PIN lengths, date sources, reason codes and verdicts.

use std::collections::BTreeSet;
use std::fmt;

use secrecy::SecretString;

use crate::PinError;

/// Supported PIN lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinLength {
    Four,
    Six,
}

impl PinLength {
    /// Number of digits in a PIN of this length.
    pub fn digits(self) -> usize {
        match self {
            PinLength::Four => 4,
            PinLength::Six => 6,
        }
    }
}

impl TryFrom<usize> for PinLength {
    type Error = PinError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(PinLength::Four),
            6 => Ok(PinLength::Six),
            other => Err(PinError::UnsupportedLength(other)),
        }
    }
}

impl fmt::Display for PinLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.digits())
    }
}

/// Why a PIN was classified as weak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WeaknessReason {
    CommonlyUsed,
    DemographicDobSelf,
    DemographicDobSpouse,
    DemographicAnniversary,
}

impl WeaknessReason {
    /// Stable reason code.
    pub fn as_str(self) -> &'static str {
        match self {
            WeaknessReason::CommonlyUsed => "COMMONLY_USED",
            WeaknessReason::DemographicDobSelf => "DEMOGRAPHIC_DOB_SELF",
            WeaknessReason::DemographicDobSpouse => "DEMOGRAPHIC_DOB_SPOUSE",
            WeaknessReason::DemographicAnniversary => "DEMOGRAPHIC_ANNIVERSARY",
        }
    }

    /// Human-readable explanation, suitable for display next to a verdict.
    pub fn description(self) -> &'static str {
        match self {
            WeaknessReason::CommonlyUsed => "This is a commonly used PIN pattern",
            WeaknessReason::DemographicDobSelf => "Contains your date of birth pattern",
            WeaknessReason::DemographicDobSpouse => {
                "Contains your spouse's date of birth pattern"
            }
            WeaknessReason::DemographicAnniversary => "Contains your wedding anniversary pattern",
        }
    }
}

impl fmt::Display for WeaknessReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// De-duplicated, ordered set of reasons.
pub type ReasonSet = BTreeSet<WeaknessReason>;

/// The three personal dates a caller may supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DateSource {
    DobSelf,
    DobSpouse,
    Anniversary,
}

impl DateSource {
    pub const ALL: [DateSource; 3] = [
        DateSource::DobSelf,
        DateSource::DobSpouse,
        DateSource::Anniversary,
    ];

    /// Input key used by callers (`dob`, `spouse_dob`, `anniversary`).
    pub fn key(self) -> &'static str {
        match self {
            DateSource::DobSelf => "dob",
            DateSource::DobSpouse => "spouse_dob",
            DateSource::Anniversary => "anniversary",
        }
    }

    pub fn reason(self) -> WeaknessReason {
        match self {
            DateSource::DobSelf => WeaknessReason::DemographicDobSelf,
            DateSource::DobSpouse => WeaknessReason::DemographicDobSpouse,
            DateSource::Anniversary => WeaknessReason::DemographicAnniversary,
        }
    }
}

/// Personal dates supplied alongside a PIN.
///
/// Each value is expected as an ISO `YYYY-MM-DD` string. Empty strings are
/// treated as absent; unparseable ones simply contribute no patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Demographics {
    pub dob: Option<String>,
    pub spouse_dob: Option<String>,
    pub anniversary: Option<String>,
}

impl Demographics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dob(mut self, date: impl Into<String>) -> Self {
        self.dob = Some(date.into());
        self
    }

    pub fn with_spouse_dob(mut self, date: impl Into<String>) -> Self {
        self.spouse_dob = Some(date.into());
        self
    }

    pub fn with_anniversary(mut self, date: impl Into<String>) -> Self {
        self.anniversary = Some(date.into());
        self
    }

    /// Returns the raw date for `source`, or `None` when absent or empty.
    pub fn get(&self, source: DateSource) -> Option<&str> {
        let value = match source {
            DateSource::DobSelf => self.dob.as_deref(),
            DateSource::DobSpouse => self.spouse_dob.as_deref(),
            DateSource::Anniversary => self.anniversary.as_deref(),
        };
        value.filter(|v| !v.is_empty())
    }

    /// True when no source carries a value.
    pub fn is_empty(&self) -> bool {
        DateSource::ALL.iter().all(|s| self.get(*s).is_none())
    }

    /// Supplied sources in fixed order, paired with their raw dates.
    pub fn sources(&self) -> impl Iterator<Item = (DateSource, &str)> {
        DateSource::ALL
            .into_iter()
            .filter_map(move |source| self.get(source).map(|date| (source, date)))
    }
}

/// Overall strength label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinStrength {
    Weak,
    Strong,
}

impl PinStrength {
    pub fn from_reasons(reasons: &ReasonSet) -> Self {
        if reasons.is_empty() {
            PinStrength::Strong
        } else {
            PinStrength::Weak
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PinStrength::Weak => "WEAK",
            PinStrength::Strong => "STRONG",
        }
    }
}

impl fmt::Display for PinStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a full validation.
#[derive(Debug)]
pub struct PinVerdict {
    pub pin: SecretString,
    pub pin_length: PinLength,
    pub strength: PinStrength,
    pub weakness_reasons: ReasonSet,
}

impl PinVerdict {
    pub fn is_weak(&self) -> bool {
        self.strength == PinStrength::Weak
    }

    /// Reason codes in their stable textual form.
    pub fn reason_codes(&self) -> Vec<&'static str> {
        self.weakness_reasons.iter().map(|r| r.as_str()).collect()
    }
}
