//! PIN validator - orchestrates the evaluation sections.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

#[cfg(feature = "async")]
use tokio::sync::mpsc;

#[cfg(feature = "async")]
use tokio_util::sync::CancellationToken;

use crate::generator::{GeneratorConfig, PatternGenerator};
use crate::sections::{
    SectionContext, SectionResult, common_section, demographic_section, format_section,
};
use crate::types::{Demographics, PinLength, PinStrength, PinVerdict, ReasonSet};

/// Input errors a caller can correct.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PinError {
    #[error("PIN must not be empty")]
    Empty,
    #[error("PIN must be exactly {expected} digits, got {actual}")]
    WrongLength { expected: usize, actual: usize },
    #[error("PIN must contain only digits")]
    NonDigit,
    #[error("PIN length must be either 4 or 6, got {0}")]
    UnsupportedLength(usize),
    #[cfg(feature = "async")]
    #[error("Validation cancelled")]
    Cancelled,
}

type Section = fn(&SecretString, &SectionContext<'_>) -> SectionResult;

const SECTIONS: [(&str, Section); 3] = [
    ("format", format_section),
    ("common", common_section),
    ("demographic", demographic_section),
];

/// Validates PINs of one fixed length.
#[derive(Debug, Clone)]
pub struct PinValidator {
    generator: PatternGenerator,
}

impl PinValidator {
    /// Creates a validator for 4- or 6-digit PINs with the default budget.
    pub fn new(pin_length: usize) -> Result<Self, PinError> {
        let pin_length = PinLength::try_from(pin_length)?;
        Ok(Self::with_config(pin_length, GeneratorConfig::default()))
    }

    pub fn with_config(pin_length: PinLength, config: GeneratorConfig) -> Self {
        Self {
            generator: PatternGenerator::with_config(pin_length, config),
        }
    }

    pub fn pin_length(&self) -> PinLength {
        self.generator.pin_length()
    }

    /// Checks that `pin` is exactly `pin_length` digits.
    pub fn validate_format(&self, pin: &str) -> Result<(), PinError> {
        crate::sections::check_format(pin, self.pin_length())
    }

    pub fn is_common_pin(&self, pin: &str) -> bool {
        pin.len() == self.pin_length().digits() && crate::common_pins::is_common_pin(pin)
    }

    /// All reasons why `pin` is weak; empty when it is strong.
    pub fn weakness_reasons(
        &self,
        pin: &SecretString,
        demographics: Option<&Demographics>,
    ) -> Result<ReasonSet, PinError> {
        let ctx = SectionContext {
            generator: &self.generator,
            demographics,
        };
        let mut reasons = ReasonSet::new();
        for (_, section_fn) in SECTIONS {
            reasons.extend(section_fn(pin, &ctx)?);
        }
        Ok(reasons)
    }

    pub fn evaluate_strength(
        &self,
        pin: &SecretString,
        demographics: Option<&Demographics>,
    ) -> Result<PinStrength, PinError> {
        let reasons = self.weakness_reasons(pin, demographics)?;
        Ok(PinStrength::from_reasons(&reasons))
    }

    /// Validates `pin` and returns the full verdict.
    ///
    /// # Arguments
    /// * `pin` - The PIN to evaluate
    /// * `demographics` - Optional personal dates to match against
    /// * `token` - Optional cancellation token (async feature only)
    ///
    /// # Errors
    /// Malformed PINs are rejected; a cancelled token yields
    /// `PinError::Cancelled`.
    pub fn validate(
        &self,
        pin: &SecretString,
        demographics: Option<&Demographics>,
        #[cfg(feature = "async")] token: Option<CancellationToken>,
    ) -> Result<PinVerdict, PinError> {
        let ctx = SectionContext {
            generator: &self.generator,
            demographics,
        };
        let mut reasons = ReasonSet::new();

        for (_section_name, section_fn) in SECTIONS {
            // Check cancellation before each section (async only)
            #[cfg(feature = "async")]
            {
                if token.as_ref().is_some_and(|t| t.is_cancelled()) {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("PIN validation cancelled before section: {}", _section_name);
                    return Err(PinError::Cancelled);
                }
            }

            match section_fn(pin, &ctx) {
                Ok(found) => reasons.extend(found),
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("PIN rejected in section {}: {}", _section_name, e);
                    return Err(e);
                }
            }
        }

        let strength = PinStrength::from_reasons(&reasons);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "PIN verdict: {} ({:?})",
            strength,
            reasons.iter().map(|r| r.as_str()).collect::<Vec<_>>()
        );

        Ok(PinVerdict {
            pin: SecretString::new(pin.expose_secret().into()),
            pin_length: self.pin_length(),
            strength,
            weakness_reasons: reasons,
        })
    }
}

/// Async version that sends the validation result via channel.
#[cfg(feature = "async")]
pub async fn validate_pin_tx(
    validator: &PinValidator,
    pin: &SecretString,
    demographics: Option<&Demographics>,
    token: CancellationToken,
    tx: mpsc::Sender<Result<PinVerdict, PinError>>,
) {
    use std::time::Duration;

    #[cfg(feature = "tracing")]
    tracing::info!("PIN validation is about to start...");

    // Debounce rapid re-submissions from interactive callers.
    tokio::time::sleep(Duration::from_millis(300)).await;
    let result = validator.validate(pin, demographics, Some(token));

    if let Err(_e) = tx.send(result).await {
        #[cfg(feature = "tracing")]
        tracing::error!("Failed to send PIN validation result: {}", _e);
    }
}


#[cfg(all(test, feature = "async"))]
mod async_tests {
    use super::*;
    use serial_test::serial;

    fn secret(pin: &str) -> SecretString {
        SecretString::new(pin.to_string().into())
    }

    #[tokio::test]
    #[serial]
    async fn test_validate_with_cancellation() {
        let validator = PinValidator::new(4).expect("supported length");
        let token = CancellationToken::new();
        token.cancel();

        let result = validator.validate(&secret("1234"), None, Some(token));
        assert_eq!(result.err(), Some(PinError::Cancelled));
    }

    #[tokio::test]
    #[serial]
    async fn test_validate_without_cancellation() {
        crate::common_pins::reset_common_pins_for_testing();
        let validator = PinValidator::new(4).expect("supported length");
        let token = CancellationToken::new();

        let verdict = validator
            .validate(&secret("1234"), None, Some(token))
            .expect("not cancelled");
        assert!(verdict.is_weak());
    }

    #[tokio::test]
    #[serial]
    async fn test_validate_pin_tx() {
        crate::common_pins::reset_common_pins_for_testing();
        let (tx, mut rx) = mpsc::channel(1);
        let token = CancellationToken::new();
        let validator = PinValidator::new(6).expect("supported length");
        let dates = Demographics::new().with_dob("1998-02-01");

        validate_pin_tx(&validator, &secret("010298"), Some(&dates), token, tx).await;

        let verdict = rx
            .recv()
            .await
            .expect("Should receive verdict")
            .expect("well-formed PIN");
        assert!(verdict.is_weak());
        assert_eq!(verdict.reason_codes(), vec!["DEMOGRAPHIC_DOB_SELF"]);
    }

    #[tokio::test]
    #[serial]
    async fn test_validate_pin_tx_cancelled() {
        let (tx, mut rx) = mpsc::channel(1);
        let token = CancellationToken::new();
        token.cancel();
        let validator = PinValidator::new(4).expect("supported length");

        validate_pin_tx(&validator, &secret("1234"), None, token, tx).await;

        let result = rx.recv().await.expect("Should receive result");
        assert_eq!(result.err(), Some(PinError::Cancelled));
    }
}
