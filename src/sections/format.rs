//! Format section - rejects PINs of the wrong length or with non-digits.

use secrecy::{ExposeSecret, SecretString};

use super::{SectionContext, SectionResult};
use crate::types::{PinLength, ReasonSet};
use crate::validator::PinError;

/// Checks that `pin` is exactly `pin_length` ASCII digits.
pub fn check_format(pin: &str, pin_length: PinLength) -> Result<(), PinError> {
    if pin.is_empty() {
        return Err(PinError::Empty);
    }
    let actual = pin.chars().count();
    if actual != pin_length.digits() {
        return Err(PinError::WrongLength {
            expected: pin_length.digits(),
            actual,
        });
    }
    if !pin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PinError::NonDigit);
    }
    Ok(())
}

/// # Returns
/// - `Ok(empty)` if the PIN is well formed
/// - `Err(_)` describing the first format violation
pub fn format_section(pin: &SecretString, ctx: &SectionContext<'_>) -> SectionResult {
    check_format(pin.expose_secret(), ctx.pin_length())?;
    Ok(ReasonSet::new())
}
