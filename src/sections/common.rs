//! Common section - checks if the PIN is in the common PIN table.

use secrecy::{ExposeSecret, SecretString};

use super::{SectionContext, SectionResult};
use crate::common_pins::is_common_pin;
use crate::types::{ReasonSet, WeaknessReason};

/// # Returns
/// - `Ok({COMMONLY_USED})` if the PIN is a well-known one
/// - `Ok(empty)` otherwise
pub fn common_section(pin: &SecretString, _ctx: &SectionContext<'_>) -> SectionResult {
    let mut reasons = ReasonSet::new();
    if is_common_pin(pin.expose_secret()) {
        reasons.insert(WeaknessReason::CommonlyUsed);
    }
    Ok(reasons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::PatternGenerator;
    use crate::types::PinLength;
    use serial_test::serial;

    fn secret(pin: &str) -> SecretString {
        SecretString::new(pin.to_string().into())
    }

    #[test]
    #[serial]
    fn test_common_section_common_pin() {
        crate::common_pins::reset_common_pins_for_testing();
        let generator = PatternGenerator::new(PinLength::Four);
        let ctx = SectionContext { generator: &generator, demographics: None };

        let result = common_section(&secret("1234"), &ctx);
        assert_eq!(result, Ok(ReasonSet::from([WeaknessReason::CommonlyUsed])));
    }

    #[test]
    #[serial]
    fn test_common_section_uncommon_pin() {
        crate::common_pins::reset_common_pins_for_testing();
        let generator = PatternGenerator::new(PinLength::Six);
        let ctx = SectionContext { generator: &generator, demographics: None };

        assert_eq!(common_section(&secret("918273"), &ctx), Ok(ReasonSet::new()));
    }
}
