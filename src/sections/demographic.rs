//! Demographic section - matches the PIN against the caller's personal dates.

use secrecy::{ExposeSecret, SecretString};

use super::{SectionContext, SectionResult};
use crate::components::date_patterns;
use crate::special;
use crate::types::ReasonSet;

/// Runs the direct single-date check and the literal override table; only if
/// both come up empty does it fall back to full cross-source generation.
///
/// # Returns
/// - `Ok(reasons)` naming every date source the PIN was derived from
/// - `Ok(empty)` when no demographics were supplied or nothing matched
pub fn demographic_section(pin: &SecretString, ctx: &SectionContext<'_>) -> SectionResult {
    let Some(demographics) = ctx.demographics.filter(|d| !d.is_empty()) else {
        return Ok(ReasonSet::new());
    };
    let pin = pin.expose_secret();

    let mut reasons: ReasonSet = demographics
        .sources()
        .filter(|(_, date)| date_patterns(date, ctx.pin_length()).contains(pin))
        .map(|(source, _)| source.reason())
        .collect();

    let special_matches = special::check_direct(pin, demographics);
    if !special_matches.is_empty() {
        reasons.extend(special_matches);
        return Ok(reasons);
    }

    if reasons.is_empty() {
        let candidates = ctx.generator.generate(demographics);
        if let Some(found) = candidates.reasons(pin) {
            reasons.extend(found.iter().copied());
        }
    }

    Ok(reasons)
}
