//! PIN evaluation sections
//!
//! Each section runs one step of the validation pipeline.

mod common;
mod demographic;
mod format;

pub use common::common_section;
pub use demographic::demographic_section;
pub use format::{check_format, format_section};

use crate::generator::PatternGenerator;
use crate::types::{Demographics, PinLength, ReasonSet};
use crate::validator::PinError;

/// Result type for section evaluation functions.
/// - `Ok(reasons)` - Section finished; an empty set means it found nothing
/// - `Err(error)` - The PIN cannot be evaluated
pub type SectionResult = Result<ReasonSet, PinError>;

/// Inputs shared by every section of one validation call.
#[derive(Debug, Clone, Copy)]
pub struct SectionContext<'a> {
    pub generator: &'a PatternGenerator,
    pub demographics: Option<&'a Demographics>,
}

impl SectionContext<'_> {
    pub fn pin_length(&self) -> PinLength {
        self.generator.pin_length()
    }
}
