//! PIN strength evaluation library
//!
//! This library classifies 4- and 6-digit PINs as `WEAK` or `STRONG` by
//! checking them against a table of commonly used PINs and against patterns
//! derived from the user's personal dates (own birth date, spouse's birth
//! date, wedding anniversary).
//!
//! # Features
//!
//! - `async` (default): Enables cancellation support and channel delivery
//! - `tracing`: Enables logging via tracing crate
//!
//! # Environment Variables
//!
//! - `PIN_COMMON_PINS_PATH`: Custom path to the common PIN file
//!   (default: `./assets/common-pins.txt`, a built-in copy is used otherwise)
//! - `PIN_MAX_COMBINATIONS`, `PIN_MAX_EXECUTION_TIME_SECS`: generator budget,
//!   read by [`GeneratorConfig::from_env`]
//!
//! # Example
//!
//! ```rust,no_run
//! use pin_strength::{Demographics, PinValidator};
//! use secrecy::SecretString;
//!
//! let validator = PinValidator::new(6).expect("4 or 6 digits");
//! let demographics = Demographics::new().with_dob("1998-02-01");
//! let pin = SecretString::new("010298".to_string().into());
//!
//! #[cfg(feature = "async")]
//! let verdict = validator.validate(&pin, Some(&demographics), None);
//!
//! #[cfg(not(feature = "async"))]
//! let verdict = validator.validate(&pin, Some(&demographics));
//!
//! let verdict = verdict.expect("well-formed PIN");
//! println!("Strength: {}", verdict.strength);
//! for reason in &verdict.weakness_reasons {
//!     println!("- {}", reason.description());
//! }
//! ```

// Internal modules
mod common_pins;
mod components;
mod generator;
mod sections;
mod special;
mod types;
mod validator;

// Public API
pub use common_pins::{
    CommonPinTable, CommonPinsError, get_common_pins_path, init_common_pins,
    init_common_pins_from_path, is_common_pin, lookup,
};
pub use components::{Component, ComponentSet, date_patterns, parse_date};
pub use generator::{GeneratorConfig, PatternGenerator, PinCandidateMap};
pub use special::{SPECIAL_CASES, SpecialCase, check_direct as check_special_cases};
pub use types::{
    DateSource, Demographics, PinLength, PinStrength, PinVerdict, ReasonSet, WeaknessReason,
};
pub use validator::{PinError, PinValidator};

#[cfg(feature = "async")]
pub use validator::validate_pin_tx;
