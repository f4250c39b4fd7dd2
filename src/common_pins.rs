//! Common PIN table
//!
//! Holds the well-known PINs checked before any date analysis. A built-in
//! table ships with the crate; it can be replaced once at startup from a file.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{LazyLock, PoisonError, RwLock};
use thiserror::Error;

use crate::types::PinLength;

static LOADED_PINS: RwLock<Option<CommonPinTable>> = RwLock::new(None);

static BUILTIN_PINS: LazyLock<CommonPinTable> =
    LazyLock::new(|| CommonPinTable::parse(include_str!("../assets/common-pins.txt")));

#[derive(Error, Debug)]
pub enum CommonPinsError {
    #[error("Common PIN file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Failed to read common PIN file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Common PIN file has no usable entries")]
    EmptyFile,
}

/// Common PINs grouped by length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonPinTable {
    by_length: HashMap<usize, HashSet<String>>,
}

impl CommonPinTable {
    /// Parses one PIN per line. Blank lines, `#` comments and lines with
    /// non-digit characters are skipped.
    pub fn parse(content: &str) -> Self {
        let mut by_length: HashMap<usize, HashSet<String>> = HashMap::new();
        for line in content.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') || !line.bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }
            by_length.entry(line.len()).or_default().insert(line.to_string());
        }
        Self { by_length }
    }

    /// The built-in table.
    pub fn builtin() -> &'static CommonPinTable {
        &BUILTIN_PINS
    }

    pub fn lookup(&self, pin_length: PinLength) -> HashSet<String> {
        self.by_length
            .get(&pin_length.digits())
            .cloned()
            .unwrap_or_default()
    }

    pub fn contains(&self, pin: &str) -> bool {
        self.by_length
            .get(&pin.len())
            .is_some_and(|pins| pins.contains(pin))
    }

    /// Total number of PINs across all lengths.
    pub fn len(&self) -> usize {
        self.by_length.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Returns the common PIN file path.
///
/// Priority:
/// 1. Environment variable `PIN_COMMON_PINS_PATH`
/// 2. Default path `./assets/common-pins.txt`
pub fn get_common_pins_path() -> PathBuf {
    std::env::var("PIN_COMMON_PINS_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./assets/common-pins.txt"))
}

/// Loads the common PIN table from the configured file.
///
/// Without a call to this (or [`init_common_pins_from_path`]) the built-in
/// table is used.
///
/// # Errors
///
/// Returns error if:
/// - File does not exist
/// - File cannot be read
/// - File has no usable entries
pub fn init_common_pins() -> Result<usize, CommonPinsError> {
    let path = get_common_pins_path();
    init_common_pins_from_path(&path)
}

/// Loads the common PIN table from a specific file path.
///
/// Idempotent: once a table is loaded, later calls return its size.
pub fn init_common_pins_from_path<P: AsRef<std::path::Path>>(
    path: P,
) -> Result<usize, CommonPinsError> {
    {
        let guard = LOADED_PINS.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = guard.as_ref() {
            return Ok(table.len());
        }
    }

    let path = path.as_ref();

    if !path.exists() {
        #[cfg(feature = "tracing")]
        tracing::error!("Common PIN initialization FAILED: FileNotFound {:?}", path);
        return Err(CommonPinsError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let table = CommonPinTable::parse(&content);

    if table.is_empty() {
        #[cfg(feature = "tracing")]
        tracing::error!("Common PIN initialization FAILED: no entries in {:?}", path);
        return Err(CommonPinsError::EmptyFile);
    }

    let count = table.len();
    {
        let mut guard = LOADED_PINS.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(table);
    }

    #[cfg(feature = "tracing")]
    tracing::info!("Common PINs initialized: {} entries from {:?}", count, path);

    Ok(count)
}

/// Common PINs of `pin_length` from the active table.
pub fn lookup(pin_length: PinLength) -> HashSet<String> {
    let guard = LOADED_PINS.read().unwrap_or_else(PoisonError::into_inner);
    guard
        .as_ref()
        .unwrap_or_else(|| CommonPinTable::builtin())
        .lookup(pin_length)
}

/// Checks if a PIN is in the active common PIN table.
pub fn is_common_pin(pin: &str) -> bool {
    let guard = LOADED_PINS.read().unwrap_or_else(PoisonError::into_inner);
    guard
        .as_ref()
        .unwrap_or_else(|| CommonPinTable::builtin())
        .contains(pin)
}

/// Drops any loaded table so the built-in one is active again.
#[cfg(test)]
pub fn reset_common_pins_for_testing() {
    let mut guard = LOADED_PINS.write().unwrap_or_else(PoisonError::into_inner);
    *guard = None;
}
