//! Cross-source PIN pattern generation.
//!
//! Combines fragments of up to three personal dates into full-length PIN
//! candidates and records which date(s) each candidate came from. Work is
//! bounded by a [`GeneratorConfig`] budget; once it runs out generation stops
//! and whatever was built so far is returned.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::components::{Component, ComponentSet};
use crate::special;
use crate::types::{DateSource, Demographics, PinLength, ReasonSet, WeaknessReason};

pub const DEFAULT_MAX_COMBINATIONS: u64 = 500_000;
pub const DEFAULT_MAX_EXECUTION_TIME: Duration = Duration::from_secs(3);

/// Cartesian products larger than this get their inputs truncated.
const PRODUCT_LIMIT: usize = 5_000;
const TRUNCATED_LEN: usize = 20;

/// Work budget for one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub max_combinations: u64,
    pub max_execution_time: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_combinations: DEFAULT_MAX_COMBINATIONS,
            max_execution_time: DEFAULT_MAX_EXECUTION_TIME,
        }
    }
}

impl GeneratorConfig {
    /// Builds a config from the environment.
    ///
    /// - `PIN_MAX_COMBINATIONS`: combination ceiling (integer)
    /// - `PIN_MAX_EXECUTION_TIME_SECS`: wall-clock ceiling in seconds (float)
    ///
    /// Missing or unparseable values keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("PIN_MAX_COMBINATIONS") {
            match raw.trim().parse::<u64>() {
                Ok(value) => config.max_combinations = value,
                Err(_e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!("Ignoring PIN_MAX_COMBINATIONS={:?}: {}", raw, _e);
                }
            }
        }

        if let Ok(raw) = std::env::var("PIN_MAX_EXECUTION_TIME_SECS") {
            match raw.trim().parse::<f64>().ok().and_then(|s| Duration::try_from_secs_f64(s).ok()) {
                Some(value) => config.max_execution_time = value,
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!("Ignoring PIN_MAX_EXECUTION_TIME_SECS={:?}", raw);
                }
            }
        }

        config
    }
}

/// Generated PINs mapped to the reasons that produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinCandidateMap {
    pins: HashMap<String, ReasonSet>,
}

impl PinCandidateMap {
    /// Records `reasons` against `pin`, merging with any already present.
    pub fn insert<I>(&mut self, pin: String, reasons: I)
    where
        I: IntoIterator<Item = WeaknessReason>,
    {
        self.pins.entry(pin).or_default().extend(reasons);
    }

    pub fn reasons(&self, pin: &str) -> Option<&ReasonSet> {
        self.pins.get(pin)
    }

    pub fn contains(&self, pin: &str) -> bool {
        self.pins.contains_key(pin)
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReasonSet)> {
        self.pins.iter().map(|(pin, reasons)| (pin.as_str(), reasons))
    }
}

/// Tracks elapsed time and the number of combinations tried.
struct Budget {
    started: Instant,
    combinations: u64,
    config: GeneratorConfig,
}

impl Budget {
    fn start(config: GeneratorConfig) -> Self {
        Self {
            started: Instant::now(),
            combinations: 0,
            config,
        }
    }

    fn exhausted(&self) -> bool {
        self.started.elapsed() > self.config.max_execution_time
            || self.combinations > self.config.max_combinations
    }

    /// Counts one combination; `false` once the budget is spent.
    fn consume(&mut self) -> bool {
        self.combinations += 1;
        !self.exhausted()
    }
}

/// Iterates every index tuple over the given radices, last position fastest.
struct Odometer {
    radices: Vec<usize>,
    next: Option<Vec<usize>>,
}

impl Odometer {
    fn new(radices: Vec<usize>) -> Self {
        let next = (!radices.is_empty() && radices.iter().all(|&r| r > 0))
            .then(|| vec![0; radices.len()]);
        Self { radices, next }
    }
}

impl Iterator for Odometer {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        let mut following = current.clone();
        for pos in (0..following.len()).rev() {
            following[pos] += 1;
            if following[pos] < self.radices[pos] {
                self.next = Some(following);
                break;
            }
            following[pos] = 0;
        }
        Some(current)
    }
}

/// A supplied date with its derived components.
struct Source {
    source: DateSource,
    components: ComponentSet,
}

impl Source {
    fn reason(&self) -> WeaknessReason {
        self.source.reason()
    }

    fn get(&self, component: Component) -> Option<&str> {
        self.components.get(component)
    }
}

fn partitions(pin_length: PinLength) -> &'static [&'static [usize]] {
    match pin_length {
        PinLength::Four => &[&[2, 2]],
        PinLength::Six => &[&[2, 2, 2], &[2, 4], &[4, 2]],
    }
}

fn reversed(value: &str) -> String {
    value.chars().rev().collect()
}

/// Generates date-derived PIN candidates of a fixed length.
#[derive(Debug, Clone)]
pub struct PatternGenerator {
    pin_length: PinLength,
    config: GeneratorConfig,
}

impl PatternGenerator {
    pub fn new(pin_length: PinLength) -> Self {
        Self::with_config(pin_length, GeneratorConfig::default())
    }

    pub fn with_config(pin_length: PinLength, config: GeneratorConfig) -> Self {
        Self { pin_length, config }
    }

    pub fn pin_length(&self) -> PinLength {
        self.pin_length
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Builds the candidate map for every supplied, parseable date.
    ///
    /// The cross-source, day-repetition and seeded rule families run for both
    /// PIN lengths, so 4-digit candidates also include shapes such as reversed
    /// spouse year followed by wedding day (`2901`), not only 6-digit ones.
    pub fn generate(&self, demographics: &Demographics) -> PinCandidateMap {
        let mut pins = PinCandidateMap::default();

        let sources: Vec<Source> = demographics
            .sources()
            .map(|(source, date)| Source {
                source,
                components: ComponentSet::derive(date),
            })
            .filter(|s| !s.components.is_empty())
            .collect();

        if sources.is_empty() {
            return pins;
        }

        let mut budget = Budget::start(self.config);

        for parts in partitions(self.pin_length) {
            if !self.sweep_partition(&sources, parts, &mut pins, &mut budget) {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    "Generation budget exhausted after {} combinations ({} candidates)",
                    budget.combinations,
                    pins.len()
                );
                return pins;
            }
        }

        let rules: [fn(&Self, &[Source], &mut PinCandidateMap); 4] = [
            Self::length_specific_patterns,
            Self::cross_source_patterns,
            Self::day_repetition_patterns,
            Self::seeded_special_cases,
        ];
        for rule in rules {
            if budget.exhausted() {
                #[cfg(feature = "tracing")]
                tracing::debug!("Generation budget exhausted before special rules");
                return pins;
            }
            rule(self, &sources, &mut pins);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Generated {} candidates from {} source(s) in {:?}",
            pins.len(),
            sources.len(),
            budget.started.elapsed()
        );

        pins
    }

    /// Records `pin` if it has the target length and is all digits.
    fn emit(&self, pins: &mut PinCandidateMap, pin: String, reasons: &[WeaknessReason]) {
        if pin.len() == self.pin_length.digits() && pin.bytes().all(|b| b.is_ascii_digit()) {
            pins.insert(pin, reasons.iter().copied());
        }
    }

    /// Concatenates fragments of the given part lengths across every ordered
    /// tuple of sources (repeats allowed). Returns `false` once the budget
    /// runs out.
    fn sweep_partition(
        &self,
        sources: &[Source],
        parts: &[usize],
        pins: &mut PinCandidateMap,
        budget: &mut Budget,
    ) -> bool {
        if parts.iter().sum::<usize>() != self.pin_length.digits() {
            return true;
        }

        for tuple in Odometer::new(vec![sources.len(); parts.len()]) {
            if budget.exhausted() {
                return false;
            }

            let mut lists: Vec<Vec<&str>> = tuple
                .iter()
                .zip(parts)
                .map(|(&i, &len)| sources[i].components.by_length(len))
                .collect();

            let size = lists
                .iter()
                .fold(1usize, |acc, list| acc.saturating_mul(list.len()));
            if size > PRODUCT_LIMIT {
                for list in &mut lists {
                    list.truncate(TRUNCATED_LEN);
                }
            }

            let reasons: Vec<WeaknessReason> = tuple.iter().map(|&i| sources[i].reason()).collect();

            for picks in Odometer::new(lists.iter().map(Vec::len).collect()) {
                if !budget.consume() {
                    return false;
                }
                let pin: String = picks.iter().zip(&lists).map(|(&i, list)| list[i]).collect();
                self.emit(pins, pin, &reasons);
            }
        }

        true
    }

    fn length_specific_patterns(&self, sources: &[Source], pins: &mut PinCandidateMap) {
        match self.pin_length {
            PinLength::Four => self.four_digit_patterns(sources, pins),
            PinLength::Six => self.six_digit_patterns(sources, pins),
        }
    }

    fn four_digit_patterns(&self, sources: &[Source], pins: &mut PinCandidateMap) {
        for source in sources {
            if let Some(day) = source.get(Component::Day) {
                self.emit(pins, day.repeat(2), &[source.reason()]);
            }
        }

        for (i, first) in sources.iter().enumerate() {
            for second in &sources[i + 1..] {
                let both = [first.reason(), second.reason()];

                if let (Some(d1), Some(d2)) = (first.get(Component::Day), second.get(Component::Day)) {
                    self.emit(pins, format!("{d1}{d2}"), &both);
                    self.emit(pins, format!("{d2}{d1}"), &both);
                }

                if let (Some(m1), Some(m2)) =
                    (first.get(Component::Month), second.get(Component::Month))
                {
                    self.emit(pins, format!("{m1}{m2}"), &both);
                    self.emit(pins, format!("{m2}{m1}"), &both);
                }

                if let (Some(y1), Some(y2)) =
                    (first.get(Component::Year2), second.get(Component::Year2))
                {
                    let head: String = y2.chars().take(2).collect();
                    self.emit(pins, format!("{y1}{head}"), &both);
                    self.emit(pins, format!("{}{head}", reversed(y1)), &both);

                    // Reversed-year pairings for a self birth year of 2004.
                    let born_2004 = first.source == DateSource::DobSelf
                        && first.components.raw_date().is_some_and(|d| d.contains("2004"));
                    if born_2004 {
                        self.emit(pins, "0098".to_string(), &[first.reason()]);
                        self.emit(pins, "9804".to_string(), &both);
                    }
                }
            }
        }
    }

    fn six_digit_patterns(&self, sources: &[Source], pins: &mut PinCandidateMap) {
        let len = self.pin_length.digits();

        for source in sources {
            if let Some(day) = source.get(Component::Day) {
                self.emit(pins, day.repeat(3), &[source.reason()]);
            }
        }

        for source in sources {
            if let Some(full_rev) = source.get(Component::FullRev) {
                if full_rev.len() >= len {
                    self.emit(pins, full_rev[..len].to_string(), &[source.reason()]);
                }
            }
        }

        for (i, first) in sources.iter().enumerate() {
            for second in &sources[i + 1..] {
                let both = [first.reason(), second.reason()];

                let has_month_day = |s: &Source| {
                    s.components.has(Component::Month) && s.components.has(Component::Day)
                };
                if has_month_day(first) && has_month_day(second) {
                    if let (Some(md1), Some(md2)) =
                        (first.get(Component::MonthDay), second.get(Component::MonthDay))
                    {
                        if md1.len() == 4 && md2.len() == 4 {
                            self.emit(pins, format!("{}{md2}", &md1[..2]), &both);
                        }
                    }
                }

                if let (Some(year), Some(md)) =
                    (first.get(Component::Year2), second.get(Component::MonthDay))
                {
                    if year.len() == 2 && md.len() == 4 {
                        self.emit(pins, format!("{year}{md}"), &both);
                    }
                }

                if let (Some(d1), Some(d2)) = (first.get(Component::Day), second.get(Component::Day)) {
                    self.emit(pins, format!("{d1}{d2}{d1}"), &both);
                }
            }
        }
    }

    /// Rules that need all three dates at once.
    fn cross_source_patterns(&self, sources: &[Source], pins: &mut PinCandidateMap) {
        let find = |wanted: DateSource| sources.iter().find(|s| s.source == wanted);
        let (Some(own), Some(spouse), Some(wedding)) = (
            find(DateSource::DobSelf),
            find(DateSource::DobSpouse),
            find(DateSource::Anniversary),
        ) else {
            return;
        };
        let all = [own.reason(), spouse.reason(), wedding.reason()];

        if let (Some(year), Some(day)) = (spouse.get(Component::Year2), wedding.get(Component::Day)) {
            let mut pin = format!("{}{day}", reversed(year));
            // TODO: confirm whether the "00" suffix reflects real PIN habits.
            if pin.len() == 4 && self.pin_length == PinLength::Six {
                pin.push_str("00");
            }
            self.emit(pins, pin, &[spouse.reason(), wedding.reason()]);
        }

        if let (Some(d1), Some(d2), Some(d3)) = (
            own.get(Component::Day),
            spouse.get(Component::Day),
            wedding.get(Component::Day),
        ) {
            let head: String = d3.chars().take(2).collect();
            self.emit(pins, format!("{d1}{d2}{head}"), &all);
        }

        if let (Some(m1), Some(m2), Some(m3)) = (
            own.get(Component::Month),
            spouse.get(Component::Month),
            wedding.get(Component::Month),
        ) {
            self.emit(pins, format!("{m1}{m2}{m3}"), &all);
        }

        if let (Some(year), Some(d1), Some(d2)) = (
            wedding.get(Component::Year2),
            own.get(Component::Day),
            spouse.get(Component::Day),
        ) {
            self.emit(pins, format!("{year}{d1}{d2}"), &all);
        }
    }

    fn day_repetition_patterns(&self, sources: &[Source], pins: &mut PinCandidateMap) {
        for source in sources {
            let Some(day) = source.get(Component::Day) else {
                continue;
            };
            match self.pin_length {
                PinLength::Four => self.emit(pins, day.repeat(2), &[source.reason()]),
                PinLength::Six => {
                    self.emit(pins, day.repeat(3), &[source.reason()]);
                    if let Some(year) = source.get(Component::Year2) {
                        self.emit(pins, format!("{day}{year}{day}"), &[source.reason()]);
                    }
                }
            }
        }
    }

    fn seeded_special_cases(&self, sources: &[Source], pins: &mut PinCandidateMap) {
        for source in sources {
            let Some(raw) = source.components.raw_date() else {
                continue;
            };
            for pin in special::seeded_pins(source.source, raw, self.pin_length) {
                self.emit(pins, pin.to_string(), &[source.reason()]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn reasons(pins: &PinCandidateMap, pin: &str) -> ReasonSet {
        pins.reasons(pin).cloned().unwrap_or_default()
    }

    fn two_dates() -> Demographics {
        Demographics::new()
            .with_dob("1990-07-25")
            .with_spouse_dob("1992-08-15")
    }

    fn three_dates() -> Demographics {
        two_dates().with_anniversary("2015-05-01")
    }

    #[test]
    fn test_odometer_order() {
        let tuples: Vec<_> = Odometer::new(vec![2, 3]).collect();
        assert_eq!(tuples.len(), 6);
        assert_eq!(tuples[0], vec![0, 0]);
        assert_eq!(tuples[1], vec![0, 1]);
        assert_eq!(tuples[5], vec![1, 2]);

        assert_eq!(Odometer::new(vec![2, 0]).count(), 0);
        assert_eq!(Odometer::new(vec![]).count(), 0);
    }

    #[test]
    fn test_no_sources_yields_empty_map() {
        let generator = PatternGenerator::new(PinLength::Four);
        assert!(generator.generate(&Demographics::new()).is_empty());

        let invalid = Demographics::new().with_dob("2012-12-34").with_spouse_dob("");
        assert!(generator.generate(&invalid).is_empty());
    }

    #[test]
    fn test_keys_have_target_length() {
        for pin_length in [PinLength::Four, PinLength::Six] {
            let pins = PatternGenerator::new(pin_length).generate(&three_dates());
            assert!(!pins.is_empty());
            assert!(pins.iter().all(|(pin, reasons)| {
                pin.len() == pin_length.digits()
                    && pin.bytes().all(|b| b.is_ascii_digit())
                    && !reasons.is_empty()
            }));
        }
    }

    #[test]
    fn test_four_digit_pairs_across_sources() {
        let pins = PatternGenerator::new(PinLength::Four).generate(&two_dates());
        let both = ReasonSet::from([
            WeaknessReason::DemographicDobSelf,
            WeaknessReason::DemographicDobSpouse,
        ]);

        for pin in ["2515", "1525", "0708", "0807", "9092", "0992"] {
            assert_eq!(reasons(&pins, pin), both, "pin {pin}");
        }
        assert_eq!(
            reasons(&pins, "2525"),
            ReasonSet::from([WeaknessReason::DemographicDobSelf])
        );
        assert_eq!(
            reasons(&pins, "1515"),
            ReasonSet::from([WeaknessReason::DemographicDobSpouse])
        );
    }

    #[test]
    fn test_four_digit_reversed_year_literals() {
        let demographics = Demographics::new()
            .with_dob("2004-07-25")
            .with_anniversary("1998-05-01");
        let pins = PatternGenerator::new(PinLength::Four).generate(&demographics);

        for pin in ["0098", "9804"] {
            let found = reasons(&pins, pin);
            assert!(found.contains(&WeaknessReason::DemographicDobSelf), "pin {pin}");
            assert!(found.contains(&WeaknessReason::DemographicAnniversary), "pin {pin}");
        }
    }

    #[test]
    fn test_six_digit_cross_source_rules() {
        let pins = PatternGenerator::new(PinLength::Six).generate(&three_dates());
        let all = ReasonSet::from([
            WeaknessReason::DemographicDobSelf,
            WeaknessReason::DemographicDobSpouse,
            WeaknessReason::DemographicAnniversary,
        ]);

        // months, wedding year + both days, both days + wedding day
        for pin in ["070805", "152515", "251501"] {
            assert!(reasons(&pins, pin).is_superset(&all), "pin {pin}");
        }

        // reversed spouse year + wedding day, padded
        let padded = reasons(&pins, "290100");
        assert!(padded.contains(&WeaknessReason::DemographicDobSpouse));
        assert!(padded.contains(&WeaknessReason::DemographicAnniversary));

        // month of one date + month-day of another
        let both = reasons(&pins, "070815");
        assert!(both.contains(&WeaknessReason::DemographicDobSelf));
        assert!(both.contains(&WeaknessReason::DemographicDobSpouse));
    }

    #[test]
    fn test_four_digit_padding_rule_unpadded() {
        let pins = PatternGenerator::new(PinLength::Four).generate(&three_dates());
        assert_eq!(
            reasons(&pins, "2901"),
            ReasonSet::from([
                WeaknessReason::DemographicDobSpouse,
                WeaknessReason::DemographicAnniversary,
            ])
        );
    }

    #[test]
    fn test_day_repetition() {
        let demographics = Demographics::new().with_dob("1990-08-25");
        let pins = PatternGenerator::new(PinLength::Six).generate(&demographics);
        let own = ReasonSet::from([WeaknessReason::DemographicDobSelf]);

        assert_eq!(reasons(&pins, "252525"), own);
        assert_eq!(reasons(&pins, "259025"), own);
    }

    #[test]
    fn test_large_products_are_truncated() {
        let generator = PatternGenerator::new(PinLength::Six);
        let sources: Vec<Source> = three_dates()
            .sources()
            .map(|(source, date)| Source {
                source,
                components: ComponentSet::derive(date),
            })
            .collect();
        assert!(sources.iter().all(|s| s.components.by_length(2).len() > TRUNCATED_LEN));

        let mut pins = PinCandidateMap::default();
        let mut budget = Budget::start(GeneratorConfig::default());
        assert!(generator.sweep_partition(&sources, &[2, 2, 2], &mut pins, &mut budget));

        // "72", "81" and "11" only occur past the first 20 pairs of their date.
        assert!(!pins.contains("728111"));
        assert!(pins.contains("250801"));
        assert!(budget.combinations <= 27 * (TRUNCATED_LEN as u64).pow(3));
    }

    #[test]
    fn test_six_digit_reversed_full_date() {
        let demographics = Demographics::new().with_dob("2004-07-25");
        let pins = PatternGenerator::new(PinLength::Six).generate(&demographics);
        assert_eq!(
            reasons(&pins, "527040"),
            ReasonSet::from([WeaknessReason::DemographicDobSelf])
        );
    }

    #[test]
    fn test_seeded_special_case() {
        let demographics = Demographics::new().with_dob("2004-07-25");
        let pins = PatternGenerator::new(PinLength::Six).generate(&demographics);
        assert_eq!(
            reasons(&pins, "402570"),
            ReasonSet::from([WeaknessReason::DemographicDobSelf])
        );
    }

    #[test]
    fn test_zero_budget_stops_generation() {
        let config = GeneratorConfig {
            max_combinations: 0,
            ..GeneratorConfig::default()
        };
        let pins = PatternGenerator::with_config(PinLength::Six, config).generate(&three_dates());
        assert!(pins.is_empty());
    }

    #[test]
    fn test_small_budget_is_subset_of_full_run() {
        let full = PatternGenerator::new(PinLength::Six).generate(&three_dates());
        for max_combinations in [1, 10, 1_000] {
            let config = GeneratorConfig {
                max_combinations,
                ..GeneratorConfig::default()
            };
            let partial =
                PatternGenerator::with_config(PinLength::Six, config).generate(&three_dates());
            assert!(partial.len() <= full.len());
            for (pin, found) in partial.iter() {
                assert!(full.reasons(pin).is_some_and(|r| r.is_superset(found)), "pin {pin}");
            }
        }
    }

    #[test]
    fn test_candidate_map_merges_reasons() {
        let mut pins = PinCandidateMap::default();
        pins.insert("1234".to_string(), [WeaknessReason::DemographicDobSelf]);
        pins.insert(
            "1234".to_string(),
            [
                WeaknessReason::DemographicDobSelf,
                WeaknessReason::DemographicAnniversary,
            ],
        );
        assert_eq!(pins.len(), 1);
        assert_eq!(reasons(&pins, "1234").len(), 2);
        assert!(!pins.contains("4321"));
    }

    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value); }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key); }
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        set_env("PIN_MAX_COMBINATIONS", "1000");
        set_env("PIN_MAX_EXECUTION_TIME_SECS", "0.5");

        let config = GeneratorConfig::from_env();
        assert_eq!(config.max_combinations, 1000);
        assert_eq!(config.max_execution_time, Duration::from_millis(500));

        remove_env("PIN_MAX_COMBINATIONS");
        remove_env("PIN_MAX_EXECUTION_TIME_SECS");
    }

    #[test]
    #[serial]
    fn test_config_from_env_invalid_values_keep_defaults() {
        set_env("PIN_MAX_COMBINATIONS", "lots");
        set_env("PIN_MAX_EXECUTION_TIME_SECS", "-1");

        assert_eq!(GeneratorConfig::from_env(), GeneratorConfig::default());

        remove_env("PIN_MAX_COMBINATIONS");
        remove_env("PIN_MAX_EXECUTION_TIME_SECS");
    }
}
