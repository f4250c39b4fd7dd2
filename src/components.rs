//! Date component extraction.
//!
//! Turns one ISO `YYYY-MM-DD` date into the named string fragments a person
//! might reuse when building a PIN, and assembles single-date PIN patterns
//! from them.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, NaiveDate};

use crate::types::PinLength;

/// Named fragment of a date.
///
/// Declaration order is the iteration order of a [`ComponentSet`], which in
/// turn fixes the order of [`ComponentSet::by_length`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Component {
    Day,
    DayUnpadded,
    Month,
    MonthUnpadded,
    Year2,
    Year4,
    Century,
    YearLow,
    DayRev,
    MonthRev,
    Year2Rev,
    Year4Rev,
    DayDigit1,
    DayDigit2,
    MonthDigit1,
    MonthDigit2,
    YearDigit1,
    YearDigit2,
    YearDigit3,
    YearDigit4,
    FullRev,
    DayDay,
    MonthDay,
    DayMonth,
    YearMonthDay,
    MonthDayYear,
    YearDay,
    DayYear,
    RawDate,
}

impl Component {
    /// Short label of the component (`D`, `MD`, `FULL_REV`, ...).
    pub fn label(self) -> &'static str {
        match self {
            Component::Day => "D",
            Component::DayUnpadded => "D_nz",
            Component::Month => "M",
            Component::MonthUnpadded => "M_nz",
            Component::Year2 => "YY",
            Component::Year4 => "YYYY",
            Component::Century => "YY_1",
            Component::YearLow => "YY_2",
            Component::DayRev => "D_rev",
            Component::MonthRev => "M_rev",
            Component::Year2Rev => "YY_rev",
            Component::Year4Rev => "YYYY_rev",
            Component::DayDigit1 => "D_1",
            Component::DayDigit2 => "D_2",
            Component::MonthDigit1 => "M_1",
            Component::MonthDigit2 => "M_2",
            Component::YearDigit1 => "Y_1",
            Component::YearDigit2 => "Y_2",
            Component::YearDigit3 => "Y_3",
            Component::YearDigit4 => "Y_4",
            Component::FullRev => "FULL_REV",
            Component::DayDay => "DD",
            Component::MonthDay => "MD",
            Component::DayMonth => "DM",
            Component::YearMonthDay => "YMD",
            Component::MonthDayYear => "MDY",
            Component::YearDay => "YYDD",
            Component::DayYear => "DDAY",
            Component::RawDate => "RAW_DATE",
        }
    }
}

use Component::*;

const FOUR_DIGIT_TEMPLATES: &[&[Component]] = &[
    &[Day, Month],
    &[Month, Day],
    &[Year2, Month],
    &[Month, Year2],
    &[Year2, Day],
    &[Day, Year2],
    &[Century, YearLow],
    &[Day, Day],
    &[Month, Month],
    &[DayRev, MonthRev],
    &[Year2Rev, DayRev],
    // Year alone; the length filter drops it for two-digit years.
    &[Year2],
];

const SIX_DIGIT_TEMPLATES: &[&[Component]] = &[
    &[Day, Month, Year2],
    &[Month, Day, Year2],
    &[Year2, Month, Day],
    &[Day, Year2, Month],
    &[Month, Year2, Day],
    &[Year2, Day, Month],
    &[Year4, Day],
    &[Year4, Month],
    &[Day, Day, Day],
    &[Month, Month, Month],
    &[Day, Month, Day],
    &[Month, Day, Month],
    &[YearMonthDay],
    &[MonthDayYear],
    &[DayDay, Year2],
    &[Year2, DayDay],
    &[FullRev],
];

/// Parses a strict ISO date. Years outside `1000..=9999` are rejected so that
/// every year-derived component has a fixed width.
pub fn parse_date(date: &str) -> Option<NaiveDate> {
    // chrono tolerates leading whitespace and a sign on numeric fields
    if !date.starts_with(|c: char| c.is_ascii_digit())
        || !date.bytes().all(|b| b.is_ascii_digit() || b == b'-')
    {
        return None;
    }
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    (1000..=9999).contains(&parsed.year()).then_some(parsed)
}

fn reversed(value: &str) -> String {
    value.chars().rev().collect()
}

/// All components derived from one date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentSet {
    values: BTreeMap<Component, String>,
}

impl ComponentSet {
    /// Derives the components of `date`.
    ///
    /// Missing or unparseable dates yield an empty set.
    pub fn derive(date: &str) -> Self {
        let Some(parsed) = parse_date(date) else {
            return Self::default();
        };

        let day = format!("{:02}", parsed.day());
        let month = format!("{:02}", parsed.month());
        let year = parsed.year();
        let yy = format!("{:02}", year % 100);
        let yyyy = year.to_string();
        let full = format!("{yyyy}{month}{day}");

        let nth = |s: &str, i: usize| s[i..i + 1].to_string();

        let values = BTreeMap::from([
            (Day, day.clone()),
            (DayUnpadded, parsed.day().to_string()),
            (Month, month.clone()),
            (MonthUnpadded, parsed.month().to_string()),
            (Year2, yy.clone()),
            (Year4, yyyy.clone()),
            (Century, format!("{:02}", year / 100)),
            (YearLow, yy.clone()),
            (DayRev, reversed(&day)),
            (MonthRev, reversed(&month)),
            (Year2Rev, reversed(&yy)),
            (Year4Rev, reversed(&yyyy)),
            (DayDigit1, nth(&day, 0)),
            (DayDigit2, nth(&day, 1)),
            (MonthDigit1, nth(&month, 0)),
            (MonthDigit2, nth(&month, 1)),
            (YearDigit1, nth(&yyyy, 0)),
            (YearDigit2, nth(&yyyy, 1)),
            (YearDigit3, nth(&yyyy, 2)),
            (YearDigit4, nth(&yyyy, 3)),
            (FullRev, reversed(&full)),
            (DayDay, format!("{day}{day}")),
            (MonthDay, format!("{month}{day}")),
            (DayMonth, format!("{day}{month}")),
            (YearMonthDay, format!("{yy}{month}{day}")),
            (MonthDayYear, format!("{month}{day}{yy}")),
            (YearDay, format!("{yy}{day}")),
            (DayYear, format!("{day}{yy}")),
            (RawDate, date.to_string()),
        ]);

        Self { values }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn has(&self, component: Component) -> bool {
        self.values.contains_key(&component)
    }

    pub fn get(&self, component: Component) -> Option<&str> {
        self.values.get(&component).map(String::as_str)
    }

    /// The raw input date, if the set is non-empty.
    pub fn raw_date(&self) -> Option<&str> {
        self.get(RawDate)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Component, &str)> {
        self.values.iter().map(|(c, v)| (*c, v.as_str()))
    }

    /// Concatenates the named components, or `None` if any is missing.
    pub fn concat(&self, template: &[Component]) -> Option<String> {
        template
            .iter()
            .map(|c| self.get(*c))
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.concat())
    }

    /// Every fragment of exactly `length` characters.
    ///
    /// Components of that length come first, followed by every sliding-window
    /// substring of the longer ones. The raw date is skipped since it carries
    /// separators. Duplicates are kept.
    pub fn by_length(&self, length: usize) -> Vec<&str> {
        if length == 0 {
            return Vec::new();
        }
        let digits = || self.iter().filter(|(c, _)| *c != RawDate).map(|(_, v)| v);

        let mut extracted: Vec<&str> = digits().filter(|v| v.len() == length).collect();
        for value in digits().filter(|v| v.len() > length) {
            extracted.extend((0..=value.len() - length).map(|i| &value[i..i + length]));
        }
        extracted
    }

    /// Single-date PIN patterns of `pin_length` built from this set.
    pub fn patterns(&self, pin_length: PinLength) -> HashSet<String> {
        let mut patterns = HashSet::new();
        if self.is_empty() {
            return patterns;
        }
        let len = pin_length.digits();

        let templates = match pin_length {
            PinLength::Four => FOUR_DIGIT_TEMPLATES,
            PinLength::Six => SIX_DIGIT_TEMPLATES,
        };

        for template in templates {
            let Some(pattern) = self.concat(template) else {
                continue;
            };
            if pattern.len() != len {
                continue;
            }
            if !template.contains(&FullRev) {
                patterns.insert(reversed(&pattern));
            }
            patterns.insert(pattern);
        }

        if let Some(day) = self.get(Day) {
            match pin_length {
                PinLength::Four => {
                    patterns.insert(day.repeat(2));
                }
                PinLength::Six => {
                    patterns.insert(day.repeat(3));
                    if let Some(month) = self.get(Month) {
                        patterns.insert(format!("{month}{day}{month}"));
                        patterns.insert(format!("{day}{month}{day}"));
                    }
                }
            }
        }

        patterns
    }
}

/// Single-date PIN patterns derived from `date`; empty for invalid dates.
pub fn date_patterns(date: &str, pin_length: PinLength) -> HashSet<String> {
    ComponentSet::derive(date).patterns(pin_length)
}
