use crate::{
    calendar::{self, CalendarFields},
    parser,
    period::{coalesce_ranges, ExplodedPeriod, Period},
    Error, Result,
};
use chrono::{Datelike, Timelike};
use std::{
    collections::BTreeSet,
    fmt::Display,
    hash::{Hash, Hasher},
    ops::{BitAnd, BitOr, Not},
    str::FromStr,
};

/// Set of time instants described by positive and negative periods.
///
/// An instant belongs to the schedule if it matches none of the negative periods
/// and at least one of the positive periods, or there are no positive periods at all.
///
/// For expression syntax and usage examples, please refer to the [crate documentation](crate).
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String"))]
#[cfg_attr(feature = "serde", serde(into = "String"))]
pub struct Schedule {
    positive: Vec<Period>,
    negative: Vec<Period>,
}

impl Schedule {
    /// Parses and validates provided `expression` and constructs [`Schedule`] instance.
    ///
    /// Alternative way to construct [`Schedule`] is to use one of `try_from` or `from_str` methods.
    ///
    /// Returns [`Error`] in a case provided expression is unparsable or has invalid values.
    pub fn new(expression: impl AsRef<str>) -> Result<Self> {
        let (positive, negative) = parser::extract_periods(expression.as_ref())?;
        Ok(Self::from_periods(positive, negative))
    }

    /// Alias of [`Schedule::new`].
    #[inline]
    pub fn parse(expression: impl AsRef<str>) -> Result<Self> {
        Self::new(expression)
    }

    /// Constructs schedule from already parsed periods.
    ///
    /// Unconstrained periods have no textual form, so they are normalized:
    /// such a negative period makes the schedule include nothing,
    /// such a positive period makes the positive list unconstrained.
    pub fn from_periods(positive: Vec<Period>, negative: Vec<Period>) -> Self {
        if negative.iter().any(Period::is_empty) {
            return Self {
                positive: vec![Period::unsatisfiable()],
                negative: Vec::new(),
            };
        }

        let positive = if positive.iter().any(Period::is_empty) {
            Vec::new()
        } else {
            positive
        };

        Self { positive, negative }
    }

    /// Periods which include instants.
    pub fn positive_periods(&self) -> &[Period] {
        &self.positive
    }

    /// Periods which exclude instants.
    pub fn negative_periods(&self) -> &[Period] {
        &self.negative
    }

    /// Returns `true` if the schedule has no periods at all, such a schedule includes any instant.
    pub fn is_empty(&self) -> bool {
        self.positive.is_empty() && self.negative.is_empty()
    }

    /// Returns `true` if `time` belongs to the schedule.
    ///
    /// Timezone of `time` isn't taken into account, its calendar fields are used as is.
    pub fn includes<T: Datelike + Timelike>(&self, time: &T) -> bool {
        let fields = CalendarFields::new(time);
        let matches = |periods: &[Period]| periods.iter().any(|period| period.matches(&fields));

        !matches(&self.negative) && (self.positive.is_empty() || matches(&self.positive))
    }

    /// Parses `time` and checks if it belongs to the schedule.
    ///
    /// RFC 3339, RFC 2822, `2015-12-15 12:00:00`, `2015-12-15 12:00:00 AM` (both optionally
    /// followed by `UTC`), `2015-12-15T12:00:00`, `2015-12-15 12:00`, `Tue Dec 15 12:00:00 2015`
    /// and `2015-12-15` forms are understood,
    /// [`Error::InvalidTimestamp`] is returned for anything else.
    pub fn includes_str(&self, time: &str) -> Result<bool> {
        Ok(self.includes(&calendar::parse_timestamp(time)?))
    }

    /// Returns `true` if the current local time belongs to the schedule.
    #[cfg(feature = "clock")]
    pub fn is_now(&self) -> bool {
        self.includes(&chrono::Local::now())
    }

    /// Returns schedule which includes instants of both schedules.
    ///
    /// The result may include more than the exact union when negative periods are involved:
    /// an instant is excluded only if it's excluded by both schedules.
    pub fn union(&self, other: &Self) -> Self {
        let positive = if self.positive.is_empty() || other.positive.is_empty() {
            Vec::new()
        } else {
            self.positive.iter().chain(other.positive.iter()).cloned().collect()
        };

        Self {
            positive,
            negative: intersect_periods(&self.negative, &other.negative),
        }
    }

    /// Returns schedule which includes instants belonging to both schedules.
    pub fn intersection(&self, other: &Self) -> Self {
        let positive = match (self.positive.is_empty(), other.positive.is_empty()) {
            (true, _) => other.positive.clone(),
            (_, true) => self.positive.clone(),
            _ => {
                let positive = intersect_periods(&self.positive, &other.positive);
                if positive.is_empty() {
                    vec![Period::unsatisfiable()]
                } else {
                    positive
                }
            }
        };

        Self {
            positive,
            negative: self.negative.iter().chain(other.negative.iter()).cloned().collect(),
        }
    }

    /// Returns schedule with positive and negative periods swapped.
    pub fn complement(&self) -> Self {
        Self {
            positive: self.negative.clone(),
            negative: self.positive.clone(),
        }
    }

    /// Returns `true` if positive periods of both schedules have no instant in common.
    ///
    /// Schedules without positive periods are never exclusive.
    pub fn is_exclusive(&self, other: &Self) -> bool {
        !self.positive.is_empty()
            && !other.positive.is_empty()
            && intersect_periods(&self.positive, &other.positive).is_empty()
    }

    /// Opposite of [`Schedule::is_exclusive`].
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        !self.is_exclusive(other)
    }
}

/// Intersects every period of `left` with every period of `right`.
///
/// Pairs without common values for some scale are dropped, so empty result means that
/// no combination is satisfiable. The result isn't minimized and may contain redundant periods.
///
/// Ranges are expanded into sets of values, so the cost is `O(left × right × domain size)`.
pub fn intersect_periods(left: &[Period], right: &[Period]) -> Vec<Period> {
    let left = left.iter().map(Period::explode).collect::<Vec<_>>();
    let right = right.iter().map(Period::explode).collect::<Vec<_>>();

    let periods = left
        .iter()
        .flat_map(|l| right.iter().filter_map(move |r| intersect_exploded(l, r)))
        .collect::<Vec<_>>();

    tracing::debug!(
        left = left.len(),
        right = right.len(),
        satisfiable = periods.len(),
        "intersected periods"
    );
    periods
}

/// Intersects common scales and passes one-sided scales through.
///
/// Returns `None` if the conjunction is unsatisfiable.
fn intersect_exploded(left: &ExplodedPeriod, right: &ExplodedPeriod) -> Option<Period> {
    let mut period = Period::new();

    for (scale, values) in left {
        let values = match right.get(scale) {
            Some(other) => values.intersection(other).copied().collect::<BTreeSet<_>>(),
            None => values.clone(),
        };
        if values.is_empty() {
            return None;
        }
        period = period.with(*scale, coalesce_ranges(values, *scale));
    }

    for (scale, values) in right.iter().filter(|(scale, _)| !left.contains_key(*scale)) {
        if values.is_empty() {
            return None;
        }
        period = period.with(*scale, coalesce_ranges(values.iter().copied(), *scale));
    }

    Some(period)
}

impl PartialEq for Schedule {
    fn eq(&self, other: &Self) -> bool {
        as_set(&self.positive) == as_set(&other.positive) && as_set(&self.negative) == as_set(&other.negative)
    }
}

impl Eq for Schedule {}

impl Hash for Schedule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        as_set(&self.positive).hash(state);
        as_set(&self.negative).hash(state);
    }
}

#[inline]
fn as_set(periods: &[Period]) -> BTreeSet<&Period> {
    periods.iter().collect()
}

impl BitOr for &Schedule {
    type Output = Schedule;

    fn bitor(self, rhs: Self) -> Schedule {
        self.union(rhs)
    }
}

impl BitOr for Schedule {
    type Output = Schedule;

    fn bitor(self, rhs: Self) -> Schedule {
        self.union(&rhs)
    }
}

impl BitAnd for &Schedule {
    type Output = Schedule;

    fn bitand(self, rhs: Self) -> Schedule {
        self.intersection(rhs)
    }
}

impl BitAnd for Schedule {
    type Output = Schedule;

    fn bitand(self, rhs: Self) -> Schedule {
        self.intersection(&rhs)
    }
}

impl Not for &Schedule {
    type Output = Schedule;

    fn not(self) -> Schedule {
        self.complement()
    }
}

impl Not for Schedule {
    type Output = Schedule;

    fn not(self) -> Schedule {
        Self {
            positive: self.negative,
            negative: self.positive,
        }
    }
}

impl From<Schedule> for String {
    fn from(value: Schedule) -> Self {
        value.to_string()
    }
}

impl From<&Schedule> for String {
    fn from(value: &Schedule) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Schedule {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&String> for Schedule {
    type Error = Error;

    fn try_from(value: &String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Schedule {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl FromStr for Schedule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl Display for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let negative = self
            .negative
            .iter()
            .map(|period| format!("not {period}"))
            .collect::<Vec<_>>();
        let parts = [parser::stringify(&self.positive), negative.join(", ")];

        write!(
            f,
            "{}",
            parts.into_iter().filter(|part| !part.is_empty()).collect::<Vec<_>>().join(", ")
        )
    }
}
