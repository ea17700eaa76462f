use crate::calendar::CalendarFields;
use chrono::{Datelike, Timelike};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Display,
};

/// Numeric representation of a single scale value.
pub type ValueType = u16;

/// Minimum valid year.
pub const MIN_YEAR: ValueType = 2000;
/// Maximum valid year, the upper sentinel which year ranges never reach.
pub const MAX_YEAR: ValueType = 9999;

const DAYS_OF_WEEK: &[&str] = &["sun", "mon", "tue", "wed", "thu", "fri", "sat"];
const DAYS_OF_WEEK_FULL: &[&str] = &[
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];
const MONTHS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];
const MONTHS_FULL: &[&str] = &[
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// How a single value of a scale expands into a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Boundary {
    /// Range end is the last included value, `[start, end]`.
    Inclusive,
    /// Range end is one past the last included value, `[start, end)`.
    Exclusive,
}

/// Calendar dimension which a period constrains.
///
/// Variants are ordered from the largest unit to the smallest one,
/// and this order is used to render periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scale {
    /// Year, `2000-9999`.
    Year,
    /// Month, `1-12` or `jan-dec`, `0` isn't accepted.
    Month,
    /// Week of the month, `1-5`.
    Week,
    /// Day of the year, `1-366`.
    YearDay,
    /// Day of the month, `1-31`, `0` isn't accepted.
    MonthDay,
    /// Day of the week, `0-6` or `sun-sat`.
    WeekDay,
    /// Hour, `0-24` or `1am-12pm`.
    Hour,
    /// Minute, `0-60`.
    Minute,
    /// Second, `0-60`.
    Second,
}

/// Static facts about a scale.
pub(crate) struct ScaleSpec {
    pub(crate) name: &'static str,
    pub(crate) code: &'static str,
    pub(crate) min: ValueType,
    pub(crate) max: ValueType,
    pub(crate) boundary: Boundary,
    /// Symbolic names, abbreviated table first, and the value of the first name.
    pub(crate) names: Option<(&'static [&'static str], &'static [&'static str], ValueType)>,
    pub(crate) value_of: fn(&CalendarFields) -> ValueType,
}

static SCALES: [ScaleSpec; 9] = [
    ScaleSpec {
        name: "year",
        code: "yr",
        min: MIN_YEAR,
        max: MAX_YEAR,
        boundary: Boundary::Inclusive,
        names: None,
        value_of: |f| f.year,
    },
    ScaleSpec {
        name: "month",
        code: "mo",
        min: 1,
        max: 12,
        boundary: Boundary::Inclusive,
        names: Some((MONTHS, MONTHS_FULL, 1)),
        value_of: |f| f.month,
    },
    // Week of the month may be computed as 6, which is outside of the domain.
    ScaleSpec {
        name: "week",
        code: "wk",
        min: 1,
        max: 5,
        boundary: Boundary::Inclusive,
        names: None,
        value_of: |f| f.week,
    },
    ScaleSpec {
        name: "yday",
        code: "yd",
        min: 1,
        max: 366,
        boundary: Boundary::Inclusive,
        names: None,
        value_of: |f| f.year_day,
    },
    ScaleSpec {
        name: "mday",
        code: "md",
        min: 1,
        max: 31,
        boundary: Boundary::Inclusive,
        names: None,
        value_of: |f| f.month_day,
    },
    ScaleSpec {
        name: "wday",
        code: "wd",
        min: 0,
        max: 6,
        boundary: Boundary::Inclusive,
        names: Some((DAYS_OF_WEEK, DAYS_OF_WEEK_FULL, 0)),
        value_of: |f| f.week_day,
    },
    ScaleSpec {
        name: "hour",
        code: "hr",
        min: 0,
        max: 24,
        boundary: Boundary::Exclusive,
        names: None,
        value_of: |f| f.hour,
    },
    ScaleSpec {
        name: "minute",
        code: "min",
        min: 0,
        max: 60,
        boundary: Boundary::Exclusive,
        names: None,
        value_of: |f| f.minute,
    },
    ScaleSpec {
        name: "second",
        code: "sec",
        min: 0,
        max: 60,
        boundary: Boundary::Exclusive,
        names: None,
        value_of: |f| f.second,
    },
];

impl Scale {
    /// All scales in rendering order.
    pub const ALL: [Scale; 9] = [
        Self::Year,
        Self::Month,
        Self::Week,
        Self::YearDay,
        Self::MonthDay,
        Self::WeekDay,
        Self::Hour,
        Self::Minute,
        Self::Second,
    ];

    #[inline]
    pub(crate) fn spec(self) -> &'static ScaleSpec {
        &SCALES[self as usize]
    }

    /// Full name of the scale as it's written in expressions, i.e. `hour`.
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Short code of the scale, i.e. `hr`.
    pub fn code(self) -> &'static str {
        self.spec().code
    }

    /// Closed domain of valid values.
    pub fn min_max(self) -> (ValueType, ValueType) {
        let spec = self.spec();
        (spec.min, spec.max)
    }

    /// Boundary mode of the scale's ranges.
    pub fn boundary(self) -> Boundary {
        self.spec().boundary
    }

    /// Looks up a scale by its full name or short code.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|scale| scale.name().eq_ignore_ascii_case(name) || scale.code().eq_ignore_ascii_case(name))
    }

    #[inline]
    pub(crate) fn value_of(self, fields: &CalendarFields) -> ValueType {
        (self.spec().value_of)(fields)
    }
}

impl Display for Scale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Continuous range of scale values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValueRange {
    start: ValueType,
    end: ValueType,
    boundary: Boundary,
}

impl ValueRange {
    /// Constructs range from `start` to `end`, the meaning of `end` depends on the `boundary`.
    pub fn new(start: ValueType, end: ValueType, boundary: Boundary) -> Self {
        Self { start, end, boundary }
    }

    /// Constructs range which covers exactly one unit.
    pub fn single(value: ValueType, boundary: Boundary) -> Self {
        match boundary {
            Boundary::Inclusive => Self::new(value, value, boundary),
            Boundary::Exclusive => Self::new(value, value + 1, boundary),
        }
    }

    /// First included value.
    pub fn start(&self) -> ValueType {
        self.start
    }

    /// Upper bound: the last included value for inclusive ranges, one past it for exclusive ones.
    pub fn end(&self) -> ValueType {
        self.end
    }

    /// Boundary mode of the range.
    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Returns `true` if the range covers `value`.
    #[inline]
    pub fn contains(&self, value: ValueType) -> bool {
        match self.boundary {
            Boundary::Inclusive => self.start <= value && value <= self.end,
            Boundary::Exclusive => self.start <= value && value < self.end,
        }
    }

    /// Returns `true` if the range covers exactly one unit.
    pub fn is_single(&self) -> bool {
        match self.boundary {
            Boundary::Inclusive => self.start == self.end,
            Boundary::Exclusive => self.start + 1 == self.end,
        }
    }

    /// Iterates over all values covered by the range.
    pub fn values(&self) -> impl Iterator<Item = ValueType> {
        match self.boundary {
            Boundary::Inclusive => self.start..self.end + 1,
            Boundary::Exclusive => self.start..self.end,
        }
    }
}

impl Display for ValueRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Coalesces integer `values` of the `scale` into the minimal sorted list of continuous ranges.
///
/// Empty input produces empty list.
pub fn coalesce_ranges(values: impl IntoIterator<Item = ValueType>, scale: Scale) -> Vec<ValueRange> {
    let boundary = scale.boundary();
    let values = values.into_iter().collect::<BTreeSet<_>>();
    tracing::trace!(%scale, count = values.len(), "coalescing values into ranges");

    let mut ranges = Vec::new();
    let mut values = values.into_iter();
    let Some(mut start) = values.next() else {
        return ranges;
    };
    let mut last = start;

    for value in values {
        if value != last + 1 {
            ranges.push(ValueRange::new(start, run_end(last, boundary), boundary));
            start = value;
        }
        last = value;
    }
    ranges.push(ValueRange::new(start, run_end(last, boundary), boundary));

    ranges
}

#[inline]
fn run_end(last: ValueType, boundary: Boundary) -> ValueType {
    match boundary {
        Boundary::Inclusive => last,
        Boundary::Exclusive => last + 1,
    }
}

/// Values of each constrained scale of a period.
pub(crate) type ExplodedPeriod = BTreeMap<Scale, BTreeSet<ValueType>>;

/// Conjunction of per-scale range constraints.
///
/// A scale without constraint matches any value,
/// a scale constrained by an empty list of ranges matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    ranges: BTreeMap<Scale, Vec<ValueRange>>,
}

impl Period {
    /// Constructs period without any constraint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Period which matches nothing.
    pub(crate) fn unsatisfiable() -> Self {
        Self::new().with(Scale::Year, Vec::new())
    }

    /// Returns the period with `scale` constrained by `ranges`, replacing the previous constraint of the scale.
    pub fn with(mut self, scale: Scale, ranges: Vec<ValueRange>) -> Self {
        self.ranges.insert(scale, ranges);
        self
    }

    /// Ranges of the `scale`, if it's constrained.
    pub fn get(&self, scale: Scale) -> Option<&[ValueRange]> {
        self.ranges.get(&scale).map(Vec::as_slice)
    }

    /// Iterates over constrained scales and their ranges.
    pub fn iter(&self) -> impl Iterator<Item = (Scale, &[ValueRange])> {
        self.ranges.iter().map(|(scale, ranges)| (*scale, ranges.as_slice()))
    }

    /// Returns `true` if no scale is constrained.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Returns `false` if some scale is constrained by an empty list of ranges.
    pub fn is_satisfiable(&self) -> bool {
        self.ranges.values().all(|ranges| !ranges.is_empty())
    }

    /// Returns `true` if `time` matches every constrained scale of the period.
    pub fn includes<T: Datelike + Timelike>(&self, time: &T) -> bool {
        self.matches(&CalendarFields::new(time))
    }

    pub(crate) fn matches(&self, fields: &CalendarFields) -> bool {
        self.ranges.iter().all(|(scale, ranges)| {
            let value = scale.value_of(fields);
            ranges.iter().any(|range| range.contains(value))
        })
    }

    /// Expands every range into the set of its values.
    pub(crate) fn explode(&self) -> ExplodedPeriod {
        self.ranges
            .iter()
            .map(|(scale, ranges)| (*scale, ranges.iter().flat_map(ValueRange::values).collect()))
            .collect()
    }
}

impl FromIterator<(Scale, Vec<ValueRange>)> for Period {
    fn from_iter<I: IntoIterator<Item = (Scale, Vec<ValueRange>)>>(iter: I) -> Self {
        Self {
            ranges: iter.into_iter().collect(),
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scales = self
            .ranges
            .iter()
            .map(|(scale, ranges)| {
                let ranges = ranges.iter().map(|r| r.to_string()).collect::<Vec<_>>().join(" ");
                format!("{} {{ {} }}", scale.code(), ranges)
            })
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "{}", scales)
    }
}
