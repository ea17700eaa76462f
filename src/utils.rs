/// Common utility functions.
use crate::period::ValueType;

/// Converts decimal string into unsigned number with bounds validation.
///
/// Leading zeros are accepted, signs and any other characters are not.
pub(crate) fn parse_digital_value(input: &str, min: ValueType, max: ValueType) -> Option<ValueType> {
    if !is_digital(input) {
        return None;
    }

    input
        .parse::<ValueType>()
        .ok()
        .filter(|value| *value >= min && *value <= max)
}

/// Converts string with mnemonic value representation into its index in `values`.
pub(crate) fn parse_string_value(input: &str, values: &[&str]) -> Option<ValueType> {
    if input.is_empty() {
        None
    } else {
        values
            .iter()
            .position(|&x| x.eq_ignore_ascii_case(input))
            .map(|i| i as ValueType)
    }
}

/// Returns `true` if the string is a non-empty sequence of ASCII digits.
#[inline]
pub(crate) fn is_digital(input: &str) -> bool {
    !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit())
}

/// Returns week of the month for the day `day` which falls on the day of week `dow` (Sunday is `0`).
///
/// The first week lasts until the first Sunday after the 1st day of the month,
/// every following Sunday starts a new week.
pub(crate) fn week_of_month(day: ValueType, dow: ValueType) -> ValueType {
    if day == 0 || dow > 6 {
        panic!("Invalid day of month or day of week: {day}/{dow}");
    }

    if day < 2 {
        return 1;
    }

    // number of days from the 2nd to `day`, inclusively
    let days = day - 1;
    let second_dow = (dow + 7 - (day - 2) % 7) % 7;
    let first_sunday = (7 - second_dow) % 7;

    if first_sunday >= days {
        1
    } else {
        2 + (days - 1 - first_sunday) / 7
    }
}
