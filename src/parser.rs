//! Schedule expressions are comma-separated sub-expressions, each one is a conjunction of
//! per-scale constraints like `wd {Mon-Fri} hr {9am-5pm}`, optionally negated with
//! `!`, `not ` or `except `.

use crate::{
    period::{Period, Scale, ValueRange, ValueType},
    utils, Error, Result,
};

pub use crate::period::coalesce_ranges;

/// Prefixes which make a sub-expression negative.
const NEGATIONS: [&str; 3] = ["!", "not ", "except "];

/// Parses `expression` into lists of positive and negative periods.
///
/// Blank expression produces two empty lists. Trailing commas are ignored,
/// while an empty sub-expression anywhere else is an error.
pub fn extract_periods(expression: &str) -> Result<(Vec<Period>, Vec<Period>)> {
    let expression = expression
        .trim_end_matches(|c: char| c == ',' || c.is_whitespace())
        .trim()
        .to_lowercase();
    let mut positive = Vec::new();
    let mut negative = Vec::new();

    if expression.is_empty() {
        return Ok((positive, negative));
    }

    for subexpression in expression.split(',') {
        let (period, is_negative) = extract_period(subexpression)?;
        if is_negative {
            negative.push(period);
        } else {
            positive.push(period);
        }
    }

    Ok((positive, negative))
}

/// Parses a single sub-expression into a period and its negation flag.
///
/// Scale tokens may be separated by whitespace or follow each other directly,
/// i.e. `hr{8}wd{mon}`. If a scale is repeated, the last occurrence wins.
pub fn extract_period(expression: &str) -> Result<(Period, bool)> {
    let expression = expression.trim().to_lowercase();
    let (mut position, is_negative) = skip_negation(&expression);
    let mut period = Period::new();
    let mut found = false;

    loop {
        let rest = &expression[position..];
        let token = rest.trim_start();
        if token.is_empty() && found {
            break;
        }

        let Some((scale, ranges, consumed)) = scan_scale(token) else {
            return Err(Error::MalformedSchedule {
                position,
                rest: rest.to_owned(),
            });
        };

        period = period.with(scale, extract_ranges(scale, ranges)?);
        position += rest.len() - token.len() + consumed;
        found = true;
    }

    Ok((period, is_negative))
}

/// Renders periods in the canonical form which parses back to the same periods.
pub fn stringify<'a>(periods: impl IntoIterator<Item = &'a Period>) -> String {
    periods
        .into_iter()
        .map(|period| period.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Returns position after the negation marker (with trailing whitespace) and whether it's present.
fn skip_negation(expression: &str) -> (usize, bool) {
    let trimmed = expression.trim_start();
    let leading = expression.len() - trimmed.len();

    NEGATIONS
        .iter()
        .find_map(|negation| trimmed.strip_prefix(negation))
        .map(|rest| (expression.len() - rest.trim_start().len(), true))
        .unwrap_or((leading, false))
}

/// Scans `<scale>s? { <ranges> }` at the beginning of `input`.
///
/// Returns scale, text of the ranges and the number of consumed bytes.
fn scan_scale(input: &str) -> Option<(Scale, &str, usize)> {
    let (scale, alias) = Scale::ALL
        .into_iter()
        .flat_map(|scale| [(scale, scale.name()), (scale, scale.code())])
        .filter(|(_, alias)| input.starts_with(alias))
        .max_by_key(|(_, alias)| alias.len())?;

    let rest = &input[alias.len()..];
    let rest = rest.strip_prefix('s').unwrap_or(rest);
    let rest = rest.trim_start().strip_prefix('{')?;
    let close = rest.find('}')?;

    Some((scale, rest[..close].trim(), input.len() - rest.len() + close + 1))
}

/// Splits ranges text into tokens by whitespace, keeping `a - b` together.
fn split_tokens(input: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut glue = false;

    for word in input.split_whitespace() {
        match tokens.last_mut() {
            Some(last) if glue || word.starts_with('-') => last.push_str(word),
            _ => tokens.push(word.to_owned()),
        }
        glue = word.ends_with('-');
    }

    tokens
}

/// Extracts coalesced ranges of the `scale` from the ranges text.
fn extract_ranges(scale: Scale, input: &str) -> Result<Vec<ValueRange>> {
    let (min_value, max_value) = scale.min_max();
    let boundary = scale.boundary();
    let mut values: Vec<ValueType> = Vec::new();

    for token in split_tokens(input) {
        let (min, max) = match token.split_once('-') {
            Some((min, max)) => (min, Some(max)),
            None => (token.as_str(), None),
        };

        let min = extract_value(scale, min)?;
        let Some(max) = max else {
            values.push(min);
            continue;
        };
        let max = extract_value(scale, max)?;
        tracing::trace!(%scale, min, max, "extracted range");

        if min > max {
            tracing::debug!(%scale, "wrapped range {min}-{max}: {min_value}-{max} and {min}-{max_value}");
            values.extend(ValueRange::new(min_value, max, boundary).values());
            values.extend(ValueRange::new(min, max_value, boundary).values());
        } else {
            values.extend(ValueRange::new(min, max, boundary).values());
        }
    }

    let ranges = coalesce_ranges(values, scale);
    if scale == Scale::Year && ranges.iter().any(|range| range.end() == max_value) {
        return Err(Error::WrappedYearRange(input.to_owned()));
    }

    Ok(ranges)
}

/// Maps a single value to its integer representation and validates it against the scale's domain.
fn extract_value(scale: Scale, input: &str) -> Result<ValueType> {
    let (min, max) = scale.min_max();
    let value = match scale {
        Scale::Hour => extract_hour_value(input)?,
        Scale::Month | Scale::WeekDay => extract_mnemonic_value(scale, input)?,
        _ => utils::parse_digital_value(input, ValueType::MIN, ValueType::MAX).ok_or_else(|| invalid(scale, input))?,
    };

    if value < min || value > max {
        Err(invalid(scale, input))
    } else {
        Ok(value)
    }
}

/// Maps value like `8`, `8am`, `4pm` or `12noon` to the hour of the day.
///
/// A qualified number must be within `1-12`, only `pm` shifts it. Bare `0` is represented as `24`, the end of the day.
fn extract_hour_value(input: &str) -> Result<ValueType> {
    let digits = input.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return Err(Error::InvalidHourRange(input.to_owned()));
    }

    let (hour, qualifier) = input.split_at(digits);
    if !["", "am", "pm", "noon"].contains(&qualifier) {
        return Err(Error::InvalidHourRange(input.to_owned()));
    }

    let invalid_value = || Error::InvalidHourValue(input.to_owned());
    let hour = hour.parse::<ValueType>().map_err(|_| invalid_value())?;

    match qualifier {
        "" if hour > 24 => Err(invalid_value()),
        "" if hour == 0 => Ok(24),
        "" => Ok(hour),
        _ if hour == 0 || hour > 12 => Err(invalid_value()),
        "pm" if hour < 12 => Ok(hour + 12),
        _ => Ok(hour),
    }
}

/// Maps number or (abbreviated) name of a weekday or a month to its ordinal.
fn extract_mnemonic_value(scale: Scale, input: &str) -> Result<ValueType> {
    if utils::is_digital(input) {
        return utils::parse_digital_value(input, ValueType::MIN, ValueType::MAX).ok_or_else(|| invalid(scale, input));
    }

    let Some((abbreviated, full, first)) = scale.spec().names else {
        return Err(invalid(scale, input));
    };

    utils::parse_string_value(input, abbreviated)
        .or_else(|| utils::parse_string_value(input, full))
        .map(|index| index + first)
        .ok_or_else(|| {
            let (min, max) = scale.min_max();
            Error::InvalidMnemonicValue {
                scale,
                value: input.to_owned(),
                expected: format!("{}, {}, {min}-{max}", abbreviated.join(", "), full.join(", ")),
            }
        })
}

#[inline]
fn invalid(scale: Scale, input: &str) -> Error {
    Error::InvalidValue {
        scale,
        value: input.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::Boundary;
    use chrono::NaiveDateTime;
    use rstest::rstest;

    fn exclusive(start: ValueType, end: ValueType) -> ValueRange {
        ValueRange::new(start, end, Boundary::Exclusive)
    }

    fn inclusive(start: ValueType, end: ValueType) -> ValueRange {
        ValueRange::new(start, end, Boundary::Inclusive)
    }

    #[test]
    fn test_extract_single_period() {
        let (period, negative) = extract_period("min {25-35}").unwrap();
        assert_eq!(period, Period::new().with(Scale::Minute, vec![exclusive(25, 35)]));
        assert!(!negative);
    }

    #[test]
    fn test_extract_single_values_as_unit_ranges() {
        let (period, _) = extract_period("min {0 15 30 45}").unwrap();
        assert_eq!(
            period.get(Scale::Minute).unwrap(),
            &[exclusive(0, 1), exclusive(15, 16), exclusive(30, 31), exclusive(45, 46)]
        );
    }

    #[rstest]
    #[case("except hr {6-8}")]
    #[case("not hr {6-8}")]
    #[case("!hr {6-8}")]
    #[case("  ! hr {6-8}")]
    #[case("Except Hour {6-8}")]
    fn test_extract_negative_period(#[case] input: &str) {
        let (period, negative) = extract_period(input).unwrap();
        assert_eq!(period, Period::new().with(Scale::Hour, vec![exclusive(6, 8)]));
        assert!(negative, "input = {input}");
    }

    #[test]
    fn test_extract_periods() {
        let (positive, negative) = extract_periods("wd {Mon-Fri}, except hr {6am-8pm}").unwrap();
        assert_eq!(positive, vec![Period::new().with(Scale::WeekDay, vec![inclusive(1, 5)])]);
        assert_eq!(negative, vec![Period::new().with(Scale::Hour, vec![exclusive(6, 20)])]);

        assert_eq!(extract_periods("").unwrap(), (vec![], vec![]));
        assert_eq!(extract_periods("   ").unwrap(), (vec![], vec![]));
    }

    #[test]
    fn test_stringify() {
        let schedule = "wd { 1-5 }, hr { 6-19 }, min { 0 15 30 45 }";
        let (periods, _) = extract_periods(schedule).unwrap();
        assert_eq!(stringify(&periods), schedule);

        let (periods, _) = extract_periods("min {0-14 45-59} hours {9am-5pm} wd {Fri-Mon} yr {2015 2017}").unwrap();
        let rendered = stringify(&periods);
        assert_eq!(rendered, "yr { 2015 2017 } wd { 0-1 5-6 } hr { 9-17 } min { 0-14 45-59 }");
        assert_eq!(extract_periods(&rendered).unwrap().0, periods);
    }

    #[rstest]
    #[case("hr {22-2}", vec![exclusive(0, 2), exclusive(22, 24)])]
    #[case("hr {20-0}", vec![exclusive(20, 24)])]
    #[case("hr {0-6}", vec![exclusive(0, 6)])]
    #[case("hr {9pm-12am}", vec![exclusive(0, 12), exclusive(21, 24)])]
    #[case("hr {12am}", vec![exclusive(12, 13)])]
    #[case("hr {5noon-1pm}", vec![exclusive(5, 13)])]
    #[case("hr {8}", vec![exclusive(8, 9)])]
    #[case("hr {12pm-1pm}", vec![exclusive(12, 13)])]
    #[case("sec {45-15}", vec![exclusive(0, 15), exclusive(45, 60)])]
    #[case("wd {Fri-Mon}", vec![inclusive(0, 1), inclusive(5, 6)])]
    #[case("wd {sat sun}", vec![inclusive(0, 0), inclusive(6, 6)])]
    #[case("wd {1 - 3 5}", vec![inclusive(1, 3), inclusive(5, 5)])]
    #[case("mo {Nov-Feb}", vec![inclusive(1, 2), inclusive(11, 12)])]
    #[case("mo {june-august}", vec![inclusive(6, 8)])]
    #[case("md {01 02 03 30-02}", vec![inclusive(1, 3), inclusive(30, 31)])]
    #[case("yd {360-366}", vec![inclusive(360, 366)])]
    #[case("wk {5-1}", vec![inclusive(1, 1), inclusive(5, 5)])]
    #[case("yr {2015-2017 2019}", vec![inclusive(2015, 2017), inclusive(2019, 2019)])]
    #[case("min {}", vec![])]
    fn test_extract_ranges(#[case] input: &str, #[case] expected: Vec<ValueRange>) {
        let (period, _) = extract_period(input).unwrap();
        let (scale, ranges) = period.iter().next().unwrap();
        assert_eq!(ranges, expected.as_slice(), "input = {input}, scale = {scale}");
    }

    #[test]
    fn test_wrapped_hours_match() {
        let (period, _) = extract_period("hr {22-2}").unwrap();
        for hour in 0..24 {
            let time = NaiveDateTime::parse_from_str(&format!("2015-12-15 {hour:02}:30:00"), "%Y-%m-%d %H:%M:%S").unwrap();
            assert_eq!(period.includes(&time), [22, 23, 0, 1].contains(&hour), "hour = {hour}");
        }
    }

    #[test]
    fn test_extract_period_with_multiple_scales() {
        let (period, negative) = extract_period("hours{8-10}wdays {sat sun}  minutes {0-30}").unwrap();
        assert!(!negative);
        assert_eq!(
            period.iter().map(|(scale, _)| scale).collect::<Vec<_>>(),
            vec![Scale::WeekDay, Scale::Hour, Scale::Minute]
        );
    }

    #[test]
    fn test_extract_period_last_scale_wins() {
        let (period, _) = extract_period("hr {8} hr {9}").unwrap();
        assert_eq!(period, Period::new().with(Scale::Hour, vec![exclusive(9, 10)]));
    }

    #[rstest]
    #[case("8", 8)]
    #[case("08", 8)]
    #[case("0", 24)]
    #[case("24", 24)]
    #[case("13", 13)]
    #[case("8am", 8)]
    #[case("12am", 12)]
    #[case("1am", 1)]
    #[case("4pm", 16)]
    #[case("12pm", 12)]
    #[case("12noon", 12)]
    #[case("5noon", 5)]
    fn test_extract_hour_value(#[case] input: &str, #[case] expected: ValueType) {
        assert_eq!(extract_value(Scale::Hour, input), Ok(expected));
    }

    #[rstest]
    #[case(Scale::WeekDay, "sun", 0)]
    #[case(Scale::WeekDay, "wednesday", 3)]
    #[case(Scale::WeekDay, "6", 6)]
    #[case(Scale::Month, "jan", 1)]
    #[case(Scale::Month, "december", 12)]
    #[case(Scale::Month, "05", 5)]
    #[case(Scale::MonthDay, "07", 7)]
    #[case(Scale::YearDay, "366", 366)]
    #[case(Scale::Week, "5", 5)]
    #[case(Scale::Year, "2015", 2015)]
    #[case(Scale::Minute, "60", 60)]
    #[case(Scale::Second, "0", 0)]
    fn test_extract_value(#[case] scale: Scale, #[case] input: &str, #[case] expected: ValueType) {
        assert_eq!(extract_value(scale, input), Ok(expected));
    }

    #[rstest]
    #[case("14pm")]
    #[case("13am")]
    #[case("0am")]
    #[case("0pm")]
    #[case("28")]
    #[case("13noon")]
    #[case("0noon")]
    #[case("99999")]
    fn test_extract_invalid_hour_value(#[case] input: &str) {
        let error = extract_value(Scale::Hour, input).unwrap_err();
        assert_eq!(error, Error::InvalidHourValue(input.to_owned()));
        assert!(error.is_range_value_error());
    }

    #[rstest]
    #[case("8xm")]
    #[case("pm")]
    #[case("")]
    #[case("-8")]
    #[case("8 am")]
    fn test_extract_invalid_hour_range(#[case] input: &str) {
        let error = extract_value(Scale::Hour, input).unwrap_err();
        assert_eq!(error, Error::InvalidHourRange(input.to_owned()));
        assert!(!error.is_range_value_error());
    }

    #[rstest]
    #[case(Scale::MonthDay, "32")]
    #[case(Scale::MonthDay, "0")]
    #[case(Scale::MonthDay, "abc")]
    #[case(Scale::Month, "13")]
    #[case(Scale::Month, "0")]
    #[case(Scale::WeekDay, "7")]
    #[case(Scale::Week, "6")]
    #[case(Scale::YearDay, "367")]
    #[case(Scale::Year, "1999")]
    #[case(Scale::Year, "+2015")]
    #[case(Scale::Minute, "61")]
    #[case(Scale::Second, "-1")]
    #[case(Scale::Second, "")]
    fn test_extract_invalid_value(#[case] scale: Scale, #[case] input: &str) {
        assert_eq!(
            extract_value(scale, input),
            Err(Error::InvalidValue {
                scale,
                value: input.to_owned()
            })
        );
    }

    #[rstest]
    #[case(Scale::WeekDay, "we")]
    #[case(Scale::WeekDay, "m@n")]
    #[case(Scale::Month, "ja")]
    #[case(Scale::Month, "invalid")]
    fn test_extract_invalid_mnemonic_value(#[case] scale: Scale, #[case] input: &str) {
        let error = extract_value(scale, input).unwrap_err();
        assert!(
            matches!(&error, Error::InvalidMnemonicValue { scale: s, value, .. } if *s == scale && value == input),
            "error = {error}"
        );
    }

    #[test]
    fn test_invalid_mnemonic_value_lists_expected_values() {
        let error = extract_value(Scale::WeekDay, "we").unwrap_err();
        assert_eq!(
            error.to_string(),
            "invalid wday value: \"we\" (expected one of: sun, mon, tue, wed, thu, fri, sat, \
             sunday, monday, tuesday, wednesday, thursday, friday, saturday, 0-6)"
        );
    }

    #[rstest]
    #[case("yr {2015-2013}")]
    #[case("yr {9999}")]
    #[case("yr {2020 9990-9999}")]
    fn test_extract_wrapped_year(#[case] input: &str) {
        assert!(matches!(extract_period(input), Err(Error::WrappedYearRange(_))), "input = {input}");
    }

    #[rstest]
    #[case("wd {mon} hr 8", 8, " hr 8")]
    #[case("wd mon", 0, "wd mon")]
    #[case("wd {mon", 0, "wd {mon")]
    #[case("hrx {8}", 0, "hrx {8}")]
    #[case("mon {8}", 0, "mon {8}")]
    #[case("", 0, "")]
    #[case("!", 1, "")]
    #[case("not  wd {mon} or", 13, " or")]
    fn test_extract_malformed_period(#[case] input: &str, #[case] position: usize, #[case] rest: &str) {
        assert_eq!(
            extract_period(input),
            Err(Error::MalformedSchedule {
                position,
                rest: rest.to_owned()
            })
        );
    }

    #[rstest]
    #[case(", wd {mon}")]
    #[case("wd {mon, tue}")]
    #[case("wd {mon},,hr {8}")]
    fn test_extract_malformed_periods(#[case] input: &str) {
        assert!(
            matches!(extract_periods(input), Err(Error::MalformedSchedule { .. })),
            "input = {input}"
        );
    }

    #[rstest]
    #[case("wd {mon},", "wd {mon}")]
    #[case("wd {mon} , ,  ", "wd {mon}")]
    #[case("hr{8}wd{mon}", "wd {mon} hr {8}")]
    #[case("not hr {8},", "! hr {8}")]
    #[case(",", "")]
    fn test_extract_periods_lenient_forms(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(extract_periods(input), extract_periods(expected), "input = {input}");
    }

    #[test]
    fn test_split_tokens() {
        assert_eq!(split_tokens("1 - 3  5 7-9 10 -12"), vec!["1-3", "5", "7-9", "10-12"]);
        assert!(split_tokens("  ").is_empty());
    }
}
