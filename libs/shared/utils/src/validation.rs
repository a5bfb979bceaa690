// =====================================================================================
// FIELD VALIDATION - LENGTH LIMITS, ENUMERATIONS, NUMBERS, DATES, TIME SLOTS
// =====================================================================================

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;

use shared_models::ValidationError;

pub const NAME_MAX_CHARS: usize = 128;
pub const SPECIALTY_MAX_CHARS: usize = 24;
pub const ADDRESS_MAX_CHARS: usize = 256;

/// Console date format, e.g. `03/09/2024`.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

static TIME_SLOT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2}):(\d{2})-(\d{2}):(\d{2})$").expect("time slot pattern compiles")
});

/// Limits count characters, not bytes.
pub fn check_length(field: &'static str, value: &str, max: usize) -> Result<String, ValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(value.to_string())
}

pub fn parse_integer(field: &'static str, value: &str) -> Result<i32, ValidationError> {
    value.trim().parse::<i32>().map_err(|_| ValidationError::NotAnInteger {
        field,
        value: value.to_string(),
    })
}

pub fn parse_non_negative(field: &'static str, value: &str) -> Result<i32, ValidationError> {
    let parsed = parse_integer(field, value)?;
    if parsed < 0 {
        return Err(ValidationError::BelowMinimum { field, min: 0 });
    }
    Ok(parsed)
}

/// Case-insensitive match against a fixed set of codes; returns the canonical code.
pub fn parse_choice(
    field: &'static str,
    value: &str,
    allowed: &[&'static str],
) -> Result<&'static str, ValidationError> {
    let normalized = value.trim().to_uppercase();
    allowed
        .iter()
        .copied()
        .find(|code| *code == normalized)
        .ok_or_else(|| ValidationError::NotInDomain {
            field,
            value: value.to_string(),
            allowed: allowed.join("/"),
        })
}

pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();
    // chrono accepts single-digit months and days; the console format does not.
    let shaped = trimmed.len() == 10
        && trimmed.as_bytes()[2] == b'/'
        && trimmed.as_bytes()[5] == b'/';

    if !shaped {
        return Err(ValidationError::InvalidDate {
            field,
            value: value.to_string(),
        });
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| ValidationError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// `end` must not precede `start`.
pub fn ensure_ordered(
    field: &'static str,
    other: &'static str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(), ValidationError> {
    if end < start {
        return Err(ValidationError::OutOfOrder { field, other });
    }
    Ok(())
}

/// Parses `HH:MM-HH:MM` into its two bounds.
pub fn parse_time_slot(field: &'static str, value: &str) -> Result<(NaiveTime, NaiveTime), ValidationError> {
    let invalid = || ValidationError::InvalidTimeSlot {
        field,
        value: value.to_string(),
    };

    let caps = TIME_SLOT_PATTERN.captures(value.trim()).ok_or_else(invalid)?;
    let part = |idx: usize| -> Result<u32, ValidationError> {
        caps[idx].parse::<u32>().map_err(|_| invalid())
    };

    let start = NaiveTime::from_hms_opt(part(1)?, part(2)?, 0).ok_or_else(invalid)?;
    let end = NaiveTime::from_hms_opt(part(3)?, part(4)?, 0).ok_or_else(invalid)?;

    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_length_limits_count_characters() {
        assert!(check_length("Name", &"a".repeat(NAME_MAX_CHARS), NAME_MAX_CHARS).is_ok());
        assert_matches!(
            check_length("Name", &"a".repeat(NAME_MAX_CHARS + 1), NAME_MAX_CHARS),
            Err(ValidationError::TooLong { max: 128, actual: 129, .. })
        );
        // 24 multi-byte characters still fit a 24 character limit.
        assert!(check_length("Specialty", &"é".repeat(24), SPECIALTY_MAX_CHARS).is_ok());
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("age", " 42 "), Ok(42));
        assert_matches!(parse_integer("age", "forty"), Err(ValidationError::NotAnInteger { .. }));
        assert_matches!(parse_non_negative("age", "-1"), Err(ValidationError::BelowMinimum { min: 0, .. }));
    }

    #[test]
    fn test_parse_choice_is_case_insensitive() {
        assert_eq!(parse_choice("gender", "m", &["M", "F"]), Ok("M"));
        assert_eq!(parse_choice("status", " wl ", &["AV", "AC", "WL", "PA"]), Ok("WL"));

        let err = parse_choice("gender", "X", &["M", "F"]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid gender: 'X' (expected one of M/F)");
    }

    #[test]
    fn test_parse_date_requires_fixed_format() {
        assert_eq!(
            parse_date("date", "03/09/2024"),
            Ok(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap())
        );
        assert!(parse_date("date", "3/9/2024").is_err());
        assert!(parse_date("date", "2024-03-09").is_err());
        assert!(parse_date("date", "02/30/2024").is_err());
    }

    #[test]
    fn test_ensure_ordered_accepts_same_day() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let next = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

        assert!(ensure_ordered("Ending date", "starting date", day, day).is_ok());
        assert!(ensure_ordered("Ending date", "starting date", day, next).is_ok());
        assert_matches!(
            ensure_ordered("Ending date", "starting date", next, day),
            Err(ValidationError::OutOfOrder { .. })
        );
    }

    #[test]
    fn test_parse_time_slot() {
        let (start, end) = parse_time_slot("timeslot", "09:00-09:30").unwrap();
        assert_eq!(start, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(end, NaiveTime::from_hms_opt(9, 30, 0).unwrap());

        assert!(parse_time_slot("timeslot", "9:00-9:30").is_err());
        assert!(parse_time_slot("timeslot", "25:00-26:00").is_err());
        assert!(parse_time_slot("timeslot", "morning").is_err());
    }
}
