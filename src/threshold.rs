use crate::payload::TelemetryRecord;
use crate::serializable_objects::SubmissionResponse;
use chrono::{DateTime, Datelike, Utc};

/// Readings at or above this value are reported as overtemp. No unit conversion
/// happens, the value is compared in whatever unit the device sends.
pub const OVERTEMP_THRESHOLD: f64 = 90.0;

/// Everything after the year in `formatted_time`, always rendered in UTC.
const TIME_FORMAT_AFTER_YEAR: &str = "%m-%d %H:%M:%S";

pub fn evaluate(record: &TelemetryRecord) -> SubmissionResponse {
    if record.temperature() >= OVERTEMP_THRESHOLD {
        SubmissionResponse {
            overtemp: true,
            device_id: Some(record.device_id()),
            formatted_time: Some(format_time(record.timestamp())),
        }
    } else {
        SubmissionResponse {
            overtemp: false,
            device_id: None,
            formatted_time: None,
        }
    }
}

/// `YYYY-MM-DD HH:MM:SS`. chrono's `%Y` prefixes years past 9999 with `+`,
/// so the year is written by hand: at least four digits, a plain `-` for BCE.
pub fn format_time(timestamp: DateTime<Utc>) -> String {
    let year = timestamp.year();
    let rest = timestamp.format(TIME_FORMAT_AFTER_YEAR);
    if year < 0 {
        format!("-{:04}-{rest}", year.unsigned_abs())
    } else {
        format!("{year:04}-{rest}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::parse;
    use serde_json::json;

    #[test]
    fn overtemp_reading_carries_device_and_time() {
        let record = parse("42:1690000000000:'Temperature':91.5").unwrap();

        let response = evaluate(&record);

        assert_eq!(
            response,
            SubmissionResponse {
                overtemp: true,
                device_id: Some(42),
                formatted_time: Some("2023-07-22 04:26:40".to_owned()),
            }
        );
    }

    #[test]
    fn threshold_is_inclusive() {
        let record = parse("7:0:'Temperature':90").unwrap();

        let response = evaluate(&record);

        assert!(response.overtemp);
        assert_eq!(response.formatted_time.as_deref(), Some("1970-01-01 00:00:00"));
    }

    #[test]
    fn sub_second_remainder_does_not_show_in_formatted_time() {
        let record = parse("7:1690000000999:'Temperature':95").unwrap();

        assert_eq!(
            evaluate(&record).formatted_time.as_deref(),
            Some("2023-07-22 04:26:40")
        );
    }

    #[test]
    fn normal_reading_omits_optional_fields() {
        let record = parse("42:1690000000000:'Temperature':50.0").unwrap();

        let response = evaluate(&record);

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "overtemp": false })
        );
    }

    #[test]
    fn nan_is_never_overtemp() {
        let record = parse("42:1690000000000:'Temperature':NaN").unwrap();

        assert!(!evaluate(&record).overtemp);
    }

    #[test]
    fn overtemp_serializes_snake_case_keys() {
        let record = parse("-3:1690000000000:'Temperature':120").unwrap();

        assert_eq!(
            serde_json::to_value(evaluate(&record)).unwrap(),
            json!({
                "overtemp": true,
                "device_id": -3,
                "formatted_time": "2023-07-22 04:26:40"
            })
        );
    }

    #[test]
    fn years_past_9999_have_no_sign() {
        let record = parse("1:253402300800000:'Temperature':95").unwrap();

        assert_eq!(
            evaluate(&record).formatted_time.as_deref(),
            Some("10000-01-01 00:00:00")
        );
    }

    #[test]
    fn small_and_negative_years_are_padded() {
        let year_one = DateTime::parse_from_rfc3339("0001-02-03T04:05:06Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_time(year_one), "0001-02-03 04:05:06");

        // 1 BCE is year 0, 2 BCE is year -1
        let before_epoch = year_one.with_year(-1).unwrap();
        assert_eq!(format_time(before_epoch), "-0001-02-03 04:05:06");
    }
}
