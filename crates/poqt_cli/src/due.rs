//! Due-date parsing and display in local wall-clock time.

use anyhow::{Result, anyhow};
use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use poqt_constant::defaults::DEFAULT_DUE_HOUR;

const DATE_TIME: &str = "%Y-%m-%d %H:%M";
const DATE: &str = "%Y-%m-%d";

/// `YYYY-MM-DD HH:MM`, or `YYYY-MM-DD` meaning the default hour, in the
/// local time zone.
pub fn parse_due(input: &str) -> Result<DateTime<Utc>> {
    parse_due_in(input, &Local)
}

pub fn parse_due_in<Tz: TimeZone>(input: &str, tz: &Tz) -> Result<DateTime<Utc>> {
    let naive = parse_naive(input.trim())?;
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(at) => Ok(at.with_timezone(&Utc)),
        // clocks went back: the earlier instant
        LocalResult::Ambiguous(first, _) => Ok(first.with_timezone(&Utc)),
        LocalResult::None => Err(anyhow!("{} does not exist in the local time zone", input.trim())),
    }
}

fn parse_naive(input: &str) -> Result<NaiveDateTime> {
    if let Ok(at) = NaiveDateTime::parse_from_str(input, DATE_TIME) {
        return Ok(at);
    }
    let date = NaiveDate::parse_from_str(input, DATE).map_err(|_| {
        anyhow!(
            "invalid due date '{}', expected YYYY-MM-DD HH:MM or YYYY-MM-DD",
            input
        )
    })?;
    let time = NaiveTime::from_hms_opt(DEFAULT_DUE_HOUR, 0, 0)
        .ok_or_else(|| anyhow!("invalid default due hour"))?;
    Ok(date.and_time(time))
}

pub fn format_due(due: DateTime<Utc>) -> String {
    due.with_timezone(&Local).format(DATE_TIME).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn parses_date_and_time() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let due = parse_due_in("2025-07-01 18:30", &tz).unwrap();
        assert_eq!(due, Utc.with_ymd_and_hms(2025, 7, 1, 16, 30, 0).unwrap());
    }

    #[test]
    fn date_only_means_nine_am() {
        let due = parse_due_in("2025-07-01", &Utc).unwrap();
        assert_eq!(due, Utc.with_ymd_and_hms(2025, 7, 1, 9, 0, 0).unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_due_in("tomorrow", &Utc).is_err());
        assert!(parse_due_in("2025-13-01", &Utc).is_err());
        assert!(parse_due_in("2025-07-01 25:00", &Utc).is_err());
    }
}
