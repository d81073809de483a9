//! Time-pattern index name expansion.
//!
//! Rotated indices are addressed by patterns like `"[logs-]YYYY.MM.DD"`:
//! the bracketed part is literal, the remainder formats the rotation
//! period. One name is generated per period intersecting the query time
//! range, and the request header carries the resulting name or list.

use chrono::{DateTime, Datelike, Duration, Months, TimeZone, Timelike, Utc};
use regex::Regex;
use trellis::TimeRange;

/// Rotation scheme of the target indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndexInterval {
    #[default]
    NoInterval,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl IndexInterval {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "" | "none" | "No interval" => IndexInterval::NoInterval,
            "Hourly" => IndexInterval::Hourly,
            "Daily" => IndexInterval::Daily,
            "Weekly" => IndexInterval::Weekly,
            "Monthly" => IndexInterval::Monthly,
            "Yearly" => IndexInterval::Yearly,
            _ => return None,
        })
    }
}

const MAX_INDICES: usize = 1024;

/// Index names covering the given time range. A pattern without an
/// interval passes through verbatim.
pub fn indices_for_range(
    pattern: &str,
    interval: IndexInterval,
    range: &TimeRange,
) -> Vec<String> {
    if interval == IndexInterval::NoInterval {
        return vec![pattern.to_string()];
    }

    let Ok(bracket) = Regex::new(r"\[([^\]]*)\]") else {
        return vec![pattern.to_string()];
    };
    let (head, literal, tail) = match bracket.captures(pattern).and_then(|c| c.get(0).map(|m| (m, c))) {
        Some((m, caps)) => (
            chrono_format(&pattern[..m.start()]),
            caps[1].to_string(),
            chrono_format(&pattern[m.end()..]),
        ),
        None => (chrono_format(pattern), String::new(), String::new()),
    };

    let (Some(from), Some(to)) = (
        DateTime::from_timestamp_millis(range.from),
        DateTime::from_timestamp_millis(range.to),
    ) else {
        return vec![pattern.to_string()];
    };
    if from > to {
        return vec![pattern.to_string()];
    }

    let mut names = Vec::new();
    let mut cursor = period_start(interval, from);
    while cursor <= to && names.len() < MAX_INDICES {
        let name = format!(
            "{}{}{}",
            cursor.format(&head),
            literal,
            cursor.format(&tail)
        );
        if names.last() != Some(&name) {
            names.push(name);
        }
        cursor = match step(interval, cursor) {
            Some(next) => next,
            None => break,
        };
    }
    if names.is_empty() {
        names.push(pattern.to_string());
    }
    names
}

/// Map the pattern's date tokens to strftime specifiers.
fn chrono_format(pattern: &str) -> String {
    pattern
        .replace("YYYY", "%Y")
        .replace("GGGG", "%G")
        .replace("MM", "%m")
        .replace("DD", "%d")
        .replace("HH", "%H")
        .replace("WW", "%V")
}

fn period_start(interval: IndexInterval, t: DateTime<Utc>) -> DateTime<Utc> {
    let day = |date: chrono::NaiveDate| {
        Utc.with_ymd_and_hms(date.year(), date.month(), date.day(), 0, 0, 0)
            .single()
            .unwrap_or(t)
    };
    let date = t.date_naive();
    match interval {
        IndexInterval::NoInterval => t,
        IndexInterval::Hourly => Utc
            .with_ymd_and_hms(date.year(), date.month(), date.day(), t.hour(), 0, 0)
            .single()
            .unwrap_or(t),
        IndexInterval::Daily => day(date),
        IndexInterval::Weekly => {
            day(date - Duration::days(date.weekday().num_days_from_monday() as i64))
        }
        IndexInterval::Monthly => Utc
            .with_ymd_and_hms(date.year(), date.month(), 1, 0, 0, 0)
            .single()
            .unwrap_or(t),
        IndexInterval::Yearly => Utc
            .with_ymd_and_hms(date.year(), 1, 1, 0, 0, 0)
            .single()
            .unwrap_or(t),
    }
}

fn step(interval: IndexInterval, cursor: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match interval {
        IndexInterval::NoInterval => None,
        IndexInterval::Hourly => cursor.checked_add_signed(Duration::hours(1)),
        IndexInterval::Daily => cursor.checked_add_signed(Duration::days(1)),
        IndexInterval::Weekly => cursor.checked_add_signed(Duration::weeks(1)),
        IndexInterval::Monthly => cursor.checked_add_months(Months::new(1)),
        IndexInterval::Yearly => cursor.checked_add_months(Months::new(12)),
    }
}
