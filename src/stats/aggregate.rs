//! Aggregates over a materialized record set.
//!
//! Global aggregates return zeroed values on empty input. Per-user lookups return `None`
//! when the user has nothing to report, and the handlers turn that into a 404.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::models::record::{LOGIN_FAILED, LOGIN_SUCCESS, LogRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_users: usize,
    pub successful_logins: usize,
    pub average_heart_rate: f64,
    pub total_logs: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserList {
    pub total_users: usize,
    pub users: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeartRateStats {
    pub count: usize,
    pub average: f64,
    pub min: i64,
    pub max: i64,
    pub std_dev: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoginStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserOverview {
    pub username: String,
    pub total_logs: usize,
    pub login_attempts: usize,
    pub successful_logins: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeartRatePoint {
    pub date: String,
    pub heart_rate: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserHeartRate {
    pub username: String,
    pub readings: usize,
    pub average: f64,
    pub min: i64,
    pub max: i64,
    pub heart_rate_history: Vec<HeartRatePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvancedStats {
    pub total_users: usize,
    pub total_logs: usize,
    pub date_range: DateRange,
    pub heart_rate: HeartRateStats,
    pub login_stats: LoginStats,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn distinct_users(records: &[LogRecord]) -> BTreeSet<&str> {
    records.iter().map(|r| r.user.as_str()).collect()
}

pub fn total_users(records: &[LogRecord]) -> usize {
    distinct_users(records).len()
}

pub fn user_list(records: &[LogRecord]) -> UserList {
    let users: Vec<String> = distinct_users(records)
        .into_iter()
        .map(str::to_string)
        .collect();
    UserList {
        total_users: users.len(),
        users,
    }
}

pub fn successful_logins(records: &[LogRecord]) -> usize {
    records
        .iter()
        .filter(|r| r.is_login() && r.value == LOGIN_SUCCESS)
        .count()
}

/// Integer heart-rate readings, in file order. Non-integer values are skipped.
pub fn heart_rates<'a>(records: impl IntoIterator<Item = &'a LogRecord>) -> Vec<i64> {
    records.into_iter().filter_map(LogRecord::heart_rate).collect()
}

fn mean(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}

/// Sample standard deviation; zero below two readings.
fn std_dev(values: &[i64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values
        .iter()
        .map(|&v| (v as f64 - avg).powi(2))
        .sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}

pub fn heart_rate_stats(readings: &[i64]) -> HeartRateStats {
    if readings.is_empty() {
        return HeartRateStats::default();
    }
    HeartRateStats {
        count: readings.len(),
        average: round2(mean(readings)),
        min: readings.iter().copied().min().unwrap_or_default(),
        max: readings.iter().copied().max().unwrap_or_default(),
        std_dev: round2(std_dev(readings)),
    }
}

pub fn login_stats(records: &[LogRecord]) -> LoginStats {
    let logins: Vec<&LogRecord> = records.iter().filter(|r| r.is_login()).collect();
    let successful = logins.iter().filter(|r| r.value == LOGIN_SUCCESS).count();
    let failed = logins.iter().filter(|r| r.value == LOGIN_FAILED).count();

    let success_rate = if logins.is_empty() {
        0.0
    } else {
        round2(successful as f64 / logins.len() as f64 * 100.0)
    };

    LoginStats {
        total: logins.len(),
        successful,
        failed,
        success_rate,
    }
}

pub fn summary(records: &[LogRecord]) -> Summary {
    Summary {
        total_users: total_users(records),
        successful_logins: successful_logins(records),
        average_heart_rate: round2(mean(&heart_rates(records))),
        total_logs: records.len(),
    }
}

/// Average heart rate per user, rounded to two decimals.
pub fn per_user_heart_rate(records: &[LogRecord]) -> BTreeMap<String, f64> {
    let mut grouped: BTreeMap<&str, Vec<i64>> = BTreeMap::new();
    for record in records {
        if let Some(rate) = record.heart_rate() {
            grouped.entry(record.user.as_str()).or_default().push(rate);
        }
    }

    grouped
        .into_iter()
        .map(|(user, rates)| (user.to_string(), round2(mean(&rates))))
        .collect()
}

pub fn user_overview(records: &[LogRecord], username: &str) -> Option<UserOverview> {
    let user_logs: Vec<&LogRecord> = records.iter().filter(|r| r.user == username).collect();
    if user_logs.is_empty() {
        return None;
    }

    let logins: Vec<&&LogRecord> = user_logs.iter().filter(|r| r.is_login()).collect();
    Some(UserOverview {
        username: username.to_string(),
        total_logs: user_logs.len(),
        login_attempts: logins.len(),
        successful_logins: logins.iter().filter(|r| r.value == LOGIN_SUCCESS).count(),
    })
}

pub fn user_heart_rate(records: &[LogRecord], username: &str) -> Option<UserHeartRate> {
    let history: Vec<HeartRatePoint> = records
        .iter()
        .filter(|r| r.user == username)
        .filter_map(|r| {
            r.heart_rate().map(|heart_rate| HeartRatePoint {
                date: r.date.clone(),
                heart_rate,
            })
        })
        .collect();

    if history.is_empty() {
        return None;
    }

    let readings: Vec<i64> = history.iter().map(|p| p.heart_rate).collect();
    let stats = heart_rate_stats(&readings);
    Some(UserHeartRate {
        username: username.to_string(),
        readings: stats.count,
        average: stats.average,
        min: stats.min,
        max: stats.max,
        heart_rate_history: history,
    })
}

const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

pub fn date_range(records: &[LogRecord]) -> DateRange {
    let dates: Vec<NaiveDateTime> = records.iter().filter_map(|r| parse_date(&r.date)).collect();
    let render = |d: &NaiveDateTime| d.format("%Y-%m-%d %H:%M:%S").to_string();
    DateRange {
        start: dates.iter().min().map(render),
        end: dates.iter().max().map(render),
    }
}

/// `None` when there are no records at all.
pub fn advanced_stats(records: &[LogRecord]) -> Option<AdvancedStats> {
    if records.is_empty() {
        return None;
    }

    Some(AdvancedStats {
        total_users: total_users(records),
        total_logs: records.len(),
        date_range: date_range(records),
        heart_rate: heart_rate_stats(&heart_rates(records)),
        login_stats: login_stats(records),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, user: &str, action: &str, value: &str) -> LogRecord {
        LogRecord {
            date: date.into(),
            user: user.into(),
            action: action.into(),
            value: value.into(),
        }
    }

    fn sample() -> Vec<LogRecord> {
        vec![
            record("2024-01-01", "alice", "LOGIN", "success"),
            record("2024-01-01", "alice", "HEART_RATE", "72"),
            record("2024-01-02", "bob", "LOGIN", "failed"),
            record("2024-01-02", "bob", "HEART_RATE", "80"),
            record("2024-01-03", "bob", "HEART_RATE", "90"),
            record("2024-01-03", "carol", "LOGIN", "success"),
            record("2024-01-04", "bob", "HEART_RATE", "n/a"),
        ]
    }

    #[test]
    fn total_users_counts_distinct_names() {
        let records = sample();
        assert_eq!(total_users(&records), 3);
        assert_eq!(user_list(&records).users, vec!["alice", "bob", "carol"]);
        assert_eq!(total_users(&[]), 0);
    }

    #[test]
    fn summary_matches_single_user_log() {
        let records = vec![
            record("2024-01-01", "alice", "LOGIN", "success"),
            record("2024-01-01", "alice", "HEART_RATE", "72"),
        ];
        let s = summary(&records);
        assert_eq!(s.total_users, 1);
        assert_eq!(s.successful_logins, 1);
        assert_eq!(s.average_heart_rate, 72.0);
        assert_eq!(s.total_logs, 2);
    }

    #[test]
    fn login_rate_is_rounded_and_zero_without_logins() {
        let stats = login_stats(&sample());
        assert_eq!(stats.total, 3);
        assert_eq!(stats.successful, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.success_rate, 66.67);

        let none = login_stats(&[record("2024-01-01", "a", "HEART_RATE", "60")]);
        assert_eq!(none.total, 0);
        assert_eq!(none.success_rate, 0.0);
    }

    #[test]
    fn heart_rate_stats_skip_malformed_readings() {
        let stats = heart_rate_stats(&heart_rates(&sample()));
        assert_eq!(stats.count, 3);
        assert_eq!(stats.average, 80.67);
        assert_eq!(stats.min, 72);
        assert_eq!(stats.max, 90);
        assert_eq!(stats.std_dev, 9.02);
    }

    #[test]
    fn huge_readings_do_not_overflow() {
        let records = vec![
            record("2024-01-01", "alice", "HEART_RATE", "9223372036854775807"),
            record("2024-01-01", "alice", "HEART_RATE", "9223372036854775807"),
            record("2024-01-02", "bob", "HEART_RATE", "1"),
        ];
        let s = summary(&records);
        assert!(s.average_heart_rate.is_finite());
        assert!(s.average_heart_rate > 6.0e18);

        let stats = heart_rate_stats(&heart_rates(&records));
        assert_eq!(stats.max, i64::MAX);
        assert!(stats.std_dev.is_finite());
        assert!(per_user_heart_rate(&records)["alice"] > 9.0e18);
    }

    #[test]
    fn empty_heart_rate_stats_are_zeroed() {
        assert_eq!(heart_rate_stats(&[]), HeartRateStats::default());
        assert_eq!(heart_rate_stats(&[70]).std_dev, 0.0);
    }

    #[test]
    fn per_user_averages_are_independent() {
        let averages = per_user_heart_rate(&sample());
        assert_eq!(averages.len(), 2);
        assert_eq!(averages["alice"], 72.0);
        assert_eq!(averages["bob"], 85.0);
    }

    #[test]
    fn unknown_user_is_not_found_rather_than_zeroed() {
        let records = sample();
        assert!(user_overview(&records, "dave").is_none());
        assert!(user_heart_rate(&records, "dave").is_none());
        // carol exists but has no readings
        assert!(user_overview(&records, "carol").is_some());
        assert!(user_heart_rate(&records, "carol").is_none());
    }

    #[test]
    fn user_heart_rate_has_history() {
        let bob = user_heart_rate(&sample(), "bob").unwrap();
        assert_eq!(bob.readings, 2);
        assert_eq!(bob.average, 85.0);
        assert_eq!(bob.heart_rate_history[0].date, "2024-01-02");
        assert_eq!(bob.heart_rate_history[1].heart_rate, 90);
    }

    #[test]
    fn advanced_stats_cover_dates() {
        let stats = advanced_stats(&sample()).unwrap();
        assert_eq!(stats.total_logs, 7);
        assert_eq!(stats.date_range.start.as_deref(), Some("2024-01-01 00:00:00"));
        assert_eq!(stats.date_range.end.as_deref(), Some("2024-01-04 00:00:00"));
        assert!(advanced_stats(&[]).is_none());
    }

    #[test]
    fn unparseable_dates_leave_range_open() {
        let range = date_range(&[record("yesterday", "a", "LOGIN", "success")]);
        assert_eq!(range.start, None);
        assert_eq!(range.end, None);
    }
}
