//! Match clock and period
//!
//! The feed sends raw timer fields; the displayed time keeps running from
//! the period start while `TT=1`.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::MatchClock;

/// Match length when the league text does not state one
pub const DEFAULT_MATCH_MINUTES: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    NotStarted,
    FirstHalf,
    HalfTime,
    SecondHalf,
    FullTime,
}

fn int_field(value: &Option<String>) -> i64 {
    value
        .as_deref()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

/// `TU` (`YYYYMMDDhhmmss`, UTC) as unix seconds
pub fn parse_period_start(tu: &str) -> Option<i64> {
    NaiveDateTime::parse_from_str(tu.trim(), "%Y%m%d%H%M%S")
        .ok()
        .map(|dt| dt.and_utc().timestamp())
}

/// Match length from league text such as `"Esoccer Battle - 8 mins play"`.
pub fn match_length_minutes(league: &str) -> i64 {
    if !league.contains("mins play") {
        return DEFAULT_MATCH_MINUTES;
    }
    league
        .split(" - ")
        .nth(1)
        .and_then(|rest| rest.split(' ').next())
        .and_then(|n| n.parse().ok())
        .unwrap_or(DEFAULT_MATCH_MINUTES)
}

/// Displayed match time, `m:ss`
pub fn match_time(clock: &MatchClock, now: i64) -> String {
    let minutes = int_field(&clock.minutes);
    let seconds = int_field(&clock.seconds);
    let ticking = int_field(&clock.ticking);

    if minutes == 0 && ticking == 0 {
        return "00:00".to_string();
    }

    let start = clock.period_start.as_deref().and_then(parse_period_start);
    match start {
        Some(start) if ticking == 1 => {
            let elapsed = now.saturating_sub(start).max(0);
            let total = minutes
                .max(0)
                .saturating_mul(60)
                .saturating_add(seconds.max(0))
                .saturating_add(elapsed);
            format!("{}:{:02}", total / 60, total % 60)
        }
        _ => format!("{}:{:02}", minutes, seconds),
    }
}

pub fn period(clock: &MatchClock, league: &str) -> Period {
    let minutes = int_field(&clock.minutes);
    let seconds = int_field(&clock.seconds);
    let ticking = int_field(&clock.ticking);
    let flag = clock.period_flag.as_deref().map(str::trim).unwrap_or_default();
    let length = match_length_minutes(league);

    let stopped = seconds == 0 && ticking == 0;
    if stopped && flag == "1" && minutes.saturating_mul(2) == length {
        Period::HalfTime
    } else if stopped && flag == "1" && minutes == length {
        Period::FullTime
    } else if stopped && minutes == 0 && flag == "0" {
        Period::NotStarted
    } else if flag == "0" {
        Period::FirstHalf
    } else {
        Period::SecondHalf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(md: &str, tm: &str, ts: &str, tt: &str, tu: &str) -> MatchClock {
        let opt = |v: &str| (!v.is_empty()).then(|| v.to_string());
        MatchClock {
            period_flag: opt(md),
            minutes: opt(tm),
            seconds: opt(ts),
            period_start: opt(tu),
            ticking: opt(tt),
        }
    }

    #[test]
    fn test_match_time_runs_from_period_start() {
        let start = parse_period_start("20240101120000").unwrap();
        let c = clock("0", "3", "10", "1", "20240101120000");
        assert_eq!(match_time(&c, start + 75), "4:25");
    }

    #[test]
    fn test_match_time_stopped() {
        assert_eq!(match_time(&clock("0", "0", "0", "0", ""), 0), "00:00");
        assert_eq!(match_time(&clock("1", "4", "5", "0", ""), 0), "4:05");
    }

    #[test]
    fn test_match_length_from_league() {
        assert_eq!(match_length_minutes("Esoccer Battle - 8 mins play"), 8);
        assert_eq!(match_length_minutes("Premier League"), 90);
        assert_eq!(match_length_minutes("Odd - xx mins play"), 90);
    }

    #[test]
    fn test_period() {
        let league = "Esoccer GT Leagues - 12 mins play";
        assert_eq!(period(&clock("1", "6", "0", "0", ""), league), Period::HalfTime);
        assert_eq!(period(&clock("1", "12", "0", "0", ""), league), Period::FullTime);
        assert_eq!(period(&clock("0", "0", "0", "0", ""), league), Period::NotStarted);
        assert_eq!(period(&clock("0", "3", "12", "1", ""), league), Period::FirstHalf);
        assert_eq!(period(&clock("1", "8", "12", "1", ""), league), Period::SecondHalf);
    }

    #[test]
    fn test_oversized_clock_fields_saturate() {
        let start = parse_period_start("20240101120000").unwrap();
        let c = clock("1", "999999999999999999", "0", "1", "20240101120000");
        assert_eq!(match_time(&c, start + 10), "153722867280912930:07");

        let stopped = clock("1", "9223372036854775807", "0", "0", "");
        assert_eq!(period(&stopped, "Esoccer Battle - 8 mins play"), Period::SecondHalf);
    }
}
