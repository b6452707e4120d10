use crate::core::submission::{validate_name, validate_score, ValidationError};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use itertools::Itertools;
use serde::{Serialize, Serializer};
use std::collections::VecDeque;
use std::num::IntErrorKind;
use tracing::debug;

/// Retention cap: only the most recent submissions are kept.
pub static MAX_SCORES: usize = 100;
/// Number of records returned when no usable `limit` is given.
pub static DEFAULT_LIMIT: usize = 10;

// One accepted submission. Serialized on the wire as `{name, score, ts}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreRecord {
    pub name: String,
    pub score: u32,
    #[serde(rename = "ts", serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(ts))
}

/// `2024-01-01T00:00:00Z`
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Bounded, insertion-ordered sequence of score records.
#[derive(Debug)]
pub struct Leaderboard {
    entries: VecDeque<ScoreRecord>,
    capacity: usize,
}

impl Leaderboard {
    pub fn new() -> Leaderboard {
        Leaderboard::with_capacity(MAX_SCORES)
    }

    /// A capacity of zero would make every submission vanish, so it is raised to one.
    pub fn with_capacity(capacity: usize) -> Leaderboard {
        let capacity = capacity.max(1);
        Leaderboard {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records in insertion order, oldest first.
    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &ScoreRecord> {
        self.entries.iter()
    }

    /// Validate and append a submission stamped with `now`, evicting the oldest
    /// records once the capacity is exceeded. Nothing changes on error.
    pub fn submit(
        &mut self,
        name: &str,
        score: i64,
        now: DateTime<Utc>,
    ) -> Result<ScoreRecord, ValidationError> {
        let name = validate_name(name)?;
        let score = validate_score(score)?;

        // Timestamps never go backwards in insertion order, even if the clock does.
        let now = now.trunc_subsecs(0);
        let timestamp = match self.entries.back() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        };

        let record = ScoreRecord {
            name,
            score,
            timestamp,
        };
        self.entries.push_back(record.clone());

        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                debug!("Evicted score of {} ({})", evicted.name, evicted.score);
            }
        }

        Ok(record)
    }

    /// Highest scores first; equal scores keep the earlier submission on top.
    pub fn ranked(&self, limit: usize) -> Vec<ScoreRecord> {
        // `sorted_by` is stable, so identical timestamps fall back to insertion order.
        self.entries
            .iter()
            .sorted_by(|a, b| {
                b.score
                    .cmp(&a.score)
                    .then_with(|| a.timestamp.cmp(&b.timestamp))
            })
            .take(limit)
            .cloned()
            .collect()
    }
}

/// Lenient `limit` coercion: anything that is not a positive integer means [`DEFAULT_LIMIT`].
/// Positive integers too large for `usize` are clamped, they still mean "everything".
pub fn parse_limit_or_default(raw: Option<&str>) -> usize {
    raw.and_then(|value| match value.trim().parse::<usize>() {
        Ok(limit) => Some(limit),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(usize::MAX),
        Err(_) => None,
    })
    .filter(|limit| *limit > 0)
    .unwrap_or(DEFAULT_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, second).unwrap()
    }

    fn scores(records: &[ScoreRecord]) -> Vec<u32> {
        records.iter().map(|r| r.score).collect()
    }

    #[test]
    fn test_submit_returns_stored_record() {
        let mut board = Leaderboard::new();
        let now = at(7) + Duration::milliseconds(450);
        let record = board.submit("  Alice ", 120, now).unwrap();

        assert_eq!(record.name, "Alice");
        assert_eq!(record.score, 120);
        assert_eq!(record.timestamp, at(7));
        assert_eq!(format_timestamp(&record.timestamp), "2024-01-01T00:00:07Z");
        assert_eq!(board.iter().collect::<Vec<_>>(), vec![&record]);
    }

    #[test]
    fn test_rejected_submission_leaves_board_untouched() {
        let mut board = Leaderboard::new();
        board.submit("Bob", 3, at(0)).unwrap();

        assert_eq!(
            board.submit("   ", 10, at(1)),
            Err(ValidationError::EmptyName)
        );
        assert_eq!(
            board.submit("Bob", -1, at(1)),
            Err(ValidationError::ScoreOutOfRange)
        );
        assert_eq!(
            board.submit("Bob", 1_000_001, at(1)),
            Err(ValidationError::ScoreOutOfRange)
        );
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_fifo_eviction_keeps_most_recent() {
        let mut board = Leaderboard::new();
        for i in 0..=MAX_SCORES {
            board.submit(&format!("p{i}"), i as i64, at(0)).unwrap();
        }

        assert_eq!(board.len(), MAX_SCORES);
        assert!(board.iter().all(|r| r.name != "p0"));
        assert_eq!(board.iter().next().map(|r| r.name.as_str()), Some("p1"));
        assert_eq!(
            board.iter().last().map(|r| r.name.as_str()),
            Some(format!("p{MAX_SCORES}").as_str())
        );
    }

    #[test]
    fn test_custom_capacity() {
        let mut board = Leaderboard::with_capacity(2);
        for (i, score) in [5, 6, 7].into_iter().enumerate() {
            board.submit("x", score, at(i as u32)).unwrap();
        }
        assert_eq!(scores(&board.iter().cloned().collect::<Vec<_>>()), vec![6, 7]);
        assert_eq!(Leaderboard::with_capacity(0).capacity(), 1);
    }

    #[test]
    fn test_ranking_ties_favor_earlier_submission() {
        let mut board = Leaderboard::new();
        board.submit("a", 10, at(0)).unwrap();
        board.submit("first", 50, at(1)).unwrap();
        board.submit("second", 50, at(2)).unwrap();
        board.submit("d", 30, at(3)).unwrap();

        let ranked = board.ranked(10);
        assert_eq!(scores(&ranked), vec![50, 50, 30, 10]);
        assert_eq!(ranked[0].name, "first");
        assert_eq!(ranked[1].name, "second");
    }

    #[test]
    fn test_ranking_same_second_uses_insertion_order() {
        let mut board = Leaderboard::new();
        board.submit("first", 50, at(5)).unwrap();
        board.submit("second", 50, at(5)).unwrap();

        let names: Vec<_> = board.ranked(10).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_ranked_is_limited_and_read_only() {
        let mut board = Leaderboard::new();
        for (i, score) in [3, 9, 1, 7].into_iter().enumerate() {
            board.submit("x", score, at(i as u32)).unwrap();
        }
        let before: Vec<_> = board.iter().cloned().collect();

        assert_eq!(scores(&board.ranked(2)), vec![9, 7]);
        assert_eq!(board.ranked(50).len(), 4);
        assert_eq!(board.iter().cloned().collect::<Vec<_>>(), before);
    }

    #[test]
    fn test_timestamps_never_decrease() {
        let mut board = Leaderboard::new();
        board.submit("a", 1, at(30)).unwrap();
        let late = board.submit("b", 2, at(10)).unwrap();

        assert_eq!(late.timestamp, at(30));
    }

    #[test]
    fn test_parse_limit_or_default() {
        assert_eq!(parse_limit_or_default(Some("3")), 3);
        assert_eq!(parse_limit_or_default(Some(" 25 ")), 25);
        assert_eq!(parse_limit_or_default(Some("+4")), 4);
        assert_eq!(
            parse_limit_or_default(Some("18446744073709551616")),
            usize::MAX
        );
        for raw in [None, Some("0"), Some("-5"), Some("abc"), Some(""), Some("2.5")] {
            assert_eq!(parse_limit_or_default(raw), DEFAULT_LIMIT);
        }
    }

    #[test]
    fn test_oversized_limit_returns_everything() {
        let mut board = Leaderboard::new();
        for i in 0..50 {
            board.submit("x", i, at(0)).unwrap();
        }

        let limit = parse_limit_or_default(Some("18446744073709551616"));
        assert_eq!(limit, usize::MAX);
        assert_eq!(board.ranked(limit).len(), 50);
        assert_eq!(parse_limit_or_default(Some("-18446744073709551616")), DEFAULT_LIMIT);
    }

    #[test]
    fn test_record_serializes_with_ts_field() {
        let record = ScoreRecord {
            name: "Alice".to_string(),
            score: 10,
            timestamp: at(0),
        };
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            serde_json::json!({"name": "Alice", "score": 10, "ts": "2024-01-01T00:00:00Z"})
        );
    }
}
