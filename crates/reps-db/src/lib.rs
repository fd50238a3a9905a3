//! Storage layer for the rep counter.
//!
//! Persists per-day repetition counts and the statistics singleton using
//! `rusqlite`, and keeps the two consistent: [`Database::record_completion`]
//! commits the day's new count, the running-total update, and the streak
//! recompute in a single transaction, so readers never observe a count
//! without its matching statistics.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but
//! not `Sync`. A `Database` instance can be moved between threads but cannot
//! be shared across threads without external synchronization.
//!
//! For multi-threaded access, either:
//! - Use a `Mutex<Database>` to serialize access
//! - Use separate `Database` instances per thread
//!
//! # Schema
//!
//! ## Day Keys
//!
//! Days are stored as TEXT in `YYYY-MM-DD` form. Lexicographic ordering
//! matches chronological ordering, so range scans need no conversion.
//! Day rows are created lazily the first time a day's count actually
//! changes; a missing row reads as a count of zero.
//!
//! ## Statistics Singleton
//!
//! The `stats` table holds exactly one row (id 0) with the best and
//! current streaks, the running total, and an RFC 3339 `last_updated`
//! timestamp. The row is created on first read or mutation.

use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use reps_core::{DailyCounts, DayRecord, Goal, UserStats, apply_count_change, recompute_streaks};

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored day key.
    #[error("invalid day key in store: {value}")]
    DayParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// Failed to parse the stored statistics timestamp.
    #[error("invalid stats timestamp in store: {value}")]
    TimestampParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// Outcome of a count mutation.
///
/// `new` already reflects clamping at zero, so the delta actually applied
/// can be smaller in magnitude than the one requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountChange {
    pub day: NaiveDate,
    pub previous: u32,
    pub new: u32,
}

impl CountChange {
    /// The signed delta actually applied, after clamping.
    pub fn applied(&self) -> i64 {
        i64::from(self.new) - i64::from(self.previous)
    }
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- Day rows: one per local calendar day with a non-zero history.
            -- day: 'YYYY-MM-DD', lexicographic == chronological
            CREATE TABLE IF NOT EXISTS days (
                day TEXT PRIMARY KEY,
                count INTEGER NOT NULL DEFAULT 0
            );

            -- Singleton statistics row, kept in lockstep with days.
            CREATE TABLE IF NOT EXISTS stats (
                id INTEGER PRIMARY KEY CHECK (id = 0),
                best_streak INTEGER NOT NULL DEFAULT 0,
                current_streak INTEGER NOT NULL DEFAULT 0,
                total_count INTEGER NOT NULL DEFAULT 0,
                last_updated TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Applies a signed delta to one day's count and updates the
    /// statistics singleton, all in a single transaction.
    ///
    /// The new count is clamped at zero; [`CountChange::applied`] reports
    /// the delta that actually took effect. The running total is adjusted
    /// by that delta and the streaks are recomputed by walking back from
    /// `today`, so mutations to past days (backfills, corrections) still
    /// leave the streaks accurate.
    ///
    /// A mutation that changes nothing writes nothing: no day row is
    /// created and `last_updated` keeps its old value.
    pub fn record_completion(
        &mut self,
        day: NaiveDate,
        delta: i32,
        goal: Goal,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<CountChange, DbError> {
        let tx = self.conn.transaction()?;
        let previous = day_count(&tx, day)?;
        let new = previous.saturating_add_signed(delta);
        let change = CountChange { day, previous, new };
        if new == previous {
            return Ok(change);
        }

        tx.execute(
            "
            INSERT INTO days (day, count) VALUES (?, ?)
            ON CONFLICT(day) DO UPDATE SET count = excluded.count
            ",
            params![day_key(day), new],
        )?;

        let mut stats = fetch_or_create_stats(&tx, now)?;
        apply_count_change(&mut stats, previous, new, now);
        recompute_streaks(&mut stats, &ConnCounts(&tx), today, goal)?;
        write_stats(&tx, &stats)?;

        tx.commit()?;
        tracing::debug!(%day, previous, new, "day count committed");
        Ok(change)
    }

    /// The stored count for one day, zero if the day has no row.
    pub fn count_on(&self, day: NaiveDate) -> Result<u32, DbError> {
        day_count(&self.conn, day)
    }

    /// Day records within a range, ascending by day.
    ///
    /// The range is inclusive of `start` and exclusive of `end`. Days
    /// without a row are absent from the result.
    pub fn range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DayRecord>, DbError> {
        if end <= start {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(
            "
            SELECT day, count FROM days
            WHERE day >= ? AND day < ?
            ORDER BY day ASC
            ",
        )?;
        let rows = stmt.query_map(params![day_key(start), day_key(end)], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
        })?;
        let mut records = Vec::new();
        for row in rows {
            let (key, count) = row?;
            records.push(DayRecord {
                day: parse_day(&key)?,
                count,
            });
        }
        Ok(records)
    }

    /// The statistics singleton, created empty on first access.
    pub fn stats(&self) -> Result<UserStats, DbError> {
        fetch_or_create_stats(&self.conn, Utc::now())
    }
}

impl DailyCounts for Database {
    type Error = DbError;

    fn count_on(&self, day: NaiveDate) -> Result<u32, DbError> {
        day_count(&self.conn, day)
    }
}

/// Day reads against a borrowed connection, so streak recomputes inside
/// a transaction see that transaction's writes.
struct ConnCounts<'a>(&'a Connection);

impl DailyCounts for ConnCounts<'_> {
    type Error = DbError;

    fn count_on(&self, day: NaiveDate) -> Result<u32, DbError> {
        day_count(self.0, day)
    }
}

fn day_count(conn: &Connection, day: NaiveDate) -> Result<u32, DbError> {
    let count = conn
        .query_row(
            "SELECT count FROM days WHERE day = ?",
            params![day_key(day)],
            |row| row.get::<_, u32>(0),
        )
        .optional()?;
    Ok(count.unwrap_or(0))
}

fn fetch_or_create_stats(conn: &Connection, now: DateTime<Utc>) -> Result<UserStats, DbError> {
    conn.execute(
        "
        INSERT OR IGNORE INTO stats (id, best_streak, current_streak, total_count, last_updated)
        VALUES (0, 0, 0, 0, ?)
        ",
        params![format_timestamp(now)],
    )?;
    let (best_streak, current_streak, total_count, last_updated) = conn.query_row(
        "SELECT best_streak, current_streak, total_count, last_updated FROM stats WHERE id = 0",
        [],
        |row| {
            Ok((
                row.get::<_, u32>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, u64>(2)?,
                row.get::<_, String>(3)?,
            ))
        },
    )?;
    Ok(UserStats {
        best_streak,
        current_streak,
        total_count,
        last_updated: parse_timestamp(&last_updated)?,
    })
}

fn write_stats(conn: &Connection, stats: &UserStats) -> Result<(), DbError> {
    conn.execute(
        "
        UPDATE stats
        SET best_streak = ?, current_streak = ?, total_count = ?, last_updated = ?
        WHERE id = 0
        ",
        params![
            stats.best_streak,
            stats.current_streak,
            stats.total_count,
            format_timestamp(stats.last_updated),
        ],
    )?;
    Ok(())
}

fn day_key(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

fn parse_day(value: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(value, DAY_FORMAT).map_err(|source| DbError::DayParse {
        value: value.to_string(),
        source,
    })
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            value: value.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
