/// SQLite-backed store for parsed sittings.
///
/// Four tables: `venues` (seeded on open), `sources` (one per published
/// transcript), `sittings` and `entries` (one per chunk). An import writes
/// one sitting and all of its entries inside a single `IMMEDIATE`
/// transaction, so a failed import leaves nothing behind and two writers
/// cannot both pass the duplicate check.
use std::path::Path;

use chrono::{NaiveDate, NaiveTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::HansardError;
use crate::output::{ParsedTranscript, Venue};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Sources with this in their name may be published by both Houses.
const JOINT_SITTING_MARKER: &str = "Joint Sitting";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS venues (
        id    INTEGER PRIMARY KEY,
        slug  TEXT NOT NULL UNIQUE,
        name  TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS sources (
        id                      INTEGER PRIMARY KEY,
        name                    TEXT NOT NULL,
        date                    TEXT NOT NULL,
        url                     TEXT,
        last_processing_success TEXT
    );
    CREATE TABLE IF NOT EXISTS sittings (
        id          INTEGER PRIMARY KEY,
        source_id   INTEGER NOT NULL REFERENCES sources(id),
        venue_id    INTEGER NOT NULL REFERENCES venues(id),
        start_date  TEXT NOT NULL,
        start_time  TEXT,
        end_date    TEXT NOT NULL,
        end_time    TEXT
    );
    CREATE TABLE IF NOT EXISTS entries (
        id             INTEGER PRIMARY KEY,
        sitting_id     INTEGER NOT NULL REFERENCES sittings(id),
        type           TEXT NOT NULL,
        page_number    INTEGER NOT NULL,
        text_counter   INTEGER NOT NULL,
        speaker_name   TEXT NOT NULL,
        speaker_title  TEXT NOT NULL,
        content        TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_sittings_venue_date ON sittings(venue_id, start_date);
    CREATE INDEX IF NOT EXISTS idx_entries_sitting ON entries(sitting_id, text_counter);";

/// A published transcript document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: i64,
    pub name: String,
    pub date: NaiveDate,
    pub url: Option<String>,
    /// RFC 3339 timestamp of the last successful import.
    pub last_processing_success: Option<String>,
}

impl Source {
    pub fn is_joint_sitting(&self) -> bool {
        self.name.contains(JOINT_SITTING_MARKER)
    }
}

/// A stored sitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sitting {
    pub id: i64,
    pub source_id: i64,
    pub venue: Venue,
    pub start_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_date: NaiveDate,
    pub end_time: Option<NaiveTime>,
}

/// A stored chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub sitting_id: i64,
    /// `scene`, `heading`, `speech` or `other`.
    pub kind: String,
    pub page_number: u32,
    /// 1-based position within the sitting.
    pub text_counter: u32,
    pub speaker_name: String,
    pub speaker_title: String,
    pub content: String,
}

/// What [`SqliteStore::import`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Created { sitting_id: i64, entries: usize },
    /// The same joint sitting was already imported from the other House.
    Duplicate,
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create or open a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HansardError> {
        let conn = Connection::open(path.as_ref())?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let store = Self::init(conn)?;
        info!("SqliteStore opened at {:?}", path.as_ref());
        Ok(store)
    }

    /// Open an in-memory database (for tests).
    pub fn in_memory() -> Result<Self, HansardError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, HansardError> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA)?;
        for venue in Venue::all() {
            conn.execute(
                "INSERT OR IGNORE INTO venues (slug, name) VALUES (?1, ?2)",
                params![venue.slug(), venue.name()],
            )?;
        }
        Ok(Self { conn })
    }

    /// Register a transcript document.
    pub fn add_source(
        &self,
        name: &str,
        date: NaiveDate,
        url: Option<&str>,
    ) -> Result<Source, HansardError> {
        self.conn.execute(
            "INSERT INTO sources (name, date, url) VALUES (?1, ?2, ?3)",
            params![name, date.format(DATE_FORMAT).to_string(), url],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("Added source {} ({})", id, name);
        self.source(id)
    }

    pub fn source(&self, id: i64) -> Result<Source, HansardError> {
        self.conn
            .query_row(
                "SELECT id, name, date, url, last_processing_success FROM sources WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Source {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        date: parse_date(row, 2)?,
                        url: row.get(3)?,
                        last_processing_success: row.get(4)?,
                    })
                },
            )
            .optional()?
            .ok_or(HansardError::SourceNotFound { id })
    }

    /// Store a parsed transcript as one sitting of `source`.
    ///
    /// # Errors
    /// * [`HansardError::VenueNotFound`] if the venue was never seeded.
    /// * [`HansardError::Store`] on any database failure; nothing is written.
    pub fn import(
        &mut self,
        transcript: &ParsedTranscript,
        source: &Source,
    ) -> Result<ImportOutcome, HansardError> {
        let meta = &transcript.meta;
        let date = source.date.format(DATE_FORMAT).to_string();
        let start_time = meta.start_time.map(|t| t.format(TIME_FORMAT).to_string());
        let end_time = meta.end_time.map(|t| t.format(TIME_FORMAT).to_string());

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let slug = meta.venue.slug();
        let venue_id: i64 = tx
            .query_row("SELECT id FROM venues WHERE slug = ?1", params![slug], |row| {
                row.get(0)
            })
            .optional()?
            .ok_or_else(|| HansardError::VenueNotFound {
                slug: slug.to_string(),
            })?;

        if source.is_joint_sitting() {
            let existing: Option<i64> = tx
                .query_row(
                    "SELECT s.id FROM sittings s
                     JOIN sources so ON so.id = s.source_id
                     WHERE s.venue_id = ?1 AND so.name = ?2
                       AND s.start_date = ?3 AND s.start_time IS ?4
                     LIMIT 1",
                    params![venue_id, source.name, date, start_time],
                    |row| row.get(0),
                )
                .optional()?;
            if let Some(sitting_id) = existing {
                warn!(
                    "Skipping '{}': joint sitting already stored as sitting {}",
                    source.name, sitting_id
                );
                return Ok(ImportOutcome::Duplicate);
            }
        }

        tx.execute(
            "INSERT INTO sittings (source_id, venue_id, start_date, start_time, end_date, end_time)
             VALUES (?1, ?2, ?3, ?4, ?3, ?5)",
            params![source.id, venue_id, date, start_time, end_time],
        )?;
        let sitting_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO entries
                 (sitting_id, type, page_number, text_counter, speaker_name, speaker_title, content)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for (i, chunk) in transcript.chunks.iter().enumerate() {
                stmt.execute(params![
                    sitting_id,
                    chunk.kind(),
                    chunk.page_number(),
                    i + 1,
                    chunk.speaker_name(),
                    chunk.speaker_title(),
                    chunk.text(),
                ])?;
            }
        }

        let updated = tx.execute(
            "UPDATE sources SET last_processing_success = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), source.id],
        )?;
        if updated == 0 {
            return Err(HansardError::SourceNotFound { id: source.id });
        }

        tx.commit()?;

        let entries = transcript.chunks.len();
        info!(
            "Imported '{}' as sitting {} with {} entries",
            source.name, sitting_id, entries
        );
        Ok(ImportOutcome::Created {
            sitting_id,
            entries,
        })
    }

    /// All sittings, oldest first.
    pub fn sittings(&self) -> Result<Vec<Sitting>, HansardError> {
        let mut stmt = self.conn.prepare(
            "SELECT s.id, s.source_id, v.slug, s.start_date, s.start_time, s.end_date, s.end_time
             FROM sittings s JOIN venues v ON v.id = s.venue_id
             ORDER BY s.start_date, s.start_time, s.id",
        )?;
        let rows = stmt
            .query_map([], row_to_sitting)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Entries of one sitting in document order.
    pub fn entries(&self, sitting_id: i64) -> Result<Vec<Entry>, HansardError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, sitting_id, type, page_number, text_counter,
                    speaker_name, speaker_title, content
             FROM entries WHERE sitting_id = ?1 ORDER BY text_counter",
        )?;
        let rows = stmt
            .query_map(params![sitting_id], |row| {
                Ok(Entry {
                    id: row.get(0)?,
                    sitting_id: row.get(1)?,
                    kind: row.get(2)?,
                    page_number: row.get(3)?,
                    text_counter: row.get(4)?,
                    speaker_name: row.get(5)?,
                    speaker_title: row.get(6)?,
                    content: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

// ---------------------------------------------------------------------------
// Row deserialization helpers
// ---------------------------------------------------------------------------

fn row_to_sitting(row: &rusqlite::Row) -> rusqlite::Result<Sitting> {
    let slug: String = row.get(2)?;
    let venue = Venue::all()
        .into_iter()
        .find(|v| v.slug() == slug)
        .ok_or_else(|| conversion_error(2, format!("unknown venue slug '{slug}'")))?;

    Ok(Sitting {
        id: row.get(0)?,
        source_id: row.get(1)?,
        venue,
        start_date: parse_date(row, 3)?,
        start_time: parse_time(row, 4)?,
        end_date: parse_date(row, 5)?,
        end_time: parse_time(row, 6)?,
    })
}

fn parse_date(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(idx)?;
    NaiveDate::parse_from_str(&text, DATE_FORMAT).map_err(|e| conversion_error(idx, e))
}

fn parse_time(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<NaiveTime>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| NaiveTime::parse_from_str(&t, TIME_FORMAT).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn conversion_error(
    idx: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{Chunk, TranscriptMeta};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn transcript(venue: Venue, start: Option<NaiveTime>) -> ParsedTranscript {
        ParsedTranscript {
            meta: TranscriptMeta {
                venue,
                start_time: start,
                end_time: NaiveTime::from_hms_opt(18, 30, 0),
            },
            chunks: vec![
                Chunk::Heading {
                    text: "PRAYERS".into(),
                    page_number: 1,
                },
                Chunk::Speech {
                    speaker_name: "Mr. Speaker".into(),
                    speaker_title: String::new(),
                    text: "Order, order.".into(),
                    page_number: 1,
                },
                Chunk::Scene {
                    text: "(Applause)".into(),
                    page_number: 2,
                },
            ],
        }
    }

    #[test]
    fn test_venues_seeded_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("venues.db");
        drop(SqliteStore::open(&path).unwrap());
        let store = SqliteStore::open(&path).unwrap();
        let count: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM venues", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_source_roundtrip_and_missing() {
        let store = SqliteStore::in_memory().unwrap();
        let source = store
            .add_source("Hansard 1 March 2016", date(2016, 3, 1), Some("https://example.org/h.pdf"))
            .unwrap();
        assert_eq!(store.source(source.id).unwrap(), source);
        assert!(source.last_processing_success.is_none());
        assert!(matches!(
            store.source(999),
            Err(HansardError::SourceNotFound { id: 999 })
        ));
    }

    #[test]
    fn test_import_writes_sitting_and_entries() {
        let mut store = SqliteStore::in_memory().unwrap();
        let source = store.add_source("Senate 1 March", date(2016, 3, 1), None).unwrap();
        let t = transcript(Venue::Senate, NaiveTime::from_hms_opt(14, 30, 0));

        let outcome = store.import(&t, &source).unwrap();
        let ImportOutcome::Created { sitting_id, entries } = outcome else {
            panic!("expected Created, got {outcome:?}");
        };
        assert_eq!(entries, 3);

        let sittings = store.sittings().unwrap();
        assert_eq!(sittings.len(), 1);
        assert_eq!(sittings[0].venue, Venue::Senate);
        assert_eq!(sittings[0].start_date, date(2016, 3, 1));
        assert_eq!(sittings[0].end_date, date(2016, 3, 1));
        assert_eq!(sittings[0].start_time, NaiveTime::from_hms_opt(14, 30, 0));

        let stored = store.entries(sitting_id).unwrap();
        let counters: Vec<u32> = stored.iter().map(|e| e.text_counter).collect();
        assert_eq!(counters, vec![1, 2, 3]);
        assert_eq!(stored[0].kind, "heading");
        assert_eq!(stored[0].speaker_name, "");
        assert_eq!(stored[1].speaker_name, "Mr. Speaker");
        assert_eq!(stored[2].page_number, 2);

        assert!(store.source(source.id).unwrap().last_processing_success.is_some());
    }

    #[test]
    fn test_duplicate_joint_sitting_skipped() {
        let mut store = SqliteStore::in_memory().unwrap();
        let name = "Joint Sitting of Parliament 22 March 2016";
        let na = store.add_source(name, date(2016, 3, 22), None).unwrap();
        let senate = store.add_source(name, date(2016, 3, 22), None).unwrap();
        let t = transcript(Venue::NationalAssembly, None);

        assert!(matches!(store.import(&t, &na).unwrap(), ImportOutcome::Created { .. }));
        assert_eq!(store.import(&t, &senate).unwrap(), ImportOutcome::Duplicate);
        assert_eq!(store.sittings().unwrap().len(), 1);
        assert!(store.source(senate.id).unwrap().last_processing_success.is_none());
    }

    #[test]
    fn test_ordinary_sittings_not_deduplicated() {
        let mut store = SqliteStore::in_memory().unwrap();
        let source = store.add_source("Hansard 1 March", date(2016, 3, 1), None).unwrap();
        let t = transcript(Venue::NationalAssembly, NaiveTime::from_hms_opt(9, 30, 0));
        store.import(&t, &source).unwrap();
        store.import(&t, &source).unwrap();
        assert_eq!(store.sittings().unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_source_rolls_back() {
        let mut store = SqliteStore::in_memory().unwrap();
        let ghost = Source {
            id: 42,
            name: "Ghost".into(),
            date: date(2016, 3, 1),
            url: None,
            last_processing_success: None,
        };
        let err = store
            .import(&transcript(Venue::Senate, None), &ghost)
            .unwrap_err();
        assert!(matches!(err, HansardError::Store(_)), "got: {err:?}");
        assert!(store.sittings().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hansard.db");
        {
            let mut store = SqliteStore::open(&path).unwrap();
            let source = store.add_source("Hansard", date(2016, 3, 1), None).unwrap();
            store
                .import(&transcript(Venue::NationalAssembly, None), &source)
                .unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.sittings().unwrap().len(), 1);
    }
}
