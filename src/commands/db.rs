use std::sync::Mutex;

use chrono::{DateTime, Utc};
use log::{debug, info};
use rusqlite::{params, types::Type, Connection, Row};

use crate::error::PersistenceFailure;
use crate::models::{FeedbackDraft, StoredFields};

/// Implementations must commit only through [`InsertTicket::commit_unless_cancelled`].
pub trait FeedbackStore: Send + Sync {
    fn insert(&self, draft: &FeedbackDraft, ticket: &InsertTicket) -> Result<StoredFields, PersistenceFailure>;

    fn ping(&self) -> Result<(), PersistenceFailure>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TicketState {
    Pending,
    Cancelled,
    Committed,
}

#[derive(Debug)]
pub struct InsertTicket {
    state: Mutex<TicketState>,
}

impl Default for InsertTicket {
    fn default() -> Self {
        Self {
            state: Mutex::new(TicketState::Pending),
        }
    }
}

impl InsertTicket {
    /// Returns `false` when the insert already committed.
    pub fn cancel(&self) -> bool {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *state == TicketState::Committed {
            return false;
        }
        *state = TicketState::Cancelled;
        true
    }

    pub fn commit_unless_cancelled(
        &self,
        commit: impl FnOnce() -> Result<(), PersistenceFailure>,
    ) -> Result<(), PersistenceFailure> {
        let mut state = self.state.lock().map_err(|_| PersistenceFailure::LockPoisoned)?;
        if *state == TicketState::Cancelled {
            return Err(PersistenceFailure::Cancelled);
        }
        commit()?;
        *state = TicketState::Committed;
        Ok(())
    }
}

pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;

         CREATE TABLE IF NOT EXISTS feedback (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             title TEXT NOT NULL,
             description TEXT NOT NULL DEFAULT '',
             type INTEGER NOT NULL CHECK(type IN (0, 1, 2)),
             tags TEXT NOT NULL DEFAULT '[]',
             sentiment INTEGER NOT NULL DEFAULT 0 CHECK(sentiment IN (0, 1, 2)),
             sentiment_score REAL,
             votes INTEGER NOT NULL DEFAULT 0 CHECK(votes >= 0),
             created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
             updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
         );

         CREATE INDEX IF NOT EXISTS idx_feedback_created_at ON feedback(created_at);",
    )
}

pub fn insert_feedback(conn: &Connection, draft: &FeedbackDraft) -> Result<StoredFields, PersistenceFailure> {
    let tags_json = serde_json::to_string(&draft.tags)?;

    let stored = conn.query_row(
        "INSERT INTO feedback (title, description, type, tags, sentiment, sentiment_score, votes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         RETURNING id, votes, created_at, updated_at",
        params![
            &draft.title,
            &draft.description,
            draft.category,
            tags_json,
            draft.sentiment,
            draft.sentiment_score,
            draft.votes,
        ],
        |row| {
            Ok(StoredFields {
                id: row.get(0)?,
                votes: row.get(1)?,
                created_at: timestamp_column(row, 2)?,
                updated_at: timestamp_column(row, 3)?,
            })
        },
    )?;

    debug!("Inserted feedback row {}", stored.id);
    Ok(stored)
}

fn timestamp_column(row: &Row<'_>, index: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(index)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(database_path: &str) -> Result<Self, PersistenceFailure> {
        let conn = Connection::open(database_path)?;
        initialize_schema(&conn)?;
        info!("Opened feedback database at {database_path}");
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self, PersistenceFailure> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, PersistenceFailure>,
    ) -> Result<T, PersistenceFailure> {
        let conn = self.conn.lock().map_err(|_| PersistenceFailure::LockPoisoned)?;
        f(&conn)
    }
}

impl FeedbackStore for SqliteStore {
    fn insert(&self, draft: &FeedbackDraft, ticket: &InsertTicket) -> Result<StoredFields, PersistenceFailure> {
        self.with_connection(|conn| {
            let tx = conn.unchecked_transaction()?;
            let stored = insert_feedback(&tx, draft)?;
            ticket.commit_unless_cancelled(|| Ok(tx.commit()?))?;
            Ok(stored)
        })
    }

    fn ping(&self) -> Result<(), PersistenceFailure> {
        self.with_connection(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeedbackCategory, Sentiment};

    fn draft() -> FeedbackDraft {
        FeedbackDraft {
            title: "Add dark mode".to_string(),
            description: String::new(),
            category: FeedbackCategory::Feature,
            tags: vec!["ui".to_string(), "enhancement".to_string()],
            sentiment: Sentiment::Positive,
            sentiment_score: Some(0.85),
            votes: 0,
        }
    }

    #[test]
    fn schema_initializes_idempotently() {
        let conn = Connection::open_in_memory().expect("in-memory db");
        initialize_schema(&conn).expect("first init");
        initialize_schema(&conn).expect("second init");

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM feedback", [], |row| row.get(0))
            .expect("count rows");
        assert_eq!(count, 0);
    }

    #[test]
    fn insert_assigns_id_zero_votes_and_equal_timestamps() {
        let store = SqliteStore::open_in_memory().expect("store");

        let first = store.insert(&draft(), &InsertTicket::default()).expect("first insert");
        let second = store.insert(&draft(), &InsertTicket::default()).expect("second insert");

        assert!(first.id > 0);
        assert!(second.id > first.id);
        assert_eq!(first.votes, 0);
        assert_eq!(first.created_at, first.updated_at);
    }

    #[test]
    fn enums_are_stored_as_integer_codes_and_tags_in_order() {
        let store = SqliteStore::open_in_memory().expect("store");
        let stored = store.insert(&draft(), &InsertTicket::default()).expect("insert");

        let (category_code, sentiment_code, tags, score): (i64, i64, String, Option<f64>) = store
            .with_connection(|conn| {
                Ok(conn.query_row(
                    "SELECT type, sentiment, tags, sentiment_score FROM feedback WHERE id = ?1",
                    params![stored.id],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
                )?)
            })
            .expect("read back");

        assert_eq!(category_code, 1);
        assert_eq!(sentiment_code, 1);
        assert_eq!(tags, r#"["ui","enhancement"]"#);
        assert_eq!(score, Some(0.85));
    }

    #[test]
    fn stored_codes_decode_back_into_enums() {
        let store = SqliteStore::open_in_memory().expect("store");
        let stored = store.insert(&draft(), &InsertTicket::default()).expect("insert");

        let (category, sentiment): (FeedbackCategory, Sentiment) = store
            .with_connection(|conn| {
                Ok(conn.query_row(
                    "SELECT type, sentiment FROM feedback WHERE id = ?1",
                    params![stored.id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )?)
            })
            .expect("read back");

        assert_eq!(category, FeedbackCategory::Feature);
        assert_eq!(sentiment, Sentiment::Positive);
    }

    #[test]
    fn undefined_stored_code_fails_to_decode() {
        let conn = Connection::open_in_memory().expect("in-memory db");
        let decoded = conn.query_row("SELECT 7", [], |row| row.get::<_, FeedbackCategory>(0));

        assert!(decoded.is_err());
    }

    #[test]
    fn empty_tags_and_missing_score_are_stored_as_empty_array_and_null() {
        let store = SqliteStore::open_in_memory().expect("store");
        let mut input = draft();
        input.tags = Vec::new();
        input.sentiment_score = None;
        let stored = store.insert(&input, &InsertTicket::default()).expect("insert");

        let (tags, score): (String, Option<f64>) = store
            .with_connection(|conn| {
                Ok(conn.query_row(
                    "SELECT tags, sentiment_score FROM feedback WHERE id = ?1",
                    params![stored.id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )?)
            })
            .expect("read back");

        assert_eq!(tags, "[]");
        assert_eq!(score, None);
    }

    #[test]
    fn file_backed_store_survives_reopen() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("feedback.db");
        let path = path.to_string_lossy();

        let first_id = SqliteStore::open(&path)
            .expect("open")
            .insert(&draft(), &InsertTicket::default())
            .expect("insert")
            .id;
        let second_id = SqliteStore::open(&path)
            .expect("reopen")
            .insert(&draft(), &InsertTicket::default())
            .expect("insert")
            .id;

        assert!(second_id > first_id);
    }

    #[test]
    fn ping_succeeds_on_open_store() {
        let store = SqliteStore::open_in_memory().expect("store");
        store.ping().expect("ping");
    }

    fn row_count(store: &SqliteStore) -> i64 {
        store
            .with_connection(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM feedback", [], |row| row.get(0))?))
            .expect("count rows")
    }

    #[test]
    fn cancelled_insert_rolls_back() {
        let store = SqliteStore::open_in_memory().expect("store");
        let ticket = InsertTicket::default();
        assert!(ticket.cancel());

        let result = store.insert(&draft(), &ticket);

        assert!(matches!(result, Err(PersistenceFailure::Cancelled)));
        assert_eq!(row_count(&store), 0);
    }

    #[test]
    fn committed_insert_cannot_be_cancelled() {
        let store = SqliteStore::open_in_memory().expect("store");
        let ticket = InsertTicket::default();

        store.insert(&draft(), &ticket).expect("insert");

        assert!(!ticket.cancel());
        assert_eq!(row_count(&store), 1);
    }
}
