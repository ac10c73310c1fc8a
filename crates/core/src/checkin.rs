//! Check-in Ledger - Durable record of admitted registrations
//!
//! Tokens are bearer credentials and are never stored. What the gate does
//! store is the fact that a registration has been admitted, so that the
//! same ticket cannot be presented twice at the door.
//!
//! # Guarantees
//!
//! - One row per registration: the first check-in wins and is never
//!   overwritten
//! - Durability: SQLite WAL mode for file-backed ledgers
//! - A repeated check-in reports the original admission time

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// How long a write waits for another gate worker's lock on the same file.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A single admission at the door.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRecord {
    pub registration_id: String,
    pub event_id: String,
    pub user_id: String,
    pub ticket_number: String,
    pub quantity: u32,
    /// Admission time (Unix milliseconds)
    pub checked_in_at: u64,
}

/// Result of recording a check-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckInOutcome {
    /// First admission for this registration
    Admitted,
    /// The registration was already admitted; holds the original record
    AlreadyCheckedIn { previous: CheckInRecord },
}

impl CheckInOutcome {
    pub fn is_admitted(&self) -> bool {
        matches!(self, CheckInOutcome::Admitted)
    }
}

/// Errors that can occur in ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid check-in record: {0}")]
    InvalidRecord(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Observability metrics for the ledger
#[derive(Debug, Default, Clone)]
pub struct CheckInMetrics {
    pub checkins_admitted_total: u64,
    pub checkins_duplicate_total: u64,
}

/// Check-in ledger with SQLite backend
pub struct CheckInLedger {
    conn: Connection,
    metrics: CheckInMetrics,
}

impl CheckInLedger {
    /// Create or open a ledger at the specified path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        info!(path = %path.display(), "Opening check-in ledger");

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Self::init_schema(&conn)?;

        Ok(Self {
            conn,
            metrics: CheckInMetrics::default(),
        })
    }

    /// Open a non-persistent ledger (tests and dry runs).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn,
            metrics: CheckInMetrics::default(),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS checkins (
                registration_id TEXT PRIMARY KEY,
                event_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                ticket_number TEXT NOT NULL,
                quantity INTEGER NOT NULL,
                checked_in_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_checkins_event ON checkins(event_id);
            "#,
        )?;

        Ok(())
    }

    /// Records an admission.
    ///
    /// Returns [`CheckInOutcome::AlreadyCheckedIn`] without modifying the
    /// stored row if the registration was admitted before.
    pub fn record_check_in(&mut self, record: CheckInRecord) -> Result<CheckInOutcome> {
        if record.registration_id.is_empty() {
            return Err(LedgerError::InvalidRecord(
                "registration_id cannot be empty".to_string(),
            ));
        }

        // One statement, no read snapshot that another worker can invalidate
        let inserted = self.conn.execute(
            r#"
            INSERT INTO checkins (
                registration_id, event_id, user_id, ticket_number,
                quantity, checked_in_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(registration_id) DO NOTHING
            "#,
            params![
                record.registration_id,
                record.event_id,
                record.user_id,
                record.ticket_number,
                record.quantity as i64,
                record.checked_in_at as i64,
            ],
        )?;

        if inserted == 0 {
            let previous = self.get(&record.registration_id)?.ok_or_else(|| {
                LedgerError::InvalidRecord(format!(
                    "check-in for {} conflicted but is no longer stored",
                    record.registration_id
                ))
            })?;
            self.metrics.checkins_duplicate_total += 1;

            warn!(
                registration_id = %previous.registration_id,
                event_id = %previous.event_id,
                checked_in_at = previous.checked_in_at,
                "Duplicate check-in rejected"
            );

            return Ok(CheckInOutcome::AlreadyCheckedIn { previous });
        }

        self.metrics.checkins_admitted_total += 1;

        debug!(
            registration_id = %record.registration_id,
            event_id = %record.event_id,
            quantity = record.quantity,
            "Check-in recorded"
        );

        Ok(CheckInOutcome::Admitted)
    }

    /// Look up the admission for a registration.
    pub fn get(&self, registration_id: &str) -> Result<Option<CheckInRecord>> {
        let record = self
            .conn
            .query_row(
                r#"
                SELECT registration_id, event_id, user_id, ticket_number,
                       quantity, checked_in_at
                FROM checkins
                WHERE registration_id = ?1
                "#,
                [registration_id],
                Self::row_to_record,
            )
            .optional()?;

        Ok(record)
    }

    /// Number of registrations admitted to an event.
    pub fn count_for_event(&self, event_id: &str) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM checkins WHERE event_id = ?1",
            [event_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Number of people admitted to an event (sum of ticket quantities).
    pub fn attendees_for_event(&self, event_id: &str) -> Result<u64> {
        let total: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(quantity), 0) FROM checkins WHERE event_id = ?1",
            [event_id],
            |row| row.get(0),
        )?;
        Ok(total as u64)
    }

    pub fn metrics(&self) -> &CheckInMetrics {
        &self.metrics
    }

    fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<CheckInRecord> {
        Ok(CheckInRecord {
            registration_id: row.get(0)?,
            event_id: row.get(1)?,
            user_id: row.get(2)?,
            ticket_number: row.get(3)?,
            quantity: row.get::<_, i64>(4)? as u32,
            checked_in_at: row.get::<_, i64>(5)? as u64,
        })
    }
}
