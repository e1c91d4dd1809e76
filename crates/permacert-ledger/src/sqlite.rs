//! SQLite recorder.
//!
//! rusqlite with bundled SQLite, wrapped in async via `spawn_blocking`.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use permacert_core::{now_millis, CertificateRecord, SubjectFields, TransactionId};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{RecorderError, Result};
use crate::migration;
use crate::recorder::MetadataRecorder;

const SELECT_COLUMNS: &str = "SELECT transaction_id, digest_hex, issuee, course, issue_date, \
     permanent_url, issued_at, size_bytes, signer_label, network_name FROM certificates";

/// Durable recorder keeping one row per transaction id.
///
/// Recording the same transaction id twice keeps the first row.
pub struct SqliteRecorder {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecorder {
    /// Open (or create) a database file and run migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Look up the record of a transaction.
    pub async fn get(&self, transaction_id: &TransactionId) -> Result<Option<CertificateRecord>> {
        let id = transaction_id.as_str().to_string();
        self.blocking(move |conn| {
            conn.query_row(
                &format!("{SELECT_COLUMNS} WHERE transaction_id = ?1"),
                params![id],
                row_to_record,
            )
            .optional()
            .map_err(RecorderError::from)?
            .transpose()
        })
        .await
    }

    /// All records whose artifact has this digest, oldest first.
    pub async fn by_digest(&self, digest_hex: &str) -> Result<Vec<CertificateRecord>> {
        let digest_hex = digest_hex.to_ascii_lowercase();
        self.blocking(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} WHERE digest_hex = ?1 ORDER BY issued_at, transaction_id"
            ))?;
            let rows = stmt.query_map(params![digest_hex], row_to_record)?;
            let mut records = Vec::new();
            for row in rows {
                records.push(row??);
            }
            Ok(records)
        })
        .await
    }

    /// Number of stored records.
    pub async fn count(&self) -> Result<u64> {
        self.blocking(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM certificates", [], |row| row.get(0))?;
            Ok(n as u64)
        })
        .await
    }

    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap_or_else(PoisonError::into_inner);
            f(&conn)
        })
        .await
        .map_err(|e| RecorderError::Task(e.to_string()))?
    }
}

/// Map a row; the outer error is SQLite's, the inner one ours.
fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<CertificateRecord>> {
    let size_bytes: i64 = row.get("size_bytes")?;
    let record = CertificateRecord {
        transaction_id: TransactionId::new(row.get::<_, String>("transaction_id")?),
        digest_hex: row.get("digest_hex")?,
        subject: SubjectFields {
            issuee: row.get("issuee")?,
            course: row.get("course")?,
            date: row.get("issue_date")?,
        },
        permanent_url: row.get("permanent_url")?,
        issued_at: row.get("issued_at")?,
        size_bytes: 0,
        signer_label: row.get("signer_label")?,
        network_name: row.get("network_name")?,
    };
    Ok(u64::try_from(size_bytes)
        .map(|size_bytes| CertificateRecord { size_bytes, ..record })
        .map_err(|_| RecorderError::InvalidData(format!("negative size_bytes: {size_bytes}"))))
}

#[async_trait]
impl MetadataRecorder for SqliteRecorder {
    async fn record(&self, record: &CertificateRecord) -> Result<()> {
        let record = record.clone();
        let size_bytes = i64::try_from(record.size_bytes).map_err(|_| {
            RecorderError::InvalidData(format!("size_bytes too large: {}", record.size_bytes))
        })?;

        let inserted = self
            .blocking(move |conn| {
                let changed = conn.execute(
                    "INSERT OR IGNORE INTO certificates (
                        transaction_id, digest_hex, issuee, course, issue_date,
                        permanent_url, issued_at, size_bytes, signer_label, network_name,
                        recorded_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    params![
                        record.transaction_id.as_str(),
                        record.digest_hex,
                        record.subject.issuee,
                        record.subject.course,
                        record.subject.date,
                        record.permanent_url,
                        record.issued_at,
                        size_bytes,
                        record.signer_label,
                        record.network_name,
                        now_millis(),
                    ],
                )?;
                Ok(changed > 0)
            })
            .await?;

        if !inserted {
            tracing::debug!("certificate already recorded");
        }
        Ok(())
    }
}
