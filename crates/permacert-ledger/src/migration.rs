//! Certificate ledger schema.
//!
//! The schema is an ordered list of steps; step `i` takes the database from
//! version `i` to `i + 1`. `schema_migrations` holds one row per applied
//! step, so the highest row is the database's version.

use permacert_core::now_millis;
use rusqlite::{params, Connection};

use crate::error::{RecorderError, Result};

/// A named schema step.
struct Step {
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[Step] = &[Step {
    name: "certificates",
    sql: r#"
        CREATE TABLE certificates (
            transaction_id TEXT PRIMARY KEY,  -- network-assigned id
            digest_hex TEXT NOT NULL,         -- SHA-256 of the artifact bytes
            issuee TEXT NOT NULL,
            course TEXT NOT NULL,
            issue_date TEXT NOT NULL,         -- as entered by the issuer
            permanent_url TEXT NOT NULL,
            issued_at INTEGER NOT NULL,       -- Unix ms
            size_bytes INTEGER NOT NULL,
            signer_label TEXT NOT NULL,
            network_name TEXT NOT NULL,       -- mode key
            recorded_at INTEGER NOT NULL      -- local time of insertion
        );

        CREATE INDEX idx_certificates_digest ON certificates(digest_hex);
        CREATE INDEX idx_certificates_issued ON certificates(issued_at);
    "#,
}];

/// Schema version this build writes.
pub const CURRENT_VERSION: u32 = STEPS.len() as u32;

/// Bring the schema up to [`CURRENT_VERSION`]. Safe to call on every open.
///
/// Fails if the recorded version cannot be read or is newer than this build.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at INTEGER NOT NULL
        )",
    )?;

    let applied = schema_version(conn)?;
    let pending = STEPS.get(applied as usize..).ok_or_else(|| {
        RecorderError::Migration(format!(
            "database is at schema v{applied}, this build knows up to v{CURRENT_VERSION}"
        ))
    })?;
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (version, step) in (applied + 1..).zip(pending) {
        tx.execute_batch(step.sql)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
            params![version, step.name, now_millis()],
        )?;
    }
    tx.commit()?;

    tracing::debug!(from = applied, to = CURRENT_VERSION, "certificate schema migrated");
    Ok(())
}

/// Highest applied step, 0 for a fresh database.
fn schema_version(conn: &Connection) -> Result<u32> {
    let version: Option<u32> =
        conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })?;
    Ok(version.unwrap_or(0))
}
