//! Database schema and migrations, versioned with `PRAGMA user_version`.

use crate::error::{AssessError, Result, StorageErrorKind};
use rusqlite::Connection;

/// V001: organizations, assessments, questions, answers and results.
const V001_INITIAL: &str = r"
CREATE TABLE IF NOT EXISTS organizations (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    domain TEXT,
    created_at TEXT NOT NULL
) STRICT;

CREATE TABLE IF NOT EXISTS assessments (
    id INTEGER PRIMARY KEY,
    organization_id INTEGER NOT NULL REFERENCES organizations(id),
    name TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'draft',
    version INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    completed_at TEXT
) STRICT;

CREATE INDEX IF NOT EXISTS idx_assessments_history
    ON assessments(organization_id, status, created_at);

CREATE TABLE IF NOT EXISTS questions (
    id TEXT PRIMARY KEY,
    dimension TEXT NOT NULL,
    question_type TEXT NOT NULL,
    text TEXT NOT NULL,
    weight REAL NOT NULL CHECK (weight > 0),
    display_order INTEGER NOT NULL DEFAULT 0,
    is_critical INTEGER NOT NULL DEFAULT 0,
    options TEXT NOT NULL DEFAULT '[]',
    maturity_mapping TEXT
) STRICT;

-- One answer per (assessment, question); re-submission overwrites.
CREATE TABLE IF NOT EXISTS answers (
    assessment_id INTEGER NOT NULL REFERENCES assessments(id) ON DELETE CASCADE,
    question_id TEXT NOT NULL REFERENCES questions(id),
    answer_value TEXT NOT NULL,
    maturity_score REAL CHECK (maturity_score BETWEEN 0 AND 5),
    updated_at TEXT NOT NULL,
    PRIMARY KEY (assessment_id, question_id)
) STRICT;

CREATE TABLE IF NOT EXISTS scores (
    assessment_id INTEGER NOT NULL REFERENCES assessments(id) ON DELETE CASCADE,
    dimension TEXT NOT NULL,
    maturity_score REAL NOT NULL CHECK (maturity_score BETWEEN 0 AND 5),
    weighted_score REAL NOT NULL CHECK (weighted_score BETWEEN 0 AND 5),
    max_possible_score REAL NOT NULL,
    percentage REAL NOT NULL CHECK (percentage BETWEEN 0 AND 100),
    PRIMARY KEY (assessment_id, dimension)
) STRICT;

CREATE TABLE IF NOT EXISTS findings (
    id INTEGER PRIMARY KEY,
    assessment_id INTEGER NOT NULL REFERENCES assessments(id) ON DELETE CASCADE,
    dimension TEXT NOT NULL,
    severity TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    question_id TEXT
) STRICT;

CREATE INDEX IF NOT EXISTS idx_findings_assessment ON findings(assessment_id);

CREATE TABLE IF NOT EXISTS recommendations (
    id INTEGER PRIMARY KEY,
    assessment_id INTEGER NOT NULL REFERENCES assessments(id) ON DELETE CASCADE,
    dimension TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    effort TEXT NOT NULL,
    impact TEXT NOT NULL,
    kpi TEXT,
    timeline INTEGER NOT NULL,
    priority INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending'
) STRICT;

CREATE INDEX IF NOT EXISTS idx_recommendations_assessment
    ON recommendations(assessment_id, priority);

CREATE TABLE IF NOT EXISTS notifications (
    id INTEGER PRIMARY KEY,
    organization_id INTEGER NOT NULL REFERENCES organizations(id),
    kind TEXT NOT NULL,
    title TEXT NOT NULL,
    message TEXT NOT NULL,
    is_read INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
) STRICT;
";

/// V002: user annotations on assessments.
const V002_ASSESSMENT_DETAILS: &str = r"
ALTER TABLE assessments ADD COLUMN notes TEXT;
ALTER TABLE assessments ADD COLUMN tags TEXT NOT NULL DEFAULT '[]';
ALTER TABLE assessments ADD COLUMN custom_fields TEXT NOT NULL DEFAULT '{}';
";

const MIGRATIONS: &[(&str, u32)] = &[(V001_INITIAL, 1), (V002_ASSESSMENT_DETAILS, 2)];

/// Apply connection pragmas.
pub fn apply_pragmas(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
        PRAGMA synchronous = NORMAL;
        ",
    )
    .map_err(|e| AssessError::storage("applying pragmas", StorageErrorKind::Sqlite(e)))
}

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current = current_version(conn)?;

    for &(sql, version) in MIGRATIONS {
        if current >= version {
            continue;
        }
        conn.execute_batch(sql).map_err(|e| migration_failed(version, &e))?;
        conn.pragma_update(None, "user_version", version)
            .map_err(|e| migration_failed(version, &e))?;
        tracing::info!(version, "applied migration");
    }

    Ok(())
}

/// Current schema version of the database.
pub fn current_version(conn: &Connection) -> Result<u32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| AssessError::storage("reading schema version", StorageErrorKind::Sqlite(e)))
}

/// Latest schema version this build knows about.
#[must_use]
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |&(_, v)| v)
}

fn migration_failed(version: u32, err: &rusqlite::Error) -> AssessError {
    AssessError::storage(
        format!("migrating to v{version}"),
        StorageErrorKind::Migration(err.to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(current_version(&conn).unwrap(), latest_version());
    }

    #[test]
    fn test_v1_database_upgrades_with_default_details() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(V001_INITIAL).unwrap();
        conn.pragma_update(None, "user_version", 1).unwrap();
        conn.execute(
            "INSERT INTO organizations (name, created_at) VALUES ('Acme', '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO assessments (organization_id, name, created_at) VALUES (1, 'Q1', '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();

        run_migrations(&conn).unwrap();
        assert_eq!(current_version(&conn).unwrap(), 2);
        let (tags, fields): (String, String) = conn
            .query_row("SELECT tags, custom_fields FROM assessments WHERE id = 1", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(tags, "[]");
        assert_eq!(fields, "{}");
    }

    #[test]
    fn test_score_range_enforced() {
        let conn = Connection::open_in_memory().unwrap();
        apply_pragmas(&conn).unwrap();
        run_migrations(&conn).unwrap();
        conn.execute(
            "INSERT INTO organizations (name, created_at) VALUES ('Acme', '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO assessments (organization_id, name, created_at) VALUES (1, 'Q1', '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();

        let bad = conn.execute(
            "INSERT INTO scores VALUES (1, 'performance', 6.0, 6.0, 5.0, 100.0)",
            [],
        );
        assert!(bad.is_err());
    }
}
