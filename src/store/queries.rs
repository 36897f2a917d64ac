//! SQL queries. Free functions over a borrowed connection, so they run the
//! same inside or outside a transaction.

use super::{
    AssessmentDetails, AssessmentFilter, HistoryOrder, HistoryQuery, NewAssessment,
    NewNotification,
};
use crate::error::{Result, StorageErrorKind};
use crate::model::{
    Answer, AnsweredQuestion, Assessment, AssessmentId, AssessmentStatus, Dimension, Finding,
    HistoricalAssessment, Notification, Organization, OrganizationId, Question, Recommendation,
    RecommendationId, RecommendationStatus, Score, Timeline,
};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::str::FromStr;

// ============================================================================
// Column codecs
// ============================================================================

pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn corrupt(idx: usize, field: &str, value: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        Type::Text,
        Box::new(StorageErrorKind::CorruptValue {
            field: field.to_string(),
            value,
        }),
    )
}

/// Read a TEXT column and parse it with `FromStr`.
fn parse_col<T: FromStr>(row: &Row<'_>, idx: usize, field: &str) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|_| corrupt(idx, field, raw))
}

fn parse_opt_col<T: FromStr>(row: &Row<'_>, idx: usize, field: &str) -> rusqlite::Result<Option<T>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| raw.parse().map_err(|_| corrupt(idx, field, raw)))
        .transpose()
}

fn json_col<T: serde::de::DeserializeOwned>(
    row: &Row<'_>,
    idx: usize,
    field: &str,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|_| corrupt(idx, field, raw))
}

// ============================================================================
// Row mappers
// ============================================================================

const ORGANIZATION_COLUMNS: &str = "id, name, domain, created_at";

fn organization_from_row(row: &Row<'_>) -> rusqlite::Result<Organization> {
    Ok(Organization {
        id: row.get(0)?,
        name: row.get(1)?,
        domain: row.get(2)?,
        created_at: parse_col(row, 3, "organizations.created_at")?,
    })
}

const ASSESSMENT_COLUMNS: &str =
    "id, organization_id, name, status, version, created_at, completed_at, notes, tags, custom_fields";

fn assessment_from_row(row: &Row<'_>) -> rusqlite::Result<Assessment> {
    Ok(Assessment {
        id: row.get(0)?,
        organization_id: row.get(1)?,
        name: row.get(2)?,
        status: parse_col(row, 3, "assessments.status")?,
        version: row.get(4)?,
        created_at: parse_col(row, 5, "assessments.created_at")?,
        completed_at: parse_opt_col(row, 6, "assessments.completed_at")?,
        notes: row.get(7)?,
        tags: json_col(row, 8, "assessments.tags")?,
        custom_fields: json_col(row, 9, "assessments.custom_fields")?,
    })
}

const QUESTION_COLUMNS: &str = "q.id, q.dimension, q.question_type, q.text, q.weight, \
     q.display_order, q.is_critical, q.options, q.maturity_mapping";

fn question_from_row(row: &Row<'_>) -> rusqlite::Result<Question> {
    let mapping: Option<String> = row.get(8)?;
    let maturity_mapping = mapping
        .map(|raw| serde_json::from_str(&raw).map_err(|_| corrupt(8, "questions.maturity_mapping", raw)))
        .transpose()?;
    Ok(Question {
        id: row.get(0)?,
        dimension: parse_col(row, 1, "questions.dimension")?,
        question_type: parse_col(row, 2, "questions.question_type")?,
        text: row.get(3)?,
        weight: row.get(4)?,
        order: row.get(5)?,
        is_critical: row.get(6)?,
        options: json_col(row, 7, "questions.options")?,
        maturity_mapping,
    })
}

fn score_from_row(row: &Row<'_>) -> rusqlite::Result<Score> {
    Ok(Score {
        dimension: parse_col(row, 0, "scores.dimension")?,
        maturity_score: row.get(1)?,
        weighted_score: row.get(2)?,
        max_possible_score: row.get(3)?,
        percentage: row.get(4)?,
    })
}

fn finding_from_row(row: &Row<'_>) -> rusqlite::Result<Finding> {
    Ok(Finding {
        dimension: parse_col(row, 0, "findings.dimension")?,
        severity: parse_col(row, 1, "findings.severity")?,
        title: row.get(2)?,
        description: row.get(3)?,
        question_id: row.get(4)?,
    })
}

const RECOMMENDATION_COLUMNS: &str =
    "id, dimension, title, description, effort, impact, kpi, timeline, priority, status";

fn recommendation_from_row(row: &Row<'_>) -> rusqlite::Result<Recommendation> {
    let days: u16 = row.get(7)?;
    let timeline = Timeline::try_from(days)
        .map_err(|_| corrupt(7, "recommendations.timeline", days.to_string()))?;
    Ok(Recommendation {
        id: row.get(0)?,
        dimension: parse_col(row, 1, "recommendations.dimension")?,
        title: row.get(2)?,
        description: row.get(3)?,
        effort: parse_col(row, 4, "recommendations.effort")?,
        impact: parse_col(row, 5, "recommendations.impact")?,
        kpi: row.get(6)?,
        timeline,
        priority: row.get(8)?,
        status: parse_col(row, 9, "recommendations.status")?,
    })
}

fn notification_from_row(row: &Row<'_>) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: row.get(0)?,
        organization_id: row.get(1)?,
        kind: row.get(2)?,
        title: row.get(3)?,
        message: row.get(4)?,
        is_read: row.get(5)?,
        created_at: parse_col(row, 6, "notifications.created_at")?,
    })
}

// ============================================================================
// Organizations
// ============================================================================

pub fn insert_organization(
    conn: &Connection,
    name: &str,
    domain: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Organization> {
    conn.execute(
        "INSERT INTO organizations (name, domain, created_at) VALUES (?1, ?2, ?3)",
        params![name, domain, timestamp(now)],
    )?;
    let id = conn.last_insert_rowid();
    Ok(Organization {
        id,
        name: name.to_string(),
        domain: domain.map(str::to_string),
        created_at: now,
    })
}

pub fn get_organization(conn: &Connection, id: OrganizationId) -> Result<Option<Organization>> {
    let sql = format!("SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE id = ?1");
    Ok(conn
        .query_row(&sql, params![id], organization_from_row)
        .optional()?)
}

pub fn list_organizations(conn: &Connection) -> Result<Vec<Organization>> {
    let sql = format!("SELECT {ORGANIZATION_COLUMNS} FROM organizations ORDER BY id");
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map([], organization_from_row)?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

// ============================================================================
// Assessments
// ============================================================================

pub fn insert_assessment(
    conn: &Connection,
    new: &NewAssessment,
    now: DateTime<Utc>,
) -> Result<Assessment> {
    conn.execute(
        "INSERT INTO assessments (organization_id, name, status, version, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            new.organization_id,
            new.name,
            AssessmentStatus::Draft.as_str(),
            new.version,
            timestamp(now)
        ],
    )?;
    Ok(Assessment {
        id: conn.last_insert_rowid(),
        organization_id: new.organization_id,
        name: new.name.clone(),
        status: AssessmentStatus::Draft,
        version: new.version,
        created_at: now,
        completed_at: None,
        notes: None,
        tags: Vec::new(),
        custom_fields: serde_json::Map::new(),
    })
}

pub fn get_assessment(conn: &Connection, id: AssessmentId) -> Result<Option<Assessment>> {
    let sql = format!("SELECT {ASSESSMENT_COLUMNS} FROM assessments WHERE id = ?1");
    Ok(conn
        .query_row(&sql, params![id], assessment_from_row)
        .optional()?)
}

pub fn list_assessments(conn: &Connection, filter: &AssessmentFilter) -> Result<Vec<Assessment>> {
    let sql = format!(
        "SELECT {ASSESSMENT_COLUMNS} FROM assessments
         WHERE (?1 IS NULL OR organization_id = ?1) AND (?2 IS NULL OR status = ?2)
         ORDER BY created_at DESC, id DESC"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(
        params![filter.organization_id, filter.status.map(AssessmentStatus::as_str)],
        assessment_from_row,
    )?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

/// Move a draft assessment to in-progress; other states are left alone.
pub fn mark_in_progress(conn: &Connection, id: AssessmentId) -> Result<()> {
    conn.execute(
        "UPDATE assessments SET status = ?1 WHERE id = ?2 AND status = ?3",
        params![
            AssessmentStatus::InProgress.as_str(),
            id,
            AssessmentStatus::Draft.as_str()
        ],
    )?;
    Ok(())
}

/// Replace one user-maintained detail of an assessment. Returns the number
/// of rows changed.
pub fn update_assessment_details(
    conn: &Connection,
    id: AssessmentId,
    details: &AssessmentDetails<'_>,
) -> Result<usize> {
    let changed = match details {
        AssessmentDetails::Notes(notes) => conn.execute(
            "UPDATE assessments SET notes = ?1 WHERE id = ?2",
            params![notes, id],
        )?,
        AssessmentDetails::Tags(tags) => conn.execute(
            "UPDATE assessments SET tags = ?1 WHERE id = ?2",
            params![serde_json::to_string(tags)?, id],
        )?,
        AssessmentDetails::CustomFields(fields) => conn.execute(
            "UPDATE assessments SET custom_fields = ?1 WHERE id = ?2",
            params![serde_json::to_string(fields)?, id],
        )?,
    };
    Ok(changed)
}

pub fn mark_completed(conn: &Connection, id: AssessmentId, at: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "UPDATE assessments SET status = ?1, completed_at = ?2 WHERE id = ?3",
        params![AssessmentStatus::Completed.as_str(), timestamp(at), id],
    )?;
    Ok(())
}

// ============================================================================
// Questions
// ============================================================================

pub fn upsert_question(conn: &Connection, question: &Question) -> Result<()> {
    let options = serde_json::to_string(&question.options)?;
    let mapping = question
        .maturity_mapping
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    conn.execute(
        "INSERT INTO questions (id, dimension, question_type, text, weight, display_order,
                                is_critical, options, maturity_mapping)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(id) DO UPDATE SET
            dimension = excluded.dimension,
            question_type = excluded.question_type,
            text = excluded.text,
            weight = excluded.weight,
            display_order = excluded.display_order,
            is_critical = excluded.is_critical,
            options = excluded.options,
            maturity_mapping = excluded.maturity_mapping",
        params![
            question.id,
            question.dimension.as_str(),
            question.question_type.as_str(),
            question.text,
            question.weight,
            question.order,
            question.is_critical,
            options,
            mapping
        ],
    )?;
    Ok(())
}

pub fn list_questions(conn: &Connection, dimension: Option<Dimension>) -> Result<Vec<Question>> {
    let sql = format!(
        "SELECT {QUESTION_COLUMNS} FROM questions q
         WHERE (?1 IS NULL OR q.dimension = ?1)
         ORDER BY q.display_order, q.id"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(params![dimension.map(Dimension::as_str)], question_from_row)?;
    let mut questions: Vec<Question> = rows.collect::<rusqlite::Result<_>>()?;
    // Display order is per dimension; keep dimensions in canonical order.
    questions.sort_by_key(|q| (q.dimension, q.order));
    Ok(questions)
}

pub fn get_question(conn: &Connection, id: &str) -> Result<Option<Question>> {
    let sql = format!("SELECT {QUESTION_COLUMNS} FROM questions q WHERE q.id = ?1");
    Ok(conn.query_row(&sql, params![id], question_from_row).optional()?)
}

// ============================================================================
// Answers
// ============================================================================

pub fn upsert_answer(
    conn: &Connection,
    assessment_id: AssessmentId,
    answer: &Answer,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO answers (assessment_id, question_id, answer_value, maturity_score, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(assessment_id, question_id) DO UPDATE SET
            answer_value = excluded.answer_value,
            maturity_score = excluded.maturity_score,
            updated_at = excluded.updated_at",
        params![
            assessment_id,
            answer.question_id,
            answer.answer_value,
            answer.maturity_score,
            timestamp(now)
        ],
    )?;
    Ok(())
}

pub fn copy_answers(
    conn: &Connection,
    from: AssessmentId,
    to: AssessmentId,
    now: DateTime<Utc>,
) -> Result<usize> {
    Ok(conn.execute(
        "INSERT INTO answers (assessment_id, question_id, answer_value, maturity_score, updated_at)
         SELECT ?1, question_id, answer_value, maturity_score, ?2 FROM answers
         WHERE assessment_id = ?3",
        params![to, timestamp(now), from],
    )?)
}

pub fn list_answers(conn: &Connection, assessment_id: AssessmentId) -> Result<Vec<AnsweredQuestion>> {
    let sql = format!(
        "SELECT {QUESTION_COLUMNS}, a.answer_value, a.maturity_score
         FROM answers a JOIN questions q ON q.id = a.question_id
         WHERE a.assessment_id = ?1
         ORDER BY q.display_order, q.id"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(params![assessment_id], |row| {
        let question = question_from_row(row)?;
        let answer = Answer {
            question_id: question.id.clone(),
            answer_value: row.get(9)?,
            maturity_score: row.get(10)?,
        };
        Ok(AnsweredQuestion { question, answer })
    })?;
    let mut answers: Vec<AnsweredQuestion> = rows.collect::<rusqlite::Result<_>>()?;
    answers.sort_by_key(|a| (a.question.dimension, a.question.order));
    Ok(answers)
}

// ============================================================================
// Results
// ============================================================================

pub fn list_scores(conn: &Connection, assessment_id: AssessmentId) -> Result<Vec<Score>> {
    let mut stmt = conn.prepare_cached(
        "SELECT dimension, maturity_score, weighted_score, max_possible_score, percentage
         FROM scores WHERE assessment_id = ?1",
    )?;
    let rows = stmt.query_map(params![assessment_id], score_from_row)?;
    let mut scores: Vec<Score> = rows.collect::<rusqlite::Result<_>>()?;
    scores.sort_by_key(|s| s.dimension);
    Ok(scores)
}

pub fn replace_scores(conn: &Connection, assessment_id: AssessmentId, scores: &[Score]) -> Result<()> {
    conn.execute("DELETE FROM scores WHERE assessment_id = ?1", params![assessment_id])?;
    let mut stmt = conn.prepare_cached(
        "INSERT INTO scores (assessment_id, dimension, maturity_score, weighted_score,
                             max_possible_score, percentage)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for s in scores {
        stmt.execute(params![
            assessment_id,
            s.dimension.as_str(),
            s.maturity_score,
            s.weighted_score,
            s.max_possible_score,
            s.percentage
        ])?;
    }
    Ok(())
}

pub fn list_findings(conn: &Connection, assessment_id: AssessmentId) -> Result<Vec<Finding>> {
    let mut stmt = conn.prepare_cached(
        "SELECT dimension, severity, title, description, question_id
         FROM findings WHERE assessment_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![assessment_id], finding_from_row)?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

pub fn replace_findings(
    conn: &Connection,
    assessment_id: AssessmentId,
    findings: &[Finding],
) -> Result<()> {
    conn.execute("DELETE FROM findings WHERE assessment_id = ?1", params![assessment_id])?;
    let mut stmt = conn.prepare_cached(
        "INSERT INTO findings (assessment_id, dimension, severity, title, description, question_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for f in findings {
        stmt.execute(params![
            assessment_id,
            f.dimension.as_str(),
            f.severity.as_str(),
            f.title,
            f.description,
            f.question_id
        ])?;
    }
    Ok(())
}

pub fn list_recommendations(
    conn: &Connection,
    assessment_id: AssessmentId,
) -> Result<Vec<Recommendation>> {
    let sql = format!(
        "SELECT {RECOMMENDATION_COLUMNS} FROM recommendations
         WHERE assessment_id = ?1 ORDER BY priority, id"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(params![assessment_id], recommendation_from_row)?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

pub fn get_recommendation(conn: &Connection, id: RecommendationId) -> Result<Option<Recommendation>> {
    let sql = format!("SELECT {RECOMMENDATION_COLUMNS} FROM recommendations WHERE id = ?1");
    Ok(conn
        .query_row(&sql, params![id], recommendation_from_row)
        .optional()?)
}

/// Replace all recommendations; returns how many non-pending statuses
/// were dropped with the old rows.
pub fn replace_recommendations(
    conn: &Connection,
    assessment_id: AssessmentId,
    recommendations: &[Recommendation],
) -> Result<usize> {
    let discarded: i64 = conn.query_row(
        "SELECT COUNT(*) FROM recommendations WHERE assessment_id = ?1 AND status != ?2",
        params![assessment_id, RecommendationStatus::Pending.as_str()],
        |row| row.get(0),
    )?;
    conn.execute(
        "DELETE FROM recommendations WHERE assessment_id = ?1",
        params![assessment_id],
    )?;
    let mut stmt = conn.prepare_cached(
        "INSERT INTO recommendations (assessment_id, dimension, title, description, effort,
                                      impact, kpi, timeline, priority, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )?;
    for r in recommendations {
        stmt.execute(params![
            assessment_id,
            r.dimension.as_str(),
            r.title,
            r.description,
            r.effort.as_str(),
            r.impact.as_str(),
            r.kpi,
            r.timeline.days(),
            r.priority,
            r.status.as_str()
        ])?;
    }
    Ok(usize::try_from(discarded).unwrap_or(0))
}

pub fn set_recommendation_status(
    conn: &Connection,
    id: RecommendationId,
    status: RecommendationStatus,
) -> Result<usize> {
    Ok(conn.execute(
        "UPDATE recommendations SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?)
}

// ============================================================================
// History
// ============================================================================

pub fn history(conn: &Connection, query: &HistoryQuery) -> Result<Vec<HistoricalAssessment>> {
    let direction = match query.order {
        HistoryOrder::NewestFirst => "DESC",
        HistoryOrder::OldestFirst => "ASC",
    };
    let sql = format!(
        "SELECT id, name, created_at FROM assessments
         WHERE organization_id = ?1 AND status = ?2 AND (?3 IS NULL OR id != ?3)
         ORDER BY created_at {direction}, id {direction}
         LIMIT ?4"
    );
    // SQLite treats a negative LIMIT as unbounded.
    let limit = query
        .limit
        .map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));

    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(
        params![
            query.organization_id,
            AssessmentStatus::Completed.as_str(),
            query.exclude,
            limit
        ],
        |row| {
            Ok((
                row.get::<_, AssessmentId>(0)?,
                row.get::<_, String>(1)?,
                parse_col::<DateTime<Utc>>(row, 2, "assessments.created_at")?,
            ))
        },
    )?;
    let headers: Vec<_> = rows.collect::<rusqlite::Result<_>>()?;

    headers
        .into_iter()
        .map(|(assessment_id, name, created_at)| {
            Ok(HistoricalAssessment {
                assessment_id,
                name,
                created_at,
                scores: list_scores(conn, assessment_id)?,
            })
        })
        .collect()
}

// ============================================================================
// Notifications
// ============================================================================

pub fn insert_notification(
    conn: &Connection,
    new: &NewNotification,
    now: DateTime<Utc>,
) -> Result<Notification> {
    conn.execute(
        "INSERT INTO notifications (organization_id, kind, title, message, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![new.organization_id, new.kind, new.title, new.message, timestamp(now)],
    )?;
    Ok(Notification {
        id: conn.last_insert_rowid(),
        organization_id: new.organization_id,
        kind: new.kind.clone(),
        title: new.title.clone(),
        message: new.message.clone(),
        is_read: false,
        created_at: now,
    })
}

pub fn list_notifications(
    conn: &Connection,
    organization_id: OrganizationId,
) -> Result<Vec<Notification>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, organization_id, kind, title, message, is_read, created_at
         FROM notifications WHERE organization_id = ?1 ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt.query_map(params![organization_id], notification_from_row)?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}
