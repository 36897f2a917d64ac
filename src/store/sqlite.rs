//! SQLite-backed [`AssessmentStore`].

use super::schema::{apply_pragmas, run_migrations};
use super::{
    queries, AssessmentDetails, AssessmentFilter, AssessmentStore, HistoryQuery, NewAssessment,
    NewNotification, ReplaceSummary, ResultSet,
};
use crate::error::{AssessError, ErrorContext, OptionContext, Result, StorageErrorKind};
use crate::model::{
    Answer, AnsweredQuestion, Assessment, AssessmentId, Dimension, Finding, HistoricalAssessment,
    Notification, Organization, OrganizationId, Question, Recommendation, RecommendationId,
    RecommendationStatus, Score,
};
use chrono::Utc;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Store holding one serialized connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) a database file, apply pragmas and run migrations.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("opening database {}", path.display()))?;
        Self::init(conn, Some(path.to_path_buf()))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("opening in-memory database")?;
        Self::init(conn, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        apply_pragmas(&conn)?;
        run_migrations(&conn)?;
        tracing::debug!(path = ?path, "database ready");
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Database file path, `None` for in-memory databases.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AssessError::storage("acquiring connection", StorageErrorKind::LockPoisoned))
    }

    /// Run a read or single-statement operation.
    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Run `f` inside a `BEGIN IMMEDIATE` transaction.
    ///
    /// The transaction commits only if `f` succeeds; on any error it is
    /// dropped, which rolls it back.
    fn with_transaction<T>(
        &self,
        context: &str,
        f: impl FnOnce(&Transaction<'_>) -> Result<T>,
    ) -> Result<T> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("beginning transaction")
            .context(context)?;
        let value = f(&tx).context(context)?;
        tx.commit().context("committing").context(context)?;
        Ok(value)
    }
}

fn require_assessment(conn: &Connection, id: AssessmentId) -> Result<Assessment> {
    queries::get_assessment(conn, id)?.or_not_found("assessment", id)
}

impl AssessmentStore for SqliteStore {
    fn create_organization(&self, name: &str, domain: Option<&str>) -> Result<Organization> {
        self.with_conn(|conn| queries::insert_organization(conn, name, domain, Utc::now()))
    }

    fn get_organization(&self, id: OrganizationId) -> Result<Organization> {
        self.with_conn(|conn| queries::get_organization(conn, id)?.or_not_found("organization", id))
    }

    fn list_organizations(&self) -> Result<Vec<Organization>> {
        self.with_conn(queries::list_organizations)
    }

    fn create_assessment(&self, new: &NewAssessment) -> Result<Assessment> {
        self.with_transaction("creating assessment", |tx| {
            queries::get_organization(tx, new.organization_id)?
                .or_not_found("organization", new.organization_id)?;
            queries::insert_assessment(tx, new, Utc::now())
        })
    }

    fn get_assessment(&self, id: AssessmentId) -> Result<Assessment> {
        self.with_conn(|conn| require_assessment(conn, id))
    }

    fn list_assessments(&self, filter: &AssessmentFilter) -> Result<Vec<Assessment>> {
        self.with_conn(|conn| queries::list_assessments(conn, filter))
    }

    fn clone_assessment(&self, source: AssessmentId, name: &str) -> Result<Assessment> {
        self.with_transaction("cloning assessment", |tx| {
            let original = require_assessment(tx, source)?;
            let now = Utc::now();
            let copy = queries::insert_assessment(
                tx,
                &NewAssessment {
                    organization_id: original.organization_id,
                    name: name.to_string(),
                    version: original.version + 1,
                },
                now,
            )?;
            let copied = queries::copy_answers(tx, source, copy.id, now)?;
            tracing::debug!(source, target = copy.id, answers = copied, "cloned assessment");
            Ok(copy)
        })
    }

    fn update_assessment_details(
        &self,
        id: AssessmentId,
        details: &AssessmentDetails<'_>,
    ) -> Result<Assessment> {
        self.with_transaction("updating assessment details", |tx| {
            if queries::update_assessment_details(tx, id, details)? == 0 {
                return Err(AssessError::not_found("assessment", id));
            }
            require_assessment(tx, id)
        })
    }

    fn upsert_questions(&self, questions: &[Question]) -> Result<usize> {
        self.with_transaction("writing questions", |tx| {
            for question in questions {
                queries::upsert_question(tx, question)?;
            }
            Ok(questions.len())
        })
    }

    fn get_questions(&self, dimension: Option<Dimension>) -> Result<Vec<Question>> {
        self.with_conn(|conn| queries::list_questions(conn, dimension))
    }

    fn get_question(&self, id: &str) -> Result<Question> {
        self.with_conn(|conn| queries::get_question(conn, id)?.or_not_found("question", id))
    }

    fn upsert_answer(&self, assessment_id: AssessmentId, answer: &Answer) -> Result<()> {
        self.with_transaction("saving answer", |tx| {
            require_assessment(tx, assessment_id)?;
            queries::get_question(tx, &answer.question_id)?
                .or_not_found("question", &answer.question_id)?;
            queries::upsert_answer(tx, assessment_id, answer, Utc::now())?;
            queries::mark_in_progress(tx, assessment_id)
        })
    }

    fn get_answers(&self, assessment_id: AssessmentId) -> Result<Vec<AnsweredQuestion>> {
        self.with_conn(|conn| {
            require_assessment(conn, assessment_id)?;
            queries::list_answers(conn, assessment_id)
        })
    }

    fn get_scores(&self, assessment_id: AssessmentId) -> Result<Vec<Score>> {
        self.with_conn(|conn| {
            require_assessment(conn, assessment_id)?;
            queries::list_scores(conn, assessment_id)
        })
    }

    fn get_findings(&self, assessment_id: AssessmentId) -> Result<Vec<Finding>> {
        self.with_conn(|conn| {
            require_assessment(conn, assessment_id)?;
            queries::list_findings(conn, assessment_id)
        })
    }

    fn get_recommendations(&self, assessment_id: AssessmentId) -> Result<Vec<Recommendation>> {
        self.with_conn(|conn| {
            require_assessment(conn, assessment_id)?;
            queries::list_recommendations(conn, assessment_id)
        })
    }

    fn update_recommendation_status(
        &self,
        id: RecommendationId,
        status: RecommendationStatus,
    ) -> Result<Recommendation> {
        self.with_transaction("updating recommendation status", |tx| {
            if queries::set_recommendation_status(tx, id, status)? == 0 {
                return Err(AssessError::not_found("recommendation", id));
            }
            queries::get_recommendation(tx, id)?.or_not_found("recommendation", id)
        })
    }

    fn update_recommendation_statuses(
        &self,
        ids: &[RecommendationId],
        status: RecommendationStatus,
    ) -> Result<usize> {
        self.with_transaction("updating recommendation statuses", |tx| {
            let mut updated = 0;
            for &id in ids {
                updated += queries::set_recommendation_status(tx, id, status)?;
            }
            Ok(updated)
        })
    }

    fn replace_results(
        &self,
        assessment_id: AssessmentId,
        results: &ResultSet<'_>,
    ) -> Result<ReplaceSummary> {
        let context = format!("replacing results of assessment {assessment_id}");
        self.with_transaction(&context, |tx| {
            require_assessment(tx, assessment_id)?;
            let mut summary = ReplaceSummary::default();

            if let Some(scores) = results.scores {
                queries::replace_scores(tx, assessment_id, scores).context("writing scores")?;
            }
            if let Some(findings) = results.findings {
                queries::replace_findings(tx, assessment_id, findings)
                    .context("writing findings")?;
            }
            if let Some(recommendations) = results.recommendations {
                summary.discarded_statuses =
                    queries::replace_recommendations(tx, assessment_id, recommendations)
                        .context("writing recommendations")?;
            }
            if let Some(at) = results.completed_at {
                queries::mark_completed(tx, assessment_id, at)?;
            }
            Ok(summary)
        })
    }

    fn get_historical_scores(&self, query: &HistoryQuery) -> Result<Vec<HistoricalAssessment>> {
        self.with_conn(|conn| queries::history(conn, query))
    }

    fn add_notification(&self, notification: &NewNotification) -> Result<Notification> {
        self.with_conn(|conn| queries::insert_notification(conn, notification, Utc::now()))
    }

    fn list_notifications(&self, organization_id: OrganizationId) -> Result<Vec<Notification>> {
        self.with_conn(|conn| queries::list_notifications(conn, organization_id))
    }
}
