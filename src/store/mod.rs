//! Persistence of organizations, assessments and their results.
//!
//! [`AssessmentStore`] is the seam between the scoring service and storage.
//! [`SqliteStore`] is the bundled implementation; every multi-row write it
//! performs runs inside one `BEGIN IMMEDIATE` transaction, so a failure
//! never leaves a mix of old and new rows behind.

mod queries;
pub mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::model::{
    Answer, AnsweredQuestion, Assessment, AssessmentId, AssessmentStatus, Dimension, Finding,
    HistoricalAssessment, Notification, Organization, OrganizationId, Question, Recommendation,
    RecommendationId, RecommendationStatus, Score,
};
use chrono::{DateTime, Utc};

/// Fields of an assessment to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAssessment {
    pub organization_id: OrganizationId,
    pub name: String,
    pub version: u32,
}

/// Filter for listing assessments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssessmentFilter {
    pub organization_id: Option<OrganizationId>,
    pub status: Option<AssessmentStatus>,
}

/// Order of a history query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistoryOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Which completed assessments of an organization to load as history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryQuery {
    pub organization_id: OrganizationId,
    /// Usually the assessment being analyzed
    pub exclude: Option<AssessmentId>,
    pub limit: Option<usize>,
    pub order: HistoryOrder,
}

impl HistoryQuery {
    /// Every completed assessment of the organization, newest first.
    #[must_use]
    pub const fn for_organization(organization_id: OrganizationId) -> Self {
        Self {
            organization_id,
            exclude: None,
            limit: None,
            order: HistoryOrder::NewestFirst,
        }
    }

    #[must_use]
    pub const fn excluding(mut self, assessment_id: AssessmentId) -> Self {
        self.exclude = Some(assessment_id);
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn chronological(mut self) -> Self {
        self.order = HistoryOrder::OldestFirst;
        self
    }
}

/// One user-maintained detail of an assessment, replaced as a whole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssessmentDetails<'a> {
    /// `None` clears the notes
    Notes(Option<&'a str>),
    Tags(&'a [String]),
    CustomFields(&'a serde_json::Map<String, serde_json::Value>),
}

/// A unit of work replacing result rows of one assessment.
///
/// Each part that is `Some` replaces every existing row of that kind
/// (delete, then insert). All parts, and the optional completion stamp,
/// commit or roll back together.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultSet<'a> {
    pub scores: Option<&'a [Score]>,
    pub findings: Option<&'a [Finding]>,
    pub recommendations: Option<&'a [Recommendation]>,
    /// Mark the assessment completed at this time
    pub completed_at: Option<DateTime<Utc>>,
}

/// What a [`ResultSet`] write replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceSummary {
    /// Replaced recommendations whose status had moved past pending
    pub discarded_statuses: usize,
}

/// A notification to record for an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub organization_id: OrganizationId,
    pub kind: String,
    pub title: String,
    pub message: String,
}

/// Storage operations the assessment service depends on.
///
/// Lookups of missing entities fail with
/// [`AssessError::NotFound`](crate::error::AssessError::NotFound).
pub trait AssessmentStore: Send + Sync {
    fn create_organization(&self, name: &str, domain: Option<&str>) -> Result<Organization>;
    fn get_organization(&self, id: OrganizationId) -> Result<Organization>;
    fn list_organizations(&self) -> Result<Vec<Organization>>;

    fn create_assessment(&self, new: &NewAssessment) -> Result<Assessment>;
    fn get_assessment(&self, id: AssessmentId) -> Result<Assessment>;
    fn list_assessments(&self, filter: &AssessmentFilter) -> Result<Vec<Assessment>>;
    /// Copy an assessment and its answers into a new draft of the next version.
    /// Notes, tags and custom fields stay with the source.
    fn clone_assessment(&self, source: AssessmentId, name: &str) -> Result<Assessment>;
    /// Replace notes, tags or custom fields and return the updated assessment.
    fn update_assessment_details(
        &self,
        id: AssessmentId,
        details: &AssessmentDetails<'_>,
    ) -> Result<Assessment>;

    /// Insert or replace catalog questions. Returns the number written.
    fn upsert_questions(&self, questions: &[Question]) -> Result<usize>;
    /// Questions ordered by display order, optionally for one dimension.
    fn get_questions(&self, dimension: Option<Dimension>) -> Result<Vec<Question>>;
    fn get_question(&self, id: &str) -> Result<Question>;

    /// Insert or overwrite one answer. A draft assessment moves to
    /// in-progress in the same transaction.
    fn upsert_answer(&self, assessment_id: AssessmentId, answer: &Answer) -> Result<()>;
    /// Answers joined with their questions, in question display order.
    fn get_answers(&self, assessment_id: AssessmentId) -> Result<Vec<AnsweredQuestion>>;

    fn get_scores(&self, assessment_id: AssessmentId) -> Result<Vec<Score>>;
    fn get_findings(&self, assessment_id: AssessmentId) -> Result<Vec<Finding>>;
    /// Recommendations ordered by priority, most urgent first.
    fn get_recommendations(&self, assessment_id: AssessmentId) -> Result<Vec<Recommendation>>;
    fn update_recommendation_status(
        &self,
        id: RecommendationId,
        status: RecommendationStatus,
    ) -> Result<Recommendation>;
    /// Set one status on many recommendations in one transaction. Unknown
    /// ids are skipped; returns the number updated.
    fn update_recommendation_statuses(
        &self,
        ids: &[RecommendationId],
        status: RecommendationStatus,
    ) -> Result<usize>;

    /// Apply a [`ResultSet`] atomically.
    fn replace_results(
        &self,
        assessment_id: AssessmentId,
        results: &ResultSet<'_>,
    ) -> Result<ReplaceSummary>;

    /// Scores of completed assessments matching `query`.
    fn get_historical_scores(&self, query: &HistoryQuery) -> Result<Vec<HistoricalAssessment>>;

    fn add_notification(&self, notification: &NewNotification) -> Result<Notification>;
    fn list_notifications(&self, organization_id: OrganizationId) -> Result<Vec<Notification>>;
}
