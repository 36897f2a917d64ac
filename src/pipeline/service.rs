//! The assessment service: scoring pipeline over an [`AssessmentStore`].

use crate::cache::TtlCache;
use crate::catalog::QuestionCatalog;
use crate::config::{AppConfig, DEFAULT_BENCHMARK_BASELINE, DEFAULT_HISTORY_LIMIT};
use crate::diagnostics::{
    self, Anomaly, Insight, MaturityProjection, PredictiveInsights, TrendPoint,
};
use crate::error::{AssessError, Result};
use crate::model::{
    Answer, AnsweredQuestion, Assessment, AssessmentId, Dimension, Finding, HistoricalAssessment,
    Notification, Organization, OrganizationId, Question, Recommendation, RecommendationId,
    RecommendationStatus, Score,
};
use crate::notify::{build_notifiers, CompletionEvent, Notifier};
use crate::recommend::{RecommendationEngine, RuleTable};
use crate::reports::AssessmentReport;
use crate::scoring::{
    self, aggregate_scores, build_insights, overall_maturity, AssessmentInsights,
    AssessmentSummary, CompletedAssessment, DimensionDelta, OrganizationBenchmark,
    OrganizationMetrics, RiskLevel,
};
use crate::store::{
    AssessmentDetails, AssessmentFilter, AssessmentStore, HistoryQuery, NewAssessment,
    NewNotification, ResultSet,
};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Notification kind recorded when an assessment completes.
pub const COMPLETION_NOTIFICATION_KIND: &str = "assessment_completed";

/// Result of completing an assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionOutcome {
    pub assessment: Assessment,
    pub scores: Vec<Score>,
    pub findings: usize,
    pub recommendations: usize,
    pub overall_maturity: f64,
    pub risk_level: RiskLevel,
    /// Previous recommendations whose user-set status was dropped by regeneration
    pub discarded_statuses: usize,
}

/// Result of setting one status on many recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BulkStatusOutcome {
    pub updated: usize,
    pub requested: usize,
}

/// Two assessments side by side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentComparison {
    pub baseline: Assessment,
    pub current: Assessment,
    pub baseline_overall: f64,
    pub current_overall: f64,
    pub dimensions: Vec<DimensionDelta>,
}

/// Scoring, recommendation and diagnostics over stored assessments.
///
/// Completion of one assessment is serialized in-process: a second
/// concurrent request for the same assessment fails with
/// [`AssessError::Conflict`] instead of racing the first.
pub struct AssessmentService<S: AssessmentStore> {
    store: S,
    catalog: QuestionCatalog,
    engine: RecommendationEngine,
    cache: Option<TtlCache<AssessmentSummary>>,
    notifiers: Vec<Box<dyn Notifier>>,
    history_limit: usize,
    benchmark_baseline: f64,
    completing: Mutex<HashSet<AssessmentId>>,
}

/// Releases the completion slot of an assessment when dropped.
struct CompletionGuard<'a> {
    in_flight: &'a Mutex<HashSet<AssessmentId>>,
    id: AssessmentId,
}

impl<'a> CompletionGuard<'a> {
    fn acquire(in_flight: &'a Mutex<HashSet<AssessmentId>>, id: AssessmentId) -> Result<Self> {
        let mut set = in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !set.insert(id) {
            return Err(AssessError::conflict(format!(
                "assessment {id} is already being completed"
            )));
        }
        Ok(Self { in_flight, id })
    }
}

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

fn summary_key(id: AssessmentId) -> String {
    format!("summary:{id}")
}

impl<S: AssessmentStore> AssessmentService<S> {
    /// Service without cache or notifiers.
    pub fn new(store: S, catalog: QuestionCatalog, engine: RecommendationEngine) -> Self {
        Self {
            store,
            catalog,
            engine,
            cache: None,
            notifiers: Vec::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            benchmark_baseline: DEFAULT_BENCHMARK_BASELINE,
            completing: Mutex::new(HashSet::new()),
        }
    }

    /// Service wired from configuration: catalog and rule files, cache,
    /// history window and notifiers.
    pub fn from_config(store: S, config: &AppConfig) -> Result<Self> {
        let catalog = QuestionCatalog::configured(&config.scoring)?;
        let rules = RuleTable::load(config.scoring.rules_file.as_deref())?;
        let mut service = Self::new(store, catalog, RecommendationEngine::new(rules))
            .with_history_limit(config.scoring.history_limit)
            .with_benchmark_baseline(config.scoring.benchmark_baseline)
            .with_notifiers(build_notifiers(config));
        if config.cache.enabled {
            service = service.with_cache(TtlCache::new(config.cache.ttl()));
        }
        Ok(service)
    }

    #[must_use]
    pub fn with_cache(mut self, cache: TtlCache<AssessmentSummary>) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn with_notifiers(mut self, notifiers: Vec<Box<dyn Notifier>>) -> Self {
        self.notifiers = notifiers;
        self
    }

    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    /// Maturity that organization benchmarks compare against.
    #[must_use]
    pub fn with_benchmark_baseline(mut self, baseline: f64) -> Self {
        self.benchmark_baseline = baseline;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &QuestionCatalog {
        &self.catalog
    }

    fn invalidate(&self, id: AssessmentId) {
        if let Some(cache) = &self.cache {
            cache.delete(&summary_key(id));
        }
    }

    fn invalidate_summaries(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_pattern("summary:");
        }
    }

    // ------------------------------------------------------------------
    // Catalog and lifecycle
    // ------------------------------------------------------------------

    /// Write the configured catalog into the store. Existing questions with
    /// the same ids are updated; their recorded answers are kept.
    pub fn seed_catalog(&self) -> Result<usize> {
        let written = self.store.upsert_questions(self.catalog.as_slice())?;
        tracing::info!(questions = written, "seeded question catalog");
        Ok(written)
    }

    /// Seed the catalog only if the store has no questions yet.
    pub fn ensure_catalog(&self) -> Result<()> {
        if self.store.get_questions(None)?.is_empty() {
            self.seed_catalog()?;
        }
        Ok(())
    }

    pub fn questions(&self, dimension: Option<Dimension>) -> Result<Vec<Question>> {
        self.store.get_questions(dimension)
    }

    pub fn create_organization(&self, name: &str, domain: Option<&str>) -> Result<Organization> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AssessError::validation("organization name must not be empty"));
        }
        let org = self.store.create_organization(name, domain)?;
        tracing::info!(organization_id = org.id, "created organization '{}'", org.name);
        Ok(org)
    }

    pub fn list_organizations(&self) -> Result<Vec<Organization>> {
        self.store.list_organizations()
    }

    pub fn create_assessment(&self, organization_id: OrganizationId, name: &str) -> Result<Assessment> {
        let assessment = self.store.create_assessment(&NewAssessment {
            organization_id,
            name: name.trim().to_string(),
            version: 1,
        })?;
        tracing::info!(assessment_id = assessment.id, organization_id, "created assessment");
        Ok(assessment)
    }

    pub fn get_assessment(&self, id: AssessmentId) -> Result<Assessment> {
        self.store.get_assessment(id)
    }

    pub fn list_assessments(&self, filter: &AssessmentFilter) -> Result<Vec<Assessment>> {
        self.store.list_assessments(filter)
    }

    /// Copy an assessment and its answers into a new draft.
    pub fn clone_assessment(&self, source: AssessmentId, name: Option<&str>) -> Result<Assessment> {
        let name = match name {
            Some(n) => n.trim().to_string(),
            None => format!("{} (copy)", self.store.get_assessment(source)?.name),
        };
        let copy = self.store.clone_assessment(source, &name)?;
        tracing::info!(source, assessment_id = copy.id, "cloned assessment");
        Ok(copy)
    }

    /// Replace the notes of an assessment; blank text clears them.
    pub fn set_notes(&self, id: AssessmentId, notes: Option<&str>) -> Result<Assessment> {
        let notes = notes.map(str::trim).filter(|n| !n.is_empty());
        self.update_details(id, &AssessmentDetails::Notes(notes))
    }

    /// Replace the tags of an assessment. Tags are trimmed; blanks and
    /// repeats are dropped, first occurrence wins.
    pub fn set_tags(&self, id: AssessmentId, tags: &[String]) -> Result<Assessment> {
        let mut seen = HashSet::new();
        let tags: Vec<String> = tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty() && seen.insert(*t))
            .map(str::to_string)
            .collect();
        self.update_details(id, &AssessmentDetails::Tags(&tags))
    }

    pub fn set_custom_fields(
        &self,
        id: AssessmentId,
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Assessment> {
        self.update_details(id, &AssessmentDetails::CustomFields(fields))
    }

    fn update_details(&self, id: AssessmentId, details: &AssessmentDetails<'_>) -> Result<Assessment> {
        let updated = self.store.update_assessment_details(id, details)?;
        self.invalidate(id);
        tracing::debug!(assessment_id = id, "assessment details updated");
        Ok(updated)
    }

    // ------------------------------------------------------------------
    // Scoring
    // ------------------------------------------------------------------

    /// Score a raw answer against a stored question without saving it.
    pub fn score_answer(&self, question_id: &str, raw_value: &str) -> Result<f64> {
        let question = self.store.get_question(question_id)?;
        Ok(scoring::score_answer(&question, raw_value))
    }

    /// Score and save an answer, overwriting any earlier answer to the same question.
    pub fn submit_answer(
        &self,
        assessment_id: AssessmentId,
        question_id: &str,
        raw_value: &str,
    ) -> Result<Answer> {
        let question = self.store.get_question(question_id)?;
        let answer = Answer {
            question_id: question.id.clone(),
            answer_value: raw_value.to_string(),
            maturity_score: Some(scoring::score_answer(&question, raw_value)),
        };
        self.store.upsert_answer(assessment_id, &answer)?;
        self.invalidate(assessment_id);
        tracing::debug!(
            assessment_id,
            question_id,
            score = ?answer.maturity_score,
            "answer saved"
        );
        Ok(answer)
    }

    fn answers(&self, id: AssessmentId) -> Result<Vec<AnsweredQuestion>> {
        self.store.get_answers(id)
    }

    /// Recompute and replace the dimension scores of an assessment.
    pub fn compute_scores(&self, id: AssessmentId) -> Result<Vec<Score>> {
        let scores = aggregate_scores(&self.answers(id)?);
        self.store.replace_results(
            id,
            &ResultSet {
                scores: Some(&scores),
                ..ResultSet::default()
            },
        )?;
        self.invalidate(id);
        Ok(scores)
    }

    /// Regenerate the findings of an assessment from its current answers.
    ///
    /// The scores the findings are derived from are stored with them, so
    /// stored findings never refer to stale scores.
    pub fn generate_findings(&self, id: AssessmentId) -> Result<Vec<Finding>> {
        let answers = self.answers(id)?;
        let scores = aggregate_scores(&answers);
        let findings = scoring::generate_findings(&scores, &answers);
        self.store.replace_results(
            id,
            &ResultSet {
                scores: Some(&scores),
                findings: Some(&findings),
                ..ResultSet::default()
            },
        )?;
        self.invalidate(id);
        Ok(findings)
    }

    /// Regenerate, prioritize and replace the recommendations of an assessment,
    /// storing the scores they were derived from alongside.
    ///
    /// Regeneration resets every status to pending; the number of statuses
    /// dropped this way is logged.
    pub fn generate_recommendations(&self, id: AssessmentId) -> Result<Vec<Recommendation>> {
        let scores = aggregate_scores(&self.answers(id)?);
        let recommendations = self.engine.recommend(&scores);
        let summary = self.store.replace_results(
            id,
            &ResultSet {
                scores: Some(&scores),
                recommendations: Some(&recommendations),
                ..ResultSet::default()
            },
        )?;
        warn_discarded(id, summary.discarded_statuses);
        self.invalidate(id);
        self.store.get_recommendations(id)
    }

    /// Run the full pipeline and mark the assessment completed.
    ///
    /// Scores, findings, recommendations and the completed status are
    /// written in one transaction. Notifications run after the commit and
    /// their failures are only logged.
    pub fn complete_assessment(&self, id: AssessmentId) -> Result<CompletionOutcome> {
        let _guard = CompletionGuard::acquire(&self.completing, id)?;

        let answers = self.answers(id)?;
        let scores = aggregate_scores(&answers);
        let findings = scoring::generate_findings(&scores, &answers);
        let recommendations = self.engine.recommend(&scores);
        let completed_at = Utc::now();

        let summary = self.store.replace_results(
            id,
            &ResultSet {
                scores: Some(&scores),
                findings: Some(&findings),
                recommendations: Some(&recommendations),
                completed_at: Some(completed_at),
            },
        )?;
        self.invalidate(id);
        warn_discarded(id, summary.discarded_statuses);

        let assessment = self.store.get_assessment(id)?;
        let overall = overall_maturity(&scores);
        tracing::info!(
            assessment_id = id,
            answers = answers.len(),
            findings = findings.len(),
            recommendations = recommendations.len(),
            overall_maturity = format!("{overall:.2}"),
            "assessment completed"
        );

        self.notify_completion(&assessment, overall);

        Ok(CompletionOutcome {
            assessment,
            findings: findings.len(),
            recommendations: recommendations.len(),
            overall_maturity: overall,
            risk_level: RiskLevel::from_maturity(overall),
            discarded_statuses: summary.discarded_statuses,
            scores,
        })
    }

    fn notify_completion(&self, assessment: &Assessment, overall: f64) {
        let record = NewNotification {
            organization_id: assessment.organization_id,
            kind: COMPLETION_NOTIFICATION_KIND.to_string(),
            title: "Assessment Completed".to_string(),
            message: format!(
                "Assessment '{}' has been completed with an overall maturity of {overall:.1}/5.0",
                assessment.name
            ),
        };
        if let Err(e) = self.store.add_notification(&record) {
            tracing::warn!("Failed to record completion notification: {e}");
        }

        let event = CompletionEvent::new(
            assessment.id,
            assessment.organization_id,
            assessment.name.clone(),
            overall,
            assessment.completed_at.unwrap_or_else(Utc::now),
        );
        for notifier in &self.notifiers {
            if let Err(e) = notifier.notify(&event) {
                tracing::warn!("Notifier {} failed: {e}", notifier.name());
            }
        }
    }

    pub fn update_recommendation_status(
        &self,
        id: RecommendationId,
        status: RecommendationStatus,
    ) -> Result<Recommendation> {
        let updated = self.store.update_recommendation_status(id, status)?;
        self.invalidate_summaries();
        Ok(updated)
    }

    /// Set `status` on every listed recommendation that exists.
    pub fn bulk_update_recommendation_status(
        &self,
        ids: &[RecommendationId],
        status: RecommendationStatus,
    ) -> Result<BulkStatusOutcome> {
        let mut seen = HashSet::new();
        let unique: Vec<RecommendationId> =
            ids.iter().copied().filter(|id| seen.insert(*id)).collect();
        let updated = self.store.update_recommendation_statuses(&unique, status)?;
        self.invalidate_summaries();
        if updated < unique.len() {
            tracing::debug!(
                skipped = unique.len() - updated,
                "bulk status update skipped unknown recommendations"
            );
        }
        Ok(BulkStatusOutcome {
            updated,
            requested: ids.len(),
        })
    }

    // ------------------------------------------------------------------
    // Reading results
    // ------------------------------------------------------------------

    /// Stored results of an assessment with overall maturity and risk level.
    pub fn summary(&self, id: AssessmentId) -> Result<AssessmentSummary> {
        let key = summary_key(id);
        if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(&key)) {
            tracing::debug!(assessment_id = id, "summary cache hit");
            return Ok(hit);
        }

        let summary = AssessmentSummary::new(
            self.store.get_assessment(id)?,
            self.store.get_scores(id)?,
            self.store.get_findings(id)?,
            self.store.get_recommendations(id)?,
        );
        if let Some(cache) = &self.cache {
            cache.insert(key, summary.clone());
        }
        Ok(summary)
    }

    pub fn insights(&self, id: AssessmentId) -> Result<AssessmentInsights> {
        let summary = self.summary(id)?;
        Ok(build_insights(
            &summary.scores,
            &summary.findings,
            &summary.recommendations,
        ))
    }

    /// Summary, insights, anomalies and projection for reporting.
    pub fn report(&self, id: AssessmentId) -> Result<AssessmentReport> {
        let summary = self.summary(id)?;
        let insights = build_insights(
            &summary.scores,
            &summary.findings,
            &summary.recommendations,
        );
        Ok(AssessmentReport::new(summary)
            .with_insights(insights)
            .with_anomalies(self.detect_anomalies(id)?)
            .with_projection(self.predict_maturity_trend(id)?))
    }

    /// Per-dimension difference between two assessments (`current` − `baseline`).
    pub fn compare(&self, baseline: AssessmentId, current: AssessmentId) -> Result<AssessmentComparison> {
        let baseline_scores = self.store.get_scores(baseline)?;
        let current_scores = self.store.get_scores(current)?;
        Ok(AssessmentComparison {
            baseline: self.store.get_assessment(baseline)?,
            current: self.store.get_assessment(current)?,
            baseline_overall: overall_maturity(&baseline_scores),
            current_overall: overall_maturity(&current_scores),
            dimensions: scoring::compare_scores(&baseline_scores, &current_scores),
        })
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    /// Stored scores, or scores computed from the answers when the
    /// assessment has not been scored yet.
    fn current_scores(&self, id: AssessmentId) -> Result<Vec<Score>> {
        let stored = self.store.get_scores(id)?;
        if stored.is_empty() {
            return Ok(aggregate_scores(&self.answers(id)?));
        }
        Ok(stored)
    }

    /// Compare an assessment with the organization's most recent completed ones.
    pub fn detect_anomalies(&self, id: AssessmentId) -> Result<Vec<Anomaly>> {
        let assessment = self.store.get_assessment(id)?;
        let current = self.current_scores(id)?;
        let history = self.store.get_historical_scores(
            &HistoryQuery::for_organization(assessment.organization_id)
                .excluding(id)
                .limit(self.history_limit),
        )?;
        let anomalies = diagnostics::detect_anomalies(&current, &history);
        tracing::debug!(
            assessment_id = id,
            history = history.len(),
            anomalies = anomalies.len(),
            "anomaly detection finished"
        );
        Ok(anomalies)
    }

    fn chronological_history(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<HistoricalAssessment>> {
        self.store
            .get_historical_scores(&HistoryQuery::for_organization(organization_id).chronological())
    }

    /// Six-month projection of the organization's overall maturity; `None`
    /// with fewer than two scored completed assessments.
    pub fn predict_maturity_trend(&self, id: AssessmentId) -> Result<Option<MaturityProjection>> {
        let assessment = self.store.get_assessment(id)?;
        let current = self.current_scores(id)?;
        let history = self.chronological_history(assessment.organization_id)?;
        Ok(diagnostics::project_maturity(&current, &history))
    }

    pub fn predictive_insights(&self, id: AssessmentId) -> Result<PredictiveInsights> {
        let assessment = self.store.get_assessment(id)?;
        let current = self.current_scores(id)?;
        let history = self.chronological_history(assessment.organization_id)?;
        Ok(diagnostics::predictive_insights(&current, &history))
    }

    pub fn workload_insights(&self, id: AssessmentId) -> Result<Vec<Insight>> {
        let answered = self.answers(id)?;
        let scores = self.current_scores(id)?;
        let answers: Vec<Answer> = answered.into_iter().map(|a| a.answer).collect();
        Ok(diagnostics::workload_insights(&scores, &answers))
    }

    /// Overall and per-dimension maturity of every completed assessment, oldest first.
    pub fn organization_trends(&self, organization_id: OrganizationId) -> Result<Vec<TrendPoint>> {
        self.store.get_organization(organization_id)?;
        let history = self.chronological_history(organization_id)?;
        Ok(diagnostics::organization_trend(&history))
    }

    pub fn list_notifications(&self, organization_id: OrganizationId) -> Result<Vec<Notification>> {
        self.store.list_notifications(organization_id)
    }

    // ------------------------------------------------------------------
    // Organization rollups
    // ------------------------------------------------------------------

    /// Every assessment of an organization, and the completed ones with
    /// their stored scores and recommendations.
    fn completed_assessments(
        &self,
        organization_id: OrganizationId,
    ) -> Result<(usize, Vec<CompletedAssessment>)> {
        self.store.get_organization(organization_id)?;
        let all = self.store.list_assessments(&AssessmentFilter {
            organization_id: Some(organization_id),
            status: None,
        })?;
        let total = all.len();
        let completed = all
            .into_iter()
            .filter(Assessment::is_completed)
            .map(|assessment| {
                Ok(CompletedAssessment {
                    scores: self.store.get_scores(assessment.id)?,
                    recommendations: self.store.get_recommendations(assessment.id)?,
                    assessment,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((total, completed))
    }

    pub fn organization_metrics(&self, organization_id: OrganizationId) -> Result<OrganizationMetrics> {
        let (total, completed) = self.completed_assessments(organization_id)?;
        Ok(scoring::organization_metrics(organization_id, total, &completed))
    }

    /// Latest completed assessment against the configured baseline; `None`
    /// when the organization has no scored completed assessment.
    pub fn organization_benchmark(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Option<OrganizationBenchmark>> {
        let (_, completed) = self.completed_assessments(organization_id)?;
        Ok(scoring::benchmark(
            organization_id,
            &completed,
            self.benchmark_baseline,
        ))
    }
}

fn warn_discarded(id: AssessmentId, discarded: usize) {
    if discarded > 0 {
        tracing::warn!(
            assessment_id = id,
            discarded,
            "regenerated recommendations reset {discarded} user-set status(es) to pending"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssessmentStatus, Severity};
    use crate::store::SqliteStore;
    use std::sync::Arc;

    struct Recording(Arc<Mutex<Vec<CompletionEvent>>>);

    impl Notifier for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        fn notify(&self, event: &CompletionEvent) -> anyhow::Result<()> {
            self.0.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    struct Failing;

    impl Notifier for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn notify(&self, _event: &CompletionEvent) -> anyhow::Result<()> {
            anyhow::bail!("endpoint unreachable")
        }
    }

    fn service() -> AssessmentService<SqliteStore> {
        let store = SqliteStore::open_in_memory().unwrap();
        let service = AssessmentService::new(
            store,
            QuestionCatalog::builtin().unwrap(),
            RecommendationEngine::new(RuleTable::builtin().unwrap()),
        )
        .with_cache(TtlCache::default());
        service.seed_catalog().unwrap();
        service
    }

    fn first_critical(service: &AssessmentService<SqliteStore>, dimension: Dimension) -> Question {
        service
            .questions(Some(dimension))
            .unwrap()
            .into_iter()
            .find(|q| q.is_critical)
            .unwrap()
    }

    #[test]
    fn test_seed_is_idempotent() {
        let service = service();
        assert_eq!(service.seed_catalog().unwrap(), 28);
        assert_eq!(service.questions(None).unwrap().len(), 28);
    }

    #[test]
    fn test_submit_answer_scores_and_starts() {
        let service = service();
        let org = service.create_organization("Acme", None).unwrap();
        let a = service.create_assessment(org.id, "Q1").unwrap();

        let answer = service.submit_answer(a.id, "perf-01", "100").unwrap();
        assert_eq!(answer.maturity_score, Some(5.0));
        assert_eq!(
            service.get_assessment(a.id).unwrap().status,
            AssessmentStatus::InProgress
        );

        let err = service.submit_answer(a.id, "nope-99", "1").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_single_critical_answer_end_to_end() {
        let service = service();
        let org = service.create_organization("Acme", None).unwrap();
        let a = service.create_assessment(org.id, "Q1").unwrap();
        let q = first_critical(&service, Dimension::FailureResilience);

        // Pin the answer score to exactly 1.0.
        service
            .store()
            .upsert_answer(
                a.id,
                &Answer {
                    question_id: q.id.clone(),
                    answer_value: "x".to_string(),
                    maturity_score: Some(1.0),
                },
            )
            .unwrap();

        let outcome = service.complete_assessment(a.id).unwrap();
        assert_eq!(outcome.scores.len(), 1);
        assert_eq!(outcome.scores[0].weighted_score, 1.0);
        assert_eq!(outcome.assessment.status, AssessmentStatus::Completed);
        assert!(outcome.assessment.completed_at.is_some());

        let findings = service.store().get_findings(a.id).unwrap();
        let critical: Vec<_> = findings
            .iter()
            .filter(|f| f.severity == Severity::Critical)
            .collect();
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].dimension, Dimension::FailureResilience);
    }

    #[test]
    fn test_compute_scores_is_idempotent() {
        let service = service();
        let org = service.create_organization("Acme", None).unwrap();
        let a = service.create_assessment(org.id, "Q1").unwrap();
        for q in service.questions(Some(Dimension::Performance)).unwrap() {
            let value = q.options.last().cloned().unwrap_or_else(|| "15".to_string());
            service.submit_answer(a.id, &q.id, &value).unwrap();
        }

        let first = service.compute_scores(a.id).unwrap();
        let second = service.compute_scores(a.id).unwrap();
        assert_eq!(first, second);
        assert_eq!(service.store().get_scores(a.id).unwrap(), second);
    }

    #[test]
    fn test_findings_are_stored_with_their_scores() {
        let service = service();
        let org = service.create_organization("Acme", None).unwrap();
        let a = service.create_assessment(org.id, "Q1").unwrap();
        let q = first_critical(&service, Dimension::FailureResilience);
        service.submit_answer(a.id, &q.id, "unknown").unwrap();
        service.compute_scores(a.id).unwrap();

        // An answer changes after scoring; regenerating findings must not
        // leave the earlier scores behind.
        let perf = first_critical(&service, Dimension::Performance);
        service.submit_answer(a.id, &perf.id, "unknown").unwrap();
        let findings = service.generate_findings(a.id).unwrap();

        let stored = service.store().get_scores(a.id).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored, aggregate_scores(&service.answers(a.id).unwrap()));
        assert!(findings.iter().all(|f| stored.iter().any(|s| s.dimension == f.dimension)));
        assert_eq!(service.store().get_findings(a.id).unwrap(), findings);
    }

    #[test]
    fn test_regeneration_reports_discarded_statuses() {
        let service = service();
        let org = service.create_organization("Acme", None).unwrap();
        let a = service.create_assessment(org.id, "Q1").unwrap();
        let q = first_critical(&service, Dimension::Performance);
        service.submit_answer(a.id, &q.id, "unknown").unwrap();

        service.complete_assessment(a.id).unwrap();
        let recs = service.summary(a.id).unwrap().recommendations;
        assert!(!recs.is_empty());
        service
            .update_recommendation_status(recs[0].id.unwrap(), RecommendationStatus::InProgress)
            .unwrap();

        let outcome = service.complete_assessment(a.id).unwrap();
        assert_eq!(outcome.discarded_statuses, 1);
        assert!(service
            .summary(a.id)
            .unwrap()
            .recommendations
            .iter()
            .all(|r| r.status == RecommendationStatus::Pending));
    }

    #[test]
    fn test_summary_cache_invalidated_by_answers() {
        let service = service();
        let org = service.create_organization("Acme", None).unwrap();
        let a = service.create_assessment(org.id, "Q1").unwrap();
        let q = first_critical(&service, Dimension::ProductionReadiness);

        assert_eq!(
            service.summary(a.id).unwrap().assessment.status,
            AssessmentStatus::Draft
        );
        service.submit_answer(a.id, &q.id, "anything").unwrap();
        assert_eq!(
            service.summary(a.id).unwrap().assessment.status,
            AssessmentStatus::InProgress
        );
    }

    #[test]
    fn test_completion_notifies_and_survives_failing_notifier() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let service = service().with_notifiers(vec![
            Box::new(Failing),
            Box::new(Recording(Arc::clone(&events))),
        ]);
        let org = service.create_organization("Acme", None).unwrap();
        let a = service.create_assessment(org.id, "Q1").unwrap();

        service.complete_assessment(a.id).unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].assessment_id, a.id);
        let stored = service.list_notifications(org.id).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].kind, COMPLETION_NOTIFICATION_KIND);
    }

    #[test]
    fn test_concurrent_completion_conflicts() {
        let service = service();
        let org = service.create_organization("Acme", None).unwrap();
        let a = service.create_assessment(org.id, "Q1").unwrap();

        let held = CompletionGuard::acquire(&service.completing, a.id).unwrap();
        let err = service.complete_assessment(a.id).unwrap_err();
        assert!(matches!(err, AssessError::Conflict(_)));
        drop(held);
        assert!(service.complete_assessment(a.id).is_ok());
    }

    #[test]
    fn test_complete_missing_assessment() {
        let service = service();
        assert!(service.complete_assessment(404).unwrap_err().is_not_found());
    }

    #[test]
    fn test_clone_defaults_name() {
        let service = service();
        let org = service.create_organization("Acme", None).unwrap();
        let a = service.create_assessment(org.id, "Q1").unwrap();
        let copy = service.clone_assessment(a.id, None).unwrap();
        assert_eq!(copy.name, "Q1 (copy)");
        assert_eq!(copy.version, 2);
    }

    #[test]
    fn test_bulk_status_counts_and_invalidates() {
        let service = service();
        let org = service.create_organization("Acme", None).unwrap();
        let a = service.create_assessment(org.id, "Q1").unwrap();
        let q = first_critical(&service, Dimension::Performance);
        service.submit_answer(a.id, &q.id, "unknown").unwrap();
        service.complete_assessment(a.id).unwrap();

        let ids: Vec<_> = service
            .summary(a.id)
            .unwrap()
            .recommendations
            .iter()
            .filter_map(|r| r.id)
            .collect();
        let mut request = ids.clone();
        request.push(9999);

        let outcome = service
            .bulk_update_recommendation_status(&request, RecommendationStatus::Completed)
            .unwrap();
        assert_eq!(outcome.updated, ids.len());
        assert_eq!(outcome.requested, ids.len() + 1);
        assert!(service
            .summary(a.id)
            .unwrap()
            .recommendations
            .iter()
            .all(|r| r.status == RecommendationStatus::Completed));
    }

    #[test]
    fn test_tags_are_normalized() {
        let service = service();
        let org = service.create_organization("Acme", None).unwrap();
        let a = service.create_assessment(org.id, "Q1").unwrap();
        let raw: Vec<String> = [" payments ", "", "q1", "payments"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let updated = service.set_tags(a.id, &raw).unwrap();
        assert_eq!(updated.tags, vec!["payments", "q1"]);

        let noted = service.set_notes(a.id, Some("  ")).unwrap();
        assert!(noted.notes.is_none());
        assert_eq!(service.summary(a.id).unwrap().assessment.tags.len(), 2);
    }

    #[test]
    fn test_organization_rollups() {
        let service = service().with_benchmark_baseline(2.0);
        let org = service.create_organization("Acme", None).unwrap();
        assert!(service.organization_benchmark(org.id).unwrap().is_none());

        let done = service.create_assessment(org.id, "Q1").unwrap();
        for q in service.questions(Some(Dimension::Performance)).unwrap() {
            let value = q.options.last().cloned().unwrap_or_else(|| "100".to_string());
            service.submit_answer(done.id, &q.id, &value).unwrap();
        }
        let outcome = service.complete_assessment(done.id).unwrap();
        service.create_assessment(org.id, "Q2").unwrap();

        let metrics = service.organization_metrics(org.id).unwrap();
        assert_eq!(metrics.total_assessments, 2);
        assert_eq!(metrics.completed_assessments, 1);
        assert!((metrics.average_maturity - outcome.overall_maturity).abs() < 1e-9);
        assert_eq!(metrics.latest_assessment_date, outcome.assessment.completed_at);

        let bench = service.organization_benchmark(org.id).unwrap().unwrap();
        assert_eq!(bench.assessment_id, done.id);
        assert_eq!(bench.industry_average, 2.0);
        assert!((bench.vs_industry - (outcome.overall_maturity - 2.0)).abs() < 1e-9);

        assert!(service.organization_metrics(404).unwrap_err().is_not_found());
    }

    #[test]
    fn test_empty_organization_name_rejected() {
        let service = service();
        assert!(matches!(
            service.create_organization("  ", None),
            Err(AssessError::Validation(_))
        ));
    }
}
