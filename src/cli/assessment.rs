//! Organization, assessment and answer command handlers.

use super::CliContext;
use crate::model::{
    Assessment, AssessmentId, AssessmentStatus, Organization, OrganizationId, RecommendationId,
    RecommendationStatus,
};
use crate::pipeline::{exit_codes, BulkStatusOutcome, CompletionOutcome};
use crate::store::AssessmentFilter;
use anyhow::{Context, Result};
use std::fmt::Write as _;

pub fn run_org_create(ctx: &CliContext, name: &str, domain: Option<&str>) -> Result<()> {
    let service = ctx.open_service()?;
    let org = service.create_organization(name, domain)?;
    ctx.emit(&org, || format!("Created organization #{} '{}'", org.id, org.name))
}

pub fn run_org_list(ctx: &CliContext) -> Result<()> {
    let service = ctx.open_service()?;
    let orgs = service.list_organizations()?;
    ctx.emit(&orgs, || format_organizations(&orgs))
}

pub fn run_assessment_create(
    ctx: &CliContext,
    organization_id: OrganizationId,
    name: &str,
) -> Result<()> {
    let service = ctx.open_service()?;
    let assessment = service.create_assessment(organization_id, name)?;
    ctx.emit(&assessment, || {
        format!(
            "Created assessment #{} '{}' (v{})",
            assessment.id, assessment.name, assessment.version
        )
    })
}

pub fn run_assessment_list(
    ctx: &CliContext,
    organization_id: Option<OrganizationId>,
    status: Option<AssessmentStatus>,
) -> Result<()> {
    let service = ctx.open_service()?;
    let assessments = service.list_assessments(&AssessmentFilter {
        organization_id,
        status,
    })?;
    ctx.emit(&assessments, || format_assessments(&assessments))
}

pub fn run_assessment_clone(
    ctx: &CliContext,
    source: AssessmentId,
    name: Option<&str>,
) -> Result<()> {
    let service = ctx.open_service()?;
    let copy = service.clone_assessment(source, name)?;
    ctx.emit(&copy, || {
        format!(
            "Cloned assessment #{source} into #{} '{}' (v{})",
            copy.id, copy.name, copy.version
        )
    })
}

/// Replace the notes of an assessment; no text clears them.
pub fn run_assessment_notes(
    ctx: &CliContext,
    assessment_id: AssessmentId,
    notes: Option<&str>,
) -> Result<()> {
    let service = ctx.open_service()?;
    let updated = service.set_notes(assessment_id, notes)?;
    ctx.emit(&updated, || match &updated.notes {
        Some(_) => format!("Updated notes of assessment #{assessment_id}"),
        None => format!("Cleared notes of assessment #{assessment_id}"),
    })
}

pub fn run_assessment_tags(
    ctx: &CliContext,
    assessment_id: AssessmentId,
    tags: &[String],
) -> Result<()> {
    let service = ctx.open_service()?;
    let updated = service.set_tags(assessment_id, tags)?;
    ctx.emit(&updated, || {
        if updated.tags.is_empty() {
            format!("Cleared tags of assessment #{assessment_id}")
        } else {
            format!("Assessment #{assessment_id} tags: {}", updated.tags.join(", "))
        }
    })
}

/// Replace the custom fields of an assessment with a JSON object.
pub fn run_assessment_fields(ctx: &CliContext, assessment_id: AssessmentId, json: &str) -> Result<()> {
    let fields = parse_custom_fields(json)?;
    let service = ctx.open_service()?;
    let updated = service.set_custom_fields(assessment_id, &fields)?;
    ctx.emit(&updated, || {
        format!(
            "Assessment #{assessment_id} has {} custom field(s)",
            updated.custom_fields.len()
        )
    })
}

fn parse_custom_fields(json: &str) -> Result<serde_json::Map<String, serde_json::Value>> {
    let value: serde_json::Value =
        serde_json::from_str(json).context("Custom fields are not valid JSON")?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => anyhow::bail!("Custom fields must be a JSON object, got {other}"),
    }
}

/// Record an answer and print the maturity score it earned.
pub fn run_answer(
    ctx: &CliContext,
    assessment_id: AssessmentId,
    question_id: &str,
    value: &str,
) -> Result<()> {
    let service = ctx.open_service()?;
    let answer = service.submit_answer(assessment_id, question_id, value)?;
    ctx.emit(&answer, || {
        format!(
            "{} = {:?} → maturity {:.2}",
            answer.question_id,
            answer.answer_value,
            answer.maturity_score.unwrap_or_default()
        )
    })
}

/// Complete an assessment, returning the desired exit code.
///
/// With `min_maturity` set, an overall maturity below it yields
/// [`exit_codes::BELOW_THRESHOLD`].
pub fn run_complete(
    ctx: &CliContext,
    assessment_id: AssessmentId,
    min_maturity: Option<f64>,
) -> Result<i32> {
    let service = ctx.open_service()?;
    let outcome = service.complete_assessment(assessment_id)?;
    ctx.emit(&outcome, || format_outcome(&outcome))?;
    Ok(threshold_exit_code(outcome.overall_maturity, min_maturity))
}

pub fn run_recommendation_status(
    ctx: &CliContext,
    id: RecommendationId,
    status: RecommendationStatus,
) -> Result<()> {
    let service = ctx.open_service()?;
    let rec = service.update_recommendation_status(id, status)?;
    ctx.emit(&rec, || format!("Recommendation #{id} '{}' is now {}", rec.title, rec.status))
}

pub fn run_recommendation_bulk_status(
    ctx: &CliContext,
    ids: &[RecommendationId],
    status: RecommendationStatus,
) -> Result<()> {
    let service = ctx.open_service()?;
    let outcome = service.bulk_update_recommendation_status(ids, status)?;
    ctx.emit(&outcome, || format_bulk_outcome(&outcome, status))
}

fn format_bulk_outcome(outcome: &BulkStatusOutcome, status: RecommendationStatus) -> String {
    format!(
        "Set {} of {} recommendation(s) to {status}",
        outcome.updated, outcome.requested
    )
}

/// Exit code for an overall maturity checked against an optional minimum.
pub(crate) fn threshold_exit_code(overall: f64, min_maturity: Option<f64>) -> i32 {
    match min_maturity {
        Some(min) if overall < min => {
            tracing::error!("Overall maturity {overall:.2} is below minimum {min:.2}");
            exit_codes::BELOW_THRESHOLD
        }
        _ => exit_codes::SUCCESS,
    }
}

fn format_organizations(orgs: &[Organization]) -> String {
    if orgs.is_empty() {
        return "No organizations".to_string();
    }
    let mut out = String::new();
    for org in orgs {
        let _ = writeln!(
            out,
            "#{:<4} {:<30} {}",
            org.id,
            org.name,
            org.domain.as_deref().unwrap_or("-")
        );
    }
    out
}

fn format_assessments(assessments: &[Assessment]) -> String {
    if assessments.is_empty() {
        return "No assessments".to_string();
    }
    let mut out = String::new();
    for a in assessments {
        let _ = writeln!(
            out,
            "#{:<4} org {:<4} v{:<3} {:<12} {}  {}",
            a.id,
            a.organization_id,
            a.version,
            a.status,
            a.created_at.format("%Y-%m-%d"),
            a.name
        );
    }
    out
}

fn format_outcome(outcome: &CompletionOutcome) -> String {
    let mut out = format!(
        "Completed assessment #{} '{}'\nOverall maturity {:.2}/5.0 (risk {})\n",
        outcome.assessment.id,
        outcome.assessment.name,
        outcome.overall_maturity,
        outcome.risk_level
    );
    for score in &outcome.scores {
        let _ = writeln!(out, "  {:<26} {:.2}", score.dimension.title(), score.maturity_score);
    }
    let _ = writeln!(
        out,
        "{} findings, {} recommendations",
        outcome.findings, outcome.recommendations
    );
    if outcome.discarded_statuses > 0 {
        let _ = writeln!(
            out,
            "{} recommendation statuses were reset by regeneration",
            outcome.discarded_statuses
        );
    }
    out
}
