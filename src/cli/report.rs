//! Report and diagnostics command handlers.

use super::assessment::threshold_exit_code;
use super::CliContext;
use crate::diagnostics::{Anomaly, Insight, MaturityProjection, TrendPoint};
use crate::model::{AssessmentId, Notification, OrganizationId};
use crate::pipeline::AssessmentComparison;
use crate::reports::create_reporter_with_options;
use crate::scoring::{AssessmentInsights, OrganizationBenchmark, OrganizationMetrics};
use anyhow::Result;
use serde::Serialize;
use std::fmt::Write as _;

/// Render the full report of an assessment, returning the desired exit code.
pub fn run_report(
    ctx: &CliContext,
    assessment_id: AssessmentId,
    min_maturity: Option<f64>,
) -> Result<i32> {
    let service = ctx.open_service()?;
    let report = service.report(assessment_id)?;
    let reporter = create_reporter_with_options(ctx.format(), ctx.colored());
    let content = reporter.generate(&report)?;
    crate::pipeline::write_output(content.trim_end(), &ctx.target(), ctx.quiet)?;
    Ok(threshold_exit_code(
        report.summary.overall_maturity,
        min_maturity,
    ))
}

pub fn run_anomalies(ctx: &CliContext, assessment_id: AssessmentId) -> Result<()> {
    let service = ctx.open_service()?;
    let anomalies = service.detect_anomalies(assessment_id)?;
    ctx.emit(&anomalies, || format_anomalies(&anomalies))
}

pub fn run_trend(ctx: &CliContext, assessment_id: AssessmentId) -> Result<()> {
    let service = ctx.open_service()?;
    let projection = service.predict_maturity_trend(assessment_id)?;
    ctx.emit(&projection, || format_projection(projection.as_ref()))
}

/// Organization maturity timeline.
pub fn run_history(ctx: &CliContext, organization_id: OrganizationId) -> Result<()> {
    let service = ctx.open_service()?;
    let points = service.organization_trends(organization_id)?;
    ctx.emit(&points, || format_timeline(&points))
}

#[derive(Serialize)]
struct InsightsOutput {
    summary: AssessmentInsights,
    workload: Vec<Insight>,
    capacity: Vec<Insight>,
    cost: Vec<Insight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    projection: Option<MaturityProjection>,
}

pub fn run_insights(ctx: &CliContext, assessment_id: AssessmentId) -> Result<()> {
    let service = ctx.open_service()?;
    let predictive = service.predictive_insights(assessment_id)?;
    let output = InsightsOutput {
        summary: service.insights(assessment_id)?,
        workload: service.workload_insights(assessment_id)?,
        capacity: predictive.capacity_insights,
        cost: predictive.cost_insights,
        projection: predictive.maturity_projection,
    };
    ctx.emit(&output, || format_insights(&output))
}

pub fn run_compare(ctx: &CliContext, baseline: AssessmentId, current: AssessmentId) -> Result<()> {
    let service = ctx.open_service()?;
    let comparison = service.compare(baseline, current)?;
    ctx.emit(&comparison, || format_comparison(&comparison))
}

/// Aggregate metrics over an organization's completed assessments.
pub fn run_org_metrics(ctx: &CliContext, organization_id: OrganizationId) -> Result<()> {
    let service = ctx.open_service()?;
    let metrics = service.organization_metrics(organization_id)?;
    ctx.emit(&metrics, || format_metrics(&metrics))
}

pub fn run_org_benchmark(ctx: &CliContext, organization_id: OrganizationId) -> Result<()> {
    let service = ctx.open_service()?;
    let benchmark = service.organization_benchmark(organization_id)?;
    ctx.emit(&benchmark, || format_benchmark(benchmark.as_ref()))
}

pub fn run_notifications(ctx: &CliContext, organization_id: OrganizationId) -> Result<()> {
    let service = ctx.open_service()?;
    let notifications = service.list_notifications(organization_id)?;
    ctx.emit(&notifications, || format_notifications(&notifications))
}

fn format_anomalies(anomalies: &[Anomaly]) -> String {
    if anomalies.is_empty() {
        return "No anomalies detected".to_string();
    }
    let mut out = String::new();
    for a in anomalies {
        let _ = writeln!(
            out,
            "[{}] {} (confidence {:.0}%)\n    → {}",
            a.severity,
            a.message,
            a.confidence * 100.0,
            a.recommendation
        );
    }
    out
}

fn format_projection(projection: Option<&MaturityProjection>) -> String {
    projection.map_or_else(
        || "Not enough completed assessments to project a trend".to_string(),
        |p| {
            format!(
                "Current {:.2}, projected {:.2} in 6 months ({}, velocity {:+.2}, confidence {:.0}%, {} data points)",
                p.current,
                p.projected_6mo,
                p.trend,
                p.velocity,
                p.confidence * 100.0,
                p.data_points
            )
        },
    )
}

fn format_timeline(points: &[TrendPoint]) -> String {
    if points.is_empty() {
        return "No completed assessments".to_string();
    }
    let mut out = String::new();
    for p in points {
        let _ = writeln!(
            out,
            "{}  #{:<4} {:.2}  {}",
            p.created_at.format("%Y-%m-%d"),
            p.assessment_id,
            p.overall_maturity,
            p.name
        );
    }
    out
}

fn push_insights(out: &mut String, heading: &str, insights: &[Insight]) {
    if insights.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{heading}:");
    for i in insights {
        let _ = writeln!(out, "  [{}] {}: {}", i.priority, i.title, i.message);
        if let Some(savings) = &i.estimated_savings_potential {
            let _ = writeln!(out, "      savings potential {savings}");
        }
    }
}

fn format_insights(output: &InsightsOutput) -> String {
    let s = &output.summary;
    let mut out = format!(
        "{} findings ({} critical), {} recommendations ({} urgent)\n",
        s.total_findings, s.critical_findings, s.total_recommendations, s.urgent_recommendations
    );
    if let Some(h) = &s.strongest_dimension {
        let _ = writeln!(out, "Strongest: {} ({:.2})", h.dimension.title(), h.score);
    }
    if let Some(h) = &s.weakest_dimension {
        let _ = writeln!(out, "Weakest:   {} ({:.2})", h.dimension.title(), h.score);
    }
    if !s.quick_wins.is_empty() {
        let _ = writeln!(out, "Quick wins: {}", s.quick_wins.join("; "));
    }
    push_insights(&mut out, "Workload", &output.workload);
    push_insights(&mut out, "Capacity", &output.capacity);
    push_insights(&mut out, "Cost", &output.cost);
    if output.projection.is_some() {
        let _ = writeln!(out, "\n{}", format_projection(output.projection.as_ref()));
    }
    out
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn format_comparison(c: &AssessmentComparison) -> String {
    let mut out = format!(
        "#{} '{}' → #{} '{}'\nOverall {:.2} → {:.2}\n",
        c.baseline.id,
        c.baseline.name,
        c.current.id,
        c.current.name,
        c.baseline_overall,
        c.current_overall
    );
    for d in &c.dimensions {
        let change = d
            .difference
            .map_or_else(|| "-".to_string(), |v| format!("{v:+.2}"));
        let _ = writeln!(
            out,
            "  {:<26} {:>5} → {:>5}  {change}",
            d.dimension.title(),
            fmt_opt(d.baseline),
            fmt_opt(d.current)
        );
    }
    out
}

fn format_metrics(m: &OrganizationMetrics) -> String {
    let mut out = format!(
        "{} assessments, {} completed\nAverage maturity {:.2}/5.0\n",
        m.total_assessments, m.completed_assessments, m.average_maturity
    );
    let _ = writeln!(
        out,
        "Recommendations {}/{} completed ({:.1}%)",
        m.completed_recommendations, m.total_recommendations, m.recommendation_completion_rate
    );
    if let Some(at) = m.latest_assessment_date {
        let _ = writeln!(out, "Latest completion {}", at.format("%Y-%m-%d"));
    }
    for (dimension, avg) in &m.dimension_averages {
        let _ = writeln!(out, "  {:<26} {avg:.2}", dimension.title());
    }
    out
}

fn format_benchmark(benchmark: Option<&OrganizationBenchmark>) -> String {
    let Some(b) = benchmark else {
        return "No scored completed assessments to benchmark".to_string();
    };
    let mut out = format!(
        "#{} '{}': overall {:.2} vs industry {:.2} ({:+.2})\n",
        b.assessment_id, b.assessment_name, b.overall_maturity, b.industry_average, b.vs_industry
    );
    for d in &b.dimensions {
        let _ = writeln!(out, "  {:<26} {:.2}  {:+.2}", d.dimension.title(), d.score, d.gap);
    }
    out
}

fn format_notifications(notifications: &[Notification]) -> String {
    if notifications.is_empty() {
        return "No notifications".to_string();
    }
    let mut out = String::new();
    for n in notifications {
        let read = if n.is_read { " " } else { "•" };
        let _ = writeln!(
            out,
            "{read} {}  {}: {}",
            n.created_at.format("%Y-%m-%d %H:%M"),
            n.title,
            n.message
        );
    }
    out
}
