//! History-based diagnostics: anomaly detection, maturity projection and
//! capacity/cost/workload insights.
//!
//! Everything here is read-only arithmetic over scores that were already
//! computed; nothing in this module touches storage.

pub mod anomaly;
pub mod insights;
pub mod trend;

pub use anomaly::{detect_anomalies, Anomaly, AnomalyKind, AnomalyScope};
pub use insights::{
    capacity_insights, cost_insights, predictive_insights, workload_insights, Insight,
    InsightKind, PredictiveInsights,
};
pub use trend::{
    organization_trend, project_maturity, MaturityProjection, TrendDirection, TrendPoint,
};
