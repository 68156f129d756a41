//! Student risk handlers

use axum::{extract::State, Json};

use crate::{AppState, AppResult};
use crate::models::{assess_all, RiskAssessment};

/// List every student with their predicted academic risk.
///
/// Stage 1 uses the rule-based heuristic in [`crate::models::classify`].
pub async fn risk_assessment(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<RiskAssessment>>> {
    let source = state.source.clone();

    // Sources may hit the filesystem
    let students = tokio::task::spawn_blocking(move || source.students()).await??;

    let assessments = assess_all(&students);
    tracing::debug!("Assessed {} students", assessments.len());

    Ok(Json(assessments))
}
