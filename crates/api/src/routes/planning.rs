//! Paycheck planning routes.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post, put},
};
use chrono::NaiveDate;
use payplan_core::paycheck::PaycheckId;
use payplan_core::planning::{
    AllocationAction, AllocationInput, MutationOutcome, PlannedDebt, PlanningRepository,
    PlanningView, WarningType,
};
use payplan_shared::types::{AllocationId, BudgetAccountId, PlanningRecordId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::extract::{ValidJson, ValidPath, ValidQuery};
use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the planning routes.
pub fn routes<R: PlanningRepository + 'static>() -> Router<AppState<R>> {
    Router::new()
        .route(
            "/budget-accounts/{account_id}/planning",
            get(get_planning::<R>),
        )
        .route(
            "/budget-accounts/{account_id}/planning/hidden",
            get(get_hidden_planning::<R>),
        )
        .route(
            "/budget-accounts/{account_id}/planning/populate",
            post(populate_planning::<R>),
        )
        .route(
            "/budget-accounts/{account_id}/planning/records/{record_id}/active",
            put(set_planning_active::<R>),
        )
        .route(
            "/budget-accounts/{account_id}/planning/records/{record_id}/allocation",
            post(update_allocation::<R>),
        )
        .route(
            "/budget-accounts/{account_id}/planning/records/{record_id}/allocations/{allocation_id}/paid",
            post(mark_paid::<R>),
        )
        .route(
            "/budget-accounts/{account_id}/warnings/dismiss",
            post(dismiss_warning::<R>),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters selecting a planning window.
#[derive(Debug, Deserialize)]
pub struct PlanningQuery {
    /// Four-digit year.
    pub year: i32,
    /// Month, 1-12.
    pub month: u32,
    /// Extra months after the target; the configured default when omitted.
    #[serde(default)]
    pub lookahead_months: Option<u32>,
}

/// Request body for populating planning records.
#[derive(Debug, Deserialize)]
pub struct PopulateRequest {
    /// Four-digit year.
    pub year: i32,
    /// Month, 1-12.
    pub month: u32,
    /// Extra months after the target.
    #[serde(default)]
    pub lookahead_months: Option<u32>,
}

/// Request body for hiding or restoring a planning record.
#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    /// False hides the record.
    pub is_active: bool,
}

/// Request body for allocation changes.
#[derive(Debug, Deserialize)]
pub struct AllocationRequest {
    /// Target paycheck.
    pub paycheck_id: PaycheckId,
    /// What to do.
    pub action: AllocationAction,
    /// Amount override.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// Payment date override.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Note.
    #[serde(default)]
    pub note: Option<String>,
}

/// Request body for marking a payment paid.
#[derive(Debug, Default, Deserialize)]
pub struct MarkPaidRequest {
    /// Amount actually paid.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// Date actually paid.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Request body for dismissing a warning.
#[derive(Debug, Deserialize)]
pub struct DismissWarningRequest {
    /// Warning type.
    pub warning_type: WarningType,
    /// Warning key.
    pub warning_key: String,
}

/// Response for hidden planning records.
#[derive(Debug, Serialize)]
pub struct HiddenPlanningResponse {
    /// Hidden records in the window.
    pub debts: Vec<PlannedDebt>,
}

/// Response for mutations.
#[derive(Debug, Serialize)]
pub struct MutationResponse {
    /// Always true; failures are error responses.
    pub success: bool,
    /// False when the request was already satisfied.
    pub changed: bool,
}

impl From<MutationOutcome> for MutationResponse {
    fn from(outcome: MutationOutcome) -> Self {
        Self {
            success: true,
            changed: outcome.changed(),
        }
    }
}

/// Response for populating planning records.
#[derive(Debug, Serialize)]
pub struct PopulateResponse {
    /// Always true.
    pub success: bool,
    /// Records created.
    pub created: u64,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/budget-accounts/{account_id}/planning`
async fn get_planning<R: PlanningRepository + 'static>(
    State(state): State<AppState<R>>,
    auth: AuthUser,
    ValidPath(account_id): ValidPath<BudgetAccountId>,
    ValidQuery(query): ValidQuery<PlanningQuery>,
) -> ApiResult<Json<PlanningView>> {
    let view = state
        .planning
        .get_planning_data(
            auth.user_id(),
            account_id,
            query.year,
            query.month,
            query.lookahead_months,
        )
        .await?;
    Ok(Json(view))
}

/// GET `/budget-accounts/{account_id}/planning/hidden`
async fn get_hidden_planning<R: PlanningRepository + 'static>(
    State(state): State<AppState<R>>,
    auth: AuthUser,
    ValidPath(account_id): ValidPath<BudgetAccountId>,
    ValidQuery(query): ValidQuery<PlanningQuery>,
) -> ApiResult<Json<HiddenPlanningResponse>> {
    let debts = state
        .planning
        .get_hidden_planning_data(
            auth.user_id(),
            account_id,
            query.year,
            query.month,
            query.lookahead_months,
        )
        .await?;
    Ok(Json(HiddenPlanningResponse { debts }))
}

/// POST `/budget-accounts/{account_id}/planning/populate`
async fn populate_planning<R: PlanningRepository + 'static>(
    State(state): State<AppState<R>>,
    auth: AuthUser,
    ValidPath(account_id): ValidPath<BudgetAccountId>,
    ValidJson(body): ValidJson<PopulateRequest>,
) -> ApiResult<Json<PopulateResponse>> {
    let created = state
        .planning
        .populate(
            auth.user_id(),
            account_id,
            body.year,
            body.month,
            body.lookahead_months,
        )
        .await?;
    Ok(Json(PopulateResponse {
        success: true,
        created,
    }))
}

/// PUT `/budget-accounts/{account_id}/planning/records/{record_id}/active`
async fn set_planning_active<R: PlanningRepository + 'static>(
    State(state): State<AppState<R>>,
    auth: AuthUser,
    ValidPath((account_id, record_id)): ValidPath<(BudgetAccountId, PlanningRecordId)>,
    ValidJson(body): ValidJson<SetActiveRequest>,
) -> ApiResult<Json<MutationResponse>> {
    let outcome = state
        .planning
        .set_planning_active(auth.user_id(), account_id, record_id, body.is_active)
        .await?;
    Ok(Json(outcome.into()))
}

/// POST `/budget-accounts/{account_id}/planning/records/{record_id}/allocation`
async fn update_allocation<R: PlanningRepository + 'static>(
    State(state): State<AppState<R>>,
    auth: AuthUser,
    ValidPath((account_id, record_id)): ValidPath<(BudgetAccountId, PlanningRecordId)>,
    ValidJson(body): ValidJson<AllocationRequest>,
) -> ApiResult<Json<MutationResponse>> {
    let input = AllocationInput {
        paycheck_id: body.paycheck_id,
        amount: body.amount,
        date: body.date,
        note: body.note,
    };
    let outcome = state
        .planning
        .update_debt_allocation(auth.user_id(), account_id, record_id, body.action, input)
        .await?;
    Ok(Json(outcome.into()))
}

/// POST `/budget-accounts/{account_id}/planning/records/{record_id}/allocations/{allocation_id}/paid`
async fn mark_paid<R: PlanningRepository + 'static>(
    State(state): State<AppState<R>>,
    auth: AuthUser,
    ValidPath((account_id, record_id, allocation_id)): ValidPath<(
        BudgetAccountId,
        PlanningRecordId,
        AllocationId,
    )>,
    ValidJson(body): ValidJson<MarkPaidRequest>,
) -> ApiResult<Json<MutationResponse>> {
    let outcome = state
        .planning
        .mark_paid(
            auth.user_id(),
            account_id,
            record_id,
            allocation_id,
            body.amount,
            body.date,
        )
        .await?;
    Ok(Json(outcome.into()))
}

/// POST `/budget-accounts/{account_id}/warnings/dismiss`
async fn dismiss_warning<R: PlanningRepository + 'static>(
    State(state): State<AppState<R>>,
    auth: AuthUser,
    ValidPath(account_id): ValidPath<BudgetAccountId>,
    ValidJson(body): ValidJson<DismissWarningRequest>,
) -> ApiResult<Json<MutationResponse>> {
    let outcome = state
        .planning
        .dismiss_warning(
            auth.user_id(),
            account_id,
            body.warning_type,
            &body.warning_key,
        )
        .await?;
    Ok(Json(outcome.into()))
}

#[cfg(test)]
#[path = "planning_tests.rs"]
mod tests;
