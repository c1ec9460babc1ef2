// solvereign-server/src/router.rs
// ============================================================================
// Module: Router
// Description: Wires every REST route to its handler.
// Purpose: Builds the top-level `axum::Router` served by the binary.
// Dependencies: axum
// ============================================================================

use axum::Router;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;

use crate::handlers::approvals;
use crate::handlers::audit;
use crate::handlers::auth;
use crate::handlers::evidence;
use crate::handlers::health;
use crate::handlers::pins;
use crate::handlers::plans;
use crate::handlers::repairs;
use crate::handlers::snapshots;
use crate::state::AppState;

/// Builds the full REST router over `state`.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/plans", get(plans::list).post(plans::create))
        .route("/plans/{plan_id}", get(plans::get))
        .route("/plans/{plan_id}/solve", post(plans::solve))
        .route("/plans/{plan_id}/matrix", get(plans::matrix))
        .route("/plans/{plan_id}/violations", get(plans::violations))
        .route("/plans/{plan_id}/lock", post(snapshots::lock))
        .route("/plans/{plan_id}/pins", post(pins::create))
        .route("/plans/{plan_id}/pins/{pin_id}", delete(pins::delete))
        .route("/snapshots/publish", post(snapshots::publish))
        .route("/evidence/{snapshot_id}", get(evidence::get))
        .route("/repairs/sessions", post(repairs::create))
        .route("/repairs/sessions/{session_id}", get(repairs::get))
        .route("/repairs/sessions/{session_id}/apply", post(repairs::apply))
        .route("/repairs/sessions/{session_id}/undo", post(repairs::undo))
        .route("/repairs/sessions/{session_id}/abort", post(repairs::abort))
        .route("/audit", get(audit::list))
        .route("/approvals", post(approvals::create))
        .route("/approvals/{request_id}", get(approvals::get))
        .route("/approvals/{request_id}/decide", post(approvals::decide))
        .route("/approvals/{request_id}/override", post(approvals::override_decision))
        .with_state(state)
}
