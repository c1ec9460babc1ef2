// solvereign-store-sqlite/src/approval.rs
// ============================================================================
// Module: Approval Request Store
// Description: SQLite-backed ApprovalRequestStore.
// Purpose: Implement C8's dual-control approval persistence.
// Dependencies: rusqlite, solvereign-core
// ============================================================================

use rusqlite::OptionalExtension;
use rusqlite::params;
use solvereign_core::ApprovalDecision;
use solvereign_core::ApprovalRequest;
use solvereign_core::ApprovalRequestId;
use solvereign_core::ApprovalRequestStore;
use solvereign_core::ApprovalStatus;
use solvereign_core::RiskTier;
use solvereign_core::StoreError;
use solvereign_core::TenantId;
use solvereign_core::Timestamp;

use crate::codec::decode_json;
use crate::codec::encode_json;
use crate::config::map_sqlite_error;
use crate::store::SqliteStore;

impl ApprovalRequestStore for SqliteStore {
    fn create(&self, request: &ApprovalRequest) -> Result<(), StoreError> {
        let entity_json = encode_json(&request.entity).map_err(StoreError::from)?;
        let decisions_json = encode_json(&request.decisions).map_err(StoreError::from)?;
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        guard
            .execute(
                "INSERT INTO approval_requests (id, tenant_id, action, entity, risk_tier, \
                 required_approvals, decisions, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5, \
                 ?6, ?7, ?8, ?9)",
                params![
                    request.id.as_str(),
                    request.tenant_id.as_str(),
                    request.action,
                    entity_json,
                    risk_tier_label(request.risk_tier),
                    request.required_approvals,
                    decisions_json,
                    approval_status_label(request.status),
                    request.created_at.unix_seconds(),
                ],
            )
            .map_err(map_sqlite_error)?;
        Ok(())
    }

    fn get(&self, tenant_id: &TenantId, id: &ApprovalRequestId) -> Result<Option<ApprovalRequest>, StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let row = guard
            .query_row(
                &format!("{APPROVAL_SELECT} WHERE tenant_id = ?1 AND id = ?2"),
                params![tenant_id.as_str(), id.as_str()],
                map_approval_row,
            )
            .optional()
            .map_err(map_sqlite_error)?;
        row.map(decode_approval).transpose().map_err(StoreError::from)
    }

    fn update(&self, request: &ApprovalRequest) -> Result<(), StoreError> {
        let decisions_json = encode_json(&request.decisions).map_err(StoreError::from)?;
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let updated = guard
            .execute(
                "UPDATE approval_requests SET decisions = ?1, status = ?2 WHERE tenant_id = ?3 \
                 AND id = ?4",
                params![
                    decisions_json,
                    approval_status_label(request.status),
                    request.tenant_id.as_str(),
                    request.id.as_str(),
                ],
            )
            .map_err(map_sqlite_error)?;
        if updated == 0 {
            return Err(StoreError::Backend(format!("unknown approval request: {}", request.id.as_str())));
        }
        Ok(())
    }
}

const APPROVAL_SELECT: &str =
    "SELECT id, tenant_id, action, entity, risk_tier, required_approvals, decisions, status, created_at FROM approval_requests";

const fn risk_tier_label(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::Low => "LOW",
        RiskTier::Medium => "MEDIUM",
        RiskTier::High => "HIGH",
        RiskTier::Critical => "CRITICAL",
    }
}

fn parse_risk_tier(label: &str) -> Result<RiskTier, crate::config::SqliteStoreError> {
    match label {
        "LOW" => Ok(RiskTier::Low),
        "MEDIUM" => Ok(RiskTier::Medium),
        "HIGH" => Ok(RiskTier::High),
        "CRITICAL" => Ok(RiskTier::Critical),
        other => Err(crate::config::SqliteStoreError::Corrupt(format!("unknown risk tier: {other}"))),
    }
}

const fn approval_status_label(status: ApprovalStatus) -> &'static str {
    match status {
        ApprovalStatus::Pending => "PENDING",
        ApprovalStatus::Approved => "APPROVED",
        ApprovalStatus::Rejected => "REJECTED",
        ApprovalStatus::Overridden => "OVERRIDDEN",
    }
}

fn parse_approval_status(label: &str) -> Result<ApprovalStatus, crate::config::SqliteStoreError> {
    match label {
        "PENDING" => Ok(ApprovalStatus::Pending),
        "APPROVED" => Ok(ApprovalStatus::Approved),
        "REJECTED" => Ok(ApprovalStatus::Rejected),
        "OVERRIDDEN" => Ok(ApprovalStatus::Overridden),
        other => Err(crate::config::SqliteStoreError::Corrupt(format!("unknown approval status: {other}"))),
    }
}

struct ApprovalRow {
    id: String,
    tenant_id: String,
    action: String,
    entity: String,
    risk_tier: String,
    required_approvals: u8,
    decisions: String,
    status: String,
    created_at: i64,
}

fn map_approval_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ApprovalRow> {
    Ok(ApprovalRow {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        action: row.get(2)?,
        entity: row.get(3)?,
        risk_tier: row.get(4)?,
        required_approvals: row.get(5)?,
        decisions: row.get(6)?,
        status: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn decode_approval(row: ApprovalRow) -> Result<ApprovalRequest, crate::config::SqliteStoreError> {
    Ok(ApprovalRequest {
        id: ApprovalRequestId::new(row.id),
        tenant_id: TenantId::new(row.tenant_id),
        action: row.action,
        entity: decode_json(&row.entity)?,
        risk_tier: parse_risk_tier(&row.risk_tier)?,
        required_approvals: row.required_approvals,
        decisions: decode_json::<Vec<ApprovalDecision>>(&row.decisions)?,
        status: parse_approval_status(&row.status)?,
        created_at: Timestamp::from_unix_seconds(row.created_at),
    })
}
