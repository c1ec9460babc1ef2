// solvereign-store-sqlite/src/plan.rs
// ============================================================================
// Module: Plan, Snapshot & Pin Stores
// Description: SQLite-backed PlanStore, SnapshotStore, and PinStore.
// Purpose: Implement C5's plan lifecycle persistence.
// Dependencies: rusqlite, solvereign-core
// ============================================================================

use rusqlite::OptionalExtension;
use rusqlite::params;
use solvereign_core::ForecastVersionId;
use solvereign_core::Pin;
use solvereign_core::PinId;
use solvereign_core::PinStore;
use solvereign_core::PlanId;
use solvereign_core::PlanState;
use solvereign_core::PlanStore;
use solvereign_core::PlanVersion;
use solvereign_core::SiteId;
use solvereign_core::Snapshot;
use solvereign_core::SnapshotId;
use solvereign_core::SnapshotStatus;
use solvereign_core::SnapshotStore;
use solvereign_core::StoreError;
use solvereign_core::TenantId;
use solvereign_core::Timestamp;
use solvereign_core::UserId;

use crate::codec::decode_hash;
use crate::codec::decode_json;
use crate::codec::encode_json;
use crate::codec::hash_columns;
use crate::config::map_sqlite_error;
use crate::store::SqliteStore;

// ============================================================================
// SECTION: PlanStore
// ============================================================================

impl PlanStore for SqliteStore {
    fn create(&self, plan: &PlanVersion) -> Result<(), StoreError> {
        let (input_algorithm, input_value) = plan.input_hash.as_ref().map(hash_columns).unzip();
        let (output_algorithm, output_value) = plan.output_hash.as_ref().map(hash_columns).unzip();
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        guard
            .execute(
                "INSERT INTO plan_versions (id, tenant_id, site_id, forecast_version_id, state, \
                 seed, input_hash_algorithm, input_hash_value, output_hash_algorithm, \
                 output_hash_value, block_count, warn_count, current_snapshot_id, publish_count, \
                 freeze_until, repair_source_snapshot_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5, \
                 ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                params![
                    plan.id.as_str(),
                    plan.tenant_id.as_str(),
                    plan.site_id.as_str(),
                    plan.forecast_version_id.as_str(),
                    plan_state_label(plan.state),
                    i64::try_from(plan.seed).unwrap_or(i64::MAX),
                    input_algorithm,
                    input_value,
                    output_algorithm,
                    output_value,
                    plan.block_count,
                    plan.warn_count,
                    plan.current_snapshot_id.as_ref().map(SnapshotId::as_str),
                    plan.publish_count,
                    plan.freeze_until.map(Timestamp::unix_seconds),
                    plan.repair_source_snapshot_id.as_ref().map(SnapshotId::as_str),
                    plan.created_at.unix_seconds(),
                ],
            )
            .map_err(map_sqlite_error)?;
        Ok(())
    }

    fn get(&self, tenant_id: &TenantId, id: &PlanId) -> Result<Option<PlanVersion>, StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let row = guard
            .query_row(
                "SELECT id, tenant_id, site_id, forecast_version_id, state, seed, \
                 input_hash_algorithm, input_hash_value, output_hash_algorithm, output_hash_value, \
                 block_count, warn_count, current_snapshot_id, publish_count, freeze_until, \
                 repair_source_snapshot_id, created_at FROM plan_versions WHERE tenant_id = ?1 AND \
                 id = ?2",
                params![tenant_id.as_str(), id.as_str()],
                map_plan_row,
            )
            .optional()
            .map_err(map_sqlite_error)?;
        row.map(decode_plan).transpose().map_err(StoreError::from)
    }

    fn update(&self, plan: &PlanVersion) -> Result<(), StoreError> {
        let (input_algorithm, input_value) = plan.input_hash.as_ref().map(hash_columns).unzip();
        let (output_algorithm, output_value) = plan.output_hash.as_ref().map(hash_columns).unzip();
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let updated = guard
            .execute(
                "UPDATE plan_versions SET site_id = ?1, forecast_version_id = ?2, state = ?3, \
                 seed = ?4, input_hash_algorithm = ?5, input_hash_value = ?6, output_hash_algorithm \
                 = ?7, output_hash_value = ?8, block_count = ?9, warn_count = ?10, \
                 current_snapshot_id = ?11, publish_count = ?12, freeze_until = ?13, \
                 repair_source_snapshot_id = ?14 WHERE tenant_id = ?15 AND id = ?16",
                params![
                    plan.site_id.as_str(),
                    plan.forecast_version_id.as_str(),
                    plan_state_label(plan.state),
                    i64::try_from(plan.seed).unwrap_or(i64::MAX),
                    input_algorithm,
                    input_value,
                    output_algorithm,
                    output_value,
                    plan.block_count,
                    plan.warn_count,
                    plan.current_snapshot_id.as_ref().map(SnapshotId::as_str),
                    plan.publish_count,
                    plan.freeze_until.map(Timestamp::unix_seconds),
                    plan.repair_source_snapshot_id.as_ref().map(SnapshotId::as_str),
                    plan.tenant_id.as_str(),
                    plan.id.as_str(),
                ],
            )
            .map_err(map_sqlite_error)?;
        if updated == 0 {
            return Err(StoreError::Backend(format!("unknown plan version: {}", plan.id.as_str())));
        }
        Ok(())
    }

    fn list_for_tenant(&self, tenant_id: &TenantId) -> Result<Vec<PlanVersion>, StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let mut stmt = guard
            .prepare(
                "SELECT id, tenant_id, site_id, forecast_version_id, state, seed, \
                 input_hash_algorithm, input_hash_value, output_hash_algorithm, output_hash_value, \
                 block_count, warn_count, current_snapshot_id, publish_count, freeze_until, \
                 repair_source_snapshot_id, created_at FROM plan_versions WHERE tenant_id = ?1 \
                 ORDER BY created_at DESC",
            )
            .map_err(map_sqlite_error)?;
        let rows = stmt.query_map(params![tenant_id.as_str()], map_plan_row).map_err(map_sqlite_error)?;
        let mut plans = Vec::new();
        for row in rows {
            plans.push(decode_plan(row.map_err(map_sqlite_error)?).map_err(StoreError::from)?);
        }
        Ok(plans)
    }

    fn exists_for_other_tenant(&self, tenant_id: &TenantId, id: &PlanId) -> Result<bool, StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let found: Option<i64> = guard
            .query_row(
                "SELECT 1 FROM plan_versions WHERE id = ?1 AND tenant_id != ?2 LIMIT 1",
                params![id.as_str(), tenant_id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(map_sqlite_error)?;
        Ok(found.is_some())
    }
}

const fn plan_state_label(state: PlanState) -> &'static str {
    match state {
        PlanState::Draft => "DRAFT",
        PlanState::Solving => "SOLVING",
        PlanState::Solved => "SOLVED",
        PlanState::Failed => "FAILED",
        PlanState::Published => "PUBLISHED",
        PlanState::Locked => "LOCKED",
    }
}

fn parse_plan_state(label: &str) -> Result<PlanState, crate::config::SqliteStoreError> {
    match label {
        "DRAFT" => Ok(PlanState::Draft),
        "SOLVING" => Ok(PlanState::Solving),
        "SOLVED" => Ok(PlanState::Solved),
        "FAILED" => Ok(PlanState::Failed),
        "PUBLISHED" => Ok(PlanState::Published),
        "LOCKED" => Ok(PlanState::Locked),
        other => Err(crate::config::SqliteStoreError::Corrupt(format!("unknown plan state: {other}"))),
    }
}

struct PlanRow {
    id: String,
    tenant_id: String,
    site_id: String,
    forecast_version_id: String,
    state: String,
    seed: i64,
    input_hash_algorithm: Option<String>,
    input_hash_value: Option<String>,
    output_hash_algorithm: Option<String>,
    output_hash_value: Option<String>,
    block_count: u32,
    warn_count: u32,
    current_snapshot_id: Option<String>,
    publish_count: u32,
    freeze_until: Option<i64>,
    repair_source_snapshot_id: Option<String>,
    created_at: i64,
}

fn map_plan_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PlanRow> {
    Ok(PlanRow {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        site_id: row.get(2)?,
        forecast_version_id: row.get(3)?,
        state: row.get(4)?,
        seed: row.get(5)?,
        input_hash_algorithm: row.get(6)?,
        input_hash_value: row.get(7)?,
        output_hash_algorithm: row.get(8)?,
        output_hash_value: row.get(9)?,
        block_count: row.get(10)?,
        warn_count: row.get(11)?,
        current_snapshot_id: row.get(12)?,
        publish_count: row.get(13)?,
        freeze_until: row.get(14)?,
        repair_source_snapshot_id: row.get(15)?,
        created_at: row.get(16)?,
    })
}

fn decode_plan(row: PlanRow) -> Result<PlanVersion, crate::config::SqliteStoreError> {
    let input_hash = match (row.input_hash_algorithm, row.input_hash_value) {
        (Some(algorithm), Some(value)) => Some(decode_hash(&algorithm, &value)?),
        _ => None,
    };
    let output_hash = match (row.output_hash_algorithm, row.output_hash_value) {
        (Some(algorithm), Some(value)) => Some(decode_hash(&algorithm, &value)?),
        _ => None,
    };
    Ok(PlanVersion {
        id: PlanId::new(row.id),
        tenant_id: TenantId::new(row.tenant_id),
        site_id: SiteId::new(row.site_id),
        forecast_version_id: ForecastVersionId::new(row.forecast_version_id),
        state: parse_plan_state(&row.state)?,
        seed: u64::try_from(row.seed).unwrap_or_default(),
        input_hash,
        output_hash,
        block_count: row.block_count,
        warn_count: row.warn_count,
        current_snapshot_id: row.current_snapshot_id.map(SnapshotId::new),
        publish_count: row.publish_count,
        freeze_until: row.freeze_until.map(Timestamp::from_unix_seconds),
        repair_source_snapshot_id: row.repair_source_snapshot_id.map(SnapshotId::new),
        created_at: Timestamp::from_unix_seconds(row.created_at),
    })
}

// ============================================================================
// SECTION: SnapshotStore
// ============================================================================

impl SnapshotStore for SqliteStore {
    fn create(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let (input_algorithm, input_value) = hash_columns(&snapshot.input_hash);
        let (matrix_algorithm, matrix_value) = hash_columns(&snapshot.matrix_hash);
        let (output_algorithm, output_value) = hash_columns(&snapshot.output_hash);
        let (evidence_algorithm, evidence_value) = hash_columns(&snapshot.evidence_hash);
        let assignments_json = encode_json(&snapshot.assignments_snapshot).map_err(StoreError::from)?;
        let audit_results_json = encode_json(&snapshot.audit_results_snapshot).map_err(StoreError::from)?;
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        guard
            .execute(
                "INSERT INTO snapshots (id, plan_version_id, tenant_id, version_number, \
                 published_at, published_by, publish_reason, freeze_until, input_hash_algorithm, \
                 input_hash_value, matrix_hash_algorithm, matrix_hash_value, output_hash_algorithm, \
                 output_hash_value, evidence_hash_algorithm, evidence_hash_value, \
                 assignments_snapshot, audit_results_snapshot, snapshot_status) VALUES (?1, ?2, ?3, \
                 ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
                params![
                    snapshot.id.as_str(),
                    snapshot.plan_version_id.as_str(),
                    snapshot.tenant_id.as_str(),
                    snapshot.version_number,
                    snapshot.published_at.unix_seconds(),
                    snapshot.published_by.as_str(),
                    snapshot.publish_reason,
                    snapshot.freeze_until.unix_seconds(),
                    input_algorithm,
                    input_value,
                    matrix_algorithm,
                    matrix_value,
                    output_algorithm,
                    output_value,
                    evidence_algorithm,
                    evidence_value,
                    assignments_json,
                    audit_results_json,
                    snapshot_status_label(snapshot.snapshot_status),
                ],
            )
            .map_err(map_sqlite_error)?;
        Ok(())
    }

    fn get(&self, tenant_id: &TenantId, id: &SnapshotId) -> Result<Option<Snapshot>, StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let row = guard
            .query_row(
                &format!("{SNAPSHOT_SELECT} WHERE tenant_id = ?1 AND id = ?2"),
                params![tenant_id.as_str(), id.as_str()],
                map_snapshot_row,
            )
            .optional()
            .map_err(map_sqlite_error)?;
        row.map(decode_snapshot).transpose().map_err(StoreError::from)
    }

    fn list_for_plan(&self, tenant_id: &TenantId, plan_version_id: &PlanId) -> Result<Vec<Snapshot>, StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let mut stmt = guard
            .prepare(&format!("{SNAPSHOT_SELECT} WHERE tenant_id = ?1 AND plan_version_id = ?2 ORDER BY version_number"))
            .map_err(map_sqlite_error)?;
        let rows =
            stmt.query_map(params![tenant_id.as_str(), plan_version_id.as_str()], map_snapshot_row).map_err(map_sqlite_error)?;
        let mut snapshots = Vec::new();
        for row in rows {
            snapshots.push(decode_snapshot(row.map_err(map_sqlite_error)?).map_err(StoreError::from)?);
        }
        Ok(snapshots)
    }

    fn update_status(&self, tenant_id: &TenantId, id: &SnapshotId, status: SnapshotStatus) -> Result<(), StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let updated = guard
            .execute(
                "UPDATE snapshots SET snapshot_status = ?1 WHERE tenant_id = ?2 AND id = ?3",
                params![snapshot_status_label(status), tenant_id.as_str(), id.as_str()],
            )
            .map_err(map_sqlite_error)?;
        if updated == 0 {
            return Err(StoreError::Backend(format!("unknown snapshot: {}", id.as_str())));
        }
        Ok(())
    }
}

const SNAPSHOT_SELECT: &str = "SELECT id, plan_version_id, tenant_id, version_number, published_at, published_by, \
     publish_reason, freeze_until, input_hash_algorithm, input_hash_value, matrix_hash_algorithm, \
     matrix_hash_value, output_hash_algorithm, output_hash_value, evidence_hash_algorithm, \
     evidence_hash_value, assignments_snapshot, audit_results_snapshot, snapshot_status FROM snapshots";

const fn snapshot_status_label(status: SnapshotStatus) -> &'static str {
    match status {
        SnapshotStatus::Active => "ACTIVE",
        SnapshotStatus::Superseded => "SUPERSEDED",
        SnapshotStatus::Archived => "ARCHIVED",
    }
}

fn parse_snapshot_status(label: &str) -> Result<SnapshotStatus, crate::config::SqliteStoreError> {
    match label {
        "ACTIVE" => Ok(SnapshotStatus::Active),
        "SUPERSEDED" => Ok(SnapshotStatus::Superseded),
        "ARCHIVED" => Ok(SnapshotStatus::Archived),
        other => Err(crate::config::SqliteStoreError::Corrupt(format!("unknown snapshot status: {other}"))),
    }
}

struct SnapshotRow {
    id: String,
    plan_version_id: String,
    tenant_id: String,
    version_number: u32,
    published_at: i64,
    published_by: String,
    publish_reason: String,
    freeze_until: i64,
    input_hash_algorithm: String,
    input_hash_value: String,
    matrix_hash_algorithm: String,
    matrix_hash_value: String,
    output_hash_algorithm: String,
    output_hash_value: String,
    evidence_hash_algorithm: String,
    evidence_hash_value: String,
    assignments_snapshot: String,
    audit_results_snapshot: String,
    snapshot_status: String,
}

fn map_snapshot_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SnapshotRow> {
    Ok(SnapshotRow {
        id: row.get(0)?,
        plan_version_id: row.get(1)?,
        tenant_id: row.get(2)?,
        version_number: row.get(3)?,
        published_at: row.get(4)?,
        published_by: row.get(5)?,
        publish_reason: row.get(6)?,
        freeze_until: row.get(7)?,
        input_hash_algorithm: row.get(8)?,
        input_hash_value: row.get(9)?,
        matrix_hash_algorithm: row.get(10)?,
        matrix_hash_value: row.get(11)?,
        output_hash_algorithm: row.get(12)?,
        output_hash_value: row.get(13)?,
        evidence_hash_algorithm: row.get(14)?,
        evidence_hash_value: row.get(15)?,
        assignments_snapshot: row.get(16)?,
        audit_results_snapshot: row.get(17)?,
        snapshot_status: row.get(18)?,
    })
}

fn decode_snapshot(row: SnapshotRow) -> Result<Snapshot, crate::config::SqliteStoreError> {
    Ok(Snapshot {
        id: SnapshotId::new(row.id),
        plan_version_id: PlanId::new(row.plan_version_id),
        tenant_id: TenantId::new(row.tenant_id),
        version_number: row.version_number,
        published_at: Timestamp::from_unix_seconds(row.published_at),
        published_by: UserId::new(row.published_by),
        publish_reason: row.publish_reason,
        freeze_until: Timestamp::from_unix_seconds(row.freeze_until),
        input_hash: decode_hash(&row.input_hash_algorithm, &row.input_hash_value)?,
        matrix_hash: decode_hash(&row.matrix_hash_algorithm, &row.matrix_hash_value)?,
        output_hash: decode_hash(&row.output_hash_algorithm, &row.output_hash_value)?,
        evidence_hash: decode_hash(&row.evidence_hash_algorithm, &row.evidence_hash_value)?,
        assignments_snapshot: decode_json(&row.assignments_snapshot)?,
        audit_results_snapshot: decode_json(&row.audit_results_snapshot)?,
        snapshot_status: parse_snapshot_status(&row.snapshot_status)?,
    })
}

// ============================================================================
// SECTION: PinStore
// ============================================================================

impl PinStore for SqliteStore {
    fn create(&self, pin: &Pin) -> Result<(), StoreError> {
        let payload_json = encode_json(&pin.payload).map_err(StoreError::from)?;
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        guard
            .execute(
                "INSERT INTO pins (id, plan_version_id, tenant_id, pin_key, payload, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    pin.id.as_str(),
                    pin.plan_version_id.as_str(),
                    pin.tenant_id.as_str(),
                    pin.pin_key,
                    payload_json,
                    pin.created_at.unix_seconds(),
                ],
            )
            .map_err(map_sqlite_error)?;
        Ok(())
    }

    fn list_for_plan(&self, tenant_id: &TenantId, plan_version_id: &PlanId) -> Result<Vec<Pin>, StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let mut stmt = guard
            .prepare(
                "SELECT id, plan_version_id, tenant_id, pin_key, payload, created_at FROM pins \
                 WHERE tenant_id = ?1 AND plan_version_id = ?2 ORDER BY created_at",
            )
            .map_err(map_sqlite_error)?;
        let rows =
            stmt.query_map(params![tenant_id.as_str(), plan_version_id.as_str()], map_pin_row).map_err(map_sqlite_error)?;
        let mut pins = Vec::new();
        for row in rows {
            pins.push(decode_pin(row.map_err(map_sqlite_error)?).map_err(StoreError::from)?);
        }
        Ok(pins)
    }

    fn delete(&self, tenant_id: &TenantId, id: &PinId) -> Result<(), StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        let deleted = guard
            .execute("DELETE FROM pins WHERE tenant_id = ?1 AND id = ?2", params![tenant_id.as_str(), id.as_str()])
            .map_err(map_sqlite_error)?;
        if deleted == 0 {
            return Err(StoreError::Backend(format!("unknown pin: {}", id.as_str())));
        }
        Ok(())
    }
}

struct PinRow {
    id: String,
    plan_version_id: String,
    tenant_id: String,
    pin_key: String,
    payload: String,
    created_at: i64,
}

fn map_pin_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PinRow> {
    Ok(PinRow {
        id: row.get(0)?,
        plan_version_id: row.get(1)?,
        tenant_id: row.get(2)?,
        pin_key: row.get(3)?,
        payload: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn decode_pin(row: PinRow) -> Result<Pin, crate::config::SqliteStoreError> {
    Ok(Pin {
        id: PinId::new(row.id),
        plan_version_id: PlanId::new(row.plan_version_id),
        tenant_id: TenantId::new(row.tenant_id),
        pin_key: row.pin_key,
        payload: decode_json(&row.payload)?,
        created_at: Timestamp::from_unix_seconds(row.created_at),
    })
}
