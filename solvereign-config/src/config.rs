// solvereign-config/src/config.rs
// ============================================================================
// Module: Solvereign Configuration
// Description: Configuration loading and validation for Solvereign.
// Purpose: Provide strict, fail-closed config parsing layered defaults -> TOML -> env.
// Dependencies: solvereign-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration starts from built-in defaults, is overlaid by an optional
//! TOML file, and is finally overlaid by environment variables (the layer an
//! operator reaches for first in a container deployment). Any layer that
//! fails to parse, or a final value that fails [`SolvereignConfig::validate`],
//! fails the whole load closed rather than falling back to a looser default.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::policy::PolicyProfileConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "solvereign.toml";
/// Environment variable used to override the config file path.
pub(crate) const CONFIG_ENV_VAR: &str = "SOLVEREIGN_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;

/// `SESSION_TTL_SECONDS` default (8 hours).
pub(crate) const DEFAULT_SESSION_TTL_SECONDS: i64 = 28_800;
/// `REPAIR_SESSION_TTL_SECONDS` default (30 minutes).
pub(crate) const DEFAULT_REPAIR_SESSION_TTL_SECONDS: i64 = 1_800;
/// `FREEZE_DURATION_HOURS` default.
pub(crate) const DEFAULT_FREEZE_DURATION_HOURS: i64 = 12;
/// `PUBLISH_REASON_MIN_LEN` default.
pub(crate) const DEFAULT_PUBLISH_REASON_MIN_LEN: usize = 10;
/// `IDEMPOTENCY_TTL_SECONDS` default (1 hour).
pub(crate) const DEFAULT_IDEMPOTENCY_TTL_SECONDS: i64 = 3_600;
/// `KILL_SWITCH_CACHE_TTL_SECONDS` default.
pub(crate) const DEFAULT_KILL_SWITCH_CACHE_TTL_SECONDS: i64 = 5;
/// `AUTH_COOKIE_PROD_NAME` default.
pub(crate) const DEFAULT_AUTH_COOKIE_PROD_NAME: &str = "__Host-solvereign-session";
/// `AUTH_COOKIE_DEV_NAME` default.
pub(crate) const DEFAULT_AUTH_COOKIE_DEV_NAME: &str = "solvereign-session";
/// `SOLVEREIGN_DB_PATH` default.
pub(crate) const DEFAULT_DB_PATH: &str = "solvereign.sqlite3";
/// `SOLVEREIGN_BIND_ADDR` default.
pub(crate) const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
/// `SOLVEREIGN_SOLVER_MODE` default.
pub(crate) const DEFAULT_SOLVER_MODE: &str = "deterministic";
/// Default `SQLite` busy timeout in milliseconds.
pub(crate) const DEFAULT_STORE_BUSY_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Top-level Solvereign configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SolvereignConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Session configuration (TTL, cookie names).
    #[serde(default)]
    pub session: SessionConfig,
    /// Repair session configuration.
    #[serde(default)]
    pub repair: RepairConfig,
    /// Plan lifecycle configuration (freeze window, publish reason length).
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    /// Idempotency key retention configuration.
    #[serde(default)]
    pub idempotency: IdempotencyConfig,
    /// Kill-switch cache configuration.
    #[serde(default)]
    pub kill_switch: KillSwitchConfig,
    /// Storage (`SQLite`) configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Solver gateway configuration.
    #[serde(default)]
    pub solver: SolverConfig,
    /// Policy profile evaluated by the Audit & Publish Gate.
    #[serde(default)]
    pub policy: PolicyProfileConfig,
    /// Optional config source metadata (not serialized).
    #[serde(skip)]
    pub source_modified_at: Option<SystemTime>,
}

impl Default for SolvereignConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            session: SessionConfig::default(),
            repair: RepairConfig::default(),
            lifecycle: LifecycleConfig::default(),
            idempotency: IdempotencyConfig::default(),
            kill_switch: KillSwitchConfig::default(),
            storage: StorageConfig::default(),
            solver: SolverConfig::default(),
            policy: PolicyProfileConfig::default(),
            source_modified_at: None,
        }
    }
}

impl SolvereignConfig {
    /// Loads configuration using the default resolution rules: built-in
    /// defaults, overlaid by an optional TOML file, overlaid by environment
    /// variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading, parsing, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match resolve_path(path)? {
            Some(resolved) => {
                validate_path(&resolved)?;
                let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
                if bytes.len() > MAX_CONFIG_FILE_SIZE {
                    return Err(ConfigError::Invalid(
                        "config file exceeds size limit".to_string(),
                    ));
                }
                let content = std::str::from_utf8(&bytes)
                    .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
                let mut config: Self =
                    toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
                config.source_modified_at =
                    fs::metadata(&resolved).and_then(|meta| meta.modified()).ok();
                config
            }
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Overlays environment variable overrides onto an already-loaded config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an environment variable is present but
    /// cannot be parsed into its target type.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = parse_env("SESSION_TTL_SECONDS")? {
            self.session.ttl_seconds = value;
        }
        if let Ok(value) = env::var("AUTH_COOKIE_PROD_NAME") {
            self.session.cookie_prod_name = value;
        }
        if let Ok(value) = env::var("AUTH_COOKIE_DEV_NAME") {
            self.session.cookie_dev_name = value;
        }
        if let Some(value) = parse_env("REPAIR_SESSION_TTL_SECONDS")? {
            self.repair.ttl_seconds = value;
        }
        if let Some(value) = parse_env("FREEZE_DURATION_HOURS")? {
            self.lifecycle.freeze_duration_hours = value;
        }
        if let Some(value) = parse_env("PUBLISH_REASON_MIN_LEN")? {
            self.lifecycle.publish_reason_min_len = value;
        }
        if let Some(value) = parse_env("IDEMPOTENCY_TTL_SECONDS")? {
            self.idempotency.ttl_seconds = value;
        }
        if let Some(value) = parse_env("KILL_SWITCH_CACHE_TTL_SECONDS")? {
            self.kill_switch.cache_ttl_seconds = value;
        }
        if let Ok(value) = env::var("SOLVEREIGN_DB_PATH") {
            self.storage.path = PathBuf::from(value);
        }
        if let Ok(value) = env::var("SOLVEREIGN_BIND_ADDR") {
            self.server.bind = value;
        }
        if let Ok(value) = env::var("SOLVEREIGN_SOLVER_MODE") {
            self.solver.mode = match value.as_str() {
                "deterministic" => SolverMode::Deterministic,
                "http" => SolverMode::Http,
                other => {
                    return Err(ConfigError::Invalid(format!(
                        "SOLVEREIGN_SOLVER_MODE must be deterministic or http, got {other}"
                    )));
                }
            };
        }
        if let Ok(value) = env::var("SOLVEREIGN_SOLVER_URL") {
            self.solver.url = Some(value);
        }
        Ok(())
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.session.validate()?;
        self.repair.validate()?;
        self.lifecycle.validate()?;
        self.idempotency.validate()?;
        self.kill_switch.validate()?;
        self.storage.validate()?;
        self.solver.validate()?;
        self.policy.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }
}

/// HTTP server bind configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP listener.
    #[serde(default = "default_bind_addr")]
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Default publish/repair lock acquisition timeout, in milliseconds.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind_addr(),
            max_body_bytes: default_max_body_bytes(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl ServerConfig {
    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.max_body_bytes must be greater than zero".to_string(),
            ));
        }
        let _addr: SocketAddr = self
            .bind
            .parse()
            .map_err(|_| ConfigError::Invalid("server.bind must be a valid socket address".to_string()))?;
        if self.lock_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "server.lock_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in seconds.
    #[serde(default = "default_session_ttl_seconds")]
    pub ttl_seconds: i64,
    /// Cookie name used in production (`Secure`, `__Host-` prefixed).
    #[serde(default = "default_auth_cookie_prod_name")]
    pub cookie_prod_name: String,
    /// Cookie name used in local development.
    #[serde(default = "default_auth_cookie_dev_name")]
    pub cookie_dev_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_session_ttl_seconds(),
            cookie_prod_name: default_auth_cookie_prod_name(),
            cookie_dev_name: default_auth_cookie_dev_name(),
        }
    }
}

impl SessionConfig {
    /// Validates session configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl_seconds <= 0 {
            return Err(ConfigError::Invalid(
                "session.ttl_seconds must be greater than zero".to_string(),
            ));
        }
        if self.cookie_prod_name.trim().is_empty() || self.cookie_dev_name.trim().is_empty() {
            return Err(ConfigError::Invalid("session cookie names must be non-empty".to_string()));
        }
        Ok(())
    }
}

/// Repair session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RepairConfig {
    /// Repair session TTL in seconds before it lapses to `Expired`.
    #[serde(default = "default_repair_ttl_seconds")]
    pub ttl_seconds: i64,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_repair_ttl_seconds(),
        }
    }
}

impl RepairConfig {
    /// Validates repair session configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl_seconds <= 0 {
            return Err(ConfigError::Invalid(
                "repair.ttl_seconds must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Plan lifecycle configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LifecycleConfig {
    /// Hours a published snapshot stays frozen from repair before re-solve is required.
    #[serde(default = "default_freeze_duration_hours")]
    pub freeze_duration_hours: i64,
    /// Minimum length of a publish reason string.
    #[serde(default = "default_publish_reason_min_len")]
    pub publish_reason_min_len: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            freeze_duration_hours: default_freeze_duration_hours(),
            publish_reason_min_len: default_publish_reason_min_len(),
        }
    }
}

impl LifecycleConfig {
    /// Validates lifecycle configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.freeze_duration_hours <= 0 {
            return Err(ConfigError::Invalid(
                "lifecycle.freeze_duration_hours must be greater than zero".to_string(),
            ));
        }
        if self.publish_reason_min_len == 0 {
            return Err(ConfigError::Invalid(
                "lifecycle.publish_reason_min_len must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Idempotency key retention configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IdempotencyConfig {
    /// Idempotency record TTL in seconds.
    #[serde(default = "default_idempotency_ttl_seconds")]
    pub ttl_seconds: i64,
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_idempotency_ttl_seconds(),
        }
    }
}

impl IdempotencyConfig {
    /// Validates idempotency configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl_seconds <= 0 {
            return Err(ConfigError::Invalid(
                "idempotency.ttl_seconds must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Kill-switch cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct KillSwitchConfig {
    /// How long a kill-switch read is cached before re-checking the store.
    #[serde(default = "default_kill_switch_cache_ttl_seconds")]
    pub cache_ttl_seconds: i64,
}

impl Default for KillSwitchConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: default_kill_switch_cache_ttl_seconds(),
        }
    }
}

impl KillSwitchConfig {
    /// Validates kill-switch configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_ttl_seconds < 0 {
            return Err(ConfigError::Invalid(
                "kill_switch.cache_ttl_seconds must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// `SQLite` journal mode, mirroring the storage backend's pragma options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageJournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

/// `SQLite` sync mode, mirroring the storage backend's pragma options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

/// Storage (`SQLite`) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the `SQLite` database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_store_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: StorageJournalMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: StorageSyncMode,
    /// Retention: number of most recent snapshots kept per plan (older pruned).
    #[serde(default)]
    pub max_snapshot_versions: Option<u64>,
    /// Retention: days of audit log entries kept before pruning eligible rows.
    #[serde(default)]
    pub audit_retention_days: Option<u64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_store_busy_timeout_ms(),
            journal_mode: StorageJournalMode::default(),
            sync_mode: StorageSyncMode::default(),
            max_snapshot_versions: None,
            audit_retention_days: None,
        }
    }
}

impl StorageConfig {
    /// Validates storage configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let text = self.path.to_string_lossy();
        if text.trim().is_empty() {
            return Err(ConfigError::Invalid("storage.path must be non-empty".to_string()));
        }
        validate_path_string("storage.path", &text)?;
        if self.busy_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "storage.busy_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_snapshot_versions == Some(0) {
            return Err(ConfigError::Invalid(
                "storage.max_snapshot_versions must be greater than zero when set".to_string(),
            ));
        }
        if self.audit_retention_days == Some(0) {
            return Err(ConfigError::Invalid(
                "storage.audit_retention_days must be greater than zero when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Solver gateway mode selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SolverMode {
    /// In-process deterministic reference solver.
    #[default]
    Deterministic,
    /// HTTP-delegating solver adapter.
    Http,
}

/// Solver gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SolverConfig {
    /// Solver adapter selection.
    #[serde(default)]
    pub mode: SolverMode,
    /// Solver service base URL (required when `mode = "http"`).
    #[serde(default)]
    pub url: Option<String>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            mode: SolverMode::default(),
            url: None,
        }
    }
}

impl SolverConfig {
    /// Validates solver configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.mode {
            SolverMode::Deterministic => {
                if self.url.is_some() {
                    return Err(ConfigError::Invalid(
                        "solver.url only allowed when mode=http".to_string(),
                    ));
                }
            }
            SolverMode::Http => {
                let Some(url) = &self.url else {
                    return Err(ConfigError::Invalid(
                        "solver.mode=http requires solver.url".to_string(),
                    ));
                };
                if url.trim().is_empty() {
                    return Err(ConfigError::Invalid("solver.url must be non-empty".to_string()));
                }
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::Invalid(
                        "solver.url must include http:// or https://".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

pub(crate) const fn default_max_body_bytes() -> usize {
    1024 * 1024
}

pub(crate) const fn default_lock_timeout_ms() -> u64 {
    10_000
}

pub(crate) fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

pub(crate) const fn default_session_ttl_seconds() -> i64 {
    DEFAULT_SESSION_TTL_SECONDS
}

pub(crate) fn default_auth_cookie_prod_name() -> String {
    DEFAULT_AUTH_COOKIE_PROD_NAME.to_string()
}

pub(crate) fn default_auth_cookie_dev_name() -> String {
    DEFAULT_AUTH_COOKIE_DEV_NAME.to_string()
}

pub(crate) const fn default_repair_ttl_seconds() -> i64 {
    DEFAULT_REPAIR_SESSION_TTL_SECONDS
}

pub(crate) const fn default_freeze_duration_hours() -> i64 {
    DEFAULT_FREEZE_DURATION_HOURS
}

pub(crate) const fn default_publish_reason_min_len() -> usize {
    DEFAULT_PUBLISH_REASON_MIN_LEN
}

pub(crate) const fn default_idempotency_ttl_seconds() -> i64 {
    DEFAULT_IDEMPOTENCY_TTL_SECONDS
}

pub(crate) const fn default_kill_switch_cache_ttl_seconds() -> i64 {
    DEFAULT_KILL_SWITCH_CACHE_TTL_SECONDS
}

pub(crate) fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_PATH)
}

pub(crate) const fn default_store_busy_timeout_ms() -> u64 {
    DEFAULT_STORE_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves an optional config file path from the CLI argument or the
/// `SOLVEREIGN_CONFIG` environment variable. Returns `None` when no file is
/// configured, which is not itself an error: defaults plus env vars alone are
/// a valid configuration.
fn resolve_path(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = path {
        return Ok(Some(path.to_path_buf()));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(Some(PathBuf::from(env_path)));
    }
    let default_path = PathBuf::from(DEFAULT_CONFIG_NAME);
    if default_path.exists() {
        return Ok(Some(default_path));
    }
    Ok(None)
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
pub(crate) fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    let path = Path::new(trimmed);
    for component in path.components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Parses an environment variable into `T` when present.
///
/// # Errors
///
/// Returns [`ConfigError`] when the variable is set but does not parse.
fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("{name} is not a valid value"))),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => {
            Err(ConfigError::Invalid(format!("{name} is not valid unicode")))
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::SolvereignConfig;

    #[test]
    fn defaults_validate() {
        let mut config = SolvereignConfig::default();
        config.validate().unwrap();
        assert_eq!(config.session.ttl_seconds, 28_800);
        assert_eq!(config.storage.path.to_str().unwrap(), "solvereign.sqlite3");
    }

    #[test]
    fn http_solver_without_url_is_rejected() {
        let mut config = SolvereignConfig::default();
        config.solver.mode = super::SolverMode::Http;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_publish_reason_min_len_is_rejected() {
        let mut config = SolvereignConfig::default();
        config.lifecycle.publish_reason_min_len = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_bind_address_is_rejected() {
        let mut config = SolvereignConfig::default();
        config.server.bind = "not-an-address".to_string();
        assert!(config.validate().is_err());
    }
}
