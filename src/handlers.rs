//! Capability contracts for the downstream collaborators the engine routes
//! to. The engine owns none of the SQL generation or execution; it only
//! dispatches through these seams.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;

/// One affected record, as shown to the user in a delete preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSample {
    pub id: i64,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

/// Human-readable summary plus a bounded sample of the records a pending
/// delete would affect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletePreview {
    pub match_count: usize,
    pub message: String,
    pub samples: Vec<RecordSample>,
}

/// Result of executing a confirmed delete.
#[derive(Debug, Clone)]
pub struct DeleteExecution {
    pub rows_deleted: u64,
    pub sql: String,
}

/// Outcome of a create/update handler. Tagged variants so each status only
/// carries the fields valid for it.
#[derive(Debug, Clone)]
pub enum MutationOutcome {
    Complete {
        message: String,
        sql: Option<String>,
        natural_response: Option<String>,
    },
    Error {
        message: String,
    },
}

#[async_trait]
pub trait CreateHandler: Send + Sync {
    async fn process_create(
        &self,
        enhanced_text: &str,
        original_text: &str,
        user_id: i64,
    ) -> EngineResult<MutationOutcome>;
}

#[async_trait]
pub trait UpdateHandler: Send + Sync {
    async fn process_update(
        &self,
        enhanced_text: &str,
        original_text: &str,
        user_id: i64,
    ) -> EngineResult<MutationOutcome>;
}

/// Delete preview and execution. This capability may be absent entirely;
/// the router treats absence as a structured error, not a fault.
#[async_trait]
pub trait DeleteExecutor: Send + Sync {
    async fn preview_delete(&self, query: &str, user_id: i64) -> EngineResult<DeletePreview>;

    async fn execute_delete(&self, query: &str, user_id: i64) -> EngineResult<DeleteExecution>;
}

/// Natural-language-to-SQL query collaborator for VIEW intents. Returns
/// the answer text and the SQL it ran.
#[async_trait]
pub trait QueryRunner: Send + Sync {
    async fn run_query(&self, text: &str, user_id: i64) -> EngineResult<(String, String)>;
}
