use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::registry::{PendingDeleteOperation, PendingDeleteRegistry};
use crate::error::{EngineError, EngineResult};
use crate::handlers::{DeleteExecutor, DeletePreview};

/// Upper bound on sample records carried in a preview.
pub const MAX_PREVIEW_SAMPLES: usize = 5;

/// Outcome of proposing a delete.
#[derive(Debug, Clone)]
pub enum ProposeOutcome {
    /// Matching records exist; a pending operation was stored and the user
    /// must confirm or cancel it.
    ConfirmRequired {
        confirmation_id: String,
        preview: DeletePreview,
    },
    /// Nothing matched, so there is nothing to review and no pending
    /// record was created.
    NothingMatched { message: String },
}

/// Outcome of resolving a pending delete.
#[derive(Debug, Clone)]
pub enum ConfirmOutcome {
    Executed { rows_deleted: u64, sql: String },
    Cancelled,
}

/// One entry of `list_pending`.
#[derive(Debug, Clone)]
pub struct PendingSummary {
    pub confirmation_id: String,
    pub original_query: String,
    pub preview_message: String,
    pub created_at: DateTime<Utc>,
}

/// The confirmation state machine guarding destructive operations.
///
/// Every pending operation moves created -> confirmed | cancelled, and a
/// terminal record is removed from the registry rather than retained. The
/// record is taken out of the registry before execution, so two concurrent
/// confirms on the same id can never both execute.
pub struct DeleteWorkflow {
    executor: Option<Arc<dyn DeleteExecutor>>,
    registry: Arc<PendingDeleteRegistry>,
}

impl DeleteWorkflow {
    pub fn new(
        executor: Option<Arc<dyn DeleteExecutor>>,
        registry: Arc<PendingDeleteRegistry>,
    ) -> Self {
        Self { executor, registry }
    }

    /// Whether a delete-execution collaborator was provided at
    /// construction time.
    pub fn has_capability(&self) -> bool {
        self.executor.is_some()
    }

    /// Classify the delete target, build a preview, and store a pending
    /// operation for review. Zero matching records short-circuits to a
    /// no-op instead of asking the user to review nothing.
    pub async fn propose(&self, user_id: i64, query: &str) -> EngineResult<ProposeOutcome> {
        let executor = self.require_executor()?;
        let mut preview = executor.preview_delete(query, user_id).await?;

        if preview.match_count == 0 {
            return Ok(ProposeOutcome::NothingMatched {
                message: "No matching records found. Nothing was deleted.".to_string(),
            });
        }

        preview.samples.truncate(MAX_PREVIEW_SAMPLES);
        let operation = PendingDeleteOperation::new(user_id, query, preview.clone());
        let confirmation_id = operation.confirmation_id.clone();
        self.registry.insert(operation)?;

        tracing::info!(
            user_id,
            confirmation_id = %confirmation_id,
            match_count = preview.match_count,
            "stored pending delete operation"
        );

        Ok(ProposeOutcome::ConfirmRequired {
            confirmation_id,
            preview,
        })
    }

    /// Resolve a pending operation. Approval executes the delete through
    /// the collaborator; refusal discards the record without execution.
    /// Either way the record leaves the registry.
    pub async fn confirm(
        &self,
        user_id: i64,
        confirmation_id: &str,
        approve: bool,
    ) -> EngineResult<ConfirmOutcome> {
        // Removing first makes the transition exclusive: a concurrent
        // confirm on the same id observes the record already gone.
        let operation = self.registry.take(user_id, confirmation_id)?;

        if !approve {
            tracing::info!(user_id, confirmation_id, "pending delete cancelled");
            return Ok(ConfirmOutcome::Cancelled);
        }

        let executor = self.require_executor()?;
        let execution = executor
            .execute_delete(&operation.original_query, user_id)
            .await?;

        tracing::info!(
            user_id,
            confirmation_id,
            rows_deleted = execution.rows_deleted,
            "confirmed delete executed"
        );

        Ok(ConfirmOutcome::Executed {
            rows_deleted: execution.rows_deleted,
            sql: execution.sql,
        })
    }

    /// The most-recently-created pending id for a user, used to resolve a
    /// bare "yes"/"no" reply.
    ///
    /// Known UX limitation, preserved deliberately: when several pending
    /// deletes are outstanding, a bare reply always targets the last one
    /// created, with no disambiguation.
    pub fn latest_confirmation_id(&self, user_id: i64) -> EngineResult<Option<String>> {
        self.registry.latest_id(user_id)
    }

    /// All pending operations owned by the user, most recent last.
    pub fn list_pending(&self, user_id: i64) -> EngineResult<Vec<PendingSummary>> {
        let pending = self.registry.list(user_id)?;
        Ok(pending
            .into_iter()
            .map(|op| PendingSummary {
                confirmation_id: op.confirmation_id,
                original_query: op.original_query,
                preview_message: op.preview.message,
                created_at: op.created_at,
            })
            .collect())
    }

    /// Cancel every pending operation owned by the user; returns how many
    /// were cancelled. Nothing is executed.
    pub fn cancel_all(&self, user_id: i64) -> EngineResult<usize> {
        let drained = self.registry.drain(user_id)?;
        if !drained.is_empty() {
            tracing::info!(user_id, count = drained.len(), "cancelled all pending deletes");
        }
        Ok(drained.len())
    }

    fn require_executor(&self) -> EngineResult<&Arc<dyn DeleteExecutor>> {
        self.executor.as_ref().ok_or_else(|| {
            EngineError::CapabilityUnavailable("delete execution".to_string())
        })
    }
}
