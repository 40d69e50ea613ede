use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::handlers::DeletePreview;

/// Retention bound per user. Inserting past the cap evicts the oldest
/// pending record so the registry cannot grow without bound.
pub const MAX_PENDING_PER_USER: usize = 8;

/// A proposed, not-yet-executed deletion awaiting explicit confirmation.
///
/// Lifecycle: created, then exactly one of confirmed or cancelled, at which
/// point the record leaves the registry. Owned exclusively by `user_id`.
#[derive(Debug, Clone)]
pub struct PendingDeleteOperation {
    pub confirmation_id: String,
    pub user_id: i64,
    pub original_query: String,
    pub preview: DeletePreview,
    pub created_at: DateTime<Utc>,
}

impl PendingDeleteOperation {
    pub fn new(user_id: i64, original_query: &str, preview: DeletePreview) -> Self {
        Self {
            confirmation_id: Uuid::new_v4().to_string(),
            user_id,
            original_query: original_query.to_string(),
            preview,
            created_at: Utc::now(),
        }
    }
}

/// Registry of pending delete operations, partitioned by user id.
///
/// All mutations for a user happen under one lock, so a `confirm` racing a
/// `list` or another `confirm` observes either the pending record or its
/// absence, never a half-transitioned state. The lock is never held across
/// an await.
pub struct PendingDeleteRegistry {
    inner: Mutex<HashMap<i64, Vec<PendingDeleteOperation>>>,
}

impl PendingDeleteRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Store a freshly created record, evicting the user's oldest pending
    /// record when over the cap.
    pub fn insert(&self, operation: PendingDeleteOperation) -> EngineResult<()> {
        let mut inner = self.lock()?;
        let partition = inner.entry(operation.user_id).or_default();
        partition.push(operation);
        if partition.len() > MAX_PENDING_PER_USER {
            let evicted = partition.remove(0);
            tracing::warn!(
                user_id = evicted.user_id,
                confirmation_id = %evicted.confirmation_id,
                "pending delete cap reached, evicting oldest record"
            );
        }
        Ok(())
    }

    /// Remove and return the record under `(user_id, confirmation_id)`.
    ///
    /// A confirmation id created by a different user never resolves here;
    /// this is an authorization boundary, not just a lookup.
    pub fn take(
        &self,
        user_id: i64,
        confirmation_id: &str,
    ) -> EngineResult<PendingDeleteOperation> {
        let mut inner = self.lock()?;
        let partition = inner
            .get_mut(&user_id)
            .ok_or_else(|| EngineError::UnknownConfirmation(confirmation_id.to_string()))?;
        let index = partition
            .iter()
            .position(|op| op.confirmation_id == confirmation_id)
            .ok_or_else(|| EngineError::UnknownConfirmation(confirmation_id.to_string()))?;
        let operation = partition.remove(index);
        if partition.is_empty() {
            inner.remove(&user_id);
        }
        Ok(operation)
    }

    /// The most-recently-created pending id for a user, if any.
    pub fn latest_id(&self, user_id: i64) -> EngineResult<Option<String>> {
        let inner = self.lock()?;
        Ok(inner
            .get(&user_id)
            .and_then(|partition| partition.last())
            .map(|op| op.confirmation_id.clone()))
    }

    /// All of a user's pending records in creation order (most recent last).
    pub fn list(&self, user_id: i64) -> EngineResult<Vec<PendingDeleteOperation>> {
        let inner = self.lock()?;
        Ok(inner.get(&user_id).cloned().unwrap_or_default())
    }

    /// Remove and return every pending record owned by a user.
    pub fn drain(&self, user_id: i64) -> EngineResult<Vec<PendingDeleteOperation>> {
        let mut inner = self.lock()?;
        Ok(inner.remove(&user_id).unwrap_or_default())
    }

    fn lock(
        &self,
    ) -> EngineResult<std::sync::MutexGuard<'_, HashMap<i64, Vec<PendingDeleteOperation>>>> {
        self.inner
            .lock()
            .map_err(|_| EngineError::Internal("pending delete registry lock poisoned".to_string()))
    }
}

impl Default for PendingDeleteRegistry {
    fn default() -> Self {
        Self::new()
    }
}
