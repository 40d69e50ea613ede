//! Pending-delete registry and the confirmation state machine. The only
//! mutable state in the engine lives here.

pub mod registry;
pub mod workflow;

pub use registry::{PendingDeleteOperation, PendingDeleteRegistry, MAX_PENDING_PER_USER};
pub use workflow::{
    ConfirmOutcome, DeleteWorkflow, PendingSummary, ProposeOutcome, MAX_PREVIEW_SAMPLES,
};
