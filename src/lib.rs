//! fintent: intent resolution and safe-mutation routing for a
//! personal-finance assistant. Free-form text goes in; one of four
//! structured database operations (CREATE, VIEW, UPDATE, DELETE) comes
//! out, with every DELETE gated behind an explicit confirmation step.

pub mod deletes;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod intent;
pub mod llm;
pub mod response;
pub mod routing;
pub mod session;

pub use crate::engine::Engine;
pub use crate::error::{EngineError, EngineResult};
pub use crate::intent::{Intent, ResolvedIntent};
pub use crate::response::{ResponseEnvelope, ResponseMetadata};
