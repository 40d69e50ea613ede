//! Hybrid intent classification: deterministic lexical patterns, a
//! model-based classifier, and the conflict-resolution policy between them.

pub mod model;
pub mod patterns;
pub mod resolver;
pub mod types;

pub use model::ModelClassifier;
pub use patterns::PatternMatcher;
pub use resolver::resolve;
pub use types::{ClassificationSignal, Intent, ResolvedIntent, SignalSource};
