use std::sync::Arc;

use uuid::Uuid;

use crate::deletes::{ConfirmOutcome, DeleteWorkflow, PendingDeleteRegistry, PendingSummary};
use crate::error::{EngineError, EngineResult};
use crate::handlers::{CreateHandler, DeleteExecutor, QueryRunner, UpdateHandler};
use crate::intent::{resolver, Intent, ModelClassifier, PatternMatcher, ResolvedIntent};
use crate::llm::TextCompletion;
use crate::response::{ResponseEnvelope, ResponseMetadata};
use crate::routing::{RouteOutcome, Router};
use crate::session::{ChatTurn, ConversationLog};

/// Confidence reported when a strong lexical pattern routes a CREATE
/// directly, skipping the model round trip.
const DIRECT_CREATE_CONFIDENCE: f64 = 0.9;

/// A confirmation-style reply recognized before classification runs.
enum ConfirmationReply {
    Explicit { confirmation_id: String, approve: bool },
    Bare { approve: bool },
}

/// Primary facade for the fintent engine.
///
/// `handle_message` is the single entry point: it classifies, resolves,
/// routes, and formats, and converts every internal fault into the failure
/// envelope. Nothing escapes it as a raw error.
pub struct Engine {
    patterns: PatternMatcher,
    model: ModelClassifier,
    router: Router,
    sessions: ConversationLog,
}

impl Engine {
    pub fn new(
        completion: Arc<dyn TextCompletion>,
        create: Arc<dyn CreateHandler>,
        update: Arc<dyn UpdateHandler>,
        query: Arc<dyn QueryRunner>,
        delete_executor: Option<Arc<dyn DeleteExecutor>>,
    ) -> Self {
        let registry = Arc::new(PendingDeleteRegistry::new());
        let deletes = Arc::new(DeleteWorkflow::new(delete_executor, registry));
        Self {
            patterns: PatternMatcher::new(),
            model: ModelClassifier::new(completion),
            router: Router::new(create, update, query, deletes),
            sessions: ConversationLog::new(),
        }
    }

    /// Process one user message and return the uniform envelope.
    pub async fn handle_message(
        &self,
        user_id: i64,
        text: &str,
        session_id: Option<&str>,
    ) -> ResponseEnvelope {
        let envelope = match self.process(user_id, text).await {
            Ok(envelope) => envelope,
            Err(error) => {
                tracing::error!(user_id, "message processing failed: {error}");
                ResponseEnvelope::failure(error.to_string())
            }
        };

        if let Some(session_id) = session_id {
            if let Err(error) =
                self.sessions
                    .record(user_id, session_id, text, envelope.response_text())
            {
                tracing::warn!(user_id, session_id, "failed to record transcript: {error}");
            }
        }

        envelope
    }

    /// Pending deletes owned by a user, for a calling layer that wants to
    /// surface them.
    pub fn list_pending_deletes(&self, user_id: i64) -> EngineResult<Vec<PendingSummary>> {
        self.router.deletes().list_pending(user_id)
    }

    /// Cancel every pending delete owned by a user; returns the count.
    pub fn cancel_all_pending_deletes(&self, user_id: i64) -> EngineResult<usize> {
        self.router.deletes().cancel_all(user_id)
    }

    /// Transcript for one `(user, session)` pair.
    pub fn history(&self, user_id: i64, session_id: &str) -> EngineResult<Vec<ChatTurn>> {
        self.sessions.history(user_id, session_id)
    }

    async fn process(&self, user_id: i64, text: &str) -> EngineResult<ResponseEnvelope> {
        let text = text.trim();
        if text.is_empty() {
            return Err(EngineError::InvalidInput("empty message".to_string()));
        }

        // Confirmation replies resolve a pending delete before any
        // classification runs.
        if let Some(reply) = self.parse_confirmation_reply(user_id, text)? {
            return self.handle_confirmation(user_id, text, reply).await;
        }

        // Strong spending/income statements route straight to CREATE; the
        // model round trip is skipped.
        if self.patterns.is_record_statement(text) {
            tracing::info!(user_id, "spending/income pattern detected, routing as CREATE");
            let resolved = ResolvedIntent::new(Intent::Create, DIRECT_CREATE_CONFIDENCE);
            let outcome = self.router.dispatch(resolved.intent, user_id, text).await?;
            return Ok(self.build_envelope(text, resolved, outcome));
        }

        let model_signal = self.model.classify(text).await;
        let pattern_intent = self.patterns.classify(text);
        let resolved = resolver::resolve(&model_signal, pattern_intent);

        tracing::info!(
            user_id,
            model_intent = %model_signal.intent,
            model_confidence = model_signal.confidence,
            pattern_intent = %pattern_intent,
            final_intent = %resolved.intent,
            "intent resolved"
        );

        let outcome = self.router.dispatch(resolved.intent, user_id, text).await?;
        Ok(self.build_envelope(text, resolved, outcome))
    }

    /// Recognize `confirm <id>` / `cancel <id>` and bare `yes`/`no`
    /// replies. Bare replies only intercept when the user actually has a
    /// pending delete; otherwise they fall through to classification.
    fn parse_confirmation_reply(
        &self,
        user_id: i64,
        text: &str,
    ) -> EngineResult<Option<ConfirmationReply>> {
        let lower = text.to_lowercase();

        for (prefix, approve) in [("confirm ", true), ("cancel ", false)] {
            if let Some(rest) = lower.strip_prefix(prefix) {
                let candidate = rest.trim();
                // Only a token that is actually a confirmation id counts;
                // "cancel my gym expense" is a delete request, not a reply.
                if Uuid::parse_str(candidate).is_ok() {
                    return Ok(Some(ConfirmationReply::Explicit {
                        confirmation_id: candidate.to_string(),
                        approve,
                    }));
                }
            }
        }

        let approve = match lower.as_str() {
            "yes" | "y" => Some(true),
            "no" | "n" => Some(false),
            _ => None,
        };
        if let Some(approve) = approve {
            if self.router.deletes().latest_confirmation_id(user_id)?.is_some() {
                return Ok(Some(ConfirmationReply::Bare { approve }));
            }
        }

        Ok(None)
    }

    async fn handle_confirmation(
        &self,
        user_id: i64,
        text: &str,
        reply: ConfirmationReply,
    ) -> EngineResult<ResponseEnvelope> {
        let (confirmation_id, approve) = match reply {
            ConfirmationReply::Explicit {
                confirmation_id,
                approve,
            } => (confirmation_id, approve),
            ConfirmationReply::Bare { approve } => {
                match self.router.deletes().latest_confirmation_id(user_id)? {
                    Some(latest) => (latest, approve),
                    // Consumed between parsing and resolution; surface the
                    // same message a stale id gets.
                    None => {
                        return Ok(ResponseEnvelope::success(
                            "No pending delete operation found for that confirmation id.",
                            Intent::Delete,
                            1.0,
                            ResponseMetadata {
                                handler_used: Router::handler_name(Intent::Delete).to_string(),
                                sql_generated: None,
                                original_query: text.to_string(),
                            },
                        ))
                    }
                }
            }
        };

        let metadata = |sql: Option<String>| ResponseMetadata {
            handler_used: Router::handler_name(Intent::Delete).to_string(),
            sql_generated: sql,
            original_query: text.to_string(),
        };

        match self
            .router
            .deletes()
            .confirm(user_id, &confirmation_id, approve)
            .await
        {
            Ok(ConfirmOutcome::Executed { rows_deleted, sql }) => Ok(ResponseEnvelope::success(
                format!("Deleted {rows_deleted} record(s)."),
                Intent::Delete,
                1.0,
                metadata(Some(sql)),
            )),
            Ok(ConfirmOutcome::Cancelled) => Ok(ResponseEnvelope::success(
                "Delete cancelled. No records were removed.",
                Intent::Delete,
                1.0,
                metadata(None),
            )),
            // A stale or foreign id is a user-visible condition, not an
            // internal fault.
            Err(EngineError::UnknownConfirmation(_)) => Ok(ResponseEnvelope::success(
                "No pending delete operation found for that confirmation id.",
                Intent::Delete,
                1.0,
                metadata(None),
            )),
            Err(error) => Err(error),
        }
    }

    fn build_envelope(
        &self,
        text: &str,
        resolved: ResolvedIntent,
        outcome: RouteOutcome,
    ) -> ResponseEnvelope {
        let handler_used = Router::handler_name(resolved.intent).to_string();
        let (response, sql) = match outcome {
            RouteOutcome::Complete {
                message,
                answer,
                sql,
                ..
            } => {
                // Views answer with the query result; mutations surface the
                // handler's message.
                let response = if resolved.intent == Intent::View {
                    answer.unwrap_or(message)
                } else {
                    message
                };
                (response, sql)
            }
            RouteOutcome::ConfirmRequired { message, .. } => (message, None),
            RouteOutcome::Error { message, sql } => (message, sql),
        };

        ResponseEnvelope::success(
            response,
            resolved.intent,
            resolved.confidence,
            ResponseMetadata {
                handler_used,
                sql_generated: sql,
                original_query: text.to_string(),
            },
        )
    }
}
