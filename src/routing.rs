//! Dispatch from a resolved intent to the downstream collaborator, with
//! light query normalization so each handler sees the action wording it
//! expects.

use std::sync::Arc;

use crate::deletes::{DeleteWorkflow, ProposeOutcome};
use crate::error::EngineResult;
use crate::handlers::{CreateHandler, DeletePreview, MutationOutcome, QueryRunner, UpdateHandler};
use crate::intent::Intent;

const CREATE_ACTION_WORDS: &[&str] = &["add", "log", "record", "enter", "save"];
const CREATE_ENHANCE_WORDS: &[&str] = &["add", "log", "record", "create"];
const UPDATE_ENHANCE_WORDS: &[&str] = &["change", "update", "modify"];
const SPENDING_WORDS: &[&str] = &["spent", "paid", "bought", "cost"];
const INCOME_WORDS: &[&str] = &["earned", "made", "received", "got", "income"];

/// Result of routing one request. Tagged per status; each variant carries
/// only the fields valid for it.
#[derive(Debug, Clone)]
pub enum RouteOutcome {
    Complete {
        message: String,
        answer: Option<String>,
        sql: Option<String>,
        natural_response: Option<String>,
    },
    ConfirmRequired {
        confirmation_id: String,
        preview: DeletePreview,
        message: String,
    },
    Error {
        message: String,
        sql: Option<String>,
    },
}

/// Maps a final intent to its downstream collaborator. DELETE never reaches
/// an execution collaborator from here; it always goes through the
/// confirmation workflow.
pub struct Router {
    create: Arc<dyn CreateHandler>,
    update: Arc<dyn UpdateHandler>,
    query: Arc<dyn QueryRunner>,
    deletes: Arc<DeleteWorkflow>,
}

impl Router {
    pub fn new(
        create: Arc<dyn CreateHandler>,
        update: Arc<dyn UpdateHandler>,
        query: Arc<dyn QueryRunner>,
        deletes: Arc<DeleteWorkflow>,
    ) -> Self {
        Self {
            create,
            update,
            query,
            deletes,
        }
    }

    pub fn deletes(&self) -> &Arc<DeleteWorkflow> {
        &self.deletes
    }

    /// Name of the collaborator a given intent dispatches to, for envelope
    /// metadata.
    pub fn handler_name(intent: Intent) -> &'static str {
        if intent.is_mutation() {
            "data_handler"
        } else {
            "query_runner"
        }
    }

    pub async fn dispatch(
        &self,
        intent: Intent,
        user_id: i64,
        text: &str,
    ) -> EngineResult<RouteOutcome> {
        match intent {
            Intent::Create => {
                let enhanced = enhance_for_handler(text, Intent::Create);
                let prepared = prepare_create_query(text);
                let outcome = self
                    .create
                    .process_create(&enhanced, &prepared, user_id)
                    .await?;
                Ok(mutation_to_route(outcome))
            }
            Intent::Update => {
                let enhanced = enhance_for_handler(text, Intent::Update);
                let outcome = self.update.process_update(&enhanced, text, user_id).await?;
                Ok(mutation_to_route(outcome))
            }
            Intent::Delete => {
                // Capability is resolved at construction, not probed per
                // call: absence is a structured error, never a fault.
                if !self.deletes.has_capability() {
                    tracing::warn!(user_id, "delete intent routed without delete capability");
                    return Ok(RouteOutcome::Error {
                        message: "Delete functionality is not yet implemented. Please use the \
                                  web interface for deletion."
                            .to_string(),
                        sql: None,
                    });
                }
                let outcome = self.deletes.propose(user_id, text).await?;
                Ok(propose_to_route(outcome))
            }
            Intent::View => {
                let (answer, sql) = self.query.run_query(text, user_id).await?;
                Ok(RouteOutcome::Complete {
                    message: "Query executed successfully".to_string(),
                    answer: Some(answer),
                    sql: Some(sql),
                    natural_response: None,
                })
            }
        }
    }
}

fn mutation_to_route(outcome: MutationOutcome) -> RouteOutcome {
    match outcome {
        MutationOutcome::Complete {
            message,
            sql,
            natural_response,
        } => RouteOutcome::Complete {
            message,
            answer: None,
            sql,
            natural_response,
        },
        MutationOutcome::Error { message } => RouteOutcome::Error { message, sql: None },
    }
}

fn propose_to_route(outcome: ProposeOutcome) -> RouteOutcome {
    match outcome {
        ProposeOutcome::ConfirmRequired {
            confirmation_id,
            preview,
        } => {
            let message = format!(
                "{} Reply 'yes' to confirm or 'no' to cancel (confirmation id: {}).",
                preview.message, confirmation_id
            );
            RouteOutcome::ConfirmRequired {
                confirmation_id,
                preview,
                message,
            }
        }
        ProposeOutcome::NothingMatched { message } => RouteOutcome::Complete {
            message,
            answer: None,
            sql: None,
            natural_response: None,
        },
    }
}

/// Rephrase a CREATE so the data handler always sees an action word:
/// spending statements get "log", income statements get "record", anything
/// else gets "add".
pub fn prepare_create_query(text: &str) -> String {
    let lower = text.to_lowercase();
    if CREATE_ACTION_WORDS.iter().any(|word| lower.contains(word)) {
        return text.to_string();
    }
    if SPENDING_WORDS.iter().any(|word| lower.contains(word)) {
        return format!("log {text}");
    }
    if INCOME_WORDS.iter().any(|word| lower.contains(word)) {
        return format!("record {text}");
    }
    format!("add {text}")
}

/// Ensure the text carries wording appropriate to the target handler.
pub fn enhance_for_handler(text: &str, intent: Intent) -> String {
    let lower = text.to_lowercase();
    match intent {
        Intent::Create if !CREATE_ENHANCE_WORDS.iter().any(|word| lower.contains(word)) => {
            format!("log {text}")
        }
        Intent::Update if !UPDATE_ENHANCE_WORDS.iter().any(|word| lower.contains(word)) => {
            format!("change {text}")
        }
        _ => text.to_string(),
    }
}
