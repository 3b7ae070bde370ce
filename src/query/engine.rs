//! Request engine.
//!
//! Drives one message through the whole core: parse, validate against the
//! store's vocabulary, build the pipeline, execute, format. Every outcome,
//! including every error, becomes a reply string; the transport never sees
//! a failed request.

use tracing::{debug, error};

use crate::error::TallyError;
use crate::storage::PaymentStore;

use super::formatter::ReplyFormatter;
use super::parser::{help_text, CommandParser};
use super::pipeline::PipelineBuilder;
use super::types::Command;
use super::validator::IntentValidator;

const GREETING: &str =
    "Hi! I aggregate your payment records. Send /help to see what I understand.";

const EXECUTION_FAILED: &str =
    "Something went wrong while running your query. Please try again later.";

/// Stateless per request; holds only the injected store handle.
pub struct QueryEngine<S> {
    store: S,
    parser: CommandParser,
    validator: IntentValidator,
    builder: PipelineBuilder,
    formatter: ReplyFormatter,
}

impl<S: PaymentStore> QueryEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            parser: CommandParser::new(),
            validator: IntentValidator::new(),
            builder: PipelineBuilder::new(),
            formatter: ReplyFormatter::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handle one message. Infallible at this boundary: errors are rendered
    /// into user-facing replies, with execution detail kept to the logs.
    pub async fn handle(&self, text: &str) -> String {
        match self.respond(text).await {
            Ok(reply) => reply,
            Err(TallyError::Parse(err)) => {
                debug!(%err, "rejected message");
                format!("{err}. Send /help to see the supported commands.")
            }
            Err(TallyError::Validation(err)) => {
                debug!(%err, "rejected intent");
                format!("{err}.")
            }
            Err(err) => {
                error!(%err, "query execution failed");
                EXECUTION_FAILED.to_string()
            }
        }
    }

    async fn respond(&self, text: &str) -> Result<String, TallyError> {
        let command = self.parser.parse(text)?;
        match command {
            Command::Start => Ok(GREETING.to_string()),
            Command::Help => Ok(help_text()),
            Command::Categories => {
                let vocabulary = self.store.categories().await?;
                if vocabulary.is_empty() {
                    Ok("No categories recorded yet.".to_string())
                } else {
                    Ok(format!(
                        "Known categories: {}",
                        vocabulary.iter().collect::<Vec<_>>().join(", ")
                    ))
                }
            }
            Command::Query(intent) => {
                let vocabulary = self.store.categories().await?;
                let validated = self.validator.validate(&intent, &vocabulary)?;
                let pipeline = self.builder.build(&validated);
                let rows = self.store.run(&pipeline).await?;
                Ok(self.formatter.format(&intent, &rows))
            }
        }
    }
}
