//! Telegram bot runtime.
//!
//! Long-polls for updates and pushes each text message through the query
//! engine. The transport owns delivery and retries; the engine only ever
//! sees one text in, one reply out.

pub mod api;

use std::time::Duration;

use tracing::{info, warn};

use crate::error::Result;
use crate::query::QueryEngine;
use crate::storage::PaymentStore;

pub use api::{Chat, Message, TelegramApi, Update};

/// Pause before re-polling after a transport error.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

/// The polling loop around a query engine.
pub struct Bot<S> {
    api: TelegramApi,
    engine: QueryEngine<S>,
    poll_timeout_secs: u64,
}

impl<S: PaymentStore> Bot<S> {
    pub fn new(api: TelegramApi, engine: QueryEngine<S>, poll_timeout_secs: u64) -> Self {
        Self {
            api,
            engine,
            poll_timeout_secs,
        }
    }

    /// Run until ctrl-c. Transport failures are logged and polling resumes;
    /// nothing here retries an individual request.
    pub async fn run(&self) -> Result<()> {
        self.api.set_my_commands().await?;
        info!("command menu registered, polling for updates");

        let mut offset = 0_i64;
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("shutting down");
                    return Ok(());
                }
                polled = self.api.get_updates(offset, self.poll_timeout_secs) => {
                    match polled {
                        Ok(updates) => {
                            for update in updates {
                                offset = offset.max(update.update_id + 1);
                                self.process(update).await;
                            }
                        }
                        Err(err) => {
                            warn!(%err, "polling failed");
                            tokio::time::sleep(POLL_RETRY_DELAY).await;
                        }
                    }
                }
            }
        }
    }

    async fn process(&self, update: Update) {
        let Some(message) = update.into_message() else {
            return;
        };
        let Some(text) = message.text else {
            return;
        };
        let chat_id = message.chat.id;
        let reply = self.engine.handle(&text).await;
        if let Err(err) = self.api.send_message(chat_id, &reply).await {
            warn!(chat_id, %err, "failed to deliver reply");
        }
    }
}
