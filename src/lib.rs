//! tally: a Telegram bot that aggregates payment records stored in MongoDB.
//!
//! The core is the command-to-aggregation translator in [`query`]: a strict
//! grammar parser, an intent validator, a deterministic pipeline builder,
//! and a reply formatter. The [`bot`] and [`storage`] modules are the
//! surrounding transport and database collaborators.

pub mod bot;
pub mod config;
pub mod error;
pub mod query;
pub mod storage;

pub use bot::{Bot, TelegramApi};
pub use config::{Config, MongoConfig, TelegramConfig};
pub use error::{
    ConfigError, ExecutionError, ParseError, Result, TallyError, TransportError, ValidationError,
};
pub use query::{
    help_text, Command, CommandIntent, CommandParser, IntentValidator, Pipeline, PipelineBuilder,
    QueryEngine, ReplyFormatter, ResultRow, Stage, ValidatedIntent, Vocabulary,
};
pub use storage::{load_payments, MemoryStore, MongoStore, Payment, PaymentStore};
