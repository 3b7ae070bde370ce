//! The command-to-aggregation translator.
//!
//! This module is the core of tally:
//! - grammar parsing of chat commands into typed intents
//! - intent validation against the store's vocabulary
//! - deterministic pipeline building
//! - reply formatting

pub mod engine;
pub mod formatter;
pub mod parser;
pub mod pipeline;
pub mod types;
pub mod validator;

pub use engine::QueryEngine;
pub use formatter::{ReplyFormatter, NO_DATA_MESSAGE};
pub use parser::{help_text, ArgKind, CommandParser, CommandShape, COMMAND_SHAPES};
pub use pipeline::PipelineBuilder;
pub use types::{
    Accumulator, AmountFilter, Command, CommandIntent, DateRange, GroupKey, GroupPeriod, Pipeline,
    ResultRow, Stage, ValidatedIntent, KEY_DATE_FORMAT,
};
pub use validator::{IntentValidator, Vocabulary, MAX_AMOUNT};
