//! Command grammar parser.
//!
//! Turns raw message text into a typed [`Command`] or a [`ParseError`].
//! The accepted shapes live in [`COMMAND_SHAPES`], which also drives the
//! `/help` text and the Telegram command menu, so grammar and documentation
//! cannot drift apart.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::ParseError;

use super::types::{AmountFilter, Command, CommandIntent, DateRange, GroupPeriod};

// ============================================================================
// Command shapes
// ============================================================================

/// One documented command shape.
#[derive(Debug, Clone, Copy)]
pub struct CommandShape {
    /// Command name without the leading slash.
    pub name: &'static str,
    /// Usage line shown in `/help`.
    pub usage: &'static str,
    /// Short description for `/help` and the Telegram command menu.
    pub summary: &'static str,
}

/// The full set of accepted command shapes.
pub const COMMAND_SHAPES: &[CommandShape] = &[
    CommandShape {
        name: "start",
        usage: "/start",
        summary: "say hello and point at /help",
    },
    CommandShape {
        name: "help",
        usage: "/help",
        summary: "show the supported commands",
    },
    CommandShape {
        name: "categories",
        usage: "/categories",
        summary: "list known payment categories",
    },
    CommandShape {
        name: "sum",
        usage: "/sum <category> <from> <to> [min=N] [max=N]",
        summary: "total payments for a category",
    },
    CommandShape {
        name: "count",
        usage: "/count <category> [<from> <to>]",
        summary: "count payments for a category",
    },
    CommandShape {
        name: "series",
        usage: "/series <hour|day|week|month> <from> <to> [category]",
        summary: "payment totals grouped by period",
    },
];

/// Render the `/help` reply from the shape table.
pub fn help_text() -> String {
    let mut out = String::from("Supported commands:\n");
    for shape in COMMAND_SHAPES {
        out.push_str(&format!("{} — {}\n", shape.usage, shape.summary));
    }
    out.push_str("\nDates are YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS. ");
    out.push_str("A bare <to> date covers the whole day.");
    out
}

// ============================================================================
// Argument kinds
// ============================================================================

/// The kind of token a grammar position expects; used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Category,
    Date,
    Period,
    AmountOption,
    End,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Category => "a category name",
            Self::Date => "a date (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)",
            Self::Period => "a period (hour, day, week or month)",
            Self::AmountOption => "min=<amount> or max=<amount>",
            Self::End => "end of command",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Parser
// ============================================================================

/// Parses raw message text against the fixed command grammar.
///
/// Pure: no side effects, no state. Tokenization splits on whitespace; each
/// shape has a fixed arity with ordered argument positions and strictly
/// formatted tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandParser;

impl CommandParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one message into a command.
    pub fn parse(&self, text: &str) -> Result<Command, ParseError> {
        let mut tokens = text.split_whitespace();
        let head = tokens.next().unwrap_or("");

        let Some(name) = head.strip_prefix('/') else {
            return Err(ParseError::UnrecognizedCommand {
                command: head.to_string(),
            });
        };
        // Group chats append the bot mention: "/sum@TallyBot".
        let name = name.split('@').next().unwrap_or(name);

        let args: Vec<&str> = tokens.collect();
        match name {
            "start" => self.parse_bare(Command::Start, &args),
            "help" => self.parse_bare(Command::Help, &args),
            "categories" => self.parse_bare(Command::Categories, &args),
            "sum" => self.parse_sum(&args),
            "count" => self.parse_count(&args),
            "series" => self.parse_series(&args),
            _ => Err(ParseError::UnrecognizedCommand {
                command: head.to_string(),
            }),
        }
    }

    fn parse_bare(&self, command: Command, args: &[&str]) -> Result<Command, ParseError> {
        expect_end(args, 0)?;
        Ok(command)
    }

    // /sum <category> <from> <to> [min=N] [max=N]
    fn parse_sum(&self, args: &[&str]) -> Result<Command, ParseError> {
        let category = take_category(args, 0)?;
        let range = take_range(args, 1)?;
        let amounts = take_amounts(args, 3)?;
        Ok(Command::Query(CommandIntent::Sum {
            category,
            range,
            amounts,
        }))
    }

    // /count <category> [<from> <to>]
    fn parse_count(&self, args: &[&str]) -> Result<Command, ParseError> {
        let category = take_category(args, 0)?;
        let range = if args.len() > 1 {
            Some(take_range(args, 1)?)
        } else {
            None
        };
        expect_end(args, if range.is_some() { 3 } else { 1 })?;
        Ok(Command::Query(CommandIntent::Count { category, range }))
    }

    // /series <hour|day|week|month> <from> <to> [category]
    fn parse_series(&self, args: &[&str]) -> Result<Command, ParseError> {
        let period = take_period(args, 0)?;
        let range = take_range(args, 1)?;
        let category = if args.len() > 3 {
            Some(take_category(args, 3)?)
        } else {
            None
        };
        expect_end(args, if category.is_some() { 4 } else { 3 })?;
        Ok(Command::Query(CommandIntent::Series {
            period,
            range,
            category,
        }))
    }
}

// ============================================================================
// Token readers
// ============================================================================

fn malformed(index: usize, expected: ArgKind, found: Option<&str>) -> ParseError {
    ParseError::MalformedArgument {
        position: index + 1,
        expected,
        found: found.map(str::to_string),
    }
}

fn take_token<'a>(args: &[&'a str], index: usize, expected: ArgKind) -> Result<&'a str, ParseError> {
    args.get(index)
        .copied()
        .ok_or_else(|| malformed(index, expected, None))
}

fn expect_end(args: &[&str], index: usize) -> Result<(), ParseError> {
    match args.get(index) {
        None => Ok(()),
        Some(&extra) => Err(malformed(index, ArgKind::End, Some(extra))),
    }
}

fn take_category(args: &[&str], index: usize) -> Result<String, ParseError> {
    let token = take_token(args, index, ArgKind::Category)?;
    // Option-style and date-like tokens are never category names; reject
    // them here so a missing category reads as the right error.
    if token.contains('=') || parse_date_token(token, false).is_some() {
        return Err(malformed(index, ArgKind::Category, Some(token)));
    }
    Ok(token.to_string())
}

/// Read `<from> <to>` at consecutive positions. A bare `<to>` date extends
/// to 23:59:59 so whole-day ranges behave as users expect.
fn take_range(args: &[&str], index: usize) -> Result<DateRange, ParseError> {
    let start = take_date(args, index, false)?;
    let end = take_date(args, index + 1, true)?;
    Ok(DateRange::new(start, end))
}

fn take_date(args: &[&str], index: usize, end_of_day: bool) -> Result<NaiveDateTime, ParseError> {
    let token = take_token(args, index, ArgKind::Date)?;
    parse_date_token(token, end_of_day).ok_or_else(|| malformed(index, ArgKind::Date, Some(token)))
}

fn parse_date_token(token: &str, end_of_day: bool) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(token, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    let date = NaiveDate::parse_from_str(token, "%Y-%m-%d").ok()?;
    let time = if end_of_day {
        NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
    } else {
        NaiveTime::MIN
    };
    Some(date.and_time(time))
}

fn take_period(args: &[&str], index: usize) -> Result<GroupPeriod, ParseError> {
    let token = take_token(args, index, ArgKind::Period)?;
    match token {
        "hour" => Ok(GroupPeriod::Hour),
        "day" => Ok(GroupPeriod::Day),
        "week" => Ok(GroupPeriod::Week),
        "month" => Ok(GroupPeriod::Month),
        other => Err(malformed(index, ArgKind::Period, Some(other))),
    }
}

/// Read trailing `min=`/`max=` options starting at `index`; each may appear
/// at most once, in either order.
fn take_amounts(args: &[&str], index: usize) -> Result<AmountFilter, ParseError> {
    let mut filter = AmountFilter::default();
    for (offset, &token) in args.iter().enumerate().skip(index) {
        let slot = match token.split_once('=') {
            Some(("min", value)) => (&mut filter.min, value),
            Some(("max", value)) => (&mut filter.max, value),
            _ => return Err(malformed(offset, ArgKind::AmountOption, Some(token))),
        };
        let (field, value) = slot;
        let parsed: f64 = value
            .parse()
            .map_err(|_| malformed(offset, ArgKind::AmountOption, Some(token)))?;
        if field.replace(parsed).is_some() {
            // Duplicate option.
            return Err(malformed(offset, ArgKind::AmountOption, Some(token)));
        }
    }
    Ok(filter)
}

// ============================================================================
// Tests
// ============================================================================
