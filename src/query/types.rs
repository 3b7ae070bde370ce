//! Types for the command-to-aggregation translator.

use chrono::{Datelike, Days, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

// ============================================================================
// Commands and intents
// ============================================================================

/// A parsed chat command.
///
/// Menu commands (`/start`, `/help`, `/categories`) carry no query semantics
/// and are answered by the engine directly; only `Query` intents flow through
/// validation and pipeline building.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Help,
    Categories,
    Query(CommandIntent),
}

/// The structured representation of an aggregation request, prior to
/// validation. Never mutated after parsing; invalid intents are rejected,
/// not repaired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandIntent {
    /// Total payment value for one category over a date range.
    Sum {
        category: String,
        range: DateRange,
        amounts: AmountFilter,
    },
    /// Number of payments for one category, optionally date-restricted.
    Count {
        category: String,
        range: Option<DateRange>,
    },
    /// Payment totals grouped by truncated time period.
    Series {
        period: GroupPeriod,
        range: DateRange,
        category: Option<String>,
    },
}

impl CommandIntent {
    /// Category names referenced by this intent, in grammar order.
    pub fn categories(&self) -> Vec<&str> {
        match self {
            Self::Sum { category, .. } | Self::Count { category, .. } => vec![category.as_str()],
            Self::Series { category, .. } => category.iter().map(String::as_str).collect(),
        }
    }

    pub fn range(&self) -> Option<&DateRange> {
        match self {
            Self::Sum { range, .. } | Self::Series { range, .. } => Some(range),
            Self::Count { range, .. } => range.as_ref(),
        }
    }

    pub fn amounts(&self) -> Option<&AmountFilter> {
        match self {
            Self::Sum { amounts, .. } => Some(amounts),
            _ => None,
        }
    }
}

/// A closed datetime interval. Well-formedness (start <= end) is checked by
/// the validator, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, dt: NaiveDateTime) -> bool {
        self.start <= dt && dt <= self.end
    }
}

/// Optional lower/upper bounds on the payment value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AmountFilter {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl AmountFilter {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn matches(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Grouping granularity for `/series` queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupPeriod {
    Hour,
    Day,
    Week,
    Month,
}

impl GroupPeriod {
    /// The `$dateTrunc` unit name used by the MongoDB backend.
    pub fn as_unit_str(&self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// Truncate a timestamp to the start of its period. Weeks are ISO weeks
    /// starting Monday; the MongoDB lowering pins `startOfWeek` to match.
    pub fn truncate(&self, dt: NaiveDateTime) -> NaiveDateTime {
        let date = dt.date();
        match self {
            Self::Hour => date
                .and_hms_opt(dt.hour(), 0, 0)
                .unwrap_or_else(|| date.and_time(NaiveTime::MIN)),
            Self::Day => date.and_time(NaiveTime::MIN),
            Self::Week => {
                let days_back = u64::from(date.weekday().num_days_from_monday());
                date.checked_sub_days(Days::new(days_back))
                    .unwrap_or(date)
                    .and_time(NaiveTime::MIN)
            }
            Self::Month => date.with_day(1).unwrap_or(date).and_time(NaiveTime::MIN),
        }
    }
}

// ============================================================================
// Validated intent
// ============================================================================

/// A `CommandIntent` that passed validation: all referenced category names
/// exist in the vocabulary, ranges are well-formed, amount filters are sane.
///
/// Constructible only through the validator.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedIntent {
    intent: CommandIntent,
}

impl ValidatedIntent {
    pub(crate) fn new(intent: CommandIntent) -> Self {
        Self { intent }
    }

    pub fn intent(&self) -> &CommandIntent {
        &self.intent
    }

    pub fn into_inner(self) -> CommandIntent {
        self.intent
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// An ordered sequence of aggregation stages derived from a validated
/// intent. Pure data; backends lower stages to their own wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub stages: Vec<Stage>,
}

/// One aggregation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Select payments by category, date range, and value bounds.
    Match {
        category: Option<String>,
        range: Option<DateRange>,
        amounts: AmountFilter,
    },
    /// Fold matched payments into groups.
    Group {
        key: GroupKey,
        accumulator: Accumulator,
    },
    /// Order groups by their key.
    Sort { ascending: bool },
    /// Name the output value field.
    Project { value_label: String },
}

/// The grouping dimension of a `Group` stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    /// A single group spanning every matched payment.
    Whole,
    Category,
    Period(GroupPeriod),
}

/// The value folded per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accumulator {
    SumValue,
    CountPayments,
}

// ============================================================================
// Result rows
// ============================================================================

/// Datetime rendering for period grouping keys, matching the original
/// `$dateToString` format.
pub const KEY_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One aggregated output record: a grouping key and its numeric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub key: String,
    pub value: f64,
}

impl ResultRow {
    pub fn new(key: impl Into<String>, value: f64) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
