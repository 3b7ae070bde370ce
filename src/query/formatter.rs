//! Result formatter.
//!
//! Renders aggregation output rows into the reply text sent back to the
//! user. Output is deterministic: rows are sorted by key and numbers use a
//! fixed precision.

use super::types::{CommandIntent, DateRange, ResultRow};

/// Reply for queries that matched nothing.
pub const NO_DATA_MESSAGE: &str = "No payments found for this query.";

/// Formats result rows, labeled by the originating intent.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplyFormatter;

impl ReplyFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format(&self, intent: &CommandIntent, rows: &[ResultRow]) -> String {
        if rows.is_empty() {
            return NO_DATA_MESSAGE.to_string();
        }

        let mut rows = rows.to_vec();
        rows.sort_by(|a, b| a.key.cmp(&b.key));

        match intent {
            CommandIntent::Sum {
                category, range, ..
            } => {
                let total: f64 = rows.iter().map(|r| r.value).sum();
                format!(
                    "Total for {category} {}: {}",
                    format_range(range),
                    format_amount(total)
                )
            }
            CommandIntent::Count { category, range } => {
                let count: f64 = rows.iter().map(|r| r.value).sum();
                let when = range
                    .map(|r| format!(" {}", format_range(&r)))
                    .unwrap_or_default();
                format!("{} payments recorded for {category}{when}.", count as i64)
            }
            CommandIntent::Series {
                period, category, ..
            } => {
                let subject = category.as_deref().unwrap_or("all categories");
                let mut out = format!(
                    "Totals for {subject} by {}:\n",
                    period.as_unit_str()
                );
                for row in &rows {
                    out.push_str(&format!("{}  {}\n", row.key, format_amount(row.value)));
                }
                out.trim_end().to_string()
            }
        }
    }
}

fn format_amount(value: f64) -> String {
    format!("{value:.2}")
}

fn format_range(range: &DateRange) -> String {
    format!(
        "from {} to {}",
        range.start.format("%Y-%m-%d %H:%M:%S"),
        range.end.format("%Y-%m-%d %H:%M:%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::types::{AmountFilter, GroupPeriod};
    use chrono::NaiveDate;

    fn day(d: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn sum_intent() -> CommandIntent {
        CommandIntent::Sum {
            category: "groceries".to_string(),
            range: DateRange::new(day(1), day(31)),
            amounts: AmountFilter::default(),
        }
    }

    #[test]
    fn test_empty_rows_yield_no_data_message() {
        let reply = ReplyFormatter::new().format(&sum_intent(), &[]);
        assert_eq!(reply, NO_DATA_MESSAGE);
    }

    #[test]
    fn test_sum_reply_has_fixed_precision() {
        let rows = vec![ResultRow::new("", 1234.5)];
        let reply = ReplyFormatter::new().format(&sum_intent(), &rows);
        assert!(reply.contains("groceries"));
        assert!(reply.contains("1234.50"));
    }

    #[test]
    fn test_count_reply_is_integer() {
        let intent = CommandIntent::Count {
            category: "rent".to_string(),
            range: None,
        };
        let rows = vec![ResultRow::new("", 12.0)];
        let reply = ReplyFormatter::new().format(&intent, &rows);
        assert_eq!(reply, "12 payments recorded for rent.");
    }

    #[test]
    fn test_series_rows_are_sorted_by_key() {
        let intent = CommandIntent::Series {
            period: GroupPeriod::Month,
            range: DateRange::new(day(1), day(31)),
            category: None,
        };
        let rows = vec![
            ResultRow::new("2024-02-01T00:00:00", 20.0),
            ResultRow::new("2024-01-01T00:00:00", 10.0),
        ];
        let reply = ReplyFormatter::new().format(&intent, &rows);
        let jan = reply.find("2024-01-01").unwrap();
        let feb = reply.find("2024-02-01").unwrap();
        assert!(jan < feb);
        assert!(reply.contains("10.00"));
        assert!(reply.contains("all categories"));
    }

    #[test]
    fn test_formatting_is_reproducible() {
        let rows = vec![ResultRow::new("b", 2.0), ResultRow::new("a", 1.0)];
        let intent = CommandIntent::Series {
            period: GroupPeriod::Day,
            range: DateRange::new(day(1), day(2)),
            category: Some("groceries".to_string()),
        };
        let formatter = ReplyFormatter::new();
        assert_eq!(formatter.format(&intent, &rows), formatter.format(&intent, &rows));
    }
}
