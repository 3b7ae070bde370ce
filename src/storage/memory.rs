//! In-process payment store.
//!
//! Interprets the stage templates produced by the pipeline builder over a
//! plain `Vec<Payment>`. Used by tests and by `ask --memory` dry runs; it
//! must agree with the MongoDB backend on every template.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::query::{
    Accumulator, GroupKey, Pipeline, ResultRow, Stage, Vocabulary, KEY_DATE_FORMAT,
};

use super::traits::PaymentStore;
use super::Payment;

/// Payment store backed by an in-memory vector.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    payments: Vec<Payment>,
}

impl MemoryStore {
    pub fn new(payments: Vec<Payment>) -> Self {
        Self { payments }
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn categories(&self) -> Result<Vocabulary> {
        Ok(self
            .payments
            .iter()
            .map(|p| p.category.clone())
            .collect())
    }

    async fn run(&self, pipeline: &Pipeline) -> Result<Vec<ResultRow>> {
        let mut matched: Vec<&Payment> = self.payments.iter().collect();
        // BTreeMap keeps group keys ordered, which also covers the Sort
        // stage for string-sortable period keys.
        let mut groups: BTreeMap<String, f64> = BTreeMap::new();
        let mut grouped = false;

        for stage in &pipeline.stages {
            match stage {
                Stage::Match {
                    category,
                    range,
                    amounts,
                } => {
                    matched.retain(|p| {
                        category.as_ref().is_none_or(|c| &p.category == c)
                            && range.is_none_or(|r| r.contains(p.dt))
                            && amounts.matches(p.value)
                    });
                }
                Stage::Group { key, accumulator } => {
                    grouped = true;
                    for payment in &matched {
                        let group_key = match key {
                            GroupKey::Whole => String::new(),
                            GroupKey::Category => payment.category.clone(),
                            GroupKey::Period(period) => period
                                .truncate(payment.dt)
                                .format(KEY_DATE_FORMAT)
                                .to_string(),
                        };
                        let slot = groups.entry(group_key).or_insert(0.0);
                        match accumulator {
                            Accumulator::SumValue => *slot += payment.value,
                            Accumulator::CountPayments => *slot += 1.0,
                        }
                    }
                }
                // Ordering falls out of the BTreeMap; projection is the
                // ResultRow shape itself.
                Stage::Sort { .. } | Stage::Project { .. } => {}
            }
        }

        if !grouped {
            return Ok(Vec::new());
        }
        Ok(groups
            .into_iter()
            .map(|(key, value)| ResultRow::new(key, value))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{
        AmountFilter, CommandIntent, DateRange, GroupPeriod, IntentValidator, PipelineBuilder,
    };
    use chrono::NaiveDate;

    fn dt(mo: u32, d: u32, h: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, mo, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn payment(mo: u32, d: u32, category: &str, value: f64) -> Payment {
        Payment {
            dt: dt(mo, d, 12),
            category: category.to_string(),
            value,
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::new(vec![
            payment(1, 5, "groceries", 10.0),
            payment(1, 20, "groceries", 30.0),
            payment(2, 3, "groceries", 7.5),
            payment(1, 7, "rent", 900.0),
        ])
    }

    fn build(intent: CommandIntent) -> Pipeline {
        let vocab: Vocabulary = ["groceries", "rent"].iter().map(|s| s.to_string()).collect();
        let validated = IntentValidator::new().validate(&intent, &vocab).unwrap();
        PipelineBuilder::new().build(&validated)
    }

    #[tokio::test]
    async fn test_sum_over_range() {
        let store = store();
        let pipeline = build(CommandIntent::Sum {
            category: "groceries".to_string(),
            range: DateRange::new(dt(1, 1, 0), dt(1, 31, 23)),
            amounts: AmountFilter::default(),
        });
        let rows = store.run(&pipeline).await.unwrap();
        assert_eq!(rows, vec![ResultRow::new("", 40.0)]);
    }

    #[tokio::test]
    async fn test_sum_with_amount_filter() {
        let store = store();
        let pipeline = build(CommandIntent::Sum {
            category: "groceries".to_string(),
            range: DateRange::new(dt(1, 1, 0), dt(2, 28, 23)),
            amounts: AmountFilter {
                min: Some(10.0),
                max: None,
            },
        });
        let rows = store.run(&pipeline).await.unwrap();
        assert_eq!(rows, vec![ResultRow::new("", 40.0)]);
    }

    #[tokio::test]
    async fn test_count_without_range() {
        let store = store();
        let pipeline = build(CommandIntent::Count {
            category: "groceries".to_string(),
            range: None,
        });
        let rows = store.run(&pipeline).await.unwrap();
        assert_eq!(rows, vec![ResultRow::new("", 3.0)]);
    }

    #[tokio::test]
    async fn test_series_by_month_is_ordered() {
        let store = store();
        let pipeline = build(CommandIntent::Series {
            period: GroupPeriod::Month,
            range: DateRange::new(dt(1, 1, 0), dt(2, 28, 23)),
            category: Some("groceries".to_string()),
        });
        let rows = store.run(&pipeline).await.unwrap();
        assert_eq!(
            rows,
            vec![
                ResultRow::new("2024-01-01T00:00:00", 40.0),
                ResultRow::new("2024-02-01T00:00:00", 7.5),
            ]
        );
    }

    #[tokio::test]
    async fn test_no_matches_yields_empty_rows() {
        let store = store();
        let pipeline = build(CommandIntent::Sum {
            category: "rent".to_string(),
            range: DateRange::new(dt(6, 1, 0), dt(6, 30, 23)),
            amounts: AmountFilter::default(),
        });
        let rows = store.run(&pipeline).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_categories_are_deduplicated() {
        let vocab = store().categories().await.unwrap();
        assert_eq!(vocab.iter().collect::<Vec<_>>(), vec!["groceries", "rent"]);
    }
}
