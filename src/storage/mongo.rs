//! MongoDB payment store.
//!
//! Lowers the typed pipeline stages to BSON aggregation documents and runs
//! them against a collection. Also carries the bootstrap operation that
//! (re)populates the collection from a payment list.

use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Client, Collection};
use tracing::info;

use async_trait::async_trait;

use crate::config::MongoConfig;
use crate::error::{ExecutionError, Result};
use crate::query::{
    Accumulator, GroupKey, GroupPeriod, Pipeline, ResultRow, Stage, Vocabulary, KEY_DATE_FORMAT,
};

use super::traits::PaymentStore;
use super::Payment;

/// Payment store backed by a MongoDB collection.
#[derive(Clone)]
pub struct MongoStore {
    collection: Collection<Document>,
}

impl MongoStore {
    /// Connect with an explicit configuration handle.
    pub async fn connect(config: &MongoConfig) -> Result<Self> {
        let client = Client::with_uri_str(config.uri())
            .await
            .map_err(ExecutionError::Database)?;
        let collection = client
            .database(&config.database)
            .collection(&config.collection);
        info!(uri = %config.uri(), database = %config.database, collection = %config.collection,
              "connected to MongoDB");
        Ok(Self { collection })
    }

    /// Populate the collection with the given payments. Unless `keep` is
    /// set the collection is dropped first, so seeding twice with the same
    /// data leaves the same collection.
    pub async fn seed(&self, payments: &[Payment], keep: bool) -> Result<usize> {
        if !keep {
            self.collection
                .delete_many(doc! {})
                .await
                .map_err(ExecutionError::Database)?;
        }
        if payments.is_empty() {
            return Ok(0);
        }
        let docs: Vec<Document> = payments.iter().map(payment_to_document).collect();
        let outcome = self
            .collection
            .insert_many(docs)
            .await
            .map_err(ExecutionError::Database)?;
        Ok(outcome.inserted_ids.len())
    }
}

#[async_trait]
impl PaymentStore for MongoStore {
    async fn categories(&self) -> Result<Vocabulary> {
        let values = self
            .collection
            .distinct("category", doc! {})
            .await
            .map_err(ExecutionError::Database)?;
        Ok(values
            .into_iter()
            .filter_map(|v| match v {
                Bson::String(name) => Some(name),
                _ => None,
            })
            .collect())
    }

    async fn run(&self, pipeline: &Pipeline) -> Result<Vec<ResultRow>> {
        let mut cursor = self
            .collection
            .aggregate(lower(pipeline))
            .await
            .map_err(ExecutionError::Database)?;
        let mut rows = Vec::new();
        while let Some(doc) = cursor.try_next().await.map_err(ExecutionError::Database)? {
            rows.push(parse_row(&doc)?);
        }
        Ok(rows)
    }
}

// ============================================================================
// Stage lowering
// ============================================================================

/// Lower a typed pipeline to the BSON documents MongoDB aggregates over.
/// Pure; unit-tested without a connection.
pub(crate) fn lower(pipeline: &Pipeline) -> Vec<Document> {
    // The projection renames fields produced by the grouping stage, so both
    // lowerings need the value label and the group key up front.
    let value_label = pipeline
        .stages
        .iter()
        .find_map(|s| match s {
            Stage::Project { value_label } => Some(value_label.as_str()),
            _ => None,
        })
        .unwrap_or("value");
    let group_key = pipeline.stages.iter().find_map(|s| match s {
        Stage::Group { key, .. } => Some(*key),
        _ => None,
    });

    pipeline
        .stages
        .iter()
        .map(|stage| match stage {
            Stage::Match {
                category,
                range,
                amounts,
            } => {
                let mut filter = Document::new();
                if let Some(name) = category {
                    filter.insert("category", name.as_str());
                }
                if let Some(range) = range {
                    filter.insert(
                        "dt",
                        doc! {
                            "$gte": bson_datetime(range.start),
                            "$lte": bson_datetime(range.end),
                        },
                    );
                }
                let mut value = Document::new();
                if let Some(min) = amounts.min {
                    value.insert("$gte", min);
                }
                if let Some(max) = amounts.max {
                    value.insert("$lte", max);
                }
                if !value.is_empty() {
                    filter.insert("value", value);
                }
                doc! { "$match": filter }
            }
            Stage::Group { key, accumulator } => {
                let id: Bson = match key {
                    GroupKey::Whole => Bson::Null,
                    GroupKey::Category => Bson::String("$category".to_string()),
                    GroupKey::Period(period) => {
                        let mut trunc = doc! { "date": "$dt", "unit": period.as_unit_str() };
                        // Server default is Sunday; truncation uses ISO weeks.
                        if matches!(period, GroupPeriod::Week) {
                            trunc.insert("startOfWeek", "monday");
                        }
                        doc! { "$dateTrunc": trunc }.into()
                    }
                };
                let acc = match accumulator {
                    Accumulator::SumValue => doc! { "$sum": "$value" },
                    Accumulator::CountPayments => doc! { "$sum": 1 },
                };
                let mut group = Document::new();
                group.insert("_id", id);
                group.insert(value_label, acc);
                doc! { "$group": group }
            }
            Stage::Sort { ascending } => {
                let direction = if *ascending { 1 } else { -1 };
                doc! { "$sort": { "_id": direction } }
            }
            Stage::Project { value_label } => {
                let key_expr: Bson = match group_key {
                    Some(GroupKey::Category) => Bson::String("$_id".to_string()),
                    Some(GroupKey::Period(_)) => doc! {
                        "$dateToString": { "date": "$_id", "format": KEY_DATE_FORMAT },
                    }
                    .into(),
                    // Plain strings are field paths in $project; a constant
                    // key needs $literal.
                    _ => doc! { "$literal": "" }.into(),
                };
                let mut project = Document::new();
                project.insert("_id", 0);
                project.insert("key", key_expr);
                project.insert(value_label, 1);
                doc! { "$project": project }
            }
        })
        .collect()
}

fn bson_datetime(dt: chrono::NaiveDateTime) -> mongodb::bson::DateTime {
    mongodb::bson::DateTime::from_millis(dt.and_utc().timestamp_millis())
}

fn payment_to_document(payment: &Payment) -> Document {
    doc! {
        "dt": bson_datetime(payment.dt),
        "category": payment.category.as_str(),
        "value": payment.value,
    }
}

fn parse_row(doc: &Document) -> Result<ResultRow> {
    let key = match doc.get("key") {
        Some(Bson::String(key)) => key.clone(),
        // GroupKey::Whole projects a literal empty string, but the server
        // may omit it entirely for null groups.
        None => String::new(),
        Some(other) => {
            return Err(ExecutionError::UnexpectedShape(format!(
                "non-string grouping key: {other:?}"
            ))
            .into())
        }
    };
    let value = doc
        .iter()
        .filter(|(name, _)| *name != "key")
        .find_map(|(_, v)| bson_number(v))
        .ok_or_else(|| {
            ExecutionError::UnexpectedShape(format!("row without numeric value: {doc:?}"))
        })?;
    Ok(ResultRow::new(key, value))
}

fn bson_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(v) => Some(*v),
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
