//! Aggregation pipeline builder.
//!
//! Maps a [`ValidatedIntent`] onto its fixed stage template. The mapping is
//! a pure function with no error path: validation has already excluded
//! anything unrepresentable.

use super::types::{
    Accumulator, CommandIntent, GroupKey, Pipeline, Stage, ValidatedIntent,
};

/// Builds aggregation pipelines from validated intents.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineBuilder;

impl PipelineBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Deterministic: equal intents always yield equal pipelines.
    pub fn build(&self, validated: &ValidatedIntent) -> Pipeline {
        let stages = match validated.intent() {
            CommandIntent::Sum {
                category,
                range,
                amounts,
            } => vec![
                Stage::Match {
                    category: Some(category.clone()),
                    range: Some(*range),
                    amounts: *amounts,
                },
                Stage::Group {
                    key: GroupKey::Whole,
                    accumulator: Accumulator::SumValue,
                },
                Stage::Project {
                    value_label: "total".to_string(),
                },
            ],
            CommandIntent::Count { category, range } => vec![
                Stage::Match {
                    category: Some(category.clone()),
                    range: *range,
                    amounts: Default::default(),
                },
                Stage::Group {
                    key: GroupKey::Whole,
                    accumulator: Accumulator::CountPayments,
                },
                Stage::Project {
                    value_label: "count".to_string(),
                },
            ],
            CommandIntent::Series {
                period,
                range,
                category,
            } => vec![
                Stage::Match {
                    category: category.clone(),
                    range: Some(*range),
                    amounts: Default::default(),
                },
                Stage::Group {
                    key: GroupKey::Period(*period),
                    accumulator: Accumulator::SumValue,
                },
                Stage::Sort { ascending: true },
                Stage::Project {
                    value_label: "total".to_string(),
                },
            ],
        };
        Pipeline { stages }
    }
}
