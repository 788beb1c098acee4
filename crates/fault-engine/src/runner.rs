//! Batch Rule Evaluation
//!
//! Rules are independent: they read the same table and produce separate
//! outputs, so a batch fans out across a rayon thread pool. One rule's
//! failure never aborts or corrupts its siblings; the caller decides what a
//! partial batch means.

use crate::rule::FaultCondition;
use crate::FaultError;
use rayon::prelude::*;
use sensor_table::SensorTable;
use tracing::{info, warn};

/// Outcome of one rule in a batch
#[derive(Debug)]
pub struct RuleOutcome {
    pub id: String,
    pub result: Result<SensorTable, FaultError>,
}

/// An ordered collection of fault conditions evaluated as a batch
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn FaultCondition + Send + Sync>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rule: impl FaultCondition + Send + Sync + 'static) {
        self.rules.push(Box::new(rule));
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate every rule against the shared table.
    ///
    /// Outcomes come back in rule insertion order regardless of which worker
    /// finished first.
    pub fn evaluate_all(&self, table: &SensorTable) -> Vec<RuleOutcome> {
        info!(rules = self.rules.len(), rows = table.len(), "evaluating rule set");
        let outcomes: Vec<RuleOutcome> = self
            .rules
            .par_iter()
            .map(|rule| RuleOutcome {
                id: rule.id().to_string(),
                result: rule.evaluate(table),
            })
            .collect();
        for outcome in &outcomes {
            if let Err(err) = &outcome.result {
                warn!(rule = %outcome.id, %err, "rule evaluation failed");
            }
        }
        outcomes
    }
}
