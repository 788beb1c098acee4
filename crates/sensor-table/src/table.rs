//! Sensor Table Implementation

use crate::TableError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Time-indexed table of named numeric columns.
///
/// Every column holds exactly one `f64` per timestamp. Analog percentage
/// signals use the 0.0-1.0 convention; physical signals keep their units
/// (degrees F, CFM, inches WC). Boolean flag columns are stored as 0.0/1.0.
#[derive(Debug, Clone, Serialize)]
pub struct SensorTable {
    timestamps: Vec<DateTime<Utc>>,
    columns: HashMap<String, Vec<f64>>,
    /// Column names in insertion order
    order: Vec<String>,
}

impl SensorTable {
    /// Create an empty table over the given timestamp index.
    ///
    /// Fails if timestamps are not non-decreasing.
    pub fn new(timestamps: Vec<DateTime<Utc>>) -> Result<Self, TableError> {
        for (i, pair) in timestamps.windows(2).enumerate() {
            if pair[1] < pair[0] {
                return Err(TableError::NonMonotonicTimestamps { index: i + 1 });
            }
        }
        Ok(Self {
            timestamps,
            columns: HashMap::new(),
            order: Vec::new(),
        })
    }

    /// Number of rows in the table
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// The timestamp index
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Add a new column. Fails on length mismatch or if the name is taken.
    pub fn insert_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), TableError> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(TableError::DuplicateColumn { name });
        }
        self.set_column(name, values)
    }

    /// Add or replace a column. Fails on length mismatch only.
    ///
    /// Derived columns (flags, diagnostics) use this so re-evaluation
    /// overwrites rather than errors, matching assignment semantics.
    pub fn set_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), TableError> {
        let name = name.into();
        if values.len() != self.timestamps.len() {
            return Err(TableError::LengthMismatch {
                name,
                expected: self.timestamps.len(),
                actual: values.len(),
            });
        }
        if !self.columns.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.columns.insert(name, values);
        Ok(())
    }

    /// Add or replace a boolean flag column, stored as 0.0/1.0.
    pub fn set_flag_column(
        &mut self,
        name: impl Into<String>,
        flags: &[bool],
    ) -> Result<(), TableError> {
        let values = flags.iter().map(|&f| if f { 1.0 } else { 0.0 }).collect();
        self.set_column(name, values)
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Result<&[f64], TableError> {
        self.columns
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| TableError::MissingColumn {
                name: name.to_string(),
            })
    }

    /// Check whether a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Column names in insertion order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Read a flag column back as booleans (any value other than 1.0 is false)
    pub fn flag_column(&self, name: &str) -> Result<Vec<bool>, TableError> {
        Ok(self.column(name)?.iter().map(|&v| v == 1.0).collect())
    }
}
