//! Per-Row Predicate Evaluation
//!
//! Fault conditions are conjunctions of comparisons over a small expression
//! form: column references, constants, sums, differences, min/max envelopes,
//! absolute differences, and quotients. Rules are data, not types - a new
//! fault code is a new predicate, not a new implementation.
//!
//! NaN discipline: any comparison with a NaN operand evaluates false, so
//! sparse sensor rows never flag.

use sensor_table::{SensorTable, TableError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Numeric expression evaluated per row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    /// Value of a named column at the current row
    Col(String),
    /// Constant
    Const(f64),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Min(Box<Expr>, Box<Expr>),
    Max(Box<Expr>, Box<Expr>),
    /// |lhs - rhs|
    AbsDiff(Box<Expr>, Box<Expr>),
    /// lhs / rhs (NaN/inf propagate into comparisons, which then fail closed)
    Div(Box<Expr>, Box<Expr>),
}

/// Shorthand for a column reference
pub fn col(name: impl Into<String>) -> Expr {
    Expr::Col(name.into())
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Const(value)
    }
}

impl Expr {
    pub fn plus(self, rhs: impl Into<Expr>) -> Expr {
        Expr::Add(Box::new(self), Box::new(rhs.into()))
    }

    pub fn minus(self, rhs: impl Into<Expr>) -> Expr {
        Expr::Sub(Box::new(self), Box::new(rhs.into()))
    }

    pub fn min(self, rhs: impl Into<Expr>) -> Expr {
        Expr::Min(Box::new(self), Box::new(rhs.into()))
    }

    pub fn max(self, rhs: impl Into<Expr>) -> Expr {
        Expr::Max(Box::new(self), Box::new(rhs.into()))
    }

    pub fn abs_diff(self, rhs: impl Into<Expr>) -> Expr {
        Expr::AbsDiff(Box::new(self), Box::new(rhs.into()))
    }

    pub fn div(self, rhs: impl Into<Expr>) -> Expr {
        Expr::Div(Box::new(self), Box::new(rhs.into()))
    }

    fn eval(&self, row: usize, view: &ColumnView<'_>) -> f64 {
        match self {
            Expr::Col(name) => view.value(name, row),
            Expr::Const(v) => *v,
            Expr::Add(a, b) => a.eval(row, view) + b.eval(row, view),
            Expr::Sub(a, b) => a.eval(row, view) - b.eval(row, view),
            Expr::Min(a, b) => a.eval(row, view).min(b.eval(row, view)),
            Expr::Max(a, b) => a.eval(row, view).max(b.eval(row, view)),
            Expr::AbsDiff(a, b) => (a.eval(row, view) - b.eval(row, view)).abs(),
            Expr::Div(a, b) => a.eval(row, view) / b.eval(row, view),
        }
    }

    fn collect_columns<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        match self {
            Expr::Col(name) => {
                out.insert(name.as_str());
            }
            Expr::Const(_) => {}
            Expr::Add(a, b)
            | Expr::Sub(a, b)
            | Expr::Min(a, b)
            | Expr::Max(a, b)
            | Expr::AbsDiff(a, b)
            | Expr::Div(a, b) => {
                a.collect_columns(out);
                b.collect_columns(out);
            }
        }
    }
}

/// Comparison operator.
///
/// Tolerance comparisons in the rule catalog use the strict forms: a value
/// exactly at a threshold-adjusted bound does not flag. `Ge` exists for
/// saturation gates (valve commanded at or above its open point).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    fn holds(self, lhs: f64, rhs: f64) -> bool {
        // NaN operands make every variant false
        match self {
            CmpOp::Lt => lhs < rhs,
            CmpOp::Le => lhs <= rhs,
            CmpOp::Gt => lhs > rhs,
            CmpOp::Ge => lhs >= rhs,
        }
    }
}

/// A single comparison between two expressions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub lhs: Expr,
    pub op: CmpOp,
    pub rhs: Expr,
}

impl Comparison {
    pub fn new(lhs: Expr, op: CmpOp, rhs: impl Into<Expr>) -> Self {
        Self {
            lhs,
            op,
            rhs: rhs.into(),
        }
    }

    pub(crate) fn holds(&self, row: usize, view: &ColumnView<'_>) -> bool {
        self.op
            .holds(self.lhs.eval(row, view), self.rhs.eval(row, view))
    }
}

/// Conjunction of comparisons: the rule's per-row fault predicate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Predicate {
    comparisons: Vec<Comparison>,
}

impl Predicate {
    pub fn all(comparisons: Vec<Comparison>) -> Self {
        Self { comparisons }
    }

    /// Column names referenced anywhere in the predicate
    pub fn columns(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        for cmp in &self.comparisons {
            cmp.lhs.collect_columns(&mut out);
            cmp.rhs.collect_columns(&mut out);
        }
        out
    }

    pub(crate) fn comparisons(&self) -> &[Comparison] {
        &self.comparisons
    }

    pub(crate) fn holds(&self, row: usize, view: &ColumnView<'_>) -> bool {
        self.comparisons.iter().all(|cmp| cmp.holds(row, view))
    }
}

/// Column slices resolved once per evaluation
pub(crate) struct ColumnView<'a> {
    columns: HashMap<&'a str, &'a [f64]>,
}

impl<'a> ColumnView<'a> {
    /// Resolve every named column up front so a missing binding surfaces
    /// before any row is evaluated.
    pub(crate) fn resolve(
        table: &'a SensorTable,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, TableError> {
        let mut columns = HashMap::new();
        for name in names {
            columns.insert(name, table.column(name)?);
        }
        Ok(Self { columns })
    }

    fn value(&self, name: &str, row: usize) -> f64 {
        self.columns
            .get(name)
            .map_or(f64::NAN, |values| values[row])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn table_with(name: &str, values: Vec<f64>) -> SensorTable {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let ts = (0..values.len())
            .map(|i| start + chrono::Duration::minutes(i as i64))
            .collect();
        let mut table = SensorTable::new(ts).unwrap();
        table.insert_column(name, values).unwrap();
        table
    }

    #[test]
    fn test_expr_arithmetic() {
        let table = table_with("mat", vec![70.0]);
        let view = ColumnView::resolve(&table, ["mat"]).unwrap();
        let expr = col("mat").plus(5.0).min(col("mat").minus(2.0));
        assert_eq!(expr.eval(0, &view), 68.0);
    }

    #[test]
    fn test_nan_comparisons_fail_closed() {
        let table = table_with("sat", vec![f64::NAN]);
        let view = ColumnView::resolve(&table, ["sat"]).unwrap();
        for op in [CmpOp::Lt, CmpOp::Le, CmpOp::Gt, CmpOp::Ge] {
            let cmp = Comparison::new(col("sat"), op, 55.0);
            assert!(!cmp.holds(0, &view));
        }
    }

    #[test]
    fn test_predicate_conjunction() {
        let table = table_with("vfd", vec![0.8, 0.0]);
        let view = ColumnView::resolve(&table, ["vfd"]).unwrap();
        let pred = Predicate::all(vec![
            Comparison::new(col("vfd"), CmpOp::Gt, 0.0),
            Comparison::new(col("vfd"), CmpOp::Lt, 1.0),
        ]);
        assert!(pred.holds(0, &view));
        assert!(!pred.holds(1, &view));
    }

    #[test]
    fn test_columns_collected() {
        let pred = Predicate::all(vec![Comparison::new(
            col("mat").plus(5.0),
            CmpOp::Lt,
            col("rat").minus(2.0).min(col("oat").minus(5.0)),
        )]);
        let cols = pred.columns();
        assert_eq!(cols.into_iter().collect::<Vec<_>>(), vec!["mat", "oat", "rat"]);
    }

    #[test]
    fn test_missing_column_resolution_fails() {
        let table = table_with("mat", vec![70.0]);
        assert!(ColumnView::resolve(&table, ["mat", "rat"]).is_err());
    }

    #[test]
    fn test_division_by_zero_fails_closed() {
        let table = table_with("flow", vec![0.0]);
        let view = ColumnView::resolve(&table, ["flow"]).unwrap();
        // 2500 / 0 = inf; inf > thres holds, but abs-diff against inf is inf
        // and NaN arithmetic downstream stays un-flagged.
        let cmp = Comparison::new(
            Expr::Const(2500.0).div(col("flow")).abs_diff(f64::INFINITY),
            CmpOp::Gt,
            0.3,
        );
        assert!(!cmp.holds(0, &view));
    }
}
