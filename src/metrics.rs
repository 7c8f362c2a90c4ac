use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumIter};

use crate::xbrl::context::Period;

/// Semantic categories of the resolved table. The last three are summation
/// groups; the rest resolve through the ordered priority lists.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Display,
)]
pub enum Category {
    Sales,
    OpIncome,
    NetIncome,
    TotalAssets,
    NetAssets,
    OpCashFlow,
    CurrentAssets,
    CurrentLiabilities,
    RetainedEarnings,
    CashAndEquivalents,
    Ppe,
    Receivables,
    Inventory,
    Payables,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricCell {
    pub current: f64,
    pub previous: f64,
}

/// Category-by-period table of resolved values. Unresolved cells stay at
/// zero, which downstream checks treat as "unknown".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsTable {
    cells: HashMap<Category, MetricCell>,
}

impl MetricsTable {
    pub fn get(&self, category: Category, period: Period) -> f64 {
        let cell = self.cells.get(&category).copied().unwrap_or_default();
        match period {
            Period::Current => cell.current,
            Period::Previous => cell.previous,
        }
    }

    pub fn set(&mut self, category: Category, period: Period, value: f64) {
        let cell = self.cells.entry(category).or_default();
        match period {
            Period::Current => cell.current = value,
            Period::Previous => cell.previous = value,
        }
    }
}

/// Best-effort governance metadata extracted alongside the numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Governance {
    pub auditor: Option<String>,
    pub accounting_standard: Option<String>,
    pub consolidated: bool,
    pub period_end: Option<NaiveDate>,
    pub related_party_hits: usize,
    pub related_party_amount: f64,
}

impl Default for Governance {
    fn default() -> Self {
        Governance {
            auditor: None,
            accounting_standard: None,
            consolidated: true,
            period_end: None,
            related_party_hits: 0,
            related_party_amount: 0.0,
        }
    }
}

/// Full screening output for one filing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingReport {
    pub table: MetricsTable,
    pub governance: Governance,
}

/// Flat per-filing scalar record produced by the scored resolution path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilingMetrics {
    pub assets: f64,
    pub net_assets: f64,
    pub cash: f64,
    pub debt: f64,
    pub issued_shares: f64,
    pub treasury_shares: f64,
    pub real_shares: f64,
    pub op_income: f64,
    pub net_income: f64,
    pub depreciation: f64,
    pub operating_cf: f64,
    pub capex: f64,
    pub ebitda: f64,
    pub net_debt: f64,
    pub free_cash_flow: f64,
    pub prev_assets: f64,
    pub prev_ebitda: f64,
    pub asset_growth: f64,
    pub period_end: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_cells_read_as_zero() {
        let table = MetricsTable::default();
        assert_eq!(table.get(Category::Sales, Period::Current), 0.0);
    }

    #[test]
    fn set_and_get_round_trip() {
        let mut table = MetricsTable::default();
        table.set(Category::NetIncome, Period::Current, 1_000_000.0);
        table.set(Category::NetIncome, Period::Previous, 900_000.0);
        assert_eq!(table.get(Category::NetIncome, Period::Current), 1_000_000.0);
        assert_eq!(table.get(Category::NetIncome, Period::Previous), 900_000.0);
    }

    #[test]
    fn table_serializes_with_category_keys() {
        let mut table = MetricsTable::default();
        table.set(Category::Sales, Period::Current, 5.0);
        let json = serde_json::to_string(&table).unwrap();
        assert!(json.contains("Sales"));
    }
}
