//! Accounting-integrity risk signals computed from a resolved metrics table.
//! Every check degrades to `None` on missing inputs instead of failing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::metrics::{Category, Governance, MetricsTable};
use crate::xbrl::context::Period;

const BIG4_KEYWORDS: [&str; 9] = [
    "トーマツ",
    "あずさ",
    "新日本",
    "PwC",
    "ＰｗＣ",
    "あらた",
    "Deloitte",
    "EY",
    "KPMG",
];

const FINANCIAL_SECTORS: [&str; 4] = ["銀行業", "証券、商品先物取引業", "保険業", "その他金融業"];

const FINANCIAL_NAME_KEYWORDS: [&str; 5] = ["銀行", "証券", "保険", "リース", "投資"];

const MANUFACTURING_SECTORS: [&str; 19] = [
    "水産・農林業",
    "鉱業",
    "建設業",
    "食料品",
    "繊維製品",
    "パルプ・紙",
    "化学",
    "医薬品",
    "石油・石炭製品",
    "ゴム製品",
    "ガラス・土石製品",
    "鉄鋼",
    "非鉄金属",
    "金属製品",
    "機械",
    "電気機器",
    "輸送用機器",
    "精密機器",
    "その他製品",
];

const HIGH_ACCRUAL_SECTORS: [&str; 2] = ["情報・通信業", "サービス業"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Normal,
    Caution,
    Alert,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Normal => write!(f, "normal"),
            Verdict::Caution => write!(f, "caution"),
            Verdict::Alert => write!(f, "alert"),
        }
    }
}

/// Financial-sector issuers report under different balance-sheet mechanics;
/// accrual and turnover checks are informational only for them.
pub fn is_financial_company(name: &str, sector: &str) -> bool {
    FINANCIAL_NAME_KEYWORDS.iter().any(|k| name.contains(k))
        || FINANCIAL_SECTORS.contains(&sector)
}

pub fn auditor_tier(auditor: Option<&str>) -> Verdict {
    match auditor {
        Some(name) if BIG4_KEYWORDS.iter().any(|k| name.contains(k)) => Verdict::Normal,
        _ => Verdict::Caution,
    }
}

/// ROA below −10% flags a possible big-bath write-off year.
pub fn big_bath(table: &MetricsTable) -> Option<(f64, Verdict)> {
    let net_income = table.get(Category::NetIncome, Period::Current);
    let total_assets = table.get(Category::TotalAssets, Period::Current);
    if total_assets == 0.0 {
        return None;
    }
    let ratio = net_income / total_assets;
    let verdict = if ratio < -0.10 {
        Verdict::Alert
    } else if ratio < -0.05 {
        Verdict::Caution
    } else {
        Verdict::Normal
    };
    Some((ratio, verdict))
}

/// Related-party exposure: mention count plus transaction amount relative to
/// sales.
pub fn related_party(gov: &Governance, sales: f64) -> (f64, Verdict) {
    let mut verdict = if gov.related_party_hits <= 5 {
        Verdict::Normal
    } else if gov.related_party_hits <= 20 {
        Verdict::Caution
    } else {
        Verdict::Alert
    };
    let ratio = if sales > 0.0 {
        gov.related_party_amount / sales
    } else {
        0.0
    };
    if ratio > 0.10 && verdict == Verdict::Normal {
        verdict = Verdict::Caution;
    }
    (ratio, verdict)
}

/// Days between period end and submission; statutory deadline is 90 days.
pub fn late_filing(period_end: NaiveDate, submitted: NaiveDate) -> (i64, Verdict) {
    let days = (submitted - period_end).num_days();
    let verdict = if days <= 100 {
        Verdict::Normal
    } else {
        Verdict::Caution
    };
    (days, verdict)
}

/// Dechow F-score: manipulation probability from RSST accruals and changes in
/// receivables and inventory.
pub fn f_score(table: &MetricsTable) -> Option<(f64, Verdict)> {
    let c = |cat| table.get(cat, Period::Current);
    let p = |cat| table.get(cat, Period::Previous);

    let avg_assets = (c(Category::TotalAssets) + p(Category::TotalAssets)) / 2.0;
    if avg_assets == 0.0 {
        return None;
    }

    let rsst_accruals = ((c(Category::CurrentAssets) - c(Category::CurrentLiabilities))
        - (p(Category::CurrentAssets) - p(Category::CurrentLiabilities)))
        / avg_assets;
    let ch_receivables = (c(Category::Receivables) - p(Category::Receivables)) / avg_assets;
    let ch_inventory = (c(Category::Inventory) - p(Category::Inventory)) / avg_assets;

    let predictor =
        -7.893 + 0.79 * rsst_accruals + 2.518 * ch_receivables + 1.191 * ch_inventory;
    let probability = 1.0 / (1.0 + (-predictor).exp());
    let verdict = if probability > 0.01 {
        Verdict::Caution
    } else {
        Verdict::Normal
    };
    Some((probability, verdict))
}

/// Sloan ratio: accrual share of earnings, with a looser threshold for
/// sectors whose business model is accrual-heavy.
pub fn sloan_ratio(table: &MetricsTable, sector: &str) -> Option<(f64, Verdict)> {
    let net_income = table.get(Category::NetIncome, Period::Current);
    let op_cf = table.get(Category::OpCashFlow, Period::Current);
    let total_assets = table.get(Category::TotalAssets, Period::Current);
    if total_assets == 0.0 {
        return None;
    }
    let ratio = (net_income - op_cf) / total_assets;
    let threshold = if HIGH_ACCRUAL_SECTORS.contains(&sector) {
        0.25
    } else {
        0.10
    };
    let verdict = if ratio.abs() > threshold {
        Verdict::Caution
    } else {
        Verdict::Normal
    };
    Some((ratio, verdict))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Turnover {
    /// Months of sales tied up in the line item.
    pub months: f64,
    /// Change versus the previous period, when computable.
    pub delta: Option<f64>,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TurnoverReport {
    pub receivables: Option<Turnover>,
    pub inventory: Option<Turnover>,
    pub payables: Option<Turnover>,
}

/// Turnover periods for receivables, inventory and payables. A lengthening of
/// more than one month year over year is the warning signal.
pub fn turnover(table: &MetricsTable) -> Option<TurnoverReport> {
    let current_sales = table.get(Category::Sales, Period::Current);
    if current_sales == 0.0 {
        return None;
    }
    let previous_sales = table.get(Category::Sales, Period::Previous);

    let item = |category: Category| -> Option<Turnover> {
        let current = table.get(category, Period::Current);
        if current <= 0.0 {
            return None;
        }
        let months = current / current_sales * 12.0;
        let previous = table.get(category, Period::Previous);
        let delta = if previous != 0.0 && previous_sales != 0.0 {
            Some(months - previous / previous_sales * 12.0)
        } else {
            None
        };
        let verdict = match delta {
            Some(d) if d > 1.0 => Verdict::Caution,
            _ => Verdict::Normal,
        };
        Some(Turnover {
            months,
            delta,
            verdict,
        })
    };

    Some(TurnoverReport {
        receivables: item(Category::Receivables),
        inventory: item(Category::Inventory),
        payables: item(Category::Payables),
    })
}

/// Altman Z-score, manufacturing coefficients for manufacturing sectors and
/// the Z''-score variant otherwise. Not meaningful for financial issuers.
pub fn altman_z(table: &MetricsTable, name: &str, sector: &str) -> Option<(f64, Verdict)> {
    if is_financial_company(name, sector) {
        return None;
    }
    let c = |cat| table.get(cat, Period::Current);
    let total_assets = c(Category::TotalAssets);
    if total_assets == 0.0 {
        return None;
    }

    let x1 = (c(Category::CurrentAssets) - c(Category::CurrentLiabilities)) / total_assets;
    let x2 = c(Category::RetainedEarnings) / total_assets;
    let x3 = c(Category::OpIncome) / total_assets;
    let x4 = c(Category::NetAssets) / (total_assets - c(Category::NetAssets)).max(1.0);

    if MANUFACTURING_SECTORS.contains(&sector) {
        let z = 1.2 * x1
            + 1.4 * x2
            + 3.3 * x3
            + 0.6 * x4
            + 1.0 * (c(Category::Sales) / total_assets);
        let verdict = if z < 1.23 {
            Verdict::Alert
        } else if z < 2.90 {
            Verdict::Caution
        } else {
            Verdict::Normal
        };
        Some((z, verdict))
    } else {
        let z = 6.56 * x1 + 3.26 * x2 + 6.72 * x3 + 1.05 * x4;
        let verdict = if z < 1.1 { Verdict::Alert } else { Verdict::Normal };
        Some((z, verdict))
    }
}
