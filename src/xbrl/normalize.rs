use crate::metrics::FilingMetrics;
use crate::xbrl::index::Fact;
use crate::xbrl::resolve::{ResolutionRequest, Resolver};

/// Decodes a fact's raw text into a number, applying the power-of-ten scale
/// exponent and the negation flag from inline markup. Returns `None` for
/// empty or non-numeric text; such facts are inert.
pub fn decode_value(fact: &Fact) -> Option<f64> {
    let raw = fact.raw.trim();
    if raw.is_empty() {
        return None;
    }
    let mut value: f64 = raw.parse().ok()?;
    if let Some(scale) = fact.scale {
        value *= 10f64.powi(scale);
    }
    if fact.sign {
        value = -value;
    }
    Some(value)
}

/// Rescales a partial-year duration value to a full-year equivalent. Values
/// from contexts of 350 days or more are already annual and pass through
/// unchanged.
pub fn annualize(value: f64, duration_days: i64) -> f64 {
    match duration_days {
        80..=100 => value * 4.0,
        170..=200 => value * 2.0,
        260..=280 => value * (12.0 / 9.0),
        d if d > 0 && d < 350 => value * 365.0 / d as f64,
        _ => value,
    }
}

// Semi-annual comparison windows understate year-over-year growth.
const SEMI_ANNUAL_RANGE: std::ops::Range<i64> = 150..250;

/// Resolves the flat per-filing scalar record through the scored policy and
/// derives the composite metrics.
pub fn extract_metrics(resolver: &Resolver<'_>) -> FilingMetrics {
    let tags = &resolver.cfg.scalar_tags;

    let get = |list: &[String], rank: u32, prefer_consolidated: bool, annualize: bool| {
        resolver
            .resolve(
                list,
                &ResolutionRequest::Scored {
                    rank,
                    prefer_consolidated,
                    annualize,
                },
            )
            .map(|r| (r.value, r.duration_days))
            .unwrap_or((0.0, 0))
    };

    let (assets, _) = get(&tags.assets, 0, true, false);
    let (net_assets, _) = get(&tags.net_assets, 0, true, false);
    let (cash, _) = get(&tags.cash, 0, true, false);

    // Debt lines are disjoint; each configured tag is resolved on its own and
    // the results summed.
    let mut debt = 0.0;
    for tag in &tags.debt {
        debt += get(std::slice::from_ref(tag), 0, true, false).0;
    }

    // Share counts are disclosed per registrant, not per group.
    let (issued_shares, _) = get(&tags.issued_shares, 0, false, false);
    let (raw_treasury, _) = get(&tags.treasury_shares, 0, true, false);
    let mut treasury_shares = raw_treasury.abs();

    let (op_income, op_income_days) = get(&tags.op_income, 0, true, true);
    let (net_income, _) = get(&tags.net_income, 0, true, true);
    let (depreciation, _) = get(&tags.depreciation, 0, true, true);
    let (operating_cf, _) = get(&tags.operating_cf, 0, true, true);
    let (raw_capex, _) = get(&tags.capex, 0, true, true);
    let capex = raw_capex.abs();

    // Data-quality guard: more treasury shares than issued shares is a
    // misread, not a buyback.
    if issued_shares > 0.0 && treasury_shares > issued_shares {
        treasury_shares = 0.0;
    }
    let mut real_shares = (issued_shares - treasury_shares).max(0.0);
    if real_shares == 0.0 && issued_shares > 0.0 {
        real_shares = issued_shares;
    }

    let (prev_assets, _) = get(&tags.assets, 1, true, false);
    let (prev_op_income, _) = get(&tags.op_income, 1, true, true);
    let (prev_depreciation, _) = get(&tags.depreciation, 1, true, true);

    let raw_growth = if prev_assets > 0.0 {
        (assets - prev_assets) / prev_assets
    } else {
        0.0
    };
    let asset_growth = if SEMI_ANNUAL_RANGE.contains(&op_income_days) {
        raw_growth * 2.0
    } else {
        raw_growth
    };

    FilingMetrics {
        assets,
        net_assets,
        cash,
        debt,
        issued_shares,
        treasury_shares,
        real_shares,
        op_income,
        net_income,
        depreciation,
        operating_cf,
        capex,
        ebitda: op_income + depreciation,
        net_debt: debt - cash,
        free_cash_flow: operating_cf - capex,
        prev_assets,
        prev_ebitda: prev_op_income + prev_depreciation,
        asset_growth,
        period_end: resolver.target.current_end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(raw: &str, scale: Option<i32>, sign: bool) -> Fact {
        Fact {
            tag: "Assets".to_string(),
            context_id: "Cur".to_string(),
            raw: raw.to_string(),
            scale,
            sign,
            doc: 0,
        }
    }

    #[test]
    fn decode_applies_scale_and_sign() {
        assert_eq!(decode_value(&fact("1000000", None, false)), Some(1_000_000.0));
        assert_eq!(decode_value(&fact("42", Some(3), false)), Some(42_000.0));
        assert_eq!(decode_value(&fact("42", None, true)), Some(-42.0));
        assert_eq!(decode_value(&fact("", None, false)), None);
        assert_eq!(decode_value(&fact("n/a", None, false)), None);
    }

    #[test]
    fn annualization_bands() {
        assert_eq!(annualize(500.0, 91), 2000.0);
        assert_eq!(annualize(500.0, 183), 1000.0);
        assert_eq!(annualize(300.0, 270), 400.0);
        assert_eq!(annualize(100.0, 120), 100.0 * 365.0 / 120.0);
        // Annual data passes through unchanged, within boundary tolerance.
        assert_eq!(annualize(500.0, 350), 500.0);
        assert_eq!(annualize(500.0, 365), 500.0);
        assert_eq!(annualize(500.0, 366), 500.0);
        assert_eq!(annualize(500.0, 0), 500.0);
    }
}
