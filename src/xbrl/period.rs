use chrono::{Datelike, Duration, NaiveDate};

use crate::config::ResolverConfig;
use crate::xbrl::context::{Context, ContextRegistry, PeriodBucket, Scope};
use crate::xbrl::index::FactIndex;

/// The filing's resolved reporting horizon. Computed once per filing and
/// never recomputed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetPeriod {
    pub current_end: NaiveDate,
    pub previous_end: NaiveDate,
}

impl TargetPeriod {
    /// Disclosure-anchored construction: the explicit period-end date is used
    /// verbatim.
    pub fn from_current_end(current_end: NaiveDate) -> Self {
        TargetPeriod {
            current_end,
            previous_end: shift_years_back(current_end, 1),
        }
    }

    /// Inference-anchored construction: the latest anchor-fact end date not
    /// exceeding `reference_date` + margin, falling back to the latest
    /// instant-context boundary, then to `reference_date` itself.
    pub fn infer(
        registry: &ContextRegistry,
        index: &FactIndex,
        cfg: &ResolverConfig,
        reference_date: NaiveDate,
    ) -> Self {
        let threshold = reference_date + Duration::days(cfg.date_margin_days);

        let mut candidates: Vec<NaiveDate> = Vec::new();
        for tag in &cfg.anchor_tags {
            for fact in index.facts(tag) {
                if fact.raw.trim().is_empty() {
                    continue;
                }
                if let Some(ctx) = registry.get(&fact.context_id) {
                    candidates.push(ctx.end);
                }
            }
        }
        if candidates.is_empty() {
            candidates.extend(registry.latest_instant_end());
        }

        let current_end = candidates
            .into_iter()
            .filter(|d| *d <= threshold)
            .max()
            .unwrap_or(reference_date);
        log::debug!("inferred period end {}", current_end);
        Self::from_current_end(current_end)
    }

    /// Target end date for a lookback of `rank` years.
    pub fn rank_target(&self, rank: u32) -> NaiveDate {
        shift_years_back(self.current_end, rank)
    }

    /// Classifies a context against the resolved boundaries, within the
    /// configured day tolerance.
    pub fn classify(&self, ctx: &Context, tolerance_days: i64) -> Option<PeriodBucket> {
        let non_consolidated = ctx.scope == Scope::NonConsolidated;
        if (ctx.end - self.current_end).num_days().abs() <= tolerance_days {
            Some(if non_consolidated {
                PeriodBucket::CurrentNonConsolidated
            } else {
                PeriodBucket::Current
            })
        } else if (ctx.end - self.previous_end).num_days().abs() <= tolerance_days {
            Some(if non_consolidated {
                PeriodBucket::PreviousNonConsolidated
            } else {
                PeriodBucket::Previous
            })
        } else {
            None
        }
    }
}

/// Shifts a date back by whole calendar years. When the literal date does not
/// exist in the earlier year (leap day), falls back to a 365-day-per-year
/// offset.
pub fn shift_years_back(date: NaiveDate, years: u32) -> NaiveDate {
    if years == 0 {
        return date;
    }
    NaiveDate::from_ymd_opt(date.year() - years as i32, date.month(), date.day())
        .unwrap_or_else(|| date - Duration::days(365 * i64::from(years)))
}
