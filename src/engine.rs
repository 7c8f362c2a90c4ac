use anyhow::Result;
use chrono::NaiveDate;
use strum::IntoEnumIterator;

use crate::config::ResolverConfig;
use crate::filing::Filing;
use crate::metrics::{Category, FilingMetrics, FilingReport, MetricsTable};
use crate::xbrl::context::Period;
use crate::xbrl::period::TargetPeriod;
use crate::xbrl::resolve::{ResolutionRequest, Resolver};
use crate::xbrl::{governance, group, normalize};

/// The fact resolution engine: one filing archive in, one normalized metrics
/// view out. Stateless across invocations; identical inputs always produce
/// identical output, so callers may fan out over many filings freely.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    cfg: ResolverConfig,
}

impl Engine {
    pub fn new(cfg: ResolverConfig) -> Self {
        Engine { cfg }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.cfg
    }

    /// Resolves the full category table plus governance metadata, anchoring
    /// the target period on the filing's explicit period-end disclosure when
    /// present and inferring it otherwise.
    pub fn screen(&self, archive: &[u8], reference_date: NaiveDate) -> Result<FilingReport> {
        let filing = Filing::from_zip(archive, &self.cfg)?;
        let mut gov = governance::extract(&filing);

        let target = match gov.period_end {
            Some(current_end) => TargetPeriod::from_current_end(current_end),
            None => TargetPeriod::infer(&filing.registry, &filing.index, &self.cfg, reference_date),
        };
        gov.period_end = Some(target.current_end);

        let resolver = Resolver::new(&self.cfg, &filing.registry, &filing.index, target);
        let mut table = MetricsTable::default();
        for category in Category::iter() {
            for period in [Period::Current, Period::Previous] {
                let value = if let Some(tags) = self.cfg.group_tags.get(&category) {
                    group::aggregate(&resolver, tags, period)
                } else if let Some(tags) = self.cfg.priority_tags.get(&category) {
                    resolver
                        .resolve(tags, &ResolutionRequest::Bucket { period })
                        .map(|r| r.value)
                        .unwrap_or(0.0)
                } else {
                    0.0
                };
                table.set(category, period, value);
            }
        }

        Ok(FilingReport {
            table,
            governance: gov,
        })
    }

    /// Resolves the flat scalar record through the scored policy, inferring
    /// the target period from the facts themselves. `reference_date` bounds
    /// the inference so historical snapshots resolve consistently.
    pub fn extract_metrics(
        &self,
        archive: &[u8],
        reference_date: NaiveDate,
    ) -> Result<FilingMetrics> {
        let filing = Filing::from_zip(archive, &self.cfg)?;
        let target = TargetPeriod::infer(&filing.registry, &filing.index, &self.cfg, reference_date);
        let resolver = Resolver::new(&self.cfg, &filing.registry, &filing.index, target);
        Ok(normalize::extract_metrics(&resolver))
    }
}
