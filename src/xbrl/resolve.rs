use crate::config::ResolverConfig;
use crate::xbrl::context::{ContextRegistry, Period, PeriodType, Scope};
use crate::xbrl::index::FactIndex;
use crate::xbrl::normalize;
use crate::xbrl::period::TargetPeriod;

/// How a resolution request selects among candidate facts.
///
/// The bucket policy relies on the strict period classification of annual
/// filings; the scored policy searches every candidate and ranks them, which
/// also copes with ad-hoc quarterly filings where no clean bucket split
/// exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionRequest {
    Bucket {
        period: Period,
    },
    Scored {
        /// Lookback in years from the current period end; 0 is current.
        rank: u32,
        prefer_consolidated: bool,
        annualize: bool,
    },
}

/// Where a resolved value came from: its spelling's priority index, or its
/// candidate score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Priority(usize),
    Score(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub value: f64,
    /// The winning tag spelling.
    pub tag: String,
    pub provenance: Provenance,
    /// Duration of the source context in days; zero for instants.
    pub duration_days: i64,
}

// Score weights of the candidate search, mirroring how filer software tends
// to name primary reporting contexts.
const SCOPE_MATCH_BONUS: i64 = 1000;
const PRIOR_AT_CURRENT_PENALTY: i64 = 5000;
const PRIOR_AT_PREVIOUS_BONUS: i64 = 5000;
const PRIOR_BEFORE_CURRENT_BONUS: i64 = 8000;

/// Resolves one semantic category to a numeric value against a fixed filing.
pub struct Resolver<'a> {
    pub cfg: &'a ResolverConfig,
    pub registry: &'a ContextRegistry,
    pub index: &'a FactIndex,
    pub target: TargetPeriod,
}

impl<'a> Resolver<'a> {
    pub fn new(
        cfg: &'a ResolverConfig,
        registry: &'a ContextRegistry,
        index: &'a FactIndex,
        target: TargetPeriod,
    ) -> Self {
        Resolver {
            cfg,
            registry,
            index,
            target,
        }
    }

    pub fn resolve(&self, tags: &[String], request: &ResolutionRequest) -> Option<Resolved> {
        match *request {
            ResolutionRequest::Bucket { period } => self.resolve_priority(tags, period),
            ResolutionRequest::Scored {
                rank,
                prefer_consolidated,
                annualize,
            } => self.resolve_scored(tags, rank, prefer_consolidated, annualize),
        }
    }

    /// Ordered-priority resolution: the first spelling with any valid numeric
    /// fact in the requested bucket wins, and later (lower-priority)
    /// spellings can never overwrite it. A non-consolidated fact is accepted
    /// only when the same spelling has no consolidated match.
    fn resolve_priority(&self, tags: &[String], period: Period) -> Option<Resolved> {
        for (priority, spelling) in tags.iter().enumerate() {
            let mut consolidated = None;
            let mut fallback = None;
            for fact in self.index.facts(spelling) {
                let Some(ctx) = self.registry.get(&fact.context_id) else {
                    continue;
                };
                let Some(bucket) = self.target.classify(ctx, self.cfg.bucket_tolerance_days)
                else {
                    continue;
                };
                if bucket.period() != period {
                    continue;
                }
                let Some(value) = normalize::decode_value(fact) else {
                    continue;
                };
                if bucket.is_consolidated() {
                    consolidated = Some((value, ctx.duration_days()));
                    break;
                }
                if fallback.is_none() {
                    fallback = Some((value, ctx.duration_days()));
                }
            }
            if let Some((value, duration_days)) = consolidated.or(fallback) {
                return Some(Resolved {
                    value,
                    tag: spelling.clone(),
                    provenance: Provenance::Priority(priority),
                    duration_days,
                });
            }
        }
        None
    }

    /// Scored resolution: every candidate fact across all spellings competes;
    /// the highest score wins, ties broken by declaration order.
    fn resolve_scored(
        &self,
        tags: &[String],
        rank: u32,
        prefer_consolidated: bool,
        annualize: bool,
    ) -> Option<Resolved> {
        let target = self.target.rank_target(rank);
        let mut best: Option<(i64, Resolved)> = None;

        for spelling in tags {
            for fact in self.index.facts(spelling) {
                let Some(ctx) = self.registry.get(&fact.context_id) else {
                    continue;
                };
                if fact.raw.is_empty() {
                    continue;
                }

                let mut score: i64 = 0;
                if (ctx.scope == Scope::Consolidated) == prefer_consolidated {
                    score += SCOPE_MATCH_BONUS;
                }
                // Shorter ids tend to be the primary reporting scope.
                score -= ctx.id.len() as i64;

                let id_lower = ctx.id.to_ascii_lowercase();
                let is_prior = self
                    .cfg
                    .prior_markers
                    .iter()
                    .any(|m| id_lower.contains(m.as_str()));

                let mut date_diff = (ctx.end - target).num_days().abs();
                if rank == 1 && is_prior && ctx.end < self.target.current_end {
                    score += PRIOR_BEFORE_CURRENT_BONUS;
                    date_diff = 0;
                }
                if date_diff > self.cfg.date_margin_days {
                    continue;
                }

                let Some(mut value) = normalize::decode_value(fact) else {
                    continue;
                };
                if rank == 0 && is_prior {
                    score -= PRIOR_AT_CURRENT_PENALTY;
                } else if rank == 1 && is_prior {
                    score += PRIOR_AT_PREVIOUS_BONUS;
                }

                let duration_days = ctx.duration_days();
                if annualize && ctx.period_type == PeriodType::Duration {
                    value = normalize::annualize(value, duration_days);
                }

                // Strict comparison keeps declaration order on ties.
                if best.as_ref().map_or(true, |(s, _)| score > *s) {
                    best = Some((
                        score,
                        Resolved {
                            value,
                            tag: spelling.clone(),
                            provenance: Provenance::Score(score),
                            duration_days,
                        },
                    ));
                }
            }
        }
        best.map(|(_, resolved)| resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fixture(xml: &str) -> (ResolverConfig, ContextRegistry, FactIndex) {
        let cfg = ResolverConfig::default();
        let doc = roxmltree::Document::parse(xml).unwrap();
        let mut registry = ContextRegistry::default();
        registry.collect(&doc, &cfg);
        let mut index = FactIndex::default();
        index.collect(&doc);
        (cfg, registry, index)
    }

    fn target() -> TargetPeriod {
        TargetPeriod::from_current_end(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap())
    }

    const BASIC: &str = r#"<xbrl xmlns:xbrli="http://www.xbrl.org/2003/instance"
             xmlns:jppfs="http://example.com/jppfs">
        <xbrli:context id="CurrentYearInstant">
            <xbrli:period><xbrli:instant>2024-03-31</xbrli:instant></xbrli:period>
        </xbrli:context>
        <xbrli:context id="Prior1YearInstant">
            <xbrli:period><xbrli:instant>2023-03-31</xbrli:instant></xbrli:period>
        </xbrli:context>
        <xbrli:context id="CurrentYearInstant_NonConsolidatedMember">
            <xbrli:period><xbrli:instant>2024-03-31</xbrli:instant></xbrli:period>
        </xbrli:context>
        <jppfs:NetAssets contextRef="CurrentYearInstant">500</jppfs:NetAssets>
        <jppfs:NetAssets contextRef="Prior1YearInstant">450</jppfs:NetAssets>
        <jppfs:TotalEquity contextRef="CurrentYearInstant">999</jppfs:TotalEquity>
        <jppfs:Assets contextRef="CurrentYearInstant_NonConsolidatedMember">80</jppfs:Assets>
        <jppfs:Assets contextRef="CurrentYearInstant">100</jppfs:Assets>
    </xbrl>"#;

    #[test]
    fn priority_policy_stops_at_first_matching_spelling() {
        let (cfg, registry, index) = fixture(BASIC);
        let resolver = Resolver::new(&cfg, &registry, &index, target());

        // NetAssets list: NetAssetsSummaryOfBusinessResults has no fact, so
        // resolution lands on a later spelling; TotalEquity (higher priority
        // than NetAssets) must win over NetAssets.
        let resolved = resolver
            .resolve(
                &cfg.priority_tags[&crate::metrics::Category::NetAssets],
                &ResolutionRequest::Bucket {
                    period: Period::Current,
                },
            )
            .unwrap();
        assert_eq!(resolved.tag, "TotalEquity");
        assert_eq!(resolved.value, 999.0);
        assert_eq!(resolved.provenance, Provenance::Priority(2));
    }

    #[test]
    fn consolidated_fact_beats_non_consolidated_within_a_spelling() {
        let (cfg, registry, index) = fixture(BASIC);
        let resolver = Resolver::new(&cfg, &registry, &index, target());

        let spelling = vec!["Assets".to_string()];
        let resolved = resolver
            .resolve(
                &spelling,
                &ResolutionRequest::Bucket {
                    period: Period::Current,
                },
            )
            .unwrap();
        assert_eq!(resolved.value, 100.0);
    }

    #[test]
    fn non_consolidated_is_a_fallback_when_no_consolidated_fact_exists() {
        let (cfg, registry, index) = fixture(
            r#"<xbrl xmlns:xbrli="http://www.xbrl.org/2003/instance"
                     xmlns:jppfs="http://example.com/jppfs">
                <xbrli:context id="CurrentYearInstant_NonConsolidatedMember">
                    <xbrli:period><xbrli:instant>2024-03-31</xbrli:instant></xbrli:period>
                </xbrli:context>
                <jppfs:Assets contextRef="CurrentYearInstant_NonConsolidatedMember">80</jppfs:Assets>
            </xbrl>"#,
        );
        let resolver = Resolver::new(&cfg, &registry, &index, target());
        let spelling = vec!["Assets".to_string()];
        let resolved = resolver
            .resolve(
                &spelling,
                &ResolutionRequest::Bucket {
                    period: Period::Current,
                },
            )
            .unwrap();
        assert_eq!(resolved.value, 80.0);
    }

    #[test]
    fn non_numeric_facts_are_skipped_as_candidates() {
        let (cfg, registry, index) = fixture(
            r#"<xbrl xmlns:xbrli="http://www.xbrl.org/2003/instance"
                     xmlns:jppfs="http://example.com/jppfs">
                <xbrli:context id="CurrentYearInstant">
                    <xbrli:period><xbrli:instant>2024-03-31</xbrli:instant></xbrli:period>
                </xbrli:context>
                <jppfs:NetAssets contextRef="CurrentYearInstant">n/a</jppfs:NetAssets>
                <jppfs:TotalEquity contextRef="CurrentYearInstant">999</jppfs:TotalEquity>
            </xbrl>"#,
        );
        let resolver = Resolver::new(&cfg, &registry, &index, target());
        let spellings = vec!["NetAssets".to_string(), "TotalEquity".to_string()];
        let resolved = resolver
            .resolve(
                &spellings,
                &ResolutionRequest::Bucket {
                    period: Period::Current,
                },
            )
            .unwrap();
        assert_eq!(resolved.value, 999.0);
    }

    #[test]
    fn scored_policy_prefers_matching_scope_and_short_ids() {
        let (cfg, registry, index) = fixture(BASIC);
        let resolver = Resolver::new(&cfg, &registry, &index, target());
        let spelling = vec!["Assets".to_string()];

        let consolidated = resolver
            .resolve(
                &spelling,
                &ResolutionRequest::Scored {
                    rank: 0,
                    prefer_consolidated: true,
                    annualize: false,
                },
            )
            .unwrap();
        assert_eq!(consolidated.value, 100.0);

        let parent_only = resolver
            .resolve(
                &spelling,
                &ResolutionRequest::Scored {
                    rank: 0,
                    prefer_consolidated: false,
                    annualize: false,
                },
            )
            .unwrap();
        assert_eq!(parent_only.value, 80.0);
    }

    #[test]
    fn scored_policy_rank_one_finds_prior_year() {
        let (cfg, registry, index) = fixture(BASIC);
        let resolver = Resolver::new(&cfg, &registry, &index, target());
        let spelling = vec!["NetAssets".to_string()];

        let prior = resolver
            .resolve(
                &spelling,
                &ResolutionRequest::Scored {
                    rank: 1,
                    prefer_consolidated: true,
                    annualize: false,
                },
            )
            .unwrap();
        assert_eq!(prior.value, 450.0);
    }

    #[test]
    fn scored_policy_excludes_candidates_outside_the_date_margin() {
        let (cfg, registry, index) = fixture(
            r#"<xbrl xmlns:xbrli="http://www.xbrl.org/2003/instance"
                     xmlns:jppfs="http://example.com/jppfs">
                <xbrli:context id="OldInstant">
                    <xbrli:period><xbrli:instant>2021-03-31</xbrli:instant></xbrli:period>
                </xbrli:context>
                <jppfs:NetAssets contextRef="OldInstant">450</jppfs:NetAssets>
            </xbrl>"#,
        );
        let resolver = Resolver::new(&cfg, &registry, &index, target());
        let spelling = vec!["NetAssets".to_string()];
        assert!(resolver
            .resolve(
                &spelling,
                &ResolutionRequest::Scored {
                    rank: 0,
                    prefer_consolidated: true,
                    annualize: false,
                },
            )
            .is_none());
    }

    #[test]
    fn scored_policy_annualizes_quarterly_durations() {
        let (cfg, registry, index) = fixture(
            r#"<xbrl xmlns:xbrli="http://www.xbrl.org/2003/instance"
                     xmlns:jppfs="http://example.com/jppfs">
                <xbrli:context id="CurrentQuarterDuration">
                    <xbrli:period>
                        <xbrli:startDate>2023-12-31</xbrli:startDate>
                        <xbrli:endDate>2024-03-31</xbrli:endDate>
                    </xbrli:period>
                </xbrli:context>
                <jppfs:OperatingIncome contextRef="CurrentQuarterDuration">500</jppfs:OperatingIncome>
            </xbrl>"#,
        );
        let resolver = Resolver::new(&cfg, &registry, &index, target());
        let spelling = vec!["OperatingIncome".to_string()];
        let resolved = resolver
            .resolve(
                &spelling,
                &ResolutionRequest::Scored {
                    rank: 0,
                    prefer_consolidated: true,
                    annualize: true,
                },
            )
            .unwrap();
        assert_eq!(resolved.value, 2000.0);
        assert_eq!(resolved.duration_days, 91);
    }
}
